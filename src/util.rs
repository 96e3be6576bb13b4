use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

/// Converts a price in major currency units into minor units, truncating any
/// fractional cent. Float representation applies: `19.99` becomes `1998`.
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0).trunc() as i64
}
