use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::resp::problem::{problems, Problem};

/// Converts an externally supplied id into the store's native identifier.
pub fn parse_id(id: &str) -> Result<ObjectId, Problem> {
    ObjectId::parse_str(id).map_err(|_| problems::invalid_id(id))
}

#[inline]
pub fn by_id(id: ObjectId) -> Document {
    doc! { "_id": id }
}

#[inline]
pub fn by_email(email: impl AsRef<str>) -> Document {
    doc! { "email": email.as_ref() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;

    #[test]
    fn malformed_ids_are_bad_requests() {
        assert!(parse_id("64b7f0c2a1b2c3d4e5f60718").is_ok());

        for bad in ["", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", "64b7f0c2a1b2c3d4e5f6071899"] {
            let problem = parse_id(bad).unwrap_err();
            assert_eq!(problem.status, Status::BadRequest);
        }
    }
}
