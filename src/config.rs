use crate::error::ConfigurationError;
use crate::util;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("languageSchoolDb".to_string())
}

fn default_db_user() -> Option<String> {
    env::var("DB_USER").ok()
}

fn default_db_pass() -> Option<Secret> {
    env::var("DB_PASS").ok().map(Secret)
}

fn default_access_token_secret() -> Option<Secret> {
    env::var("ACCESS_TOKEN_SECRET").ok().map(Secret)
}

fn default_payment_secret_key() -> Option<Secret> {
    env::var("PAYMENT_SECRET_KEY").ok().map(Secret)
}

fn default_payment_api_base() -> String {
    env::var("PAYMENT_API_BASE").unwrap_or("https://api.stripe.com".to_string())
}

fn default_address() -> IpAddr {
    env::var("ADDRESS")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(5000)
}

/// Credential or key material that must not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl ToString) -> Secret {
        Secret(value.to_string())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(****)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,
    #[serde(default = "default_db_user")]
    pub db_user: Option<String>,
    #[serde(default = "default_db_pass")]
    pub db_pass: Option<Secret>,

    #[serde(default = "default_access_token_secret")]
    pub access_token_secret: Option<Secret>,

    #[serde(default = "default_payment_secret_key")]
    pub payment_secret_key: Option<Secret>,
    #[serde(default = "default_payment_api_base")]
    pub payment_api_base: String,

    #[serde(default = "default_address")]
    pub address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            db_user: default_db_user(),
            db_pass: default_db_pass(),
            access_token_secret: default_access_token_secret(),
            payment_secret_key: default_payment_secret_key(),
            payment_api_base: default_payment_api_base(),
            address: default_address(),
            port: default_port(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    /// Reads `settings.yml` (or `settings.yaml`) from `CONFIG_DIR`. Fields missing
    /// from the file fall back to the environment.
    pub fn load() -> Result<Config, ConfigurationError> {
        Config::load_from(config_dir())
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            dir.as_ref(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(dir.as_ref().to_path_buf()))?;

        let file = File::open(config_file)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;

        Ok(config)
    }
}
