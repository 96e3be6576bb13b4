use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Failures of a [`DocumentStore`](crate::data::store::DocumentStore) call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("unable to serialize document: {0}")]
    Serialization(#[from] bson::ser::Error),
    #[error("unable to deserialize document: {0}")]
    Deserialization(#[from] bson::de::Error),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway secret key isn't configured")]
    MissingSecretKey,
    #[error("unable to reach payment gateway: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected payment gateway response: {0}")]
    Decode(String),
}
