use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::Config;

#[derive(Clone)]
pub struct KeySet {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl KeySet {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> KeySet {
        KeySet {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// Session token signing material. Absent keys only surface when a token is
/// issued or verified.
#[derive(Clone)]
pub struct Security {
    pub jwt_keys: Option<KeySet>,
}

impl Security {
    pub fn from_config(config: &Config) -> Security {
        let jwt_keys = match &config.access_token_secret {
            Some(secret) => {
                tracing::info!("Loaded JWT signing secret.");
                Some(KeySet::from_secret(secret.reveal()))
            }
            None => {
                tracing::warn!("ACCESS_TOKEN_SECRET isn't set. Token endpoints will fail.");
                None
            }
        };

        Security { jwt_keys }
    }
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Security")
            .field("jwt_keys", &self.jwt_keys.as_ref().map(|_| "****"))
            .finish()
    }
}
