#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::data::mongo::MongoStore;
use crate::data::Store;
use crate::error::{BackendError, ConfigurationError};
use crate::gateway::{Gateway, StripeGateway};
use crate::route::mount_api;
use crate::security::Security;

pub mod config;
pub mod data;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod resp;
pub mod role;
pub mod route;
pub mod security;
pub mod util;

#[cfg(test)]
mod test_support;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if let Err(err) = tracing_log::LogTracer::init() {
            eprintln!("Unable to forward log records: {}", err);
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(dir)) => {
            tracing::info!(
                "No settings file in {}, using environment.",
                dir.display()
            );
            Config::default()
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Connecting to MongoDB...");
    let mongo = MongoStore::connect(&c).await?;
    let store = Store::new(mongo);

    match store.ping().await {
        Ok(()) => tracing::info!("Pinged your deployment. Connected to MongoDB."),
        Err(e) => tracing::error!("Unable to ping MongoDB: {}", e),
    }

    let gateway = StripeGateway::new(&c)?;

    build(c, store, Arc::new(gateway))
}

/// Assembles the application around an already connected store and payment gateway.
pub fn build(c: Config, store: Store, gateway: Gateway) -> Result<Rocket<Build>, BackendError> {
    let security = Security::from_config(&c);

    let figment = rocket::Config::figment()
        .merge(("address", c.address))
        .merge(("port", c.port));

    tracing::info!("Starting HTTP server on {}:{}...", c.address, c.port);
    let mut r = rocket::custom(figment)
        .manage(c)
        .manage(security)
        .manage(store)
        .manage(gateway);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::all(),
        allowed_methods: vec![
            Method::Get,
            Method::Put,
            Method::Post,
            Method::Patch,
            Method::Delete,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: AllowedHeaders::all(),
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors).attach(AdHoc::on_shutdown("Close data store", |rocket| {
        Box::pin(async move {
            if let Some(store) = rocket.state::<Store>() {
                tracing::info!("Closing data store...");
                store.shutdown().await;
            }
        })
    }));
    r = mount_api(r);

    Ok(r)
}
