use std::sync::Arc;

use rocket::http::Header;
use rocket::local::asynchronous::Client;
use rocket::Route;

use crate::config::{Config, Secret};
use crate::data::memory::MemoryStore;
use crate::data::Store;
use crate::gateway::fake::FakeGateway;
use crate::resp::jwt::SessionClaims;
use crate::security::Security;

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        access_token_secret: Some(Secret::new(TEST_SECRET)),
        payment_secret_key: Some(Secret::new("sk_test_local")),
        ..Config::default()
    }
}

/// Full application backed by an in-memory store and a recording payment gateway.
pub struct TestBackend {
    pub client: Client,
    pub store: Store,
    pub security: Security,
    pub gateway: Arc<FakeGateway>,
}

impl TestBackend {
    pub async fn new() -> TestBackend {
        TestBackend::with_gateway(FakeGateway::default(), Vec::new()).await
    }

    /// Same as [`TestBackend::new`] with extra routes mounted at `/`.
    pub async fn with_routes(routes: Vec<Route>) -> TestBackend {
        TestBackend::with_gateway(FakeGateway::default(), routes).await
    }

    pub async fn with_gateway(gateway: FakeGateway, routes: Vec<Route>) -> TestBackend {
        let config = test_config();
        let security = Security::from_config(&config);
        let store = Store::new(MemoryStore::new());
        let gateway = Arc::new(gateway);

        let rocket = crate::build(config, store.clone(), gateway.clone())
            .expect("unable to build test rocket")
            .mount("/", routes);
        let client = Client::untracked(rocket)
            .await
            .expect("unable to launch test rocket");

        TestBackend {
            client,
            store,
            security,
            gateway,
        }
    }

    pub fn token_for(&self, email: &str) -> String {
        self.security
            .issue_token(&SessionClaims::new(email))
            .expect("unable to issue test token")
    }
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}
