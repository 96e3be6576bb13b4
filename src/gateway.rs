use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;

use crate::config::{Config, Secret};
use crate::error::GatewayError;

pub const DEFAULT_CURRENCY: &str = "usd";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Creates payment intents on an external payment provider.
#[rocket::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError>;
}

pub type Gateway = Arc<dyn PaymentGateway>;

/// Stripe REST API client.
#[derive(Clone)]
pub struct StripeGateway {
    api_base: String,
    secret_key: Option<Secret>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &Config) -> Result<StripeGateway, GatewayError> {
        if config.payment_secret_key.is_none() {
            tracing::warn!("PAYMENT_SECRET_KEY isn't set. Payment intents will fail.");
        }

        let client = Client::builder().build()?;

        Ok(StripeGateway {
            api_base: config.payment_api_base.trim_end_matches('/').to_string(),
            secret_key: config.payment_secret_key.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.api_base, path)
    }
}

#[rocket::async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or(GatewayError::MissingSecretKey)?;

        let amount_param = amount.to_string();
        let params = [
            ("amount", amount_param.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        tracing::debug!("Creating payment intent for {} {}", amount, currency);
        let response = self
            .client
            .post(self.url("/payment_intents"))
            .bearer_auth(secret_key.reveal())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let intent = response
                .json::<PaymentIntent>()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()))?;
            tracing::info!("Created payment intent {}", intent.id);
            Ok(intent)
        } else {
            let body = response.text().await?;
            let message = match serde_json::from_str::<StripeErrorBody>(&body) {
                Ok(it) => format!(
                    "{}: {}",
                    it.error.kind.unwrap_or_else(|| "error".to_string()),
                    it.error.message.unwrap_or_default()
                ),
                Err(_) => body,
            };
            Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    /// Records requested amounts and answers with a predictable client secret.
    #[derive(Debug, Default)]
    pub struct FakeGateway {
        pub requests: Mutex<Vec<(i64, String)>>,
        pub fail: bool,
    }

    #[rocket::async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_payment_intent(
            &self,
            amount: i64,
            currency: &str,
        ) -> Result<PaymentIntent, GatewayError> {
            if self.fail {
                return Err(GatewayError::Rejected {
                    status: 402,
                    message: "card_error: declined".to_string(),
                });
            }

            self.requests
                .lock()
                .unwrap()
                .push((amount, currency.to_string()));
            Ok(PaymentIntent {
                id: format!("pi_{}", amount),
                client_secret: format!("pi_{}_secret", amount),
                amount,
                currency: currency.to_string(),
                status: Some("requires_payment_method".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    use rocket::config::LogLevel;
    use rocket::fairing::AdHoc;
    use rocket::http::Status;
    use rocket::request::{self, FromRequest, Request};
    use rocket::response::content::RawJson;
    use rocket::State;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const DECLINED_KEY: &str = "sk_test_declined";

    /// Requests seen by the stub as `(authorization, form body)`.
    type Seen = Arc<Mutex<Vec<(String, String)>>>;

    struct Authorization(String);

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for Authorization {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, ()> {
            let value = req.headers().get_one("Authorization").unwrap_or_default();
            request::Outcome::Success(Authorization(value.to_string()))
        }
    }

    #[post("/v1/payment_intents", data = "<form>")]
    fn payment_intents(
        auth: Authorization,
        form: String,
        seen: &State<Seen>,
    ) -> (Status, RawJson<&'static str>) {
        let declined = auth.0 == format!("Bearer {}", DECLINED_KEY);
        seen.lock().unwrap().push((auth.0, form));

        if declined {
            (
                Status::PaymentRequired,
                RawJson(r#"{"error":{"type":"card_error","message":"Your card was declined."}}"#),
            )
        } else {
            (
                Status::Ok,
                RawJson(
                    r#"{"id":"pi_123","object":"payment_intent","amount":1999,"currency":"usd","client_secret":"pi_123_secret_abc","status":"requires_payment_method"}"#,
                ),
            )
        }
    }

    /// Launches a stub payment API on a free local port and returns its base URL.
    async fn spawn_stub(seen: Seen) -> String {
        let port = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let config = rocket::Config {
            address: Ipv4Addr::LOCALHOST.into(),
            port,
            log_level: LogLevel::Off,
            ..rocket::Config::debug_default()
        };

        let (ready, started) = oneshot::channel();
        let stub = rocket::custom(config)
            .manage(seen)
            .mount("/", routes![payment_intents])
            .attach(AdHoc::on_liftoff("Stub ready", move |_| {
                Box::pin(async move {
                    let _ = ready.send(());
                })
            }));

        tokio::spawn(async move {
            if let Err(e) = stub.launch().await {
                eprintln!("stub payment API failed: {}", e);
            }
        });
        started.await.expect("stub payment API didn't start");

        format!("http://127.0.0.1:{}", port)
    }

    fn stripe(api_base: String, secret_key: &str) -> StripeGateway {
        let config = Config {
            payment_secret_key: Some(Secret::new(secret_key)),
            payment_api_base: api_base,
            ..Config::default()
        };
        StripeGateway::new(&config).unwrap()
    }

    #[rocket::async_test]
    async fn intent_is_created_with_form_and_bearer_key() {
        let seen = Seen::default();
        let base = spawn_stub(seen.clone()).await;
        let gateway = stripe(base, "sk_test_ok");

        let intent = gateway
            .create_payment_intent(1999, DEFAULT_CURRENCY)
            .await
            .unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");
        assert_eq!(intent.amount, 1999);
        assert_eq!(intent.status.as_deref(), Some("requires_payment_method"));

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![(
                "Bearer sk_test_ok".to_string(),
                "amount=1999&currency=usd&payment_method_types%5B%5D=card".to_string()
            )]
        );
    }

    #[rocket::async_test]
    async fn declined_intent_is_rejected_with_gateway_message() {
        let seen = Seen::default();
        let base = spawn_stub(seen.clone()).await;
        let gateway = stripe(base, DECLINED_KEY);

        let result = gateway.create_payment_intent(500, DEFAULT_CURRENCY).await;
        match result {
            Err(GatewayError::Rejected { status, message }) => {
                assert_eq!(status, 402);
                assert_eq!(message, "card_error: Your card was declined.");
            }
            other => panic!("expected a rejection, got {:?}", other),
        }
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[rocket::async_test]
    async fn missing_secret_key_fails_before_any_request() {
        let config = Config {
            payment_secret_key: None,
            payment_api_base: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let gateway = StripeGateway::new(&config).unwrap();

        let result = gateway.create_payment_intent(1000, DEFAULT_CURRENCY).await;
        assert!(matches!(result, Err(GatewayError::MissingSecretKey)));
    }

    #[test]
    fn urls_are_versioned() {
        let config = Config {
            payment_api_base: "https://api.stripe.com/".to_string(),
            ..Config::default()
        };
        let gateway = StripeGateway::new(&config).unwrap();
        assert_eq!(
            gateway.url("/payment_intents"),
            "https://api.stripe.com/v1/payment_intents"
        );
    }
}
