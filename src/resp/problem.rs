use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

use crate::error::{GatewayError, StoreError};

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new(status: Status, type_uri: impl ToString, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: type_uri.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn instance_uri(&mut self, value: String) -> &mut Problem {
        self.instance_uri = Some(value);
        self
    }

    pub fn insert(&mut self, key: impl ToString, value: impl Into<Value>) -> &mut Problem {
        self.body.insert(key.to_string(), value.into());
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    fn into_body(self) -> Map<String, Value> {
        let mut body = self.body;

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri));
        body.insert(String::from("title"), Value::from(self.title));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(instance) = self.instance_uri {
            body.insert(String::from("instance"), Value::from(instance));
        }

        body
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status;
        let body_string = Value::Object(self.into_body()).to_string();

        Response::build()
            .status(status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn parse_problem() -> Problem {
        Problem::new_untyped(
            Status::BadRequest,
            "There was a problem parsing part of the request.",
        )
    }

    #[inline]
    pub fn body_shape_problem() -> Problem {
        Problem::new_untyped(
            Status::UnprocessableEntity,
            "Request body doesn't have the expected shape.",
        )
    }

    #[inline]
    pub fn invalid_id(id: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid document id.")
            .insert_str("id", id)
            .detail("Ids must be 24 character hexadecimal strings.")
            .to_owned()
    }

    #[inline]
    pub fn invalid_field(field: &str, detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Invalid request field.")
            .insert_str("field", field)
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn unauthorized(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
            .insert("error", true)
            .insert_str("message", "unauthorized access")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn forbidden(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::Forbidden, "Permission level too low.")
            .insert("error", true)
            .insert_str("message", "forbidden message")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn not_found() -> Problem {
        Problem::new_untyped(Status::NotFound, "Resource doesn't exist.")
    }

    #[inline]
    pub fn internal() -> Problem {
        Problem::new_untyped(
            Status::InternalServerError,
            "Server failed while processing request.",
        )
    }
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        fn mongodb_problem() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "MongoDB failed while processing request.",
            )
        }

        fn access_problem() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "Server was unable to access MongoDB.",
            )
        }

        fn bad_db_request() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "MongoDB was unable to process bad server request.",
            )
        }

        fn bson_problem() -> Problem {
            Problem::new_untyped(
                Status::InternalServerError,
                "There was a problem with handling MongoDB bson.",
            )
        }

        tracing::error!("MongoDB request failed: {}", e);

        match e.kind.as_ref() {
            ErrorKind::InvalidArgument { .. } => bad_db_request(),
            ErrorKind::Authentication { .. } => access_problem(),
            ErrorKind::BsonDeserialization(_) => bson_problem(),
            ErrorKind::BsonSerialization(_) => bson_problem(),
            ErrorKind::Command(_) => bad_db_request(),
            ErrorKind::DnsResolve { .. } => access_problem(),
            ErrorKind::Io(_) => mongodb_problem()
                .detail("An IO error occurred. Submitted data might not be properly stored.")
                .clone(),
            ErrorKind::ServerSelection { .. } => access_problem(),
            ErrorKind::Write(_) => mongodb_problem()
                .detail("A write error occurred. Submitted data might not be properly stored.")
                .clone(),
            _ => mongodb_problem(),
        }
    }
}

impl From<StoreError> for Problem {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => Problem::from(e),
            other => {
                tracing::error!("Data store request failed: {}", other);
                Problem::new_untyped(
                    Status::InternalServerError,
                    "An error occurred while processing BSON data.",
                )
            }
        }
    }
}

impl From<GatewayError> for Problem {
    fn from(e: GatewayError) -> Self {
        tracing::error!("Payment gateway request failed: {}", e);

        match e {
            GatewayError::MissingSecretKey => Problem::new_untyped(
                Status::InternalServerError,
                "Payment gateway isn't configured.",
            ),
            _ => Problem::new_untyped(
                Status::InternalServerError,
                "Payment gateway failed while processing request.",
            ),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => problems::unauthorized("Expired JWT signature."),
            _ => problems::unauthorized("Error while handling JWT."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_contains_rfc7807_members() {
        let body = problems::invalid_id("nope").into_body();

        assert_eq!(body["type"], "about:blank");
        assert_eq!(body["title"], "Invalid document id.");
        assert_eq!(body["status"], 400);
        assert_eq!(body["id"], "nope");
        assert!(body.contains_key("detail"));
        assert!(!body.contains_key("instance"));
    }

    #[test]
    fn auth_problems_keep_legacy_members() {
        let unauthorized = problems::unauthorized("no token");
        assert_eq!(unauthorized.status, Status::Unauthorized);
        assert_eq!(unauthorized.body["error"], true);
        assert_eq!(unauthorized.body["message"], "unauthorized access");

        let forbidden = problems::forbidden("wrong role");
        assert_eq!(forbidden.status, Status::Forbidden);
        assert_eq!(forbidden.body["message"], "forbidden message");
    }

    #[test]
    fn gateway_errors_do_not_leak_details() {
        let problem = Problem::from(GatewayError::Rejected {
            status: 402,
            message: "card declined sk_live_123".to_string(),
        });

        assert_eq!(problem.status, Status::InternalServerError);
        assert!(problem.detail.is_none());
        assert!(!problem.title.contains("sk_live"));
    }
}
