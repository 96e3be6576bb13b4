use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};
use crate::role::Role;

pub mod db;

pub static USER_COLLECTION_NAME: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Body of `POST /addUser`. Roles can't be self assigned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Problem> {
        if !self.email.contains('@') {
            return Err(problems::invalid_field(
                "email",
                "Not a valid e-mail address.",
            ));
        }

        Ok(())
    }
}

/// Projection served by `GET /userRole/<email>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRoleView {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}
