use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};

pub mod db;

pub static CART_COLLECTION_NAME: &str = "cart";

pub const SELECTED: i32 = 0;
pub const ENROLLED: i32 = 1;

/// Body of `POST /addSelectedClass`. One document stands for both the selected and
/// the enrolled state of a class, told apart by `isEnrolled`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub email: String,
    pub class_id: String,
    pub class_name: String,
    pub class_image: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_email: Option<String>,
    #[serde(default)]
    pub is_enrolled: i32,
}

impl NewCartItem {
    pub fn validate(&self) -> Result<(), Problem> {
        if !self.email.contains('@') {
            return Err(problems::invalid_field(
                "email",
                "Not a valid e-mail address.",
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::invalid_field(
                "price",
                "Price must be a non-negative number.",
            ));
        }
        if self.is_enrolled != SELECTED && self.is_enrolled != ENROLLED {
            return Err(problems::invalid_field(
                "isEnrolled",
                "Enrollment flag must be 0 or 1.",
            ));
        }

        Ok(())
    }
}

/// Projection served by `GET /mySelectedClasses/<email>` and `GET /myEnrolledClasses/<email>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default)]
    pub class_image: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub class_id: Option<String>,
}
