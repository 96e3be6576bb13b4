use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::problem::{problems, Problem};

pub mod db;

pub static CLASS_COLLECTION_NAME: &str = "classes";

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl ClassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approved => "approved",
            ClassStatus::Denied => "denied",
        }
    }
}

impl From<ClassStatus> for bson::Bson {
    fn from(status: ClassStatus) -> Self {
        bson::Bson::String(status.as_str().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub class_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub instructor_email: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub available_seats: i64,
    #[serde(default)]
    pub total_seats: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClassStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Body of `POST /addClasses`. New classes always wait for approval.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub class_name: String,
    pub class_image: String,
    #[serde(default)]
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub price: f64,
    pub available_seats: i64,
    #[serde(default)]
    pub total_seats: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub class_name: String,
    pub class_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    pub instructor_email: String,
    pub price: f64,
    pub available_seats: i64,
    pub total_seats: i64,
    pub status: ClassStatus,
}

impl NewClass {
    pub fn validate(&self) -> Result<(), Problem> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::invalid_field(
                "price",
                "Price must be a non-negative number.",
            ));
        }
        if self.available_seats < 0 {
            return Err(problems::invalid_field(
                "availableSeats",
                "Seat count can't be negative.",
            ));
        }
        if self.total_seats.map_or(false, |it| it < 0) {
            return Err(problems::invalid_field(
                "totalSeats",
                "Seat count can't be negative.",
            ));
        }

        Ok(())
    }

    pub fn into_record(self) -> ClassRecord {
        ClassRecord {
            total_seats: self.total_seats.unwrap_or(self.available_seats),
            class_name: self.class_name,
            class_image: self.class_image,
            instructor_name: self.instructor_name,
            instructor_email: self.instructor_email,
            price: self.price,
            available_seats: self.available_seats,
            status: ClassStatus::Pending,
        }
    }
}

/// Projection served by `GET /class/<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetails {
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
    pub status: Option<ClassStatus>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Projection served by `GET /myclasses/<email>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstructorClass {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub id: ObjectId,
    #[serde(default)]
    pub class_image: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub available_seats: Option<i64>,
    #[serde(default)]
    pub total_seats: Option<i64>,
    #[serde(default)]
    pub status: Option<ClassStatus>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeedbackUpdate {
    pub feedback: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: ClassStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_class() -> NewClass {
        serde_json::from_str(
            r#"{
                "className": "Spanish 101",
                "classImage": "es.png",
                "instructorEmail": "t@x.com",
                "price": 49.5,
                "availableSeats": 12,
                "status": "approved"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn new_classes_start_pending_with_full_seats() {
        let class = new_class();
        assert!(class.validate().is_ok());

        let document = bson::to_document(&class.into_record()).unwrap();
        assert_eq!(document.get_str("status").unwrap(), "pending");
        assert_eq!(document.get_i64("totalSeats").unwrap(), 12);
        assert!(!document.contains_key("instructorName"));
    }

    #[test]
    fn negative_price_or_seats_are_rejected() {
        let mut class = new_class();
        class.price = -1.0;
        assert!(class.validate().is_err());

        let mut class = new_class();
        class.available_seats = -3;
        assert!(class.validate().is_err());
    }
}
