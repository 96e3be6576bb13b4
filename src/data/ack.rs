use bson::Bson;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::util::bson_id_string;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertAck {
    pub fn new(inserted_id: &Bson) -> InsertAck {
        InsertAck {
            acknowledged: true,
            inserted_id: bson_id_string(inserted_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
    pub upserted_count: u64,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> UpdateAck {
        UpdateAck {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> DeleteAck {
        DeleteAck {
            acknowledged: true,
            deleted_count,
        }
    }
}

impl From<mongodb::results::InsertOneResult> for InsertAck {
    fn from(result: mongodb::results::InsertOneResult) -> Self {
        InsertAck::new(&result.inserted_id)
    }
}

impl From<mongodb::results::UpdateResult> for UpdateAck {
    fn from(result: mongodb::results::UpdateResult) -> Self {
        let upserted_id = result.upserted_id.as_ref().map(bson_id_string);
        UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: upserted_id.is_some() as u64,
            upserted_id,
        }
    }
}

impl From<mongodb::results::DeleteResult> for DeleteAck {
    fn from(result: mongodb::results::DeleteResult) -> Self {
        DeleteAck::new(result.deleted_count)
    }
}
