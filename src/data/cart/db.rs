use bson::oid::ObjectId;
use bson::{doc, Bson};

use super::{CartItemView, NewCartItem, CART_COLLECTION_NAME, ENROLLED};
use crate::data::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::data::filter;
use crate::data::store::{FieldUpdate, FindOptions, Store};
use crate::error::StoreError;

pub trait CartDbExt {
    async fn add_cart_item(&self, item: &NewCartItem) -> Result<InsertAck, StoreError>;
    async fn list_cart_items(
        &self,
        email: impl AsRef<str>,
        is_enrolled: i32,
    ) -> Result<Vec<CartItemView>, StoreError>;
    async fn mark_enrolled(&self, id: ObjectId) -> Result<UpdateAck, StoreError>;
    async fn delete_cart_item(&self, id: ObjectId) -> Result<DeleteAck, StoreError>;
}

impl CartDbExt for Store {
    async fn add_cart_item(&self, item: &NewCartItem) -> Result<InsertAck, StoreError> {
        self.collection(CART_COLLECTION_NAME).insert_one(item).await
    }

    async fn list_cart_items(
        &self,
        email: impl AsRef<str>,
        is_enrolled: i32,
    ) -> Result<Vec<CartItemView>, StoreError> {
        let projection = doc! {
            "_id": 1,
            "classImage": 1,
            "className": 1,
            "price": 1,
            "classId": 1,
        };

        self.collection(CART_COLLECTION_NAME)
            .find(
                doc! { "email": email.as_ref(), "isEnrolled": is_enrolled },
                FindOptions::default().projection(projection),
            )
            .await
    }

    /// Flips the enrollment flag only. Recording the payment is a separate call.
    async fn mark_enrolled(&self, id: ObjectId) -> Result<UpdateAck, StoreError> {
        self.collection(CART_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                FieldUpdate::Set("isEnrolled", Bson::Int32(ENROLLED)),
            )
            .await
    }

    async fn delete_cart_item(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        self.collection(CART_COLLECTION_NAME)
            .delete_one(filter::by_id(id))
            .await
    }
}
