use bson::oid::ObjectId;
use bson::{doc, Document};

use super::{NewUser, User, UserRoleView, USER_COLLECTION_NAME};
use crate::data::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::data::filter;
use crate::data::store::{FieldUpdate, FindOptions, Store};
use crate::error::StoreError;
use crate::role::Role;

/// Outcome of `POST /addUser`.
#[derive(Debug, Clone, PartialEq)]
pub enum AddUserOutcome {
    Inserted(InsertAck),
    AlreadyExists,
}

pub trait UserDbExt {
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn list_users_with_role(&self, role: Role) -> Result<Vec<User>, StoreError>;

    async fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>, StoreError>;
    async fn user_role(&self, email: impl AsRef<str>) -> Result<Option<UserRoleView>, StoreError>;
    async fn user_exists(&self, email: impl AsRef<str>) -> Result<bool, StoreError>;

    async fn add_user(&self, user: &NewUser) -> Result<AddUserOutcome, StoreError>;
    async fn set_user_role(&self, id: ObjectId, role: Role) -> Result<UpdateAck, StoreError>;
    async fn delete_user(&self, id: ObjectId) -> Result<DeleteAck, StoreError>;
}

impl UserDbExt for Store {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .find(Document::new(), FindOptions::default())
            .await
    }

    async fn list_users_with_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .find(doc! { "role": role }, FindOptions::default())
            .await
    }

    async fn find_user_by_email(&self, email: impl AsRef<str>) -> Result<Option<User>, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .find_one(filter::by_email(email), None)
            .await
    }

    async fn user_role(&self, email: impl AsRef<str>) -> Result<Option<UserRoleView>, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .find_one(filter::by_email(email), Some(doc! { "role": 1 }))
            .await
    }

    async fn user_exists(&self, email: impl AsRef<str>) -> Result<bool, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .exists(filter::by_email(email))
            .await
    }

    /// Check-then-insert; concurrent requests for one email may both insert.
    async fn add_user(&self, user: &NewUser) -> Result<AddUserOutcome, StoreError> {
        if self.user_exists(&user.email).await? {
            tracing::debug!("user {} already exists", user.email);
            return Ok(AddUserOutcome::AlreadyExists);
        }

        let ack = self.collection(USER_COLLECTION_NAME).insert_one(user).await?;
        tracing::info!("Created user {} with id {}", user.email, ack.inserted_id);
        Ok(AddUserOutcome::Inserted(ack))
    }

    async fn set_user_role(&self, id: ObjectId, role: Role) -> Result<UpdateAck, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .update_one(filter::by_id(id), FieldUpdate::Set("role", role.into()))
            .await
    }

    async fn delete_user(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        self.collection(USER_COLLECTION_NAME)
            .delete_one(filter::by_id(id))
            .await
    }
}
