use std::sync::Arc;

use bson::{doc, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::error::StoreError;

/// Single field modification accepted by [`DocumentStore::update_one`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(&'static str, Bson),
    Inc(&'static str, i64),
}

impl FieldUpdate {
    pub fn to_document(&self) -> Document {
        let (operator, field, value) = match self {
            FieldUpdate::Set(field, value) => ("$set", *field, value.clone()),
            FieldUpdate::Inc(field, by) => ("$inc", *field, Bson::Int64(*by)),
        };

        let mut change = Document::new();
        change.insert(field, value);
        let mut update = Document::new();
        update.insert(operator, change);
        update
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Document>,
    pub sort: Option<Document>,
}

impl FindOptions {
    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Exact-match document store with four logical collections.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert_one(&self, collection: &str, document: Document)
        -> Result<InsertAck, StoreError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: FieldUpdate,
    ) -> Result<UpdateAck, StoreError>;

    async fn delete_one(&self, collection: &str, filter: Document)
        -> Result<DeleteAck, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn shutdown(&self) {}
}

/// Handle to the process-wide store, managed by Rocket and cloned into guards.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentStore>,
}

impl Store {
    pub fn new(backend: impl DocumentStore + 'static) -> Store {
        Store {
            backend: Arc::new(backend),
        }
    }

    pub fn collection(&self, name: &'static str) -> Collection<'_> {
        Collection {
            backend: self.backend.as_ref(),
            name,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.backend.ping().await
    }

    pub async fn shutdown(&self) {
        self.backend.shutdown().await
    }
}

pub struct Collection<'s> {
    backend: &'s dyn DocumentStore,
    name: &'static str,
}

impl Collection<'_> {
    pub async fn find<T: DeserializeOwned>(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<T>, StoreError> {
        let documents = self.backend.find(self.name, filter, options).await?;
        Ok(deserialize_all(self.name, documents))
    }

    pub async fn find_one<T: DeserializeOwned>(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<T>, StoreError> {
        match self.backend.find_one(self.name, filter, projection).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, filter: Document) -> Result<bool, StoreError> {
        Ok(self
            .backend
            .find_one(self.name, filter, Some(doc! { "_id": 1 }))
            .await?
            .is_some())
    }

    pub async fn insert_one(&self, value: &impl Serialize) -> Result<InsertAck, StoreError> {
        let document = bson::to_document(value)?;
        self.backend.insert_one(self.name, document).await
    }

    pub async fn update_one(
        &self,
        filter: Document,
        update: FieldUpdate,
    ) -> Result<UpdateAck, StoreError> {
        self.backend.update_one(self.name, filter, update).await
    }

    pub async fn delete_one(&self, filter: Document) -> Result<DeleteAck, StoreError> {
        self.backend.delete_one(self.name, filter).await
    }
}

fn deserialize_all<T: DeserializeOwned>(collection: &str, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| match bson::from_document(document) {
            Ok(it) => Some(it),
            Err(e) => {
                tracing::warn!("Unable to deserialize '{}' document: {}", collection, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_updates_render_single_operator() {
        assert_eq!(
            FieldUpdate::Set("role", Bson::from("admin")).to_document(),
            doc! { "$set": { "role": "admin" } }
        );
        assert_eq!(
            FieldUpdate::Inc("availableSeats", -1).to_document(),
            doc! { "$inc": { "availableSeats": -1_i64 } }
        );
    }
}
