use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use bson::oid::ObjectId;
use bson::{Bson, Document};

use super::ack::{DeleteAck, InsertAck, UpdateAck};
use super::store::{DocumentStore, FieldUpdate, FindOptions};
use crate::error::StoreError;

/// In-process [`DocumentStore`] used by route tests. Supports top-level
/// exact-match filters, inclusion projections and single key sorting.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(it) => Some(*it as f64),
        Bson::Int64(it) => Some(*it as f64),
        Bson::Double(it) => Some(*it),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a.and_then(as_number), b.and_then(as_number)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match key.as_str() {
        "$and" => match expected {
            Bson::Array(clauses) => clauses.iter().all(|clause| match clause {
                Bson::Document(clause) => matches(document, clause),
                _ => false,
            }),
            _ => false,
        },
        _ => document
            .get(key)
            .map(|actual| values_equal(actual, expected))
            .unwrap_or(false),
    })
}

fn project(document: &Document, projection: &Option<Document>) -> Document {
    let projection = match projection {
        Some(it) => it,
        None => return document.clone(),
    };

    let include_id = !matches!(projection.get("_id"), Some(value) if as_number(value) == Some(0.0));

    document
        .iter()
        .filter(|(key, _)| {
            if key.as_str() == "_id" {
                include_id
            } else {
                projection.contains_key(key.as_str())
            }
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut found: Vec<Document> = self
            .documents(collection)
            .into_iter()
            .filter(|document| matches(document, &filter))
            .collect();

        if let Some((key, direction)) = options.sort.as_ref().and_then(|it| it.iter().next()) {
            let descending = as_number(direction).map_or(false, |it| it < 0.0);
            found.sort_by(|a, b| {
                let ordering = compare(a.get(key), b.get(key));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(found
            .iter()
            .map(|document| project(document, &options.projection))
            .collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .documents(collection)
            .iter()
            .find(|document| matches(document, &filter))
            .map(|document| project(document, &projection)))
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<InsertAck, StoreError> {
        if !document.contains_key("_id") {
            let mut with_id = Document::new();
            with_id.insert("_id", ObjectId::new());
            for (key, value) in document {
                with_id.insert(key, value);
            }
            document = with_id;
        }

        let ack = InsertAck::new(document.get("_id").unwrap_or(&Bson::Null));
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);

        Ok(ack)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: FieldUpdate,
    ) -> Result<UpdateAck, StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let target = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|it| matches(it, &filter)));

        let document = match target {
            Some(it) => it,
            None => return Ok(UpdateAck::new(0, 0)),
        };

        let modified = match update {
            FieldUpdate::Set(field, value) => {
                let changed = document.get(field) != Some(&value);
                document.insert(field, value);
                changed
            }
            FieldUpdate::Inc(field, by) => {
                let next = match document.get(field) {
                    Some(Bson::Int32(it)) => Bson::Int32(*it + by as i32),
                    Some(Bson::Int64(it)) => Bson::Int64(*it + by),
                    Some(Bson::Double(it)) => Bson::Double(*it + by as f64),
                    _ => Bson::Int64(by),
                };
                document.insert(field, next);
                by != 0
            }
        };

        Ok(UpdateAck::new(1, modified as u64))
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<DeleteAck, StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let documents = match collections.get_mut(collection) {
            Some(it) => it,
            None => return Ok(DeleteAck::new(0)),
        };

        match documents.iter().position(|it| matches(it, &filter)) {
            Some(index) => {
                documents.remove(index);
                Ok(DeleteAck::new(1))
            }
            None => Ok(DeleteAck::new(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[rocket::async_test]
    async fn filters_sorts_and_projects() {
        let store = MemoryStore::new();
        for (name, seats, status) in [("a", 3, "approved"), ("b", 9, "pending"), ("c", 7, "approved")] {
            store
                .insert_one(
                    "classes",
                    doc! { "className": name, "availableSeats": seats, "status": status },
                )
                .await
                .unwrap();
        }

        let found = store
            .find(
                "classes",
                doc! { "status": "approved" },
                FindOptions::default()
                    .sort(doc! { "availableSeats": -1 })
                    .projection(doc! { "className": 1 }),
            )
            .await
            .unwrap();

        let names: Vec<&str> = found.iter().map(|it| it.get_str("className").unwrap()).collect();
        assert_eq!(names, vec!["c", "a"]);
        assert!(found[0].contains_key("_id"));
        assert!(!found[0].contains_key("availableSeats"));
    }

    #[rocket::async_test]
    async fn numeric_filters_ignore_integer_width() {
        let store = MemoryStore::new();
        store
            .insert_one("cart", doc! { "email": "a@x.com", "isEnrolled": 0_i64 })
            .await
            .unwrap();

        let found = store
            .find_one("cart", doc! { "email": "a@x.com", "isEnrolled": 0_i32 }, None)
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
