use bson::oid::ObjectId;
use bson::{doc, Bson, Document};

use super::{
    Class, ClassDetails, ClassRecord, ClassStatus, InstructorClass, CLASS_COLLECTION_NAME,
};
use crate::data::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::data::filter;
use crate::data::store::{FieldUpdate, FindOptions, Store};
use crate::error::StoreError;

pub trait ClassDbExt {
    async fn list_classes(&self) -> Result<Vec<Class>, StoreError>;
    async fn list_approved_classes(&self) -> Result<Vec<Class>, StoreError>;
    async fn list_instructor_classes(
        &self,
        email: impl AsRef<str>,
    ) -> Result<Vec<InstructorClass>, StoreError>;
    async fn class_details(&self, id: ObjectId) -> Result<Option<ClassDetails>, StoreError>;

    async fn insert_class(&self, class: &ClassRecord) -> Result<InsertAck, StoreError>;
    async fn set_class_feedback(
        &self,
        id: ObjectId,
        feedback: String,
    ) -> Result<UpdateAck, StoreError>;
    async fn set_class_status(
        &self,
        id: ObjectId,
        status: ClassStatus,
    ) -> Result<UpdateAck, StoreError>;
    async fn take_seat(&self, id: ObjectId) -> Result<UpdateAck, StoreError>;
    async fn delete_class(&self, id: ObjectId) -> Result<DeleteAck, StoreError>;
}

impl ClassDbExt for Store {
    async fn list_classes(&self) -> Result<Vec<Class>, StoreError> {
        self.collection(CLASS_COLLECTION_NAME)
            .find(Document::new(), FindOptions::default())
            .await
    }

    async fn list_approved_classes(&self) -> Result<Vec<Class>, StoreError> {
        self.collection(CLASS_COLLECTION_NAME)
            .find(
                doc! { "status": ClassStatus::Approved },
                FindOptions::default().sort(doc! { "availableSeats": -1 }),
            )
            .await
    }

    async fn list_instructor_classes(
        &self,
        email: impl AsRef<str>,
    ) -> Result<Vec<InstructorClass>, StoreError> {
        let projection = doc! {
            "_id": 1,
            "classImage": 1,
            "className": 1,
            "availableSeats": 1,
            "totalSeats": 1,
            "status": 1,
            "feedback": 1,
        };

        self.collection(CLASS_COLLECTION_NAME)
            .find(
                doc! { "instructorEmail": email.as_ref() },
                FindOptions::default().projection(projection),
            )
            .await
    }

    async fn class_details(&self, id: ObjectId) -> Result<Option<ClassDetails>, StoreError> {
        let projection = doc! {
            "_id": 1,
            "classImage": 1,
            "className": 1,
            "price": 1,
            "status": 1,
            "feedback": 1,
        };

        self.collection(CLASS_COLLECTION_NAME)
            .find_one(filter::by_id(id), Some(projection))
            .await
    }

    async fn insert_class(&self, class: &ClassRecord) -> Result<InsertAck, StoreError> {
        self.collection(CLASS_COLLECTION_NAME).insert_one(class).await
    }

    async fn set_class_feedback(
        &self,
        id: ObjectId,
        feedback: String,
    ) -> Result<UpdateAck, StoreError> {
        self.collection(CLASS_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                FieldUpdate::Set("feedback", Bson::String(feedback)),
            )
            .await
    }

    async fn set_class_status(
        &self,
        id: ObjectId,
        status: ClassStatus,
    ) -> Result<UpdateAck, StoreError> {
        self.collection(CLASS_COLLECTION_NAME)
            .update_one(filter::by_id(id), FieldUpdate::Set("status", status.into()))
            .await
    }

    /// Decrements `availableSeats` by one. There is no floor at zero.
    async fn take_seat(&self, id: ObjectId) -> Result<UpdateAck, StoreError> {
        self.collection(CLASS_COLLECTION_NAME)
            .update_one(filter::by_id(id), FieldUpdate::Inc("availableSeats", -1))
            .await
    }

    async fn delete_class(&self, id: ObjectId) -> Result<DeleteAck, StoreError> {
        self.collection(CLASS_COLLECTION_NAME)
            .delete_one(filter::by_id(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    fn record(name: &str, seats: i64) -> ClassRecord {
        ClassRecord {
            class_name: name.to_string(),
            class_image: format!("{}.png", name),
            instructor_name: None,
            instructor_email: "t@x.com".to_string(),
            price: 10.0,
            available_seats: seats,
            total_seats: seats,
            status: ClassStatus::Pending,
        }
    }

    async fn insert(store: &Store, name: &str, seats: i64) -> ObjectId {
        let ack = store.insert_class(&record(name, seats)).await.unwrap();
        ObjectId::parse_str(ack.inserted_id).unwrap()
    }

    #[rocket::async_test]
    async fn approved_classes_sorted_by_seats() {
        let store = Store::new(MemoryStore::new());
        let few = insert(&store, "few", 2).await;
        let many = insert(&store, "many", 20).await;
        let hidden = insert(&store, "hidden", 50).await;

        store.set_class_status(few, ClassStatus::Approved).await.unwrap();
        store.set_class_status(many, ClassStatus::Approved).await.unwrap();
        store.set_class_status(hidden, ClassStatus::Denied).await.unwrap();

        let approved = store.list_approved_classes().await.unwrap();
        let names: Vec<&str> = approved.iter().map(|it| it.class_name.as_str()).collect();
        assert_eq!(names, vec!["many", "few"]);
        assert!(approved.iter().all(|it| it.status == Some(ClassStatus::Approved)));

        assert_eq!(store.list_classes().await.unwrap().len(), 3);
    }

    #[rocket::async_test]
    async fn stored_classes_without_status_stay_without_status() {
        let store = Store::new(MemoryStore::new());
        store
            .collection(CLASS_COLLECTION_NAME)
            .insert_one(&doc! { "className": "legacy", "availableSeats": 3 })
            .await
            .unwrap();

        let classes = store.list_classes().await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].status, None);

        let listed = serde_json::to_value(&classes[0]).unwrap();
        assert!(listed.get("status").is_none());
        assert_eq!(listed["className"], "legacy");
    }

    #[rocket::async_test]
    async fn taking_seats_goes_below_zero() {
        let store = Store::new(MemoryStore::new());
        let id = insert(&store, "tiny", 1).await;

        for _ in 0..2 {
            assert_eq!(store.take_seat(id).await.unwrap().matched_count, 1);
        }

        let class = store
            .list_classes()
            .await
            .unwrap()
            .into_iter()
            .find(|it| it.id == id)
            .unwrap();
        assert_eq!(class.available_seats, -1);

        let missing = store.take_seat(ObjectId::new()).await.unwrap();
        assert_eq!(missing.matched_count, 0);
    }

    #[rocket::async_test]
    async fn details_and_instructor_projections() {
        let store = Store::new(MemoryStore::new());
        let id = insert(&store, "german", 8).await;
        store
            .set_class_feedback(id, "Add a syllabus".to_string())
            .await
            .unwrap();

        let details = store.class_details(id).await.unwrap().unwrap();
        assert_eq!(details.class_name.as_deref(), Some("german"));
        assert_eq!(details.feedback.as_deref(), Some("Add a syllabus"));
        assert_eq!(details.status, Some(ClassStatus::Pending));

        let mine = store.list_instructor_classes("t@x.com").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].available_seats, Some(8));

        assert!(store
            .list_instructor_classes("other@x.com")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.delete_class(id).await.unwrap().deleted_count, 1);
        assert!(store.class_details(id).await.unwrap().is_none());
    }
}
