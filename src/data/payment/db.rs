use bson::doc;

use super::{NewPayment, PaymentHistoryEntry, PAYMENT_COLLECTION_NAME};
use crate::data::ack::InsertAck;
use crate::data::filter;
use crate::data::store::{FindOptions, Store};
use crate::error::StoreError;

pub trait PaymentDbExt {
    async fn insert_payment(&self, payment: &NewPayment) -> Result<InsertAck, StoreError>;
    async fn payment_history(
        &self,
        email: impl AsRef<str>,
    ) -> Result<Vec<PaymentHistoryEntry>, StoreError>;
}

impl PaymentDbExt for Store {
    async fn insert_payment(&self, payment: &NewPayment) -> Result<InsertAck, StoreError> {
        let ack = self
            .collection(PAYMENT_COLLECTION_NAME)
            .insert_one(payment)
            .await?;
        tracing::info!(
            "Recorded payment {} for {}",
            payment.transaction_id,
            payment.email
        );
        Ok(ack)
    }

    async fn payment_history(
        &self,
        email: impl AsRef<str>,
    ) -> Result<Vec<PaymentHistoryEntry>, StoreError> {
        let projection = doc! {
            "_id": 1,
            "className": 1,
            "price": 1,
            "transactionId": 1,
            "date": 1,
            "status": 1,
        };

        self.collection(PAYMENT_COLLECTION_NAME)
            .find(
                filter::by_email(email),
                FindOptions::default().projection(projection),
            )
            .await
    }
}
