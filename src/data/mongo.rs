use bson::{doc, Document};
use mongodb::options::{
    ClientOptions, Credential, FindOneOptions, FindOptions as MongoFindOptions, ServerApi,
    ServerApiVersion,
};
use mongodb::{Client, Database};
use rocket::futures::TryStreamExt;

use super::ack::{DeleteAck, InsertAck, UpdateAck};
use super::store::{DocumentStore, FieldUpdate, FindOptions};
use crate::config::Config;
use crate::error::StoreError;

/// [`DocumentStore`] backed by a MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Builds the client; no connection is made until the first operation.
    pub async fn connect(config: &Config) -> Result<MongoStore, mongodb::error::Error> {
        let mut options = ClientOptions::parse(config.mongodb_uri.as_str()).await?;
        options.app_name = Some("summer-camp".to_string());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        if let (Some(user), Some(pass)) = (&config.db_user, &config.db_pass) {
            tracing::info!("Using MongoDB credentials for user: {}", user);
            options.credential = Some(
                Credential::builder()
                    .username(user.clone())
                    .password(pass.reveal().to_string())
                    .build(),
            );
        }

        let client = Client::with_options(options)?;
        tracing::info!("Using MongoDB database: {}", config.mongodb_db);
        let db = client.database(config.mongodb_db.as_str());

        Ok(MongoStore { client, db })
    }
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let find_options = MongoFindOptions::builder()
            .projection(options.projection)
            .sort(options.sort)
            .build();

        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(filter, find_options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOneOptions::builder().projection(projection).build();

        Ok(self
            .db
            .collection::<Document>(collection)
            .find_one(filter, options)
            .await?)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<InsertAck, StoreError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document, None)
            .await?;

        Ok(result.into())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: FieldUpdate,
    ) -> Result<UpdateAck, StoreError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .update_one(filter, update.to_document(), None)
            .await?;

        Ok(result.into())
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<DeleteAck, StoreError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .delete_one(filter, None)
            .await?;

        Ok(result.into())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB client...");
        self.client.clone().shutdown().await;
    }
}
