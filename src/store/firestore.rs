use anyhow::{bail, Context, Result};
use chrono::Utc;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::FirebaseConfig;
use crate::model::{Class, Id, Instructor, Organization};
use crate::store::codec;
use crate::store::traits::{ClassStore, Gateway, ImageStore, InstructorStore, OrganizationStore};

const ORGANIZATION_COLLECTION: &str = "organization";
const ORGANIZATION_KEY: &str = "main";
const INSTRUCTORS_COLLECTION: &str = "instructors";
const CLASSES_COLLECTION: &str = "classes";

/// Gateway against the hosted Firestore document store and Firebase Storage
/// blob store, over their REST endpoints.
#[derive(Debug, Clone)]
pub struct FirestoreGateway {
    http: Client,
    project_id: String,
    storage_bucket: String,
    api_key: String,
}

impl FirestoreGateway {
    /// Build a gateway for the configured project. Fails when the project is
    /// not configured at all, which the caller treats as "run offline".
    pub fn new(config: &FirebaseConfig) -> Result<Self> {
        if config.project_id.is_empty() || config.storage_bucket.is_empty() {
            bail!("firebase project is not configured");
        }
        let http = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            project_id: config.project_id.clone(),
            storage_bucket: config.storage_bucket.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url(), collection, id)
    }

    async fn fetch_document(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let response = self
            .http
            .get(self.document_url(collection, id))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("document fetch failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = response
            .error_for_status()
            .context("document fetch rejected")?
            .json()
            .await
            .context("malformed document response")?;
        Ok(Some(document))
    }

    /// PATCH the document body. Without a mask this replaces the document
    /// (creating it when absent); with a mask only the named fields merge.
    async fn write_document(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        mask: Option<&[&str]>,
    ) -> Result<()> {
        let mut query: Vec<(String, String)> = vec![("key".to_string(), self.api_key.clone())];
        if let Some(paths) = mask {
            for path in paths {
                query.push(("updateMask.fieldPaths".to_string(), (*path).to_string()));
            }
        }

        self.http
            .patch(self.document_url(collection, id))
            .query(&query)
            .json(&document)
            .send()
            .await
            .context("document write failed")?
            .error_for_status()
            .context("document write rejected")?;
        Ok(())
    }

    async fn remove_document(&self, collection: &str, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.document_url(collection, id))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("document delete failed")?;

        // Removing a document that never existed still counts as success.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response
            .error_for_status()
            .context("document delete rejected")?;
        Ok(())
    }

    /// Fetch the whole collection, following `nextPageToken` until the
    /// listing is exhausted.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> =
                vec![("key", self.api_key.as_str()), ("pageSize", "300")];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.as_str()));
            }

            let listing: Value = self
                .http
                .get(&url)
                .query(&query)
                .send()
                .await
                .context("collection fetch failed")?
                .error_for_status()
                .context("collection fetch rejected")?
                .json()
                .await
                .context("malformed collection response")?;

            page_token = collect_page(&listing, &mut documents);
            if page_token.is_none() {
                return Ok(documents);
            }
        }
    }

    async fn query_ordered(&self, collection: &str, order_field: &str) -> Result<Vec<Value>> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": order_field },
                    "direction": "ASCENDING"
                }]
            }
        });

        let rows: Value = self
            .http
            .post(format!("{}:runQuery", self.documents_url()))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("query failed")?
            .error_for_status()
            .context("query rejected")?
            .json()
            .await
            .context("malformed query response")?;

        // runQuery streams one entry per result; entries without a document
        // only carry a read time.
        Ok(rows
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("document").cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn decode<T: DeserializeOwned>(document: &Value) -> Result<T> {
        serde_json::from_value(codec::from_document(document))
            .context("document does not match entity shape")
    }

    async fn fetch_entity<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>> {
        match self.fetch_document(collection, id).await? {
            Some(document) => Ok(Some(Self::decode(&document)?)),
            None => Ok(None),
        }
    }

    /// Create-or-replace under the entity's own id.
    async fn put_entity(
        &self,
        collection: &str,
        id: &str,
        entity: &Value,
        timestamp_fields: &[&str],
    ) -> Result<()> {
        let document = codec::to_document(entity, timestamp_fields);
        self.write_document(collection, id, document, None).await
    }

    /// Upsert: merge fields into an existing document, or create one. The
    /// mask names the entity's full field set, not just the fields present in
    /// the payload: a masked field with no payload value is deleted, which is
    /// what keeps a cleared optional from resurrecting the stored value.
    async fn update_entity(
        &self,
        collection: &str,
        id: &str,
        entity: &Value,
        timestamp_fields: &[&str],
        field_paths: &'static [&'static str],
    ) -> Result<()> {
        let document = codec::to_document(entity, timestamp_fields);
        let mask = match self.fetch_document(collection, id).await? {
            Some(_) => Some(field_paths),
            None => None,
        };
        self.write_document(collection, id, document, mask).await
    }

    fn object_url(&self, object: &str) -> String {
        format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o/{}",
            self.storage_bucket,
            object.replace('/', "%2F")
        )
    }

    async fn upload_object(&self, data: &[u8], file_name: &str, folder: &str) -> Result<String> {
        let object = format!("{}/{}_{}", folder, Utc::now().timestamp_millis(), file_name);
        let upload_url = format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o",
            self.storage_bucket
        );

        let metadata: Value = self
            .http
            .post(&upload_url)
            .query(&[("name", object.as_str()), ("key", self.api_key.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await
            .context("image upload failed")?
            .error_for_status()
            .context("image upload rejected")?
            .json()
            .await
            .context("malformed upload response")?;

        let token = metadata
            .get("downloadTokens")
            .and_then(Value::as_str)
            .and_then(|tokens| tokens.split(',').next())
            .unwrap_or_default()
            .to_string();

        Ok(format!(
            "{}?alt=media&token={}",
            self.object_url(&object),
            token
        ))
    }

    async fn delete_object(&self, url: &str) -> Result<()> {
        // The download URL already carries the encoded object path; strip the
        // query and issue the delete against the same resource.
        let object_url = url.split('?').next().unwrap_or(url);
        let response = self
            .http
            .delete(object_url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .context("image delete failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response
            .error_for_status()
            .context("image delete rejected")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrganizationStore for FirestoreGateway {
    async fn get_organization(&self) -> Option<Organization> {
        match self
            .fetch_entity(ORGANIZATION_COLLECTION, ORGANIZATION_KEY)
            .await
        {
            Ok(organization) => organization,
            Err(e) => {
                log::error!("failed to fetch organization: {e:#}");
                None
            }
        }
    }

    async fn put_organization(&self, organization: &Organization) -> bool {
        let result = async {
            let plain = serde_json::to_value(organization)?;
            self.put_entity(ORGANIZATION_COLLECTION, ORGANIZATION_KEY, &plain, &[])
                .await
        };
        match result.await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to update organization: {e:#}");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl InstructorStore for FirestoreGateway {
    async fn list_instructors(&self) -> Vec<Instructor> {
        let result = async {
            let documents = self.list_documents(INSTRUCTORS_COLLECTION).await?;
            documents
                .iter()
                .map(Self::decode)
                .collect::<Result<Vec<Instructor>>>()
        };
        match result.await {
            Ok(instructors) => instructors,
            Err(e) => {
                log::error!("failed to list instructors: {e:#}");
                Vec::new()
            }
        }
    }

    async fn get_instructor(&self, id: &Id) -> Option<Instructor> {
        match self.fetch_entity(INSTRUCTORS_COLLECTION, id).await {
            Ok(instructor) => instructor,
            Err(e) => {
                log::error!("failed to fetch instructor {id}: {e:#}");
                None
            }
        }
    }

    async fn put_instructor(&self, instructor: &Instructor) -> bool {
        let result = async {
            let plain = serde_json::to_value(instructor)?;
            self.put_entity(INSTRUCTORS_COLLECTION, &instructor.id, &plain, &[])
                .await
        };
        match result.await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to add instructor {}: {e:#}", instructor.id);
                false
            }
        }
    }

    async fn update_instructor(&self, id: &Id, instructor: &Instructor) -> bool {
        let result = async {
            let plain = serde_json::to_value(instructor)?;
            self.update_entity(INSTRUCTORS_COLLECTION, id, &plain, &[], Instructor::FIELD_PATHS)
                .await
        };
        match result.await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to update instructor {id}: {e:#}");
                false
            }
        }
    }

    async fn delete_instructor(&self, id: &Id) -> bool {
        match self.remove_document(INSTRUCTORS_COLLECTION, id).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to delete instructor {id}: {e:#}");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl ClassStore for FirestoreGateway {
    async fn list_classes(&self) -> Vec<Class> {
        let result = async {
            let documents = self.query_ordered(CLASSES_COLLECTION, "date").await?;
            documents
                .iter()
                .map(Self::decode)
                .collect::<Result<Vec<Class>>>()
        };
        match result.await {
            Ok(classes) => classes,
            Err(e) => {
                log::error!("failed to list classes: {e:#}");
                Vec::new()
            }
        }
    }

    async fn get_class(&self, id: &Id) -> Option<Class> {
        match self.fetch_entity(CLASSES_COLLECTION, id).await {
            Ok(class) => class,
            Err(e) => {
                log::error!("failed to fetch class {id}: {e:#}");
                None
            }
        }
    }

    async fn put_class(&self, class: &Class) -> bool {
        let result = async {
            let plain = serde_json::to_value(class)?;
            self.put_entity(CLASSES_COLLECTION, &class.id, &plain, &["date"])
                .await
        };
        match result.await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to add class {}: {e:#}", class.id);
                false
            }
        }
    }

    async fn update_class(&self, id: &Id, class: &Class) -> bool {
        let result = async {
            let plain = serde_json::to_value(class)?;
            self.update_entity(CLASSES_COLLECTION, id, &plain, &["date"], Class::FIELD_PATHS)
                .await
        };
        match result.await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to update class {id}: {e:#}");
                false
            }
        }
    }

    async fn delete_class(&self, id: &Id) -> bool {
        match self.remove_document(CLASSES_COLLECTION, id).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to delete class {id}: {e:#}");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for FirestoreGateway {
    async fn upload_image(&self, data: &[u8], file_name: &str, folder: &str) -> Option<String> {
        match self.upload_object(data, file_name, folder).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("failed to upload image {folder}/{file_name}: {e:#}");
                None
            }
        }
    }

    async fn upload_images(&self, files: &[(String, Vec<u8>)], folder: &str) -> Vec<Option<String>> {
        let uploads = files
            .iter()
            .map(|(file_name, data)| self.upload_image(data, file_name, folder));
        join_all(uploads).await
    }

    async fn delete_image(&self, url: &str) -> bool {
        // Inline-encoded images never reach the blob store; skip them.
        if !url.contains("firebasestorage") {
            return true;
        }
        match self.delete_object(url).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to delete image {url}: {e:#}");
                false
            }
        }
    }
}

impl Gateway for FirestoreGateway {}

/// Append one listing page's documents and hand back the continuation token,
/// `None` when the listing is exhausted.
fn collect_page(listing: &Value, documents: &mut Vec<Value>) -> Option<String> {
    if let Some(page) = listing.get("documents").and_then(Value::as_array) {
        documents.extend(page.iter().cloned());
    }
    listing
        .get("nextPageToken")
        .and_then(Value::as_str)
        .map(str::to_string)
}
