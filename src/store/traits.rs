use crate::model::{Class, Id, Instructor, Organization};

/// One round trip per call, no batching, no cross-entity transactions, no
/// retries. Transport failures never escape a gateway: reads degrade to
/// empty/`None` and writes report `false`, logged at the implementation.
#[async_trait::async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Fetch the singleton profile; `None` when the document does not exist.
    async fn get_organization(&self) -> Option<Organization>;
    /// Replace the singleton wholesale.
    async fn put_organization(&self, organization: &Organization) -> bool;
}

#[async_trait::async_trait]
pub trait InstructorStore: Send + Sync {
    async fn list_instructors(&self) -> Vec<Instructor>;
    async fn get_instructor(&self, id: &Id) -> Option<Instructor>;
    /// Write under the entity's own id; a duplicate id silently overwrites.
    async fn put_instructor(&self, instructor: &Instructor) -> bool;
    /// Upsert: merge into the existing document, or create when absent.
    async fn update_instructor(&self, id: &Id, instructor: &Instructor) -> bool;
    /// Deleting an id that never existed is still success.
    async fn delete_instructor(&self, id: &Id) -> bool;
}

#[async_trait::async_trait]
pub trait ClassStore: Send + Sync {
    /// Whole collection, ordered by scheduled start instant ascending.
    async fn list_classes(&self) -> Vec<Class>;
    async fn get_class(&self, id: &Id) -> Option<Class>;
    async fn put_class(&self, class: &Class) -> bool;
    async fn update_class(&self, id: &Id, class: &Class) -> bool;
    async fn delete_class(&self, id: &Id) -> bool;
}

#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Store under `folder/<millis>_<file_name>`; returns the download URL.
    async fn upload_image(&self, data: &[u8], file_name: &str, folder: &str) -> Option<String>;
    /// Concurrent uploads, one result per input file in order; a failed
    /// upload yields `None` at its position.
    async fn upload_images(&self, files: &[(String, Vec<u8>)], folder: &str)
        -> Vec<Option<String>>;
    /// No-op success when the reference is not a blob-store URL (e.g. an
    /// inline data URL).
    async fn delete_image(&self, url: &str) -> bool;
}

pub trait Gateway: OrganizationStore + InstructorStore + ClassStore + ImageStore {}
