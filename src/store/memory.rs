use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::model::{Class, Id, Instructor, Organization};
use crate::store::traits::{ClassStore, Gateway, ImageStore, InstructorStore, OrganizationStore};

/// In-process gateway with the same contract as the remote one. Backs tests
/// and local development; nothing here can fail, so every operation reports
/// success.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    organization: RwLock<Option<Organization>>,
    instructors: RwLock<HashMap<Id, Instructor>>,
    classes: RwLock<HashMap<Id, Class>>,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    upload_seq: AtomicU64,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_object_count(&self) -> usize {
        self.objects.read().len()
    }
}

#[async_trait::async_trait]
impl OrganizationStore for MemoryGateway {
    async fn get_organization(&self) -> Option<Organization> {
        self.organization.read().clone()
    }

    async fn put_organization(&self, organization: &Organization) -> bool {
        *self.organization.write() = Some(organization.clone());
        true
    }
}

#[async_trait::async_trait]
impl InstructorStore for MemoryGateway {
    async fn list_instructors(&self) -> Vec<Instructor> {
        self.instructors.read().values().cloned().collect()
    }

    async fn get_instructor(&self, id: &Id) -> Option<Instructor> {
        self.instructors.read().get(id).cloned()
    }

    async fn put_instructor(&self, instructor: &Instructor) -> bool {
        self.instructors
            .write()
            .insert(instructor.id.clone(), instructor.clone());
        true
    }

    async fn update_instructor(&self, id: &Id, instructor: &Instructor) -> bool {
        self.instructors
            .write()
            .insert(id.clone(), instructor.clone());
        true
    }

    async fn delete_instructor(&self, id: &Id) -> bool {
        self.instructors.write().remove(id);
        true
    }
}

#[async_trait::async_trait]
impl ClassStore for MemoryGateway {
    async fn list_classes(&self) -> Vec<Class> {
        let mut classes: Vec<Class> = self.classes.read().values().cloned().collect();
        classes.sort_by_key(|class| class.date);
        classes
    }

    async fn get_class(&self, id: &Id) -> Option<Class> {
        self.classes.read().get(id).cloned()
    }

    async fn put_class(&self, class: &Class) -> bool {
        self.classes.write().insert(class.id.clone(), class.clone());
        true
    }

    async fn update_class(&self, id: &Id, class: &Class) -> bool {
        self.classes.write().insert(id.clone(), class.clone());
        true
    }

    async fn delete_class(&self, id: &Id) -> bool {
        self.classes.write().remove(id);
        true
    }
}

#[async_trait::async_trait]
impl ImageStore for MemoryGateway {
    async fn upload_image(&self, data: &[u8], file_name: &str, folder: &str) -> Option<String> {
        let seq = self.upload_seq.fetch_add(1, Ordering::Relaxed);
        let object = format!("{folder}/{seq}_{file_name}");
        let url = format!("memory://{object}");
        self.objects.write().insert(url.clone(), data.to_vec());
        Some(url)
    }

    async fn upload_images(
        &self,
        files: &[(String, Vec<u8>)],
        folder: &str,
    ) -> Vec<Option<String>> {
        let mut urls = Vec::with_capacity(files.len());
        for (file_name, data) in files {
            urls.push(self.upload_image(data, file_name, folder).await);
        }
        urls
    }

    async fn delete_image(&self, url: &str) -> bool {
        if !url.starts_with("memory://") {
            return true;
        }
        self.objects.write().remove(url);
        true
    }
}

impl Gateway for MemoryGateway {}
