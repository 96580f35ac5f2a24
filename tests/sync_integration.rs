use std::sync::Arc;

use chrono::NaiveDate;
use replay_academy::model::{Class, Id, Instructor, Organization};
use replay_academy::store::{
    ClassStore, Gateway, ImageStore, InstructorStore, MemoryGateway, OrganizationStore,
};
use replay_academy::sync::DataSync;

fn instructor(id: &str, name: &str) -> Instructor {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "bio": "Certified coach",
        "images": [],
        "specialties": ["yoga"],
        "experience": "5 years"
    }))
    .unwrap()
}

fn class(id: &str, date: &str, current: u32, max: u32) -> Class {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": "Morning Pilates",
        "description": "Mat pilates",
        "instructor": "Kim",
        "date": date,
        "duration": 60,
        "maxParticipants": max,
        "currentParticipants": current
    }))
    .unwrap()
}

/// Gateway that is reachable but reports failure for every write and returns
/// nothing for every read, to exercise the optimistic local-apply path.
#[derive(Default)]
struct FailingGateway;

#[async_trait::async_trait]
impl OrganizationStore for FailingGateway {
    async fn get_organization(&self) -> Option<Organization> {
        None
    }
    async fn put_organization(&self, _organization: &Organization) -> bool {
        false
    }
}

#[async_trait::async_trait]
impl InstructorStore for FailingGateway {
    async fn list_instructors(&self) -> Vec<Instructor> {
        Vec::new()
    }
    async fn get_instructor(&self, _id: &Id) -> Option<Instructor> {
        None
    }
    async fn put_instructor(&self, _instructor: &Instructor) -> bool {
        false
    }
    async fn update_instructor(&self, _id: &Id, _instructor: &Instructor) -> bool {
        false
    }
    async fn delete_instructor(&self, _id: &Id) -> bool {
        false
    }
}

#[async_trait::async_trait]
impl ClassStore for FailingGateway {
    async fn list_classes(&self) -> Vec<Class> {
        Vec::new()
    }
    async fn get_class(&self, _id: &Id) -> Option<Class> {
        None
    }
    async fn put_class(&self, _class: &Class) -> bool {
        false
    }
    async fn update_class(&self, _id: &Id, _class: &Class) -> bool {
        false
    }
    async fn delete_class(&self, _id: &Id) -> bool {
        false
    }
}

#[async_trait::async_trait]
impl ImageStore for FailingGateway {
    async fn upload_image(&self, _data: &[u8], _file_name: &str, _folder: &str) -> Option<String> {
        None
    }
    async fn upload_images(
        &self,
        files: &[(String, Vec<u8>)],
        _folder: &str,
    ) -> Vec<Option<String>> {
        vec![None; files.len()]
    }
    async fn delete_image(&self, _url: &str) -> bool {
        false
    }
}

impl Gateway for FailingGateway {}

/// Memory-backed gateway that refuses uploads for file names starting with
/// `drop-`, to exercise partial batch-upload failure.
struct PartialUploadGateway {
    inner: MemoryGateway,
}

#[async_trait::async_trait]
impl OrganizationStore for PartialUploadGateway {
    async fn get_organization(&self) -> Option<Organization> {
        self.inner.get_organization().await
    }
    async fn put_organization(&self, organization: &Organization) -> bool {
        self.inner.put_organization(organization).await
    }
}

#[async_trait::async_trait]
impl InstructorStore for PartialUploadGateway {
    async fn list_instructors(&self) -> Vec<Instructor> {
        self.inner.list_instructors().await
    }
    async fn get_instructor(&self, id: &Id) -> Option<Instructor> {
        self.inner.get_instructor(id).await
    }
    async fn put_instructor(&self, instructor: &Instructor) -> bool {
        self.inner.put_instructor(instructor).await
    }
    async fn update_instructor(&self, id: &Id, instructor: &Instructor) -> bool {
        self.inner.update_instructor(id, instructor).await
    }
    async fn delete_instructor(&self, id: &Id) -> bool {
        self.inner.delete_instructor(id).await
    }
}

#[async_trait::async_trait]
impl ClassStore for PartialUploadGateway {
    async fn list_classes(&self) -> Vec<Class> {
        self.inner.list_classes().await
    }
    async fn get_class(&self, id: &Id) -> Option<Class> {
        self.inner.get_class(id).await
    }
    async fn put_class(&self, class: &Class) -> bool {
        self.inner.put_class(class).await
    }
    async fn update_class(&self, id: &Id, class: &Class) -> bool {
        self.inner.update_class(id, class).await
    }
    async fn delete_class(&self, id: &Id) -> bool {
        self.inner.delete_class(id).await
    }
}

#[async_trait::async_trait]
impl ImageStore for PartialUploadGateway {
    async fn upload_image(&self, data: &[u8], file_name: &str, folder: &str) -> Option<String> {
        if file_name.starts_with("drop-") {
            return None;
        }
        self.inner.upload_image(data, file_name, folder).await
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
        self.inner.delete_image(url).await
    }
}

impl Gateway for PartialUploadGateway {}

#[tokio::test]
async fn startup_load_populates_snapshot_from_store() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.put_instructor(&instructor("1", "Kim")).await;
    gateway
        .put_class(&class("10", "2024-05-10T14:00:00Z", 0, 10))
        .await;

    let sync = DataSync::with_gateway(gateway);
    assert!(sync.is_loading());
    sync.load_all().await;

    assert!(!sync.is_loading());
    assert!(!sync.is_offline());
    assert_eq!(sync.instructors().len(), 1);
    assert_eq!(sync.classes().len(), 1);
    // No stored profile yet, so the default record fills in.
    assert_eq!(sync.organization().name, "re: Play");
}

#[tokio::test]
async fn offline_mutations_apply_immediately_without_network() {
    let sync = DataSync::offline();
    sync.load_all().await;
    assert!(sync.is_offline());

    sync.add_instructor(instructor("1", "A")).await;
    let listed = sync.instructors();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "A");

    sync.delete_instructor(&"1".to_string()).await;
    assert!(sync.instructors().is_empty());
}

#[tokio::test]
async fn create_resyncs_collection_from_store() {
    let gateway = Arc::new(MemoryGateway::new());
    let sync = DataSync::with_gateway(gateway.clone());
    sync.load_all().await;

    // Created out of order; the post-create re-fetch replaces the snapshot
    // with the store's ordering.
    sync.add_class(class("2", "2024-05-11T10:00:00Z", 0, 10)).await;
    sync.add_class(class("1", "2024-05-10T10:00:00Z", 0, 10)).await;

    let ids: Vec<Id> = sync.classes().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn snapshot_mirrors_store_after_each_mutation() {
    let gateway = Arc::new(MemoryGateway::new());
    let sync = DataSync::with_gateway(gateway.clone());
    sync.load_all().await;

    sync.add_class(class("1", "2024-05-10T10:00:00Z", 2, 10)).await;
    sync.update_class(&"1".to_string(), class("1", "2024-05-10T10:00:00Z", 3, 10))
        .await;
    assert_eq!(sync.classes(), gateway.list_classes().await);
    assert_eq!(
        gateway
            .get_class(&"1".to_string())
            .await
            .unwrap()
            .current_participants,
        3
    );

    sync.delete_class(&"1".to_string()).await;
    assert_eq!(sync.classes(), gateway.list_classes().await);
    assert!(sync.classes().is_empty());
}

#[tokio::test]
async fn failed_remote_writes_still_apply_locally() {
    let sync = DataSync::with_gateway(Arc::new(FailingGateway));
    sync.load_all().await;
    assert!(!sync.is_offline());

    // Create fails remotely; the edit must still appear.
    sync.add_instructor(instructor("1", "Kim")).await;
    assert_eq!(sync.instructors().len(), 1);

    // Update reports failure; the attempted update is reflected anyway.
    sync.update_instructor(&"1".to_string(), instructor("1", "Lee"))
        .await;
    assert_eq!(sync.instructors()[0].name, "Lee");

    sync.delete_instructor(&"1".to_string()).await;
    assert!(sync.instructors().is_empty());
}

#[tokio::test]
async fn failed_organization_update_keeps_local_copy() {
    let sync = DataSync::with_gateway(Arc::new(FailingGateway));
    sync.load_all().await;

    let mut organization = sync.organization();
    organization.name = "re: Play Studio".to_string();
    sync.update_organization(organization).await;
    assert_eq!(sync.organization().name, "re: Play Studio");
}

#[tokio::test]
async fn enrollment_clamps_by_silent_rejection() {
    let sync = DataSync::offline();
    sync.load_all().await;
    let id: Id = "1".to_string();
    sync.add_class(class("1", "2024-05-10T10:00:00Z", 5, 10)).await;

    for _ in 0..6 {
        sync.increment_participants(&id).await;
    }
    assert_eq!(sync.class(&id).unwrap().current_participants, 10);

    // Seventh increment is a no-op, not an error and not a clamp.
    let after = sync.increment_participants(&id).await.unwrap();
    assert_eq!(after.current_participants, 10);

    sync.update_class(&id, class("1", "2024-05-10T10:00:00Z", 0, 10))
        .await;
    let after = sync.decrement_participants(&id).await.unwrap();
    assert_eq!(after.current_participants, 0);

    assert_eq!(sync.increment_participants(&"missing".to_string()).await, None);
}

#[tokio::test]
async fn day_level_lookup_ignores_time_of_day() {
    let sync = DataSync::offline();
    sync.load_all().await;
    sync.add_class(class("1", "2024-05-10T14:00:00Z", 0, 10)).await;
    sync.add_class(class("2", "2024-06-01T09:00:00Z", 0, 10)).await;

    let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    let matched = sync.classes_on_day(day);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].id, "1");

    assert_eq!(sync.class_schedule().len(), 2);
}

#[tokio::test]
async fn subscribers_wake_on_every_mutation() {
    let sync = DataSync::offline();
    let mut revisions = sync.subscribe();
    sync.load_all().await;
    assert!(revisions.has_changed().unwrap());
    revisions.borrow_and_update();

    sync.add_instructor(instructor("1", "Kim")).await;
    assert!(revisions.has_changed().unwrap());
}

#[tokio::test]
async fn connected_images_go_to_blob_store_offline_images_inline() {
    let gateway = Arc::new(MemoryGateway::new());
    let sync = DataSync::with_gateway(gateway.clone());
    sync.load_all().await;

    let png = sample_png();
    let url = sync.store_image(&png, "a.png", "instructors").await.unwrap();
    assert!(url.starts_with("memory://instructors/"));
    assert_eq!(gateway.stored_object_count(), 1);
    assert!(sync.remove_image(&url).await);
    assert_eq!(gateway.stored_object_count(), 0);

    let offline = DataSync::offline();
    offline.load_all().await;
    let inline = offline.store_image(&png, "a.png", "instructors").await.unwrap();
    assert!(inline.starts_with("data:image/jpeg;base64,"));
    // Removing an inline reference is a no-op success.
    assert!(offline.remove_image(&inline).await);

    let files = vec![("a.png".to_string(), png.clone()), ("b.png".to_string(), png)];
    let urls = offline.store_images(&files, "classes").await;
    assert_eq!(urls.len(), 2);
    assert!(urls.iter().all(|u| u.starts_with("data:image/jpeg;base64,")));
}

#[tokio::test]
async fn partial_upload_failure_keeps_successful_blobs() {
    let gateway = Arc::new(PartialUploadGateway {
        inner: MemoryGateway::new(),
    });
    let sync = DataSync::with_gateway(gateway.clone());
    sync.load_all().await;

    let png = sample_png();
    let files = vec![
        ("a.png".to_string(), png.clone()),
        ("drop-b.png".to_string(), png),
    ];
    let urls = sync.store_images(&files, "classes").await;

    // The upload that succeeded stays a blob URL; only the failed file is
    // re-encoded inline.
    assert_eq!(urls.len(), 2);
    assert!(urls[0].starts_with("memory://classes/"));
    assert!(urls[1].starts_with("data:image/jpeg;base64,"));
    assert_eq!(gateway.inner.stored_object_count(), 1);
}

fn sample_png() -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    let img = RgbImage::from_pixel(64, 48, image::Rgb([120, 30, 200]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}
