//! The in-memory view of the academy's data and the serialization point for
//! every mutation the admin surface issues.
//!
//! The mode is decided once at startup and held for the whole session: either
//! the remote gateway is reachable (`Connected`) or every mutation applies to
//! the local snapshot only (`Offline`). There is no mid-session re-probe, no
//! queueing of failed writes, and no optimistic-concurrency tokens; the
//! snapshot simply mirrors the store after each successful call, and keeps the
//! user's edit locally when a call fails.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::images::{self, CompressOptions, ImageError};
use crate::model::{Class, Id, Instructor, Organization};
use crate::seed;
use crate::store::{FirestoreGateway, Gateway};

/// Session-permanent connectivity decision.
pub enum Mode {
    Connected(Arc<dyn Gateway>),
    Offline,
}

#[derive(Debug, Clone)]
struct Snapshot {
    organization: Organization,
    instructors: Vec<Instructor>,
    classes: Vec<Class>,
    loading: bool,
}

/// The single owned mutable store behind the whole UI. Readers get cloned
/// snapshots; only methods on this type write.
pub struct DataSync {
    mode: Mode,
    state: RwLock<Snapshot>,
    revision: watch::Sender<u64>,
}

impl DataSync {
    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Self {
        Self::new(Mode::Connected(gateway))
    }

    pub fn offline() -> Self {
        Self::new(Mode::Offline)
    }

    fn new(mode: Mode) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            mode,
            state: RwLock::new(Snapshot {
                organization: seed::default_organization(),
                instructors: Vec::new(),
                classes: Vec::new(),
                loading: true,
            }),
            revision,
        }
    }

    /// Decide the session mode from configuration and perform the startup
    /// load. Gateway construction failure is not fatal: the session runs
    /// offline so the site still renders.
    pub async fn connect(config: &AppConfig) -> Self {
        let sync = if config.firebase.offline {
            log::info!("development flag set: running in offline mode");
            Self::offline()
        } else {
            match FirestoreGateway::new(&config.firebase) {
                Ok(gateway) => Self::with_gateway(Arc::new(gateway)),
                Err(e) => {
                    log::warn!("backend unavailable, running in offline mode: {e:#}");
                    Self::offline()
                }
            }
        };
        sync.load_all().await;
        sync
    }

    /// Startup load: the three collection fetches run concurrently, and each
    /// degrades independently so one bad collection does not blank the others.
    pub async fn load_all(&self) {
        match &self.mode {
            Mode::Connected(gateway) => {
                let (organization, instructors, classes) = tokio::join!(
                    gateway.get_organization(),
                    gateway.list_instructors(),
                    gateway.list_classes(),
                );
                let mut state = self.state.write();
                state.organization = organization.unwrap_or_else(seed::default_organization);
                state.instructors = instructors;
                state.classes = classes;
                state.loading = false;
            }
            Mode::Offline => {
                self.state.write().loading = false;
            }
        }
        self.bump();
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.mode, Mode::Offline)
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Observation surface: receivers wake whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn gateway(&self) -> Option<&Arc<dyn Gateway>> {
        match &self.mode {
            Mode::Connected(gateway) => Some(gateway),
            Mode::Offline => None,
        }
    }

    // ----- reads -----

    pub fn organization(&self) -> Organization {
        self.state.read().organization.clone()
    }

    pub fn instructors(&self) -> Vec<Instructor> {
        self.state.read().instructors.clone()
    }

    pub fn instructor(&self, id: &Id) -> Option<Instructor> {
        self.state
            .read()
            .instructors
            .iter()
            .find(|i| &i.id == id)
            .cloned()
    }

    pub fn classes(&self) -> Vec<Class> {
        self.state.read().classes.clone()
    }

    pub fn class(&self, id: &Id) -> Option<Class> {
        self.state.read().classes.iter().find(|c| &c.id == id).cloned()
    }

    /// Derived list of class start instants, for calendar highlighting.
    pub fn class_schedule(&self) -> Vec<DateTime<Utc>> {
        self.state.read().classes.iter().map(|c| c.date).collect()
    }

    /// Day-level calendar lookup: matches regardless of time-of-day.
    pub fn classes_on_day(&self, day: NaiveDate) -> Vec<Class> {
        self.state
            .read()
            .classes
            .iter()
            .filter(|c| c.is_on_day(day))
            .cloned()
            .collect()
    }

    // ----- mutations -----
    //
    // Uniform protocol: offline applies locally and returns; otherwise the
    // gateway call runs first, a successful create re-syncs the collection
    // from the store, and everything else (success or failure) applies the
    // same mutation to the snapshot so the edit never appears to be lost.

    pub async fn update_organization(&self, organization: Organization) {
        if let Some(gateway) = self.gateway() {
            if !gateway.put_organization(&organization).await {
                log::warn!("organization update not persisted remotely; keeping local copy");
            }
        }
        self.state.write().organization = organization;
        self.bump();
    }

    pub async fn add_instructor(&self, instructor: Instructor) {
        if let Some(gateway) = self.gateway() {
            if gateway.put_instructor(&instructor).await {
                let instructors = gateway.list_instructors().await;
                self.state.write().instructors = instructors;
                self.bump();
                return;
            }
            log::warn!("instructor {} not persisted remotely; keeping local copy", instructor.id);
        }
        self.state.write().instructors.push(instructor);
        self.bump();
    }

    pub async fn update_instructor(&self, id: &Id, instructor: Instructor) {
        if let Some(gateway) = self.gateway() {
            if !gateway.update_instructor(id, &instructor).await {
                log::warn!("instructor {id} update not persisted remotely; keeping local copy");
            }
        }
        {
            let mut state = self.state.write();
            for existing in &mut state.instructors {
                if &existing.id == id {
                    *existing = instructor;
                    break;
                }
            }
        }
        self.bump();
    }

    pub async fn delete_instructor(&self, id: &Id) {
        if let Some(gateway) = self.gateway() {
            if !gateway.delete_instructor(id).await {
                log::warn!("instructor {id} delete not persisted remotely; removing locally");
            }
        }
        self.state.write().instructors.retain(|i| &i.id != id);
        self.bump();
    }

    pub async fn add_class(&self, class: Class) {
        if let Some(gateway) = self.gateway() {
            if gateway.put_class(&class).await {
                let classes = gateway.list_classes().await;
                self.state.write().classes = classes;
                self.bump();
                return;
            }
            log::warn!("class {} not persisted remotely; keeping local copy", class.id);
        }
        self.state.write().classes.push(class);
        self.bump();
    }

    pub async fn update_class(&self, id: &Id, class: Class) {
        if let Some(gateway) = self.gateway() {
            if !gateway.update_class(id, &class).await {
                log::warn!("class {id} update not persisted remotely; keeping local copy");
            }
        }
        {
            let mut state = self.state.write();
            for existing in &mut state.classes {
                if &existing.id == id {
                    *existing = class;
                    break;
                }
            }
        }
        self.bump();
    }

    pub async fn delete_class(&self, id: &Id) {
        if let Some(gateway) = self.gateway() {
            if !gateway.delete_class(id).await {
                log::warn!("class {id} delete not persisted remotely; removing locally");
            }
        }
        self.state.write().classes.retain(|c| &c.id != id);
        self.bump();
    }

    /// Raise enrollment by one. Out-of-range moves are silently rejected;
    /// in-range moves persist through the uniform update path. Returns the
    /// class as the snapshot now holds it, `None` for an unknown id.
    pub async fn increment_participants(&self, id: &Id) -> Option<Class> {
        self.adjust_participants(id, 1).await
    }

    /// Lower enrollment by one, with the same silent-reject rule.
    pub async fn decrement_participants(&self, id: &Id) -> Option<Class> {
        self.adjust_participants(id, -1).await
    }

    async fn adjust_participants(&self, id: &Id, delta: i64) -> Option<Class> {
        let current = self.class(id)?;
        match current.with_enrollment_delta(delta) {
            Some(updated) => {
                self.update_class(id, updated.clone()).await;
                Some(updated)
            }
            // No-op, not clamped and not an error.
            None => Some(current),
        }
    }

    // ----- images -----

    /// Put an image where the session can reach it: the blob store when
    /// connected, an inline data URL otherwise (and as the fallback when the
    /// upload fails).
    pub async fn store_image(
        &self,
        data: &[u8],
        file_name: &str,
        folder: &str,
    ) -> Result<String, ImageError> {
        if let Some(gateway) = self.gateway() {
            if let Some(url) = gateway.upload_image(data, file_name, folder).await {
                return Ok(url);
            }
            log::warn!("image upload failed; falling back to inline encoding");
        }
        images::compress_image(data, &CompressOptions::default())
    }

    /// Batch variant: each file lands in the blob store when its upload
    /// succeeds, and falls back to inline encoding individually otherwise,
    /// so a partial failure does not orphan the blobs that did upload.
    pub async fn store_images(
        &self,
        files: &[(String, Vec<u8>)],
        folder: &str,
    ) -> Vec<String> {
        let uploaded = match self.gateway() {
            Some(gateway) => {
                let uploaded = gateway.upload_images(files, folder).await;
                if uploaded.iter().any(Option::is_none) {
                    log::warn!("some image uploads failed; encoding those files inline");
                }
                uploaded
            }
            None => vec![None; files.len()],
        };

        let options = CompressOptions::default();
        let mut urls = Vec::with_capacity(files.len());
        for ((_, data), slot) in files.iter().zip(uploaded) {
            match slot {
                Some(url) => urls.push(url),
                None => match images::compress_image(data, &options) {
                    Ok(url) => urls.push(url),
                    Err(e) => log::warn!("skipping image that could not be encoded: {e}"),
                },
            }
        }
        urls
    }

    pub async fn remove_image(&self, url: &str) -> bool {
        match self.gateway() {
            Some(gateway) => gateway.delete_image(url).await,
            None => true,
        }
    }
}
