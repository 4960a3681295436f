use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AppError, AppResult};
use crate::domain::*;
use crate::ports::{Notification, Notifier, ResourceStore, StorageError};

pub const MSG_RESOURCE_DELETED: &str = "Resource deleted successfully!";

/// Resources of every user live in one stored list; this service only ever
/// shows and touches the session user's share of it. Changes are applied
/// in memory first and then written through to the store.
pub struct ResourceService {
    store: Arc<dyn ResourceStore>,
    notifier: Arc<dyn Notifier>,
    session: Session,
    all: RwLock<Vec<Resource>>,
}

impl ResourceService {
    pub async fn load(
        store: Arc<dyn ResourceStore>,
        notifier: Arc<dyn Notifier>,
        session: Session,
    ) -> Self {
        let all = store.load_all().await;
        tracing::debug!("Loaded {} stored resources", all.len());

        Self {
            store,
            notifier,
            session,
            all: RwLock::new(all),
        }
    }

    /// The session user's resources, in insertion order.
    pub async fn list(&self) -> Vec<Resource> {
        filter_by_user(&self.all.read().await, &self.session.username)
    }

    pub async fn get(&self, id: ResourceId) -> Option<Resource> {
        self.all
            .read()
            .await
            .iter()
            .find(|r| r.id == id && r.username == self.session.username)
            .cloned()
    }

    /// Like [`get`](Self::get), but a miss is reported to the user.
    pub async fn show(&self, id: ResourceId) -> AppResult<Resource> {
        match self.get(id).await {
            Some(resource) => Ok(resource),
            None => Err(self.not_found(id)),
        }
    }

    pub async fn add_youtube(&self, link: &str) -> AppResult<Resource> {
        match ResourceDraft::youtube(link) {
            Ok(draft) => self.add(draft).await,
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    pub async fn add_file(&self, path: &Path) -> AppResult<Resource> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = StorageError::Read(format!("{}: {e}", path.display()));
                self.notifier.notify(Notification::error(err.to_string()));
                return Err(err.into());
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.add(ResourceDraft::file(&name, guess_mime(&name), &bytes))
            .await
    }

    /// Stamps and stores a draft. A failed write is reported, but the
    /// resource stays in memory for the rest of the session.
    pub async fn add(&self, draft: ResourceDraft) -> AppResult<Resource> {
        let mut all = self.all.write().await;

        let mut id = ResourceId::generate();
        if let Some(max) = all.iter().map(|r| r.id).max() {
            if id <= max {
                id = ResourceId(max.0 + 1);
            }
        }

        let resource = draft.stamp(id, &self.session.username, Utc::now());
        all.push(resource.clone());
        tracing::info!("Added {} resource {}", resource.kind.type_name(), resource.id);

        self.write_through(&all).await?;
        self.notifier.notify(Notification::success(format!(
            "{} added successfully!",
            capitalize(resource.kind.type_name())
        )));
        Ok(resource)
    }

    pub async fn delete(&self, id: ResourceId) -> AppResult<()> {
        let mut all = self.all.write().await;

        let before = all.len();
        all.retain(|r| !(r.id == id && r.username == self.session.username));
        if all.len() == before {
            return Err(self.not_found(id));
        }
        tracing::info!("Deleted resource {}", id);

        self.write_through(&all).await?;
        self.notifier
            .notify(Notification::success(MSG_RESOURCE_DELETED));
        Ok(())
    }

    fn not_found(&self, id: ResourceId) -> AppError {
        self.notifier
            .notify(Notification::error(format!("Resource {id} not found")));
        AppError::ResourceNotFound(id)
    }

    async fn write_through(&self, all: &[Resource]) -> AppResult<()> {
        if let Err(e) = self.store.persist(all).await {
            tracing::error!("Failed to persist resources: {}", e);
            self.notifier
                .notify(Notification::error(format!("Could not save resources: {e}")));
            return Err(e.into());
        }
        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
