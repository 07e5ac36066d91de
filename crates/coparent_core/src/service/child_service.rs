//! Children registry and memory journal use-cases.
//!
//! # Invariants
//! - Journal entries can only be attached to the acting user's children.
//! - A photo upload whose entry cannot be stored is removed again.

use crate::capability::{AuthProvider, FileStore};
use crate::model::child::{Child, ChildId, MemoryEntry, MemoryEntryId, MemoryEntryType, NewMemoryEntry};
use crate::model::UserId;
use crate::repo::child_repo::ChildRepository;
use crate::service::{require_user, ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::{info, warn};
use uuid::Uuid;

pub struct ChildService<R: ChildRepository, A: AuthProvider> {
    repo: R,
    auth: A,
}

impl<R: ChildRepository, A: AuthProvider> ChildService<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self { repo, auth }
    }

    pub fn add_child(&self, name: &str, date_of_birth: Option<NaiveDate>) -> ServiceResult<Child> {
        let owner = require_user(&self.auth)?;
        let child = Child::new(owner, name, date_of_birth)?;
        self.repo.create_child(&child)?;
        info!("event=child_create module=service status=ok child_id={}", child.id);
        Ok(child)
    }

    /// Newest first.
    pub fn list_children(&self) -> ServiceResult<Vec<Child>> {
        let owner = require_user(&self.auth)?;
        Ok(self.repo.list_children(owner)?)
    }
}

/// Photo bytes plus the original file name (used for the extension).
#[derive(Debug, Clone, Copy)]
pub struct PhotoUpload<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

pub struct MemoryService<R: ChildRepository, A: AuthProvider, F: FileStore> {
    repo: R,
    auth: A,
    files: F,
}

impl<R: ChildRepository, A: AuthProvider, F: FileStore> MemoryService<R, A, F> {
    pub fn new(repo: R, auth: A, files: F) -> Self {
        Self { repo, auth, files }
    }

    /// Adds one journal entry for a child of the acting user.
    pub fn add_entry(&self, request: &NewMemoryEntry) -> ServiceResult<MemoryEntry> {
        let owner = require_user(&self.auth)?;
        self.ensure_child_visible(owner, request.child_id)?;
        let entry = MemoryEntry::from_request(owner, request)?;
        self.repo.create_memory_entry(&entry)?;
        info!(
            "event=memory_entry_create module=service status=ok entry_id={} entry_type={}",
            entry.id,
            entry.entry_type.as_str()
        );
        Ok(entry)
    }

    /// Uploads a photo under `<owner>/<uuid>.<ext>` and records a photo entry
    /// pointing at it.
    ///
    /// # Errors
    /// - `Capability` when the upload fails; nothing is stored.
    /// - Any `add_entry` error; the uploaded blob is removed first.
    pub fn add_photo_entry(
        &self,
        child_id: ChildId,
        title: &str,
        content: Option<&str>,
        photo: PhotoUpload<'_>,
    ) -> ServiceResult<MemoryEntry> {
        let owner = require_user(&self.auth)?;
        self.ensure_child_visible(owner, child_id)?;

        let path = photo_path(owner, photo.file_name);
        let image_url = self.files.upload(&path, photo.bytes)?;
        let request = NewMemoryEntry {
            child_id,
            title: title.to_string(),
            content: content.map(str::to_string),
            entry_type: MemoryEntryType::Photo,
            image_url: Some(image_url),
            milestone_date: None,
        };

        self.add_entry(&request).inspect_err(|err| {
            warn!(
                "event=memory_photo_rollback module=service status=start error={err}"
            );
            if let Err(remove_err) = self.files.remove(&path) {
                warn!(
                    "event=memory_photo_rollback module=service status=error error={remove_err}"
                );
            }
        })
    }

    /// Journal entries, newest first, optionally for one child.
    pub fn list_entries(&self, child_id: Option<ChildId>) -> ServiceResult<Vec<MemoryEntry>> {
        let owner = require_user(&self.auth)?;
        Ok(self.repo.list_memory_entries(owner, child_id)?)
    }

    pub fn delete_entry(&self, id: MemoryEntryId) -> ServiceResult<()> {
        let owner = require_user(&self.auth)?;
        match self.repo.get_memory_entry(id)? {
            Some(entry) if entry.owner == owner => {}
            _ => return Err(ServiceError::NotFound(id)),
        }
        self.repo.delete_memory_entry(id)?;
        info!("event=memory_entry_delete module=service status=ok entry_id={id}");
        Ok(())
    }

    fn ensure_child_visible(&self, owner: UserId, child_id: ChildId) -> ServiceResult<()> {
        match self.repo.get_child(child_id)? {
            Some(child) if child.owner == owner => Ok(()),
            _ => Err(ServiceError::NotFound(child_id)),
        }
    }
}

fn photo_path(owner: UserId, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    format!("{owner}/{}.{extension}", Uuid::new_v4())
}
