use chrono::NaiveDate;
use coparent_core::capability::{Capability, CapabilityError, FileStore, StaticAuthProvider};
use coparent_core::model::child::{MemoryEntryType, NewMemoryEntry};
use coparent_core::repo::child_repo::SqliteChildRepository;
use coparent_core::service::child_service::{ChildService, MemoryService, PhotoUpload};
use coparent_core::{open_db_in_memory, ServiceError, ValidationError};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Default)]
struct MemoryFileStore {
    blobs: RefCell<BTreeMap<String, Vec<u8>>>,
    fail_uploads: bool,
}

impl FileStore for MemoryFileStore {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, CapabilityError> {
        if self.fail_uploads {
            return Err(CapabilityError::new(Capability::FileStore, "bucket offline"));
        }
        self.blobs
            .borrow_mut()
            .insert(path.to_string(), bytes.to_vec());
        Ok(format!("https://files.test/{path}"))
    }

    fn remove(&self, path: &str) -> Result<(), CapabilityError> {
        self.blobs.borrow_mut().remove(path);
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn children(
    conn: &Connection,
    user: Uuid,
) -> ChildService<SqliteChildRepository<'_>, StaticAuthProvider> {
    ChildService::new(
        SqliteChildRepository::new(conn),
        StaticAuthProvider::signed_in(user),
    )
}

fn memories<'a>(
    conn: &'a Connection,
    user: Uuid,
    files: &'a MemoryFileStore,
) -> MemoryService<SqliteChildRepository<'a>, StaticAuthProvider, &'a MemoryFileStore> {
    MemoryService::new(
        SqliteChildRepository::new(conn),
        StaticAuthProvider::signed_in(user),
        files,
    )
}

fn note(child_id: Uuid, title: &str) -> NewMemoryEntry {
    NewMemoryEntry {
        child_id,
        title: title.to_string(),
        content: None,
        entry_type: MemoryEntryType::Note,
        image_url: None,
        milestone_date: None,
    }
}

#[test]
fn children_are_listed_newest_first_per_owner() {
    let conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();

    children(&conn, user).add_child("Maya", Some(date(2018, 4, 2))).unwrap();
    children(&conn, user).add_child("Leo", None).unwrap();
    children(&conn, Uuid::new_v4()).add_child("Someone else", None).unwrap();

    let names: Vec<String> = children(&conn, user)
        .list_children()
        .unwrap()
        .into_iter()
        .map(|child| child.name)
        .collect();
    assert_eq!(names, vec!["Leo", "Maya"]);
}

#[test]
fn blank_child_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let err = children(&conn, Uuid::new_v4()).add_child("  ", None).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::EmptyField("name"))
    ));
}

#[test]
fn entries_require_an_owned_child() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let owner = Uuid::new_v4();
    let child = children(&conn, owner).add_child("Maya", None).unwrap();

    let err = memories(&conn, Uuid::new_v4(), &files)
        .add_entry(&note(child.id, "First steps"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(id) if id == child.id));

    let entry = memories(&conn, owner, &files)
        .add_entry(&note(child.id, "First steps"))
        .unwrap();
    assert_eq!(entry.owner, owner);
}

#[test]
fn milestone_needs_a_date() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let owner = Uuid::new_v4();
    let child = children(&conn, owner).add_child("Maya", None).unwrap();
    let journal = memories(&conn, owner, &files);

    let mut request = note(child.id, "First word");
    request.entry_type = MemoryEntryType::Milestone;
    let err = journal.add_entry(&request).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingField("milestone_date"))
    ));

    request.milestone_date = Some(date(2019, 6, 1));
    journal.add_entry(&request).unwrap();
}

#[test]
fn photo_entry_uploads_then_records_url() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let owner = Uuid::new_v4();
    let child = children(&conn, owner).add_child("Maya", None).unwrap();

    let entry = memories(&conn, owner, &files)
        .add_photo_entry(
            child.id,
            "Beach day",
            Some("sandcastles"),
            PhotoUpload {
                file_name: "beach.PNG",
                bytes: b"png-bytes",
            },
        )
        .unwrap();

    assert_eq!(entry.entry_type, MemoryEntryType::Photo);
    let blobs = files.blobs.borrow();
    assert_eq!(blobs.len(), 1);
    let (path, bytes) = blobs.iter().next().unwrap();
    assert!(path.starts_with(&format!("{owner}/")));
    assert!(path.ends_with(".png"));
    assert_eq!(bytes, b"png-bytes");
    assert_eq!(
        entry.image_url.as_deref(),
        Some(format!("https://files.test/{path}").as_str())
    );
}

#[test]
fn rejected_photo_entry_removes_uploaded_blob() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let owner = Uuid::new_v4();
    let child = children(&conn, owner).add_child("Maya", None).unwrap();

    let err = memories(&conn, owner, &files)
        .add_photo_entry(
            child.id,
            "   ",
            None,
            PhotoUpload {
                file_name: "x.jpg",
                bytes: b"jpg",
            },
        )
        .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(files.blobs.borrow().is_empty());
    assert!(memories(&conn, owner, &files).list_entries(None).unwrap().is_empty());
}

#[test]
fn failed_upload_stores_nothing() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore {
        fail_uploads: true,
        ..MemoryFileStore::default()
    };
    let owner = Uuid::new_v4();
    let child = children(&conn, owner).add_child("Maya", None).unwrap();

    let err = memories(&conn, owner, &files)
        .add_photo_entry(
            child.id,
            "Park",
            None,
            PhotoUpload {
                file_name: "park.jpg",
                bytes: b"jpg",
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Capability(_)));
    assert!(memories(&conn, owner, &files).list_entries(None).unwrap().is_empty());
}

#[test]
fn entries_filter_by_child_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::default();
    let owner = Uuid::new_v4();
    let maya = children(&conn, owner).add_child("Maya", None).unwrap();
    let leo = children(&conn, owner).add_child("Leo", None).unwrap();
    let journal = memories(&conn, owner, &files);

    let first = journal.add_entry(&note(maya.id, "Maya 1")).unwrap();
    journal.add_entry(&note(maya.id, "Maya 2")).unwrap();
    journal.add_entry(&note(leo.id, "Leo 1")).unwrap();

    let titles: Vec<String> = journal
        .list_entries(Some(maya.id))
        .unwrap()
        .into_iter()
        .map(|entry| entry.title)
        .collect();
    assert_eq!(titles, vec!["Maya 2", "Maya 1"]);
    assert_eq!(journal.list_entries(None).unwrap().len(), 3);

    let err = memories(&conn, Uuid::new_v4(), &files)
        .delete_entry(first.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    journal.delete_entry(first.id).unwrap();
    assert_eq!(journal.list_entries(Some(maya.id)).unwrap().len(), 1);
}
