//! Children registry and memory journal persistence.
//!
//! # Invariants
//! - Lists are newest first (`created_at DESC`, insertion order breaks ties).
//! - Removing a child removes its journal entries.

use crate::model::child::{Child, ChildId, MemoryEntry, MemoryEntryId, MemoryEntryType};
use crate::model::UserId;
use crate::repo::{parse_enum, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

pub trait ChildRepository {
    fn create_child(&self, child: &Child) -> RepoResult<ChildId>;
    fn get_child(&self, id: ChildId) -> RepoResult<Option<Child>>;
    fn list_children(&self, owner: UserId) -> RepoResult<Vec<Child>>;
    fn create_memory_entry(&self, entry: &MemoryEntry) -> RepoResult<MemoryEntryId>;
    fn get_memory_entry(&self, id: MemoryEntryId) -> RepoResult<Option<MemoryEntry>>;
    /// Journal entries of one owner, optionally narrowed to one child.
    fn list_memory_entries(
        &self,
        owner: UserId,
        child_id: Option<ChildId>,
    ) -> RepoResult<Vec<MemoryEntry>>;
    fn delete_memory_entry(&self, id: MemoryEntryId) -> RepoResult<()>;
}

pub struct SqliteChildRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChildRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ChildRepository for SqliteChildRepository<'_> {
    fn create_child(&self, child: &Child) -> RepoResult<ChildId> {
        child.validate()?;
        self.conn.execute(
            "INSERT INTO children (id, owner, name, date_of_birth) VALUES (?1, ?2, ?3, ?4);",
            params![
                child.id.to_string(),
                child.owner.to_string(),
                child.name.as_str(),
                child.date_of_birth,
            ],
        )?;
        Ok(child.id)
    }

    fn get_child(&self, id: ChildId) -> RepoResult<Option<Child>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name, date_of_birth FROM children WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_child_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_children(&self, owner: UserId) -> RepoResult<Vec<Child>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name, date_of_birth
             FROM children
             WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(parse_child_row(row)?);
        }
        Ok(children)
    }

    fn create_memory_entry(&self, entry: &MemoryEntry) -> RepoResult<MemoryEntryId> {
        entry.validate()?;
        self.conn.execute(
            "INSERT INTO memory_entries (
                id,
                child_id,
                owner,
                title,
                content,
                entry_type,
                image_url,
                milestone_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                entry.id.to_string(),
                entry.child_id.to_string(),
                entry.owner.to_string(),
                entry.title.as_str(),
                entry.content.as_deref(),
                entry.entry_type.as_str(),
                entry.image_url.as_deref(),
                entry.milestone_date,
            ],
        )?;
        Ok(entry.id)
    }

    fn get_memory_entry(&self, id: MemoryEntryId) -> RepoResult<Option<MemoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, child_id, owner, title, content, entry_type, image_url, milestone_date
             FROM memory_entries
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_memory_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_memory_entries(
        &self,
        owner: UserId,
        child_id: Option<ChildId>,
    ) -> RepoResult<Vec<MemoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, child_id, owner, title, content, entry_type, image_url, milestone_date
             FROM memory_entries
             WHERE owner = ?1
               AND (?2 IS NULL OR child_id = ?2)
             ORDER BY created_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query(params![
            owner.to_string(),
            child_id.map(|id| id.to_string())
        ])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_memory_row(row)?);
        }
        Ok(entries)
    }

    fn delete_memory_entry(&self, id: MemoryEntryId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM memory_entries WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_child_row(row: &Row<'_>) -> RepoResult<Child> {
    let id: String = row.get("id")?;
    let owner: String = row.get("owner")?;
    let child = Child {
        id: parse_uuid(&id, "children.id")?,
        owner: parse_uuid(&owner, "children.owner")?,
        name: row.get("name")?,
        date_of_birth: row.get("date_of_birth")?,
    };
    child.validate()?;
    Ok(child)
}

fn parse_memory_row(row: &Row<'_>) -> RepoResult<MemoryEntry> {
    let id: String = row.get("id")?;
    let child_id: String = row.get("child_id")?;
    let owner: String = row.get("owner")?;
    let entry_type: String = row.get("entry_type")?;
    let entry = MemoryEntry {
        id: parse_uuid(&id, "memory_entries.id")?,
        child_id: parse_uuid(&child_id, "memory_entries.child_id")?,
        owner: parse_uuid(&owner, "memory_entries.owner")?,
        title: row.get("title")?,
        content: row.get("content")?,
        entry_type: parse_enum(
            &entry_type,
            "memory_entries.entry_type",
            MemoryEntryType::parse,
        )?,
        image_url: row.get("image_url")?,
        milestone_date: row.get("milestone_date")?,
    };
    entry.validate()?;
    Ok(entry)
}
