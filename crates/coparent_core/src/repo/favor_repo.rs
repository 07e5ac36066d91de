//! Favor request persistence.

use crate::model::favor::{Favor, FavorId, FavorStatus};
use crate::model::UserId;
use crate::repo::{parse_enum, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const FAVOR_SELECT_SQL: &str = "SELECT
    id,
    requester,
    responder,
    title,
    description,
    status
FROM favors";

pub trait FavorRepository {
    fn create_favor(&self, favor: &Favor) -> RepoResult<FavorId>;
    fn get_favor(&self, id: FavorId) -> RepoResult<Option<Favor>>;
    fn set_favor_status(&self, id: FavorId, status: FavorStatus) -> RepoResult<()>;
    /// Favors asked by or of `user`, newest first.
    fn list_favors(&self, user: UserId) -> RepoResult<Vec<Favor>>;
    fn delete_favor(&self, id: FavorId) -> RepoResult<()>;
}

pub struct SqliteFavorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFavorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FavorRepository for SqliteFavorRepository<'_> {
    fn create_favor(&self, favor: &Favor) -> RepoResult<FavorId> {
        favor.validate()?;
        self.conn.execute(
            "INSERT INTO favors (id, requester, responder, title, description, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                favor.id.to_string(),
                favor.requester.to_string(),
                favor.responder.to_string(),
                favor.title.as_str(),
                favor.description.as_deref(),
                favor.status.as_str(),
            ],
        )?;
        Ok(favor.id)
    }

    fn get_favor(&self, id: FavorId) -> RepoResult<Option<Favor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FAVOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_favor_row(row)?)),
            None => Ok(None),
        }
    }

    fn set_favor_status(&self, id: FavorId, status: FavorStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE favors
             SET status = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![status.as_str(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_favors(&self, user: UserId) -> RepoResult<Vec<Favor>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FAVOR_SELECT_SQL}
             WHERE requester = ?1 OR responder = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([user.to_string()])?;
        let mut favors = Vec::new();
        while let Some(row) = rows.next()? {
            favors.push(parse_favor_row(row)?);
        }
        Ok(favors)
    }

    fn delete_favor(&self, id: FavorId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM favors WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_favor_row(row: &Row<'_>) -> RepoResult<Favor> {
    let id: String = row.get("id")?;
    let requester: String = row.get("requester")?;
    let responder: String = row.get("responder")?;
    let status: String = row.get("status")?;
    let favor = Favor {
        id: parse_uuid(&id, "favors.id")?,
        requester: parse_uuid(&requester, "favors.requester")?,
        responder: parse_uuid(&responder, "favors.responder")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_enum(&status, "favors.status", FavorStatus::parse)?,
    };
    favor.validate()?;
    Ok(favor)
}
