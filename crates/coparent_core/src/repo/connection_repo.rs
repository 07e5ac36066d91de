//! Profile and connection persistence.
//!
//! # Invariants
//! - At most one connection row exists per unordered pair of users; a
//!   second request in either direction is a [`RepoError::Conflict`].
//! - Profile emails are unique; lookups compare lowercase text.

use crate::model::connection::{Connection, ConnectionId, ConnectionStatus, Profile};
use crate::model::UserId;
use crate::repo::{conflict_on_constraint, parse_enum, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Row};

pub trait ConnectionRepository {
    /// Inserts or replaces the profile of `profile.user_id`.
    fn upsert_profile(&self, profile: &Profile) -> RepoResult<()>;
    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>>;
    fn find_profile_by_email(&self, email: &str) -> RepoResult<Option<Profile>>;
    fn create_connection(&self, connection: &Connection) -> RepoResult<ConnectionId>;
    fn get_connection(&self, id: ConnectionId) -> RepoResult<Option<Connection>>;
    fn set_connection_status(&self, id: ConnectionId, status: ConnectionStatus)
        -> RepoResult<()>;
    /// Connections where `user` is either side, newest first.
    fn list_connections(&self, user: UserId) -> RepoResult<Vec<Connection>>;
    fn delete_connection(&self, id: ConnectionId) -> RepoResult<()>;
}

pub struct SqliteConnectionRepository<'conn> {
    conn: &'conn rusqlite::Connection,
}

impl<'conn> SqliteConnectionRepository<'conn> {
    pub fn new(conn: &'conn rusqlite::Connection) -> Self {
        Self { conn }
    }
}

impl ConnectionRepository for SqliteConnectionRepository<'_> {
    fn upsert_profile(&self, profile: &Profile) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO profiles (user_id, full_name, email, phone, avatar_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id) DO UPDATE SET
                    full_name = excluded.full_name,
                    email = excluded.email,
                    phone = excluded.phone,
                    avatar_url = excluded.avatar_url,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    profile.user_id.to_string(),
                    profile.full_name.as_deref(),
                    profile.email.as_deref(),
                    profile.phone.as_deref(),
                    profile.avatar_url.as_deref(),
                ],
            )
            .map_err(|err| conflict_on_constraint(err, "email already belongs to another profile"))?;
        Ok(())
    }

    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, full_name, email, phone, avatar_url
             FROM profiles
             WHERE user_id = ?1;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_profile_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_profile_by_email(&self, email: &str) -> RepoResult<Option<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, full_name, email, phone, avatar_url
             FROM profiles
             WHERE email = lower(trim(?1));",
        )?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_profile_row(row)?)),
            None => Ok(None),
        }
    }

    fn create_connection(&self, connection: &Connection) -> RepoResult<ConnectionId> {
        connection.validate()?;
        self.conn
            .execute(
                "INSERT INTO user_connections (id, requester, addressee, status)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    connection.id.to_string(),
                    connection.requester.to_string(),
                    connection.addressee.to_string(),
                    connection.status.as_str(),
                ],
            )
            .map_err(|err| conflict_on_constraint(err, "users are already connected"))?;
        Ok(connection.id)
    }

    fn get_connection(&self, id: ConnectionId) -> RepoResult<Option<Connection>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, requester, addressee, status
             FROM user_connections
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_connection_row(row)?)),
            None => Ok(None),
        }
    }

    fn set_connection_status(
        &self,
        id: ConnectionId,
        status: ConnectionStatus,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE user_connections
             SET status = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![status.as_str(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_connections(&self, user: UserId) -> RepoResult<Vec<Connection>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, requester, addressee, status
             FROM user_connections
             WHERE requester = ?1 OR addressee = ?1
             ORDER BY created_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([user.to_string()])?;
        let mut connections = Vec::new();
        while let Some(row) = rows.next()? {
            connections.push(parse_connection_row(row)?);
        }
        Ok(connections)
    }

    fn delete_connection(&self, id: ConnectionId) -> RepoResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM user_connections WHERE id = ?1;",
            [id.to_string()],
        )?;
        if removed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_profile_row(row: &Row<'_>) -> RepoResult<Profile> {
    let user_id: String = row.get("user_id")?;
    Ok(Profile {
        user_id: parse_uuid(&user_id, "profiles.user_id")?,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        avatar_url: row.get("avatar_url")?,
    })
}

fn parse_connection_row(row: &Row<'_>) -> RepoResult<Connection> {
    let id: String = row.get("id")?;
    let requester: String = row.get("requester")?;
    let addressee: String = row.get("addressee")?;
    let status: String = row.get("status")?;
    let connection = Connection {
        id: parse_uuid(&id, "user_connections.id")?,
        requester: parse_uuid(&requester, "user_connections.requester")?,
        addressee: parse_uuid(&addressee, "user_connections.addressee")?,
        status: parse_enum(&status, "user_connections.status", ConnectionStatus::parse)?,
    };
    connection.validate()?;
    Ok(connection)
}
