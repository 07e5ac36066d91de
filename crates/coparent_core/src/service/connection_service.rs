//! Profile and parent-to-parent connection use-cases.
//!
//! # Invariants
//! - Requests resolve the other parent by profile email.
//! - Only the addressee of a pending request may accept or reject it.
//! - Either party may remove a connection.

use crate::capability::AuthProvider;
use crate::model::connection::{normalize_email, Connection, ConnectionId, ConnectionStatus, Profile};
use crate::model::UserId;
use crate::repo::connection_repo::ConnectionRepository;
use crate::service::{require_user, ServiceError, ServiceResult};
use log::info;

pub struct ProfileService<R: ConnectionRepository, A: AuthProvider> {
    repo: R,
    auth: A,
}

impl<R: ConnectionRepository, A: AuthProvider> ProfileService<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self { repo, auth }
    }

    /// Returns the acting user's profile, or an empty one when none exists yet.
    pub fn get_profile(&self) -> ServiceResult<Profile> {
        let user_id = require_user(&self.auth)?;
        Ok(self.repo.get_profile(user_id)?.unwrap_or(Profile {
            user_id,
            ..Profile::default()
        }))
    }

    /// Replaces the acting user's profile fields.
    ///
    /// `profile.user_id` is ignored; the acting user is always the target.
    pub fn upsert_profile(&self, profile: Profile) -> ServiceResult<Profile> {
        let user_id = require_user(&self.auth)?;
        let profile = Profile { user_id, ..profile }.normalized()?;
        self.repo.upsert_profile(&profile)?;
        info!("event=profile_update module=service status=ok");
        Ok(profile)
    }
}

pub struct ConnectionService<R: ConnectionRepository, A: AuthProvider> {
    repo: R,
    auth: A,
}

impl<R: ConnectionRepository, A: AuthProvider> ConnectionService<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self { repo, auth }
    }

    /// Sends a connection request to the user owning `email`.
    ///
    /// # Errors
    /// - `Validation` for malformed emails or the acting user's own email.
    /// - `Conflict` for unknown emails or an already connected pair.
    pub fn send_request(&self, email: &str) -> ServiceResult<Connection> {
        let requester = require_user(&self.auth)?;
        let email = normalize_email(email)?;
        let addressee = self
            .repo
            .find_profile_by_email(&email)?
            .ok_or_else(|| ServiceError::Conflict("no user found with this email".to_string()))?
            .user_id;
        let connection = Connection::request(requester, addressee)?;
        self.repo.create_connection(&connection)?;
        info!(
            "event=connection_request module=service status=ok connection_id={}",
            connection.id
        );
        Ok(connection)
    }

    /// Accepts or rejects a pending request addressed to the acting user.
    pub fn respond(&self, id: ConnectionId, accept: bool) -> ServiceResult<Connection> {
        let user = require_user(&self.auth)?;
        let mut connection = self.visible_connection(user, id)?;
        if connection.addressee != user {
            return Err(ServiceError::Forbidden(id));
        }
        if connection.status != ConnectionStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "connection is already {}",
                connection.status.as_str()
            )));
        }

        let status = if accept {
            ConnectionStatus::Accepted
        } else {
            ConnectionStatus::Rejected
        };
        self.repo.set_connection_status(id, status)?;
        connection.status = status;
        info!(
            "event=connection_respond module=service status=ok connection_id={id} outcome={}",
            status.as_str()
        );
        Ok(connection)
    }

    /// Connections on either side, newest first.
    pub fn list_connections(&self) -> ServiceResult<Vec<Connection>> {
        let user = require_user(&self.auth)?;
        Ok(self.repo.list_connections(user)?)
    }

    /// Profile of the other party in a connection.
    pub fn counterpart_profile(&self, id: ConnectionId) -> ServiceResult<Option<Profile>> {
        let user = require_user(&self.auth)?;
        let connection = self.visible_connection(user, id)?;
        Ok(self.repo.get_profile(connection.counterpart(user))?)
    }

    pub fn remove(&self, id: ConnectionId) -> ServiceResult<()> {
        let user = require_user(&self.auth)?;
        self.visible_connection(user, id)?;
        self.repo.delete_connection(id)?;
        info!("event=connection_remove module=service status=ok connection_id={id}");
        Ok(())
    }

    fn visible_connection(
        &self,
        user: UserId,
        id: ConnectionId,
    ) -> ServiceResult<Connection> {
        match self.repo.get_connection(id)? {
            Some(connection) if connection.involves(user) => Ok(connection),
            _ => Err(ServiceError::NotFound(id)),
        }
    }
}
