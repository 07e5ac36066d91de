//! Favor request use-cases.
//!
//! # Invariants
//! - A favor may only be asked of an accepted connection.
//! - Favors are visible to their two parties only.
//! - The responder accepts or declines; either party may mark an accepted
//!   favor completed; only the requester deletes.

use crate::capability::AuthProvider;
use crate::model::connection::ConnectionStatus;
use crate::model::favor::{Favor, FavorId, FavorStatus};
use crate::model::UserId;
use crate::repo::connection_repo::ConnectionRepository;
use crate::repo::favor_repo::FavorRepository;
use crate::service::{require_user, ServiceError, ServiceResult};
use log::info;

pub struct FavorService<R: FavorRepository, C: ConnectionRepository, A: AuthProvider> {
    repo: R,
    connections: C,
    auth: A,
}

impl<R, C, A> FavorService<R, C, A>
where
    R: FavorRepository,
    C: ConnectionRepository,
    A: AuthProvider,
{
    pub fn new(repo: R, connections: C, auth: A) -> Self {
        Self {
            repo,
            connections,
            auth,
        }
    }

    /// Asks `responder` for a favor.
    ///
    /// # Errors
    /// - `Validation` for blank or oversized text, or asking yourself.
    /// - `Forbidden` when `responder` is not an accepted connection.
    pub fn create(
        &self,
        responder: UserId,
        title: &str,
        description: Option<&str>,
    ) -> ServiceResult<Favor> {
        let requester = require_user(&self.auth)?;
        let favor = Favor::request(requester, responder, title, description)?;
        let connected = self
            .connections
            .list_connections(requester)?
            .iter()
            .any(|connection| {
                connection.status == ConnectionStatus::Accepted
                    && connection.counterpart(requester) == responder
            });
        if !connected {
            return Err(ServiceError::Forbidden(responder));
        }

        self.repo.create_favor(&favor)?;
        info!(
            "event=favor_create module=service status=ok favor_id={}",
            favor.id
        );
        Ok(favor)
    }

    /// Favors asked by or of the acting user, newest first.
    pub fn list(&self) -> ServiceResult<Vec<Favor>> {
        let user = require_user(&self.auth)?;
        Ok(self.repo.list_favors(user)?)
    }

    /// Moves a favor to `status`.
    ///
    /// # Errors
    /// - `NotFound` when the acting user is not a party.
    /// - `Forbidden` when the requester tries to accept or decline.
    /// - `Conflict` for a transition the current status does not allow.
    pub fn update_status(&self, id: FavorId, status: FavorStatus) -> ServiceResult<Favor> {
        let user = require_user(&self.auth)?;
        let mut favor = self.visible_favor(user, id)?;
        if !favor.status.can_become(status) {
            return Err(ServiceError::Conflict(format!(
                "favor cannot move from {} to {}",
                favor.status.as_str(),
                status.as_str()
            )));
        }
        let answering = matches!(status, FavorStatus::Accepted | FavorStatus::Declined);
        if answering && favor.responder != user {
            return Err(ServiceError::Forbidden(id));
        }

        self.repo.set_favor_status(id, status)?;
        favor.status = status;
        info!(
            "event=favor_status module=service status=ok favor_id={id} outcome={}",
            status.as_str()
        );
        Ok(favor)
    }

    pub fn delete(&self, id: FavorId) -> ServiceResult<()> {
        let user = require_user(&self.auth)?;
        let favor = self.visible_favor(user, id)?;
        if favor.requester != user {
            return Err(ServiceError::Forbidden(id));
        }
        self.repo.delete_favor(id)?;
        info!("event=favor_delete module=service status=ok favor_id={id}");
        Ok(())
    }

    fn visible_favor(&self, user: UserId, id: FavorId) -> ServiceResult<Favor> {
        match self.repo.get_favor(id)? {
            Some(favor) if favor.involves(user) => Ok(favor),
            _ => Err(ServiceError::NotFound(id)),
        }
    }
}
