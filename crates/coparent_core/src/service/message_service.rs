//! Message log and push registration use-cases.

use crate::capability::{
    AuthProvider, Capability, CapabilityError, NotificationPermission, Notifier,
};
use crate::model::message::{Message, MessageDirection, MessageId, PushSubscription};
use crate::repo::message_repo::{MessageRepository, PushSubscriptionRepository};
use crate::service::{require_user, ServiceError, ServiceResult};
use log::{info, warn};

pub struct MessageService<R: MessageRepository, A: AuthProvider> {
    repo: R,
    auth: A,
}

impl<R: MessageRepository, A: AuthProvider> MessageService<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self { repo, auth }
    }

    /// Appends an outgoing message to the acting user's log.
    pub fn send(&self, content: &str) -> ServiceResult<Message> {
        self.record(MessageDirection::Sent, content)
    }

    /// Appends a message to the acting user's log in the given direction.
    pub fn record(&self, direction: MessageDirection, content: &str) -> ServiceResult<Message> {
        let owner = require_user(&self.auth)?;
        let message = Message::new(owner, direction, content)?;
        self.repo.create_message(&message)?;
        info!(
            "event=message_create module=service status=ok message_id={} direction={}",
            message.id,
            direction.as_str()
        );
        Ok(message)
    }

    /// Oldest first.
    pub fn list(&self) -> ServiceResult<Vec<Message>> {
        let owner = require_user(&self.auth)?;
        Ok(self.repo.list_messages(owner)?)
    }

    pub fn delete(&self, id: MessageId) -> ServiceResult<()> {
        let owner = require_user(&self.auth)?;
        match self.repo.get_message(id)? {
            Some(message) if message.owner == owner => {}
            _ => return Err(ServiceError::NotFound(id)),
        }
        self.repo.delete_message(id)?;
        info!("event=message_delete module=service status=ok message_id={id}");
        Ok(())
    }
}

/// Result of [`PushService::enable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Subscribed(PushSubscription),
    /// Permission was denied or left undecided; nothing was stored.
    NotGranted(NotificationPermission),
}

pub struct PushService<R: PushSubscriptionRepository, A: AuthProvider, N: Notifier> {
    repo: R,
    auth: A,
    notifier: N,
}

impl<R, A, N> PushService<R, A, N>
where
    R: PushSubscriptionRepository,
    A: AuthProvider,
    N: Notifier,
{
    pub fn new(repo: R, auth: A, notifier: N) -> Self {
        Self {
            repo,
            auth,
            notifier,
        }
    }

    /// Requests permission and, once granted, stores the device subscription.
    pub fn enable(&self) -> ServiceResult<PushOutcome> {
        let owner = require_user(&self.auth)?;
        let permission = self.notifier.request_permission()?;
        if permission != NotificationPermission::Granted {
            info!(
                "event=push_enable module=service status=skipped permission={}",
                permission.as_str()
            );
            return Ok(PushOutcome::NotGranted(permission));
        }

        let endpoint = self.notifier.subscribe()?;
        let payload = serde_json::to_string(&endpoint.payload)
            .map_err(|err| CapabilityError::new(Capability::Notifier, err.to_string()))?;
        let subscription = PushSubscription {
            owner,
            endpoint: endpoint.endpoint,
            payload,
        };
        self.repo.save_subscription(&subscription)?;
        info!("event=push_enable module=service status=ok");
        Ok(PushOutcome::Subscribed(subscription))
    }

    /// Unsubscribes the device, then drops every stored subscription of the
    /// acting user. Returns the number of rows removed.
    ///
    /// Stored rows are kept when the device could not be unsubscribed.
    pub fn disable(&self) -> ServiceResult<usize> {
        let owner = require_user(&self.auth)?;
        if let Err(err) = self.notifier.unsubscribe() {
            warn!("event=push_disable module=service status=error error={err}");
            return Err(err.into());
        }
        let removed = self.repo.delete_subscriptions(owner)?;
        info!("event=push_disable module=service status=ok removed={removed}");
        Ok(removed)
    }

    pub fn is_subscribed(&self) -> ServiceResult<bool> {
        let owner = require_user(&self.auth)?;
        Ok(!self.repo.list_subscriptions(owner)?.is_empty())
    }
}
