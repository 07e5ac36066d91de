//! Message log and push-subscription persistence.

use crate::model::message::{Message, MessageDirection, MessageId, PushSubscription};
use crate::model::UserId;
use crate::repo::{parse_enum, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

pub trait MessageRepository {
    fn create_message(&self, message: &Message) -> RepoResult<MessageId>;
    fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>>;
    /// Oldest first, conversation order.
    fn list_messages(&self, owner: UserId) -> RepoResult<Vec<Message>>;
    fn delete_message(&self, id: MessageId) -> RepoResult<()>;
}

pub trait PushSubscriptionRepository {
    /// Stores or refreshes the subscription for `(owner, endpoint)`.
    fn save_subscription(&self, subscription: &PushSubscription) -> RepoResult<()>;
    fn list_subscriptions(&self, owner: UserId) -> RepoResult<Vec<PushSubscription>>;
    /// Removes every subscription of `owner`; returns how many were removed.
    fn delete_subscriptions(&self, owner: UserId) -> RepoResult<usize>;
}

pub struct SqliteMessageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn create_message(&self, message: &Message) -> RepoResult<MessageId> {
        message.validate()?;
        self.conn.execute(
            "INSERT INTO messages (id, owner, direction, content) VALUES (?1, ?2, ?3, ?4);",
            params![
                message.id.to_string(),
                message.owner.to_string(),
                message.direction.as_str(),
                message.content.as_str(),
            ],
        )?;
        Ok(message.id)
    }

    fn get_message(&self, id: MessageId) -> RepoResult<Option<Message>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, owner, direction, content FROM messages WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_message_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_messages(&self, owner: UserId) -> RepoResult<Vec<Message>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, direction, content
             FROM messages
             WHERE owner = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(parse_message_row(row)?);
        }
        Ok(messages)
    }

    fn delete_message(&self, id: MessageId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM messages WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

pub struct SqlitePushSubscriptionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePushSubscriptionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PushSubscriptionRepository for SqlitePushSubscriptionRepository<'_> {
    fn save_subscription(&self, subscription: &PushSubscription) -> RepoResult<()> {
        if subscription.endpoint.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "push subscription endpoint must not be empty".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO push_subscriptions (owner, endpoint, payload)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (owner, endpoint) DO UPDATE SET payload = excluded.payload;",
            params![
                subscription.owner.to_string(),
                subscription.endpoint.as_str(),
                subscription.payload.as_str(),
            ],
        )?;
        Ok(())
    }

    fn list_subscriptions(&self, owner: UserId) -> RepoResult<Vec<PushSubscription>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner, endpoint, payload
             FROM push_subscriptions
             WHERE owner = ?1
             ORDER BY created_at ASC, endpoint ASC;",
        )?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut subscriptions = Vec::new();
        while let Some(row) = rows.next()? {
            let owner: String = row.get("owner")?;
            subscriptions.push(PushSubscription {
                owner: parse_uuid(&owner, "push_subscriptions.owner")?,
                endpoint: row.get("endpoint")?,
                payload: row.get("payload")?,
            });
        }
        Ok(subscriptions)
    }

    fn delete_subscriptions(&self, owner: UserId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM push_subscriptions WHERE owner = ?1;",
            [owner.to_string()],
        )?;
        Ok(removed)
    }
}

fn parse_message_row(row: &Row<'_>) -> RepoResult<Message> {
    let id: String = row.get("id")?;
    let owner: String = row.get("owner")?;
    let direction: String = row.get("direction")?;
    let message = Message {
        id: parse_uuid(&id, "messages.id")?,
        owner: parse_uuid(&owner, "messages.owner")?,
        direction: parse_enum(&direction, "messages.direction", MessageDirection::parse)?,
        content: row.get("content")?,
    };
    message.validate()?;
    Ok(message)
}
