//! Calendar event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist anchors together with their materialized instances.
//! - Provide date-ordered reads scoped to one owner.
//!
//! # Invariants
//! - `create_series` writes the anchor and every instance in one immediate
//!   transaction: either all rows land or none do.
//! - Deleting an anchor removes its instances (`ON DELETE CASCADE`);
//!   deleting an instance removes only that occurrence.
//! - Listing order is `event_date ASC, event_time ASC (untimed first), id ASC`.

use crate::model::calendar_event::{CalendarEvent, EventCategory, EventId, RecurrenceRule};
use crate::model::UserId;
use crate::repo::{parse_enum, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::str::FromStr;

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    owner,
    title,
    description,
    event_date,
    event_time,
    category,
    recurrence_rule,
    recurrence_end_date,
    parent_event_id
FROM calendar_events";

/// Query options for listing one owner's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListQuery {
    pub owner: UserId,
    /// Inclusive lower bound on `event_date`.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on `event_date`.
    pub to: Option<NaiveDate>,
    pub category: Option<EventCategory>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl EventListQuery {
    pub fn for_owner(owner: UserId) -> Self {
        Self {
            owner,
            from: None,
            to: None,
            category: None,
            limit: None,
            offset: 0,
        }
    }

    /// Restricts the query to `from..=to`.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

/// Repository interface for calendar events.
pub trait EventRepository {
    /// Writes an anchor and its instances atomically.
    fn create_series(&mut self, anchor: &CalendarEvent, instances: &[CalendarEvent])
        -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<CalendarEvent>>;
    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<CalendarEvent>>;
    /// Instances generated from `anchor_id`, date ordered.
    fn list_instances(&self, anchor_id: EventId) -> RepoResult<Vec<CalendarEvent>>;
    /// Deletes one row; returns the number of rows removed including
    /// cascaded instances.
    fn delete_event(&mut self, id: EventId) -> RepoResult<usize>;
}

/// SQLite-backed calendar repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_series(
        &mut self,
        anchor: &CalendarEvent,
        instances: &[CalendarEvent],
    ) -> RepoResult<()> {
        anchor.validate()?;
        if anchor.is_instance() {
            return Err(RepoError::InvalidData(format!(
                "series anchor {} must not reference a parent",
                anchor.id
            )));
        }
        for instance in instances {
            instance.validate()?;
            if instance.parent_event_id != Some(anchor.id) || instance.owner != anchor.owner {
                return Err(RepoError::InvalidData(format!(
                    "instance {} does not belong to anchor {}",
                    instance.id, anchor.id
                )));
            }
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        insert_event(&tx, anchor)?;
        for instance in instances {
            insert_event(&tx, instance)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<CalendarEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<CalendarEvent>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE owner = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.owner.to_string())];

        if let Some(from) = query.from {
            sql.push_str(" AND event_date >= ?");
            bind_values.push(Value::Text(from.to_string()));
        }
        if let Some(to) = query.to {
            sql.push_str(" AND event_date <= ?");
            bind_values.push(Value::Text(to.to_string()));
        }
        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }

        sql.push_str(" ORDER BY event_date ASC, event_time ASC, id ASC");

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn list_instances(&self, anchor_id: EventId) -> RepoResult<Vec<CalendarEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE parent_event_id = ?1
             ORDER BY event_date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([anchor_id.to_string()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn delete_event(&mut self, id: EventId) -> RepoResult<usize> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let cascaded: i64 = tx.query_row(
            "SELECT COUNT(*) FROM calendar_events WHERE parent_event_id = ?1;",
            [id_text.as_str()],
            |row| row.get(0),
        )?;
        let removed = tx.execute(
            "DELETE FROM calendar_events WHERE id = ?1;",
            [id_text.as_str()],
        )?;
        if removed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(removed + usize::try_from(cascaded).unwrap_or_default())
    }
}

fn insert_event(conn: &Connection, event: &CalendarEvent) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO calendar_events (
            id,
            owner,
            title,
            description,
            event_date,
            event_time,
            category,
            recurrence_rule,
            recurrence_end_date,
            parent_event_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        params![
            event.id.to_string(),
            event.owner.to_string(),
            event.title.as_str(),
            event.description.as_deref(),
            event.event_date,
            event.event_time,
            event.category.as_str(),
            event.recurrence_rule.as_str(),
            event.recurrence_end_date,
            event.parent_event_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<CalendarEvent> {
    let id: String = row.get("id")?;
    let owner: String = row.get("owner")?;
    let category: String = row.get("category")?;
    let rule: String = row.get("recurrence_rule")?;
    let parent_event_id = match row.get::<_, Option<String>>("parent_event_id")? {
        Some(value) => Some(parse_uuid(&value, "calendar_events.parent_event_id")?),
        None => None,
    };

    let event = CalendarEvent {
        id: parse_uuid(&id, "calendar_events.id")?,
        owner: parse_uuid(&owner, "calendar_events.owner")?,
        title: row.get("title")?,
        description: row.get("description")?,
        event_date: row.get("event_date")?,
        event_time: row.get("event_time")?,
        category: parse_enum(&category, "calendar_events.category", |value| {
            EventCategory::from_str(value).ok()
        })?,
        recurrence_rule: parse_enum(&rule, "calendar_events.recurrence_rule", |value| {
            RecurrenceRule::from_str(value).ok()
        })?,
        recurrence_end_date: row.get("recurrence_end_date")?,
        parent_event_id,
    };
    event.validate()?;
    Ok(event)
}
