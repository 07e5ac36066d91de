//! Calendar use-case service.
//!
//! # Responsibility
//! - Validate event requests, materialize recurring series and persist the
//!   anchor with its instances in one write.
//! - Scope every read and delete to the signed-in user.
//!
//! # Invariants
//! - A series is never half-written: anchor and instances share one
//!   transaction.
//! - Deleting an anchor deletes its instances; deleting an instance cancels
//!   only that occurrence.
//! - Log events carry ids, counts and rule names only, never titles.

use crate::capability::AuthProvider;
use crate::model::calendar_event::{
    CalendarEvent, EventCategory, EventId, NewCalendarEvent, RecurrenceRule,
};
use crate::model::ValidationError;
use crate::recurrence::{expand, occurrence_dates};
use crate::repo::event_repo::{EventListQuery, EventRepository};
use crate::service::{require_user, ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::time::Instant;
use uuid::Uuid;

/// An anchor event together with its materialized instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSeries {
    pub anchor: CalendarEvent,
    /// Date ordered; empty for non-recurring events.
    pub instances: Vec<CalendarEvent>,
}

impl EventSeries {
    /// Number of calendar rows in the series, anchor included.
    pub fn row_count(&self) -> usize {
        1 + self.instances.len()
    }
}

/// Optional filters for [`CalendarService::list_events`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<EventCategory>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub struct CalendarService<R: EventRepository, A: AuthProvider> {
    repo: R,
    auth: A,
}

impl<R: EventRepository, A: AuthProvider> CalendarService<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self { repo, auth }
    }

    /// Creates one event, expanding and persisting its instances when it
    /// recurs.
    ///
    /// # Errors
    /// - `NotAuthenticated` when nobody is signed in.
    /// - `Validation` for bad titles, descriptions or recurrence fields;
    ///   nothing is written.
    /// - `Repo` when the write fails; nothing is written.
    pub fn add_event(&mut self, request: &NewCalendarEvent) -> ServiceResult<EventSeries> {
        let owner = require_user(&self.auth)?;
        let anchor = CalendarEvent::from_request(owner, request).map_err(|err| {
            warn!(
                "event=calendar_event_create module=service status=rejected rule={} error={}",
                request.recurrence_rule.as_str(),
                err
            );
            err
        })?;

        let instances: Vec<CalendarEvent> = expand(&anchor)
            .map(|draft| draft.into_event(Uuid::new_v4()))
            .collect();

        let started_at = Instant::now();
        match self.repo.create_series(&anchor, &instances) {
            Ok(()) => {
                info!(
                    "event=calendar_event_create module=service status=ok event_id={} rule={} instances={} duration_ms={}",
                    anchor.id,
                    anchor.recurrence_rule.as_str(),
                    instances.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(EventSeries { anchor, instances })
            }
            Err(err) => {
                error!(
                    "event=calendar_event_create module=service status=error event_id={} rule={} instances={} error={}",
                    anchor.id,
                    anchor.recurrence_rule.as_str(),
                    instances.len(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Lists the signed-in user's events in date order.
    pub fn list_events(&self, filter: &EventFilter) -> ServiceResult<Vec<CalendarEvent>> {
        let owner = require_user(&self.auth)?;
        let query = EventListQuery {
            owner,
            from: filter.from,
            to: filter.to,
            category: filter.category,
            limit: filter.limit,
            offset: filter.offset,
        };
        Ok(self.repo.list_events(&query)?)
    }

    /// Gets one visible event by id.
    pub fn get_event(&self, id: EventId) -> ServiceResult<CalendarEvent> {
        let owner = require_user(&self.auth)?;
        match self.repo.get_event(id)? {
            Some(event) if event.owner == owner => Ok(event),
            _ => Err(ServiceError::NotFound(id)),
        }
    }

    /// Loads an anchor and its instances.
    ///
    /// Passing an instance id resolves to the series it belongs to.
    pub fn get_series(&self, id: EventId) -> ServiceResult<EventSeries> {
        let event = self.get_event(id)?;
        let anchor = match event.parent_event_id {
            Some(parent_id) => self.get_event(parent_id)?,
            None => event,
        };
        let instances = self.repo.list_instances(anchor.id)?;
        Ok(EventSeries { anchor, instances })
    }

    /// Deletes an event; returns the number of rows removed.
    ///
    /// Anchors take their instances with them. Instances are cancelled
    /// individually.
    pub fn delete_event(&mut self, id: EventId) -> ServiceResult<usize> {
        let event = self.get_event(id)?;
        let removed = self.repo.delete_event(id).map_err(|err| {
            error!(
                "event=calendar_event_delete module=service status=error event_id={id} error={err}"
            );
            ServiceError::from(err)
        })?;
        info!(
            "event=calendar_event_delete module=service status=ok event_id={} kind={} removed={}",
            id,
            if event.is_instance() { "instance" } else { "anchor" },
            removed
        );
        Ok(removed)
    }
}

/// Dates a series would occupy after `anchor_date`, without persisting.
///
/// # Errors
/// - `Validation` when `end_date` precedes `anchor_date`.
pub fn preview_occurrences(
    rule: RecurrenceRule,
    anchor_date: NaiveDate,
    end_date: NaiveDate,
) -> ServiceResult<Vec<NaiveDate>> {
    if end_date < anchor_date {
        return Err(ValidationError::RecurrenceEndBeforeStart {
            start: anchor_date,
            end: end_date,
        }
        .into());
    }
    Ok(occurrence_dates(rule, anchor_date, end_date).collect())
}
