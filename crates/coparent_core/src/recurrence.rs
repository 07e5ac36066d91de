//! Recurring event materialization.
//!
//! # Responsibility
//! - Turn one anchor event plus its inclusive end date into the ordered
//!   instance drafts that are persisted alongside it.
//!
//! # Invariants
//! - The anchor date itself is never emitted.
//! - Emitted dates are strictly increasing and never exceed the end date.
//! - Generation halts at the first candidate past the end date.
//! - The k-th candidate is `anchor + k * step`, computed from the anchor
//!   rather than from the previous candidate.
//! - Monthly steps clamp to the last day of the target month
//!   (Jan 31 -> Feb 28 -> Mar 31 -> Apr 30).
//!
//! Expansion is pure: no I/O, no clock, no hidden state. Persisting the
//! drafts is the calendar service's job.

use crate::model::calendar_event::{CalendarEvent, EventCategory, EventId, RecurrenceRule};
use crate::model::UserId;
use chrono::{Days, Months, NaiveDate, NaiveTime};
use std::iter::FusedIterator;

/// One materialized occurrence, not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDraft {
    pub owner: UserId,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub category: EventCategory,
    /// Always [`RecurrenceRule::None`]; instances do not cascade.
    pub recurrence_rule: RecurrenceRule,
    pub parent_event_id: EventId,
}

impl InstanceDraft {
    fn from_anchor(anchor: &CalendarEvent, event_date: NaiveDate) -> Self {
        Self {
            owner: anchor.owner,
            title: anchor.title.clone(),
            description: anchor.description.clone(),
            event_date,
            event_time: anchor.event_time,
            category: anchor.category,
            recurrence_rule: RecurrenceRule::None,
            parent_event_id: anchor.id,
        }
    }

    /// Promotes the draft to a storable calendar row with the given id.
    pub fn into_event(self, id: EventId) -> CalendarEvent {
        CalendarEvent {
            id,
            owner: self.owner,
            title: self.title,
            description: self.description,
            event_date: self.event_date,
            event_time: self.event_time,
            category: self.category,
            recurrence_rule: self.recurrence_rule,
            recurrence_end_date: None,
            parent_event_id: Some(self.parent_event_id),
        }
    }
}

/// Lazily walks the dates of a series after its anchor date.
///
/// Clone before consuming to replay the sequence; a clone taken mid-walk
/// continues from the same position.
#[derive(Debug, Clone)]
pub struct OccurrenceDates {
    rule: RecurrenceRule,
    anchor_date: NaiveDate,
    /// `None` once exhausted.
    end_date: Option<NaiveDate>,
    steps_taken: u32,
}

impl Iterator for OccurrenceDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let end_date = self.end_date?;
        let candidate = self
            .steps_taken
            .checked_add(1)
            .and_then(|step| nth_step(self.rule, self.anchor_date, step).map(|date| (step, date)));

        match candidate {
            Some((step, date)) if date <= end_date => {
                self.steps_taken = step;
                Some(date)
            }
            _ => {
                self.end_date = None;
                None
            }
        }
    }
}

impl FusedIterator for OccurrenceDates {}

/// Lazily yields the instance drafts of one anchor event.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    anchor: &'a CalendarEvent,
    dates: OccurrenceDates,
}

impl Iterator for Occurrences<'_> {
    type Item = InstanceDraft;

    fn next(&mut self) -> Option<InstanceDraft> {
        self.dates
            .next()
            .map(|date| InstanceDraft::from_anchor(self.anchor, date))
    }
}

impl FusedIterator for Occurrences<'_> {}

/// Walks the occurrence dates strictly after `anchor_date`, up to and
/// including `end_date`.
///
/// Yields nothing for [`RecurrenceRule::None`] or when the first step
/// already lands past `end_date`.
pub fn occurrence_dates(
    rule: RecurrenceRule,
    anchor_date: NaiveDate,
    end_date: NaiveDate,
) -> OccurrenceDates {
    OccurrenceDates {
        rule,
        anchor_date,
        end_date: rule.is_recurring().then_some(end_date),
        steps_taken: 0,
    }
}

/// Expands an anchor into the additional instances that belong to it.
///
/// The anchor is not re-emitted. Anchors without a rule or without an end
/// date expand to nothing; callers validate before expanding.
pub fn expand(anchor: &CalendarEvent) -> Occurrences<'_> {
    let dates = match anchor.recurrence_end_date {
        Some(end_date) if anchor.parent_event_id.is_none() => {
            occurrence_dates(anchor.recurrence_rule, anchor.event_date, end_date)
        }
        _ => occurrence_dates(RecurrenceRule::None, anchor.event_date, anchor.event_date),
    };
    Occurrences { anchor, dates }
}

/// Date of the `step`-th occurrence after `anchor`; `None` on calendar overflow.
fn nth_step(rule: RecurrenceRule, anchor: NaiveDate, step: u32) -> Option<NaiveDate> {
    let step = u64::from(step);
    match rule {
        RecurrenceRule::None => None,
        RecurrenceRule::Daily => anchor.checked_add_days(Days::new(step)),
        RecurrenceRule::Weekly => anchor.checked_add_days(Days::new(step.checked_mul(7)?)),
        RecurrenceRule::Biweekly => anchor.checked_add_days(Days::new(step.checked_mul(14)?)),
        RecurrenceRule::Monthly => anchor.checked_add_months(Months::new(u32::try_from(step).ok()?)),
    }
}
