use chrono::{NaiveDate, NaiveTime};
use coparent_core::{
    open_db_in_memory, CalendarEvent, CalendarService, EventCategory, EventFilter,
    EventListQuery, EventRepository, NewCalendarEvent, RecurrenceRule, RepoError,
    ServiceError, SqliteEventRepository, StaticAuthProvider, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service(
    conn: &mut Connection,
    user: Uuid,
) -> CalendarService<SqliteEventRepository<'_>, StaticAuthProvider> {
    CalendarService::new(
        SqliteEventRepository::new(conn),
        StaticAuthProvider::signed_in(user),
    )
}

fn validation_error(
    calendar: &mut CalendarService<SqliteEventRepository<'_>, StaticAuthProvider>,
    request: &NewCalendarEvent,
) -> ValidationError {
    match calendar.add_event(request) {
        Err(ServiceError::Validation(err)) => err,
        other => panic!("expected validation error, got {other:?}"),
    }
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM calendar_events;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn weekly_series_is_persisted_with_instances() {
    let mut conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();

    let request = NewCalendarEvent::single("Swim class", date(2025, 11, 1), EventCategory::Activity)
        .repeating(RecurrenceRule::Weekly, date(2025, 11, 22));
    let series = service(&mut conn, user).add_event(&request).unwrap();

    let dates: Vec<_> = series.instances.iter().map(|e| e.event_date).collect();
    assert_eq!(dates, vec![date(2025, 11, 8), date(2025, 11, 15), date(2025, 11, 22)]);
    assert_eq!(series.row_count(), 4);
    assert_eq!(row_count(&conn), 4);

    let loaded = service(&mut conn, user).get_series(series.anchor.id).unwrap();
    assert_eq!(loaded.anchor, series.anchor);
    assert_eq!(loaded.instances, series.instances);
    assert!(loaded
        .instances
        .iter()
        .all(|instance| instance.recurrence_rule == RecurrenceRule::None
            && instance.parent_event_id == Some(series.anchor.id)));
}

#[test]
fn monthly_series_clamps_to_month_end() {
    let mut conn = open_db_in_memory().unwrap();
    let request = NewCalendarEvent::single("Rent split", date(2025, 1, 31), EventCategory::Other)
        .repeating(RecurrenceRule::Monthly, date(2025, 4, 30));
    let series = service(&mut conn, Uuid::new_v4()).add_event(&request).unwrap();

    let dates: Vec<_> = series.instances.iter().map(|e| e.event_date).collect();
    assert_eq!(dates, vec![date(2025, 2, 28), date(2025, 3, 31), date(2025, 4, 30)]);
}

#[test]
fn single_event_writes_one_row() {
    let mut conn = open_db_in_memory().unwrap();
    let request = NewCalendarEvent::single("Dentist", date(2025, 3, 4), EventCategory::Medical);
    let series = service(&mut conn, Uuid::new_v4()).add_event(&request).unwrap();

    assert!(series.instances.is_empty());
    assert_eq!(row_count(&conn), 1);
}

#[test]
fn failed_instance_insert_leaves_no_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let request = NewCalendarEvent::single("Pickup", date(2025, 5, 1), EventCategory::Pickup)
        .repeating(RecurrenceRule::Daily, date(2025, 5, 3));
    let anchor = CalendarEvent::from_request(owner, &request).unwrap();

    let duplicate_id = Uuid::new_v4();
    let instances: Vec<CalendarEvent> = coparent_core::expand(&anchor)
        .map(|draft| draft.into_event(duplicate_id))
        .collect();
    assert_eq!(instances.len(), 2);

    let mut repo = SqliteEventRepository::new(&mut conn);
    let err = repo.create_series(&anchor, &instances).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    drop(repo);

    assert_eq!(row_count(&conn), 0);
}

#[test]
fn instances_must_point_at_their_anchor() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let request = NewCalendarEvent::single("Pickup", date(2025, 5, 1), EventCategory::Pickup)
        .repeating(RecurrenceRule::Daily, date(2025, 5, 2));
    let anchor = CalendarEvent::from_request(owner, &request).unwrap();
    let mut stray = CalendarEvent::from_request(
        owner,
        &NewCalendarEvent::single("Other", date(2025, 5, 2), EventCategory::Pickup),
    )
    .unwrap();
    stray.parent_event_id = Some(Uuid::new_v4());

    let mut repo = SqliteEventRepository::new(&mut conn);
    let err = repo.create_series(&anchor, &[stray]).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    drop(repo);
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn deleting_anchor_removes_instances() {
    let mut conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let request = NewCalendarEvent::single("Custody week", date(2025, 6, 2), EventCategory::Custody)
        .repeating(RecurrenceRule::Biweekly, date(2025, 7, 14));
    let series = service(&mut conn, user).add_event(&request).unwrap();
    assert_eq!(series.instances.len(), 3);

    let removed = service(&mut conn, user).delete_event(series.anchor.id).unwrap();
    assert_eq!(removed, 4);
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn deleting_instance_cancels_one_occurrence() {
    let mut conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let request = NewCalendarEvent::single("Practice", date(2025, 9, 1), EventCategory::School)
        .repeating(RecurrenceRule::Weekly, date(2025, 9, 22));
    let series = service(&mut conn, user).add_event(&request).unwrap();
    let cancelled = series.instances[1].id;

    let removed = service(&mut conn, user).delete_event(cancelled).unwrap();
    assert_eq!(removed, 1);

    let loaded = service(&mut conn, user).get_series(series.anchor.id).unwrap();
    let dates: Vec<_> = loaded.instances.iter().map(|e| e.event_date).collect();
    assert_eq!(dates, vec![date(2025, 9, 8), date(2025, 9, 22)]);
}

#[test]
fn get_series_resolves_instance_to_anchor() {
    let mut conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let request = NewCalendarEvent::single("Practice", date(2025, 9, 1), EventCategory::School)
        .repeating(RecurrenceRule::Weekly, date(2025, 9, 15));
    let series = service(&mut conn, user).add_event(&request).unwrap();

    let loaded = service(&mut conn, user)
        .get_series(series.instances[0].id)
        .unwrap();
    assert_eq!(loaded.anchor.id, series.anchor.id);
    assert_eq!(loaded.instances.len(), 2);
}

#[test]
fn listing_is_date_ordered_and_owner_scoped() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let mut timed = NewCalendarEvent::single("Late", date(2025, 2, 1), EventCategory::Other);
    timed.event_time = NaiveTime::from_hms_opt(17, 30, 0);
    let mut early = NewCalendarEvent::single("Early", date(2025, 2, 1), EventCategory::Other);
    early.event_time = NaiveTime::from_hms_opt(8, 0, 0);
    let untimed = NewCalendarEvent::single("All day", date(2025, 2, 1), EventCategory::Other);
    let before = NewCalendarEvent::single("Before", date(2025, 1, 15), EventCategory::School);

    {
        let mut alice_service = service(&mut conn, alice);
        for request in [&timed, &early, &untimed, &before] {
            alice_service.add_event(request).unwrap();
        }
    }
    service(&mut conn, bob)
        .add_event(&NewCalendarEvent::single("Bob's", date(2025, 1, 1), EventCategory::Other))
        .unwrap();

    let titles: Vec<String> = service(&mut conn, alice)
        .list_events(&EventFilter::default())
        .unwrap()
        .into_iter()
        .map(|event| event.title)
        .collect();
    assert_eq!(titles, vec!["Before", "All day", "Early", "Late"]);

    let february = EventFilter {
        from: Some(date(2025, 2, 1)),
        to: Some(date(2025, 2, 28)),
        limit: Some(2),
        ..EventFilter::default()
    };
    let page = service(&mut conn, alice).list_events(&february).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].title, "All day");

    let school = EventFilter {
        category: Some(EventCategory::School),
        ..EventFilter::default()
    };
    assert_eq!(service(&mut conn, alice).list_events(&school).unwrap().len(), 1);

    let repo = SqliteEventRepository::new(&mut conn);
    let bob_rows = repo
        .list_events(&EventListQuery::for_owner(bob).between(date(2024, 1, 1), date(2026, 1, 1)))
        .unwrap();
    assert_eq!(bob_rows.len(), 1);
}

#[test]
fn other_users_events_are_not_visible() {
    let mut conn = open_db_in_memory().unwrap();
    let owner = Uuid::new_v4();
    let series = service(&mut conn, owner)
        .add_event(&NewCalendarEvent::single("Private", date(2025, 1, 1), EventCategory::Other))
        .unwrap();

    let intruder = Uuid::new_v4();
    let err = service(&mut conn, intruder)
        .get_event(series.anchor.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(id) if id == series.anchor.id));

    let err = service(&mut conn, intruder)
        .delete_event(series.anchor.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(row_count(&conn), 1);
}

#[test]
fn invalid_requests_write_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let day = date(2025, 1, 10);

    let blank = NewCalendarEvent::single("   ", day, EventCategory::Other);
    let long_title = NewCalendarEvent::single("x".repeat(101), day, EventCategory::Other);
    let mut long_description = NewCalendarEvent::single("ok", day, EventCategory::Other);
    long_description.description = Some("d".repeat(501));
    let mut no_end = NewCalendarEvent::single("ok", day, EventCategory::Other);
    no_end.recurrence_rule = RecurrenceRule::Weekly;
    let reversed = NewCalendarEvent::single("ok", day, EventCategory::Other)
        .repeating(RecurrenceRule::Daily, date(2025, 1, 9));
    let mut stray_end = NewCalendarEvent::single("ok", day, EventCategory::Other);
    stray_end.recurrence_end_date = Some(date(2025, 2, 1));

    let mut calendar = service(&mut conn, user);
    assert_eq!(
        validation_error(&mut calendar, &blank),
        ValidationError::EmptyField("title")
    );
    assert!(matches!(
        validation_error(&mut calendar, &long_title),
        ValidationError::FieldTooLong { field: "title", .. }
    ));
    assert!(matches!(
        validation_error(&mut calendar, &long_description),
        ValidationError::FieldTooLong { field: "description", .. }
    ));
    assert_eq!(
        validation_error(&mut calendar, &no_end),
        ValidationError::MissingField("recurrence_end_date")
    );
    assert!(matches!(
        validation_error(&mut calendar, &reversed),
        ValidationError::RecurrenceEndBeforeStart { .. }
    ));
    assert_eq!(
        validation_error(&mut calendar, &stray_end),
        ValidationError::UnexpectedField("recurrence_end_date")
    );
    drop(calendar);

    assert_eq!(row_count(&conn), 0);
}

#[test]
fn signed_out_user_cannot_add_events() {
    let mut conn = open_db_in_memory().unwrap();
    let mut calendar = CalendarService::new(
        SqliteEventRepository::new(&mut conn),
        StaticAuthProvider::signed_out(),
    );
    let err = calendar
        .add_event(&NewCalendarEvent::single("x", date(2025, 1, 1), EventCategory::Other))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotAuthenticated));
}
