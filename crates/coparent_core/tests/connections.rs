use coparent_core::capability::StaticAuthProvider;
use coparent_core::model::connection::{ConnectionStatus, Profile};
use coparent_core::repo::connection_repo::SqliteConnectionRepository;
use coparent_core::service::connection_service::{ConnectionService, ProfileService};
use coparent_core::{open_db_in_memory, ServiceError, ValidationError};
use rusqlite::Connection;
use uuid::Uuid;

fn profiles(
    conn: &Connection,
    user: Uuid,
) -> ProfileService<SqliteConnectionRepository<'_>, StaticAuthProvider> {
    ProfileService::new(
        SqliteConnectionRepository::new(conn),
        StaticAuthProvider::signed_in(user),
    )
}

fn connections(
    conn: &Connection,
    user: Uuid,
) -> ConnectionService<SqliteConnectionRepository<'_>, StaticAuthProvider> {
    ConnectionService::new(
        SqliteConnectionRepository::new(conn),
        StaticAuthProvider::signed_in(user),
    )
}

fn register(conn: &Connection, name: &str, email: &str) -> Uuid {
    let user = Uuid::new_v4();
    profiles(conn, user)
        .upsert_profile(Profile {
            full_name: Some(name.to_string()),
            email: Some(email.to_string()),
            ..Profile::default()
        })
        .unwrap();
    user
}

#[test]
fn profile_defaults_and_normalizes_email() {
    let conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();

    let empty = profiles(&conn, user).get_profile().unwrap();
    assert_eq!(empty.user_id, user);
    assert_eq!(empty.email, None);

    let saved = profiles(&conn, user)
        .upsert_profile(Profile {
            user_id: Uuid::new_v4(),
            email: Some("  Sam@Example.com ".to_string()),
            phone: Some("   ".to_string()),
            ..Profile::default()
        })
        .unwrap();
    assert_eq!(saved.user_id, user);
    assert_eq!(saved.email.as_deref(), Some("sam@example.com"));
    assert_eq!(saved.phone, None);
    assert_eq!(profiles(&conn, user).get_profile().unwrap(), saved);
}

#[test]
fn email_is_unique_across_profiles() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "Sam", "sam@example.com");

    let err = profiles(&conn, Uuid::new_v4())
        .upsert_profile(Profile {
            email: Some("SAM@example.com".to_string()),
            ..Profile::default()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn request_accept_and_list_from_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let sam = register(&conn, "Sam", "sam@example.com");
    let alex = register(&conn, "Alex", "alex@example.com");

    let request = connections(&conn, sam).send_request("Alex@Example.com").unwrap();
    assert_eq!(request.requester, sam);
    assert_eq!(request.addressee, alex);
    assert_eq!(request.status, ConnectionStatus::Pending);

    let err = connections(&conn, sam).respond(request.id, true).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(id) if id == request.id));

    let accepted = connections(&conn, alex).respond(request.id, true).unwrap();
    assert_eq!(accepted.status, ConnectionStatus::Accepted);

    let err = connections(&conn, alex).respond(request.id, false).unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    for user in [sam, alex] {
        let listed = connections(&conn, user).list_connections().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, ConnectionStatus::Accepted);
    }

    let counterpart = connections(&conn, alex)
        .counterpart_profile(request.id)
        .unwrap()
        .unwrap();
    assert_eq!(counterpart.full_name.as_deref(), Some("Sam"));
}

#[test]
fn request_errors() {
    let conn = open_db_in_memory().unwrap();
    let sam = register(&conn, "Sam", "sam@example.com");
    register(&conn, "Alex", "alex@example.com");
    let service = connections(&conn, sam);

    assert!(matches!(
        service.send_request("nobody@example.com"),
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        service.send_request("not an email"),
        Err(ServiceError::Validation(ValidationError::InvalidEmail(_)))
    ));
    assert!(matches!(
        service.send_request("sam@example.com"),
        Err(ServiceError::Validation(_))
    ));

    service.send_request("alex@example.com").unwrap();
    assert!(matches!(
        service.send_request("alex@example.com"),
        Err(ServiceError::Conflict(_))
    ));
}

#[test]
fn reverse_duplicate_pair_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let sam = register(&conn, "Sam", "sam@example.com");
    let alex = register(&conn, "Alex", "alex@example.com");

    connections(&conn, sam).send_request("alex@example.com").unwrap();
    let err = connections(&conn, alex)
        .send_request("sam@example.com")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(message) if message.contains("already connected")));
}

#[test]
fn either_party_can_remove_but_outsiders_cannot() {
    let conn = open_db_in_memory().unwrap();
    let sam = register(&conn, "Sam", "sam@example.com");
    let alex = register(&conn, "Alex", "alex@example.com");
    let request = connections(&conn, sam).send_request("alex@example.com").unwrap();

    let err = connections(&conn, Uuid::new_v4())
        .remove(request.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    connections(&conn, alex).remove(request.id).unwrap();
    assert!(connections(&conn, sam).list_connections().unwrap().is_empty());
}
