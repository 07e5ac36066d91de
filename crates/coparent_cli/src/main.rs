//! `coparent` command-line front end over `coparent_core`.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{
    ChildCommand, Cli, Command, EventAddArgs, EventCommand, FavorCommand, MessageCommand,
    PaymentCommand,
};
use config::{Config, USER_ENV_VAR};
use coparent_core::model::message::MessageDirection;
use coparent_core::repo::child_repo::SqliteChildRepository;
use coparent_core::repo::connection_repo::SqliteConnectionRepository;
use coparent_core::repo::favor_repo::SqliteFavorRepository;
use coparent_core::repo::message_repo::SqliteMessageRepository;
use coparent_core::repo::payment_repo::SqlitePaymentRepository;
use coparent_core::service::child_service::ChildService;
use coparent_core::service::favor_service::FavorService;
use coparent_core::service::message_service::MessageService;
use coparent_core::service::payment_service::{format_cents, PaymentService};
use coparent_core::{
    init_logging, open_db, preview_occurrences, CalendarEvent, CalendarService, EventFilter,
    LogSettings, NewCalendarEvent, SqliteEventRepository, StaticAuthProvider,
};
use log::info;
use rusqlite::Connection;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?.with_user_override(std::env::var(USER_ENV_VAR).ok())?;

    let mut settings = LogSettings::new(config.log_level(), config.log_dir()?);
    settings.duplicate_to_stderr = true;
    init_logging(&settings).context("failed to initialize logging")?;
    info!("event=cli_start module=cli status=ok");

    let db_path = config.db_path()?;
    let mut conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let auth = match config.user_id {
        Some(user) => StaticAuthProvider::signed_in(user),
        None => StaticAuthProvider::signed_out(),
    };

    match cli.command {
        Command::Event(command) => run_event(&mut conn, auth, command),
        Command::Child(command) => run_child(&conn, auth, command),
        Command::Payment(command) => run_payment(&conn, auth, command),
        Command::Message(command) => run_message(&conn, auth, command),
        Command::Favor(command) => run_favor(&conn, auth, command),
    }
}

fn run_event(conn: &mut Connection, auth: StaticAuthProvider, command: EventCommand) -> Result<()> {
    let mut calendar = CalendarService::new(SqliteEventRepository::new(conn), auth);
    match command {
        EventCommand::Add(args) => {
            let series = calendar.add_event(&new_event(args))?;
            println!("{}", event_line(&series.anchor));
            for instance in &series.instances {
                println!("  {}", event_line(instance));
            }
            println!("created {} event(s)", series.row_count());
        }
        EventCommand::List {
            from,
            to,
            limit,
            offset,
        } => {
            let filter = EventFilter {
                from,
                to,
                limit,
                offset,
                ..EventFilter::default()
            };
            for event in calendar.list_events(&filter)? {
                println!("{}", event_line(&event));
            }
        }
        EventCommand::Delete { id } => {
            let removed = calendar.delete_event(id)?;
            println!("deleted {removed} event(s)");
        }
        EventCommand::Preview { date, repeat, until } => {
            for day in preview_occurrences(repeat, date, until)? {
                println!("{day}");
            }
        }
    }
    Ok(())
}

fn run_child(conn: &Connection, auth: StaticAuthProvider, command: ChildCommand) -> Result<()> {
    let children = ChildService::new(SqliteChildRepository::new(conn), auth);
    match command {
        ChildCommand::Add { name, born } => {
            let child = children.add_child(&name, born)?;
            println!("{}  {}", child.id, child.name);
        }
        ChildCommand::List => {
            for child in children.list_children()? {
                match child.date_of_birth {
                    Some(born) => println!("{}  {}  born {born}", child.id, child.name),
                    None => println!("{}  {}", child.id, child.name),
                }
            }
        }
    }
    Ok(())
}

fn run_payment(conn: &Connection, auth: StaticAuthProvider, command: PaymentCommand) -> Result<()> {
    let ledger = PaymentService::new(SqlitePaymentRepository::new(conn), auth);
    match command {
        PaymentCommand::Send {
            amount,
            description,
        } => {
            let payment = ledger.send_payment(amount, &description)?;
            println!(
                "{}  {}  {}",
                payment.id,
                format_cents(payment.amount_cents),
                payment.description
            );
        }
        PaymentCommand::List => {
            for payment in ledger.list_payments()? {
                println!(
                    "{}  {:>8}  {:<8}  {:<9}  {}",
                    payment.id,
                    format_cents(payment.amount_cents),
                    payment.direction.as_str(),
                    payment.status.as_str(),
                    payment.description
                );
            }
            println!("balance {}", format_cents(ledger.balance_cents()?));
        }
    }
    Ok(())
}

fn run_message(conn: &Connection, auth: StaticAuthProvider, command: MessageCommand) -> Result<()> {
    let messages = MessageService::new(SqliteMessageRepository::new(conn), auth);
    match command {
        MessageCommand::Send { text, received } => {
            let direction = if received {
                MessageDirection::Received
            } else {
                MessageDirection::Sent
            };
            let message = messages.record(direction, &text)?;
            println!("{}", message.id);
        }
        MessageCommand::List => {
            for message in messages.list()? {
                println!("[{}] {}", message.direction.as_str(), message.content);
            }
        }
    }
    Ok(())
}

fn run_favor(conn: &Connection, auth: StaticAuthProvider, command: FavorCommand) -> Result<()> {
    let favors = FavorService::new(
        SqliteFavorRepository::new(conn),
        SqliteConnectionRepository::new(conn),
        auth,
    );
    match command {
        FavorCommand::Ask {
            responder,
            title,
            details,
        } => {
            let favor = favors.create(responder, &title, details.as_deref())?;
            println!("{}  {}", favor.id, favor.title);
        }
        FavorCommand::List => {
            for favor in favors.list()? {
                println!(
                    "{}  {:<9}  {}  ->  {}  {}",
                    favor.id,
                    favor.status.as_str(),
                    favor.requester,
                    favor.responder,
                    favor.title
                );
            }
        }
        FavorCommand::Status { id, status } => {
            let favor = favors.update_status(id, status)?;
            println!("{}  {}", favor.id, favor.status.as_str());
        }
        FavorCommand::Delete { id } => {
            favors.delete(id)?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn new_event(args: EventAddArgs) -> NewCalendarEvent {
    let mut request = NewCalendarEvent::single(args.title, args.date, args.category);
    request.event_time = args.time;
    request.description = args.description;
    if let Some(rule) = args.repeat {
        request.recurrence_rule = rule;
    }
    request.recurrence_end_date = args.until;
    request
}

fn event_line(event: &CalendarEvent) -> String {
    let time = event
        .event_time
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    let marker = if event.is_recurring() {
        format!(" ({} until {})", event.recurrence_rule.as_str(), series_end(event))
    } else {
        String::new()
    };
    format!(
        "{}  {} {}  [{}]  {}{}",
        event.id,
        event.event_date,
        time,
        event.category.as_str(),
        event.title,
        marker
    )
}

fn series_end(event: &CalendarEvent) -> String {
    event
        .recurrence_end_date
        .map(|date| date.to_string())
        .unwrap_or_default()
}
