use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use coparent_core::model::favor::FavorStatus;
use coparent_core::model::payment::parse_amount_cents;
use coparent_core::{EventCategory, RecurrenceRule};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "coparent")]
#[command(version, about = "Shared calendar, journal and ledger for co-parents")]
pub struct Cli {
    /// Config file (defaults to <config dir>/coparent/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calendar events
    #[command(subcommand)]
    Event(EventCommand),
    /// Children registry
    #[command(subcommand)]
    Child(ChildCommand),
    /// Payment ledger
    #[command(subcommand)]
    Payment(PaymentCommand),
    /// Message log
    #[command(subcommand)]
    Message(MessageCommand),
    /// Favors asked of connected parents
    #[command(subcommand)]
    Favor(FavorCommand),
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    Add(EventAddArgs),
    List {
        /// First date to show (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date to show (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Maximum number of events to print
        #[arg(long)]
        limit: Option<u32>,
        /// Events to skip before printing
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Delete an event; deleting a series anchor removes every occurrence
    Delete { id: Uuid },
    /// Print the dates a series would occupy without saving it
    Preview {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        repeat: RecurrenceRule,
        #[arg(long)]
        until: NaiveDate,
    },
}

#[derive(Debug, Args)]
pub struct EventAddArgs {
    #[arg(long)]
    pub title: String,
    /// Event date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    /// Wall-clock time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
    /// pickup, medical, custody, school, activity or other
    #[arg(long, default_value = "other")]
    pub category: EventCategory,
    /// daily, weekly, biweekly or monthly
    #[arg(long, requires = "until")]
    pub repeat: Option<RecurrenceRule>,
    /// Last date of the series, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "repeat")]
    pub until: Option<NaiveDate>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ChildCommand {
    Add {
        name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        born: Option<NaiveDate>,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum PaymentCommand {
    Send {
        /// Amount such as 12 or 12.50
        #[arg(value_parser = parse_amount)]
        amount: i64,
        description: String,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum MessageCommand {
    Send {
        text: String,
        /// Log the message as received from the other parent
        #[arg(long)]
        received: bool,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum FavorCommand {
    /// Ask an accepted connection for a favor
    Ask {
        /// User id of the parent being asked
        responder: Uuid,
        title: String,
        #[arg(long)]
        details: Option<String>,
    },
    List,
    /// Move a favor to accepted, declined or completed
    Status { id: Uuid, status: FavorStatus },
    Delete { id: Uuid },
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| format!("expected HH:MM, got `{value}`"))
}

fn parse_amount(value: &str) -> Result<i64, String> {
    parse_amount_cents(value).ok_or_else(|| format!("expected an amount like 12.50, got `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, EventCommand, FavorCommand, MessageCommand, PaymentCommand};
    use coparent_core::model::favor::FavorStatus;
    use clap::{CommandFactory, Parser};
    use coparent_core::{EventCategory, RecurrenceRule};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recurring_event() {
        let cli = Cli::try_parse_from([
            "coparent", "event", "add", "--title", "Swim", "--date", "2025-11-01", "--time",
            "17:30", "--category", "activity", "--repeat", "weekly", "--until", "2025-11-22",
        ])
        .unwrap();
        let Command::Event(EventCommand::Add(args)) = cli.command else {
            panic!("expected event add");
        };
        assert_eq!(args.category, EventCategory::Activity);
        assert_eq!(args.repeat, Some(RecurrenceRule::Weekly));
        assert_eq!(args.time.unwrap().to_string(), "17:30:00");
    }

    #[test]
    fn repeat_requires_until() {
        let result = Cli::try_parse_from([
            "coparent", "event", "add", "--title", "Swim", "--date", "2025-11-01", "--repeat",
            "weekly",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn payment_amount_is_parsed_to_cents() {
        let cli = Cli::try_parse_from(["coparent", "payment", "send", "12.5", "Lunch"]).unwrap();
        let Command::Payment(PaymentCommand::Send { amount, .. }) = cli.command else {
            panic!("expected payment send");
        };
        assert_eq!(amount, 1250);
        assert!(Cli::try_parse_from(["coparent", "payment", "send", "-3", "x"]).is_err());
    }

    #[test]
    fn event_list_accepts_paging() {
        let cli = Cli::try_parse_from([
            "coparent", "event", "list", "--limit", "5", "--offset", "10",
        ])
        .unwrap();
        let Command::Event(EventCommand::List { limit, offset, .. }) = cli.command else {
            panic!("expected event list");
        };
        assert_eq!((limit, offset), (Some(5), 10));
    }

    #[test]
    fn favor_status_is_parsed() {
        let id = uuid::Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["coparent", "favor", "status", id.as_str(), "accepted"])
            .unwrap();
        let Command::Favor(FavorCommand::Status { status, .. }) = cli.command else {
            panic!("expected favor status");
        };
        assert_eq!(status, FavorStatus::Accepted);
        assert!(
            Cli::try_parse_from(["coparent", "favor", "status", id.as_str(), "maybe"]).is_err()
        );
    }

    #[test]
    fn message_send_can_be_marked_received() {
        let cli = Cli::try_parse_from(["coparent", "message", "send", "--received", "On my way"])
            .unwrap();
        let Command::Message(MessageCommand::Send { text, received }) = cli.command else {
            panic!("expected message send");
        };
        assert_eq!(text, "On my way");
        assert!(received);
    }
}
