use crate::delivery_actors::dispatcher::CommandDispatcher;
use crate::delivery_actors::tracker::DeliveryTracker;
use crate::messages::internal_messages::*;
use actix::Addr;
use colored::*;
use common::logger::Logger;
use common::partition::{DeliveryViews, ViewKind};
use common::types::delivery_status::{DeliveryStatus, StatusColor, StatusIcon, UnknownStatus};
use common::types::dtos::DeliveryDTO;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
Commands:
  new | active | history      list a view
  accept <id>                 take a new delivery
  next <id>                   move an active delivery to its next status
  advance <id> <status>       move an active delivery to <status>
  reject <id>                 hide a new delivery until the next refresh
  refresh                     fetch deliveries now
  status                      show polling counters
  help                        show this text
  quit                        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(ViewKind),
    Accept(u64),
    Next(u64),
    Advance(u64, DeliveryStatus),
    Reject(u64),
    Refresh,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{0}' is not a delivery id")]
    InvalidId(String),
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),
}

pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "new" => Command::List(ViewKind::New),
        "active" => Command::List(ViewKind::Active),
        "history" => Command::List(ViewKind::History),
        "accept" => Command::Accept(parse_id("accept", words.next())?),
        "next" => Command::Next(parse_id("next", words.next())?),
        "reject" => Command::Reject(parse_id("reject", words.next())?),
        "advance" => {
            let id = parse_id("advance", words.next())?;
            // Labels may be two words, as in "picked up".
            let status: Vec<&str> = words.collect();
            if status.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "advance",
                    argument: "a status",
                });
            }
            Command::Advance(id, status.join(" ").parse()?)
        }
        "refresh" => Command::Refresh,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_id(command: &'static str, word: Option<&str>) -> Result<u64, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument {
        command,
        argument: "a delivery id",
    })?;
    word.trim_start_matches('#')
        .parse()
        .map_err(|_| CommandError::InvalidId(word.to_string()))
}

fn chip(status: DeliveryStatus) -> ColoredString {
    let descriptor = status.descriptor();
    let glyph = match descriptor.icon {
        StatusIcon::Pending => "…",
        StatusIcon::CheckCircle => "✔",
        StatusIcon::LocalShipping => "➜",
        StatusIcon::Cancel => "✖",
    };
    let color = match descriptor.color {
        StatusColor::Warning => Color::Yellow,
        StatusColor::Info => Color::Blue,
        StatusColor::Success => Color::Green,
        StatusColor::Error => Color::Red,
    };
    format!("[{} {}]", glyph, descriptor.label).color(color)
}

pub fn render_delivery(delivery: &DeliveryDTO) -> String {
    let order = &delivery.order;
    let mut out = format!(
        "Delivery {} · Order #{} {}\n  {} x{} for {} · Total: ₹{:.2}\n  Pickup: {}\n  Drop-off: {}\n  Created: {}",
        delivery.id,
        order.id,
        chip(delivery.status),
        order.item_name,
        order.quantity,
        order.customer_name,
        order.total_price,
        delivery.pickup_location,
        delivery.dropoff_location,
        delivery.created_at.format("%d/%m/%Y"),
    );
    if let Some(next) = delivery.status.next_status() {
        out.push_str(&format!(
            "\n  Next: mark as {} (next {})",
            next.label().to_lowercase(),
            delivery.id
        ));
    } else if delivery.can_accept() {
        out.push_str(&format!(
            "\n  Actions: accept {} | reject {}",
            delivery.id, delivery.id
        ));
    }
    out
}

pub fn render_view(views: &DeliveryViews, kind: ViewKind) -> String {
    let deliveries = views.view(kind);
    let mut out = format!("== {} ({}) ==", kind.title(), deliveries.len());
    if deliveries.is_empty() {
        out.push('\n');
        out.push_str(kind.empty_message());
    }
    for delivery in deliveries {
        out.push('\n');
        out.push_str(&render_delivery(delivery));
    }
    out
}

pub fn render_state(state: &TrackerState) -> String {
    let mut out = format!(
        "tracking: {} · draining: {} · cycles ok/failed/discarded: {}/{}/{} · deliveries: {}",
        state.tracking,
        state.draining,
        state.completed_cycles,
        state.failed_cycles,
        state.discarded_cycles,
        state.snapshot_len
    );
    if let Some(err) = &state.last_error {
        out.push_str(&format!("\nlast error: {}", err));
    }
    out
}

/// Reads commands from stdin until `quit` or end of input. Command outcomes
/// are reported through the notifier; this loop only prints views.
pub async fn run_console(
    tracker: Addr<DeliveryTracker>,
    dispatcher: Addr<CommandDispatcher>,
    logger: Logger,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                logger.error(format!("Error while reading input: {}", e));
                break;
            }
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                logger.warn(e.to_string());
                continue;
            }
        };

        let delivered = match command {
            Command::List(kind) => tracker
                .send(GetViews)
                .await
                .map(|views| println!("{}", render_view(&views, kind))),
            Command::Status => tracker
                .send(GetTrackerState)
                .await
                .map(|state| println!("{}", render_state(&state))),
            Command::Refresh => tracker.send(RefreshNow).await,
            // Outcomes of the commands below reach the agent as notifications.
            Command::Accept(delivery_id) => dispatcher
                .send(AcceptDelivery { delivery_id })
                .await
                .map(|_| ()),
            Command::Next(delivery_id) => dispatcher
                .send(AdvanceToNext { delivery_id })
                .await
                .map(|_| ()),
            Command::Advance(delivery_id, requested) => dispatcher
                .send(AdvanceDelivery {
                    delivery_id,
                    requested,
                })
                .await
                .map(|_| ()),
            Command::Reject(delivery_id) => dispatcher
                .send(RejectDelivery { delivery_id })
                .await
                .map(|_| ()),
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Quit => break,
        };

        if let Err(e) = delivered {
            logger.error(format!("Actor unavailable: {}", e));
            break;
        }
    }
}
