//! `vd event`: record, remove and query care events.


use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;
use verdant_core::model::parse_timestamp;
use verdant_core::store::StateFile;
use verdant_core::{EventType, TimelineError};

use super::{date_key, fmt_ts};
use crate::output::{OutputMode, pretty_kv, render, render_mode};

#[derive(Args, Debug)]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventCommand,
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    #[command(
        about = "Record a care event",
        after_help = "EXAMPLES:\n    # Watered this evening\n    vd event add water 2024-03-01T20:00:00Z\n\n    # Emit machine-readable output\n    vd event add fertilize 2024-03-01T20:15:00Z --json"
    )]
    Add(EventAtArgs),

    #[command(
        about = "Remove a recorded care event",
        after_help = "EXAMPLES:\n    # Undo a mistaken watering\n    vd event delete water 2024-03-01T20:00:00Z"
    )]
    Delete(EventAtArgs),

    #[command(
        about = "Show the most recent event of a type",
        after_help = "EXAMPLES:\n    # When was it last repotted?\n    vd event last repot"
    )]
    Last(EventLastArgs),
}

#[derive(Args, Debug)]
pub struct EventAtArgs {
    /// Event type: water, fertilize, prune, or repot.
    pub event_type: EventType,

    /// Instant of the event (RFC 3339; naive values are UTC).
    pub timestamp: String,
}

#[derive(Args, Debug)]
pub struct EventLastArgs {
    /// Event type: water, fertilize, prune, or repot.
    pub event_type: EventType,
}

#[derive(Debug, Serialize)]
struct EventChange {
    ok: bool,
    action: &'static str,
    event_type: EventType,
    timestamp: String,
    date: String,
    /// `false` when a delete found nothing to remove.
    changed: bool,
}

#[derive(Debug, Serialize)]
struct LastEvent {
    event_type: EventType,
    timestamp: Option<String>,
    date: Option<String>,
    /// Number of recorded instants of this type.
    count: usize,
}

pub fn run_event(args: &EventArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    match &args.command {
        EventCommand::Add(add) => run_add(add, state, output),
        EventCommand::Delete(delete) => run_delete(delete, state, output),
        EventCommand::Last(last) => run_last(last, state, output),
    }
}

fn run_add(args: &EventAtArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let timestamp = parse_timestamp(&args.timestamp)?;
    let event_type = args.event_type;

    let date = state.update(|timeline| {
        if timeline.events().contains(event_type, &timestamp) {
            return Err(TimelineError::DuplicateEvent {
                event_type,
                timestamp,
            });
        }
        timeline.add_event(event_type, timestamp);
        Ok(date_key(timeline.keyer(), &timestamp))
    })?;
    info!(%event_type, %date, "event recorded");

    let change = EventChange {
        ok: true,
        action: "event.add",
        event_type,
        timestamp: fmt_ts(&timestamp),
        date,
        changed: true,
    };
    render(output, &change, |c, w| {
        writeln!(w, "recorded {} on {}", c.event_type, c.date)
    })
}

fn run_delete(args: &EventAtArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let timestamp = parse_timestamp(&args.timestamp)?;
    let event_type = args.event_type;

    let (changed, date) = state.update(|timeline| {
        let changed = timeline.delete_event(event_type, &timestamp);
        Ok::<_, TimelineError>((changed, date_key(timeline.keyer(), &timestamp)))
    })?;

    let change = EventChange {
        ok: true,
        action: "event.delete",
        event_type,
        timestamp: fmt_ts(&timestamp),
        date,
        changed,
    };
    render(output, &change, |c, w| {
        if c.changed {
            writeln!(w, "removed {} on {}", c.event_type, c.date)
        } else {
            writeln!(w, "no {} recorded at {}; nothing changed", c.event_type, c.timestamp)
        }
    })
}

fn run_last(args: &EventLastArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let timeline = state.open()?;
    let last = timeline.last_event(args.event_type);
    let report = LastEvent {
        event_type: args.event_type,
        timestamp: last.as_ref().map(fmt_ts),
        date: last.map(|ts| date_key(timeline.keyer(), &ts)),
        count: timeline.events().timestamps(args.event_type).len(),
    };

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(
                w,
                "{}\t{}\t{}",
                r.event_type,
                r.date.as_deref().unwrap_or("-"),
                r.count
            )
        },
        |r, w| {
            pretty_kv(w, "type", r.event_type.as_str())?;
            pretty_kv(w, "last", r.date.as_deref().unwrap_or("never"))?;
            if let Some(ts) = &r.timestamp {
                pretty_kv(w, "at", ts)?;
            }
            pretty_kv(w, "recorded", r.count.to_string())
        },
    )
}
