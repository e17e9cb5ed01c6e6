//! `vd note`: add, edit and delete timeline notes.
//!
//! A note is addressed by its timestamp, which never changes after creation.


use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use verdant_core::model::parse_timestamp;
use verdant_core::store::StateFile;
use verdant_core::{Note, TimelineError};

use super::{date_key, fmt_ts};
use crate::output::{OutputMode, render};

const MAX_NOTE_CHARS: usize = 4_096;

#[derive(Args, Debug)]
pub struct NoteArgs {
    #[command(subcommand)]
    pub command: NoteCommand,
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    #[command(
        about = "Add a note",
        after_help = "EXAMPLES:\n    # Note a new leaf\n    vd note add 2024-03-02T09:30:00Z \"New leaf unfurling\""
    )]
    Add(NoteTextArgs),

    #[command(
        about = "Replace the text of a note",
        after_help = "EXAMPLES:\n    # Fix a typo\n    vd note edit 2024-03-02T09:30:00Z \"New leaf unfurled\""
    )]
    Edit(NoteTextArgs),

    #[command(
        about = "Delete a note",
        after_help = "EXAMPLES:\n    vd note delete 2024-03-02T09:30:00Z"
    )]
    Delete(NoteAtArgs),
}

#[derive(Args, Debug)]
pub struct NoteTextArgs {
    /// Timestamp identifying the note.
    pub timestamp: String,

    /// Note text.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct NoteAtArgs {
    /// Timestamp identifying the note.
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct NoteChange {
    ok: bool,
    action: &'static str,
    timestamp: String,
    date: String,
    text: String,
}

fn validate_note_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("note text must not be empty");
    }
    if text.chars().count() > MAX_NOTE_CHARS {
        anyhow::bail!(
            "note text must be <= {MAX_NOTE_CHARS} characters (got {})",
            text.chars().count()
        );
    }
    if text.chars().any(|ch| ch.is_control() && ch != '\n' && ch != '\t') {
        anyhow::bail!("note text must not contain control characters");
    }
    Ok(())
}

pub fn run_note(args: &NoteArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let change = match &args.command {
        NoteCommand::Add(add) => {
            validate_note_text(&add.text)?;
            let timestamp = parse_timestamp(&add.timestamp)?;
            let date = state.update(|timeline| {
                timeline.add_note(Note::new(timestamp, add.text.clone()))?;
                Ok::<_, TimelineError>(date_key(timeline.keyer(), &timestamp))
            })?;
            NoteChange {
                ok: true,
                action: "note.add",
                timestamp: fmt_ts(&timestamp),
                date,
                text: add.text.clone(),
            }
        }
        NoteCommand::Edit(edit) => {
            validate_note_text(&edit.text)?;
            let timestamp = parse_timestamp(&edit.timestamp)?;
            let date = state.update(|timeline| {
                timeline.edit_note(&timestamp, edit.text.clone())?;
                Ok::<_, TimelineError>(date_key(timeline.keyer(), &timestamp))
            })?;
            NoteChange {
                ok: true,
                action: "note.edit",
                timestamp: fmt_ts(&timestamp),
                date,
                text: edit.text.clone(),
            }
        }
        NoteCommand::Delete(delete) => {
            let timestamp = parse_timestamp(&delete.timestamp)?;
            let (removed, date) = state.update(|timeline| {
                let removed = timeline.delete_note(&timestamp)?;
                Ok::<_, TimelineError>((removed, date_key(timeline.keyer(), &timestamp)))
            })?;
            NoteChange {
                ok: true,
                action: "note.delete",
                timestamp: fmt_ts(&timestamp),
                date,
                text: removed.text,
            }
        }
    };

    render(output, &change, |c, w| {
        let verb = match c.action {
            "note.add" => "added",
            "note.edit" => "edited",
            _ => "deleted",
        };
        writeln!(w, "{verb} note on {}: {}", c.date, c.text)
    })
}
