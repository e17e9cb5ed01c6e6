//! `vd rebuild`: Snapshot Replace from the state file.
//!
//! Loads the raw collections, re-derives every view from scratch, and writes
//! the normalized snapshot back (photos sorted, default photo re-resolved).


use anyhow::Result;
use serde::Serialize;
use tracing::info;
use verdant_core::TimelineError;
use verdant_core::store::StateFile;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct RebuildReport {
    ok: bool,
    events: usize,
    notes: usize,
    photos: usize,
    days: usize,
    marked_days: usize,
    months: usize,
    years: usize,
    default_photo: Option<String>,
}

pub fn run_rebuild(state: &StateFile, output: OutputMode) -> Result<()> {
    let report = state.update(|timeline| {
        let navigation = timeline.navigation_index();
        Ok::<_, TimelineError>(RebuildReport {
            ok: true,
            events: timeline.events().len(),
            notes: timeline.notes().len(),
            photos: timeline.photos().len(),
            days: timeline.day_index().len(),
            marked_days: timeline.calendar_summary().len(),
            months: navigation.len(),
            years: navigation.years().count(),
            default_photo: timeline.default_photo().key().map(str::to_string),
        })
    })?;
    info!(days = report.days, months = report.months, "state file rebuilt");

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(
                w,
                "days={} marked={} months={} years={}",
                r.days, r.marked_days, r.months, r.years
            )
        },
        |r, w| {
            pretty_section(w, "Rebuilt")?;
            pretty_kv(w, "events", r.events.to_string())?;
            pretty_kv(w, "notes", r.notes.to_string())?;
            pretty_kv(w, "photos", r.photos.to_string())?;
            pretty_kv(w, "days", r.days.to_string())?;
            pretty_kv(w, "marked", r.marked_days.to_string())?;
            pretty_kv(w, "months", format!("{} across {} years", r.months, r.years))?;
            pretty_kv(w, "default", r.default_photo.as_deref().unwrap_or("none"))
        },
    )
}
