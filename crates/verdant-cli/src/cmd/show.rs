//! `vd show`: render the derived timeline views.

use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use verdant_core::EventType;
use verdant_core::index::{CalendarSummary, DayIndex, NavigationIndex};
use verdant_core::store::StateFile;

use super::{fmt_date, fmt_ts};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct ShowArgs {
    /// Only the calendar summary (days with care events).
    #[arg(long)]
    pub calendar: bool,

    /// Only the year/month navigation index.
    #[arg(long)]
    pub nav: bool,

    /// Only the day index.
    #[arg(long)]
    pub days: bool,
}

pub fn run_show(args: &ShowArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let timeline = state.open()?;

    if args.calendar {
        return render_mode(output, timeline.calendar_summary(), write_calendar, |c, w| {
            pretty_section(w, "Calendar")?;
            write_calendar(c, w)
        });
    }
    if args.nav {
        return render_mode(output, timeline.navigation_index(), write_nav, |n, w| {
            pretty_section(w, "Navigation")?;
            write_nav(n, w)
        });
    }
    if args.days {
        return render_mode(output, timeline.day_index(), write_day_rows, write_days_pretty);
    }

    let view = timeline.view();
    render_mode(
        output,
        &view,
        |v, w| write_day_rows(v.day_index, w),
        |v, w| {
            pretty_section(w, "Timeline")?;
            pretty_kv(w, "days", v.day_index.len().to_string())?;
            pretty_kv(w, "marked", v.calendar_summary.len().to_string())?;
            let default = match v.default_photo.key() {
                Some(key) if v.default_photo.set => format!("{key} (pinned)"),
                Some(key) => key.to_string(),
                None => "none".to_string(),
            };
            pretty_kv(w, "photo", default)?;
            writeln!(w)?;
            pretty_section(w, "Navigation")?;
            write_nav(v.navigation_index, w)?;
            writeln!(w)?;
            write_days_pretty(v.day_index, w)
        },
    )
}

fn join_types(types: &BTreeSet<EventType>) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn write_calendar(calendar: &CalendarSummary, w: &mut dyn Write) -> io::Result<()> {
    for (date, types) in calendar.iter().rev() {
        writeln!(w, "{}\t{}", fmt_date(*date), join_types(types))?;
    }
    Ok(())
}

fn write_nav(nav: &NavigationIndex, w: &mut dyn Write) -> io::Result<()> {
    for year in nav.years() {
        let months: Vec<String> = nav.months(year).iter().map(|m| format!("{m:02}")).collect();
        writeln!(w, "{year}\t{}", months.join(" "))?;
    }
    Ok(())
}

/// One tab-separated row per day, newest first.
fn write_day_rows(days: &DayIndex, w: &mut dyn Write) -> io::Result<()> {
    for (date, bucket) in days.iter().rev() {
        let events = if bucket.events.is_empty() {
            "-".to_string()
        } else {
            join_types(&bucket.events)
        };
        writeln!(
            w,
            "{}\t{}\tnotes={}\tphotos={}",
            fmt_date(*date),
            events,
            bucket.notes.len(),
            bucket.photos.len()
        )?;
    }
    Ok(())
}

fn write_days_pretty(days: &DayIndex, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Days")?;
    if days.is_empty() {
        writeln!(w, "(nothing recorded yet)")?;
        return Ok(());
    }
    for (date, bucket) in days.iter().rev() {
        writeln!(w, "{}", date.format("%a %d %b %Y"))?;
        if !bucket.events.is_empty() {
            writeln!(w, "  care:  {}", join_types(&bucket.events).replace(',', ", "))?;
        }
        for note in &bucket.notes {
            writeln!(w, "  note:  {}  ({})", note.text, fmt_ts(&note.timestamp))?;
        }
        for photo in &bucket.photos {
            writeln!(w, "  photo: {}  {}", photo.key, photo.thumbnail)?;
        }
    }
    Ok(())
}
