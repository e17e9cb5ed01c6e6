//! `vd photo`: add and delete photos, pick the default photo.


use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use verdant_core::model::parse_timestamp;
use verdant_core::store::StateFile;
use verdant_core::{DefaultPhoto, Photo, TimelineError};

use super::{date_key, fmt_ts};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct PhotoArgs {
    #[command(subcommand)]
    pub command: PhotoCommand,
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    #[command(
        about = "Add an uploaded photo",
        after_help = "EXAMPLES:\n    vd photo add k1 2024-03-01T12:00:00Z --image /media/k1.jpg --thumbnail /media/k1_t.jpg"
    )]
    Add(PhotoAddArgs),

    #[command(
        about = "Delete photos by key",
        after_help = "EXAMPLES:\n    # Delete two photos at once\n    vd photo delete k1 k2"
    )]
    Delete(PhotoDeleteArgs),

    #[command(
        about = "Pin or unpin the default photo",
        after_help = "EXAMPLES:\n    # Pin a photo\n    vd photo default k1\n\n    # Go back to the newest photo\n    vd photo default --clear"
    )]
    Default(PhotoDefaultArgs),
}

#[derive(Args, Debug)]
pub struct PhotoAddArgs {
    /// Stable photo key.
    pub key: String,

    /// Capture (or upload) time.
    pub timestamp: String,

    /// Full-size image URL.
    #[arg(long)]
    pub image: String,

    /// Thumbnail URL; defaults to the image URL.
    #[arg(long)]
    pub thumbnail: Option<String>,
}

#[derive(Args, Debug)]
pub struct PhotoDeleteArgs {
    /// Keys of the photos to delete.
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PhotoDefaultArgs {
    /// Key of the photo to pin.
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    pub key: Option<String>,

    /// Drop the pinned photo; the newest photo becomes the default.
    #[arg(long)]
    pub clear: bool,
}

#[derive(Debug, Serialize)]
struct PhotoAdded {
    ok: bool,
    key: String,
    timestamp: String,
    date: String,
    default_photo: DefaultPhoto,
}

#[derive(Debug, Serialize)]
struct PhotosDeleted {
    ok: bool,
    deleted: Vec<String>,
    /// Requested keys that matched no photo.
    unknown: Vec<String>,
    default_photo: DefaultPhoto,
}

#[derive(Debug, Serialize)]
struct DefaultChanged {
    ok: bool,
    default_photo: DefaultPhoto,
}

pub fn run_photo(args: &PhotoArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    match &args.command {
        PhotoCommand::Add(add) => run_add(add, state, output),
        PhotoCommand::Delete(delete) => run_delete(delete, state, output),
        PhotoCommand::Default(default) => run_default(default, state, output),
    }
}

fn run_add(args: &PhotoAddArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    if args.key.trim().is_empty() {
        anyhow::bail!("photo key must not be empty");
    }
    let timestamp = parse_timestamp(&args.timestamp)?;
    let mut photo = Photo::new(&args.key, timestamp, &args.image);
    if let Some(thumbnail) = &args.thumbnail {
        photo = photo.with_thumbnail(thumbnail);
    }

    let (date, default_photo) = state.update(|timeline| {
        if timeline.photos().iter().any(|p| p.key == photo.key) {
            return Err(TimelineError::DuplicatePhotoKey { key: photo.key });
        }
        let date = date_key(timeline.keyer(), &photo.timestamp);
        timeline.add_photos([photo]);
        Ok((date, timeline.default_photo().clone()))
    })?;

    let added = PhotoAdded {
        ok: true,
        key: args.key.clone(),
        timestamp: fmt_ts(&timestamp),
        date,
        default_photo,
    };
    render(output, &added, |a, w| {
        writeln!(w, "added photo {} on {}", a.key, a.date)?;
        if a.default_photo.key() == Some(a.key.as_str()) {
            writeln!(w, "now the default photo")?;
        }
        Ok(())
    })
}

fn run_delete(args: &PhotoDeleteArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let (removed, default_photo) = state.update(|timeline| {
        let removed = timeline.delete_photos(&args.keys);
        Ok::<_, TimelineError>((removed, timeline.default_photo().clone()))
    })?;

    let deleted: Vec<String> = removed.into_iter().map(|p| p.key).collect();
    let unknown = args
        .keys
        .iter()
        .filter(|key| !deleted.contains(*key))
        .cloned()
        .collect();
    let report = PhotosDeleted {
        ok: true,
        deleted,
        unknown,
        default_photo,
    };
    render(output, &report, |r, w| {
        for key in &r.deleted {
            writeln!(w, "deleted photo {key}")?;
        }
        for key in &r.unknown {
            writeln!(w, "no photo with key {key}; skipped")?;
        }
        writeln!(w, "default photo: {}", r.default_photo.key().unwrap_or("none"))
    })
}

fn run_default(args: &PhotoDefaultArgs, state: &StateFile, output: OutputMode) -> Result<()> {
    let default_photo = state.update(|timeline| {
        match &args.key {
            Some(key) if !args.clear => timeline.set_default_photo(key)?,
            _ => timeline.clear_default_photo(),
        }
        Ok::<_, TimelineError>(timeline.default_photo().clone())
    })?;

    let report = DefaultChanged {
        ok: true,
        default_photo,
    };
    render(output, &report, |r, w| {
        let pinned = if r.default_photo.set { "pinned" } else { "newest" };
        match r.default_photo.key() {
            Some(key) => writeln!(w, "default photo: {key} ({pinned})"),
            None => writeln!(w, "default photo: none"),
        }
    })
}
