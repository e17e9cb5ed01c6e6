#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use verdant_core::DateKeyer;
use verdant_core::config::resolve_config;
use verdant_core::store::StateFile;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "vd: a plant's care timeline, by day",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Plant state file.
    #[arg(long, global = true, default_value = "plant.json")]
    file: PathBuf,

    /// Time zone for calendar dates: local, utc, an offset like -08:00, or a name like Europe/Berlin.
    #[arg(long, global = true, allow_hyphen_values = true)]
    tz: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Show the timeline views",
        long_about = "Show the day index, calendar summary, navigation index and default photo.",
        after_help = "EXAMPLES:\n    # Everything\n    vd show\n\n    # Only the month menu\n    vd show --nav\n\n    # Emit machine-readable output\n    vd show --calendar --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(next_help_heading = "Care", about = "Record or remove care events")]
    Event(cmd::event::EventArgs),

    #[command(next_help_heading = "Care", about = "Add, edit or delete notes")]
    Note(cmd::note::NoteArgs),

    #[command(next_help_heading = "Care", about = "Manage photos and the default photo")]
    Photo(cmd::photo::PhotoArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Rebuild every view from the raw collections",
        after_help = "EXAMPLES:\n    vd rebuild --file fern.json"
    )]
    Rebuild,

    #[command(
        next_help_heading = "Maintenance",
        about = "Check the state file against the timeline invariants",
        after_help = "EXAMPLES:\n    # Exit status is non-zero when anything is off\n    vd verify --json"
    )]
    Verify,

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    vd completions bash > ~/.local/share/bash-completion/completions/vd"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("VERDANT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "verdant_core=debug,verdant_cli=debug,info"
        } else {
            "verdant_cli=info,warn"
        })
    });

    let format = env::var("VERDANT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Directory whose `.verdant/config.toml` applies to `file`.
fn project_root(file: &Path) -> anyhow::Result<PathBuf> {
    match file.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => Ok(parent.to_path_buf()),
        None => Ok(env::current_dir()?),
    }
}

fn run(cli: &Cli) -> (OutputMode, anyhow::Result<()>) {
    let fallback = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Pretty
    };

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return (
            fallback,
            cmd::completions::run_completions(args.shell, &mut command),
        );
    }

    let config = match project_root(&cli.file)
        .and_then(|root| resolve_config(&root, cli.json, cli.tz.as_deref()))
    {
        Ok(config) => config,
        Err(err) => return (fallback, Err(err)),
    };
    let output = OutputMode::from_resolved(&config.resolved_output);
    debug!(zone = %config.zone, output = %config.resolved_output, "configuration resolved");

    let state = StateFile::new(&cli.file, DateKeyer::new(config.zone))
        .with_lock_timeout(config.project.timeline.lock_timeout());

    let result = match &cli.command {
        Commands::Show(args) => cmd::show::run_show(args, &state, output),
        Commands::Event(args) => cmd::event::run_event(args, &state, output),
        Commands::Note(args) => cmd::note::run_note(args, &state, output),
        Commands::Photo(args) => cmd::photo::run_photo(args, &state, output),
        Commands::Rebuild => cmd::rebuild::run_rebuild(&state, output),
        Commands::Verify => cmd::verify::run_verify(&state, output),
        Commands::Completions(_) => Ok(()),
    };
    (output, result)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!(file = %cli.file.display(), "verbose mode enabled");
    }

    let (output, result) = run(&cli);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            let _ = render_error(output, &CliError::from_error(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["vd", "show", "--json", "--file", "fern.json", "--tz", "utc"]);
        assert!(cli.json);
        assert_eq!(cli.file, PathBuf::from("fern.json"));
        assert_eq!(cli.tz.as_deref(), Some("utc"));
    }

    #[test]
    fn negative_offset_is_a_tz_value() {
        let cli = Cli::parse_from(["vd", "--tz", "-08:00", "show"]);
        assert_eq!(cli.tz.as_deref(), Some("-08:00"));
    }

    #[test]
    fn file_defaults_to_plant_json() {
        let cli = Cli::parse_from(["vd", "rebuild"]);
        assert_eq!(cli.file, PathBuf::from("plant.json"));
        assert!(matches!(cli.command, Commands::Rebuild));
    }

    #[test]
    fn show_view_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["vd", "show", "--nav", "--calendar"]).is_err());
        let cli = Cli::parse_from(["vd", "show", "--nav"]);
        assert!(matches!(cli.command, Commands::Show(ref args) if args.nav));
    }

    #[test]
    fn event_type_is_validated_by_parser() {
        assert!(Cli::try_parse_from(["vd", "event", "add", "mist", "2024-03-01T00:00:00Z"]).is_err());
        assert!(Cli::try_parse_from(["vd", "event", "add", "Water", "2024-03-01T00:00:00Z"]).is_ok());
    }

    #[test]
    fn photo_default_needs_key_or_clear() {
        assert!(Cli::try_parse_from(["vd", "photo", "default"]).is_err());
        assert!(Cli::try_parse_from(["vd", "photo", "default", "k1", "--clear"]).is_err());
        assert!(Cli::try_parse_from(["vd", "photo", "default", "--clear"]).is_ok());
    }

    #[test]
    fn photo_delete_needs_a_key() {
        assert!(Cli::try_parse_from(["vd", "photo", "delete"]).is_err());
    }

    #[test]
    fn state_file_parent_is_project_root() {
        assert_eq!(
            project_root(Path::new("plants/fern.json")).expect("root"),
            PathBuf::from("plants")
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
