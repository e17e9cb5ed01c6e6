use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use crate::datekey::Zone;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub timeline: TimelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// `local`, `utc`, or a fixed offset such as `-08:00`.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl TimelineConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
    pub zone: Zone,
}

/// Load `.verdant/config.toml` under `project_root`, or defaults.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".verdant/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("verdant/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(
    project_root: &Path,
    cli_json: bool,
    cli_tz: Option<&str>,
) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    let env_tz = env::var("VERDANT_TZ").ok();
    let zone = resolve_zone(
        cli_tz,
        env_tz.as_deref(),
        project.timeline.timezone.as_deref(),
        user.timezone.as_deref(),
    )?;

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
        zone,
    })
}

fn resolve_output(cli_json: bool, user_output: Option<String>, env_format: Option<String>) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

/// First zone found wins: flag, env, project, user, then local.
fn resolve_zone(
    cli_tz: Option<&str>,
    env_tz: Option<&str>,
    project_tz: Option<&str>,
    user_tz: Option<&str>,
) -> Result<Zone> {
    let Some((source, raw)) = [
        ("--tz", cli_tz),
        ("VERDANT_TZ", env_tz),
        ("project config", project_tz),
        ("user config", user_tz),
    ]
    .into_iter()
    .find_map(|(source, raw)| raw.filter(|r| !r.trim().is_empty()).map(|r| (source, r))) else {
        return Ok(Zone::Local);
    };

    raw.parse::<Zone>()
        .with_context(|| format!("Invalid time zone from {source}"))
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = TempDir::new().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.timeline.timezone.is_none());
        assert_eq!(cfg.timeline.lock_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn project_config_parses_timeline_table() {
        let root = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".verdant")).expect("mkdir");
        std::fs::write(
            root.path().join(".verdant/config.toml"),
            "[timeline]\ntimezone = \"-05:00\"\nlock_timeout_ms = 250\n",
        )
        .expect("write");

        let cfg = load_project_config(root.path()).expect("load");
        assert_eq!(cfg.timeline.timezone.as_deref(), Some("-05:00"));
        assert_eq!(cfg.timeline.lock_timeout_ms, 250);
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".verdant")).expect("mkdir");
        std::fs::write(root.path().join(".verdant/config.toml"), "[timeline\n").expect("write");
        assert!(load_project_config(root.path()).is_err());
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("pretty".to_string()), Some("text".to_string()));
        assert_eq!(output, "json");
    }

    #[test]
    fn env_beats_user_config_and_aliases_normalize() {
        let output = resolve_output(false, Some("json".to_string()), Some("human".to_string()));
        assert_eq!(output, "pretty");
        let output = resolve_output(false, Some("plain".to_string()), Some("bogus".to_string()));
        assert_eq!(output, "text");
    }

    #[test]
    fn zone_precedence() {
        let zone = resolve_zone(None, Some("utc"), Some("+01:00"), Some("-02:00")).expect("zone");
        assert_eq!(zone, Zone::Utc);

        let zone = resolve_zone(None, None, Some("+01:00"), Some("-02:00")).expect("zone");
        assert_eq!(zone, Zone::Fixed(FixedOffset::east_opt(3600).unwrap()));

        let zone = resolve_zone(None, Some("  "), None, None).expect("zone");
        assert_eq!(zone, Zone::Local);
    }

    #[test]
    fn invalid_zone_names_its_source() {
        let err = resolve_zone(Some("nowhere"), None, None, None).unwrap_err();
        assert!(format!("{err:#}").contains("--tz"));
    }
}
