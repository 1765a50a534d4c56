use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub events: EventNames,
    pub ack: AckConfig,
    pub output: OutputConfig,
}

/// Wire names of the chat protocol's events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventNames {
    pub message: String,
    pub join: String,
    pub leave: String,
    pub typing: String,
    pub upload: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            message: "chat message".to_string(),
            join: "join".to_string(),
            leave: "leave".to_string(),
            typing: "typing".to_string(),
            upload: "upload".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AckConfig {
    pub auto_reply: bool,
    pub require_ack_for_messages: bool,
}

impl Default for AckConfig {
    fn default() -> Self {
        Self {
            auto_reply: true,
            require_ack_for_messages: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            color: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            events: EventNames::default(),
            ack: AckConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// A message produced while resolving the config file.
///
/// Config is loaded before logging is set up, so these are returned to the
/// caller and logged once the logger exists.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadNote {
    pub level: log::Level,
    pub message: String,
}

impl LoadNote {
    fn info(message: String) -> Self {
        Self {
            level: log::Level::Info,
            message,
        }
    }

    fn warn(message: String) -> Self {
        Self {
            level: log::Level::Warn,
            message,
        }
    }

    /// Emit the note through the `log` facade.
    pub fn log(&self) {
        log::log!(self.level, "{}", self.message);
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<(Self, Vec<LoadNote>)> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            let config = Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()))?;
            return Ok((config, vec![LoadNote::info(format!("Loaded config from: {}", path.display()))]));
        }

        let project_name = env!("CARGO_PKG_NAME");
        let mut candidates = Vec::new();

        // Primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }

        // Fallback location: ./<project>.yml
        candidates.push(PathBuf::from(format!("{}.yml", project_name)));

        Ok(Self::load_first(&candidates))
    }

    /// Load the first candidate that exists and parses, else defaults.
    fn load_first(candidates: &[PathBuf]) -> (Self, Vec<LoadNote>) {
        let mut notes = Vec::new();
        for candidate in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => {
                    notes.push(LoadNote::info(format!("Loaded config from: {}", candidate.display())));
                    return (config, notes);
                }
                Err(e) => {
                    notes.push(LoadNote::warn(format!(
                        "Failed to load config from {}: {:#}",
                        candidate.display(),
                        e
                    )));
                }
            }
        }

        // No config file found, use defaults
        notes.push(LoadNote::info("No config file found, using defaults".to_string()));
        (Self::default(), notes)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.events.message, "chat message");
        assert!(config.ack.auto_reply);
        assert!(!config.ack.require_ack_for_messages);
        assert!(config.output.color);
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "events:\n  message: msg\nack:\n  require_ack_for_messages: true").unwrap();

        let (config, notes) = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, log::Level::Info);
        assert_eq!(config.events.message, "msg");
        assert_eq!(config.events.join, "join");
        assert!(config.ack.require_ack_for_messages);
        assert!(config.ack.auto_reply);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "events: [not, a, map]").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_broken_candidate_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.yml");
        fs::write(&broken, "events: [not, a, map]").unwrap();
        let good = dir.path().join("good.yml");
        fs::write(&good, "output:\n  pretty: true").unwrap();

        let (config, notes) = Config::load_first(&[broken.clone(), good]);
        assert!(config.output.pretty);
        assert_eq!(notes[0].level, log::Level::Warn);
        assert!(notes[0].message.contains(&broken.display().to_string()));
        assert_eq!(notes[1].level, log::Level::Info);
    }

    #[test]
    fn test_no_candidates_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, notes) = Config::load_first(&[dir.path().join("missing.yml")]);
        assert_eq!(config.events.message, "chat message");
        assert_eq!(notes, vec![LoadNote::info("No config file found, using defaults".to_string())]);
    }
}
