//! Configuration system (layered: defaults > config file > env > code).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProbeError, Result};

/// Model the reproduction agents are built against.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
/// Default step budget for the first turn.
pub const DEFAULT_MAX_STEPS: u32 = 5;
/// Default step budget for the resumed turn.
pub const DEFAULT_RESUME_MAX_STEPS: u32 = 3;
/// Substring identifying the provider-executed tool by name.
pub const DEFAULT_PROVIDER_TOOL: &str = "web_search";
/// Bound on tool-result previews.
pub const DEFAULT_PREVIEW_CHARS: usize = 150;
/// Bound on caught error messages in assertion details.
pub const DEFAULT_ERROR_CHARS: usize = 300;

const CONFIG_FILE_NAME: &str = "provexec.toml";

/// Harness configuration.
///
/// Resolution order (later wins):
/// 1. Built-in defaults
/// 2. `provexec.toml` (working directory, then the platform config dir)
/// 3. Environment variables (a `.env` file is loaded first if present)
/// 4. Explicit overrides from code or the command line
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub model: String,
    pub max_steps: u32,
    pub resume_max_steps: u32,
    pub provider_tool: String,
    pub preview_chars: usize,
    pub error_chars: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            resume_max_steps: DEFAULT_RESUME_MAX_STEPS,
            provider_tool: DEFAULT_PROVIDER_TOOL.to_string(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            error_chars: DEFAULT_ERROR_CHARS,
        }
    }
}

/// On-disk shape of `provexec.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    model: Option<String>,
    max_steps: Option<u32>,
    resume_max_steps: Option<u32>,
    provider_tool: Option<String>,
    preview_chars: Option<usize>,
    error_chars: Option<usize>,
}

impl ProbeConfig {
    /// Load defaults, then the config file (explicit path or discovered), then env.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => discover_config_file(),
        };
        if let Some(file) = file {
            let raw = std::fs::read_to_string(&file).map_err(|e| {
                ProbeError::Configuration(format!("cannot read {}: {e}", file.display()))
            })?;
            config.merge_toml(&raw)?;
            tracing::debug!(path = %file.display(), "loaded config file");
        }

        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults overlaid with the process environment only.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from a TOML document.
    pub fn merge_toml(&mut self, raw: &str) -> Result<()> {
        let file: ConfigFile = toml::from_str(raw)?;
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(n) = file.max_steps {
            self.max_steps = n;
        }
        if let Some(n) = file.resume_max_steps {
            self.resume_max_steps = n;
        }
        if let Some(pattern) = file.provider_tool {
            self.provider_tool = pattern;
        }
        if let Some(n) = file.preview_chars {
            self.preview_chars = n;
        }
        if let Some(n) = file.error_chars {
            self.error_chars = n;
        }
        Ok(())
    }

    /// Overlay values from an environment lookup.
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("PROVEXEC_MODEL") {
            self.model = model;
        }
        if let Some(raw) = lookup("PROVEXEC_MAX_STEPS") {
            self.max_steps = parse_env_number("PROVEXEC_MAX_STEPS", &raw)?;
        }
        if let Some(raw) = lookup("PROVEXEC_RESUME_MAX_STEPS") {
            self.resume_max_steps = parse_env_number("PROVEXEC_RESUME_MAX_STEPS", &raw)?;
        }
        if let Some(pattern) = lookup("PROVEXEC_PROVIDER_TOOL") {
            self.provider_tool = pattern;
        }
        Ok(())
    }
}

fn parse_env_number(key: &str, raw: &str) -> Result<u32> {
    raw.trim().parse().map_err(|_| {
        ProbeError::Configuration(format!("{key} must be a positive integer, got '{raw}'"))
    })
}

fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    directories::ProjectDirs::from("", "", "provexec")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reproduction_settings() {
        let config = ProbeConfig::default();
        assert_eq!(config.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.resume_max_steps, 3);
        assert_eq!(config.preview_chars, 150);
        assert_eq!(config.error_chars, 300);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = ProbeConfig::default();
        config
            .merge_toml("max_steps = 8\nprovider_tool = \"code_execution\"\n")
            .unwrap();
        config
            .merge_env(env(&[("PROVEXEC_MAX_STEPS", "2"), ("PROVEXEC_MODEL", "claude-test")]))
            .unwrap();

        assert_eq!(config.max_steps, 2);
        assert_eq!(config.provider_tool, "code_execution");
        assert_eq!(config.model, "claude-test");
    }

    #[test]
    fn malformed_step_count_is_rejected() {
        let mut config = ProbeConfig::default();
        let err = config
            .merge_env(env(&[("PROVEXEC_MAX_STEPS", "five")]))
            .unwrap_err();
        assert!(err.to_string().contains("PROVEXEC_MAX_STEPS"));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut config = ProbeConfig::default();
        assert!(config.merge_toml("max_stepz = 3").is_err());
    }
}
