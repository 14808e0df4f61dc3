//! Tests for layered configuration loading.

use std::sync::{Mutex, OnceLock};

use provexec::config::ProbeConfig;
use provexec::error::ProbeError;
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 4] = [
    "PROVEXEC_MODEL",
    "PROVEXEC_MAX_STEPS",
    "PROVEXEC_RESUME_MAX_STEPS",
    "PROVEXEC_PROVIDER_TOOL",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("provexec.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_applies_file_then_env() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "model = \"claude-opus-4-1\"\nmax_steps = 8\nresume_max_steps = 4\n",
    );

    std::env::set_var("PROVEXEC_MAX_STEPS", "6");

    let config = ProbeConfig::load(Some(&path)).unwrap();
    assert_eq!(config.model, "claude-opus-4-1");
    assert_eq!(config.max_steps, 6);
    assert_eq!(config.resume_max_steps, 4);
}

#[test]
fn provider_credentials_do_not_affect_config() {
    let _lock = env_lock_guard();
    let mut keys = CONFIG_ENV_VARS.to_vec();
    keys.push("ANTHROPIC_API_KEY");
    let _env = EnvGuard::capture(&keys);
    std::env::set_var("ANTHROPIC_API_KEY", "sk-ant-test");

    let config = ProbeConfig::from_env().unwrap();
    assert_eq!(config, ProbeConfig::default());
    assert!(!format!("{config:?}").contains("sk-ant-test"));
}

#[test]
fn load_without_env_keeps_file_values() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::capture(&CONFIG_ENV_VARS);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "provider_tool = \"re:^web_search_\\\\d+$\"\n");

    let config = ProbeConfig::load(Some(&path)).unwrap();
    assert_eq!(config.provider_tool, "re:^web_search_\\d+$");
    assert_eq!(config.max_steps, 5);
}

#[test]
fn missing_explicit_file_is_configuration_error() {
    let _lock = env_lock_guard();
    let dir = TempDir::new().unwrap();
    let err = ProbeConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ProbeError::Configuration(_)));
    assert!(err.is_fatal());
}

#[test]
fn malformed_file_is_config_file_error() {
    let _lock = env_lock_guard();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "max_steps = \"many\"\n");
    let err = ProbeConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ProbeError::ConfigFile(_)));
}

#[test]
fn malformed_env_number_is_rejected() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var("PROVEXEC_RESUME_MAX_STEPS", "-1");

    let err = ProbeConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("PROVEXEC_RESUME_MAX_STEPS"));
}
