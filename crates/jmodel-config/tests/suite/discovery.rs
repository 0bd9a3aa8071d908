use std::ffi::OsString;
use std::sync::Mutex;

use jmodel_config::{discover_config_path, load_for_root, ModelConfig, JMODEL_CONFIG_ENV_VAR};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_jmodel_toml_before_dot_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(JMODEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".jmodel.toml");
    std::fs::write(&hidden, "builtin_jdk = false\n").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(hidden.canonicalize().unwrap_or(hidden))
    );

    let visible = dir.path().join("jmodel.toml");
    std::fs::write(&visible, "builtin_jdk = true\n").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(visible.canonicalize().unwrap_or(visible))
    );
}

#[test]
fn env_var_overrides_discovery() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("jmodel.toml"), "builtin_jdk = true\n").unwrap();
    let custom = dir.path().join("custom.toml");
    std::fs::write(&custom, "builtin_jdk = false\n").unwrap();

    let _env = EnvVarGuard::set(JMODEL_CONFIG_ENV_VAR, &custom);
    let (config, path) = load_for_root(dir.path()).unwrap();
    assert!(!config.builtin_jdk);
    assert_eq!(path, Some(custom.canonicalize().unwrap_or(custom)));
}

#[test]
fn missing_config_yields_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(JMODEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path) = load_for_root(dir.path()).unwrap();
    assert_eq!(config, ModelConfig::default());
    assert!(config.builtin_jdk);
    assert_eq!(path, None);
}
