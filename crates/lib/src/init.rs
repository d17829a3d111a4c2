//! Initialize the configuration directory: create ~/.slack-bridge and a default config.json.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"{
  "gateway": { "bind": "127.0.0.1", "port": 15152, "eventsPath": "/slack/events" },
  "slack": { "allowRetry": false },
  "backend": { "baseUrl": "http://127.0.0.1:5001/v1", "appId": "", "user": "slack-user" }
}
"#;

/// Create the config directory and default config file if they do not exist.
/// An existing config.json is left untouched. Returns the config directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, Config};

    #[test]
    fn default_config_template_parses() {
        let config: Config = serde_json::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.gateway.port, 15152);
        assert!(!config.slack.allow_retry);
    }

    #[test]
    fn init_writes_config_once() {
        let dir = std::env::temp_dir().join(format!("slack-bridge-init-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");
        let created = init_config_dir(&path).unwrap();
        assert_eq!(created, dir.join("nested"));
        let (config, _) = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.backend.user, "slack-user");

        std::fs::write(&path, "{\"gateway\":{\"port\":1}}").unwrap();
        init_config_dir(&path).unwrap();
        let (config, _) = load_config(Some(path)).unwrap();
        assert_eq!(config.gateway.port, 1);
        let _ = std::fs::remove_dir_all(dir);
    }
}
