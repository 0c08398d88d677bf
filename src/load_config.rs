use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{ApiConfig, AppConfig};

#[derive(Deserialize)]
struct StaticConfig {
    api: ApiSection,
    sync: SyncSection,
}

#[derive(Deserialize)]
struct ApiSection {
    base_path: String,
    category_id: i64,
    #[serde(default)]
    section_pattern: Option<String>,
}

#[derive(Deserialize)]
struct SyncSection {
    source_dir: std::path::PathBuf,
}

/// Loads a static YAML config file (no secrets) and injects the credential
/// env vars (`HELPDESK_USER`, `HELPDESK_PASSWORD`). Returns a fully merged
/// [`AppConfig`] or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let user = match std::env::var("HELPDESK_USER") {
        Ok(user) => {
            info!("HELPDESK_USER found in env");
            user
        }
        Err(e) => {
            error!(error = ?e, "HELPDESK_USER environment variable not set");
            return Err(anyhow::anyhow!(
                "HELPDESK_USER environment variable not set: {e}"
            ));
        }
    };

    let password = match std::env::var("HELPDESK_PASSWORD") {
        Ok(password) => password,
        Err(e) => {
            error!(error = ?e, "HELPDESK_PASSWORD environment variable not set");
            return Err(anyhow::anyhow!(
                "HELPDESK_PASSWORD environment variable not set: {e}"
            ));
        }
    };

    let config = AppConfig {
        api: ApiConfig {
            base_path: static_conf.api.base_path,
            user,
            password,
            category_id: static_conf.api.category_id,
            section_pattern: static_conf.api.section_pattern,
        },
        source_dir: static_conf.sync.source_dir,
    };

    config.trace_loaded();
    Ok(config)
}
