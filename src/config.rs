use std::path::PathBuf;

use tracing::info;

/// Connection settings for the helpdesk API, merged from the static config
/// file and the credential environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base path of the knowledge base API, e.g.
    /// `https://example.zendesk.com/api/v2/help_center`.
    pub base_path: String,
    pub user: String,
    pub password: String,
    /// Category all synced sections live under.
    pub category_id: i64,
    /// Optional regex; when set, the overwrite lookup matches existing
    /// section names against it instead of requiring exact equality.
    pub section_pattern: Option<String>,
}

/// Fully merged runtime configuration for a run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    /// Root of the local HTML tree to synchronise.
    pub source_dir: PathBuf,
}

impl AppConfig {
    pub fn trace_loaded(&self) {
        info!(
            base_path = %self.api.base_path,
            category_id = self.api.category_id,
            source_dir = %self.source_dir.display(),
            section_pattern = ?self.api.section_pattern,
            "Loaded AppConfig"
        );
    }
}
