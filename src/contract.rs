//! # contract: gateway interface to the helpdesk API
//!
//! A single trait ([`HelpdeskApi`]) covering every remote operation the sync
//! engine performs. One trait method corresponds to exactly one HTTP call;
//! the implementor classifies the outcome into [`SyncError`] per the rules
//! in `error.rs` (404 → `ResourceDoesNotExist`, other failures →
//! `UnexpectedRequestError`, malformed 2xx bodies → `UnexpectedRequestResult`).
//!
//! The trait is annotated for `mockall`, so the engine and the integration
//! tests can run against a deterministic mock instead of a live helpdesk.

use std::path::Path;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::SyncError;
use crate::model::{Article, ArticleAttachment, ExistingSection, NewSection, Translation};

/// Remote operations against the helpdesk knowledge base.
///
/// All methods are sequential, fail-fast calls: no retries, no timeouts
/// beyond the transport default, no compensation on partial failure.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    /// List all sections of the configured category.
    async fn list_sections(&self) -> Result<Vec<ExistingSection>, SyncError>;

    /// Create a section in the configured category.
    async fn create_section(&self, section: &NewSection) -> Result<ExistingSection, SyncError>;

    /// Delete a section by id. A 404 surfaces as `ResourceDoesNotExist`;
    /// callers may treat that as "already absent".
    async fn delete_section(&self, section_id: i64) -> Result<(), SyncError>;

    /// Create an article under its parent section. The returned article
    /// carries the remote-assigned id when the response body has one.
    async fn create_article(&self, article: &Article) -> Result<Article, SyncError>;

    /// List all articles of a section. Used only by publish.
    async fn list_articles(&self, section_id: i64) -> Result<Vec<Article>, SyncError>;

    /// Upload a local image as an inline attachment (multipart).
    async fn upload_attachment(&self, file: &Path) -> Result<ArticleAttachment, SyncError>;

    /// Link previously uploaded attachments to an article in one call.
    async fn link_attachments(
        &self,
        article_id: i64,
        attachment_ids: &[i64],
    ) -> Result<(), SyncError>;

    /// List all translations of an article.
    async fn list_translations(&self, article_id: i64) -> Result<Vec<Translation>, SyncError>;

    /// Update one translation (used to flip `draft` off when publishing).
    async fn update_translation(&self, translation: &Translation) -> Result<(), SyncError>;
}
