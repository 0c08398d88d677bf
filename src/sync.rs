//! High-level reconciliation: maps the local HTML tree onto the remote
//! section/article tree and publishes draft translations.
//!
//! # Responsibilities
//! - Walk the source tree top-down, depth-first, creating or overwriting one
//!   remote section per directory and one article per `.html` file.
//! - For each article, run the dependent operation chain: upload inline
//!   images, rewrite the body to the hosted URLs, create the article, link
//!   the attachments.
//! - Publish a section by flipping every translation of every article out of
//!   draft.
//!
//! # Error handling
//! Everything is fail-fast: the first unrecoverable [`SyncError`] aborts the
//! run. The only recovered condition is `ResourceDoesNotExist` during the
//! overwrite lookup and delete. A failure after attachments were uploaded
//! leaves those attachments orphaned remotely; there is no compensation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use regex::Regex;
use tracing::{debug, info};

use crate::contract::HelpdeskApi;
use crate::error::SyncError;
use crate::model::{Article, ArticleAttachment, ExistingSection, NewSection};

/// Reconciliation engine over a [`HelpdeskApi`] gateway.
///
/// When `section_pattern` is set, the overwrite lookup matches existing
/// section names against the pattern instead of requiring name equality.
pub struct Synchroniser<A> {
    api: A,
    section_pattern: Option<Regex>,
}

/// What a sync run created, for downstream audit and CLI output.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub sections: Vec<SectionReport>,
    pub articles: Vec<ArticleReport>,
}

#[derive(Debug)]
pub struct SectionReport {
    pub section_id: i64,
    pub name: String,
}

#[derive(Debug)]
pub struct ArticleReport {
    pub article_id: i64,
    pub title: String,
}

impl<A: HelpdeskApi> Synchroniser<A> {
    pub fn new(api: A, section_pattern: Option<Regex>) -> Self {
        Synchroniser {
            api,
            section_pattern,
        }
    }

    /// Walks `source_dir` depth-first and mirrors it into the remote
    /// category: directories become sections (parent link preserved through
    /// the per-run path → id mapping), `.html` files become articles. Files
    /// with any other extension are skipped. An `.html` file directly under
    /// `source_dir`, with no enclosing section, is an
    /// [`SyncError::InvalidFileStructure`].
    pub async fn sync_tree(&self, source_dir: &Path) -> Result<SyncReport, SyncError> {
        info!(source_dir = %source_dir.display(), "Starting tree synchronisation");
        let mut section_ids: HashMap<PathBuf, i64> = HashMap::new();
        let mut report = SyncReport::default();
        self.sync_dir(
            source_dir.to_path_buf(),
            PathBuf::new(),
            &mut section_ids,
            &mut report,
        )
        .await?;
        info!(
            sections = report.sections.len(),
            articles = report.articles.len(),
            "Tree synchronisation complete"
        );
        Ok(report)
    }

    /// One directory level of the walk. Siblings are visited in
    /// lexicographic order; a subdirectory's subtree is fully processed
    /// before the next sibling.
    fn sync_dir<'a>(
        &'a self,
        dir: PathBuf,
        rel: PathBuf,
        section_ids: &'a mut HashMap<PathBuf, i64>,
        report: &'a mut SyncReport,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move {
            let mut entries = fs::read_dir(&dir)
                .and_then(|iter| iter.collect::<Result<Vec<_>, _>>())
                .map_err(|e| SyncError::io(&dir, e))?;
            entries.sort_by_key(|entry| entry.file_name());

            for entry in entries {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                let file_type = entry.file_type().map_err(|e| SyncError::io(&path, e))?;

                if file_type.is_dir() {
                    let parent_id = section_ids.get(&rel).copied();
                    let section = NewSection::from_dir_name(&name, parent_id);
                    info!(
                        name = %section.name,
                        parent = ?section.parent_section_id,
                        position = section.position,
                        "Creating section"
                    );
                    let section_id = self.create_section_or_overwrite(&section).await?;
                    let entry_rel = rel.join(&name);
                    section_ids.insert(entry_rel.clone(), section_id);
                    report.sections.push(SectionReport {
                        section_id,
                        name: section.name,
                    });
                    self.sync_dir(path, entry_rel, section_ids, report).await?;
                } else if path.extension().and_then(|e| e.to_str()) == Some("html") {
                    let parent_id =
                        section_ids.get(&rel).copied().ok_or_else(|| {
                            SyncError::InvalidFileStructure(format!(
                                "article {} should be located in a section, not directly under a category",
                                path.display()
                            ))
                        })?;
                    let title = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| name.clone());
                    let body =
                        fs::read_to_string(&path).map_err(|e| SyncError::io(&path, e))?;
                    info!(title = %title, section_id = parent_id, "Creating article");
                    let created = self
                        .create_article(Article::new(title.clone(), body, parent_id, &path))
                        .await?;
                    report.articles.push(ArticleReport {
                        // create_article guarantees the id is set
                        article_id: created.id.unwrap_or_default(),
                        title,
                    });
                } else {
                    debug!(path = %path.display(), "Skipping non-article file");
                }
            }
            Ok(())
        })
    }

    /// Create-or-replace for one section: look up an existing section with
    /// the same parent (exact name, or the configured pattern), delete it if
    /// present, then create the new one and return its id. A 404 from either
    /// the lookup or the delete means "nothing to remove" and the create
    /// proceeds.
    pub async fn create_section_or_overwrite(
        &self,
        section: &NewSection,
    ) -> Result<i64, SyncError> {
        match self.find_overwrite_target(section).await {
            Ok(existing) => {
                info!(
                    name = %existing.name,
                    id = existing.id,
                    "Section already exists, deleting it before recreate"
                );
                match self.api.delete_section(existing.id).await {
                    Ok(()) | Err(SyncError::ResourceDoesNotExist) => {}
                    Err(e) => return Err(e),
                }
            }
            Err(SyncError::ResourceDoesNotExist) => {}
            Err(e) => return Err(e),
        }
        let created = self.api.create_section(section).await?;
        Ok(created.id)
    }

    /// Article pipeline: upload each unique inline image (resolved against
    /// the article file's own directory), rewrite the body with the hosted
    /// URLs, create the article remotely, then link the attachments in one
    /// call. Any step failing aborts the rest; already-uploaded attachments
    /// are not rolled back.
    pub async fn create_article(&self, article: Article) -> Result<Article, SyncError> {
        let source_dir = article
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut uploaded: Vec<(String, ArticleAttachment)> = Vec::new();
        for image in article.body_images() {
            if uploaded.iter().any(|(reference, _)| reference == &image) {
                continue;
            }
            let file = source_dir.join(&image);
            debug!(file = %file.display(), "Uploading inline image");
            let attachment = self.api.upload_attachment(&file).await?;
            uploaded.push((image, attachment));
        }

        let mapping: HashMap<String, String> = uploaded
            .iter()
            .map(|(reference, attachment)| (reference.clone(), attachment.content_url.clone()))
            .collect();
        let rewritten = article.with_hosted_images(&mapping);

        let created = self.api.create_article(&rewritten).await?;
        let article_id = created.id.ok_or_else(|| {
            SyncError::UnexpectedRequestResult(
                "the id of the article that has been created is not set".to_string(),
            )
        })?;

        if !uploaded.is_empty() {
            let attachment_ids: Vec<i64> =
                uploaded.iter().map(|(_, attachment)| attachment.id).collect();
            self.api
                .link_attachments(article_id, &attachment_ids)
                .await?;
        }
        Ok(created)
    }

    /// Exact (name, parent) lookup, used by the publish entry point.
    pub async fn find_section(
        &self,
        name: &str,
        parent_section_id: Option<i64>,
    ) -> Result<ExistingSection, SyncError> {
        let sections = self.api.list_sections().await?;
        sections
            .into_iter()
            .find(|s| s.name == name && s.parent_section_id == parent_section_id)
            .ok_or(SyncError::ResourceDoesNotExist)
    }

    /// Flip every translation of every article in the section out of draft.
    /// Fails fast on the first article or translation that cannot be
    /// updated.
    pub async fn publish_section(&self, section: &ExistingSection) -> Result<(), SyncError> {
        info!(section = %section.name, id = section.id, "Publishing section");
        let articles = self.api.list_articles(section.id).await?;
        for article in articles {
            let article_id = article.id.ok_or(SyncError::MissingArticleId)?;
            let translations = self.api.list_translations(article_id).await?;
            for translation in translations {
                self.api
                    .update_translation(&translation.published())
                    .await?;
            }
        }
        Ok(())
    }

    async fn find_overwrite_target(
        &self,
        section: &NewSection,
    ) -> Result<ExistingSection, SyncError> {
        let sections = self.api.list_sections().await?;
        sections
            .into_iter()
            .find(|s| {
                s.parent_section_id == section.parent_section_id
                    && match &self.section_pattern {
                        Some(pattern) => pattern.is_match(&s.name),
                        None => s.name == section.name,
                    }
            })
            .ok_or(SyncError::ResourceDoesNotExist)
    }
}
