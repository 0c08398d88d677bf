//! Reqwest-backed implementation of the [`HelpdeskApi`] gateway.
//!
//! Every operation is one authenticated HTTP call against the helpdesk's
//! JSON API. Outcome classification lives in [`HelpdeskClient::execute`]:
//! 404 becomes [`SyncError::ResourceDoesNotExist`], any other non-2xx status
//! or transport failure becomes [`SyncError::UnexpectedRequestError`] with
//! the raw response body attached, and a 2xx body that cannot be decoded
//! becomes [`SyncError::UnexpectedRequestResult`].

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ApiConfig;
use crate::contract::HelpdeskApi;
use crate::error::SyncError;
use crate::model::{Article, ArticleAttachment, ExistingSection, NewSection, Translation};

// Request/response envelopes. The API wraps every payload in a single-key
// object named after the resource.

#[derive(Serialize)]
struct NewSectionBody<'a> {
    section: &'a NewSection,
}

#[derive(Deserialize)]
struct SectionBody {
    section: ExistingSection,
}

#[derive(Deserialize)]
struct SectionsBody {
    sections: Vec<ExistingSection>,
}

#[derive(Serialize)]
struct NewArticleBody<'a> {
    article: &'a Article,
}

#[derive(Deserialize)]
struct ArticleBody {
    article: Article,
}

#[derive(Deserialize)]
struct ArticlesBody {
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct AttachmentBody {
    article_attachment: ArticleAttachment,
}

#[derive(Serialize)]
struct AttachmentIdsBody<'a> {
    attachment_ids: &'a [i64],
}

#[derive(Deserialize)]
struct TranslationsBody {
    translations: Vec<Translation>,
}

#[derive(Serialize)]
struct TranslationBody<'a> {
    translation: &'a Translation,
}

/// HTTP gateway to the helpdesk, bound to one category and one set of basic
/// auth credentials.
pub struct HelpdeskClient {
    http: Client,
    base_path: String,
    user: String,
    password: String,
    category_id: i64,
}

impl HelpdeskClient {
    pub fn new(config: &ApiConfig) -> Self {
        HelpdeskClient {
            http: Client::new(),
            base_path: config.base_path.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            category_id: config.category_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path)
    }

    /// Sends the request with basic auth and classifies the outcome.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        let response = request
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
            .map_err(|e| SyncError::UnexpectedRequestError {
                status: None,
                detail: e.to_string(),
            })?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(SyncError::ResourceDoesNotExist),
            status => {
                let detail = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<failed to decode response body>"));
                Err(SyncError::UnexpectedRequestError {
                    status: Some(status.as_u16()),
                    detail,
                })
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
        response
            .json()
            .await
            .map_err(|e| SyncError::UnexpectedRequestResult(format!("malformed response body: {e}")))
    }
}

#[async_trait]
impl HelpdeskApi for HelpdeskClient {
    async fn list_sections(&self) -> Result<Vec<ExistingSection>, SyncError> {
        let url = self.url(&format!("/categories/{}/sections.json", self.category_id));
        debug!(method = "GET", url = %url, "Listing sections");
        let response = self.execute(self.http.get(&url)).await?;
        let body: SectionsBody = Self::decode(response).await?;
        Ok(body.sections)
    }

    async fn create_section(&self, section: &NewSection) -> Result<ExistingSection, SyncError> {
        let url = self.url(&format!("/categories/{}/sections.json", self.category_id));
        debug!(method = "POST", url = %url, name = %section.name, "Creating section");
        let request = self.http.post(&url).json(&NewSectionBody { section });
        let response = self.execute(request).await?;
        let body: SectionBody = Self::decode(response).await?;
        Ok(body.section)
    }

    async fn delete_section(&self, section_id: i64) -> Result<(), SyncError> {
        let url = self.url(&format!("/sections/{}.json", section_id));
        debug!(method = "DELETE", url = %url, "Deleting section");
        self.execute(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn create_article(&self, article: &Article) -> Result<Article, SyncError> {
        let url = self.url(&format!(
            "/sections/{}/articles.json",
            article.parent_section_id
        ));
        debug!(method = "POST", url = %url, title = %article.title, "Creating article");
        let request = self.http.post(&url).json(&NewArticleBody { article });
        let response = self.execute(request).await?;
        let body: ArticleBody = Self::decode(response).await?;
        Ok(body.article)
    }

    async fn list_articles(&self, section_id: i64) -> Result<Vec<Article>, SyncError> {
        let url = self.url(&format!("/sections/{}/articles.json", section_id));
        debug!(method = "GET", url = %url, "Listing articles");
        let response = self.execute(self.http.get(&url)).await?;
        let body: ArticlesBody = Self::decode(response).await?;
        Ok(body.articles)
    }

    async fn upload_attachment(&self, file: &Path) -> Result<ArticleAttachment, SyncError> {
        let url = self.url("/articles/attachments.json");
        debug!(method = "POST", url = %url, file = %file.display(), "Uploading attachment");
        let content = fs::read(file).map_err(|e| SyncError::io(file, e))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("attachment"));
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(content).file_name(file_name))
            .text("inline", "true");
        let request = self.http.post(&url).multipart(form);
        let response = self.execute(request).await?;
        let body: AttachmentBody = Self::decode(response).await?;
        Ok(body.article_attachment)
    }

    async fn link_attachments(
        &self,
        article_id: i64,
        attachment_ids: &[i64],
    ) -> Result<(), SyncError> {
        let url = self.url(&format!("/articles/{}/bulk_attachments.json", article_id));
        debug!(method = "POST", url = %url, count = attachment_ids.len(), "Linking attachments");
        let request = self
            .http
            .post(&url)
            .json(&AttachmentIdsBody { attachment_ids });
        self.execute(request).await?;
        Ok(())
    }

    async fn list_translations(&self, article_id: i64) -> Result<Vec<Translation>, SyncError> {
        let url = self.url(&format!("/articles/{}/translations.json", article_id));
        debug!(method = "GET", url = %url, "Listing translations");
        let response = self.execute(self.http.get(&url)).await?;
        let body: TranslationsBody = Self::decode(response).await?;
        Ok(body.translations)
    }

    async fn update_translation(&self, translation: &Translation) -> Result<(), SyncError> {
        let url = self.url(&format!(
            "/articles/{}/translations/{}.json",
            translation.source_id, translation.locale
        ));
        debug!(method = "PUT", url = %url, "Updating translation");
        let request = self.http.put(&url).json(&TranslationBody { translation });
        self.execute(request).await?;
        Ok(())
    }
}
