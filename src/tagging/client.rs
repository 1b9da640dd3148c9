//! HTTP client for the image tagging service.
//!
//! Endpoints (all relative to the configured project url, all authenticated
//! with the `Training-Key` header):
//!
//! | Method | Path                    | Body                  |
//! |--------|-------------------------|-----------------------|
//! | GET    | `/tags`                 | -                     |
//! | POST   | `/tags?name=<tag>`      | -                     |
//! | POST   | `/images?tagIds=<id>`   | `multipart/form-data` |

use std::fs;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use super::multipart::Multipart;
use super::{RemoteTag, TaggingError, TaggingService, UploadImage};

const KEY_HEADER: &str = "Training-Key";

/// Blocking client over `ureq`.
pub struct HttpTaggingClient {
    base: String,
    training_key: String,
    agent: ureq::Agent,
}

impl HttpTaggingClient {
    pub fn new(base: &str, training_key: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            training_key: training_key.into(),
            agent: config.into(),
        }
    }

    /// `<base>/<path>?<query>`, with the query properly encoded.
    fn endpoint(&self, path: &str, query: Option<(&str, &str)>) -> Result<Url, TaggingError> {
        let raw = format!("{}/{path}", self.base);
        let mut url = Url::parse(&raw).map_err(|e| TaggingError::http(&raw, e))?;
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    fn read_json<T: DeserializeOwned>(
        url: &Url,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<T, TaggingError> {
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TaggingError::http(url.as_str(), e))?;
        serde_json::from_str(&text).map_err(|source| TaggingError::Json {
            url: url.to_string(),
            source,
        })
    }
}

impl TaggingService for HttpTaggingClient {
    fn list_tags(&self) -> Result<Vec<RemoteTag>, TaggingError> {
        let url = self.endpoint("tags", None)?;
        let response = self
            .agent
            .get(url.as_str())
            .header(KEY_HEADER, self.training_key.as_str())
            .call()
            .map_err(|e| TaggingError::http(url.as_str(), e))?;
        Self::read_json(&url, response)
    }

    fn create_tag(&self, name: &str) -> Result<RemoteTag, TaggingError> {
        let url = self.endpoint("tags", Some(("name", name)))?;
        let response = self
            .agent
            .post(url.as_str())
            .header(KEY_HEADER, self.training_key.as_str())
            .send_empty()
            .map_err(|e| TaggingError::http(url.as_str(), e))?;
        Self::read_json(&url, response)
    }

    fn upload_images(&self, tag_id: &str, images: &[UploadImage]) -> Result<(), TaggingError> {
        let url = self.endpoint("images", Some(("tagIds", tag_id)))?;

        let mut form = Multipart::new();
        for image in images {
            let data = fs::read(&image.path)
                .map_err(|e| TaggingError::Io(image.path.clone(), e))?;
            form.file(&image.file_name, "image/png", &data);
        }
        let content_type = form.content_type();
        let body = form.finish();

        self.agent
            .post(url.as_str())
            .header(KEY_HEADER, self.training_key.as_str())
            .header("Content-Type", content_type.as_str())
            .send(&body[..])
            .map_err(|e| TaggingError::http(url.as_str(), e))?;
        Ok(())
    }
}
