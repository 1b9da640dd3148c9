//! Upload rendered emotes to an image tagging service.
//!
//! Downstream of the pipeline: reads finished output files, never the cache.
//! For each configured tag, up to `per_tag` assets carrying that tag are sent
//! as one multipart upload.

mod client;
mod multipart;

pub use client::HttpTaggingClient;

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Asset, TagIndex};
use crate::log;

#[derive(Debug, Error)]
pub enum TaggingError {
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("unexpected response from {url}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl TaggingError {
    pub fn http(url: &str, reason: impl ToString) -> Self {
        Self::Http {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A tag as known to the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteTag {
    pub id: String,
    pub name: String,
}

/// One file in an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadImage {
    /// Part name, `<canonical>.png`.
    pub file_name: String,
    pub path: PathBuf,
}

/// Remote side of the tagging flow.
pub trait TaggingService {
    fn list_tags(&self) -> Result<Vec<RemoteTag>, TaggingError>;
    fn create_tag(&self, name: &str) -> Result<RemoteTag, TaggingError>;
    fn upload_images(&self, tag_id: &str, images: &[UploadImage]) -> Result<(), TaggingError>;
}

/// Summary of one `upload_tags` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TagReport {
    pub uploaded_tags: usize,
    pub images: usize,
    /// Tags no asset carries, or with no rendered output yet.
    pub empty_tags: usize,
    pub failed_tags: usize,
}

/// Assets to upload for one tag: the first `per_tag` (in catalog order) whose
/// first output file exists.
pub fn select_uploads(assets: &[Asset], indices: &[usize], per_tag: usize) -> Vec<UploadImage> {
    indices
        .iter()
        .filter_map(|&i| assets.get(i))
        .filter_map(|asset| {
            let output = asset.output_paths.first()?;
            output.exists().then(|| UploadImage {
                file_name: format!("{}.png", asset.canonical_name),
                path: output.clone(),
            })
        })
        .take(per_tag)
        .collect()
}

/// Upload a sample of every tag in `tags`.
///
/// Only listing the existing tags is fatal; a failure on one tag is logged and
/// the next tag proceeds.
pub fn upload_tags(
    service: &dyn TaggingService,
    assets: &[Asset],
    index: &TagIndex,
    tags: &[String],
    per_tag: usize,
) -> Result<TagReport, TaggingError> {
    let mut known: FxHashMap<String, String> = service
        .list_tags()?
        .into_iter()
        .map(|tag| (tag.name, tag.id))
        .collect();

    let mut report = TagReport::default();
    for tag in tags {
        let indices = index.get(tag);
        if indices.is_empty() {
            log!("tag"; "tag {} has no emotes", tag);
            report.empty_tags += 1;
            continue;
        }

        let images = select_uploads(assets, indices, per_tag);
        if images.is_empty() {
            log!("tag"; "tag {}: no rendered emotes yet", tag);
            report.empty_tags += 1;
            continue;
        }

        match upload_one(service, &mut known, tag, &images) {
            Ok(()) => {
                log!("tag"; "{}: uploaded {} emotes", tag, images.len());
                report.uploaded_tags += 1;
                report.images += images.len();
            }
            Err(e) => {
                log!("error"; "tag {}: {}", tag, e);
                report.failed_tags += 1;
            }
        }
    }

    Ok(report)
}

fn upload_one(
    service: &dyn TaggingService,
    known: &mut FxHashMap<String, String>,
    tag: &str,
    images: &[UploadImage],
) -> Result<(), TaggingError> {
    let id = match known.get(tag) {
        Some(id) => id.clone(),
        None => {
            let created = service.create_tag(tag)?;
            known.insert(created.name, created.id.clone());
            created.id
        }
    };
    service.upload_images(&id, images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogLayout, RawRecord, resolve};
    use parking_lot::Mutex;
    use std::fs;
    use tempfile::TempDir;

    /// In-memory service recording every call.
    #[derive(Default)]
    struct MemoryService {
        tags: Mutex<Vec<RemoteTag>>,
        uploads: Mutex<Vec<(String, Vec<String>)>>,
        fail_uploads_for: Option<String>,
    }

    impl TaggingService for MemoryService {
        fn list_tags(&self) -> Result<Vec<RemoteTag>, TaggingError> {
            Ok(self.tags.lock().clone())
        }

        fn create_tag(&self, name: &str) -> Result<RemoteTag, TaggingError> {
            let mut tags = self.tags.lock();
            let tag = RemoteTag {
                id: format!("id-{}", tags.len()),
                name: name.to_string(),
            };
            tags.push(tag.clone());
            Ok(tag)
        }

        fn upload_images(&self, tag_id: &str, images: &[UploadImage]) -> Result<(), TaggingError> {
            if self.fail_uploads_for.as_deref() == Some(tag_id) {
                return Err(TaggingError::http("memory://images", "503 Service Unavailable"));
            }
            let names = images.iter().map(|i| i.file_name.clone()).collect();
            self.uploads.lock().push((tag_id.to_string(), names));
            Ok(())
        }
    }

    fn setup(dir: &TempDir, records: &[(&str, &[&str])], rendered: &[&str]) -> Vec<Asset> {
        let layout = CatalogLayout {
            cache_dir: dir.path().join("raw-images"),
            output_dir: dir.path().join("emotes"),
            extension: "png".into(),
        };
        let records: Vec<_> = records
            .iter()
            .map(|(name, tags)| RawRecord {
                names: vec![name.to_string(), format!("{name}-alias")],
                background_image: Some(format!("//cdn/{name}.png")),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            })
            .collect();
        let assets = resolve(&records, &layout).unwrap();

        fs::create_dir_all(&layout.output_dir).unwrap();
        for asset in &assets {
            if rendered.contains(&asset.canonical_name.as_str()) {
                fs::write(&asset.output_paths[0], b"png").unwrap();
            }
        }
        assets
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_skips_unrendered_and_caps() {
        let dir = TempDir::new().unwrap();
        let assets = setup(
            &dir,
            &[("a", &["x"]), ("b", &["x"]), ("c", &["x"]), ("d", &["x"])],
            &["a", "c", "d"],
        );
        let index = TagIndex::build(&assets);

        let picked = select_uploads(&assets, index.get("x"), 2);
        let names: Vec<_> = picked.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, ["a.png", "c.png"]);

        // Fewer rendered than the cap: terminates with what exists
        assert_eq!(select_uploads(&assets, index.get("x"), 20).len(), 3);
    }

    #[test]
    fn test_upload_creates_missing_tags() {
        let dir = TempDir::new().unwrap();
        let assets = setup(
            &dir,
            &[("twi", &["twilight"]), ("dash", &["rainbow"])],
            &["twi", "dash"],
        );
        let index = TagIndex::build(&assets);
        let service = MemoryService::default();
        service.tags.lock().push(RemoteTag {
            id: "existing".into(),
            name: "twilight".into(),
        });

        let report = upload_tags(
            &service,
            &assets,
            &index,
            &tags(&["twilight", "rainbow", "nobody"]),
            20,
        )
        .unwrap();

        assert_eq!(report.uploaded_tags, 2);
        assert_eq!(report.images, 2);
        assert_eq!(report.empty_tags, 1);
        let uploads = service.uploads.lock();
        assert_eq!(uploads[0], ("existing".to_string(), vec!["twi.png".to_string()]));
        assert_eq!(uploads[1], ("id-1".to_string(), vec!["dash.png".to_string()]));
    }

    #[test]
    fn test_failed_tag_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let assets = setup(&dir, &[("a", &["one"]), ("b", &["two"])], &["a", "b"]);
        let index = TagIndex::build(&assets);
        let service = MemoryService {
            fail_uploads_for: Some("id-0".into()),
            ..Default::default()
        };

        let report =
            upload_tags(&service, &assets, &index, &tags(&["one", "two"]), 20).unwrap();

        assert_eq!(report.failed_tags, 1);
        assert_eq!(report.uploaded_tags, 1);
        assert_eq!(service.uploads.lock()[0].0, "id-1");
    }
}
