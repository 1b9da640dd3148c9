//! `tag` command: upload rendered emotes to the tagging service.

use anyhow::{Context, Result, anyhow};

use crate::{
    catalog::TagIndex,
    config::{AppConfig, TaggingConfig},
    log,
    tagging::{HttpTaggingClient, upload_tags},
    utils::plural_count,
};

use super::build::load_assets;

/// Upload up to `per_tag` (CLI) or `tagging.per_tag` emotes for every tag.
pub fn tag_emotes(config: &AppConfig, per_tag: Option<usize>) -> Result<()> {
    let tagging = &config.tagging;
    let url = tagging
        .url
        .as_deref()
        .ok_or_else(|| anyhow!("{} is not set", TaggingConfig::URL))?;
    let key = tagging
        .load_key()?
        .ok_or_else(|| anyhow!("{} is not set", TaggingConfig::TRAINING_KEY))?;

    let assets = load_assets(config)?;
    let index = TagIndex::build(&assets);
    if index.is_empty() {
        log!("tag"; "no tagged emotes in the catalog");
        return Ok(());
    }
    log!("tag"; "{} across the catalog", plural_count(index.len(), "tag"));

    let client = HttpTaggingClient::new(url, key, config.fetch.timeout());
    let per_tag = per_tag.unwrap_or(tagging.per_tag);
    let report = upload_tags(&client, &assets, &index, &tagging.tags, per_tag)
        .context("failed to list tags")?;

    log!(
        "tag";
        "uploaded {} for {}, {} empty, {}",
        plural_count(report.images, "emote"),
        plural_count(report.uploaded_tags, "tag"),
        report.empty_tags,
        plural_count(report.failed_tags, "failure")
    );
    Ok(())
}
