//! Raw catalog record schema.
//!
//! Field names follow the emote catalog JSON as published, for example:
//!
//! ```json
//! {
//!   "names": ["twibeam", "twilightbeam"],
//!   "background-image": "//a.thumbs.example/sheet.png",
//!   "width": 70,
//!   "height": "70px",
//!   "background-position": ["-140px", "0px"],
//!   "tags": ["twilightsparkle"]
//! }
//! ```
//!
//! Unknown fields are ignored. Dimension and position values arrive as either
//! strings or numbers and are normalized by the resolver.

use serde::Deserialize;

/// One catalog entry before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    /// Alias names; the first one is canonical.
    pub names: Vec<String>,

    #[serde(rename = "background-image", default)]
    pub background_image: Option<String>,

    #[serde(default)]
    pub width: Option<RawDimension>,

    #[serde(default)]
    pub height: Option<RawDimension>,

    #[serde(rename = "background-position", default)]
    pub background_position: Option<RawPosition>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Present when the emote ships as an animated PNG.
    #[serde(default)]
    pub apng_url: Option<String>,
}

/// Declared width or height: `70`, `"70"` or `"70px"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDimension {
    Number(i64),
    Text(String),
}

/// Background position, per axis or combined (`"-10px 0"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPosition {
    Axes(Vec<RawToken>),
    Combined(String),
}

/// A single position token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
    Number(i64),
    Text(String),
}

impl RawToken {
    pub fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let record: RawRecord = serde_json::from_str(
            r#"{
                "names": ["twibeam", "twilightbeam"],
                "background-image": "//cdn/sheet.png",
                "width": 70,
                "height": "70px",
                "background-position": ["-140px", 0],
                "tags": ["twilightsparkle"],
                "sr": "mylittlepony"
            }"#,
        )
        .unwrap();

        assert_eq!(record.names, ["twibeam", "twilightbeam"]);
        assert_eq!(record.background_image.as_deref(), Some("//cdn/sheet.png"));
        assert_eq!(record.width, Some(RawDimension::Number(70)));
        assert_eq!(record.height, Some(RawDimension::Text("70px".into())));
        assert_eq!(
            record.background_position,
            Some(RawPosition::Axes(vec![
                RawToken::Text("-140px".into()),
                RawToken::Number(0)
            ]))
        );
        assert_eq!(record.tags, ["twilightsparkle"]);
        assert!(record.apng_url.is_none());
    }

    #[test]
    fn test_minimal_record() {
        let record: RawRecord = serde_json::from_str(r#"{"names": ["blank"]}"#).unwrap();
        assert!(record.background_image.is_none());
        assert!(record.width.is_none());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_combined_position() {
        let record: RawRecord =
            serde_json::from_str(r#"{"names": ["a"], "background-position": "-10px 50%"}"#)
                .unwrap();
        assert_eq!(
            record.background_position,
            Some(RawPosition::Combined("-10px 50%".into()))
        );
    }

    #[test]
    fn test_missing_names_rejected() {
        assert!(serde_json::from_str::<RawRecord>(r#"{"width": 10}"#).is_err());
    }
}
