//! Source URL normalization and content-addressed cache keys.

use std::path::{Path, PathBuf};

/// Rewrite protocol-relative URLs (`//host/path`) to `https://host/path`.
///
/// Every other form passes through unchanged.
pub fn normalize_url(raw: &str) -> String {
    match raw.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_string(),
    }
}

/// A 256-bit content address (blake3 of the normalized source URL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derive the key for a normalized source URL.
    pub fn for_url(url: &str) -> Self {
        Self(*blake3::hash(url.as_bytes()).as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Name of the raw download inside the cache directory.
    pub fn file_name(self) -> String {
        format!("{}.png", self.to_hex())
    }

    /// Full path of the raw download inside `cache_dir`.
    pub fn cache_path(self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(self.file_name())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display first 16 chars of hex for brevity
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_protocol_relative() {
        assert_eq!(normalize_url("//cdn/x.png"), "https://cdn/x.png");
        assert_eq!(
            normalize_url("//a.thumbs.redditmedia.com/abc.png"),
            "https://a.thumbs.redditmedia.com/abc.png"
        );
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_url("https://cdn/x.png"), "https://cdn/x.png");
        assert_eq!(normalize_url("http://cdn/x.png"), "http://cdn/x.png");
        assert_eq!(normalize_url("/local/x.png"), "/local/x.png");
        assert_eq!(normalize_url(""), "");
        // Only the leading pair is rewritten
        assert_eq!(normalize_url("a//b"), "a//b");
    }

    #[test]
    fn test_cache_key_is_stable() {
        let a = CacheKey::for_url("https://cdn/x.png");
        let b = CacheKey::for_url("https://cdn/x.png");
        let c = CacheKey::for_url("https://cdn/y.png");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn test_cache_path() {
        let key = CacheKey::for_url("https://cdn/x.png");
        let path = key.cache_path(Path::new("raw-images"));
        assert_eq!(path, Path::new("raw-images").join(format!("{}.png", key.to_hex())));
        assert_eq!(format!("{key}").len(), 16);
    }
}
