//! `multipart/form-data` body builder for image uploads.
//!
//! Only file parts are needed: each part is named after its file and carries
//! the raw PNG bytes.

use std::time::{SystemTime, UNIX_EPOCH};

/// In-memory multipart body.
#[derive(Debug)]
pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Multipart {
    /// Start a body with a boundary unlikely to occur in image data.
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let seed = blake3::hash(&nanos.to_le_bytes());
        Self::with_boundary(format!("----emotecrop{}", &seed.to_hex()[..24]))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// Append one file part.
    pub fn file(&mut self, file_name: &str, content_type: &str, data: &[u8]) -> &mut Self {
        let name = escape_quoted(file_name);
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Close the body.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_layout() {
        let mut form = Multipart::with_boundary("XYZ");
        form.file("a.png", "image/png", b"AAA")
            .file("b.png", "image/png", b"BB");
        assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");

        let body = String::from_utf8(form.finish()).unwrap();
        assert_eq!(
            body,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"a.png\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             AAA\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"b.png\"; filename=\"b.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             BB\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn test_quotes_escaped() {
        let mut form = Multipart::with_boundary("B");
        form.file("we\"ird.png", "image/png", b"");
        let body = String::from_utf8(form.finish()).unwrap();
        assert!(body.contains("name=\"we\\\"ird.png\""));
    }

    #[test]
    fn test_random_boundary() {
        let form = Multipart::new();
        assert!(form.content_type().contains("boundary=----emotecrop"));
    }
}
