use std::fmt;

use serde::{Deserialize, Serialize};

/// Default upper bound for a single attachment payload (16 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 16 * 1024 * 1024;

/// The image formats an attachment may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    pub const ALL: &[ImageKind] = &[
        ImageKind::Png,
        ImageKind::Jpeg,
        ImageKind::Gif,
        ImageKind::Webp,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Match a MIME type, ignoring case and parameters (`image/png; q=1`).
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Some(ImageKind::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            "image/gif" => Some(ImageKind::Gif),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "gif" => Some(ImageKind::Gif),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// Classify an upload. The declared content type wins; the filename hint
    /// is consulted only when no specific type was declared.
    pub fn classify(content_type: Option<&str>, filename_hint: Option<&str>) -> Option<Self> {
        match content_type.map(str::trim).filter(|ct| !ct.is_empty()) {
            Some(ct) if !ct.eq_ignore_ascii_case("application/octet-stream") => {
                Self::from_content_type(ct)
            }
            _ => filename_hint
                .and_then(|name| name.rsplit_once('.'))
                .and_then(|(_, ext)| Self::from_extension(ext)),
        }
    }

    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|k| k.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// Response body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub filename: String,
}

/// Response body of an attachment URL lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_classification() {
        assert_eq!(ImageKind::from_content_type("image/png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_content_type("IMAGE/JPEG"), Some(ImageKind::Jpeg));
        assert_eq!(
            ImageKind::from_content_type("image/webp; charset=binary"),
            Some(ImageKind::Webp)
        );
        assert_eq!(ImageKind::from_content_type("text/plain"), None);
        assert_eq!(ImageKind::from_content_type("image/svg+xml"), None);
    }

    #[test]
    fn declared_type_wins_over_filename() {
        assert_eq!(
            ImageKind::classify(Some("text/plain"), Some("cat.png")),
            None
        );
        assert_eq!(
            ImageKind::classify(Some("image/gif"), Some("notes.txt")),
            Some(ImageKind::Gif)
        );
    }

    #[test]
    fn octet_stream_falls_back_to_extension() {
        assert_eq!(
            ImageKind::classify(Some("application/octet-stream"), Some("photo.JPEG")),
            Some(ImageKind::Jpeg)
        );
        assert_eq!(ImageKind::classify(None, Some("a.b.webp")), Some(ImageKind::Webp));
        assert_eq!(ImageKind::classify(None, Some("noext")), None);
        assert_eq!(ImageKind::classify(None, None), None);
    }

    #[test]
    fn extension_and_content_type_agree() {
        for kind in ImageKind::ALL {
            assert_eq!(ImageKind::from_extension(kind.extension()), Some(*kind));
            assert_eq!(ImageKind::from_content_type(kind.content_type()), Some(*kind));
        }
        assert_eq!(ImageKind::allowed_list(), "png, jpg, gif, webp");
    }
}
