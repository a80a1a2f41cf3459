//! Multipart upload intake: per-purpose policies, streaming size enforcement and
//! object key generation.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};
use uuid::Uuid;

const MB: usize = 1024 * 1024;

/// Form field carrying the file itself.
pub const FILE_FIELD: &str = "file";

const RASTER_IMAGES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];
const IMAGES_WITH_SVG: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/gif",
    "image/svg+xml",
];
const PDF: &[&str] = &["application/pdf"];

/// UploadError
///
/// Rejections of an upload before anything is written to storage.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file provided in field 'file'")]
    MissingFile,

    #[error("unsupported file type '{content_type}', expected {accepted}")]
    UnsupportedType {
        content_type: String,
        accepted: String,
    },

    #[error("file exceeds the {limit_mb} MB limit", limit_mb = .max_bytes / MB)]
    TooLarge { max_bytes: usize },

    #[error("malformed multipart body: {0}")]
    Multipart(String),
}

/// Which MIME types an upload purpose accepts.
#[derive(Debug, Clone, Copy)]
pub enum Accept {
    Only(&'static [&'static str]),
    AnyImage,
}

impl Accept {
    pub fn allows(&self, content_type: &str) -> bool {
        match self {
            Accept::Only(types) => types.contains(&content_type),
            Accept::AnyImage => content_type.starts_with("image/"),
        }
    }

    fn describe(&self) -> String {
        match self {
            Accept::Only(types) => types.join(", "),
            Accept::AnyImage => "image/*".to_string(),
        }
    }
}

/// How the human-readable part of the object name is chosen.
#[derive(Debug, Clone, Copy)]
pub enum Naming {
    /// Taken from a text field of the same form, e.g. the member slug.
    FormField {
        field: &'static str,
        fallback: &'static str,
    },
    /// The uploaded file's own base name.
    OriginalName { fallback: &'static str },
    Fixed(&'static str),
}

/// UploadPolicy
///
/// Everything that differs between upload endpoints.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub folder: &'static str,
    pub accept: Accept,
    pub max_bytes: usize,
    pub naming: Naming,
}

impl UploadPolicy {
    pub const AVATAR: UploadPolicy = UploadPolicy {
        folder: "avatars",
        accept: Accept::Only(IMAGES_WITH_SVG),
        max_bytes: 5 * MB,
        naming: Naming::FormField {
            field: "slug",
            fallback: "member",
        },
    };

    pub const NEWS_IMAGE: UploadPolicy = UploadPolicy {
        folder: "news",
        accept: Accept::Only(RASTER_IMAGES),
        max_bytes: 5 * MB,
        naming: Naming::OriginalName { fallback: "news" },
    };

    pub const JOURNAL_PDF: UploadPolicy = UploadPolicy {
        folder: "journals/pdf",
        accept: Accept::Only(PDF),
        max_bytes: 25 * MB,
        naming: Naming::OriginalName { fallback: "journal" },
    };

    pub const JOURNAL_THUMB: UploadPolicy = UploadPolicy {
        folder: "journals/thumbs",
        accept: Accept::Only(RASTER_IMAGES),
        max_bytes: 5 * MB,
        naming: Naming::OriginalName { fallback: "thumb" },
    };

    pub const PROJECT_IMAGE: UploadPolicy = UploadPolicy {
        folder: "projects",
        accept: Accept::AnyImage,
        max_bytes: 5 * MB,
        naming: Naming::Fixed("project"),
    };

    pub const COLLABORATION_LOGO: UploadPolicy = UploadPolicy {
        folder: "collaborations",
        accept: Accept::Only(IMAGES_WITH_SVG),
        max_bytes: 2 * MB,
        naming: Naming::FormField {
            field: "name",
            fallback: "logo",
        },
    };

    /// Largest request body any upload route accepts (file plus form overhead).
    pub const BODY_LIMIT: usize = 26 * MB;
}

/// ReceivedFile
///
/// A fully buffered upload that passed the MIME and size checks, plus the text fields
/// sent alongside it.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
    pub fields: HashMap<String, String>,
}

fn multipart_error(error: MultipartError, policy: &UploadPolicy) -> UploadError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge {
            max_bytes: policy.max_bytes,
        }
    } else {
        UploadError::Multipart(error.body_text())
    }
}

/// receive
///
/// Walks the multipart stream. The `file` part's declared MIME type is checked before
/// any of its bytes are read, and the size ceiling is enforced chunk by chunk, so an
/// oversized body is abandoned as soon as it crosses the limit.
pub async fn receive(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<ReceivedFile, UploadError> {
    let mut file: Option<(Option<String>, String, Bytes)> = None;
    let mut fields = HashMap::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, policy))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name != FILE_FIELD {
            let value = field.text().await.map_err(|e| multipart_error(e, policy))?;
            fields.insert(name, value);
            continue;
        }
        if file.is_some() {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_ascii_lowercase();
        if !policy.accept.allows(&content_type) {
            return Err(UploadError::UnsupportedType {
                content_type,
                accepted: policy.accept.describe(),
            });
        }
        let file_name = field.file_name().map(str::to_string);

        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, policy))? {
            if buffer.len() + chunk.len() > policy.max_bytes {
                return Err(UploadError::TooLarge {
                    max_bytes: policy.max_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        file = Some((file_name, content_type, Bytes::from(buffer)));
    }

    let (file_name, content_type, bytes) = file.ok_or(UploadError::MissingFile)?;
    Ok(ReceivedFile {
        file_name,
        content_type,
        bytes,
        fields,
    })
}

// --- Object Naming ---

/// Lowercases and keeps only `[a-z0-9_-]`; whitespace becomes `-`.
pub fn name_prefix(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect()
}

/// Canonical extension of an accepted MIME type, or `""` when it has none.
fn extension_for_mime(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/webp" => ".webp",
        "image/gif" => ".gif",
        "image/svg+xml" => ".svg",
        "image/avif" => ".avif",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        "application/pdf" => ".pdf",
        _ => "",
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

/// Extension (with the dot) for a stored object.
///
/// The static file server derives the served `Content-Type` from it, so it must agree
/// with the MIME type that passed the allow-list. The original file name's extension is
/// kept only when it denotes that same type (`photo.JPEG` stays `.jpeg`); anything else
/// (`evil.html` sent as `image/png`) gets the type's canonical extension.
pub fn extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| mime_for_extension(ext) == Some(content_type));

    match from_name {
        Some(ext) => format!(".{ext}"),
        None => extension_for_mime(content_type).to_string(),
    }
}

fn base_name(file_name: Option<&str>) -> Option<&str> {
    let name = file_name?.rsplit(['/', '\\']).next()?;
    Some(name.rsplit_once('.').map_or(name, |(stem, _)| stem))
}

/// object_key
///
/// `{folder}/{prefix}-{timestamp_ms}-{suffix}{ext}`. `suffix` is expected to be random
/// (see [`random_suffix`]); it is a parameter so keys are reproducible in tests.
pub fn object_key(policy: &UploadPolicy, file: &ReceivedFile, timestamp_ms: i64, suffix: &str) -> String {
    let prefix = match policy.naming {
        Naming::FormField { field, fallback } => file
            .fields
            .get(field)
            .map(|value| name_prefix(value))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
        Naming::OriginalName { fallback } => base_name(file.file_name.as_deref())
            .map(name_prefix)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
        Naming::Fixed(prefix) => prefix.to_string(),
    };

    format!(
        "{}/{}-{}-{}{}",
        policy.folder,
        prefix,
        timestamp_ms,
        suffix,
        extension(file.file_name.as_deref(), &file.content_type)
    )
}

/// Eight random hex characters.
pub fn random_suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}
