use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Username, ValidationError, ValidationResult};

static YOUTUBE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .expect("valid youtube id regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub i64);

impl ResourceId {
    pub fn generate() -> Self {
        ResourceId(Utc::now().timestamp_millis())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag plus the fields only that type carries. Stored flattened into
/// the resource record as `type`, `fileType`, `fileSize`, `videoId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResourceKind {
    #[serde(rename_all = "camelCase")]
    File { file_type: String, file_size: String },
    #[serde(rename_all = "camelCase")]
    Youtube { video_id: String },
}

impl ResourceKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::File { .. } => "file",
            ResourceKind::Youtube { .. } => "youtube",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    #[serde(flatten)]
    pub kind: ResourceKind,
    pub title: String,
    pub content: String,
    pub username: Username,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn is_image(&self) -> bool {
        matches!(&self.kind, ResourceKind::File { file_type, .. } if file_type.starts_with("image/"))
    }

    pub fn embed_url(&self) -> Option<String> {
        match &self.kind {
            ResourceKind::Youtube { video_id } => {
                Some(format!("https://www.youtube.com/embed/{video_id}"))
            }
            ResourceKind::File { .. } => None,
        }
    }

    pub fn meta_display(&self) -> String {
        match &self.kind {
            ResourceKind::File { file_type, file_size } => {
                let file_type = if file_type.is_empty() { "unknown" } else { file_type };
                format!("{file_type} • {file_size}")
            }
            ResourceKind::Youtube { .. } => "YouTube Video".to_string(),
        }
    }
}

/// A resource before it is stamped with an id, owner and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDraft {
    pub kind: ResourceKind,
    pub title: String,
    pub content: String,
}

impl ResourceDraft {
    pub fn youtube(link: &str) -> ValidationResult<Self> {
        let link = link.trim();
        if link.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }

        let video_id = extract_youtube_id(link)
            .ok_or_else(|| ValidationError::InvalidYoutubeUrl(link.to_string()))?;

        Ok(Self {
            title: format!("YouTube Video - {video_id}"),
            content: link.to_string(),
            kind: ResourceKind::Youtube { video_id },
        })
    }

    pub fn file(name: &str, mime: &str, bytes: &[u8]) -> Self {
        use base64::Engine as _;

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            title: name.to_string(),
            content: format!("data:{mime};base64,{encoded}"),
            kind: ResourceKind::File {
                file_type: mime.to_string(),
                file_size: format_file_size(bytes.len() as u64),
            },
        }
    }

    pub fn stamp(self, id: ResourceId, owner: &Username, created_at: DateTime<Utc>) -> Resource {
        Resource {
            id,
            kind: self.kind,
            title: self.title,
            content: self.content,
            username: owner.clone(),
            created_at,
        }
    }
}

/// Pulls the 11-character video id out of the common YouTube URL shapes.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Human-readable size in 1024 steps, two decimals with trailing zeros
/// dropped: `0 Bytes`, `500 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0usize;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }

    let rounded = format!("{scaled:.2}");
    let rounded = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{rounded} {}", UNITS[exponent])
}

/// Best-effort MIME type from a file extension.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Only the resources owned by `username`, in stored order.
pub fn filter_by_user(all: &[Resource], username: &Username) -> Vec<Resource> {
    all.iter()
        .filter(|r| &r.username == username)
        .cloned()
        .collect()
}
