//! Add a photo or video memory.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

use crate::cli::AddArgs;
use crate::error::{Error, Result};
use crate::model::{MAX_PAYLOAD_BYTES, MediaKind, Record};
use crate::sync::SyncState;

use super::{format_bytes, open_coordinator};

/// Caption applied when the caller provides none. The store itself never
/// defaults captions.
const DEFAULT_CAPTION: &str = "Untitled memory";

#[derive(Serialize)]
struct AddOutput<'a> {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    category: &'a str,
    size: i64,
    sync: SyncState,
}

/// Execute the add command.
///
/// The payload is either an embedded file (base64 data URL, capped at
/// 10 MB) or an external `--url` reference. The local write always
/// succeeds or fails on its own; the remote push is best-effort.
///
/// # Errors
///
/// Returns a validation error for oversized or mismatched media, or a
/// store error if the insert fails.
pub async fn execute(args: &AddArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let kind = if args.video {
        MediaKind::Video
    } else {
        MediaKind::Photo
    };

    let (data, size) = match (&args.file, &args.url) {
        (Some(file), None) => encode_file(file, kind)?,
        (None, Some(url)) => (url.clone(), 0),
        (None, None) => {
            return Err(Error::InvalidArgument(
                "provide a media file or --url".to_string(),
            ));
        }
        (Some(_), Some(_)) => unreachable!("clap enforces the conflict"),
    };

    let caption = args
        .caption
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CAPTION.to_string());

    let mut coordinator = open_coordinator(db_path)?;
    let record = coordinator
        .add(kind, &args.category, data, caption, size)
        .await?;

    print_result(&record, &coordinator.state(), json)?;
    Ok(())
}

/// Read and embed a media file as a base64 data URL.
fn encode_file(path: &Path, kind: MediaKind) -> Result<(String, i64)> {
    let bytes = fs::read(path)?;

    let len = bytes.len() as u64;
    if len > MAX_PAYLOAD_BYTES {
        return Err(Error::PayloadTooLarge {
            size: len,
            limit: MAX_PAYLOAD_BYTES,
        });
    }

    let mime = guess_mime(path);
    match kind {
        MediaKind::Video if !mime.starts_with("video/") => {
            return Err(Error::InvalidArgument(format!(
                "{} does not look like a video file",
                path.display()
            )));
        }
        MediaKind::Photo if !mime.starts_with("image/") => {
            return Err(Error::InvalidArgument(format!(
                "{} does not look like an image file",
                path.display()
            )));
        }
        _ => {}
    }

    let encoded = BASE64.encode(&bytes);
    #[allow(clippy::cast_possible_wrap)]
    Ok((format!("data:{mime};base64,{encoded}"), bytes.len() as i64))
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

fn print_result(record: &Record, state: &SyncState, json: bool) -> Result<()> {
    if json {
        let output = AddOutput {
            id: record.id,
            kind: record.kind.to_string(),
            category: &record.category,
            size: record.size,
            sync: state.clone(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Saved {} {} ({}) [{}]",
            record.kind,
            record.id,
            format_bytes(record.size),
            record.category
        );
        if state.is_offline() {
            println!("Remote mirror unreachable; the record is stored locally.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_guessing_covers_common_media() {
        assert_eq!(guess_mime(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("b.mp4")), "video/mp4");
        assert_eq!(guess_mime(Path::new("c.unknown")), "application/octet-stream");
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("big.jpg");
        fs::write(&path, vec![0u8; (MAX_PAYLOAD_BYTES + 1) as usize]).unwrap();

        let err = encode_file(&path, MediaKind::Photo).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { .. }));
    }

    #[test]
    fn kind_and_mime_must_agree() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, b"fake").unwrap();

        assert!(encode_file(&path, MediaKind::Photo).is_ok());
        let err = encode_file(&path, MediaKind::Video).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
