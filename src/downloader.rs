//! Per-row and "download all" flows: request a file, name it, save it.

use crate::client::{ExtractorClient, Payload};
use crate::control::{BATCH_BUSY, Control, Phase, ROW_BUSY};
use crate::error::Result;
use crate::model::{Format, SessionState};
use crate::save::save_payload;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Filename from a `Content-Disposition` value, if it names one.
///
/// Accepts `filename="x"`, `filename=x` and the RFC 5987 form
/// `filename*=UTF-8''x%20y`. Any directory part is stripped.
pub fn filename_from_disposition(header: Option<&str>) -> Option<String> {
    let header = header?;
    let mut plain = None;
    let mut extended = None;
    for part in split_params(header) {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("filename*=") {
            // charset'lang'encoded
            if let Some(idx) = value.rfind('\'')
                && let Ok(decoded) = urlencoding::decode(&value[idx + 1..])
            {
                extended = Some(decoded.into_owned());
            }
        } else if let Some(value) = part.strip_prefix("filename=") {
            plain = Some(unquote(value.trim()));
        }
    }
    extended
        .and_then(|name| sanitize(&name))
        .or_else(|| plain.and_then(|name| sanitize(&name)))
}

/// Split header parameters on `;`, ignoring separators inside quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

/// Strip surrounding quotes and undo `\"` / `\\` escapes of a quoted-string.
fn unquote(value: &str) -> String {
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Keep only the last path component; reject names that would escape the folder.
fn sanitize(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last.to_string()),
    }
}

/// Name for a single download: from the header, else `download.<ext>`
pub fn single_filename(content_disposition: Option<&str>, format: Format) -> String {
    filename_from_disposition(content_disposition)
        .unwrap_or_else(|| format!("download.{}", format.extension()))
}

/// Name for a batch archive; never taken from the response
pub fn batch_filename(format: Format) -> String {
    format!("downloads_{}.zip", format.extension())
}

#[derive(Debug, Clone)]
pub struct Downloader {
    client: ExtractorClient,
}

impl Downloader {
    pub fn new(client: ExtractorClient) -> Self {
        Self { client }
    }

    /// Download one video in `format` into `dir`.
    ///
    /// Returns `Ok(None)` when `control` is already busy. The control is
    /// restored however this returns.
    pub async fn download_single(
        &self,
        control: &Control,
        url: &str,
        format: Format,
        dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let Some(busy) = control.engage(ROW_BUSY) else {
            debug!(url, %format, "download already running for this control");
            return Ok(None);
        };
        info!(url, %format, "single download requested");

        let result = async {
            let payload = self.client.download_single(url, format).await?;
            let filename = single_filename(payload.content_disposition.as_deref(), format);
            save(dir, &filename, payload)
        }
        .await;

        busy.settle(phase_of(&result));
        if let Err(e) = &result {
            warn!(url, %format, error = %e, "single download failed");
        }
        result.map(Some)
    }

    /// Download every loaded video as one archive into `dir`.
    ///
    /// No-op (`Ok(None)`) when nothing is loaded or `control` is already busy.
    pub async fn download_all(
        &self,
        control: &Control,
        session: &Mutex<SessionState>,
        format: Format,
        dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let urls = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .urls();
        if urls.is_empty() {
            debug!(%format, "nothing loaded, skipping batch download");
            return Ok(None);
        }
        let Some(busy) = control.engage(BATCH_BUSY) else {
            debug!(%format, "batch download already running");
            return Ok(None);
        };
        info!(count = urls.len(), %format, "batch download requested");

        let result = async {
            let payload = self.client.download_batch(&urls, format).await?;
            save(dir, &batch_filename(format), payload)
        }
        .await;

        busy.settle(phase_of(&result));
        if let Err(e) = &result {
            warn!(%format, error = %e, "batch download failed");
        }
        result.map(Some)
    }
}

fn save(dir: &Path, filename: &str, payload: Payload) -> Result<PathBuf> {
    save_payload(dir, filename, &payload.bytes)
}

fn phase_of<T>(result: &Result<T>) -> Phase {
    if result.is_ok() {
        Phase::SaveTriggered
    } else {
        Phase::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        let name = filename_from_disposition(Some(r#"attachment; filename="song.mp3""#));
        assert_eq!(name.as_deref(), Some("song.mp3"));
    }

    #[test]
    fn unquoted_filename_stops_at_semicolon() {
        let name = filename_from_disposition(Some("attachment; filename=clip.mp4; size=42"));
        assert_eq!(name.as_deref(), Some("clip.mp4"));
    }

    #[test]
    fn quoted_filename_keeps_semicolons() {
        let name = filename_from_disposition(Some(r#"attachment; filename="Live; Acoustic.mp3""#));
        assert_eq!(name.as_deref(), Some("Live; Acoustic.mp3"));
    }

    #[test]
    fn quoted_filename_with_escaped_quote() {
        let name = filename_from_disposition(Some(
            r#"attachment; filename="The \"Best\"; Cut.mp4"; size=9"#,
        ));
        assert_eq!(name.as_deref(), Some(r#"The "Best"; Cut.mp4"#));
    }

    #[test]
    fn extended_filename_is_decoded_and_preferred() {
        let name = filename_from_disposition(Some(
            "attachment; filename=\"fallback.mp3\"; filename*=UTF-8''M%C3%BCller%20Live.mp3",
        ));
        assert_eq!(name.as_deref(), Some("Müller Live.mp3"));
    }

    #[test]
    fn directory_parts_are_stripped() {
        let name = filename_from_disposition(Some(r#"attachment; filename="../../etc/passwd""#));
        assert_eq!(name.as_deref(), Some("passwd"));
        let name = filename_from_disposition(Some(r#"attachment; filename=C:\tmp\x.mp3"#));
        assert_eq!(name.as_deref(), Some("x.mp3"));
    }

    #[test]
    fn unusable_names_are_rejected() {
        assert_eq!(filename_from_disposition(Some("attachment; filename=\"\"")), None);
        assert_eq!(filename_from_disposition(Some("attachment; filename=..")), None);
        assert_eq!(filename_from_disposition(Some("attachment")), None);
        assert_eq!(filename_from_disposition(None), None);
    }

    #[test]
    fn single_filename_falls_back_per_format() {
        assert_eq!(single_filename(None, Format::Audio), "download.mp3");
        assert_eq!(single_filename(Some("inline"), Format::Video), "download.mp4");
        assert_eq!(
            single_filename(Some(r#"attachment; filename="song.mp3""#), Format::Video),
            "song.mp3"
        );
    }

    #[test]
    fn settled_phase_follows_result() {
        let ok: Result<()> = Ok(());
        let failed: Result<()> = Err(crate::error::Error::Network("down".into()));
        assert_eq!(phase_of(&ok), Phase::SaveTriggered);
        assert_eq!(phase_of(&failed), Phase::Failed);
    }

    #[test]
    fn batch_filename_is_fixed() {
        assert_eq!(batch_filename(Format::Audio), "downloads_mp3.zip");
        assert_eq!(batch_filename(Format::Video), "downloads_mp4.zip");
    }
}
