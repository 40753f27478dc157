//! Projection of the loaded videos into list rows.
//!
//! Row text is plain data; the UI draws it with `egui::Label`, which never
//! interprets markup, so titles and uploader names show up literally.

use crate::control::ControlKey;
use crate::model::{Format, Video};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowAction {
    pub key: ControlKey,
    pub format: Format,
    pub tooltip: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub url: String,
    /// Thumbnail URL, or the placeholder when the video had none
    pub thumbnail: String,
    pub title: String,
    /// "{uploader} • {duration}"
    pub meta: String,
    /// Audio download, then video download
    pub actions: [RowAction; 2],
}

pub fn render_rows(videos: &[Video], placeholder: &str) -> Vec<Row> {
    videos.iter().map(|v| render_row(v, placeholder)).collect()
}

fn render_row(video: &Video, placeholder: &str) -> Row {
    let thumbnail = if video.thumbnail.is_empty() {
        placeholder.to_string()
    } else {
        video.thumbnail.clone()
    };
    Row {
        url: video.url.clone(),
        thumbnail,
        title: video.title.clone(),
        meta: format!("{} • {}", video.uploader, video.duration),
        actions: Format::ALL.map(|format| RowAction {
            key: ControlKey::Row {
                url: video.url.clone(),
                format,
            },
            format,
            tooltip: match format {
                Format::Audio => "Download MP3",
                Format::Video => "Download MP4",
            },
        }),
    }
}
