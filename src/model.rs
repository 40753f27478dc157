use serde::{Deserialize, Serialize};

/// Metadata for one downloadable source, as returned by the extraction backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Source URL; identifies the entry
    pub url: String,
    /// Human-readable title (may be empty)
    #[serde(default)]
    pub title: String,
    /// Channel or uploader name
    #[serde(default)]
    pub uploader: String,
    /// Pre-formatted duration, e.g. "3:42"
    #[serde(default)]
    pub duration: String,
    /// Thumbnail URL; empty when the backend had none
    #[serde(default)]
    pub thumbnail: String,
}

/// Output format requested from the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// Audio only, transcoded to MP3
    #[serde(rename = "mp3")]
    Audio,
    /// Video with audio, merged into MP4
    #[serde(rename = "mp4")]
    Video,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Audio, Format::Video];

    /// File extension, which is also the wire token
    pub fn extension(self) -> &'static str {
        match self {
            Format::Audio => "mp3",
            Format::Video => "mp4",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Sequence number attached to each metadata load
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadToken(u64);

/// The most recently loaded list of videos for this session.
///
/// Only the metadata loader mutates it. Every successful load replaces the list
/// wholesale; results of a load that was overtaken by a newer one are dropped.
#[derive(Debug, Default)]
pub struct SessionState {
    videos: Vec<Video>,
    /// Last token handed out by `begin_load`
    issued: u64,
    /// Bumped on every applied load so views know to re-render
    revision: u64,
    /// The results view is revealed by the first successful load
    results_visible: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn urls(&self) -> Vec<String> {
        self.videos.iter().map(|v| v.url.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub(crate) fn begin_load(&mut self) -> LoadToken {
        self.issued += 1;
        LoadToken(self.issued)
    }

    /// Replace the list if `token` is the newest one issued. Returns whether it was applied.
    pub(crate) fn apply(&mut self, token: LoadToken, videos: Vec<Video>) -> bool {
        if token.0 != self.issued {
            return false;
        }
        self.videos = videos;
        self.revision += 1;
        self.results_visible = true;
        true
    }
}
