//! Busy/idle state of the action buttons.
//!
//! Each button owns a small state machine:
//!
//! ```text
//! Idle -> Requesting -> (SaveTriggered | Failed) -> Idle
//! ```
//!
//! [`Control::engage`] hands out a [`BusyGuard`]; dropping the guard puts the
//! button back exactly as it was, whichever way the request ended.

use crate::model::Format;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Busy label of a row button
pub const ROW_BUSY: &str = "⏳";
/// Busy label of a "download all" button
pub const BATCH_BUSY: &str = "⏳ Processing...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
    SaveTriggered,
    Failed,
}

#[derive(Debug)]
struct Face {
    content: String,
    enabled: bool,
    phase: Phase,
}

/// Shared handle to one button's presentation and phase
#[derive(Clone, Debug)]
pub struct Control(Arc<Mutex<Face>>);

impl Control {
    pub fn new(content: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(Face {
            content: content.into(),
            enabled: true,
            phase: Phase::Idle,
        })))
    }

    fn face(&self) -> MutexGuard<'_, Face> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn content(&self) -> String {
        self.face().content.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.face().enabled
    }

    pub fn phase(&self) -> Phase {
        self.face().phase
    }

    /// Switch to the busy presentation. Returns `None` if a request is already outstanding.
    pub fn engage(&self, busy_content: &str) -> Option<BusyGuard> {
        let mut face = self.face();
        if !face.enabled {
            return None;
        }
        let original = std::mem::replace(&mut face.content, busy_content.to_string());
        face.enabled = false;
        face.phase = Phase::Requesting;
        trace!(%original, "control engaged");
        Some(BusyGuard {
            control: self.clone(),
            original: Some(original),
        })
    }
}

/// Restores its control on drop
#[derive(Debug)]
pub struct BusyGuard {
    control: Control,
    original: Option<String>,
}

impl BusyGuard {
    /// Record how the request ended; restoration still happens on drop.
    pub fn settle(&self, phase: Phase) {
        self.control.face().phase = phase;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut face = self.control.face();
        if let Some(original) = self.original.take() {
            face.content = original;
        }
        face.enabled = true;
        face.phase = Phase::Idle;
    }
}

/// Identity of a button: one per row and format, plus one "download all" per format
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Row { url: String, format: Format },
    Batch(Format),
}

impl ControlKey {
    /// Label shown while idle
    pub fn idle_content(&self) -> String {
        match self {
            ControlKey::Row { format: Format::Audio, .. } => "🎵 MP3".to_string(),
            ControlKey::Row { format: Format::Video, .. } => "🎬 MP4".to_string(),
            ControlKey::Batch(Format::Audio) => "⬇ Download all as MP3".to_string(),
            ControlKey::Batch(Format::Video) => "⬇ Download all as MP4".to_string(),
        }
    }
}

/// All controls of the session, keyed by identity
#[derive(Debug, Default)]
pub struct ControlBoard {
    controls: HashMap<ControlKey, Control>,
}

impl ControlBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, key: &ControlKey) -> Control {
        self.controls
            .entry(key.clone())
            .or_insert_with(|| Control::new(key.idle_content()))
            .clone()
    }

    /// Forget idle row controls whose URL is no longer loaded. Busy ones stay until they finish.
    pub fn prune(&mut self, loaded: &[String]) {
        self.controls.retain(|key, control| match key {
            ControlKey::Row { url, .. } => loaded.contains(url) || !control.is_enabled(),
            ControlKey::Batch(_) => true,
        });
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
