//! Desktop front end for the bulk media downloader

// Thumbnail fetching module
mod thumbnail;

use bulk_media_downloader::client::ExtractorClient;
use bulk_media_downloader::config::Config;
use bulk_media_downloader::control::{ControlBoard, ControlKey};
use bulk_media_downloader::downloader::Downloader;
use bulk_media_downloader::loader::MetadataLoader;
use bulk_media_downloader::model::{Format, SessionState};
use bulk_media_downloader::render::{Row, render_rows};

// eframe/egui for GUI application framework
use eframe::{App, Frame, egui};
use egui::{ColorImage, TextureOptions, Visuals};
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
// FileDialog for folder selection dialogs
use rfd::FileDialog;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

const THUMB_SIZE: egui::Vec2 = egui::vec2(120.0, 68.0);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;

    let runtime = RUNTIME.get_or_try_init(Runtime::new)?;

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Bulk Media Downloader",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp::new(config, runtime))
        }),
    )?;
    Ok(())
}

/// Messages from background tasks to the UI thread
enum UiEvent {
    /// Shown in a blocking dialog
    Notice(String),
    /// A file landed on disk
    Saved(PathBuf),
}

struct DownloaderApp {
    runtime: &'static Runtime,
    /// Multi-line URL input, one per line
    url_input: String,
    /// Destination folder for saved files
    download_folder: String,
    placeholder_thumbnail: String,

    session: Arc<Mutex<SessionState>>,
    loader: MetadataLoader,
    downloader: Downloader,
    controls: ControlBoard,

    /// Rows rendered from the session at `rendered_revision`
    rows: Vec<Row>,
    rendered_revision: u64,
    results_visible: bool,

    /// Cached textures keyed by thumbnail URL
    thumbnails: HashMap<String, egui::TextureHandle>,
    thumbnail_requested: HashSet<String>,
    thumbnail_results: Arc<Mutex<Vec<(String, ColorImage)>>>,

    events_tx: UnboundedSender<UiEvent>,
    events_rx: UnboundedReceiver<UiEvent>,
    notices: VecDeque<String>,
    last_saved: Option<PathBuf>,
}

impl DownloaderApp {
    fn new(config: Config, runtime: &'static Runtime) -> Self {
        let client = ExtractorClient::new(config.backend_url.clone());
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            runtime,
            url_input: String::new(),
            download_folder: config.download_dir.display().to_string(),
            placeholder_thumbnail: config.placeholder_thumbnail,
            session: Arc::new(Mutex::new(SessionState::new())),
            loader: MetadataLoader::new(client.clone()),
            downloader: Downloader::new(client),
            controls: ControlBoard::new(),
            rows: Vec::new(),
            rendered_revision: 0,
            results_visible: false,
            thumbnails: HashMap::new(),
            thumbnail_requested: HashSet::new(),
            thumbnail_results: Arc::new(Mutex::new(Vec::new())),
            events_tx,
            events_rx,
            notices: VecDeque::new(),
            last_saved: None,
        }
    }

    /// Re-render every row if the session changed since the last frame.
    fn sync_rows(&mut self) {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.revision() == self.rendered_revision {
            return;
        }
        self.rows = render_rows(session.videos(), &self.placeholder_thumbnail);
        self.rendered_revision = session.revision();
        self.results_visible = session.results_visible();
        self.controls.prune(&session.urls());
    }

    fn request_thumbnails(&mut self, ctx: &egui::Context) {
        for row in &self.rows {
            if !self.thumbnail_requested.insert(row.thumbnail.clone()) {
                continue;
            }
            let url = row.thumbnail.clone();
            let results = Arc::clone(&self.thumbnail_results);
            let ctx_c = ctx.clone();
            self.runtime.spawn_blocking(move || {
                if let Some(img) = thumbnail::fetch_thumbnail(&url) {
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((url, img));
                    ctx_c.request_repaint();
                }
            });
        }
    }

    fn start_load(&self, ctx: &egui::Context) {
        let loader = self.loader.clone();
        let session = Arc::clone(&self.session);
        let input = self.url_input.clone();
        let tx = self.events_tx.clone();
        let ctx_c = ctx.clone();
        self.runtime.spawn(async move {
            if let Err(e) = loader.load(&session, &input).await {
                let _ = tx.send(UiEvent::Notice(format!("Loading failed: {e}")));
            }
            ctx_c.request_repaint();
        });
    }

    fn start_single(&mut self, ctx: &egui::Context, key: ControlKey, url: String, format: Format) {
        let control = self.controls.get_or_create(&key);
        let downloader = self.downloader.clone();
        let dir = PathBuf::from(&self.download_folder);
        let tx = self.events_tx.clone();
        let ctx_c = ctx.clone();
        self.runtime.spawn(async move {
            let event = match downloader.download_single(&control, &url, format, &dir).await {
                Ok(Some(path)) => Some(UiEvent::Saved(path)),
                Ok(None) => None,
                Err(e) => Some(UiEvent::Notice(format!("Download failed: {e}"))),
            };
            if let Some(event) = event {
                let _ = tx.send(event);
            }
            ctx_c.request_repaint();
        });
    }

    fn start_batch(&mut self, ctx: &egui::Context, format: Format) {
        let control = self.controls.get_or_create(&ControlKey::Batch(format));
        let downloader = self.downloader.clone();
        let session = Arc::clone(&self.session);
        let dir = PathBuf::from(&self.download_folder);
        let tx = self.events_tx.clone();
        let ctx_c = ctx.clone();
        self.runtime.spawn(async move {
            let event = match downloader.download_all(&control, &session, format, &dir).await {
                Ok(Some(path)) => Some(UiEvent::Saved(path)),
                Ok(None) => None,
                Err(e) => Some(UiEvent::Notice(format!("Download failed: {e}"))),
            };
            if let Some(event) = event {
                let _ = tx.send(event);
            }
            ctx_c.request_repaint();
        });
    }

    /// Draw the result list; returns the row buttons clicked this frame.
    fn rows_ui(&mut self, ui: &mut egui::Ui) -> Vec<(ControlKey, String, Format)> {
        let mut clicked = Vec::new();
        for row in &self.rows {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    match self.thumbnails.get(&row.thumbnail) {
                        Some(tex) => {
                            ui.add(egui::Image::new(tex).fit_to_exact_size(THUMB_SIZE));
                        }
                        None => {
                            ui.add_sized(THUMB_SIZE, egui::Label::new("No Thumb"));
                        }
                    }
                    ui.vertical(|ui| {
                        // Labels render text as-is, never as markup
                        ui.label(egui::RichText::new(&row.title).strong())
                            .on_hover_text(&row.title);
                        ui.label(&row.meta);
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        for action in row.actions.iter().rev() {
                            let control = self.controls.get_or_create(&action.key);
                            let button = egui::Button::new(control.content());
                            if ui
                                .add_enabled(control.is_enabled(), button)
                                .on_hover_text(action.tooltip)
                                .clicked()
                            {
                                clicked.push((action.key.clone(), row.url.clone(), action.format));
                            }
                        }
                    });
                });
            });
        }
        clicked
    }
}

impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 1️⃣ Drain messages from background tasks
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                UiEvent::Notice(msg) => {
                    error!(%msg, "surfacing error");
                    self.notices.push_back(msg);
                }
                UiEvent::Saved(path) => {
                    info!(path = %path.display(), "download saved");
                    self.last_saved = Some(path);
                }
            }
        }

        // 2️⃣ Handle completed thumbnail fetches
        {
            let mut pending = self
                .thumbnail_results
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (url, img) in pending.drain(..) {
                let tex = ctx.load_texture(&url, img, TextureOptions::default());
                self.thumbnails.insert(url, tex);
            }
        }

        // 3️⃣ Bring the list in line with the session
        self.sync_rows();
        self.request_thumbnails(ctx);

        // 4️⃣ Blocking notice: everything else is disabled until it is dismissed
        let blocked = !self.notices.is_empty();
        if let Some(msg) = self.notices.front().cloned() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(msg);
                    if ui.button("OK").clicked() {
                        self.notices.pop_front();
                    }
                });
        }

        // 5️⃣ Main panel: URL input, folder, results
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.heading("Bulk Media Downloader");

                ui.label("Paste video URLs, one per line:");
                ui.add(
                    egui::TextEdit::multiline(&mut self.url_input)
                        .desired_rows(5)
                        .desired_width(f32::INFINITY)
                        .hint_text("https://..."),
                );

                ui.horizontal(|ui| {
                    if ui.button("Load").clicked() {
                        self.start_load(ctx);
                    }
                    if self.loader.is_loading() {
                        ui.spinner();
                        ui.label("Loading metadata…");
                    }
                });

                // Folder selection
                ui.horizontal(|ui| {
                    ui.label("Download folder:");
                    ui.text_edit_singleline(&mut self.download_folder);
                    if ui.button("Browse…").clicked() {
                        if let Some(folder) =
                            FileDialog::new().set_directory(&self.download_folder).pick_folder()
                        {
                            self.download_folder = folder.display().to_string();
                        }
                    }
                });

                if let Some(path) = &self.last_saved {
                    ui.label(format!("Saved {}", path.display()));
                }

                if !self.results_visible {
                    return;
                }
                ui.separator();

                let mut batch_clicked = None;
                ui.horizontal(|ui| {
                    ui.label(format!("{} videos", self.rows.len()));
                    for format in Format::ALL {
                        let control = self.controls.get_or_create(&ControlKey::Batch(format));
                        let button = egui::Button::new(control.content());
                        if ui.add_enabled(control.is_enabled(), button).clicked() {
                            batch_clicked = Some(format);
                        }
                    }
                });
                if let Some(format) = batch_clicked {
                    self.start_batch(ctx, format);
                }

                let mut clicked = Vec::new();
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        clicked = self.rows_ui(ui);
                    });
                for (key, url, format) in clicked {
                    self.start_single(ctx, key, url, format);
                }
            });
        });

        // Request periodic repaint so busy buttons and the spinner stay current
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
