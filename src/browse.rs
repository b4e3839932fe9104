/*!
 * Windowed file browser
 *
 * egui front end over `fsops::RemoteFs`: path bar, entry listing, preview
 * pane, and Up / Upload / Download / Delete / Refresh actions. All remote
 * operations block the UI thread; the device link is serial anyway.
 */

use eframe::egui;
use std::path::Path;
use tracing::warn;

use crate::adb::Transport;
use crate::error::{PinError, Result};
use crate::fsops::{parent_remote, PreviewError, RemoteEntry, RemoteFs};

/// Launch the browser window over a connected transport
pub fn run_browser<T: Transport + 'static>(transport: T, ffmpeg_path: String) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([700.0, 650.0]),
        ..Default::default()
    };

    let app = FileBrowserApp::new(RemoteFs::new(transport), ffmpeg_path)?;
    eframe::run_native(
        "LUCI Pin File Browser",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| PinError::Other(format!("browser window failed: {}", e)))
}

struct FileBrowserApp<T: Transport> {
    fs: RemoteFs<T>,
    ffmpeg_path: String,
    temp_dir: tempfile::TempDir,

    current_path: String,
    entries: Vec<RemoteEntry>,
    selected: Option<usize>,

    preview: Option<egui::TextureHandle>,
    preview_message: String,
    status: String,
    pending_delete: Option<RemoteEntry>,
}

impl<T: Transport> FileBrowserApp<T> {
    fn new(fs: RemoteFs<T>, ffmpeg_path: String) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let mut app = Self {
            fs,
            ffmpeg_path,
            temp_dir,
            current_path: "/".to_string(),
            entries: Vec::new(),
            selected: None,
            preview: None,
            preview_message: "Select a file for preview".to_string(),
            status: String::new(),
            pending_delete: None,
        };
        app.refresh();
        Ok(app)
    }

    /// Re-list the current directory; listing failures land in the status
    /// line, keeping whatever was displayed before.
    fn refresh(&mut self) {
        self.selected = None;
        match self.fs.list(&self.current_path) {
            Ok(entries) => {
                self.entries = entries;
                self.status.clear();
            }
            Err(e) => {
                warn!(path = %self.current_path, error = %e, "listing failed");
                self.status = format!("Listing failed: {}", e);
            }
        }
    }

    fn enter(&mut self, path: String) {
        self.current_path = path;
        self.clear_preview();
        self.refresh();
    }

    fn go_up(&mut self) {
        if self.current_path != "/" {
            self.enter(parent_remote(&self.current_path));
        }
    }

    fn clear_preview(&mut self) {
        self.preview = None;
        self.preview_message = "Select a file for preview".to_string();
    }

    fn select(&mut self, idx: usize, ctx: &egui::Context) {
        self.selected = Some(idx);
        let entry = self.entries[idx].clone();
        if entry.is_dir() {
            self.clear_preview();
            return;
        }
        match self
            .fs
            .fetch_preview(&entry, &self.ffmpeg_path, self.temp_dir.path())
        {
            Ok(local) => self.show_preview(&local, ctx),
            Err(PreviewError::Unsupported) => self.clear_preview(),
            Err(e) => {
                self.preview = None;
                self.preview_message = "Preview unavailable".to_string();
                self.status = format!("Preview failed: {}", e);
            }
        }
    }

    fn show_preview(&mut self, local: &Path, ctx: &egui::Context) {
        match image::open(local) {
            Ok(img) => {
                let img = img.thumbnail(300, 300);
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
                self.preview =
                    Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
                self.preview_message.clear();
            }
            Err(e) => {
                self.preview = None;
                self.preview_message = "Preview unavailable".to_string();
                self.status = format!("Decode failed: {}", e);
            }
        }
    }

    fn upload(&mut self) {
        let Some(local) = rfd::FileDialog::new().pick_file() else {
            return;
        };
        match self.fs.upload(&local, &self.current_path) {
            Ok(()) => self.status = format!("Uploaded {}", local.display()),
            Err(e) => self.status = format!("Upload failed: {}", e),
        }
        self.refresh();
    }

    fn download(&mut self) {
        let Some(entry) = self.selected.and_then(|i| self.entries.get(i)).cloned() else {
            return;
        };
        let Some(dest) = rfd::FileDialog::new().set_file_name(&entry.name).save_file() else {
            return;
        };
        match self.fs.download(&entry.path, &dest) {
            Ok(()) => self.status = format!("Downloaded to {}", dest.display()),
            Err(e) => self.status = format!("Download failed: {}", e),
        }
    }

    /// Deletion only ever runs through the confirmation modal
    fn confirm_delete(&mut self, entry: RemoteEntry) {
        match self.fs.delete(&entry.path, true) {
            Ok(_) => self.status = format!("Deleted {}", entry.path),
            Err(e) => self.status = format!("Delete failed: {}", e),
        }
        self.clear_preview();
        self.refresh();
    }
}

impl<T: Transport> eframe::App for FileBrowserApp<T> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("path_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(self.current_path.as_str())
                        .monospace()
                        .strong(),
                );
            });
            ui.horizontal(|ui| {
                if ui.button("↑ Up").clicked() {
                    self.go_up();
                }
                if ui.button("Upload").clicked() {
                    self.upload();
                }
                if ui.button("Download").clicked() {
                    self.download();
                }
                if ui.button("Delete").clicked() {
                    self.pending_delete =
                        self.selected.and_then(|i| self.entries.get(i)).cloned();
                }
                if ui.button("Refresh").clicked() {
                    self.refresh();
                }
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(self.status.as_str());
        });

        egui::SidePanel::right("preview_pane")
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("Preview");
                if let Some(texture) = &self.preview {
                    ui.image(texture);
                } else {
                    ui.label(self.preview_message.as_str());
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let mut clicked: Option<usize> = None;
                let mut opened: Option<usize> = None;
                for (idx, entry) in self.entries.iter().enumerate() {
                    let label = if entry.is_dir() {
                        format!("📁 {}", entry.name)
                    } else {
                        format!("📄 {}", entry.name)
                    };
                    let response =
                        ui.selectable_label(self.selected == Some(idx), label);
                    if response.double_clicked() {
                        opened = Some(idx);
                    } else if response.clicked() {
                        clicked = Some(idx);
                    }
                }
                if let Some(idx) = opened {
                    let entry = self.entries[idx].clone();
                    if entry.is_dir() {
                        self.enter(entry.path);
                    } else {
                        self.select(idx, ctx);
                    }
                } else if let Some(idx) = clicked {
                    self.select(idx, ctx);
                }
            });
        });

        if let Some(entry) = self.pending_delete.clone() {
            egui::Window::new("Confirm delete")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Delete {}?", entry.path));
                    ui.horizontal(|ui| {
                        if ui.button("Delete").clicked() {
                            self.pending_delete = None;
                            self.confirm_delete(entry.clone());
                        }
                        if ui.button("Cancel").clicked() {
                            self.pending_delete = None;
                        }
                    });
                });
        }
    }
}
