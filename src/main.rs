//! Arcade Shelf
//! A desktop game catalog with a supervised content player

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

mod analytics;
mod catalog;
mod config;
mod error;
mod favorites;
mod models;
mod player;

use analytics::{Analytics, JsonlSink};
use catalog::{is_valid_slug, Catalog, CatalogSource};
use config::*;
use favorites::{export_file_name, FavoritesStore};
use models::*;
use player::progress::{overlay_message, stage_message};
use player::{
    FullscreenCoordinator, FOCUS_RESTORE_DELAY, HttpSurface, SessionController, SessionUpdate, Stage, ViewportFullscreen,
};

/// Get current time as HH:MM:SS (UTC)
fn timestamp_now() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let secs = now % 86400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Window icon: rounded square with a play triangle over a pad outline
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            let corner = 0.15;
            let dx = (corner - nx).max(nx - (1.0 - corner)).max(0.0);
            let dy = (corner - ny).max(ny - (1.0 - corner)).max(0.0);
            if dx * dx + dy * dy > corner * corner {
                continue;
            }

            // Orange to magenta gradient
            let t = nx * 0.5 + ny * 0.5;
            let mut r = (255.0 + (214.0 - 255.0) * t) as u8;
            let mut g = (140.0 + (51.0 - 140.0) * t) as u8;
            let mut b = (0.0 + (132.0 - 0.0) * t) as u8;

            let px = nx - 0.38;
            let py = ny - 0.5;
            let in_play = px >= 0.0 && px <= 0.3 && py.abs() <= (0.3 - px) * 0.6;
            let in_pad = (0.12..=0.88).contains(&nx)
                && (0.72..=0.80).contains(&ny);
            if in_play || in_pad {
                r = 255;
                g = 255;
                b = 255;
            }

            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

/// Background task messages
enum TaskResult {
    CatalogLoaded { catalog: Box<Catalog>, source: String },
    CatalogError { source: String, error: String },
    BrowserLog(String),
    BrowserExited { code: Option<i32> },
}

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Arcade Shelf starting...");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 500.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "Arcade Shelf",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ArcadeShelfApp::new(cc.egui_ctx.clone())))
        }),
    )
}

struct ArcadeShelfApp {
    config: AppConfig,
    ctx: egui::Context,
    current_tab: Tab,

    // Catalog
    catalog: Catalog,
    catalog_loading: bool,
    search_query: String,
    selected_category: Option<String>,

    // Favorites
    favorites: FavoritesStore,
    favorites_query: String,
    show_clear_confirm: bool,

    // Player
    analytics: Analytics,
    selected_game: Option<ContentDescriptor>,
    controller: Option<SessionController<HttpSurface>>,
    fullscreen: FullscreenCoordinator<ViewportFullscreen>,

    // UI state
    show_settings: bool,
    status_message: String,
    console_log: Vec<String>,

    task_sender: Sender<TaskResult>,
    task_receiver: Receiver<TaskResult>,
}

impl ArcadeShelfApp {
    fn new(ctx: egui::Context) -> Self {
        let config = AppConfig::load();
        let (task_sender, task_receiver) = channel();

        let analytics = if config.enable_analytics {
            Analytics::new(Arc::new(JsonlSink::new(analytics_path())))
        } else {
            Analytics::disabled()
        };
        let favorites = FavoritesStore::open(favorites_path(), analytics.clone());

        let mut app = Self {
            fullscreen: FullscreenCoordinator::new(ViewportFullscreen::new(ctx.clone())),
            ctx,
            current_tab: Tab::Games,
            catalog: Catalog::default(),
            catalog_loading: false,
            search_query: String::new(),
            selected_category: None,
            favorites,
            favorites_query: String::new(),
            show_clear_confirm: false,
            analytics,
            selected_game: None,
            controller: None,
            show_settings: false,
            status_message: "Ready".to_string(),
            console_log: Vec::new(),
            task_sender,
            task_receiver,
            config,
        };

        app.log(&format!("[INFO] Config directory: {}", config_dir().display()));
        app.log(&format!("[INFO] {} favorites loaded", app.favorites.count()));
        app.load_catalog();
        app
    }

    fn log(&mut self, message: &str) {
        let timestamp = timestamp_now();
        self.console_log.push(format!("[{}] {}", timestamp, message));
        // Keep last 500 lines
        if self.console_log.len() > 500 {
            self.console_log.remove(0);
        }
    }

    fn load_catalog(&mut self) {
        let source = CatalogSource::from_config(&self.config);
        let description = source.describe();

        if source == CatalogSource::Bundled {
            match Catalog::bundled() {
                Ok(catalog) => self.apply_catalog(catalog, &description),
                Err(e) => self.log(&format!("[ERROR] Bundled catalog unreadable: {}", e)),
            }
            return;
        }

        self.catalog_loading = true;
        self.status_message = format!("Loading catalog from {}...", description);
        self.log(&format!("[INFO] Loading catalog from {}", description));

        let sender = self.task_sender.clone();
        let user_agent = self.config.user_agent.clone();
        let ctx = self.ctx.clone();
        thread::spawn(move || {
            let result = match source.load(&user_agent) {
                Ok(catalog) => TaskResult::CatalogLoaded {
                    catalog: Box::new(catalog),
                    source: description,
                },
                Err(e) => TaskResult::CatalogError {
                    source: description,
                    error: e.to_string(),
                },
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    fn apply_catalog(&mut self, catalog: Catalog, source: &str) {
        self.log(&format!(
            "[INFO] Catalog: {} games, {} categories from {}",
            catalog.len(),
            catalog.categories().len(),
            source
        ));
        self.status_message = format!("{} games available", catalog.len());
        self.catalog = catalog;
        self.catalog_loading = false;

        // Bring back the last game without starting it
        if self.selected_game.is_none() && is_valid_slug(&self.config.last_game_slug) {
            if let Some(game) = self.catalog.get_by_slug(&self.config.last_game_slug).cloned() {
                self.open_game(game);
            }
        }
    }

    /// Select content for the player. Any running session is torn down; the new
    /// one only starts when the user clicks start.
    fn open_game(&mut self, game: ContentDescriptor) {
        if self.selected_game.as_ref().map(|g| g.id.as_str()) == Some(game.id.as_str()) {
            return;
        }
        let previous = self.selected_game.as_ref().map(|g| g.id.clone());
        self.close_session();

        self.analytics.notify_navigation(previous.as_deref(), &game.id);
        self.log(&format!("[INFO] Selected '{}'", game.title));
        self.config.last_game_slug = game.slug.clone();
        self.config.save();

        let surface = HttpSurface::new(&self.config.user_agent).with_context(self.ctx.clone());
        self.controller = Some(SessionController::new(surface, self.analytics.clone()));
        self.selected_game = Some(game);
    }

    fn close_session(&mut self) {
        let now = Instant::now();
        if let Err(e) = self.fullscreen.exit(now) {
            self.log(&format!("[WARN] {}", e));
        }
        self.fullscreen.cancel_focus();
        if let Some(mut controller) = self.controller.take() {
            controller.teardown();
        }
        self.selected_game = None;
    }

    fn start_game(&mut self) {
        let Some(game) = self.selected_game.clone() else {
            return;
        };
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        match controller.start(game, Instant::now()) {
            Ok(epoch) => {
                let budget = controller.session().map(|s| s.timeout_budget.as_secs()).unwrap_or_default();
                self.log(&format!("[PLAY] Loading attempt {} (timeout {}s)", epoch.value(), budget));
            }
            Err(e) => self.log(&format!("[ERROR] {}", e)),
        }
    }

    fn retry_game(&mut self) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        match controller.retry(Instant::now()) {
            Ok(epoch) => self.log(&format!("[PLAY] Retrying (attempt {})", epoch.value())),
            Err(e) => self.log(&format!("[ERROR] {}", e)),
        }
    }

    fn continue_anyway(&mut self) {
        let accepted = self
            .controller
            .as_mut()
            .map(|c| c.continue_anyway(Instant::now()))
            .unwrap_or(false);
        if accepted {
            self.log("[WARN] Continuing without a ready signal");
        }
    }

    fn toggle_fullscreen(&mut self) {
        let handle = self.controller.as_ref().and_then(|c| c.surface_handle());
        if let Err(e) = self.fullscreen.toggle(handle, Instant::now()) {
            self.log(&format!("[WARN] {}", e));
            self.status_message = e.to_string();
        }
    }

    fn on_session_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::StageChanged { stage, .. } => {
                self.status_message = overlay_message(stage, false).to_string();
            }
            SessionUpdate::Settled { degraded, .. } => {
                self.status_message = stage_message(Stage::Ready).to_string();
                let title = self.selected_game.as_ref().map(|g| g.title.clone()).unwrap_or_default();
                if degraded {
                    self.log(&format!("[PLAY] '{}' accepted without ready signal", title));
                } else {
                    self.log(&format!("[PLAY] '{}' is ready to play", title));
                }
                if self.config.launch_browser {
                    if let Some(url) = self.selected_game.as_ref().map(|g| g.content_url.clone()) {
                        self.launch_browser(&url);
                    }
                }
            }
            SessionUpdate::TimedOut { budget, .. } => {
                self.log(&format!("[WARN] No response from content after {}s", budget.as_secs()));
            }
            SessionUpdate::Failed { error, .. } => {
                self.log(&format!("[ERROR] {}", error));
                self.status_message = error.to_string();
            }
        }
    }

    /// Open content in the configured external browser
    fn launch_browser(&mut self, url: &str) {
        let browser = self.config.effective_browser();
        self.log(&format!("[PLAY] Opening in {}: {}", browser, url));

        let mut cmd = Command::new(&browser);
        cmd.arg(url);
        // Capture stderr for error logging
        cmd.stderr(Stdio::piped());
        cmd.stdout(Stdio::null());

        match cmd.spawn() {
            Ok(mut child) => {
                if let Some(stderr) = child.stderr.take() {
                    let sender = self.task_sender.clone();
                    thread::spawn(move || {
                        let reader = BufReader::new(stderr);
                        for line in reader.lines().map_while(Result::ok) {
                            if !line.trim().is_empty() {
                                let _ = sender.send(TaskResult::BrowserLog(format!("[BROWSER] {}", line)));
                            }
                        }
                    });
                }

                let sender = self.task_sender.clone();
                thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        let _ = sender.send(TaskResult::BrowserExited { code: status.code() });
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = sender.send(TaskResult::BrowserLog(format!("[ERROR] Failed to wait for browser: {}", e)));
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Failed to launch browser '{}': {}", browser, e);
                self.log(&format!("[ERROR] Failed to launch browser '{}': {}", browser, e));
            }
        }
    }

    fn export_favorites(&mut self) {
        let file_name = export_file_name(chrono::Local::now().date_naive());
        let Some(path) = rfd::FileDialog::new()
            .set_title("Export Favorites")
            .set_file_name(&file_name)
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };

        match self.favorites.export_to(&path) {
            Ok(()) => {
                self.log(&format!("[INFO] Exported {} favorites to {}", self.favorites.count(), path.display()));
                self.status_message = "Favorites exported".to_string();
            }
            Err(e) => self.log(&format!("[ERROR] {}", e)),
        }
    }

    fn import_favorites(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Import Favorites")
            .add_filter("JSON", &["json"])
            .add_filter("All Files", &["*"])
            .pick_file()
        else {
            return;
        };

        match self.favorites.import_from(&path) {
            Ok(summary) => {
                self.log(&format!(
                    "[INFO] Imported {} favorites ({} total)",
                    summary.added_count, summary.total_count
                ));
                self.status_message = format!("Imported {} new favorites", summary.added_count);
            }
            Err(e) => {
                self.log(&format!("[ERROR] Import failed: {}", e));
                self.status_message = format!("Import failed: {}", e);
            }
        }
    }

    fn apply_font_size(&self, ctx: &egui::Context) {
        let size = self.config.font_size.clamp(10, 24) as f32;
        ctx.style_mut(|style| {
            for (text_style, font) in style.text_styles.iter_mut() {
                font.size = match text_style {
                    egui::TextStyle::Heading => size + 6.0,
                    egui::TextStyle::Small => size - 3.0,
                    _ => size,
                };
            }
        });
    }
}

impl eframe::App for ArcadeShelfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process background task results (non-blocking)
        while let Ok(result) = self.task_receiver.try_recv() {
            match result {
                TaskResult::CatalogLoaded { catalog, source } => {
                    self.apply_catalog(*catalog, &source);
                }
                TaskResult::CatalogError { source, error } => {
                    self.log(&format!("[ERROR] Catalog from {}: {}", source, error));
                    self.log("[WARN] Falling back to bundled catalog");
                    match Catalog::bundled() {
                        Ok(catalog) => self.apply_catalog(catalog, "bundled catalog"),
                        Err(e) => self.log(&format!("[ERROR] Bundled catalog unreadable: {}", e)),
                    }
                }
                TaskResult::BrowserLog(msg) => {
                    self.log(&msg);
                }
                TaskResult::BrowserExited { code } => {
                    let exit_msg = match code {
                        Some(c) => format!("[WARN] Browser exited with code {}", c),
                        None => "[WARN] Browser terminated by signal".to_string(),
                    };
                    self.log(&exit_msg);
                }
            }
        }

        // Session timers and surface signals
        let now = Instant::now();
        let updates = self.controller.as_mut().map(|c| c.poll(now)).unwrap_or_default();
        for update in updates {
            self.on_session_update(update);
        }

        // Fullscreen can change outside the app (window manager, OS shortcut)
        if let Some(fullscreen) = ctx.input(|i| i.viewport().fullscreen) {
            self.fullscreen.on_platform_change(fullscreen, now);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if let Some(Err(e)) = self.fullscreen.on_escape(now) {
                self.log(&format!("[WARN] {}", e));
            }
        }
        if let Some(controller) = self.controller.as_mut() {
            self.fullscreen.poll(now, controller);
        }

        // Wake up for the next timer even without input
        if let Some(deadline) = self.controller.as_ref().and_then(|c| c.next_deadline()) {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
        if self.fullscreen.focus_pending() {
            ctx.request_repaint_after(FOCUS_RESTORE_DELAY);
        }
        if self.catalog_loading {
            ctx.request_repaint();
        }

        // Apply theme
        if self.config.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
        self.apply_font_size(ctx);

        // Top panel - Controls
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.heading("🎮 Arcade Shelf");
                ui.separator();
                if ui.checkbox(&mut self.config.dark_mode, "🌙 Dark").changed() {
                    self.config.save();
                }
                if ui.button("⚙ Settings").clicked() {
                    self.show_settings = true;
                }
                if ui.button("🔄 Reload Catalog").clicked() && !self.catalog_loading {
                    self.load_catalog();
                }
            });
            ui.add_space(5.0);

            // Tab bar
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Games, "🕹 GAMES");
                ui.selectable_value(
                    &mut self.current_tab,
                    Tab::Favorites,
                    format!("⭐ FAVORITES ({})", self.favorites.count()),
                );
                ui.selectable_value(&mut self.current_tab, Tab::Player, "▶ PLAYER");

                // Push Console to the right
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.selectable_value(&mut self.current_tab, Tab::Console, "🖥 CONSOLE");
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.catalog_loading {
                    ui.spinner();
                }
                ui.label(&self.status_message);
                if self.fullscreen.is_active() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label("Fullscreen (Esc to exit)");
                    });
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.current_tab {
            Tab::Games => self.show_games_tab(ui),
            Tab::Favorites => self.show_favorites_tab(ui),
            Tab::Player => self.show_player_tab(ui),
            Tab::Console => self.show_console_tab(ui),
        });

        if self.show_settings {
            self.show_settings_window(ctx);
        }

        if self.show_clear_confirm {
            egui::Window::new("⚠ Clear Favorites")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Remove all {} favorites?", self.favorites.count()));
                    ui.horizontal(|ui| {
                        if ui.button("Clear All").clicked() {
                            self.favorites.clear_all();
                            self.log("[INFO] Favorites cleared");
                            self.show_clear_confirm = false;
                        }
                        if ui.button("Cancel").clicked() {
                            self.show_clear_confirm = false;
                        }
                    });
                });
        }
    }
}

impl ArcadeShelfApp {
    fn game_badges(&self, ui: &mut egui::Ui, game: &ContentDescriptor) {
        if self.catalog.is_hot(&game.id) {
            ui.label(egui::RichText::new("HOT").small().strong().color(egui::Color32::from_rgb(255, 90, 60)));
        }
        if self.catalog.is_new(&game.id) {
            ui.label(egui::RichText::new("NEW").small().strong().color(egui::Color32::from_rgb(80, 200, 120)));
        }
    }

    /// One catalog row. Returns (open clicked, favorite toggled).
    fn game_row(&self, ui: &mut egui::Ui, game: &ContentDescriptor) -> (bool, bool) {
        let mut open = false;
        let mut toggle = false;
        ui.horizontal(|ui| {
            let is_fav = self.favorites.is_favorite(&game.id);
            let star = if is_fav {
                egui::RichText::new("★").size(18.0).color(egui::Color32::GOLD)
            } else {
                egui::RichText::new("☆").size(18.0).color(egui::Color32::GRAY)
            };
            if ui
                .button(star)
                .on_hover_text(if is_fav { "Remove from favorites" } else { "Add to favorites" })
                .clicked()
            {
                toggle = true;
            }
            if ui.button(&game.title).on_hover_text(&game.description).clicked() {
                open = true;
            }
            self.game_badges(ui, game);
            ui.label(
                egui::RichText::new(format!(
                    "★ {}  ·  {} plays",
                    format_rating(game.rating),
                    format_play_count(game.play_count)
                ))
                .weak(),
            );
        });
        (open, toggle)
    }

    fn show_games_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search games...")
                    .desired_width(200.0),
            );

            let selected_name = self
                .selected_category
                .as_deref()
                .and_then(|id| self.catalog.category_by_id(id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "All categories".to_string());
            egui::ComboBox::from_id_salt("category_filter")
                .selected_text(selected_name)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.selected_category, None, "All categories");
                    for category in self.catalog.categories() {
                        ui.selectable_value(
                            &mut self.selected_category,
                            Some(category.id.clone()),
                            &category.name,
                        );
                    }
                });
        });
        ui.separator();

        let games: Vec<&ContentDescriptor> = if !self.search_query.trim().is_empty() {
            self.catalog
                .search(self.search_query.trim())
                .into_iter()
                .filter(|g| self.selected_category.as_ref().is_none_or(|c| &g.category == c))
                .collect()
        } else if let Some(category) = &self.selected_category {
            self.catalog.list_by_category(category)
        } else {
            self.catalog.all()
        };

        let mut open: Option<ContentDescriptor> = None;
        let mut toggle: Option<ContentDescriptor> = None;

        if games.is_empty() {
            ui.label(if self.catalog.is_empty() { "No catalog loaded" } else { "No games match" });
        }
        ui.label(egui::RichText::new(format!("{} games", games.len())).weak());

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            for game in &games {
                let (clicked, starred) = self.game_row(ui, game);
                if clicked {
                    open = Some((*game).clone());
                }
                if starred {
                    toggle = Some((*game).clone());
                }
            }
        });

        if let Some(game) = toggle {
            let now_favorite = self.favorites.toggle(&game);
            self.status_message = if now_favorite {
                format!("Added '{}' to favorites", game.title)
            } else {
                format!("Removed '{}' from favorites", game.title)
            };
        }
        if let Some(game) = open {
            self.open_game(game);
            self.current_tab = Tab::Player;
        }
    }

    fn show_favorites_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.favorites_query)
                    .hint_text("Search favorites...")
                    .desired_width(200.0),
            );
            ui.separator();
            if ui.button("📤 Export").clicked() {
                self.export_favorites();
            }
            if ui.button("📥 Import").clicked() {
                self.import_favorites();
            }
            if ui.button("🗑 Clear All").clicked() && self.favorites.count() > 0 {
                self.show_clear_confirm = true;
            }
        });
        ui.separator();

        if self.favorites.count() == 0 {
            ui.label("No favorites yet. Star a game to keep it here.");
            return;
        }

        let mut open: Option<String> = None;
        let mut remove: Option<String> = None;
        let query = self.favorites_query.trim().to_string();

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            if query.is_empty() {
                for (category, items) in self.favorites.list_by_category() {
                    let heading = self
                        .catalog
                        .category_by_id(&category)
                        .map(|c| c.name.clone())
                        .unwrap_or(category);
                    ui.label(egui::RichText::new(format!("{} ({})", heading, items.len())).strong());
                    for item in items {
                        favorite_row(ui, item, &mut open, &mut remove);
                    }
                    ui.add_space(6.0);
                }
            } else {
                let matches = self.favorites.search(&query);
                if matches.is_empty() {
                    ui.label("No favorites match");
                }
                for item in matches {
                    favorite_row(ui, item, &mut open, &mut remove);
                }
            }
        });

        if let Some(id) = remove {
            self.favorites.remove(&id);
        }
        if let Some(id) = open {
            match self.catalog.get_by_id(&id).cloned() {
                Some(game) => {
                    self.open_game(game);
                    self.current_tab = Tab::Player;
                }
                None => self.log(&format!("[WARN] Favorite '{}' is not in the current catalog", id)),
            }
        }
    }

    fn show_player_tab(&mut self, ui: &mut egui::Ui) {
        let Some(game) = self.selected_game.clone() else {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label("Pick a game from the Games tab");
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(&game.title);
            self.game_badges(ui, &game);
            let is_fav = self.favorites.is_favorite(&game.id);
            let label = if is_fav { "★ Favorited" } else { "☆ Favorite" };
            if ui.button(label).clicked() {
                self.favorites.toggle(&game);
            }
            if ui.button("✖ Close").clicked() {
                self.close_session();
            }
        });
        ui.label(
            egui::RichText::new(format!(
                "★ {}  ·  {} plays  ·  {}",
                format_rating(game.rating),
                format_play_count(game.play_count),
                game.category
            ))
            .weak(),
        );
        ui.separator();

        let now = Instant::now();
        let (stage, progress, elapsed, budget, error, degraded, settled) = match self.controller.as_ref().and_then(|c| c.session()) {
            Some(s) => (s.stage, s.progress, s.elapsed(now), s.timeout_budget, s.error.clone(), s.degraded, s.settled),
            None => (Stage::Idle, 0.0, Duration::ZERO, Duration::ZERO, None, false, false),
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_height(180.0);
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                match stage {
                    Stage::Idle => {
                        if ui
                            .add(egui::Button::new(egui::RichText::new("▶ Click to start playing").size(20.0)))
                            .clicked()
                        {
                            self.start_game();
                        }
                    }
                    Stage::Connecting | Stage::FetchingResources | Stage::Initializing => {
                        ui.label(stage_message(stage));
                        ui.add(
                            egui::ProgressBar::new((progress / 100.0).clamp(0.0, 1.0))
                                .text(format!("{:.0}%", progress))
                                .desired_width(360.0),
                        );
                        ui.label(
                            egui::RichText::new(format!("{}s elapsed (limit {}s)", elapsed.as_secs(), budget.as_secs()))
                                .weak(),
                        );
                    }
                    Stage::Ready if !settled => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(overlay_message(stage, settled));
                        });
                        ui.add(egui::ProgressBar::new(1.0).desired_width(360.0));
                    }
                    Stage::Ready => {
                        ui.label(egui::RichText::new(overlay_message(stage, settled)).strong());
                        if degraded {
                            ui.label(egui::RichText::new("Started without a ready signal").weak());
                        }
                        ui.horizontal(|ui| {
                            let fs_label = if self.fullscreen.is_active() { "🗗 Exit Fullscreen" } else { "⛶ Fullscreen" };
                            if ui.button(fs_label).clicked() {
                                self.toggle_fullscreen();
                            }
                            if ui.button("🌐 Open in Browser").clicked() {
                                self.launch_browser(&game.content_url);
                            }
                        });
                    }
                    Stage::TimedOut => {
                        ui.label(egui::RichText::new(stage_message(stage)).color(egui::Color32::YELLOW));
                        if let Some(e) = &error {
                            ui.label(e.to_string());
                        }
                        ui.horizontal(|ui| {
                            if ui.button("🔄 Retry").clicked() {
                                self.retry_game();
                            }
                            if ui.button("▶ Continue Anyway").clicked() {
                                self.continue_anyway();
                            }
                        });
                    }
                    Stage::Failed => {
                        ui.label(egui::RichText::new(stage_message(stage)).color(egui::Color32::RED));
                        if let Some(e) = &error {
                            ui.label(e.to_string());
                        }
                        if ui.button("🔄 Retry").clicked() {
                            self.retry_game();
                        }
                    }
                }
            });
        });

        if !game.controls_hints.is_empty() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("Controls").strong());
            for hint in &game.controls_hints {
                ui.label(format!("• {}", hint));
            }
        }
        if !game.description.is_empty() {
            ui.add_space(8.0);
            ui.label(&game.description);
        }

        let recommended: Vec<ContentDescriptor> =
            self.catalog.recommended(&game.id, 6).into_iter().cloned().collect();
        if !recommended.is_empty() {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("More like this").strong());
            let mut open = None;
            ui.horizontal_wrapped(|ui| {
                for other in &recommended {
                    if ui.button(&other.title).clicked() {
                        open = Some(other.clone());
                    }
                }
            });
            if let Some(other) = open {
                self.open_game(other);
            }
        }
    }

    fn show_console_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.console_log.clear();
                    self.console_log.push(format!("[{}] Console cleared", timestamp_now()));
                }
            });
        });
        ui.separator();

        // Display log entries with monospace font
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.console_log {
                    let color = if line.contains("[ERROR]") {
                        egui::Color32::RED
                    } else if line.contains("[WARN]") {
                        egui::Color32::YELLOW
                    } else if line.contains("[INFO]") {
                        egui::Color32::LIGHT_BLUE
                    } else if line.contains("[PLAY]") {
                        egui::Color32::GREEN
                    } else {
                        egui::Color32::GRAY
                    };

                    ui.label(egui::RichText::new(line).monospace().color(color));
                }
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save = false;
        egui::Window::new("⚙ Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .min_width(420.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Catalog").strong());
                ui.horizontal(|ui| {
                    ui.label("URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.config.catalog_url)
                            .hint_text("https://... (json or json.gz)")
                            .desired_width(280.0),
                    );
                });
                ui.horizontal(|ui| {
                    ui.label("File:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.config.catalog_path)
                            .hint_text("empty = bundled catalog")
                            .desired_width(240.0),
                    );
                    if ui.button("📁").on_hover_text("Browse for catalog file").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_title("Select Catalog")
                            .add_filter("Catalog", &["json", "gz"])
                            .add_filter("All Files", &["*"])
                            .pick_file()
                        {
                            self.config.catalog_path = path.display().to_string();
                        }
                    }
                });
                ui.separator();

                ui.label(egui::RichText::new("Playback").strong());
                ui.checkbox(&mut self.config.launch_browser, "Open games in external browser once ready");
                ui.horizontal(|ui| {
                    ui.label("Browser:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.config.browser_command)
                            .hint_text("xdg-open, open, firefox...")
                            .desired_width(240.0),
                    );
                });
                ui.label("User Agent:");
                ui.add(
                    egui::TextEdit::multiline(&mut self.config.user_agent)
                        .desired_width(f32::INFINITY)
                        .desired_rows(2),
                );
                ui.separator();

                ui.label(egui::RichText::new("Interface").strong());
                ui.add(egui::Slider::new(&mut self.config.font_size, 10..=24).text("Font size"));
                ui.checkbox(&mut self.config.enable_analytics, "Record usage to analytics.jsonl")
                    .on_hover_text("Takes effect on next start");
                ui.separator();

                if ui.button("💾 Save").clicked() {
                    save = true;
                }
            });

        if save {
            self.config.save();
            self.log("[INFO] Settings saved");
            self.load_catalog();
        }
        self.show_settings = open && !save;
    }
}

fn favorite_row(ui: &mut egui::Ui, item: &FavoriteItem, open: &mut Option<String>, remove: &mut Option<String>) {
    ui.horizontal(|ui| {
        if ui
            .button(egui::RichText::new("★").size(18.0).color(egui::Color32::GOLD))
            .on_hover_text("Remove from favorites")
            .clicked()
        {
            *remove = Some(item.id.clone());
        }
        if ui.button(&item.title).clicked() {
            *open = Some(item.id.clone());
        }
        ui.label(egui::RichText::new(format!("★ {}", format_rating(item.rating))).weak());
    });
}
