use poll_promise::Promise;
use rand::Rng;

use crate::core::error::{Rejected, WallpaperError};
use crate::core::filter::{filter_for_wallpaper, RatioTarget};
use crate::core::image::{GeneratedImage, ImageCandidate};
use crate::core::library::PermissionStatus;
use crate::core::persist::{Persister, SaveOutcome, SaveSource};
use crate::core::request::{generate_image, search_images};
use crate::core::services::Services;

pub const PERMISSION_PROMPT_TITLE: &str = "Permission Required";
pub const PERMISSION_PROMPT_MESSAGE: &str = "Please grant media library permissions to save wallpapers";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load wallpapers";
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate image";
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt.";

/// A notice for the user, drained by the host with `take_alerts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

/// Fetch state of a screen. `Loading` owns the in-flight work, so a second
/// fetch cannot be represented while one is pending.
pub enum ViewState<T: Send + 'static> {
    Idle,
    Loading(Promise<Result<T, WallpaperError>>),
    Loaded(T),
    Error(String),
}

impl<T: Send + 'static> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    fn block_until_ready(&self) {
        if let ViewState::Loading(promise) = self {
            promise.block_until_ready();
        }
    }

    /// Takes the result out of a finished `Loading`, leaving `Idle` behind.
    fn take_finished(&mut self) -> Option<Result<T, WallpaperError>> {
        if !self.is_loading() {
            return None;
        }
        match std::mem::replace(self, ViewState::Idle) {
            ViewState::Loading(promise) => match promise.try_take() {
                Ok(result) => Some(result),
                Err(promise) => {
                    *self = ViewState::Loading(promise);
                    None
                }
            },
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Save state of a screen, independent of the fetch state.
pub enum SaveState {
    Idle,
    Saving(Promise<SaveOutcome>),
}

impl SaveState {
    pub fn is_saving(&self) -> bool {
        matches!(self, SaveState::Saving(_))
    }

    fn start(persister: &Persister, source: SaveSource) -> Self {
        let persister = persister.clone();
        SaveState::Saving(Promise::spawn_thread("wallpaper-save", move || {
            persister.save_to_library(&source)
        }))
    }

    fn block_until_ready(&self) {
        if let SaveState::Saving(promise) = self {
            promise.block_until_ready();
        }
    }

    fn take_finished(&mut self) -> Option<SaveOutcome> {
        match std::mem::replace(self, SaveState::Idle) {
            SaveState::Saving(promise) => match promise.try_take() {
                Ok(outcome) => Some(outcome),
                Err(promise) => {
                    *self = SaveState::Saving(promise);
                    None
                }
            },
            SaveState::Idle => None,
        }
    }
}

fn permission_alert(services: &Services) -> Option<Alert> {
    match services.prompt_permission_once() {
        Some(PermissionStatus::Granted) | None => None,
        Some(_) => Some(Alert::new(PERMISSION_PROMPT_TITLE, PERMISSION_PROMPT_MESSAGE)),
    }
}

/// The candidate shown in the detail modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: ImageCandidate,
    pub full_screen: bool,
}

/// Wallpaper gallery: random-page keyword search, detail modal and save.
///
/// A failed refresh keeps the previously loaded list on screen and raises
/// an alert; only a failed first load ends in `Error`.
pub struct GalleryScreen {
    services: Services,
    persister: Persister,
    query: String,
    target: RatioTarget,
    state: ViewState<Vec<ImageCandidate>>,
    previous: Option<Vec<ImageCandidate>>,
    selection: Option<Selection>,
    save: SaveState,
    alerts: Vec<Alert>,
}

impl GalleryScreen {
    pub fn new(services: Services) -> Self {
        let persister = services.persister();
        let query = services.settings.search.query.clone();
        Self {
            services,
            persister,
            query,
            target: RatioTarget::default(),
            state: ViewState::Idle,
            previous: None,
            selection: None,
            save: SaveState::Idle,
            alerts: Vec::new(),
        }
    }

    /// Builds the screen, asks for media access and starts the first fetch.
    pub fn open(services: Services) -> Self {
        Self::new(services).start()
    }

    /// Overrides the configured search query. Takes effect on the next refresh,
    /// so set it before `start`.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Asks for media access and starts the first fetch.
    pub fn start(mut self) -> Self {
        self.alerts.extend(permission_alert(&self.services));
        if let Err(e) = self.refresh() {
            log::warn!("Initial fetch not started: {}", e);
        }
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &ViewState<Vec<ImageCandidate>> {
        &self.state
    }

    pub fn candidates(&self) -> &[ImageCandidate] {
        self.state.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.save.is_saving()
    }

    pub fn can_refresh(&self) -> bool {
        !self.state.is_loading() && !self.save.is_saving()
    }

    pub fn can_save(&self) -> bool {
        self.can_refresh() && self.selection.is_some()
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    /// Starts a search on a random page. Closes any open modal.
    pub fn refresh(&mut self) -> Result<(), Rejected> {
        if !self.can_refresh() {
            return Err(Rejected::Busy);
        }

        let page = rand::thread_rng().gen_range(self.services.settings.search.page_range());
        let transport = self.services.transport.clone();
        let settings = self.services.settings.search.clone();
        let api_key = self.services.settings.pexels_api_key.clone();
        let query = self.query.clone();
        let target = self.target;

        if let ViewState::Loaded(list) = std::mem::replace(&mut self.state, ViewState::Idle) {
            self.previous = Some(list);
        }
        self.selection = None;
        self.state = ViewState::Loading(Promise::spawn_thread("wallpaper-search", move || {
            search_images(transport.as_ref(), &settings, &api_key, &query, page)
                .map(|photos| filter_for_wallpaper(photos, target))
        }));
        Ok(())
    }

    /// Opens the detail modal for a loaded candidate, preview closed.
    pub fn select(&mut self, index: usize) -> Result<(), Rejected> {
        if self.save.is_saving() {
            return Err(Rejected::Busy);
        }
        let list = self.state.loaded().ok_or(Rejected::NothingLoaded)?;
        let candidate = list.get(index).cloned().ok_or(Rejected::NothingSelected)?;
        self.selection = Some(Selection {
            candidate,
            full_screen: false,
        });
        Ok(())
    }

    pub fn toggle_full_screen(&mut self) -> Result<bool, Rejected> {
        let selection = self.selection.as_mut().ok_or(Rejected::NothingSelected)?;
        selection.full_screen = !selection.full_screen;
        Ok(selection.full_screen)
    }

    pub fn close(&mut self) -> Result<(), Rejected> {
        if self.save.is_saving() {
            return Err(Rejected::Busy);
        }
        self.selection = None;
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), Rejected> {
        if !self.can_refresh() {
            return Err(Rejected::Busy);
        }
        let selection = self.selection.as_ref().ok_or(Rejected::NothingSelected)?;
        let source = SaveSource::from_candidate(&selection.candidate);
        self.save = SaveState::start(&self.persister, source);
        Ok(())
    }

    /// Applies finished work. Call once per frame.
    pub fn poll(&mut self) {
        if let Some(result) = self.state.take_finished() {
            match result {
                Ok(list) => {
                    log::info!("Showing {} wallpapers", list.len());
                    self.previous = None;
                    self.state = ViewState::Loaded(list);
                }
                Err(e) => {
                    log::error!("Error fetching wallpapers: {}", e);
                    self.alerts.push(Alert::error(LOAD_FAILED_MESSAGE));
                    self.state = match self.previous.take() {
                        Some(list) => ViewState::Loaded(list),
                        None => ViewState::Error(LOAD_FAILED_MESSAGE.to_string()),
                    };
                }
            }
        }

        if let Some(outcome) = self.save.take_finished() {
            if outcome.success {
                self.selection = None;
            }
            self.alerts.push(Alert::new(outcome.title, outcome.message));
        }
    }

    /// Blocks until in-flight work finishes, then polls.
    pub fn wait(&mut self) {
        self.state.block_until_ready();
        self.save.block_until_ready();
        self.poll();
    }
}

/// Prompt-driven wallpaper generator.
///
/// Starting a generation clears the previous result and error.
pub struct GeneratorScreen {
    services: Services,
    persister: Persister,
    prompt: String,
    state: ViewState<GeneratedImage>,
    save: SaveState,
    alerts: Vec<Alert>,
}

impl GeneratorScreen {
    pub fn new(services: Services) -> Self {
        let persister = services.persister();
        Self {
            services,
            persister,
            prompt: String::new(),
            state: ViewState::Idle,
            save: SaveState::Idle,
            alerts: Vec::new(),
        }
    }

    /// Builds the screen and asks for media access.
    pub fn open(services: Services) -> Self {
        let mut screen = Self::new(services);
        screen.alerts.extend(permission_alert(&screen.services));
        screen
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The prompt is read-only while a generation runs.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), Rejected> {
        if self.state.is_loading() {
            return Err(Rejected::Busy);
        }
        self.prompt = prompt.into();
        Ok(())
    }

    pub fn state(&self) -> &ViewState<GeneratedImage> {
        &self.state
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        self.state.loaded()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn is_saving(&self) -> bool {
        self.save.is_saving()
    }

    pub fn can_generate(&self) -> bool {
        !self.state.is_loading() && !self.save.is_saving()
    }

    pub fn can_save(&self) -> bool {
        self.can_generate() && self.image().is_some()
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub fn generate(&mut self) -> Result<(), Rejected> {
        if !self.can_generate() {
            return Err(Rejected::Busy);
        }
        if self.prompt.trim().is_empty() {
            self.alerts.push(Alert::error(EMPTY_PROMPT_MESSAGE));
            return Err(Rejected::EmptyPrompt);
        }

        let transport = self.services.transport.clone();
        let settings = self.services.settings.generation.clone();
        let api_key = self.services.settings.gemini_api_key.clone();
        let prompt = self.prompt.clone();

        self.state = ViewState::Loading(Promise::spawn_thread("wallpaper-generate", move || {
            generate_image(transport.as_ref(), &settings, &api_key, &prompt)
        }));
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), Rejected> {
        if !self.can_generate() {
            return Err(Rejected::Busy);
        }
        let image = self.image().cloned().ok_or(Rejected::NothingLoaded)?;
        self.save = SaveState::start(&self.persister, SaveSource::Inline(image));
        Ok(())
    }

    pub fn poll(&mut self) {
        if let Some(result) = self.state.take_finished() {
            self.state = match result {
                Ok(image) => ViewState::Loaded(image),
                Err(e) => {
                    log::error!("Image generation error: {}", e);
                    let message = match e {
                        WallpaperError::Generation(message) => message,
                        _ => GENERATE_FAILED_MESSAGE.to_string(),
                    };
                    self.alerts.push(Alert::error(message.clone()));
                    ViewState::Error(message)
                }
            };
        }

        if let Some(outcome) = self.save.take_finished() {
            self.alerts.push(Alert::new(outcome.title, outcome.message));
        }
    }

    pub fn wait(&mut self) {
        self.state.block_until_ready();
        self.save.block_until_ready();
        self.poll();
    }
}
