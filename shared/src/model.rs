use crate::address_store::AddressStore;
use crate::config::Settings;
use crate::event::{Coordinate, Zoom};
use crate::form::AddressForm;
use crate::resolver::LocationResolver;
use crate::AppError;

/// The whole application state. Only `App::update` mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub settings: Settings,
    /// Shell clock, advanced by `TimerTick`.
    pub now_ms: u64,

    // Map
    pub marker: Coordinate,
    pub map_zoom: Zoom,
    /// Set once the marker has been placed by a fix, a search or an edit.
    pub marker_placed: bool,

    pub store: AddressStore,
    pub form: AddressForm,
    pub resolver: LocationResolver,

    pub active_error: Option<AppError>,
}

impl Default for Model {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            marker: settings.default_center,
            map_zoom: settings.default_zoom,
            settings,
            now_ms: 0,
            marker_placed: false,
            store: AddressStore::new(),
            form: AddressForm::new(),
            resolver: LocationResolver::new(),
            active_error: None,
        }
    }
}

impl Model {
    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn place_marker(&mut self, coordinate: Coordinate) {
        self.marker = coordinate;
        self.marker_placed = true;
    }

    /// Installs new settings, moving the marker to the configured default
    /// center unless it has already been placed.
    pub fn apply_settings(&mut self, settings: Settings) {
        if !self.marker_placed {
            self.marker = settings.default_center;
            self.map_zoom = settings.default_zoom;
        }
        self.settings = settings;
    }
}
