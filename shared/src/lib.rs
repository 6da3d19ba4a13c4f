// lib.rs - address book core: saved addresses pinned on a map

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod address_store;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod form;
pub mod model;
pub mod resolver;
pub mod view;

use serde::{Deserialize, Serialize};

pub use address_store::{AddressRecord, AddressStore, StoreError};
pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ApiKey, Config, ConfigError};
pub use event::{AddressId, Category, Coordinate, Event, Place, Zoom};
pub use form::{AddressForm, FormMode, SubmitError, ValidationError};
pub use model::Model;
pub use view::ViewModel;

pub const DEFAULT_CENTER_LAT: f64 = 28.6139;
pub const DEFAULT_CENTER_LNG: f64 = 77.2090;
pub const DEFAULT_MAP_ZOOM: f64 = 12.0;
pub const DEFAULT_GEOLOCATION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_GEOCODE_TIMEOUT_MS: u64 = 10_000;
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 500;
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    RecordNotFound,
    LocationPermissionDenied,
    LocationUnsupported,
    LocationTimeout,
    Configuration,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::LocationUnsupported => "LOCATION_UNSUPPORTED",
            Self::LocationTimeout => "LOCATION_TIMEOUT",
            Self::Configuration => "CONFIGURATION_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::LocationPermissionDenied | Self::LocationTimeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation
            | ErrorKind::LocationPermissionDenied
            | ErrorKind::LocationUnsupported
            | ErrorKind::LocationTimeout => self.message.clone(),
            ErrorKind::RecordNotFound => {
                "That address is no longer in your list. Please try again.".into()
            }
            ErrorKind::Configuration => {
                "The map is not configured correctly. Please contact support.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        let message = match e {
            ValidationError::InvalidCategory(_) => "Category must be Home or Office.",
            ValidationError::MissingHouseNumber
            | ValidationError::MissingArea
            | ValidationError::MissingCategory => "All fields are required!",
        };
        AppError::new(ErrorKind::Validation, message).with_internal(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::new(ErrorKind::RecordNotFound, e.to_string())
    }
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Validation(e) => e.into(),
            SubmitError::Store(e) => e.into(),
        }
    }
}

impl From<capabilities::GeolocationError> for AppError {
    fn from(e: capabilities::GeolocationError) -> Self {
        use capabilities::GeolocationError;
        let kind = match e {
            GeolocationError::PermissionDenied => ErrorKind::LocationPermissionDenied,
            GeolocationError::Unsupported => ErrorKind::LocationUnsupported,
            GeolocationError::Timeout => ErrorKind::LocationTimeout,
        };
        AppError::new(kind, e.user_message())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

pub mod app {
    use tracing::{debug, info, warn};

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Settings;
    use crate::resolver::{first_place_coordinate, PositionOutcome};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn request_current_position(model: &mut Model, caps: &Capabilities) {
            let timeout_ms = model.settings.geolocation_timeout_ms;
            let seq = model.resolver.begin_position(model.now_ms, timeout_ms);
            caps.geolocation.current_position(timeout_ms, move |result| {
                Event::CurrentPositionResolved {
                    seq,
                    result: Box::new(result),
                }
            });
        }

        fn request_geocode(model: &mut Model, caps: &Capabilities, coordinate: Coordinate) {
            let seq = model.resolver.begin_geocode(
                coordinate,
                model.now_ms,
                model.settings.geocode_timeout_ms,
            );
            caps.geocoder.reverse(coordinate, move |response| Event::GeocodeResolved {
                seq,
                response: Box::new(response),
            });
        }

        fn move_marker(model: &mut Model, caps: &Capabilities, coordinate: Coordinate) {
            model.place_marker(coordinate);
            caps.map_camera.pan_to(coordinate, model.map_zoom);
        }

        /// Marker placed by search or edit; an outstanding fix must not move it.
        fn place_by_user(model: &mut Model, caps: &Capabilities, coordinate: Coordinate) {
            model.resolver.supersede_position();
            Self::move_marker(model, caps, coordinate);
        }

        fn report(model: &mut Model, error: impl Into<AppError>) {
            let error = error.into();
            warn!(code = error.code(), %error, "Operation rejected");
            model.set_error(error);
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            if event.is_user_initiated() {
                debug!(event = event.name(), "User action");
            }

            match event {
                Event::Noop => {}

                Event::AppStarted => {
                    Self::request_current_position(model, caps);
                    caps.render.render();
                }

                Event::Configure(config) => {
                    match config.validate() {
                        Ok(()) => {
                            model.apply_settings(Settings::from(*config));
                            info!("Configuration applied");
                        }
                        Err(e) => Self::report(model, e),
                    }
                    caps.render.render();
                }

                Event::TimerTick { now_ms } => {
                    model.now_ms = now_ms;
                    if model.resolver.expire(now_ms).any() {
                        caps.render.render();
                    }
                }

                Event::CurrentPositionRequested => {
                    Self::request_current_position(model, caps);
                    caps.render.render();
                }

                Event::CurrentPositionResolved { seq, result } => {
                    match model.resolver.accept_position(seq, &result) {
                        PositionOutcome::Stale => return,
                        PositionOutcome::Located(coordinate) => {
                            Self::move_marker(model, caps, coordinate);
                            Self::request_geocode(model, caps, coordinate);
                        }
                        PositionOutcome::Failed(_) => {}
                    }
                    caps.render.render();
                }

                Event::PlaceSelected { places } => {
                    if let Some(coordinate) = first_place_coordinate(&places) {
                        info!(candidates = places.len(), %coordinate, "Place selected");
                        Self::place_by_user(model, caps, coordinate);
                        Self::request_geocode(model, caps, coordinate);
                        caps.render.render();
                    }
                }

                Event::GeocodeResolved { seq, response } => {
                    if model.resolver.accept_geocode(seq, &response).is_some() {
                        caps.render.render();
                    }
                }

                Event::RetryGeocodeRequested => {
                    if let Some(coordinate) = model.resolver.retry_target() {
                        Self::request_geocode(model, caps, coordinate);
                        caps.render.render();
                    }
                }

                Event::PermissionModalDismissed => {
                    model.resolver.dismiss_denied();
                    caps.render.render();
                }

                Event::HouseNumberChanged { value } => {
                    model.form.house_number = value;
                    caps.render.render();
                }

                Event::AreaChanged { value } => {
                    model.form.area = value;
                    caps.render.render();
                }

                Event::CategoryChosen { category } => {
                    model.form.category = category;
                    caps.render.render();
                }

                Event::FavoriteFlagToggled => {
                    model.form.is_favorite = !model.form.is_favorite;
                    caps.render.render();
                }

                Event::SubmitRequested => {
                    match model.form.submit(&mut model.store, model.marker) {
                        Ok(_) => model.clear_error(),
                        Err(e) => Self::report(model, e),
                    }
                    caps.render.render();
                }

                Event::CancelEditRequested => {
                    model.form.cancel_edit();
                    caps.render.render();
                }

                Event::EditRequested { id } => {
                    match model.store.get(&id).cloned() {
                        Some(record) => {
                            model.form.begin_edit(&record);
                            Self::place_by_user(model, caps, record.coordinate);
                        }
                        None => Self::report(model, StoreError::NotFound(id)),
                    }
                    caps.render.render();
                }

                Event::DeleteRequested { id } => {
                    match model.store.delete(&id) {
                        Ok(removed) => {
                            model.form.forget(&removed.id);
                        }
                        Err(e) => Self::report(model, e),
                    }
                    caps.render.render();
                }

                Event::FavoriteToggled { id } => {
                    if let Err(e) = model.store.toggle_favorite(&id) {
                        Self::report(model, e);
                    }
                    caps.render.render();
                }

                Event::DismissError => {
                    model.clear_error();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel::build(model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::GeolocationError;

    #[test]
    fn test_validation_errors_map_to_required_fields_alert() {
        let error = AppError::from(ValidationError::MissingArea);
        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(error.user_facing_message(), "All fields are required!");
        assert_eq!(error.internal_message.as_deref(), Some("area/road is required"));
    }

    #[test]
    fn test_invalid_category_message() {
        let error = AppError::from(ValidationError::InvalidCategory("Gym".into()));
        assert_eq!(error.user_facing_message(), "Category must be Home or Office.");
    }

    #[test]
    fn test_store_errors_map_to_record_not_found() {
        let error = AppError::from(StoreError::IndexOutOfRange { index: 3, len: 1 });
        assert_eq!(error.code(), "RECORD_NOT_FOUND");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_location_errors_are_classified() {
        let denied = AppError::from(GeolocationError::PermissionDenied);
        assert_eq!(denied.kind, ErrorKind::LocationPermissionDenied);
        assert!(denied.is_retryable());

        let unsupported = AppError::from(GeolocationError::Unsupported);
        assert_eq!(unsupported.kind, ErrorKind::LocationUnsupported);
        assert!(!unsupported.is_retryable());
    }

    #[test]
    fn test_display_includes_code_and_internal() {
        let error = AppError::new(ErrorKind::Configuration, "bad").with_internal("detail");
        assert_eq!(error.to_string(), "[CONFIGURATION_ERROR] bad (internal: detail)");
    }
}
