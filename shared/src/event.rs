use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::capabilities::{GeocodeResponse, GeolocationResult};
use crate::config::Config;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(AddressId);

impl AddressId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// --- Coordinate: validated, NaN-safe ---

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate must be finite")]
    NonFinite,
    #[error("invalid zoom: {0}")]
    InvalidZoom(f64),
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// For compile-time constants already known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Coordinate {}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

// --- Zoom: validated ---

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct Zoom(f64);

impl Zoom {
    pub fn new(value: f64) -> Result<Self, CoordinateError> {
        if !value.is_finite() || !(0.0..=22.0).contains(&value) {
            return Err(CoordinateError::InvalidZoom(value));
        }
        Ok(Self(value))
    }

    pub(crate) const fn new_unchecked(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Zoom {
    type Error = CoordinateError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Zoom> for f64 {
    fn from(zoom: Zoom) -> Self {
        zoom.0
    }
}

// --- Category: closed set, parsed at the form boundary ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Home,
    Office,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::Home, Self::Office];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Office => "Office",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// --- Search widget payload ---

/// A place picked in the shell's autocomplete widget. Only the location is
/// consumed; the other fields are carried for logging.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Place {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

// --- Event enum: large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub enum Event {
    #[default]
    Noop,

    AppStarted,
    Configure(Box<Config>),
    TimerTick {
        now_ms: u64,
    },

    // Location
    CurrentPositionRequested,
    CurrentPositionResolved {
        seq: u64,
        result: Box<GeolocationResult>,
    },
    PlaceSelected {
        places: Vec<Place>,
    },
    GeocodeResolved {
        seq: u64,
        response: Box<GeocodeResponse>,
    },
    RetryGeocodeRequested,
    PermissionModalDismissed,

    // Form
    HouseNumberChanged {
        value: String,
    },
    AreaChanged {
        value: String,
    },
    CategoryChosen {
        category: String,
    },
    FavoriteFlagToggled,
    SubmitRequested,
    CancelEditRequested,

    // Saved list rows
    EditRequested {
        id: AddressId,
    },
    DeleteRequested {
        id: AddressId,
    },
    FavoriteToggled {
        id: AddressId,
    },

    DismissError,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::TimerTick { .. } => "timer_tick",
            Self::CurrentPositionRequested => "current_position_requested",
            Self::CurrentPositionResolved { .. } => "current_position_resolved",
            Self::PlaceSelected { .. } => "place_selected",
            Self::GeocodeResolved { .. } => "geocode_resolved",
            Self::RetryGeocodeRequested => "retry_geocode_requested",
            Self::PermissionModalDismissed => "permission_modal_dismissed",
            Self::HouseNumberChanged { .. } => "house_number_changed",
            Self::AreaChanged { .. } => "area_changed",
            Self::CategoryChosen { .. } => "category_chosen",
            Self::FavoriteFlagToggled => "favorite_flag_toggled",
            Self::SubmitRequested => "submit_requested",
            Self::CancelEditRequested => "cancel_edit_requested",
            Self::EditRequested { .. } => "edit_requested",
            Self::DeleteRequested { .. } => "delete_requested",
            Self::FavoriteToggled { .. } => "favorite_toggled",
            Self::DismissError => "dismiss_error",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::CurrentPositionRequested
                | Self::PlaceSelected { .. }
                | Self::RetryGeocodeRequested
                | Self::PermissionModalDismissed
                | Self::SubmitRequested
                | Self::CancelEditRequested
                | Self::EditRequested { .. }
                | Self::DeleteRequested { .. }
                | Self::FavoriteToggled { .. }
                | Self::DismissError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_nan() {
        assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite));
        assert_eq!(Coordinate::new(0.0, f64::NAN), Err(CoordinateError::NonFinite));
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 181.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
    }

    #[test]
    fn coordinate_accepts_valid() {
        assert!(Coordinate::new(28.6139, 77.2090).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn coordinate_deserialization_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"lat":51.5,"lng":-0.12}"#).unwrap();
        assert_eq!(ok.lat(), 51.5);
        assert!(serde_json::from_str::<Coordinate>(r#"{"lat":120.0,"lng":0.0}"#).is_err());
    }

    #[test]
    fn zoom_rejects_invalid() {
        assert!(Zoom::new(-1.0).is_err());
        assert!(Zoom::new(23.0).is_err());
        assert!(Zoom::new(f64::NAN).is_err());
        assert!(Zoom::new(12.0).is_ok());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Home".parse::<Category>(), Ok(Category::Home));
        assert_eq!("office".parse::<Category>(), Ok(Category::Office));
        assert_eq!(" OFFICE ".parse::<Category>(), Ok(Category::Office));
        assert!("Gym".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(AddressId::generate(), AddressId::generate());
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 64,
            "Event enum is {} bytes; box the larger variants",
            size
        );
    }
}
