mod geocoder;
mod geolocation;
mod map_camera;

pub use self::geocoder::{GeocodeResponse, GeocodeResult, Geocoder, GeocoderOperation};
pub use self::geolocation::{
    Geolocation, GeolocationError, GeolocationOperation, GeolocationResult, Position,
};
pub use self::map_camera::{MapCamera, MapCameraOperation};

// Crux's built-in Render covers view updates; no wrapper needed.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub geolocation: Geolocation<Event>,
    pub geocoder: Geocoder<Event>,
    pub map_camera: MapCamera<Event>,
}
