use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum GeolocationOperation {
    /// One-shot position fix. The shell must give up after `timeout_ms`
    /// and answer with [`GeolocationError::Timeout`].
    CurrentPosition { timeout_ms: u64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("geolocation is not supported on this platform")]
    Unsupported,

    #[error("position request timed out")]
    Timeout,
}

impl GeolocationError {
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Geolocation failed. Enable location services or search manually."
            }
            Self::Unsupported => "Geolocation is not supported by your browser.",
            Self::Timeout => "Locating took too long. Try again or search manually.",
        }
    }
}

pub type GeolocationResult = Result<Position, GeolocationError>;

impl Operation for GeolocationOperation {
    type Output = GeolocationResult;
}

#[derive(Capability)]
pub struct Geolocation<Ev> {
    context: CapabilityContext<GeolocationOperation, Ev>,
}

impl<Ev> Geolocation<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<GeolocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn current_position<F>(&self, timeout_ms: u64, make_event: F)
    where
        F: FnOnce(GeolocationResult) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(GeolocationOperation::CurrentPosition { timeout_ms })
                .await;
            context.update_app(make_event(result));
        });
    }
}
