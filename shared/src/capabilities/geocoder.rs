use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

use crate::event::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum GeocoderOperation {
    Reverse { coordinate: Coordinate },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeocodeResult {
    pub formatted_address: String,
}

/// Raw reply from the geocoding service: a status code such as `OK`,
/// `ZERO_RESULTS` or `OVER_QUERY_LIMIT`, and the candidate results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

impl GeocodeResponse {
    pub fn ok(formatted_address: impl Into<String>) -> Self {
        Self {
            status: "OK".into(),
            results: vec![GeocodeResult {
                formatted_address: formatted_address.into(),
            }],
        }
    }

    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            results: Vec::new(),
        }
    }
}

impl Operation for GeocoderOperation {
    type Output = GeocodeResponse;
}

#[derive(Capability)]
pub struct Geocoder<Ev> {
    context: CapabilityContext<GeocoderOperation, Ev>,
}

impl<Ev> Geocoder<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<GeocoderOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn reverse<F>(&self, coordinate: Coordinate, make_event: F)
    where
        F: FnOnce(GeocodeResponse) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let response = context
                .request_from_shell(GeocoderOperation::Reverse { coordinate })
                .await;
            context.update_app(make_event(response));
        });
    }
}
