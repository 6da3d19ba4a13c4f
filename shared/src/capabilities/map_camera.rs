use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

use crate::event::{Coordinate, Zoom};

/// Programmatic camera moves on the shell's map widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "data")]
pub enum MapCameraOperation {
    PanTo { center: Coordinate, zoom: Zoom },
}

impl Operation for MapCameraOperation {
    type Output = ();
}

#[derive(Capability)]
pub struct MapCamera<Ev> {
    context: CapabilityContext<MapCameraOperation, Ev>,
}

impl<Ev> MapCamera<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<MapCameraOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn pan_to(&self, center: Coordinate, zoom: Zoom) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(MapCameraOperation::PanTo { center, zoom })
                .await;
        });
    }
}
