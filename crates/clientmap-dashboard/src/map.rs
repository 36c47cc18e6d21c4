//! Commands for the map widget and its tile configuration

use clientmap_core::{Coordinate, RecordId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const DEFAULT_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Zoom level used when flying to a record or a searched place
pub const FLY_TO_ZOOM: u8 = 13;

/// Width of the sidebar overlapping the left edge of the map
pub const SIDEBAR_WIDTH_PX: u32 = 384;

/// Time the fly-to animation needs before a popup can be opened
pub const POPUP_DELAY: Duration = Duration::from_secs(1);

/// Something the map widget should do
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MapCommand {
    /// Animate to `center`. The target is shifted right by `offset_x_px` so
    /// it is not hidden behind the sidebar.
    FlyTo {
        center: Coordinate,
        zoom: u8,
        offset_x_px: u32,
    },
    /// Open a record's popup once `after` has elapsed
    OpenPopup { record_id: RecordId, after: Duration },
}

impl MapCommand {
    pub fn fly_to(center: Coordinate) -> Self {
        MapCommand::FlyTo {
            center,
            zoom: FLY_TO_ZOOM,
            offset_x_px: SIDEBAR_WIDTH_PX / 2,
        }
    }

    pub fn open_popup(record_id: RecordId) -> Self {
        MapCommand::OpenPopup {
            record_id,
            after: POPUP_DELAY,
        }
    }
}

/// Raster tile source shown under the markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}
