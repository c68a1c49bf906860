//! Transit Engine
//!
//! Discovery pipeline for satellite transits of the Sun and Moon as seen
//! from a circular region around a ground observer. For each satellite
//! pass above the horizon it projects the body->satellite shadow ray onto
//! the WGS-84 ellipsoid, finds the closest approach of that ground track
//! to the observer with a coarse-to-fine search, classifies the event by
//! topocentric angular separation, and emits the shadow centerline.
//!
//! The HTTP envelope lives in the gateway; this crate owns everything from
//! the normalized request to the sorted event list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;
pub mod evaluator;
pub mod observer;
pub mod passes;
pub mod pipeline;
pub mod satellite;
pub mod shadow;

pub use catalog::{Catalog, CatalogError, TleRecord};
pub use observer::{Observer, Topocentric};
pub use passes::PassInterval;
pub use pipeline::{fan_out, run, EngineConfig, Request, WorkItem};
pub use satellite::SatelliteHandle;
pub use sky_ephemeris::Body;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid TLE for {name}: {reason}")]
    InvalidTle { name: String, reason: String },
    #[error("propagation failed for {name}: {reason}")]
    Propagation { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// One point of the shadow centerline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A predicted disk crossing or close pass, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitEvent {
    pub satellite: String,
    pub celestial_body: Body,
    pub transit_type: String,
    pub time_utc: String,
    pub duration_sec: f64,
    pub swath_width_km: f64,
    pub separation_deg: f64,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub path_points: Vec<PathPoint>,
}
