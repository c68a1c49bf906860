//! Sky Ephemeris Library
//!
//! Time-scale conversions (UTC calendar <-> Terrestrial Time Julian dates),
//! analytic Sun/Moon geocentric positions, and the Earth-frame transforms
//! (TEME/ECEF/SEZ, WGS-84 geodetic) used by the transit search.
//!
//! Positions are kilometers in an equatorial frame of date, which the
//! transit geometry differences directly against SGP4 TEME vectors. The
//! frame mismatch is at the nutation level (tens of arcseconds), far below
//! the disk-crossing thresholds this library feeds.

pub mod bodies;
pub mod frames;
pub mod time;

pub use bodies::Body;

/// WGS-84 equatorial radius, km.
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;

/// WGS-84 flattening.
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// First eccentricity squared of the WGS-84 ellipsoid.
pub const EARTH_E2: f64 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);

/// Astronomical unit, km.
pub const AU_KM: f64 = 149_597_870.7;

/// Speed of light, km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;
