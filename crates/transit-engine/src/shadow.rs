//! Shadow-path kernel.
//!
//! Projects the line from the occulting body through the satellite onto
//! the Earth. Intersection uses a sphere of equatorial radius (closed
//! form, stable near tangency); the subpoint reduction uses the WGS-84
//! ellipsoid to stay consistent with the observer geometry. The mismatch
//! is bounded by the flattening and sits well inside the coarse grid step.

use nalgebra::Vector3;

use sky_ephemeris::frames::{ecef_to_geodetic, gmst_rad, teme_to_ecef};
use sky_ephemeris::time::utc_jd_from_tt;
use sky_ephemeris::{Body, EARTH_EQUATORIAL_RADIUS_KM};

use crate::satellite::SatelliteHandle;
use crate::Result;

/// Mean Earth radius used for great-circle ground distances, km.
pub const HAVERSINE_RADIUS_KM: f64 = 6_371.0;

/// Ground projection of the shadow ray at one sample time. Invalid when
/// the ray misses the Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSample {
    pub valid: bool,
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl ShadowSample {
    fn invalid() -> Self {
        Self {
            valid: false,
            lat_deg: 0.0,
            lon_deg: 0.0,
        }
    }
}

/// Distance along the ray from `origin` in direction `dir` (unit) to the
/// first intersection with the Earth sphere, or `None` when the ray
/// misses. The near root is the surface point under the shadow.
pub fn ray_earth_intersection(origin: &Vector3<f64>, dir: &Vector3<f64>) -> Option<f64> {
    let b = 2.0 * origin.dot(dir);
    let c = origin.dot(origin) - EARTH_EQUATORIAL_RADIUS_KM * EARTH_EQUATORIAL_RADIUS_KM;
    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return None;
    }
    // Clamp shields the sqrt against a tangency-noise negative
    Some((-b - discriminant.max(0.0).sqrt()) / 2.0)
}

/// Evaluate the shadow ground track at each sample time of one pass. The
/// whole grid goes through the propagator in one batch.
pub fn shadow_track(
    sat: &SatelliteHandle,
    body: Body,
    times_tt: &[f64],
) -> Result<Vec<ShadowSample>> {
    let sat_positions = sat.positions_teme_km(times_tt)?;

    Ok(times_tt
        .iter()
        .zip(sat_positions)
        .map(|(&tt, sat_pos)| {
            let body_pos = body.apparent_position_km(tt);
            let direction = (sat_pos - body_pos).normalize();

            match ray_earth_intersection(&sat_pos, &direction) {
                None => ShadowSample::invalid(),
                Some(d) => {
                    let ground_teme = sat_pos + direction * d;
                    let gmst = gmst_rad(utc_jd_from_tt(tt));
                    let ground_ecef = teme_to_ecef(ground_teme, gmst);
                    let (lat_deg, lon_deg, _) = ecef_to_geodetic(ground_ecef);
                    ShadowSample {
                        valid: true,
                        lat_deg,
                        lon_deg,
                    }
                }
            }
        })
        .collect())
}

/// Great-circle distance between two geodetic points, km.
pub fn haversine_km(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let dlat = (lat2_deg - lat1_deg).to_radians();
    let dlon = (lon2_deg - lon1_deg).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * HAVERSINE_RADIUS_KM * a.sqrt().asin()
}
