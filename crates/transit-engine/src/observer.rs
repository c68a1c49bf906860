//! Ground observer and topocentric geometry.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use sky_ephemeris::frames::{
    altaz_from_sez, angular_separation_deg, ecef_to_sez, ecef_to_teme, geodetic_to_ecef,
    teme_to_ecef,
};

/// Observer on the WGS-84 ellipsoid at sea level. Immutable for the
/// lifetime of a request; carries only the primitives so work items stay
/// trivially serializable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// Observer-frame view of a target: the relative vector in the equatorial
/// frame (for separations) plus the derived horizontal coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Topocentric {
    pub vector_km: Vector3<f64>,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
}

impl Observer {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    pub fn ecef_km(&self) -> Vector3<f64> {
        geodetic_to_ecef(self.lat_deg, self.lon_deg, 0.0)
    }

    /// Topocentric view of a geocentric TEME-frame target at the given
    /// sidereal angle.
    pub fn topocentric(&self, target_teme_km: Vector3<f64>, gmst: f64) -> Topocentric {
        let observer_teme = ecef_to_teme(self.ecef_km(), gmst);
        let rel_teme = target_teme_km - observer_teme;
        let rel_ecef = teme_to_ecef(rel_teme, gmst);
        let sez = ecef_to_sez(rel_ecef, self.lat_deg, self.lon_deg);
        let (altitude_deg, azimuth_deg) = altaz_from_sez(sez);

        Topocentric {
            vector_km: rel_teme,
            altitude_deg,
            azimuth_deg,
            range_km: rel_teme.norm(),
        }
    }
}

/// Angular separation between two topocentric views, degrees.
pub fn separation_deg(a: &Topocentric, b: &Topocentric) -> f64 {
    angular_separation_deg(a.vector_km, b.vector_km)
}
