//! Earth-frame transforms.
//!
//! TEME <-> ECEF via Greenwich Mean Sidereal Time, WGS-84 geodetic <->
//! ECEF, and the SEZ topocentric frame used for altitude/azimuth.

use nalgebra::{Rotation3, Vector3};
use std::f64::consts::PI;

use crate::time::J2000_JD;
use crate::{EARTH_E2, EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING};

/// Greenwich Mean Sidereal Time in radians, normalized to [0, 2pi).
/// Takes a UTC-scale Julian date (UT1 ~ UTC at this precision).
pub fn gmst_rad(jd_ut: f64) -> f64 {
    let t = (jd_ut - J2000_JD) / 36_525.0;
    let gmst_deg = 280.460_618_37
        + 360.985_647_366_29 * (jd_ut - J2000_JD)
        + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;

    let mut gmst = gmst_deg.to_radians() % (2.0 * PI);
    if gmst < 0.0 {
        gmst += 2.0 * PI;
    }
    gmst
}

/// Rotate an equatorial frame-of-date (TEME-compatible) vector into ECEF.
pub fn teme_to_ecef(v: Vector3<f64>, gmst: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -gmst) * v
}

/// Rotate an ECEF vector into the equatorial frame of date.
pub fn ecef_to_teme(v: Vector3<f64>, gmst: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), gmst) * v
}

/// Geodetic WGS-84 coordinates to an ECEF position in km.
pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt_km: f64) -> Vector3<f64> {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();

    // Radius of curvature in the prime vertical
    let n = EARTH_EQUATORIAL_RADIUS_KM / (1.0 - EARTH_E2 * sin_lat * sin_lat).sqrt();

    Vector3::new(
        (n + alt_km) * cos_lat * lon.cos(),
        (n + alt_km) * cos_lat * lon.sin(),
        (n * (1.0 - EARTH_E2) + alt_km) * sin_lat,
    )
}

/// ECEF position in km to geodetic WGS-84 `(lat_deg, lon_deg, alt_km)`,
/// Bowring's closed-form reduction.
pub fn ecef_to_geodetic(v: Vector3<f64>) -> (f64, f64, f64) {
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let b = a * (1.0 - EARTH_FLATTENING);
    let ep2 = (a * a - b * b) / (b * b);

    let p = (v.x * v.x + v.y * v.y).sqrt();
    if p < 1e-9 {
        // On the polar axis the longitude is undefined; pin it to zero.
        let lat = if v.z >= 0.0 { 90.0 } else { -90.0 };
        return (lat, 0.0, v.z.abs() - b);
    }

    let theta = (v.z * a).atan2(p * b);
    let (sin_theta, cos_theta) = theta.sin_cos();
    let lat = (v.z + ep2 * b * sin_theta.powi(3)).atan2(p - EARTH_E2 * a * cos_theta.powi(3));
    let lon = v.y.atan2(v.x);

    let sin_lat = lat.sin();
    let n = a / (1.0 - EARTH_E2 * sin_lat * sin_lat).sqrt();
    let alt = p / lat.cos() - n;

    (lat.to_degrees(), lon.to_degrees(), alt)
}

/// Rotate a relative ECEF vector into the observer's SEZ frame
/// (x = South, y = East, z = Zenith).
pub fn ecef_to_sez(v: Vector3<f64>, lat_deg: f64, lon_deg: f64) -> Vector3<f64> {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    Vector3::new(
        sin_lat * cos_lon * v.x + sin_lat * sin_lon * v.y - cos_lat * v.z,
        -sin_lon * v.x + cos_lon * v.y,
        cos_lat * cos_lon * v.x + cos_lat * sin_lon * v.y + sin_lat * v.z,
    )
}

/// Altitude and azimuth in degrees from an SEZ vector. Azimuth is measured
/// from North, clockwise, in [0, 360).
pub fn altaz_from_sez(sez: Vector3<f64>) -> (f64, f64) {
    let range = sez.norm();
    let alt = (sez.z / range).asin().to_degrees();

    // az = atan2(East, North); North is -x in SEZ
    let mut az = sez.y.atan2(-sez.x).to_degrees();
    if az < 0.0 {
        az += 360.0;
    }
    if az >= 360.0 {
        az -= 360.0;
    }
    (alt, az)
}

/// Angle between two position vectors, degrees.
pub fn angular_separation_deg(a: Vector3<f64>, b: Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}
