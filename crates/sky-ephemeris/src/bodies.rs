//! Analytic Sun and Moon positions.
//!
//! Low-precision series (Astronomical Almanac / truncated ELP terms) in an
//! equatorial frame of date, geocentric kilometers. Accuracy is a few
//! arcminutes for the Sun and ~0.2 degrees for the Moon at the sampled
//! epochs, comfortably below the whole-disk scale (0.28 deg) the transit
//! classifier works at.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::time::{J2000_JD, SECONDS_PER_DAY};
use crate::{AU_KM, SPEED_OF_LIGHT_KM_S};

/// Occulting body of a transit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
}

impl Body {
    /// Physical radius, km.
    pub fn radius_km(&self) -> f64 {
        match self {
            Body::Sun => 696_340.0,
            Body::Moon => 1_737.4,
        }
    }

    /// Geometric geocentric position at a TT Julian date, km.
    pub fn position_km(&self, jd_tt: f64) -> Vector3<f64> {
        match self {
            Body::Sun => sun_position_km(jd_tt),
            Body::Moon => moon_position_km(jd_tt),
        }
    }

    /// Apparent geocentric position at a TT Julian date, km, with a
    /// one-step light-time correction (evaluate at emission time).
    pub fn apparent_position_km(&self, jd_tt: f64) -> Vector3<f64> {
        let geometric = self.position_km(jd_tt);
        let light_days = geometric.norm() / SPEED_OF_LIGHT_KM_S / SECONDS_PER_DAY;
        self.position_km(jd_tt - light_days)
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Sun => write!(f, "Sun"),
            Body::Moon => write!(f, "Moon"),
        }
    }
}

/// Sun geocentric equatorial position of date, km.
pub fn sun_position_km(jd_tt: f64) -> Vector3<f64> {
    let d = jd_tt - J2000_JD;
    let l = (280.460 + 0.985_647_4 * d) % 360.0;
    let g = ((357.528 + 0.985_600_3 * d) % 360.0).to_radians();
    let lambda = (l + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    let r = 1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos();
    let epsilon = (23.439 - 0.000_000_4 * d).to_radians();

    Vector3::new(
        r * lambda.cos(),
        r * lambda.sin() * epsilon.cos(),
        r * lambda.sin() * epsilon.sin(),
    ) * AU_KM
}

/// Moon geocentric equatorial position of date, km. Principal solar
/// perturbation terms only.
pub fn moon_position_km(jd_tt: f64) -> Vector3<f64> {
    let t = (jd_tt - J2000_JD) / 36_525.0;

    let l_prime = (218.316 + 481_267.881 * t).to_radians();
    let d = (297.850 + 445_267.115 * t).to_radians();
    let m = (357.529 + 35_999.050 * t).to_radians();
    let m_prime = (134.963 + 477_198.868 * t).to_radians();
    let f = (93.272 + 483_202.018 * t).to_radians();

    let lambda = l_prime
        + 6.289_f64.to_radians() * m_prime.sin()
        + 1.274_f64.to_radians() * (2.0 * d - m_prime).sin()
        + 0.658_f64.to_radians() * (2.0 * d).sin()
        + 0.214_f64.to_radians() * (2.0 * m_prime).sin()
        - 0.186_f64.to_radians() * m.sin();

    let beta = 5.128_f64.to_radians() * f.sin() + 0.280_f64.to_radians() * (m_prime + f).sin();

    let r = 385_000.0
        - 20_905.0 * m_prime.cos()
        - 3_699.0 * (2.0 * d - m_prime).cos()
        - 2_956.0 * (2.0 * d).cos()
        - 570.0 * (2.0 * m_prime).cos();

    let eps = (23.439_291 - 0.013_004_2 * t).to_radians();
    let (sin_beta, cos_beta) = beta.sin_cos();
    let (sin_lambda, cos_lambda) = lambda.sin_cos();
    let (sin_eps, cos_eps) = eps.sin_cos();

    Vector3::new(
        r * cos_beta * cos_lambda,
        r * (cos_beta * sin_lambda * cos_eps - sin_beta * sin_eps),
        r * (cos_beta * sin_lambda * sin_eps + sin_beta * cos_eps),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::angular_separation_deg;

    #[test]
    fn test_sun_distance_near_one_au() {
        // Perihelion..aphelion sweep across a year
        for month in 0..12 {
            let jd = 2_460_310.5 + month as f64 * 30.4;
            let r = sun_position_km(jd).norm();
            assert!(
                (145_000_000.0..153_000_000.0).contains(&r),
                "Sun distance {} km out of annual range at jd {}",
                r,
                jd
            );
        }
    }

    #[test]
    fn test_moon_distance_within_orbit_range() {
        for day in 0..28 {
            let jd = 2_460_431.5 + day as f64;
            let r = moon_position_km(jd).norm();
            assert!(
                (350_000.0..410_000.0).contains(&r),
                "Moon distance {} km outside perigee..apogee at jd {}",
                r,
                jd
            );
        }
    }

    #[test]
    fn test_sun_near_equator_at_equinox() {
        // 2024-03-20 03:06 UTC equinox: solar declination crosses zero
        let jd = 2_460_389.63;
        let p = sun_position_km(jd);
        let dec = (p.z / p.norm()).asin().to_degrees();
        assert!(dec.abs() < 0.5, "equinox declination {} deg", dec);
    }

    #[test]
    fn test_apparent_light_time_shift() {
        let jd = 2_460_431.5;
        for body in [Body::Sun, Body::Moon] {
            let shift = angular_separation_deg(
                body.position_km(jd),
                body.apparent_position_km(jd),
            );
            assert!(shift > 0.0, "{} apparent position should move", body);
            assert!(shift < 0.01, "{} light-time shift {} deg too large", body, shift);
        }
    }

    #[test]
    fn test_sun_angular_radius() {
        let jd = 2_460_431.5;
        let alpha = (Body::Sun.radius_km() / sun_position_km(jd).norm())
            .asin()
            .to_degrees();
        assert!((alpha - 0.267).abs() < 0.01, "Sun angular radius {} deg", alpha);
    }

    #[test]
    fn test_moon_angular_radius() {
        let jd = 2_460_431.5;
        let alpha = (Body::Moon.radius_km() / moon_position_km(jd).norm())
            .asin()
            .to_degrees();
        assert!((alpha - 0.26).abs() < 0.02, "Moon angular radius {} deg", alpha);
    }
}
