//! Pass evaluator.
//!
//! Runs one work item (satellite pass x occulting body) through the
//! coarse-to-fine shadow search, classification, swath sizing, and
//! centerline extraction. Every gate that discards a candidate returns
//! `Ok(None)`; only genuine computation failures surface as errors, and
//! the pipeline drops those items without failing the request.

use sky_ephemeris::frames::gmst_rad;
use sky_ephemeris::time::{utc_from_tt, utc_jd_from_tt, SECONDS_PER_DAY};
use sky_ephemeris::Body;

use crate::catalog::Catalog;
use crate::observer::separation_deg;
use crate::pipeline::WorkItem;
use crate::satellite::SatelliteHandle;
use crate::shadow::{haversine_km, shadow_track, ShadowSample};
use crate::{PathPoint, Result, TransitEvent};

/// Coarse grid spacing across the pass, seconds.
pub const COARSE_STEP_S: f64 = 2.0;
/// Slack added to the radius gate at coarse resolution; tolerates the
/// aliasing between a 2 s grid and the fine-grid truth.
pub const COARSE_LEEWAY_KM: f64 = 500.0;
/// Fine grid spacing, seconds.
pub const FINE_STEP_S: f64 = 0.1;
/// Half-width of the fine window around the coarse minimum, seconds.
pub const FINE_HALF_WINDOW_S: f64 = 10.0;
/// The occulting body must be at least this high for a visible event.
pub const MIN_BODY_ALTITUDE_DEG: f64 = -2.0;
/// Candidates separated further than this are discarded outright.
pub const MAX_SEPARATION_DEG: f64 = 5.0;
/// Disk radius plus tolerance: below this the silhouette crosses the disk.
pub const TRANSIT_THRESHOLD_DEG: f64 = 0.28;
/// Placeholder in-disk duration reported on every event.
pub const EVENT_DURATION_PLACEHOLDER_S: f64 = 1.5;

/// Event label for a given angular separation.
pub fn classify(separation_deg: f64) -> &'static str {
    if separation_deg < TRANSIT_THRESHOLD_DEG {
        "Transit"
    } else {
        "Close Pass"
    }
}

/// Full swath width on the ground: the body disk subtends `2*alpha`, and
/// the shadow strip scales with the slant range to the satellite.
pub fn swath_width_km(body: Body, body_range_km: f64, sat_range_km: f64) -> f64 {
    let alpha = (body.radius_km() / body_range_km).asin();
    2.0 * sat_range_km * alpha.tan()
}

/// Ground distances from each shadow sample to the observer; invalid
/// samples are pushed to infinity so they never win the minimum.
fn distances_km(samples: &[ShadowSample], observer_lat: f64, observer_lon: f64) -> Vec<f64> {
    samples
        .iter()
        .map(|s| {
            if s.valid {
                haversine_km(s.lat_deg, s.lon_deg, observer_lat, observer_lon)
            } else {
                f64::INFINITY
            }
        })
        .collect()
}

/// Index and value of the finite minimum, or `None` when every sample is
/// invalid.
fn min_finite(distances: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &d) in distances.iter().enumerate() {
        if d.is_finite() && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Evaluate one work item. `Ok(None)` is a silent rejection.
pub fn evaluate(item: &WorkItem, catalog: &Catalog) -> Result<Option<TransitEvent>> {
    let Some(record) = catalog.resolve(&item.sat_name) else {
        return Ok(None);
    };
    let sat = SatelliteHandle::from_record(record)?;

    // ---- Stage A: coarse search across the pass ----
    let duration_s = (item.set_tt - item.rise_tt) * SECONDS_PER_DAY;
    let coarse_count = ((duration_s / COARSE_STEP_S) as usize).max(2);
    let coarse_times: Vec<f64> = (0..coarse_count)
        .map(|i| item.rise_tt + i as f64 * COARSE_STEP_S / SECONDS_PER_DAY)
        .collect();

    let coarse_samples = shadow_track(&sat, item.body, &coarse_times)?;
    let coarse_dists = distances_km(
        &coarse_samples,
        item.observer.lat_deg,
        item.observer.lon_deg,
    );
    let Some((coarse_idx, coarse_min)) = min_finite(&coarse_dists) else {
        return Ok(None);
    };
    if coarse_min > item.radius_km + COARSE_LEEWAY_KM {
        return Ok(None);
    }

    // ---- Stage B: fine search around the coarse minimum ----
    let center = coarse_times[coarse_idx];
    let fine_start = item.rise_tt.max(center - FINE_HALF_WINDOW_S / SECONDS_PER_DAY);
    let fine_end = item.set_tt.min(center + FINE_HALF_WINDOW_S / SECONDS_PER_DAY);
    let fine_count = ((fine_end - fine_start) * SECONDS_PER_DAY / FINE_STEP_S) as usize;
    if fine_count < 2 {
        return Ok(None);
    }
    let fine_times: Vec<f64> = (0..fine_count)
        .map(|i| fine_start + i as f64 * FINE_STEP_S / SECONDS_PER_DAY)
        .collect();

    let fine_samples = shadow_track(&sat, item.body, &fine_times)?;
    let fine_dists = distances_km(&fine_samples, item.observer.lat_deg, item.observer.lon_deg);
    let Some((fine_idx, fine_min)) = min_finite(&fine_dists) else {
        return Ok(None);
    };
    if fine_min > item.radius_km {
        return Ok(None);
    }

    // ---- Stage C: classification at closest approach ----
    let t_star = fine_times[fine_idx];
    let gmst = gmst_rad(utc_jd_from_tt(t_star));

    let body_topo = item
        .observer
        .topocentric(item.body.apparent_position_km(t_star), gmst);
    if body_topo.altitude_deg < MIN_BODY_ALTITUDE_DEG {
        return Ok(None);
    }

    let sat_topo = item.observer.topocentric(sat.position_teme_km(t_star)?, gmst);
    let separation = separation_deg(&body_topo, &sat_topo);
    if separation > MAX_SEPARATION_DEG {
        return Ok(None);
    }

    // ---- Stage D: swath width ----
    let swath = swath_width_km(item.body, body_topo.range_km, sat_topo.range_km);

    // ---- Stage E: centerline from the valid fine samples ----
    let path_points: Vec<PathPoint> = fine_samples
        .iter()
        .filter(|s| s.valid)
        .map(|s| PathPoint {
            lat: s.lat_deg,
            lon: s.lon_deg,
        })
        .collect();

    Ok(Some(TransitEvent {
        satellite: item.sat_name.clone(),
        celestial_body: item.body,
        transit_type: classify(separation).to_string(),
        time_utc: utc_from_tt(t_star)
            .format("%Y-%m-%dT%H:%M:%S%.6fZ")
            .to_string(),
        duration_sec: EVENT_DURATION_PLACEHOLDER_S,
        swath_width_km: swath,
        separation_deg: separation,
        azimuth_deg: sat_topo.azimuth_deg,
        elevation_deg: sat_topo.altitude_deg,
        path_points,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sky_ephemeris::AU_KM;

    #[test]
    fn test_classify_threshold() {
        assert_eq!(classify(0.0), "Transit");
        assert_eq!(classify(0.279_999), "Transit");
        assert_eq!(classify(0.28), "Close Pass");
        assert_eq!(classify(4.9), "Close Pass");
    }

    #[test]
    fn test_swath_width_sun_at_leo() {
        // Sun disk ~0.267 deg at 1 AU; 1000 km slant range -> ~9.3 km wide
        let w = swath_width_km(Body::Sun, AU_KM, 1_000.0);
        assert!((w - 9.3).abs() < 0.2, "swath {} km", w);
        // Moon at mean distance comes out nearly the same angular size
        let wm = swath_width_km(Body::Moon, 384_400.0, 1_000.0);
        assert!((wm - 9.0).abs() < 0.5, "moon swath {} km", wm);
    }

    #[test]
    fn test_swath_scales_with_slant_range() {
        let near = swath_width_km(Body::Sun, AU_KM, 500.0);
        let far = swath_width_km(Body::Sun, AU_KM, 2_000.0);
        assert!((far / near - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_min_finite_masks_invalid() {
        assert_eq!(min_finite(&[f64::INFINITY, f64::INFINITY]), None);
        assert_eq!(min_finite(&[f64::INFINITY, 3.0, 1.5, 2.0]), Some((2, 1.5)));
        assert_eq!(min_finite(&[]), None);
    }

    #[test]
    fn test_distances_mask_invalid_samples() {
        let samples = [
            ShadowSample {
                valid: true,
                lat_deg: 48.0,
                lon_deg: 2.0,
            },
            ShadowSample {
                valid: false,
                lat_deg: 0.0,
                lon_deg: 0.0,
            },
        ];
        let dists = distances_km(&samples, 48.0, 2.0);
        assert!(dists[0] < 1e-9);
        assert!(dists[1].is_infinite());
    }

    proptest! {
        #[test]
        fn prop_haversine_symmetric(
            lat1 in -89.0f64..89.0,
            lon1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0,
            lon2 in -179.0f64..179.0,
        ) {
            let ab = haversine_km(lat1, lon1, lat2, lon2);
            let ba = haversine_km(lat2, lon2, lat1, lon1);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-9);
            // Never more than half the mean circumference
            prop_assert!(ab <= std::f64::consts::PI * crate::shadow::HAVERSINE_RADIUS_KM + 1e-9);
        }

        #[test]
        fn prop_classification_split(sep in 0.0f64..5.0) {
            let label = classify(sep);
            prop_assert_eq!(label == "Transit", sep < TRANSIT_THRESHOLD_DEG);
        }
    }
}
