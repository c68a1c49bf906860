//! SGP4-backed satellite handle.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use sky_ephemeris::time::{julian_date_utc, utc_jd_from_tt};

use crate::catalog::TleRecord;
use crate::{EngineError, Result};

/// Resolved satellite ephemeris source. Cheap to rebuild from a catalog
/// record, which is how work items reconstruct it on worker threads.
pub struct SatelliteHandle {
    pub name: String,
    epoch_jd_utc: f64,
    elements: sgp4::Elements,
}

impl SatelliteHandle {
    pub fn from_record(record: &TleRecord) -> Result<Self> {
        let elements = sgp4::Elements::from_tle(
            Some(record.name.clone()),
            record.line1.as_bytes(),
            record.line2.as_bytes(),
        )
        .map_err(|e| EngineError::InvalidTle {
            name: record.name.clone(),
            reason: format!("{:?}", e),
        })?;

        // Fail early on element sets SGP4 cannot initialize
        sgp4::Constants::from_elements(&elements).map_err(|e| EngineError::Propagation {
            name: record.name.clone(),
            reason: format!("{:?}", e),
        })?;

        let epoch_utc = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);

        Ok(Self {
            name: record.name.clone(),
            epoch_jd_utc: julian_date_utc(epoch_utc),
            elements,
        })
    }

    fn constants(&self) -> Result<sgp4::Constants> {
        sgp4::Constants::from_elements(&self.elements).map_err(|e| EngineError::Propagation {
            name: self.name.clone(),
            reason: format!("{:?}", e),
        })
    }

    fn propagate(&self, constants: &sgp4::Constants, tt_jd: f64) -> Result<Vector3<f64>> {
        let minutes_since_epoch = (utc_jd_from_tt(tt_jd) - self.epoch_jd_utc) * 1_440.0;
        let prediction = constants.propagate(minutes_since_epoch).map_err(|e| {
            EngineError::Propagation {
                name: self.name.clone(),
                reason: format!("{:?}", e),
            }
        })?;

        Ok(Vector3::new(
            prediction.position[0],
            prediction.position[1],
            prediction.position[2],
        ))
    }

    /// Geocentric TEME position in km at a TT Julian date.
    pub fn position_teme_km(&self, tt_jd: f64) -> Result<Vector3<f64>> {
        let constants = self.constants()?;
        self.propagate(&constants, tt_jd)
    }

    /// Geocentric TEME positions for a whole sample grid. The propagator
    /// is initialized once per call, so batched grids amortize that cost.
    pub fn positions_teme_km(&self, times_tt: &[f64]) -> Result<Vec<Vector3<f64>>> {
        let constants = self.constants()?;
        times_tt
            .iter()
            .map(|&tt| self.propagate(&constants, tt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sky_ephemeris::EARTH_EQUATORIAL_RADIUS_KM;

    fn iss_record() -> TleRecord {
        TleRecord {
            name: "ISS (ZARYA)".to_string(),
            line1: "1 25544U 98067A   25278.49802050  .00011384  00000+0  20935-3 0  9990"
                .to_string(),
            line2: "2 25544  51.6327 120.3420 0000884 206.2421 153.8523 15.49697304532279"
                .to_string(),
        }
    }

    #[test]
    fn test_from_record_rejects_garbage() {
        let record = TleRecord {
            name: "BROKEN".to_string(),
            line1: "1 garbage".to_string(),
            line2: "2 garbage".to_string(),
        };
        assert!(matches!(
            SatelliteHandle::from_record(&record),
            Err(EngineError::InvalidTle { .. })
        ));
    }

    #[test]
    fn test_position_at_epoch_is_leo() {
        let sat = SatelliteHandle::from_record(&iss_record()).unwrap();
        // TT at the TLE epoch: UTC epoch JD + delta
        let tt = sat.epoch_jd_utc + sky_ephemeris::time::TT_MINUS_UTC_SECONDS / 86_400.0;
        let pos = sat.position_teme_km(tt).unwrap();
        let altitude = pos.norm() - EARTH_EQUATORIAL_RADIUS_KM;
        assert!(
            (350.0..500.0).contains(&altitude),
            "ISS altitude {} km out of LEO band",
            altitude
        );
    }

    #[test]
    fn test_position_moves_over_time() {
        let sat = SatelliteHandle::from_record(&iss_record()).unwrap();
        let tt = sat.epoch_jd_utc;
        let a = sat.position_teme_km(tt).unwrap();
        let b = sat.position_teme_km(tt + 60.0 / 86_400.0).unwrap();
        // ~7.7 km/s orbital speed -> roughly 460 km in a minute
        let moved = (b - a).norm();
        assert!((300.0..600.0).contains(&moved), "moved {} km in 60 s", moved);
    }

    #[test]
    fn test_batch_matches_single_calls() {
        let sat = SatelliteHandle::from_record(&iss_record()).unwrap();
        let times: Vec<f64> = (0..5)
            .map(|i| sat.epoch_jd_utc + i as f64 * 2.0 / 86_400.0)
            .collect();
        let batch = sat.positions_teme_km(&times).unwrap();
        for (i, &tt) in times.iter().enumerate() {
            let single = sat.position_teme_km(tt).unwrap();
            assert!((batch[i] - single).norm() < 1e-12);
        }
    }
}
