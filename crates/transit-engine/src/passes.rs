//! Horizon pass finder.
//!
//! A coarse altitude scan emits tagged horizon events (rise, culminate,
//! set) with each crossing refined by bisection; the pairing adapter turns
//! them into rise/set intervals. A rise with no matching set before the
//! window end is discarded, as is a pass already in progress at the start.

use tracing::trace;

use sky_ephemeris::frames::gmst_rad;
use sky_ephemeris::time::{utc_jd_from_tt, SECONDS_PER_DAY};

use crate::observer::Observer;
use crate::satellite::SatelliteHandle;
use crate::Result;

pub const HORIZON_ALTITUDE_DEG: f64 = 0.0;

const SCAN_STEP_S: f64 = 30.0;
const REFINE_TOLERANCE_S: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizonEventKind {
    Rise,
    Culminate,
    Set,
}

#[derive(Debug, Clone, Copy)]
pub struct HorizonEvent {
    pub time_tt: f64,
    pub kind: HorizonEventKind,
}

/// A maximal above-horizon interval; the unit of evaluation fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct PassInterval {
    pub satellite: String,
    pub rise_tt: f64,
    pub set_tt: f64,
}

fn altitude_deg(sat: &SatelliteHandle, observer: &Observer, tt: f64) -> Result<f64> {
    let position = sat.position_teme_km(tt)?;
    let gmst = gmst_rad(utc_jd_from_tt(tt));
    Ok(observer.topocentric(position, gmst).altitude_deg)
}

/// Bisect a horizon crossing bracketed by `lo` (one side) and `hi` (the
/// other). Returns the bracket endpoint on the above-horizon side.
fn refine_crossing(
    sat: &SatelliteHandle,
    observer: &Observer,
    mut lo: f64,
    mut hi: f64,
    rising: bool,
) -> Result<f64> {
    while (hi - lo) * SECONDS_PER_DAY > REFINE_TOLERANCE_S {
        let mid = lo + (hi - lo) / 2.0;
        let above = altitude_deg(sat, observer, mid)? >= HORIZON_ALTITUDE_DEG;
        if above == rising {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(if rising { hi } else { lo })
}

/// Scan `[t0, t1]` and emit horizon events in time order. Culminations are
/// tagged at the coarse sample of peak altitude within each pass.
pub fn horizon_events(
    sat: &SatelliteHandle,
    observer: &Observer,
    t0_tt: f64,
    t1_tt: f64,
) -> Result<Vec<HorizonEvent>> {
    let mut events = Vec::new();
    if t1_tt <= t0_tt {
        return Ok(events);
    }

    let step = SCAN_STEP_S / SECONDS_PER_DAY;
    let mut prev_t = t0_tt;
    let mut prev_alt = altitude_deg(sat, observer, t0_tt)?;
    let mut peak = if prev_alt >= HORIZON_ALTITUDE_DEG {
        Some((prev_alt, t0_tt))
    } else {
        None
    };

    let mut t = t0_tt + step;
    loop {
        let sample_t = t.min(t1_tt);
        let alt = altitude_deg(sat, observer, sample_t)?;

        if prev_alt < HORIZON_ALTITUDE_DEG && alt >= HORIZON_ALTITUDE_DEG {
            let cross = refine_crossing(sat, observer, prev_t, sample_t, true)?;
            events.push(HorizonEvent {
                time_tt: cross,
                kind: HorizonEventKind::Rise,
            });
            peak = Some((alt, sample_t));
        } else if prev_alt >= HORIZON_ALTITUDE_DEG && alt < HORIZON_ALTITUDE_DEG {
            if let Some((_, peak_t)) = peak.take() {
                events.push(HorizonEvent {
                    time_tt: peak_t,
                    kind: HorizonEventKind::Culminate,
                });
            }
            let cross = refine_crossing(sat, observer, prev_t, sample_t, false)?;
            events.push(HorizonEvent {
                time_tt: cross,
                kind: HorizonEventKind::Set,
            });
        } else if alt >= HORIZON_ALTITUDE_DEG {
            if let Some(p) = peak.as_mut() {
                if alt > p.0 {
                    *p = (alt, sample_t);
                }
            }
        }

        if t >= t1_tt {
            break;
        }
        prev_t = sample_t;
        prev_alt = alt;
        t += step;
    }

    trace!(satellite = %sat.name, events = events.len(), "horizon scan complete");
    Ok(events)
}

/// Pair each rise with the next set; culminations are informational and
/// skipped, dangling rises and degenerate intervals dropped.
pub fn pair_intervals(satellite: &str, events: &[HorizonEvent]) -> Vec<PassInterval> {
    let mut intervals = Vec::new();
    let mut pending_rise: Option<f64> = None;

    for event in events {
        match event.kind {
            HorizonEventKind::Rise => {
                pending_rise.get_or_insert(event.time_tt);
            }
            HorizonEventKind::Culminate => {}
            HorizonEventKind::Set => {
                if let Some(rise) = pending_rise.take() {
                    if event.time_tt > rise {
                        intervals.push(PassInterval {
                            satellite: satellite.to_string(),
                            rise_tt: rise,
                            set_tt: event.time_tt,
                        });
                    }
                }
            }
        }
    }

    intervals
}

/// Every maximal above-horizon interval of `sat` within `[t0, t1]`.
pub fn find_passes(
    sat: &SatelliteHandle,
    observer: &Observer,
    t0_tt: f64,
    t1_tt: f64,
) -> Result<Vec<PassInterval>> {
    let events = horizon_events(sat, observer, t0_tt, t1_tt)?;
    Ok(pair_intervals(&sat.name, &events))
}
