//! Request pipeline: fan-out, parallel evaluation, collection.
//!
//! The discovery phase (registry resolution + pass finding) runs on the
//! calling thread and is short; evaluation fans out over a bounded rayon
//! pool. Work items carry only primitives, so each worker rebuilds its
//! satellite handle from the shared read-only catalog by name.

use std::path::PathBuf;
use std::thread;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sky_ephemeris::Body;

use crate::catalog::{Catalog, KNOWN_SATELLITES};
use crate::evaluator::evaluate;
use crate::observer::Observer;
use crate::passes::find_passes;
use crate::satellite::SatelliteHandle;
use crate::TransitEvent;

/// Engine knobs. The gateway builds this from the environment; tests build
/// it by hand.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the three-line-element catalog.
    pub catalog_path: PathBuf,
    /// Attempt the one-shot network fetch when the catalog file is absent.
    pub fetch_on_missing: bool,
    /// Worker override; defaults to `max(1, cpus - 1)`.
    pub worker_threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("visual.txt"),
            fetch_on_missing: true,
            worker_threads: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            catalog_path: std::env::var("TRANSIT_TLE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("visual.txt")),
            ..Self::default()
        }
    }

    fn worker_count(&self) -> usize {
        self.worker_threads.unwrap_or_else(|| {
            let cpus = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
            cpus.saturating_sub(1).max(1)
        })
    }
}

/// A normalized request: observer, TT window, search radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    pub observer: Observer,
    pub t0_tt: f64,
    pub t1_tt: f64,
    pub radius_km: f64,
}

/// One unit of parallel work: a satellite pass against one body. Fully
/// self-describing with primitive payloads only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub sat_name: String,
    pub body: Body,
    pub rise_tt: f64,
    pub set_tt: f64,
    pub observer: Observer,
    pub radius_km: f64,
}

/// Discovery phase: resolve the tracked satellites, enumerate their
/// passes, and materialize the pass x body product.
pub fn fan_out(request: &Request, catalog: &Catalog) -> Vec<WorkItem> {
    let mut items = Vec::new();

    for (key, _) in KNOWN_SATELLITES {
        let Some(record) = catalog.resolve(key) else {
            continue;
        };
        let sat = match SatelliteHandle::from_record(record) {
            Ok(sat) => sat,
            Err(e) => {
                warn!("skipping {}: {}", key, e);
                continue;
            }
        };
        let passes = match find_passes(&sat, &request.observer, request.t0_tt, request.t1_tt) {
            Ok(passes) => passes,
            Err(e) => {
                warn!("pass search failed for {}: {}", key, e);
                continue;
            }
        };

        for pass in &passes {
            for body in [Body::Sun, Body::Moon] {
                items.push(WorkItem {
                    sat_name: key.to_string(),
                    body,
                    rise_tt: pass.rise_tt,
                    set_tt: pass.set_tt,
                    observer: request.observer,
                    radius_km: request.radius_km,
                });
            }
        }
        debug!("{}: {} passes fanned out", key, passes.len());
    }

    items
}

fn evaluate_item(item: &WorkItem, catalog: &Catalog) -> Option<TransitEvent> {
    match evaluate(item, catalog) {
        Ok(result) => result,
        Err(e) => {
            debug!("dropped {} x {}: {}", item.sat_name, item.body, e);
            None
        }
    }
}

/// Run a full request against a loaded catalog and return the events
/// sorted by UTC time. Never fails: degraded inputs produce fewer events.
pub fn run(request: &Request, catalog: &Catalog, config: &EngineConfig) -> Vec<TransitEvent> {
    let items = fan_out(request, catalog);
    info!(work_items = items.len(), "evaluating");

    let mut events: Vec<TransitEvent> = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .build()
    {
        Ok(pool) => pool.install(|| {
            items
                .par_iter()
                .filter_map(|item| evaluate_item(item, catalog))
                .collect()
        }),
        Err(e) => {
            warn!("worker pool unavailable ({e}); evaluating serially");
            items
                .iter()
                .filter_map(|item| evaluate_item(item, catalog))
                .collect()
        }
    };

    // ISO-8601 Zulu strings sort chronologically
    events.sort_by(|a, b| a.time_utc.cmp(&b.time_utc));
    events
}
