//! End-to-end pipeline tests over a pinned ISS element set.
//!
//! SGP4 and the analytic ephemeris are deterministic, so these run without
//! network access and produce the same events on every machine.

use transit_engine::evaluator::{MAX_SEPARATION_DEG, TRANSIT_THRESHOLD_DEG};
use transit_engine::passes::find_passes;
use transit_engine::shadow::haversine_km;
use transit_engine::{
    run, Catalog, EngineConfig, Observer, Request, SatelliteHandle,
};

use sky_ephemeris::time::{tt_from_utc, SECONDS_PER_DAY};

const ISS_TLE: &str = "\
ISS (ZARYA)
1 25544U 98067A   25278.49802050  .00011384  00000+0  20935-3 0  9990
2 25544  51.6327 120.3420 0000884 206.2421 153.8523 15.49697304532279
";

fn tt_of(date: &str) -> f64 {
    tt_from_utc(
        chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc(),
    )
}

fn paris_request(radius_km: f64) -> Request {
    Request {
        observer: Observer::new(48.8566, 2.3522),
        t0_tt: tt_of("2025-10-05"),
        t1_tt: tt_of("2025-10-06"),
        radius_km,
    }
}

fn config_with_workers(n: usize) -> EngineConfig {
    EngineConfig {
        worker_threads: Some(n),
        ..EngineConfig::default()
    }
}

#[test]
fn passes_are_chronological_and_disjoint() {
    let catalog = Catalog::parse(ISS_TLE);
    let sat = SatelliteHandle::from_record(catalog.resolve("ISS").unwrap()).unwrap();
    let observer = Observer::new(48.8566, 2.3522);

    let passes = find_passes(&sat, &observer, tt_of("2025-10-05"), tt_of("2025-10-06")).unwrap();
    assert!(!passes.is_empty(), "ISS must rise over Paris within a day");

    let mut previous_set = f64::NEG_INFINITY;
    for pass in &passes {
        assert!(pass.set_tt > pass.rise_tt);
        assert!(
            pass.rise_tt >= previous_set,
            "passes overlap or are out of order"
        );
        let duration_s = (pass.set_tt - pass.rise_tt) * SECONDS_PER_DAY;
        assert!(
            duration_s < 1_800.0,
            "an ISS horizon pass lasting {} s is not physical",
            duration_s
        );
        previous_set = pass.set_tt;
    }
}

#[test]
fn emitted_events_satisfy_every_gate() {
    let catalog = Catalog::parse(ISS_TLE);
    // A continent-sized radius keeps the distance gates open so the
    // classification gates are the ones actually exercised.
    let request = paris_request(20_000.0);
    let events = run(&request, &catalog, &config_with_workers(2));

    let mut previous_time = String::new();
    for event in &events {
        assert_eq!(event.satellite, "ISS");
        assert!(
            event.separation_deg >= 0.0 && event.separation_deg <= MAX_SEPARATION_DEG,
            "separation {} outside the acceptance ceiling",
            event.separation_deg
        );
        assert_eq!(
            event.transit_type == "Transit",
            event.separation_deg < TRANSIT_THRESHOLD_DEG,
            "classification disagrees with separation {}",
            event.separation_deg
        );
        assert!(event.swath_width_km > 0.0 && event.swath_width_km < 200.0);
        assert!((0.0..360.0).contains(&event.azimuth_deg));
        assert!(!event.path_points.is_empty(), "centerline must not be empty");
        assert!(
            event.path_points.iter().any(|p| {
                haversine_km(p.lat, p.lon, request.observer.lat_deg, request.observer.lon_deg)
                    <= request.radius_km + 1.0
            }),
            "no centerline point within the search radius"
        );
        assert!(
            event.time_utc >= previous_time,
            "events not sorted: {} after {}",
            event.time_utc,
            previous_time
        );
        assert!(event.time_utc.ends_with('Z'));
        previous_time = event.time_utc.clone();
    }
}

#[test]
fn same_request_twice_is_identical() {
    let catalog = Catalog::parse(ISS_TLE);
    let request = paris_request(20_000.0);
    let config = config_with_workers(2);

    let first = run(&request, &catalog, &config);
    let second = run(&request, &catalog, &config);
    assert_eq!(first, second, "fine grid is deterministic");
}

#[test]
fn worker_count_does_not_change_the_event_set() {
    let catalog = Catalog::parse(ISS_TLE);
    let request = paris_request(20_000.0);

    let with_two = run(&request, &catalog, &config_with_workers(2));
    let with_four = run(&request, &catalog, &config_with_workers(4));
    assert_eq!(with_two, with_four);
}

#[test]
fn empty_window_yields_no_events() {
    let catalog = Catalog::parse(ISS_TLE);
    let request = Request {
        observer: Observer::new(48.8566, 2.3522),
        t0_tt: tt_of("2025-10-05"),
        t1_tt: tt_of("2025-10-05"),
        radius_km: 25.0,
    };
    assert!(run(&request, &catalog, &EngineConfig::default()).is_empty());
}

#[test]
fn empty_catalog_yields_no_events() {
    let request = paris_request(25.0);
    assert!(run(&request, &Catalog::empty(), &EngineConfig::default()).is_empty());
}

#[test]
fn tiny_radius_rarely_but_validly_emits() {
    // Seed scenario shape: 1 km radius. The result may well be empty; if
    // anything comes out it must sit essentially on the centerline.
    let catalog = Catalog::parse(ISS_TLE);
    let request = paris_request(1.0);
    for event in run(&request, &catalog, &config_with_workers(2)) {
        assert!(event.separation_deg <= MAX_SEPARATION_DEG);
    }
}
