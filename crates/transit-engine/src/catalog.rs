//! TLE catalog and satellite registry.
//!
//! Parses a three-line-element text catalog and resolves the fixed set of
//! tracked satellites by logical name, tolerating the aliases CelesTrak
//! has used over time. When the catalog file is absent, a one-shot fetch
//! against the public endpoints is attempted; total failure degrades to an
//! empty registry and the request proceeds with zero events.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::pipeline::EngineConfig;

/// Logical registry keys and the catalog names each one accepts.
pub const KNOWN_SATELLITES: &[(&str, &[&str])] = &[
    ("ISS", &["ISS (ZARYA)"]),
    ("Tiangong", &["CSS (TIANHE)", "CSS (TIANGONG)"]),
    ("HST", &["HST"]),
    ("KH-11 13", &["USA 314", "KH-11 13"]),
];

const TLE_ENDPOINTS: &[&str] = &[
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=visual&FORMAT=tle",
    "https://celestrak.com/NORAD/elements/gp.php?GROUP=visual&FORMAT=tle",
];

const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog fetch failed: {0}")]
    Fetch(String),
}

/// One element set from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TleRecord {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Parsed catalog with name lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<TleRecord>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse three-line-element text. Blank lines are tolerated; a bare
    /// two-line set (no name line) is kept with an empty name.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut records = Vec::new();
        let mut name: Option<String> = None;

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if line.starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
                records.push(TleRecord {
                    name: name.take().unwrap_or_default(),
                    line1: line.to_string(),
                    line2: lines[i + 1].to_string(),
                });
                i += 2;
                continue;
            }
            if !line.is_empty() {
                name = Some(line.to_string());
            }
            i += 1;
        }

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact-name lookup (trimmed, case-insensitive).
    pub fn find(&self, name: &str) -> Option<&TleRecord> {
        let wanted = name.trim();
        self.records
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(wanted))
    }

    /// Resolve a logical registry key through its aliases; unknown keys
    /// fall back to a direct name lookup.
    pub fn resolve(&self, key: &str) -> Option<&TleRecord> {
        match KNOWN_SATELLITES
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, aliases)) => aliases.iter().find_map(|alias| self.find(alias)),
            None => self.find(key),
        }
    }
}

/// Load the catalog for a request. A missing file triggers the one-shot
/// fetch when enabled; any failure yields an empty catalog.
pub async fn load(config: &EngineConfig) -> Catalog {
    match tokio::fs::read_to_string(&config.catalog_path).await {
        Ok(text) => Catalog::parse(&text),
        Err(read_err) if read_err.kind() == std::io::ErrorKind::NotFound => {
            if !config.fetch_on_missing {
                warn!(
                    path = %config.catalog_path.display(),
                    "TLE catalog absent and fetching disabled; registry is empty"
                );
                return Catalog::empty();
            }
            match fetch_catalog().await {
                Ok(text) => {
                    if let Err(e) = tokio::fs::write(&config.catalog_path, &text).await {
                        warn!("could not persist fetched TLE catalog: {e}");
                    }
                    Catalog::parse(&text)
                }
                Err(e) => {
                    warn!("TLE catalog unavailable ({e}); registry is empty");
                    Catalog::empty()
                }
            }
        }
        Err(e) => {
            warn!(path = %config.catalog_path.display(), "TLE catalog unreadable ({e})");
            Catalog::empty()
        }
    }
}

/// Fetch the visual-satellite catalog, first endpoint to answer wins.
pub async fn fetch_catalog() -> std::result::Result<String, CatalogError> {
    let client = reqwest::Client::builder()
        .user_agent(FETCH_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| CatalogError::Fetch(e.to_string()))?;

    let mut last_error = String::from("no endpoints configured");
    for url in TLE_ENDPOINTS {
        match client.get(*url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(text) => {
                    info!("fetched TLE catalog from {url}");
                    return Ok(text);
                }
                Err(e) => last_error = format!("{url}: {e}"),
            },
            Ok(response) => last_error = format!("{url}: HTTP {}", response.status()),
            Err(e) => last_error = format!("{url}: {e}"),
        }
    }
    Err(CatalogError::Fetch(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ISS (ZARYA)
1 25544U 98067A   25278.49802050  .00011384  00000+0  20935-3 0  9990
2 25544  51.6327 120.3420 0000884 206.2421 153.8523 15.49697304532279

CSS (TIANHE)
1 48274U 21035A   25278.51782528  .00028082  00000+0  31399-3 0  9998
2 48274  41.4680 286.1699 0005524 317.7225  42.3323 15.62618848254200
1 20580U 90037B   25278.45928565  .00002563  00000+0  12851-3 0  9999
2 20580  28.4701 158.3823 0002379 268.3029 173.5907 15.15874459742761
";

    #[test]
    fn test_parse_tolerates_blanks_and_bare_sets() {
        let catalog = Catalog::parse(SAMPLE);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.find("ISS (ZARYA)").is_some());
        assert!(catalog.find("CSS (TIANHE)").is_some());
        // Bare two-line set is kept with an empty name
        assert!(catalog.find("").is_some());
    }

    #[test]
    fn test_resolve_aliases() {
        let catalog = Catalog::parse(SAMPLE);
        let iss = catalog.resolve("ISS").expect("ISS should resolve");
        assert!(iss.line1.contains("25544"));

        let css = catalog.resolve("Tiangong").expect("Tiangong should resolve via TIANHE");
        assert!(css.line1.contains("48274"));

        assert!(catalog.resolve("HST").is_none(), "HST is not in this catalog");
        assert!(catalog.resolve("KH-11 13").is_none());
    }

    #[test]
    fn test_resolve_second_alias() {
        let renamed = SAMPLE.replace("CSS (TIANHE)", "CSS (TIANGONG)");
        let catalog = Catalog::parse(&renamed);
        assert!(catalog.resolve("Tiangong").is_some());
    }

    #[test]
    fn test_resolve_is_case_and_whitespace_lenient() {
        let catalog = Catalog::parse(SAMPLE);
        assert!(catalog.resolve("iss").is_some());
        assert!(catalog.find(" ISS (ZARYA) ").is_some());
    }

    #[test]
    fn test_unknown_key_falls_back_to_direct_name() {
        let catalog = Catalog::parse(SAMPLE);
        assert!(catalog.resolve("CSS (TIANHE)").is_some());
        assert!(catalog.resolve("VOYAGER 1").is_none());
    }

    #[tokio::test]
    async fn test_load_missing_without_fetch_is_empty() {
        let config = EngineConfig {
            catalog_path: std::path::PathBuf::from("/nonexistent/visual.txt"),
            fetch_on_missing: false,
            worker_threads: None,
        };
        let catalog = load(&config).await;
        assert!(catalog.is_empty());
    }
}
