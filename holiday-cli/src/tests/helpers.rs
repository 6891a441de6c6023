//! Test helpers: temporary workspaces and an in-memory engine builder.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Duration, TimeZone, Utc};
use holiday_core::test_support::{FixedClock, MemorySightingRepository, StubRouteMatrixClient};
use holiday_core::{
    ChunkedDistanceResolver, DistanceResolver, EngineConfig, MemorySessionStore, PlaceSighting,
    RecommendationEngine, SightingRepository, SourceId,
};
use tempfile::TempDir;

use crate::CliError;
use crate::sources::{CliEngine, EngineBuilder, EngineSources};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}

/// A temporary directory addressed through UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn sighting(place: &str, days_ago: i64, source: &str) -> PlaceSighting {
    PlaceSighting::new(place, now() - Duration::days(days_ago), SourceId::new(source))
}

/// Sightings used across CLI scenarios.
///
/// Yosemite is the strongest signal, Big Sur the nearest place, Lake Tahoe
/// lies beyond 500 miles, and Death Valley has no route.
pub(super) fn sample_sightings() -> Vec<PlaceSighting> {
    vec![
        sighting("Yosemite National Park", 1, "post-1"),
        sighting("Yosemite National Park", 2, "post-2"),
        sighting("Yosemite National Park", 3, "post-3"),
        sighting("Big Sur", 4, "post-4"),
        sighting("Lake Tahoe", 1, "post-5"),
        sighting("Lake Tahoe", 2, "post-6"),
        sighting("Death Valley", 1, "post-7"),
    ]
}

/// Builds engines over [`sample_sightings`] and canned routes.
#[derive(Debug, Default)]
pub(super) struct StubEngineBuilder;

impl EngineBuilder for StubEngineBuilder {
    fn build(&self, _sources: &EngineSources, config: EngineConfig) -> Result<CliEngine, CliError> {
        let repository: Box<dyn SightingRepository> =
            Box::new(MemorySightingRepository::with_sightings(sample_sightings()));
        let client = StubRouteMatrixClient::per_place([
            ("Yosemite National Park", 300_000, 14_400),
            ("Big Sur", 200_000, 10_800),
            ("Lake Tahoe", 1_500_000, 43_200),
        ]);
        let resolver: Box<dyn DistanceResolver> = Box::new(ChunkedDistanceResolver::new(client));
        Ok(
            RecommendationEngine::new(repository, resolver, MemorySessionStore::new(), config)?
                .with_clock(FixedClock(now())),
        )
    }
}
