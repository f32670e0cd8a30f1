use crate::core::derived_metrics::DerivedMetrics;
use crate::core::electrical_power::ElectricalPowerSource;
use crate::errors::{FetchError, QuattError};
use crate::snapshot::{ingest_snapshot, RawSnapshot};
use anyhow::Context;
use arc_swap::ArcSwap;
use itertools::Itertools;
use serde_json::Value;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where snapshots come from: the CIC's local status endpoint, a recording, a test double.
pub trait SnapshotSource {
    fn fetch(&self) -> Result<RawSnapshot, FetchError>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Owns the current snapshot and hands out metrics computed against it.
///
/// The snapshot is only ever swapped for a new one as a whole. Every query captures a single
/// snapshot for its whole evaluation, so readers never see a mix of two poll cycles.
#[derive(Debug)]
pub struct SnapshotCoordinator<P: ElectricalPowerSource> {
    current: ArcSwap<RawSnapshot>,
    electrical_power: P,
}

impl<P: ElectricalPowerSource> SnapshotCoordinator<P> {
    pub fn new(electrical_power: P) -> Self {
        Self {
            current: ArcSwap::from_pointee(RawSnapshot::default()),
            electrical_power,
        }
    }

    pub fn set_snapshot(&self, snapshot: RawSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn snapshot(&self) -> Arc<RawSnapshot> {
        self.current.load_full()
    }

    /// Fetch a fresh snapshot from `source` and make it current.
    ///
    /// On failure the previous snapshot stays current. Authentication failures are reported as
    /// [`QuattError::AuthenticationFailed`], anything else as the retryable
    /// [`QuattError::UpdateFailed`].
    pub fn refresh(&self, source: &impl SnapshotSource) -> Result<(), QuattError> {
        match source.fetch() {
            Ok(snapshot) => {
                debug!("Fetched snapshot from {}", source.name());
                self.set_snapshot(snapshot);
                Ok(())
            }
            Err(FetchError::Authentication(message)) => {
                error!("Authentication with {} failed: {message}", source.name());
                Err(QuattError::AuthenticationFailed(message))
            }
            Err(error) => {
                warn!("Fetching snapshot from {} failed: {error}", source.name());
                Err(error.into())
            }
        }
    }

    /// Run `f` against metrics for the current snapshot.
    pub fn metrics<T>(&self, f: impl FnOnce(&DerivedMetrics<'_>) -> T) -> T {
        let snapshot = self.current.load();
        f(&DerivedMetrics::new(&snapshot, &self.electrical_power))
    }

    pub fn get_value(&self, value_path: &str, default: Option<Value>) -> Option<Value> {
        self.metrics(|metrics| metrics.get_value(value_path, default))
    }

    pub fn heatpump1_active(&self) -> bool {
        self.metrics(|metrics| metrics.heatpump1_active())
    }

    pub fn heatpump2_active(&self) -> bool {
        self.metrics(|metrics| metrics.heatpump2_active())
    }

    pub fn boiler_open_therm(&self) -> bool {
        self.metrics(|metrics| metrics.boiler_open_therm())
    }
}

/// Reads snapshots from a JSON file holding a recorded status payload.
#[derive(Debug)]
pub struct FileSnapshotSource {
    path: PathBuf,
    name: String,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn fetch(&self) -> Result<RawSnapshot, FetchError> {
        let file = File::open(&self.path)
            .with_context(|| format!("Could not open snapshot file {}", self.name))?;
        let snapshot = ingest_snapshot(file)
            .with_context(|| format!("Could not read snapshot file {}", self.name))?;
        info!("Read snapshot with sections {}", snapshot.sections().join(", "));

        Ok(snapshot)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
