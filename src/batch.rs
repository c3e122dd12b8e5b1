//! Folder mode: one analysis per patient directory.
//!
//! Patients are independent. A scan that fails to load or map is recorded
//! as a failed outcome and the remaining patients are still processed.

use crate::{
    config::ScanLayout,
    pipeline::{AnalysisError, Analyzer, PatientAnalysis},
    sbr::SliceMetrics,
    volume::Volume,
};

use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Patient directory with a scan at the expected location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientEntry {
    pub folder_name: String,
    pub scan_path: PathBuf,
}

#[derive(Debug)]
pub struct PatientOutcome {
    pub entry: PatientEntry,
    pub result: Result<PatientAnalysis, AnalysisError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per discovered patient, in processing order
    pub outcomes: Vec<PatientOutcome>,
}

impl BatchReport {
    pub fn completed(&self) -> impl Iterator<Item = &PatientAnalysis> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PatientEntry, &AnalysisError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|error| (&outcome.entry, error))
        })
    }

    /// Per-slice tables of all completed patients, concatenated
    pub fn combined_slices(&self) -> impl Iterator<Item = &SliceMetrics> {
        self.completed().flat_map(|analysis| analysis.slices.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// List patient directories below `root` that hold a scan
///
/// Entries that do not follow the naming convention or lack the scan file
/// are skipped. Entries are ordered by patient number.
pub fn discover_patients(root: &Path, layout: &ScanLayout) -> Result<Vec<PatientEntry>, BatchError> {
    let mut entries: Vec<_> = fs::read_dir(root)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let folder_name = entry.file_name().to_string_lossy().into_owned();
            if !layout.matches(&folder_name) {
                debug!(folder = %folder_name, "skipping entry outside naming convention");
                return None;
            }
            let scan_path = layout.scan_path(&entry.path());
            if !scan_path.is_file() {
                debug!(folder = %folder_name, "skipping entry without scan");
                return None;
            }
            Some(PatientEntry {
                folder_name,
                scan_path,
            })
        })
        .collect();

    entries.sort_by_cached_key(|entry| {
        let number = entry.folder_name[layout.folder_prefix.len()..]
            .trim()
            .parse::<u64>()
            .ok();
        (number.is_none(), number, entry.folder_name.clone())
    });
    Ok(entries)
}

/// Analyse every patient below `root`
pub fn run_batch(
    analyzer: &Analyzer<'_>,
    root: &Path,
    layout: &ScanLayout,
) -> Result<BatchReport, BatchError> {
    run_batch_with(analyzer, root, layout, |_, _| {})
}

/// Analyse every patient below `root`, handing each outcome to
/// `on_outcome` as soon as it is available
///
/// The decoded volume of a completed patient is passed along and dropped
/// once `on_outcome` returns.
pub fn run_batch_with(
    analyzer: &Analyzer<'_>,
    root: &Path,
    layout: &ScanLayout,
    mut on_outcome: impl FnMut(&PatientOutcome, Option<&Volume>),
) -> Result<BatchReport, BatchError> {
    let entries = discover_patients(root, layout)?;
    info!(root = %root.display(), patients = entries.len(), "batch started");

    let mut report = BatchReport::default();
    for entry in entries {
        let (volume, result) = match analyzer.analyze_scan(&entry.scan_path, layout) {
            Ok((volume, analysis)) => (Some(volume), Ok(analysis)),
            Err(error) => {
                warn!(folder = %entry.folder_name, %error, "patient failed");
                (None, Err(error))
            }
        };
        let outcome = PatientOutcome { entry, result };
        on_outcome(&outcome, volume.as_ref());
        report.outcomes.push(outcome);
    }

    info!(
        completed = report.completed().count(),
        failed = report.failures().count(),
        "batch finished"
    );
    Ok(report)
}
