//! Files written for analysed patients: CSV tables and optional overlays.

use crate::{
    batch::{BatchError, BatchReport, run_batch_with},
    config::{OutputConfig, ScanLayout},
    overlay::{OverlayError, write_overlays},
    pipeline::{Analyzer, PatientAnalysis},
    report::{ReportError, ReportWriter},
    volume::Volume,
};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Failed to write reports: {0}")]
    Report(#[from] ReportError),

    #[error("Failed to write overlays: {0}")]
    Overlay(#[from] OverlayError),
}

pub struct OutputWriter {
    reports: ReportWriter,
    overlay_dir: Option<PathBuf>,
}

impl OutputWriter {
    /// Create the report directory; the overlay directory is created on
    /// first use
    pub fn new(config: &OutputConfig) -> Result<Self, OutputError> {
        Ok(Self {
            reports: ReportWriter::new(&config.output_dir)?,
            overlay_dir: config.overlay_dir.clone(),
        })
    }

    pub fn reports(&self) -> &ReportWriter {
        &self.reports
    }

    /// Tables of one patient, and overlays of `volume` when an overlay
    /// directory is set
    pub fn save_patient(
        &self,
        analyzer: &Analyzer<'_>,
        analysis: &PatientAnalysis,
        volume: &Volume,
    ) -> Result<Vec<PathBuf>, OutputError> {
        let mut written = self.reports.write_patient(analysis)?.to_vec();
        info!(patient = %analysis.patient_number, "patient reports saved");

        if let Some(dir) = &self.overlay_dir {
            let overlays = write_overlays(analyzer, volume, &analysis.patient_number, dir)?;
            info!(count = overlays.len(), dir = %dir.display(), "overlays saved");
            written.extend(overlays);
        }
        Ok(written)
    }

    /// Analyse every patient below `root`, saving each as it completes
    ///
    /// Batch tables are written even when saving a single patient failed;
    /// the first such failure is returned afterwards.
    pub fn run_folder(
        &self,
        analyzer: &Analyzer<'_>,
        root: &Path,
        layout: &ScanLayout,
    ) -> Result<BatchReport, OutputError> {
        let mut deferred = None;
        let report = run_batch_with(analyzer, root, layout, |outcome, volume| {
            let (Ok(analysis), Some(volume)) = (&outcome.result, volume) else {
                return;
            };
            if let Err(error) = self.save_patient(analyzer, analysis, volume) {
                warn!(folder = %outcome.entry.folder_name, %error, "patient files not saved");
                deferred.get_or_insert(error);
            }
        })?;

        if report.is_empty() {
            warn!(folder = %root.display(), "no patient scans found");
        }
        for path in self.reports.write_batch(&report)? {
            info!(file = %path.display(), "batch table saved");
        }

        match deferred {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }
}
