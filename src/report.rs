//! CSV tables written for each patient and for a whole batch.

use crate::{
    batch::BatchReport,
    enums::{Side, Structure},
    pipeline::PatientAnalysis,
    regions::Region,
    sbr::{PatientSummary, SliceMetrics},
};

use csv::Writer;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const BATCH_SLICES_FILE: &str = "all_patients_slices.csv";
pub const BATCH_FAILURES_FILE: &str = "batch_failures.csv";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn summary_file_name(patient_number: &str) -> String {
    format!("patient_{patient_number}_summary.csv")
}

pub fn slices_file_name(patient_number: &str) -> String {
    format!("patient_{patient_number}_slices.csv")
}

/// Four-row table: Region, Side, SBR (two decimals), Asymmetry
///
/// The asymmetry label of a structure is written on its left row.
pub fn write_summary<W: Write>(writer: W, summary: &PatientSummary) -> Result<(), ReportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(["Region", "Side", "SBR", "Asymmetry"])?;
    for structure in Structure::ALL {
        for side in Side::ALL {
            let sbr = format!("{:.2}", summary.mean_sbr(structure, side));
            let label = match side {
                Side::Left => summary.asymmetry(structure).label.to_string(),
                Side::Right => String::new(),
            };
            csv.write_record([structure.name(), side.name(), sbr.as_str(), label.as_str()])?;
        }
    }
    csv.flush()?;
    Ok(())
}

fn slice_header() -> Vec<String> {
    let mut header = vec!["slice".to_owned(), "patient_id".to_owned()];
    for region in Region::STRIATAL {
        header.push(format!("{}_SBR", region.name()));
        header.push(format!("{}_pixels", region.name()));
    }
    header.extend(
        ["source_slice", "atlas_slice", "Occipital_mean", "Occipital_pixels"].map(str::to_owned),
    );
    for region in Region::STRIATAL {
        header.push(format!("{}_SBR_defined", region.name()));
    }
    header
}

fn slice_record(slice: &SliceMetrics) -> Vec<String> {
    let mut record = vec![slice.slice.to_string(), slice.patient_id.clone()];
    for metrics in &slice.regions {
        record.push(metrics.sbr_value().to_string());
        record.push(metrics.pixel_count.to_string());
    }
    record.push(slice.source_slice.to_string());
    record.push(slice.atlas_slice.to_string());
    record.push(slice.reference.mean.to_string());
    record.push(slice.reference.pixel_count.to_string());
    for metrics in &slice.regions {
        record.push(metrics.is_defined().to_string());
    }
    record
}

/// Per-slice table; undefined SBR values are written as 0 and flagged in
/// the `_SBR_defined` columns
pub fn write_slices<'a, W: Write>(
    writer: W,
    slices: impl IntoIterator<Item = &'a SliceMetrics>,
) -> Result<(), ReportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(slice_header())?;
    for slice in slices {
        csv.write_record(slice_record(slice))?;
    }
    csv.flush()?;
    Ok(())
}

/// Folder, scan path and error of every failed patient
pub fn write_failures<W: Write>(writer: W, report: &BatchReport) -> Result<(), ReportError> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(["folder", "scan_path", "error"])?;
    for (entry, error) in report.failures() {
        csv.write_record([
            entry.folder_name.as_str(),
            entry.scan_path.display().to_string().as_str(),
            error.to_string().as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes report files into one output directory
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Summary and per-slice tables of one patient
    pub fn write_patient(&self, analysis: &PatientAnalysis) -> Result<[PathBuf; 2], ReportError> {
        let summary_path = self.output_dir.join(summary_file_name(&analysis.patient_number));
        write_summary(File::create(&summary_path)?, &analysis.summary)?;

        let slices_path = self.output_dir.join(slices_file_name(&analysis.patient_number));
        write_slices(File::create(&slices_path)?, &analysis.slices)?;

        Ok([summary_path, slices_path])
    }

    /// Concatenated per-slice table and, if any patient failed, the failure
    /// list
    pub fn write_batch(&self, report: &BatchReport) -> Result<Vec<PathBuf>, ReportError> {
        let mut written = Vec::new();
        if report.completed().next().is_some() {
            let path = self.output_dir.join(BATCH_SLICES_FILE);
            write_slices(File::create(&path)?, report.combined_slices())?;
            written.push(path);
        }
        if report.failures().next().is_some() {
            let path = self.output_dir.join(BATCH_FAILURES_FILE);
            write_failures(File::create(&path)?, report)?;
            written.push(path);
        }
        Ok(written)
    }
}
