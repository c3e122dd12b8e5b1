use crate::{
    atlas::Atlas,
    config::ScanLayout,
    geometry::{
        AlignmentStrategy, FixedOffsetAlignment, GeometryError, MappedAtlasSlice,
        SliceGeometryMapper, TARGET_SLICES,
    },
    sbr::{PatientSummary, SbrEngine, SliceMetrics},
    volume::Volume,
    volume_loader::{ScanLoader, ScanLoaderError},
};

use ndarray::Array2;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use web_time::Instant;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Load(#[from] ScanLoaderError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Result of analysing one patient scan
#[derive(Debug, Clone, PartialEq)]
pub struct PatientAnalysis {
    pub patient_id: String,
    /// Identifier used to name report files
    pub patient_number: String,
    pub source_path: Option<PathBuf>,
    /// Per-slice table in slice order
    pub slices: Vec<SliceMetrics>,
    pub summary: PatientSummary,
}

/// Per-patient pipeline bound to a loaded atlas
pub struct Analyzer<'a> {
    atlas: &'a Atlas,
    alignment: Box<dyn AlignmentStrategy + 'a>,
}

impl<'a> Analyzer<'a> {
    pub fn new(atlas: &'a Atlas) -> Self {
        Self::with_alignment(atlas, FixedOffsetAlignment::default())
    }

    pub fn with_alignment(atlas: &'a Atlas, alignment: impl AlignmentStrategy + 'a) -> Self {
        Self {
            atlas,
            alignment: Box::new(alignment),
        }
    }

    pub fn atlas(&self) -> &Atlas {
        self.atlas
    }

    fn mapper(&self) -> SliceGeometryMapper<'_> {
        SliceGeometryMapper::new(self.atlas, self.alignment.as_ref())
    }

    /// Analyse the last [`TARGET_SLICES`] slices of a decoded volume
    ///
    /// # Errors
    ///
    /// Returns error if a slice has no counterpart in the atlas
    pub fn analyze(&self, volume: &Volume) -> Result<Vec<SliceMetrics>, AnalysisError> {
        let window = volume.last_slices(TARGET_SLICES);
        if window.offset > 0 {
            info!(
                patient_id = %volume.patient_id(),
                original = volume.dim().0,
                kept = window.len(),
                "volume truncated"
            );
        }

        let mapper = self.mapper();
        let slices = (0..window.len())
            .into_par_iter()
            .map(|index| -> Result<SliceMetrics, AnalysisError> {
                let patient_slice = self.alignment.align_patient_slice(window.slice(index));
                let mapped = mapper.map_slice(index, patient_slice.dim())?;
                let metrics = SbrEngine::measure_slice(
                    index,
                    window.offset + index,
                    volume.patient_id(),
                    &mapped,
                    &patient_slice.view(),
                );
                debug!(
                    slice = index,
                    atlas_slice = mapped.atlas_index,
                    occipital_mean = metrics.reference.mean,
                    "slice measured"
                );
                Ok(metrics)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(slices)
    }

    /// Analyse a volume and summarize it
    pub fn analyze_volume(
        &self,
        volume: &Volume,
        patient_number: impl Into<String>,
    ) -> Result<PatientAnalysis, AnalysisError> {
        let slices = self.analyze(volume)?;
        let summary = PatientSummary::from_slices(volume.patient_id(), &slices);
        Ok(PatientAnalysis {
            patient_id: volume.patient_id().to_owned(),
            patient_number: patient_number.into(),
            source_path: None,
            slices,
            summary,
        })
    }

    /// Load, analyse and summarize one scan file
    ///
    /// # Errors
    ///
    /// Returns error if the scan cannot be decoded or mapped onto the atlas
    pub fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        layout: &ScanLayout,
    ) -> Result<PatientAnalysis, AnalysisError> {
        self.analyze_scan(path, layout).map(|(_, analysis)| analysis)
    }

    /// Like [`Analyzer::analyze_file`], also handing back the decoded volume
    pub fn analyze_scan(
        &self,
        path: impl AsRef<Path>,
        layout: &ScanLayout,
    ) -> Result<(Volume, PatientAnalysis), AnalysisError> {
        let path = path.as_ref();
        let started = Instant::now();
        let volume = ScanLoader::load_from_file(path)?;
        let patient_number = layout.patient_number(path, volume.patient_id());
        info!(
            patient = %patient_number,
            patient_id = %volume.patient_id(),
            dim = ?volume.dim(),
            "processing patient"
        );

        let mut analysis = self.analyze_volume(&volume, patient_number)?;
        analysis.source_path = Some(path.to_path_buf());
        info!(
            patient = %analysis.patient_number,
            slices = analysis.slices.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "patient analysed"
        );
        Ok((volume, analysis))
    }

    /// Mapped atlas for every analysed slice, paired with the patient slice
    pub fn mapped_slices(
        &self,
        volume: &Volume,
    ) -> Result<Vec<(Array2<f32>, MappedAtlasSlice)>, AnalysisError> {
        let window = volume.last_slices(TARGET_SLICES);
        let mapper = self.mapper();
        (0..window.len())
            .into_par_iter()
            .map(|index| -> Result<_, AnalysisError> {
                let patient_slice = self.alignment.align_patient_slice(window.slice(index));
                let mapped = mapper.map_slice(index, patient_slice.dim())?;
                Ok((patient_slice.into_owned(), mapped))
            })
            .collect()
    }
}
