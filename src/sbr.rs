//! Specific binding ratios per slice and their per-patient means.
//!
//! The occipital cortex is the reference region: striatal uptake is
//! expressed relative to its mean intensity on the same slice.

use crate::{
    asymmetry::{AsymmetryResult, classify},
    enums::{Side, Structure},
    geometry::MappedAtlasSlice,
    regions::Region,
    sampler::{RegionSample, sample_region},
};

use ndarray::ArrayView2;

/// `(region - reference) / reference`, undefined for an empty region mask
/// or a zero reference mean
pub fn specific_binding_ratio(region: &RegionSample, reference_mean: f64) -> Option<f64> {
    if region.is_empty() || reference_mean == 0.0 {
        return None;
    }
    let sbr = (region.mean - reference_mean) / reference_mean;
    sbr.is_finite().then_some(sbr)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionMetrics {
    /// `None` when the ratio could not be computed
    pub sbr: Option<f64>,
    pub pixel_count: usize,
}

impl RegionMetrics {
    /// SBR with undefined values reported as 0
    pub fn sbr_value(&self) -> f64 {
        self.sbr.unwrap_or(0.0)
    }

    pub fn is_defined(&self) -> bool {
        self.sbr.is_some()
    }
}

/// Measurements of one processed patient slice
#[derive(Debug, Clone, PartialEq)]
pub struct SliceMetrics {
    /// Index among the processed slices
    pub slice: usize,
    /// Index in the decoded volume, before truncation
    pub source_slice: usize,
    pub atlas_slice: usize,
    pub patient_id: String,
    /// Occipital reference sample
    pub reference: RegionSample,
    /// Striatal regions in [`Region::STRIATAL`] order
    pub regions: [RegionMetrics; 4],
}

impl SliceMetrics {
    pub fn region(&self, region: Region) -> Option<&RegionMetrics> {
        region.striatal_index().map(|index| &self.regions[index])
    }
}

pub struct SbrEngine;

impl SbrEngine {
    /// Sample the reference and every striatal region of one slice
    pub fn measure_slice(
        slice: usize,
        source_slice: usize,
        patient_id: &str,
        mapped: &MappedAtlasSlice,
        patient_slice: &ArrayView2<f32>,
    ) -> SliceMetrics {
        let reference = Self::sample(Region::Occipital, mapped, patient_slice);
        let regions = Region::STRIATAL.map(|region| {
            let sample = Self::sample(region, mapped, patient_slice);
            RegionMetrics {
                sbr: specific_binding_ratio(&sample, reference.mean),
                pixel_count: sample.pixel_count,
            }
        });

        SliceMetrics {
            slice,
            source_slice,
            atlas_slice: mapped.atlas_index,
            patient_id: patient_id.to_owned(),
            reference,
            regions,
        }
    }

    fn sample(
        region: Region,
        mapped: &MappedAtlasSlice,
        patient_slice: &ArrayView2<f32>,
    ) -> RegionSample {
        let labels = mapped.labels(region.atlas());
        sample_region(&labels.view(), region.label(), patient_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSummary {
    pub region: Region,
    /// Unweighted mean over all slices, undefined slices counted as 0
    pub mean_sbr: f64,
    pub mean_pixels: f64,
    /// Slices on which the SBR was defined
    pub defined_slices: usize,
}

/// Per-patient means and asymmetry labels
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSummary {
    pub patient_id: String,
    pub slice_count: usize,
    /// Striatal regions in [`Region::STRIATAL`] order
    pub regions: [RegionSummary; 4],
    pub caudate: AsymmetryResult,
    pub putamen: AsymmetryResult,
}

impl PatientSummary {
    pub fn from_slices(patient_id: &str, slices: &[SliceMetrics]) -> Self {
        let regions = Region::STRIATAL.map(|region| {
            let metrics = || slices.iter().filter_map(move |slice| slice.region(region));
            RegionSummary {
                region,
                mean_sbr: mean(metrics().map(RegionMetrics::sbr_value)),
                mean_pixels: mean(metrics().map(|m| m.pixel_count as f64)),
                defined_slices: metrics().filter(|m| m.is_defined()).count(),
            }
        });

        let mut summary = Self {
            patient_id: patient_id.to_owned(),
            slice_count: slices.len(),
            regions,
            caudate: AsymmetryResult::default(),
            putamen: AsymmetryResult::default(),
        };
        summary.caudate = summary.classify(Structure::Caudate);
        summary.putamen = summary.classify(Structure::Putamen);
        summary
    }

    pub fn region(&self, region: Region) -> Option<&RegionSummary> {
        region.striatal_index().map(|index| &self.regions[index])
    }

    pub fn mean_sbr(&self, structure: Structure, side: Side) -> f64 {
        self.region(Region::striatal(structure, side))
            .map_or(0.0, |summary| summary.mean_sbr)
    }

    pub fn asymmetry(&self, structure: Structure) -> AsymmetryResult {
        match structure {
            Structure::Caudate => self.caudate,
            Structure::Putamen => self.putamen,
        }
    }

    fn classify(&self, structure: Structure) -> AsymmetryResult {
        classify(
            self.mean_sbr(structure, Side::Left),
            self.mean_sbr(structure, Side::Right),
        )
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
