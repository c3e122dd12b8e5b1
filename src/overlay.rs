//! PNG renderings of the mapped atlas over patient slices, for checking the
//! fixed alignment by eye.

use crate::{
    geometry::MappedAtlasSlice,
    pipeline::{AnalysisError, Analyzer},
    regions::Region,
    volume::Volume,
};

use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::ArrayView2;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

const TINT_ALPHA: f32 = 0.45;

fn region_color(region: Region) -> Rgb<u8> {
    match region {
        Region::CaudateLeft | Region::CaudateRight => Rgb([230, 60, 60]),
        Region::PutamenLeft | Region::PutamenRight => Rgb([60, 200, 90]),
        Region::Occipital => Rgb([70, 120, 240]),
    }
}

#[inline]
fn normalize_to_u8(value: f32, max: f32) -> u8 {
    if max <= 0.0 {
        return 0;
    }
    ((value / max) * 255.0).clamp(0.0, 255.0) as u8
}

#[inline]
fn blend(gray: u8, color: Rgb<u8>) -> Rgb<u8> {
    Rgb(color.0.map(|channel| {
        (gray as f32 * (1.0 - TINT_ALPHA) + channel as f32 * TINT_ALPHA).round() as u8
    }))
}

/// Grayscale patient slice scaled to its own maximum, with every sampled
/// region tinted
pub fn render_overlay(patient_slice: &ArrayView2<f32>, mapped: &MappedAtlasSlice) -> RgbImage {
    let (height, width) = patient_slice.dim();
    let max = patient_slice.fold(0.0f32, |max, &v| max.max(v));

    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        let gray = normalize_to_u8(patient_slice[[row, col]], max);
        let region = Region::ALL.into_iter().find(|region| {
            mapped.labels(region.atlas())[[row, col]] == f64::from(region.label())
        });
        match region {
            Some(region) => blend(gray, region_color(region)),
            None => Rgb([gray, gray, gray]),
        }
    })
}

pub fn overlay_file_name(dir: &Path, patient_number: &str, slice: usize) -> PathBuf {
    dir.join(format!("patient_{patient_number}_slice_{slice:02}.png"))
}

/// Render and save one PNG per analysed slice of `volume`
pub fn write_overlays(
    analyzer: &Analyzer<'_>,
    volume: &Volume,
    patient_number: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>, OverlayError> {
    fs::create_dir_all(dir)?;
    analyzer
        .mapped_slices(volume)?
        .iter()
        .enumerate()
        .map(|(index, (patient_slice, mapped))| -> Result<PathBuf, OverlayError> {
            let path = overlay_file_name(dir, patient_number, index);
            render_overlay(&patient_slice.view(), mapped).save(&path)?;
            Ok(path)
        })
        .collect()
}
