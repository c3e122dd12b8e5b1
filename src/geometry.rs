//! Mapping of patient slices onto atlas slices.
//!
//! There is no registration between patient and atlas space. Each patient
//! slice is paired with a fixed atlas slice, the atlas slice is turned to the
//! display orientation of the scanner, resampled to a fixed size and then
//! padded (or cropped) to the patient slice shape. Only the atlas is adapted;
//! patient slices are never resized.

use crate::{
    atlas::Atlas,
    enums::{AtlasKind, Rotation},
    interpolator::Interpolator,
};

use ndarray::{Array2, ArrayView2, CowArray, Ix2, s};
use std::ops::Range;
use thiserror::Error;

/// Slices kept from the end of each patient volume
pub const TARGET_SLICES: usize = 32;
/// Atlas slice paired with the first kept patient slice
pub const ATLAS_START_SLICE: usize = 12;
pub const TARGET_HEIGHT: usize = 95;
pub const TARGET_WIDTH: usize = 80;
pub const ATLAS_SCALE_FACTOR: f64 = 0.8;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Atlas slice {index} is out of range for the {kind:?} atlas ({depth} slices)")]
    AtlasSliceOutOfRange {
        kind: AtlasKind,
        index: usize,
        depth: usize,
    },
}

/// Pairing of patient slices with atlas slices
///
/// Implementations must be pure functions of their inputs so slices can be
/// mapped in any order.
pub trait AlignmentStrategy: Send + Sync {
    /// Atlas slice paired with the patient slice at `slice_index`
    fn atlas_slice_index(&self, slice_index: usize) -> usize;

    /// Turn applied to atlas slices before resampling
    fn rotation(&self) -> Rotation;

    /// Patient slice as it is masked against the atlas
    fn align_patient_slice<'a>(&self, slice: ArrayView2<'a, f32>) -> CowArray<'a, f32, Ix2> {
        CowArray::from(slice)
    }
}

/// Static offset lookup with a fixed rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOffsetAlignment {
    pub offset: usize,
    pub rotation: Rotation,
}

impl Default for FixedOffsetAlignment {
    fn default() -> Self {
        Self {
            offset: ATLAS_START_SLICE,
            rotation: Rotation::Quarter,
        }
    }
}

impl AlignmentStrategy for FixedOffsetAlignment {
    fn atlas_slice_index(&self, slice_index: usize) -> usize {
        self.offset + slice_index
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }
}

/// Cortical and subcortical labels shaped like one patient slice
#[derive(Debug, Clone)]
pub struct MappedAtlasSlice {
    pub atlas_index: usize,
    pub cortical: Array2<f64>,
    pub subcortical: Array2<f64>,
}

impl MappedAtlasSlice {
    pub fn labels(&self, kind: AtlasKind) -> &Array2<f64> {
        match kind {
            AtlasKind::Cortical => &self.cortical,
            AtlasKind::Subcortical => &self.subcortical,
        }
    }
}

pub struct SliceGeometryMapper<'a> {
    atlas: &'a Atlas,
    alignment: &'a dyn AlignmentStrategy,
}

impl<'a> SliceGeometryMapper<'a> {
    pub fn new(atlas: &'a Atlas, alignment: &'a dyn AlignmentStrategy) -> Self {
        Self { atlas, alignment }
    }

    /// Map both atlases onto the patient slice at `slice_index`
    ///
    /// # Errors
    ///
    /// Returns error if the paired atlas slice does not exist
    pub fn map_slice(
        &self,
        slice_index: usize,
        patient_shape: (usize, usize),
    ) -> Result<MappedAtlasSlice, GeometryError> {
        let atlas_index = self.alignment.atlas_slice_index(slice_index);
        Ok(MappedAtlasSlice {
            atlas_index,
            cortical: self.map_labels(AtlasKind::Cortical, atlas_index, patient_shape)?,
            subcortical: self.map_labels(AtlasKind::Subcortical, atlas_index, patient_shape)?,
        })
    }

    fn map_labels(
        &self,
        kind: AtlasKind,
        atlas_index: usize,
        patient_shape: (usize, usize),
    ) -> Result<Array2<f64>, GeometryError> {
        let volume = self.atlas.volume(kind);
        let slice = volume
            .axial_slice(atlas_index)
            .ok_or(GeometryError::AtlasSliceOutOfRange {
                kind,
                index: atlas_index,
                depth: volume.depth(),
            })?;

        let rotated = rotate(slice, self.alignment.rotation()).mapv(f64::from);
        let resampled = Interpolator::resize_bilinear(&rotated.view(), resampled_shape());
        Ok(fit_to_shape(resampled, patient_shape))
    }
}

/// Shape atlas slices are resampled to before fitting
pub fn resampled_shape() -> (usize, usize) {
    (
        (TARGET_HEIGHT as f64 * ATLAS_SCALE_FACTOR).round() as usize,
        (TARGET_WIDTH as f64 * ATLAS_SCALE_FACTOR).round() as usize,
    )
}

/// Counter-clockwise rotation in quarter turns
pub fn rotate<T: Clone>(slice: ArrayView2<'_, T>, rotation: Rotation) -> Array2<T> {
    match rotation {
        Rotation::None => slice.to_owned(),
        Rotation::Quarter => slice.t().slice(s![..;-1, ..]).to_owned(),
        Rotation::Half => slice.slice(s![..;-1, ..;-1]).to_owned(),
        Rotation::ThreeQuarter => slice.t().slice(s![.., ..;-1]).to_owned(),
    }
}

/// Zero-pad or crop `slice` around its center to exactly `shape`
///
/// An odd leftover row or column goes to the trailing side.
pub fn fit_to_shape(slice: Array2<f64>, shape: (usize, usize)) -> Array2<f64> {
    if slice.dim() == shape {
        return slice;
    }
    let (height, width) = slice.dim();
    let (src_rows, dst_rows) = centered_span(height, shape.0);
    let (src_cols, dst_cols) = centered_span(width, shape.1);

    let mut fitted = Array2::zeros(shape);
    fitted
        .slice_mut(s![dst_rows, dst_cols])
        .assign(&slice.slice(s![src_rows, src_cols]));
    fitted
}

/// Source and destination ranges centering a span of `from` within `to`
fn centered_span(from: usize, to: usize) -> (Range<usize>, Range<usize>) {
    if to >= from {
        let lead = (to - from) / 2;
        (0..from, lead..lead + from)
    } else {
        let lead = (from - to) / 2;
        (lead..lead + to, 0..to)
    }
}
