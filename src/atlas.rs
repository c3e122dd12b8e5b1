//! Harvard-Oxford label volumes used to localize the sampled regions.
//!
//! Both atlases are loaded once and handed to every analysis by reference.
//! Labels are kept in NIfTI voxel order `(x, y, z)`, so an axial slice is
//! `labels[.., .., z]`.

use crate::enums::AtlasKind;

use flate2::read::GzDecoder;
use ndarray::{Array3, ArrayView2, Axis};
use nifti::volume::{NiftiVolume, RandomAccessNiftiVolume};
use nifti::{InMemNiftiObject, NiftiObject};
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

pub const CORTICAL_ATLAS_FILE: &str = "HarvardOxford-cort-maxprob-thr50-2mm.nii.gz";
pub const SUBCORTICAL_ATLAS_FILE: &str = "HarvardOxford-sub-maxprob-thr50-2mm.nii.gz";

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Atlas file not found: {0}")]
    Missing(PathBuf),

    #[error("Expected a 3-D label volume, got {0} dimensions")]
    NotVolumetric(usize),

    #[error("Expected a 3-D label volume, dimension {axis} has {size} entries")]
    ExtraDimension { axis: usize, size: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NIfTI error: {0}")]
    Nifti(#[from] nifti::NiftiError),
}

#[derive(Debug, Clone)]
pub struct AtlasVolume {
    labels: Array3<i32>,
    voxel_size: (f32, f32, f32),
}

impl AtlasVolume {
    pub fn new(labels: Array3<i32>, voxel_size: (f32, f32, f32)) -> Self {
        Self { labels, voxel_size }
    }

    /// Decode a NIfTI-1 label volume, plain or gzip-compressed
    pub fn from_nifti_bytes(bytes: &[u8]) -> Result<Self, AtlasError> {
        let object = if is_gzip(bytes) {
            InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes)))?
        } else {
            InMemNiftiObject::from_reader(Cursor::new(bytes))?
        };

        let pixdim = object.header().pixdim;
        let voxel_size = (pixdim[1], pixdim[2], pixdim[3]);
        let volume = object.into_volume();

        let dims = volume.dim().to_vec();
        if dims.len() < 3 {
            return Err(AtlasError::NotVolumetric(dims.len()));
        }
        if let Some((axis, &size)) = dims.iter().enumerate().skip(3).find(|(_, d)| **d > 1) {
            return Err(AtlasError::ExtraDimension { axis, size });
        }
        let shape = (dims[0] as usize, dims[1] as usize, dims[2] as usize);

        // Probabilistic atlases are stored as floats; labels are whole numbers.
        let mut coords = vec![0u16; dims.len()];
        let mut labels = Array3::<i32>::zeros(shape);
        for ((x, y, z), label) in labels.indexed_iter_mut() {
            coords[0] = x as u16;
            coords[1] = y as u16;
            coords[2] = z as u16;
            *label = volume.get_f32(&coords)?.round() as i32;
        }

        Ok(Self::new(labels, voxel_size))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AtlasError::Missing(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Self::from_nifti_bytes(&bytes)
    }

    /// Get the dimensions of the volume (x, y, z)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.labels.dim()
    }

    pub fn voxel_size(&self) -> (f32, f32, f32) {
        self.voxel_size
    }

    pub fn labels(&self) -> &Array3<i32> {
        &self.labels
    }

    /// Number of axial slices
    pub fn depth(&self) -> usize {
        self.labels.dim().2
    }

    pub fn axial_slice(&self, index: usize) -> Option<ArrayView2<'_, i32>> {
        (index < self.depth()).then(|| self.labels.index_axis(Axis(2), index))
    }
}

/// Cortical and subcortical atlas pair
#[derive(Debug, Clone)]
pub struct Atlas {
    cortical: AtlasVolume,
    subcortical: AtlasVolume,
}

impl Atlas {
    pub fn new(cortical: AtlasVolume, subcortical: AtlasVolume) -> Self {
        Self {
            cortical,
            subcortical,
        }
    }

    /// Load both Harvard-Oxford max-probability atlases from a directory
    ///
    /// # Errors
    ///
    /// Returns error if either file is missing or cannot be decoded
    pub fn load_from_directory(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let dir = path.as_ref();
        let cortical = AtlasVolume::load(dir.join(CORTICAL_ATLAS_FILE))?;
        let subcortical = AtlasVolume::load(dir.join(SUBCORTICAL_ATLAS_FILE))?;

        info!(dim = ?cortical.dim(), "cortical atlas loaded");
        info!(dim = ?subcortical.dim(), "subcortical atlas loaded");

        Ok(Self::new(cortical, subcortical))
    }

    pub fn cortical(&self) -> &AtlasVolume {
        &self.cortical
    }

    pub fn subcortical(&self) -> &AtlasVolume {
        &self.subcortical
    }

    pub fn volume(&self, kind: AtlasKind) -> &AtlasVolume {
        match kind {
            AtlasKind::Cortical => &self.cortical,
            AtlasKind::Subcortical => &self.subcortical,
        }
    }
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Single-file NIfTI-1 image; `dims` lists the extent of each axis and
    /// `payload` holds the voxels in x-fastest order
    pub(crate) fn nifti_bytes(dims: &[u16], datatype: i16, bitpix: i16, payload: &[u8]) -> Vec<u8> {
        let mut header = vec![0u8; 352];
        header[0..4].copy_from_slice(&348i32.to_le_bytes());
        let mut dim = [1i16; 8];
        dim[0] = dims.len() as i16;
        for (i, d) in dims.iter().enumerate() {
            dim[i + 1] = *d as i16;
        }
        for (i, d) in dim.iter().enumerate() {
            header[40 + 2 * i..42 + 2 * i].copy_from_slice(&d.to_le_bytes());
        }
        header[70..72].copy_from_slice(&datatype.to_le_bytes());
        header[72..74].copy_from_slice(&bitpix.to_le_bytes());
        let pixdim: [f32; 8] = [1.0, 2.0, 2.0, 2.0, 1.0, 0.0, 0.0, 0.0];
        for (i, p) in pixdim.iter().enumerate() {
            header[76 + 4 * i..80 + 4 * i].copy_from_slice(&p.to_le_bytes());
        }
        header[108..112].copy_from_slice(&352f32.to_le_bytes());
        header[112..116].copy_from_slice(&1f32.to_le_bytes());
        header[344..348].copy_from_slice(b"n+1\0");

        let mut bytes = header;
        bytes.extend_from_slice(payload);
        bytes
    }

    /// 3-D int16 label volume
    pub(crate) fn int16_volume(dim: (u16, u16, u16), voxels: &[i16]) -> Vec<u8> {
        let payload: Vec<u8> = voxels.iter().flat_map(|v| v.to_le_bytes()).collect();
        nifti_bytes(&[dim.0, dim.1, dim.2], 4, 16, &payload)
    }
}
