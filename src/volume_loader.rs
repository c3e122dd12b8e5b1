use crate::{
    config::{patient_folder_name, resolve_scan_path},
    volume::Volume,
};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use ndarray::{Array3, s};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScanLoaderError {
    #[error("Scan contains no image frames")]
    NoFrames,

    #[error("No patient identifier in the scan or its path")]
    MissingPatientId,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("Pixel data error: {0}")]
    PixelData(#[from] dicom::pixeldata::Error),
}

pub struct ScanLoader;

impl ScanLoader {
    /// Load a multi-frame scan from a DICOM file
    ///
    /// The patient identifier is read from `PatientID` and falls back to the
    /// name of the directory two levels above the file, after resolving
    /// relative paths. A scan with neither is named by its file stem.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or holds no decodable frames
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Volume, ScanLoaderError> {
        let path = path.as_ref();
        let dicom_object = open_file(path)?;
        let resolved = resolve_scan_path(path);
        let fallback_id = patient_folder_name(&resolved).or_else(|| {
            resolved
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        });
        Self::load_from_dicom_object(&dicom_object, fallback_id.as_deref())
    }

    /// Load a multi-frame scan from an already parsed DICOM object
    pub fn load_from_dicom_object(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        fallback_id: Option<&str>,
    ) -> Result<Volume, ScanLoaderError> {
        let patient_id = Self::get_patient_id(dicom_object)
            .or_else(|| fallback_id.map(str::to_owned))
            .ok_or(ScanLoaderError::MissingPatientId)?;

        let data = Self::decode_frames(dicom_object)?;
        if data.dim().0 == 0 {
            return Err(ScanLoaderError::NoFrames);
        }
        debug!(patient_id = %patient_id, dim = ?data.dim(), "scan decoded");

        Ok(Volume::new(data, patient_id))
    }

    fn get_patient_id(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<String> {
        let value = dicom_object
            .element(tags::PATIENT_ID)
            .ok()?
            .to_str()
            .ok()?;
        let trimmed = value.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    /// Stored pixel values of every frame, without rescale or windowing
    fn decode_frames(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Array3<f32>, ScanLoaderError> {
        let pixel_data = dicom_object.decode_pixel_data()?;
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let frames = pixel_data.to_ndarray_with_options::<f32>(&options)?;
        Ok(frames.slice_move(s![.., .., .., 0]))
    }
}
