//! Shared fixtures: a synthetic atlas pair and phantom DaTscan volumes
#![allow(dead_code)]

use datscan_sbr::{Atlas, AtlasVolume};
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::{InMemDicomObject, meta::FileMetaTableBuilder};
use dicom_dictionary_std::tags;
use ndarray::Array3;
use std::{fs, ops::Range, path::Path};

/// Shape atlas slices are resampled to; phantoms use it so the resampling
/// is exact
pub const ROWS: usize = 76;
pub const COLS: usize = 64;

pub const OCCIPITAL: (Range<usize>, Range<usize>) = (60..70, 10..54);
pub const CAUDATE_L: (Range<usize>, Range<usize>) = (20..25, 10..15);
pub const CAUDATE_R: (Range<usize>, Range<usize>) = (20..25, 45..50);
pub const PUTAMEN_L: (Range<usize>, Range<usize>) = (30..36, 12..18);
pub const PUTAMEN_R: (Range<usize>, Range<usize>) = (30..36, 42..48);

pub const BACKGROUND: u16 = 5;
pub const OCCIPITAL_UPTAKE: u16 = 10;
pub const CAUDATE_L_UPTAKE: u16 = 30;
pub const CAUDATE_R_UPTAKE: u16 = 25;
pub const PUTAMEN_UPTAKE: u16 = 20;

const NM_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.20";
const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
const INSTANCE_UID: &str = "1.2.826.0.1.3680043.2.1125.1";

fn inside(region: &(Range<usize>, Range<usize>), row: usize, col: usize) -> bool {
    region.0.contains(&row) && region.1.contains(&col)
}

pub fn cortical_label(row: usize, col: usize) -> i32 {
    if inside(&OCCIPITAL, row, col) { 41 } else { 0 }
}

pub fn subcortical_label(row: usize, col: usize) -> i32 {
    [CAUDATE_L, CAUDATE_R, PUTAMEN_L, PUTAMEN_R]
        .iter()
        .position(|region| inside(region, row, col))
        .map_or(0, |index| index as i32 + 1)
}

/// Atlas volume whose axial slices, turned a quarter counter-clockwise,
/// equal `label(z, row, col)` on a `ROWS x COLS` grid
pub fn rotated_atlas_volume(depth: usize, label: impl Fn(usize, usize, usize) -> i32) -> AtlasVolume {
    let labels = Array3::from_shape_fn((COLS, ROWS, depth), |(x, y, z)| label(z, ROWS - 1 - y, x));
    AtlasVolume::new(labels, (2.0, 2.0, 2.0))
}

pub fn phantom_atlas(depth: usize) -> Atlas {
    Atlas::new(
        rotated_atlas_volume(depth, |_, row, col| cortical_label(row, col)),
        rotated_atlas_volume(depth, |_, row, col| subcortical_label(row, col)),
    )
}

pub fn phantom_intensity(row: usize, col: usize) -> u16 {
    if inside(&OCCIPITAL, row, col) {
        OCCIPITAL_UPTAKE
    } else if inside(&CAUDATE_L, row, col) {
        CAUDATE_L_UPTAKE
    } else if inside(&CAUDATE_R, row, col) {
        CAUDATE_R_UPTAKE
    } else if inside(&PUTAMEN_L, row, col) || inside(&PUTAMEN_R, row, col) {
        PUTAMEN_UPTAKE
    } else {
        BACKGROUND
    }
}

/// Phantom frames of `rows x cols`, with the phantom centered the way the
/// atlas is padded
pub fn phantom_frames(depth: usize, rows: usize, cols: usize) -> Array3<u16> {
    let top = rows.saturating_sub(ROWS) / 2;
    let left = cols.saturating_sub(COLS) / 2;
    Array3::from_shape_fn((depth, rows, cols), |(_, row, col)| {
        match (row.checked_sub(top), col.checked_sub(left)) {
            (Some(r), Some(c)) if r < ROWS && c < COLS => phantom_intensity(r, c),
            _ => BACKGROUND,
        }
    })
}

pub fn phantom_volume(depth: usize, rows: usize, cols: usize) -> datscan_sbr::Volume {
    datscan_sbr::Volume::new(phantom_frames(depth, rows, cols).mapv(f32::from), "PHANTOM")
}

/// Write a multi-frame NM image with 16-bit unsigned pixels
pub fn write_scan(path: &Path, frames: &Array3<u16>, patient_id: Option<&str>) {
    let (depth, rows, cols) = frames.dim();
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(NM_IMAGE_STORAGE)));
    obj.put(DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from(INSTANCE_UID)));
    if let Some(id) = patient_id {
        obj.put(DataElement::new(tags::PATIENT_ID, VR::LO, PrimitiveValue::from(id)));
    }
    obj.put(DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    obj.put(DataElement::new(
        tags::NUMBER_OF_FRAMES,
        VR::IS,
        PrimitiveValue::from(depth.to_string()),
    ));
    obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows as u16)));
    obj.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(cols as u16)));
    obj.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)));
    obj.put(DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)));
    obj.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15_u16)));
    obj.put(DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)));

    let pixels: Vec<u16> = frames.iter().copied().collect();
    obj.put(DataElement::new(tags::PIXEL_DATA, VR::OW, PrimitiveValue::U16(pixels.into())));

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(NM_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(INSTANCE_UID),
        )
        .expect("should have built file meta group");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("should have created scan directory");
    }
    file.write_to_file(path).expect("should have written scan");
}
