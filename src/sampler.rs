use ndarray::{ArrayView2, Zip};

/// Mean patient intensity under one atlas label
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionSample {
    /// 0 when no pixel carries the label
    pub mean: f64,
    pub pixel_count: usize,
}

impl RegionSample {
    pub fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }
}

/// Average `patient_slice` over the pixels where `atlas_slice == label`
///
/// Both slices must have the same shape.
pub fn sample_region(
    atlas_slice: &ArrayView2<f64>,
    label: i32,
    patient_slice: &ArrayView2<f32>,
) -> RegionSample {
    debug_assert_eq!(atlas_slice.dim(), patient_slice.dim());
    let target = f64::from(label);

    let (sum, pixel_count) = Zip::from(atlas_slice).and(patient_slice).fold(
        (0.0f64, 0usize),
        |(sum, count), &atlas_value, &intensity| {
            if atlas_value == target {
                (sum + f64::from(intensity), count + 1)
            } else {
                (sum, count)
            }
        },
    );

    let mean = if pixel_count > 0 {
        sum / pixel_count as f64
    } else {
        0.0
    };
    RegionSample { mean, pixel_count }
}
