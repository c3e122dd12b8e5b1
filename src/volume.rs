use ndarray::{Array3, ArrayView2, ArrayView3, Axis, s};

/// Decoded patient scan, indexed (slice, row, column)
#[derive(Debug, Clone, Default)]
pub struct Volume {
    pub data: Array3<f32>,
    pub patient_id: String,
}

/// Trailing run of slices kept for analysis
#[derive(Debug, Clone)]
pub struct SliceWindow<'a> {
    /// Index of the first kept slice in the original volume
    pub offset: usize,
    pub data: ArrayView3<'a, f32>,
}

impl Volume {
    pub fn new(data: Array3<f32>, patient_id: impl Into<String>) -> Self {
        Self {
            data,
            patient_id: patient_id.into(),
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn slice(&self, index: usize) -> Option<ArrayView2<'_, f32>> {
        (index < self.dim().0).then(|| self.data.index_axis(Axis(0), index))
    }

    /// Keep at most `count` slices, dropping the earliest ones
    pub fn last_slices(&self, count: usize) -> SliceWindow<'_> {
        let depth = self.dim().0;
        let offset = depth.saturating_sub(count);
        SliceWindow {
            offset,
            data: self.data.slice(s![offset.., .., ..]),
        }
    }
}

impl SliceWindow<'_> {
    pub fn len(&self) -> usize {
        self.data.dim().0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slice(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), index)
    }
}
