use ndarray::{Array2, ArrayView2};

pub(crate) struct Interpolator;

impl Interpolator {
    /// Resample a slice to `(height, width)` with linear interpolation
    ///
    /// The sample grid is corner-aligned: output row `o` reads source row
    /// `o * (in - 1) / (out - 1)`, so the first and last samples of each
    /// axis coincide with the source edges.
    pub(crate) fn resize_bilinear(slice: &ArrayView2<f64>, shape: (usize, usize)) -> Array2<f64> {
        let (height, width) = shape;
        let (slice_height, slice_width) = slice.dim();
        if slice_height == 0 || slice_width == 0 {
            return Array2::zeros(shape);
        }

        let scale_y = Self::axis_scale(slice_height, height);
        let scale_x = Self::axis_scale(slice_width, width);

        Array2::from_shape_fn(shape, |(y, x)| {
            let src_y = (y as f64 * scale_y).min((slice_height - 1) as f64);
            let src_x = (x as f64 * scale_x).min((slice_width - 1) as f64);
            Self::bilinear_interpolate(slice, src_y, src_x)
        })
    }

    fn axis_scale(input: usize, output: usize) -> f64 {
        if output > 1 {
            (input - 1) as f64 / (output - 1) as f64
        } else {
            1.0
        }
    }

    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<f64>, y: f64, x: f64) -> f64 {
        let (height, width) = slice.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f64;
        let dx = x - x0 as f64;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = slice[[y0, x0]];
        let v01 = slice[[y0, x1]];
        let v10 = slice[[y1, x0]];
        let v11 = slice[[y1, x1]];

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        v0.mul_add(one_minus_dy, v1 * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_identity_resize_keeps_values() {
        let slice = array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]];
        let resized = Interpolator::resize_bilinear(&slice.view(), (2, 3));
        assert_eq!(resized, slice);
    }

    #[test]
    fn test_upsample_interpolates_between_corners() {
        let slice = array![[0.0, 4.0], [8.0, 12.0]];
        let resized = Interpolator::resize_bilinear(&slice.view(), (3, 3));

        assert_eq!(resized[[0, 0]], 0.0);
        assert_eq!(resized[[0, 2]], 4.0);
        assert_eq!(resized[[2, 2]], 12.0);
        assert!((resized[[0, 1]] - 2.0).abs() < 1e-12);
        assert!((resized[[1, 1]] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_downsample_shape_and_edges() {
        let slice = Array2::from_shape_fn((109, 91), |(y, x)| (y * 100 + x) as f64);
        let resized = Interpolator::resize_bilinear(&slice.view(), (76, 64));

        assert_eq!(resized.dim(), (76, 64));
        assert_eq!(resized[[0, 0]], 0.0);
        assert!((resized[[75, 63]] - slice[[108, 90]]).abs() < 1e-9);
    }

    #[test]
    fn test_single_row_output_reads_first_row() {
        let slice = array![[1.0, 2.0], [3.0, 4.0]];
        let resized = Interpolator::resize_bilinear(&slice.view(), (1, 2));
        assert_eq!(resized, array![[1.0, 2.0]]);
    }
}
