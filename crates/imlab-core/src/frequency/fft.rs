//! Two-dimensional DFT helpers built on `rustfft`.
//!
//! Spectra are stored row-major as `Complex<f64>`, with the same dimensions as
//! the spatial input. The 2D transform is separable: rows first, then columns.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Forward 2D DFT of real samples.
pub fn forward_2d(samples: &[f64], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut data: Vec<Complex<f64>> = samples.iter().map(|&v| Complex::new(v, 0.0)).collect();
    transform_2d(&mut data, width, height, false);
    data
}

/// Inverse 2D DFT, normalized by `1 / (width * height)`.
pub fn inverse_2d(data: &mut [Complex<f64>], width: usize, height: usize) {
    transform_2d(data, width, height, true);
    let scale = 1.0 / (width * height) as f64;
    for c in data.iter_mut() {
        *c *= scale;
    }
}

fn transform_2d(data: &mut [Complex<f64>], width: usize, height: usize, inverse: bool) {
    debug_assert_eq!(data.len(), width * height);

    let mut planner = FftPlanner::<f64>::new();
    let (row_fft, col_fft) = if inverse {
        (planner.plan_fft_inverse(width), planner.plan_fft_inverse(height))
    } else {
        (planner.plan_fft_forward(width), planner.plan_fft_forward(height))
    };

    // FFT along rows (contiguous)
    for row in data.chunks_exact_mut(width) {
        row_fft.process(row);
    }

    // FFT along columns via a gather/scatter buffer
    let mut column = vec![Complex::new(0.0, 0.0); height];
    for x in 0..width {
        for (y, slot) in column.iter_mut().enumerate() {
            *slot = data[y * width + x];
        }
        col_fft.process(&mut column);
        for (y, value) in column.iter().enumerate() {
            data[y * width + x] = *value;
        }
    }
}

/// Move the zero-frequency term from (0, 0) to (height / 2, width / 2).
pub fn fft_shift<T: Copy>(data: &[T], width: usize, height: usize) -> Vec<T> {
    roll(data, width, height, width / 2, height / 2)
}

/// Exact inverse of [`fft_shift`], including odd dimensions.
pub fn ifft_shift<T: Copy>(data: &[T], width: usize, height: usize) -> Vec<T> {
    roll(data, width, height, width - width / 2, height - height / 2)
}

/// Circularly shift a row-major grid by (`dx`, `dy`).
fn roll<T: Copy>(data: &[T], width: usize, height: usize, dx: usize, dy: usize) -> Vec<T> {
    let mut out = data.to_vec();
    for y in 0..height {
        let ty = (y + dy) % height;
        for x in 0..width {
            let tx = (x + dx) % width;
            out[ty * width + tx] = data[y * width + x];
        }
    }
    out
}
