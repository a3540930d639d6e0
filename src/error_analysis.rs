// error_analysis.rs - Statistical kernels for correlated Monte Carlo series

use crate::error::{IsingError, Result};

/// Smallest block length accepted by [`blocks`].
pub const MIN_BLOCK_LEN: usize = 2;

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance ⟨x²⟩ - ⟨x⟩², computed on data shifted by its first
/// element. A constant series gives exactly zero.
pub fn variance(data: &[f64]) -> f64 {
    let Some(&shift) = data.first() else {
        return 0.0;
    };
    let n = data.len() as f64;
    let (sum, sum_sq) = data.iter().fold((0.0, 0.0), |(s, s2), &x| {
        let d = x - shift;
        (s + d, s2 + d * d)
    });
    ((sum_sq - sum * sum / n) / n).max(0.0)
}

/// Split `data` into `n_blocks` contiguous equal-length blocks.
///
/// Every block holds `data.len() / n_blocks` samples and a trailing
/// remainder shorter than one block is left out. Fails unless there are at
/// least two blocks of at least two samples each, since one-sample blocks
/// reduce the estimate to the raw per-sweep variance.
pub fn blocks(data: &[f64], n_blocks: usize) -> Result<Vec<&[f64]>> {
    if n_blocks < 2 || data.len() < MIN_BLOCK_LEN * n_blocks {
        return Err(IsingError::InsufficientSamples {
            samples: data.len(),
            blocks: n_blocks,
        });
    }
    let len = data.len() / n_blocks;
    Ok(data.chunks_exact(len).take(n_blocks).collect())
}

/// Standard error of the mean of per-block estimates,
/// sqrt(Σ(b_k - b̄)² / (B (B - 1))).
pub fn batch_means_error(estimates: &[f64]) -> f64 {
    let b = estimates.len() as f64;
    if estimates.len() < 2 {
        return f64::NAN;
    }
    (variance(estimates) / (b - 1.0)).sqrt()
}

/// Integrated autocorrelation time with Sokal's automatic window (c = 5).
///
/// Returns 0.5 for uncorrelated, constant or very short series.
pub fn integrated_autocorr_time(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 4 {
        return 0.5;
    }
    let m = mean(data);
    let c0 = variance(data);
    if c0 == 0.0 {
        return 0.5;
    }

    let mut tau = 0.5;
    for t in 1..n / 4 {
        let ct = data[..n - t]
            .iter()
            .zip(&data[t..])
            .map(|(&a, &b)| (a - m) * (b - m))
            .sum::<f64>()
            / (n - t) as f64;
        tau += ct / c0;
        if t as f64 >= 5.0 * tau {
            break;
        }
    }
    tau.max(0.5)
}
