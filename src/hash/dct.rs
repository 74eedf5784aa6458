use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Precomputed cosines for an N-point DCT-II.
///
/// Entry `i` holds `cos(i * PI / 2N)`; the transform only ever needs
/// `(2x + 1) * u` for `x, u < N`, which stays below `2N(N - 1)`.
#[derive(Clone, Debug)]
pub struct CosineTable {
    size: usize,
    values: Vec<f64>,
}

impl CosineTable {
    pub fn new(size: usize) -> Self {
        let entries = (2 * size * size.saturating_sub(1)).max(1);
        let values = (0..entries)
            .map(|i| (i as f64 / (2 * size) as f64 * PI).cos())
            .collect();
        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn cos(&self, x: usize, u: usize) -> f64 {
        self.values[(2 * x + 1) * u]
    }

    fn scale(u: usize) -> f64 {
        if u == 0 { FRAC_1_SQRT_2 } else { 1.0 }
    }

    /// 2-D DCT-II of a row-major `size × size` grid.
    ///
    /// `F(u, v) = c(u) c(v) / 4 * sum_i sum_j cos((2i+1)u) cos((2j+1)v) f(i, j)`
    /// with `c(0) = 1/sqrt(2)`, computed as two separable 1-D passes.
    /// Output is row-major as well: `F[size * u + v]`.
    pub fn dct2(&self, input: &[f64]) -> Vec<f64> {
        let n = self.size;
        assert_eq!(input.len(), n * n, "DCT input must be {n}x{n}");

        // Transform along j (columns) for every row i.
        let mut partial = vec![0.0; n * n];
        for i in 0..n {
            let row = &input[n * i..n * (i + 1)];
            for v in 0..n {
                partial[n * i + v] = row
                    .iter()
                    .enumerate()
                    .map(|(j, f)| self.cos(j, v) * f)
                    .sum();
            }
        }

        // Transform along i (rows) for every frequency v.
        let mut output = vec![0.0; n * n];
        for u in 0..n {
            for v in 0..n {
                let sum: f64 = (0..n).map(|i| self.cos(i, u) * partial[n * i + v]).sum();
                output[n * u + v] = sum * Self::scale(u) * Self::scale(v) / 4.0;
            }
        }
        output
    }
}
