use tilecl_runtime::mma::MmaOperands;

/// Operands of one dispatch widened to `f32`, with the transpositions already applied: `a` is
/// `M x K` and `b` is `K x N`, both row-major.
#[derive(Debug, Clone)]
pub(crate) struct DenseOperands {
    a: Vec<f32>,
    b: Vec<f32>,
    m: usize,
    n: usize,
    k: usize,
}

impl DenseOperands {
    /// Gather the operands through `read_a(row, col)` and `read_b(row, col)`, which index them as
    /// they are stored.
    pub(crate) fn gather<FA, FB>(
        (m, n, k): (usize, usize, usize),
        (transpose_a, transpose_b): (bool, bool),
        read_a: FA,
        read_b: FB,
    ) -> Self
    where
        FA: Fn(usize, usize) -> f32,
        FB: Fn(usize, usize) -> f32,
    {
        let a = (0..m * k)
            .map(|index| {
                let (row, depth) = (index / k, index % k);
                match transpose_a {
                    false => read_a(row, depth),
                    true => read_a(depth, row),
                }
            })
            .collect();

        let b = (0..k * n)
            .map(|index| {
                let (depth, col) = (index / n, index % n);
                match transpose_b {
                    false => read_b(depth, col),
                    true => read_b(col, depth),
                }
            })
            .collect();

        Self { a, b, m, n, k }
    }

    pub(crate) fn shape(&self) -> (usize, usize, usize) {
        (self.m, self.n, self.k)
    }
}

impl MmaOperands for DenseOperands {
    fn a(&self, row: u32, k: u32) -> f32 {
        self.a[row as usize * self.k + k as usize]
    }

    fn b(&self, k: u32, col: u32) -> f32 {
        self.b[k as usize * self.n + col as usize]
    }
}
