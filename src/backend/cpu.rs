use super::Backend;

/// Pure-Rust reference backend over plain vectors.
#[derive(Clone, Debug, Copy)]
pub struct CpuBackend;

/// Row-major matrix: `(data, rows, cols)`.
#[derive(Debug, Clone)]
pub struct CpuTensor2D(pub Vec<f64>, pub usize, pub usize);

impl CpuTensor2D {
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        Self(data, rows, cols)
    }

    /// Returns a transposed copy.
    pub fn transpose(&self) -> Self {
        let CpuTensor2D(inp, rows, cols) = self;
        let mut out = Vec::with_capacity(cols * rows);
        for col in 0..*cols {
            for row in 0..*rows {
                out.push(inp[row * cols + col]);
            }
        }
        CpuTensor2D::new(out, *cols, *rows)
    }
}

impl Backend for CpuBackend {
    type Scalar = f64;
    type Tensor1D = Vec<f64>;
    type Tensor2D = CpuTensor2D;

    fn name() -> &'static str {
        "cpu"
    }

    // --- Constructors ---
    fn zeros_1d(len: usize) -> Self::Tensor1D {
        vec![0.; len]
    }

    fn from_vec_1d(data: Vec<f32>) -> Self::Tensor1D {
        data.into_iter().map(f64::from).collect()
    }

    fn from_f64_1d(data: Vec<f64>) -> Self::Tensor1D {
        data
    }

    fn from_vec_2d(data: Vec<f32>, rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(data.into_iter().map(f64::from).collect(), rows, cols)
    }

    // --- Element-wise ops ---
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "add_1d: length mismatch");
        a.iter().zip(b.iter()).map(|(a, b)| a + b).collect()
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "sub_1d: length mismatch");
        a.iter().zip(b.iter()).map(|(a, b)| a - b).collect()
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "mul_1d: length mismatch");
        a.iter().zip(b.iter()).map(|(a, b)| a * b).collect()
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x * s).collect()
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x + s).collect()
    }

    // --- Reductions ---
    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.iter().sum::<f64>()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.iter().sum::<f64>() / t.len() as f64
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    // --- Access ---
    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.clone()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn matvec(a: &CpuTensor2D, x: &Vec<f64>) -> Vec<f64> {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*cols, x.len(), "matvec: {} columns vs vector of {}", cols, x.len());
        (0..*rows)
            .map(|i| {
                data[i * cols..(i + 1) * cols]
                    .iter()
                    .zip(x.iter())
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }

    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(
            *rows,
            x.len(),
            "matvec_transposed: {} rows vs vector of {}",
            rows,
            x.len()
        );
        let mut out = vec![0.0; *cols];
        for (row, &xi) in data.chunks(*cols.max(&1)).take(*rows).zip(x.iter()) {
            for (acc, &v) in out.iter_mut().zip(row.iter()) {
                *acc += v * xi;
            }
        }
        out
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        (t.1, t.2)
    }

    fn column_1d(t: &Self::Tensor1D) -> Self::Tensor2D {
        CpuTensor2D::new(t.clone(), t.len(), 1)
    }

    fn ravel_2d(t: &Self::Tensor2D) -> Self::Tensor1D {
        t.0.clone()
    }
}

#[cfg(test)]
mod matvec_tests {
    use super::*;

    #[test]
    fn test_matvec_transpose() {
        // X = [[1, 2], [3, 4], [5, 6]], v = [1, 0, 2]
        // Xᵀ v = [1 + 10, 2 + 12]
        let x = CpuTensor2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let v = vec![1.0, 0.0, 2.0];

        let result = CpuBackend::matvec_transposed(&x, &v);
        let expected = [11.0, 14.0];

        assert_eq!(result.len(), expected.len());
        for (r, e) in result.iter().zip(expected.iter()) {
            assert!((r - e).abs() < 1e-12, "Expected {}, got {}", e, r);
        }

        // single-column design matrix
        let x2 = CpuTensor2D::new(vec![2.0, 3.0, 4.0, 5.0], 4, 1);
        let result2 = CpuBackend::matvec_transposed(&x2, &vec![1.0; 4]);
        assert_eq!(result2, vec![14.0]);

        let x3 = CpuTensor2D::new(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0], 2, 3);
        let result3 = CpuBackend::matvec_transposed(&x3, &vec![5.0, 7.0]);
        assert_eq!(result3, vec![5.0, 7.0, 0.0]);
    }

    #[test]
    fn test_matvec_transpose_consistency_with_transpose_and_matvec() {
        let x = CpuTensor2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let v = vec![1.0, 0.0, 2.0];

        let result1 = CpuBackend::matvec_transposed(&x, &v);
        let result2 = CpuBackend::matvec(&x.transpose(), &v);

        assert_eq!(result1.len(), result2.len());
        for (a, b) in result1.iter().zip(result2.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_matvec_zero_rows() {
        let x = CpuTensor2D::new(vec![], 0, 2);
        assert!(CpuBackend::matvec(&x, &vec![1.0, 1.0]).is_empty());
        assert_eq!(CpuBackend::matvec_transposed(&x, &vec![]), vec![0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "matvec")]
    fn test_matvec_shape_mismatch_panics() {
        let x = CpuTensor2D::new(vec![1.0, 2.0], 1, 2);
        CpuBackend::matvec(&x, &vec![1.0]);
    }
}
