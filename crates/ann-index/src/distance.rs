//! Cosine distance kernels.
//!
//! The graph builds and searches in cosine-distance space
//! (`1 - cosine_similarity`), so lower is always closer. Dot products and
//! magnitudes are manually unrolled four-wide; these run in the hot path for
//! every candidate the beam search touches.

/// L2 norm of a vector.
pub fn magnitude(v: &[f32]) -> f32 {
    let mut sum = 0.0;
    let n = v.len();
    let mut i = 0;

    while i + 3 < n {
        sum += v[i] * v[i] + v[i + 1] * v[i + 1] + v[i + 2] * v[i + 2] + v[i + 3] * v[i + 3];
        i += 4;
    }
    while i < n {
        sum += v[i] * v[i];
        i += 1;
    }

    sum.sqrt()
}

/// Cosine similarity in `[-1, 1]`.
///
/// Precomputed magnitudes can be passed to skip the norm recomputation for
/// vectors that are compared repeatedly. A zero-magnitude operand yields
/// similarity 0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32], mag_a: Option<f32>, mag_b: Option<f32>) -> f32 {
    let mut dot = 0.0;
    let n = a.len();
    let mut i = 0;

    while i + 3 < n {
        dot += a[i] * b[i] + a[i + 1] * b[i + 1] + a[i + 2] * b[i + 2] + a[i + 3] * b[i + 3];
        i += 4;
    }
    while i < n {
        dot += a[i] * b[i];
        i += 1;
    }

    let ma = mag_a.unwrap_or_else(|| magnitude(a));
    let mb = mag_b.unwrap_or_else(|| magnitude(b));

    if ma == 0.0 || mb == 0.0 {
        return 0.0;
    }

    dot / (ma * mb)
}

/// Cosine distance, `1 - cosine_similarity`. Range `[0, 2]`.
pub fn cosine_distance(a: &[f32], b: &[f32], mag_a: Option<f32>, mag_b: Option<f32>) -> f32 {
    1.0 - cosine_similarity(a, b, mag_a, mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_of_unit_axes() {
        assert!((magnitude(&[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((magnitude(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = [0.3, 0.5, 0.1, 0.7, 0.2];
        assert!(cosine_distance(&v, &v, None, None).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_unit_distance() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!((cosine_distance(&a, &b, None, None) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_fails_closed() {
        let zero = [0.0, 0.0, 0.0];
        let unit = [1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &unit, None, None), 0.0);
        assert_eq!(cosine_similarity(&unit, &zero, None, None), 0.0);
    }

    #[test]
    fn precomputed_magnitude_matches_recomputed() {
        let a = [0.9, 0.1, 0.3];
        let b = [0.2, 0.8, 0.4];
        let with = cosine_similarity(&a, &b, Some(magnitude(&a)), Some(magnitude(&b)));
        let without = cosine_similarity(&a, &b, None, None);
        assert!((with - without).abs() < 1e-6);
    }

    #[test]
    fn unrolled_dot_handles_non_multiple_of_four_lengths() {
        for n in 1..10usize {
            let v: Vec<f32> = (0..n).map(|i| (i + 1) as f32).collect();
            let expected: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((magnitude(&v) - expected).abs() < 1e-4, "len {n}");
        }
    }
}
