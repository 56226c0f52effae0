use nalgebra::Vector2;

/// Below this `|d²/dxdy|` normalized eigenvectors snap to the coordinate
/// axes.
pub const D2DXDY_NORMALIZING_THRESHOLD: f64 = 1e-7;

const COMPUTER_EPSILON: f64 = 1e-10;

/// How eigenvalues are ordered and how eigenvectors are parameterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EigenPolicy {
    /// Order by decreasing `|λ|` instead of decreasing `λ`.
    pub order_by_magnitude: bool,
    /// First eigenvector points right (`x >= 0`), second left (`x <= 0`);
    /// the pair is orthogonal.
    pub stable_signum_x: bool,
    /// Unit-length eigenvectors.
    pub normalize: bool,
}

impl EigenPolicy {
    pub fn new(order_by_magnitude: bool, stable_signum_x: bool, normalize: bool) -> Self {
        EigenPolicy {
            order_by_magnitude: order_by_magnitude,
            stable_signum_x: stable_signum_x,
            normalize: normalize,
        }
    }
}

/// Positive and negative parts of an eigenvalue pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClampedEigenvalues {
    pub plus: (f64, f64),
    pub minus: (f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EigenResult {
    pub lambda1: f64,
    pub lambda2: f64,
    pub v1: Vector2<f64>,
    pub v2: Vector2<f64>,
}

/// The symmetric matrix `[[a, c], [c, b]]` with `a = d²/dx²`, `b = d²/dy²`
/// and `c = d²/dxdy` at one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HessianSample {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl HessianSample {
    #[inline]
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        HessianSample { a: a, b: b, c: c }
    }

    /// `sqrt((a - b)² + 4c²)`, the distance between the eigenvalues.
    #[inline]
    pub fn discriminant(&self) -> f64 {
        let (ab, c) = (self.a - self.b, self.c);
        (ab * ab + 4.0 * c * c).sqrt()
    }

    /// `(λ1, λ2)` with `λ1 >= λ2`.
    #[inline]
    pub fn eigenvalues(&self) -> (f64, f64) {
        let d = self.discriminant();
        (0.5 * (self.a + self.b + d), 0.5 * (self.a + self.b - d))
    }

    #[inline]
    fn swapped(&self, policy: &EigenPolicy) -> bool {
        if !policy.order_by_magnitude {
            return false;
        }
        let (lambda1, lambda2) = self.eigenvalues();
        lambda1 * lambda1 < lambda2 * lambda2
    }

    /// Eigenvalues in the order of `policy`.
    #[inline]
    pub fn ordered_eigenvalues(&self, policy: &EigenPolicy) -> (f64, f64) {
        let (lambda1, lambda2) = self.eigenvalues();
        if self.swapped(policy) {
            (lambda2, lambda1)
        } else {
            (lambda1, lambda2)
        }
    }

    pub fn clamped_eigenvalues(&self, policy: &EigenPolicy) -> ClampedEigenvalues {
        let (lambda1, lambda2) = self.eigenvalues();
        if !policy.order_by_magnitude {
            return ClampedEigenvalues {
                plus: (lambda1.max(0.0), lambda2.max(0.0)),
                minus: (lambda1.min(0.0), lambda2.min(0.0)),
            };
        }
        // Sign configurations: l1 >= l2 >= 0, l1 >= 0 >= l2, 0 >= l1 >= l2.
        let plus1 = if lambda1 * lambda1 >= lambda2 * lambda2 {
            lambda1
        } else {
            lambda2
        };
        let minus1 = if lambda2 >= 0.0 {
            0.0
        } else if lambda1 <= 0.0 {
            lambda1
        } else {
            0.0
        };
        let minus2 = if lambda2 >= 0.0 || lambda1 <= 0.0 {
            0.0
        } else if lambda1 >= -lambda2 {
            lambda2
        } else {
            0.0
        };
        ClampedEigenvalues {
            plus: (plus1.max(0.0), 0.0),
            minus: (minus1, minus2),
        }
    }

    /// Unnormalized eigenvector for `λ1` (`first`) or `λ2`.
    fn raw_eigenvector(&self, first: bool, stable_signum_x: bool) -> Vector2<f64> {
        let (a, b, c) = (self.a, self.b, self.c);
        let d = self.discriminant();
        if stable_signum_x {
            // (a - b ± d, 2c) rewritten to avoid cancellation.
            let ab_abs = (a - b).abs();
            let y = 2.0 * c;
            let x = if first {
                if a > b {
                    ab_abs + d
                } else if d > COMPUTER_EPSILON {
                    y * y / (d + ab_abs)
                } else {
                    0.0
                }
            } else if a > b {
                -y * y / (d + ab_abs)
            } else if d > COMPUTER_EPSILON {
                -ab_abs - d
            } else {
                -0.0
            };
            Vector2::new(x, y)
        } else if first {
            if a >= b {
                Vector2::new(a - b + d, 2.0 * c)
            } else {
                Vector2::new(2.0 * c, b - a + d)
            }
        } else if a >= b {
            Vector2::new(2.0 * c, b - a - d)
        } else {
            Vector2::new(a - b - d, 2.0 * c)
        }
    }

    /// Axis-aligned replacement for an eigenvector that is zero or, when
    /// normalizing, numerically unreliable.
    fn snapped_eigenvector(&self,
                           first: bool,
                           raw: &Vector2<f64>,
                           policy: &EigenPolicy)
                           -> Option<Vector2<f64>> {
        let degenerate = raw.x == 0.0 && raw.y == 0.0;
        if !degenerate && !(policy.normalize && self.c.abs() < D2DXDY_NORMALIZING_THRESHOLD) {
            return None;
        }
        let x_dominant = if policy.stable_signum_x {
            self.a > self.b
        } else {
            self.a >= self.b
        };
        Some(match (first, x_dominant) {
            (true, true) => Vector2::new(1.0, 0.0),
            (true, false) => Vector2::new(0.0, 1.0),
            (false, true) => Vector2::new(0.0, -1.0),
            (false, false) => Vector2::new(-1.0, 0.0),
        })
    }

    /// Eigenvector of the first (`first_output`) or second eigenvalue in the
    /// order of `policy`.
    pub fn eigenvector(&self, first_output: bool, policy: &EigenPolicy) -> Vector2<f64> {
        let first = first_output != self.swapped(policy);
        let raw = self.raw_eigenvector(first, policy.stable_signum_x);
        if let Some(snapped) = self.snapped_eigenvector(first, &raw, policy) {
            return snapped;
        }
        if policy.normalize {
            raw / raw.norm()
        } else {
            raw
        }
    }

    /// Scalar product of `gradient` with an eigenvector.
    pub fn scalar_product(&self,
                          first_output: bool,
                          policy: &EigenPolicy,
                          gradient: &Vector2<f64>)
                          -> f64 {
        let first = first_output != self.swapped(policy);
        let raw = self.raw_eigenvector(first, policy.stable_signum_x);
        if let Some(snapped) = self.snapped_eigenvector(first, &raw, policy) {
            return snapped.dot(gradient);
        }
        let product = raw.dot(gradient);
        if policy.normalize {
            product / raw.norm()
        } else {
            product
        }
    }

    pub fn solve(&self, policy: &EigenPolicy) -> EigenResult {
        let (lambda1, lambda2) = self.ordered_eigenvalues(policy);
        EigenResult {
            lambda1: lambda1,
            lambda2: lambda2,
            v1: self.eigenvector(true, policy),
            v2: self.eigenvector(false, policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix2;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn policies() -> Vec<EigenPolicy> {
        iproduct!(&[false, true], &[false, true], &[false, true])
            .map(|(&magnitude, &stable, &normalize)| EigenPolicy::new(magnitude, stable, normalize))
            .collect()
    }

    fn random_samples(count: usize) -> Vec<HessianSample> {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        (0..count)
            .map(|_| {
                HessianSample::new(rng.gen_range(-10.0..10.0),
                                   rng.gen_range(-10.0..10.0),
                                   rng.gen_range(-10.0..10.0))
            })
            .collect()
    }

    fn assert_eigenvector(sample: &HessianSample, lambda: f64, vector: &Vector2<f64>) {
        let matrix = Matrix2::new(sample.a, sample.c, sample.c, sample.b);
        let residual = matrix * vector - vector * lambda;
        assert!(residual.norm() <= 1e-9 * (1.0 + vector.norm() * (1.0 + lambda.abs())),
                "{:?}: {:?} is not an eigenvector for {}",
                sample,
                vector,
                lambda);
    }

    #[test]
    fn test_eigenvalues_of_diagonal() {
        let sample = HessianSample::new(1.0, -3.0, 0.0);
        assert_eq!(sample.discriminant(), 4.0);
        assert_eq!(sample.eigenvalues(), (1.0, -3.0));
        let by_magnitude = EigenPolicy::new(true, false, false);
        assert_eq!(sample.ordered_eigenvalues(&by_magnitude), (-3.0, 1.0));
    }

    #[test]
    fn test_ordering() {
        for sample in random_samples(500) {
            let (l1, l2) = sample.ordered_eigenvalues(&EigenPolicy::default());
            assert!(l1 >= l2);
            let (m1, m2) = sample.ordered_eigenvalues(&EigenPolicy::new(true, false, false));
            assert!(m1.abs() >= m2.abs());
            assert!((m1 + m2 - l1 - l2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_eigenvalues_match_symmetric_eigen() {
        for sample in random_samples(200) {
            let matrix = Matrix2::new(sample.a, sample.c, sample.c, sample.b);
            let mut expected: Vec<f64> = matrix.symmetric_eigen().eigenvalues.iter().cloned().collect();
            expected.sort_by(|x, y| y.total_cmp(x));
            let (l1, l2) = sample.eigenvalues();
            assert!((l1 - expected[0]).abs() < 1e-9);
            assert!((l2 - expected[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_clamped_signs() {
        let mut samples = random_samples(500);
        samples.extend(vec![HessianSample::new(0.0, 0.0, 0.0),
                            HessianSample::new(3.0, 1.0, 0.0),
                            HessianSample::new(-3.0, -1.0, 0.0),
                            HessianSample::new(3.0, -1.0, 0.0),
                            HessianSample::new(1.0, -3.0, 0.0)]);
        for sample in samples {
            for policy in policies() {
                let clamped = sample.clamped_eigenvalues(&policy);
                assert!(clamped.plus.0 >= 0.0 && clamped.plus.1 >= 0.0, "{:?}", sample);
                assert!(clamped.minus.0 <= 0.0 && clamped.minus.1 <= 0.0, "{:?}", sample);
            }
        }
    }

    #[test]
    fn test_clamped_by_magnitude() {
        let by_magnitude = EigenPolicy::new(true, false, false);
        let mixed = HessianSample::new(3.0, -1.0, 0.0).clamped_eigenvalues(&by_magnitude);
        assert_eq!(mixed.plus, (3.0, 0.0));
        assert_eq!(mixed.minus, (0.0, -1.0));
        let negative = HessianSample::new(-3.0, -1.0, 0.0).clamped_eigenvalues(&by_magnitude);
        assert_eq!(negative.plus, (0.0, 0.0));
        assert_eq!(negative.minus, (-1.0, 0.0));
        let algebraic = HessianSample::new(3.0, -1.0, 0.0)
            .clamped_eigenvalues(&EigenPolicy::default());
        assert_eq!(algebraic.plus, (3.0, 0.0));
        assert_eq!(algebraic.minus, (0.0, -1.0));
        let positive = HessianSample::new(3.0, 1.0, 0.0).clamped_eigenvalues(&by_magnitude);
        assert_eq!(positive.plus, (3.0, 0.0));
        assert_eq!(positive.minus, (0.0, 0.0));
    }

    #[test]
    fn test_eigenvectors() {
        for sample in random_samples(300) {
            for policy in policies() {
                let result = sample.solve(&policy);
                assert_eigenvector(&sample, result.lambda1, &result.v1);
                assert_eigenvector(&sample, result.lambda2, &result.v2);
                if policy.normalize {
                    assert!((result.v1.norm() - 1.0).abs() < 1e-12);
                    assert!((result.v2.norm() - 1.0).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_stable_signum_x() {
        for sample in random_samples(300) {
            for &(magnitude, normalize) in &[(false, false), (false, true), (true, false), (true, true)] {
                let policy = EigenPolicy::new(magnitude, true, normalize);
                let result = sample.solve(&policy);
                let scale = 1.0 + result.v1.norm() * result.v2.norm();
                assert!(result.v1.dot(&result.v2).abs() < 1e-9 * scale, "{:?}", sample);
                if !magnitude {
                    assert!(result.v1.x >= 0.0 && result.v2.x <= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_sample() {
        let zero = HessianSample::new(0.0, 0.0, 0.0);
        for policy in policies() {
            let result = zero.solve(&policy);
            assert_eq!(result.lambda1, 0.0);
            assert_eq!(result.lambda2, 0.0);
            assert_eq!(result.v1.norm(), 1.0);
            assert_eq!(result.v2.norm(), 1.0);
            assert_eq!(result.v1.dot(&result.v2), 0.0);
        }
    }

    #[test]
    fn test_near_diagonal_snaps() {
        let normalize = EigenPolicy::new(false, false, true);
        let wide = HessianSample::new(2.0, 1.0, 1e-9).solve(&normalize);
        assert_eq!(wide.v1, Vector2::new(1.0, 0.0));
        assert_eq!(wide.v2, Vector2::new(0.0, -1.0));
        let tall = HessianSample::new(1.0, 2.0, -1e-9).solve(&normalize);
        assert_eq!(tall.v1, Vector2::new(0.0, 1.0));
        assert_eq!(tall.v2, Vector2::new(-1.0, 0.0));

        // With a stable x sign the pair stays orthogonal and ties go to the y axis.
        let stable = EigenPolicy::new(false, true, true);
        let tall = HessianSample::new(1.0, 2.0, 1e-9).solve(&stable);
        assert_eq!(tall.v1, Vector2::new(0.0, 1.0));
        assert_eq!(tall.v2, Vector2::new(-1.0, 0.0));
        assert_eq!(tall.v1.dot(&tall.v2), 0.0);
        let wide = HessianSample::new(2.0, 1.0, 1e-9).solve(&stable);
        assert_eq!(wide.v1, Vector2::new(1.0, 0.0));
        assert_eq!(wide.v2, Vector2::new(0.0, -1.0));
        let tied = HessianSample::new(2.0, 2.0, 1e-9);
        assert_eq!(tied.solve(&stable).v1, Vector2::new(0.0, 1.0));
        assert_eq!(tied.solve(&normalize).v1, Vector2::new(1.0, 0.0));

        // Unnormalized vectors are left alone.
        let raw = HessianSample::new(2.0, 1.0, 1e-9).solve(&EigenPolicy::default());
        assert!(raw.v1.x > 1.0 && raw.v1.y > 0.0);
    }

    #[test]
    fn test_scalar_product() {
        let sample = HessianSample::new(2.0, 2.0, 1.0);
        let gradient = Vector2::new(3.0, 1.0);
        let raw = EigenPolicy::default();
        let normalize = EigenPolicy::new(false, false, true);
        // v1 = (2, 2) for a = b.
        assert_eq!(sample.eigenvector(true, &raw), Vector2::new(2.0, 2.0));
        assert_eq!(sample.scalar_product(true, &raw, &gradient), 8.0);
        assert!((sample.scalar_product(true, &normalize, &gradient) - 8.0 / 8.0f64.sqrt()).abs() <
                1e-12);

        let snapped = HessianSample::new(2.0, 1.0, 0.0);
        assert_eq!(snapped.scalar_product(false, &normalize, &gradient), -1.0);
    }
}
