use faer::linalg::solvers::SelfAdjointEigen;
use faer::{Mat, Side};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::correlation::CorrelationMatrix;
use crate::types::VarId;

/// Partial correlations are kept away from ±1 so the Fisher transform stays
/// finite.
const CORRELATION_LIMIT: f64 = 1.0 - 1e-7;

/// Outcome of a single conditional independence query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CiOutcome {
    /// Two-sided tail probability of the Fisher-z statistic.
    PValue(f64),
    /// The conditioning submatrix was numerically singular even under the
    /// eigenvalue pseudo-inverse. The query is abandoned and the edge kept.
    Singular,
    /// The sample count cannot support a conditioning set of this size. No
    /// set of the same cardinality is testable either.
    InsufficientSamples,
}

/// Gaussian conditional independence test based on the Fisher z-transform of
/// the partial correlation, evaluated against the precomputed correlation
/// matrix. Immutable, so one instance is shared by every worker.
#[derive(Debug)]
pub struct GaussCiTest {
    n_samples: usize,
    correlation: CorrelationMatrix,
    normal: Normal,
}

impl GaussCiTest {
    pub fn new(n_samples: usize, correlation: CorrelationMatrix) -> Self {
        let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
        Self {
            n_samples,
            correlation,
            normal,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn correlation(&self) -> &CorrelationMatrix {
        &self.correlation
    }

    /// p-value for the hypothesis x ⟂ y | cond. `cond` must hold distinct
    /// variables different from `x` and `y`.
    pub fn pvalue(&self, x: VarId, y: VarId, cond: &[VarId]) -> CiOutcome {
        let order = cond.len() + 2;
        if order + 1 > self.n_samples {
            return CiOutcome::InsufficientSamples;
        }
        let r = if cond.is_empty() {
            self.correlation.get(x, y)
        } else {
            match self.partial_correlation(x, y, cond) {
                Some(r) => r,
                None => return CiOutcome::Singular,
            }
        };
        let r = r.clamp(-CORRELATION_LIMIT, CORRELATION_LIMIT);
        let z = 0.5 * ((1.0 + r) / (1.0 - r)).ln();
        let statistic = ((self.n_samples - cond.len() - 3) as f64).sqrt() * z.abs();
        CiOutcome::PValue(2.0 * (1.0 - self.normal.cdf(statistic)))
    }

    /// ρ_{xy·cond} from the inverse of the correlation submatrix over
    /// {x, y} ∪ cond. Eigenvalues below the rank tolerance are dropped, which
    /// degrades the inverse into the Moore-Penrose pseudo-inverse when the
    /// submatrix is singular.
    fn partial_correlation(&self, x: VarId, y: VarId, cond: &[VarId]) -> Option<f64> {
        let order = cond.len() + 2;
        let mut index = Vec::with_capacity(order);
        index.push(x);
        index.push(y);
        index.extend_from_slice(cond);

        let mut submatrix = Mat::<f64>::zeros(order, order);
        for (row, &a) in index.iter().enumerate() {
            for (col, &b) in index.iter().enumerate() {
                submatrix[(row, col)] = self.correlation.get(a, b);
            }
        }

        let eigen = SelfAdjointEigen::new(submatrix.as_ref(), Side::Lower).ok()?;
        let eigenvalues: Vec<f64> = eigen.S().column_vector().iter().copied().collect();
        let vectors = eigen.U();

        let max_magnitude = eigenvalues.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
        if max_magnitude == 0.0 {
            return None;
        }
        let tolerance = max_magnitude * order as f64 * f64::EPSILON;

        let mut p00 = 0.0;
        let mut p01 = 0.0;
        let mut p11 = 0.0;
        let mut retained = 0usize;
        for (component, &lambda) in eigenvalues.iter().enumerate() {
            if lambda.abs() <= tolerance {
                continue;
            }
            retained += 1;
            let inv = 1.0 / lambda;
            let u0 = vectors[(0, component)];
            let u1 = vectors[(1, component)];
            p00 += u0 * u0 * inv;
            p01 += u0 * u1 * inv;
            p11 += u1 * u1 * inv;
        }
        if retained == 0 || p00 <= 0.0 || p11 <= 0.0 {
            return None;
        }
        let denom = (p00 * p11).sqrt();
        if denom == 0.0 || !denom.is_finite() {
            return None;
        }
        let r = -p01 / denom;
        r.is_finite().then_some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_test(rho: f64, n: usize) -> GaussCiTest {
        // corr(i, j) = rho^|i-j|, the stationary Markov chain.
        let corr = CorrelationMatrix::from_fn(4, |i, j| rho.powi((j - i) as i32));
        GaussCiTest::new(n, corr)
    }

    #[test]
    fn marginal_dependence_has_tiny_pvalue() {
        let test = chain_test(0.7, 1000);
        match test.pvalue(VarId(0), VarId(1), &[]) {
            CiOutcome::PValue(p) => assert!(p < 1e-10, "p = {p}"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn chain_endpoints_are_independent_given_middle() {
        let test = chain_test(0.7, 1000);
        match test.pvalue(VarId(0), VarId(2), &[VarId(1)]) {
            CiOutcome::PValue(p) => assert!(p > 0.99, "p = {p}"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn conditioning_on_a_non_blocker_keeps_dependence() {
        let test = chain_test(0.7, 1000);
        match test.pvalue(VarId(0), VarId(1), &[VarId(2)]) {
            CiOutcome::PValue(p) => assert!(p < 1e-10, "p = {p}"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn fisher_statistic_matches_hand_computation() {
        let r: f64 = 0.5;
        let n = 100usize;
        let corr = CorrelationMatrix::from_fn(2, |_, _| r);
        let test = GaussCiTest::new(n, corr);
        let expected = {
            let z = 0.5 * ((1.0 + r) / (1.0 - r)).ln();
            let t = ((n - 3) as f64).sqrt() * z;
            let normal = Normal::new(0.0, 1.0).unwrap();
            2.0 * (1.0 - normal.cdf(t))
        };
        match test.pvalue(VarId(0), VarId(1), &[]) {
            CiOutcome::PValue(p) => assert!((p - expected).abs() < 1e-12),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn oversized_conditioning_set_is_untestable() {
        let corr = CorrelationMatrix::from_fn(4, |_, _| 0.1);
        let test = GaussCiTest::new(4, corr);
        assert_eq!(
            test.pvalue(VarId(0), VarId(1), &[VarId(2), VarId(3)]),
            CiOutcome::InsufficientSamples
        );
    }

    #[test]
    fn duplicated_variable_falls_back_to_pseudo_inverse() {
        // Variables 0 and 1 are copies, so the submatrix over {0, 2, 1} is
        // rank deficient. The pseudo-inverse path must not panic and must
        // produce either a p-value or a singularity report.
        let corr = CorrelationMatrix::from_fn(3, |i, j| match (i, j) {
            (0, 1) => 1.0,
            (0, 2) | (1, 2) => 0.7,
            _ => unreachable!(),
        });
        let test = GaussCiTest::new(100, corr);
        match test.pvalue(VarId(0), VarId(2), &[VarId(1)]) {
            CiOutcome::PValue(p) => assert!((0.0..=1.0).contains(&p)),
            CiOutcome::Singular => {}
            CiOutcome::InsufficientSamples => panic!("100 samples are plenty"),
        }
    }

    #[test]
    fn near_perfect_correlation_stays_finite() {
        let corr = CorrelationMatrix::from_fn(2, |_, _| 1.0);
        let test = GaussCiTest::new(50, corr);
        match test.pvalue(VarId(0), VarId(1), &[]) {
            CiOutcome::PValue(p) => assert!(p < 1e-10, "p = {p}"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
