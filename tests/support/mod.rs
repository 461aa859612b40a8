#![allow(dead_code)]

use std::f64::consts::PI;

use esqueleto::{Dataset, Graph, SeparationSets, SkeletonOutput, VarId};

/// Zero-mean, mutually orthogonal, unit-norm columns (a slice of the DCT-II
/// basis). Mixing them through a Cholesky factor produces data whose sample
/// correlation matrix equals a target matrix exactly, which keeps the
/// end-to-end scenarios deterministic: partial correlations the model says
/// vanish come out at machine-epsilon scale, far below any significance
/// threshold.
fn orthonormal_columns(n: usize, p: usize) -> Vec<Vec<f64>> {
    assert!(p < n, "need more samples than variables");
    let scale = (2.0 / n as f64).sqrt();
    (1..=p)
        .map(|k| {
            (0..n)
                .map(|t| {
                    scale * (PI * k as f64 * (2 * t + 1) as f64 / (2.0 * n as f64)).cos()
                })
                .collect()
        })
        .collect()
}

fn cholesky(sigma: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let p = sigma.len();
    let mut lower = vec![vec![0.0; p]; p];
    for i in 0..p {
        for j in 0..=i {
            let mut sum = sigma[i][j];
            for k in 0..j {
                sum -= lower[i][k] * lower[j][k];
            }
            if i == j {
                assert!(sum > 0.0, "correlation matrix is not positive definite");
                lower[i][j] = sum.sqrt();
            } else {
                lower[i][j] = sum / lower[j][j];
            }
        }
    }
    lower
}

/// Builds `n` samples over `sigma.len()` variables whose sample correlation
/// matrix is exactly `sigma`.
pub fn dataset_with_correlation(sigma: &[Vec<f64>], n: usize) -> Dataset {
    let p = sigma.len();
    let basis = orthonormal_columns(n, p);
    let lower = cholesky(sigma);
    let columns: Vec<Vec<f64>> = (0..p)
        .map(|v| {
            (0..n)
                .map(|t| (0..=v).map(|w| lower[v][w] * basis[w][t]).sum())
                .collect()
        })
        .collect();
    Dataset::from_columns(columns).expect("generated columns are rectangular")
}

/// corr(i, j) = rho^|i-j|: the stationary Gaussian Markov chain. Every pair
/// at distance two or more is conditionally independent given any variable
/// strictly between them.
pub fn chain_sigma(p: usize, rho: f64) -> Vec<Vec<f64>> {
    (0..p)
        .map(|i| {
            (0..p)
                .map(|j| rho.powi((i as i32 - j as i32).abs()))
                .collect()
        })
        .collect()
}

/// Common cause 0 of leaves 1 and 2 with no direct leaf interaction:
/// corr(1, 2) = corr(0, 1) · corr(0, 2).
pub fn fork_sigma(c: f64) -> Vec<Vec<f64>> {
    vec![
        vec![1.0, c, c],
        vec![c, 1.0, c * c],
        vec![c, c * c, 1.0],
    ]
}

/// Hub 0 with marginally independent spokes 1..p-1.
pub fn star_sigma(p: usize, c: f64) -> Vec<Vec<f64>> {
    (0..p)
        .map(|i| {
            (0..p)
                .map(|j| {
                    if i == j {
                        1.0
                    } else if i == 0 || j == 0 {
                        c
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

pub fn edge_pairs(graph: &Graph) -> Vec<(u32, u32)> {
    graph.edges().into_iter().map(|(i, j)| (i.0, j.0)).collect()
}

pub fn witness(sets: &SeparationSets, x: u32, y: u32) -> Option<Vec<u32>> {
    sets.get(VarId(x), VarId(y))
        .map(|set| set.into_iter().map(|v| v.0).collect())
}

/// Structural checks every finished run must satisfy: a consistent graph, and
/// witnesses that are ascending, free of their own endpoints, in range, and
/// recorded exactly for the deleted pairs.
pub fn assert_output_sound(output: &SkeletonOutput) {
    output.graph.verify();
    let p = output.graph.vertex_count() as u32;
    for (i, j, set) in output.separation_sets.witnesses() {
        assert!(i < j);
        assert!(
            !output.graph.has_edge(i, j),
            "pair {i}-{j} has a witness but is still an edge"
        );
        for window in set.windows(2) {
            assert!(window[0] < window[1], "witness for {i}-{j} is not ascending");
        }
        for &v in &set {
            assert!(v != i && v != j, "witness for {i}-{j} contains an endpoint");
            assert!(v.0 < p, "witness for {i}-{j} is out of range");
        }
    }
    let pairs = (p as usize) * (p as usize - 1) / 2;
    assert_eq!(
        output.separation_sets.witness_count() + output.graph.edge_count(),
        pairs,
        "every non-edge must carry a witness"
    );
}
