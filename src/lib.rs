//! Esqueleto estimates the skeleton of a causal Bayesian network from
//! continuous observational data with the constraint-based PC algorithm.
//!
//! The engine prunes a complete undirected graph level by level: at level ℓ
//! every surviving edge is tested for conditional independence given sets of
//! ℓ neighbors, using the Fisher z-transform of the Gaussian partial
//! correlation. Candidate edges are distributed over a fixed worker pool
//! through a lock-free queue; workers enumerate conditioning sets against an
//! immutable snapshot of the previous level's adjacency while deleting edges
//! from a concurrently shared working graph, which keeps the resulting edge
//! set independent of thread count and scheduling.
//!
//! ```no_run
//! use esqueleto::{CsvLayout, Dataset, Skeleton, SkeletonConfig};
//!
//! # fn main() -> esqueleto::Result<()> {
//! let data = Dataset::from_csv_path("data.csv", CsvLayout::SampleRows, false)?;
//! let output = Skeleton::new(&data, SkeletonConfig::with_alpha(0.01))?.run();
//! for (i, j) in output.graph.edges() {
//!     println!("{i} -- {j}");
//! }
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub mod config;
pub mod correlation;
pub mod dataset;
pub mod engine;
pub mod gauss;
pub mod graph;
pub mod queue;
pub mod sepset;
#[cfg(feature = "stats")]
pub mod stats;
pub(crate) mod subsets;
pub mod types;
pub(crate) mod worker;

pub use crate::config::SkeletonConfig;
pub use crate::correlation::CorrelationMatrix;
pub use crate::dataset::{CsvLayout, Dataset};
pub use crate::engine::{Skeleton, SkeletonOutput};
pub use crate::gauss::{CiOutcome, GaussCiTest};
pub use crate::graph::Graph;
pub use crate::sepset::SeparationSets;
pub use crate::types::{Result, SkeletonError, VarId};
