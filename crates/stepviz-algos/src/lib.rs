//! Step-by-step machines beyond grid pathfinding.
//!
//! Every type here implements [`stepviz_core::Machine`], so the same
//! [`Stepper`](stepviz_core::Stepper) that animates A* can animate a sort,
//! a binary search, an annealing schedule or a k-means run.
//!
//! Machines that draw random numbers own a [`rand::rngs::StdRng`] seeded
//! from their config: the same seed replays the same run.

mod anneal;
mod array;
mod climb;
mod genetic;
mod kmeans;
mod objective;
mod search;
mod sort;
mod swarm;

#[cfg(test)]
mod testutil;

pub use anneal::{AnnealConfig, AnnealOutcome, AnnealSnapshot, SimulatedAnnealing, Trial};
pub use array::{ArraySnapshot, Mark, random_values};
pub use climb::{ClimbConfig, HillClimbing};
pub use genetic::{GeneticAlgorithm, GeneticConfig};
pub use kmeans::{
    KMeans, KMeansConfig, KMeansOutcome, KMeansPhase, KMeansSnapshot, Vec2, clustered_points,
};
pub use objective::{
    CurveSnapshot, DOMAIN, Objective, Optimum, PopulationSnapshot, Sample, StopReason,
};
pub use search::{BinarySearch, LinearSearch, SearchOutcome};
pub use sort::{
    BubbleSort, InsertionSort, MergeSort, QuickSort, SelectionSort, SortKind, SortOutcome,
    Sorter,
};
pub use swarm::{ParticleSwarm, SwarmConfig};
