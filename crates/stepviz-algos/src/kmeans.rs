//! Lloyd's k-means over points in the plane.

use std::ops::{Add, Div};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stepviz_core::{ConfigError, Machine, Step};

use crate::objective::{StopReason, require};

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist2(self, other: Vec2) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        dx * dx + dy * dy
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// `per_cluster` points scattered uniformly within `spread` of each center.
pub fn clustered_points(centers: &[Vec2], per_cluster: usize, spread: f64, seed: u64) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = spread.abs();
    let mut points = Vec::with_capacity(centers.len() * per_cluster);
    for &c in centers {
        for _ in 0..per_cluster {
            let dx = rng.random_range(-spread..=spread);
            let dy = rng.random_range(-spread..=spread);
            points.push(Vec2::new(c.x + dx, c.y + dy));
        }
    }
    points
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KMeansConfig {
    pub k: usize,
    /// Update passes allowed before giving up on convergence.
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 20,
            seed: 0,
        }
    }
}

/// Which half of a Lloyd iteration runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KMeansPhase {
    Assign,
    Update,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansSnapshot {
    pub points: Vec<Vec2>,
    /// Cluster of each point; `None` before the first assignment pass.
    pub assignments: Vec<Option<usize>>,
    pub centroids: Vec<Vec2>,
    pub phase: KMeansPhase,
    pub iteration: usize,
    /// Points that switched cluster in the last assignment pass.
    pub changed: usize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansOutcome {
    pub centroids: Vec<Vec2>,
    pub assignments: Vec<usize>,
    pub iterations: usize,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f64,
    pub stop: StopReason,
}

/// Alternates an assignment pass and a centroid update pass, one per step.
///
/// Centroids start on `k` distinct points chosen by the seed. The run has
/// converged when an assignment pass moves no point; an empty cluster keeps
/// its previous centroid.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: KMeansConfig,
    points: Vec<Vec2>,
    assignments: Vec<Option<usize>>,
    centroids: Vec<Vec2>,
    phase: KMeansPhase,
    iteration: usize,
    changed: usize,
}

impl KMeans {
    pub fn new(points: Vec<Vec2>, config: KMeansConfig) -> Result<Self, ConfigError> {
        require(config.k > 0, "k", "must be at least 1")?;
        require(
            config.k <= points.len(),
            "k",
            "must not exceed the number of points",
        )?;
        require(config.max_iterations > 0, "max_iterations", "must be at least 1")?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let centroids = rand::seq::index::sample(&mut rng, points.len(), config.k)
            .into_iter()
            .map(|i| points[i])
            .collect();
        Ok(Self {
            assignments: vec![None; points.len()],
            config,
            points,
            centroids,
            phase: KMeansPhase::Assign,
            iteration: 0,
            changed: 0,
        })
    }

    /// Starts from the given centroids instead of seeded picks. `config.k`
    /// and `config.seed` are ignored.
    pub fn with_centroids(
        points: Vec<Vec2>,
        centroids: Vec<Vec2>,
        max_iterations: usize,
    ) -> Result<Self, ConfigError> {
        require(!centroids.is_empty(), "centroids", "must not be empty")?;
        require(max_iterations > 0, "max_iterations", "must be at least 1")?;
        Ok(Self {
            assignments: vec![None; points.len()],
            config: KMeansConfig {
                k: centroids.len(),
                max_iterations,
                seed: 0,
            },
            points,
            centroids,
            phase: KMeansPhase::Assign,
            iteration: 0,
            changed: 0,
        })
    }

    pub fn phase(&self) -> KMeansPhase {
        self.phase
    }

    fn nearest(&self, p: Vec2) -> usize {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, c) in self.centroids.iter().enumerate() {
            let d = p.dist2(*c);
            if d < best_d {
                best = i;
                best_d = d;
            }
        }
        best
    }

    fn assign(&mut self) -> usize {
        let mut changed = 0;
        for i in 0..self.points.len() {
            let c = Some(self.nearest(self.points[i]));
            if self.assignments[i] != c {
                self.assignments[i] = c;
                changed += 1;
            }
        }
        changed
    }

    fn update(&mut self) {
        let k = self.centroids.len();
        let mut sums = vec![Vec2::default(); k];
        let mut counts = vec![0usize; k];
        for (p, a) in self.points.iter().zip(&self.assignments) {
            if let Some(c) = *a {
                sums[c] = sums[c] + *p;
                counts[c] += 1;
            }
        }
        for (c, (sum, n)) in self.centroids.iter_mut().zip(sums.into_iter().zip(counts)) {
            if n > 0 {
                *c = sum / n as f64;
            }
        }
    }

    fn outcome(&self, stop: StopReason) -> KMeansOutcome {
        let assignments: Vec<usize> = self.assignments.iter().map(|a| a.unwrap_or(0)).collect();
        let inertia: f64 = self
            .points
            .iter()
            .zip(&assignments)
            .map(|(p, &c)| p.dist2(self.centroids[c]))
            .sum();
        log::debug!(
            "k-means stopped after {} iterations ({stop:?}), inertia {inertia:.3}",
            self.iteration
        );
        KMeansOutcome {
            centroids: self.centroids.clone(),
            assignments,
            iterations: self.iteration,
            inertia,
            stop,
        }
    }
}

impl Machine for KMeans {
    type Snapshot = KMeansSnapshot;
    type Output = KMeansOutcome;

    fn advance(&mut self) -> Step<KMeansOutcome> {
        match self.phase {
            KMeansPhase::Assign => {
                self.changed = self.assign();
                if self.changed == 0 {
                    return Step::Done(self.outcome(StopReason::Converged));
                }
                self.phase = KMeansPhase::Update;
                Step::Progress
            }
            KMeansPhase::Update => {
                self.update();
                self.iteration += 1;
                self.phase = KMeansPhase::Assign;
                if self.iteration >= self.config.max_iterations {
                    Step::Done(self.outcome(StopReason::BudgetExhausted))
                } else {
                    Step::Progress
                }
            }
        }
    }

    fn snapshot(&self) -> KMeansSnapshot {
        KMeansSnapshot {
            points: self.points.clone(),
            assignments: self.assignments.clone(),
            centroids: self.centroids.clone(),
            phase: self.phase,
            iteration: self.iteration,
            changed: self.changed,
        }
    }
}
