//! Real-valued genetic algorithm over a one-dimensional objective.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use stepviz_core::{ConfigError, Machine, Step};

use crate::objective::{
    DOMAIN, Objective, Optimum, PopulationSnapshot, Sample, StopReason, clamp_domain, require,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneticConfig {
    pub objective: Objective,
    pub population: usize,
    pub generations: usize,
    /// Chance that a child is perturbed.
    pub mutation_rate: f64,
    /// Standard deviation of a perturbation, as a fraction of the domain width.
    pub mutation_strength: f64,
    /// Chance that a child blends two parents rather than copying one.
    pub crossover_rate: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elitism: usize,
    pub tournament: usize,
    /// Stop early after this many generations without a new best.
    pub stagnation_limit: Option<usize>,
    pub seed: u64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Quadratic,
            population: 20,
            generations: 50,
            mutation_rate: 0.1,
            mutation_strength: 0.1,
            crossover_rate: 0.8,
            elitism: 2,
            tournament: 3,
            stagnation_limit: None,
            seed: 0,
        }
    }
}

impl GeneticConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |r: f64| (0.0..=1.0).contains(&r);
        require(self.population >= 2, "population", "must be at least 2")?;
        require(self.generations > 0, "generations", "must be at least 1")?;
        require(unit(self.mutation_rate), "mutation_rate", "must be in [0, 1]")?;
        require(
            self.mutation_strength.is_finite() && self.mutation_strength >= 0.0,
            "mutation_strength",
            "must be a non-negative number",
        )?;
        require(unit(self.crossover_rate), "crossover_rate", "must be in [0, 1]")?;
        require(
            self.elitism < self.population,
            "elitism",
            "must be smaller than the population",
        )?;
        require(self.tournament > 0, "tournament", "must be at least 1")?;
        require(
            self.stagnation_limit != Some(0),
            "stagnation_limit",
            "must be at least 1",
        )
    }
}

/// One generation per step: rank, keep the elite, then fill the rest with
/// tournament-selected parents, blend crossover and gaussian mutation.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    config: GeneticConfig,
    rng: StdRng,
    members: Vec<Sample>,
    best: Sample,
    best_history: Vec<f64>,
    generation: usize,
    stagnation: usize,
}

fn fittest(members: &[Sample]) -> Sample {
    members
        .iter()
        .copied()
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .unwrap_or_default()
}

impl GeneticAlgorithm {
    pub fn new(config: GeneticConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let members: Vec<Sample> = (0..config.population)
            .map(|_| config.objective.sample(rng.random_range(DOMAIN.0..=DOMAIN.1)))
            .collect();
        let best = fittest(&members);
        Ok(Self {
            config,
            rng,
            members,
            best,
            best_history: vec![best.y],
            generation: 0,
            stagnation: 0,
        })
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    fn select(&mut self) -> Sample {
        let n = self.members.len();
        let mut pick = self.members[self.rng.random_range(0..n)];
        for _ in 1..self.config.tournament {
            let other = self.members[self.rng.random_range(0..n)];
            if other.y > pick.y {
                pick = other;
            }
        }
        pick
    }

    fn breed(&mut self) -> Sample {
        let a = self.select();
        let b = self.select();
        let mut x = if self.rng.random::<f64>() < self.config.crossover_rate {
            let t: f64 = self.rng.random();
            a.x + t * (b.x - a.x)
        } else {
            a.x
        };
        if self.rng.random::<f64>() < self.config.mutation_rate {
            let noise: f64 = self.rng.sample(StandardNormal);
            x = clamp_domain(x + noise * self.config.mutation_strength * (DOMAIN.1 - DOMAIN.0));
        }
        self.config.objective.sample(x)
    }

    fn outcome(&self, stop: StopReason) -> Optimum {
        log::debug!(
            "genetic algorithm stopped at generation {} ({stop:?}), best {:.3}",
            self.generation,
            self.best.y
        );
        Optimum {
            best: self.best,
            iterations: self.generation,
            stop,
        }
    }
}

impl Machine for GeneticAlgorithm {
    type Snapshot = PopulationSnapshot;
    type Output = Optimum;

    fn advance(&mut self) -> Step<Optimum> {
        if self.generation >= self.config.generations {
            return Step::Done(self.outcome(StopReason::BudgetExhausted));
        }
        self.members.sort_by(|a, b| b.y.total_cmp(&a.y));
        let mut next = Vec::with_capacity(self.config.population);
        next.extend_from_slice(&self.members[..self.config.elitism]);
        while next.len() < self.config.population {
            let child = self.breed();
            next.push(child);
        }
        self.members = next;
        self.generation += 1;

        let gen_best = fittest(&self.members);
        if gen_best.y > self.best.y {
            self.best = gen_best;
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        self.best_history.push(self.best.y);
        log::trace!("generation {}: best {:.4}", self.generation, gen_best.y);

        if self.generation >= self.config.generations {
            return Step::Done(self.outcome(StopReason::BudgetExhausted));
        }
        if self
            .config
            .stagnation_limit
            .is_some_and(|limit| self.stagnation >= limit)
        {
            return Step::Done(self.outcome(StopReason::Converged));
        }
        Step::Progress
    }

    fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            objective: self.config.objective,
            members: self.members.clone(),
            best: self.best,
            best_history: self.best_history.clone(),
            iteration: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::drive;

    #[test]
    fn runs_every_generation() {
        let mut m = GeneticAlgorithm::new(GeneticConfig::default()).unwrap();
        let (steps, out) = drive(&mut m);
        assert_eq!(steps, 50);
        assert_eq!(out.iterations, 50);
        assert_eq!(out.stop, StopReason::BudgetExhausted);
        let snap = m.snapshot();
        assert_eq!(snap.members.len(), 20);
        assert_eq!(snap.best_history.len(), 51);
    }

    #[test]
    fn elitism_keeps_best_monotone() {
        let cfg = GeneticConfig {
            objective: Objective::Rastrigin,
            seed: 5,
            ..GeneticConfig::default()
        };
        let mut m = GeneticAlgorithm::new(cfg).unwrap();
        drive(&mut m);
        let snap = m.snapshot();
        assert!(snap.best_history.windows(2).all(|w| w[1] >= w[0]));
        // The elite survives, so the population still holds the best.
        assert!(snap.members.iter().any(|s| s.y == snap.best.y));
    }

    #[test]
    fn finds_quadratic_peak() {
        let cfg = GeneticConfig {
            seed: 11,
            ..GeneticConfig::default()
        };
        let (_, out) = drive(&mut GeneticAlgorithm::new(cfg).unwrap());
        assert!((out.best.x - 5.0).abs() < 0.5, "best at {}", out.best.x);
    }

    #[test]
    fn members_stay_in_domain() {
        let cfg = GeneticConfig {
            mutation_rate: 1.0,
            mutation_strength: 2.0,
            seed: 2,
            ..GeneticConfig::default()
        };
        let mut m = GeneticAlgorithm::new(cfg).unwrap();
        while matches!(m.advance(), Step::Progress) {
            assert!(m.snapshot().members.iter().all(|s| (0.0..=10.0).contains(&s.x)));
        }
    }

    #[test]
    fn stagnation_stops_early() {
        let cfg = GeneticConfig {
            generations: 1000,
            stagnation_limit: Some(3),
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            seed: 4,
            ..GeneticConfig::default()
        };
        // With neither operator active no child can beat the initial best.
        let (steps, out) = drive(&mut GeneticAlgorithm::new(cfg).unwrap());
        assert_eq!(out.stop, StopReason::Converged);
        assert_eq!(steps, 3);
    }

    #[test]
    fn rejects_elite_as_large_as_population() {
        let cfg = GeneticConfig {
            population: 4,
            elitism: 4,
            ..GeneticConfig::default()
        };
        assert!(matches!(
            GeneticAlgorithm::new(cfg),
            Err(ConfigError::Parameter { name: "elitism", .. })
        ));
    }
}
