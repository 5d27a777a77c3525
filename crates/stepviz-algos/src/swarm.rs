use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stepviz_core::{ConfigError, Machine, Step};

use crate::objective::{
    DOMAIN, Objective, Optimum, PopulationSnapshot, Sample, StopReason, clamp_domain, require,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwarmConfig {
    pub objective: Objective,
    pub particles: usize,
    pub iterations: usize,
    pub inertia: f64,
    /// Pull toward each particle's own best.
    pub cognitive: f64,
    /// Pull toward the swarm's best.
    pub social: f64,
    /// Speed limit per step.
    pub max_velocity: f64,
    /// The swarm has converged once every particle is this close to the
    /// global best.
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Quadratic,
            particles: 20,
            iterations: 60,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            max_velocity: 1.0,
            tolerance: 1e-3,
            seed: 0,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        require(self.particles > 0, "particles", "must be at least 1")?;
        require(self.iterations > 0, "iterations", "must be at least 1")?;
        require(non_negative(self.inertia), "inertia", "must be a non-negative number")?;
        require(
            non_negative(self.cognitive),
            "cognitive",
            "must be a non-negative number",
        )?;
        require(non_negative(self.social), "social", "must be a non-negative number")?;
        require(
            self.max_velocity.is_finite() && self.max_velocity > 0.0,
            "max_velocity",
            "must be a positive number",
        )?;
        require(non_negative(self.tolerance), "tolerance", "must be a non-negative number")
    }
}

#[derive(Debug, Clone, Copy)]
struct Particle {
    at: Sample,
    velocity: f64,
    best: Sample,
}

/// Global-best particle swarm optimization in one dimension.
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    config: SwarmConfig,
    rng: StdRng,
    particles: Vec<Particle>,
    best: Sample,
    best_history: Vec<f64>,
    iteration: usize,
}

impl ParticleSwarm {
    pub fn new(config: SwarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let vmax = config.max_velocity;
        let particles: Vec<Particle> = (0..config.particles)
            .map(|_| {
                let at = config.objective.sample(rng.random_range(DOMAIN.0..=DOMAIN.1));
                Particle {
                    at,
                    velocity: rng.random_range(-vmax..=vmax),
                    best: at,
                }
            })
            .collect();
        let best = particles
            .iter()
            .map(|p| p.best)
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap_or_default();
        Ok(Self {
            config,
            rng,
            particles,
            best,
            best_history: vec![best.y],
            iteration: 0,
        })
    }

    fn converged(&self) -> bool {
        self.particles
            .iter()
            .all(|p| (p.at.x - self.best.x).abs() <= self.config.tolerance)
    }

    fn outcome(&self, stop: StopReason) -> Optimum {
        Optimum {
            best: self.best,
            iterations: self.iteration,
            stop,
        }
    }
}

impl Machine for ParticleSwarm {
    type Snapshot = PopulationSnapshot;
    type Output = Optimum;

    fn advance(&mut self) -> Step<Optimum> {
        if self.iteration >= self.config.iterations {
            return Step::Done(self.outcome(StopReason::BudgetExhausted));
        }
        let SwarmConfig {
            objective,
            inertia,
            cognitive,
            social,
            max_velocity: vmax,
            ..
        } = self.config;
        let global = self.best;
        for p in &mut self.particles {
            let r1: f64 = self.rng.random();
            let r2: f64 = self.rng.random();
            let v = inertia * p.velocity
                + cognitive * r1 * (p.best.x - p.at.x)
                + social * r2 * (global.x - p.at.x);
            p.velocity = v.clamp(-vmax, vmax);
            let x = p.at.x + p.velocity;
            let clamped = clamp_domain(x);
            if clamped != x {
                p.velocity = 0.0;
            }
            p.at = objective.sample(clamped);
            if p.at.y > p.best.y {
                p.best = p.at;
            }
            if p.at.y > self.best.y {
                self.best = p.at;
            }
        }
        self.iteration += 1;
        self.best_history.push(self.best.y);

        if self.iteration >= self.config.iterations {
            Step::Done(self.outcome(StopReason::BudgetExhausted))
        } else if self.converged() {
            log::debug!("swarm converged after {} iterations", self.iteration);
            Step::Done(self.outcome(StopReason::Converged))
        } else {
            Step::Progress
        }
    }

    fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            objective: self.config.objective,
            members: self.particles.iter().map(|p| p.at).collect(),
            best: self.best,
            best_history: self.best_history.clone(),
            iteration: self.iteration,
        }
    }
}
