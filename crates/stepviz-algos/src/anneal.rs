use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stepviz_core::{ConfigError, Machine, Step};

use crate::objective::{DOMAIN, Objective, Optimum, Sample, StopReason, in_domain, require};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnealConfig {
    pub objective: Objective,
    pub initial_temp: f64,
    /// Multiplier applied to the temperature after every in-domain trial.
    pub cooling_rate: f64,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Quadratic,
            initial_temp: 100.0,
            cooling_rate: 0.95,
            max_iterations: 200,
            seed: 0,
        }
    }
}

impl AnnealConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(
            self.initial_temp.is_finite() && self.initial_temp > 0.0,
            "initial_temp",
            "must be a positive number",
        )?;
        require(
            self.cooling_rate > 0.0 && self.cooling_rate < 1.0,
            "cooling_rate",
            "must be in (0, 1)",
        )?;
        require(self.max_iterations > 0, "max_iterations", "must be at least 1")
    }
}

/// One entry of the annealing trail: where the walker stood after a trial,
/// and whether the trial moved it there.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trial {
    pub at: Sample,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealSnapshot {
    pub objective: Objective,
    pub current: Sample,
    pub best: Sample,
    pub trail: Vec<Trial>,
    /// The last proposal, including ones that fell outside the domain.
    pub proposal: Option<Sample>,
    pub temperature: f64,
    pub initial_temp: f64,
    pub acceptances: usize,
    pub iteration: usize,
}

impl AnnealSnapshot {
    /// Current temperature as a fraction of the initial one.
    pub fn temperature_ratio(&self) -> f64 {
        self.temperature / self.initial_temp
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealOutcome {
    pub optimum: Optimum,
    pub acceptances: usize,
    pub final_temp: f64,
}

/// Simulated annealing with Metropolis acceptance and geometric cooling.
///
/// Every step proposes `x + U(-1, 1)`. A proposal outside the domain uses
/// up the iteration but neither moves the walker nor cools the system.
/// Improvements are always taken; a worse proposal is taken with
/// probability `exp(Δ / T)`. The run always spends its full budget.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealing {
    config: AnnealConfig,
    rng: StdRng,
    current: Sample,
    best: Sample,
    trail: Vec<Trial>,
    proposal: Option<Sample>,
    temperature: f64,
    acceptances: usize,
    iteration: usize,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let start = config.objective.sample(rng.random_range(DOMAIN.0..DOMAIN.1));
        Ok(Self {
            temperature: config.initial_temp,
            config,
            rng,
            current: start,
            best: start,
            trail: vec![Trial {
                at: start,
                accepted: true,
            }],
            proposal: None,
            acceptances: 0,
            iteration: 0,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    fn outcome(&self) -> AnnealOutcome {
        log::debug!(
            "annealing finished: best {:.3} at x={:.3}, {} of {} accepted",
            self.best.y,
            self.best.x,
            self.acceptances,
            self.iteration
        );
        AnnealOutcome {
            optimum: Optimum {
                best: self.best,
                iterations: self.iteration,
                stop: StopReason::BudgetExhausted,
            },
            acceptances: self.acceptances,
            final_temp: self.temperature,
        }
    }

    fn trial(&mut self) {
        let x = self.current.x + self.rng.random_range(-1.0..1.0);
        let proposal = self.config.objective.sample(x);
        self.proposal = Some(proposal);
        if !in_domain(x) {
            return;
        }
        let delta = proposal.y - self.current.y;
        let accepted = delta > 0.0 || self.rng.random::<f64>() < (delta / self.temperature).exp();
        if accepted {
            self.current = proposal;
            self.acceptances += 1;
            if proposal.y > self.best.y {
                self.best = proposal;
            }
        }
        self.trail.push(Trial {
            at: self.current,
            accepted,
        });
        self.temperature *= self.config.cooling_rate;
    }
}

impl Machine for SimulatedAnnealing {
    type Snapshot = AnnealSnapshot;
    type Output = AnnealOutcome;

    fn advance(&mut self) -> Step<AnnealOutcome> {
        if self.iteration < self.config.max_iterations {
            self.trial();
            self.iteration += 1;
        }
        if self.iteration >= self.config.max_iterations {
            Step::Done(self.outcome())
        } else {
            Step::Progress
        }
    }

    fn snapshot(&self) -> AnnealSnapshot {
        AnnealSnapshot {
            objective: self.config.objective,
            current: self.current,
            best: self.best,
            trail: self.trail.clone(),
            proposal: self.proposal,
            temperature: self.temperature,
            initial_temp: self.config.initial_temp,
            acceptances: self.acceptances,
            iteration: self.iteration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::drive;

    #[test]
    fn spends_the_whole_budget() {
        let cfg = AnnealConfig {
            max_iterations: 50,
            seed: 1,
            ..AnnealConfig::default()
        };
        let mut m = SimulatedAnnealing::new(cfg).unwrap();
        let (steps, out) = drive(&mut m);
        assert_eq!(steps, 50);
        assert_eq!(out.optimum.iterations, 50);
        assert_eq!(out.optimum.stop, StopReason::BudgetExhausted);
        assert!(out.acceptances <= 50);
    }

    #[test]
    fn cools_once_per_in_domain_trial() {
        let cfg = AnnealConfig {
            seed: 9,
            ..AnnealConfig::default()
        };
        let mut m = SimulatedAnnealing::new(cfg.clone()).unwrap();
        let (_, out) = drive(&mut m);
        let snap = m.snapshot();
        let cooled = snap.trail.len() - 1;
        let expected = cfg.initial_temp * cfg.cooling_rate.powi(cooled as i32);
        assert!((out.final_temp - expected).abs() < 1e-9);
        assert!(cooled <= cfg.max_iterations);
    }

    #[test]
    fn best_dominates_trail() {
        let cfg = AnnealConfig {
            objective: Objective::Rastrigin,
            seed: 3,
            ..AnnealConfig::default()
        };
        let mut m = SimulatedAnnealing::new(cfg).unwrap();
        let (_, out) = drive(&mut m);
        let snap = m.snapshot();
        assert!(snap.trail.iter().all(|t| t.at.y <= out.optimum.best.y));
        assert!(snap.trail.iter().all(|t| (0.0..=10.0).contains(&t.at.x)));
        assert_eq!(
            snap.trail.iter().skip(1).filter(|t| t.accepted).count(),
            out.acceptances
        );
    }

    #[test]
    fn same_seed_same_run() {
        let cfg = AnnealConfig {
            seed: 77,
            ..AnnealConfig::default()
        };
        let mut a = SimulatedAnnealing::new(cfg.clone()).unwrap();
        let mut b = SimulatedAnnealing::new(cfg).unwrap();
        let (_, oa) = drive(&mut a);
        let (_, ob) = drive(&mut b);
        assert_eq!(oa, ob);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn temperature_ratio_starts_at_one() {
        let m = SimulatedAnnealing::new(AnnealConfig::default()).unwrap();
        assert_eq!(m.snapshot().temperature_ratio(), 1.0);
    }

    #[test]
    fn rejects_cooling_outside_unit_interval() {
        for rate in [0.0, 1.0, 1.5] {
            let cfg = AnnealConfig {
                cooling_rate: rate,
                ..AnnealConfig::default()
            };
            assert!(SimulatedAnnealing::new(cfg).is_err());
        }
    }
}
