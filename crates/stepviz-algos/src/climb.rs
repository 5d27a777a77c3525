use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stepviz_core::{ConfigError, Machine, Step};

use crate::objective::{
    CurveSnapshot, DOMAIN, Objective, Optimum, Sample, StopReason, in_domain, require,
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClimbConfig {
    pub objective: Objective,
    pub step_size: f64,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Quadratic,
            step_size: 0.1,
            max_iterations: 100,
            seed: 0,
        }
    }
}

impl ClimbConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(
            self.step_size.is_finite() && self.step_size > 0.0,
            "step_size",
            "must be a positive number",
        )?;
        require(self.max_iterations > 0, "max_iterations", "must be at least 1")
    }
}

/// Steepest-ascent hill climbing over `x ± step_size`.
///
/// Each step tries both neighbors and moves to the better one if it beats
/// the current value. The run ends at the first step with no improvement
/// or when `max_iterations` moves have been made.
#[derive(Debug, Clone)]
pub struct HillClimbing {
    config: ClimbConfig,
    current: Sample,
    trail: Vec<Sample>,
    moves: usize,
}

impl HillClimbing {
    /// Starts from a point drawn uniformly from the domain.
    pub fn new(config: ClimbConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let x = rng.random_range(DOMAIN.0..DOMAIN.1);
        Ok(Self::starting_at(config, x))
    }

    /// Starts from a fixed `x`. The config must already be valid.
    pub fn starting_at(config: ClimbConfig, x: f64) -> Self {
        let current = config.objective.sample(x);
        Self {
            config,
            current,
            trail: vec![current],
            moves: 0,
        }
    }

    pub fn current(&self) -> Sample {
        self.current
    }

    fn outcome(&self, stop: StopReason) -> Optimum {
        log::debug!(
            "hill climbing stopped after {} moves at x={:.3} ({stop:?})",
            self.moves,
            self.current.x
        );
        Optimum {
            best: self.current,
            iterations: self.moves,
            stop,
        }
    }
}

impl Machine for HillClimbing {
    type Snapshot = CurveSnapshot;
    type Output = Optimum;

    fn advance(&mut self) -> Step<Optimum> {
        if self.moves >= self.config.max_iterations {
            return Step::Done(self.outcome(StopReason::BudgetExhausted));
        }
        let f = self.config.objective;
        let step = self.config.step_size;
        let mut next = self.current;
        for x in [self.current.x + step, self.current.x - step] {
            let s = f.sample(x);
            if in_domain(x) && s.y > next.y {
                next = s;
            }
        }
        if next.y <= self.current.y {
            return Step::Done(self.outcome(StopReason::Converged));
        }
        self.current = next;
        self.trail.push(next);
        self.moves += 1;
        if self.moves == self.config.max_iterations {
            Step::Done(self.outcome(StopReason::BudgetExhausted))
        } else {
            Step::Progress
        }
    }

    fn snapshot(&self) -> CurveSnapshot {
        CurveSnapshot {
            objective: self.config.objective,
            current: self.current,
            best: self.current,
            trail: self.trail.clone(),
            iteration: self.moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::drive;

    #[test]
    fn climbs_quadratic_to_the_peak() {
        let cfg = ClimbConfig::default();
        let mut m = HillClimbing::starting_at(cfg, 3.0);
        let (_, out) = drive(&mut m);
        assert_eq!(out.stop, StopReason::Converged);
        assert!((out.best.x - 5.0).abs() < 0.1 + 1e-9);
        assert_eq!(out.iterations, 20);
        let snap = m.snapshot();
        assert_eq!(snap.trail.len(), 21);
        assert!(snap.trail.windows(2).all(|w| w[1].y > w[0].y));
    }

    #[test]
    fn budget_caps_the_climb() {
        let cfg = ClimbConfig {
            max_iterations: 5,
            ..ClimbConfig::default()
        };
        let mut m = HillClimbing::starting_at(cfg, 0.5);
        let (steps, out) = drive(&mut m);
        assert_eq!(steps, 5);
        assert_eq!(out.stop, StopReason::BudgetExhausted);
        assert_eq!(out.iterations, 5);
    }

    #[test]
    fn out_of_domain_neighbors_are_ignored() {
        // x - step = -0.02 scores higher but lies outside the domain.
        let cfg = ClimbConfig {
            objective: Objective::Rastrigin,
            ..ClimbConfig::default()
        };
        let mut m = HillClimbing::starting_at(cfg, 0.08);
        let (steps, out) = drive(&mut m);
        assert_eq!(steps, 1);
        assert_eq!(out.stop, StopReason::Converged);
        assert_eq!(out.best.x, 0.08);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn seeded_runs_repeat() {
        let cfg = ClimbConfig {
            objective: Objective::Rastrigin,
            seed: 42,
            ..ClimbConfig::default()
        };
        let (_, a) = drive(&mut HillClimbing::new(cfg.clone()).unwrap());
        let (_, b) = drive(&mut HillClimbing::new(cfg).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_step() {
        let cfg = ClimbConfig {
            step_size: 0.0,
            ..ClimbConfig::default()
        };
        assert!(matches!(
            HillClimbing::new(cfg),
            Err(ConfigError::Parameter { name: "step_size", .. })
        ));
    }
}
