//! The one-dimensional optimizers plotted over their objective.

use std::path::Path;
use std::time::Duration;

use stepviz_algos::{
    AnnealConfig, AnnealOutcome, AnnealSnapshot, ClimbConfig, CurveSnapshot, GeneticAlgorithm,
    GeneticConfig, HillClimbing, Objective, Optimum, ParticleSwarm, PopulationSnapshot,
    SimulatedAnnealing, SwarmConfig,
};
use stepviz_core::{Point, RunReport};
use stepviz_term::draw::{draw_anneal, draw_curve, draw_gauge, draw_population, draw_status};
use stepviz_term::{Canvas, Terminal, palette};

use crate::args::Method;
use crate::config::{first_seed, load_json};
use crate::error::DemoError;
use crate::player::{body, replay, status_row};

/// Overrides applied on top of a loaded configuration.
#[derive(Debug, Clone, Copy)]
pub struct Overrides {
    pub objective: Option<Objective>,
    pub seed: Option<u64>,
}

fn title(c: &mut Canvas, text: &str) {
    c.text(Point::ZERO, text, palette::STATUS);
}

fn optimum_summary(o: &Optimum) -> String {
    format!(
        "best f({:.4}) = {:.4} after {} iterations ({:?})",
        o.best.x, o.best.y, o.iterations, o.stop
    )
}

fn draw_climb(c: &mut Canvas, t: &str, s: &CurveSnapshot) {
    title(c, t);
    draw_curve(c, body(c), s);
    let y = status_row(c);
    draw_status(
        c,
        y,
        &format!(
            "iteration {}  x {:.3}  f(x) {:.3}  best {:.3}",
            s.iteration, s.current.x, s.current.y, s.best.y
        ),
    );
}

fn draw_annealing(c: &mut Canvas, t: &str, s: &AnnealSnapshot) {
    title(c, t);
    let gauge_w = 20;
    let x = (c.width() - gauge_w - 1).max(0);
    draw_gauge(c, Point::new(x, 0), gauge_w, s.temperature_ratio());
    draw_anneal(c, body(c), s);
    let y = status_row(c);
    draw_status(
        c,
        y,
        &format!(
            "iteration {}  T {:.3}  accepted {}  x {:.3}  best {:.3}",
            s.iteration, s.temperature, s.acceptances, s.current.x, s.best.y
        ),
    );
}

fn draw_swarm(c: &mut Canvas, t: &str, s: &PopulationSnapshot) {
    title(c, t);
    draw_population(c, body(c), s);
    let y = status_row(c);
    draw_status(
        c,
        y,
        &format!(
            "iteration {}  members {}  best f({:.3}) = {:.3}",
            s.iteration,
            s.members.len(),
            s.best.x,
            s.best.y
        ),
    );
}

fn heading(method: Method, objective: Objective, seed: u64) -> String {
    format!("{} on {objective}  seed {seed}", method.name())
}

pub fn run(
    term: &mut Terminal,
    method: Method,
    config: Option<&Path>,
    overrides: Overrides,
    delay: Duration,
) -> Result<(), DemoError> {
    match method {
        Method::Climb => {
            let mut cfg: ClimbConfig = load_json(config)?;
            cfg.objective = overrides.objective.unwrap_or(cfg.objective);
            let base = first_seed(overrides.seed, config.map(|_| cfg.seed));
            replay(
                term,
                delay,
                |run| {
                    let cfg = ClimbConfig {
                        seed: base.wrapping_add(run),
                        ..cfg.clone()
                    };
                    let t = heading(method, cfg.objective, cfg.seed);
                    Ok((HillClimbing::new(cfg)?, t))
                },
                draw_climb,
                |r: &RunReport<Optimum>| optimum_summary(&r.output),
            )
        }
        Method::Anneal => {
            let mut cfg: AnnealConfig = load_json(config)?;
            cfg.objective = overrides.objective.unwrap_or(cfg.objective);
            let base = first_seed(overrides.seed, config.map(|_| cfg.seed));
            replay(
                term,
                delay,
                |run| {
                    let cfg = AnnealConfig {
                        seed: base.wrapping_add(run),
                        ..cfg.clone()
                    };
                    let t = heading(method, cfg.objective, cfg.seed);
                    Ok((SimulatedAnnealing::new(cfg)?, t))
                },
                draw_annealing,
                |r: &RunReport<AnnealOutcome>| {
                    format!(
                        "{}  accepted {}  final T {:.4}",
                        optimum_summary(&r.output.optimum),
                        r.output.acceptances,
                        r.output.final_temp
                    )
                },
            )
        }
        Method::Genetic => {
            let mut cfg: GeneticConfig = load_json(config)?;
            cfg.objective = overrides.objective.unwrap_or(cfg.objective);
            let base = first_seed(overrides.seed, config.map(|_| cfg.seed));
            replay(
                term,
                delay,
                |run| {
                    let cfg = GeneticConfig {
                        seed: base.wrapping_add(run),
                        ..cfg.clone()
                    };
                    let t = heading(method, cfg.objective, cfg.seed);
                    Ok((GeneticAlgorithm::new(cfg)?, t))
                },
                draw_swarm,
                |r: &RunReport<Optimum>| optimum_summary(&r.output),
            )
        }
        Method::Swarm => {
            let mut cfg: SwarmConfig = load_json(config)?;
            cfg.objective = overrides.objective.unwrap_or(cfg.objective);
            let base = first_seed(overrides.seed, config.map(|_| cfg.seed));
            replay(
                term,
                delay,
                |run| {
                    let cfg = SwarmConfig {
                        seed: base.wrapping_add(run),
                        ..cfg.clone()
                    };
                    let t = heading(method, cfg.objective, cfg.seed);
                    Ok((ParticleSwarm::new(cfg)?, t))
                },
                draw_swarm,
                |r: &RunReport<Optimum>| optimum_summary(&r.output),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use stepviz_algos::{Sample, StopReason};
    use stepviz_core::Machine;

    use super::*;

    #[test]
    fn summary_reports_best_point() {
        let o = Optimum {
            best: Sample { x: 3.0, y: -1.5 },
            iterations: 12,
            stop: StopReason::Converged,
        };
        assert_eq!(
            optimum_summary(&o),
            "best f(3.0000) = -1.5000 after 12 iterations (Converged)"
        );
    }

    #[test]
    fn heading_names_method_and_objective() {
        assert_eq!(
            heading(Method::Swarm, Objective::Rastrigin, 9),
            "particle swarm on rastrigin  seed 9"
        );
    }

    #[test]
    fn annealing_view_shows_temperature() {
        let m = SimulatedAnnealing::new(AnnealConfig::default()).unwrap();
        let mut c = Canvas::new(60, 20);
        draw_annealing(&mut c, "sa", &m.snapshot());
        assert!(c.row_text(0).ends_with(&"█".repeat(20)));
        assert!(c.row_text(19).starts_with("iteration 0  T 100.000"));
    }
}
