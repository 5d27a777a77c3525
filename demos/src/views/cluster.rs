//! k-means over a generated point cloud.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepviz_algos::{
    KMeans, KMeansConfig, KMeansOutcome, KMeansPhase, KMeansSnapshot, Vec2, clustered_points,
};
use stepviz_core::{Point, RunReport};
use stepviz_term::draw::{draw_clusters, draw_status};
use stepviz_term::{Canvas, Terminal, palette};

use crate::config::{first_seed, load_json};
use crate::error::DemoError;
use crate::player::{body, replay, status_row};

/// The clustering run plus the point cloud it works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub kmeans: KMeansConfig,
    /// Centres the points are scattered around.
    pub centers: Vec<Vec2>,
    pub per_cluster: usize,
    /// Largest offset of a point from its centre on either axis.
    pub spread: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kmeans: KMeansConfig::default(),
            centers: vec![Vec2::new(2.0, 2.0), Vec2::new(8.0, 3.0), Vec2::new(5.0, 8.0)],
            per_cluster: 25,
            spread: 0.9,
        }
    }
}

fn draw_kmeans(c: &mut Canvas, title: &str, s: &KMeansSnapshot) {
    c.text(Point::ZERO, title, palette::STATUS);
    draw_clusters(c, body(c), s);
    let next = match s.phase {
        KMeansPhase::Assign => "assign",
        KMeansPhase::Update => "update",
    };
    let y = status_row(c);
    draw_status(
        c,
        y,
        &format!(
            "iteration {}  next {next}  moved {}",
            s.iteration, s.changed
        ),
    );
}

fn summary(r: &RunReport<KMeansOutcome>) -> String {
    format!(
        "{:?} after {} iterations  inertia {:.3}",
        r.output.stop, r.output.iterations, r.output.inertia
    )
}

pub fn run(
    term: &mut Terminal,
    config: Option<&Path>,
    seed: Option<u64>,
    delay: Duration,
) -> Result<(), DemoError> {
    let cfg: ClusterConfig = load_json(config)?;
    let base = first_seed(seed, config.map(|_| cfg.kmeans.seed));
    replay(
        term,
        delay,
        |run| {
            let seed = base.wrapping_add(run);
            let points = clustered_points(&cfg.centers, cfg.per_cluster, cfg.spread, seed);
            let kcfg = KMeansConfig {
                seed,
                ..cfg.kmeans.clone()
            };
            let title = format!(
                "k-means  k={}  {} points  seed {seed}",
                kcfg.k,
                points.len()
            );
            Ok((KMeans::new(points, kcfg)?, title))
        },
        draw_kmeans,
        summary,
    )
}
