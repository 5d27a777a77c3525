//! Sorting and searching shown as bar charts.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stepviz_algos::{
    ArraySnapshot, BinarySearch, LinearSearch, SearchOutcome, SortKind, SortOutcome, random_values,
};
use stepviz_core::{Machine, Point, RunReport};
use stepviz_term::draw::{draw_bars, draw_status};
use stepviz_term::{Canvas, Terminal, palette};

use crate::args::ArrayOpts;
use crate::error::DemoError;
use crate::player::{body, replay, status_row};

type Searcher = Box<dyn Machine<Snapshot = ArraySnapshot, Output = SearchOutcome> + Send>;

fn draw_array(c: &mut Canvas, title: &str, snap: &ArraySnapshot) {
    c.text(Point::ZERO, title, palette::STATUS);
    draw_bars(c, body(c), snap);
    let y = status_row(c);
    draw_status(
        c,
        y,
        &format!(
            "comparisons {}  writes {}",
            snap.comparisons, snap.writes
        ),
    );
}

fn run_seed(base: u64, run: u64) -> u64 {
    base.wrapping_add(run)
}

pub fn sort(term: &mut Terminal, kind: SortKind, opts: ArrayOpts) -> Result<(), DemoError> {
    let base = opts.seed.unwrap_or_else(rand::random);
    replay(
        term,
        Duration::from_millis(opts.delay_ms),
        |run| {
            let seed = run_seed(base, run);
            let title = format!("{} sort  n={}  seed {seed}", kind.name(), opts.len);
            Ok((kind.sorter(random_values(opts.len, seed)), title))
        },
        draw_array,
        |r: &RunReport<SortOutcome>| {
            format!(
                "sorted in {} steps: {} comparisons, {} writes",
                r.steps, r.output.comparisons, r.output.writes
            )
        },
    )
}

/// Picks the value to look for: `target` if given, otherwise usually one
/// of `values` and now and then one that is absent.
fn pick_target(values: &[i32], target: Option<i32>, seed: u64) -> i32 {
    if let Some(t) = target {
        return t;
    }
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    if values.is_empty() || rng.random_bool(0.2) {
        return 0;
    }
    values[rng.random_range(0..values.len())]
}

fn searcher(values: Vec<i32>, target: i32, binary: bool) -> Result<Searcher, DemoError> {
    if binary {
        Ok(Box::new(BinarySearch::new(values, target)?))
    } else {
        Ok(Box::new(LinearSearch::new(values, target)))
    }
}

fn search_summary(r: &RunReport<SearchOutcome>) -> String {
    match r.output.index {
        Some(i) => format!("found at index {i} after {} probes", r.output.probes),
        None => format!("not found after {} probes", r.output.probes),
    }
}

pub fn search(
    term: &mut Terminal,
    binary: bool,
    target: Option<i32>,
    opts: ArrayOpts,
) -> Result<(), DemoError> {
    let base = opts.seed.unwrap_or_else(rand::random);
    let name = if binary { "binary" } else { "linear" };
    replay(
        term,
        Duration::from_millis(opts.delay_ms),
        |run| {
            let seed = run_seed(base, run);
            let mut values = random_values(opts.len, seed);
            if binary {
                values.sort_unstable();
            }
            let t = pick_target(&values, target, seed);
            let title = format!("{name} search for {t}  n={}  seed {seed}", opts.len);
            Ok((searcher(values, t, binary)?, title))
        },
        draw_array,
        search_summary,
    )
}
