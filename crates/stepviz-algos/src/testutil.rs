use stepviz_core::{Machine, Step};

/// Advances `m` until it finishes, returning the number of advances and the
/// output. Panics on failure or if the machine never stops.
pub fn drive<M: Machine>(m: &mut M) -> (usize, M::Output) {
    for n in 1..=1_000_000 {
        match m.advance() {
            Step::Progress => {}
            Step::Done(out) => return (n, out),
            Step::Failed(e) => panic!("machine failed: {e}"),
        }
    }
    panic!("machine did not finish");
}
