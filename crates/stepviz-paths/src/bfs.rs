//! Breadth-first reference searches.
//!
//! With unit edge costs, BFS distances are exact shortest-path lengths; the
//! A* machine's results are checked against them.

use std::collections::VecDeque;

use stepviz_core::{Point, Range};

use crate::field::UNKNOWN;
use crate::traits::Pather;

/// Number of moves from `from` to every point of `range`, row-major.
/// Unreached points hold [`UNKNOWN`].
pub fn bfs_distances<P: Pather>(pather: &P, range: Range, from: Point) -> Vec<i32> {
    let mut dist = vec![UNKNOWN; range.len()];
    let Some(si) = range.index(from) else {
        return dist;
    };
    dist[si] = 0;

    let mut queue: VecDeque<usize> = VecDeque::new();
    queue.push_back(si);
    let mut nbuf = Vec::with_capacity(4);

    while let Some(ci) = queue.pop_front() {
        let cp = range.point(ci);
        let next = dist[ci] + 1;
        nbuf.clear();
        pather.neighbors(cp, &mut nbuf);
        for &np in nbuf.iter() {
            let Some(ni) = range.index(np) else {
                continue;
            };
            if dist[ni] != UNKNOWN {
                continue;
            }
            dist[ni] = next;
            queue.push_back(ni);
        }
    }
    dist
}

/// Number of cells on a shortest path, endpoints included, or `None` when
/// `to` is unreachable.
pub fn shortest_path_len<P: Pather>(pather: &P, range: Range, from: Point, to: Point) -> Option<usize> {
    let ti = range.index(to)?;
    let d = bfs_distances(pather, range, from)[ti];
    (d != UNKNOWN).then(|| d as usize + 1)
}

/// Size of the connected component containing `from`.
pub fn reachable_count<P: Pather>(pather: &P, range: Range, from: Point) -> usize {
    bfs_distances(pather, range, from)
        .iter()
        .filter(|&&d| d != UNKNOWN)
        .count()
}
