//! Comparison sorts that perform one comparison (and the swap or write it
//! triggers) per step.

use stepviz_core::{Machine, Step};

use crate::array::{ArraySnapshot, Mark, Tape};

/// Result of a finished sort.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortOutcome {
    pub values: Vec<i32>,
    pub comparisons: usize,
    pub writes: usize,
}

fn finish(tape: &mut Tape) -> Step<SortOutcome> {
    tape.fade();
    tape.settle_all();
    Step::Done(SortOutcome {
        values: tape.values.clone(),
        comparisons: tape.comparisons,
        writes: tape.writes,
    })
}

/// The sorting algorithms available to a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortKind {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
}

impl SortKind {
    pub const ALL: [SortKind; 5] = [
        Self::Bubble,
        Self::Selection,
        Self::Insertion,
        Self::Merge,
        Self::Quick,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Selection => "selection",
            Self::Insertion => "insertion",
            Self::Merge => "merge",
            Self::Quick => "quick",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// A boxed machine sorting `values` with this algorithm.
    pub fn sorter(self, values: Vec<i32>) -> Sorter {
        match self {
            Self::Bubble => Box::new(BubbleSort::new(values)),
            Self::Selection => Box::new(SelectionSort::new(values)),
            Self::Insertion => Box::new(InsertionSort::new(values)),
            Self::Merge => Box::new(MergeSort::new(values)),
            Self::Quick => Box::new(QuickSort::new(values)),
        }
    }
}

/// Any sorting machine, chosen at runtime.
pub type Sorter = Box<dyn Machine<Snapshot = ArraySnapshot, Output = SortOutcome> + Send>;

// ---------------------------------------------------------------------------
// Bubble
// ---------------------------------------------------------------------------

/// Adjacent compare-and-swap passes; stops after a pass without swaps.
#[derive(Debug, Clone)]
pub struct BubbleSort {
    tape: Tape,
    pass: usize,
    j: usize,
    swapped: bool,
}

impl BubbleSort {
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            tape: Tape::new(values),
            pass: 0,
            j: 0,
            swapped: false,
        }
    }
}

impl Machine for BubbleSort {
    type Snapshot = ArraySnapshot;
    type Output = SortOutcome;

    fn advance(&mut self) -> Step<SortOutcome> {
        let n = self.tape.len();
        if n < 2 || self.pass >= n - 1 {
            return finish(&mut self.tape);
        }
        self.tape.fade();
        let j = self.j;
        if self.tape.greater(j, j + 1) {
            self.tape.swap(j, j + 1);
            self.swapped = true;
        }
        self.j += 1;
        if self.j >= n - 1 - self.pass {
            self.tape.marks[n - 1 - self.pass] = Mark::Sorted;
            self.pass += 1;
            self.j = 0;
            if !self.swapped || self.pass >= n - 1 {
                return finish(&mut self.tape);
            }
            self.swapped = false;
        }
        Step::Progress
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Scans for the minimum of the unsorted suffix, then swaps it into place.
#[derive(Debug, Clone)]
pub struct SelectionSort {
    tape: Tape,
    i: usize,
    j: usize,
    min: usize,
}

impl SelectionSort {
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            tape: Tape::new(values),
            i: 0,
            j: 1,
            min: 0,
        }
    }
}

impl Machine for SelectionSort {
    type Snapshot = ArraySnapshot;
    type Output = SortOutcome;

    fn advance(&mut self) -> Step<SortOutcome> {
        let n = self.tape.len();
        if n < 2 || self.i >= n - 1 {
            return finish(&mut self.tape);
        }
        self.tape.fade();
        if self.tape.greater(self.min, self.j) {
            self.min = self.j;
        }
        self.tape.marks[self.min] = Mark::Pivot;
        self.j += 1;
        if self.j == n {
            self.tape.swap(self.i, self.min);
            self.tape.marks[self.i] = Mark::Sorted;
            self.i += 1;
            if self.i >= n - 1 {
                return finish(&mut self.tape);
            }
            self.min = self.i;
            self.j = self.i + 1;
        }
        Step::Progress
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

/// Sinks each element into the sorted prefix by adjacent swaps.
#[derive(Debug, Clone)]
pub struct InsertionSort {
    tape: Tape,
    i: usize,
    j: usize,
}

impl InsertionSort {
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            tape: Tape::new(values),
            i: 1,
            j: 1,
        }
    }

    fn next_key(&mut self) -> bool {
        self.i += 1;
        self.j = self.i;
        self.i < self.tape.len()
    }
}

impl Machine for InsertionSort {
    type Snapshot = ArraySnapshot;
    type Output = SortOutcome;

    fn advance(&mut self) -> Step<SortOutcome> {
        if self.i >= self.tape.len() {
            return finish(&mut self.tape);
        }
        self.tape.fade();
        let j = self.j;
        let more = if self.tape.greater(j - 1, j) {
            self.tape.swap(j - 1, j);
            self.j -= 1;
            self.j > 0 || self.next_key()
        } else {
            self.next_key()
        };
        if more {
            Step::Progress
        } else {
            finish(&mut self.tape)
        }
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Bottom-up merge sort writing one merged element per step.
#[derive(Debug, Clone)]
pub struct MergeSort {
    tape: Tape,
    aux: Vec<i32>,
    width: usize,
    lo: usize,
    mid: usize,
    hi: usize,
    l: usize,
    r: usize,
    k: usize,
    active: bool,
}

impl MergeSort {
    pub fn new(values: Vec<i32>) -> Self {
        let mut m = Self {
            tape: Tape::new(values),
            aux: Vec::new(),
            width: 1,
            lo: 0,
            mid: 0,
            hi: 0,
            l: 0,
            r: 0,
            k: 0,
            active: false,
        };
        m.active = m.next_run();
        m
    }

    /// Positions on the next pair of runs to merge. False once a single run
    /// spans the whole array.
    fn next_run(&mut self) -> bool {
        let n = self.tape.len();
        loop {
            if self.width >= n {
                return false;
            }
            if self.lo + self.width < n {
                self.mid = self.lo + self.width;
                self.hi = (self.lo + 2 * self.width).min(n);
                self.aux.clear();
                self.aux
                    .extend_from_slice(&self.tape.values[self.lo..self.hi]);
                self.l = self.lo;
                self.r = self.mid;
                self.k = self.lo;
                return true;
            }
            self.width *= 2;
            self.lo = 0;
        }
    }
}

impl Machine for MergeSort {
    type Snapshot = ArraySnapshot;
    type Output = SortOutcome;

    fn advance(&mut self) -> Step<SortOutcome> {
        if !self.active {
            return finish(&mut self.tape);
        }
        self.tape.fade();
        let (l, r, lo) = (self.l, self.r, self.lo);
        let take_left = if l < self.mid && r < self.hi {
            self.tape.comparisons += 1;
            self.aux[l - lo] <= self.aux[r - lo]
        } else {
            l < self.mid
        };
        let v = if take_left {
            self.l += 1;
            self.aux[l - lo]
        } else {
            self.r += 1;
            self.aux[r - lo]
        };
        self.tape.write(self.k, v);
        self.k += 1;
        if self.k == self.hi {
            self.lo = self.hi;
            self.active = self.next_run();
            if !self.active {
                return finish(&mut self.tape);
            }
        }
        Step::Progress
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

// ---------------------------------------------------------------------------
// Quick
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Partition {
    lo: usize,
    hi: usize,
    store: usize,
    scan: usize,
}

/// Lomuto quicksort over an explicit stack of inclusive ranges. The last
/// element of each range is its pivot.
#[derive(Debug, Clone)]
pub struct QuickSort {
    tape: Tape,
    ranges: Vec<(usize, usize)>,
    current: Option<Partition>,
}

impl QuickSort {
    pub fn new(values: Vec<i32>) -> Self {
        let n = values.len();
        let mut ranges = Vec::new();
        if n >= 2 {
            ranges.push((0, n - 1));
        }
        Self {
            tape: Tape::new(values),
            ranges,
            current: None,
        }
    }

    fn push_range(&mut self, lo: usize, hi: usize) {
        if lo < hi {
            self.ranges.push((lo, hi));
        } else if lo == hi {
            self.tape.marks[lo] = Mark::Sorted;
        }
    }
}

impl Machine for QuickSort {
    type Snapshot = ArraySnapshot;
    type Output = SortOutcome;

    fn advance(&mut self) -> Step<SortOutcome> {
        let mut p = match self.current {
            Some(p) => p,
            None => match self.ranges.pop() {
                Some((lo, hi)) => Partition {
                    lo,
                    hi,
                    store: lo,
                    scan: lo,
                },
                None => return finish(&mut self.tape),
            },
        };
        self.tape.fade();

        if p.scan < p.hi {
            if self.tape.greater(p.hi, p.scan) {
                self.tape.swap(p.store, p.scan);
                p.store += 1;
            }
            p.scan += 1;
            self.tape.marks[p.hi] = Mark::Pivot;
            self.current = Some(p);
            return Step::Progress;
        }

        // Scan done: drop the pivot between the two halves.
        self.tape.swap(p.store, p.hi);
        self.tape.marks[p.store] = Mark::Sorted;
        self.current = None;
        if p.store < p.hi {
            self.push_range(p.store + 1, p.hi);
        }
        if p.store > p.lo {
            self.push_range(p.lo, p.store - 1);
        }
        if self.ranges.is_empty() {
            return finish(&mut self.tape);
        }
        Step::Progress
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::array::random_values;
    use crate::testutil::drive;

    fn sorted(mut v: Vec<i32>) -> Vec<i32> {
        v.sort();
        v
    }

    fn inversions(v: &[i32]) -> usize {
        let mut n = 0;
        for i in 0..v.len() {
            for j in i + 1..v.len() {
                if v[i] > v[j] {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn every_kind_sorts() {
        let input = random_values(40, 3);
        for kind in SortKind::ALL {
            let mut m = kind.sorter(input.clone());
            let (_, out) = drive(&mut m);
            assert_eq!(out.values, sorted(input.clone()), "{}", kind.name());
            let snap = m.snapshot();
            assert_eq!(snap.values, out.values);
            assert!(snap.marks.iter().all(|&m| m == Mark::Sorted));
        }
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in SortKind::ALL {
            assert_eq!(SortKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SortKind::from_name("bogo"), None);
    }

    #[test]
    fn trivial_inputs_finish_on_first_step() {
        for kind in SortKind::ALL {
            for input in [vec![], vec![7]] {
                let mut m = kind.sorter(input.clone());
                let (steps, out) = drive(&mut m);
                assert_eq!(steps, 1);
                assert_eq!(out.values, input);
                assert_eq!(out.comparisons, 0);
            }
        }
    }

    #[test]
    fn bubble_stops_early_on_sorted_input() {
        let mut m = BubbleSort::new(vec![1, 2, 3, 4, 5]);
        let (steps, out) = drive(&mut m);
        assert_eq!(out.comparisons, 4);
        assert_eq!(steps, 4);
        assert_eq!(out.writes, 0);
    }

    #[test]
    fn selection_always_compares_every_pair() {
        let mut m = SelectionSort::new(vec![5, 4, 3, 2, 1, 0]);
        let (steps, out) = drive(&mut m);
        assert_eq!(out.comparisons, 15);
        assert_eq!(steps, 15);
    }

    #[test]
    fn insertion_writes_track_inversions() {
        let input = random_values(25, 11);
        let mut m = InsertionSort::new(input.clone());
        let (_, out) = drive(&mut m);
        assert_eq!(out.writes, 2 * inversions(&input));
    }

    #[test]
    fn merge_writes_once_per_element_per_level() {
        let mut m = MergeSort::new(random_values(16, 5));
        let (steps, out) = drive(&mut m);
        // Four levels of sixteen writes.
        assert_eq!(out.writes, 64);
        assert_eq!(steps, 64);
        assert!(out.comparisons <= 64);
    }

    #[test]
    fn quick_marks_pivot_while_partitioning() {
        let mut m = QuickSort::new(vec![3, 1, 2]);
        assert_eq!(m.advance(), Step::Progress);
        let snap = m.snapshot();
        assert_eq!(snap.marks[2], Mark::Pivot);
        assert_eq!(snap.comparisons, 1);
    }

    #[test]
    fn steps_are_observable() {
        let input = random_values(20, 9);
        for kind in SortKind::ALL {
            let mut m = kind.sorter(input.clone());
            let mut prev = m.snapshot();
            loop {
                let step = m.advance();
                let snap = m.snapshot();
                if matches!(step, Step::Progress) {
                    assert_ne!(snap, prev, "{} made a silent step", kind.name());
                    prev = snap;
                } else {
                    break;
                }
            }
        }
    }

    proptest! {
        #[test]
        fn sorts_match_std(values in prop::collection::vec(-20i32..20, 0..30)) {
            for kind in SortKind::ALL {
                let mut m = kind.sorter(values.clone());
                let (steps, out) = drive(&mut m);
                prop_assert_eq!(&out.values, &sorted(values.clone()));
                prop_assert!(steps >= out.comparisons);
            }
        }
    }
}
