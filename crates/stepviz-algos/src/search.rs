//! Searching a value in an array, one probe per step.

use stepviz_core::{ConfigError, Machine, Step};

use crate::array::{ArraySnapshot, Mark, Tape};

/// Result of a finished search. `index` is `None` when the target is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    pub index: Option<usize>,
    pub probes: usize,
}

/// Scans left to right.
#[derive(Debug, Clone)]
pub struct LinearSearch {
    tape: Tape,
    target: i32,
    next: usize,
}

impl LinearSearch {
    pub fn new(values: Vec<i32>, target: i32) -> Self {
        Self {
            tape: Tape::new(values),
            target,
            next: 0,
        }
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    fn outcome(&self, index: Option<usize>) -> SearchOutcome {
        SearchOutcome {
            index,
            probes: self.tape.comparisons,
        }
    }
}

impl Machine for LinearSearch {
    type Snapshot = ArraySnapshot;
    type Output = SearchOutcome;

    fn advance(&mut self) -> Step<SearchOutcome> {
        let i = self.next;
        if i >= self.tape.len() {
            return Step::Done(self.outcome(None));
        }
        self.tape.comparisons += 1;
        if self.tape.values[i] == self.target {
            self.tape.marks[i] = Mark::Found;
            return Step::Done(self.outcome(Some(i)));
        }
        self.tape.marks[i] = Mark::Discarded;
        self.next += 1;
        if self.next == self.tape.len() {
            Step::Done(self.outcome(None))
        } else {
            Step::Progress
        }
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

/// Halves a sorted array around its midpoint.
#[derive(Debug, Clone)]
pub struct BinarySearch {
    tape: Tape,
    target: i32,
    lo: usize,
    hi: usize,
}

impl BinarySearch {
    /// Fails unless `values` is sorted ascending.
    pub fn new(values: Vec<i32>, target: i32) -> Result<Self, ConfigError> {
        if values.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::parameter("values", "must be sorted ascending"));
        }
        let hi = values.len();
        Ok(Self {
            tape: Tape::new(values),
            target,
            lo: 0,
            hi,
        })
    }

    /// The half-open window still in play.
    pub fn window(&self) -> std::ops::Range<usize> {
        self.lo..self.hi
    }

    fn outcome(&self, index: Option<usize>) -> SearchOutcome {
        SearchOutcome {
            index,
            probes: self.tape.comparisons,
        }
    }
}

impl Machine for BinarySearch {
    type Snapshot = ArraySnapshot;
    type Output = SearchOutcome;

    fn advance(&mut self) -> Step<SearchOutcome> {
        if self.lo >= self.hi {
            return Step::Done(self.outcome(None));
        }
        self.tape.fade();
        let mid = self.lo + (self.hi - self.lo) / 2;
        self.tape.comparisons += 1;
        let v = self.tape.values[mid];
        if v == self.target {
            self.tape.marks[mid] = Mark::Found;
            return Step::Done(self.outcome(Some(mid)));
        }
        let dropped = if v < self.target {
            let d = self.lo..mid + 1;
            self.lo = mid + 1;
            d
        } else {
            let d = mid..self.hi;
            self.hi = mid;
            d
        };
        self.tape.marks[dropped].fill(Mark::Discarded);
        if self.lo < self.hi {
            let next = self.lo + (self.hi - self.lo) / 2;
            self.tape.marks[next] = Mark::Pivot;
            Step::Progress
        } else {
            Step::Done(self.outcome(None))
        }
    }

    fn snapshot(&self) -> ArraySnapshot {
        self.tape.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testutil::drive;

    #[test]
    fn linear_finds_first_occurrence() {
        let mut m = LinearSearch::new(vec![4, 8, 15, 8], 8);
        let (steps, out) = drive(&mut m);
        assert_eq!(out, SearchOutcome { index: Some(1), probes: 2 });
        assert_eq!(steps, 2);
        let snap = m.snapshot();
        assert_eq!(snap.marks[0], Mark::Discarded);
        assert_eq!(snap.marks[1], Mark::Found);
    }

    #[test]
    fn linear_miss_probes_everything() {
        let mut m = LinearSearch::new(vec![1, 2, 3], 9);
        let (_, out) = drive(&mut m);
        assert_eq!(out, SearchOutcome { index: None, probes: 3 });
        assert_eq!(m.snapshot().marked(Mark::Discarded).count(), 3);
    }

    #[test]
    fn empty_inputs_finish_without_probing() {
        let mut m = LinearSearch::new(Vec::new(), 1);
        assert_eq!(m.advance(), Step::Done(SearchOutcome { index: None, probes: 0 }));
        let mut m = BinarySearch::new(Vec::new(), 1).unwrap();
        assert_eq!(m.advance(), Step::Done(SearchOutcome { index: None, probes: 0 }));
    }

    #[test]
    fn binary_rejects_unsorted() {
        let err = BinarySearch::new(vec![1, 3, 2], 3).unwrap_err();
        assert!(matches!(err, ConfigError::Parameter { name: "values", .. }));
    }

    #[test]
    fn binary_narrows_window() {
        let values: Vec<i32> = (0..16).map(|v| v * 2).collect();
        let mut m = BinarySearch::new(values, 22).unwrap();
        assert_eq!(m.advance(), Step::Progress);
        assert_eq!(m.window(), 9..16);
        let (_, out) = drive(&mut m);
        assert_eq!(out.index, Some(11));
        assert!(out.probes <= 5);
    }

    proptest! {
        #[test]
        fn binary_agrees_with_std(mut values in prop::collection::vec(0i32..50, 0..40), target in 0i32..50) {
            values.sort();
            let mut m = BinarySearch::new(values.clone(), target).unwrap();
            let (_, out) = drive(&mut m);
            match out.index {
                Some(i) => prop_assert_eq!(values[i], target),
                None => prop_assert!(!values.contains(&target)),
            }
            let bound = usize::BITS - values.len().leading_zeros();
            prop_assert!(out.probes <= bound as usize);
        }
    }
}
