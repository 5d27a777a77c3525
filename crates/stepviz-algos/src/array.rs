use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Highlight attached to one array slot at a step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mark {
    #[default]
    Idle,
    Compare,
    Swap,
    Pivot,
    Sorted,
    Found,
    Discarded,
}

impl Mark {
    /// Marks that only last for the step that set them.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Compare | Self::Swap | Self::Pivot)
    }
}

/// Render-ready view of an array machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArraySnapshot {
    pub values: Vec<i32>,
    /// One mark per value.
    pub marks: Vec<Mark>,
    pub comparisons: usize,
    pub writes: usize,
}

impl ArraySnapshot {
    pub fn marked(&self, mark: Mark) -> impl Iterator<Item = usize> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(move |(_, m)| **m == mark)
            .map(|(i, _)| i)
    }
}

/// Shared bookkeeping for the array machines: values, marks and counters.
#[derive(Debug, Clone)]
pub(crate) struct Tape {
    pub values: Vec<i32>,
    pub marks: Vec<Mark>,
    pub comparisons: usize,
    pub writes: usize,
}

impl Tape {
    pub fn new(values: Vec<i32>) -> Self {
        let marks = vec![Mark::Idle; values.len()];
        Self {
            values,
            marks,
            comparisons: 0,
            writes: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Drops the highlights of the previous step.
    pub fn fade(&mut self) {
        for m in &mut self.marks {
            if m.is_transient() {
                *m = Mark::Idle;
            }
        }
    }

    /// Compares `values[i] > values[j]`, marking both slots.
    pub fn greater(&mut self, i: usize, j: usize) -> bool {
        self.comparisons += 1;
        self.marks[i] = Mark::Compare;
        self.marks[j] = Mark::Compare;
        self.values[i] > self.values[j]
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.values.swap(i, j);
        self.writes += 2;
        self.marks[i] = Mark::Swap;
        self.marks[j] = Mark::Swap;
    }

    pub fn write(&mut self, i: usize, v: i32) {
        self.values[i] = v;
        self.writes += 1;
        self.marks[i] = Mark::Swap;
    }

    pub fn settle_all(&mut self) {
        self.marks.fill(Mark::Sorted);
    }

    pub fn snapshot(&self) -> ArraySnapshot {
        ArraySnapshot {
            values: self.values.clone(),
            marks: self.marks.clone(),
            comparisons: self.comparisons,
            writes: self.writes,
        }
    }
}

/// `len` values in `1..=100`, reproducible from `seed`.
pub fn random_values(len: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(1..=100)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_values_are_seeded() {
        let a = random_values(30, 7);
        assert_eq!(a.len(), 30);
        assert_eq!(a, random_values(30, 7));
        assert!(a.iter().all(|v| (1..=100).contains(v)));
    }

    #[test]
    fn fade_keeps_settled_marks() {
        let mut t = Tape::new(vec![3, 1, 2]);
        assert!(t.greater(0, 1));
        t.swap(0, 1);
        t.marks[2] = Mark::Sorted;
        t.fade();
        assert_eq!(t.marks, vec![Mark::Idle, Mark::Idle, Mark::Sorted]);
        assert_eq!(t.values, vec![1, 3, 2]);
        assert_eq!((t.comparisons, t.writes), (1, 2));
    }
}
