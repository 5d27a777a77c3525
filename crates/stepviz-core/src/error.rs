//! Error taxonomy shared by every machine.
//!
//! Expected terminal outcomes (no path, value not found, iteration budget
//! spent) are *not* errors; they are fields of each machine's output.

use crate::geom::Point;

/// A fatal fault raised while advancing a machine.
///
/// These signal broken invariants. A run that hits one is aborted and no
/// further snapshot is delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("predecessor chain from {from} does not reach the start within {limit} links")]
    PredecessorCycle { from: Point, limit: usize },
    #[error("machine already reached a terminal state")]
    Finished,
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// A rejected configuration, reported when a machine is constructed.
///
/// Nothing is silently corrected: callers fix the input and retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size {size} is outside {min}..={max}")]
    GridSize { size: i32, min: i32, max: i32 },
    #[error("{role} {point} is outside the {size}x{size} grid")]
    OutOfBounds {
        role: &'static str,
        point: Point,
        size: i32,
    },
    #[error("{role} {point} is on a wall")]
    OnWall { role: &'static str, point: Point },
    #[error("invalid parameter `{name}`: {reason}")]
    Parameter { name: &'static str, reason: String },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Parameter`].
    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Parameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let e = ConfigError::OnWall {
            role: "start",
            point: Point::new(1, 2),
        };
        assert_eq!(e.to_string(), "start (1, 2) is on a wall");

        let e = ConfigError::OutOfBounds {
            role: "end",
            point: Point::new(9, 0),
            size: 5,
        };
        assert_eq!(e.to_string(), "end (9, 0) is outside the 5x5 grid");

        let e = ConfigError::parameter("cooling_rate", "must be in (0, 1)");
        assert_eq!(
            e.to_string(),
            "invalid parameter `cooling_rate`: must be in (0, 1)"
        );
    }

    #[test]
    fn cycle_error_reports_origin() {
        let e = StepError::PredecessorCycle {
            from: Point::new(3, 3),
            limit: 25,
        };
        assert!(e.to_string().contains("(3, 3)"));
    }
}
