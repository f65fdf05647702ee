//! # Position Register
//!
//! A text run's x position is not always known while planning. After a run
//! of "the rest of the string" the next run has to start where that one ends,
//! and where it ends depends on font metrics that only the surface has. So a
//! coordinate is either a concrete number or a pending increment that is
//! folded into a real position once the interpreter knows where the previous
//! run stopped.

/// A coordinate in page units, possibly still waiting on an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate {
    /// A known position.
    Concrete(f64),
    /// An increment to add to the end of the previous run.
    Pending(f64),
}

impl Coordinate {
    /// "Continue exactly where the previous run ended."
    pub const ZERO_PENDING: Coordinate = Coordinate::Pending(0.0);

    /// Shift by `delta` without resolving. A pending coordinate stays pending.
    pub fn offset(self, delta: f64) -> Coordinate {
        match self {
            Coordinate::Concrete(v) => Coordinate::Concrete(v + delta),
            Coordinate::Pending(n) => Coordinate::Pending(n + delta),
        }
    }

    /// Fold into a number. `anchor` is only consulted for pending values.
    pub fn resolve(self, anchor: f64) -> f64 {
        match self {
            Coordinate::Concrete(v) => v,
            Coordinate::Pending(n) => n + anchor,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Coordinate::Pending(_))
    }
}

impl From<f64> for Coordinate {
    fn from(v: f64) -> Self {
        Coordinate::Concrete(v)
    }
}
