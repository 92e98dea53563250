use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a simulated node within the topology hierarchy, outermost
/// level first: `(cell, rack)` in the one-way cell topology, `(leaf, host)`
/// in the spine-leaf topology. The number of components (arity) is fixed for
/// the lifetime of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate(pub Vec<u32>);

impl Coordinate {
    pub fn new(components: Vec<u32>) -> Self {
        Self(components)
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// True when the first `level` components of both coordinates are equal.
    /// Level 1 compares only the outermost component; level == arity compares
    /// the whole coordinate.
    pub fn prefix_matches(&self, other: &Coordinate, level: usize) -> bool {
        self.0.iter().take(level).eq(other.0.iter().take(level))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_per_level() {
        let a = Coordinate::new(vec![2, 5]);
        let b = Coordinate::new(vec![2, 7]);
        assert!(a.prefix_matches(&b, 1));
        assert!(!a.prefix_matches(&b, 2));
        assert!(a.prefix_matches(&a, 2));
    }

    #[test]
    fn display_is_tuple_like() {
        assert_eq!(Coordinate::new(vec![1, 4]).to_string(), "(1,4)");
    }
}
