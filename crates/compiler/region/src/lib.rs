//! Source locations attached to reflected declarations and diagnostics.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

#[derive(Clone, Copy, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start: Position,
    pub end: Position,
}

impl Region {
    pub const fn zero() -> Self {
        Region {
            start: Position::new(0, 0),
            end: Position::new(0, 0),
        }
    }

    pub const fn new(start: Position, end: Position) -> Self {
        Region { start, end }
    }

    /// A region covering a whole line, as reported for elements without column information.
    pub const fn line(line: u32) -> Self {
        Region {
            start: Position::new(line, 0),
            end: Position::new(line, 0),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            // declarations from snapshots without locations
            write!(f, "…")
        } else {
            write!(
                f,
                "|L {}, C {} - L {}, C {}|",
                self.start.line, self.start.column, self.end.line, self.end.column,
            )
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.start.line + 1, self.start.column + 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_locations_stay_out_of_debug_output() {
        assert_eq!(format!("{:?}", Region::zero()), "…");
        assert_eq!(format!("{:?}", Region::line(4)), "|L 4, C 0 - L 4, C 0|");
        assert!(Region::default().is_zero());
    }

    #[test]
    fn display_is_one_based() {
        let region = Region::new(Position::new(9, 4), Position::new(9, 12));

        assert_eq!(region.to_string(), "10:5");
    }
}
