//! Source range wire format (spec §6): `"(l1,c1)-(l2,c2)"`, 0-based line/col.

use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub line: u32,
    pub column: u32,
}

impl Point {
    pub fn new(line: u32, column: u32) -> Self {
        Point { line, column }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start: Point, end: Point) -> Self {
        Range { start, end }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed range literal: {0:?}")]
pub struct RangeParseError(String);

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

impl std::str::FromStr for Range {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RangeParseError(s.to_string());
        let s = s.trim();
        let (start, end) = s.split_once('-').ok_or_else(bad)?;
        Ok(Range {
            start: parse_point(start).ok_or_else(bad)?,
            end: parse_point(end).ok_or_else(bad)?,
        })
    }
}

fn parse_point(s: &str) -> Option<Point> {
    let s = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (line, column) = s.split_once(',')?;
    Some(Point {
        line: line.trim().parse().ok()?,
        column: column.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_wire_format() {
        let r = Range::new(Point::new(1, 2), Point::new(3, 4));
        assert_eq!(r.to_string(), "(1,2)-(3,4)");
    }

    #[test]
    fn roundtrips_through_parse() {
        for s in ["(0,0)-(0,0)", "(12,34)-(56,78)", "(1,2)-(3,4)"] {
            let parsed: Range = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("garbage".parse::<Range>().is_err());
        assert!("(1,2)-(3,x)".parse::<Range>().is_err());
    }
}
