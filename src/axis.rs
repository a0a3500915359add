//! Axis orientation.
//!
//! The transform pipeline works on east, north, up tuples internally. A
//! definition may declare another native orientation with `+axis=<xyz>`,
//! three codes drawn from `e`, `w`, `n`, `s`, `u`, `d`, one per axis pair.
//! For example `+axis=neu` is northing, easting, up.

use std::fmt;

use crate::error::ParseError;
use crate::params::ParamList;

/// Direction of one native axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisDirection {
    East,
    West,
    North,
    South,
    Up,
    Down,
}

impl AxisDirection {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'e' => Some(AxisDirection::East),
            'w' => Some(AxisDirection::West),
            'n' => Some(AxisDirection::North),
            's' => Some(AxisDirection::South),
            'u' => Some(AxisDirection::Up),
            'd' => Some(AxisDirection::Down),
            _ => None,
        }
    }

    /// Single-letter code of this direction.
    pub fn code(self) -> char {
        match self {
            AxisDirection::East => 'e',
            AxisDirection::West => 'w',
            AxisDirection::North => 'n',
            AxisDirection::South => 's',
            AxisDirection::Up => 'u',
            AxisDirection::Down => 'd',
        }
    }

    /// Canonical component index (east, north, up) and sign of this axis.
    fn canonical(self) -> (usize, f64) {
        match self {
            AxisDirection::East => (0, 1.0),
            AxisDirection::West => (0, -1.0),
            AxisDirection::North => (1, 1.0),
            AxisDirection::South => (1, -1.0),
            AxisDirection::Up => (2, 1.0),
            AxisDirection::Down => (2, -1.0),
        }
    }
}

impl fmt::Display for AxisDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Native orientation of the three coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisOrder {
    directions: [AxisDirection; 3],
}

impl AxisOrder {
    /// The canonical east, north, up orientation.
    pub const ENU: AxisOrder = AxisOrder {
        directions: [AxisDirection::East, AxisDirection::North, AxisDirection::Up],
    };

    /// Parses a three-letter axis string such as `enu` or `swd`.
    ///
    /// Each canonical axis pair must appear exactly once; `eeu` or `end`
    /// are inconsistent and rejected.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let bad = || ParseError::InvalidParameter(format!("axis={text}: expected three of ewnsud, one per axis"));
        let mut directions = [AxisDirection::East; 3];
        let mut count = 0;
        let mut seen = [false; 3];
        for code in text.chars() {
            if count == 3 {
                return Err(bad());
            }
            let dir = AxisDirection::from_code(code).ok_or_else(bad)?;
            let (axis, _) = dir.canonical();
            if seen[axis] {
                return Err(bad());
            }
            seen[axis] = true;
            directions[count] = dir;
            count += 1;
        }
        if count != 3 {
            return Err(bad());
        }
        Ok(AxisOrder { directions })
    }

    /// Resolves `+axis`, defaulting to east, north, up.
    pub fn resolve(params: &ParamList) -> Result<Self, ParseError> {
        match params.value("axis") {
            Some(text) => Self::parse(text),
            None => Ok(Self::ENU),
        }
    }

    /// The three axis directions in native order.
    pub fn directions(&self) -> [AxisDirection; 3] {
        self.directions
    }

    pub fn is_enu(&self) -> bool {
        *self == Self::ENU
    }

    /// Rewrites a native tuple into east, north, up order.
    pub fn normalize(&self, x: &mut f64, y: &mut f64, z: &mut f64) {
        if self.is_enu() {
            return;
        }
        let native = [*x, *y, *z];
        let mut canonical = [0.0; 3];
        for (slot, dir) in self.directions.iter().enumerate() {
            let (axis, sign) = dir.canonical();
            canonical[axis] = sign * native[slot];
        }
        *x = canonical[0];
        *y = canonical[1];
        *z = canonical[2];
    }

    /// Rewrites an east, north, up tuple back into native order.
    pub fn denormalize(&self, x: &mut f64, y: &mut f64, z: &mut f64) {
        if self.is_enu() {
            return;
        }
        let canonical = [*x, *y, *z];
        let mut native = [0.0; 3];
        for (slot, dir) in self.directions.iter().enumerate() {
            let (axis, sign) = dir.canonical();
            native[slot] = sign * canonical[axis];
        }
        *x = native[0];
        *y = native[1];
        *z = native[2];
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dir in &self.directions {
            write!(f, "{dir}")?;
        }
        Ok(())
    }
}
