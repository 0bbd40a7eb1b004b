//! Points with real algebraic coordinates.

use super::RealAlgebraicNumber;
use std::fmt;
use std::ops::Index;

/// An ordered tuple of real algebraic numbers.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RealAlgebraicPoint {
    coords: Vec<RealAlgebraicNumber>,
}

impl RealAlgebraicPoint {
    /// Create a point from its coordinates.
    pub fn new(coords: Vec<RealAlgebraicNumber>) -> Self {
        Self { coords }
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Check whether the point has no coordinates.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Append a coordinate.
    pub fn push(&mut self, value: RealAlgebraicNumber) {
        self.coords.push(value);
    }

    /// Insert a coordinate in front.
    pub fn prepend(&mut self, value: RealAlgebraicNumber) {
        self.coords.insert(0, value);
    }

    /// Coordinate access.
    pub fn get(&self, i: usize) -> Option<&RealAlgebraicNumber> {
        self.coords.get(i)
    }

    /// Iterate over the coordinates.
    pub fn iter(&self) -> std::slice::Iter<'_, RealAlgebraicNumber> {
        self.coords.iter()
    }

    /// The coordinates as a slice.
    pub fn as_slice(&self) -> &[RealAlgebraicNumber] {
        &self.coords
    }
}

impl Index<usize> for RealAlgebraicPoint {
    type Output = RealAlgebraicNumber;

    fn index(&self, i: usize) -> &RealAlgebraicNumber {
        &self.coords[i]
    }
}

impl<'a> IntoIterator for &'a RealAlgebraicPoint {
    type Item = &'a RealAlgebraicNumber;
    type IntoIter = std::slice::Iter<'a, RealAlgebraicNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.coords.iter()
    }
}

impl FromIterator<RealAlgebraicNumber> for RealAlgebraicPoint {
    fn from_iter<I: IntoIterator<Item = RealAlgebraicNumber>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for RealAlgebraicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for RealAlgebraicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn ran(n: i64) -> RealAlgebraicNumber {
        RealAlgebraicNumber::from_rational(BigRational::from_integer(BigInt::from(n)), false)
    }

    #[test]
    fn test_push_prepend() {
        let mut p = RealAlgebraicPoint::default();
        p.push(ran(1));
        p.prepend(ran(0));
        assert_eq!(p.dim(), 2);
        assert_eq!(p[0], ran(0));
        assert_eq!(p.to_string(), "((NR 0), (NR 1))");
    }
}
