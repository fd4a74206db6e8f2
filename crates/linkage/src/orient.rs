//! Orientation disambiguator for PLLP branch choice.
//!
//! Convention: for points `(a, b, c)` the turn is taken from the sign of
//! `(b - a) × (c - b)`; a non-negative sign is `Clockwise`, so collinear input
//! is clockwise and never an error.

use nalgebra::Vector2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

/// Signed area of the parallelogram spanned by `a` and `b`.
#[inline]
pub fn parallelogram_area(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[inline]
pub fn turn(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> Turn {
    if parallelogram_area(b - a, c - b) < 0.0 {
        Turn::CounterClockwise
    } else {
        Turn::Clockwise
    }
}

#[inline]
pub fn is_clockwise(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> bool {
    turn(a, b, c) == Turn::Clockwise
}

/// Order two reference joints so that `(first, second, target)` turns clockwise.
///
/// The pair is normalized to ascending ids before the test, so `(a, b)` and
/// `(b, a)` always give the same answer; collinear pairs stay ascending.
pub fn orient_pair<F>(a: usize, b: usize, target: usize, pos: F) -> (usize, usize)
where
    F: Fn(usize) -> Vector2<f64>,
{
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if is_clockwise(pos(lo), pos(hi), pos(target)) {
        (lo, hi)
    } else {
        (hi, lo)
    }
}
