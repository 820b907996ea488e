//! Simulated time.

/// A point in (or a span of) simulated time.
pub type Time = f64;

/// Time advance of a passive phase: the model never transitions on its own.
pub const INFINITY: Time = f64::INFINITY;

/// A time advance is usable if it is a non-negative number (infinity included).
pub fn is_valid_advance(duration: Time) -> bool {
    !duration.is_nan() && duration >= 0.0
}
