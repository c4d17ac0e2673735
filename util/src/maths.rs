//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value into the closed range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: PartialOrd
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Round a value to the given number of decimal places.
///
/// Used to remove floating point noise (e.g. `cos(90°) = 6e-17`) before a value is truncated to
/// an integer count.
pub fn snap<T>(value: T, decimals: i32) -> T
where
    T: Float
{
    let scale = T::from(10.0).unwrap_or_else(T::one).powi(decimals);
    (value * scale).round() / scale
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the range `(-180, 180]`.
pub fn wrap_deg_180<T>(value: T) -> T
where
    T: Float
{
    let full = T::from(360.0).unwrap_or_else(T::max_value);
    let half = T::from(180.0).unwrap_or_else(T::max_value);

    let wrapped = rem_euclid(value + half, full) - half;

    // rem_euclid gives [-180, 180), flip the lower bound over to keep +180
    if wrapped == -half { half } else { wrapped }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 180f64), (1000f64, 2000f64), 90.0), 1500.0);
        assert_eq!(lin_map((1000f64, 2000f64), (0f64, 180f64), 2000.0), 180.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 3), 3);
        assert_eq!(clamp(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(clamp(2u16, 1, 3), 2);
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(89.99999999999999f64, 6), 90.0);
        assert_eq!(snap(49.9999999999f64, 6), 50.0);
        assert_eq!(snap(0.1234564f64, 6), 0.123456);
    }

    #[test]
    fn test_wrap_deg_180() {
        assert_eq!(wrap_deg_180(190f64), -170.0);
        assert_eq!(wrap_deg_180(-190f64), 170.0);
        assert_eq!(wrap_deg_180(180f64), 180.0);
        assert_eq!(wrap_deg_180(-180f64), 180.0);
        assert_eq!(wrap_deg_180(45f64), 45.0);
        assert_eq!(wrap_deg_180(720f64), 0.0);
    }
}
