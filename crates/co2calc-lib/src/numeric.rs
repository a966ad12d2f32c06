/// Round to two decimal places, halves away from zero.
///
/// Every distance and emission value the library reports goes through this
/// helper so that derived values (comparison rows, credits) agree exactly
/// with the values they were computed from.
///
/// ```
/// use co2calc_lib::round2;
///
/// assert_eq!(round2(0.084), 0.08);
/// assert_eq!(round2(4.2288), 4.23);
/// ```
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
