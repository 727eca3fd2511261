//! Degree-minute coordinate conversion.

use crate::decoder::leading_int;

/// Convert a `DDDMM.MMMM` degree-minute coordinate and hemisphere letter to
/// signed decimal degrees, rounded to 6 decimal places.
///
/// The trailing 7 characters are the minutes; whatever precedes them is the
/// whole-degree part. `S` and `W` negate the result, any other hemisphere
/// reads as positive. Inputs too short to carry a degree part, or with
/// non-numeric pieces, come out as NaN rather than an error.
pub fn to_decimal_degrees(coordinate: &str, hemisphere: &str) -> f64 {
    let split = coordinate.char_indices().nth_back(6).map_or(0, |(i, _)| i);
    let (degrees, minutes) = coordinate.split_at(split);

    let degrees = leading_int(degrees).map_or(f64::NAN, |d| d as f64);
    let minutes = minutes.parse::<f64>().unwrap_or(f64::NAN);

    let value = degrees + minutes / 60.0;
    let signed = if matches!(hemisphere, "S" | "W") { -value } else { value };

    (signed * 1_000_000.0).round() / 1_000_000.0
}
