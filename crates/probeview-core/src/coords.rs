//! Coordinate formatting for the readout panel and the export action

use serde::{Deserialize, Serialize};

/// Decimal places shown in the coordinate panel
pub const DISPLAY_DECIMALS: usize = 2;

/// Decimal places used when exporting coordinates
pub const EXPORT_DECIMALS: usize = 3;

/// A cartesian axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// Format a value with a fixed number of decimals.
///
/// Ties round away from zero (`3.125` reads "3.13"). Values that round to
/// zero print without a sign, so a marker resting on an axis never reads
/// "-0.00".
pub fn format_fixed(value: f32, decimals: usize) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (f64::from(value) * scale).round() / scale;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", decimals, rounded)
}

/// Panel fields for a position, x/y/z at display precision
pub fn display_fields(position: [f32; 3]) -> [String; 3] {
    position.map(|v| format_fixed(v, DISPLAY_DECIMALS))
}

/// Copyable text for a position: `(x, y, z)` at export precision
pub fn export_string(position: [f32; 3]) -> String {
    let [x, y, z] = position.map(|v| format_fixed(v, EXPORT_DECIMALS));
    format!("({}, {}, {})", x, y, z)
}

/// Parse a user-typed coordinate, accepting a decimal comma
pub fn parse_coordinate(text: &str) -> Option<f32> {
    let normalized = text.trim().replace(',', ".");
    normalized.parse::<f32>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_fields() {
        assert_eq!(display_fields([3.5, 1.0, 0.0]), ["3.50", "1.00", "0.00"]);
        assert_eq!(display_fields([3.52, 1.10, -0.02]), ["3.52", "1.10", "-0.02"]);
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        assert_eq!(format_fixed(-0.0, 2), "0.00");
        assert_eq!(format_fixed(-0.001, 2), "0.00");
        assert_eq!(format_fixed(-0.001, 3), "-0.001");
        assert_eq!(format_fixed(-0.005, 2), "0.00");
        assert_eq!(format_fixed(-0.0004, 3), "0.000");
        assert_eq!(format_fixed(-0.006, 2), "-0.01");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(format_fixed(3.125, 2), "3.13");
        assert_eq!(format_fixed(-3.125, 2), "-3.13");
        assert_eq!(format_fixed(0.0625, 3), "0.063");
        assert_eq!(format_fixed(0.5, 0), "1");
    }

    #[test]
    fn test_export_string() {
        assert_eq!(export_string([3.52, 1.10, -0.02]), "(3.520, 1.100, -0.020)");
        assert_eq!(export_string([0.0, 0.8, -1.2]), "(0.000, 0.800, -1.200)");
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate(" 1.25 "), Some(1.25));
        assert_eq!(parse_coordinate("-0,5"), Some(-0.5));
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate("inf"), None);
    }
}
