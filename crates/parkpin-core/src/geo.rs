//! # Geo Module
//!
//! Coordinates and great-circle distance between them.
//!
//! ## Why One Decimal of Miles?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE DISPLAY PRECISION PROBLEM                                          │
//! │                                                                         │
//! │  Raw haversine output:                                                  │
//! │    0.46259183028474... miles        ❌ Useless on a phone screen        │
//! │                                                                         │
//! │  Consumer GPS accuracy is ~15-50 ft. Anything past the first decimal    │
//! │  of a mile is noise dressed up as precision.                            │
//! │                                                                         │
//! │  OUR SOLUTION: round once, here                                         │
//! │    distance_miles() returns 0.5 - already display-ready                 │
//! │    No caller ever re-rounds, so every surface shows the same number     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use parkpin_core::geo::{distance_miles, Coordinates};
//!
//! let car = Coordinates::new(37.7793, -122.4192);
//! let me = Coordinates::new(37.7810, -122.4110);
//!
//! assert_eq!(distance_miles(me, car), 0.5);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Constants
// =============================================================================

/// Mean Earth radius in statute miles, the haversine scale factor.
///
/// The app reports distances in miles, so the radius is baked in as miles
/// rather than converting from kilometers at every call site.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

// =============================================================================
// Coordinates
// =============================================================================

/// A WGS-84 position: latitude and longitude in decimal degrees.
///
/// ## Design Decisions
/// - **Copy**: two f64s, cheaper to copy than to borrow
/// - **No altitude**: the app answers "how far to my car", never "how high"
/// - **Unvalidated**: construction is infallible; the validation module
///   checks ranges at the points where sensor input enters the system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinates {
    /// Latitude in decimal degrees, negative south of the equator.
    pub lat: f64,
    /// Longitude in decimal degrees, negative west of Greenwich.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair from decimal degrees.
    ///
    /// ## Example
    /// ```rust
    /// use parkpin_core::geo::Coordinates;
    ///
    /// let pos = Coordinates::new(37.7749, -122.4194);
    /// assert_eq!(pos.lat, 37.7749);
    /// ```
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Coordinates { lat, lng }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

// =============================================================================
// Distance
// =============================================================================

/// Great-circle distance between two positions in miles, rounded to one
/// decimal place.
///
/// ## Algorithm
/// Standard haversine with the `atan2` form, which stays numerically stable
/// for near-antipodal points where the haversine term approaches 1.
///
/// ## Example
/// ```rust
/// use parkpin_core::geo::{distance_miles, Coordinates};
///
/// // One degree of longitude along the equator is about 69.1 miles
/// let a = Coordinates::new(0.0, 0.0);
/// let b = Coordinates::new(0.0, 1.0);
/// assert_eq!(distance_miles(a, b), 69.1);
/// ```
pub fn distance_miles(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_tenth(EARTH_RADIUS_MILES * c)
}

/// Rounds to one decimal place, half away from zero.
#[inline]
fn round_tenth(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let pos = Coordinates::new(37.7749, -122.4194);
        assert_eq!(distance_miles(pos, pos), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(37.7749, -122.4194);
        let b = Coordinates::new(40.7128, -74.0060);
        assert_eq!(distance_miles(a, b), distance_miles(b, a));
    }

    #[test]
    fn test_one_degree_along_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        assert_eq!(distance_miles(a, b), 69.1);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // A degree of latitude is the same length everywhere
        let a = Coordinates::new(45.0, 10.0);
        let b = Coordinates::new(46.0, 10.0);
        assert_eq!(distance_miles(a, b), 69.1);
    }

    #[test]
    fn test_san_francisco_to_los_angeles() {
        let sf = Coordinates::new(37.7749, -122.4194);
        let la = Coordinates::new(34.0522, -118.2437);
        let d = distance_miles(sf, la);
        // Commonly quoted as ~347 miles
        assert!((d - 347.4).abs() <= 0.1, "got {d}");
    }

    #[test]
    fn test_result_is_rounded_to_one_decimal() {
        let a = Coordinates::new(37.7793, -122.4192);
        let b = Coordinates::new(37.7810, -122.4110);
        let d = distance_miles(a, b);
        assert_eq!(d, (d * 10.0).round() / 10.0);
        assert_eq!(d, 0.5);
    }

    #[test]
    fn test_short_walk_rounds_to_zero() {
        // ~150 ft apart: below the display resolution
        let a = Coordinates::new(37.77490, -122.41940);
        let b = Coordinates::new(37.77530, -122.41940);
        assert_eq!(distance_miles(a, b), 0.0);
    }

    #[test]
    fn test_antipodal_points_are_stable() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 180.0);
        let d = distance_miles(a, b);
        // Half the circumference: pi * R
        assert!((d - 12437.6).abs() <= 0.1, "got {d}");
    }
}
