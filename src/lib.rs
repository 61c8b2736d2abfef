//! Power-of-two image downsampling and great-circle bearing utilities.
//!
//! The numeric core lives in [`bitmap::compute_reduction_factor`] and the
//! [`math`] module. Neither performs I/O. The remaining modules wrap them
//! with image decoding, GeoJSON place files and a place lookup table.
//!
//! ```
//! use geobits::bitmap::{compute_reduction_factor, FitPolicy};
//! use geobits::math::{cardinal_direction_for, normalize_bearing, CardinalDirection};
//!
//! assert_eq!(compute_reduction_factor(4000, 3000, 1000, FitPolicy::Under), 4);
//! assert_eq!(cardinal_direction_for(normalize_bearing(-10.0)), CardinalDirection::N);
//! ```

pub mod bitmap;
pub mod cli;
pub mod error;
pub mod geojson;
pub mod location;
pub mod logger;
pub mod math;
pub mod places;

pub use crate::error::{GeobitsError, Result};
pub use crate::math::{CardinalDirection, GeoPoint};
pub use crate::places::{City, NamedPlace, Place, Province};
