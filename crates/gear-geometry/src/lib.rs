//! Pure gear geometry: parameters, involute sampling, tooth and gear layout.
//!
//! Nothing in this crate talks to a modeling kernel. Profiles are plain point
//! and circle descriptions that `gear-ops` turns into sketch curves.

pub mod error;
pub mod involute;
pub mod params;
pub mod profile;
pub mod tooth;

pub use error::GeometryError;
pub use involute::{involute_point, involute_points, INVOLUTE_SAMPLES};
pub use params::*;
pub use profile::{GearProfile, RootShape};
pub use tooth::{build_tooth, RootConnection, ToothProfile};
