pub mod kind;
pub mod point;

pub use kind::*;
pub use point::*;
