pub mod abenics;
pub mod config;
pub mod engrave;
pub mod extrude;
pub mod revolve;
pub mod sketch;
pub mod spur;
pub mod types;

pub use abenics::{generate_abenics, AbenicsOutput};
pub use config::GeneratorConfig;
pub use engrave::{EngraveConfig, EngraveSimulator};
pub use extrude::{execute_extrude, execute_symmetric_extrude};
pub use revolve::execute_revolve;
pub use sketch::{emit_profile, emit_tooth, EmittedSketch};
pub use spur::{generate_spur, SpurOutput};
pub use types::*;
