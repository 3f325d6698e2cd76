pub mod engine;
pub mod render;
pub mod types;

pub use engine::AdviceEngine;
pub use types::*;
