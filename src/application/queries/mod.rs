pub mod match_projector;

pub use match_projector::*;
