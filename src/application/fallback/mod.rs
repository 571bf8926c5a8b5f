pub mod errors;
pub mod mappings;
pub mod normalizer;

pub use errors::*;
pub use mappings::*;
pub use normalizer::*;
