pub mod fallback;
pub mod queries;
pub mod streaming;
