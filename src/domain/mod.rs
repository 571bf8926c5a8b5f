pub mod events;
pub mod match_aggregate;
pub mod match_event;
pub mod value_objects;

pub use events::*;
pub use match_aggregate::*;
pub use match_event::*;
pub use value_objects::*;
