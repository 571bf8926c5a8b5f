#[allow(unused_imports)]
pub mod feed_client;
#[allow(unused_imports)]
pub mod player_store;
#[allow(unused_imports)]
pub mod projection_store;
#[allow(unused_imports)]
pub mod publisher;

#[allow(unused_imports)]
pub use feed_client::*;
#[allow(unused_imports)]
pub use player_store::*;
#[allow(unused_imports)]
pub use projection_store::*;
#[allow(unused_imports)]
pub use publisher::*;
