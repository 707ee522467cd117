//! Port traits: the boundary between the domain and the outside world.

pub mod config_port;
pub mod price_feed;
pub mod report_port;
