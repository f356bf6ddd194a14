pub mod clubs;
pub mod connection;
pub mod events;
pub mod models;
pub mod players;
pub mod point_rules;
pub mod results;
pub mod setup;
pub mod snapshots;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use models::*;
