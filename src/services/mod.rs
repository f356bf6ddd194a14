pub mod history;
pub mod results;
pub mod server;
pub mod snapshots;
