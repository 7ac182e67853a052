pub mod postgres_store;
pub mod remote_sim;

pub use postgres_store::*;
pub use remote_sim::*;
