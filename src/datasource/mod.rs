pub mod connection;
pub mod pool;
pub mod resource;

pub use connection::{Connection, Statement};
pub use pool::{DataSource, Target};
pub use resource::{Release, ReleasePolicy, Scoped};
