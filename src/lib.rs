// Concurrent database connection load probe
//
// Opens N connections at once, keeps each one idle for a while, then closes them.
// Useful to check max_connections and friends on a MySQL server.

pub mod connector;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod mycnf;

pub use connector::{Connection, Connector, MysqlConnector};
pub use descriptor::ConnectionDescriptor;
pub use driver::{run, run_worker, CompletionReport, RunConfig, WorkerOutcome};
pub use error::{ConfigError, WorkerError};
