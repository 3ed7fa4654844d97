use std::time::Duration;

use anyhow::Context;
use log::debug;
use mysql::{Conn, OptsBuilder};

use crate::descriptor::ConnectionDescriptor;

/// An open database connection. Dropping it closes it.
pub trait Connection {
    /// Round-trip to the server
    fn ping(&mut self) -> anyhow::Result<()>;
}

/// Opens connections described by a `ConnectionDescriptor`
///
/// Shared by every worker thread, hence `Sync`.
pub trait Connector: Sync {
    type Conn: Connection;

    fn connect(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<Self::Conn>;
}

/// Blocking MySQL client
pub struct MysqlConnector {
    timeout: Duration,
}

impl MysqlConnector {
    /// `timeout` is used for connect, read and write
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn opts(&self, descriptor: &ConnectionDescriptor) -> OptsBuilder {
        OptsBuilder::new()
            .ip_or_hostname(Some(descriptor.host()))
            .tcp_port(descriptor.port())
            .user(Some(descriptor.user()))
            .pass(Some(descriptor.password()))
            .db_name(Some(descriptor.database()))
            .tcp_connect_timeout(Some(self.timeout))
            .read_timeout(Some(self.timeout))
            .write_timeout(Some(self.timeout))
    }
}

impl Connector for MysqlConnector {
    type Conn = MysqlConnection;

    fn connect(&self, descriptor: &ConnectionDescriptor) -> anyhow::Result<MysqlConnection> {
        let conn = Conn::new(self.opts(descriptor))
            .with_context(|| format!("Can't connect to {descriptor}"))?;
        Ok(MysqlConnection { conn })
    }
}

pub struct MysqlConnection {
    conn: Conn,
}

impl Connection for MysqlConnection {
    fn ping(&mut self) -> anyhow::Result<()> {
        self.conn.ping().context("ping failed")
    }
}

impl Drop for MysqlConnection {
    fn drop(&mut self) {
        // mysql::Conn sends COM_QUIT on drop
        debug!("Releasing connection {}", self.conn.connection_id());
    }
}
