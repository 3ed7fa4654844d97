use std::fmt::{Debug, Display};

use crate::error::ConfigError;

/// Endpoint, credentials and schema shared read-only by every worker
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    host: String,
    port: u16,
    user: String,
    password: String,
    database: String,
}

impl ConnectionDescriptor {
    pub fn new(
        host: impl Into<String>,
        port: &str,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let host = non_empty("host", host.into())?;
        let user = non_empty("user", user.into())?;
        let password = non_empty("password", password.into())?;
        let database = non_empty("database", database.into())?;

        let port = non_empty("port", port.trim().to_string())?;
        let port: u16 = match port.parse() {
            Ok(p) if p != 0 => p,
            _ => return Err(ConfigError::InvalidPort(port)),
        };

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::EmptyField(field));
    }
    Ok(value)
}

// never print the password
impl Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}
