// Credential fallback from a MySQL option file (~/.my.cnf)
//
// Only `user`, `password` and `host` are looked up, CLI values always win.
// Expected format:
//   [client]
//   user = bob
//   password = secret
//   host = db.example.com

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ConfigError;

/// Somewhere to read the option file text from
pub trait OptionFileSource {
    fn read(&self) -> Result<String, ConfigError>;
}

/// Option file on disk, `$HOME/.my.cnf` by default
///
/// The home directory is only looked up when the file is actually read.
pub struct OptionFile {
    path: Option<PathBuf>,
}

impl OptionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn in_home() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl OptionFileSource for OptionFile {
    fn read(&self) -> Result<String, ConfigError> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(".my.cnf"),
        };

        debug!("Reading credentials from {:?}", path);
        std::fs::read_to_string(&path).map_err(|source| ConfigError::OptionFile { path, source })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub user: String,
    pub password: String,
    pub host: String,
}

impl Credentials {
    /// Empty strings count as missing
    pub fn new(user: Option<String>, password: Option<String>, host: Option<String>) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            user: keep(user),
            password: keep(password),
            host: keep(host),
        }
    }

    fn is_complete(&self) -> bool {
        self.user.is_some() && self.password.is_some() && self.host.is_some()
    }

    /// Fill missing fields from `other`, keeping what is already set
    fn or(self, other: Credentials) -> Self {
        Self {
            user: self.user.or(other.user),
            password: self.password.or(other.password),
            host: self.host.or(other.host),
        }
    }
}

/// Extract `user`, `password` and `host` from option file text
///
/// Keys are matched as line prefixes, first matching line wins even if its
/// value is empty, in which case the key stays missing.
/// Lines without `=` are skipped.
pub fn parse(content: &str) -> Credentials {
    let mut creds = Credentials::default();

    for line in content.lines() {
        let line = line.trim();
        let Some((_, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        let slot = if line.starts_with("user") {
            &mut creds.user
        } else if line.starts_with("password") {
            &mut creds.password
        } else if line.starts_with("host") {
            &mut creds.host
        } else {
            continue;
        };

        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    Credentials::new(creds.user, creds.password, creds.host)
}

/// Merge CLI credentials with the option file
///
/// The file is only read when at least one field is missing.
pub fn resolve(
    cli: Credentials,
    source: &dyn OptionFileSource,
) -> Result<ResolvedCredentials, ConfigError> {
    let merged = if cli.is_complete() {
        cli
    } else {
        let content = source.read()?;
        cli.or(parse(&content))
    };

    match merged {
        Credentials {
            user: Some(user),
            password: Some(password),
            host: Some(host),
        } => Ok(ResolvedCredentials {
            user,
            password,
            host,
        }),
        partial => {
            let mut missing = Vec::new();
            if partial.user.is_none() {
                missing.push("user");
            }
            if partial.password.is_none() {
                missing.push("password");
            }
            if partial.host.is_none() {
                missing.push("host");
            }
            Err(ConfigError::MissingCredentials(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;

    struct InMemory {
        content: Option<&'static str>,
        reads: Cell<usize>,
    }

    impl InMemory {
        fn new(content: &'static str) -> Self {
            Self {
                content: Some(content),
                reads: Cell::new(0),
            }
        }

        fn unreadable() -> Self {
            Self {
                content: None,
                reads: Cell::new(0),
            }
        }
    }

    impl OptionFileSource for InMemory {
        fn read(&self) -> Result<String, ConfigError> {
            self.reads.set(self.reads.get() + 1);
            match self.content {
                Some(c) => Ok(c.to_string()),
                None => Err(ConfigError::OptionFile {
                    path: PathBuf::from("/nonexistent/.my.cnf"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    const MY_CNF: &str = "[client]\nuser = fileuser\npassword=filepass\n  host =  filehost  \n";

    #[test]
    fn parse_basic() {
        let creds = parse(MY_CNF);
        assert_eq!(creds.user, some("fileuser"));
        assert_eq!(creds.password, some("filepass"));
        assert_eq!(creds.host, some("filehost"));
    }

    #[test]
    fn parse_first_match_wins() {
        let creds = parse("user=first\nuser=second\nhost=a\nhost=b\n");
        assert_eq!(creds.user, some("first"));
        assert_eq!(creds.host, some("a"));
        assert_eq!(creds.password, None);
    }

    #[test]
    fn parse_ignores_garbage() {
        let creds = parse("# user=commented\n[client]\nuser\npassword = a=b\nport = 3306\n");
        assert_eq!(creds.user, None);
        // only the first '=' separates key and value
        assert_eq!(creds.password, some("a=b"));
        assert_eq!(creds.host, None);
    }

    #[test]
    fn parse_empty_first_value_wins() {
        let creds = parse("user =\nuser = bob\nusername = x\nhost = h\n");
        assert_eq!(creds.user, None);
        assert_eq!(creds.host, some("h"));
    }

    #[test]
    fn empty_first_value_is_missing() {
        let source = InMemory::new("user =\nuser = bob\npassword = p\nhost = h\n");

        let err = resolve(Credentials::default(), &source).unwrap_err();
        match err {
            ConfigError::MissingCredentials(missing) => assert_eq!(missing, vec!["user"]),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn home_file_not_needed_with_complete_cli() {
        let source = OptionFile::in_home();
        assert!(source.path().is_none());

        let cli = Credentials::new(some("u"), some("p"), some("h"));
        let resolved = resolve(cli, &source).unwrap();
        assert_eq!(resolved.host, "h");
    }

    #[test]
    fn cli_takes_precedence_per_field() {
        let source = InMemory::new(MY_CNF);
        let cli = Credentials::new(None, None, some("dbhost"));

        let resolved = resolve(cli, &source).unwrap();
        assert_eq!(resolved.host, "dbhost");
        assert_eq!(resolved.user, "fileuser");
        assert_eq!(resolved.password, "filepass");
        assert_eq!(source.reads.get(), 1);
    }

    #[test]
    fn complete_cli_skips_file() {
        let source = InMemory::unreadable();
        let cli = Credentials::new(some("u"), some("p"), some("h"));

        let resolved = resolve(cli, &source).unwrap();
        assert_eq!(resolved.user, "u");
        assert_eq!(source.reads.get(), 0);
    }

    #[test]
    fn empty_cli_values_are_missing() {
        let source = InMemory::new(MY_CNF);
        let cli = Credentials::new(some(""), some("clipass"), some(""));

        let resolved = resolve(cli, &source).unwrap();
        assert_eq!(resolved.user, "fileuser");
        assert_eq!(resolved.password, "clipass");
        assert_eq!(resolved.host, "filehost");
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let source = InMemory::unreadable();
        let cli = Credentials::new(some("u"), some("p"), None);

        let err = resolve(cli, &source).unwrap_err();
        assert!(matches!(err, ConfigError::OptionFile { .. }));
    }

    #[test]
    fn incomplete_after_merge() {
        let source = InMemory::new("user = fileuser\n");
        let cli = Credentials::new(None, None, some("dbhost"));

        let err = resolve(cli, &source).unwrap_err();
        match err {
            ConfigError::MissingCredentials(missing) => assert_eq!(missing, vec!["password"]),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn file_incomplete_but_cli_fills_gap() {
        let source = InMemory::new("user = fileuser\nhost = filehost\n");
        let cli = Credentials::new(None, some("clipass"), None);

        let resolved = resolve(cli, &source).unwrap();
        assert_eq!(resolved.password, "clipass");
        assert_eq!(resolved.user, "fileuser");
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MY_CNF.as_bytes()).unwrap();

        let source = OptionFile::new(file.path());
        let resolved = resolve(Credentials::default(), &source).unwrap();
        assert_eq!(resolved.user, "fileuser");
        assert_eq!(resolved.host, "filehost");
    }

    #[test]
    fn missing_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source = OptionFile::new(dir.path().join(".my.cnf"));

        let err = resolve(Credentials::default(), &source).unwrap_err();
        assert!(err.to_string().contains(".my.cnf"));
    }
}
