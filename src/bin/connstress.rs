// Open many MySQL connections concurrently and keep them alive
//
// Usage:
//   connstress --threads 200 --duration 30
//
// host, user and password default to the values in ~/.my.cnf

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use connstress::mycnf::{self, Credentials, OptionFile};
use connstress::{
    CompletionReport, ConfigError, ConnectionDescriptor, Connector, MysqlConnector, RunConfig,
};

const AFTER_HELP: &str = r"Credentials:
    --host, --user and --password fall back to ~/.my.cnf (or --defaults-file)
    Only `user = `, `password = ` and `host = ` lines are read, first match wins
";

#[derive(Parser, Debug)]
#[command(author, version, about = "Concurrent MySQL connections load probe", long_about = None, after_help = AFTER_HELP)]
struct Cli {
    #[arg(long, help = "MySQL server host (overrides ~/.my.cnf if set)")]
    host: Option<String>,

    #[arg(long, default_value = "3306", help = "MySQL server port")]
    port: String,

    #[arg(long, help = "MySQL username (overrides ~/.my.cnf if set)")]
    user: Option<String>,

    #[arg(long, help = "MySQL password (overrides ~/.my.cnf if set)")]
    password: Option<String>,

    #[arg(long, default_value = "test", help = "MySQL database name")]
    database: String,

    #[arg(long, default_value = "10", help = "Number of concurrent connections")]
    threads: NonZeroUsize,

    #[arg(long, default_value_t = 10, help = "Duration to keep connections alive (in seconds)")]
    duration: u64,

    #[arg(long, default_value_t = 30, help = "Connect, read and write timeout (in seconds)")]
    timeout: u64,

    #[arg(long, help = "Option file to read credentials from instead of ~/.my.cnf")]
    defaults_file: Option<PathBuf>,
}

fn descriptor_from_cli(
    cli: &Cli,
    source: &dyn mycnf::OptionFileSource,
) -> Result<ConnectionDescriptor, ConfigError> {
    let creds = mycnf::resolve(
        Credentials::new(cli.user.clone(), cli.password.clone(), cli.host.clone()),
        source,
    )?;

    ConnectionDescriptor::new(
        creds.host,
        &cli.port,
        creds.user,
        creds.password,
        cli.database.as_str(),
    )
}

/// Resolve the descriptor, then run the load. Nothing connects if configuration fails.
fn app<C: Connector>(
    cli: &Cli,
    source: &dyn mycnf::OptionFileSource,
    connector: &C,
) -> anyhow::Result<CompletionReport> {
    let descriptor = descriptor_from_cli(cli, source)?;

    let config = RunConfig {
        workers: cli.threads,
        hold: Duration::from_secs(cli.duration),
    };

    connstress::run(connector, &descriptor, &config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let source = match &cli.defaults_file {
        Some(path) => OptionFile::new(path),
        None => OptionFile::in_home(),
    };
    let connector = MysqlConnector::new(Duration::from_secs(cli.timeout));

    match app(&cli, &source, &connector) {
        Ok(report) => println!("All {} connections closed.", report.launched),
        Err(e) => {
            // not through the logger, RUST_LOG=off must not hide it
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
