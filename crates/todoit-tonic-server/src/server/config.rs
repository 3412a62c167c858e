use anyhow::bail;
use clap::{Parser, ValueEnum};

/// Which [`Store`](todoit_store::Store) implementation backs the service.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite database at `DATABASE_URL`.
    Sqlite,
    /// Process memory. Everything is lost on restart.
    Memory,
}

/// Runtime configuration for the `todoit-server` binary.
///
/// Every value can be given on the command line or through the environment
/// (a `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "todoit-server",
    version,
    about = "A gRPC service for managing to-do items"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/todoit.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// Storage backend.
    ///
    /// Environment variable: `STORE_BACKEND`
    #[arg(long = "store", env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Sqlite)]
    pub store: StoreBackend,

    /// SQLite connection URL. The file is created if missing.
    ///
    /// Environment variable: `DATABASE_URL`
    #[arg(long, env = "DATABASE_URL", default_value_t = String::from("sqlite://todoit.db"))]
    pub database_url: String,

    /// Maximum number of pooled SQLite connections.
    ///
    /// Environment variable: `MAX_DB_CONNECTIONS`
    #[arg(long, env = "MAX_DB_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Reject updates that would leave the title or description empty, the
    /// same way creates are validated. Off by default: updates overwrite
    /// whatever they are given.
    ///
    /// Environment variable: `STRICT_UPDATES`
    #[arg(long, env = "STRICT_UPDATES", default_value_t = false)]
    pub strict_updates: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub store: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub strict_updates: bool,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        if args.store == StoreBackend::Sqlite {
            if args.max_connections == 0 {
                bail!("MAX_DB_CONNECTIONS must be greater than 0");
            }
            if args.database_url.trim().is_empty() {
                bail!("DATABASE_URL must be set when using the sqlite store");
            }
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            store: args.store,
            database_url: args.database_url,
            max_connections: args.max_connections,
            strict_updates: args.strict_updates,
        })
    }
}
