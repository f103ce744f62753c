use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub store: StoreConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub mongo: MongoConfig,

    #[command(flatten)]
    pub pagination: PaginationConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Relational store (sqlx)
    Postgres,
    /// Document store
    Mongo,
    /// Process-local map, data is lost on exit
    Memory,
}

impl StoreKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
            Self::Memory => "memory",
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct StoreConfig {
    /// Backend used to persist users
    #[arg(long = "store", env = "AGRO_STORE", value_enum, default_value_t = StoreKind::Postgres)]
    pub kind: StoreKind,

    /// Number of times to retry the initial store connection
    #[arg(long, env = "AGRO_STORE_CONNECT_RETRIES", default_value_t = 5)]
    pub connect_retries: usize,

    /// Initial delay between connection attempts, doubled on each retry
    #[arg(long, env = "AGRO_STORE_CONNECT_BACKOFF_MS", default_value_t = 250)]
    pub connect_backoff_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "AGRO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the gRPC API
    #[arg(long, env = "AGRO_PORT", default_value_t = 50051)]
    pub port: u16,

    /// Port for liveness and readiness probes
    #[arg(long, env = "AGRO_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for in-flight work during shutdown
    #[arg(long, env = "AGRO_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Postgres connection URL, required when the store is `postgres`
    #[arg(long = "database-url", env = "AGRO_DATABASE_URL")]
    pub url: Option<String>,

    #[arg(long = "db-max-connections", env = "AGRO_DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    #[arg(long = "db-min-connections", env = "AGRO_DB_MIN_CONNECTIONS", default_value_t = 2)]
    pub min_connections: u32,

    #[arg(long = "db-acquire-timeout-secs", env = "AGRO_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    #[arg(long = "db-idle-timeout-secs", env = "AGRO_DB_IDLE_TIMEOUT_SECS", default_value_t = 600)]
    pub idle_timeout_secs: u64,

    #[arg(long = "db-max-lifetime-secs", env = "AGRO_DB_MAX_LIFETIME_SECS", default_value_t = 1800)]
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct MongoConfig {
    /// MongoDB connection URI, required when the store is `mongo`
    #[arg(long = "mongo-uri", env = "AGRO_MONGO_URI")]
    pub uri: Option<String>,

    /// MongoDB database name, required when the store is `mongo`
    #[arg(long = "mongo-db-name", env = "AGRO_MONGO_DB_NAME")]
    pub database: Option<String>,

    /// Collection holding user documents
    #[arg(long = "mongo-collection", env = "AGRO_MONGO_COLLECTION", default_value = "users")]
    pub collection: String,
}

#[derive(Clone, Debug, Args)]
pub struct PaginationConfig {
    /// Page size used when a request omits it
    #[arg(long, env = "AGRO_DEFAULT_PAGE_SIZE", default_value_t = 20)]
    pub default_page_size: u32,

    /// Largest page size a request may ask for
    #[arg(long, env = "AGRO_MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: u32,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the store readiness check
    #[arg(long = "health-store-timeout-ms", env = "AGRO_HEALTH_STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub store_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "AGRO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces, metrics and logs (disabled when unset)
    #[arg(long, env = "AGRO_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads an optional `.env` file, then parses flags and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}
