use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string
    pub redis_url: String,

    /// Delivery endpoint that accepts outbound messages
    pub webhook_url: String,

    /// Credential sent in the `x-ins-auth-key` header
    pub webhook_auth_key: String,

    /// Per-request timeout for the delivery endpoint in seconds (default: 10)
    pub webhook_timeout_secs: u64,

    /// Seconds between two delivery cycles (default: 120)
    pub delivery_interval_secs: u64,

    /// Pending messages fetched per delivery cycle (default: 2)
    pub delivery_batch_size: i64,

    /// Upper bound on rows returned by the message listing (default: 1000)
    pub retrieve_limit: i64,

    /// Start the delivery worker as soon as the server boots (default: true)
    pub worker_autostart: bool,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Port the HTTP API listens on (default: 8080)
    pub api_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            webhook_url: std::env::var("WEBHOOK_URL")
                .map_err(|_| anyhow::anyhow!("WEBHOOK_URL environment variable is required"))?,
            webhook_auth_key: std::env::var("WEBHOOK_AUTH_KEY")
                .or_else(|_| std::env::var("AUTH_KEY"))
                .map_err(|_| {
                    anyhow::anyhow!("WEBHOOK_AUTH_KEY (or AUTH_KEY) environment variable is required")
                })?,
            webhook_timeout_secs: std::env::var("WEBHOOK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("WEBHOOK_TIMEOUT_SECS must be a valid u64"))?,
            delivery_interval_secs: std::env::var("DELIVERY_INTERVAL_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DELIVERY_INTERVAL_SECS must be a valid u64"))?,
            delivery_batch_size: std::env::var("DELIVERY_BATCH_SIZE")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DELIVERY_BATCH_SIZE must be a valid i64"))?,
            retrieve_limit: std::env::var("RETRIEVE_LIMIT")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RETRIEVE_LIMIT must be a valid i64"))?,
            worker_autostart: std::env::var("WORKER_AUTOSTART")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("WORKER_AUTOSTART must be true or false"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid port number"))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or disable the delivery worker.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.delivery_interval_secs == 0 {
            anyhow::bail!("DELIVERY_INTERVAL_SECS must be greater than zero");
        }
        if self.delivery_batch_size <= 0 {
            anyhow::bail!("DELIVERY_BATCH_SIZE must be greater than zero");
        }
        if self.retrieve_limit <= 0 {
            anyhow::bail!("RETRIEVE_LIMIT must be greater than zero");
        }
        Ok(())
    }
}
