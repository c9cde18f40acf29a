use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis: RedisConfig,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub cache_ttl: Duration,
    pub demo_data: bool,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub db: i64,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.password, self.host, self.port, self.db
            )
        }
    }
}

/// Tunables for the metrics dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// A project whose latest status is older than this counts as idle.
    pub idle_threshold: Duration,
    /// Lookahead window for the "ending soon" count.
    pub ending_soon_window: Duration,
    /// Upper bound on concurrent metric workers.
    pub max_workers: usize,
    /// Deadline for one full recomputation.
    pub timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_secs(7 * 24 * 3600),
            ending_soon_window: Duration::from_secs(7 * 24 * 3600),
            max_workers: 200,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let redis = RedisConfig {
            host: env_required("REDIS_HOST")?,
            port: env_required("REDIS_PORT")?
                .parse()
                .map_err(|e| format!("Invalid REDIS_PORT: {e}"))?,
            password: env_or("REDIS_PASSWORD", ""),
            db: env_required("REDIS_DB")?
                .parse()
                .map_err(|e| format!("Invalid REDIS_DB: {e}"))?,
        };

        let host: IpAddr = env_or("PROJECTLIST_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PROJECTLIST_HOST: {e}"))?;

        let port: u16 = env_or("PROJECTLIST_PORT", "8081")
            .parse()
            .map_err(|e| format!("Invalid PROJECTLIST_PORT: {e}"))?;

        let log_level = env_or("PROJECTLIST_LOG_LEVEL", "info");

        let cache_ttl = Duration::from_secs(env_parse("PROJECTLIST_CACHE_TTL_SECS", 300)?);

        let demo_data = match env_or("PROJECTLIST_DEMO_DATA", "true").as_str() {
            "false" | "0" | "no" => false,
            _ => true,
        };

        let dashboard = DashboardConfig {
            idle_threshold: days(env_parse("PROJECTLIST_IDLE_DAYS", 7)?),
            ending_soon_window: days(env_parse("PROJECTLIST_ENDING_SOON_DAYS", 7)?),
            max_workers: env_parse("PROJECTLIST_MAX_WORKERS", 200)?,
            timeout: Duration::from_secs(env_parse("PROJECTLIST_DASHBOARD_TIMEOUT_SECS", 30)?),
        };

        Ok(Config {
            database_url,
            redis,
            host,
            port,
            log_level,
            cache_ttl,
            demo_data,
            dashboard,
        })
    }
}

fn days(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(24 * 3600))
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| format!("Invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}
