use crate::service::matcher::DEFAULT_MATCH_THRESHOLD;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// 获取连接的超时秒数
    pub acquire_timeout_secs: u64,
    /// 超过该秒数的语句以 warn 级别记录
    pub slow_statement_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 20,
            acquire_timeout_secs: 10,
            slow_statement_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// 部分匹配的置信度阈值 (严格大于)
    pub match_threshold: f64,
}

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/pos_inventory";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            reconcile: ReconcileConfig {
                match_threshold: DEFAULT_MATCH_THRESHOLD,
            },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> config/default.toml (可选) -> 环境变量 POS__*
    ///
    /// 例: POS__SERVER__PORT=9090, POS__DATABASE__SLOW_STATEMENT_SECS=5。
    /// DATABASE_URL 存在时覆盖数据库地址。
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("database.acquire_timeout_secs", defaults.database.acquire_timeout_secs)?
            .set_default("database.slow_statement_secs", defaults.database.slow_statement_secs)?
            .set_default("reconcile.match_threshold", defaults.reconcile.match_threshold)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("POS").separator("__"));

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }
}
