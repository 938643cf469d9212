use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// 按数据库配置创建连接池; 超过 slow_statement_secs 的语句以 warn 级别记录
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(&config.url)?.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(config.slow_statement_secs),
    );

    tracing::debug!(
        "连接池: 最大连接 {}, 获取超时 {}秒, 慢查询阈值 {}秒",
        config.max_connections, config.acquire_timeout_secs, config.slow_statement_secs
    );

    pool_options(config).connect_with(connect_options).await
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}
