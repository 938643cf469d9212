use pos_inventory_rust::{api, create_pool, AppConfig, InventoryService, Reconciler};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let reconciler = Reconciler::with_threshold(config.reconcile.match_threshold);
    let inventory_service = Arc::new(InventoryService::new(pool, reconciler));

    // 合并路由
    let app = api::reconcile_routes(reconciler)
        .merge(api::order_routes(inventory_service))
        .layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/reconcile/{{requirements,availability,deltas,deltas/csv,plan,plan/csv}}");
    info!("  POST /api/orders/save");
    info!("  GET  /api/orders/:order_id/movements");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
