use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use pos_inventory_rust::{api, Reconciler};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    api::reconcile_routes(Reconciler::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

fn pizza_payload() -> Value {
    json!({
        "line_items": [
            { "menu_item_id": "margherita", "name": "Margherita", "quantity": 3 }
        ],
        "menu_items": [
            {
                "id": "margherita",
                "name": "Margherita",
                "ingredients": [
                    { "name": "Mozzarella", "quantity": 150, "unit": "g" },
                    { "name": "Tomato Sauce", "quantity": 50, "unit": "ml" }
                ]
            }
        ],
        "stock_items": [
            { "id": "s1", "name": "Mozzarella", "stock_quantity": 1, "unit": "kg" },
            { "id": "s2", "name": "Tomato Sauce", "stock_quantity": 100, "unit": "ml" }
        ],
        "saved_quantities": { "margherita": 1 }
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, b"OK");
}

#[tokio::test]
async fn availability_reports_warning() {
    let response = app()
        .oneshot(post_json("/api/reconcile/availability", pizza_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(report["is_valid"], json!(true));
    assert_eq!(report["errors"].as_array().unwrap().len(), 0);
    assert_eq!(report["warnings"][0]["ingredient"], json!("Tomato Sauce"));
    assert_eq!(report["warnings"][0]["kind"], json!("insufficient"));
}

#[tokio::test]
async fn requirements_are_aggregated() {
    let response = app()
        .oneshot(post_json("/api/reconcile/requirements", pizza_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    let requirements = body["requirements"].as_array().unwrap();
    assert_eq!(requirements.len(), 2);
    assert_eq!(requirements[0]["key"], json!("mozzarella"));
    assert_eq!(requirements[0]["contributing_menu_items"], json!(["Margherita"]));
}

#[tokio::test]
async fn deltas_respect_saved_quantities() {
    let response = app()
        .oneshot(post_json("/api/reconcile/deltas", pizza_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    let deltas = body["deltas"].as_array().unwrap();
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0]["name"], json!("Mozzarella"));
    assert_eq!(deltas[0]["unit"], json!("g"));
}

#[tokio::test]
async fn deltas_csv_has_header() {
    let response = app()
        .oneshot(post_json("/api/reconcile/deltas/csv", pizza_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let text = String::from_utf8(read_body(response).await).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("name,required_qty,unit"));
    assert!(lines.next().unwrap().starts_with("Mozzarella,"));
}

#[tokio::test]
async fn mixed_units_are_unprocessable() {
    let payload = json!({
        "line_items": [
            { "menu_item_id": "salad", "quantity": 1 },
            { "menu_item_id": "bread", "quantity": 1 }
        ],
        "menu_items": [
            { "id": "salad", "name": "Salad", "ingredients": [{ "name": "Olive Oil", "quantity": 10, "unit": "ml" }] },
            { "id": "bread", "name": "Bread", "ingredients": [{ "name": "Olive Oil", "quantity": 1 }] }
        ]
    });

    let response = app()
        .oneshot(post_json("/api/reconcile/deltas", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn plan_csv_lists_updates_in_stock_units() {
    let response = app()
        .oneshot(post_json("/api/reconcile/plan/csv", pizza_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let text = String::from_utf8(read_body(response).await).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "stock_item_id,stock_name,ingredient,previous_quantity,deduct_quantity,unit,projected_quantity,shortfall"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("s1,Mozzarella,Mozzarella,1,"));
    assert!(lines[1].contains(",kg,"));
    assert!(lines[2].starts_with("s2,Tomato Sauce,Tomato Sauce,100,100,ml,0,"));
}

#[tokio::test]
async fn plan_reports_incompatible_units() {
    let payload = json!({
        "line_items": [{ "menu_item_id": "bread", "quantity": 1 }],
        "menu_items": [
            { "id": "bread", "name": "Garlic Bread", "ingredients": [{ "name": "Garlic", "quantity": 2, "unit": "pcs" }] }
        ],
        "stock_items": [
            { "id": "s1", "name": "Garlic", "stock_quantity": 0.5, "unit": "kg" }
        ]
    });

    let response = app()
        .oneshot(post_json("/api/reconcile/plan", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["report"]["is_valid"], json!(false));
    assert_eq!(body["report"]["errors"][0]["kind"], json!("incompatible_units"));
    assert_eq!(body["plan"]["updates"].as_array().unwrap().len(), 0);
    assert_eq!(body["plan"]["incompatible"][0]["name"], json!("Garlic"));
}

#[tokio::test]
async fn plan_combines_report_and_updates() {
    let response = app()
        .oneshot(post_json("/api/reconcile/plan", pizza_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["report"]["is_valid"], json!(true));
    let updates = body["plan"]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0]["stock_item_id"], json!("s1"));
    assert_eq!(body["plan"]["unmatched"].as_array().unwrap().len(), 0);
}
