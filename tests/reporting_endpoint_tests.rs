//! Sales and seller KPI reporting integration tests
//!
//! Covers the sync endpoints used by the sales extractor and the
//! store-scoped reads behind the BI screens.

use axum::http::StatusCode;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};

mod common;
use common::{create_admin, create_staff, get, json_body, send_json, spawn_app, TestApp};

use telefluxo::models::user;

const PARK_CNPJ: &str = "12309173000337";

fn sales_batch() -> Value {
    json!([
        {
            "data_emissao": "05/01/2026",
            "nome_vendedor": "Rafa",
            "descricao": "Galaxy S25",
            "quantidade": 2,
            "total_liquido": 1000,
            "cnpj_empresa": "12.309.173/0003-37"
        },
        {
            "data_emissao": "2026-01-05",
            "nome_vendedor": "Rafa",
            "quantidade": "1",
            "total_liquido": "500,50",
            "cnpj_empresa": PARK_CNPJ
        },
        {
            "data_emissao": "2026-01-06",
            "nome_vendedor": "Lu",
            "quantidade": 3,
            "total_liquido": 3000,
            "cnpj_empresa": 12309173000841u64
        }
    ])
}

async fn sync_sales(app: &TestApp, uri: &str, batch: Value) -> (StatusCode, Value) {
    json_body(send_json(&app.router, "POST", uri, batch).await).await
}

/// A store manager limited to PARK SHOPPING, written with an alias
async fn park_manager(app: &TestApp) -> user::Model {
    let manager = create_staff(&app.state.db, "Gil", "Varejo").await;
    let mut active: user::ActiveModel = manager.into();
    active.role = Set("Gerente".to_string());
    active.allowed_stores = Set(" park ".to_string());
    active.update(&app.state.db).await.unwrap()
}

async fn read(app: &TestApp, uri: &str) -> Value {
    let (status, body) = json_body(get(&app.router, uri).await).await;
    assert_eq!(status, StatusCode::OK, "GET {} failed: {}", uri, body);
    body
}

fn approx(value: &Value, expected: f64) -> bool {
    (value.as_f64().unwrap() - expected).abs() < 1e-6
}

// ============================================================================
// Sync
// ============================================================================

#[tokio::test]
async fn test_sync_sales_normalizes_rows() {
    let app = spawn_app().await;
    let admin = create_admin(&app.state.db, "Chefe").await;

    let (status, body) = sync_sales(&app, "/api/sync/sales", sales_batch()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let body = read(&app, &format!("/sales?userId={}", admin.id)).await;
    let sales = body["sales"].as_array().unwrap();
    assert_eq!(sales.len(), 3);
    assert_eq!(sales[0]["data_emissao"], "2026-01-05");
    assert_eq!(sales[0]["cnpj_empresa"], PARK_CNPJ);
    assert!(approx(&sales[1]["total_liquido"], 500.5));
    assert_eq!(sales[2]["cnpj_empresa"], "12309173000841");
}

#[tokio::test]
async fn test_sync_sales_reset_replaces_and_append_keeps() {
    let app = spawn_app().await;
    let admin = create_admin(&app.state.db, "Chefe").await;
    let uri = format!("/sales?userId={}", admin.id);

    sync_sales(&app, "/api/sync/sales", sales_batch()).await;
    sync_sales(&app, "/api/sync/sales", sales_batch()).await;
    assert_eq!(read(&app, &uri).await["sales"].as_array().unwrap().len(), 3);

    let (status, _) = sync_sales(&app, "/api/sync/sales?reset=false", sales_batch()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read(&app, &uri).await["sales"].as_array().unwrap().len(), 6);

    // Anything but the literal "false" resets
    let (status, _) = sync_sales(&app, "/api/sync/sales?reset=0", sales_batch()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read(&app, &uri).await["sales"].as_array().unwrap().len(), 3);

    sync_sales(&app, "/api/sync/sales?reset=false", sales_batch()).await;
    // Older extractor builds post to the Portuguese path
    let (status, _) = sync_sales(&app, "/api/sync/vendas", sales_batch()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read(&app, &uri).await["sales"].as_array().unwrap().len(), 3);
}

// ============================================================================
// Store-scoped reads
// ============================================================================

#[tokio::test]
async fn test_sales_are_scoped_to_allowed_stores() {
    let app = spawn_app().await;
    let manager = park_manager(&app).await;
    let admin = create_admin(&app.state.db, "Chefe").await;
    let no_stores = create_staff(&app.state.db, "Sem Loja", "Varejo").await;
    sync_sales(&app, "/api/sync/sales", sales_batch()).await;

    let own = read(&app, &format!("/sales?userId={}", manager.id)).await;
    let own = own["sales"].as_array().unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|s| s["cnpj_empresa"] == PARK_CNPJ));

    let all = read(&app, &format!("/sales?userId={}", admin.id)).await;
    assert_eq!(all["sales"].as_array().unwrap().len(), 3);

    for uri in [
        format!("/sales?userId={}", no_stores.id),
        "/sales?userId=undefined".to_string(),
        "/sales".to_string(),
        "/sales?userId=ghost".to_string(),
    ] {
        assert_eq!(read(&app, &uri).await, json!({"sales": []}), "{}", uri);
    }
}

#[tokio::test]
async fn test_gestor_reads_every_store() {
    let app = spawn_app().await;
    let gestor = create_staff(&app.state.db, "Ivo", "Varejo").await;
    let mut active: user::ActiveModel = gestor.into();
    active.role = Set("GESTOR".to_string());
    let gestor = active.update(&app.state.db).await.unwrap();
    sync_sales(&app, "/api/sync/sales", sales_batch()).await;

    let summary = read(&app, &format!("/bi/summary?userId={}", gestor.id)).await;
    assert!(approx(&summary["total_vendas"], 4500.5));
    assert!(approx(&summary["total_pecas"], 6.0));

    let sales = read(&app, &format!("/sales?userId={}", gestor.id)).await;
    assert_eq!(sales["sales"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_date_range_applies_only_with_both_bounds() {
    let app = spawn_app().await;
    let admin = create_admin(&app.state.db, "Chefe").await;
    sync_sales(&app, "/api/sync/sales", sales_batch()).await;

    let ranged = read(
        &app,
        &format!("/sales?userId={}&startDate=2026-01-06&endDate=2026-01-06", admin.id),
    )
    .await;
    assert_eq!(ranged["sales"].as_array().unwrap().len(), 1);

    let open_ended = read(&app, &format!("/sales?userId={}&startDate=2026-01-06", admin.id)).await;
    assert_eq!(open_ended["sales"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_bi_summary_chart_and_ranking() {
    let app = spawn_app().await;
    let manager = park_manager(&app).await;
    let admin = create_admin(&app.state.db, "Chefe").await;
    sync_sales(&app, "/api/sync/sales", sales_batch()).await;

    let summary = read(&app, &format!("/bi/summary?userId={}", admin.id)).await;
    assert!(approx(&summary["total_vendas"], 4500.5));
    assert!(approx(&summary["total_pecas"], 6.0));
    assert!(approx(&summary["ticket_medio"], 4500.5 / 6.0));

    let summary = read(&app, &format!("/bi/summary?userId={}", manager.id)).await;
    assert!(approx(&summary["total_vendas"], 1500.5));
    assert!(approx(&summary["total_pecas"], 3.0));

    let summary = read(&app, "/bi/summary").await;
    assert!(approx(&summary["total_vendas"], 0.0));
    assert!(approx(&summary["ticket_medio"], 0.0));

    let chart = read(&app, &format!("/bi/chart?userId={}", admin.id)).await;
    let chart = chart.as_array().unwrap();
    assert_eq!(chart.len(), 2);
    assert_eq!(chart[0]["dia"], "05/01");
    assert_eq!(chart[0]["dateIso"], "2026-01-05");
    assert!(approx(&chart[0]["valor"], 1500.5));
    assert_eq!(chart[1]["dia"], "06/01");

    let ranking = read(&app, &format!("/bi/ranking?userId={}", admin.id)).await;
    let ranking = ranking.as_array().unwrap();
    assert_eq!(ranking[0]["nome"], "Lu");
    assert_eq!(ranking[0]["loja"], "JK SHOPPING");
    assert!(approx(&ranking[0]["qtd"], 3.0));
    assert_eq!(ranking[1]["nome"], "Rafa");
    assert_eq!(ranking[1]["loja"], "PARK SHOPPING");
    assert!(approx(&ranking[1]["total"], 1500.5));
}

#[tokio::test]
async fn test_seller_kpis_replace_and_scope() {
    let app = spawn_app().await;
    let manager = park_manager(&app).await;
    let admin = create_admin(&app.state.db, "Chefe").await;

    let kpis = json!([
        {"loja": "PARK SHOPPING", "vendedor": "Rafa", "fat_atual": "1.000,00", "pa": 1.4},
        {"loja": "JK SHOPPING", "vendedor": "Lu", "fat_atual": 5000}
    ]);
    let (status, body) = sync_sales(&app, "/api/sync/sellers", kpis.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    sync_sales(&app, "/api/sync/vendedores", kpis).await;

    let all = read(&app, &format!("/sellers-kpi?userId={}", admin.id)).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["vendedor"], "Lu");

    let own = read(&app, &format!("/sellers-kpi?userId={}", manager.id)).await;
    let own = own.as_array().unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["vendedor"], "Rafa");
    assert!(approx(&own[0]["fat_atual"], 1000.0));

    assert_eq!(read(&app, "/sellers-kpi").await, json!([]));
}

#[tokio::test]
async fn test_external_stores_fall_back_to_directory() {
    let app = spawn_app().await;

    let stores = read(&app, "/external-stores").await;
    assert_eq!(stores.as_array().unwrap().len(), 26);

    sync_sales(&app, "/api/sync/sales", sales_batch()).await;
    let stores = read(&app, "/external-stores").await;
    assert_eq!(stores, json!(["JK SHOPPING", "PARK SHOPPING"]));
}
