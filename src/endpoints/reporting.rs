use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::seller_kpi;
use crate::services::reporting::{
    self, ChartPoint, RankingEntry, SaleRecord, SalesQuery, SalesResponse, SalesSummary,
    SellerKpiRecord,
};
use crate::state::AppState;

/// Batch uploads from the sales extractor
pub fn sync_routes(state: AppState) -> Router {
    Router::new()
        .route("/sales", post(sync_sales))
        .route("/vendas", post(sync_sales))
        .route("/sellers", post(sync_sellers))
        .route("/vendedores", post(sync_sellers))
        .with_state(state)
}

/// Store-scoped reads for the BI screens
pub fn reporting_routes(state: AppState) -> Router {
    Router::new()
        .route("/sales", get(list_sales))
        .route("/bi/summary", get(sales_summary))
        .route("/bi/chart", get(sales_chart))
        .route("/bi/ranking", get(seller_ranking))
        .route("/sellers-kpi", get(seller_kpis))
        .route("/external-stores", get(external_stores))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SyncQuery {
    /// Replace the table before inserting. Only the literal `false` appends.
    pub reset: Option<String>,
}

impl SyncQuery {
    pub fn resets(&self) -> bool {
        self.reset.as_deref() != Some("false")
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KpiQuery {
    pub user_id: Option<String>,
}

// ============================================================================
// Sync
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/sync/sales",
    tag = "Reporting",
    params(SyncQuery),
    request_body = Vec<SaleRecord>,
    responses(
        (status = 200, body = SyncResponse),
        (status = 503, description = "Server is shutting down")
    )
)]
pub async fn sync_sales(
    State(state): State<AppState>,
    Query(query): Query<SyncQuery>,
    Json(records): Json<Vec<SaleRecord>>,
) -> Result<Json<SyncResponse>> {
    let count = reporting::sync_sales(
        &state.write_queue,
        state.reporting_db.clone(),
        records,
        query.resets(),
    )
    .await?;

    Ok(Json(SyncResponse {
        success: true,
        count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/sync/sellers",
    tag = "Reporting",
    request_body = Vec<SellerKpiRecord>,
    responses(
        (status = 200, body = SyncResponse),
        (status = 503, description = "Server is shutting down")
    )
)]
pub async fn sync_sellers(
    State(state): State<AppState>,
    Json(records): Json<Vec<SellerKpiRecord>>,
) -> Result<Json<SyncResponse>> {
    let count =
        reporting::sync_seller_kpis(&state.write_queue, state.reporting_db.clone(), records)
            .await?;

    Ok(Json(SyncResponse {
        success: true,
        count,
    }))
}

// ============================================================================
// Reads
// ============================================================================

#[utoipa::path(
    get,
    path = "/sales",
    tag = "Reporting",
    params(SalesQuery),
    responses((status = 200, body = SalesResponse))
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesResponse>> {
    let access = reporting::access_for(&state.db, query.user_id.as_deref()).await?;
    let sales = reporting::list_sales(&state.reporting_db, &access, &query).await?;
    Ok(Json(SalesResponse { sales }))
}

#[utoipa::path(
    get,
    path = "/bi/summary",
    tag = "Reporting",
    params(SalesQuery),
    responses((status = 200, body = SalesSummary))
)]
pub async fn sales_summary(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesSummary>> {
    let access = reporting::access_for(&state.db, query.user_id.as_deref()).await?;
    Ok(Json(
        reporting::summary(&state.reporting_db, &access, &query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/bi/chart",
    tag = "Reporting",
    params(SalesQuery),
    responses((status = 200, body = Vec<ChartPoint>))
)]
pub async fn sales_chart(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<ChartPoint>>> {
    let access = reporting::access_for(&state.db, query.user_id.as_deref()).await?;
    Ok(Json(
        reporting::daily_chart(&state.reporting_db, &access, &query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/bi/ranking",
    tag = "Reporting",
    params(SalesQuery),
    responses((status = 200, body = Vec<RankingEntry>))
)]
pub async fn seller_ranking(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<RankingEntry>>> {
    let access = reporting::access_for(&state.db, query.user_id.as_deref()).await?;
    Ok(Json(
        reporting::ranking(&state.reporting_db, &access, &query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/sellers-kpi",
    tag = "Reporting",
    params(KpiQuery),
    responses((status = 200, body = Vec<seller_kpi::Model>))
)]
pub async fn seller_kpis(
    State(state): State<AppState>,
    Query(query): Query<KpiQuery>,
) -> Result<Json<Vec<seller_kpi::Model>>> {
    let access = reporting::access_for(&state.db, query.user_id.as_deref()).await?;
    Ok(Json(
        reporting::seller_kpis(&state.reporting_db, &access).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/external-stores",
    tag = "Reporting",
    responses((status = 200, body = Vec<String>))
)]
pub async fn external_stores(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(reporting::external_stores(&state.reporting_db).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(reset: Option<&str>) -> SyncQuery {
        SyncQuery {
            reset: reset.map(str::to_string),
        }
    }

    #[test]
    fn test_only_literal_false_skips_reset() {
        assert!(query(None).resets());
        assert!(query(Some("true")).resets());
        assert!(query(Some("0")).resets());
        assert!(query(Some("False")).resets());
        assert!(!query(Some("false")).resets());
    }
}
