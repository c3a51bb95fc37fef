use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;
use crate::server::AppState;
use crate::{ChangeBatch, Error, GridRow, Record, RecordStore, ReconcileReport, Reconciler, Summary};
use std::sync::Arc;

const GRID_PAGE: &str = include_str!("grid.html");

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
pub struct ItemsResponse {
    pub database: String,
    pub items: Vec<Record>,
    pub summary: Summary,
}

#[derive(Serialize)]
pub struct CommitResponse {
    pub report: ReconcileReport,
    pub items: Vec<Record>,
    pub summary: Summary,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub rows: Vec<GridRow>,
    pub summary: Summary,
}

#[derive(Serialize)]
pub struct InitResponse {
    pub seeded: bool,
}

fn api_error(err: Error) -> ApiError {
    let status = match &err {
        Error::InvalidField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::UnknownPosition(_) => StatusCode::CONFLICT,
        Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::warn!("Rejected change batch: {}", err);
    }
    (status, Json(ErrorResponse { error: err.to_string() }))
}

pub async fn grid_page() -> Html<&'static str> {
    Html(GRID_PAGE)
}

pub async fn get_items(State(state): State<Arc<AppState>>) -> ApiResult<ItemsResponse> {
    let store = state.store.lock().await;
    let items = store.read_all().map_err(api_error)?;

    Ok(Json(ItemsResponse {
        database: state.database_path.display().to_string(),
        summary: Summary::from_records(&items),
        items,
    }))
}

pub async fn commit(
    State(state): State<Arc<AppState>>,
    Json(mut batch): Json<ChangeBatch>,
) -> ApiResult<CommitResponse> {
    let mut store = state.store.lock().await;

    let snapshot = store.read_all().map_err(api_error)?;
    let report = Reconciler::new(&snapshot)
        .commit(&mut *store, &mut batch)
        .map_err(api_error)?;

    let items = store.read_all().map_err(api_error)?;
    Ok(Json(CommitResponse {
        report,
        summary: Summary::from_records(&items),
        items,
    }))
}

pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<ChangeBatch>,
) -> ApiResult<PreviewResponse> {
    let store = state.store.lock().await;
    let snapshot = store.read_all().map_err(api_error)?;

    let rows = batch.preview(&snapshot);
    Ok(Json(PreviewResponse {
        summary: Summary::from_rows(&rows),
        rows,
    }))
}

pub async fn init(State(state): State<Arc<AppState>>) -> ApiResult<InitResponse> {
    let mut store = state.store.lock().await;
    let seeded = store.init().map_err(api_error)?;
    Ok(Json(InitResponse { seeded }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteStore;
    use std::path::PathBuf;

    fn seeded_state() -> Arc<AppState> {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.init().unwrap();
        Arc::new(AppState::new(PathBuf::from(":memory:"), store))
    }

    fn batch(json: &str) -> ChangeBatch {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_get_items_includes_summary() {
        let Json(body) = get_items(State(seeded_state())).await.unwrap();
        assert_eq!(body.items.len(), 3);
        assert_eq!(body.summary.total_qty, 20);
    }

    #[tokio::test]
    async fn test_commit_returns_fresh_snapshot() {
        let state = seeded_state();
        let Json(body) = commit(
            State(state.clone()),
            Json(batch(r#"{"edited": {"0": {"qty": 12}}, "deleted": [1]}"#)),
        )
        .await
        .unwrap();

        assert_eq!(body.report.updated, 1);
        assert_eq!(body.report.deleted, 1);
        assert_eq!(body.items.len(), 2);
        assert_eq!(body.items[0].qty, 12);
        assert_eq!(body.summary.total_qty, 16);
    }

    #[tokio::test]
    async fn test_commit_maps_errors_to_status() {
        let state = seeded_state();

        let (status, _) = commit(State(state.clone()), Json(batch(r#"{"edited": {"0": {"qty": "x"}}}"#)))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = commit(State(state), Json(batch(r#"{"deleted": [7]}"#)))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_preview_does_not_write() {
        let state = seeded_state();
        let Json(body) = preview(
            State(state.clone()),
            Json(batch(r#"{"added": [{"name": "귤", "qty": 5, "price": 1}]}"#)),
        )
        .await
        .unwrap();

        assert_eq!(body.summary.items, 4);
        assert_eq!(body.summary.total_qty, 25);
        assert_eq!(state.store.lock().await.count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let state = seeded_state();
        let Json(body) = init(State(state)).await.unwrap();
        assert!(!body.seeded);
    }
}
