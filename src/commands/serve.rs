use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::controllers::paste;
use crate::markdown::markdown_to_html;
use crate::store::AnyStore;
use crate::types::api::{
    CreatePaste, CreatedPaste, ListQuery, PasteSummary, PasteView, ViewCount, DELETE_KEY_HEADER,
    PASSWORD_HEADER,
};
use crate::App;

/// The manual for the program in man page form.
const MAN_PAGE: &str = include_str!("../../assets/man.md");

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], app.config.port));

    if let Some(interval) = app.config.limits.purge_interval_secs.filter(|&s| s > 0) {
        tokio::spawn(purge_periodically(
            app.store.clone(),
            Duration::from_secs(interval),
        ));
    }

    info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(router(app).into_make_service())
        .await?;

    Ok(())
}

pub fn router(app: App) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/pastes", get(list_pastes).post(create_paste))
        .route("/api/pastes/:id", get(get_paste).delete(delete_paste))
        .route("/api/pastes/:id/views", post(record_view))
        .route("/api/pastes/:id/burn", post(burn_paste))
        .route("/safe-paste/:id", get(get_paste))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(app.config.limits.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn purge_periodically(store: AnyStore, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        if let Err(err) = paste::purge_expired(&store, Utc::now()).await {
            warn!("failed to purge expired pastes: {err}");
        }
    }
}

async fn index() -> Html<String> {
    Html(markdown_to_html(MAN_PAGE))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn password(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, PASSWORD_HEADER)
}

async fn create_paste(
    State(config): State<Config>,
    State(store): State<AnyStore>,
    Json(request): Json<CreatePaste>,
) -> crate::ApiResult<impl IntoResponse> {
    let paste = paste::create(&store, &config.default_owner, request, Utc::now()).await?;
    let created = CreatedPaste::new(&paste, &config.base_url);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, created.path.clone())],
        Json(created),
    ))
}

async fn list_pastes(
    State(store): State<AnyStore>,
    Query(query): Query<ListQuery>,
) -> crate::ApiResult<Json<Vec<PasteSummary>>> {
    Ok(Json(paste::list(&store, query, Utc::now()).await?))
}

async fn get_paste(
    State(store): State<AnyStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> crate::ApiResult<Json<PasteView>> {
    let paste = paste::open(&store, &id, password(&headers), Utc::now()).await?;
    Ok(Json(paste.into()))
}

async fn record_view(
    State(store): State<AnyStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> crate::ApiResult<Json<ViewCount>> {
    let views = paste::record_view(&store, &id, password(&headers), Utc::now()).await?;
    Ok(Json(ViewCount { views }))
}

async fn burn_paste(
    State(store): State<AnyStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> crate::ApiResult<StatusCode> {
    paste::burn(&store, &id, password(&headers), Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_paste(
    State(store): State<AnyStore>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> crate::ApiResult<StatusCode> {
    paste::delete(&store, &id, header_value(&headers, DELETE_KEY_HEADER)).await?;
    Ok(StatusCode::NO_CONTENT)
}
