use axum::{extract::Extension, middleware, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::extractors::{SortTarget, Sorted, Unqualified};
use crate::logging::logging_middleware;
use crate::models::Sort;
use crate::resolver::{SortBinding, SortDefault, SortResolver};

/// Sort for `/people`: `firstname,lastname` ascending unless the request
/// says otherwise.
pub struct PeopleSort;

impl SortTarget for PeopleSort {
    fn binding() -> AppResult<SortBinding> {
        SortBinding::builder()
            .sort_default(SortDefault::new(["firstname", "lastname"]))
            .build()
    }
}

/// `left_sort` parameter of `/compare`.
pub struct LeftSort;

impl SortTarget for LeftSort {
    fn binding() -> AppResult<SortBinding> {
        SortBinding::builder().qualifier("left").build()
    }
}

/// `right_sort` parameter of `/compare`.
pub struct RightSort;

impl SortTarget for RightSort {
    fn binding() -> AppResult<SortBinding> {
        SortBinding::builder().qualifier("right").build()
    }
}

#[derive(Debug, Serialize)]
pub struct SortResponse {
    pub sorted: bool,
    pub orders: Sort,
    pub query: String,
}

impl SortResponse {
    fn new(resolver: &SortResolver, sort: Sort, qualifier: Option<&str>) -> Self {
        SortResponse {
            sorted: sort.is_sorted(),
            query: resolver.to_query_string(&sort, qualifier),
            orders: sort,
        }
    }
}

pub fn build_router(config: &AppConfig) -> AppResult<Router> {
    let resolver = Arc::new(config.sort.build_resolver()?);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/sort", get(plain_sort))
        .route("/people", get(people_sort))
        .route("/compare", get(compare_sort))
        .layer(middleware::from_fn(logging_middleware))
        .layer(Extension(resolver)))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn plain_sort(
    Extension(resolver): Extension<Arc<SortResolver>>,
    sort: Sorted<Unqualified>,
) -> Json<SortResponse> {
    Json(SortResponse::new(&resolver, sort.into_inner(), None))
}

async fn people_sort(
    Extension(resolver): Extension<Arc<SortResolver>>,
    sort: Sorted<PeopleSort>,
) -> Json<SortResponse> {
    Json(SortResponse::new(&resolver, sort.into_inner(), None))
}

async fn compare_sort(
    Extension(resolver): Extension<Arc<SortResolver>>,
    left: Sorted<LeftSort>,
    right: Sorted<RightSort>,
) -> Json<Value> {
    Json(json!({
        "left": SortResponse::new(&resolver, left.into_inner(), Some("left")),
        "right": SortResponse::new(&resolver, right.into_inner(), Some("right")),
    }))
}
