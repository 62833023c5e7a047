use axum::{extract::Request, middleware::Next, response::Response};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::resolver::SortResolver;

/// Access log middleware. Besides the usual request line it records how many
/// sort values the request carried, qualified ones included.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let sort_values = count_sort_values(&request);

    let response = next.run(request).await;

    info!(
        target: "access_log",
        timestamp = %Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        sort_values,
        "request completed"
    );

    response
}

fn count_sort_values(request: &Request) -> usize {
    let Some(query) = request.uri().query() else {
        return 0;
    };
    let default_resolver;
    let resolver = match request.extensions().get::<Arc<SortResolver>>() {
        Some(resolver) => resolver.as_ref(),
        None => {
            default_resolver = SortResolver::default();
            &default_resolver
        }
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(name, _)| resolver.is_sort_parameter(name))
        .count()
}
