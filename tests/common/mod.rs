#![allow(dead_code)]

use axum::Router;
use sort_resolver::config::{AppConfig, ServerConfig, SortConfig};
use sort_resolver::routes;
use sort_resolver::{RequestParams, Sort, SortResolver};

/// Default configuration pointing at a port the tests never bind.
pub fn create_test_app_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        sort: SortConfig::default(),
    }
}

pub fn create_test_app_config_with_fallback(fallback: Sort) -> AppConfig {
    let mut config = create_test_app_config();
    config.sort.fallback = fallback;
    config
}

pub fn setup_test_app(config: AppConfig) -> Result<Router, Box<dyn std::error::Error>> {
    Ok(routes::build_router(&config)?)
}

/// One `sort` value per clause, like a client that never folds directions.
pub fn request_with_sort(sort: &Sort, qualifier: Option<&str>) -> RequestParams {
    let name = SortResolver::new().parameter_name(qualifier);
    sort.iter().fold(RequestParams::new(), |params, order| {
        params.with(name.clone(), order.to_string())
    })
}

pub fn request_with_values(name: &str, values: &[&str]) -> RequestParams {
    values
        .iter()
        .fold(RequestParams::new(), |params, value| params.with(name, *value))
}
