use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Sort;
use crate::params::RequestParams;
use crate::resolver::{SortBinding, SortResolver};

/// Type tag for a sort parameter of a handler. Implement it on a marker type
/// to give the parameter a qualifier or a default sort.
///
/// ```
/// use sort_resolver::error::AppResult;
/// use sort_resolver::extractors::SortTarget;
/// use sort_resolver::resolver::{SortBinding, SortDefault};
///
/// struct People;
///
/// impl SortTarget for People {
///     fn binding() -> AppResult<SortBinding> {
///         SortBinding::builder()
///             .sort_default(SortDefault::new(["lastname"]))
///             .build()
///     }
/// }
/// ```
pub trait SortTarget: Send + Sync + 'static {
    fn binding() -> AppResult<SortBinding> {
        Ok(SortBinding::unqualified())
    }
}

/// The plain `sort` parameter without qualifier or default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unqualified;

impl SortTarget for Unqualified {}

/// Extractor resolving the sort parameter described by `T`.
///
/// The resolver is taken from an `Arc<SortResolver>` request extension;
/// without one the default resolver is used.
pub struct Sorted<T = Unqualified> {
    sort: Sort,
    _target: PhantomData<fn() -> T>,
}

impl<T> Sorted<T> {
    pub fn new(sort: Sort) -> Self {
        Sorted {
            sort,
            _target: PhantomData,
        }
    }

    pub fn into_inner(self) -> Sort {
        self.sort
    }
}

impl<T> Deref for Sorted<T> {
    type Target = Sort;

    fn deref(&self) -> &Self::Target {
        &self.sort
    }
}

impl<T> fmt::Debug for Sorted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sorted").field(&self.sort).finish()
    }
}

impl<T, S> FromRequestParts<S> for Sorted<T>
where
    T: SortTarget,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let binding = T::binding()?;
        let resolver = parts
            .extensions
            .get::<Arc<SortResolver>>()
            .cloned()
            .unwrap_or_default();

        let params = parts
            .uri
            .query()
            .map(RequestParams::from_query)
            .unwrap_or_default();

        Ok(Sorted::new(resolver.resolve_params(&params, &binding)))
    }
}
