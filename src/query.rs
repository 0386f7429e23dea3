//! Generic query engine shared by every collection endpoint.
//!
//! Entity modules wrap [`Query`] with typed filter setters; the engine
//! contributes parameter accumulation, pagination and execution uniformly.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::api::ApiHandle;
use crate::error::Result;
use crate::pagination::Pagination;
use crate::params::QueryParams;

/// Sort direction for collection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Accumulated state of one collection query: filters in setter order plus an
/// optional pagination override. Single-use; consumed by [`Query::run`].
pub(crate) struct Query<T> {
    api: ApiHandle,
    path: String,
    params: QueryParams,
    pagination: Option<Pagination>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Query<T> {
    pub(crate) fn new(api: ApiHandle, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
            params: QueryParams::new(),
            pagination: None,
            _marker: PhantomData,
        }
    }

    /// Store a filter parameter. Repeated keys overwrite, never accumulate.
    pub(crate) fn set_param(&mut self, key: &str, value: impl ToString) {
        self.params.set(key, value);
    }

    pub(crate) fn set_pagination(&mut self, pagination: Pagination) {
        self.pagination = Some(pagination);
    }

    /// Execute the query and return raw entities in server order.
    pub(crate) async fn run(self) -> Result<Vec<T>> {
        let pagination = self.pagination.unwrap_or(Pagination::Page {
            page: 1,
            per_page: self.api.default_per_page(),
        });
        self.api.get_list(&self.path, &self.params, pagination).await
    }
}
