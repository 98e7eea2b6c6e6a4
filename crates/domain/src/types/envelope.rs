//! Response envelope types
//!
//! Endpoints wrap payloads as `{ "data": T, "meta": M }`. Callers only ever
//! see the unwrapped pair, never the envelope itself.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful call result: application data and optional metadata, kept apart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: Option<Value>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, meta: Option<Value>) -> Self {
        Self { data, meta }
    }

    /// Convert `data`, keeping `meta` untouched.
    ///
    /// # Errors
    /// Returns whatever `f` fails with.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<ApiResponse<U>, E> {
        Ok(ApiResponse { data: f(self.data)?, meta: self.meta })
    }

    /// Decode `meta` into a caller-chosen type.
    ///
    /// # Errors
    /// Returns the serde error when `meta` is present but does not match `M`.
    pub fn meta_as<M: DeserializeOwned>(&self) -> Result<Option<M>, serde_json::Error> {
        self.meta.as_ref().map(|m| serde_json::from_value(m.clone())).transpose()
    }

    /// Pagination metadata of a list response, if `meta` has that shape.
    pub fn page_meta(&self) -> Option<PageMeta> {
        self.meta_as().ok().flatten()
    }
}

/// Pagination metadata of list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_page_meta_from_list_meta() {
        let response =
            ApiResponse::new(json!(["a", "b"]), Some(json!({"total": 2, "page": 1, "limit": 10})));

        let meta = response.page_meta().unwrap();
        assert_eq!(meta, PageMeta { total: 2, page: 1, limit: 10 });
    }

    #[test]
    fn test_page_meta_absent_or_other_shape() {
        let none: ApiResponse<Value> = ApiResponse::new(json!(1), None);
        assert!(none.page_meta().is_none());

        let other = ApiResponse::new(json!(1), Some(json!({"cursor": "abc"})));
        assert!(other.page_meta().is_none());
    }

    #[test]
    fn test_try_map_keeps_meta() {
        let response = ApiResponse::new(2, Some(json!({"total": 2})));
        let mapped = response.try_map(|n| Ok::<_, String>(n * 10)).unwrap();

        assert_eq!(mapped.data, 20);
        assert_eq!(mapped.meta, Some(json!({"total": 2})));

        let failed = ApiResponse::new(2, None).try_map(|_| Err::<u8, _>("bad"));
        assert_eq!(failed, Err("bad"));
    }
}
