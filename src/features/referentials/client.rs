//! Requests against `/referentiels/*`.
//!
//! The search endpoint has answered in several shapes over time. They are
//! reconciled here, once, into `PaginatedResult`:
//!
//! | shape                        | result                                     |
//! |------------------------------|--------------------------------------------|
//! | `{items, total, page, size}` | as-is, missing counts taken from `items`   |
//! | `[...]`                      | whole page: total = size = len, page 0     |
//! | `{data: <either of above>}`  | same rules one level down                  |
//! | anything else                | empty page with zero counts                |

use super::types::{
    BulkDeleteRequest, BulkDeleteResult, BulkUpdateActiveRequest, BulkUpdateActiveResult,
    PaginatedResult, Referential, ReferentialSearchForm,
};
use crate::app_lib::{errors::RawError, HttpClient};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const SEARCH_ENDPOINT: &str = "/referentiels/search";
pub const BULK_UPDATE_ACTIVE_ENDPOINT: &str = "/referentiels/bulk-update-active";
pub const BULK_DELETE_ENDPOINT: &str = "/referentiels/bulk-delete";

/// Response shapes the search endpoint is known to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageShape {
    ItemsEnvelope,
    BareArray,
    DataItemsEnvelope,
    DataArray,
    Unrecognized,
}

impl PageShape {
    #[must_use]
    pub fn detect(value: &Value) -> Self {
        if has_items(value) {
            return Self::ItemsEnvelope;
        }
        if value.is_array() {
            return Self::BareArray;
        }
        match value.get("data") {
            Some(data) if has_items(data) => Self::DataItemsEnvelope,
            Some(Value::Array(_)) => Self::DataArray,
            _ => Self::Unrecognized,
        }
    }
}

fn has_items(value: &Value) -> bool {
    value.get("items").is_some_and(Value::is_array)
}

/// Coerces any search response into one paginated shape.
#[must_use]
pub fn normalize_page(value: Value) -> PaginatedResult<Value> {
    let shape = PageShape::detect(&value);
    debug!(?shape, "normalizing search response");

    match (shape, value) {
        (PageShape::ItemsEnvelope, Value::Object(envelope)) => from_items_envelope(envelope),
        (PageShape::BareArray, Value::Array(items)) => PaginatedResult::whole(items),
        (PageShape::DataItemsEnvelope, Value::Object(mut wrapper)) => {
            match wrapper.remove("data") {
                Some(Value::Object(envelope)) => from_items_envelope(envelope),
                _ => PaginatedResult::empty(),
            }
        }
        (PageShape::DataArray, Value::Object(mut wrapper)) => match wrapper.remove("data") {
            Some(Value::Array(items)) => PaginatedResult::whole(items),
            _ => PaginatedResult::empty(),
        },
        _ => PaginatedResult::empty(),
    }
}

fn from_items_envelope(mut envelope: Map<String, Value>) -> PaginatedResult<Value> {
    let items = match envelope.remove("items") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let len = items.len() as u64;
    let count = |key: &str| envelope.get(key).and_then(Value::as_u64);

    PaginatedResult {
        total: count("total").unwrap_or(len),
        page: count("page").unwrap_or(0),
        size: count("size").unwrap_or(len),
        items,
    }
}

/// `data` when the server wrapped the object, the object itself otherwise.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(|data| !data.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Missing fields default to zero and to the requested flag.
fn update_result(value: Value, active: bool) -> BulkUpdateActiveResult {
    let body = unwrap_data(value);
    BulkUpdateActiveResult {
        updated_count: body.get("updatedCount").and_then(Value::as_u64).unwrap_or(0),
        active: body.get("active").and_then(Value::as_bool).unwrap_or(active),
    }
}

fn delete_result(value: Value) -> BulkDeleteResult {
    let body = unwrap_data(value);
    BulkDeleteResult {
        deleted_count: body.get("deletedCount").and_then(Value::as_u64).unwrap_or(0),
    }
}

#[derive(Clone, Debug)]
pub struct ReferentialQueryService {
    http: Arc<HttpClient>,
}

impl ReferentialQueryService {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// # Errors
    /// Returns the raw transport failure, or a decoding failure when an item
    /// is not a referential.
    #[instrument(skip_all)]
    pub async fn search(
        &self,
        form: &ReferentialSearchForm,
    ) -> Result<PaginatedResult<Referential>, RawError> {
        let page = normalize_page(self.http.post(SEARCH_ENDPOINT, form).await?);
        let items = page
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Referential>, _>>()?;

        debug!(count = items.len(), total = page.total, "search completed");
        Ok(PaginatedResult {
            items,
            total: page.total,
            page: page.page,
            size: page.size,
        })
    }

    /// Looks a referential up through the search endpoint.
    ///
    /// # Errors
    /// Returns the raw transport or decoding failure.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Referential>, RawError> {
        let page = self.search(&ReferentialSearchForm::by_id(id)).await?;
        Ok(page.items.into_iter().next())
    }

    /// # Errors
    /// Returns the raw transport failure.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn bulk_update_active(
        &self,
        ids: &[i64],
        active: bool,
    ) -> Result<BulkUpdateActiveResult, RawError> {
        let response = self
            .http
            .post(BULK_UPDATE_ACTIVE_ENDPOINT, &BulkUpdateActiveRequest { ids, active })
            .await?;
        let result = update_result(response, active);
        if result.updated_count == 0 {
            warn!("bulk update reported no updated rows");
        }
        Ok(result)
    }

    /// # Errors
    /// Returns the raw transport failure.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<BulkDeleteResult, RawError> {
        let response = self
            .http
            .post(BULK_DELETE_ENDPOINT, &BulkDeleteRequest { ids })
            .await?;
        Ok(delete_result(response))
    }
}
