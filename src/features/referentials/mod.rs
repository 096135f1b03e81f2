//! Referentials feature: search with legacy response reconciliation, the
//! listing state, and bulk actions with notifications.

pub mod actions;
pub mod client;
pub mod list;
pub mod operators;
pub mod types;

pub use actions::{extract_ids, refresh_fn, ActionOutcome, ReferentialActions, RefreshFn};
pub use client::{normalize_page, PageShape, ReferentialQueryService};
pub use list::ReferentialList;
pub use operators::to_backend;
pub use types::{
    BulkDeleteResult, BulkUpdateActiveResult, FilterSpec, PaginatedResult, RangeSpec,
    Referential, ReferentialSearchForm, SortSpec,
};
