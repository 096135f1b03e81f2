use super::{
    client::ReferentialQueryService,
    types::{Referential, ReferentialSearchForm, SortSpec},
};
use crate::app_lib::errors::{parse_error, AppError};
use tracing::{debug, error};

/// Sort sent with every search, replacing whatever the caller asked for.
/// Existing listings rely on this order; caller-provided sorts are ignored.
#[must_use]
pub fn forced_sorts() -> Vec<SortSpec> {
    vec![SortSpec::asc("code"), SortSpec::asc("label")]
}

/// Last search result plus its loading and error state.
#[derive(Debug)]
pub struct ReferentialList {
    service: ReferentialQueryService,
    items: Vec<Referential>,
    total: u64,
    loading: bool,
    error: Option<AppError>,
    last_form: Option<ReferentialSearchForm>,
}

impl ReferentialList {
    #[must_use]
    pub fn new(service: ReferentialQueryService) -> Self {
        Self {
            service,
            items: Vec::new(),
            total: 0,
            loading: false,
            error: None,
            last_form: None,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Referential] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    /// # Errors
    /// Returns the normalized failure; items and total are cleared.
    pub async fn search(&mut self, mut form: ReferentialSearchForm) -> Result<(), AppError> {
        self.loading = true;
        self.error = None;
        form.sorts = Some(forced_sorts());
        self.last_form = Some(form.clone());

        let result = self.service.search(&form).await;
        self.loading = false;

        match result {
            Ok(page) => {
                debug!(count = page.items.len(), total = page.total, "referentials loaded");
                self.items = page.items;
                self.total = page.total;
                Ok(())
            }
            Err(err) => {
                let app_error = parse_error(err);
                error!(code = ?app_error.code(), "Error in referential search: {app_error}");
                self.items.clear();
                self.total = 0;
                self.error = Some(app_error.clone());
                Err(app_error)
            }
        }
    }

    /// Re-runs the last search, or an empty one when nothing was searched yet.
    ///
    /// # Errors
    /// Returns the normalized failure of the search.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        let form = self.last_form.clone().unwrap_or_default();
        self.search(form).await
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.total = 0;
        self.error = None;
        self.loading = false;
    }
}
