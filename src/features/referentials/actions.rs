//! Bulk and single-row activate/deactivate/delete flows.
//!
//! Every flow runs in the same order: extract ids, call the service, await
//! the caller's refresh, then notify. Nothing is notified before the refresh
//! settles, and no request is sent when the selection holds no usable id.

use super::{client::ReferentialQueryService, types::Referential};
use crate::app_lib::{
    errors::{parse_error, AppError, RawError},
    i18n::Translator,
    notify::{RichText, Toaster},
};
use serde_json::Value;
use std::{future::Future, pin::Pin, sync::Arc};
use tracing::{debug, info};

pub type RefreshFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send>>;

/// Re-runs the current search so the visible list reflects a mutation.
pub type RefreshFn = Arc<dyn Fn() -> RefreshFuture + Send + Sync>;

/// Wraps an async closure as a `RefreshFn`.
pub fn refresh_fn<F, Fut>(refresh: F) -> RefreshFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), AppError>> + Send + 'static,
{
    Arc::new(move || Box::pin(refresh()))
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// No usable id; a warning was shown and nothing was sent.
    Skipped,
    Completed { count: u64 },
    Failed(AppError),
}

impl ActionOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Ids from raw id values or row objects carrying an `id`; nulls and
/// non-numeric values are dropped.
#[must_use]
pub fn extract_ids(rows: &[Value]) -> Vec<i64> {
    rows.iter()
        .filter_map(|row| match row {
            Value::Object(map) => map.get("id").and_then(as_id),
            other => as_id(other),
        })
        .collect()
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub struct ReferentialActions {
    service: ReferentialQueryService,
    toaster: Toaster,
    i18n: Arc<Translator>,
    refresh: RefreshFn,
}

impl ReferentialActions {
    #[must_use]
    pub fn new(
        service: ReferentialQueryService,
        toaster: Toaster,
        i18n: Arc<Translator>,
        refresh: RefreshFn,
    ) -> Self {
        Self {
            service,
            toaster,
            i18n,
            refresh,
        }
    }

    pub async fn bulk_set_active(&self, rows: &[Value], active: bool) -> ActionOutcome {
        let ids = extract_ids(rows);
        if ids.is_empty() {
            return self.skip("referentiels.noValidIds");
        }
        info!(count = ids.len(), active, "bulk active update");

        let error_key = if active {
            "referentiels.bulkActivateError"
        } else {
            "referentiels.bulkDeactivateError"
        };
        let result = match self.service.bulk_update_active(&ids, active).await {
            Ok(result) => result,
            Err(err) => return self.fail(error_key, err),
        };
        if let Err(err) = (self.refresh)().await {
            return self.fail_normalized(error_key, err);
        }

        let count = result.updated_count;
        let (title_key, description_key) = if active {
            (
                "referentiels.bulkActivateSuccess",
                "referentiels.bulkActivateSuccessDescription",
            )
        } else {
            (
                "referentiels.bulkDeactivateSuccess",
                "referentiels.bulkDeactivateSuccessDescription",
            )
        };
        self.notify_count(title_key, description_key, count);
        ActionOutcome::Completed { count }
    }

    pub async fn set_active(&self, row: &Referential, active: bool) -> ActionOutcome {
        let Some(id) = row.id else {
            return self.skip("referentiels.noValidId");
        };
        info!(id, active, "active update");

        let error_key = if active {
            "referentiels.activateError"
        } else {
            "referentiels.deactivateError"
        };
        let result = match self.service.bulk_update_active(&[id], active).await {
            Ok(result) => result,
            Err(err) => return self.fail(error_key, err),
        };
        if let Err(err) = (self.refresh)().await {
            return self.fail_normalized(error_key, err);
        }

        let (title_key, description_key) = if active {
            (
                "referentiels.activateSuccess",
                "referentiels.activateSuccessDescription",
            )
        } else {
            (
                "referentiels.deactivateSuccess",
                "referentiels.deactivateSuccessDescription",
            )
        };
        let description = self.i18n.t(
            description_key,
            &[("label", row.display_label().to_string())],
        );
        self.toaster
            .success_rich(RichText::plain(self.i18n.t(title_key, &[])), Some(description));
        ActionOutcome::Completed {
            count: result.updated_count,
        }
    }

    pub async fn bulk_delete(&self, rows: &[Value]) -> ActionOutcome {
        let ids = extract_ids(rows);
        if ids.is_empty() {
            return self.skip("referentiels.noValidIds");
        }
        info!(count = ids.len(), "bulk delete");

        let error_key = "referentiels.bulkDeleteError";
        let result = match self.service.bulk_delete(&ids).await {
            Ok(result) => result,
            Err(err) => return self.fail(error_key, err),
        };
        if let Err(err) = (self.refresh)().await {
            return self.fail_normalized(error_key, err);
        }

        let count = result.deleted_count;
        self.notify_count(
            "referentiels.bulkDeleteSuccess",
            "referentiels.bulkDeleteSuccessDescription",
            count,
        );
        ActionOutcome::Completed { count }
    }

    fn notify_count(&self, title_key: &str, description_key: &str, count: u64) {
        let args = [("count", count.to_string())];
        let title = self.i18n.t_rich(title_key, &args, Some("count"));
        let description = self.i18n.t(description_key, &args);
        self.toaster.success_rich(title, Some(description));
    }

    fn skip(&self, key: &str) -> ActionOutcome {
        debug!("nothing to act on");
        self.toaster.warning(&self.i18n.t(key, &[]), None);
        ActionOutcome::Skipped
    }

    fn fail(&self, title_key: &str, err: RawError) -> ActionOutcome {
        self.fail_normalized(title_key, parse_error(err))
    }

    fn fail_normalized(&self, title_key: &str, app_error: AppError) -> ActionOutcome {
        let description = if app_error.message().is_empty() {
            self.i18n.t("common.errorOccurred", &[])
        } else {
            app_error.message().to_string()
        };
        self.toaster
            .error(&self.i18n.t(title_key, &[]), Some(description));
        ActionOutcome::Failed(app_error)
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_ids, refresh_fn, ActionOutcome, ReferentialActions};
    use crate::{
        app_lib::{
            notify::{Level, MemoryNotifier, Toaster},
            AppConfig, ConsoleNavigator, HttpClient, MemoryStorage, Translator,
        },
        features::referentials::{client::ReferentialQueryService, types::Referential},
    };
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn actions(notifier: &Arc<MemoryNotifier>, refreshes: &Arc<AtomicUsize>) -> ReferentialActions {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9/api".to_string(),
            api_timeout_ms: 500,
            ..AppConfig::default()
        };
        let http = HttpClient::new(
            &config,
            Arc::new(MemoryStorage::new()),
            Arc::new(ConsoleNavigator::default()),
        )
        .unwrap();
        let counter = refreshes.clone();
        ReferentialActions::new(
            ReferentialQueryService::new(Arc::new(http)),
            Toaster::new(notifier.clone()),
            Arc::new(Translator::with_locale("en")),
            refresh_fn(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        )
    }

    #[test]
    fn extract_ids_accepts_mixed_rows() {
        let rows = [
            json!(1),
            json!({"id": 2, "code": "FR"}),
            json!(null),
            json!({"id": null}),
            json!({"code": "no-id"}),
            json!("3"),
            json!(true),
        ];
        assert_eq!(extract_ids(&rows), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_selection_warns_without_request() {
        let notifier = Arc::new(MemoryNotifier::new());
        let refreshes = Arc::new(AtomicUsize::new(0));
        let actions = actions(&notifier, &refreshes);

        let outcome = actions.bulk_set_active(&[json!(null), json!({})], true).await;
        assert_eq!(outcome, ActionOutcome::Skipped);
        let outcome = actions.bulk_delete(&[]).await;
        assert_eq!(outcome, ActionOutcome::Skipped);

        let shown = notifier.notifications();
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|n| n.level == Level::Warning));
        assert_eq!(shown[0].title.plain_text(), "No valid referentials selected");
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn row_without_id_warns() {
        let notifier = Arc::new(MemoryNotifier::new());
        let refreshes = Arc::new(AtomicUsize::new(0));
        let outcome = actions(&notifier, &refreshes)
            .set_active(&Referential::default(), false)
            .await;

        assert_eq!(outcome, ActionOutcome::Skipped);
        assert_eq!(
            notifier.last().unwrap().title.plain_text(),
            "This referential has no identifier"
        );
    }

    #[tokio::test]
    async fn transport_failure_notifies_error_and_skips_refresh() {
        let notifier = Arc::new(MemoryNotifier::new());
        let refreshes = Arc::new(AtomicUsize::new(0));
        let outcome = actions(&notifier, &refreshes)
            .bulk_delete(&[json!(1)])
            .await;

        assert!(matches!(outcome, ActionOutcome::Failed(_)));
        let shown = notifier.last().unwrap();
        assert_eq!(shown.level, Level::Error);
        assert_eq!(shown.title.plain_text(), "Failed to delete referentials");
        assert!(shown.description.is_some());
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
    }
}
