use crate::{
    app::AppContext,
    app_lib::{
        errors::{AppError, RawError},
        navigation::REFERENTIALS_PATH,
    },
    cli::globals::GlobalArgs,
    features::{
        auth::GuardDecision,
        referentials::{
            refresh_fn, ActionOutcome, Referential, ReferentialActions, ReferentialList,
            ReferentialSearchForm,
        },
    },
};
use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::{fmt::Write as _, sync::Arc};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub enum Command {
    Search {
        form: ReferentialSearchForm,
        json: bool,
    },
    Get {
        id: i64,
        json: bool,
    },
    SetActive {
        ids: Vec<i64>,
        active: bool,
    },
    Delete {
        ids: Vec<i64>,
    },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

/// Execute a referentials command.
/// # Errors
/// Returns an error if there is no session or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let ctx = args.globals.context(REFERENTIALS_PATH)?;
    ensure_signed_in(&ctx)?;

    match args.command {
        Command::Search { form, json } => {
            let mut list = ctx.referential_list();
            if let Err(err) = list.search(form).await {
                ctx.errors().show_error(&err);
                return Err(anyhow!(err));
            }
            print_rows(list.items(), json)?;
            if !json {
                println!("{} of {}", list.items().len(), list.total());
            }
        }
        Command::Get { id, json } => {
            let row = fetch(&ctx, id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&row)?);
            } else {
                print!("{}", render_details(&row));
            }
        }
        Command::SetActive { ids, active } => {
            let (actions, list) = actions_for(&ctx, &ids);
            let outcome = if let [id] = ids.as_slice() {
                let row = fetch(&ctx, *id).await?;
                actions.set_active(&row, active).await
            } else {
                actions.bulk_set_active(&as_rows(&ids), active).await
            };
            finish(outcome)?;
            print_rows(list.lock().await.items(), false)?;
        }
        Command::Delete { ids } => {
            let (actions, _) = actions_for(&ctx, &ids);
            finish(actions.bulk_delete(&as_rows(&ids)).await)?;
        }
    }

    Ok(())
}

/// Loads one row, notifying when it cannot be found.
async fn fetch(ctx: &AppContext, id: i64) -> Result<Referential> {
    let found = ctx
        .referentials()
        .get_by_id(id)
        .await
        .map_err(|err| report(ctx, err))?;
    let Some(row) = found else {
        let message = ctx
            .i18n()
            .t("referentiels.notFound", &[("id", id.to_string())]);
        ctx.toaster().warning(&message, None);
        bail!(message);
    };
    Ok(row)
}

/// Notifies a failed read, with the connectivity message when nothing answered.
fn report(ctx: &AppContext, err: RawError) -> AppError {
    let offline = matches!(&err, RawError::Transport(transport) if !transport.has_response());
    if offline {
        ctx.errors().handle_network_error(err)
    } else {
        ctx.errors().handle_api_error(err, true)
    }
}

fn ensure_signed_in(ctx: &AppContext) -> Result<()> {
    match ctx.auth_guard(REFERENTIALS_PATH) {
        GuardDecision::Proceed => Ok(()),
        GuardDecision::Redirect(target) => {
            ctx.toaster()
                .warning(&ctx.i18n().t("auth.notSignedIn", &[]), None);
            ctx.navigator().navigate(&target);
            bail!("sign in first with `fro-admin login`")
        }
    }
}

/// Actions whose refresh re-reads the touched rows into a shared list.
fn actions_for(
    ctx: &AppContext,
    ids: &[i64],
) -> (ReferentialActions, Arc<Mutex<ReferentialList>>) {
    let list = Arc::new(Mutex::new(ctx.referential_list()));
    let form = ReferentialSearchForm {
        ids: Some(ids.to_vec()),
        ..ReferentialSearchForm::default()
    };
    let refreshed = list.clone();
    let refresh = refresh_fn(move || {
        let list = refreshed.clone();
        let form = form.clone();
        async move { list.lock().await.search(form).await }
    });
    (ctx.referential_actions(refresh), list)
}

fn as_rows(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|id| Value::from(*id)).collect()
}

fn finish(outcome: ActionOutcome) -> Result<()> {
    debug!(?outcome, "referential action finished");
    match outcome {
        ActionOutcome::Completed { .. } => Ok(()),
        ActionOutcome::Skipped => bail!("nothing to do"),
        ActionOutcome::Failed(err) => Err(anyhow!(err)),
    }
}

fn print_rows(rows: &[Referential], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        print!("{}", render_table(rows));
    }
    Ok(())
}

fn render_table(rows: &[Referential]) -> String {
    let headers = ["ID", "CODE", "LABEL", "TYPE", "ACTIVE"];
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.id.map(|id| id.to_string()).unwrap_or_default(),
                row.code.clone(),
                row.display_label().to_string(),
                row.data_type.clone(),
                if row.active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(headers.map(String::from).as_slice());
    for row in &cells {
        line(row.as_slice());
    }
    out
}

fn render_details(row: &Referential) -> String {
    let mut out = String::new();
    let fields = [
        ("id", row.id.map(|id| id.to_string())),
        ("code", Some(row.code.clone())),
        ("label", Some(row.label.clone())),
        ("data type", Some(row.data_type.clone())),
        ("locale", Some(row.locale.clone())),
        ("active", Some(row.active.to_string())),
        ("display order", Some(row.display_order.to_string())),
        ("description", row.description.clone()),
        ("external code", row.external_code.clone()),
        ("type", row.type_label.clone().or_else(|| row.type_code.clone())),
        (
            "sub-type",
            row.sub_type_label.clone().or_else(|| row.sub_type_code.clone()),
        ),
        (
            "parent",
            row.parent_label.clone().or_else(|| row.parent_code.clone()),
        ),
        ("start date", row.start_date.clone()),
        ("end date", row.end_date.clone()),
        ("created at", row.created_at.clone()),
        ("updated at", row.updated_at.clone()),
    ];
    for (name, value) in fields {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            let _ = writeln!(out, "{name:<14}{value}");
        }
    }
    out
}
