use crate::{
    app_lib::Theme,
    cli::{
        actions::{auth, preferences, referentials, Action},
        commands::{
            auth as auth_args, client, preferences as preference_args, referentials as ref_args,
        },
        globals::GlobalArgs,
    },
    features::{
        auth::RegisterData,
        referentials::{FilterSpec, RangeSpec, ReferentialSearchForm},
    },
};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use serde_json::Value;
use std::collections::BTreeMap;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    required(matches, id).map(SecretString::from)
}

/// Scalars keep their JSON type (`42`, `true`); anything else is a string.
fn filter_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Parses `field:operator:value`; the value may itself contain colons.
fn parse_filter(raw: &str) -> Result<FilterSpec> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(operator), Some(value))
            if !field.trim().is_empty() && !operator.trim().is_empty() =>
        {
            Ok(FilterSpec::new(
                field.trim(),
                operator.trim(),
                filter_value(value),
            ))
        }
        _ => bail!("invalid filter {raw:?}, expected field:operator:value"),
    }
}

/// Parses `field:min:max`; an empty bound is left open.
fn parse_range(raw: &str) -> Result<(String, RangeSpec)> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [field, min, max] = parts.as_slice() else {
        bail!("invalid range {raw:?}, expected field:min:max");
    };
    if field.trim().is_empty() {
        bail!("invalid range {raw:?}, field is empty");
    }
    let bound = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| filter_value(value))
    };
    Ok((
        field.trim().to_string(),
        RangeSpec {
            min: bound(min),
            max: bound(max),
        },
    ))
}

fn search_form(matches: &ArgMatches) -> Result<ReferentialSearchForm> {
    let filters = matches
        .get_many::<String>(ref_args::ARG_FILTER)
        .map(|values| values.map(|raw| parse_filter(raw)).collect::<Result<Vec<_>>>())
        .transpose()?;
    let ranges = matches
        .get_many::<String>(ref_args::ARG_RANGE)
        .map(|values| {
            values
                .map(|raw| parse_range(raw))
                .collect::<Result<BTreeMap<_, _>>>()
        })
        .transpose()?;

    Ok(ReferentialSearchForm {
        code: matches.get_one::<String>(ref_args::ARG_CODE).cloned(),
        label: matches.get_one::<String>(ref_args::ARG_LABEL).cloned(),
        data_type: matches.get_one::<String>(ref_args::ARG_DATA_TYPE).cloned(),
        type_id: matches.get_one::<i64>(ref_args::ARG_TYPE_ID).copied(),
        sub_type_id: matches.get_one::<i64>(ref_args::ARG_SUB_TYPE_ID).copied(),
        parent_id: matches.get_one::<i64>(ref_args::ARG_PARENT_ID).copied(),
        active: matches.get_one::<bool>(ref_args::ARG_ACTIVE).copied(),
        locale: matches.get_one::<String>(ref_args::ARG_LANG).cloned(),
        page: matches.get_one::<u64>(ref_args::ARG_PAGE).copied(),
        size: matches.get_one::<u64>(ref_args::ARG_SIZE).copied(),
        filters,
        ranges,
        logical_operator: matches
            .get_one::<String>(ref_args::ARG_LOGICAL_OPERATOR)
            .cloned(),
        include_deleted: matches
            .get_flag(ref_args::ARG_INCLUDE_DELETED)
            .then_some(true),
        ..ReferentialSearchForm::default()
    })
}

fn ids(matches: &ArgMatches) -> Vec<i64> {
    matches
        .get_many::<i64>(ref_args::ARG_IDS)
        .map(|values| values.copied().collect())
        .unwrap_or_default()
}

fn referentials_command(matches: &ArgMatches) -> Result<referentials::Command> {
    let command = match matches.subcommand() {
        Some(("search", sub)) => referentials::Command::Search {
            form: search_form(sub)?,
            json: sub.get_flag(ref_args::ARG_JSON),
        },
        Some(("get", sub)) => referentials::Command::Get {
            id: sub
                .get_one::<i64>(ref_args::ARG_ID)
                .copied()
                .context("missing referential id")?,
            json: sub.get_flag(ref_args::ARG_JSON),
        },
        Some(("activate", sub)) => referentials::Command::SetActive {
            ids: ids(sub),
            active: true,
        },
        Some(("deactivate", sub)) => referentials::Command::SetActive {
            ids: ids(sub),
            active: false,
        },
        Some(("delete", sub)) => referentials::Command::Delete { ids: ids(sub) },
        _ => bail!("unknown referentials command"),
    };
    Ok(command)
}

fn auth_command(name: &str, sub: &ArgMatches) -> Result<Option<auth::Command>> {
    let command = match name {
        "login" => auth::Command::Login {
            email: required(sub, auth_args::ARG_EMAIL)?,
            password: secret(sub, auth_args::ARG_PASSWORD)?,
            remember_me: sub.get_flag(auth_args::ARG_REMEMBER_ME),
        },
        "register" => auth::Command::Register(RegisterData {
            email: required(sub, auth_args::ARG_EMAIL)?,
            password: secret(sub, auth_args::ARG_PASSWORD)?,
            confirm_password: secret(sub, auth_args::ARG_CONFIRM_PASSWORD)?,
            first_name: sub.get_one::<String>(auth_args::ARG_FIRST_NAME).cloned(),
            last_name: sub.get_one::<String>(auth_args::ARG_LAST_NAME).cloned(),
        }),
        "logout" => auth::Command::Logout,
        "whoami" => auth::Command::Whoami,
        "refresh" => auth::Command::Refresh,
        "forgot-password" => auth::Command::ForgotPassword {
            email: required(sub, auth_args::ARG_EMAIL)?,
        },
        "reset-password" => auth::Command::ResetPassword {
            token: secret(sub, auth_args::ARG_TOKEN)?,
            password: secret(sub, auth_args::ARG_PASSWORD)?,
            confirm_password: secret(sub, auth_args::ARG_CONFIRM_PASSWORD)?,
        },
        "change-password" => auth::Command::ChangePassword {
            current_password: secret(sub, auth_args::ARG_CURRENT_PASSWORD)?,
            new_password: secret(sub, auth_args::ARG_NEW_PASSWORD)?,
            confirm_password: secret(sub, auth_args::ARG_CONFIRM_PASSWORD)?,
        },
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::new(client::Options::parse(matches));
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing command"))?;

    if let Some(command) = auth_command(name, sub)? {
        return Ok(Action::Auth(auth::Args { globals, command }));
    }

    match name {
        "referentials" => Ok(Action::Referentials(referentials::Args {
            globals,
            command: referentials_command(sub)?,
        })),
        "locale" => Ok(Action::Preferences(preferences::Args {
            globals,
            command: preferences::Command::Locale(
                sub.get_one::<String>(preference_args::ARG_CODE).cloned(),
            ),
        })),
        "theme" => {
            let theme = sub
                .get_one::<String>(preference_args::ARG_MODE)
                .map(|mode| mode.parse::<Theme>().map_err(|err| anyhow!(err)))
                .transpose()?;
            Ok(Action::Preferences(preferences::Args {
                globals,
                command: preferences::Command::Theme(theme),
            }))
        }
        other => bail!("unknown command: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args.iter().copied())?;
        handler(&matches)
    }

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter("label:startsWith:Fr").unwrap();
        assert_eq!(filter.field, "label");
        assert_eq!(filter.operator, "STARTS_WITH");
        assert_eq!(filter.value, json!("Fr"));

        let filter = parse_filter("displayOrder:greaterThanOrEqual:3").unwrap();
        assert_eq!(filter.operator, "GREATER_THAN_OR_EQUAL");
        assert_eq!(filter.value, json!(3));

        let filter = parse_filter("updatedAt:equals:2024-01-01T10:00:00").unwrap();
        assert_eq!(filter.value, json!("2024-01-01T10:00:00"));

        assert!(parse_filter("label").is_err());
        assert!(parse_filter(":equals:x").is_err());
    }

    #[test]
    fn test_parse_range() {
        let (field, range) = parse_range("displayOrder:1:").unwrap();
        assert_eq!(field, "displayOrder");
        assert_eq!(range.min, Some(json!(1)));
        assert_eq!(range.max, None);

        assert!(parse_range("displayOrder:1").is_err());
        assert!(parse_range(":1:2").is_err());
    }

    #[test]
    fn test_dispatch_search() {
        let action = dispatch(&[
            "fro-admin",
            "referentials",
            "search",
            "--code",
            "FR",
            "--active",
            "true",
            "--filter",
            "label:contains:ran",
            "--range",
            "displayOrder:1:10",
            "--include-deleted",
            "--json",
        ])
        .unwrap();

        let Action::Referentials(referentials::Args {
            command: referentials::Command::Search { form, json },
            ..
        }) = action
        else {
            panic!("expected a search action");
        };
        assert!(json);
        assert_eq!(form.code.as_deref(), Some("FR"));
        assert_eq!(form.active, Some(true));
        assert_eq!(form.include_deleted, Some(true));
        assert_eq!(form.filters.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            form.ranges.as_ref().and_then(|ranges| ranges.get("displayOrder")),
            Some(&RangeSpec {
                min: Some(json!(1)),
                max: Some(json!(10)),
            })
        );
        assert!(form.sorts.is_none());
    }

    #[test]
    fn test_dispatch_bulk_actions() {
        let action = dispatch(&["fro-admin", "ref", "deactivate", "4", "5"]).unwrap();
        assert!(matches!(
            action,
            Action::Referentials(referentials::Args {
                command: referentials::Command::SetActive { ref ids, active: false },
                ..
            }) if ids == &vec![4, 5]
        ));

        let action = dispatch(&["fro-admin", "referentials", "delete", "9"]).unwrap();
        assert!(matches!(
            action,
            Action::Referentials(referentials::Args {
                command: referentials::Command::Delete { ref ids },
                ..
            }) if ids == &vec![9]
        ));
    }

    #[test]
    fn test_dispatch_login() {
        temp_env::with_vars(
            [
                ("FRO_ADMIN_EMAIL", None::<&str>),
                ("FRO_ADMIN_PASSWORD", Some("s3cret")),
            ],
            || {
                let action = dispatch(&[
                    "fro-admin",
                    "login",
                    "--email",
                    "ops@example.com",
                    "--remember-me",
                ])
                .unwrap();
                let Action::Auth(auth::Args {
                    command:
                        auth::Command::Login {
                            email,
                            password,
                            remember_me,
                        },
                    ..
                }) = action
                else {
                    panic!("expected a login action");
                };
                assert_eq!(email, "ops@example.com");
                assert_eq!(password.expose_secret(), "s3cret");
                assert!(remember_me);
            },
        );
    }

    #[test]
    fn test_dispatch_preferences() {
        let action = dispatch(&["fro-admin", "theme", "dark"]).unwrap();
        assert!(matches!(
            action,
            Action::Preferences(preferences::Args {
                command: preferences::Command::Theme(Some(Theme::Dark)),
                ..
            })
        ));

        let action = dispatch(&["fro-admin", "locale"]).unwrap();
        assert!(matches!(
            action,
            Action::Preferences(preferences::Args {
                command: preferences::Command::Locale(None),
                ..
            })
        ));
    }

    #[test]
    fn test_dispatch_globals() {
        temp_env::with_vars([("FRO_ADMIN_STATE_FILE", None::<&str>)], || {
            let action = dispatch(&[
                "fro-admin",
                "--api-url",
                "http://backend.tld/api",
                "logout",
            ])
            .unwrap();
            let Action::Auth(args) = action else {
                panic!("expected an auth action");
            };
            assert_eq!(
                args.globals.options.api_url.as_deref(),
                Some("http://backend.tld/api")
            );
        });
    }
}
