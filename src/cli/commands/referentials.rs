use clap::{Arg, ArgAction, Command};

pub const ARG_ID: &str = "id";
pub const ARG_IDS: &str = "ids";
pub const ARG_CODE: &str = "code";
pub const ARG_LABEL: &str = "label";
pub const ARG_DATA_TYPE: &str = "data-type";
pub const ARG_TYPE_ID: &str = "type-id";
pub const ARG_SUB_TYPE_ID: &str = "sub-type-id";
pub const ARG_PARENT_ID: &str = "parent-id";
pub const ARG_ACTIVE: &str = "active";
pub const ARG_LANG: &str = "lang";
pub const ARG_PAGE: &str = "page";
pub const ARG_SIZE: &str = "size";
pub const ARG_FILTER: &str = "filter";
pub const ARG_RANGE: &str = "range";
pub const ARG_LOGICAL_OPERATOR: &str = "logical-operator";
pub const ARG_INCLUDE_DELETED: &str = "include-deleted";
pub const ARG_JSON: &str = "json";

fn ids(help: &'static str) -> Arg {
    Arg::new(ARG_IDS)
        .help(help)
        .required(true)
        .num_args(1..)
        .value_parser(clap::value_parser!(i64))
}

fn json() -> Arg {
    Arg::new(ARG_JSON)
        .long(ARG_JSON)
        .help("Print results as JSON")
        .action(ArgAction::SetTrue)
}

fn id_filter(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .value_parser(clap::value_parser!(i64))
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new("referentials")
        .about("Search and manage referentials")
        .visible_alias("ref")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("search")
                .about("Search referentials")
                .arg(Arg::new(ARG_CODE).long(ARG_CODE).help("Exact code"))
                .arg(Arg::new(ARG_LABEL).long(ARG_LABEL).help("Label"))
                .arg(Arg::new(ARG_DATA_TYPE).long(ARG_DATA_TYPE).help("Data type"))
                .arg(id_filter(ARG_TYPE_ID, "Type id"))
                .arg(id_filter(ARG_SUB_TYPE_ID, "Sub-type id"))
                .arg(id_filter(ARG_PARENT_ID, "Parent id"))
                .arg(
                    Arg::new(ARG_ACTIVE)
                        .long(ARG_ACTIVE)
                        .help("Only active (true) or inactive (false) rows")
                        .value_parser(clap::value_parser!(bool)),
                )
                .arg(Arg::new(ARG_LANG).long(ARG_LANG).help("Referential locale"))
                .arg(
                    Arg::new(ARG_PAGE)
                        .long(ARG_PAGE)
                        .help("Page index, starting at 0")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new(ARG_SIZE)
                        .long(ARG_SIZE)
                        .help("Page size")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new(ARG_FILTER)
                        .long(ARG_FILTER)
                        .help("Filter as field:operator:value, e.g. label:startsWith:Fr")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new(ARG_RANGE)
                        .long(ARG_RANGE)
                        .help("Range as field:min:max; either bound may be empty")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new(ARG_LOGICAL_OPERATOR)
                        .long(ARG_LOGICAL_OPERATOR)
                        .help("How filters combine")
                        .value_parser(["AND", "OR"]),
                )
                .arg(
                    Arg::new(ARG_INCLUDE_DELETED)
                        .long(ARG_INCLUDE_DELETED)
                        .help("Include deleted rows")
                        .action(ArgAction::SetTrue),
                )
                .arg(json()),
        )
        .subcommand(
            Command::new("get")
                .about("Show one referential")
                .arg(
                    Arg::new(ARG_ID)
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(json()),
        )
        .subcommand(
            Command::new("activate")
                .about("Activate referentials")
                .arg(ids("Referential ids")),
        )
        .subcommand(
            Command::new("deactivate")
                .about("Deactivate referentials")
                .arg(ids("Referential ids")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete referentials")
                .arg(ids("Referential ids")),
        )
}
