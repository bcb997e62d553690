// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod catalog;
mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use catalog::Catalog;
use config::Config;
use crmgrid_core::{ColumnId, TableKey};
use crmgrid_store::{LayoutPersistence, SettingsStore, SqliteStore};
use runtime::{ConsoleRuntime, LayoutAction};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CRMGRID_LOG";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `crmgrid --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level());

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = SqliteStore::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or CRMGRID_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        store.seed_demo_data(config.document_key())?;
    }

    if options.check_only {
        info!(db = %db_path.display(), document = config.document_key(), "startup checks passed");
        return Ok(());
    }

    let runtime = ConsoleRuntime::new(
        LayoutPersistence::new(&store, config.document_key()),
        Catalog::from_config(&config),
    )
    .with_strip_keys(config.extra_strip_keys())
    .with_phone_country_code(config.phone_country_code());

    let output = match options.command.unwrap_or(Command::Tables) {
        Command::Tables => runtime.tables()?,
        Command::Layout { table, action } => runtime.layout(&table, action)?,
        Command::Payload { path } => runtime.payload(&read_input(&path)?)?,
        Command::Options {
            path,
            label_key,
            value_key,
            query,
        } => runtime.options(&read_input(&path)?, &label_key, &value_key, query.as_deref())?,
    };
    println!("{output}");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(error) = installed {
        eprintln!("logging disabled: {error}");
    }
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read input file {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Tables,
    Layout {
        table: TableKey,
        action: LayoutAction,
    },
    Payload {
        path: PathBuf,
    },
    Options {
        path: PathBuf,
        label_key: String,
        value_key: String,
        query: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            flag if flag.starts_with("--") => {
                bail!("unknown argument {flag:?}; run with --help to see supported options");
            }
            word => positional.push(word.to_owned()),
        }
    }

    options.command = parse_command(&positional)?;
    Ok(options)
}

fn parse_command(words: &[String]) -> Result<Option<Command>> {
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        [] => return Ok(None),
        ["tables"] => Command::Tables,
        ["layout", table, rest @ ..] => Command::Layout {
            table: TableKey::from(*table),
            action: parse_layout_action(rest)?,
        },
        ["payload", path] => Command::Payload {
            path: PathBuf::from(*path),
        },
        ["options", path, label_key, value_key, rest @ ..] if rest.len() <= 1 => {
            Command::Options {
                path: PathBuf::from(*path),
                label_key: (*label_key).to_owned(),
                value_key: (*value_key).to_owned(),
                query: rest.first().map(|query| (*query).to_owned()),
            }
        }
        [name, ..] if ["tables", "layout", "payload", "options"].contains(name) => {
            bail!("wrong arguments for `{name}`; run with --help to see its usage")
        }
        [name, ..] => {
            bail!("unknown command {name:?}; run with --help to see supported commands")
        }
    };
    Ok(Some(command))
}

fn parse_layout_action(words: &[&str]) -> Result<LayoutAction> {
    let action = match words {
        [] => LayoutAction::Print,
        ["show", column] => LayoutAction::Show(ColumnId::from(*column)),
        ["hide", column] => LayoutAction::Hide(ColumnId::from(*column)),
        ["move", from, to] => LayoutAction::Move {
            from: parse_position(from)?,
            to: parse_position(to)?,
        },
        ["reset"] => LayoutAction::Reset,
        _ => bail!(
            "unsupported layout action {:?}; use show <column>, hide <column>, move <from> <to>, or reset",
            words.join(" ")
        ),
    };
    Ok(action)
}

fn parse_position(raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("column position {raw:?} must be a non-negative integer"))
}

fn print_help() {
    println!("crmgrid: table layout and filter payload console");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use seeded demo layouts (in-memory)");
    println!("  --check                  Validate config + DB and exit");
    println!("  --help                   Show this help");
    println!();
    println!("commands:");
    println!("  tables                                      List known tables");
    println!("  layout <table>                              Print a table's layout");
    println!("  layout <table> show|hide <column>           Toggle a column and save");
    println!("  layout <table> move <from> <to>             Move a column and save");
    println!("  layout <table> reset                        Restore the default layout");
    println!("  payload <request.json>                      Compose a list request body");
    println!("  options <rows.json> <label> <value> [query] Normalize and narrow options");
}
