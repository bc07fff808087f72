// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use crewdesk_app::{AppState, Page, RecordBook};
use runtime::BookRuntime;
use std::env;
use std::path::PathBuf;

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
            "load config {}; run `crewdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let book = if options.demo {
        crewdesk_testkit::demo_book()
    } else {
        RecordBook::default()
    };
    let mut runtime = BookRuntime::new(book, config.settings(), config.default_status());

    if let Some(path) = &options.import_path {
        let (parsed, ids) = runtime
            .import_file(path)
            .with_context(|| format!("import {}", path.display()))?;
        println!("{}", parsed.summary());
        println!(
            "{} leads imported, {} in book",
            ids.len(),
            runtime.book().leads().len()
        );
        return Ok(());
    }

    if options.check_only {
        return Ok(());
    }

    let mut state = AppState::default();
    if !config.show_dashboard() {
        state.active_page = Page::Leads;
    }
    crewdesk_tui::run_app(&mut state, &mut runtime, config.ui_options())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    import_path: Option<PathBuf>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        import_path: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--import" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--import requires a CSV or TSV file path"))?;
                options.import_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
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
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("crewdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with sample leads, crews and properties");
    println!("  --import <file>          Import a CSV/TSV lead file, print a summary and exit");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
}
