// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cfgview-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cfgview and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cfgview CLI entrypoint.
//!
//! Runs the interactive graph TUI over a built-in demo backend or a JSON backend snapshot.
//! `--export` writes the export request of the requested function as JSON instead.

use std::error::Error;
use std::fs::File;
use std::sync::Mutex;

use cfgview::backend::{fixtures, SeekError, StaticBackend};
use cfgview::model::Addr;
use cfgview::theme::ThemeManager;
use cfgview::view::GraphView;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CFGVIEW_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--demo] [--addr <hex>] [--log <file>]\n  {program} --cfg <file> [--addr <hex>] [--log <file>]\n  {program} (--demo | --cfg <file>) [--addr <hex>] --export <file>\n\nWithout --cfg the built-in demo backend is used.\n--addr picks the function to show (default: the first function of the backend).\n--export writes the graph as JSON and exits without starting the TUI.\n--log (or {LOG_ENV}) names a log file; RUST_LOG filters it (default info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    cfg: Option<String>,
    addr: Option<Addr>,
    export: Option<String>,
    log: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--cfg" => {
                if options.cfg.is_some() {
                    return Err(());
                }
                options.cfg = Some(args.next().ok_or(())?);
            }
            "--addr" => {
                if options.addr.is_some() {
                    return Err(());
                }
                let value = args.next().ok_or(())?;
                options.addr = Some(value.parse().map_err(|_| ())?);
            }
            "--export" => {
                if options.export.is_some() {
                    return Err(());
                }
                options.export = Some(args.next().ok_or(())?);
            }
            "--log" => {
                if options.log.is_some() {
                    return Err(());
                }
                options.log = Some(args.next().ok_or(())?);
            }
            _ => return Err(()),
        }
    }

    if options.demo && options.cfg.is_some() {
        return Err(());
    }

    Ok(options)
}

/// Installs a file subscriber when a log path is configured; the terminal belongs to the TUI.
fn init_logging(path: Option<String>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path.or_else(|| std::env::var(LOG_ENV).ok().filter(|value| !value.is_empty()))
    else {
        return Ok(());
    };
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "cfgview".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging(options.log.clone())?;

        let backend = match options.cfg.as_deref() {
            Some(path) => StaticBackend::load(path)?,
            None => fixtures::demo_backend(),
        };
        let start = options
            .addr
            .or_else(|| backend.function_entries().next())
            .unwrap_or(Addr::new(0));
        info!(%start, functions = backend.function_entries().count(), "backend ready");

        let mut view = GraphView::new(Box::new(backend), ThemeManager::from_env()).with_sink(
            |addr: Addr| -> Result<(), SeekError> {
                info!(%addr, "seek");
                Ok(())
            },
        );
        view.resize(120.0, 40.0);
        if let Err(err) = view.rebuild(start) {
            warn!(%start, %err, "initial rebuild failed");
        }

        if let Some(path) = options.export {
            let json = view.export_request().to_json_pretty()?;
            std::fs::write(&path, json)?;
            info!(%path, "export written");
            return Ok(());
        }

        cfgview::tui::run(view)
    })();

    if let Err(err) = result {
        eprintln!("cfgview: {err}");
        std::process::exit(1);
    }
}
