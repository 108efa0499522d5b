mod album_ref;
mod commands;
mod downloader;
mod fetcher;
mod imgur_api;
mod options;
mod resume;
mod settings;

use std::{env, panic, process};

use anyhow::Result;
use backtrace::Backtrace;
use clap::Parser;
use tokio::{signal, task};

use crate::commands::Command;
use crate::options::Options;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn run(options: Options) -> Result<()> {
    match options.command {
        Command::Download(sub_options) => commands::download(options.global, sub_options),
        Command::List(sub_options) => commands::list(options.global, sub_options),
    }
}

#[tokio::main]
async fn main() {
    panic::set_hook(Box::new(|panic_info| {
        // PanicInfo's payload is usually a &'static str or String.
        // See: https://doc.rust-lang.org/beta/std/panic/struct.PanicInfo.html#method.payload
        let message = match panic_info.payload().downcast_ref::<&str>() {
            Some(&message) => message.to_string(),
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(message) => message.clone(),
                None => "<no message>".to_string(),
            },
        };

        eprintln!("{} crashed!", env!("CARGO_PKG_NAME"));
        eprintln!("This is probably a bug.");
        eprintln!();
        eprintln!("If you can reproduce this crash, try adding the -v, -vv, or -vvv flags.");
        eprintln!("This might give you more information to figure out what went wrong!");
        eprintln!();
        eprintln!("Details: {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!("in file {} on line {}", location.file(), location.line());
        }

        // The backtrace crate does not look at RUST_BACKTRACE on its own.
        let should_backtrace = env::var("RUST_BACKTRACE")
            .map(|var| var == "1")
            .unwrap_or(false);

        if should_backtrace {
            eprintln!("{:?}", Backtrace::new());
        } else {
            eprintln!(
                "note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace."
            );
        }

        process::exit(1);
    }));

    let options = Options::parse();

    let log_filter = match options.global.verbosity {
        0 => "info",
        1 => "info,imgur_dl=debug",
        2 => "info,imgur_dl=trace",
        _ => "trace",
    };

    let log_env = env_logger::Env::default().default_filter_or(log_filter);

    env_logger::Builder::from_env(log_env)
        .format_module_path(false)
        .format_timestamp(None)
        // Indent following lines equal to the log level label, like `[ERROR] `
        .format_indent(Some(8))
        .init();

    // reqwest's blocking client panics when used from a runtime thread.
    tokio::select! {
        result = task::spawn_blocking(move || run(options)) => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::error!("command exited with error {err:?}");
                    process::exit(1);
                }
                Err(err) => {
                    log::error!("command did not finish: {err}");
                    process::exit(1);
                }
            }
        },
        _ = signal::ctrl_c() => {
            log::info!("caught ctrl-c, exiting now");
            process::exit(0);
        }
    }
}
