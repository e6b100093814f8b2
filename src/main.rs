//! envguard - validate environment variables against a declarative schema

use anyhow::Context;
use clap::Parser;
use envguard::{app::App, cli::Cli, EnvError};
use std::process;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let app = App::new(cli);

    if let Err(e) = run(&app) {
        match e.downcast_ref::<EnvError>() {
            Some(error) => {
                eprintln!("{}", e);
                eprintln!("{}", error.format_for_console(app.use_color()));
                if let Some(suggestion) = error.suggestion() {
                    eprintln!();
                    eprintln!("{}", suggestion);
                }
                process::exit(error.exit_code());
            }
            None => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
    }
}

fn run(app: &App) -> anyhow::Result<()> {
    app.run().context("envguard failed")
}
