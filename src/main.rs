use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{clean, stale, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stalesweep")]
#[command(version = VERSION)]
#[command(about = "Reclaims stale pull-request deployment environments from OpenShift namespaces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the stale PR set and clean each environment
    Clean(clean::CleanArgs),
    /// Resolve and report the stale PR set without cleaning anything
    #[command(visible_alias = "list")]
    Stale(stale::StaleArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    output::print_json_result(json_result).ok();

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
