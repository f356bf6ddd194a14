use anyhow::Result;

use table_tennis_ranking::cli::Command;
use table_tennis_ranking::{
    handle_export, handle_init, handle_publish, handle_recalculate, handle_serve, handle_snapshot, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Init { reset } => handle_init(*reset),
        Command::Snapshot { gender, category, name } => handle_snapshot(gender, category, name.as_deref()),
        Command::Publish { id, private } => handle_publish(*id, *private),
        Command::Export { id, output } => handle_export(*id, output.as_deref()),
        Command::Recalculate { event_id } => handle_recalculate(*event_id),
    }
}
