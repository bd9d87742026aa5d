// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, dispatch.
// - Command failures are printed by the dispatcher and still exit 0.

use anyhow::Context;
use bjspm::cli::{execute, parse_args, Invocation};
use bjspm::platform::remove_stale_uninstall_script;
use bjspm::ui::TerminalPrompter;

fn main() -> anyhow::Result<()> {
    let (command, verbose) = match parse_args(std::env::args_os()) {
        Invocation::Run { command, verbose } => (command, verbose),
        Invocation::Usage(text) => {
            println!("{text}");
            return Ok(());
        }
    };

    setup_logging(verbose);
    remove_stale_uninstall_script();

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    execute(&command, &mut TerminalPrompter, &cwd);
    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
