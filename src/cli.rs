// Command-line surface. Parsing never fails the process: anything clap
// does not recognise falls back to printing the usage text.

use crate::api::ApiClient;
use crate::error::BjspmError;
use crate::platform::uninstall_script_path;
use crate::ui::{run_init, run_publish, InitOutcome, Prompter};
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::path::Path;

const PLANNED_COMMANDS: &str = "\
Planned commands (not available yet):
  install <package>  Install a package into the current directory
  uninstall <package>  Remove an installed package";

/// Minimal package manager client
#[derive(Parser, Debug)]
#[command(name = "bjspm")]
#[command(version, about, long_about = None, after_help = PLANNED_COMMANDS)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a bjspackage.json in the current directory
    Init,
    /// Zip the current directory and upload it to the registry
    Publish,
    /// Print the shell integration script path
    #[command(hide = true)]
    Test,
}

/// What the dispatcher decided to run.
#[derive(Debug)]
pub enum Invocation {
    Run { command: Commands, verbose: u8 },
    /// Print this text and exit successfully.
    Usage(String),
}

/// Map raw arguments onto an `Invocation`. No command, an unknown
/// command, `--help` and `--version` all end up as `Usage`.
pub fn parse_args<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(Cli {
            command: Some(command),
            verbose,
        }) => Invocation::Run { command, verbose },
        Ok(Cli { command: None, .. }) => Invocation::Usage(usage()),
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                Invocation::Usage(e.to_string())
            }
            _ => {
                log::debug!("unrecognised arguments: {e}");
                Invocation::Usage(usage())
            }
        },
    }
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Run one command. Failures are reported through `prompter` and do not
/// change the exit status.
pub fn execute(command: &Commands, prompter: &mut dyn Prompter, cwd: &Path) {
    match command {
        Commands::Init => match run_init(prompter, cwd) {
            Ok(InitOutcome::Written(path)) => {
                prompter.say(&format!("Wrote {}", path.display()));
            }
            Ok(InitOutcome::Aborted) => {}
            Err(e @ BjspmError::Prompt(_)) => {
                prompter.warn(&format!("Error while reading input: {e}"));
            }
            Err(e) => prompter.warn(&format!("Error while writing the package file: {e}")),
        },
        Commands::Publish => {
            let client = match ApiClient::from_env() {
                Ok(client) => client,
                Err(e) => {
                    prompter.warn(&format!("Error while preparing the upload: {e}"));
                    return;
                }
            };
            log::debug!("publishing {} to {}", cwd.display(), client.endpoint());
            if let Err(e) = run_publish(prompter, cwd, &client) {
                prompter.warn(&format!("Error while publishing the package: {e}"));
            }
        }
        Commands::Test => match uninstall_script_path() {
            Some(path) => prompter.say(&path.display().to_string()),
            None => prompter.warn("No application data directory on this platform"),
        },
    }
}
