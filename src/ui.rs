// UI layer: the interactive flows behind `bjspm init` and `bjspm publish`.
// All terminal I/O goes through the `Prompter` trait so the flows can be
// driven by scripted answers in tests; `TerminalPrompter` is the real one
// and uses `dialoguer`.

use crate::api::PackageTransport;
use crate::error::{BjspmError, Result};
use crate::manifest::{
    manifest_path, next_step, read_manifest, write_manifest, PackageDraft, Step,
};
use crate::publish::{publish, PublishReport};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Input/output capability handed to the interactive flows.
pub trait Prompter {
    /// Ask one question and return the raw answer. Empty answers are allowed.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Print a line of text.
    fn say(&mut self, message: &str);

    /// Print a problem the user should notice.
    fn warn(&mut self, message: &str) {
        self.say(message);
    }
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        // `interact_text` keeps line editing; `allow_empty` so Enter alone
        // selects the default.
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }

    fn warn(&mut self, message: &str) {
        println!("{}", message.to_string().red());
    }
}

/// How `bjspm init` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Written(PathBuf),
    /// The user declined the final confirmation.
    Aborted,
}

/// Empty, `y` and `yes` (any case) confirm; everything else declines.
pub fn is_confirmation(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    )
}

/// Build a manifest interactively and write it into `dir`.
///
/// Each round asks for the first field that is still unset; a rejected
/// answer prints the reason and the same field is asked again.
pub fn run_init(prompter: &mut dyn Prompter, dir: &Path) -> Result<InitOutcome> {
    let mut draft = PackageDraft::new();
    let descriptor = loop {
        match next_step(&draft) {
            Step::Ask(field) => {
                let answer = prompter.ask(field.prompt()).map_err(BjspmError::Prompt)?;
                if let Err(e) = draft.answer(field, &answer) {
                    log::debug!("rejected {field:?}: {answer:?}");
                    prompter.warn(&e.to_string());
                }
            }
            Step::Persist(descriptor) => break descriptor,
        }
    };

    let path = manifest_path(dir);
    let json = descriptor.to_manifest_json()?;
    prompter.say(&format!("About to write to {}:", path.display()));
    prompter.say("");
    prompter.say(&json);
    prompter.say("");

    let answer = prompter.ask("Is this OK? (yes)").map_err(BjspmError::Prompt)?;
    if !is_confirmation(&answer) {
        prompter.say("Aborted, no file written.");
        return Ok(InitOutcome::Aborted);
    }

    write_manifest(&path, &json)?;
    Ok(InitOutcome::Written(path))
}

/// Zip `source` and upload it, with a spinner while the work runs.
/// A `bjspackage.json` in `source` is only used to name the package in
/// the output; publishing works without one.
pub fn run_publish(
    prompter: &mut dyn Prompter,
    source: &Path,
    transport: &dyn PackageTransport,
) -> Result<PublishReport> {
    let manifest = manifest_path(source);
    if manifest.is_file() {
        match read_manifest(&manifest) {
            Ok(package) => prompter.say(&format!("Publishing {} {}", package.name, package.version)),
            Err(e) => log::warn!("{e}"),
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Packing and uploading...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = publish(source, transport);
    spinner.finish_and_clear();
    let report = result?;

    prompter.say(&format!("Package uploaded from {}", report.archive_path.display()));
    prompter.say(&format!("Server response ({}):", report.response.status));
    prompter.say(&report.response.body);
    Ok(report)
}
