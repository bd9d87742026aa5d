// Library root
// -----------
// The binary (`main.rs`) parses arguments and hands off to these modules.
//
// Module responsibilities:
// - `validate`: package name and semantic version checks.
// - `manifest`: the package descriptor, the field-by-field builder state
//   and writing `bjspackage.json`.
// - `ui`: the interactive `init` and `publish` flows behind the
//   `Prompter` trait.
// - `archive` / `publish`: zipping the working directory in a scratch
//   directory and handing it to a transport.
// - `api`: the HTTP client that uploads the archive.
// - `cli`: argument parsing and dispatch.
// - `platform`: leftover shell integration cleanup.
pub mod api;
pub mod archive;
pub mod cli;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod publish;
pub mod ui;
pub mod validate;

pub use error::{BjspmError, Result};
