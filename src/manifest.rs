// Package manifest model. `PackageDraft` is the descriptor while it is being
// filled in (every field starts unset), `PackageDescriptor` is the complete
// value that gets written to `bjspackage.json`.
//
// The builder is a small state machine: `next_field` picks the first unset
// field in `Field::ORDER`, `PackageDraft::answer` applies one answer to it.
// The interactive loop that drives it lives in `ui`.

use crate::error::{BjspmError, Result};
use crate::validate::{is_valid_package_name, is_valid_package_version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "bjspackage.json";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// One manifest field, in the order the builder asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Version,
    Description,
    Keywords,
    License,
    Username,
}

impl Field {
    pub const ORDER: [Field; 6] = [
        Field::Name,
        Field::Version,
        Field::Description,
        Field::Keywords,
        Field::License,
        Field::Username,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            Field::Name => "package name",
            Field::Version => "version (1.0.0)",
            Field::Description => "description",
            Field::Keywords => "keywords",
            Field::License => "license",
            Field::Username => "username",
        }
    }
}

/// Why an answer was rejected. The builder shows it and asks again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidName(String),
    InvalidVersion(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidName(name) => write!(
                f,
                "Invalid package name {name:?}: use lowercase letters and digits only"
            ),
            ValidationError::InvalidVersion(version) => write!(
                f,
                "Invalid version {version:?}: expected semantic version like 1.0.0"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDraft {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub license: Option<String>,
    pub username: Option<String>,
}

impl PackageDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name.is_some(),
            Field::Version => self.version.is_some(),
            Field::Description => self.description.is_some(),
            Field::Keywords => self.keywords.is_some(),
            Field::License => self.license.is_some(),
            Field::Username => self.username.is_some(),
        }
    }

    /// Store `input` as the value of `field`. Name and version are
    /// validated; a rejected answer leaves the draft untouched.
    pub fn answer(&mut self, field: Field, input: &str) -> std::result::Result<(), ValidationError> {
        match field {
            Field::Name => {
                if !is_valid_package_name(input) {
                    return Err(ValidationError::InvalidName(input.to_string()));
                }
                self.name = Some(input.to_string());
            }
            Field::Version => {
                if input.is_empty() {
                    self.version = Some(DEFAULT_VERSION.to_string());
                } else if is_valid_package_version(input) {
                    self.version = Some(input.to_string());
                } else {
                    return Err(ValidationError::InvalidVersion(input.to_string()));
                }
            }
            Field::Description => self.description = Some(input.to_string()),
            Field::Keywords => self.keywords = Some(split_keywords(input)),
            Field::License => self.license = Some(input.to_string()),
            Field::Username => self.username = Some(input.to_string()),
        }
        Ok(())
    }

    /// The finished descriptor, once every field has been answered.
    pub fn complete(&self) -> Option<PackageDescriptor> {
        Some(PackageDescriptor {
            name: self.name.clone()?,
            version: self.version.clone()?,
            description: self.description.clone()?,
            keywords: self.keywords.clone()?,
            license: self.license.clone()?,
            username: self.username.clone()?,
        })
    }
}

/// First unset field in `Field::ORDER`, or `None` when the draft is complete.
pub fn next_field(draft: &PackageDraft) -> Option<Field> {
    Field::ORDER.into_iter().find(|field| !draft.is_set(*field))
}

/// What the builder does next for a given draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Ask(Field),
    Persist(PackageDescriptor),
}

pub fn next_step(draft: &PackageDraft) -> Step {
    match next_field(draft) {
        Some(field) => Step::Ask(field),
        None => Step::Persist(draft.complete().expect("all fields set")),
    }
}

/// Commas become spaces, runs of spaces collapse to one, then the text is
/// split on single spaces. Empty input therefore yields `[""]`, which is what
/// existing manifests contain.
pub fn split_keywords(input: &str) -> Vec<String> {
    let mut normalized = input.replace(',', " ");
    while normalized.contains("  ") {
        normalized = normalized.replace("  ", " ");
    }
    normalized.split(' ').map(str::to_string).collect()
}

/// Field order here is the key order in the written file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub username: String,
}

impl PackageDescriptor {
    /// JSON with one-space indentation.
    pub fn to_manifest_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE_NAME)
}

/// Write already-rendered manifest text to `path`.
pub fn write_manifest(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| BjspmError::io("Failed to write manifest", path, e))?;
    log::info!("wrote manifest to {}", path.display());
    Ok(())
}

/// Read a manifest back from disk.
pub fn read_manifest(path: &Path) -> Result<PackageDescriptor> {
    let text = fs::read_to_string(path)
        .map_err(|e| BjspmError::io("Failed to read manifest", path, e))?;
    Ok(serde_json::from_str(&text)?)
}
