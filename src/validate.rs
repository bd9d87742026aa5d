// Syntax checks for the two manifest fields that have a grammar.
// Both are pure predicates; the patterns are compiled on first use.

use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+$").expect("package name pattern"));

/// The grammar from semver.org, anchored on both ends.
static PACKAGE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .expect("semver pattern")
});

/// True for one or more lowercase ASCII letters or digits.
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME.is_match(name)
}

/// True when `version` is a Semantic Versioning 2.0 string.
pub fn is_valid_package_version(version: &str) -> bool {
    PACKAGE_VERSION.is_match(version)
}
