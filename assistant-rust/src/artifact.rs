//! Syntactic handling of generated artifacts: finding the fenced YAML block in
//! a reply and choosing the file name it is committed under. The YAML itself
//! is never parsed.
use regex::Regex;
use std::{ffi::OsStr, path::Path, sync::OnceLock};

/// File name used when the artifact carries no `# <name>.yml` header.
pub const DEFAULT_FILENAME: &str = "generated_feature.yml";

fn yaml_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```yaml[ \t]*\r?\n(.*?)```").expect("valid yaml fence regex"))
}

fn filename_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*#[ \t]*([A-Za-z0-9_-][A-Za-z0-9_.-]*\.yml)[ \t]*\r?$")
            .expect("valid filename header regex")
    })
}

/// The text between the first ```` ```yaml ```` fence and its closing fence,
/// verbatim. `None` when there is no such block or it is blank.
#[must_use]
pub fn extract_yaml_block(text: &str) -> Option<&str> {
    yaml_fence()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|block| block.as_str())
        .filter(|block| !block.trim().is_empty())
}

/// The name from the first `# <name>.yml` header comment, or
/// [`DEFAULT_FILENAME`].
#[must_use]
pub fn derive_filename(content: &str) -> &str {
    filename_header()
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map_or(DEFAULT_FILENAME, |name| name.as_str())
}

/// Reduce a file name supplied by the model to its final path component so
/// the artifact cannot land outside the features directory.
#[must_use]
pub fn sanitize_filename(filename: &str) -> Option<&str> {
    Path::new(filename.trim())
        .file_name()
        .and_then(OsStr::to_str)
        .filter(|name| !name.is_empty())
}
