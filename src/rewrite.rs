//! Line-level rewriting of template configuration files.
//!
//! Two file shapes are handled: `.tfvars`-style `key = "value"` (or
//! `key = 123`) assignments, rewritten with anchored multiline regexes, and
//! flat YAML scalars/lists, rewritten by line-prefix matching. The YAML
//! functions are intentionally not a YAML parse: the templates are flat, and
//! touching only the matched lines keeps every other byte of the file
//! intact. Nested or multi-document YAML is out of contract.
//!
//! A key that is expected but absent is a hard error. This guards against
//! silently no-op-ing on a template whose schema drifted.

use color_eyre::eyre::{Result, WrapErr};
use log::debug;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;

/// Failures while rewriting a template file
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Key not found in {path}: {key}")]
    KeyNotFound { path: String, key: String },
    #[error("Key not found in YAML: {key}")]
    YamlKeyNotFound { key: String },
    #[error("List key not found in YAML: {key}")]
    YamlListKeyNotFound { key: String },
}

/// Replace the quoted value of `key = "..."` in a tfvars-style file.
pub fn replace_tfvar(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    let pattern = Regex::new(&format!(
        r#"(?m)^({}\s*=\s*)"[^"]*"[ \t]*$"#,
        regex::escape(key)
    ))?;
    if !pattern.is_match(&content) {
        return Err(RewriteError::KeyNotFound {
            path: path.display().to_string(),
            key: key.to_string(),
        }
        .into());
    }

    let updated = pattern.replace_all(&content, |caps: &Captures| {
        format!("{}\"{}\"", &caps[1], value)
    });
    debug!("Rewrote {} = \"{}\" in {}", key, value, path.display());

    fs::write(path, updated.as_bytes())
        .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Replace the unquoted integer value of `key = 123` in a tfvars-style file.
pub fn replace_tfvar_int(path: &Path, key: &str, value: u32) -> Result<()> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    let pattern = Regex::new(&format!(
        r"(?m)^({}\s*=\s*)\d+[ \t]*$",
        regex::escape(key)
    ))?;
    if !pattern.is_match(&content) {
        return Err(RewriteError::KeyNotFound {
            path: path.display().to_string(),
            key: key.to_string(),
        }
        .into());
    }

    let updated =
        pattern.replace_all(&content, |caps: &Captures| format!("{}{}", &caps[1], value));
    debug!("Rewrote {} = {} in {}", key, value, path.display());

    fs::write(path, updated.as_bytes())
        .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Replace every `key: ...` scalar line with `key: "<value>"`.
///
/// The rewritten line is emitted at column zero, which is correct for the
/// flat top-level mappings the stand templates use.
pub fn replace_yaml_value(
    lines: &[String],
    key: &str,
    value: &str,
) -> Result<Vec<String>, RewriteError> {
    let needle = format!("{}:", key);
    let mut out = Vec::with_capacity(lines.len());
    let mut replaced = false;

    for line in lines {
        if line.trim_start().starts_with(&needle) {
            out.push(format!("{}: \"{}\"", key, value));
            replaced = true;
        } else {
            out.push(line.clone());
        }
    }

    if !replaced {
        return Err(RewriteError::YamlKeyNotFound {
            key: key.to_string(),
        });
    }
    Ok(out)
}

/// Replace a `key:` line and its immediately following `- item` block with
/// the given items, each quoted and two-space indented.
pub fn replace_yaml_list(
    lines: &[String],
    key: &str,
    items: &[String],
) -> Result<Vec<String>, RewriteError> {
    let needle = format!("{}:", key);
    let mut out = Vec::with_capacity(lines.len());
    let mut found = false;
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        if line.trim_start().starts_with(&needle) {
            out.push(format!("{}:", key));
            for item in items {
                out.push(format!("  - \"{}\"", item));
            }
            found = true;
            i += 1;
            // Skip the old list entries
            while i < lines.len() && lines[i].trim_start().starts_with("- ") {
                i += 1;
            }
            continue;
        }
        out.push(line.clone());
        i += 1;
    }

    if !found {
        return Err(RewriteError::YamlListKeyNotFound {
            key: key.to_string(),
        });
    }
    Ok(out)
}
