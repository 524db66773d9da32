//! HCL spec loader.
//!
//! # File format
//!
//! ```text
//! query_spec "Root account login" {
//!   GUID     = "6c6e1b3a0f3c4d16a2b0e3a5c1d2e3f4"
//!   Query    = <<EOF
//! select * from cloudtrail
//! where user_identity_type = 'Root'
//! EOF
//!   Severity = [5]
//! }
//! ```
//!
//! One labeled block per record; the label is the record's name. Suppression
//! files use `suppression_spec` blocks and carry only `GUID` and `Query`.
//!
//! # API pattern
//!
//! - [`parse_specs`]: text → specs, pure; `path` is only used in errors
//! - [`load_file`]: one file
//! - [`load_dir`]: every `*.qs` file below a directory, sorted by path

use std::path::{Path, PathBuf};

use hcl::eval::{Context, Evaluate};
use hcl::expr::TemplateExpr;
use hcl::{Block, Expression, Structure};
use serde_json::{Map, Value};

use crate::error::{io_err, LoadError};
use crate::types::Spec;

/// Extension of suppression config files discovered by [`load_dir`].
pub const SPEC_FILE_EXTENSION: &str = "qs";

// ---------------------------------------------------------------------------
// 1. Parse
// ---------------------------------------------------------------------------

/// Parse HCL text into an ordered sequence of specs of kind `S`.
///
/// Every returned record has been normalized (newlines in `Query` replaced
/// by spaces).
pub fn parse_specs<S: Spec>(input: &str, path: &Path) -> Result<Vec<S>, LoadError> {
    let body = hcl::parse(input).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let ctx = Context::new();
    let expected = S::KIND.block_identifier();

    let mut specs = Vec::new();
    for structure in body {
        match structure {
            Structure::Block(block) if block.identifier.as_str() == expected => {
                specs.push(block_to_spec::<S>(block, path, &ctx)?);
            }
            Structure::Block(block) => {
                return Err(LoadError::UnexpectedStructure {
                    path: path.to_path_buf(),
                    found: block.identifier.as_str().to_owned(),
                    expected,
                })
            }
            Structure::Attribute(attr) => {
                return Err(LoadError::UnexpectedStructure {
                    path: path.to_path_buf(),
                    found: attr.key.as_str().to_owned(),
                    expected,
                })
            }
        }
    }
    Ok(specs)
}

fn block_to_spec<S: Spec>(block: Block, path: &Path, ctx: &Context) -> Result<S, LoadError> {
    let [label] = block.labels.as_slice() else {
        return Err(LoadError::BadLabels {
            path: path.to_path_buf(),
            block: S::KIND.block_identifier(),
            count: block.labels.len(),
        });
    };
    let name = label.as_str().to_owned();

    let mut fields = Map::new();
    fields.insert(S::NAME_FIELD.to_owned(), Value::String(name.clone()));

    for structure in block.body {
        let attr = match structure {
            Structure::Attribute(attr) => attr,
            Structure::Block(inner) => {
                return Err(LoadError::UnexpectedStructure {
                    path: path.to_path_buf(),
                    found: inner.identifier.as_str().to_owned(),
                    expected: "attribute",
                })
            }
        };

        let key = attr.key.as_str().to_owned();
        if !S::ATTRIBUTES.contains(&key.as_str()) {
            return Err(LoadError::UnknownAttribute {
                path: path.to_path_buf(),
                name,
                attribute: key,
            });
        }

        let value = match evaluate_literal(attr.expr, ctx) {
            Ok(value) => value,
            Err(source) => {
                return Err(LoadError::Eval {
                    path: path.to_path_buf(),
                    name,
                    attribute: key,
                    source,
                })
            }
        };
        let value = serde_json::to_value(&value).map_err(|source| LoadError::Invalid {
            path: path.to_path_buf(),
            name: name.clone(),
            source,
        })?;
        fields.insert(key, value);
    }

    let mut spec: S =
        serde_json::from_value(Value::Object(fields)).map_err(|source| LoadError::Invalid {
            path: path.to_path_buf(),
            name,
            source,
        })?;
    spec.normalize();
    Ok(spec)
}

/// Evaluate `expr` with every string template taken as literal text.
///
/// `${...}` inside a query is SQL, never an interpolation.
fn evaluate_literal(mut expr: Expression, ctx: &Context) -> Result<hcl::Value, hcl::eval::Error> {
    literalize_templates(&mut expr);
    expr.evaluate(ctx)
}

fn literalize_templates(expr: &mut Expression) {
    match expr {
        Expression::TemplateExpr(template) => {
            let text = match template.as_ref() {
                TemplateExpr::QuotedString(raw) => unescape(raw),
                TemplateExpr::Heredoc(heredoc) => heredoc.template.clone(),
            };
            *expr = Expression::String(text);
        }
        Expression::Array(items) => items.iter_mut().for_each(literalize_templates),
        Expression::Object(object) => object.values_mut().for_each(literalize_templates),
        Expression::Parenthesis(inner) => literalize_templates(inner),
        _ => {}
    }
}

/// Decode the escape sequences of a raw quoted string. Unknown escapes are
/// kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// 2. Single file
// ---------------------------------------------------------------------------

/// Read and parse a single config file.
pub fn load_file<S: Spec>(path: &Path) -> Result<Vec<S>, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let specs = parse_specs::<S>(&contents, path)?;
    tracing::info!("loaded file: {} ({} specs)", path.display(), specs.len());
    Ok(specs)
}

// ---------------------------------------------------------------------------
// 3. Directory scan
// ---------------------------------------------------------------------------

/// All `*.qs` files below `dir`, recursively, in sorted path order.
///
/// Unreadable directories are logged and skipped. Symlinked directories
/// are not followed.
pub fn find_spec_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_spec_files(dir, &mut files);
    files
}

fn collect_spec_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("skipping {}: {err}", dir.display());
            return;
        }
    };
    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            collect_spec_files(&path, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext == SPEC_FILE_EXTENSION)
        {
            out.push(path);
        }
    }
}

/// Load and concatenate every `*.qs` file below `dir`.
///
/// Returns [`LoadError::NoConfigFiles`] when the scan yields no records.
pub fn load_dir<S: Spec>(dir: &Path) -> Result<Vec<S>, LoadError> {
    let mut specs = Vec::new();
    for file in find_spec_files(dir) {
        specs.extend(load_file::<S>(&file)?);
    }
    if specs.is_empty() {
        return Err(LoadError::NoConfigFiles {
            dir: dir.to_path_buf(),
            extension: SPEC_FILE_EXTENSION,
        });
    }
    Ok(specs)
}

/// Directory holding the running executable: the default scan root.
pub fn executable_dir() -> Result<PathBuf, LoadError> {
    let exe = std::env::current_exe().map_err(|e| io_err("<current executable>", e))?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
