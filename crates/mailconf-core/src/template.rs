//! Template rendering against the mail server descriptor
//!
//! # Template Variables
//!
//! Placeholders are written `{{ path }}`, where `path` is a dotted field path
//! into the descriptor. A leading `.` is accepted, so `{{ .domain }}` and
//! `{{domain}}` are equivalent.
//!
//! | Variable                     | Resolved to                          |
//! |------------------------------|--------------------------------------|
//! | `{{ domain }}`               | `MailServerConfig::domain`           |
//! | `{{ sub_domain }}`           | `MailServerConfig::sub_domain`       |
//! | `{{ hostname }}`             | `<sub_domain>.<domain>`              |
//! | `{{ load_balancer.hostname }}` | Load balancer host name            |
//! | `{{ sql_server.username }}`  | Any field of the SQL server block    |
//!
//! A quoted placeholder is copied literally, so `{{"{{"}}` emits `{{`.

use std::path::{Component, Path, PathBuf};

use mailconf_meta::MailServerConfig;
use serde_json::Value;

use crate::{Error, Result};

/// Loads templates from a fixed root and expands them.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    root: PathBuf,
}

impl TemplateRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a template name to its file under the templates root.
    ///
    /// Names must stay inside the root: absolute names and `..` segments are
    /// reported as not found.
    pub fn template_path(&self, name: &str) -> Result<PathBuf> {
        let candidate = Path::new(name);
        let escapes = candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if name.is_empty() || escapes {
            return Err(Error::TemplateNotFound {
                path: self.root.join(name),
            });
        }
        Ok(self.root.join(candidate))
    }

    /// Render the named template with `config`, returning the expanded bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::TemplateNotFound`] if no such template file exists
    /// - [`Error::Render`] if the template is not UTF-8, is malformed, or
    ///   references a field the descriptor does not have
    /// - [`Error::Fs`] for any other read failure
    pub fn render(&self, name: &str, config: &MailServerConfig) -> Result<Vec<u8>> {
        let path = self.template_path(name)?;

        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::TemplateNotFound { path });
            }
            Err(e) => return Err(mailconf_fs::Error::io(&path, e).into()),
        };

        let source = String::from_utf8(raw)
            .map_err(|e| Error::render(name, format!("template is not valid UTF-8: {}", e)))?;

        let context = template_context(config).map_err(|e| Error::render(name, e.to_string()))?;
        let rendered = render_str(name, &source, &context)?;

        tracing::debug!(template = name, bytes = rendered.len(), "rendered template");
        Ok(rendered.into_bytes())
    }
}

/// Serialize the descriptor and add derived variables.
fn template_context(config: &MailServerConfig) -> serde_json::Result<Value> {
    let mut context = serde_json::to_value(config)?;
    if let Value::Object(map) = &mut context {
        map.insert("hostname".into(), Value::String(config.hostname()));
    }
    Ok(context)
}

/// Expand every placeholder in `source` with a single left-to-right scan.
///
/// Substituted values are never rescanned, so a value containing `{{` is
/// emitted verbatim.
pub fn render_str(template: &str, source: &str, context: &Value) -> Result<String> {
    let mut result = String::with_capacity(source.len());
    let mut remaining = source;
    let mut consumed = 0;

    while let Some(start) = remaining.find("{{") {
        result.push_str(&remaining[..start]);

        let inner = &remaining[start + 2..];
        let Some(end) = placeholder_end(inner) else {
            let line = line_of(source, consumed + start);
            return Err(Error::render(template, format!("unclosed `{{{{` on line {}", line)));
        };

        let end_abs = start + 2 + end + 2;
        let expr = inner[..end].trim();

        if let Some(literal) = expr.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            result.push_str(literal);
        } else {
            let line = line_of(source, consumed + start);
            let value = lookup(context, expr).map_err(|message| {
                Error::render(template, format!("{} on line {}", message, line))
            })?;
            result.push_str(&value);
        }

        consumed += end_abs;
        remaining = &remaining[end_abs..];
    }

    result.push_str(remaining);
    Ok(result)
}

/// Offset of the `}}` closing a placeholder body.
///
/// A quoted literal is skipped first, so it may contain `}}` itself.
fn placeholder_end(inner: &str) -> Option<usize> {
    let lead = inner.len() - inner.trim_start().len();
    match inner[lead..].strip_prefix('"') {
        Some(quoted) => {
            let after = lead + 1 + quoted.find('"')? + 1;
            inner[after..].find("}}").map(|end| after + end)
        }
        None => inner.find("}}"),
    }
}

/// Resolve a dotted path to a scalar value rendered as text.
fn lookup(context: &Value, expr: &str) -> std::result::Result<String, String> {
    let path = expr.strip_prefix('.').unwrap_or(expr);
    if path.is_empty() {
        return Err("empty placeholder".to_string());
    }

    let mut current = context;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map
                .get(segment)
                .ok_or_else(|| format!("undefined variable `{}`", path))?,
            _ => return Err(format!("undefined variable `{}`", path)),
        };
    }

    match current {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(format!("undefined variable `{}`", path)),
        Value::Array(_) | Value::Object(_) => Err(format!("`{}` is not a scalar value", path)),
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}
