//! Front matter splitting and parsing.
//!
//! A content file may start with a YAML header fenced by `---` lines, or a
//! TOML header fenced by `+++` lines. Everything after the closing fence is
//! the markdown body. Unknown keys are ignored.

use crate::error::FrontMatterError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

const YAML_FENCE: &str = "---";
const TOML_FENCE: &str = "+++";

/// Metadata keys understood by the loader. Missing keys stay `None`/empty.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Parse the `date` key, if present.
    pub fn parsed_date(&self) -> Result<Option<NaiveDate>, FrontMatterError> {
        self.date.as_deref().map(parse_date).transpose()
    }
}

/// Header format detected from the opening fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

/// Split `content` into its front matter and markdown body.
pub fn parse(content: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    match split(content)? {
        None => Ok((FrontMatter::default(), content)),
        Some((_, header, body)) if header.trim().is_empty() => Ok((FrontMatter::default(), body)),
        Some((Format::Yaml, header, body)) => Ok((serde_yaml::from_str(header)?, body)),
        Some((Format::Toml, header, body)) => Ok((parse_toml(header)?, body)),
    }
}

/// Locate the fenced header. Returns `None` when the file has no header.
fn split(content: &str) -> Result<Option<(Format, &str, &str)>, FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    let (format, fence) = match first.trim_end() {
        YAML_FENCE => (Format::Yaml, YAML_FENCE),
        TOML_FENCE => (Format::Toml, TOML_FENCE),
        _ => return Ok(None),
    };

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == fence {
            let header = &content[header_start..offset];
            let body = &content[offset + line.len()..];
            return Ok(Some((format, header, body)));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated(fence))
}

/// TOML dates are native values; turn them into strings before mapping.
fn parse_toml(header: &str) -> Result<FrontMatter, FrontMatterError> {
    let mut table: toml::Table = toml::from_str(header)?;
    if let Some(toml::Value::Datetime(date)) = table.get("date") {
        let date = date.to_string();
        table.insert("date".into(), toml::Value::String(date));
    }
    Ok(toml::Value::Table(table).try_into()?)
}

/// Parse a metadata date, keeping only the calendar date.
///
/// Accepts `2024-01-31`, `2024-01-31 10:00[:00]`, `2024-01-31T10:00:00`
/// and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FrontMatterError> {
    let s = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.date_naive());
    }

    Err(FrontMatterError::Date(raw.to_owned()))
}
