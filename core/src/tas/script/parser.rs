//! Line tokenizer for TAS scripts
//!
//! Classifies a single raw line into a directive, an input row, or nothing.
//! Parsing never fails as a whole: malformed pieces are reported as
//! [`ParseIssue`]s and skipped.

use super::ast::{AXIS_KEYS, DIRECTIVE_KEYS, Directive, DirectiveKey, Line, RowField};
use crate::tas::types::Buttons;

/// Comment marker at the start of a line
pub const COMMENT_PREFIX: char = '#';

/// Problems found while reading a script
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseIssue {
    /// Script file could not be opened
    #[error("script '{name}' not found: {reason}")]
    ScriptNotFound { name: String, reason: String },
    /// First field of an input row is not a frame count
    #[error("skipping line, '{text}' is not a frame count")]
    MalformedFrameCount { text: String },
    /// Value of a directive or axis field failed to parse
    #[error("skipping malformed value for {key}: '{value}'")]
    MalformedValue { key: String, value: String },
    /// Field is neither a button nor an axis
    #[error("skipping unhandled field: '{field}'")]
    UnknownField { field: String },
}

/// Result of classifying one line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// `None` when the whole line was skipped
    pub line: Option<Line>,
    pub issues: Vec<ParseIssue>,
}

impl ParsedLine {
    fn ok(line: Line) -> Self {
        Self {
            line: Some(line),
            issues: Vec::new(),
        }
    }

    fn skipped(issue: ParseIssue) -> Self {
        Self {
            line: None,
            issues: vec![issue],
        }
    }
}

/// Classify one raw script line
pub fn parse_line(raw: &str) -> ParsedLine {
    let line: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return ParsedLine::ok(Line::Blank);
    }

    if let Some((key, value)) = read_key_value(&line, &DIRECTIVE_KEYS, |k| k.as_str()) {
        return match parse_directive(key, value) {
            Some(directive) => ParsedLine::ok(Line::Directive(directive)),
            None => ParsedLine::skipped(ParseIssue::MalformedValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        };
    }

    parse_row(&line)
}

fn parse_directive(key: DirectiveKey, value: &str) -> Option<Directive> {
    match key {
        DirectiveKey::Import => Some(Directive::Import(value.to_string())),
        DirectiveKey::FrameRate => parse_frame_rate(value).map(Directive::FrameRate),
        DirectiveKey::Marker => Some(Directive::Marker(value.to_string())),
        DirectiveKey::SaveResults => parse_bool(value).map(Directive::SaveResults),
        DirectiveKey::SkipSpoolMovies => parse_bool(value).map(Directive::SkipSpoolMovies),
    }
}

fn parse_row(line: &str) -> ParsedLine {
    let mut parts = line.split(',');
    let count_text = parts.next().unwrap_or_default();

    let Some(frames) = parse_frame_count(count_text) else {
        return ParsedLine::skipped(ParseIssue::MalformedFrameCount {
            text: count_text.to_string(),
        });
    };

    // Zero-length rows are valid but carry nothing
    if frames == 0 {
        return ParsedLine::ok(Line::Row {
            frames: 0,
            fields: Vec::new(),
        });
    }

    let mut fields = Vec::new();
    let mut issues = Vec::new();
    for field in parts {
        match parse_field(field) {
            Ok(parsed) => fields.push(parsed),
            Err(issue) => issues.push(issue),
        }
    }

    ParsedLine {
        line: Some(Line::Row { frames, fields }),
        issues,
    }
}

fn parse_field(field: &str) -> Result<RowField, ParseIssue> {
    if let Some(button) = Buttons::from_script_name(field) {
        return Ok(RowField::Button(button));
    }

    match read_key_value(field, &AXIS_KEYS, |k| k.as_str()) {
        Some((key, value)) => parse_axis(value)
            .map(|v| RowField::Axis(key, v))
            .ok_or_else(|| ParseIssue::MalformedValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        None => Err(ParseIssue::UnknownField {
            field: field.to_string(),
        }),
    }
}

/// Match `key=value` against `keys` in order, first match wins
///
/// The value must be non-empty.
pub fn read_key_value<'a, K: Copy>(
    text: &'a str,
    keys: &[K],
    name: impl Fn(K) -> &'static str,
) -> Option<(K, &'a str)> {
    keys.iter().find_map(|&key| {
        text.strip_prefix(name(key))
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|value| !value.is_empty())
            .map(|value| (key, value))
    })
}

pub fn parse_frame_count(text: &str) -> Option<u64> {
    text.parse().ok()
}

pub fn parse_frame_rate(text: &str) -> Option<u32> {
    text.parse().ok()
}

pub fn parse_axis(text: &str) -> Option<f32> {
    text.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Only the literal words `true` and `false` are accepted
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
