//! Template tag recognition
//!
//! Two tag families appear in template text:
//!
//! - `{{ NAME }}`, `{{ item.field }}` and `{{r NAME }}` substitute values
//! - `{%p ... %}` and `{%tr ... %}` control paragraphs and table rows
//!
//! Word often splits a tag over several runs (spell checking, revision marks,
//! partial formatting). [`merge_split_tags`] moves each tag back into the run
//! where it starts.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{OoxmlError, Result};

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{.*?\}\}|\{%.*?%\}").unwrap())
}

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*(?:(r)\s+)?([A-Za-z_][\w.]*)\s*\}\}").unwrap())
}

fn control_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{%(p|tr)?\s*(if|else|endif|for|endfor)\b\s*(.*?)\s*%\}").unwrap()
    })
}

fn for_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_]\w*)\s+in\s+([A-Za-z_][\w.]*)$").unwrap())
}

/// A `{{ }}` substitution found in run text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Byte range of the whole tag
    pub span: Range<usize>,
    /// Name or dotted path
    pub name: String,
    /// `{{r }}` form
    pub rich: bool,
}

/// Find substitution tags in `text`, in order
pub fn find_variables(text: &str) -> Vec<Variable> {
    variable_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Variable {
                span: whole.range(),
                name: caps[2].to_string(),
                rich: caps.get(1).is_some(),
            })
        })
        .collect()
}

/// What a control tag governs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The enclosing `w:p`
    Paragraph,
    /// The enclosing `w:tr`
    Row,
}

/// A parsed control tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    If(String),
    Else,
    EndIf,
    For { var: String, expr: String },
    EndFor,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::If(expr) => write!(f, "if {}", expr),
            Control::Else => f.write_str("else"),
            Control::EndIf => f.write_str("endif"),
            Control::For { var, expr } => write!(f, "for {} in {}", var, expr),
            Control::EndFor => f.write_str("endfor"),
        }
    }
}

/// Find the first control tag in `text`.
///
/// A tag without a level marker (`{% if %}`) governs its paragraph.
pub fn find_control(text: &str) -> Result<Option<(Level, Control)>> {
    let Some(caps) = control_re().captures(text) else {
        return Ok(None);
    };

    let level = match caps.get(1).map(|m| m.as_str()) {
        Some("tr") => Level::Row,
        _ => Level::Paragraph,
    };
    let args = caps[3].trim();

    let control = match &caps[2] {
        "if" if !args.is_empty() => Control::If(args.to_string()),
        "else" => Control::Else,
        "endif" => Control::EndIf,
        "for" => {
            let parts = for_re().captures(args).ok_or_else(|| {
                OoxmlError::Template(format!("malformed loop tag: {}", &caps[0]))
            })?;
            Control::For {
                var: parts[1].to_string(),
                expr: parts[2].to_string(),
            }
        }
        "endfor" => Control::EndFor,
        _ => {
            return Err(OoxmlError::Template(format!(
                "malformed control tag: {}",
                &caps[0]
            )))
        }
    };

    Ok(Some((level, control)))
}

/// Byte ranges of every complete tag in `text`
pub fn find_tag_spans(text: &str) -> Vec<Range<usize>> {
    any_tag_re().find_iter(text).map(|m| m.range()).collect()
}

/// Re-join tags that span several text segments.
///
/// `segments` are the texts of one paragraph's runs, in document order. Every
/// tag that crosses a boundary is moved whole into the segment where it
/// starts. Text outside tags stays in its segment.
pub fn merge_split_tags(segments: &mut [&mut String]) {
    if segments.len() < 2 {
        return;
    }

    let full: String = segments.iter().map(|s| s.as_str()).collect();
    let spans = find_tag_spans(&full);

    let mut starts = Vec::with_capacity(segments.len());
    let mut offset = 0;
    for segment in segments.iter() {
        starts.push(offset);
        offset += segment.len();
    }

    let crosses = |span: &Range<usize>| {
        let owner = owner_of(&starts, span.start);
        starts
            .get(owner + 1)
            .is_some_and(|&next| span.end > next)
    };
    if !spans.iter().any(crosses) {
        return;
    }

    let mut rebuilt = vec![String::new(); segments.len()];
    let mut pos = 0;
    for span in &spans {
        distribute(&full, pos..span.start, &starts, &mut rebuilt);
        rebuilt[owner_of(&starts, span.start)].push_str(&full[span.clone()]);
        pos = span.end;
    }
    distribute(&full, pos..full.len(), &starts, &mut rebuilt);

    for (segment, text) in segments.iter_mut().zip(rebuilt) {
        **segment = text;
    }
}

/// Index of the segment holding byte `pos`
fn owner_of(starts: &[usize], pos: usize) -> usize {
    starts.partition_point(|&s| s <= pos).saturating_sub(1)
}

/// Copy `range` of `full` back into the segments it came from
fn distribute(full: &str, range: Range<usize>, starts: &[usize], out: &mut [String]) {
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(full.len());
        let lo = start.max(range.start);
        let hi = end.min(range.end);
        if lo < hi {
            out[i].push_str(&full[lo..hi]);
        }
    }
}
