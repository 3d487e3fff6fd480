use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use num_format::{Locale, ToFormattedString};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::schema::DamRecord;

pub const DEFAULT_TEMPLATE: &str = "{name} {percent}% {pretty_comment} {updated}";

/// Template that asks for the whole record instead of a formatted line.
pub const ALL_FIELDS: &str = "{all}";

#[derive(PartialEq, Eq, Debug, Error)]
pub enum TemplateError {
    #[error("Unknown field {{{0}}} in the format string")]
    UnknownField(String),
    #[error("Invalid format spec {spec:?} for field {field}")]
    UnsupportedSpec { field: String, spec: String },
    #[error("Invalid timestamp format {0:?}")]
    InvalidTimestampFormat(String),
    #[error("Unmatched '{{' in the format string")]
    UnclosedBrace,
    #[error("Single '}}' encountered in the format string")]
    StrayClosingBrace,
}

/// Fills `{field}` placeholders from the record.
///
/// Available fields are `name`, `max`, `current`, `percent`, `updated`,
/// `comment` and `pretty_comment`.  `{{` and `}}` stand for literal braces.
/// A placeholder may carry a spec after `:`.  For `updated` it is a strftime
/// pattern, as in `{updated:%d %b %H:%M}`; for the other fields it is
/// `[[fill]align][0][width][,][.precision][type]`, e.g. `{max:,}`,
/// `{percent:.0f}` or `{name:>12}`.
pub fn render(template: &str, record: &DamRecord) -> Result<String, TemplateError> {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.next_if_eq(&'{').is_some() => out.push('{'),
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => placeholder.push(c),
                        None => return Err(TemplateError::UnclosedBrace),
                    }
                }
                write_field(&mut out, &placeholder, record)?;
            }
            '}' if chars.next_if_eq(&'}').is_some() => out.push('}'),
            '}' => return Err(TemplateError::StrayClosingBrace),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn write_field(out: &mut String, placeholder: &str, record: &DamRecord) -> Result<(), TemplateError> {
    let (field, spec) = match placeholder.split_once(':') {
        Some((field, spec)) => (field, Some(spec)),
        None => (placeholder, None),
    };
    if let ("updated", Some(spec)) = (field, spec) {
        let items = StrftimeItems::new(spec);
        if items.clone().any(|item| matches!(item, Item::Error)) {
            return Err(TemplateError::InvalidTimestampFormat(spec.to_owned()));
        }
        return write!(out, "{}", record.updated().format_with_items(items))
            .map_err(|_| TemplateError::InvalidTimestampFormat(spec.to_owned()));
    }

    let unsupported = || TemplateError::UnsupportedSpec {
        field: field.to_owned(),
        spec: spec.unwrap_or_default().to_owned(),
    };
    let format_spec = match spec {
        Some(spec) => FormatSpec::parse(spec).ok_or_else(unsupported)?,
        None => FormatSpec::default(),
    };
    let text = match field {
        "name" => format_text(record.name(), &format_spec),
        "comment" => format_text(record.comment().as_deref().unwrap_or_default(), &format_spec),
        "pretty_comment" => format_text(&record.pretty_comment().to_string(), &format_spec),
        "updated" => format_text(&record.updated().to_string(), &format_spec),
        "max" => format_volume(record.max(), &format_spec),
        "current" => format_volume(record.current(), &format_spec),
        "percent" => format_percent(record.percent(), &format_spec),
        _ => return Err(TemplateError::UnknownField(field.to_owned())),
    };
    out.push_str(&text.ok_or_else(unsupported)?);
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Align {
    Left,
    Right,
    Center,
}

/// The subset of Python's format mini-language that makes sense for a dam
/// record: fill, alignment, width, `,` grouping, precision and a type letter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    width: usize,
    grouping: bool,
    precision: Option<usize>,
    kind: Option<char>,
}
impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: None,
            width: 0,
            grouping: false,
            precision: None,
            kind: None,
        }
    }
}
impl FormatSpec {
    fn parse(spec: &str) -> Option<Self> {
        let captures =
            regex!(r"^(?:(.)?([<>^]))?(0)?(\d+)?(,)?(?:\.(\d+))?([dfs])?$").captures(spec)?;
        let align = captures.get(2).map(|m| match m.as_str() {
            "<" => Align::Left,
            ">" => Align::Right,
            _ => Align::Center,
        });
        let zero_padded = captures.get(3).is_some() && align.is_none();
        let fill = match captures.get(1) {
            Some(fill) => fill.as_str().chars().next()?,
            None if zero_padded => '0',
            None => ' ',
        };
        Some(Self {
            fill,
            align,
            width: captures.get(4).map_or(Ok(0), |m| m.as_str().parse()).ok()?,
            grouping: captures.get(5).is_some(),
            precision: captures.get(6).map(|m| m.as_str().parse()).transpose().ok()?,
            kind: captures.get(7).and_then(|m| m.as_str().chars().next()),
        })
    }

    fn pad(&self, text: &str, default_align: Align) -> String {
        let missing = self.width.saturating_sub(text.chars().count());
        let (left, right) = match self.align.unwrap_or(default_align) {
            Align::Left => (0, missing),
            Align::Right => (missing, 0),
            Align::Center => (missing / 2, missing - missing / 2),
        };
        let fill = |n| std::iter::repeat(self.fill).take(n);
        fill(left).chain(text.chars()).chain(fill(right)).collect()
    }
}

fn format_text(text: &str, spec: &FormatSpec) -> Option<String> {
    if spec.grouping || !matches!(spec.kind, None | Some('s')) {
        return None;
    }
    let text = match spec.precision {
        Some(precision) => text.chars().take(precision).collect(),
        None => text.to_owned(),
    };
    Some(spec.pad(&text, Align::Left))
}

fn format_volume(volume: u64, spec: &FormatSpec) -> Option<String> {
    if spec.precision.is_some() || !matches!(spec.kind, None | Some('d')) {
        return None;
    }
    let text = if spec.grouping {
        volume.to_formatted_string(&Locale::en)
    } else {
        volume.to_string()
    };
    Some(spec.pad(&text, Align::Right))
}

fn format_percent(percent: Decimal, spec: &FormatSpec) -> Option<String> {
    if spec.grouping || !matches!(spec.kind, None | Some('f')) {
        return None;
    }
    // Rounds half to even, like Python's decimal formatting.
    let text = match spec.precision {
        Some(precision) => {
            let dp = u32::try_from(precision).ok()?;
            format!("{:.precision$}", percent.round_dp(dp))
        }
        None => percent.to_string(),
    };
    Some(spec.pad(&text, Align::Right))
}
