use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use itertools::Itertools;
use log::debug;
use rust_decimal::Decimal;
use scraper::ElementRef;
use strum::{Display, EnumIter};

use crate::{parser::ParseError, schema::DamRecord};

/// Identifies which statistic an element in a dam row holds.
/// The element id is `dam{row id}{suffix}`, e.g. `dam7Vol`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, EnumIter)]
pub enum FieldSuffix {
    Nam,
    Max,
    Vol,
    Per,
    Read,
    Comment,
}

// Day comes first on this page.
const DATE_TIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M %p",
    "%d/%m/%Y %I:%M%p",
    "%d %B %Y %I:%M %p",
    "%d %b %Y %I:%M %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d %B %Y", "%d %b %Y", "%Y-%m-%d"];

pub fn parse_dam_row(row: ElementRef) -> Result<DamRecord, ParseError> {
    use FieldSuffix::*;

    let id = dam_row_id(row)?;
    debug!("Parsing dam row {id}");
    let field = |suffix: FieldSuffix| find_field_text(row, id, suffix);

    Ok(DamRecord::builder()
        .name(normalize_dam_name(&field(Nam)?))
        .max(parse_volume(Max, &field(Max)?)?)
        .current(parse_volume(Vol, &field(Vol)?)?)
        .percent(parse_percent(&field(Per)?)?)
        .updated(parse_updated(&field(Read)?)?)
        .comment(parse_comment(field(Comment)?))
        .build())
}

/// Reads the numeric id out of the row's class list, e.g. `7` from `dam7 odd`.
pub fn dam_row_id(row: ElementRef) -> Result<u32, ParseError> {
    let class = row
        .value()
        .attr("class")
        .unwrap_or_default()
        .split_ascii_whitespace()
        .join(" ");
    let id: Option<u32> = regex!(r"^[a-zA-Z]+(\d+)")
        .captures(&class)
        .and_then(|captures| captures[1].parse().ok());
    id.ok_or(ParseError::IdExtraction { class })
}

pub fn field_element_id(row_id: u32, suffix: FieldSuffix) -> String {
    format!("dam{row_id}{suffix}")
}

fn find_field_text(row: ElementRef, row_id: u32, suffix: FieldSuffix) -> Result<String, ParseError> {
    let element_id = field_element_id(row_id, suffix);
    // `descendants` starts at the row itself, which is not a field.
    let element = row
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().id() == Some(element_id.as_str()))
        .ok_or(ParseError::FieldNotFound { element_id })?;
    Ok(element.text().collect::<String>().trim().to_owned())
}

/// Drops the trailing `*` that marks footnoted dams.
pub fn normalize_dam_name(text: &str) -> String {
    text.trim_end_matches(|c: char| c == '*' || c.is_whitespace())
        .to_owned()
}

pub fn parse_volume(field: FieldSuffix, text: &str) -> Result<u64, ParseError> {
    text.replace(',', "")
        .parse()
        .map_err(|source| ParseError::NumericParse {
            field,
            text: text.to_owned(),
            source,
        })
}

pub fn parse_percent(text: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(text).map_err(|source| ParseError::DecimalParse {
        text: text.to_owned(),
        source,
    })
}

pub fn parse_updated(text: &str) -> Result<NaiveDateTime, ParseError> {
    let date_time = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok());
    let date = || {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .map(|date| date.and_time(NaiveTime::default()))
    };
    date_time
        .or_else(date)
        .ok_or_else(|| ParseError::TimestampParse {
            text: text.to_owned(),
        })
}

pub fn parse_comment(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
