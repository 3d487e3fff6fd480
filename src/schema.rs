use std::fmt::Display;

use chrono::NaiveDateTime;
use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use lazy_format::lazy_format;
use rust_decimal::Decimal;
use serde::Serialize;
use typed_builder::TypedBuilder;

/// One row of the dam levels table.
///
/// Volumes are in megalitres as published.  `current` may exceed `max`
/// when a dam is spilling, so nothing relates the two.
#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder, Getters, CopyGetters, Serialize)]
pub struct DamRecord {
    #[getset(get = "pub")]
    name: String,
    #[getset(get_copy = "pub")]
    max: u64,
    #[getset(get_copy = "pub")]
    current: u64,
    #[getset(get_copy = "pub")]
    percent: Decimal,
    #[getset(get_copy = "pub")]
    updated: NaiveDateTime,
    #[getset(get = "pub")]
    comment: Option<String>,
}

impl DamRecord {
    /// The comment in parentheses, or nothing at all if there is none.
    pub fn pretty_comment(&self) -> impl Display + '_ {
        lazy_format!(if let Some(comment) = &self.comment => "({comment})" else => "")
    }
}

/// Dams keyed by name, in the order they appear on the page.
pub type DamTable = IndexMap<String, DamRecord>;

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::DamRecord;

    fn record(comment: Option<&str>) -> DamRecord {
        DamRecord::builder()
            .name("Somerset".to_owned())
            .max(379_849)
            .current(301_280)
            .percent(Decimal::new(793, 1))
            .updated(
                NaiveDate::from_ymd_opt(2024, 3, 12)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            )
            .comment(comment.map(str::to_owned))
            .build()
    }

    #[test]
    fn test_pretty_comment() {
        assert_eq!(
            record(Some("Gates open")).pretty_comment().to_string(),
            "(Gates open)"
        );
        assert_eq!(record(None).pretty_comment().to_string(), "");
    }
}
