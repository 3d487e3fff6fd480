use std::num::ParseIntError;

use itertools::Itertools;
use log::{debug, info, warn};
use scraper::{ElementRef, Html};
use thiserror::Error;

use crate::schema::DamTable;

use self::dam_row::FieldSuffix;

pub mod dam_row;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Expected at least two `table.TableDataAllDams` elements, found {found}")]
    Structure { found: usize },
    #[error("Row class {class:?} does not start with a dam id")]
    IdExtraction { class: String },
    #[error("Element #{element_id} was not found in the dam row")]
    FieldNotFound { element_id: String },
    #[error("Field {field} is not a valid integer: {text:?}")]
    NumericParse {
        field: FieldSuffix,
        text: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Percentage is not a valid decimal: {text:?}")]
    DecimalParse {
        text: String,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("Timestamp is in an unrecognized format: {text:?}")]
    TimestampParse { text: String },
}

pub fn parse_all_dams(html: &str) -> Result<DamTable, ParseError> {
    parse_document(&Html::parse_document(html))
}

pub fn parse_document(document: &Html) -> Result<DamTable, ParseError> {
    let table = locate_dams_table(document)?;
    let mut dams = DamTable::new();
    for row in table.select(selector!("tbody tr")) {
        let record = dam_row::parse_dam_row(row)?;
        let name = record.name().clone();
        if dams.insert(name.clone(), record).is_some() {
            warn!("Dam {name:?} appeared more than once; keeping the later row");
        }
    }
    info!("Parsed {} dams", dams.len());
    Ok(dams)
}

/// The page carries several `TableDataAllDams` tables and the full listing
/// is the second one.  Layout changes on the page only need to touch this.
pub fn locate_dams_table(document: &Html) -> Result<ElementRef<'_>, ParseError> {
    let tables = document
        .select(selector!("table.TableDataAllDams"))
        .collect_vec();
    debug!("Found {} dam tables", tables.len());
    tables.get(1).copied().ok_or(ParseError::Structure {
        found: tables.len(),
    })
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use scraper::Html;

    use super::{locate_dams_table, parse_all_dams, ParseError};
    use crate::schema::DamRecord;

    pub const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Dam levels</title></head>
<body>
<table class="TableDataAllDams summary">
  <tbody>
    <tr class="total0"><td id="total0Nam">Combined capacity</td></tr>
  </tbody>
</table>
<table class="TableDataAllDams">
  <thead>
    <tr><th>Dam</th><th>Full supply</th><th>Volume</th><th>%</th><th>Read</th><th></th></tr>
  </thead>
  <tbody>
    <tr class="dam7 odd">
      <td id="dam7Nam">Wivenhoe*</td>
      <td id="dam7Max">1,165,238</td>
      <td id="dam7Vol">850,000</td>
      <td id="dam7Per">72.9</td>
      <td id="dam7Read">12/03/2024</td>
      <td id="dam7Comment"></td>
    </tr>
    <tr class="dam12 even">
      <td id="dam12Nam">Somerset</td>
      <td id="dam12Max">379,849</td>
      <td id="dam12Vol">301,280</td>
      <td id="dam12Per">79.3</td>
      <td id="dam12Read">12/03/2024 9:00 AM</td>
      <td id="dam12Comment"> Gates open </td>
    </tr>
  </tbody>
</table>
</body>
</html>"#;

    #[test]
    fn test_parse_sample_page() {
        let dams = parse_all_dams(SAMPLE_PAGE).unwrap();
        assert_eq!(
            dams.keys().map(String::as_str).collect::<Vec<_>>(),
            ["Wivenhoe", "Somerset"]
        );

        let expected = DamRecord::builder()
            .name("Wivenhoe".to_owned())
            .max(1_165_238)
            .current(850_000)
            .percent(Decimal::new(729, 1))
            .updated(
                NaiveDate::from_ymd_opt(2024, 3, 12)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
            .comment(None)
            .build();
        assert_eq!(dams["Wivenhoe"], expected);

        let somerset = &dams["Somerset"];
        assert_eq!(somerset.comment().as_deref(), Some("Gates open"));
        assert_eq!(
            somerset.updated(),
            NaiveDate::from_ymd_opt(2024, 3, 12)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_locate_requires_second_table() {
        let html = Html::parse_document(
            r#"<table class="TableDataAllDams"><tbody><tr class="dam1"></tr></tbody></table>"#,
        );
        assert!(matches!(
            locate_dams_table(&html),
            Err(ParseError::Structure { found: 1 })
        ));
        assert!(matches!(
            parse_all_dams("<p>maintenance</p>"),
            Err(ParseError::Structure { found: 0 })
        ));
    }

    #[test]
    fn test_later_row_wins() {
        let row = |id: u32, vol: &str| {
            format!(
                r#"<tr class="dam{id}"><td id="dam{id}Nam">Hinze*</td><td id="dam{id}Max">310,730</td>
                <td id="dam{id}Vol">{vol}</td><td id="dam{id}Per">90.0</td>
                <td id="dam{id}Read">01/02/2024</td><td id="dam{id}Comment"></td></tr>"#
            )
        };
        let html = format!(
            r#"<table class="TableDataAllDams"></table>
            <table class="TableDataAllDams"><tbody>{}{}</tbody></table>"#,
            row(1, "100"),
            row(2, "200"),
        );
        let dams = parse_all_dams(&html).unwrap();
        assert_eq!(dams.len(), 1);
        assert_eq!(dams["Hinze"].current(), 200);
    }

    #[test]
    fn test_bad_row_aborts_page() {
        let html = r#"<table class="TableDataAllDams"></table>
            <table class="TableDataAllDams"><tbody><tr class="odd"><td>?</td></tr></tbody></table>"#;
        assert!(matches!(
            parse_all_dams(html),
            Err(ParseError::IdExtraction { .. })
        ));
    }
}
