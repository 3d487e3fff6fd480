use std::fmt::Debug;

use serde::Serialize;
use thiserror::Error;

use crate::{
    schema::{DamRecord, DamTable},
    template::{self, TemplateError, ALL_FIELDS, DEFAULT_TEMPLATE},
};

/// What the user asked to see, decided by how many positional arguments
/// were given.
#[derive(Clone, Copy, Debug)]
pub enum Request<'a> {
    AllDams,
    Dam {
        name: &'a str,
        template: Option<&'a str>,
    },
}
impl<'a> Request<'a> {
    pub fn new(name: Option<&'a str>, template: Option<&'a str>) -> Self {
        match name {
            None => Self::AllDams,
            Some(name) => Self::Dam { name, template },
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DumpStyle {
    #[default]
    Debug,
    Json,
}

#[derive(Debug, Error)]
#[error("a valid dam name must be specified, or no argument given")]
pub struct LookupError {
    pub name: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to serialize the dump: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn lookup<'t>(dams: &'t DamTable, name: &str) -> Result<&'t DamRecord, LookupError> {
    dams.get(name).ok_or_else(|| LookupError {
        name: name.to_owned(),
    })
}

pub fn render_report(
    dams: &DamTable,
    request: Request,
    style: DumpStyle,
) -> Result<String, ReportError> {
    match request {
        Request::AllDams => dump(dams, style),
        Request::Dam { name, template } => {
            let dam = lookup(dams, name)?;
            match template.unwrap_or(DEFAULT_TEMPLATE) {
                ALL_FIELDS => dump(dam, style),
                template => Ok(template::render(template, dam)?),
            }
        }
    }
}

/// What the process prints and how it exits once the report is settled.
#[derive(PartialEq, Eq, Debug)]
pub struct Outcome {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: i32,
}

/// An unknown dam is reported to the user; every other error is returned.
pub fn report_outcome(res: Result<String, ReportError>) -> Result<Outcome, ReportError> {
    match res {
        Ok(report) => Ok(Outcome {
            stdout: Some(report),
            stderr: None,
            exit_code: 0,
        }),
        Err(ReportError::Lookup(e)) => Ok(Outcome {
            stdout: None,
            stderr: Some(format!("Error: {e}")),
            exit_code: 1,
        }),
        Err(e) => Err(e),
    }
}

fn dump<T: Debug + Serialize + ?Sized>(value: &T, style: DumpStyle) -> Result<String, ReportError> {
    Ok(match style {
        DumpStyle::Debug => format!("{value:#?}"),
        DumpStyle::Json => serde_json::to_string_pretty(value)?,
    })
}
