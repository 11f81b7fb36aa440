use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use opendie_erc::{Report, Severity, Violation};
use opendie_model::{LogicModel, ModelError, ObjectId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Flat view of a violation for machine consumers.
#[derive(Debug, Serialize)]
pub struct ViolationRecord<'a> {
    pub object_id: ObjectId,
    pub object: String,
    pub class: &'static str,
    pub severity: &'static str,
    pub description: &'a str,
}

impl<'a> ViolationRecord<'a> {
    pub fn new(model: &LogicModel, v: &'a Violation) -> Result<Self, ModelError> {
        Ok(Self {
            object_id: v.object_id(),
            object: model.descriptive_identifier(v.object_id())?,
            class: v.class().as_str(),
            severity: v.severity_as_str(),
            description: v.description(),
        })
    }
}

pub fn write_report<W: Write>(
    out: &mut W,
    model: &LogicModel,
    report: &Report,
    format: Format,
) -> Result<()> {
    match format {
        Format::Json => {
            let records = report
                .violations()
                .iter()
                .map(|v| ViolationRecord::new(model, v))
                .collect::<Result<Vec<_>, _>>()
                .context("Violation refers to an object missing from the model")?;
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
        Format::Text => {
            for v in report.violations() {
                writeln!(out, "{}", v)?;
            }
            write!(
                out,
                "{} errors, {} warnings",
                report.count(Severity::Error),
                report.count(Severity::Warning)
            )?;
            if report.suppressed > 0 {
                write!(out, " ({} blacklisted)", report.suppressed)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
