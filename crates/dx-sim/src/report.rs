//! CSV import of checklist answers and CSV export of analysis tables.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::simulation::flags::FlagSet;
use crate::simulation::mode::Mode;
use crate::simulation::roi::RoiProjection;
use crate::simulation::society::SocietyAnalysis;
use crate::state::parse_flag_value;

#[derive(Debug, Deserialize)]
struct AnswerRow {
    flag: String,
    #[serde(default)]
    value: String,
}

/// Reads `flag,value` rows. Blank flags and unparseable values are skipped.
pub fn read_answers_csv<R: Read>(reader: R) -> Result<FlagSet, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut flags = FlagSet::new();

    for record in csv_reader.deserialize::<AnswerRow>() {
        let row = record?;
        if row.flag.is_empty() {
            continue;
        }
        if let Some(value) = parse_flag_value(&serde_json::Value::String(row.value)) {
            flags.set(row.flag, value);
        }
    }

    Ok(flags)
}

#[derive(Debug, Serialize)]
struct DomainRow<'a> {
    domain_id: &'a str,
    name: &'a str,
    mode: Mode,
    daily_volume: f64,
    processed_after: u64,
    time_before_hours: u64,
    time_after_hours: u64,
    monthly_cost_before: u64,
    monthly_cost_after: u64,
    base_reduction: f64,
    adjusted_reduction: f64,
}

pub fn write_analysis_csv<W: Write>(
    analysis: &SocietyAnalysis,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for domain in &analysis.domains {
        csv_writer.serialize(DomainRow {
            domain_id: &domain.domain_id,
            name: &domain.name,
            mode: domain.mode,
            daily_volume: domain.daily_volume,
            processed_after: domain.processed_after,
            time_before_hours: domain.time_before_hours,
            time_after_hours: domain.time_after_hours,
            monthly_cost_before: domain.monthly_cost_before,
            monthly_cost_after: domain.monthly_cost_after,
            base_reduction: domain.rates.base.reduction,
            adjusted_reduction: domain.rates.adjusted.reduction,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct RoiRow {
    year: u32,
    cumulative_cost: f64,
    cumulative_saving: f64,
    cumulative_net_benefit: f64,
}

pub fn write_roi_csv<W: Write>(projection: &RoiProjection, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let rows = projection
        .years
        .iter()
        .zip(&projection.cumulative_costs)
        .zip(&projection.cumulative_savings)
        .zip(&projection.cumulative_net_benefit);
    for (((year, cost), saving), net) in rows {
        csv_writer.serialize(RoiRow {
            year: *year,
            cumulative_cost: *cost,
            cumulative_saving: *saving,
            cumulative_net_benefit: *net,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
