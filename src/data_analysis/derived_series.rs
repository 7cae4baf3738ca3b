// src/data_analysis/derived_series.rs

use chrono::{NaiveDate, NaiveTime, Timelike};
use log::{debug, info, warn};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::constants::{
    CLOCK_WITHOUT_HOUR_PATTERN, CURRENT_COLUMN, DATE_COLUMN, DATE_FORMAT, ELAPSED_TIME_COLUMN, LIPO_CELL_PATTERN,
    LIPO_TOTAL_COLUMN, POWER_COLUMN, TIME_COLUMN, VFAS_COLUMN,
};
use crate::data_input::log_data::{Column, ColumnTable};
use crate::error::MissingDerivationInput;
use crate::settings::ImportOptions;
use crate::types::NumericSeries;

/// Values produced by one rule. `time_base` is only set by the elapsed-time rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutput {
    pub values: NumericSeries,
    pub time_base: Option<f64>,
}

impl RuleOutput {
    fn series(values: NumericSeries) -> Self {
        Self { values, time_base: None }
    }
}

/// A computed column, gated on the presence of its source columns.
///
/// Rules only read source columns, never another rule's output, so the order in which a
/// registry is evaluated does not matter.
pub trait DerivationRule {
    fn name(&self) -> &'static str;

    fn output_column(&self) -> &'static str;

    /// Source columns this rule reads, in the order `derive` expects them.
    fn resolve_inputs(&self, table: &ColumnTable) -> Result<Vec<String>, MissingDerivationInput>;

    fn derive(&self, inputs: &[&Column], row_count: usize) -> RuleOutput;
}

fn require_numeric(
    table: &ColumnTable,
    rule: &'static str,
    names: &[&str],
) -> Result<Vec<String>, MissingDerivationInput> {
    let missing: Vec<String> = names
        .iter()
        .filter(|name| table.numeric(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(names.iter().map(|n| n.to_string()).collect())
    } else {
        Err(MissingDerivationInput { rule, missing })
    }
}

fn numeric_at(column: &Column, row: usize) -> Option<f64> {
    column.as_numeric().and_then(|values| values.get(row).copied().flatten())
}

fn clock_without_hour() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CLOCK_WITHOUT_HOUR_PATTERN).expect("clock pattern is valid"))
}

fn lipo_cell() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LIPO_CELL_PATTERN).expect("LiPo cell pattern is valid"))
}

/// Parses an Ethos clock time (`HH:MM:SS.f`). Values that lost their hour (`MM:SS.f`) get
/// `missing_hour_prefix` prepended.
pub fn parse_clock_time(raw: &str, missing_hour_prefix: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    let candidate = if clock_without_hour().is_match(trimmed) {
        Cow::Owned(format!("{}{}", missing_hour_prefix, trimmed))
    } else {
        Cow::Borrowed(trimmed)
    };
    NaiveTime::parse_from_str(&candidate, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(&candidate, "%H:%M:%S"))
        .ok()
}

/// `ElapsedTime` in seconds from the first row's timestamp.
#[derive(Debug, Clone)]
pub struct ElapsedTimeRule {
    missing_hour_prefix: String,
}

impl ElapsedTimeRule {
    pub fn new(missing_hour_prefix: &str) -> Self {
        Self {
            missing_hour_prefix: missing_hour_prefix.to_string(),
        }
    }

    /// Seconds for one row: a numeric `Time` is used as-is, a clock time is seconds since
    /// midnight, or since the Unix epoch when a `Date` is present.
    fn timestamp_at(&self, time: &Column, date: Option<&Column>, row: usize) -> Option<f64> {
        if let Some(seconds) = time.as_numeric() {
            return seconds.get(row).copied().flatten();
        }
        let clock = parse_clock_time(&time.values.display_value(row)?, &self.missing_hour_prefix)?;
        let seconds_of_day = clock.num_seconds_from_midnight() as f64 + clock.nanosecond() as f64 * 1e-9;
        match date {
            None => Some(seconds_of_day),
            Some(date) => {
                let day = NaiveDate::parse_from_str(date.values.display_value(row)?.trim(), DATE_FORMAT).ok()?;
                let midnight = day.and_hms_opt(0, 0, 0)?.and_utc().timestamp() as f64;
                Some(midnight + seconds_of_day)
            }
        }
    }
}

impl DerivationRule for ElapsedTimeRule {
    fn name(&self) -> &'static str {
        "elapsed time"
    }

    fn output_column(&self) -> &'static str {
        ELAPSED_TIME_COLUMN
    }

    fn resolve_inputs(&self, table: &ColumnTable) -> Result<Vec<String>, MissingDerivationInput> {
        if table.column(TIME_COLUMN).is_none() {
            return Err(MissingDerivationInput {
                rule: self.name(),
                missing: vec![TIME_COLUMN.to_string()],
            });
        }
        let mut inputs = vec![TIME_COLUMN.to_string()];
        // Date only matters for clock times; numeric time is already absolute.
        if table.numeric(TIME_COLUMN).is_none() && table.column(DATE_COLUMN).is_some() {
            inputs.push(DATE_COLUMN.to_string());
        }
        Ok(inputs)
    }

    fn derive(&self, inputs: &[&Column], row_count: usize) -> RuleOutput {
        let time = inputs[0];
        let date = inputs.get(1).copied();
        let timestamps: Vec<Option<f64>> = (0..row_count).map(|row| self.timestamp_at(time, date, row)).collect();

        let time_base = timestamps.first().copied().flatten();
        if time_base.is_none() && timestamps.iter().any(Option::is_some) {
            warn!("First row has no valid timestamp, elapsed time left missing");
        }

        let values = timestamps
            .iter()
            .map(|t| t.zip(time_base).map(|(t, base)| t - base))
            .collect();
        RuleOutput { values, time_base }
    }
}

/// `LiPo Total(V)`: row-wise sum of every `LiPo<N>(V)` cell column. A row with any cell
/// missing has no total.
#[derive(Debug, Clone, Default)]
pub struct LipoTotalRule;

impl DerivationRule for LipoTotalRule {
    fn name(&self) -> &'static str {
        "aggregate battery voltage"
    }

    fn output_column(&self) -> &'static str {
        LIPO_TOTAL_COLUMN
    }

    fn resolve_inputs(&self, table: &ColumnTable) -> Result<Vec<String>, MissingDerivationInput> {
        let mut cells: Vec<(u32, String)> = table
            .columns()
            .iter()
            .filter(|c| c.as_numeric().is_some())
            .filter_map(|c| {
                let captures = lipo_cell().captures(&c.name)?;
                let index = captures.get(1)?.as_str().parse::<u32>().ok()?;
                Some((index, c.name.clone()))
            })
            .collect();
        if cells.is_empty() {
            return Err(MissingDerivationInput {
                rule: self.name(),
                missing: vec!["LiPo<N>(V)".to_string()],
            });
        }
        cells.sort();
        Ok(cells.into_iter().map(|(_, name)| name).collect())
    }

    fn derive(&self, inputs: &[&Column], row_count: usize) -> RuleOutput {
        let values = (0..row_count)
            .map(|row| inputs.iter().map(|cell| numeric_at(cell, row)).sum::<Option<f64>>())
            .collect();
        RuleOutput::series(values)
    }
}

/// `Power(W)` = `VFAS(V)` × `Current(A)`.
#[derive(Debug, Clone, Default)]
pub struct PowerRule;

impl DerivationRule for PowerRule {
    fn name(&self) -> &'static str {
        "power"
    }

    fn output_column(&self) -> &'static str {
        POWER_COLUMN
    }

    fn resolve_inputs(&self, table: &ColumnTable) -> Result<Vec<String>, MissingDerivationInput> {
        require_numeric(table, self.name(), &[VFAS_COLUMN, CURRENT_COLUMN])
    }

    fn derive(&self, inputs: &[&Column], row_count: usize) -> RuleOutput {
        let values = (0..row_count)
            .map(|row| {
                numeric_at(inputs[0], row)
                    .zip(numeric_at(inputs[1], row))
                    .map(|(volts, amps)| volts * amps)
            })
            .collect();
        RuleOutput::series(values)
    }
}

/// The rules evaluated on every import.
pub fn default_rules(options: &ImportOptions) -> Vec<Box<dyn DerivationRule>> {
    vec![
        Box::new(ElapsedTimeRule::new(&options.missing_hour_prefix)),
        Box::new(LipoTotalRule),
        Box::new(PowerRule),
    ]
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisReport {
    pub generated: Vec<&'static str>,
    pub skipped: Vec<MissingDerivationInput>,
    pub time_base: Option<f64>,
}

/// Runs every rule against the table as it stands, then appends the outputs.
///
/// An output whose name already exists (re-importing a processed file) replaces that column.
pub fn synthesize(table: &mut ColumnTable, rules: &[Box<dyn DerivationRule>]) -> SynthesisReport {
    let mut report = SynthesisReport::default();
    let mut outputs: Vec<Column> = Vec::new();

    for rule in rules {
        match rule.resolve_inputs(table) {
            Ok(names) => {
                let inputs: Vec<&Column> = names.iter().filter_map(|name| table.column(name)).collect();
                let output = rule.derive(&inputs, table.row_count());
                if output.time_base.is_some() {
                    report.time_base = output.time_base;
                }
                info!("Generated '{}' from {:?}", rule.output_column(), names);
                outputs.push(Column::derived(rule.output_column(), output.values));
                report.generated.push(rule.output_column());
            }
            Err(missing) => {
                debug!("{}", missing);
                report.skipped.push(missing);
            }
        }
    }

    for column in outputs {
        table.push(column);
    }
    report
}


// src/data_analysis/derived_series.rs
