use anyhow::{bail, Result};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::columns::{
    COL_10TH_PERCENTAGE, COL_10TH_YEAR, COL_12TH_PERCENTAGE, COL_12TH_YEAR, COL_BTECH_CGPA,
    COL_BTECH_PERCENTAGE, COL_DROP, COL_FULL_NAME, COL_GAP, COL_LIVE_KT, COL_NAME, COL_SERIAL,
    DROPPED_COLUMNS, REQUIRED_COLUMNS,
};
use crate::models::{normalize_identifier, Cell, Config, Table};

/// A year-of-passing value that does not look like a 4-digit year.
/// Diagnostic only; the row stays in the sheet.
#[derive(Debug, Clone)]
pub struct YearDiagnostic {
    pub column: String,
    pub identifier: String,
    pub value: String,
}

/// Result of one pipeline run: the cleaned sheet, the audit trail of
/// ineligible rows, and the bookkeeping the operator summary prints.
#[derive(Debug)]
pub struct CleanOutcome {
    pub cleaned: Table,
    pub removed: Table,
    pub removal_counts: Vec<(String, usize)>,
    pub year_diagnostics: Vec<YearDiagnostic>,
}

/// Runs the cleaning stages in their fixed order over one input sheet.
/// Construct a fresh instance per run.
pub struct RecordCleaner<'a> {
    config: &'a Config,
}

impl<'a> RecordCleaner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn run(&self, table: Table) -> Result<CleanOutcome> {
        validate_schema(&table)?;
        let table = normalize_and_dedup(table)?;

        let mut removed = Table::new(table.columns.clone());
        let mut removal_counts = Vec::new();
        let mut year_diagnostics = Vec::new();

        let before = table.len();
        let table = filter_at_least(table, COL_10TH_PERCENTAGE, self.config.cutoff_10th, &mut removed)?;
        removal_counts.push((COL_10TH_PERCENTAGE.to_string(), before - table.len()));
        year_diagnostics.extend(check_year_format(&table, COL_10TH_YEAR)?);

        let before = table.len();
        let table = filter_at_least(table, COL_12TH_PERCENTAGE, self.config.cutoff_12th, &mut removed)?;
        removal_counts.push((COL_12TH_PERCENTAGE.to_string(), before - table.len()));
        year_diagnostics.extend(check_year_format(&table, COL_12TH_YEAR)?);

        let before = table.len();
        let table = filter_at_least(table, COL_BTECH_CGPA, self.config.cutoff_btech_cgpa, &mut removed)?;
        removal_counts.push((COL_BTECH_CGPA.to_string(), before - table.len()));

        let before = table.len();
        let table = filter_at_most(table, COL_LIVE_KT, self.config.cutoff_live_kt, &mut removed)?;
        removal_counts.push((COL_LIVE_KT.to_string(), before - table.len()));

        let before = table.len();
        let table = filter_at_most(table, COL_DROP, self.config.cutoff_drop, &mut removed)?;
        removal_counts.push((COL_DROP.to_string(), before - table.len()));

        let before = table.len();
        let table = filter_at_most(table, COL_GAP, self.config.cutoff_gap, &mut removed)?;
        removal_counts.push((COL_GAP.to_string(), before - table.len()));

        let table = prune_columns(table);
        let table = trim_text_column(table, 1);
        let table = drop_redundant_metric(table, self.config.keep_percentage)?;
        let table = reorder_columns(table, &self.config.column_order)?;
        let table = add_serial_numbers(table);
        let table = rename_header(table, COL_FULL_NAME, COL_NAME);
        let table = fill_missing(table);

        info!(
            eligible = table.len(),
            removed = removed.len(),
            diagnostics = year_diagnostics.len(),
            "cleaning pipeline finished"
        );

        Ok(CleanOutcome {
            cleaned: table,
            removed,
            removal_counts,
            year_diagnostics,
        })
    }
}

/// Verify the expected schema up front: every referenced column present and
/// the identifier column first. Reports all absent columns in one error.
pub fn validate_schema(table: &Table) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("missing required column '{}'", missing.join("', '"));
    }
    if table.columns.first().map(String::as_str) != Some(COL_FULL_NAME) {
        bail!(
            "first column must be '{}', found '{}'",
            COL_FULL_NAME,
            table.columns.first().map(String::as_str).unwrap_or("")
        );
    }
    Ok(())
}

/// Strip whitespace out of the identifier values, keep the first row for
/// each identifier, and sort ascending by identifier.
pub fn normalize_and_dedup(mut table: Table) -> Result<Table> {
    let idx = table.require_column(COL_FULL_NAME)?;

    for row in &mut table.rows {
        let normalized = normalize_identifier(&row[idx].render());
        row[idx] = Cell::Text(normalized);
    }

    let mut seen = std::collections::HashSet::new();
    let before = table.len();
    table.rows.retain(|row| seen.insert(row[idx].render()));
    let duplicates = before - table.len();
    if duplicates > 0 {
        debug!(duplicates, "dropped duplicate identifiers");
    }

    table.rows.sort_by_key(|row| row[idx].render());
    Ok(table)
}

/// Keep rows whose value meets the cutoff (`value >= cutoff`); everything
/// else, including cells that do not parse as a number, goes to `removed`.
pub fn filter_at_least(
    table: Table,
    column: &str,
    cutoff: f64,
    removed: &mut Table,
) -> Result<Table> {
    let idx = table.require_column(column)?;
    let mut kept = Table::new(table.columns.clone());
    for row in table.rows {
        match row[idx].as_number() {
            Some(value) if value >= cutoff => kept.rows.push(row),
            _ => removed.rows.push(row),
        }
    }
    debug!(column, cutoff, remaining = kept.len(), "at-least criterion applied");
    Ok(kept)
}

/// Keep rows whose value stays within the cutoff (`value <= cutoff`);
/// unparseable cells fail the criterion like `filter_at_least`.
pub fn filter_at_most(
    table: Table,
    column: &str,
    cutoff: f64,
    removed: &mut Table,
) -> Result<Table> {
    let idx = table.require_column(column)?;
    let mut kept = Table::new(table.columns.clone());
    for row in table.rows {
        match row[idx].as_number() {
            Some(value) if value <= cutoff => kept.rows.push(row),
            _ => removed.rows.push(row),
        }
    }
    debug!(column, cutoff, remaining = kept.len(), "at-most criterion applied");
    Ok(kept)
}

/// Flag year-of-passing values that are not exactly four digits. Rows are
/// never removed here.
pub fn check_year_format(table: &Table, column: &str) -> Result<Vec<YearDiagnostic>> {
    let idx = table.require_column(column)?;
    let id_idx = table.require_column(COL_FULL_NAME)?;
    let pattern = Regex::new(r"^\d{4}$").unwrap();

    let mut diagnostics = Vec::new();
    for row in &table.rows {
        let value = row[idx].render();
        if !pattern.is_match(&value) {
            let identifier = row[id_idx].render();
            warn!(column, identifier = %identifier, value = %value, "malformed year of passing");
            diagnostics.push(YearDiagnostic {
                column: column.to_string(),
                identifier,
                value,
            });
        }
    }
    Ok(diagnostics)
}

/// Drop the administrative/contact columns; entries absent from this sheet
/// are skipped silently.
pub fn prune_columns(mut table: Table) -> Table {
    for name in DROPPED_COLUMNS {
        table.drop_column(name);
    }
    table
}

/// Trim leading/trailing whitespace from text cells of one column by
/// position. Out-of-range positions are a no-op.
pub fn trim_text_column(mut table: Table, position: usize) -> Table {
    if position >= table.columns.len() {
        return table;
    }
    for row in &mut table.rows {
        if let Cell::Text(s) = &row[position] {
            row[position] = Cell::Text(s.trim().to_string());
        }
    }
    table
}

/// Drop whichever of the two degree metrics the caller did not pick.
pub fn drop_redundant_metric(mut table: Table, keep_percentage: bool) -> Result<Table> {
    let doomed = if keep_percentage {
        COL_BTECH_CGPA
    } else {
        COL_BTECH_PERCENTAGE
    };
    table.require_column(doomed)?;
    table.drop_column(doomed);
    Ok(table)
}

/// Arrange columns per the preference order (matched names first, the rest
/// keeping their original relative order), then sort rows by identifier.
pub fn reorder_columns(table: Table, order: &[String]) -> Result<Table> {
    let mut picked: Vec<usize> = Vec::with_capacity(table.columns.len());
    for name in order {
        if let Some(idx) = table.column_index(name) {
            if !picked.contains(&idx) {
                picked.push(idx);
            }
        }
    }
    for idx in 0..table.columns.len() {
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }

    let columns = picked.iter().map(|&i| table.columns[i].clone()).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| picked.iter().map(|&i| row[i].clone()).collect())
        .collect();
    let mut table = Table { columns, rows };

    let key = table.require_column(COL_FULL_NAME)?;
    table.rows.sort_by_key(|row| row[key].render());
    Ok(table)
}

/// Insert the 1-based "Sr No" column at position 0.
pub fn add_serial_numbers(mut table: Table) -> Table {
    table.columns.insert(0, COL_SERIAL.to_string());
    for (i, row) in table.rows.iter_mut().enumerate() {
        row.insert(0, Cell::Number((i + 1) as f64));
    }
    table
}

/// Rename one header for presentation; absent columns are skipped.
pub fn rename_header(mut table: Table, from: &str, to: &str) -> Table {
    if let Some(idx) = table.column_index(from) {
        table.columns[idx] = to.to_string();
    }
    table
}

/// Replace every empty cell with the literal text "NA".
pub fn fill_missing(mut table: Table) -> Table {
    for row in &mut table.rows {
        for cell in row {
            if cell.is_empty() {
                *cell = Cell::Text("NA".to_string());
            }
        }
    }
    table
}
