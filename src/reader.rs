use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::info;

use crate::models::{Cell, Table};

/// Sheet the Google Forms export places the responses on.
pub const INPUT_SHEET: &str = "Form responses 1";

/// Load the applicant sheet into a `Table`. The first row is the header;
/// blank header cells get a positional placeholder name, fully empty data
/// rows are skipped.
pub fn read_workbook(file_path: &str) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(file_path)
        .with_context(|| format!("failed to open workbook: {}", file_path))?;

    let range = workbook
        .worksheet_range(INPUT_SHEET)
        .with_context(|| format!("sheet '{}' not found in {}", INPUT_SHEET, file_path))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| anyhow!("sheet '{}' has no header row", INPUT_SHEET))?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = match cell {
                Data::String(s) => s.trim().to_string(),
                Data::Empty => String::new(),
                other => other.to_string(),
            };
            if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            }
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        let cells: Vec<Cell> = (0..table.columns.len())
            .map(|i| row.get(i).map(convert_cell).unwrap_or(Cell::Empty))
            .collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        table.push_row(cells);
    }

    info!(
        rows = table.len(),
        columns = table.columns.len(),
        "loaded input sheet"
    );
    Ok(table)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    fn write_fixture(path: &std::path::Path, sheet_name: &str) -> Result<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name(sheet_name)?;
        sheet.write_string(0, 0, "Full Name")?;
        sheet.write_string(0, 1, "10th Percentage")?;
        // third header left blank on purpose
        sheet.write_string(1, 0, "Asha Rao")?;
        sheet.write_number(1, 1, 82.5)?;
        sheet.write_string(1, 2, "extra")?;
        sheet.write_string(3, 0, "Bela Shah")?;
        sheet.write_number(3, 1, 91.0)?;
        workbook.save(path)?;
        Ok(())
    }

    #[test]
    fn reads_header_rows_and_cells() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("input.xlsx");
        write_fixture(&path, INPUT_SHEET)?;

        let table = read_workbook(path.to_str().unwrap())?;
        assert_eq!(
            table.columns,
            vec![
                "Full Name".to_string(),
                "10th Percentage".to_string(),
                "Unnamed: 2".to_string()
            ]
        );
        // the fully empty row 2 is skipped
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("Asha Rao".into()));
        assert_eq!(table.rows[0][1], Cell::Number(82.5));
        assert_eq!(table.rows[1][2], Cell::Empty);
        Ok(())
    }

    #[test]
    fn missing_sheet_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("input.xlsx");
        write_fixture(&path, "Sheet1")?;

        let err = read_workbook(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains(INPUT_SHEET));
        Ok(())
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = read_workbook("no-such-file.xlsx").unwrap_err();
        assert!(err.to_string().contains("failed to open workbook"));
    }
}
