use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatAlign, Url, Workbook, Worksheet};
use tracing::info;

use crate::columns::COL_RESUME;
use crate::models::{Cell, Table};

/// Sheet name of the eligibility audit trail.
pub const REMOVED_SHEET: &str = "removed";

/// Write the cleaned sheet and the removed-rows audit sheet into one
/// workbook. Resume URLs become clickable links, every column is sized to
/// its longest rendered value plus two characters, content is centered.
pub fn write_workbook(
    file_path: &str,
    cleaned: &Table,
    removed: &Table,
    sheet_name: &str,
) -> Result<()> {
    let header_format = Format::new()
        .set_font_name("Arial")
        .set_font_size(10)
        .set_bold()
        .set_align(FormatAlign::Center);
    let body_format = Format::new()
        .set_font_name("Arial")
        .set_font_size(10)
        .set_align(FormatAlign::Center);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name(sheet_name)?;
    write_sheet(sheet, cleaned, &header_format, &body_format)?;
    let sheet = workbook.add_worksheet().set_name(REMOVED_SHEET)?;
    write_sheet(sheet, removed, &header_format, &body_format)?;

    workbook
        .save(file_path)
        .with_context(|| format!("failed to write workbook: {}", file_path))?;

    info!(
        file = file_path,
        cleaned_rows = cleaned.len(),
        removed_rows = removed.len(),
        "workbook written"
    );
    Ok(())
}

fn write_sheet(
    sheet: &mut Worksheet,
    table: &Table,
    header_format: &Format,
    body_format: &Format,
) -> Result<()> {
    let resume_col = table.column_index(COL_RESUME);
    let mut widths: Vec<usize> = table.columns.iter().map(|name| name.chars().count()).collect();

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, header_format)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let width = cell.render().chars().count();
            if width > widths[c] {
                widths[c] = width;
            }
            match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    sheet.write_number_with_format(row_num, c as u16, *n, body_format)?;
                }
                Cell::Text(s) => {
                    if resume_col == Some(c) && is_url(s) {
                        sheet.write_url_with_format(
                            row_num,
                            c as u16,
                            Url::new(s).set_text(s),
                            body_format,
                        )?;
                    } else {
                        sheet.write_string_with_format(row_num, c as u16, s, body_format)?;
                    }
                }
            }
        }
    }

    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, (*width + 2) as f64)?;
    }
    Ok(())
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use tempfile::tempdir;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample_tables() -> (Table, Table) {
        let mut cleaned = Table::new(vec![
            "Sr No".to_string(),
            "Name".to_string(),
            COL_RESUME.to_string(),
        ]);
        cleaned.push_row(vec![
            Cell::Number(1.0),
            text("AshaRao"),
            text("https://example.com/asha.pdf"),
        ]);
        cleaned.push_row(vec![Cell::Number(2.0), text("ChetanPatil"), text("NA")]);

        let mut removed = Table::new(vec!["Full Name".to_string(), "Gap".to_string()]);
        removed.push_row(vec![text("BelaShah"), Cell::Empty]);
        (cleaned, removed)
    }

    #[test]
    fn writes_both_sheets_with_values() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.xlsx");
        let (cleaned, removed) = sample_tables();

        write_workbook(path.to_str().unwrap(), &cleaned, &removed, "RAIT")?;

        let mut workbook: Xlsx<_> = open_workbook(&path)?;
        assert_eq!(
            workbook.sheet_names(),
            vec!["RAIT".to_string(), REMOVED_SHEET.to_string()]
        );

        let range = workbook.worksheet_range("RAIT")?;
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("Name".into())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
        // a URL cell round-trips as its display text
        assert_eq!(
            range.get_value((1, 2)),
            Some(&Data::String("https://example.com/asha.pdf".into()))
        );
        assert_eq!(range.get_value((2, 2)), Some(&Data::String("NA".into())));

        let range = workbook.worksheet_range(REMOVED_SHEET)?;
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("BelaShah".into()))
        );
        // empty audit cells stay empty
        assert_eq!(range.get_value((1, 1)), Some(&Data::Empty));
        Ok(())
    }

    #[test]
    fn zero_row_tables_still_produce_a_workbook() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.xlsx");
        let cleaned = Table::new(vec!["Sr No".to_string(), "Name".to_string()]);
        let removed = Table::new(vec!["Full Name".to_string()]);

        write_workbook(path.to_str().unwrap(), &cleaned, &removed, "RAIT")?;

        let mut workbook: Xlsx<_> = open_workbook(&path)?;
        let range = workbook.worksheet_range("RAIT")?;
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Sr No".into())));
        assert_eq!(range.height(), 1);
        Ok(())
    }

    #[test]
    fn url_detection_is_scheme_based() {
        assert!(is_url("https://example.com/cv.pdf"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("NA"));
        assert!(!is_url("example.com/cv.pdf"));
    }
}
