use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::columns::{default_column_order, COL_BTECH_CGPA, COL_BTECH_PERCENTAGE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cutoff_10th: f64,
    pub cutoff_12th: f64,
    pub cutoff_btech_cgpa: f64,
    pub cutoff_live_kt: f64,
    pub cutoff_drop: f64,
    pub cutoff_gap: f64,
    /// Keep "BTech Percentage" and drop "BTech CGPA"; false keeps the CGPA
    /// column instead.
    pub keep_percentage: bool,
    pub sheet_name: String,
    pub column_order: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cutoff_10th: 70.0,
            cutoff_12th: 70.0,
            cutoff_btech_cgpa: 6.0,
            cutoff_live_kt: 0.0,
            cutoff_drop: 0.0,
            cutoff_gap: 2.0,
            keep_percentage: true,
            sheet_name: "RAIT".to_string(),
            column_order: default_column_order(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=100.0).contains(&self.cutoff_10th) {
            bail!("cutoff_10th must be between 0 and 100, got {}", self.cutoff_10th);
        }
        if !(0.0..=100.0).contains(&self.cutoff_12th) {
            bail!("cutoff_12th must be between 0 and 100, got {}", self.cutoff_12th);
        }
        if !(0.0..=10.0).contains(&self.cutoff_btech_cgpa) {
            bail!(
                "cutoff_btech_cgpa must be between 0 and 10, got {}",
                self.cutoff_btech_cgpa
            );
        }
        if !(0.0..=10.0).contains(&self.cutoff_live_kt) {
            bail!("cutoff_live_kt must be between 0 and 10, got {}", self.cutoff_live_kt);
        }
        if !(0.0..=10.0).contains(&self.cutoff_drop) {
            bail!("cutoff_drop must be between 0 and 10, got {}", self.cutoff_drop);
        }
        if !(0.0..=10.0).contains(&self.cutoff_gap) {
            bail!("cutoff_gap must be between 0 and 10, got {}", self.cutoff_gap);
        }
        // Excel caps sheet names at 31 characters.
        if self.sheet_name.is_empty() || self.sheet_name.chars().count() > 31 {
            bail!(
                "sheet_name must be 1 to 31 characters, got {:?}",
                self.sheet_name
            );
        }
        Ok(())
    }

    /// Name of the degree-metric column kept in the output.
    pub fn kept_metric(&self) -> &'static str {
        if self.keep_percentage {
            COL_BTECH_PERCENTAGE
        } else {
            COL_BTECH_CGPA
        }
    }
}

/// One spreadsheet cell as the pipeline sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Display text of the cell. Whole numbers render without a trailing
    /// ".0" so year and count columns compare like their typed-in form.
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
        }
    }

    /// Numeric view of the cell; text values parse with comma-decimal
    /// tolerance ("67,5" reads as 67.5).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            Cell::Empty => None,
        }
    }
}

/// An in-memory sheet: named columns and positionally aligned rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> anyhow::Result<usize> {
        self.column_index(name)
            .ok_or_else(|| anyhow::anyhow!("missing required column '{}'", name))
    }

    /// Remove a column by name from the header and every row. Returns false
    /// when the column is absent.
    pub fn drop_column(&mut self, name: &str) -> bool {
        match self.column_index(name) {
            Some(idx) => {
                self.columns.remove(idx);
                for row in &mut self.rows {
                    row.remove(idx);
                }
                true
            }
            None => false,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

/// Normalize an identifier by removing all whitespace
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn default_config_is_valid() -> Result<()> {
        let config = Config::default();
        config.validate()?;
        assert_eq!(config.cutoff_10th, 70.0);
        assert_eq!(config.cutoff_gap, 2.0);
        assert!(config.keep_percentage);
        assert_eq!(config.sheet_name, "RAIT");
        Ok(())
    }

    #[test]
    fn config_round_trips_through_toml() -> Result<()> {
        let mut config = Config::default();
        config.cutoff_btech_cgpa = 7.5;
        config.keep_percentage = false;
        let text = toml::to_string_pretty(&config)?;
        let loaded: Config = toml::from_str(&text)?;
        assert_eq!(loaded.cutoff_btech_cgpa, 7.5);
        assert!(!loaded.keep_percentage);
        assert_eq!(loaded.column_order, config.column_order);
        Ok(())
    }

    #[test]
    fn validate_rejects_out_of_range_cutoffs() {
        let mut config = Config::default();
        config.cutoff_10th = 120.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cutoff_live_kt = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sheet_name = "x".repeat(32);
        assert!(config.validate().is_err());
    }

    #[test]
    fn kept_metric_follows_the_flag() {
        let mut config = Config::default();
        assert_eq!(config.kept_metric(), "BTech Percentage");
        config.keep_percentage = false;
        assert_eq!(config.kept_metric(), "BTech CGPA");
    }

    #[test]
    fn normalize_identifier_strips_all_whitespace() {
        assert_eq!(normalize_identifier(" John  Doe "), "JohnDoe");
        assert_eq!(normalize_identifier("J0123"), "J0123");
        assert_eq!(normalize_identifier("J\t01 23"), "J0123");
        assert_eq!(normalize_identifier(""), "");
    }

    #[test]
    fn cell_renders_whole_numbers_without_decimals() {
        assert_eq!(Cell::Number(2019.0).render(), "2019");
        assert_eq!(Cell::Number(67.5).render(), "67.5");
        assert_eq!(Cell::Text("hi".into()).render(), "hi");
        assert_eq!(Cell::Empty.render(), "");
    }

    #[test]
    fn cell_parses_comma_decimals() {
        assert_eq!(Cell::Text("67,5".into()).as_number(), Some(67.5));
        assert_eq!(Cell::Text(" 70 ".into()).as_number(), Some(70.0));
        assert_eq!(Cell::Text("n/a".into()).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn drop_column_removes_header_and_cells() {
        let mut table = Table::new(vec!["A".into(), "B".into()]);
        table.push_row(vec![Cell::Number(1.0), Cell::Number(2.0)]);
        assert!(table.drop_column("A"));
        assert_eq!(table.columns, vec!["B".to_string()]);
        assert_eq!(table.rows[0], vec![Cell::Number(2.0)]);
        assert!(!table.drop_column("A"));
    }

    #[test]
    fn require_column_names_the_missing_field() {
        let table = Table::new(vec!["A".into()]);
        let err = table.require_column("Resume").unwrap_err();
        assert!(err.to_string().contains("missing required column 'Resume'"));
    }
}
