/// Canonical column names of the placement form export, used to keep the
/// pipeline and the sheets consistent.
pub const COL_FULL_NAME: &str = "Full Name";
pub const COL_NAME: &str = "Name";
pub const COL_SERIAL: &str = "Sr No";
pub const COL_10TH_PERCENTAGE: &str = "10th Percentage";
pub const COL_10TH_YEAR: &str = "10th Year of Passing";
pub const COL_12TH_PERCENTAGE: &str = "12th/ Diploma Percentage";
pub const COL_12TH_YEAR: &str = "12th/ Diploma Year of Passing";
pub const COL_BTECH_CGPA: &str = "BTech CGPA";
pub const COL_BTECH_PERCENTAGE: &str = "BTech Percentage";
pub const COL_LIVE_KT: &str = "Live KT";
pub const COL_DROP: &str = "Drop";
pub const COL_GAP: &str = "Gap";
pub const COL_RESUME: &str = "Resume";

/// Columns the pipeline reads; all of them must be present in the input
/// sheet, checked up front before any stage runs.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    COL_FULL_NAME,
    COL_10TH_PERCENTAGE,
    COL_10TH_YEAR,
    COL_12TH_PERCENTAGE,
    COL_12TH_YEAR,
    COL_BTECH_CGPA,
    COL_BTECH_PERCENTAGE,
    COL_LIVE_KT,
    COL_DROP,
    COL_GAP,
    COL_RESUME,
];

/// Administrative and contact columns removed from the cleaned sheet.
/// Entries missing from a given sheet are skipped silently.
pub const DROPPED_COLUMNS: [&str; 13] = [
    "Timestamp",
    "Email address",
    "College Roll No",
    "Job Role",
    "Minor Course",
    COL_LIVE_KT,
    "Dead KT",
    COL_DROP,
    COL_GAP,
    "Are you placed?",
    "Company Name 1",
    "Company Name 2",
    "Statement of Acknowledgement",
];

/// Default preference order for the cleaned sheet's columns. Matched columns
/// come first in this order; anything else keeps its original position after
/// them.
pub fn default_column_order() -> Vec<String> {
    [
        COL_FULL_NAME,
        "Personal Email ID",
        "CollegeRollNo",
        "Contact No",
        "Gender",
        "Branch",
        "BTech Major Course",
        "College Name",
        COL_10TH_PERCENTAGE,
        COL_10TH_YEAR,
        COL_12TH_PERCENTAGE,
        COL_12TH_YEAR,
        "Degree",
        COL_BTECH_CGPA,
        COL_BTECH_PERCENTAGE,
        "Batch",
        COL_RESUME,
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}
