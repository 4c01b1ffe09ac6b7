#![allow(dead_code)]

use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

pub const HEADERS: [&str; 10] = [
    "File Number",
    "Payroll Name",
    "Hire Date",
    "Rehire Date",
    "Position Status",
    "Home Department Code",
    "Home Department Description",
    "Clock Full Code",
    "Associate ID",
    "Regular Hours Total",
];

pub struct Row {
    pub file_number: &'static str,
    pub hire_date: &'static str,
    pub rehire_date: &'static str,
    pub status: &'static str,
    pub department: f64,
    pub client_code: &'static str,
    pub adp_id: &'static str,
}

fn row(
    file_number: &'static str,
    hire_date: &'static str,
    rehire_date: &'static str,
    status: &'static str,
    department: f64,
    client_code: &'static str,
    adp_id: &'static str,
) -> Row {
    Row {
        file_number,
        hire_date,
        rehire_date,
        status,
        department,
        client_code,
        adp_id,
    }
}

/// Week of 2025-07-21: departments 4521 → 2 active, 9900 → 1 active,
/// 7788 → none.
pub fn tenure_rows() -> Vec<Row> {
    vec![
        row("000101", "2021-03-01", "", "Active", 4521.0, "02200", "A1"),
        row("000102", "05/02/2022", "", "Active", 4521.0, "02200", "A2"),
        // excluded client
        row("000103", "2020-01-06", "", "Active", 4521.0, "01100", "A3"),
        // hired on the snapshot date itself
        row("000104", "2025-07-21", "", "Active", 7788.0, "03300", "A4"),
        row("000105", "2019-02-04", "", "Terminated", 7788.0, "03300", "A5"),
        // rehired after the snapshot date
        row("000106", "2019-01-01", "2025-08-01", "Active", 9900.0, "03300", "A6"),
        row("000107", "2018-01-01", "", "Active", 9900.0, "03300", "A7"),
        // same associate twice
        row("000108", "2018-01-01", "", "Active", 9900.0, "03300", "A7"),
    ]
}

pub fn write_tenure_workbook(path: &Path, rows: &[Row]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_string(r, 0, row.file_number)?;
        sheet.write_string(r, 1, format!("Associate {}", row.adp_id))?;
        sheet.write_string(r, 2, row.hire_date)?;
        if !row.rehire_date.is_empty() {
            sheet.write_string(r, 3, row.rehire_date)?;
        }
        sheet.write_string(r, 4, row.status)?;
        sheet.write_number(r, 5, row.department)?;
        sheet.write_string(r, 6, format!("Dept {}", row.department))?;
        sheet.write_string(r, 7, row.client_code)?;
        sheet.write_string(r, 8, row.adp_id)?;
        sheet.write_number(r, 9, 40.0)?;
    }
    workbook.save(path)
}

pub fn write_incomplete_workbook(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "File Number")?;
    sheet.write_string(0, 1, "Payroll Name")?;
    sheet.write_string(1, 0, "000101")?;
    sheet.write_string(1, 1, "Doe, Jane")?;
    workbook.save(path)
}
