use polars::prelude::*;

/// Build an all-text frame from a header row and row-major cells.
///
/// Short rows are padded with nulls; cells past the header width are dropped.
pub fn text_frame(headers: &[String], rows: &[Vec<Option<String>>]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let values: Vec<Option<&str>> = rows
            .iter()
            .map(|row| row.get(idx).and_then(|cell| cell.as_deref()))
            .collect();
        columns.push(Series::new(header.as_str().into(), values).into());
    }
    DataFrame::new(columns)
}

/// Names from `required` that are not columns of `df`, in `required` order.
pub fn missing_columns<S: AsRef<str>>(df: &DataFrame, required: &[S]) -> Vec<String> {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| df.column(name).is_err())
        .map(str::to_string)
        .collect()
}

/// Rename repeated headers the way spreadsheet exports are usually disambiguated:
/// the second `Name` becomes `Name.1`, the third `Name.2`, and so on.
pub(crate) fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    for header in raw {
        let mut candidate = header.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{header}.{suffix}");
            suffix += 1;
        }
        seen.push(candidate);
    }
    seen
}
