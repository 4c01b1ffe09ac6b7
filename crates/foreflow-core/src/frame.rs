use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::Result;

/// Values of any column rendered as text, nulls preserved.
pub(crate) fn text_values(column: &Column) -> Result<Vec<Option<String>>> {
    let as_text = if column.dtype() == &DataType::String {
        column.clone()
    } else {
        column.cast(&DataType::String)?
    };
    Ok(as_text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    text_values(df.column(name)?)
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// A polars `Date` column built from calendar dates.
pub(crate) fn date_column(name: &str, dates: &[Option<NaiveDate>]) -> Result<Column> {
    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|date| date.map(|date| (date - epoch()).num_days() as i32))
        .collect();
    Ok(Column::new(name.into(), days).cast(&DataType::Date)?)
}
