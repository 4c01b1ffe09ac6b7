use std::fmt::Write as _;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use foreflow_parser::round2;
use polars::prelude::*;

use super::transform::records_to_frame;
use super::BillingRecord;
use crate::config::BillingConfig;
use crate::error::{PipelineError, Result};

/// A client is flagged once its remaining budget covers fewer months than this.
pub const LOW_BUDGET_MONTHS: f64 = 2.0;

const HOURS: &str = "Billable Hours";
const AMOUNT: &str = "Amount";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSummary {
    pub client: String,
    pub hours: f64,
    pub rate: f64,
    pub amount: f64,
    /// Configured remaining budget minus this period's amount.
    pub remaining: f64,
    /// `None` when nothing was billed this period.
    pub months_left: Option<f64>,
}

impl ClientSummary {
    pub fn is_low_budget(&self) -> bool {
        self.months_left
            .is_some_and(|months| months < LOW_BUDGET_MONTHS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameSummary {
    pub name: String,
    pub hours: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientMonthSummary {
    pub client: String,
    pub month: String,
    pub hours: f64,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct BillingSummary {
    pub clients: Vec<ClientSummary>,
    pub names: Vec<NameSummary>,
    pub client_months: Vec<ClientMonthSummary>,
    pub total_hours: f64,
    pub total_amount: f64,
    /// First day of the earliest month in the data.
    pub period_start: NaiveDate,
    /// Last day of the latest month in the data.
    pub period_end: NaiveDate,
    /// Earliest and latest record dates.
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub records: Vec<BillingRecord>,
}

impl BillingSummary {
    pub fn low_budget_clients(&self) -> impl Iterator<Item = &ClientSummary> {
        self.clients.iter().filter(|client| client.is_low_budget())
    }
}

struct GroupTotal {
    keys: Vec<String>,
    hours: f64,
    amount: f64,
}

fn group_totals(df: &DataFrame, keys: &[&str]) -> Result<Vec<GroupTotal>> {
    let grouped = df
        .clone()
        .lazy()
        .group_by(keys.iter().map(|key| col(*key)).collect::<Vec<_>>())
        .agg([col(HOURS).sum(), col(AMOUNT).sum()])
        .collect()?;

    let key_columns = keys
        .iter()
        .map(|key| grouped.column(key).and_then(|c| c.str().cloned()))
        .collect::<PolarsResult<Vec<StringChunked>>>()?;
    let hours = grouped.column(HOURS)?.f64()?;
    let amounts = grouped.column(AMOUNT)?.f64()?;

    let mut totals: Vec<GroupTotal> = (0..grouped.height())
        .map(|idx| GroupTotal {
            keys: key_columns
                .iter()
                .map(|column| column.get(idx).unwrap_or_default().to_string())
                .collect(),
            hours: round2(hours.get(idx).unwrap_or_default()),
            amount: round2(amounts.get(idx).unwrap_or_default()),
        })
        .collect();
    totals.sort_by(|a, b| a.keys.cmp(&b.keys));
    Ok(totals)
}

fn month_bounds(earliest: NaiveDate, latest: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || PipelineError::Validation("billing dates out of range".to_string());
    let start = earliest.with_day(1).ok_or_else(invalid)?;
    let end = latest
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((start, end))
}

/// Aggregate rated records per client, per team member, and per client-month.
pub fn summarize(records: &[BillingRecord], config: &BillingConfig) -> Result<BillingSummary> {
    let earliest = records.iter().map(|r| r.date).min();
    let latest = records.iter().map(|r| r.date).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return Err(PipelineError::Validation(
            "no billing records to summarize".to_string(),
        ));
    };
    let (period_start, period_end) = month_bounds(earliest, latest)?;

    let df = records_to_frame(records)?;

    let clients = group_totals(&df, &["Client"])?
        .into_iter()
        .map(|total| {
            let client = total.keys.into_iter().next().unwrap_or_default();
            let rate = config.billing_rates.get(&client).copied().unwrap_or(0.0);
            let budget = config.remaining_budget.get(&client).copied().unwrap_or(0.0);
            let remaining = budget - total.amount;
            let months_left = (total.amount > 0.0).then(|| remaining / total.amount);
            ClientSummary {
                client,
                hours: total.hours,
                rate,
                amount: total.amount,
                remaining,
                months_left,
            }
        })
        .collect();

    let names = group_totals(&df, &["Name"])?
        .into_iter()
        .map(|total| NameSummary {
            name: total.keys.into_iter().next().unwrap_or_default(),
            hours: total.hours,
            amount: total.amount,
        })
        .collect();

    let client_months = group_totals(&df, &["Client", "Month-Year"])?
        .into_iter()
        .map(|total| {
            let mut keys = total.keys.into_iter();
            ClientMonthSummary {
                client: keys.next().unwrap_or_default(),
                month: keys.next().unwrap_or_default(),
                hours: total.hours,
                amount: total.amount,
            }
        })
        .collect();

    let mut detail = records.to_vec();
    detail.sort_by(|a, b| (a.date, &a.client, &a.name).cmp(&(b.date, &b.client, &b.name)));

    Ok(BillingSummary {
        clients,
        names,
        client_months,
        total_hours: records.iter().map(|r| r.billable_hours).sum(),
        total_amount: records.iter().map(|r| r.amount).sum(),
        period_start,
        period_end,
        first_date: earliest,
        last_date: latest,
        records: detail,
    })
}

/// Render the Markdown billing summary.
pub fn render_markdown(summary: &BillingSummary, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        out,
        "# Billing Summary Report\n\n\
         **Report Period:** {} to {}\n\
         **Generated:** {}\n\n\
         ---\n\n\
         ## Summary by Client\n\n\
         | Client | Billable Hours | Rate | Amount | Remaining Budget | Months Left |\n\
         |--------|----------------|------|--------|------------------|-------------|\n",
        summary.period_start.format("%Y-%m-%d"),
        summary.period_end.format("%Y-%m-%d"),
        generated_at.format("%Y-%m-%d %H:%M"),
    );

    for client in &summary.clients {
        let months = match client.months_left {
            Some(months) if client.is_low_budget() => format!("{months:.1} ⚠️"),
            Some(months) => format!("{months:.1}"),
            None => "N/A".to_string(),
        };
        let _ = writeln!(
            out,
            "| {} | {:.2} | ${:.2} | ${:.2} | ${:.2} | {} |",
            client.client, client.hours, client.rate, client.amount, client.remaining, months
        );
    }

    let _ = write!(
        out,
        "\n**Grand Total:** {:.2} hours = ${:.2}\n\n",
        summary.total_hours, summary.total_amount
    );

    let mut alerts = summary.low_budget_clients().peekable();
    if alerts.peek().is_some() {
        out.push_str("### ⚠️ Budget Alerts\n\n");
        for client in alerts {
            let _ = writeln!(
                out,
                "- **{}**: Only {:.1} months of budget remaining (${:.2})",
                client.client,
                client.months_left.unwrap_or_default(),
                client.remaining
            );
        }
        out.push('\n');
    }

    out.push_str(
        "---\n\n\
         ## Summary by Team Member\n\n\
         | Name | Billable Hours | Amount |\n\
         |------|----------------|--------|\n",
    );
    for name in &summary.names {
        let _ = writeln!(out, "| {} | {:.2} | ${:.2} |", name.name, name.hours, name.amount);
    }

    out.push_str(
        "\n---\n\n\
         ## Summary by Client and Month\n\n\
         | Client | Month | Billable Hours | Amount |\n\
         |--------|-------|----------------|--------|\n",
    );
    for row in &summary.client_months {
        let _ = writeln!(
            out,
            "| {} | {} | {:.2} | ${:.2} |",
            row.client, row.month, row.hours, row.amount
        );
    }

    out.push_str(
        "\n---\n\n\
         ## Detailed Billing Log\n\n\
         | Date | Client | Name | Hours | Rate | Amount | Task |\n\
         |------|--------|------|-------|------|--------|------|\n",
    );
    for record in &summary.records {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} | ${:.2} | ${:.2} | {} |",
            record.date.format("%Y-%m-%d"),
            record.client,
            record.name,
            record.billable_hours,
            record.rate,
            record.amount,
            record.task.as_deref().unwrap_or_default()
        );
    }

    out
}
