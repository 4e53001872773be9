//! CSV export of repayment schedules ("Download schedule" on the loan page).

use std::io;

use thiserror::Error;

use crate::RepaymentSchedule;

const HEADER: [&str; 6] = [
    "Installment",
    "Due Date",
    "Principal",
    "Interest",
    "Payment",
    "Remaining Balance",
];

#[derive(Debug, Error)]
pub enum ScheduleExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Write the schedule as CSV: one header row, one row per installment.
///
/// Dates are ISO-8601 and amounts are plain decimals with two fraction
/// digits, so spreadsheets parse them without locale surprises.
pub fn write_schedule_csv<W: io::Write>(
    schedule: &RepaymentSchedule,
    writer: W,
) -> Result<(), ScheduleExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for installment in &schedule.installments {
        wtr.write_record([
            installment.number.to_string(),
            installment.due_date.format("%Y-%m-%d").to_string(),
            installment.principal.to_decimal_string(),
            installment.interest.to_decimal_string(),
            installment.payment.to_decimal_string(),
            installment.remaining_balance.to_decimal_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// The schedule as an in-memory CSV document.
pub fn export_schedule_csv(schedule: &RepaymentSchedule) -> Result<String, ScheduleExportError> {
    let mut buf = Vec::new();
    write_schedule_csv(schedule, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// `repayment-schedule-<slug>.csv`, where the slug keeps ASCII alphanumerics
/// (lowercased) and collapses everything else into single dashes.
pub fn schedule_csv_filename(reference: &str) -> String {
    let mut slug = String::with_capacity(reference.len());
    for c in reference.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "repayment-schedule.csv".to_string()
    } else {
        format!("repayment-schedule-{slug}.csv")
    }
}

impl RepaymentSchedule {
    /// Download name for this schedule, keyed by loan id.
    pub fn csv_filename(&self) -> String {
        schedule_csv_filename(&self.loan_id.to_string())
    }
}
