//! `stockloan-loans` — repayment schedules for stock-option loans.

pub mod export;
pub mod schedule;

pub use export::{ScheduleExportError, export_schedule_csv, schedule_csv_filename, write_schedule_csv};
pub use schedule::{
    LoanTerms, RepaymentInstallment, RepaymentSchedule, RepaymentStructure, ScheduleSummary,
    build_schedule,
};
