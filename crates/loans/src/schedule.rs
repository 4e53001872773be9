//! Loan terms and the monthly repayment schedule derived from them.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use stockloan_core::{DomainError, DomainResult, LoanId, Money};

/// Longest term accepted (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// 100% annual rate, in basis points.
pub const MAX_RATE_BPS: u32 = 10_000;

/// Largest principal accepted, in cents (one trillion currency units).
///
/// Interest over the longest term at the highest rate stays below 50x the
/// principal, so every installment and total fits in `i64` and is exact in
/// `f64`.
pub const MAX_PRINCIPAL_CENTS: i64 = 100_000_000_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentStructure {
    /// Level monthly installments covering interest and principal.
    #[default]
    Amortizing,
    /// Interest monthly, principal in full with the final installment.
    InterestOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate in basis points (`450` = 4.50%).
    pub annual_rate_bps: u32,
    pub term_months: u32,
    pub first_due_date: NaiveDate,
    #[serde(default)]
    pub structure: RepaymentStructure,
}

impl LoanTerms {
    pub fn validate(&self) -> DomainResult<()> {
        if !self.principal.is_positive() {
            return Err(DomainError::validation("principal must be positive"));
        }
        if self.principal.cents() > MAX_PRINCIPAL_CENTS {
            return Err(DomainError::validation(format!(
                "principal cannot exceed {}",
                Money::from_cents(MAX_PRINCIPAL_CENTS)
            )));
        }
        if !(1..=MAX_TERM_MONTHS).contains(&self.term_months) {
            return Err(DomainError::validation(format!(
                "term must be between 1 and {MAX_TERM_MONTHS} months"
            )));
        }
        if self.annual_rate_bps > MAX_RATE_BPS {
            return Err(DomainError::validation("annual rate cannot exceed 100%"));
        }
        Ok(())
    }

    fn monthly_rate(&self) -> f64 {
        self.annual_rate_bps as f64 / 10_000.0 / 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentInstallment {
    /// 1-based.
    pub number: u32,
    pub due_date: NaiveDate,
    pub principal: Money,
    pub interest: Money,
    pub payment: Money,
    /// Outstanding principal after this installment.
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub loan_id: LoanId,
    pub terms: LoanTerms,
    pub installments: Vec<RepaymentInstallment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub installment_count: usize,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl RepaymentSchedule {
    /// Totals across all installments.
    ///
    /// Fields are public, so a hand-assembled schedule can hold amounts whose
    /// sum overflows; that is reported rather than wrapped.
    pub fn summary(&self) -> DomainResult<ScheduleSummary> {
        let total = |field: fn(&RepaymentInstallment) -> Money| {
            Money::checked_sum(self.installments.iter().map(field)).ok_or_else(overflow)
        };

        Ok(ScheduleSummary {
            installment_count: self.installments.len(),
            total_principal: total(|i| i.principal)?,
            total_interest: total(|i| i.interest)?,
            total_payment: total(|i| i.payment)?,
        })
    }
}

/// Build the monthly schedule for `terms`.
///
/// Installment `k` falls due `k - 1` months after `first_due_date`, clamped to
/// the end of shorter months. Interest accrues on the outstanding balance at
/// `annual_rate / 12` and is rounded to the cent per installment; the final
/// installment clears whatever principal remains.
pub fn build_schedule(loan_id: LoanId, terms: LoanTerms) -> DomainResult<RepaymentSchedule> {
    terms.validate()?;

    let rate = terms.monthly_rate();
    let level_payment = level_payment(terms.principal.cents(), rate, terms.term_months);

    let mut balance = terms.principal.cents();
    let mut installments = Vec::with_capacity(terms.term_months as usize);

    for number in 1..=terms.term_months {
        let due_date = terms
            .first_due_date
            .checked_add_months(Months::new(number - 1))
            .ok_or_else(|| DomainError::validation("schedule runs past the supported date range"))?;

        let interest = round_cents(balance as f64 * rate);
        let principal = if number == terms.term_months {
            balance
        } else {
            match terms.structure {
                RepaymentStructure::Amortizing => (level_payment - interest).clamp(0, balance),
                RepaymentStructure::InterestOnly => 0,
            }
        };
        balance -= principal;

        let principal = Money::from_cents(principal);
        let interest = Money::from_cents(interest);
        installments.push(RepaymentInstallment {
            number,
            due_date,
            principal,
            interest,
            payment: principal.checked_add(interest).ok_or_else(overflow)?,
            remaining_balance: Money::from_cents(balance),
        });
    }

    tracing::debug!(
        %loan_id,
        installments = installments.len(),
        structure = ?terms.structure,
        "repayment schedule built"
    );

    Ok(RepaymentSchedule {
        loan_id,
        terms,
        installments,
    })
}

/// Standard annuity payment, rounded to the cent.
fn level_payment(principal: i64, monthly_rate: f64, months: u32) -> i64 {
    let principal = principal as f64;
    let n = months as f64;
    if monthly_rate == 0.0 {
        return round_cents(principal / n);
    }
    round_cents(principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-n)))
}

fn round_cents(value: f64) -> i64 {
    value.round() as i64
}

fn overflow() -> DomainError {
    DomainError::validation("amount out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(principal: i64, rate_bps: u32, months: u32) -> LoanTerms {
        LoanTerms {
            principal: Money::from_cents(principal),
            annual_rate_bps: rate_bps,
            term_months: months,
            first_due_date: date(2026, 1, 31),
            structure: RepaymentStructure::Amortizing,
        }
    }

    #[test]
    fn amortizing_schedule_matches_annuity_formula() {
        // 12,000.00 at 6% over 12 months: payment 1,032.80
        let schedule = build_schedule(LoanId::new(), terms(1_200_000, 600, 12)).unwrap();
        assert_eq!(schedule.installments.len(), 12);

        let first = &schedule.installments[0];
        assert_eq!(first.interest, Money::from_cents(6_000));
        assert_eq!(first.payment, Money::from_cents(103_280));
        assert_eq!(first.principal, Money::from_cents(97_280));
        assert_eq!(first.remaining_balance, Money::from_cents(1_102_720));

        let last = schedule.installments.last().unwrap();
        assert_eq!(last.remaining_balance, Money::ZERO);

        let summary = schedule.summary().unwrap();
        assert_eq!(summary.total_principal, Money::from_cents(1_200_000));
        assert_eq!(
            Some(summary.total_payment),
            summary.total_principal.checked_add(summary.total_interest)
        );
    }

    #[test]
    fn zero_rate_splits_principal_evenly() {
        let schedule = build_schedule(LoanId::new(), terms(10_000, 0, 3)).unwrap();
        let principal: Vec<i64> = schedule.installments.iter().map(|i| i.principal.cents()).collect();
        assert_eq!(principal, vec![3_333, 3_333, 3_334]);
        assert!(schedule.installments.iter().all(|i| i.interest == Money::ZERO));
    }

    #[test]
    fn interest_only_pays_principal_at_maturity() {
        let mut t = terms(500_000, 1_200, 4);
        t.structure = RepaymentStructure::InterestOnly;
        let schedule = build_schedule(LoanId::new(), t).unwrap();

        for installment in &schedule.installments[..3] {
            assert_eq!(installment.principal, Money::ZERO);
            assert_eq!(installment.interest, Money::from_cents(5_000));
            assert_eq!(installment.remaining_balance, Money::from_cents(500_000));
        }
        let last = &schedule.installments[3];
        assert_eq!(last.principal, Money::from_cents(500_000));
        assert_eq!(last.payment, Money::from_cents(505_000));
        assert_eq!(last.remaining_balance, Money::ZERO);
    }

    #[test]
    fn due_dates_clamp_to_month_end() {
        let schedule = build_schedule(LoanId::new(), terms(300_000, 500, 3)).unwrap();
        let dates: Vec<NaiveDate> = schedule.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(dates, vec![date(2026, 1, 31), date(2026, 2, 28), date(2026, 3, 31)]);
    }

    #[test]
    fn invalid_terms_are_rejected() {
        let cases = [terms(0, 500, 12), terms(1_000, 500, 0), terms(1_000, 500, 601), terms(1_000, 10_001, 12)];
        for t in cases {
            let err = build_schedule(LoanId::new(), t).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "unexpected: {err:?}");
        }
    }

    #[test]
    fn principal_above_cap_is_rejected_instead_of_overflowing() {
        for principal in [i64::MAX, MAX_PRINCIPAL_CENTS + 1] {
            let err = build_schedule(LoanId::new(), terms(principal, 1_200, 1)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "unexpected: {err:?}");
        }
    }

    #[test]
    fn largest_principal_at_highest_rate_and_term_builds() {
        let mut t = terms(MAX_PRINCIPAL_CENTS, MAX_RATE_BPS, MAX_TERM_MONTHS);
        t.structure = RepaymentStructure::InterestOnly;
        let schedule = build_schedule(LoanId::new(), t).unwrap();
        let summary = schedule.summary().unwrap();
        assert_eq!(summary.total_principal, Money::from_cents(MAX_PRINCIPAL_CENTS));
        assert_eq!(summary.installment_count, MAX_TERM_MONTHS as usize);
    }

    #[test]
    fn summary_reports_overflow_of_hand_built_schedules() {
        let mut schedule = build_schedule(LoanId::new(), terms(10_000, 0, 2)).unwrap();
        for installment in &mut schedule.installments {
            installment.payment = Money::from_cents(i64::MAX);
        }
        assert!(matches!(schedule.summary(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn structure_defaults_to_amortizing_when_omitted() {
        let t: LoanTerms = serde_json::from_str(
            r#"{"principal":100000,"annual_rate_bps":450,"term_months":24,"first_due_date":"2026-03-15"}"#,
        )
        .unwrap();
        assert_eq!(t.structure, RepaymentStructure::Amortizing);
        assert_eq!(t.principal, Money::from_cents(100_000));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: principal portions repay exactly the loan, no portion is
        /// negative, and every payment is principal plus interest.
        #[test]
        fn principal_portions_sum_to_loan(
            principal in 1i64..1_000_000_000i64,
            rate_bps in 0u32..=3_000u32,
            months in 1u32..=360u32,
            interest_only in any::<bool>(),
        ) {
            let mut t = terms(principal, rate_bps, months);
            if interest_only {
                t.structure = RepaymentStructure::InterestOnly;
            }
            let schedule = build_schedule(LoanId::new(), t).unwrap();

            prop_assert_eq!(schedule.installments.len(), months as usize);
            prop_assert_eq!(schedule.summary().unwrap().total_principal, Money::from_cents(principal));
            prop_assert_eq!(schedule.installments.last().unwrap().remaining_balance, Money::ZERO);

            for i in &schedule.installments {
                prop_assert!(i.principal.cents() >= 0);
                prop_assert!(i.interest.cents() >= 0);
                prop_assert_eq!(Some(i.payment), i.principal.checked_add(i.interest));
            }
        }
    }
}
