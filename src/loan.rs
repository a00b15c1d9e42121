use crate::error::{LendingError, Result};
use chrono::{Days, Months, NaiveDate};
use log::{debug, trace, warn};
use std::{fmt, str::FromStr};

/// How often installments fall due.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Due date of the installment `steps` periods after `first`.
    ///
    /// Monthly steps are always taken from `first`, so a loan first due on the
    /// 31st is due on the last day of shorter months and back on the 31st after.
    pub fn due_date(&self, first: &NaiveDate, steps: u32) -> Result<NaiveDate> {
        let due = match self {
            Frequency::Daily => first.checked_add_days(Days::new(u64::from(steps))),
            Frequency::Weekly => first.checked_add_days(Days::new(7 * u64::from(steps))),
            Frequency::Monthly => first.checked_add_months(Months::new(steps)),
        };
        due.ok_or(LendingError::DateOutOfRange(*first))
    }

    /// Due date one period after `date`.
    pub fn next_due_date(&self, date: &NaiveDate) -> Result<NaiveDate> {
        self.due_date(date, 1)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Frequency {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            _ => {
                warn!("rejected frequency {:?}", s);
                Err(LendingError::InvalidInput(format!(
                    "unknown frequency {:?}",
                    s
                )))
            }
        }
    }
}

/// Cost preview of a loan. Never stored; recompute it from the terms.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmortizationResult {
    pub total_interest: f64,
    pub total_amount: f64,
    pub installment_value: f64,
}

impl fmt::Display for AmortizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interest ${:.2}, total ${:.2}, installment ${:.2}",
            self.total_interest, self.total_amount, self.installment_value
        )
    }
}

/// One scheduled repayment.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Installment {
    pub number: i32,
    pub due_date: NaiveDate,
    pub amount: f64,
}

impl Installment {
    pub fn new(number: i32, due_date: NaiveDate, amount: f64) -> Self {
        Self {
            number,
            due_date,
            amount,
        }
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "installment {}, due {}, amount ${:.2}",
            self.number, self.due_date, self.amount
        )
    }
}

/// Terms fixed when a loan is issued. Only built through [`LoanTerms::new`] or
/// [`LoanTerms::from_form`], so every value held here has already been validated.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoanTerms {
    principal: f64,
    interest_rate: f64,
    installment_count: i32,
    frequency: Frequency,
}

impl LoanTerms {
    pub fn new(
        principal: f64,
        interest_rate: f64,
        installment_count: i32,
        frequency: Frequency,
    ) -> Result<Self> {
        check_amount("principal", principal)?;
        check_amount("interest rate", interest_rate)?;
        check_count(installment_count)?;
        check_result(amortize(principal, interest_rate, installment_count))?;
        Ok(Self {
            principal,
            interest_rate,
            installment_count,
            frequency,
        })
    }

    /// Builds terms from the raw text of the origination form.
    pub fn from_form(
        principal: &str,
        interest_rate: &str,
        installment_count: &str,
        frequency: &str,
    ) -> Result<Self> {
        let principal = parse_field::<f64>("principal", principal)?;
        let interest_rate = parse_field::<f64>("interest rate", interest_rate)?;
        let installment_count = parse_field::<i32>("installment count", installment_count)?;
        let frequency = frequency.parse::<Frequency>()?;
        Self::new(principal, interest_rate, installment_count, frequency)
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn installment_count(&self) -> i32 {
        self.installment_count
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn amortization(&self) -> AmortizationResult {
        amortize(self.principal, self.interest_rate, self.installment_count)
    }

    /// Lays out every installment starting at `first_due_date`.
    ///
    /// The rounded total is split in whole cents. Rows differ by at most one
    /// cent, the leftover cents going to the earliest rows, and together they
    /// sum to the rounded total.
    pub fn schedule(&self, first_due_date: NaiveDate) -> Result<Vec<Installment>> {
        let count = i64::from(self.installment_count);
        // fail on the calendar before building any rows
        self.frequency
            .due_date(&first_due_date, (self.installment_count - 1) as u32)?;

        let total = self.amortization().total_amount;
        let total_cents = (total * 100.).round();
        if total_cents >= i64::MAX as f64 {
            warn!("total {} too large to schedule", total);
            return Err(LendingError::InvalidInput(format!(
                "total {} is too large to split into cents",
                total
            )));
        }
        let total_cents = total_cents as i64;
        let base_cents = total_cents / count;
        let extra_cents = total_cents % count;

        let mut rows = Vec::new();
        for number in 1..=self.installment_count {
            let due_date = self
                .frequency
                .due_date(&first_due_date, (number - 1) as u32)?;
            let cents = if i64::from(number) <= extra_cents {
                base_cents + 1
            } else {
                base_cents
            };
            let pmt = cents as f64 / 100.;
            trace!("installment # {}, due {}, amount {}", number, due_date, pmt);
            rows.push(Installment::new(number, due_date, pmt));
        }
        Ok(rows)
    }
}

/// Cost preview for `installment_count` equal installments on `principal`
/// lent at a flat `rate_percent`.
pub fn compute(
    principal: f64,
    rate_percent: f64,
    installment_count: i32,
) -> Result<AmortizationResult> {
    check_amount("principal", principal)?;
    check_amount("interest rate", rate_percent)?;
    check_count(installment_count)?;
    check_result(amortize(principal, rate_percent, installment_count))
}

pub fn round_currency(amount: f64) -> f64 {
    round(amount, 2.)
}

// inputs are validated by the caller
fn amortize(principal: f64, rate_percent: f64, installment_count: i32) -> AmortizationResult {
    let total_interest = principal * (rate_percent / 100.);
    let total_amount = principal + total_interest;
    let installment_value = total_amount / f64::from(installment_count);
    debug!(
        "principal {} at {}% over {}: interest {}, total {}, installment {}",
        principal, rate_percent, installment_count, total_interest, total_amount, installment_value
    );
    AmortizationResult {
        total_interest,
        total_amount,
        installment_value,
    }
}

fn round(amt: f64, dec: f64) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec)
    }
}

fn check_amount(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        warn!("rejected {} {}", name, value);
        Err(LendingError::InvalidInput(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )))
    }
}

fn check_result(result: AmortizationResult) -> Result<AmortizationResult> {
    if result.total_amount.is_finite() && result.installment_value.is_finite() {
        Ok(result)
    } else {
        warn!("amortization overflowed: {:?}", result);
        Err(LendingError::InvalidInput(format!(
            "loan total overflows: {}",
            result.total_amount
        )))
    }
}

fn check_count(installment_count: i32) -> Result<()> {
    if installment_count >= 1 {
        Ok(())
    } else {
        warn!("rejected installment count {}", installment_count);
        Err(LendingError::InvalidInput(format!(
            "installment count must be at least 1, got {}",
            installment_count
        )))
    }
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        warn!("rejected {} field {:?}", name, raw);
        LendingError::InvalidInput(format!("{} is not a number: {:?}", name, raw))
    })
}
