//! Loan cost preview and delinquency classification for a private lending desk.

pub mod delinquency;
pub mod error;
pub mod loan;

pub use delinquency::{
    classify, days_late, filter_overdue, matches_filter, DelinquencyTier, InstallmentDueInfo,
    LateFilter,
};
pub use error::{LendingError, Result};
pub use loan::{compute, AmortizationResult, Frequency, Installment, LoanTerms};
