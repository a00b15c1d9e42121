use chrono::{Days, Local};
use lending::{InstallmentDueInfo, LateFilter, LoanTerms};
use log::info;
use simple_logger::SimpleLogger;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let now = Local::now().naive_local();
    let today = now.date();

    let terms = LoanTerms::from_form("1000", "10", "24", "weekly")?;
    info!("{:?}", terms);
    println!("{}", terms.amortization());
    for pmt in terms.schedule(terms.frequency().next_due_date(&today)?)? {
        println!("{}", pmt);
    }

    let due_dates = [1, 5, 12, 45].map(|days| today - Days::new(days));
    for filter in LateFilter::ALL {
        println!("{}", filter);
        for due in due_dates {
            let info = InstallmentDueInfo::new(due, now);
            if info.matches(filter) {
                println!("  due {}, {} days late, {}", due, info.days_late(), info.tier());
            }
        }
    }
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<LoanTerms>();
    is_normal::<lending::AmortizationResult>();
    is_normal::<lending::Installment>();
    is_normal::<InstallmentDueInfo>();
    is_normal::<lending::DelinquencyTier>();
    is_normal::<LateFilter>();
    is_normal::<lending::LendingError>();
}
