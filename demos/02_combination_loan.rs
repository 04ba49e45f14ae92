/// combination loan - commercial and housing-fund loans merged into one schedule
use repay_engine_rs::{CombinationLoanRequest, LoanAggregator, LoanType, RepaymentMethod};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let request = CombinationLoanRequest::new(LoanType::Combination, RepaymentMethod::EqualPrincipal)
        .with_commercial(dec!(1000000), dec!(4.9), 30)
        .with_fund(dec!(500000), dec!(3.1), 20);

    let result = LoanAggregator::default().calculate(&request)?;

    println!("=== {} loan, {} ===", result.loan_type, result.method);
    println!("merged months:   {}", result.total_months);
    println!("total principal: {}", result.total_principal);
    println!("total interest:  {}", result.total_interest);
    println!("total payment:   {}", result.total_payment);
    println!();

    println!("year  principal       interest        total");
    for year in &result.yearly {
        println!("{:>4}  {:>14}  {:>14}  {:>14}", year.year, year.principal, year.interest, year.total);
    }

    Ok(())
}
