/// prepayments - one-time and recurring extra principal
use repay_engine_rs::{
    EngineConfig, LoanAggregator, RecurringPrepaymentRule, RepayRequest, RepaymentMethod,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let request = RepayRequest::new(dec!(1200000), dec!(4.9), 30, RepaymentMethod::EqualInterest)
        .with_prepayment(12, dec!(50000))
        // 5,000 every quarter during the first year
        .with_periodic_prepayment(RecurringPrepaymentRule::new(1, 12, 3, dec!(5000)));

    let baseline = LoanAggregator::default()
        .calculate_single(&RepayRequest { prepayments: vec![], periodic_prepayments: vec![], ..request.clone() })?;
    let prepaid = LoanAggregator::default().calculate_single(&request)?;

    println!("without prepayments: interest {} over {} months", baseline.total_interest, baseline.effective_term_months);
    println!("with prepayments:    interest {} over {} months", prepaid.total_interest, prepaid.effective_term_months);
    println!();

    println!("month  principal     interest      payment       balance");
    for entry in prepaid.monthly.iter().take(14) {
        println!(
            "{:>5}  {:>12}  {:>12}  {:>12}  {:>14}",
            entry.month, entry.principal, entry.interest, entry.payment, entry.remaining_balance
        );
    }
    println!();

    // a floor that is never repaid, leftover prepayments carried forward
    let reserved = request.clone().with_reserved_principal(dec!(1000000)).with_prepayment(24, dec!(500000));
    let result = LoanAggregator::new(EngineConfig::carry_remainder()).calculate_single(&reserved)?;
    println!(
        "reserved 1,000,000: final balance {} after {} months, unconsumed {}",
        result.final_balance(),
        result.effective_term_months,
        result.unconsumed_prepayments.total()
    );

    Ok(())
}
