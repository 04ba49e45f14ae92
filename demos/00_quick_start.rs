/// quick start - minimal example to get started
use repay_engine_rs::{AmortizationCalculator, EngineConfig, LoanTerms, Money, PrepaymentMap, RepaymentMethod};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // 1,200,000 at 4.9% over 30 years
    let terms = LoanTerms::from_years(Money::from_major(1_200_000), dec!(4.9), 30, Money::ZERO)?;

    for method in [RepaymentMethod::EqualPrincipal, RepaymentMethod::EqualInterest] {
        let result = AmortizationCalculator::new(method, EngineConfig::standard())
            .calculate(&terms, PrepaymentMap::new())?;

        println!("=== {} ===", method);
        println!("first installment: {}", result.initial_installment);
        println!("total interest:    {}", result.total_interest);
        println!("total payment:     {}", result.total_payment);
        println!();
    }

    Ok(())
}
