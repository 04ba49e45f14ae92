/// json request - deserialize a request and print the result as json
use repay_engine_rs::{CombinationLoanRequest, EngineConfig, LoanAggregator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = EngineConfig::from_json(r#"{ "trailing_months": "zero_fill" }"#)?;
    let request = CombinationLoanRequest::from_json(
        r#"{
            "loanType": "fund",
            "method": "equal_interest",
            "fundLoanTotal": "120000",
            "fundAnnualRate": "3.1",
            "fundYears": 1,
            "prepayments": [{ "month": 6, "amount": "200000" }],
            "periodicRepayList": [{ "startMonth": 2, "endMonth": 4, "cycleMonths": 0, "amount": "100" }]
        }"#,
    )?;

    let result = LoanAggregator::new(config).calculate(&request)?;
    println!("{}", result.to_json_pretty()?);

    Ok(())
}
