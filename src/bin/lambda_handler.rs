//! AWS Lambda handler for the fund calculators
//!
//! Accepts a tagged calculator request as the event payload, e.g.
//! `{"calculator": "emi", "principal": 1000000, "annual_rate_pct": 9, "months": 180}`,
//! and returns the matching response. Configuration is read from the
//! `FUNDCALC_*` environment variables on every invocation.

use fund_calculators::{CalculatorConfig, CalculatorRequest, CalculatorResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

async fn handler(event: LambdaEvent<CalculatorRequest>) -> Result<CalculatorResponse, Error> {
    let (request, context) = event.into_parts();
    log::info!("request {}: {} calculator", context.request_id, request.name());

    let config = CalculatorConfig::from_env();
    match request.evaluate(&config) {
        Ok(response) => Ok(response),
        Err(e) => {
            log::warn!("request {} failed: {}", context.request_id, e);
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
