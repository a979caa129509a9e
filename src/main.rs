//! Fund calculators CLI
//!
//! Runs any of the dashboard calculators from the shell. Every subcommand
//! prints a short report, or the full result as JSON with `--json`.
//! Configuration comes from `--config <file>` or `FUNDCALC_*` variables.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fund_calculators::calculators::{
    capital_gains_tax, child_goal, compare_emi_vs_sip, emi_summary, nav_swp_report, plan_goal, plan_retirement,
    project_lumpsum, simulate_swp, CapitalGainsInput, ChildGoalInput, ChildGoalKind, EmiVsSipInput,
    ExistingInvestment, GoalInput, HoldingPeriod, LumpsumInput, NavSwpInput, RetirementInput, SwpInput, SwpInterval,
};
use fund_calculators::nav::{benchmark_return, load_cash_flows, parse_date, NavSeries, TrailingPeriod};
use fund_calculators::returns::xirr;
use fund_calculators::{CalculatorConfig, CalculatorRequest, InvestmentPlan, ScenarioRunner};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fundcalc", version, about = "Mutual fund calculators: SIP, SWP, goals, retirement, EMI and tax")]
struct Cli {
    /// JSON configuration file (defaults plus FUNDCALC_* variables when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Future value of a monthly SIP
    Sip {
        #[arg(long)]
        monthly: f64,
        /// Expected annual return (%)
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, default_value_t = 0.0)]
        inflation: f64,
    },
    /// Future value of a one-time investment
    Lumpsum {
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
    },
    /// Monthly SIP needed for a goal priced in today's money
    Goal {
        #[arg(long)]
        target: f64,
        #[arg(long)]
        years: u32,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        inflation: f64,
        /// Annual SIP step-up (%)
        #[arg(long)]
        step_up: Option<f64>,
        /// Existing investments towards the goal
        #[arg(long)]
        existing: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        existing_rate: f64,
    },
    /// Child education or marriage goal
    ChildGoal {
        #[arg(long, value_enum, default_value_t = CliChildGoal::Education)]
        kind: CliChildGoal,
        #[arg(long)]
        child_age: u32,
        #[arg(long)]
        goal_age: u32,
        #[arg(long)]
        cost: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        inflation: f64,
        #[arg(long)]
        step_up: Option<f64>,
    },
    /// Systematic withdrawal from a corpus
    Swp {
        #[arg(long)]
        corpus: f64,
        #[arg(long)]
        withdrawal: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        /// Print the month-by-month table
        #[arg(long)]
        rows: bool,
    },
    /// SWP walked over a NAV history file
    NavSwp {
        #[arg(long)]
        nav: PathBuf,
        #[arg(long)]
        invest_date: String,
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        end_date: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        withdrawal: f64,
        #[arg(long, value_enum, default_value_t = CliInterval::Monthly)]
        interval: CliInterval,
        #[arg(long, default_value_t = 1)]
        swp_day: u32,
    },
    /// Loan EMI
    Emi {
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
        /// Print the amortization schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Pay the full EMI, or pay less and run a SIP with the difference
    EmiVsSip {
        #[arg(long)]
        loan: f64,
        #[arg(long)]
        loan_rate: f64,
        #[arg(long)]
        years: u32,
        #[arg(long)]
        sip: f64,
        #[arg(long)]
        sip_rate: f64,
    },
    /// Capital gains tax on a redemption
    CapitalGains {
        #[arg(long)]
        sale: f64,
        #[arg(long)]
        purchase: f64,
        #[arg(long, default_value_t = 0.0)]
        expenses: f64,
        /// Holding period; derived from the dates when omitted
        #[arg(long, value_enum)]
        holding: Option<CliHolding>,
        #[arg(long)]
        purchase_date: Option<String>,
        #[arg(long)]
        sale_date: Option<String>,
    },
    /// Retirement corpus and monthly savings
    Retirement {
        #[arg(long)]
        current_age: u32,
        #[arg(long)]
        retirement_age: u32,
        #[arg(long, default_value_t = 85)]
        life_expectancy: u32,
        #[arg(long)]
        expense: f64,
        #[arg(long)]
        return_before: f64,
        #[arg(long)]
        return_after: f64,
        #[arg(long)]
        inflation: f64,
        #[arg(long, default_value_t = 0.0)]
        savings: f64,
    },
    /// XIRR of a `date,amount` CSV
    Xirr {
        file: PathBuf,
    },
    /// Trailing and lumpsum returns from a NAV CSV or JSON file
    NavReturns {
        file: PathBuf,
        /// Lumpsum amount for a historical return between --from and --to
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Fixed benchmark rate (%) to compare the lumpsum against
        #[arg(long)]
        benchmark: Option<f64>,
    },
    /// Evaluate a JSON request, or an array of requests, from a file
    Eval {
        file: PathBuf,
    },
    /// SIP value across a grid of rates and tenures
    Sweep {
        #[arg(long)]
        monthly: f64,
        #[arg(long, value_delimiter = ',', default_values_t = vec![8.0, 10.0, 12.0, 14.0])]
        rates: Vec<f64>,
        #[arg(long, value_delimiter = ',', default_values_t = vec![5, 10, 15, 20])]
        years: Vec<u32>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliChildGoal {
    Education,
    Marriage,
}

impl From<CliChildGoal> for ChildGoalKind {
    fn from(value: CliChildGoal) -> Self {
        match value {
            CliChildGoal::Education => ChildGoalKind::Education,
            CliChildGoal::Marriage => ChildGoalKind::Marriage,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInterval {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl From<CliInterval> for SwpInterval {
    fn from(value: CliInterval) -> Self {
        match value {
            CliInterval::Monthly => SwpInterval::Monthly,
            CliInterval::Quarterly => SwpInterval::Quarterly,
            CliInterval::HalfYearly => SwpInterval::HalfYearly,
            CliInterval::Yearly => SwpInterval::Yearly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliHolding {
    Stcg,
    Ltcg,
}

impl From<CliHolding> for HoldingPeriod {
    fn from(value: CliHolding) -> Self {
        match value {
            CliHolding::Stcg => HoldingPeriod::ShortTerm,
            CliHolding::Ltcg => HoldingPeriod::LongTerm,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CalculatorConfig> {
    match path {
        Some(path) => CalculatorConfig::from_json_file(path).with_context(|| format!("reading config {}", path.display())),
        None => Ok(CalculatorConfig::from_env()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Command::Sip { monthly, rate, years, inflation } => {
            let plan = InvestmentPlan::new(monthly, rate, years).with_inflation(inflation);
            let response = CalculatorRequest::Sip(plan).evaluate(&config)?;
            if json {
                return print_json(&response);
            }
            if let fund_calculators::CalculatorResponse::Sip { projection, yearly } = response {
                println!("Invested:          {:>16.2}", projection.invested);
                println!("Estimated returns: {:>16.2}", projection.estimated_returns);
                println!("Total value:       {:>16.2}", projection.total_value);
                println!("In today's money:  {:>16.2}", projection.real_value);
                println!();
                println!("{:>5} {:>16} {:>16}", "Year", "Invested", "Value");
                for row in yearly.iter().skip(1) {
                    println!("{:>5} {:>16.2} {:>16.2}", row.year, row.invested, row.value);
                }
            }
        }

        Command::Lumpsum { principal, rate, years } => {
            let result = project_lumpsum(&LumpsumInput { principal, annual_rate_pct: rate, years })?;
            if json {
                return print_json(&result);
            }
            println!("Invested:          {:>16.2}", result.invested);
            println!("Estimated returns: {:>16.2}", result.estimated_returns);
            println!("Total value:       {:>16.2}", result.total_value);
            println!("Absolute return:   {:>15.2}%", result.absolute_return_pct);
        }

        Command::Goal { target, years, rate, inflation, step_up, existing, existing_rate } => {
            let input = GoalInput {
                step_up_pct: step_up,
                existing: existing.map(|amount| ExistingInvestment { amount, annual_return_pct: existing_rate }),
                ..GoalInput::new(target, years, rate, inflation)
            };
            let plan = plan_goal(&input)?;
            if json {
                return print_json(&plan);
            }
            println!("Target after inflation: {:>16.2}", plan.inflation_adjusted_target);
            println!("Existing grows to:      {:>16.2}", plan.existing_future_value);
            println!("SIP must accumulate:    {:>16.2}", plan.net_target);
            println!("Monthly SIP:            {:>16.2}", plan.monthly_sip);
            println!("Total investment:       {:>16.2}", plan.total_investment);
        }

        Command::ChildGoal { kind, child_age, goal_age, cost, rate, inflation, step_up } => {
            let result = child_goal(&ChildGoalInput {
                kind: kind.into(),
                child_age,
                goal_age,
                cost_today: cost,
                expected_return_pct: rate,
                inflation_pct: inflation,
                step_up_pct: step_up,
                existing: None,
            })?;
            if json {
                return print_json(&result);
            }
            println!("{:?} goal in {} years", result.kind, result.years_to_goal);
            println!("Cost at goal date: {:>16.2}", result.plan.inflation_adjusted_target);
            println!("Monthly SIP:       {:>16.2}", result.plan.monthly_sip);
            println!("Total investment:  {:>16.2}", result.plan.total_investment);
        }

        Command::Swp { corpus, withdrawal, rate, years, rows } => {
            let input = SwpInput { corpus, monthly_withdrawal: withdrawal, annual_return_pct: rate, years };
            let result = simulate_swp(&input, &config.solver)?;
            if json {
                return print_json(&result);
            }
            if rows {
                println!("{:>5} {:>14} {:>12} {:>12} {:>14}", "Month", "Opening", "Withdrawal", "Growth", "Closing");
                for row in &result.rows {
                    println!(
                        "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.month, row.opening_balance, row.withdrawal, row.growth, row.closing_balance
                    );
                }
                println!();
            }
            println!("Installments:    {:>16}", result.installments());
            println!("Total withdrawn: {:>16.2}", result.total_withdrawn);
            println!("Final balance:   {:>16.2}", result.final_balance);
            match result.depleted_in_month {
                Some(month) => println!("Corpus runs out in month {}", month),
                None => println!("Corpus lasts the full {} years", years),
            }
            if let Some(rate) = result.xirr_pct {
                println!("XIRR:            {:>15.2}%", rate);
            }
        }

        Command::NavSwp { nav, invest_date, start_date, end_date, amount, withdrawal, interval, swp_day } => {
            let series = NavSeries::load(&nav).with_context(|| format!("loading NAV file {}", nav.display()))?;
            let input = NavSwpInput {
                invest_date: parse_date(&invest_date)?,
                start_date: parse_date(&start_date)?,
                end_date: parse_date(&end_date)?,
                total_invested_amount: amount,
                withdrawal_amount: withdrawal,
                interval: interval.into(),
                swp_day,
            };
            let report = nav_swp_report(&series, &input, &config.solver)?;
            if json {
                return print_json(&report);
            }
            println!(
                "{:>10} {:>10} {:>12} {:>14} {:>12} {:>14}",
                "Date", "NAV", "Units", "Cash flow", "Gain/loss", "Value"
            );
            for row in &report.rows {
                println!(
                    "{:>10} {:>10.4} {:>12.4} {:>14.2} {:>12.2} {:>14.2}",
                    row.current_date, row.current_nav, row.units, row.cash_flow, row.capital_gains_loss, row.current_value
                );
            }
            println!();
            println!("Installments:    {:>16}", report.installments);
            println!("Total withdrawn: {:>16.2}", report.total_withdrawn);
            println!("Final value:     {:>16.2}", report.final_value);
            if let Some(rate) = report.xirr_pct {
                println!("XIRR:            {:>15.2}%", rate);
            }
        }

        Command::Emi { principal, rate, years, schedule } => {
            let summary = emi_summary(principal, rate, years * 12, schedule)?;
            if json {
                return print_json(&summary);
            }
            if schedule {
                println!("{:>5} {:>14} {:>12} {:>12} {:>14}", "Month", "Opening", "Interest", "Principal", "Closing");
                for row in &summary.schedule {
                    println!(
                        "{:>5} {:>14.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.month, row.opening_balance, row.interest, row.principal, row.closing_balance
                    );
                }
                println!();
            }
            println!("EMI:            {:>16.2}", summary.emi);
            println!("Total payment:  {:>16.2}", summary.total_payment);
            println!("Total interest: {:>16.2}", summary.total_interest);
        }

        Command::EmiVsSip { loan, loan_rate, years, sip, sip_rate } => {
            let result = compare_emi_vs_sip(&EmiVsSipInput {
                loan_amount: loan,
                loan_rate_pct: loan_rate,
                years,
                monthly_sip: sip,
                sip_rate_pct: sip_rate,
            })?;
            if json {
                return print_json(&result);
            }
            println!("Full EMI:               {:>16.2}", result.full_emi);
            println!("Total EMI outflow:      {:>16.2}", result.total_emi_outflow);
            println!("SIP future value:       {:>16.2}", result.sip_future_value);
            println!("Net cost after SIP:     {:>16.2}", result.net_cost_after_sip);
            println!("Reduced EMI:            {:>16.2}", result.reduced_emi);
            println!("Balance left on loan:   {:>16.2}", result.remaining_balance);
            println!("Surplus after clearing: {:>16.2}", result.surplus_after_clearing);
            println!("Better strategy: {:?}", result.better_strategy);
        }

        Command::CapitalGains { sale, purchase, expenses, holding, purchase_date, sale_date } => {
            let holding = match (holding, purchase_date, sale_date) {
                (Some(holding), _, _) => holding.into(),
                (None, Some(bought), Some(sold)) => {
                    HoldingPeriod::classify(parse_date(&bought)?, parse_date(&sold)?, &config.tax)?
                }
                _ => bail!("pass --holding, or both --purchase-date and --sale-date"),
            };
            let result = capital_gains_tax(
                &CapitalGainsInput { holding, sale_value: sale, purchase_value: purchase, expenses },
                &config.tax,
            )?;
            if json {
                return print_json(&result);
            }
            println!("{}", result.holding.label());
            println!("Capital gain:  {:>16.2}", result.capital_gain);
            println!("Exemption:     {:>16.2}", result.exemption);
            println!("Taxable gain:  {:>16.2}", result.taxable_gain);
            println!("Tax @ {:>5.2}%: {:>16.2}", result.tax_rate * 100.0, result.tax);
        }

        Command::Retirement {
            current_age,
            retirement_age,
            life_expectancy,
            expense,
            return_before,
            return_after,
            inflation,
            savings,
        } => {
            let plan = plan_retirement(&RetirementInput {
                current_age,
                retirement_age,
                life_expectancy,
                monthly_expense: expense,
                return_before_pct: return_before,
                return_after_pct: return_after,
                inflation_pct: inflation,
                existing_savings: savings,
            })?;
            if json {
                return print_json(&plan);
            }
            println!("Years to retirement:     {:>16}", plan.years_to_retirement);
            println!("Annual income needed:    {:>16.2}", plan.annual_income_at_retirement);
            println!("Corpus needed:           {:>16.2}", plan.corpus_needed);
            println!("After existing savings:  {:>16.2}", plan.net_corpus_needed);
            println!("Monthly savings:         {:>16.2}", plan.monthly_savings);
        }

        Command::Xirr { file } => {
            let reader = File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            let flows = load_cash_flows(reader)?;
            let rate = xirr(&flows, &config.solver)?;
            if json {
                return print_json(&serde_json::json!({ "flows": flows.len(), "xirr_pct": rate * 100.0 }));
            }
            println!("XIRR over {} flows: {:.4}%", flows.len(), rate * 100.0);
        }

        Command::NavReturns { file, amount, from, to, benchmark } => {
            let series = NavSeries::load(&file).with_context(|| format!("loading NAV file {}", file.display()))?;
            let trailing: Vec<_> = TrailingPeriod::ALL.iter().filter_map(|&p| series.trailing_return(p)).collect();

            let lumpsum = match (amount, from, to) {
                (Some(amount), Some(from), Some(to)) => {
                    let (start, end) = (parse_date(&from)?, parse_date(&to)?);
                    let fund = series.lumpsum_return(amount, start, end)?;
                    let bench = benchmark.map(|rate| benchmark_return(amount, rate, start, end));
                    Some((fund, bench))
                }
                (None, None, None) => None,
                _ => bail!("--amount, --from and --to go together"),
            };

            if json {
                return print_json(&serde_json::json!({
                    "trailing": trailing,
                    "lumpsum": lumpsum.as_ref().map(|(fund, _)| fund),
                    "benchmark": lumpsum.as_ref().and_then(|(_, bench)| bench.as_ref()),
                }));
            }

            if let Some(latest) = series.latest() {
                println!("{} NAV points, latest {} on {}", series.len(), latest.nav, latest.date);
            }
            for ret in &trailing {
                match ret.cagr_pct {
                    Some(cagr) => println!("{:>4}: {:>8.2}% absolute, {:>7.2}% CAGR", ret.period.label(), ret.absolute_pct, cagr),
                    None => println!("{:>4}: {:>8.2}% absolute", ret.period.label(), ret.absolute_pct),
                }
            }
            if let Some((fund, bench)) = lumpsum {
                println!();
                println!("Lumpsum {:.2} grew to {:.2} ({:.2}% CAGR)", fund.invested, fund.end_value, fund.cagr_pct);
                if let Some(bench) = bench {
                    println!("Benchmark would be {:.2} ({:.2}% CAGR)", bench.end_value, bench.cagr_pct);
                }
            }
        }

        Command::Eval { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let runner = ScenarioRunner::new(config);

            if value.is_array() {
                let requests: Vec<CalculatorRequest> = serde_json::from_value(value)?;
                let results: Vec<serde_json::Value> = runner
                    .run_batch(&requests)
                    .into_iter()
                    .map(|result| match result {
                        Ok(response) => match serde_json::to_value(response) {
                            Ok(value) => value,
                            Err(e) => serde_json::json!({ "error": e.to_string() }),
                        },
                        Err(e) => serde_json::json!({ "error": e.to_string() }),
                    })
                    .collect();
                print_json(&results)?;
            } else {
                let request: CalculatorRequest = serde_json::from_value(value)?;
                print_json(&runner.run(&request)?)?;
            }
        }

        Command::Sweep { monthly, rates, years } => {
            let runner = ScenarioRunner::new(config);
            let grid = runner.sip_sensitivity(monthly, &rates, &years)?;
            if json {
                return print_json(&grid);
            }
            print!("{:>8}", "rate\\yrs");
            for y in &years {
                print!(" {:>14}", y);
            }
            println!();
            for (row, rate) in grid.chunks(years.len().max(1)).zip(&rates) {
                print!("{:>7.2}%", rate);
                for point in row {
                    print!(" {:>14.2}", point.total_value);
                }
                println!();
            }
        }
    }

    Ok(())
}
