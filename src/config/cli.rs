use super::SettingsOverrides;
use crate::core::opportunities::QuickFilter;
use crate::core::{CalculationRequest, CompoundMode, MarketTiming, OpportunityQuery, Scenario};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "rvc")]
#[command(about = "Command-line client for the RVC stock analysis server", version)]
pub struct CliConfig {
    #[arg(long, global = true, help = "Analysis server URL [default: http://127.0.0.1:5000]")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Where client state is kept [default: ~/.rvc_state.json]")]
    pub state_file: Option<PathBuf>,

    #[arg(long, global = true, help = "PRO license key for this invocation only")]
    pub license_key: Option<String>,

    #[arg(long, global = true, help = "Display currency, e.g. EUR")]
    pub currency: Option<String>,

    #[arg(long, global = true, help = "Request timeout in seconds [default: 30]")]
    pub timeout_secs: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub log_json: bool,

    #[arg(long, global = true, help = "Do not print the daily banner")]
    pub no_splash: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            state_file: self.state_file.clone(),
            currency: self.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Full RVC analysis of one ticker
    Analyze { ticker: String },

    /// Re-score a ticker with manually entered metrics (KEY=VALUE)
    Override {
        #[arg(long, help = "Defaults to the last analyzed ticker")]
        ticker: Option<String>,
        #[arg(value_name = "KEY=VALUE")]
        metrics: Vec<String>,
    },

    /// Clear the server cache for a ticker, or all of it
    ClearCache { ticker: Option<String> },

    /// Investment calculators
    Calc {
        #[command(subcommand)]
        calculation: CalcCommand,
    },

    /// Rank 2 to 5 companies side by side
    Compare {
        tickers: Vec<String>,
        #[arg(long, help = "Also write the comparison table to this CSV file")]
        csv: Option<PathBuf>,
    },

    /// USD exchange rate for a currency
    Rate { target: String },

    /// Show or change the display currency
    Currency {
        #[command(subcommand)]
        action: Option<CurrencyCommand>,
    },

    /// Show today's usage quota
    Limit,

    /// Manage the PRO license
    License {
        #[command(subcommand)]
        action: LicenseCommand,
    },

    /// Highest-scoring companies in the server's universe
    Top {
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long, help = "rvc_score, market_cap or pe_ratio")]
        sort_by: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, value_enum, help = "Canned filters, overridden by explicit flags")]
        preset: Option<QuickFilter>,
        #[arg(long, help = "Also write the table to this CSV file")]
        csv: Option<PathBuf>,
    },

    /// Look up financial terms
    Glossary { filter: Option<String> },

    /// Banner controls
    Splash {
        #[command(subcommand)]
        action: SplashCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CurrencyCommand {
    /// Switch the display currency and fetch its rate
    Set { code: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum LicenseCommand {
    /// Validate a key with the server and remember it
    Activate { key: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SplashCommand {
    /// Show the banner again on the next run
    Reset,
}

/// Rates on the command line are percentages; the server takes fractions.
#[derive(Debug, Clone, Subcommand)]
pub enum CalcCommand {
    /// Fixed monthly investing
    Dca {
        #[arg(long)]
        monthly: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, value_enum)]
        scenario: Option<Scenario>,
        #[arg(long, value_enum, default_value_t = MarketTiming::Normal)]
        timing: MarketTiming,
        #[arg(long)]
        initial: Option<f64>,
        #[arg(long, help = "Annual inflation in percent")]
        inflation: Option<f64>,
    },

    /// Invest everything now or spread it over twelve months
    LumpSum {
        #[arg(long)]
        total: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, value_enum)]
        scenario: Option<Scenario>,
    },

    /// Growth of an initial amount plus monthly contributions
    Compound {
        #[arg(long, default_value_t = 0.0)]
        initial: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, value_enum)]
        scenario: Option<Scenario>,
        #[arg(long, value_enum, default_value_t = CompoundMode::Deterministic)]
        mode: CompoundMode,
        #[arg(long, help = "Simulation paths (3-10)")]
        paths: Option<u32>,
    },

    /// Capital at retirement age
    Retirement {
        #[arg(long)]
        current_age: u32,
        #[arg(long)]
        retirement_age: u32,
        #[arg(long, default_value_t = 0.0)]
        initial: f64,
        #[arg(long, default_value_t = 0.0)]
        monthly: f64,
        #[arg(long, value_enum)]
        scenario: Option<Scenario>,
        #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
        inflation: f64,
        #[arg(long, allow_hyphen_values = true, help = "Fixed annual return in percent")]
        annual_return: Option<f64>,
    },
}

fn fraction(percent: f64) -> f64 {
    percent / 100.0
}

impl CalcCommand {
    pub fn scenario(&self) -> Option<Scenario> {
        match self {
            CalcCommand::Dca { scenario, .. }
            | CalcCommand::LumpSum { scenario, .. }
            | CalcCommand::Compound { scenario, .. }
            | CalcCommand::Retirement { scenario, .. } => *scenario,
        }
    }

    /// Builds the request, using `selected` when no scenario flag was given.
    pub fn to_request(&self, selected: Scenario) -> CalculationRequest {
        let scenario = self.scenario().unwrap_or(selected);
        match self {
            CalcCommand::Dca {
                monthly,
                years,
                timing,
                initial,
                inflation,
                ..
            } => CalculationRequest::Dca {
                monthly_amount: *monthly,
                years: *years,
                scenario,
                market_timing: *timing,
                initial_amount: *initial,
                annual_inflation: inflation.map(fraction),
            },
            CalcCommand::LumpSum { total, years, .. } => CalculationRequest::LumpSumVsDca {
                total_amount: *total,
                years: *years,
                scenario,
            },
            CalcCommand::Compound {
                initial,
                monthly,
                years,
                mode,
                paths,
                ..
            } => CalculationRequest::CompoundInterest {
                initial_amount: *initial,
                monthly_amount: *monthly,
                years: *years,
                scenario,
                mode: *mode,
                num_paths: *paths,
            },
            CalcCommand::Retirement {
                current_age,
                retirement_age,
                initial,
                monthly,
                inflation,
                annual_return,
                ..
            } => CalculationRequest::RetirementPlan {
                current_age: *current_age,
                retirement_age: *retirement_age,
                initial_amount: *initial,
                monthly_amount: *monthly,
                scenario,
                annual_inflation: fraction(*inflation),
                annual_return_override: annual_return.map(fraction),
            },
        }
    }
}

/// Preset first, then any explicit flag on top of it.
pub fn opportunity_query(
    min_score: Option<f64>,
    sector: Option<&str>,
    sort_by: Option<&str>,
    limit: Option<u32>,
    preset: Option<QuickFilter>,
) -> OpportunityQuery {
    let mut query = OpportunityQuery::default();
    if let Some(preset) = preset {
        preset.apply(&mut query);
    }
    if let Some(min_score) = min_score {
        query.min_score = min_score;
    }
    if let Some(sector) = sector {
        query.sector = Some(sector.to_string());
    }
    if let Some(sort_by) = sort_by {
        query.sort_by = sort_by.to_string();
    }
    if let Some(limit) = limit {
        query.limit = limit;
    }
    query
}
