use clap::Parser;
use rvc_client::app::views;
use rvc_client::config::cli::{opportunity_query, CurrencyCommand, LicenseCommand, SplashCommand};
use rvc_client::config::{ClientConfig, Command, Settings};
use rvc_client::core::currency::{parse_currency_code, CurrencyManager};
use rvc_client::core::glossary::Glossary;
use rvc_client::core::splash::SplashGate;
use rvc_client::core::usage_limit::UsageLimitManager;
use rvc_client::core::{analyzer, calculator, comparator, opportunities, StateStore};
use rvc_client::utils::error::ErrorSeverity;
use rvc_client::utils::{logger, validation::Validate};
use rvc_client::{AppState, CliConfig, FileStateStore, HttpRvcClient, Result, RvcError, SystemClock};
use std::fs::File;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting rvc CLI");

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        match &e {
            RvcError::LimitReached { message, limit } => {
                eprintln!("{}", views::usage::render_refusal(message, limit.as_ref()));
            }
            _ => eprintln!("❌ {}", e.user_friendly_message()),
        }
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

/// Best effort. A one-off `--license-key` is never written, and the
/// currency is owned by the currency manager.
fn persist(state: &AppState, store: &dyn StateStore) {
    let stored = AppState::load(store);
    let saved = AppState {
        license_key: stored.license_key,
        currency: stored.currency,
        ..state.clone()
    };
    if let Err(e) = saved.save(store) {
        tracing::warn!("Could not save client state: {}", e);
    }
}

fn print_warning(warning: Option<String>) {
    if let Some(warning) = warning {
        eprintln!("⚠ {}", warning);
    }
}

async fn run(config: CliConfig) -> Result<()> {
    let file_config = match &config.config {
        Some(path) => {
            let file_config = ClientConfig::from_file(path)?;
            file_config.validate()?;
            Some(file_config)
        }
        None => None,
    };
    let settings = Settings::resolve(&config.overrides(), file_config.as_ref());
    settings.validate()?;
    tracing::debug!(
        "Using server {} with state file {}",
        settings.base_url,
        settings.state_file.display()
    );

    let store = FileStateStore::open(&settings.state_file);
    let clock = SystemClock;
    let api = HttpRvcClient::new(&settings.base_url, settings.timeout)?;

    if !config.no_splash {
        if let Some(banner) = SplashGate::new(&store, &clock).take_banner() {
            println!("{}", banner);
        }
    }

    let mut state = AppState::load(&store);
    if let Some(key) = config.license_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        state.license_key = Some(key.to_string());
    }

    let mut currency = CurrencyManager::new(&api, &store, &clock);
    if let Some(code) = settings.currency.as_deref() {
        if code != currency.currency() {
            currency.set_currency(code).await?;
        }
    }
    let limits = UsageLimitManager::new(&api, &store);

    match config.command {
        Command::Analyze { ticker } => {
            let ticker = analyzer::normalize_ticker(&ticker)?;
            print_warning(limits.gate(state.license_key()).await.into_result()?);

            let analysis = analyzer::analyze(&api, &mut state, &ticker).await?;
            persist(&state, &store);
            println!("{}", views::analysis::render(&analysis));
        }
        Command::Override { ticker, metrics } => {
            let analysis =
                analyzer::apply_overrides(&api, &mut state, ticker.as_deref(), &metrics).await?;
            persist(&state, &store);
            println!("{}", views::analysis::render(&analysis));
        }
        Command::ClearCache { ticker } => {
            let message = analyzer::clear_cache(&api, ticker.as_deref()).await?;
            println!("✅ {}", message);
        }
        Command::Calc { calculation } => {
            let request = calculation.to_request(state.selected_scenario);
            let outcome = calculator::calculate(&api, &request).await?;
            if let Some(scenario) = calculation.scenario() {
                state.selected_scenario = scenario;
                persist(&state, &store);
            }
            println!("{}", views::calculator::render(&outcome));
        }
        Command::Compare { tickers, csv } => {
            let tickers = comparator::validate_tickers(&tickers)?;
            print_warning(limits.gate(state.license_key()).await.into_result()?);

            let response = comparator::compare(&api, &tickers, state.license_key()).await?;
            let target = currency.currency().to_string();
            currency.ensure_rate(&target).await;
            println!("{}", views::comparison::render(&response, &currency.display()));

            if let Some(path) = csv {
                views::comparison::write_csv(File::create(&path)?, &response)?;
                println!("📁 Comparison saved to {}", path.display());
            }
        }
        Command::Rate { target } => {
            let target = parse_currency_code(&target)?;
            let rate = currency.ensure_rate(&target).await;
            println!("1 USD = {:.4} {}", rate, target);
        }
        Command::Currency { action } => match action {
            Some(CurrencyCommand::Set { code }) => {
                let rate = currency.set_currency(&code).await?;
                println!(
                    "Display currency set to {} ({}), 1 USD = {:.4}",
                    currency.currency(),
                    currency.symbol(),
                    rate
                );
            }
            None => println!(
                "Display currency: {} ({})",
                currency.currency(),
                currency.symbol()
            ),
        },
        Command::Limit => {
            let status = limits.check(state.license_key()).await;
            println!("{}", views::usage::render_status(&status));
        }
        Command::License {
            action: LicenseCommand::Activate { key },
        } => {
            limits.activate_license(&key).await?;
            println!("✅ PRO license activated");
        }
        Command::Top {
            min_score,
            sector,
            sort_by,
            limit,
            preset,
            csv,
        } => {
            let mut query =
                opportunity_query(min_score, sector.as_deref(), sort_by.as_deref(), limit, preset);
            query.currency = Some(currency.currency().to_string());

            let page = opportunities::fetch(&api, &query).await?;
            println!("{}", views::opportunities::render(&page));

            if let Some(path) = csv {
                views::opportunities::write_csv(File::create(&path)?, &page)?;
                println!("📁 Opportunities saved to {}", path.display());
            }
        }
        Command::Glossary { filter } => {
            let filter = filter.unwrap_or_default();
            let glossary = Glossary::embedded()?;
            println!("{}", views::glossary::render(&glossary.search(&filter), &filter));
        }
        Command::Splash {
            action: SplashCommand::Reset,
        } => {
            SplashGate::new(&store, &clock).reset()?;
            println!("The banner will show again on the next run");
        }
    }

    Ok(())
}
