//! Moon Phase Widget - the current lunar phase with a daily photographic icon.
//!
//! This binary wires the phase table, the image pipeline and a console widget
//! together.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveTime, TimeZone, Utc};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moon_phase_widget::{
    config::{Cli, Command, CommonArgs, PhaseConfig, RenderConfig, WatchConfig},
    i18n::Locale,
    phase::{next_major_phase, PhaseCalculator, PhaseQuery},
    widget::{format_age, format_countdown, format_illumination, FALLBACK_PHASE, MISSING},
    ArtifactStore, CacheKey, ConsoleWidget, HttpImageSource, MoonImageService, PipelineResult,
    WidgetController,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Watch(config) => run_watch(config).await,
        Command::Render(config) => run_render(config).await,
        Command::Phase(config) => run_phase(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "moon_phase_widget=debug"
    } else {
        "moon_phase_widget=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the image service from the shared options.
fn build_service(common: &CommonArgs) -> Result<MoonImageService<HttpImageSource>, String> {
    let template = common.url_template()?;
    let source = HttpImageSource::new(template, common.fetch_timeout).map_err(|e| e.to_string())?;
    Ok(MoonImageService::new(source, ArtifactStore::new(common.cache_dir())))
}

/// Build the phase calculator from the shared options.
fn build_calculator(common: &CommonArgs) -> Result<PhaseCalculator, String> {
    let table = common.load_phase_table().map_err(|e| e.to_string())?;
    Ok(PhaseCalculator::with_countdown(table, common.countdown_mode()))
}

// =============================================================================
// Watch Command
// =============================================================================

async fn run_watch(config: WatchConfig) -> ExitCode {
    init_logging(config.common.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let (service, calculator) = match (build_service(&config.common), build_calculator(&config.common)) {
        (Ok(service), Ok(calculator)) => (service, calculator),
        (Err(e), _) | (_, Err(e)) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (start, end) = calculator.range();
    let locale = config.common.locale();
    let mode = config.common.display_mode();

    info!("Configuration:");
    info!("  Cache dir: {}", service.store().dir().display());
    info!("  Image URL: {}", config.common.url_template);
    info!("  Phase table: {} to {}", start, end);
    info!("  Language: {}", locale.code());
    info!("  Display: {}", mode.as_str());
    info!("  Refresh every {}s", config.update_interval);

    let widget = Arc::new(ConsoleWidget::new());
    let controller = WidgetController::new(calculator, Arc::new(service), widget.clone(), locale)
        .with_mode(mode)
        .with_icon_dir(config.common.icon_dir.clone());
    controller.bind_activation();

    let mut ticker = tokio::time::interval(Duration::from_secs(config.update_interval));
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("Press Enter to activate the widget, Ctrl-C to quit");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.refresh(&Local::now()).await;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    widget.activate();
                    controller.refresh(&Local::now()).await;
                }
                Ok(None) => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                controller.shutdown();
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Render Command
// =============================================================================

async fn run_render(config: RenderConfig) -> ExitCode {
    init_logging(config.common.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let (service, calculator) = match (build_service(&config.common), build_calculator(&config.common)) {
        (Ok(service), Ok(calculator)) => (service, calculator),
        (Err(e), _) | (_, Err(e)) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let now = Local::now();
    let (day, at) = match config.date {
        Some(day) => {
            // Midday of the requested local day
            let noon = day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default());
            let at = Local
                .from_local_datetime(&noon)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&noon));
            (day, at)
        }
        None => (now.date_naive(), now.with_timezone(&Utc)),
    };

    let phase_name = match calculator.query(at) {
        Ok(info) => info.phase_name,
        Err(e) => {
            warn!("Moon phase calculation failed: {}", e);
            FALLBACK_PHASE.to_string()
        }
    };

    let mode = config.common.display_mode();
    debug!(
        "Cache state for {}: {:?}",
        day,
        service.store().probe(&CacheKey::new(day), mode)
    );

    let result = service.resolve(day, &phase_name, mode).await;

    if config.json {
        let json = serde_json::json!({
            "date": day,
            "phase": phase_name,
            "mode": mode.as_str(),
            "result": result,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize result: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        match &result {
            PipelineResult::Rendered(path) => println!("{}", path.display()),
            PipelineResult::Fallback(icon) => println!("{}", icon),
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Phase Command
// =============================================================================

fn run_phase(config: PhaseConfig) -> ExitCode {
    if config.common.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let calculator = match build_calculator(&config.common) {
        Ok(calculator) => calculator,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let at = config
        .at
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let info = match calculator.query(at) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        match serde_json::to_string_pretty(&info) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    let locale: Locale = config.common.locale();
    let labels = locale.labels();

    println!("{}", locale.translate_phase(&info.phase_name));
    println!("{}", format_illumination(info.illumination_percent, &labels));
    println!(
        "{}",
        info.age_days
            .map(|age| format_age(age, &labels))
            .unwrap_or_else(|| MISSING.to_string())
    );
    match info.seconds_to_next_phase {
        Some(seconds) => {
            let next = next_major_phase(&info.phase_name)
                .map(|p| locale.translate_phase(p.name()))
                .unwrap_or(MISSING);
            println!("{} {} {}", next, labels.r#in, format_countdown(seconds, &labels));
        }
        None => println!("{}", MISSING),
    }

    ExitCode::SUCCESS
}
