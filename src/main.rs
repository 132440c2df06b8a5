use anyhow::Context;
use clap::Parser;
use portkeeper::utils::error::ErrorCategory;
use portkeeper::utils::{logger, validation::Validate};
use portkeeper::{CliConfig, Command, PortBroker, PortError, PortProvider, PortService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置 (失敗時日誌尚未初始化，直接輸出到 stderr)
    let config = match cli.load_service_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    let level = config.logging.level.as_deref();
    if cli.json_logs || config.logging.json {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }

    tracing::info!("Starting portkeeper");
    tracing::debug!("Service config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    let service = PortService::new(&config).context("failed to build port service")?;
    let broker = PortBroker::new(Arc::new(service));

    let result = match cli.command {
        Command::Allocate { start, end, count } => allocate(&broker, start, end, count).await,
        Command::Check { port } => check(&broker, port).await.map(|()| Outcome::Complete),
    };

    match result {
        Ok(Outcome::Complete) => Ok(()),
        Ok(Outcome::RangeExhausted) => {
            eprintln!("⚠️ 範圍內沒有足夠的可用端口");
            std::process::exit(EXIT_RANGE_EXHAUSTED);
        }
        Err(e) => {
            tracing::error!("❌ {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }
}

/// Exit code when `allocate` served fewer ports than requested.
const EXIT_RANGE_EXHAUSTED: i32 = 4;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Complete,
    RangeExhausted,
}

async fn allocate(
    broker: &PortBroker,
    start: Option<i64>,
    end: Option<i64>,
    count: usize,
) -> Result<Outcome, PortError> {
    // 同時發出請求，由服務的鎖保證不會重複分配
    let mut handles = Vec::with_capacity(count);
    for _ in 0..count {
        let broker = broker.clone();
        handles.push(tokio::spawn(async move { broker.allocate(start, end).await }));
    }

    let mut allocations = Vec::with_capacity(count);
    for handle in handles {
        let allocation = handle.await.map_err(|e| PortError::TaskError {
            message: e.to_string(),
        })??;
        match allocation {
            Some(allocation) => allocations.push(allocation),
            None => tracing::warn!("⚠️ Range exhausted before all requests were served"),
        }
    }

    allocations.sort_by_key(|a| a.port);
    println!("{}", serde_json::to_string_pretty(&allocations)?);

    if allocations.len() < count {
        return Ok(Outcome::RangeExhausted);
    }
    Ok(Outcome::Complete)
}

async fn check(broker: &PortBroker, port: u16) -> Result<(), PortError> {
    let availability = broker.check_availability(port).await?;
    println!("{}", serde_json::to_string_pretty(&availability)?);
    Ok(())
}

fn exit_code(error: &PortError) -> i32 {
    match error.category() {
        ErrorCategory::Input => 2,
        ErrorCategory::Configuration => 1,
        ErrorCategory::System => 3,
    }
}
