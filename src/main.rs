//! Interactive terminal front end for the form-filling dialogue engine.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use guarantee_chat::adapters::date::ChronoDateResolver;
use guarantee_chat::adapters::oracle::{OpenAiOracle, ResilientOracle};
use guarantee_chat::adapters::phone::DigitPhoneValidator;
use guarantee_chat::config::AppConfig;
use guarantee_chat::domain::dialogue::DialogueController;
use guarantee_chat::domain::normalize::Normalizer;
use guarantee_chat::domain::schema::{default_skip_rules, letter_of_guarantee_schema};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("guarantee_chat=warn")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load()?;
    config.validate()?;
    info!(model = %config.oracle.model, url = %config.oracle.base_url, "oracle configured");

    let oracle = ResilientOracle::new(Arc::new(OpenAiOracle::new(
        config.oracle.to_adapter_config(),
    )))
    .with_max_attempts(config.oracle.max_retries);

    let normalizer = Normalizer::new(
        Arc::new(ChronoDateResolver::new()),
        Arc::new(DigitPhoneValidator::japan()),
    );

    let schema = letter_of_guarantee_schema();
    let mut controller =
        DialogueController::new(&schema, Arc::new(oracle), normalizer, default_skip_rules())?;

    println!("{}", controller.start_conversation());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break, // EOF: leave without a completed form
        };

        let outcome = controller.process_turn(line.trim()).await?;
        println!("\n{}", outcome.response);

        if outcome.is_complete {
            let collected = controller.collected_data()?;
            println!(
                "\nCollected data:\n{}",
                serde_json::to_string_pretty(&collected)?
            );
            break;
        }
    }

    Ok(())
}
