//! Command-line front end for the translation layer.
//!
//! Usage:
//!   marketplace-i18n language              # Show the selected language
//!   marketplace-i18n language hi           # Select (and persist) a language
//!   marketplace-i18n translate <text>...   # Translate text (stdin lines if none given)
//!   marketplace-i18n fields name,desc      # Translate fields of a JSON array read from stdin
//!
//! Required environment variables:
//! - GOOGLE_TRANSLATE_API_KEY
//!
//! Optional:
//! - LANGUAGE_PREFERENCE_FILE (persist the selected language)
//! - DEFAULT_LANGUAGE (defaults to en)
//! - TRANSLATE_API_URL, TRANSLATE_MAX_BATCH_ITEMS, TRANSLATE_TIMEOUT_SECS,
//!   TRANSLATE_MAX_ATTEMPTS, TRANSLATE_BATCH_WINDOW_MS, TRANSLATE_DEBOUNCE_MS

use anyhow::{bail, Context, Result};
use marketplace_i18n::config::Config;
use marketplace_i18n::i18n::{Language, LanguageRegistry};
use marketplace_i18n::TranslationOrchestrator;
use std::io::{self, BufRead, Read};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marketplace_i18n=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("Usage: marketplace-i18n <language [code] | translate [text...] | fields <names>>");
    };

    let config = Config::from_env()?;
    let orchestrator = TranslationOrchestrator::from_config(&config)?;
    let source = Language::canonical();

    match command.as_str() {
        "language" => match args.get(1) {
            Some(code) => {
                let language = Language::from_code(code)?;
                orchestrator.preference().set(language)?;
                println!("{} ({})", language.native_name(), language.code());
            }
            None => {
                let current = orchestrator.preference().current();
                for lang in LanguageRegistry::get().list() {
                    let marker = if lang.code == current.code() { "*" } else { " " };
                    println!("{} {} {} ({})", marker, lang.code, lang.native_name, lang.name);
                }
            }
        },
        "translate" => {
            let texts: Vec<String> = if args.len() > 1 {
                args[1..].to_vec()
            } else {
                io::stdin()
                    .lock()
                    .lines()
                    .collect::<Result<Vec<String>, _>>()
                    .context("Failed to read text from stdin")?
            };

            for line in orchestrator.translate_many(&texts, source).await {
                println!("{}", line);
            }
        }
        "fields" => {
            let names = args.get(1).context("Missing comma-separated field names")?;
            let fields: Vec<&str> = names.split(',').map(str::trim).collect();

            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read records from stdin")?;
            let records: Vec<serde_json::Value> =
                serde_json::from_str(&input).context("Expected a JSON array of records")?;

            let translated = orchestrator.translate_fields(&records, &fields, source).await;
            println!("{}", serde_json::to_string_pretty(&translated)?);
        }
        other => bail!("Unknown command: {}", other),
    }

    info!(
        "Translation metrics: {}",
        serde_json::to_string(&orchestrator.metrics().report())?
    );

    Ok(())
}
