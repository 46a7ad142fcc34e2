//! Interactive terminal chat with the Tessan medical assistant.
//!
//! Reads the API key from `GEMINI_API_KEY` (a `.env` file in the working
//! directory is honored). With no flags, the system instruction comes from
//! the first `system_prompt_template.yaml` found in the usual locations.
//!
//! # Examples
//!
//! ```sh
//! # YAML template from the default locations
//! tessan
//!
//! # Plain-text system prompt
//! tessan --prompt chatbot_system_prompt.txt
//!
//! # Force a mode and pick a model
//! tessan --prompt prompt.cfg --mode yaml-template --model gemini-1.5-flash
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tessan_chat::api::RetryConfig;
use tessan_chat::config::{ChatConfig, api_key_from_env, load_dotenv};
use tessan_chat::prompt::{PromptMode, PromptSource};
use tessan_chat::repl::{Repl, ReplExit};
use tokio::io::BufReader;

/// Interactive terminal chat with the Tessan medical assistant.
#[derive(Parser)]
#[command(name = "tessan")]
struct Cli {
    /// System prompt file (plain text or YAML template)
    #[arg(long)]
    prompt: Option<PathBuf>,

    /// How to read the prompt file (inferred from the extension by default)
    #[arg(long, value_enum)]
    mode: Option<PromptMode>,

    /// Gemini model to use (default: $TESSAN_MODEL or gemini-2.0-flash)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = tessan_chat::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Maximum tokens in each reply
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Retries for transient API errors (rate limits, 5xx, timeouts)
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tessan_chat::logging::init("warn");
    let cli = Cli::parse();

    let api_key = match api_key_from_env() {
        Ok(key) => key,
        Err(_) => {
            println!("WARNING: GEMINI_API_KEY environment variable not set.");
            println!("The chatbot cannot function without an API key.");
            println!("Please set it in the .env file or via environment variables.");
            process::exit(1);
        }
    };

    let defaults = ChatConfig::default();
    let config = ChatConfig {
        model: cli.model.unwrap_or(defaults.model),
        temperature: cli.temperature,
        max_output_tokens: cli.max_output_tokens,
        retry: RetryConfig::with_retries(cli.retries),
        prompt: PromptSource::resolve(cli.prompt, cli.mode, &PathBuf::from(".")),
    };

    let chatbot = match config.build_chatbot(api_key) {
        Ok(bot) => bot,
        Err(e) => {
            eprintln!("Error initializing chatbot: {e}");
            process::exit(1);
        }
    };

    let mut banner = vec!["--- Tessan Medical Chatbot (Powered by Google Gemini) ---"];
    if config.prompt.mode == PromptMode::YamlTemplate {
        banner.push("--- Mode: Few-Shot Learning from YAML Template ---");
    }
    banner.push("Type 'quit' to exit");

    let mut repl = Repl::new(&chatbot).with_banner(banner);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match repl.run(stdin, &mut stdout).await {
        Ok(ReplExit::Fatal(_)) => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: terminal I/O failed: {e}");
            process::exit(1);
        }
    }
}
