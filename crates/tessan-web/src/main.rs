//! Tessan medical assistant in the browser.
//!
//! Serves the chat page and its API, backed by Gemini. Reads the API key from
//! `GEMINI_API_KEY` (a `.env` file in the working directory is honored).
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p tessan-web
//! GEMINI_API_KEY=... cargo run -p tessan-web -- --port 8080 --retries 2
//! GEMINI_API_KEY=... cargo run -p tessan-web -- --prompt prompts/chatbot_system_prompt.txt
//! ```
//!
//! Then open the printed URL, or talk to the API directly:
//!
//! ```bash
//! curl -X POST localhost:8501/api/sessions
//! curl -X POST localhost:8501/api/chat \
//!   -H 'content-type: application/json' \
//!   -d '{"session_id": "session-...", "message": "J'\''ai de la fièvre"}'
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tessan_chat::api::RetryConfig;
use tessan_chat::config::{ChatConfig, api_key_from_env, load_dotenv};
use tessan_chat::prompt::{PromptMode, PromptSource};
use tessan_chat::session::SessionStore;
use tessan_web::{WebConfig, spawn_web};

/// Tessan medical assistant in the browser.
#[derive(Parser)]
#[command(about = "Browser chat UI for the Tessan medical assistant")]
struct Args {
    /// Port for the web UI server.
    #[arg(long, default_value_t = 8501)]
    port: u16,

    /// System prompt file (plain text or YAML template).
    #[arg(long)]
    prompt: Option<PathBuf>,

    /// How to read the prompt file (inferred from the extension by default).
    #[arg(long, value_enum)]
    mode: Option<PromptMode>,

    /// Gemini model to use.
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature.
    #[arg(long, default_value_t = tessan_chat::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Retries for transient API errors.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Extra static assets served for paths the API does not handle.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tessan_chat::logging::init("info");
    let args = Args::parse();

    let api_key = match api_key_from_env() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("API Key not found! Please check your .env file. ({e})");
            process::exit(1);
        }
    };

    let defaults = ChatConfig::default();
    let config = ChatConfig {
        model: args.model.unwrap_or(defaults.model),
        temperature: args.temperature,
        max_output_tokens: None,
        retry: RetryConfig::with_retries(args.retries),
        prompt: PromptSource::resolve(args.prompt, args.mode, &PathBuf::from(".")),
    };

    let chatbot = match config.build_chatbot(api_key) {
        Ok(bot) => Arc::new(bot),
        Err(e) => {
            eprintln!("Failed to initialize chatbot: {e}");
            process::exit(1);
        }
    };

    let store = Arc::new(Mutex::new(SessionStore::new()));
    let web_config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
        static_dir: args.static_dir,
    };

    let addr = match spawn_web(chatbot, store, web_config).await {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Failed to start web server: {e}");
            process::exit(1);
        }
    };
    println!("Web UI: http://{addr}");
    println!("Press Ctrl-C to stop.");

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to listen for Ctrl-C: {e}");
        process::exit(1);
    }
}
