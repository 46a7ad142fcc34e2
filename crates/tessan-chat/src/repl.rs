//! Line-based interactive chat loop.
//!
//! One line in, one model call, one reply out. Quit keywords, end of input
//! and Ctrl-C end the loop without touching the network.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error};

use crate::chat::Chatbot;
use crate::session::ConversationHistory;
use crate::{ChatError, FAREWELL, GREETING};

/// Words that end the session, compared case-insensitively.
pub const QUIT_WORDS: &[&str] = &["quit", "exit", "q"];

/// What to do with one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Skip,
    /// Send the line (without its line terminator) to the model.
    Send(String),
}

impl InputAction {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            InputAction::Skip
        } else if QUIT_WORDS.iter().any(|w| trimmed.eq_ignore_ascii_case(w)) {
            InputAction::Quit
        } else {
            InputAction::Send(line.to_string())
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplExit {
    /// The user typed a quit word.
    Quit,
    /// Input reached end of file.
    EndOfInput,
    /// Ctrl-C.
    Interrupted,
    /// The model returned an error no later turn can recover from.
    Fatal(ChatError),
}

/// Interactive chat session over any async line source.
pub struct Repl<'a> {
    chatbot: &'a Chatbot,
    history: ConversationHistory,
    banner: Vec<String>,
}

impl<'a> Repl<'a> {
    pub fn new(chatbot: &'a Chatbot) -> Self {
        Self {
            chatbot,
            history: ConversationHistory::new(),
            banner: Vec::new(),
        }
    }

    /// Lines printed before the greeting.
    pub fn with_banner(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.banner = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Run until quit, end of input, Ctrl-C, or a fatal model error.
    pub async fn run<R, W>(&mut self, mut input: R, out: &mut W) -> std::io::Result<ReplExit>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        for line in &self.banner {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "Bot: {GREETING}")?;

        let mut line = String::new();
        loop {
            write!(out, "\nYou: ")?;
            out.flush()?;

            line.clear();
            let read = tokio::select! {
                read = input.read_line(&mut line) => read?,
                _ = tokio::signal::ctrl_c() => {
                    writeln!(out, "\nBot: Au revoir !")?;
                    return Ok(ReplExit::Interrupted);
                }
            };
            if read == 0 {
                writeln!(out, "\nBot: {FAREWELL}")?;
                return Ok(ReplExit::EndOfInput);
            }

            let text = match InputAction::parse(&line) {
                InputAction::Quit => {
                    writeln!(out, "Bot: {FAREWELL}")?;
                    return Ok(ReplExit::Quit);
                }
                InputAction::Skip => continue,
                InputAction::Send(text) => text,
            };

            debug!("Turn {}: {} chars", self.history.len() / 2 + 1, text.len());
            let result = tokio::select! {
                result = self.chatbot.send(&mut self.history, &text) => result,
                _ = tokio::signal::ctrl_c() => {
                    writeln!(out, "\nBot: Au revoir !")?;
                    return Ok(ReplExit::Interrupted);
                }
            };

            match result {
                Ok(reply) => writeln!(out, "Bot: {}", reply.text)?,
                Err(e) if e.is_fatal() => {
                    error!("Fatal model error: {e}");
                    writeln!(out, "Error calling Gemini API: {e}")?;
                    return Ok(ReplExit::Fatal(e));
                }
                Err(e) => writeln!(out, "Error calling Gemini API: {e}")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelReply;
    use crate::chat::testing::ScriptedModel;

    #[test]
    fn quit_words_any_case() {
        for word in ["quit", "EXIT", "Q", "  Quit \n"] {
            assert_eq!(InputAction::parse(word), InputAction::Quit, "{word:?}");
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(InputAction::parse("\n"), InputAction::Skip);
        assert_eq!(InputAction::parse("   \t\r\n"), InputAction::Skip);
    }

    #[test]
    fn other_lines_are_sent_verbatim() {
        assert_eq!(
            InputAction::parse("  J'ai mal à la tête \r\n"),
            InputAction::Send("  J'ai mal à la tête ".into())
        );
        assert_eq!(
            InputAction::parse("quitter"),
            InputAction::Send("quitter".into())
        );
    }

    async fn run_with(model: std::sync::Arc<ScriptedModel>, input: &str) -> (ReplExit, String, usize) {
        let bot = Chatbot::new(model, "sys");
        let mut repl = Repl::new(&bot).with_banner(["--- Banner ---"]);
        let mut out = Vec::new();
        let exit = repl.run(input.as_bytes(), &mut out).await.unwrap();
        let history_len = repl.history().len();
        (exit, String::from_utf8(out).unwrap(), history_len)
    }

    #[tokio::test]
    async fn quit_makes_no_request() {
        let model = ScriptedModel::new(vec![]);
        let (exit, out, _) = run_with(model.clone(), "\n  \nq\nnot reached\n").await;

        assert_eq!(exit, ReplExit::Quit);
        assert_eq!(model.request_count(), 0);
        assert!(out.starts_with("--- Banner ---\nBot: Bonjour !"));
        assert!(out.contains("Bot: Au revoir et prenez soin de vous !"));
    }

    #[tokio::test]
    async fn replies_are_printed_and_recorded() {
        let model = ScriptedModel::new(vec![Ok(ModelReply::text("Reposez-vous."))]);
        let (exit, out, history_len) = run_with(model.clone(), "J'ai de la fièvre\nexit\n").await;

        assert_eq!(exit, ReplExit::Quit);
        assert!(out.contains("\nYou: Bot: Reposez-vous.\n"));
        assert_eq!(history_len, 2);
        assert_eq!(model.request_count(), 1);
    }

    #[tokio::test]
    async fn turn_errors_are_reported_and_loop_continues() {
        let model = ScriptedModel::new(vec![
            Err(ChatError::Rejected("HTTP 400: bad".into())),
            Ok(ModelReply::text("second try")),
        ]);
        let (exit, out, history_len) = run_with(model, "one\ntwo\n").await;

        assert_eq!(exit, ReplExit::EndOfInput);
        assert!(out.contains("Error calling Gemini API: request rejected: HTTP 400: bad"));
        assert!(out.contains("Bot: second try"));
        assert_eq!(history_len, 2);
    }

    #[tokio::test]
    async fn fatal_error_stops_loop() {
        let model = ScriptedModel::new(vec![Err(ChatError::Fatal("HTTP 401".into()))]);
        let (exit, out, _) = run_with(model.clone(), "hello\nmore\n").await;

        assert_eq!(exit, ReplExit::Fatal(ChatError::Fatal("HTTP 401".into())));
        assert!(out.contains("Error calling Gemini API: fatal error: HTTP 401"));
        assert_eq!(model.request_count(), 1);
    }
}
