//! Where the system instruction comes from.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::template::PromptTemplate;
use crate::ConfigError;

/// Template locations tried, in order, when no prompt path is given.
pub const DEFAULT_TEMPLATE_CANDIDATES: &[&str] = &[
    "system_prompt_template.yaml",
    "prompts/system_prompt_template.yaml",
    "tessan_langchain/system_prompt_template.yaml",
];

/// How a prompt file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PromptMode {
    /// File contents are the instruction, verbatim.
    PlainText,
    /// File is a YAML [`PromptTemplate`] rendered into sections.
    YamlTemplate,
}

impl PromptMode {
    /// Infer the mode from a file extension: `.yaml` / `.yml` are templates,
    /// anything else is plain text.
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                PromptMode::YamlTemplate
            }
            _ => PromptMode::PlainText,
        }
    }
}

/// A prompt file together with the mode used to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSource {
    pub mode: PromptMode,
    pub path: PathBuf,
}

impl PromptSource {
    pub fn new(mode: PromptMode, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            path: path.into(),
        }
    }

    /// Source for `path`, with the mode inferred from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            mode: PromptMode::infer(&path),
            path,
        }
    }

    /// Resolve CLI-style options into a source.
    ///
    /// With no path, the first existing [`DEFAULT_TEMPLATE_CANDIDATES`] entry
    /// under `base_dir` is used (or the first candidate, so that loading
    /// reports it as missing). An explicit `mode` always wins over inference.
    pub fn resolve(path: Option<PathBuf>, mode: Option<PromptMode>, base_dir: &Path) -> Self {
        let path = path.unwrap_or_else(|| {
            DEFAULT_TEMPLATE_CANDIDATES
                .iter()
                .map(|c| base_dir.join(c))
                .find(|p| p.is_file())
                .unwrap_or_else(|| base_dir.join(DEFAULT_TEMPLATE_CANDIDATES[0]))
        });
        match mode {
            Some(mode) => Self::new(mode, path),
            None => Self::from_path(path),
        }
    }

    /// Read the source and produce the system instruction.
    pub fn load_instruction(&self) -> Result<String, ConfigError> {
        debug!(
            "Loading system instruction from {} ({:?})",
            self.path.display(),
            self.mode
        );
        match self.mode {
            PromptMode::YamlTemplate => Ok(PromptTemplate::load(&self.path)?.render()),
            PromptMode::PlainText => {
                let text = std::fs::read_to_string(&self.path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        ConfigError::PromptNotFound {
                            path: self.path.clone(),
                        }
                    } else {
                        ConfigError::PromptRead {
                            path: self.path.clone(),
                            source: e,
                        }
                    }
                })?;
                if text.trim().is_empty() {
                    return Err(ConfigError::EmptyPrompt {
                        path: self.path.clone(),
                    });
                }
                Ok(text)
            }
        }
    }
}
