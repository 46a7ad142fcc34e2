//! YAML prompt templates.
//!
//! ```yaml
//! role: Assistant médical virtuel de Tessan
//! tone: Professionnel et bienveillant
//! safety_rules: Ne jamais poser de diagnostic.
//! mandatory_closing: Consultez un médecin.
//! few_shot_examples:
//!   - user: J'ai de la fièvre
//!     assistant: Reposez-vous et hydratez-vous.
//! ```
//!
//! Every key is optional. A missing or blank section (`tone:`) renders as
//! empty, and numbers or booleans render as written. Each few-shot example
//! must have both `user` and `assistant`.

use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::builder::InstructionBuilder;
use crate::ConfigError;

pub const ROLE_HEADING: &str = "RÔLE";
pub const TONE_HEADING: &str = "TON SOUHAITÉ";
pub const SAFETY_HEADING: &str = "RÈGLES DE SÉCURITÉ";
pub const CLOSING_HEADING: &str = "PHRASE DE CLÔTURE OBLIGATOIRE";
pub const EXAMPLES_HEADING: &str = "EXEMPLES D'INTERACTION (FEW-SHOT LEARNING)";

const USER_LABEL: &str = "Utilisateur";
const ASSISTANT_LABEL: &str = "Assistant";

/// A sample exchange embedded in the instruction to steer response style.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FewShotExample {
    pub user: String,
    pub assistant: String,
}

/// Declarative system prompt. Immutable once loaded.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PromptTemplate {
    #[serde(deserialize_with = "section_text")]
    pub role: String,
    #[serde(deserialize_with = "section_text")]
    pub tone: String,
    #[serde(deserialize_with = "section_text")]
    pub safety_rules: String,
    #[serde(deserialize_with = "section_text")]
    pub mandatory_closing: String,
    pub few_shot_examples: Vec<FewShotExample>,
}

/// Section body from any YAML scalar; null becomes `""`.
fn section_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde_yaml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected text for a prompt section, found {other:?}"
        ))),
    }
}

impl PromptTemplate {
    /// Load and parse a template file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::PromptNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::PromptRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(&yaml, path)
    }

    /// Parse a template from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, Path::new("<inline>"))
    }

    fn parse(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        let empty = || ConfigError::EmptyPrompt {
            path: path.to_path_buf(),
        };
        if yaml.trim().is_empty() {
            return Err(empty());
        }
        let parse_err = |source| ConfigError::PromptParse {
            path: PathBuf::from(path),
            source,
        };
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(parse_err)?;
        if value.is_null() {
            return Err(empty());
        }
        serde_yaml::from_value(value).map_err(parse_err)
    }

    /// Flatten the template into one instruction string.
    ///
    /// Pure and deterministic: the same template always renders identically.
    pub fn render(&self) -> String {
        InstructionBuilder::new()
            .section(ROLE_HEADING, &self.role)
            .section(TONE_HEADING, &self.tone)
            .section(SAFETY_HEADING, &self.safety_rules)
            .section(CLOSING_HEADING, &self.mandatory_closing)
            .dialogue(
                EXAMPLES_HEADING,
                USER_LABEL,
                ASSISTANT_LABEL,
                self.few_shot_examples
                    .iter()
                    .map(|ex| (ex.user.as_str(), ex.assistant.as_str())),
            )
            .build()
    }
}
