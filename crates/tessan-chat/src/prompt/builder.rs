//! Bracketed-section instruction builder.
//!
//! [`InstructionBuilder`] assembles `[HEADING]` blocks into a single
//! instruction string. Unlike markdown-style builders, every section keeps its
//! heading even when the body is empty: the model is told the section exists
//! and has nothing in it.

/// Builder for bracketed-section system instructions.
///
/// Each section renders as `[HEADING]\n{body}\n`; sections are separated by a
/// blank line.
///
/// # Example
///
/// ```
/// use tessan_chat::prompt::InstructionBuilder;
///
/// let instruction = InstructionBuilder::new()
///     .section("RÔLE", "assistant")
///     .section("TON SOUHAITÉ", "")
///     .build();
///
/// assert_eq!(instruction, "[RÔLE]\nassistant\n\n[TON SOUHAITÉ]\n\n");
/// ```
#[derive(Debug, Default)]
pub struct InstructionBuilder {
    sections: Vec<String>,
}

impl InstructionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section. Empty bodies still emit the heading.
    pub fn section(mut self, heading: &str, body: impl AsRef<str>) -> Self {
        self.sections
            .push(format!("[{heading}]\n{}\n", body.as_ref()));
        self
    }

    /// Append a section whose body is a list of dialogue pairs.
    ///
    /// Each pair renders as `\n{user_label}: {user}\n{assistant_label}: {assistant}\n`
    /// directly under the heading, in iteration order.
    pub fn dialogue<'a>(
        mut self,
        heading: &str,
        user_label: &str,
        assistant_label: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut block = format!("[{heading}]\n");
        for (user, assistant) in pairs {
            block.push_str(&format!(
                "\n{user_label}: {user}\n{assistant_label}: {assistant}\n"
            ));
        }
        self.sections.push(block);
        self
    }

    /// Join all sections with blank lines.
    pub fn build(self) -> String {
        self.sections.join("\n")
    }
}
