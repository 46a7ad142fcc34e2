//! System instruction sources and rendering.
//!
//! The instruction sent with every request comes from one of two
//! [`PromptMode`]s:
//!
//! 1. **Plain text** — a UTF-8 file used verbatim.
//! 2. **YAML template** — a [`PromptTemplate`] with role, tone, safety rules,
//!    closing phrase and few-shot examples, rendered through
//!    [`InstructionBuilder`] into bracketed sections.
//!
//! [`PromptSource`] ties a mode to a path and is the only entry point the
//! binaries use.

pub mod builder;
pub mod source;
pub mod template;

pub use builder::InstructionBuilder;
pub use source::{PromptMode, PromptSource};
pub use template::{FewShotExample, PromptTemplate};
