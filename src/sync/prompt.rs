//! Interactive prompts for choosing the source database and confirming the sync.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use miette::Diagnostic;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Diagnostic, Debug)]
pub enum PromptError {
    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(d1_sync::sync::prompt::interaction),
        help("Interactive prompts need a terminal. Pass --source and --yes to run non-interactively.")
    )]
    Interaction(#[from] dialoguer::Error),
}

/// Trait for user prompts. Can be mocked in tests.
#[cfg_attr(test, automock)]
pub trait Prompter {
    /// Pick one of `items`. `None` when the user aborts the selection.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, PromptError>;

    /// Ask a yes/no question, defaulting to no.
    fn confirm(&self, prompt: &str) -> Result<bool, PromptError>;
}

/// Terminal prompts backed by dialoguer.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>, PromptError> {
        let choice = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()?;
        Ok(choice)
    }

    fn confirm(&self, prompt: &str) -> Result<bool, PromptError> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
