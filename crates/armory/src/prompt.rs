//! Terminal prompts backed by dialoguer

use dialoguer::{Confirm, MultiSelect};

use armory_core::{Error, Result};
use armory_extensions::Prompter;

/// Interactive prompter for a terminal session
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str, help: &str) -> Result<bool> {
        if !help.is_empty() {
            println!("{}", help);
        }

        Confirm::new()
            .with_prompt(message)
            .default(true)
            .interact()
            .map_err(prompt_error)
    }

    fn multi_select(&self, message: &str, options: &[String]) -> Result<Vec<String>> {
        if options.is_empty() {
            return Ok(Vec::new());
        }

        let chosen = MultiSelect::new()
            .with_prompt(message)
            .items(options)
            .interact()
            .map_err(prompt_error)?;

        Ok(chosen.into_iter().map(|i| options[i].clone()).collect())
    }
}

fn prompt_error(err: dialoguer::Error) -> Error {
    Error::Io(std::io::Error::other(err))
}
