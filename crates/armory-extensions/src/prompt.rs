//! Confirmation and selection prompts
//!
//! The installer asks its caller two kinds of question: a yes/no
//! confirmation before mutating the filesystem, and a multi-select over
//! the catalog in interactive mode. Terminal implementations live in the
//! CLI crate; the implementations here cover non-interactive runs.

use armory_core::Result;

/// A yes/no confirmation and a multi-select over candidate options
pub trait Prompter {
    /// Ask a yes/no question; `help` gives context shown with the prompt
    fn confirm(&self, message: &str, help: &str) -> Result<bool>;

    /// Let the user pick any number of the given options
    fn multi_select(&self, message: &str, options: &[String]) -> Result<Vec<String>>;
}

/// Non-interactive prompter that accepts everything and selects nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _message: &str, _help: &str) -> Result<bool> {
        Ok(true)
    }

    fn multi_select(&self, _message: &str, _options: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Non-interactive prompter that declines everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Prompter for AssumeNo {
    fn confirm(&self, _message: &str, _help: &str) -> Result<bool> {
        Ok(false)
    }

    fn multi_select(&self, _message: &str, _options: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
