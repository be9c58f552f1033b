//! Interactive confirmation for destructive commands

use std::io::{self, BufRead, Write};

/// Asks the operator a yes/no question
pub trait Confirmation {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Prompts on stderr and reads the answer from stdin.
///
/// Only `y` or `yes` (any case) confirm; anything else, including EOF, declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{} (y/N): ", prompt)?;
        stderr.flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(is_yes(&input))
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes("YES"));
        assert!(is_yes("  Yes  "));
    }

    #[test]
    fn test_everything_else_declines() {
        assert!(!is_yes(""));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
        assert!(!is_yes("EXIT"));
    }
}
