// Prompt - asks the user for a theme name when a command got no argument

use std::io::{BufRead, Write};

/// Interactive source of a single line of input
pub trait Prompt: Send + Sync {
    /// Ask for a value. `None` when the user cancelled (EOF, read error).
    fn ask(&self, question: &str) -> Option<String>;
}

/// Reads the answer from stdin, printing the question on stderr
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&self, question: &str) -> Option<String> {
        eprint!("{} ", question);
        let _ = std::io::stderr().flush();

        read_answer(&mut std::io::stdin().lock())
    }
}

/// Read one line; EOF or a read error counts as cancelled
fn read_answer(reader: &mut impl BufRead) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input.trim().to_string()),
        Err(e) => {
            tracing::debug!("Prompt read failed: {}", e);
            None
        }
    }
}
