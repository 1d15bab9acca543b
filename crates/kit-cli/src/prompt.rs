//! Terminal conflict prompt
//!
//! The core resolver asks decisions through [`ConflictPrompt`]; this is the
//! stdin-backed implementation. Terminal availability is detected here, not
//! in the resolver.

use std::io::{BufRead, IsTerminal, Write};

use colored::Colorize;
use kit_core::{ConflictPrompt, Decision};

/// Line-oriented prompt over stdin/stderr.
pub struct StdinPrompt;

impl ConflictPrompt for StdinPrompt {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn ask(&mut self, rel_path: &str) -> Decision {
        eprint!(
            "{} {} was modified locally. [{}]verwrite / [{}]eep / [{}]ll / keep re[{}]t? ",
            "conflict".yellow().bold(),
            rel_path.cyan(),
            "o".bold(),
            "k".bold(),
            "a".bold(),
            "s".bold()
        );
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => Decision::parse(&line),
            // Closed stdin mid-session: fail open, same as every other
            // unrecognized answer.
            Err(_) => Decision::Overwrite,
        }
    }
}
