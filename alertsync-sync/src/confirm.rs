//! The yes/no gate in front of every store write.
//!
//! [`read_confirmation`] is what the CLI passes to [`crate::pipeline::run`].

use std::io::{self, BufRead, Write};

/// The only answer that applies changes.
pub const CONFIRM_TOKEN: &str = "yes";

/// True when `line` is exactly [`CONFIRM_TOKEN`] once the line terminator is
/// stripped. No trimming, no case folding.
pub fn is_confirmed(line: &str) -> bool {
    let answer = line
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line);
    answer == CONFIRM_TOKEN
}

/// Ask once and read one line. EOF counts as "no".
pub fn read_confirmation(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "Type '{CONFIRM_TOKEN}' to apply these changes: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        tracing::debug!("confirmation input closed");
        return Ok(false);
    }
    Ok(is_confirmed(&line))
}
