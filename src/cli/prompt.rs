use std::io::{BufRead, ErrorKind, IsTerminal};

use colored::Colorize;
use zeroize::Zeroizing;

use crate::admin::Prompt;
use crate::error::Result;

/// Hidden input on a terminal; a plain line from stdin when piped. End of input
/// counts as backing out.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, title: &str, message: &str) -> Result<Option<String>> {
        eprintln!("{}", title.bold());
        if std::io::stdin().is_terminal() {
            return match rpassword::prompt_password(format!("{message} ")) {
                Ok(answer) => Ok(Some(answer)),
                Err(e) if matches!(e.kind(), ErrorKind::UnexpectedEof | ErrorKind::Interrupted) => {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            };
        }

        eprint!("{message} ");
        let mut line = Zeroizing::new(String::new());
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}
