//! Interactive session: one command per input line against a live store.
//!
//! Unlike one-shot commands, the store survives between lines, so removals
//! keep their grace period (and can be undone) and the sorted flag is visible.

use crate::core::error::ShoplistError;
use crate::plugins::session::{ListCommand, OutputFormat, Session};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::debug;

#[derive(Parser, Debug)]
#[clap(name = "shoplist>", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[clap(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    #[clap(flatten)]
    List(ListCommand),
    /// Show products whose name contains QUERY.
    Filter {
        #[clap(default_value = "")]
        query: String,
    },
    /// Keep a product that is still being removed.
    UndoRemove { id: String },
    /// Leave the shell.
    #[clap(alias = "exit")]
    Quit,
}

/// Split a line into words. Single or double quotes group words with spaces.
pub fn split_words(line: &str) -> Result<Vec<String>, ShoplistError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(ShoplistError::ValidationError("unterminated quote".into()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

pub fn run_shell<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut out: W,
    format: OutputFormat,
) -> Result<(), ShoplistError> {
    let prompt = format == OutputFormat::Text;
    if prompt {
        let first = session.list_envelope("list", "");
        writeln!(out, "{}", session.render(&first, format))?;
        write!(out, "> ")?;
        out.flush()?;
    }

    for line in input.lines() {
        let line = line?;
        let now = Instant::now();
        let deleted = session.settle(now);
        if !deleted.is_empty() {
            debug!(count = deleted.len(), "settled removals");
        }

        let rendered = match split_words(&line) {
            Err(e) => Some(e.to_string()),
            Ok(words) if words.is_empty() => None,
            Ok(words) => match ShellLine::try_parse_from(words) {
                Err(e) => Some(e.to_string().trim_end().to_string()),
                Ok(parsed) => match parsed.command {
                    ShellCommand::Quit => break,
                    ShellCommand::List(cmd) => {
                        let envelope = session.execute(&cmd, now);
                        Some(session.render(&envelope, format))
                    }
                    ShellCommand::Filter { query } => {
                        let envelope = session.list_envelope("filter", &query);
                        Some(session.render(&envelope, format))
                    }
                    ShellCommand::UndoRemove { id } => {
                        let envelope = session.undo_remove(&id);
                        Some(session.render(&envelope, format))
                    }
                },
            },
        };
        if let Some(text) = rendered {
            writeln!(out, "{}", text)?;
        }
        if prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
    }

    let deleted = session.close();
    debug!(count = deleted.len(), "shell closed");
    if prompt {
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ShoplistConfig;
    use crate::plugins::products::ProductListStore;

    fn session() -> Session {
        Session::from_parts(ProductListStore::new(), ShoplistConfig::default())
    }

    fn run(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run_shell(session, script.as_bytes(), &mut out, OutputFormat::Json).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_split_words_quotes() {
        assert_eq!(
            split_words(r#"add "Orange juice" 6,49 'Lidl Plus'"#).unwrap(),
            ["add", "Orange juice", "6,49", "Lidl Plus"]
        );
        assert_eq!(split_words("  ").unwrap(), Vec::<String>::new());
        assert_eq!(split_words(r#"add "" 1 X"#).unwrap(), ["add", "", "1", "X"]);
        assert!(split_words("add \"Milk").is_err());
    }

    #[test]
    fn test_shell_runs_script() {
        let mut s = session();
        let out = run(&mut s, "add Milk 4,99 Lidl\nadd Apple 2 Lidl\nsort\nfilter app\n");
        assert!(out.contains("\"cmd\": \"filter\""));
        let names: Vec<&str> = s.list().products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Apple", "Milk"]);
        assert!(s.list().is_sorted());
    }

    #[test]
    fn test_shell_undo_remove_before_grace_ends() {
        let mut s = session();
        run(&mut s, "add Milk 1 S\n");
        let id = s.list().products()[0].id.clone();
        run(&mut s, &format!("remove {id}\nundo-remove {id}\n"));
        assert_eq!(s.list().len(), 1);
    }

    #[test]
    fn test_shell_flushes_removals_on_exit() {
        let mut s = session();
        run(&mut s, "add Milk 1 S\n");
        let id = s.list().products()[0].id.clone();
        let out = run(&mut s, &format!("remove {id}\nquit\nadd Never 1 S\n"));
        assert!(s.list().is_empty());
        assert!(!out.contains("Never"));
    }

    #[test]
    fn test_shell_reports_bad_input_and_continues() {
        let mut s = session();
        let out = run(&mut s, "frobnicate\nadd \"Milk\nadd Milk 1 S\n");
        assert!(out.contains("unterminated quote"));
        assert_eq!(s.list().len(), 1);
    }
}
