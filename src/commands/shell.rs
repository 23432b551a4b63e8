//! The interactive shell.
//!
//! Each input line is parsed like the arguments of a one-shot `fund` invocation. While the shell
//! waits for input an `IdleWatchdog` runs; when it fires the session is ended.

use crate::api::Mode;
use crate::args::Command;
use crate::commands::{run, Out};
use crate::error::{public_error, ErrorType, IntoResult};
use crate::session::{self, IdleWatchdog};
use crate::{Config, Result};
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, warn};

/// One line of shell input.
#[derive(Debug, Parser)]
#[command(name = "fund", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Reads commands from stdin until `exit`, `quit` or the end of input.
pub async fn shell(config: &Config, mode: Mode) -> Result<Out<()>> {
    println!("Type a fund command without 'fund', 'help' for a list, 'exit' to leave.");
    read_commands(config, mode, BufReader::new(tokio::io::stdin()), true).await
}

enum Input {
    Line(Option<String>),
    Idle,
}

async fn read_commands<R>(config: &Config, mode: Mode, reader: R, prompt: bool) -> Result<Out<()>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut watchdog = IdleWatchdog::new(config.idle_timeout());
    let mut count = 0usize;

    loop {
        if prompt {
            print!("fund> ");
            std::io::stdout()
                .flush()
                .context("Unable to write the prompt")?;
        }
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line.context("Unable to read input")?),
            () = watchdog.expired() => Input::Idle,
        };

        let line = match input {
            Input::Idle => {
                if session::end(config).await.pub_result(ErrorType::Local)? {
                    warn!("Logged out after inactivity");
                    println!();
                    println!("You were logged out after inactivity.");
                }
                watchdog.reset();
                continue;
            }
            Input::Line(None) => break,
            Input::Line(Some(line)) => line,
        };
        watchdog.reset();

        let words = match split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                error!("{e:#}");
                continue;
            }
        };
        match words.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit") => break,
            Some(_) => {}
        }

        match ShellLine::try_parse_from(&words) {
            Ok(parsed) => {
                count += 1;
                if let Err(e) = run(config, mode, &parsed.command).await {
                    error!("{e:#}");
                }
            }
            // Also covers `help` and `--help`, which clap reports as an error that prints the
            // help text.
            Err(e) => {
                if let Err(print_error) = e.print() {
                    debug!("Unable to print the usage message: {print_error}");
                }
            }
        }
        // A long running command is not idle time.
        watchdog.reset();
    }

    debug!("The shell ran {count} commands");
    Ok("Goodbye".into())
}

/// Splits a line into words the way a shell would for simple input: whitespace separates words,
/// single and double quotes group them, and a backslash escapes the next character outside single
/// quotes.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('"'), '"') => quote = None,
            (Some('\''), c) => word.push(c),
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => word.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(public_error(
            ErrorType::Validation,
            format!("unterminated {q} quote"),
        ));
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::staged::Staged;
    use crate::test::TestEnv;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#"insert donor --donor "Pak RT 01" --amount 'Rp 250.000'"#).unwrap(),
            vec!["insert", "donor", "--donor", "Pak RT 01", "--amount", "Rp 250.000"]
        );
        assert_eq!(split_words("  whoami  ").unwrap(), vec!["whoami"]);
        assert_eq!(split_words(r"a\ b '' c").unwrap(), vec!["a b", "", "c"]);
        assert!(split_words("").unwrap().is_empty());
        assert!(split_words("insert 'open").is_err());
    }

    #[test]
    fn test_shell_line_parses_commands() {
        let line = ShellLine::try_parse_from(split_words("list weekly --format csv").unwrap());
        assert!(matches!(line.unwrap().command, Command::List(_)));
        assert!(ShellLine::try_parse_from(["frobnicate"]).is_err());
    }

    #[tokio::test]
    async fn test_commands_run_until_exit() {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Admin).await;
        env.login("sari").await;
        let config = env.config();

        let input = b"insert expense --date 2026-09-01 --purpose \"Sewa tenda\" --amount 300000\n\
            not-a-command\n\
            \n\
            exit\n\
            insert expense --date 2026-09-01 --purpose Ignored --amount 1\n";
        let out = read_commands(&config, Mode::Testing, &input[..], false)
            .await
            .unwrap();
        assert_eq!(out.message(), "Goodbye");

        let staged = Staged::load(&config).await.unwrap();
        assert_eq!(staged.ledger().expenses.len(), 1);
        assert_eq!(staged.ledger().expenses[0].purpose, "Sewa tenda");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_input_logs_out() {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Admin).await;
        env.login("sari").await;
        let config = env.config();

        let (reader, mut writer) = tokio::io::duplex(64);
        let typist = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(400)).await;
            writer.write_all(b"exit\n").await.unwrap();
            writer
        });
        read_commands(&config, Mode::Testing, BufReader::new(reader), false)
            .await
            .unwrap();
        let _writer = typist.await.unwrap();
        assert!(!config.session_path().exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_keeps_session() {
        let env = TestEnv::new().await;
        env.add_user("sari", "x", Role::Admin).await;
        env.login("sari").await;
        let config = env.config();

        let (reader, mut writer) = tokio::io::duplex(64);
        let typist = tokio::spawn(async move {
            for _ in 0..3 {
                tokio::time::sleep(Duration::from_secs(200)).await;
                writer.write_all(b"help-me\n").await.unwrap();
            }
            writer.write_all(b"quit\n").await.unwrap();
            writer
        });
        read_commands(&config, Mode::Testing, BufReader::new(reader), false)
            .await
            .unwrap();
        let _writer = typist.await.unwrap();
        assert!(config.session_path().exists());
    }
}
