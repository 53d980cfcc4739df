use std::io::{BufRead, Write};

use clap::Parser;

use super::{CmdResult, Context, execute};
use crate::cli::commands::ShellLine;
use crate::io::storage::Storage;
use crate::session::TodoSession;
use crate::ui::SaveIndicator;

fn prompt(indicator: &SaveIndicator) -> &'static str {
    if indicator.is_visible() {
        "xt [saved]> "
    } else {
        "xt> "
    }
}

/// Read commands from `input` until EOF or `exit`. Each line is one
/// subcommand without the `xt` prefix; errors are printed and the loop
/// continues.
pub fn run_shell<S: Storage, R: BufRead>(
    session: &mut TodoSession<S>,
    indicator: &SaveIndicator,
    ctx: &Context,
    input: R,
    out: &mut dyn Write,
) -> CmdResult {
    write!(out, "{}", prompt(indicator))?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first().copied() {
            None => {}
            Some("exit") | Some("quit") => break,
            Some("help") => {
                let help = ShellLine::try_parse_from(["--help"])
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                write!(out, "{}", help)?;
            }
            Some(_) => match ShellLine::try_parse_from(&words) {
                Ok(parsed) => {
                    if let Err(e) = execute(session, parsed.command, ctx, out) {
                        writeln!(out, "error: {}", e)?;
                    }
                }
                Err(e) => write!(out, "{}", e)?,
            },
        }
        write!(out, "{}", prompt(indicator))?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::persist::PersistentStore;
    use crate::io::storage::MemoryStorage;
    use crate::model::config::AppConfig;
    use std::time::Duration;

    fn run(script: &str, indicator: &SaveIndicator, store: PersistentStore<MemoryStorage>) -> String {
        let mut session = TodoSession::open(store, false);
        let ctx = Context {
            config: AppConfig::default(),
            json: false,
        };
        let mut out = Vec::new();
        run_shell(&mut session, indicator, &ctx, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_runs_commands_in_order() {
        let indicator = SaveIndicator::default();
        let out = run(
            "add Water the plants\nlist --filter active\nexit\nadd never\n",
            &indicator,
            PersistentStore::new(MemoryStorage::new()),
        );
        assert!(out.contains("Water the plants"));
        assert!(out.contains("3 active, 1 completed (25%)"));
        assert!(!out.contains("never"));
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let indicator = SaveIndicator::default();
        let out = run(
            "toggle 99\nfrobnicate\nstats\n",
            &indicator,
            PersistentStore::new(MemoryStorage::new()),
        );
        assert!(out.contains("error: todo not found: 99"));
        assert!(out.contains("2 active, 1 completed (33%)"));
    }

    #[test]
    fn test_prompt_shows_saved_after_a_write() {
        let indicator = SaveIndicator::new(Duration::from_secs(60));
        let notifier = indicator.notifier();
        let store = PersistentStore::new(MemoryStorage::new()).with_on_save(move |_| notifier.notify());
        let out = run("stats\ntoggle 1\n", &indicator, store);

        let saved_at = out.find("xt [saved]> ").unwrap();
        let toggled_at = out.find("Review quarterly reports").unwrap();
        assert!(out.starts_with("xt> "));
        assert!(saved_at > toggled_at);
    }

    #[test]
    fn test_nested_shell_is_refused() {
        let indicator = SaveIndicator::default();
        let out = run("shell\n", &indicator, PersistentStore::new(MemoryStorage::new()));
        assert!(out.contains("error: already in a shell"));
    }
}
