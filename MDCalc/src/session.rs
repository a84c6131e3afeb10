//! Interactive session: one command per line on stdin.

use crate::report;
use anyhow::{Result, anyhow};
use mdcledger::{EntryId, Ledger, MetadataResolver, ThresholdBanner};
use mdcprobe::upload_from_path;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  add <path>...   add files (one batch per line)
  rm <id>         remove a file by id
  rate <value>    set the charge per minute
  list            show the summary
  clear           remove every file
  help            show this help
  quit            leave
";

#[derive(Debug, PartialEq)]
pub enum Command {
    Add(Vec<PathBuf>),
    Remove(String),
    Rate(String),
    List,
    Clear,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let command = match word {
            "" => return Ok(None),
            "add" if rest.is_empty() => return Err(anyhow!("add: no files given")),
            "add" => Command::Add(rest.split_whitespace().map(PathBuf::from).collect()),
            "rm" | "remove" => Command::Remove(rest.to_string()),
            "rate" => Command::Rate(rest.to_string()),
            "list" | "ls" => Command::List,
            "clear" => Command::Clear,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(anyhow!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// Ingests files from disk as one batch.
///
/// Paths are not checked first: an unreadable file still becomes a 0 s
/// entry, like any other failed resolution.
pub async fn ingest_paths(
    ledger: &mut Ledger,
    paths: &[PathBuf],
    resolver: &dyn MetadataResolver,
) -> Vec<EntryId> {
    let batch = paths.iter().map(|p| upload_from_path(p)).collect();
    ledger.ingest(batch, resolver).await
}

pub struct Session<'a> {
    pub ledger: Ledger,
    resolver: &'a dyn MetadataResolver,
    banner: ThresholdBanner,
}

impl<'a> Session<'a> {
    pub fn new(ledger: Ledger, resolver: &'a dyn MetadataResolver, banner: ThresholdBanner) -> Self {
        Self {
            ledger,
            resolver,
            banner,
        }
    }

    /// Runs one command. Returns `false` when the session should end.
    pub async fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool> {
        debug!(?command, "Executing");
        match command {
            Command::Add(paths) => {
                let ids = ingest_paths(&mut self.ledger, &paths, self.resolver).await;
                for id in ids {
                    if let Some(entry) = self.ledger.get(&id) {
                        writeln!(out, "added {} ({}, {})", entry.name, entry.display_duration(), id)?;
                    }
                }
            }
            Command::Remove(id) => match self.ledger.remove_str(&id) {
                Some(entry) => writeln!(out, "removed {}", entry.name)?,
                None => writeln!(out, "no file with id '{id}'")?,
            },
            Command::Rate(input) => {
                let rate = self.ledger.set_rate_input(&input);
                writeln!(out, "rate set to ${rate}/min")?;
            }
            Command::List => report::render(&self.ledger.summary(&self.banner), out)?,
            Command::Clear => {
                self.ledger.reset();
                writeln!(out, "cleared")?;
            }
            Command::Help => write!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        info!("Interactive session started");
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command, out).await? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "{e}")?,
            }
            out.flush()?;
        }
        info!(files = self.ledger.len(), "Interactive session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mdcledger::{MediaSource, ResolveError};
    use mdcprobe::LoftyResolver;

    struct TenSeconds;

    #[async_trait]
    impl MetadataResolver for TenSeconds {
        async fn resolve(&self, _source: &MediaSource) -> Result<f64, ResolveError> {
            Ok(10.0)
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("add a.mp3  b.mp4").unwrap(),
            Some(Command::Add(vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp4")]))
        );
        assert_eq!(
            Command::parse("rate 2.5").unwrap(),
            Some(Command::Rate("2.5".into()))
        );
        assert_eq!(Command::parse("rm").unwrap(), Some(Command::Remove(String::new())));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
        assert!(Command::parse("add").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_scripted_session() {
        let resolver = TenSeconds;
        let mut session = Session::new(Ledger::new(), &resolver, ThresholdBanner::default());
        let script = "add one.mp3 two.mp4\nrate 6\nrm nope\nbogus\nlist\nquit\nadd three.mp3\n";
        let mut out = Vec::new();

        session.run(script.as_bytes(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("added one.mp3 (0m 10s"));
        assert!(text.contains("rate set to $6/min"));
        assert!(text.contains("no file with id 'nope'"));
        assert!(text.contains("unknown command 'bogus'"));
        assert!(text.contains("Total Duration: 0m 20s"));
        assert!(text.contains("Total Charge:   $1.20"));
        // Nothing after quit runs.
        assert_eq!(session.ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let junk = dir.path().join("junk.mp3");
        std::fs::write(&junk, b"not audio at all").unwrap();
        let gone = dir.path().join("gone.wav");
        let resolver = LoftyResolver::new();
        let mut ledger = Ledger::new();

        let ids = ingest_paths(&mut ledger, &[junk, gone], &resolver).await;

        assert_eq!(ids.len(), 2);
        let rows: Vec<_> = ledger
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.duration_secs))
            .collect();
        assert_eq!(rows, [("junk.mp3", 0), ("gone.wav", 0)]);

        let mut out = Vec::new();
        report::render(&ledger.summary(&ThresholdBanner::default()), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total Duration: 0m 0s"));
        assert!(text.contains("Uploaded Files (2)"));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let resolver = TenSeconds;
        let mut session = Session::new(Ledger::new(), &resolver, ThresholdBanner::default());
        let mut out = Vec::new();

        session
            .execute(Command::Add(vec!["a.wav".into(), "b.wav".into()]), &mut out)
            .await
            .unwrap();
        let id = session.ledger.entries()[0].id.to_string();
        session.execute(Command::Remove(id), &mut out).await.unwrap();
        assert_eq!(session.ledger.len(), 1);
        assert_eq!(session.ledger.entries()[0].name, "b.wav");

        session.execute(Command::Clear, &mut out).await.unwrap();
        assert!(session.ledger.is_empty());
    }
}
