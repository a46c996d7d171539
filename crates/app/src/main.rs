use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use services::{Clock, TrackerService};
use thesis_core::model::{Catalog, SectionIndex};
use tracing_subscriber::EnvFilter;

mod render;

/// Resolved against the working directory.
const DEFAULT_DB_FILE: &str = "thesis.sqlite3";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidIndex { raw: String },
    InvalidDbUrl { raw: String },
    ResetNotConfirmed,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidIndex { raw } => write!(f, "invalid section index: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::ResetNotConfirmed => {
                write!(f, "reset discards all progress; pass --yes to confirm")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  thesis [--db <sqlite_url>] [command]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                  headline metrics, chapter rings, next focus (default)");
    eprintln!("  table                   every section with its record");
    eprintln!("  heatmap                 per-day status across the schedule");
    eprintln!("  gantt                   timeline bars");
    eprintln!("  analytics               cumulative, citation and word series");
    eprintln!("  toggle <index>          flip a section's completed flag");
    eprintln!("  note <index> <text>     replace a section's note (text runs to end of line)");
    eprintln!("  date <index> <label>    record when a section was actually done");
    eprintln!("  export [--out <dir>]    write a dated JSON export");
    eprintln!("  import <file>           replace all progress from an export");
    eprintln!("  reset --yes             discard all progress");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  THESIS_DB_URL (default ./{DEFAULT_DB_FILE}), THESIS_LOG / RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Status,
    Table,
    Heatmap,
    Gantt,
    Analytics,
    Toggle(SectionIndex),
    Note(SectionIndex, String),
    Date(SectionIndex, String),
    Export { out: PathBuf },
    Import(PathBuf),
    Reset,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    command: Command,
}

fn parse_index(raw: Option<String>, command: &'static str) -> Result<SectionIndex, ArgsError> {
    let raw = raw.ok_or(ArgsError::MissingOperand {
        command,
        name: "index",
    })?;
    raw.parse().map_err(|_| ArgsError::InvalidIndex { raw })
}

fn takes_free_text(positional: &[String]) -> bool {
    matches!(
        positional,
        [command, _index] if command == "note" || command == "date"
    )
}

/// Remaining operands joined by single spaces, so `date 3 Mar 15` works unquoted.
fn rest_text(
    operands: impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String, ArgsError> {
    let text = operands.collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return Err(ArgsError::MissingOperand { command, name });
    }
    Ok(text)
}

impl Args {
    /// `env_db` is the value of `THESIS_DB_URL`, passed in so parsing stays pure.
    fn parse(
        args: impl IntoIterator<Item = String>,
        env_db: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(env_db.unwrap_or_else(|| DEFAULT_DB_FILE.into()));
        let mut out: Option<PathBuf> = None;
        let mut confirmed = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            // Once `note`/`date` have their index, the rest of the line is text.
            if takes_free_text(&positional) {
                positional.push(arg);
                positional.extend(args.by_ref());
                break;
            }
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--out" => {
                    out = Some(PathBuf::from(require_value(&mut args, "--out")?));
                }
                "--yes" | "-y" => confirmed = true,
                "--help" | "-h" => {
                    return Ok(Self {
                        db_url,
                        command: Command::Help,
                    });
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut operands = positional.into_iter();
        let name = operands.next();
        let command = match name.as_deref() {
            None | Some("status") => Command::Status,
            Some("table") => Command::Table,
            Some("heatmap") => Command::Heatmap,
            Some("gantt") => Command::Gantt,
            Some("analytics") => Command::Analytics,
            Some("toggle") => Command::Toggle(parse_index(operands.next(), "toggle")?),
            Some("note") => {
                let index = parse_index(operands.next(), "note")?;
                Command::Note(index, rest_text(operands.by_ref(), "note", "text")?)
            }
            Some("date") => {
                let index = parse_index(operands.next(), "date")?;
                Command::Date(index, rest_text(operands.by_ref(), "date", "label")?)
            }
            Some("export") => Command::Export {
                out: out.take().unwrap_or_else(|| PathBuf::from(".")),
            },
            Some("import") => {
                let file = operands.next().ok_or(ArgsError::MissingOperand {
                    command: "import",
                    name: "file",
                })?;
                Command::Import(PathBuf::from(file))
            }
            Some("reset") if confirmed => Command::Reset,
            Some("reset") => return Err(ArgsError::ResetNotConfirmed),
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        if let Some(extra) = operands.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        if out.is_some() {
            return Err(ArgsError::UnknownArg("--out".into()));
        }

        Ok(Self { db_url, command })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays pipeable.
fn init_logging() {
    let filter = EnvFilter::try_from_env("THESIS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), std::env::var("THESIS_DB_URL").ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;

    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    tracing::debug!(db = %parsed.db_url, "opening tracker");
    let mut tracker =
        TrackerService::open_sqlite(&parsed.db_url, Clock::default(), Arc::new(Catalog::thesis()))
            .await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match parsed.command {
        Command::Help => {}
        Command::Status => render::status(&mut out, &tracker.dashboard()?)?,
        Command::Table => render::table(&mut out, &tracker.tracker_rows())?,
        Command::Heatmap => render::heatmap(&mut out, &tracker.dashboard()?.heatmap)?,
        Command::Gantt => render::gantt(&mut out, &tracker.gantt())?,
        Command::Analytics => render::analytics(&mut out, &tracker.analytics()?)?,
        Command::Toggle(index) => {
            let snapshot = tracker.toggle(index).await?;
            render::snapshot(&mut out, &snapshot)?;
        }
        Command::Note(index, text) => {
            tracker.set_note(index, text).await?;
            writeln!(out, "note saved for #{index}")?;
        }
        Command::Date(index, label) => {
            tracker.set_actual_date(index, label).await?;
            writeln!(out, "actual date saved for #{index}")?;
        }
        Command::Export { out: dir } => {
            let doc = tracker.export()?;
            std::fs::create_dir_all(&dir)?;
            let path = dir.join(&doc.file_name);
            std::fs::write(&path, doc.contents)?;
            writeln!(out, "exported to {}", path.display())?;
        }
        Command::Import(file) => {
            let payload = std::fs::read(&file)?;
            let snapshot = tracker.import_bytes(&payload).await.inspect_err(|err| {
                if err.is_format_error() {
                    eprintln!("import failed, progress unchanged: {}", file.display());
                }
            })?;
            render::snapshot(&mut out, &snapshot)?;
        }
        Command::Reset => {
            tracker.reset().await?;
            writeln!(out, "progress reset")?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_owned()), None)
    }

    #[test]
    fn no_arguments_means_status_on_default_db() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Status);
        assert!(args.db_url.starts_with("sqlite:///"));
        assert!(args.db_url.ends_with("/thesis.sqlite3"));
    }

    #[test]
    fn env_db_is_normalized_and_flag_overrides_it() {
        let args = Args::parse(Vec::new(), Some("sqlite:/tmp/env.sqlite3".into())).unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/env.sqlite3");

        let args = Args::parse(
            ["table", "--db", "/tmp/flag.sqlite3"].map(String::from),
            Some("sqlite:/tmp/env.sqlite3".into()),
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/flag.sqlite3");
        assert_eq!(args.command, Command::Table);
    }

    #[test]
    fn note_and_date_join_remaining_words() {
        assert_eq!(
            parse(&["note", "4", "needs", "a", "source"]).unwrap().command,
            Command::Note(SectionIndex::new(4), "needs a source".into())
        );
        assert_eq!(
            parse(&["date", "22", "Mar", "15"]).unwrap().command,
            Command::Date(SectionIndex::new(22), "Mar 15".into())
        );
        assert_eq!(
            parse(&["date", "22"]).unwrap_err(),
            ArgsError::MissingOperand {
                command: "date",
                name: "label"
            }
        );
    }

    #[test]
    fn note_text_keeps_flag_like_words() {
        assert_eq!(
            parse(&["note", "5", "ask", "-y"]).unwrap().command,
            Command::Note(SectionIndex::new(5), "ask -y".into())
        );
        assert_eq!(
            parse(&["note", "5", "see", "-h", "later"]).unwrap().command,
            Command::Note(SectionIndex::new(5), "see -h later".into())
        );
        assert_eq!(
            parse(&["note", "5", "--todo"]).unwrap().command,
            Command::Note(SectionIndex::new(5), "--todo".into())
        );
        assert_eq!(
            parse(&["--db", "/tmp/t.sqlite3", "date", "3", "--db"]).unwrap(),
            Args {
                db_url: "sqlite:///tmp/t.sqlite3".into(),
                command: Command::Date(SectionIndex::new(3), "--db".into()),
            }
        );
    }

    #[test]
    fn flags_before_note_index_still_apply() {
        assert_eq!(
            parse(&["note", "--help"]).unwrap().command,
            Command::Help
        );
        assert!(matches!(
            parse(&["note", "--yes"]),
            Err(ArgsError::MissingOperand { .. })
        ));
    }

    #[test]
    fn toggle_requires_numeric_index() {
        assert_eq!(
            parse(&["toggle", "7"]).unwrap().command,
            Command::Toggle(SectionIndex::new(7))
        );
        assert_eq!(
            parse(&["toggle", "seven"]).unwrap_err(),
            ArgsError::InvalidIndex {
                raw: "seven".into()
            }
        );
        assert!(matches!(
            parse(&["toggle"]),
            Err(ArgsError::MissingOperand { .. })
        ));
    }

    #[test]
    fn export_out_defaults_to_current_dir() {
        assert_eq!(
            parse(&["export"]).unwrap().command,
            Command::Export {
                out: PathBuf::from(".")
            }
        );
        assert_eq!(
            parse(&["export", "--out", "backups"]).unwrap().command,
            Command::Export {
                out: PathBuf::from("backups")
            }
        );
        assert_eq!(
            parse(&["status", "--out", "backups"]).unwrap_err(),
            ArgsError::UnknownArg("--out".into())
        );
    }

    #[test]
    fn reset_needs_confirmation() {
        assert_eq!(parse(&["reset"]).unwrap_err(), ArgsError::ResetNotConfirmed);
        assert_eq!(parse(&["reset", "--yes"]).unwrap().command, Command::Reset);
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!(
            parse(&["launch"]).unwrap_err(),
            ArgsError::UnknownCommand("launch".into())
        );
        assert_eq!(
            parse(&["status", "--verbose"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert_eq!(
            parse(&["toggle", "1", "2"]).unwrap_err(),
            ArgsError::UnknownArg("2".into())
        );
        assert_eq!(
            parse(&["--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
    }

    #[test]
    fn prepare_rejects_non_file_urls() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
    }
}
