use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process;

use clap::Args;
use lea::FormatConfig;
use rayon::prelude::*;

use super::{read_source, resolve_lea_files, FmtError, FormatOverrides};

#[derive(Args)]
pub struct FmtArgs {
    /// Input .lea file or directory (defaults to current directory)
    pub input: Option<PathBuf>,
    /// Rewrite files in place instead of printing to stdout
    #[arg(long, conflicts_with = "check")]
    pub write: bool,
    /// Check formatting without modifying (exit 1 if unformatted)
    #[arg(long)]
    pub check: bool,
    #[command(flatten)]
    pub overrides: FormatOverrides,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    Stdout,
    Write,
    Check,
}

/// What happened to one file.
#[derive(Debug)]
enum Outcome {
    Unchanged,
    Formatted,
    WouldReformat,
    Printed(String),
}

pub fn cmd_fmt(args: FmtArgs) {
    let FmtArgs {
        input,
        write,
        check,
        overrides,
    } = args;
    let input = input.unwrap_or_else(|| PathBuf::from("."));
    let mode = if check {
        Mode::Check
    } else if write {
        Mode::Write
    } else {
        Mode::Stdout
    };

    let config = match overrides.resolve(&input).map_err(FmtError::from) {
        Ok(config) => config,
        Err(e) => {
            e.report();
            process::exit(1);
        }
    };

    let files = resolve_lea_files(&input);
    if files.is_empty() {
        eprintln!("No .lea files found in '{}'", input.display());
        return;
    }
    tracing::debug!(files = files.len(), ?mode, "formatting");

    // `files` is sorted and an indexed collect keeps that order.
    let results: Vec<(&PathBuf, Result<Outcome, FmtError>)> = files
        .par_iter()
        .map(|file| (file, format_single_file(file, mode, &config)))
        .collect();

    let mut failed = 0usize;
    let mut unformatted = 0usize;
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for (path, result) in results {
        match result {
            Ok(Outcome::Unchanged) => {
                if mode == Mode::Check {
                    eprintln!("OK: {}", path.display());
                } else {
                    eprintln!("Unchanged: {}", path.display());
                }
            }
            Ok(Outcome::Formatted) => eprintln!("Formatted: {}", path.display()),
            Ok(Outcome::WouldReformat) => {
                unformatted += 1;
                eprintln!("would reformat: {}", path.display());
            }
            Ok(Outcome::Printed(text)) => {
                if let Err(e) = stdout.write_all(text.as_bytes()) {
                    eprintln!("error: cannot write to stdout: {}", e);
                    process::exit(1);
                }
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(path = %path.display(), "formatting failed");
                e.report();
            }
        }
    }

    tracing::info!(
        files = files.len(),
        failed,
        unformatted,
        "formatting finished"
    );
    if failed > 0 || unformatted > 0 {
        process::exit(1);
    }
}

/// Format one file according to `mode`.
fn format_single_file(path: &Path, mode: Mode, config: &FormatConfig) -> Result<Outcome, FmtError> {
    let source = read_source(path)?;
    let formatted = lea::format_source(&source, config).map_err(|error| FmtError::Syntax {
        path: path.to_path_buf(),
        text: source.clone(),
        error,
    })?;
    tracing::debug!(path = %path.display(), changed = formatted != source, "formatted");

    match mode {
        Mode::Stdout => Ok(Outcome::Printed(formatted)),
        _ if formatted == source => Ok(Outcome::Unchanged),
        Mode::Check => Ok(Outcome::WouldReformat),
        Mode::Write => {
            std::fs::write(path, &formatted).map_err(|source| FmtError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Outcome::Formatted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mode_rewrites_only_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let messy = dir.path().join("messy.lea");
        let clean = dir.path().join("clean.lea");
        std::fs::write(&messy, "let  x=1").unwrap();
        std::fs::write(&clean, "let x = 1\n").unwrap();
        let config = FormatConfig::default();

        let outcome = format_single_file(&messy, Mode::Write, &config).unwrap();
        assert!(matches!(outcome, Outcome::Formatted));
        assert_eq!(std::fs::read_to_string(&messy).unwrap(), "let x = 1\n");

        let outcome = format_single_file(&clean, Mode::Write, &config).unwrap();
        assert!(matches!(outcome, Outcome::Unchanged));
    }

    #[test]
    fn test_check_mode_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.lea");
        std::fs::write(&path, "x/>f").unwrap();

        let outcome = format_single_file(&path, Mode::Check, &FormatConfig::default()).unwrap();
        assert!(matches!(outcome, Outcome::WouldReformat));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x/>f");
    }

    #[test]
    fn test_syntax_error_keeps_source_for_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.lea");
        std::fs::write(&path, "let = 1\n").unwrap();

        let err = format_single_file(&path, Mode::Stdout, &FormatConfig::default()).unwrap_err();
        match err {
            FmtError::Syntax { text, .. } => assert_eq!(text, "let = 1\n"),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }
}
