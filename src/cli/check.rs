use std::path::{Path, PathBuf};
use std::process;

use clap::Args;
use rayon::prelude::*;

use super::{read_source, resolve_lea_files, FmtError};

#[derive(Args)]
pub struct CheckArgs {
    /// Input .lea file or directory (defaults to current directory)
    pub input: Option<PathBuf>,
}

pub fn cmd_check(args: CheckArgs) {
    let input = args.input.unwrap_or_else(|| PathBuf::from("."));
    let files = resolve_lea_files(&input);
    if files.is_empty() {
        eprintln!("No .lea files found in '{}'", input.display());
        return;
    }

    let results: Vec<(&PathBuf, Result<(), FmtError>)> = files
        .par_iter()
        .map(|file| (file, check_single_file(file)))
        .collect();

    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(()) => eprintln!("OK: {}", path.display()),
            Err(e) => {
                failed += 1;
                e.report();
            }
        }
    }

    tracing::info!(files = files.len(), failed, "check finished");
    if failed > 0 {
        process::exit(1);
    }
}

fn check_single_file(path: &Path) -> Result<(), FmtError> {
    let source = read_source(path)?;
    match lea::parse_source(&source, 0) {
        Ok(program) => {
            tracing::debug!(
                path = %path.display(),
                statements = program.statements.len(),
                "parsed"
            );
            Ok(())
        }
        Err(error) => Err(FmtError::Syntax {
            path: path.to_path_buf(),
            text: source,
            error,
        }),
    }
}
