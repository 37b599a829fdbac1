//! Comment line counter.
//!
//! Walks a directory tree, scans every source file of the selected language and
//! reports, per file, the total number of lines and how many of them carry an
//! inline comment or belong to a block comment. Comment markers inside string
//! literals are not counted.
//!
//! Built-in languages: C/C++ (default), C#, Go, Java, JavaScript, Rust.

mod error;
mod language;
mod scanner;

use clap::{ArgAction, Parser};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::*;
use glob::Pattern;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{CmtError, Result};
use crate::language::{LanguageSpec, BUILTIN_LANGUAGES, DEFAULT_LANGUAGE};
use crate::scanner::{scan_file, FileStats};

// Fixed width for the path column.
const PATH_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Counts inline and block comment lines per source file",
    long_about = "Counts total, inline-comment and block-comment lines for every source file under a directory. Comment markers inside string literals are ignored. Built-in languages: C/C++ (default), C#, Go, Java, JavaScript, Rust."
)]
struct Args {
    /// Directory (or single file) to scan
    #[arg(required_unless_present = "languages")]
    path: Option<PathBuf>,

    /// Language whose comment conventions are used
    #[arg(short = 'L', long, env = "CMTCOUNT_LANG", default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Skip directories whose path ends with this name (repeatable)
    #[arg(short, long, action = ArgAction::Append)]
    ignore: Vec<String>,

    /// Log every scanned file
    #[arg(short, long)]
    verbose: bool,

    /// Stop descending below this many directory levels (unlimited by default)
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Only scan files directly inside PATH
    #[arg(short = 'n', long)]
    non_recursive: bool,

    /// Only scan files whose name or relative path matches this glob
    #[arg(short = 'f', long)]
    filespec: Option<String>,

    /// Append a row summing all files
    #[arg(short, long)]
    totals: bool,

    /// Worker threads, 0 picks one per CPU
    #[arg(short, long, default_value = "0")]
    jobs: usize,

    /// List the built-in languages and exit
    #[arg(short, long)]
    languages: bool,
}

/// Walk settings shared by every level of the recursion.
struct WalkOptions<'a> {
    spec: &'static LanguageSpec,
    root: &'a Path,
    ignore: &'a [String],
    max_depth: Option<usize>,
    non_recursive: bool,
    filespec: Option<&'a Pattern>,
}

fn filespec_matches(pattern: &Pattern, root_path: &Path, file_path: &Path) -> bool {
    if file_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| pattern.matches(name))
        .unwrap_or(false)
    {
        return true;
    }

    let relative = match file_path.strip_prefix(root_path) {
        Ok(rel) => rel,
        Err(_) => return false,
    };

    let rel_str = match relative.to_str() {
        Some(s) => s.replace('\\', "/"),
        None => return false,
    };

    pattern.matches(&rel_str)
}

fn should_collect(opts: &WalkOptions<'_>, file_path: &Path) -> bool {
    opts.spec.matches_path(file_path)
        && opts
            .filespec
            .map(|pattern| filespec_matches(pattern, opts.root, file_path))
            .unwrap_or(true)
}

fn walk_directory(
    path: &Path,
    opts: &WalkOptions<'_>,
    current_depth: usize,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    if let Some(max_depth) = opts.max_depth {
        if current_depth > max_depth {
            warn!(
                "Maximum directory depth ({}) reached at {}",
                max_depth,
                path.display()
            );
            return Ok(());
        }
    }

    let read_dir = fs::read_dir(path).map_err(|err| CmtError::walk(path, err))?;
    for entry_result in read_dir {
        let entry = entry_result.map_err(|err| CmtError::walk(path, err))?;
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| CmtError::walk(&entry_path, err))?;

        if file_type.is_dir() && !file_type.is_symlink() {
            if opts.non_recursive {
                continue;
            }
            if opts.ignore.iter().any(|d| entry_path.ends_with(Path::new(d))) {
                debug!("Ignoring directory {}", entry_path.display());
                continue;
            }
            walk_directory(&entry_path, opts, current_depth + 1, files)?;
        } else if (file_type.is_file() || file_type.is_symlink())
            && should_collect(opts, &entry_path)
        {
            // Symlinked directories are never followed, but a link named like
            // a source file is read through the link.
            files.push(entry_path);
        }
    }

    Ok(())
}

/// Lists every file under `root` that belongs to `spec`, in lexicographic path order.
fn collect_source_files(
    root: &Path,
    args: &Args,
    spec: &'static LanguageSpec,
) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(CmtError::PathNotFound(root.to_path_buf()));
    }

    let filespec_pattern = match args.filespec.as_deref() {
        Some(spec) => Some(Pattern::new(spec).map_err(|source| CmtError::InvalidFilespec {
            pattern: spec.to_string(),
            source,
        })?),
        None => None,
    };

    let opts = WalkOptions {
        spec,
        root,
        ignore: &args.ignore,
        max_depth: args.max_depth,
        non_recursive: args.non_recursive,
        filespec: filespec_pattern.as_ref(),
    };

    let metadata = fs::metadata(root).map_err(|err| CmtError::walk(root, err))?;
    let mut files = Vec::new();
    if metadata.is_file() {
        if should_collect(&opts, root) {
            files.push(root.to_path_buf());
        }
    } else {
        walk_directory(root, &opts, 0, &mut files)?;
    }

    if files.is_empty() {
        return Err(CmtError::NoMatchingFiles {
            language: spec.name,
            path: root.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    Ok(files)
}

/// Scans `files` on a rayon pool. Results keep the order of `files`; the
/// first read error discards everything.
fn scan_files(
    files: &[PathBuf],
    spec: &'static LanguageSpec,
    jobs: usize,
) -> Result<Vec<(PathBuf, FileStats)>> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    pool.install(|| {
        files
            .par_iter()
            .map(|path| -> Result<(PathBuf, FileStats)> {
                let stats = scan_file(path, spec).map_err(|err| CmtError::read(path, err))?;
                debug!(
                    "{}: total={} inline={} block={}",
                    path.display(),
                    stats.total_lines,
                    stats.inline_comments,
                    stats.block_comments
                );
                Ok((path.clone(), stats))
            })
            .collect()
    })
}

fn format_path_display(path: &Path, current_dir: &Path) -> String {
    match path.strip_prefix(current_dir) {
        Ok(p) if p.as_os_str().is_empty() => ".".to_string(),
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

fn format_file_stats_line(label: &str, stats: &FileStats) -> String {
    format!(
        "{:<width$} total: {:>4}    inline: {:>3}    block: {:>3}",
        label,
        stats.total_lines,
        stats.inline_comments,
        stats.block_comments,
        width = PATH_WIDTH
    )
}

fn build_report(results: &[(PathBuf, FileStats)], current_dir: &Path, show_totals: bool) -> String {
    let mut output = String::new();
    let mut grand_total = FileStats::default();

    for (path, stats) in results {
        let display_path = format_path_display(path, current_dir);
        output.push_str(&format_file_stats_line(&display_path, stats));
        output.push('\n');
        grand_total.add(stats);
    }

    if show_totals {
        let label = format!("TOTAL ({} files)", results.len());
        let line = format_file_stats_line(&label, &grand_total);
        output.push_str(&"-".repeat(line.len()));
        output.push('\n');
        output.push_str(&line.bold().to_string());
        output.push('\n');
    }

    output
}

fn build_language_list() -> String {
    let mut output = String::from("Supported languages:\n");
    for spec in BUILTIN_LANGUAGES {
        let marker = if spec.key == DEFAULT_LANGUAGE {
            " (default)"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {:<12} {:<12} {}{}\n",
            spec.key,
            spec.name,
            spec.extension_list(),
            marker
        ));
    }
    output
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    if args.languages {
        return out
            .write_all(build_language_list().as_bytes())
            .map_err(CmtError::Output);
    }

    let spec = language::lookup(&args.lang)?;
    info!("Using {} conventions ({})", spec.name, spec.extension_list());

    let root = args.path.as_deref().unwrap_or(Path::new("."));
    let files = collect_source_files(root, args, spec)?;
    info!("Scanning {} {} files", files.len(), spec.name);

    let results = scan_files(&files, spec, args.jobs)?;
    let current_dir = env::current_dir().unwrap_or_default();
    let report = build_report(&results, &current_dir, args.totals);
    out.write_all(report.as_bytes()).map_err(CmtError::Output)?;
    out.flush().map_err(CmtError::Output)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {}", "error".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
