//! Processor that highlights every HTML page under a directory.

use crate::html::{TransformError, TransformResult, transform_html};
use hcb::Highlighter;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Options for the processor.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Input directory containing rendered pages.
    pub input_dir: PathBuf,
    /// Output directory (if None, modifies in place).
    pub output_dir: Option<PathBuf>,
    /// Whether to show verbose output.
    pub verbose: bool,
}

/// Statistics from processing.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    /// Number of HTML files processed.
    pub files_processed: usize,
    /// Number of HTML files that could not be processed.
    pub files_failed: usize,
    /// Number of code blocks highlighted.
    pub blocks_highlighted: usize,
    /// Number of code blocks skipped.
    pub blocks_skipped: usize,
    /// Languages that were not supported.
    pub unsupported_languages: Vec<String>,
    /// Total bytes read from input HTML files.
    pub bytes_input: u64,
    /// Total bytes written to output HTML files.
    pub bytes_output: u64,
    /// Time spent processing HTML files (excludes copy time).
    pub process_duration: Duration,
}

impl ProcessorStats {
    /// Calculate HTML inflation percentage ((output - input) / input * 100).
    pub fn html_inflation_percent(&self) -> f64 {
        if self.bytes_input == 0 {
            0.0
        } else {
            (self.bytes_output as f64 - self.bytes_input as f64) / self.bytes_input as f64 * 100.0
        }
    }

    /// Calculate processing throughput in MB/s (excludes copy time).
    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.process_duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            (self.bytes_input as f64 / (1024.0 * 1024.0)) / secs
        }
    }
}

/// Processor for a tree of rendered pages.
pub struct Processor {
    options: ProcessOptions,
    highlighter: Highlighter,
}

impl Processor {
    pub fn new(options: ProcessOptions, highlighter: Highlighter) -> Self {
        Self {
            options,
            highlighter,
        }
    }

    /// Process the input directory.
    pub fn process(&self) -> Result<ProcessorStats, ProcessError> {
        if !self.options.input_dir.is_dir() {
            return Err(ProcessError::NotADirectory(self.options.input_dir.clone()));
        }

        let output_dir = self.prepare_output()?;

        let html_files: Vec<PathBuf> = WalkDir::new(output_dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && is_page(entry.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();
        tracing::debug!(files = html_files.len(), dir = %output_dir.display(), "collected pages");

        let progress = ProgressBar::new(html_files.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} {pos}/{len} pages [{bar:40.green/white}] {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let started = Instant::now();
        let verbose = self.options.verbose;

        // One highlighter fork per rayon worker
        let mut stats = html_files
            .par_iter()
            .map_init(
                || self.highlighter.fork(),
                |highlighter, path| {
                    if verbose {
                        progress.println(format!("  {}", path.display()));
                    }
                    let page = match highlight_page(path, highlighter) {
                        Ok(page) => page,
                        Err(e) => {
                            tracing::warn!(path = %path.display(), "skipping page: {e}");
                            PageOutcome::Failed
                        }
                    };
                    progress.inc(1);
                    ProcessorStats::from(page)
                },
            )
            .reduce(ProcessorStats::default, ProcessorStats::merge);

        progress.finish_and_clear();
        stats.unsupported_languages.sort();
        stats.unsupported_languages.dedup();
        stats.process_duration = started.elapsed();
        Ok(stats)
    }
}

impl Processor {
    /// Directory the pages are highlighted in. A separate output directory
    /// is replaced by a fresh copy of the input first; it may not contain
    /// the input or sit inside it.
    fn prepare_output(&self) -> Result<&Path, ProcessError> {
        let input = self.options.input_dir.as_path();
        let Some(output) = self.options.output_dir.as_deref() else {
            return Ok(input);
        };

        let input_abs = resolve(input)?;
        let output_abs = resolve(output)?;
        if input_abs == output_abs {
            return Ok(input);
        }
        if input_abs.starts_with(&output_abs) || output_abs.starts_with(&input_abs) {
            return Err(ProcessError::OverlappingOutput {
                input: input_abs,
                output: output_abs,
            });
        }

        if output.exists() {
            fs_err::remove_dir_all(output)?;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Copying {}", input.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        copy_tree(input, output)?;
        spinner.finish_and_clear();
        Ok(output)
    }
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the remaining components appended.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut missing = Vec::new();
    let mut existing = path.as_path();
    while !existing.exists() {
        let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
            break;
        };
        missing.push(name.to_os_string());
        existing = parent;
    }
    let mut resolved = fs_err::canonicalize(existing)?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

fn is_page(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// What happened to one page.
enum PageOutcome {
    Done {
        result: TransformResult,
        bytes_in: u64,
        bytes_out: u64,
    },
    Failed,
}

impl From<PageOutcome> for ProcessorStats {
    fn from(page: PageOutcome) -> Self {
        match page {
            PageOutcome::Done {
                result,
                bytes_in,
                bytes_out,
            } => ProcessorStats {
                files_processed: 1,
                blocks_highlighted: result.blocks_highlighted,
                blocks_skipped: result.blocks_skipped,
                unsupported_languages: result.unsupported_languages,
                bytes_input: bytes_in,
                bytes_output: bytes_out,
                ..Default::default()
            },
            PageOutcome::Failed => ProcessorStats {
                files_failed: 1,
                ..Default::default()
            },
        }
    }
}

impl ProcessorStats {
    fn merge(mut self, other: ProcessorStats) -> ProcessorStats {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.blocks_highlighted += other.blocks_highlighted;
        self.blocks_skipped += other.blocks_skipped;
        self.unsupported_languages.extend(other.unsupported_languages);
        self.bytes_input += other.bytes_input;
        self.bytes_output += other.bytes_output;
        self
    }
}

/// Highlight one page in place. Pages without tagged code are never parsed,
/// and pages where nothing changed are not rewritten.
fn highlight_page(path: &Path, highlighter: &Highlighter) -> Result<PageOutcome, ProcessError> {
    let html = fs_err::read_to_string(path)?;
    let bytes_in = html.len() as u64;

    if !html.contains("language-") {
        return Ok(PageOutcome::Done {
            result: TransformResult::default(),
            bytes_in,
            bytes_out: bytes_in,
        });
    }

    let (transformed, result) = transform_html(&html, highlighter)?;
    let bytes_out = if result.blocks_highlighted > 0 {
        fs_err::write(path, &transformed)?;
        transformed.len() as u64
    } else {
        bytes_in
    };
    Ok(PageOutcome::Done {
        result,
        bytes_in,
        bytes_out,
    })
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), ProcessError> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs_err::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs_err::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Errors that can occur during processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("input is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error(
        "output directory {} overlaps input directory {}",
        .output.display(),
        .input.display()
    )]
    OverlappingOutput { input: PathBuf, output: PathBuf },
}
