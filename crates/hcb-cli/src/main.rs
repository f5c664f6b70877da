//! hcb - highlighted code blocks from the command line
//!
//! Usage: `hcb <command>`
//!
//! Commands:
//! - `highlight` - Highlight a snippet, file or stdin
//! - `languages` - List languages offered in the block's picker
//! - `themes` / `theme` - List themes, read or change the site selection
//! - `render` - Render saved post content as it is published
//! - `process` - Highlight language-tagged code blocks in an HTML tree
//! - `serve` - Serve the theme settings page and its AJAX endpoint

mod config;
mod serve;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{Config, DEFAULT_CONFIG};
use hcb::languages::normalize_language;
use hcb::{BlockAttributes, Highlighter, StaticRenderer, render_code_block};
use hcb_static::{ProcessOptions, Processor};
use hcb_theme::{AssetContext, theme_stylesheet};
use miette::{IntoDiagnostic, Result, WrapErr};
use owo_colors::OwoColorize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Highlighted code blocks: syntax highlighting, theme selection and rendering
#[derive(Debug, Parser)]
#[command(name = "hcb", version)]
struct Args {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: Utf8PathBuf,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Command {
    /// Highlight code and print the markup
    Highlight {
        /// Language id (e.g. javascript, rust, none)
        ///
        /// If omitted, language is detected from the file name or a shebang
        #[arg(short, long)]
        lang: Option<String>,

        /// Wrap the result in the block's `<pre><code>` markup
        #[arg(long)]
        block: bool,

        /// Input: code string, file name, or '-' for stdin
        input: Option<String>,
    },

    /// List the languages offered in the language picker
    Languages,

    /// List available highlight themes
    Themes,

    /// Read or change the selected highlight theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Render saved post content the way it is published
    Render {
        /// Post content file ('-' or omitted for stdin)
        input: Option<PathBuf>,

        /// Emit a complete page linking the selected theme stylesheet
        #[arg(long)]
        page: bool,
    },

    /// Highlight language-tagged code blocks in rendered HTML pages
    Process {
        /// Directory containing the pages
        input: PathBuf,

        /// Output directory (defaults to modifying input in place)
        output: Option<PathBuf>,
    },

    /// Serve the settings page, AJAX endpoint and theme stylesheets
    Serve {
        /// Address to bind to
        #[arg(short, long)]
        address: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    /// Print the selected theme slug
    Get,
    /// Select a theme by slug
    Set { slug: String },
    /// Clear the selection
    Clear,
}

fn main() {
    // Install Miette's graphical error handler for nice CLI diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.config)?;

    match args.command {
        Command::Highlight { lang, block, input } => {
            highlight(lang.as_deref(), block, input.as_deref())
        }
        Command::Languages => {
            let highlighter = Highlighter::new();
            for option in highlighter.list_languages() {
                println!("{:<14} {}", option.id.cyan(), option.display_name);
            }
            Ok(())
        }
        Command::Themes => {
            let settings = config.settings();
            let selected = settings.selected();
            let themes = settings.themes();
            if themes.is_empty() {
                eprintln!(
                    "{} No themes found in {}",
                    "Note:".yellow(),
                    settings.catalog().themes_dir().display()
                );
            }
            for theme in themes {
                let marker = if theme.slug == selected { "*" } else { " " };
                println!("{} {:<24} {}", marker.green(), theme.slug.bold(), theme.file.dimmed());
            }
            Ok(())
        }
        Command::Theme { action } => {
            let settings = config.settings();
            match action {
                ThemeAction::Get => {
                    let selected = settings.selected();
                    if selected.is_empty() {
                        eprintln!("{}", "No theme selected".dimmed());
                    } else {
                        println!("{selected}");
                    }
                }
                ThemeAction::Set { slug } => {
                    settings.set(&slug).into_diagnostic()?;
                    eprintln!("{} Selected theme {}", "✓".green(), slug.bold());
                }
                ThemeAction::Clear => {
                    settings.clear().into_diagnostic()?;
                    eprintln!("{} Cleared theme selection", "✓".green());
                }
            }
            Ok(())
        }
        Command::Render { input, page } => render(&config, input.as_deref(), page),
        Command::Process { input, output } => process(input, output, args.verbose),
        Command::Serve { address, port } => {
            let state = serve::ServerState {
                settings: config.serve_settings(),
                highlighter: Highlighter::new(),
                admin_token: config.server.admin_token.clone(),
            };
            let address = address.unwrap_or_else(|| config.server.address.clone());
            serve::serve(&state, &address, port.unwrap_or(config.server.port))
        }
    }
}

/// Read a code string, a file, or stdin. Returns the content and the file
/// name it came from, if any.
fn read_input(input: Option<&str>) -> Result<(String, Option<String>)> {
    match input {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .into_diagnostic()
                .wrap_err("failed to read stdin")?;
            Ok((buffer, None))
        }
        Some(input) => {
            let path = Path::new(input);
            if path.is_file() {
                let content = fs_err::read_to_string(path).into_diagnostic()?;
                Ok((content, Some(input.to_string())))
            } else {
                Ok((input.to_string(), None))
            }
        }
    }
}

fn highlight(lang: Option<&str>, block: bool, input: Option<&str>) -> Result<()> {
    let (content, filename) = read_input(input)?;

    let language = match lang {
        Some(lang) => lang.to_string(),
        None => filename
            .as_deref()
            .and_then(detect_from_filename)
            .or_else(|| detect_from_content(&content))
            .map(str::to_string)
            .ok_or_else(|| match &filename {
                Some(name) => miette::miette!(
                    "Could not detect language from filename: {name}. Use --lang to specify."
                ),
                None => miette::miette!("Could not detect language. Use --lang to specify."),
            })?,
    };

    let highlighter = Highlighter::new();
    if block {
        println!(
            "{}",
            render_code_block(&BlockAttributes::new(content, language), &highlighter)
        );
    } else {
        println!("{}", highlighter.highlight_html(&content, &language));
    }
    Ok(())
}

/// Detect language from a file extension, using catalog ids and aliases.
fn detect_from_filename(filename: &str) -> Option<&'static str> {
    let name = Path::new(filename).file_name()?.to_str()?;
    if name == "Makefile" || name == "GNUmakefile" {
        return Some("makefile");
    }
    let ext = Path::new(name).extension()?.to_str()?;
    normalize_language(ext).map(|def| def.id)
}

/// Detect language from content (e.g., shebang lines)
fn detect_from_content(content: &str) -> Option<&'static str> {
    let first_line = content.lines().next()?;
    let shebang = first_line.strip_prefix("#!")?.trim();

    if shebang.contains("python") {
        Some("python")
    } else if shebang.contains("node") {
        Some("javascript")
    } else if shebang.contains("ruby") {
        Some("ruby")
    } else if shebang.contains("perl") {
        Some("perl")
    } else if shebang.contains("php") {
        Some("php")
    } else if shebang.contains("bash") || shebang.contains("zsh") || shebang.contains("/sh") {
        Some("bash")
    } else {
        None
    }
}

fn render(config: &Config, input: Option<&Path>, page: bool) -> Result<()> {
    let input = input.map(|p| p.to_string_lossy().into_owned());
    let content = match input.as_deref() {
        None | Some("-") => read_input(None)?.0,
        Some(path) => fs_err::read_to_string(path).into_diagnostic()?,
    };

    let rendered = StaticRenderer::new(Highlighter::new()).render_post(&content);
    if !page {
        print!("{}", rendered.html);
        return Ok(());
    }

    let catalog = config.catalog();
    let selected = config.settings().selected();
    let links: Vec<String> = [AssetContext::Frontend, AssetContext::BlockAssets]
        .into_iter()
        .filter_map(|ctx| theme_stylesheet(&catalog, &selected, ctx, rendered.has_block))
        .map(|link| link.to_html())
        .collect();

    println!("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />");
    for link in links {
        println!("{link}");
    }
    println!("</head>\n<body>\n{}\n</body>\n</html>", rendered.html);
    Ok(())
}

fn process(input: PathBuf, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    if !input.is_dir() {
        miette::bail!("Input path is not a directory: {}", input.display());
    }

    eprintln!(
        "{} Processing pages: {}",
        "hcb".green().bold(),
        input.display()
    );
    if let Some(out) = &output {
        eprintln!("  Output: {}", out.display());
    } else {
        eprintln!("  {} Modifying in place", "Note:".yellow());
    }
    eprintln!();

    let processor = Processor::new(
        ProcessOptions {
            input_dir: input,
            output_dir: output,
            verbose,
        },
        Highlighter::new(),
    );

    let start = Instant::now();
    let stats = processor.process().into_diagnostic()?;
    let elapsed = start.elapsed();

    eprintln!("{}", "Results:".bold());
    eprintln!(
        "  {} HTML files processed",
        stats.files_processed.to_string().cyan()
    );
    eprintln!(
        "  {} code blocks highlighted",
        stats.blocks_highlighted.to_string().green()
    );
    eprintln!(
        "  {} code blocks skipped (already highlighted or none)",
        stats.blocks_skipped.to_string().yellow()
    );
    if stats.files_failed > 0 {
        eprintln!(
            "  {} files failed (see warnings above)",
            stats.files_failed.to_string().red()
        );
    }
    if !stats.unsupported_languages.is_empty() {
        eprintln!(
            "\n  {} Shown as plain text: {}",
            "Note:".yellow(),
            stats.unsupported_languages.join(", ")
        );
    }
    eprintln!(
        "\n  HTML grew {:.1}% ({:.1} MB/s)",
        stats.html_inflation_percent(),
        stats.throughput_mb_s()
    );
    eprintln!("  Completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
