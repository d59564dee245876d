use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pagekeeper_core::Config;
use pagekeeper_ops::{
    create_reference, extract, organize, suggest_improvements, track_critical, validate,
    ExtractRequest, ReferenceRequest,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagekeeper")]
#[command(about = "Keeps oversized markdown knowledge bases organized", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Project directory (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    /// Source document, relative to the project directory
    #[arg(long, global = true, default_value = "CLAUDE.md")]
    source: String,

    /// Configuration file, relative to the project directory
    #[arg(long, global = true, default_value = "pagekeeper.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the source document and extract oversized sections
    Organize(OrganizeArgs),

    /// Extract an explicit line range or category, skipping thresholds
    Extract(ExtractArgs),

    /// Add or update one entry in the reference index
    #[command(name = "create-reference")]
    CreateReference(CreateReferenceArgs),

    /// Audit the project's documentation structure
    Validate(OutputArgs),

    /// Report statistics and improvement recommendations (read-only)
    Suggest(OutputArgs),

    /// Discover critical documents and synchronize their block
    #[command(name = "track-critical")]
    TrackCritical(OutputArgs),
}

#[derive(Args)]
struct OrganizeArgs {
    /// Report what would be extracted without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Extract every section classified under this category
    #[arg(long, conflicts_with_all = ["start_line", "end_line"])]
    category: Option<String>,

    /// First line of the range to extract (0-based, inclusive)
    #[arg(long, requires = "end_line")]
    start_line: Option<usize>,

    /// Last line of the range to extract (0-based, inclusive)
    #[arg(long, requires = "start_line")]
    end_line: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CreateReferenceArgs {
    /// Referenced file, project-root-relative
    reference_path: String,

    /// Title shown in the reference entry
    title: String,

    /// Category id (classified from the title when omitted)
    #[arg(long)]
    category: Option<String>,

    /// Flag the entry "READ THIS FIRST!"
    #[arg(long)]
    critical: bool,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Organize(args) => args.json,
        Commands::Extract(args) => args.json,
        Commands::CreateReference(args) => args.json,
        Commands::Validate(args) | Commands::Suggest(args) | Commands::TrackCritical(args) => {
            args.json
        }
    };
    // keep stdout clean for JSON parsing
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let root = cli.path.canonicalize().context("Invalid project path")?;
    let source = root.join(&cli.source);
    let config = Config::load(root.join(&cli.config))?;

    match cli.command {
        Commands::Organize(args) => {
            let outcome = organize(&root, &source, &config, args.dry_run);
            if args.json {
                emit_json(&outcome)?;
            } else {
                eprintln!(
                    "{} lines, {} file(s) extracted{}",
                    outcome.line_count,
                    outcome.extracted_files.len(),
                    if outcome.dry_run { " (dry run)" } else { "" }
                );
                for file in &outcome.extracted_files {
                    eprintln!("  - {}", file.display());
                }
            }
            finish(outcome.success, &outcome.errors);
        }
        Commands::Extract(args) => {
            let request = ExtractRequest {
                category: args.category,
                start_line: args.start_line,
                end_line: args.end_line,
            };
            let outcome = extract(&root, &source, &config, &request);
            if args.json {
                emit_json(&outcome)?;
            } else {
                for file in &outcome.extracted_files {
                    eprintln!("Extracted {}", file.display());
                }
            }
            finish(outcome.success, &outcome.errors);
        }
        Commands::CreateReference(args) => {
            let request = ReferenceRequest {
                path: args.reference_path,
                title: args.title,
                category: args.category,
                critical: args.critical,
            };
            let outcome = create_reference(&source, &config, &request);
            if args.json {
                emit_json(&outcome)?;
            } else if let Some(reference) = &outcome.reference {
                eprintln!("Referenced {} as {}", reference.path, reference.category);
            }
            finish(outcome.success, &outcome.errors);
        }
        Commands::Validate(args) => {
            let outcome = validate(&root, &config);
            if args.json {
                emit_json(&outcome)?;
            } else {
                eprintln!(
                    "{} file(s), {} issue(s)",
                    outcome.stats.files_scanned,
                    outcome.issues.len()
                );
                for issue in &outcome.issues {
                    let line = issue.line.map(|n| format!(":{n}")).unwrap_or_default();
                    eprintln!("  [{}] {}{line}: {}", issue.kind.as_str(), issue.file, issue.message);
                }
            }
            finish(outcome.success && outcome.valid, &outcome.errors);
        }
        Commands::Suggest(args) => {
            let outcome = suggest_improvements(&root, &source, &config);
            if args.json {
                emit_json(&outcome)?;
            } else {
                eprintln!(
                    "{} lines in {} section(s)",
                    outcome.line_count, outcome.section_count
                );
                for recommendation in &outcome.recommendations {
                    eprintln!("  - {recommendation}");
                }
            }
            finish(outcome.success, &outcome.errors);
        }
        Commands::TrackCritical(args) => {
            let outcome = track_critical(&root, &source, &config);
            if args.json {
                emit_json(&outcome)?;
            } else {
                eprintln!(
                    "{} critical document(s), {} reference(s) flagged",
                    outcome.critical.len(),
                    outcome.flagged
                );
                for reference in &outcome.critical {
                    eprintln!("  - {}", reference.path);
                }
            }
            finish(outcome.success, &outcome.errors);
        }
    }

    Ok(())
}

/// Print a serialized outcome to stdout, tolerating a closed pipe (e.g.
/// `pagekeeper validate --json | head`).
fn emit_json<T: Serialize>(outcome: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(outcome)?;
    let mut stdout = std::io::stdout().lock();
    match writeln!(stdout, "{rendered}") {
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other.map_err(Into::into),
    }
}

fn finish(success: bool, errors: &[String]) {
    for error in errors {
        eprintln!("Error: {error}");
    }
    if !success {
        std::process::exit(1);
    }
}
