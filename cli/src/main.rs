//! untract CLI - document-analysis export tool

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use untract::job::{DirectoryMetadata, DirectorySink, RecordedAnalysis};
use untract::{
    export_batch, BlockGraph, Extraction, JsonFormat, LineTerminator, Pipeline, PipelineConfig,
    PollOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "untract")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Export document-analysis results to CSV and JSON", long_about = None)]
struct Cli {
    /// Analysis result JSON
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output CSV file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one or more analysis results to CSV
    Csv {
        /// Analysis result JSON files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file, or directory when several inputs are given
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Omit the byte-order mark
        #[arg(long)]
        no_bom: bool,

        /// Omit the header row
        #[arg(long)]
        no_header: bool,

        /// Line ending
        #[arg(long, value_enum, default_value = "crlf")]
        line_ending: LineEnding,
    },

    /// Print extracted key-value pairs
    Kv {
        /// Analysis result JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print query answers
    Queries {
        /// Analysis result JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Include queries without an answer
        #[arg(long)]
        all: bool,
    },

    /// Export key values and query answers as JSON
    Json {
        /// Analysis result JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show block statistics
    Info {
        /// Analysis result JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Run the full pipeline against a local directory layout
    Process {
        /// Recorded analysis result served as the finished job
        #[arg(long, value_name = "FILE")]
        analysis: PathBuf,

        /// Document key (e.g. "uploads/claim.pdf")
        #[arg(value_name = "KEY")]
        object_key: String,

        /// Root directory holding metadata and export buckets
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,

        /// Bucket the document was uploaded to
        #[arg(long, default_value = "documents")]
        bucket: String,

        /// Bucket exports are written to
        #[arg(long, env = "ANALYSIS_BUCKET_NAME", default_value = "analysis")]
        analysis_bucket: String,

        /// Bucket metadata sidecars are read from
        #[arg(long, env = "METADATA_BUCKET_NAME", default_value = "metadata")]
        metadata_bucket: String,

        /// Maximum number of job status checks
        #[arg(long, default_value = "120")]
        max_attempts: u32,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LineEnding {
    /// \r\n
    Crlf,
    /// \n
    Lf,
}

impl From<LineEnding> for LineTerminator {
    fn from(ending: LineEnding) -> Self {
        match ending {
            LineEnding::Crlf => LineTerminator::CrLf,
            LineEnding::Lf => LineTerminator::Lf,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Csv {
            inputs,
            output,
            no_bom,
            no_header,
            line_ending,
        }) => {
            let options = RenderOptions::new()
                .with_bom(!no_bom)
                .with_header(!no_header)
                .with_line_terminator(line_ending.into());
            cmd_csv(&inputs, output.as_deref(), &options)
        }
        Some(Commands::Kv { input }) => cmd_kv(&input),
        Some(Commands::Queries { input, all }) => cmd_queries(&input, all),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Process {
            analysis,
            object_key,
            root,
            bucket,
            analysis_bucket,
            metadata_bucket,
            max_attempts,
        }) => {
            let config = PipelineConfig::new(analysis_bucket, metadata_bucket)
                .with_poll_options(PollOptions::new().with_max_attempts(max_attempts));
            cmd_process(&analysis, &object_key, &root, &bucket, config)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: CSV export if input is provided
            if let Some(input) = cli.input {
                cmd_csv(&[input], cli.output.as_deref(), &RenderOptions::default())
            } else {
                println!("{}", "Usage: untract <FILE> [OUTPUT]".yellow());
                println!("       untract --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_csv_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_output.csv", stem))
}

/// Resolve where each input's CSV goes.
///
/// Fails before anything is written if two inputs would land on one path.
fn csv_output_paths(inputs: &[PathBuf], output: Option<&Path>) -> Result<Vec<PathBuf>, String> {
    let single = inputs.len() == 1;
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut paths = Vec::with_capacity(inputs.len());

    for input in inputs {
        let path = match output {
            Some(p) if single => p.to_path_buf(),
            Some(dir) => dir.join(default_csv_path(input)),
            None => default_csv_path(input),
        };
        if let Some(previous) = claimed.insert(path.clone(), input.as_path()) {
            return Err(format!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                path.display()
            ));
        }
        paths.push(path);
    }

    Ok(paths)
}

fn cmd_csv(
    inputs: &[PathBuf],
    output: Option<&Path>,
    options: &RenderOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = csv_output_paths(inputs, output)?;

    let pb = ProgressBar::new(inputs.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Loading analysis results...");
    let mut graphs = Vec::with_capacity(inputs.len());
    for input in inputs {
        graphs.push(BlockGraph::open(input)?);
        pb.inc(1);
    }

    pb.set_message("Rebuilding tables...");
    let results = export_batch(&graphs, options);
    log::debug!("Exported {} documents", results.len());
    pb.inc(1);
    pb.finish_with_message("Done!");

    if inputs.len() > 1 {
        if let Some(dir) = output {
            fs::create_dir_all(dir)?;
        }
    }

    println!("\n{}", "Output files:".green().bold());
    for (path, result) in paths.iter().zip(&results) {
        fs::write(path, &result.content)?;
        println!(
            "  {} {} ({} rows)",
            "├─".dimmed(),
            path.display(),
            result.stats.row_count
        );
    }

    Ok(())
}

fn cmd_kv(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let graph = BlockGraph::open(input)?;
    let extraction = Extraction::from_graph(&graph);

    for (key, value) in extraction.key_values.pairs() {
        println!("{}: {}", key.bold(), value);
    }

    Ok(())
}

fn cmd_queries(input: &Path, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let graph = BlockGraph::open(input)?;
    let extraction = Extraction::from_graph(&graph);

    for qa in &extraction.query_answers {
        if qa.is_answered() {
            println!("{} {}", qa.question.bold(), qa.answer);
        } else if all {
            println!("{} {}", qa.question.bold(), "(no answer)".dimmed());
        }
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let graph = BlockGraph::open(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = untract::render::to_json(&Extraction::from_graph(&graph), format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let graph = BlockGraph::open(input)?;
    let stats = Extraction::from_graph(&graph).stats();

    println!("{}", "Analysis Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Blocks".bold(), stats.block_count);
    println!("{}: {}", "Words".bold(), stats.word_count);

    println!();
    println!("{}", "Extraction Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Keys".bold(), stats.key_count);
    println!("{}: {}", "Distinct keys".bold(), stats.distinct_key_count);
    println!("{}: {}", "Values".bold(), stats.value_count);
    println!(
        "{}: {}/{}",
        "Queries answered".bold(),
        stats.answered_query_count,
        stats.query_count
    );
    println!("{}: {}", "Export rows".bold(), stats.row_count);

    Ok(())
}

fn cmd_process(
    analysis: &Path,
    object_key: &str,
    root: &Path,
    bucket: &str,
    config: PipelineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(
        RecordedAnalysis::open(analysis)?,
        DirectoryMetadata::new(root),
        DirectorySink::new(root),
        config,
    );

    let report = pipeline.process(bucket, object_key)?;

    println!("{} {}", "Job".green(), report.job_id);
    println!(
        "{} {}",
        "Saved to".green(),
        root.join(&report.output_bucket)
            .join(&report.output_key)
            .display()
    );
    println!("{}", serde_json::to_string_pretty(&report.stats)?);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "untract".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document-analysis export tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/untract".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_csv_path() {
        assert_eq!(
            default_csv_path(Path::new("scans/claim.json")),
            PathBuf::from("claim_output.csv")
        );
    }

    #[test]
    fn test_output_paths_single_input() {
        let inputs = vec![PathBuf::from("a/x.json")];
        let paths = csv_output_paths(&inputs, Some(Path::new("out.csv"))).unwrap();
        assert_eq!(paths, vec![PathBuf::from("out.csv")]);
    }

    #[test]
    fn test_output_paths_into_directory() {
        let inputs = vec![PathBuf::from("a/x.json"), PathBuf::from("a/y.json")];
        let paths = csv_output_paths(&inputs, Some(Path::new("exports"))).unwrap();
        assert_eq!(
            paths,
            vec![
                Path::new("exports").join("x_output.csv"),
                Path::new("exports").join("y_output.csv"),
            ]
        );
    }

    #[test]
    fn test_output_paths_reject_same_stem() {
        let inputs = vec![PathBuf::from("a/x.json"), PathBuf::from("b/x.json")];

        let err = csv_output_paths(&inputs, Some(Path::new("exports"))).unwrap_err();
        assert!(err.contains("a/x.json"));
        assert!(err.contains("b/x.json"));

        assert!(csv_output_paths(&inputs, None).is_err());
    }
}
