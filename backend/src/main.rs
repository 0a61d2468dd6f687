//! Gradebook CLI - Turn an LMS gradebook export into a formatted report
//!
//! # Main Commands
//!
//! ```bash
//! gradebook transform export.csv --teacher "Ms. Vega" --language es
//! gradebook serve                  # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! gradebook inspect export.csv     # Show how each column is classified
//! gradebook parse export.csv       # Just parse CSV to JSON
//! gradebook default-config         # Print the built-in column rules
//! ```

use clap::{Parser, Subcommand};
use gradebook::{
    parse_csv_file_auto, plan_columns, process_file, ExportFormat, GradebookRequest, Language,
    ReportMetadata, TransformConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(about = "Format LMS gradebook exports with category averages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → cleaned, averaged, styled workbook
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Teacher name for the header block
        #[arg(long, default_value = "")]
        teacher: String,

        /// Subject for the header block
        #[arg(long, default_value = "")]
        subject: String,

        /// Grade level for the header block
        #[arg(long, default_value = "")]
        grade: String,

        /// Term or period for the header block
        #[arg(long, default_value = "")]
        term: String,

        /// Output language (en, es)
        #[arg(short, long, default_value = "en")]
        language: Language,

        /// Output format (xlsx, csv)
        #[arg(short, long, default_value = "xlsx")]
        format: ExportFormat,

        /// Output file (default: input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column rules JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show each column's classification and the output column order
    Inspect {
        /// Input CSV file
        input: PathBuf,

        /// Output language (en, es)
        #[arg(short, long, default_value = "en")]
        language: Language,

        /// Column rules JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Parse a CSV file and output JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the built-in column rules as JSON
    DefaultConfig,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Column rules JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform {
            input,
            teacher,
            subject,
            grade,
            term,
            language,
            format,
            output,
            config,
        } => {
            let request = GradebookRequest {
                metadata: ReportMetadata {
                    teacher,
                    subject,
                    grade,
                    term,
                },
                language,
                format,
            };
            cmd_transform(&input, output.as_deref(), &request, config.as_deref())
        }

        Commands::Inspect {
            input,
            language,
            config,
        } => cmd_inspect(&input, language, config.as_deref()),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::DefaultConfig => cmd_default_config(),

        Commands::Serve { port, config } => cmd_serve(port, config.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    request: &GradebookRequest,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = TransformConfig::resolve(config)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(request.format.extension()));

    if output == input {
        return Err(format!("Output would overwrite the input: {}", input.display()).into());
    }

    let result = process_file(input, &output, request, &config)?;

    eprintln!(
        "\nDone: {} students, {} columns, {} category averages",
        result.csv_info.row_count,
        result.gradebook.table.column_count(),
        result.gradebook.average_columns.len()
    );
    Ok(())
}

fn cmd_inspect(
    input: &Path,
    language: Language,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = TransformConfig::resolve(config)?;
    let parsed = parse_csv_file_auto(input)?;

    eprintln!("Inspecting: {}", input.display());
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(parsed.delimiter));
    eprintln!("   Rows: {}", parsed.table.row_count());

    let plan = plan_columns(parsed.table.headers(), &config, language)?;

    println!("\nColumns:");
    for column in &plan.classified {
        println!("  {:>3}  {:<40} {}", column.index, column.name, column.class.label());
    }

    println!("\nOutput order:");
    for (i, name) in plan.output_columns().iter().enumerate() {
        println!("  {:>3}  {}", i, name);
    }
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.table.headers().join(", "));
    eprintln!("Parsed {} rows", result.table.row_count());

    let json = serde_json::to_string_pretty(&result.table)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_default_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", TransformConfig::default().to_json()?);
    Ok(())
}

async fn cmd_serve(port: u16, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = TransformConfig::resolve(config)?;
    gradebook::server::start_server(port, config).await
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
