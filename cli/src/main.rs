//! vsxlsx CLI - read one worksheet of an XLSX file as JSON rows.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use vsxlsx::{ColumnRef, JsonFormat, ParseOptions, ParseResult};

/// XLSX worksheet rows as JSON
#[derive(Parser)]
#[command(
    name = "vsxlsx",
    version,
    about = "Read XLSX worksheets as header-keyed rows",
    long_about = "vsxlsx - read one worksheet of an XLSX workbook.\n\n\
                  Rows are keyed by the (normalized) header row, or by column\n\
                  letters when the sheet has no header row."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that parses a sheet.
#[derive(clap::Args)]
struct SheetArgs {
    /// Input file path
    input: PathBuf,

    /// Worksheet number (1-based)
    #[arg(short, long, default_value = "1")]
    sheet: u32,

    /// Treat the first row as data and name columns a, b, c, ...
    #[arg(long)]
    no_header: bool,

    /// Override a column name, e.g. `--header 0=id` or `--header C=date`
    #[arg(long = "header", value_name = "COL=NAME", value_parser = parse_override)]
    headers: Vec<(ColumnRef, String)>,

    /// Include the source row number as `__row_number`
    #[arg(short, long)]
    row_numbers: bool,

    /// Directory to extract into (must exist; default: system temp dir)
    #[arg(long)]
    tmp_dir: Option<PathBuf>,
}

impl SheetArgs {
    fn options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_sheet(self.sheet)
            .with_header_row(!self.no_header)
            .with_header_overrides(self.headers.clone())
            .with_row_numbers(self.row_numbers);
        if let Some(ref dir) = self.tmp_dir {
            options = options.with_tmp_dir(dir);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print parsed rows as JSON
    Rows {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show headers, row count and errors for a sheet
    Info {
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// Show version information
    Version,
}

fn parse_override(s: &str) -> Result<(ColumnRef, String), String> {
    let (column, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COL=NAME, got {:?}", s))?;
    let column = ColumnRef::from(column);
    column.resolve().map_err(|e| e.to_string())?;
    Ok((column, name.to_string()))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Rows {
            sheet,
            output,
            compact,
        } => {
            let result = parse_with_spinner(&sheet)?;

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = result.rows_to_json(format)?;
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Wrote {} rows: {}",
                    "✓".green().bold(),
                    result.rows.len(),
                    path.display()
                );
            }
        }

        Commands::Info { sheet } => {
            let result = parse_with_spinner(&sheet)?;

            println!("{}", "Worksheet Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                sheet.input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Sheet".bold(), sheet.sheet);
            println!("{}: {}", "Rows".bold(), result.rows.len());

            match result.headers {
                Some(ref table) => {
                    let names: Vec<_> = table.names().collect();
                    println!("{}: {}", "Headers".bold(), names.join(", "));
                }
                None if sheet.no_header => {
                    println!("{}: {}", "Headers".bold(), "column letters".dimmed());
                }
                None => {
                    println!("{}: {}", "Headers".bold(), "none found".yellow());
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Parse a sheet, printing collected errors and failing if the parse did.
fn parse_with_spinner(args: &SheetArgs) -> Result<ParseResult, Box<dyn std::error::Error>> {
    let pb = create_spinner("Parsing worksheet...");
    let result = vsxlsx::parse_file_with_options(&args.input, args.options());
    pb.finish_and_clear();

    for error in &result.errors {
        eprintln!("{} {}", "!".yellow().bold(), error);
    }

    if !result.success {
        return Err(format!("could not parse {}", args.input.display()).into());
    }
    Ok(result)
}

fn print_version() {
    println!("{} {}", "vsxlsx".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Read XLSX worksheets as header-keyed rows");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
