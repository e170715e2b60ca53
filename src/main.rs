//! CLI binary for phylosnip - SNP extraction, set operations and lookups

use clap::{Parser, Subcommand};
use env_logger::Env;
use phylosnip_rs::{
    commands::{
        self, DifferenceArgs, FilterArgs, FilterFtdnaArgs, FilterVcfArgs, FilterYFullArgs,
        LookupArgs, SetArgs,
    },
    PhyloError, PhyloResult,
};

#[derive(Parser)]
#[command(name = "phylosnip")]
#[command(about = "A bundle of tools for Y-chromosome SNP files")]
#[command(long_about = "
phylosnip extracts SNPs from VCF files and from the CSV exports of FTDNA and
YFull, and combines SNP lists with set operations.

SNP lists are written as simple CSV files with one Pos,Ref,Alt entry per line.
If no output is given, results are printed to standard output. Inputs that
are directories are processed file by file.
")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract SNPs from VCF files
    #[command(name = "filtervcf")]
    FilterVcf(FilterVcfArgs),
    /// Extract SNPs from FTDNA CSV files
    #[command(name = "filterftdna")]
    FilterFtdna(FilterFtdnaArgs),
    /// Extract SNPs from YFull novel SNP files
    #[command(name = "filteryfull")]
    FilterYFull(FilterYFullArgs),
    /// Unite SNPs from CSV files
    Union(SetArgs),
    /// Intersect SNPs from CSV files
    Intersection(SetArgs),
    /// SNPs from the ain files that are not in the bin files
    Difference(DifferenceArgs),
    /// Add ISOGG database information to SNP CSV files
    Lookup(LookupArgs),
    /// Remove excluded SNPs and SNPs outside BED regions
    Filter(FilterArgs),
}

fn run() -> PhyloResult<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    match &cli.command {
        Command::FilterVcf(args) => commands::filter_vcf(args),
        Command::FilterFtdna(args) => commands::filter_ftdna(args),
        Command::FilterYFull(args) => commands::filter_yfull(args),
        Command::Union(args) => commands::union(args),
        Command::Intersection(args) => commands::intersection(args),
        Command::Difference(args) => commands::difference(args),
        Command::Lookup(args) => commands::lookup(args),
        Command::Filter(args) => commands::filter(args),
    }
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: PhyloError) -> ! {
    match error {
        PhyloError::FileNotFound(path) => {
            eprintln!("Error: Unknown file: {}", path);
            eprintln!("Please check that the file exists and is readable.");
        }
        PhyloError::MalformedInput { path, message } => {
            eprintln!("Error: Malformed input in {}: {}", path, message);
            eprintln!("Please check that the file has the expected format.");
        }
        PhyloError::InvalidPosition { path, value } => {
            eprintln!("Error: Parsing SNP position '{}' in {}", value, path);
            eprintln!("SNP CSV files must contain Pos,Ref,Alt with a numeric position.");
        }
        PhyloError::InvalidConfig(msg) => {
            eprintln!("Error: Invalid configuration: {}", msg);
            eprintln!("Run with --help to see the available parameters.");
        }
        PhyloError::Io(ref e) => {
            eprintln!("Error: I/O error: {}", e);
            eprintln!("Please check file permissions and disk space.");
        }
        PhyloError::Csv(ref e) => {
            eprintln!("Error: CSV processing error: {}", e);
            eprintln!("Please check the output file format.");
        }
    }
    std::process::exit(1);
}

fn main() {
    if let Err(e) = run() {
        handle_error(e);
    }
}
