//! Subcommands of the `phylosnip` binary
//!
//! Each command resolves its input and output files, runs the parsers and
//! set operations and writes CSV. The first error aborts the command.

use crate::bed::{read_bed, BedRegions};
use crate::ftdna::{read_ftdna_csv, FtdnaOptions};
use crate::isogg::Db;
use crate::output::{write_csv_records, write_snp_csv};
use crate::snpset::{read_snp_csv, read_union, SnpSet};
use crate::utils::{
    in_to_out_filenames, log_progress, parameter_to_filenames, validate_file_readable,
    FileMapping, Timer,
};
use crate::vcf::{read_vcf, validate_vcf_config, CallingMode, VcfConfig};
use crate::yfull::{read_yfull, YFullQuality};
use crate::{PhyloError, PhyloResult};
use clap::{ArgAction, Args};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct FilterVcfArgs {
    /// VCF file or directory of VCF files
    #[arg(long = "in", value_name = "FILE|DIR")]
    pub input: PathBuf,

    /// Output CSV file, or directory when the input is a directory
    #[arg(long = "out", value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Minimum QUAL for calls that did not PASS; inf admits only PASS calls
    #[arg(long, default_value_t = f64::INFINITY)]
    pub quality: f64,

    /// Report only mutations
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub mutations_only: bool,

    /// Minimum number of reads for the called allele
    #[arg(long, default_value_t = 3)]
    pub reads: u32,

    /// Minimum ratio of called allele reads to other allele reads
    #[arg(long, default_value_t = 3)]
    pub ratio: u32,

    /// How alleles are called
    #[arg(long, value_enum, default_value_t = CallingMode::ReadDepth)]
    pub calling: CallingMode,
}

impl FilterVcfArgs {
    pub fn config(&self) -> VcfConfig {
        VcfConfig {
            quality: self.quality,
            mutations_only: self.mutations_only,
            min_reads: self.reads,
            ratio: self.ratio,
            calling: self.calling,
        }
    }
}

#[derive(Args, Debug)]
pub struct FilterFtdnaArgs {
    /// FTDNA CSV file or directory
    #[arg(long = "in", value_name = "FILE|DIR")]
    pub input: PathBuf,

    #[arg(long = "out", value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Report only mutations
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub mutations_only: bool,

    /// Report only novel variants
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    pub novels_only: bool,

    /// ISOGG SNP database in CSV format, used for comments and missing positions
    #[arg(long, value_name = "FILE")]
    pub isoggdb: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FilterYFullArgs {
    /// YFull novel SNP CSV file or directory
    #[arg(long = "in", value_name = "FILE|DIR")]
    pub input: PathBuf,

    #[arg(long = "out", value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Minimum quality for the output
    #[arg(long, value_enum, default_value_t = YFullQuality::Acceptable)]
    pub quality: YFullQuality,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Comma separated list of SNP CSV files and directories
    #[arg(long = "in", value_name = "FILES")]
    pub input: String,

    #[arg(long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DifferenceArgs {
    /// SNP CSV files and directories forming set a
    #[arg(long = "ain", value_name = "FILES")]
    pub a_input: String,

    /// SNP CSV files and directories forming set b
    #[arg(long = "bin", value_name = "FILES")]
    pub b_input: String,

    #[arg(long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// SNP CSV file or directory
    #[arg(long = "in", value_name = "FILE|DIR")]
    pub input: PathBuf,

    #[arg(long = "out", value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// ISOGG SNP database in CSV format
    #[arg(long, value_name = "FILE")]
    pub isoggdb: PathBuf,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// SNP CSV file or directory
    #[arg(long = "in", value_name = "FILE|DIR")]
    pub input: PathBuf,

    #[arg(long = "out", value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Keep only SNPs inside the chrY regions of this BED file
    #[arg(long, value_name = "FILE")]
    pub bed: Option<PathBuf>,

    /// SNP CSV file listing SNPs to remove
    #[arg(long, value_name = "FILE")]
    pub exclude: Option<PathBuf>,
}

/// Input and output must not name the same path
fn check_distinct(input: &Path, output: Option<&Path>) -> PhyloResult<()> {
    if output == Some(input) {
        return Err(PhyloError::InvalidConfig(
            "parameters in and out may not be identical".to_string(),
        ));
    }
    Ok(())
}

fn resolve_files(
    input: &Path,
    in_ext: &str,
    output: Option<&Path>,
    out_ext: &str,
) -> PhyloResult<Vec<FileMapping>> {
    check_distinct(input, output)?;
    let mappings = in_to_out_filenames(input, in_ext, output, out_ext)?;
    if mappings.is_empty() {
        log::warn!("No .{} files found in {:?}", in_ext, input);
    }
    Ok(mappings)
}

fn resolve_list(parameter: &str, name: &str) -> PhyloResult<Vec<PathBuf>> {
    let filenames = parameter_to_filenames(parameter, "csv")?;
    if filenames.is_empty() {
        return Err(PhyloError::InvalidConfig(format!(
            "no files found for parameter {}",
            name
        )));
    }
    Ok(filenames)
}

/// Extract SNPs from VCF files
pub fn filter_vcf(args: &FilterVcfArgs) -> PhyloResult<()> {
    let config = args.config();
    validate_vcf_config(&config)?;
    log::info!(
        "VCF configuration: quality={}, mutations_only={}, reads={}, ratio={}, calling={:?}",
        config.quality,
        config.mutations_only,
        config.min_reads,
        config.ratio,
        config.calling
    );

    let mappings = resolve_files(&args.input, "vcf", args.output.as_deref(), "csv")?;
    for (i, (input, output)) in mappings.iter().enumerate() {
        let _timer = Timer::new(&format!("Filtering {}", input.display()));
        let snps = read_vcf(input, &config)?;
        write_snp_csv(&snps, output.as_deref())?;
        log_progress(i + 1, mappings.len(), "Processed VCF files");
    }
    Ok(())
}

/// Extract SNPs from FTDNA CSV files, optionally annotated from ISOGG
pub fn filter_ftdna(args: &FilterFtdnaArgs) -> PhyloResult<()> {
    let options = FtdnaOptions {
        mutations_only: args.mutations_only,
        novels_only: args.novels_only,
    };
    let db = args.isoggdb.as_ref().map(load_db).transpose()?;

    let mappings = resolve_files(&args.input, "csv", args.output.as_deref(), "csv")?;
    for (i, (input, output)) in mappings.iter().enumerate() {
        let records = read_ftdna_csv(input, &options, db.as_ref())?;
        write_csv_records(&records, output.as_deref())?;
        log_progress(i + 1, mappings.len(), "Processed FTDNA files");
    }
    Ok(())
}

/// Extract SNPs of a minimum quality from YFull files
pub fn filter_yfull(args: &FilterYFullArgs) -> PhyloResult<()> {
    let mappings = resolve_files(&args.input, "csv", args.output.as_deref(), "csv")?;
    for (i, (input, output)) in mappings.iter().enumerate() {
        let snps = read_yfull(input, args.quality)?;
        write_snp_csv(&snps, output.as_deref())?;
        log_progress(i + 1, mappings.len(), "Processed YFull files");
    }
    Ok(())
}

/// Union of all SNPs in the listed files
pub fn union(args: &SetArgs) -> PhyloResult<()> {
    let filenames = parameter_to_filenames(&args.input, "csv")?;
    let snps = read_union(&filenames)?;
    log::info!("Union of {} files has {} SNPs", filenames.len(), snps.len());
    write_snp_csv(&snps, args.output.as_deref())
}

/// SNPs present in every listed file
pub fn intersection(args: &SetArgs) -> PhyloResult<()> {
    let filenames = resolve_list(&args.input, "in")?;
    let mut snps = read_snp_csv(&filenames[0])?;
    for filename in &filenames[1..] {
        snps.intersection(&read_snp_csv(filename)?);
    }
    log::info!(
        "Intersection of {} files has {} SNPs",
        filenames.len(),
        snps.len()
    );
    write_snp_csv(&snps, args.output.as_deref())
}

/// SNPs of the a files that are absent from all b files
pub fn difference(args: &DifferenceArgs) -> PhyloResult<()> {
    let a_files = resolve_list(&args.a_input, "ain")?;
    let b_files = resolve_list(&args.b_input, "bin")?;

    let mut snps = read_union(&a_files)?;
    let b = read_union(&b_files)?;
    snps.difference(&b);
    log::info!("Difference a\\b has {} SNPs", snps.len());
    write_snp_csv(&snps, args.output.as_deref())
}

/// Annotate SNP CSV files with ISOGG names and comments
pub fn lookup(args: &LookupArgs) -> PhyloResult<()> {
    let db = load_db(&args.isoggdb)?;

    let mappings = resolve_files(&args.input, "csv", args.output.as_deref(), "csv")?;
    for (i, (input, output)) in mappings.iter().enumerate() {
        let snps = read_snp_csv(input)?;
        let records = db.annotate(&snps);
        let named = records.iter().filter(|r| !r.name.is_empty()).count();
        log::info!("{} of {} SNPs in {:?} are known to ISOGG", named, records.len(), input);
        write_csv_records(&records, output.as_deref())?;
        log_progress(i + 1, mappings.len(), "Processed lookup files");
    }
    Ok(())
}

/// Remove excluded SNPs and SNPs outside BED regions
pub fn filter(args: &FilterArgs) -> PhyloResult<()> {
    let regions: Option<BedRegions> = args.bed.as_ref().map(read_bed).transpose()?;
    let exclude: Option<SnpSet> = args.exclude.as_ref().map(read_snp_csv).transpose()?;

    let mappings = resolve_files(&args.input, "csv", args.output.as_deref(), "csv")?;
    for (i, (input, output)) in mappings.iter().enumerate() {
        let mut snps = read_snp_csv(input)?;
        let before = snps.len();
        if let Some(exclude) = &exclude {
            snps.difference(exclude);
        }
        if let Some(regions) = &regions {
            snps.retain_in_regions(regions);
        }
        log::info!("Kept {} of {} SNPs from {:?}", snps.len(), before, input);
        write_snp_csv(&snps, output.as_deref())?;
        log_progress(i + 1, mappings.len(), "Processed filter files");
    }
    Ok(())
}

fn load_db<P: AsRef<Path>>(path: P) -> PhyloResult<Db> {
    validate_file_readable(&path)?;
    let _timer = Timer::new("Loading ISOGG database");
    let db = Db::from_isogg_csv(path)?;
    if db.is_empty() {
        log::warn!("ISOGG database is empty");
    }
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Snp;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_union_intersection_difference() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "1,A,G\r\n2,C,T\r\n3,G,A\r\n");
        let b = write(dir.path(), "b.csv", "2,C,T\r\n3,G,A\r\n4,T,C\r\n");
        let list = format!("{},{}", a.display(), b.display());

        let out = dir.path().join("out").join("union.csv");
        union(&SetArgs {
            input: list.clone(),
            output: Some(out.clone()),
        })
        .unwrap();
        assert_eq!(read_snp_csv(&out).unwrap().len(), 4);

        let out = dir.path().join("out").join("intersection.csv");
        intersection(&SetArgs {
            input: list,
            output: Some(out.clone()),
        })
        .unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "2,C,T\r\n3,G,A\r\n"
        );

        let out = dir.path().join("out").join("difference.csv");
        difference(&DifferenceArgs {
            a_input: a.display().to_string(),
            b_input: b.display().to_string(),
            output: Some(out.clone()),
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "1,A,G\r\n");
    }

    #[test]
    fn test_intersection_requires_files() {
        let dir = tempdir().unwrap();
        let args = SetArgs {
            input: dir.path().display().to_string(),
            output: None,
        };
        assert!(matches!(
            intersection(&args),
            Err(PhyloError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_filter_vcf_directory() {
        let in_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        write(
            in_dir.path(),
            "kit.vcf",
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tkit\n\
             chrY\t2887824\t.\tC\tT\t221\tPASS\t.\tGT:AD\t1:0,40\n\
             chrY\t2887900\t.\tG\tA\t12\tLowQual\t.\tGT:AD\t1:0,4\n",
        );

        let args = FilterVcfArgs {
            input: in_dir.path().to_path_buf(),
            output: Some(out_dir.path().to_path_buf()),
            quality: f64::INFINITY,
            mutations_only: true,
            reads: 3,
            ratio: 3,
            calling: CallingMode::ReadDepth,
        };
        filter_vcf(&args).unwrap();

        let snps = read_snp_csv(out_dir.path().join("kit.csv")).unwrap();
        assert_eq!(snps.len(), 1);
        assert!(snps.contains(&Snp::new(2887824, "C", "T")));
    }

    #[test]
    fn test_identical_in_out_rejected() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "kit.csv", "");
        let args = FilterYFullArgs {
            input: input.clone(),
            output: Some(input),
            quality: YFullQuality::Acceptable,
        };
        assert!(matches!(
            filter_yfull(&args),
            Err(PhyloError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_filter_ftdna_with_db() {
        let dir = tempdir().unwrap();
        let mut isogg_fields = vec![""; 19];
        isogg_fields[3] = "20577481";
        isogg_fields[8] = "M269";
        isogg_fields[10] = "G";
        isogg_fields[11] = "A";
        isogg_fields[18] = "R1b1a1a2";
        let isogg = write(dir.path(), "isogg.txt", &(isogg_fields.join(",") + "\n"));
        let input = write(
            dir.path(),
            "bigy.csv",
            "Type,Position,SNPName,Derived,OnTree,Reference,Genotype\n\
             Known SNP,n/a,M269,Yes(+),Yes,G,A\n",
        );
        let output = dir.path().join("annotated.csv");

        filter_ftdna(&FilterFtdnaArgs {
            input,
            output: Some(output.clone()),
            mutations_only: true,
            novels_only: false,
            isoggdb: Some(isogg),
        })
        .unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "20577481,G,A,M269,\"R1b1a1a2\"\r\n"
        );
    }

    #[test]
    fn test_filter_with_bed_and_exclude() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "kit.csv", "999,A,G\r\n1000,C,T\r\n1500,G,A\r\n2000,T,C\r\n");
        let exclude = write(dir.path(), "exclude.csv", "1500,G,A\r\n");
        let bed = write(dir.path(), "regions.bed", "chrY\t1000\t2000\n");
        let output = dir.path().join("filtered.csv");

        filter(&FilterArgs {
            input,
            output: Some(output.clone()),
            bed: Some(bed),
            exclude: Some(exclude),
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "1000,C,T\r\n");
    }

    #[test]
    fn test_filter_directory() {
        let in_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        write(in_dir.path(), "a.csv", "10,A,G\r\n20,C,T\r\n");
        write(in_dir.path(), "b.csv", "20,C,T\r\n30,G,A\r\n");
        let exclude = write(out_dir.path(), "exclude.txt", "20,C,T\r\n");

        filter(&FilterArgs {
            input: in_dir.path().to_path_buf(),
            output: Some(out_dir.path().to_path_buf()),
            bed: None,
            exclude: Some(exclude),
        })
        .unwrap();
        assert_eq!(fs::read_to_string(out_dir.path().join("a.csv")).unwrap(), "10,A,G\r\n");
        assert_eq!(fs::read_to_string(out_dir.path().join("b.csv")).unwrap(), "30,G,A\r\n");
    }

    #[test]
    fn test_lookup_directory() {
        let in_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        write(in_dir.path(), "a.csv", "20577481,G,A\r\n");
        write(in_dir.path(), "b.csv", "100,C,T\r\n");
        let mut isogg_fields = vec![""; 19];
        isogg_fields[3] = "20577481";
        isogg_fields[8] = "M269";
        isogg_fields[10] = "G";
        isogg_fields[11] = "A";
        isogg_fields[18] = "R1b1a1a2";
        let isogg = write(out_dir.path(), "isogg.txt", &(isogg_fields.join(",") + "\n"));

        lookup(&LookupArgs {
            input: in_dir.path().to_path_buf(),
            output: Some(out_dir.path().to_path_buf()),
            isoggdb: isogg,
        })
        .unwrap();
        assert_eq!(
            fs::read_to_string(out_dir.path().join("a.csv")).unwrap(),
            "20577481,G,A,M269,\"R1b1a1a2\"\r\n"
        );
        assert_eq!(
            fs::read_to_string(out_dir.path().join("b.csv")).unwrap(),
            "100,C,T,,\"\"\r\n"
        );
    }

    #[test]
    fn test_lookup_requires_database() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "kit.csv", "1,A,G\r\n");
        let args = LookupArgs {
            input,
            output: None,
            isoggdb: dir.path().join("missing.csv"),
        };
        assert!(matches!(lookup(&args), Err(PhyloError::FileNotFound(_))));
    }
}
