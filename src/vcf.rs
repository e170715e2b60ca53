//! SNP extraction from VCF files
//!
//! Only POS, REF, ALT, QUAL, FILTER and the first sample column are used.
//! The allele of a sample is called from its per-allele read depths (the
//! second subfield of the sample column, usually AD).
//! VCF specification: https://github.com/samtools/hts-specs

use crate::snpset::SnpSet;
use crate::utils::read_records;
use crate::{PhyloError, PhyloResult, Snp};
use std::path::Path;

/// Column indices of a VCF data line
const POS: usize = 1;
const REF: usize = 3;
const ALT: usize = 4;
const QUAL: usize = 5;
const FILTER: usize = 6;
const SAMPLE: usize = 9;

/// How the reported allele is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CallingMode {
    /// Call the allele with the most reads, rejecting weak or ambiguous calls
    #[default]
    ReadDepth,
    /// No genotype calling; take the ALT column as reported
    PassThrough,
}

/// Configuration for VCF filtering
#[derive(Debug, Clone)]
pub struct VcfConfig {
    /// Minimum QUAL for lines that did not PASS. +inf admits only PASS lines.
    pub quality: f64,
    /// Report only calls that differ from REF
    pub mutations_only: bool,
    /// Minimum reads for the called allele
    pub min_reads: u32,
    /// Minimum ratio of called allele reads to any other nonzero allele reads
    pub ratio: u32,
    pub calling: CallingMode,
}

impl Default for VcfConfig {
    fn default() -> Self {
        Self {
            quality: f64::INFINITY,
            mutations_only: true,
            min_reads: 3,
            ratio: 3,
            calling: CallingMode::ReadDepth,
        }
    }
}

/// Validate VCF filtering parameters
pub fn validate_vcf_config(config: &VcfConfig) -> PhyloResult<()> {
    if config.quality.is_nan() {
        return Err(PhyloError::InvalidConfig(
            "quality must be a number or inf".to_string(),
        ));
    }
    if config.calling == CallingMode::ReadDepth && config.ratio == 0 {
        log::warn!("ratio=0 disables the ambiguity check for read depth calling");
    }
    Ok(())
}

/// Call the allele supported by the reads.
///
/// `reads[i]` counts the reads for `alleles[i]`. The allele with the most
/// reads wins if it has at least `min_reads` and outnumbers every other
/// allele with reads by at least `ratio` (integer division). Multi-base
/// winners are rejected.
pub fn call_allele<'a>(
    alleles: &[&'a str],
    reads: &[u32],
    min_reads: u32,
    ratio: u32,
) -> Option<&'a str> {
    let mut max = 0;
    let mut i_max = 0;
    for (i, &r) in reads.iter().enumerate() {
        if r > max {
            max = r;
            i_max = i;
        }
    }
    if max < min_reads {
        return None;
    }

    let ambiguous = reads
        .iter()
        .enumerate()
        .any(|(i, &r)| r != 0 && i != i_max && max / r < ratio);
    if ambiguous {
        return None;
    }

    let allele = *alleles.get(i_max)?;
    (allele.len() == 1).then_some(allele)
}

/// Convert the fields of one VCF data line into an SNP.
///
/// Returns `None` for indels, lines failing the quality gate, malformed
/// lines and (in read depth mode) weak or ambiguous calls.
pub fn snp_from_fields(fields: &[&str], config: &VcfConfig) -> Option<Snp> {
    if fields.len() < SAMPLE + 1 || fields[REF].len() != 1 {
        return None;
    }

    let quality = fields[QUAL].parse::<f64>().ok()?;
    if fields[FILTER] != "PASS" && quality < config.quality {
        return None;
    }
    let pos = fields[POS].parse::<u64>().ok()?;
    let ref_allele = fields[REF];

    let called = match config.calling {
        CallingMode::ReadDepth => {
            let mut alleles = vec![ref_allele];
            alleles.extend(fields[ALT].split(','));

            let depths = fields[SAMPLE].split(':').nth(1)?;
            let mut reads = vec![0u32; alleles.len()];
            for (i, depth) in depths.split(',').enumerate() {
                *reads.get_mut(i)? = depth.parse::<u32>().ok()?;
            }
            call_allele(&alleles, &reads, config.min_reads, config.ratio)?
        }
        CallingMode::PassThrough => {
            let alt = fields[ALT];
            if alt.len() != 1 || alt == "." {
                return None;
            }
            alt
        }
    };

    if config.mutations_only && called == ref_allele {
        return None;
    }
    Some(Snp::new(pos, ref_allele, called))
}

/// Read SNPs from a VCF file
pub fn read_vcf<P: AsRef<Path>>(path: P, config: &VcfConfig) -> PhyloResult<SnpSet> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true);
    let records = read_records(&path, &builder)?;

    let snps: SnpSet = records
        .iter()
        .filter_map(|record| {
            let fields: Vec<&str> = record.iter().collect();
            let snp = snp_from_fields(&fields, config);
            if snp.is_none() {
                log::debug!("Skipping VCF line at position {:?}", fields.get(POS));
            }
            snp
        })
        .collect();

    log::info!(
        "Called {} SNPs from {} VCF lines in {:?}",
        snps.len(),
        records.len(),
        path.as_ref()
    );
    Ok(snps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn line(pos: &str, r: &str, alt: &str, qual: &str, filter: &str, sample: &str) -> Vec<String> {
        vec![
            "chrY", pos, ".", r, alt, qual, filter, "DP=51", "GT:AD", sample,
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn call(fields: &[String], config: &VcfConfig) -> Option<Snp> {
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        snp_from_fields(&fields, config)
    }

    #[test]
    fn test_call_allele_clear_winner() {
        let called = call_allele(&["A", "T", "G"], &[0, 50, 1], 3, 3);
        assert_eq!(called, Some("T"));
    }

    #[test]
    fn test_call_allele_ambiguous() {
        assert_eq!(call_allele(&["A", "T", "G"], &[0, 50, 20], 3, 3), None);
    }

    #[test]
    fn test_call_allele_uses_integer_division() {
        // 11 / 4 == 2 in integer arithmetic
        assert_eq!(call_allele(&["A", "T"], &[4, 11], 3, 3), None);
        assert_eq!(call_allele(&["A", "T"], &[4, 12], 3, 3), Some("T"));
    }

    #[test]
    fn test_call_allele_min_reads() {
        assert_eq!(call_allele(&["A", "T"], &[0, 2], 3, 3), None);
        assert_eq!(call_allele(&["A", "T"], &[0, 3], 3, 3), Some("T"));
    }

    #[test]
    fn test_call_allele_rejects_multi_base() {
        assert_eq!(call_allele(&["A", "TT"], &[0, 30], 3, 3), None);
    }

    #[test]
    fn test_pass_admits_any_quality() {
        let config = VcfConfig::default();
        let fields = line("2887824", "C", "T", "5.1", "PASS", "1:0,42");
        assert_eq!(call(&fields, &config), Some(Snp::new(2887824, "C", "T")));
    }

    #[test]
    fn test_quality_gate() {
        let config = VcfConfig {
            quality: 30.0,
            ..Default::default()
        };
        let low = line("100", "C", "T", "29", "FAIL", "1:0,42");
        assert_eq!(call(&low, &config), None);

        let high = line("100", "C", "T", "30", "FAIL", "1:0,42");
        assert_eq!(call(&high, &config), Some(Snp::new(100, "C", "T")));

        let default_config = VcfConfig::default();
        let not_passed = line("100", "C", "T", "999", "LowQual", "1:0,42");
        assert_eq!(call(&not_passed, &default_config), None);

        let missing_qual = line("100", "C", "T", ".", "PASS", "1:0,42");
        assert_eq!(call(&missing_qual, &default_config), None);
    }

    #[test]
    fn test_rejects_indels_and_short_lines() {
        let config = VcfConfig::default();
        let indel = line("100", "CA", "C", "50", "PASS", "1:0,42");
        assert_eq!(call(&indel, &config), None);

        let short: Vec<String> = line("100", "C", "T", "50", "PASS", "1:0,42")[..9].to_vec();
        assert_eq!(call(&short, &config), None);
    }

    #[test]
    fn test_mutations_only() {
        let fields = line("100", "C", "T", "50", "PASS", "0:40,0");
        assert_eq!(call(&fields, &VcfConfig::default()), None);

        let config = VcfConfig {
            mutations_only: false,
            ..Default::default()
        };
        assert_eq!(call(&fields, &config), Some(Snp::new(100, "C", "C")));
    }

    #[test]
    fn test_multi_allelic_call() {
        let config = VcfConfig::default();
        let fields = line("100", "A", "T,G", "50", "PASS", "1:0,50,1");
        assert_eq!(call(&fields, &config), Some(Snp::new(100, "A", "T")));

        let ambiguous = line("100", "A", "T,G", "50", "PASS", "1:0,50,20");
        assert_eq!(call(&ambiguous, &config), None);
    }

    #[test]
    fn test_malformed_read_counts() {
        let config = VcfConfig::default();
        let bad_count = line("100", "A", "T", "50", "PASS", "1:0,x");
        assert_eq!(call(&bad_count, &config), None);

        let too_many = line("100", "A", "T", "50", "PASS", "1:0,30,2");
        assert_eq!(call(&too_many, &config), None);

        let no_depths = line("100", "A", "T", "50", "PASS", "1");
        assert_eq!(call(&no_depths, &config), None);

        let fewer = line("100", "A", "T,G", "50", "PASS", "1:0,30");
        assert_eq!(call(&fewer, &config), Some(Snp::new(100, "A", "T")));
    }

    #[test]
    fn test_pass_through_mode() {
        let config = VcfConfig {
            calling: CallingMode::PassThrough,
            ..Default::default()
        };
        // read depths are ignored entirely
        let fields = line("100", "A", "G", "50", "PASS", "1:20,20");
        assert_eq!(call(&fields, &config), Some(Snp::new(100, "A", "G")));

        let no_alt = line("100", "A", ".", "50", "PASS", "0:20");
        assert_eq!(call(&no_alt, &config), None);

        let multi = line("100", "A", "G,T", "50", "PASS", "1:0,20,20");
        assert_eq!(call(&multi, &config), None);
    }

    #[test]
    fn test_validate_vcf_config() {
        assert!(validate_vcf_config(&VcfConfig::default()).is_ok());
        let invalid = VcfConfig {
            quality: f64::NAN,
            ..Default::default()
        };
        assert!(validate_vcf_config(&invalid).is_err());
    }

    #[test]
    fn test_read_vcf() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "##fileformat=VCFv4.2").unwrap();
        writeln!(temp_file, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tkit").unwrap();
        writeln!(temp_file, "chrY\t2887824\t.\tC\tT\t221\tPASS\tDP=40\tGT:AD\t1:0,40").unwrap();
        writeln!(temp_file, "chrY\t2887900\t.\tG\tA\t12\tLowQual\tDP=4\tGT:AD\t1:0,4").unwrap();
        writeln!(temp_file, "chrY\t2888000\t.\tGA\tG\t99\tPASS\tDP=30\tGT:AD\t1:0,30").unwrap();
        writeln!(temp_file, "chrY\t2889000\t.\tT\tC,A\t99\tPASS\tDP=31\tGT:AD\t2:1,0,30").unwrap();

        let snps = read_vcf(temp_file.path(), &VcfConfig::default()).unwrap();
        assert_eq!(snps.len(), 2);
        assert!(snps.contains(&Snp::new(2887824, "C", "T")));
        assert!(snps.contains(&Snp::new(2889000, "T", "A")));
    }
}
