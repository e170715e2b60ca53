//! Novel SNP exports from YFull
//!
//! Semicolon separated; each line carries a quality label in one of two
//! spellings ("best" or "Best qual").

use crate::snpset::SnpSet;
use crate::utils::read_records;
use crate::{PhyloResult, Snp};
use std::path::Path;

const POS: usize = 2;
const REF: usize = 3;
const ALT: usize = 4;
const QUALITY: usize = 6;

/// YFull call quality, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, clap::ValueEnum)]
pub enum YFullQuality {
    Best = 1,
    #[default]
    Acceptable = 2,
    Ambiguous = 3,
}

/// Every quality label found in YFull files
static QUALITY_LABELS: [(&str, YFullQuality); 6] = [
    ("best", YFullQuality::Best),
    ("acceptable", YFullQuality::Acceptable),
    ("ambiguous", YFullQuality::Ambiguous),
    ("Best qual", YFullQuality::Best),
    ("Acceptable qual", YFullQuality::Acceptable),
    ("Ambiguous qual", YFullQuality::Ambiguous),
];

impl YFullQuality {
    /// Quality for a label as written in a YFull file
    pub fn from_label(label: &str) -> Option<Self> {
        QUALITY_LABELS
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, quality)| *quality)
    }

    /// True if a call of this quality satisfies the `minimum` tier
    pub fn satisfies(self, minimum: YFullQuality) -> bool {
        self <= minimum
    }
}

/// Convert the fields of one YFull line into an SNP of at least `minimum`
/// quality.
pub fn snp_from_fields(fields: &[&str], minimum: YFullQuality) -> Option<Snp> {
    if fields.len() < QUALITY + 1 || fields[REF].len() != 1 || fields[ALT].len() != 1 {
        return None;
    }
    let pos = fields[POS].parse::<u64>().ok()?;

    // Unlabelled calls pass every tier
    let accepted = match YFullQuality::from_label(fields[QUALITY]) {
        Some(quality) => quality.satisfies(minimum),
        None => {
            log::warn!("Unknown YFull quality label '{}' at position {}", fields[QUALITY], pos);
            true
        }
    };
    accepted.then(|| Snp::new(pos, fields[REF], fields[ALT]))
}

/// Read SNPs of at least `minimum` quality from a YFull CSV file
pub fn read_yfull<P: AsRef<Path>>(path: P, minimum: YFullQuality) -> PhyloResult<SnpSet> {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).delimiter(b';').flexible(true);
    let records = read_records(&path, &builder)?;

    let snps: SnpSet = records
        .iter()
        .filter_map(|record| {
            let fields: Vec<&str> = record.iter().collect();
            snp_from_fields(&fields, minimum)
        })
        .collect();

    log::info!(
        "Read {} SNPs of quality {:?} or better from {:?}",
        snps.len(),
        minimum,
        path.as_ref()
    );
    Ok(snps)
}
