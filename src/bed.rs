//! Y-chromosome regions from BED files
//!
//! Format description: http://genome.ucsc.edu/FAQ/FAQformat#format1

use crate::utils::read_records;
use crate::PhyloResult;
use std::path::Path;

/// Half-open interval `[start, end)` on the Y chromosome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BedRegion {
    pub start: u64,
    pub end: u64,
}

impl BedRegion {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn includes(&self, pos: u64) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Region described by a BED line, if the line describes one
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        if fields.len() < 3 || !fields[0].starts_with("chrY") {
            return None;
        }
        let start = fields[1].parse::<u64>().ok()?;
        let end = fields[2].parse::<u64>().ok()?;
        Some(Self::new(start, end))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BedRegions {
    regions: Vec<BedRegion>,
}

impl BedRegions {
    /// True if any region contains `pos`
    pub fn includes(&self, pos: u64) -> bool {
        self.regions.iter().any(|region| region.includes(pos))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl From<Vec<BedRegion>> for BedRegions {
    fn from(regions: Vec<BedRegion>) -> Self {
        Self { regions }
    }
}

/// Read chrY regions from a BED file. Track lines, other chromosomes and
/// anything else that is not a region are skipped.
pub fn read_bed<P: AsRef<Path>>(path: P) -> PhyloResult<BedRegions> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true);
    let records = read_records(&path, &builder)?;

    let regions: Vec<BedRegion> = records
        .iter()
        .filter_map(|record| {
            let fields: Vec<&str> = record.iter().collect();
            BedRegion::from_fields(&fields)
        })
        .collect();

    log::info!(
        "Read {} regions from {} BED lines in {:?}",
        regions.len(),
        records.len(),
        path.as_ref()
    );
    Ok(BedRegions::from(regions))
}
