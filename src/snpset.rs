//! SNP sets, set algebra and the simple `Pos,Ref,Alt` CSV format

use crate::bed::BedRegions;
use crate::utils::read_records_strict;
use crate::{PhyloError, PhyloResult, Snp};
use std::collections::hash_set;
use std::collections::HashSet;
use std::path::Path;

/// A set of SNP keys. All operations mutate `self` in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnpSet {
    snps: HashSet<Snp>,
}

impl SnpSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the SNP was already present
    pub fn insert(&mut self, snp: Snp) -> bool {
        self.snps.insert(snp)
    }

    pub fn contains(&self, snp: &Snp) -> bool {
        self.snps.contains(snp)
    }

    pub fn len(&self) -> usize {
        self.snps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snps.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Snp> {
        self.snps.iter()
    }

    /// SNPs ordered by position, then alleles
    pub fn sorted(&self) -> Vec<&Snp> {
        let mut snps: Vec<&Snp> = self.snps.iter().collect();
        snps.sort();
        snps
    }

    /// a ∪ b, stored in a
    pub fn union(&mut self, other: &SnpSet) {
        self.snps.extend(other.snps.iter().cloned());
    }

    /// a ∩ b, stored in a
    pub fn intersection(&mut self, other: &SnpSet) {
        self.snps.retain(|snp| other.contains(snp));
    }

    /// a \ b, stored in a
    pub fn difference(&mut self, other: &SnpSet) {
        self.snps.retain(|snp| !other.contains(snp));
    }

    /// Drop every SNP whose position lies outside all `regions`
    pub fn retain_in_regions(&mut self, regions: &BedRegions) {
        self.snps.retain(|snp| regions.includes(snp.pos));
    }
}

impl FromIterator<Snp> for SnpSet {
    fn from_iter<I: IntoIterator<Item = Snp>>(iter: I) -> Self {
        Self {
            snps: iter.into_iter().collect(),
        }
    }
}

impl Extend<Snp> for SnpSet {
    fn extend<I: IntoIterator<Item = Snp>>(&mut self, iter: I) {
        self.snps.extend(iter);
    }
}

impl IntoIterator for SnpSet {
    type Item = Snp;
    type IntoIter = hash_set::IntoIter<Snp>;

    fn into_iter(self) -> Self::IntoIter {
        self.snps.into_iter()
    }
}

impl<'a> IntoIterator for &'a SnpSet {
    type Item = &'a Snp;
    type IntoIter = hash_set::Iter<'a, Snp>;

    fn into_iter(self) -> Self::IntoIter {
        self.snps.iter()
    }
}

/// Read SNPs from a simple CSV file with one `Pos,Ref,Alt` entry per line.
///
/// Lines starting with `#` are comments. Unlike the vendor formats this
/// reader is strict: a short line or a non-numeric position fails the file.
pub fn read_snp_csv<P: AsRef<Path>>(path: P) -> PhyloResult<SnpSet> {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).comment(Some(b'#'));
    let records = read_records_strict(&path, &builder)?;
    let path_str = path.as_ref().to_string_lossy().to_string();

    let mut snps = SnpSet::new();
    for record in &records {
        if record.len() < 3 {
            return Err(PhyloError::MalformedInput {
                path: path_str,
                message: format!("expected Pos,Ref,Alt but found {} field(s)", record.len()),
            });
        }
        let pos = record[0]
            .parse::<u64>()
            .map_err(|_| PhyloError::InvalidPosition {
                path: path_str.clone(),
                value: record[0].to_string(),
            })?;
        snps.insert(Snp::new(pos, &record[1], &record[2]));
    }

    log::info!("Read {} SNPs from {:?}", snps.len(), path.as_ref());
    Ok(snps)
}

/// Union of the SNPs from all `paths`
pub fn read_union<P: AsRef<Path>>(paths: &[P]) -> PhyloResult<SnpSet> {
    let mut snps = SnpSet::new();
    for path in paths {
        snps.union(&read_snp_csv(path)?);
    }
    Ok(snps)
}
