//! ISOGG SNP reference database
//!
//! Built from the ISOGG CSV export at http://ybrowse.org/gbrowse2/gff/.
//! Records are indexed by SNP key and, when named, by SNP name. The
//! database is read-only once loaded.

use crate::snpset::SnpSet;
use crate::utils::read_records;
use crate::{CsvRecord, CsvRecords, PhyloResult, Snp};
use std::collections::HashMap;
use std::path::Path;

const POS: usize = 3;
const NAME: usize = 8;
const REF: usize = 10;
const ALT: usize = 11;
const COMMENT: usize = 18;

/// A simplified ISOGG entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbRecord {
    pub key: Snp,
    pub name: String,
    pub comment: String,
}

impl DbRecord {
    /// Build a record from the fields of an ISOGG CSV line. Header, footer
    /// and other short lines yield `None`.
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        if fields.len() < COMMENT + 1 {
            return None;
        }
        let pos = fields[POS].parse::<u64>().ok()?;
        Some(Self {
            key: Snp::new(pos, fields[REF], fields[ALT]),
            name: fields[NAME].to_string(),
            comment: fields[COMMENT].to_string(),
        })
    }

    /// Annotated output record for this entry
    pub fn to_csv_record(&self) -> CsvRecord {
        CsvRecord {
            name: self.name.clone(),
            comment: self.comment.clone(),
            ..CsvRecord::from_snp(&self.key)
        }
    }
}

/// SNP reference database with lookups by key and by name
#[derive(Debug, Default)]
pub struct Db {
    records: Vec<DbRecord>,
    by_key: HashMap<Snp, usize>,
    by_name: HashMap<String, usize>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from an ISOGG CSV file
    pub fn from_isogg_csv<P: AsRef<Path>>(path: P) -> PhyloResult<Self> {
        let mut db = Self::new();
        db.read_isogg_csv(path)?;
        Ok(db)
    }

    /// Add a record. A later record with the same key or name replaces the
    /// earlier one in that index.
    pub fn add(&mut self, record: DbRecord) {
        let index = self.records.len();
        self.by_key.insert(record.key.clone(), index);
        if !record.name.is_empty() {
            self.by_name.insert(record.name.clone(), index);
        }
        self.records.push(record);
    }

    /// Add every valid line of an ISOGG CSV file to the database
    pub fn read_isogg_csv<P: AsRef<Path>>(&mut self, path: P) -> PhyloResult<()> {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(false).flexible(true);
        let records = read_records(&path, &builder)?;

        let before = self.records.len();
        for record in &records {
            let fields: Vec<&str> = record.iter().collect();
            if let Some(entry) = DbRecord::from_fields(&fields) {
                self.add(entry);
            }
        }

        log::info!(
            "Loaded {} ISOGG records from {} lines in {:?}",
            self.records.len() - before,
            records.len(),
            path.as_ref()
        );
        Ok(())
    }

    pub fn entry_by_key(&self, snp: &Snp) -> Option<&DbRecord> {
        self.by_key.get(snp).map(|&i| &self.records[i])
    }

    pub fn entry_by_name(&self, name: &str) -> Option<&DbRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Annotate SNPs with name and comment from the database, in sorted key
    /// order. SNPs unknown to the database are kept without annotation.
    pub fn annotate(&self, snps: &SnpSet) -> CsvRecords {
        snps.sorted()
            .into_iter()
            .map(|snp| match self.entry_by_key(snp) {
                Some(entry) => entry.to_csv_record(),
                None => CsvRecord::from_snp(snp),
            })
            .collect()
    }
}
