//! # phylosnip - SNP normalization and set algebra
//!
//! Reads Y-chromosome SNP calls from VCF files and vendor CSV exports
//! (FTDNA, YFull), normalizes them into a common `Pos,Ref,Alt` key, and
//! supports set operations, region filtering and ISOGG annotation lookups.

pub mod bed;
pub mod commands;
pub mod ftdna;
pub mod isogg;
pub mod output;
pub mod snpset;
pub mod utils;
pub mod vcf;
pub mod yfull;

use serde::Serialize;
use std::fmt;

/// A single-nucleotide polymorphism identified by position and alleles
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Snp {
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl Snp {
    pub fn new(pos: u64, ref_allele: impl Into<String>, alt_allele: impl Into<String>) -> Self {
        Self {
            pos,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
        }
    }
}

/// Canonical `Pos,Ref,Alt` encoding, without line terminator
impl fmt::Display for Snp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.pos, self.ref_allele, self.alt_allele)
    }
}

/// Position placeholder used when a record carries no numeric position
pub const UNKNOWN_POS: &str = "n/a";

/// An annotated output record as produced by the FTDNA filter and lookups.
///
/// `pos` is kept as text because FTDNA exports may lack a position, in which
/// case it holds [`UNKNOWN_POS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRecord {
    pub pos: String,
    pub ref_allele: String,
    pub alt_allele: String,
    pub name: String,
    pub comment: String,
}

impl CsvRecord {
    /// Unannotated record for a bare SNP key
    pub fn from_snp(snp: &Snp) -> Self {
        Self {
            pos: snp.pos.to_string(),
            ref_allele: snp.ref_allele.clone(),
            alt_allele: snp.alt_allele.clone(),
            ..Default::default()
        }
    }
}

/// `Pos,Ref,Alt,Name,"Comment"`; the comment is always quoted
impl fmt::Display for CsvRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},\"{}\"",
            self.pos, self.ref_allele, self.alt_allele, self.name, self.comment
        )
    }
}

pub type CsvRecords = Vec<CsvRecord>;

/// Error types for the phylosnip library
#[derive(Debug, thiserror::Error)]
pub enum PhyloError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Malformed input in {path}: {message}")]
    MalformedInput { path: String, message: String },

    #[error("Invalid SNP position '{value}' in {path}")]
    InvalidPosition { path: String, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PhyloResult<T> = Result<T, PhyloError>;
