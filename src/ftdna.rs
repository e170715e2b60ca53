//! SNP exports from FTDNA (Big Y CSV downloads)

use crate::isogg::Db;
use crate::utils::read_records;
use crate::{CsvRecord, CsvRecords, PhyloResult, UNKNOWN_POS};
use std::path::Path;

const VARIANT: usize = 0;
const POS: usize = 1;
const NAME: usize = 2;
const REF: usize = 5;
const ALT: usize = 6;

/// Filtering options for FTDNA exports
#[derive(Debug, Clone)]
pub struct FtdnaOptions {
    /// Skip entries where the called allele equals REF
    pub mutations_only: bool,
    /// Keep only entries of type "Novel Variant"
    pub novels_only: bool,
}

impl Default for FtdnaOptions {
    fn default() -> Self {
        Self {
            mutations_only: true,
            novels_only: false,
        }
    }
}

/// Convert the fields of one FTDNA CSV line into an annotated record.
///
/// Positions that are not numbers become [`UNKNOWN_POS`] unless the SNP
/// name is found in `db`, which also supplies the comment.
pub fn record_from_fields(
    fields: &[&str],
    options: &FtdnaOptions,
    db: Option<&Db>,
) -> Option<CsvRecord> {
    if fields.len() < ALT + 1 {
        return None;
    }
    // header
    if fields[VARIANT] == "Type" {
        return None;
    }
    // uncalled
    if fields[ALT] == "?" {
        return None;
    }
    if options.mutations_only && fields[REF] == fields[ALT] {
        return None;
    }
    if options.novels_only && fields[VARIANT] != "Novel Variant" {
        return None;
    }

    let pos = match fields[POS].parse::<u64>() {
        Ok(_) => fields[POS].to_string(),
        Err(_) => UNKNOWN_POS.to_string(),
    };
    let mut record = CsvRecord {
        pos,
        ref_allele: fields[REF].to_string(),
        alt_allele: fields[ALT].to_string(),
        name: fields[NAME].to_string(),
        comment: String::new(),
    };

    if let Some(entry) = db.and_then(|db| db.entry_by_name(fields[NAME])) {
        record.comment = entry.comment.clone();
        if record.pos == UNKNOWN_POS {
            record.pos = entry.key.pos.to_string();
        }
    }
    Some(record)
}

/// Read annotated records from an FTDNA CSV file, in file order
pub fn read_ftdna_csv<P: AsRef<Path>>(
    path: P,
    options: &FtdnaOptions,
    db: Option<&Db>,
) -> PhyloResult<CsvRecords> {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    let records = read_records(&path, &builder)?;

    let result: CsvRecords = records
        .iter()
        .filter_map(|record| {
            let fields: Vec<&str> = record.iter().collect();
            record_from_fields(&fields, options, db)
        })
        .collect();

    let unplaced = result.iter().filter(|r| r.pos == UNKNOWN_POS).count();
    if unplaced > 0 {
        log::warn!("{} records in {:?} have no known position", unplaced, path.as_ref());
    }
    log::info!(
        "Kept {} of {} FTDNA lines from {:?}",
        result.len(),
        records.len(),
        path.as_ref()
    );
    Ok(result)
}
