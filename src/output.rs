//! Writing SNP sets and annotated records as CSV
//!
//! All output uses CRLF line endings.

use crate::snpset::SnpSet;
use crate::utils::ensure_parent_dirs;
use crate::{CsvRecord, PhyloResult};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Buffered writer for `path`, or standard output when no path is given
pub fn open_output(path: Option<&Path>) -> PhyloResult<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => {
            ensure_parent_dirs(path)?;
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(writer)
}

/// Write SNPs as `Pos,Ref,Alt` lines sorted by key
pub fn write_snps<W: Write>(snps: &SnpSet, writer: W) -> PhyloResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    for snp in snps.sorted() {
        csv_writer.serialize(snp)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write annotated records as `Pos,Ref,Alt,Name,"Comment"` lines in order
pub fn write_records<W: Write>(records: &[CsvRecord], mut writer: W) -> PhyloResult<()> {
    for record in records {
        write!(writer, "{}\r\n", record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write SNPs to a file or standard output
pub fn write_snp_csv(snps: &SnpSet, path: Option<&Path>) -> PhyloResult<()> {
    write_snps(snps, open_output(path)?)?;
    if let Some(path) = path {
        log::info!("Wrote {} SNPs to {:?}", snps.len(), path);
    }
    Ok(())
}

/// Write annotated records to a file or standard output
pub fn write_csv_records(records: &[CsvRecord], path: Option<&Path>) -> PhyloResult<()> {
    write_records(records, open_output(path)?)?;
    if let Some(path) = path {
        log::info!("Wrote {} records to {:?}", records.len(), path);
    }
    Ok(())
}
