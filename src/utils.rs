//! Utility functions for file handling and common operations

use crate::{PhyloError, PhyloResult};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Check if a file is gzip compressed
pub fn is_gzipped<P: AsRef<Path>>(path: P) -> PhyloResult<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0; 2];

    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1f, 0x8b]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(PhyloError::Io(e)),
    }
}

/// Open a plain or gzip compressed text file for buffered reading
pub fn open_input<P: AsRef<Path>>(path: P) -> PhyloResult<Box<dyn BufRead>> {
    let file = File::open(&path)
        .map_err(|_| PhyloError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    let reader: Box<dyn BufRead> = if is_gzipped(&path)? {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Load every record of a delimited text file into memory.
///
/// The dialect (delimiter, comments, quoting, field count policy) comes from
/// the caller's `builder`. Bytes that are not valid UTF-8 are replaced with
/// U+FFFD so vendor exports in legacy encodings still load. Format errors
/// are reported with the file name.
pub fn read_records<P: AsRef<Path>>(
    path: P,
    builder: &csv::ReaderBuilder,
) -> PhyloResult<Vec<csv::StringRecord>> {
    let reader = open_input(&path)?;
    let mut csv_reader = builder.from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.byte_records() {
        let record = result.map_err(|e| csv_error(&path, e))?;
        records.push(csv::StringRecord::from_byte_record_lossy(record));
    }
    Ok(records)
}

/// Like [`read_records`], but invalid UTF-8 fails the file
pub fn read_records_strict<P: AsRef<Path>>(
    path: P,
    builder: &csv::ReaderBuilder,
) -> PhyloResult<Vec<csv::StringRecord>> {
    let reader = open_input(&path)?;
    let mut csv_reader = builder.from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.records() {
        records.push(result.map_err(|e| csv_error(&path, e))?);
    }
    Ok(records)
}

fn csv_error<P: AsRef<Path>>(path: P, e: csv::Error) -> PhyloError {
    if matches!(e.kind(), csv::ErrorKind::Io(_)) {
        PhyloError::Csv(e)
    } else {
        PhyloError::MalformedInput {
            path: path.as_ref().to_string_lossy().to_string(),
            message: e.to_string(),
        }
    }
}

/// Validate file paths and check if they exist
pub fn validate_file_exists<P: AsRef<Path>>(path: P) -> PhyloResult<()> {
    if !path.as_ref().exists() {
        return Err(PhyloError::FileNotFound(
            path.as_ref().to_string_lossy().to_string(),
        ));
    }
    Ok(())
}

/// Validate that a file is readable
pub fn validate_file_readable<P: AsRef<Path>>(path: P) -> PhyloResult<()> {
    validate_file_exists(&path)?;

    File::open(&path)
        .map_err(|_| PhyloError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    Ok(())
}

/// Check if a path has a specific extension
pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Create parent directories if they don't exist
pub fn ensure_parent_dirs<P: AsRef<Path>>(path: P) -> PhyloResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Files in `dir` with the given extension, sorted by name
pub fn names_with_ext<P: AsRef<Path>>(dir: P, extension: &str) -> PhyloResult<Vec<PathBuf>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            names.push(path);
        }
    }
    names.sort();
    Ok(names)
}

/// Expand a comma separated list of files and directories into file names.
///
/// Directories contribute all their files with `extension`; plain files are
/// kept only when they carry that extension.
pub fn parameter_to_filenames(parameter: &str, extension: &str) -> PhyloResult<Vec<PathBuf>> {
    let mut filenames = Vec::new();
    for entry in parameter.split(',').filter(|s| !s.is_empty()) {
        let path = Path::new(entry);
        validate_file_exists(path)?;

        if path.is_dir() {
            filenames.extend(names_with_ext(path, extension)?);
        } else if has_extension(path, extension) {
            filenames.push(path.to_path_buf());
        } else {
            log::warn!("Ignoring {:?}: extension is not .{}", path, extension);
        }
    }
    Ok(filenames)
}

/// An input file and where its result goes; `None` means standard output
pub type FileMapping = (PathBuf, Option<PathBuf>);

/// Map an input file or directory to output names.
///
/// A regular input file maps to `output` as given. An input directory maps
/// every `name.<in_ext>` inside it to `<output>/name.<out_ext>`. Without an
/// output every input maps to standard output.
pub fn in_to_out_filenames(
    input: &Path,
    in_ext: &str,
    output: Option<&Path>,
    out_ext: &str,
) -> PhyloResult<Vec<FileMapping>> {
    validate_file_exists(input)?;

    if input.is_file() {
        return Ok(vec![(input.to_path_buf(), output.map(Path::to_path_buf))]);
    }

    if !input.is_dir() {
        return Err(PhyloError::InvalidConfig(format!(
            "{:?} is neither a file nor a directory",
            input
        )));
    }

    let names = names_with_ext(input, in_ext)?;
    let output_dir = match output {
        None => return Ok(names.into_iter().map(|name| (name, None)).collect()),
        Some(dir) if dir.is_file() => {
            return Err(PhyloError::InvalidConfig(
                "in and out must be both files or directories".to_string(),
            ))
        }
        Some(dir) => dir,
    };

    let mappings = names
        .into_iter()
        .map(|name| {
            let stem = name
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let out_name = output_dir.join(format!("{}.{}", stem, out_ext));
            (name, Some(out_name))
        })
        .collect();
    Ok(mappings)
}

/// Log progress information
pub fn log_progress(current: usize, total: usize, message: &str) {
    if total > 0 {
        let percentage = (current as f64 / total as f64) * 100.0;
        log::info!("{}: {} / {} ({:.1}%)", message, current, total, percentage);
    }
}

/// Timer utility for measuring execution time
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::info!("Starting timer: {}", name);
        Timer {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    pub fn log_elapsed(&self) {
        let duration = self.elapsed();
        log::info!("Timer '{}' elapsed: {:.2?}", self.name, duration);
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.log_elapsed();
    }
}
