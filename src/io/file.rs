//! Input/Output file handling with [`InputFile`] and [`OutputFile`].
//!
//! These types abstract over reading/writing both plaintext and gzip-compressed
//! input/output.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::io::{self, BufWriter};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Check if a file is a gzipped by looking for the magic numbers. Files
/// shorter than the magic number are plaintext.
pub fn is_gzipped_file(file_path: impl AsRef<Path>) -> io::Result<bool> {
    let file = File::open(file_path.as_ref())?;
    let mut buffer = Vec::with_capacity(2);
    file.take(2).read_to_end(&mut buffer)?;
    Ok(buffer == [0x1f, 0x8b])
}

/// Represents an input file.
///
/// This abstracts how data is read in, allowing for both plaintext and
/// gzip-compressed input to be read through a common interface.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    /// Constructs a new `InputFile`. Compression is detected from the file
    /// contents, not the extension.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a buffered reader, decompressing on the fly
    /// if needed.
    pub fn reader(&self) -> io::Result<BufReader<Box<dyn Read>>> {
        let file = File::open(&self.filepath)?;
        let reader: Box<dyn Read> = if is_gzipped_file(&self.filepath)? {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Read the whole (decompressed) file into a string.
    pub fn read_to_string(&self) -> io::Result<String> {
        let mut contents = String::new();
        self.reader()?.read_to_string(&mut contents)?;
        Ok(contents)
    }
}

enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Represents an output file.
///
/// This abstracts writing both plaintext and gzip-compressed files.
pub struct OutputFile {
    destination: OutputDestination,
    pub header: Option<Vec<String>>,
}

impl OutputFile {
    /// Constructs a new `OutputFile`. If the file extension is `.gz`, output
    /// is gzip-compressed. `header` lines are written first, prefixed by `#`.
    pub fn new(filepath: impl Into<PathBuf>, header: Option<Vec<String>>) -> Self {
        Self {
            destination: OutputDestination::File(filepath.into()),
            header,
        }
    }

    /// Constructs a new [`OutputFile`] for standard output.
    pub fn new_stdout(header: Option<Vec<String>>) -> Self {
        Self {
            destination: OutputDestination::Stdout,
            header,
        }
    }

    /// Opens the destination and returns a writer, with the header written.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        let mut writer: Box<dyn Write> = match &self.destination {
            OutputDestination::File(path) => {
                let is_gzip = path.extension().map_or(false, |ext| ext == "gz");
                if is_gzip {
                    Box::new(BufWriter::new(GzEncoder::new(
                        File::create(path)?,
                        Compression::default(),
                    )))
                } else {
                    Box::new(BufWriter::new(File::create(path)?))
                }
            }
            OutputDestination::Stdout => Box::new(BufWriter::new(io::stdout())),
        };
        if let Some(entries) = &self.header {
            for entry in entries {
                writeln!(writer, "#{}", entry)?;
            }
        }
        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_gzip_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tsv.gz");
        {
            let output = OutputFile::new(&path, Some(vec!["pockets".to_string()]));
            let mut writer = output.writer().unwrap();
            writeln!(writer, "chr1\t0\t10").unwrap();
        }
        assert!(is_gzipped_file(&path).unwrap());
        let contents = InputFile::new(&path).read_to_string().unwrap();
        assert_eq!(contents, "#pockets\nchr1\t0\t10\n");
    }

    #[test]
    fn test_plain_and_empty_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        {
            let mut writer = OutputFile::new(&path, None).writer().unwrap();
            write!(writer, "x").unwrap();
        }
        assert!(!is_gzipped_file(&path).unwrap());
        assert_eq!(InputFile::new(&path).read_to_string().unwrap(), "x");

        let empty = dir.path().join("empty.bed");
        File::create(&empty).unwrap();
        assert_eq!(InputFile::new(&empty).read_to_string().unwrap(), "");
    }
}
