//! Types and methods for reading and parsing input and writing output.

pub mod file;
pub mod parsers;
pub mod tsv;

pub use file::{InputFile, OutputFile};
pub use parsers::{read_bed_intervals, tracks_from_uniprot_file, tracks_from_uniprot_json, BedIterator};
pub use tsv::BED_TSV;
