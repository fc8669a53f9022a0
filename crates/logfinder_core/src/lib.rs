// logfinder_core: find syslog lines with no structural match in a reference log.
//
// Timestamps are ignored and every run of digits acts as a wildcard, so two
// lines match when their non-numeric fragments agree in count, order and text.
pub mod compare;
pub mod error;
pub mod index;
pub mod tokenizer;

pub use compare::{build_index, compare_files, find_unmatched, CompareStats, MalformedPolicy, UnmatchedLine};
pub use error::{InvalidFormat, LogfinderError};
pub use index::ReferenceIndex;
pub use tokenizer::{split_numeric, strip_date, tokenize, TokenKey};
