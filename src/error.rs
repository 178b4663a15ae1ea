// seqclass: Nucleotide sequence classification and alignment splicing.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Error types.
//!
//! Every error here is fatal for the whole batch. Per-sequence FAIL outcomes
//! are not errors, see [Classification](crate::classify::Classification).

use thiserror::Error;

/// Any error raised by the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Sanity(#[from] SanityError),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error("sequence file: {0}")]
    Fastx(#[from] needletail::errors::ParseError),
}

/// A malformed input line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: `{text}`")]
pub struct ParseError {
    /// 1-based line number in the input stream.
    pub line: usize,
    /// The offending line.
    pub text: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("`{tag}` appears before `{needs}`")]
    MissingPredecessor { tag: String, needs: &'static str },

    #[error("`{0}` appears twice in one HSP block")]
    DuplicateTag(String),

    #[error("unknown tag `{0}`")]
    UnknownTag(String),

    #[error("expected `TAG\\tVALUE`")]
    NotTagged,

    #[error("non-numeric value for `{0}`")]
    NotNumeric(String),

    #[error("invalid strand for `{0}`")]
    InvalidStrand(String),

    #[error("invalid range for `{tag}`: {source}")]
    InvalidRange { tag: String, source: CoordinateError },

    #[error("strand contradicts the orientation of `{0}`")]
    StrandRangeConflict(String),

    #[error("indel token: {0}")]
    Indel(#[from] IndelTokenError),

    #[error("aligned rows: {0}")]
    AlignedRows(String),

    #[error("HSP block is missing `{0}`")]
    Incomplete(&'static str),

    #[error("sequence `{0}` is not in the length lookup")]
    UnknownSequence(String),

    #[error("sequence `{0}` has length 0")]
    EmptySequence(String),

    #[error("range {range} runs past the end of `{sequence}` of length {seq_len}")]
    RangeOutsideSequence { sequence: String, range: String, seq_len: usize },

    #[error("declared length {declared} of `{sequence}` differs from expected {expected}")]
    LengthMismatch { sequence: String, declared: usize, expected: usize },

    #[error("record not terminated by `END_MATCH`")]
    Unterminated,

    #[error("expected {expected} tab-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid field `{0}`")]
    InvalidField(&'static str),

    #[error("invalid Stockholm alignment: {0}")]
    Stockholm(String),
}

/// A malformed insert/delete token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndelTokenError {
    #[error("`{0}` is not of the form `Q<pos>:S<pos><sign><len>`")]
    Malformed(String),

    #[error("`{0}` has the wrong sign for its list")]
    WrongSign(String),

    #[error("`{0}` has zero length")]
    ZeroLength(String),
}

/// A malformed coordinate segment or coords string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("`{0}` is not of the form `<start>..<stop>:<strand>`")]
    Malformed(String),

    #[error("coordinates are 1-based, got 0 in `{0}`")]
    ZeroPosition(String),

    #[error("start {start} > stop {stop}")]
    Descending { start: usize, stop: usize },

    #[error("orientation of `{0}` contradicts its strand")]
    Orientation(String),

    #[error("segment {next} does not follow {prev} in coordinate order")]
    Unordered { prev: String, next: String },

    #[error("segment {next} mixes strands with {prev}")]
    MixedStrands { prev: String, next: String },

    #[error("empty coords string")]
    Empty,
}

/// Internally inconsistent coordinates or alignments.
///
/// These signal a contract violation by an upstream stage and are never
/// repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanityError {
    #[error("ungapped segment lengths differ: model {mdl} has {mdl_len}, sequence {seq} has {seq_len}")]
    SegmentLengthMismatch { mdl: String, mdl_len: usize, seq: String, seq_len: usize },

    #[error("ambiguous order of insert {insert} and delete {delete}")]
    AmbiguousEventOrder { insert: String, delete: String },

    #[error("indel {token} lies behind the walk position at sequence {seq_next}, model {mdl_next}")]
    EventOutOfOrder { token: String, seq_next: usize, mdl_next: usize },

    #[error("indel {token} walks past the aligned range ending at sequence {seq_stop}, model {mdl_stop}")]
    WalkOvershoot { token: String, seq_stop: usize, mdl_stop: usize },

    #[error("HSP of `{sequence}` to `{model}` is on the minus strand")]
    NotStrandNormalized { sequence: String, model: String },

    #[error("aligned rows have different lengths ({0} and {1})")]
    RowLengthMismatch(usize, usize),

    #[error("column {0} is a gap in both aligned rows")]
    EmptyColumn(usize),

    #[error("position walked below 1 at column {0}")]
    PositionUnderflow(usize),

    #[error("segment {segment} lies outside sequence `{sequence}` of length {seq_len}")]
    OutOfRange { sequence: String, segment: String, seq_len: usize },

    #[error("ungapped seed of `{0}` has different sequence and model lengths")]
    SeedNotUngapped(String),

    #[error("sequence `{0}` was not loaded")]
    MissingSequence(String),

    #[error("`{sequence}` needs a {side} flank alignment")]
    MissingFlank { sequence: String, side: String },

    #[error("joined alignment of `{0}` does not reproduce the sequence")]
    SequenceNotReproduced(String),
}
