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

//! seqclass is a library and a command-line client for:
//!
//!   - Summing pairwise local-alignment hits per (model, sequence, strand) and
//!     assigning each sequence to its best scoring model.
//!   - Deciding whether a classification passes score, score difference,
//!     strand, bias and coverage thresholds.
//!   - Reconstructing the maximal ungapped segments of a hit from its insert
//!     and delete annotations.
//!   - Selecting the flanks of a sequence that need to be realigned with a
//!     profile aligner, and splicing the realigned flanks back around the
//!     ungapped seed into one full-length alignment.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The seqclass CLI supports the following subcommands:
//!   - `seqclass classify` aggregate a hit stream and classify the sequences.
//!   - `seqclass subseq` select and extract the flanks that need realignment.
//!   - `seqclass join` splice realigned flanks and seeds into full alignments.
//!
//! `classify` writes the model summary, the summed model summary, the
//! classification table and the indel detail file. `subseq` reads the indel
//! detail file and writes the subsequence table and a FASTA file for the
//! profile aligner. `join` reads the indel detail file and the Stockholm
//! output of the profile aligner and writes the joined alignments.
//!
//! ### Rust API
//!
//! The API provides functions for operating on structs that implement [Read]
//! and/or [Write], meant for processing a whole stream at once.
//!
//! For access to a single record at a time, the following are provided:
//!
//!   - [HitParser](parser::HitParser): takes a [Read] containing the tagged hit stream and converts it into [Hsp] records.
//!   - [ScoreAggregator](aggregate::ScoreAggregator): sums [Hsp] or [SummaryRow] scores and ranks the models of a sequence.
//!   - [decide](classify::decide): classifies one sequence from its ranking.
//!   - [reconcile](indel::reconcile): turns insert and delete tokens into ungapped segments.
//!   - [select_subsequences](subseq::select_subsequences): picks the flanks to realign.
//!   - [join_sequence](join::join_sequence): splices flank alignments around a seed.
//!
//! See documentation for the appropriate functions or structs for usage examples.
//!
//! ## Hit stream format
//!
//! The hit stream is line oriented, one `TAG\tVALUE` pair per line:
//!
//! ```text
//! QACC    seq1
//! QLEN    1000
//! HACC    modelA
//! HSP     1
//! BITSCORE        400.0
//! EVALUE  1e-120
//! QRANGE  1..1000
//! SRANGE  5..1004
//! STRAND  Plus/Plus
//! INS
//! DEL
//! END_MATCH
//! ```
//!
//! See [parser] for the full list of tags.
//!

use std::fmt;
use std::io::Read;
use std::io::Write;
use std::str::FromStr;

use indexmap::IndexMap;
use log::info;
use log::warn;

pub mod aggregate;
pub mod classify;
pub mod coords;
pub mod error;
pub mod indel;
pub mod join;
pub mod parser;
pub mod printer;
pub mod sequences;
pub mod subseq;

use classify::Classification;
use classify::Thresholds;
use coords::Segment;
use error::Error;
use error::SanityError;
use indel::IndelToken;
use indel::UngappedSegments;
use join::Joined;
use join::Seed;
use sequences::Sequences;
use subseq::SubsequenceSpec;

/// Sequence lengths by name, in input order.
pub type SeqLengths = IndexMap<String, usize>;

/// Strand of a hit or a coordinate segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    /// Single position or otherwise unknown orientation.
    Ambiguous,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
            Strand::Ambiguous => write!(f, "?"),
        }
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" | "Plus" => Ok(Strand::Plus),
            "-" | "Minus" => Ok(Strand::Minus),
            "?" => Ok(Strand::Ambiguous),
            _ => Err(format!("'{}' is not a valid Strand", s)),
        }
    }
}

/// One high-scoring pair between a sequence and a model.
///
/// `seq` and `mdl` are stored ascending with the strand they were written
/// in. `strand` is the overall strand of the hit.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Hsp {
    pub sequence: String,
    pub model: String,
    pub strand: Strand,
    pub bitscore: f64,
    pub evalue: f64,
    pub bias: f64,
    pub seq: Segment,
    pub mdl: Segment,
    pub inserts: Vec<IndelToken>,
    pub deletes: Vec<IndelToken>,
    pub seq_len: usize,
    pub mdl_len: Option<usize>,
}

impl Hsp {
    /// Maximal ungapped segments of a plus strand hit.
    pub fn ungapped(
        &self,
    ) -> Result<UngappedSegments, SanityError> {
        if self.strand == Strand::Minus {
            return Err(SanityError::NotStrandNormalized{ sequence: self.sequence.clone(), model: self.model.clone() })
        }
        indel::reconcile(&self.mdl, &self.seq, &self.inserts, &self.deletes)
    }

    pub fn indel_detail(
        &self,
    ) -> IndelDetail {
        IndelDetail{
            model: self.model.clone(),
            sequence: self.sequence.clone(),
            mdl: self.mdl,
            mdl_len: self.mdl_len,
            seq: self.seq,
            seq_len: self.seq_len,
            inserts: self.inserts.clone(),
            deletes: self.deletes.clone(),
        }
    }
}

/// One line of the model summary.
///
/// `span.strand` is the strand of the row.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRow {
    pub model: String,
    pub sequence: String,
    pub bitscore: f64,
    pub span: Segment,
    pub overlap: bool,
    pub seq_len: usize,
}

impl SummaryRow {
    /// Whether the row reaches the first and the last sequence position.
    pub fn bounds(&self) -> (bool, bool) {
        (self.span.start == 1, self.span.stop == self.seq_len)
    }
}

/// One line of the indel detail file.
///
/// Holds the outer ranges and the indel tokens of the top hit of an assigned
/// (model, sequence) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndelDetail {
    pub model: String,
    pub sequence: String,
    pub mdl: Segment,
    pub mdl_len: Option<usize>,
    pub seq: Segment,
    pub seq_len: usize,
    pub inserts: Vec<IndelToken>,
    pub deletes: Vec<IndelToken>,
}

impl IndelDetail {
    pub fn strand(&self) -> Strand {
        let seq_minus = self.seq.strand == Strand::Minus;
        let mdl_minus = self.mdl.strand == Strand::Minus;
        if seq_minus != mdl_minus { Strand::Minus } else { Strand::Plus }
    }

    pub fn ungapped(
        &self,
    ) -> Result<UngappedSegments, SanityError> {
        if self.strand() == Strand::Minus {
            return Err(SanityError::NotStrandNormalized{ sequence: self.sequence.clone(), model: self.model.clone() })
        }
        indel::reconcile(&self.mdl, &self.seq, &self.inserts, &self.deletes)
    }

    /// The longest ungapped pair as a [Seed].
    pub fn seed(
        &self,
    ) -> Result<Seed, SanityError> {
        let ungapped = self.ungapped()?;
        let (mdl, seq) = ungapped.max_length_pair().ok_or_else(|| SanityError::SeedNotUngapped(self.sequence.clone()))?;
        Ok(Seed{ mdl, seq })
    }
}

/// Parse all hits from a tagged hit stream in [Read].
///
/// `lengths` must contain every sequence named in the stream.
///
/// ## Usage
///
/// ```rust
/// use seqclass::parse_hits_from_read;
/// use seqclass::{SeqLengths, Strand};
/// use std::io::Cursor;
///
/// let mut lengths = SeqLengths::new();
/// lengths.insert("seq1".to_string(), 1000);
///
/// let mut input_bytes: Vec<u8> = Vec::new();
/// input_bytes.append(&mut b"QACC\tseq1\nQLEN\t1000\nHACC\tmodelA\n".to_vec());
/// input_bytes.append(&mut b"HSP\t1\nBITSCORE\t400.0\nEVALUE\t1e-120\n".to_vec());
/// input_bytes.append(&mut b"QRANGE\t1..1000\nSRANGE\t1004..5\nSTRAND\tPlus/Minus\n".to_vec());
/// input_bytes.append(&mut b"END_MATCH\n".to_vec());
/// let mut input: Cursor<Vec<u8>> = Cursor::new(input_bytes);
///
/// let hits = parse_hits_from_read(&lengths, &mut input).unwrap();
///
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].model, "modelA");
/// assert_eq!(hits[0].strand, Strand::Minus);
/// assert_eq!(hits[0].mdl.to_string(), "1004..5:-");
/// ```
///
pub fn parse_hits_from_read<R: Read>(
    lengths: &SeqLengths,
    conn_in: &mut R,
) -> Result<Vec<Hsp>, Error> {
    let reader = parser::HitParser::new(conn_in, lengths);
    let hits = reader.collect::<Result<Vec<Hsp>, Error>>()?;
    info!("Parsed {} hits", hits.len());
    Ok(hits)
}

/// Aggregate and classify every sequence in `lengths`.
///
/// Sequences without hits are classified as FAIL with `NoHits`.
///
/// ## Usage
///
/// ```rust
/// use seqclass::{classify_hits, parse_hits_from_read};
/// use seqclass::SeqLengths;
/// use seqclass::classify::{Outcome, Thresholds, UnexpectedFeature};
/// use std::io::Cursor;
///
/// let mut lengths = SeqLengths::new();
/// lengths.insert("seq1".to_string(), 1000);
/// lengths.insert("seq2".to_string(), 800);
///
/// let mut input_bytes: Vec<u8> = Vec::new();
/// input_bytes.append(&mut b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nBITSCORE\t150.0\nEVALUE\t1e-30\n".to_vec());
/// input_bytes.append(&mut b"QRANGE\t1..1000\nSRANGE\t1..1000\nEND_MATCH\n".to_vec());
/// let mut input: Cursor<Vec<u8>> = Cursor::new(input_bytes);
///
/// let hits = parse_hits_from_read(&lengths, &mut input).unwrap();
/// let got = classify_hits(&hits, &lengths, &Thresholds::default());
///
/// assert_eq!(got[0].outcome, Outcome::Fail);
/// assert_eq!(got[0].features, vec![UnexpectedFeature::VeryLowScore]);
/// assert_eq!(got[1].outcome, Outcome::Fail);
/// assert_eq!(got[1].features, vec![UnexpectedFeature::NoHits]);
/// ```
///
pub fn classify_hits(
    hits: &[Hsp],
    lengths: &SeqLengths,
    thresholds: &Thresholds,
) -> Vec<Classification> {
    let mut aggregator = aggregate::ScoreAggregator::new();
    hits.iter().for_each(|hit| { aggregator.observe(hit); });
    classify::classify_all(&aggregator, lengths, thresholds)
}

/// Write the model summary of `hits` to [Write].
///
/// With `summed` the total of each (model, sequence, strand) is written on
/// the first row of the key and later accepted rows get `0.0`.
///
/// ## Usage
///
/// ```rust
/// use seqclass::summary_to_write;
/// use seqclass::parser::summary::parse_summary_from_read;
/// use seqclass::Hsp;
/// use seqclass::Strand;
/// use seqclass::coords::Segment;
/// use std::io::Cursor;
///
/// let hit = |score: f64, start: usize, stop: usize| Hsp{
///     sequence: "seq1".to_string(), model: "modelA".to_string(), strand: Strand::Plus,
///     bitscore: score, evalue: 1e-10, bias: 0.0,
///     seq: Segment::new(start, stop, Strand::Plus).unwrap(),
///     mdl: Segment::new(start, stop, Strand::Plus).unwrap(),
///     inserts: vec![], deletes: vec![], seq_len: 1000, mdl_len: None,
/// };
/// let hits = vec![hit(300.0, 1, 600), hit(100.5, 650, 1000)];
///
/// let mut output: Vec<u8> = Vec::new();
/// summary_to_write(&hits, true, &mut output).unwrap();
///
/// let mut expected: Vec<u8> = Vec::new();
/// expected.append(&mut b"modelA\tseq1\t400.5\t1\t600\t+\t[.\tN\t1000\n".to_vec());
/// expected.append(&mut b"modelA\tseq1\t0.0\t650\t1000\t+\t.]\tN\t1000\n".to_vec());
/// assert_eq!(output, expected);
///
/// // reparsing keeps the sums
/// let rows = parse_summary_from_read(&mut Cursor::new(output)).unwrap();
/// assert_eq!(rows[0].bitscore, 400.5);
/// ```
///
pub fn summary_to_write<W: Write>(
    hits: &[Hsp],
    summed: bool,
    conn_out: &mut W,
) -> Result<(), Error> {
    let (aggregator, rows) = aggregate::summarize(hits);
    let mut printer = printer::SummaryPrinter::new(&rows, &aggregator, summed);
    for line in printer.by_ref() {
        conn_out.write_all(&line)?;
    }
    conn_out.flush()?;
    Ok(())
}

/// Write the classification table to [Write].
pub fn classification_to_write<W: Write>(
    classifications: &[Classification],
    conn_out: &mut W,
) -> Result<(), Error> {
    printer::classification::format_classification_header(conn_out)?;
    for classification in classifications {
        printer::classification::format_classification_line(classification, conn_out)?;
    }
    conn_out.flush()?;
    Ok(())
}

/// Write the indel detail file of the assigned (model, sequence) pairs.
///
/// Each pair is described by its top hit, the first one seen in `hits`.
///
pub fn indels_to_write<W: Write>(
    hits: &[Hsp],
    classifications: &[Classification],
    conn_out: &mut W,
) -> Result<(), Error> {
    for classification in classifications {
        let Some(model) = &classification.model else { continue };
        let top = hits.iter().find(|hit| hit.sequence == classification.sequence && &hit.model == model);
        if let Some(hit) = top {
            printer::indel_detail::format_indel_detail_line(&hit.indel_detail(), conn_out)?;
        }
    }
    conn_out.flush()?;
    Ok(())
}

/// Select the flanks to realign from an indel detail file in [Read].
///
/// Minus strand pairs are skipped with a warning.
///
/// ## Usage
///
/// ```rust
/// use seqclass::subsequences_from_read;
/// use seqclass::subseq::Flank;
/// use std::io::Cursor;
///
/// let mut input: Cursor<Vec<u8>> = Cursor::new(b"modelA\tseq1\t60..960:+\t1200\t50..950:+\t1000\t-\t-\n".to_vec());
/// let specs = subsequences_from_read(10, &mut input).unwrap();
///
/// assert_eq!(specs.len(), 2);
/// assert_eq!((specs[0].name.as_str(), specs[0].start, specs[0].stop, specs[0].flank), ("seq1/1-59", 1, 59, Flank::FivePrime));
/// assert_eq!((specs[1].name.as_str(), specs[1].start, specs[1].stop, specs[1].flank), ("seq1/941-1000", 941, 1000, Flank::ThreePrime));
/// ```
///
pub fn subsequences_from_read<R: Read>(
    overhang: usize,
    conn_in: &mut R,
) -> Result<Vec<SubsequenceSpec>, Error> {
    let details = parser::indel_detail::parse_indel_details_from_read(conn_in)?;
    let mut specs: Vec<SubsequenceSpec> = Vec::new();
    for detail in details {
        if detail.strand() == Strand::Minus {
            warn!("Skipping minus strand hit of {} to {}", detail.sequence, detail.model);
            continue;
        }
        let seed = detail.seed()?;
        let mut selected = subseq::select_subsequences(&detail.sequence, detail.seq_len, &seed.seq, overhang)?;
        specs.append(&mut selected);
    }
    info!("Selected {} subsequences", specs.len());
    Ok(specs)
}

/// Write the subsequence table to `table_out` and their residues as FASTA to `fasta_out`.
pub fn subsequences_to_write<W: Write, V: Write>(
    specs: &[SubsequenceSpec],
    sequences: &Sequences,
    table_out: &mut W,
    fasta_out: &mut V,
) -> Result<(), Error> {
    for spec in specs {
        let residues = sequences.get(&spec.source).ok_or_else(|| SanityError::MissingSequence(spec.source.clone()))?;
        printer::subseq::format_subsequence_line(spec, table_out)?;
        sequences::write_fasta_record(&spec.name, spec.extract(residues)?, fasta_out)?;
    }
    table_out.flush()?;
    fasta_out.flush()?;
    Ok(())
}

/// Join the realigned flanks of every pair in an indel detail file.
///
/// `flanks_in` holds the Stockholm output of the profile aligner for the
/// subsequences selected with the same `overhang`. Returns the sequence name
/// and the join result in input order.
///
pub fn join_from_read<R: Read, S: Read>(
    overhang: usize,
    sequences: &Sequences,
    details_in: &mut R,
    flanks_in: &mut S,
) -> Result<Vec<(String, Joined)>, Error> {
    let details = parser::indel_detail::parse_indel_details_from_read(details_in)?;
    let flanks = parser::stockholm::parse_stockholm_from_read(flanks_in)?;

    let mut joined: Vec<(String, Joined)> = Vec::new();
    for detail in details {
        if detail.strand() == Strand::Minus {
            warn!("Skipping minus strand hit of {} to {}", detail.sequence, detail.model);
            continue;
        }
        let residues = sequences.get(&detail.sequence).ok_or_else(|| SanityError::MissingSequence(detail.sequence.clone()))?;
        let seed = detail.seed()?;
        let specs = subseq::select_subsequences(&detail.sequence, detail.seq_len, &seed.seq, overhang)?;
        let res = join::join_sequence(&detail.sequence, residues, &seed, &specs, &flanks)?;
        if let Joined::BoundaryMismatch(sides) = &res {
            warn!("Alignment boundary mismatch for {} on {} side(s)", detail.sequence,
                  sides.iter().map(|x| x.to_string()).collect::<Vec<String>>().join(","));
        }
        joined.push((detail.sequence.clone(), res));
    }
    Ok(joined)
}

/// Write the joined alignments as Stockholm to [Write].
///
/// Boundary mismatches are skipped.
pub fn joined_to_write<W: Write>(
    joined: &[(String, Joined)],
    conn_out: &mut W,
) -> Result<(), Error> {
    for (_, res) in joined {
        if let Joined::Alignment(aln) = res {
            printer::stockholm::format_stockholm_block(aln, conn_out)?;
        }
    }
    conn_out.flush()?;
    Ok(())
}
