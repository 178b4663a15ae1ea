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

//! Parser for the tagged hit stream.
//!
//! Each line holds one `TAG\tVALUE` pair. A record describes the hits of one
//! sequence to one model and ends with a line containing `END_MATCH`. The
//! sequence named by `QACC` stays in effect after `END_MATCH`, so several
//! records for the same sequence may follow each other without a new `QACC`.
//!
//! | Tag                 | Value                                   | Needs   |
//! |---------------------|-----------------------------------------|---------|
//! | `QACC`              | sequence name                           |         |
//! | `QLEN`              | sequence length, checked against lookup | `QACC`  |
//! | `QDEF`              | ignored                                 | `QACC`  |
//! | `HACC`              | model name                              | `QACC`  |
//! | `HLEN`, `SLEN`      | model length                            | `HACC`  |
//! | `HDEF`              | ignored                                 | `HACC`  |
//! | `HSP`               | block number, starts a new HSP          | `HACC`  |
//! | `BITSCORE`          | bit score                               | `HSP`   |
//! | `EVALUE`            | e-value                                 | `HSP`   |
//! | `BIAS`              | score bias, 0 if absent                 | `HSP`   |
//! | `QRANGE`, `SRANGE`  | `start..stop`, descending on minus      | `HSP`   |
//! | `STRAND`            | `+`, `-`, `Plus/Plus`, `Plus/Minus`     | `HSP`   |
//! | `QSTRAND`, `SSTRAND`| `+`, `-`, `Plus`, `Minus`               | `HSP`   |
//! | `INS`, `DEL`        | `;`-joined indel tokens, may be empty   | `HSP`   |
//! | `QSEQ`, `SSEQ`      | aligned rows                            | `HSP`   |
//!
//! `QRANGE` must end within the sequence length and sequences of length 0
//! are rejected at `QACC`.
//!
//! `RAWSCORE`, `IDENT`, `GAPS`, `FRAME`, `MAXIN` and `MAXDE` are accepted
//! in an HSP block and ignored. If `INS` or `DEL` is missing and both
//! `QSEQ` and `SSEQ` are present, the missing tokens are derived from the
//! aligned rows with [scan_gaps](crate::indel::gaps::scan_gaps).
//!
//! Without `STRAND`, `QSTRAND` or `SSTRAND` the strand is read from the
//! orientation of the ranges.
//!
//! ## Usage
//!
//! ```rust
//! use seqclass::parser::HitParser;
//! use seqclass::SeqLengths;
//! use std::io::Cursor;
//!
//! let mut lengths = SeqLengths::new();
//! lengths.insert("seq1".to_string(), 500);
//!
//! let mut input_bytes: Vec<u8> = Vec::new();
//! input_bytes.append(&mut b"QACC\tseq1\nHACC\tmodelA\n".to_vec());
//! input_bytes.append(&mut b"HSP\t1\nBITSCORE\t300.0\nEVALUE\t1e-80\nQRANGE\t1..500\nSRANGE\t5..507\n".to_vec());
//! input_bytes.append(&mut b"INS\t\nDEL\tQ100:S105-3\n".to_vec());
//! input_bytes.append(&mut b"HSP\t2\nBITSCORE\t20.0\nEVALUE\t0.01\nQRANGE\t10..30\nSRANGE\t900..920\n".to_vec());
//! input_bytes.append(&mut b"END_MATCH\n".to_vec());
//! let mut input: Cursor<Vec<u8>> = Cursor::new(input_bytes);
//!
//! let mut parser = HitParser::new(&mut input, &lengths);
//! let first = parser.next().unwrap().unwrap();
//! let second = parser.next().unwrap().unwrap();
//! assert!(parser.next().is_none());
//!
//! assert_eq!(first.ungapped().unwrap().seq.to_string(), "1..100:+,101..500:+");
//! assert_eq!(second.bitscore, 20.0);
//! ```
//!

// Auxiliary formats
pub mod indel_detail;
pub mod stockholm;
pub mod summary;

use std::io::BufReader;
use std::io::Read;

use bstr::ByteSlice;
use bstr::io::BufReadExt;
use bstr::io::ByteLines;

use crate::Hsp;
use crate::SeqLengths;
use crate::Strand;
use crate::coords::Segment;
use crate::error::CoordinateError;
use crate::error::Error;
use crate::error::ParseError;
use crate::error::ParseErrorKind;
use crate::indel::IndelKind;
use crate::indel::IndelToken;
use crate::indel::gaps::scan_gaps;
use crate::indel::parse_token_list;

const IGNORED_HSP_TAGS: [&str; 6] = ["RAWSCORE", "IDENT", "GAPS", "FRAME", "MAXIN", "MAXDE"];

struct QueryContext {
    sequence: String,
    seq_len: usize,
    has_len: bool,
}

struct MatchContext {
    model: String,
    mdl_len: Option<usize>,
}

enum State {
    Outside,
    Query(QueryContext),
    Match(QueryContext, MatchContext),
    Block(QueryContext, MatchContext, HspBuilder),
}

fn set_once<T>(
    slot: &mut Option<T>,
    tag: &str,
    value: T,
) -> Result<(), ParseErrorKind> {
    if slot.is_some() {
        return Err(ParseErrorKind::DuplicateTag(tag.to_string()))
    }
    *slot = Some(value);
    Ok(())
}

fn parse_number<T: std::str::FromStr>(
    tag: &str,
    value: &str,
) -> Result<T, ParseErrorKind> {
    value.parse::<T>().map_err(|_| ParseErrorKind::NotNumeric(tag.to_string()))
}

fn parse_range(
    tag: &str,
    value: &str,
) -> Result<Segment, ParseErrorKind> {
    let invalid = |source: CoordinateError| ParseErrorKind::InvalidRange{ tag: tag.to_string(), source };
    let (from, to) = value.split_once("..").ok_or_else(|| invalid(CoordinateError::Malformed(value.to_string())))?;
    let from = from.trim().parse::<usize>().map_err(|_| invalid(CoordinateError::Malformed(value.to_string())))?;
    let to = to.trim().parse::<usize>().map_err(|_| invalid(CoordinateError::Malformed(value.to_string())))?;
    Segment::from_oriented(from, to).map_err(invalid)
}

/// Overall strand from the strands of the two sides.
fn combine(
    seq: Strand,
    mdl: Strand,
) -> Option<Strand> {
    match (seq, mdl) {
        (Strand::Ambiguous, _) | (_, Strand::Ambiguous) => None,
        (seq, mdl) if seq == mdl => Some(Strand::Plus),
        _ => Some(Strand::Minus),
    }
}

fn parse_strand(
    tag: &str,
    value: &str,
) -> Result<Strand, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidStrand(tag.to_string());
    let strand = match value.split_once('/') {
        Some((seq, mdl)) => {
            let seq = seq.parse::<Strand>().map_err(|_| invalid())?;
            let mdl = mdl.parse::<Strand>().map_err(|_| invalid())?;
            combine(seq, mdl).ok_or_else(invalid)?
        },
        None => value.parse::<Strand>().map_err(|_| invalid())?,
    };
    if strand == Strand::Ambiguous {
        return Err(invalid())
    }
    Ok(strand)
}

#[derive(Default)]
struct HspBuilder {
    bitscore: Option<f64>,
    evalue: Option<f64>,
    bias: Option<f64>,
    qrange: Option<Segment>,
    srange: Option<Segment>,
    strand: Option<Strand>,
    qstrand: Option<Strand>,
    sstrand: Option<Strand>,
    inserts: Option<Vec<IndelToken>>,
    deletes: Option<Vec<IndelToken>>,
    qseq: Option<Vec<u8>>,
    sseq: Option<Vec<u8>>,
}

impl HspBuilder {
    fn set(
        &mut self,
        tag: &str,
        value: &str,
    ) -> Result<(), ParseErrorKind> {
        match tag {
            "BITSCORE" => set_once(&mut self.bitscore, tag, parse_number::<f64>(tag, value)?),
            "EVALUE" => set_once(&mut self.evalue, tag, parse_number::<f64>(tag, value)?),
            "BIAS" => set_once(&mut self.bias, tag, parse_number::<f64>(tag, value)?),
            "QRANGE" => set_once(&mut self.qrange, tag, parse_range(tag, value)?),
            "SRANGE" => set_once(&mut self.srange, tag, parse_range(tag, value)?),
            "STRAND" => set_once(&mut self.strand, tag, parse_strand(tag, value)?),
            "QSTRAND" => set_once(&mut self.qstrand, tag, parse_strand(tag, value)?),
            "SSTRAND" => set_once(&mut self.sstrand, tag, parse_strand(tag, value)?),
            "INS" => set_once(&mut self.inserts, tag, parse_token_list(value, IndelKind::Insert)?),
            "DEL" => set_once(&mut self.deletes, tag, parse_token_list(value, IndelKind::Delete)?),
            "QSEQ" => set_once(&mut self.qseq, tag, value.as_bytes().to_vec()),
            "SSEQ" => set_once(&mut self.sseq, tag, value.as_bytes().to_vec()),
            _ => Ok(()),
        }
    }

    fn build(
        self,
        query: &QueryContext,
        matched: &MatchContext,
    ) -> Result<Hsp, ParseErrorKind> {
        let bitscore = self.bitscore.ok_or(ParseErrorKind::Incomplete("BITSCORE"))?;
        let evalue = self.evalue.ok_or(ParseErrorKind::Incomplete("EVALUE"))?;
        let seq = self.qrange.ok_or(ParseErrorKind::Incomplete("QRANGE"))?;
        let mdl = self.srange.ok_or(ParseErrorKind::Incomplete("SRANGE"))?;

        let declared = match (self.strand, self.qstrand, self.sstrand) {
            (Some(strand), _, _) => Some(strand),
            (None, None, None) => None,
            (None, q, s) => combine(q.unwrap_or(Strand::Plus), s.unwrap_or(Strand::Plus)),
        };
        let implied = combine(seq.strand, mdl.strand);
        if let (Some(declared), Some(implied)) = (declared, implied) {
            if declared != implied {
                return Err(ParseErrorKind::StrandRangeConflict("SRANGE".to_string()))
            }
        }
        let strand = declared.or(implied).unwrap_or(Strand::Plus);

        let (inserts, deletes) = match (self.inserts, self.deletes) {
            (Some(inserts), Some(deletes)) => (inserts, deletes),
            (inserts, deletes) => match (&self.qseq, &self.sseq) {
                (Some(qseq), Some(sseq)) => {
                    if seq.strand == Strand::Minus {
                        return Err(ParseErrorKind::AlignedRows("sequence row on the minus strand".to_string()))
                    }
                    let (mdl_from, _) = mdl.oriented();
                    let (scanned_ins, scanned_del) = scan_gaps(qseq, sseq, seq.start, mdl_from, mdl.strand)
                        .map_err(|e| ParseErrorKind::AlignedRows(e.to_string()))?;
                    (inserts.unwrap_or(scanned_ins), deletes.unwrap_or(scanned_del))
                },
                (Some(_), None) => return Err(ParseErrorKind::Incomplete("SSEQ")),
                (None, Some(_)) => return Err(ParseErrorKind::Incomplete("QSEQ")),
                (None, None) => (inserts.unwrap_or_default(), deletes.unwrap_or_default()),
            },
        };

        Ok(Hsp{
            sequence: query.sequence.clone(),
            model: matched.model.clone(),
            strand,
            bitscore,
            evalue,
            bias: self.bias.unwrap_or(0.0),
            seq,
            mdl,
            inserts,
            deletes,
            seq_len: query.seq_len,
            mdl_len: matched.mdl_len,
        })
    }
}

/// Splits a tab-separated line into exactly `expected` fields.
pub(crate) fn split_fields(
    line: &str,
    expected: usize,
) -> Result<Vec<&str>, ParseErrorKind> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != expected {
        return Err(ParseErrorKind::FieldCount{ expected, found: fields.len() })
    }
    Ok(fields)
}

/// Reads every line of a tab-separated file with `read_line`.
///
/// Blank lines and lines starting with `#` are skipped.
pub(crate) fn read_tabular<R: Read, T, F>(
    conn: &mut R,
    read_line: F,
) -> Result<Vec<T>, Error>
where
    F: Fn(&str) -> Result<T, ParseErrorKind>,
{
    let mut records: Vec<T> = Vec::new();
    for (idx, line) in BufReader::new(conn).byte_lines().enumerate() {
        let line = line?;
        let text = line.to_str_lossy();
        let text = text.trim_end_matches('\r');
        if text.trim().is_empty() || text.starts_with('#') {
            continue;
        }
        let record = read_line(text).map_err(|kind| ParseError{ line: idx + 1, text: text.to_string(), kind })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads [Hsp] records from the tagged hit stream.
///
/// Stops after the first error.
pub struct HitParser<'a, R: Read> {
    lines: ByteLines<BufReader<&'a mut R>>,
    lengths: &'a SeqLengths,
    state: State,
    line_no: usize,
    done: bool,
}

impl<'a, R: Read> HitParser<'a, R> {
    pub fn new(
        conn: &'a mut R,
        lengths: &'a SeqLengths,
    ) -> Self {
        HitParser{
            lines: BufReader::new(conn).byte_lines(),
            lengths,
            state: State::Outside,
            line_no: 0,
            done: false,
        }
    }
}

impl<R: Read> HitParser<'_, R> {
    fn error(
        &self,
        text: &str,
        kind: ParseErrorKind,
    ) -> Error {
        Error::Parse(ParseError{ line: self.line_no, text: text.to_string(), kind })
    }

    fn transition(
        &self,
        state: State,
        tag: &str,
        value: &str,
    ) -> Result<(State, Option<Hsp>), ParseErrorKind> {
        let missing = |needs: &'static str| ParseErrorKind::MissingPredecessor{ tag: tag.to_string(), needs };
        let next = match (tag, state) {
            ("QACC", State::Outside | State::Query(_)) => {
                if value.is_empty() {
                    return Err(ParseErrorKind::NotTagged)
                }
                let seq_len = *self.lengths.get(value).ok_or_else(|| ParseErrorKind::UnknownSequence(value.to_string()))?;
                if seq_len == 0 {
                    return Err(ParseErrorKind::EmptySequence(value.to_string()))
                }
                State::Query(QueryContext{ sequence: value.to_string(), seq_len, has_len: false })
            },
            ("QACC", _) => return Err(ParseErrorKind::Unterminated),

            ("QLEN", State::Query(mut query)) => {
                if query.has_len {
                    return Err(ParseErrorKind::DuplicateTag(tag.to_string()))
                }
                let declared = parse_number::<usize>(tag, value)?;
                if declared != query.seq_len {
                    return Err(ParseErrorKind::LengthMismatch{ sequence: query.sequence.clone(), declared, expected: query.seq_len })
                }
                query.has_len = true;
                State::Query(query)
            },
            ("QDEF", State::Query(query)) => State::Query(query),
            ("QLEN" | "QDEF", State::Outside) => return Err(missing("QACC")),
            ("QLEN" | "QDEF", _) => return Err(ParseErrorKind::Unterminated),

            ("HACC", State::Query(query)) => {
                if value.is_empty() {
                    return Err(ParseErrorKind::NotTagged)
                }
                State::Match(query, MatchContext{ model: value.to_string(), mdl_len: None })
            },
            ("HACC", State::Outside) => return Err(missing("QACC")),
            ("HACC", _) => return Err(ParseErrorKind::Unterminated),

            ("HLEN" | "SLEN", State::Match(query, mut matched)) => {
                set_once(&mut matched.mdl_len, tag, parse_number::<usize>(tag, value)?)?;
                State::Match(query, matched)
            },
            ("HDEF", State::Match(query, matched)) => State::Match(query, matched),
            ("HLEN" | "SLEN" | "HDEF", _) => return Err(missing("HACC")),

            ("HSP", state) => {
                parse_number::<usize>(tag, value)?;
                match state {
                    State::Match(query, matched) => State::Block(query, matched, HspBuilder::default()),
                    State::Block(query, matched, builder) => {
                        let hsp = builder.build(&query, &matched)?;
                        return Ok((State::Block(query, matched, HspBuilder::default()), Some(hsp)))
                    },
                    _ => return Err(missing("HACC")),
                }
            },

            ("END_MATCH", State::Match(query, _)) => State::Query(query),
            ("END_MATCH", State::Block(query, matched, builder)) => {
                let hsp = builder.build(&query, &matched)?;
                return Ok((State::Query(query), Some(hsp)))
            },
            ("END_MATCH", _) => return Err(missing("HACC")),

            ("BITSCORE" | "EVALUE" | "BIAS" | "QRANGE" | "SRANGE" | "STRAND" | "QSTRAND" | "SSTRAND" |
             "INS" | "DEL" | "QSEQ" | "SSEQ", State::Block(query, matched, mut builder)) => {
                builder.set(tag, value)?;
                match builder.qrange {
                    Some(seq) if tag == "QRANGE" && seq.stop > query.seq_len => {
                        return Err(ParseErrorKind::RangeOutsideSequence{ sequence: query.sequence.clone(), range: seq.to_string(), seq_len: query.seq_len })
                    },
                    _ => (),
                }
                State::Block(query, matched, builder)
            },
            ("BITSCORE" | "EVALUE" | "BIAS" | "QRANGE" | "SRANGE" | "STRAND" | "QSTRAND" | "SSTRAND" |
             "INS" | "DEL" | "QSEQ" | "SSEQ", _) => return Err(missing("HSP")),

            (tag, State::Block(query, matched, builder)) if IGNORED_HSP_TAGS.contains(&tag) => State::Block(query, matched, builder),
            (tag, _) if IGNORED_HSP_TAGS.contains(&tag) => return Err(missing("HSP")),

            (tag, _) => return Err(ParseErrorKind::UnknownTag(tag.to_string())),
        };
        Ok((next, None))
    }

    fn consume(
        &mut self,
        line: &str,
    ) -> Result<Option<Hsp>, ParseErrorKind> {
        let (tag, value) = match line.split_once('\t') {
            Some((tag, value)) => (tag.trim(), value.trim()),
            None => (line.trim(), ""),
        };
        if tag.contains(char::is_whitespace) {
            return Err(ParseErrorKind::NotTagged)
        }

        let state = std::mem::replace(&mut self.state, State::Outside);
        let (next, hsp) = self.transition(state, tag, value)?;
        self.state = next;
        Ok(hsp)
    }
}

impl<R: Read> Iterator for HitParser<'_, R> {
    type Item = Result<Hsp, Error>;

    fn next(
        &mut self,
    ) -> Option<Result<Hsp, Error>> {
        if self.done {
            return None
        }
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::Io(e)))
                },
                None => {
                    self.done = true;
                    return match std::mem::replace(&mut self.state, State::Outside) {
                        State::Match(..) | State::Block(..) => Some(Err(self.error("", ParseErrorKind::Unterminated))),
                        _ => None,
                    }
                },
            };
            self.line_no += 1;

            let text = line.to_str_lossy().into_owned();
            if text.trim().is_empty() {
                continue;
            }
            match self.consume(&text) {
                Ok(Some(hsp)) => return Some(Ok(hsp)),
                Ok(None) => (),
                Err(kind) => {
                    self.done = true;
                    return Some(Err(self.error(&text, kind)))
                },
            }
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use crate::SeqLengths;

    fn lengths() -> SeqLengths {
        let mut lengths = SeqLengths::new();
        lengths.insert("seq1".to_string(), 500);
        lengths.insert("seq2".to_string(), 1000);
        lengths
    }

    fn parse(data: &[u8]) -> Result<Vec<crate::Hsp>, crate::error::Error> {
        use super::HitParser;
        use std::io::Cursor;

        let lengths = lengths();
        let mut input: Cursor<Vec<u8>> = Cursor::new(data.to_vec());
        let parser = HitParser::new(&mut input, &lengths);
        parser.collect()
    }

    fn parse_error(data: &[u8]) -> crate::error::ParseError {
        match parse(data) {
            Err(crate::error::Error::Parse(e)) => e,
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn parse_single_hsp() {
        use crate::Hsp;
        use crate::Strand;
        use crate::coords::Segment;
        use crate::indel::parse_token_list;
        use crate::indel::IndelKind;

        let mut data: Vec<u8> = Vec::new();
        data.append(&mut b"QACC\tseq1\nQDEF\tsome description\nQLEN\t500\n".to_vec());
        data.append(&mut b"HACC\tmodelA\nHDEF\tmodel description\nHLEN\t1500\n".to_vec());
        data.append(&mut b"HSP\t1\nBITSCORE\t312.5\nEVALUE\t2e-85\nBIAS\t1.5\nRAWSCORE\t340\n".to_vec());
        data.append(&mut b"QRANGE\t1..500\nSRANGE\t5..507\nSTRAND\tPlus/Plus\n".to_vec());
        data.append(&mut b"INS\t\nDEL\tQ100:S105-3\n".to_vec());
        data.append(&mut b"END_MATCH\n".to_vec());

        let got = parse(&data).unwrap();
        let expected = vec![Hsp{
            sequence: "seq1".to_string(), model: "modelA".to_string(), strand: Strand::Plus,
            bitscore: 312.5, evalue: 2e-85, bias: 1.5,
            seq: Segment::new(1, 500, Strand::Plus).unwrap(),
            mdl: Segment::new(5, 507, Strand::Plus).unwrap(),
            inserts: vec![], deletes: parse_token_list("Q100:S105-3", IndelKind::Delete).unwrap(),
            seq_len: 500, mdl_len: Some(1500),
        }];

        assert_eq!(got, expected);
    }

    #[test]
    fn parse_multiple_records() {
        use crate::Strand;

        let mut data: Vec<u8> = Vec::new();
        data.append(&mut b"QACC\tseq1\nHACC\tmodelA\n".to_vec());
        data.append(&mut b"HSP\t1\nBITSCORE\t300\nEVALUE\t1e-80\nQRANGE\t1..400\nSRANGE\t1..400\n".to_vec());
        data.append(&mut b"HSP\t2\nBITSCORE\t50\nEVALUE\t1e-5\nQRANGE\t420..500\nSRANGE\t880..800\n".to_vec());
        data.append(&mut b"END_MATCH\n\n".to_vec());
        data.append(&mut b"HACC\tmodelB\nHSP\t1\nBITSCORE\t280\nEVALUE\t1e-70\nQRANGE\t1..380\nSRANGE\t11..390\n".to_vec());
        data.append(&mut b"END_MATCH\n".to_vec());
        data.append(&mut b"QACC\tseq2\nHACC\tmodelC\nEND_MATCH\n".to_vec());

        let got = parse(&data).unwrap();

        let summary: Vec<(&str, &str, f64, Strand)> = got.iter().map(|x| (x.sequence.as_str(), x.model.as_str(), x.bitscore, x.strand)).collect();
        let expected = vec![
            ("seq1", "modelA", 300.0, Strand::Plus),
            ("seq1", "modelA", 50.0, Strand::Minus),
            ("seq1", "modelB", 280.0, Strand::Plus),
        ];
        assert_eq!(summary, expected);
        assert_eq!(got[1].mdl.to_string(), "880..800:-");
        assert_eq!(got[0].bias, 0.0);
        assert_eq!(got[0].mdl_len, None);
    }

    #[test]
    fn parse_separate_strand_tags() {
        use crate::Strand;

        let mut data: Vec<u8> = Vec::new();
        data.append(&mut b"QACC\tseq1\nHACC\tmodelA\n".to_vec());
        data.append(&mut b"HSP\t1\nBITSCORE\t300\nEVALUE\t1e-80\nQRANGE\t1..400\nSRANGE\t400..1\nQSTRAND\tPlus\nSSTRAND\tMinus\n".to_vec());
        data.append(&mut b"END_MATCH\n".to_vec());

        let got = parse(&data).unwrap();
        assert_eq!(got[0].strand, Strand::Minus);
    }

    #[test]
    fn derive_tokens_from_aligned_rows() {
        use crate::indel::format_token_list;

        let mut data: Vec<u8> = Vec::new();
        data.append(&mut b"QACC\tseq1\nHACC\tmodelA\n".to_vec());
        data.append(&mut b"HSP\t1\nBITSCORE\t20\nEVALUE\t1e-2\nQRANGE\t11..21\nSRANGE\t101..112\n".to_vec());
        data.append(&mut b"QSEQ\tACGTTACG---ACG\nSSEQ\tACG--ACGTTTACG\n".to_vec());
        data.append(&mut b"END_MATCH\n".to_vec());

        let got = parse(&data).unwrap();

        assert_eq!(format_token_list(&got[0].inserts), "Q14:S103+2");
        assert_eq!(format_token_list(&got[0].deletes), "Q18:S107-3");
        assert_eq!(got[0].ungapped().unwrap().seq.to_string(), "11..13:+,16..18:+,19..21:+");
    }

    #[test]
    fn value_before_predecessor() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nBITSCORE\t12\n");
        assert_eq!(got.line, 3);
        assert_eq!(got.text, "BITSCORE\t12");
        assert_eq!(got.kind, ParseErrorKind::MissingPredecessor{ tag: "BITSCORE".to_string(), needs: "HSP" });

        let got = parse_error(b"HACC\tmodelA\n");
        assert_eq!(got.kind, ParseErrorKind::MissingPredecessor{ tag: "HACC".to_string(), needs: "QACC" });

        let got = parse_error(b"QACC\tseq1\nHSP\t1\n");
        assert_eq!(got.kind, ParseErrorKind::MissingPredecessor{ tag: "HSP".to_string(), needs: "HACC" });
    }

    #[test]
    fn non_numeric_values() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nBITSCORE\thigh\n");
        assert_eq!(got.line, 4);
        assert_eq!(got.kind, ParseErrorKind::NotNumeric("BITSCORE".to_string()));

        let got = parse_error(b"QACC\tseq1\nQLEN\tfive\n");
        assert_eq!(got.kind, ParseErrorKind::NotNumeric("QLEN".to_string()));
    }

    #[test]
    fn wrong_indel_sign() {
        use crate::error::IndelTokenError;
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nINS\tQ10:S10-2\n");
        assert_eq!(got.kind, ParseErrorKind::Indel(IndelTokenError::WrongSign("Q10:S10-2".to_string())));
    }

    #[test]
    fn duplicate_and_unknown_tags() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nEVALUE\t1\nEVALUE\t2\n");
        assert_eq!(got.line, 5);
        assert_eq!(got.kind, ParseErrorKind::DuplicateTag("EVALUE".to_string()));

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nSCORE\t2\n");
        assert_eq!(got.kind, ParseErrorKind::UnknownTag("SCORE".to_string()));

        let got = parse_error(b"QACC seq1\n");
        assert_eq!(got.kind, ParseErrorKind::NotTagged);
    }

    #[test]
    fn incomplete_block() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nBITSCORE\t10\nQRANGE\t1..10\nSRANGE\t1..10\nEND_MATCH\n");
        assert_eq!(got.line, 7);
        assert_eq!(got.kind, ParseErrorKind::Incomplete("EVALUE"));

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nBITSCORE\t10\nEVALUE\t1\nQRANGE\t1..10\nHSP\t2\n");
        assert_eq!(got.kind, ParseErrorKind::Incomplete("SRANGE"));
    }

    #[test]
    fn lengths_are_checked() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq3\n");
        assert_eq!(got.kind, ParseErrorKind::UnknownSequence("seq3".to_string()));

        let got = parse_error(b"QACC\tseq1\nQLEN\t501\n");
        assert_eq!(got.kind, ParseErrorKind::LengthMismatch{ sequence: "seq1".to_string(), declared: 501, expected: 500 });
    }

    #[test]
    fn range_past_sequence_end() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nQLEN\t500\nHACC\tmodelA\nHSP\t1\nBITSCORE\t10\nEVALUE\t1\nQRANGE\t1..2000\nSRANGE\t1..2000\nEND_MATCH\n");
        assert_eq!(got.line, 7);
        assert_eq!(got.text, "QRANGE\t1..2000");
        assert_eq!(got.kind, ParseErrorKind::RangeOutsideSequence{ sequence: "seq1".to_string(), range: "1..2000:+".to_string(), seq_len: 500 });

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nQRANGE\t600..501\n");
        assert_eq!(got.kind, ParseErrorKind::RangeOutsideSequence{ sequence: "seq1".to_string(), range: "600..501:-".to_string(), seq_len: 500 });
    }

    #[test]
    fn zero_length_sequence() {
        use super::HitParser;
        use crate::SeqLengths;
        use crate::error::Error;
        use crate::error::ParseErrorKind;
        use std::io::Cursor;

        let mut lengths = SeqLengths::new();
        lengths.insert("empty".to_string(), 0);
        let mut input: Cursor<Vec<u8>> = Cursor::new(b"QACC\tempty\n".to_vec());
        let got: Result<Vec<crate::Hsp>, Error> = HitParser::new(&mut input, &lengths).collect();

        assert!(matches!(got, Err(Error::Parse(e)) if e.kind == ParseErrorKind::EmptySequence("empty".to_string())));
    }

    #[test]
    fn unterminated_record() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nBITSCORE\t10\nEVALUE\t1\nQRANGE\t1..10\nSRANGE\t1..10\n");
        assert_eq!(got.line, 7);
        assert_eq!(got.kind, ParseErrorKind::Unterminated);

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHACC\tmodelB\n");
        assert_eq!(got.line, 3);
        assert_eq!(got.kind, ParseErrorKind::Unterminated);
    }

    #[test]
    fn strand_contradicts_ranges() {
        use crate::error::ParseErrorKind;

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nBITSCORE\t10\nEVALUE\t1\nQRANGE\t1..10\nSRANGE\t1..10\nSTRAND\tPlus/Minus\nEND_MATCH\n");
        assert_eq!(got.kind, ParseErrorKind::StrandRangeConflict("SRANGE".to_string()));

        let got = parse_error(b"QACC\tseq1\nHACC\tmodelA\nHSP\t1\nSTRAND\tsideways\n");
        assert_eq!(got.kind, ParseErrorKind::InvalidStrand("STRAND".to_string()));
    }

    #[test]
    fn stops_after_first_error() {
        use super::HitParser;
        use std::io::Cursor;

        let lengths = lengths();
        let mut input: Cursor<Vec<u8>> = Cursor::new(b"QACC\tseq9\nQACC\tseq1\n".to_vec());
        let mut parser = HitParser::new(&mut input, &lengths);

        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }
}
