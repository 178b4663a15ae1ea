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

//! Insert/delete tokens and their reconciliation into ungapped segments.
//!
//! An indel token is written `Q<seqpos>:S<mdlpos><sign><len>`:
//!
//!   - Insert `Q<q>:S<s>+<n>`: sequence positions `q..q+n-1` are inserted
//!     after model position `s`.
//!   - Delete `Q<q>:S<s>-<n>`: model positions `s..s+n-1` are deleted after
//!     sequence position `q`.
//!
//! [reconcile] walks the insert and delete lists of one HSP and returns the
//! maximal ungapped segments in both coordinate spaces. [gaps::scan_gaps]
//! derives the token lists from a pair of aligned rows.
//!
//! ## Usage
//!
//! ```rust
//! use seqclass::Strand;
//! use seqclass::coords::Segment;
//! use seqclass::indel::{parse_token_list, reconcile, IndelKind};
//!
//! let seq = Segment::new(1, 500, Strand::Plus).unwrap();
//! let mdl = Segment::new(5, 507, Strand::Plus).unwrap();
//! let deletes = parse_token_list("Q100:S105-3", IndelKind::Delete).unwrap();
//!
//! let ungapped = reconcile(&mdl, &seq, &[], &deletes).unwrap();
//!
//! assert_eq!(ungapped.mdl.to_string(), "5..104:+,108..507:+");
//! assert_eq!(ungapped.seq.to_string(), "1..100:+,101..500:+");
//! ```
//!
pub mod gaps;

use std::fmt;
use std::str::FromStr;

use crate::Strand;
use crate::coords::Coords;
use crate::coords::Segment;
use crate::error::IndelTokenError;
use crate::error::SanityError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndelKind {
    /// Gap in the model, extra residues in the sequence.
    Insert,
    /// Gap in the sequence, skipped model positions.
    Delete,
}

impl IndelKind {
    fn sign(&self) -> char {
        match self {
            IndelKind::Insert => '+',
            IndelKind::Delete => '-',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndelToken {
    pub seq_pos: usize,
    pub mdl_pos: usize,
    pub kind: IndelKind,
    pub len: usize,
}

impl fmt::Display for IndelToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Q{}:S{}{}{}", self.seq_pos, self.mdl_pos, self.kind.sign(), self.len)
    }
}

impl FromStr for IndelToken {
    type Err = IndelTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || IndelTokenError::Malformed(s.to_string());

        let (q, rest) = s.strip_prefix('Q').and_then(|x| x.split_once(":S")).ok_or_else(malformed)?;
        let sign_at = rest.find(['+', '-']).ok_or_else(malformed)?;
        let (s_pos, len) = rest.split_at(sign_at);
        let kind = if len.starts_with('+') { IndelKind::Insert } else { IndelKind::Delete };

        let seq_pos = q.parse::<usize>().map_err(|_| malformed())?;
        let mdl_pos = s_pos.parse::<usize>().map_err(|_| malformed())?;
        let len = len[1..].parse::<usize>().map_err(|_| malformed())?;

        if len == 0 {
            return Err(IndelTokenError::ZeroLength(s.to_string()))
        }

        Ok(IndelToken{ seq_pos, mdl_pos, kind, len })
    }
}

/// Parses a `;`-joined token list where every token must be of `kind`.
///
/// An empty value, `-` or `BLASTNULL` is an empty list.
pub fn parse_token_list(
    value: &str,
    kind: IndelKind,
) -> Result<Vec<IndelToken>, IndelTokenError> {
    if value.is_empty() || value == "-" || value == "BLASTNULL" {
        return Ok(Vec::new())
    }
    let mut tokens: Vec<IndelToken> = Vec::new();
    for record in value.split(';').filter(|x| !x.is_empty()) {
        let token = record.parse::<IndelToken>()?;
        if token.kind != kind {
            return Err(IndelTokenError::WrongSign(record.to_string()))
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Formats a token list, `-` if empty.
pub fn format_token_list(
    tokens: &[IndelToken],
) -> String {
    if tokens.is_empty() {
        return "-".to_string()
    }
    tokens.iter().map(|x| x.to_string()).collect::<Vec<String>>().join(";")
}

/// Maximal ungapped segments of one HSP.
///
/// Segment `i` of `mdl` and segment `i` of `seq` have equal length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UngappedSegments {
    pub mdl: Coords,
    pub seq: Coords,
}

impl UngappedSegments {
    pub fn pairs(
        &self,
    ) -> impl Iterator<Item = (&Segment, &Segment)> {
        self.mdl.segments().iter().zip(self.seq.segments().iter())
    }

    /// The longest pair, the first one on ties.
    pub fn max_length_pair(
        &self,
    ) -> Option<(Segment, Segment)> {
        let (idx, seq) = self.seq.max_length_segment()?;
        Some((self.mdl.segments()[idx], *seq))
    }
}

struct Walk {
    mdl_next: usize,
    seq_next: usize,
    mdl_stop: usize,
    seq_stop: usize,
    out: UngappedSegments,
}

impl Walk {
    fn emit(
        &mut self,
        mdl_len: usize,
        seq_len: usize,
    ) -> Result<(), SanityError> {
        if mdl_len != seq_len {
            return Err(SanityError::SegmentLengthMismatch{
                mdl: format!("{}..{}", self.mdl_next, self.mdl_next + mdl_len),
                mdl_len,
                seq: format!("{}..{}", self.seq_next, self.seq_next + seq_len),
                seq_len,
            })
        }
        if mdl_len == 0 {
            return Ok(())
        }
        let (mdl_next, seq_next) = (self.mdl_next, self.seq_next);
        let out_of_order = |_| SanityError::EventOutOfOrder{ token: "segment".to_string(), seq_next, mdl_next };
        let mdl = Segment::new(mdl_next, mdl_next + mdl_len - 1, Strand::Plus).map_err(out_of_order)?;
        let seq = Segment::new(seq_next, seq_next + seq_len - 1, Strand::Plus).map_err(out_of_order)?;
        self.out.mdl.push(mdl).map_err(out_of_order)?;
        self.out.seq.push(seq).map_err(out_of_order)?;
        Ok(())
    }

    fn step(
        &mut self,
        token: &IndelToken,
    ) -> Result<(), SanityError> {
        let behind = SanityError::EventOutOfOrder{ token: token.to_string(), seq_next: self.seq_next, mdl_next: self.mdl_next };

        // Positions right after the ungapped run that precedes `token`.
        let (seq_end, mdl_end, seq_after, mdl_after) = match token.kind {
            IndelKind::Insert => (token.seq_pos, token.mdl_pos + 1, token.seq_pos + token.len, token.mdl_pos + 1),
            IndelKind::Delete => (token.seq_pos + 1, token.mdl_pos, token.seq_pos + 1, token.mdl_pos + token.len),
        };
        if seq_end < self.seq_next || mdl_end < self.mdl_next {
            return Err(behind)
        }

        self.emit(mdl_end - self.mdl_next, seq_end - self.seq_next)?;

        if seq_after > self.seq_stop + 1 || mdl_after > self.mdl_stop + 1 {
            return Err(SanityError::WalkOvershoot{ token: token.to_string(), seq_stop: self.seq_stop, mdl_stop: self.mdl_stop })
        }
        self.seq_next = seq_after;
        self.mdl_next = mdl_after;
        Ok(())
    }

    fn finish(
        mut self,
    ) -> Result<UngappedSegments, SanityError> {
        let mdl_len = self.mdl_stop + 1 - self.mdl_next;
        let seq_len = self.seq_stop + 1 - self.seq_next;
        self.emit(mdl_len, seq_len)?;
        Ok(self.out)
    }
}

/// Reconstructs the maximal ungapped segments of an HSP.
///
/// `mdl` and `seq` are the outer aligned ranges in a strand-normalized view,
/// both read as ascending. `inserts` and `deletes` must each be in
/// coordinate order.
///
/// The lists are merged with a two-pointer scan. An event comes next if both
/// its sequence and model positions are `<=` those of the competing event.
///
/// ## Errors
///
/// Returns [SanityError] if two events cannot be ordered, an ungapped run
/// has different lengths in the two coordinate spaces, or an event walks
/// past the end of the declared ranges.
///
pub fn reconcile(
    mdl: &Segment,
    seq: &Segment,
    inserts: &[IndelToken],
    deletes: &[IndelToken],
) -> Result<UngappedSegments, SanityError> {
    let mut walk = Walk{
        mdl_next: mdl.start, seq_next: seq.start,
        mdl_stop: mdl.stop, seq_stop: seq.stop,
        out: UngappedSegments::default(),
    };

    let mut ins_idx = 0;
    let mut del_idx = 0;
    loop {
        let event = match (inserts.get(ins_idx), deletes.get(del_idx)) {
            (Some(ins), Some(del)) => {
                let ins_first = ins.seq_pos <= del.seq_pos && ins.mdl_pos <= del.mdl_pos;
                let del_first = del.seq_pos <= ins.seq_pos && del.mdl_pos <= ins.mdl_pos;
                match (ins_first, del_first) {
                    (true, false) => { ins_idx += 1; ins },
                    (false, true) => { del_idx += 1; del },
                    _ => return Err(SanityError::AmbiguousEventOrder{ insert: ins.to_string(), delete: del.to_string() }),
                }
            },
            (Some(ins), None) => { ins_idx += 1; ins },
            (None, Some(del)) => { del_idx += 1; del },
            (None, None) => break,
        };
        walk.step(event)?;
    }

    walk.finish()
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn parse_and_format_tokens() {
        use super::IndelToken;
        use super::IndelKind;

        let got = "Q100:S105-3".parse::<IndelToken>().unwrap();
        let expected = IndelToken{ seq_pos: 100, mdl_pos: 105, kind: IndelKind::Delete, len: 3 };
        assert_eq!(got, expected);
        assert_eq!(got.to_string(), "Q100:S105-3");

        let got = "Q21:S20+2".parse::<IndelToken>().unwrap();
        let expected = IndelToken{ seq_pos: 21, mdl_pos: 20, kind: IndelKind::Insert, len: 2 };
        assert_eq!(got, expected);
    }

    #[test]
    fn parse_token_errors() {
        use super::IndelToken;
        use crate::error::IndelTokenError;

        assert!(matches!("100:S105-3".parse::<IndelToken>(), Err(IndelTokenError::Malformed(_))));
        assert!(matches!("Q100:S105x3".parse::<IndelToken>(), Err(IndelTokenError::Malformed(_))));
        assert!(matches!("Q100:S105-".parse::<IndelToken>(), Err(IndelTokenError::Malformed(_))));
        assert!(matches!("Qa:S105+3".parse::<IndelToken>(), Err(IndelTokenError::Malformed(_))));
        assert!(matches!("Q100:S105+0".parse::<IndelToken>(), Err(IndelTokenError::ZeroLength(_))));
    }

    #[test]
    fn parse_token_list_checks_sign() {
        use super::parse_token_list;
        use super::IndelKind;
        use crate::error::IndelTokenError;

        let got = parse_token_list("Q10:S12+1;Q40:S41+2", IndelKind::Insert).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].seq_pos, 40);

        let got = parse_token_list("Q10:S12+1;Q40:S41-2", IndelKind::Insert);
        assert_eq!(got, Err(IndelTokenError::WrongSign("Q40:S41-2".to_string())));

        let got = parse_token_list("Q10:S12+1", IndelKind::Delete);
        assert_eq!(got, Err(IndelTokenError::WrongSign("Q10:S12+1".to_string())));

        assert!(parse_token_list("", IndelKind::Delete).unwrap().is_empty());
        assert!(parse_token_list("-", IndelKind::Delete).unwrap().is_empty());
        assert!(parse_token_list("BLASTNULL", IndelKind::Insert).unwrap().is_empty());
    }

    #[test]
    fn format_token_list_empty_and_joined() {
        use super::format_token_list;
        use super::parse_token_list;
        use super::IndelKind;

        assert_eq!(format_token_list(&[]), "-");
        let tokens = parse_token_list("Q10:S12+1;Q40:S41+2", IndelKind::Insert).unwrap();
        assert_eq!(format_token_list(&tokens), "Q10:S12+1;Q40:S41+2");
    }

    #[test]
    fn reconcile_without_indels() {
        use super::reconcile;
        use crate::Strand;
        use crate::coords::Segment;

        let seq = Segment::new(11, 60, Strand::Plus).unwrap();
        let mdl = Segment::new(101, 150, Strand::Plus).unwrap();
        let got = reconcile(&mdl, &seq, &[], &[]).unwrap();

        assert_eq!(got.mdl.to_string(), "101..150:+");
        assert_eq!(got.seq.to_string(), "11..60:+");
    }

    #[test]
    fn reconcile_single_delete() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;

        let seq = Segment::new(1, 500, Strand::Plus).unwrap();
        let mdl = Segment::new(5, 507, Strand::Plus).unwrap();
        let deletes = parse_token_list("Q100:S105-3", IndelKind::Delete).unwrap();

        let got = reconcile(&mdl, &seq, &[], &deletes).unwrap();

        assert_eq!(got.mdl.len(), 2);
        assert_eq!(got.seq.len(), 2);
        got.pairs().for_each(|(mdl, seq)| assert_eq!(mdl.len(), seq.len()));
        assert_eq!(got.mdl.total_length(), mdl.len() - 3);
        assert_eq!(got.seq.total_length(), seq.len());
        assert_eq!(got.mdl.segments()[1].start - got.mdl.segments()[0].stop, 4);
    }

    #[test]
    fn reconcile_mixed_indels_totals() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;

        // seq 1..20 = mdl 1..20, ins 21..22, seq 23..50 = mdl 21..48,
        // del mdl 49..51, seq 51..100 = mdl 52..101
        let seq = Segment::new(1, 100, Strand::Plus).unwrap();
        let mdl = Segment::new(1, 101, Strand::Plus).unwrap();
        let inserts = parse_token_list("Q21:S20+2", IndelKind::Insert).unwrap();
        let deletes = parse_token_list("Q50:S49-3", IndelKind::Delete).unwrap();

        let got = reconcile(&mdl, &seq, &inserts, &deletes).unwrap();

        assert_eq!(got.mdl.to_string(), "1..20:+,21..48:+,52..101:+");
        assert_eq!(got.seq.to_string(), "1..20:+,23..50:+,51..100:+");
        assert_eq!(got.mdl.total_length(), mdl.len() - 3);
        assert_eq!(got.seq.total_length(), seq.len() - 2);
        assert_eq!(got.mdl.total_length(), got.seq.total_length());

        let (mdl_max, seq_max) = got.max_length_pair().unwrap();
        assert_eq!(mdl_max.to_string(), "52..101:+");
        assert_eq!(seq_max.to_string(), "51..100:+");
    }

    #[test]
    fn reconcile_adjacent_delete_then_insert() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;

        // seq 1..10 = mdl 1..10, del mdl 11..12, ins seq 11..13, seq 14..20 = mdl 13..19
        let seq = Segment::new(1, 20, Strand::Plus).unwrap();
        let mdl = Segment::new(1, 19, Strand::Plus).unwrap();
        let inserts = parse_token_list("Q11:S12+3", IndelKind::Insert).unwrap();
        let deletes = parse_token_list("Q10:S11-2", IndelKind::Delete).unwrap();

        let got = reconcile(&mdl, &seq, &inserts, &deletes).unwrap();

        assert_eq!(got.mdl.to_string(), "1..10:+,13..19:+");
        assert_eq!(got.seq.to_string(), "1..10:+,14..20:+");
    }

    #[test]
    fn reconcile_length_mismatch_is_fatal() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;
        use crate::error::SanityError;

        let seq = Segment::new(1, 500, Strand::Plus).unwrap();
        let mdl = Segment::new(6, 508, Strand::Plus).unwrap();
        let deletes = parse_token_list("Q100:S105-3", IndelKind::Delete).unwrap();

        let got = reconcile(&mdl, &seq, &[], &deletes);
        assert!(matches!(got, Err(SanityError::SegmentLengthMismatch{ mdl_len: 99, seq_len: 100, .. })));
    }

    #[test]
    fn reconcile_identical_positions_are_ambiguous() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;
        use crate::error::SanityError;

        let seq = Segment::new(1, 100, Strand::Plus).unwrap();
        let mdl = Segment::new(1, 100, Strand::Plus).unwrap();
        let inserts = parse_token_list("Q50:S50+2", IndelKind::Insert).unwrap();
        let deletes = parse_token_list("Q50:S50-2", IndelKind::Delete).unwrap();

        let got = reconcile(&mdl, &seq, &inserts, &deletes);
        assert!(matches!(got, Err(SanityError::AmbiguousEventOrder{ .. })));
    }

    #[test]
    fn reconcile_overshoot_is_fatal() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;
        use crate::error::SanityError;

        let seq = Segment::new(1, 100, Strand::Plus).unwrap();
        let mdl = Segment::new(1, 95, Strand::Plus).unwrap();
        let inserts = parse_token_list("Q91:S90+20", IndelKind::Insert).unwrap();

        let got = reconcile(&mdl, &seq, &inserts, &[]);
        assert!(matches!(got, Err(SanityError::WalkOvershoot{ .. })));
    }

    #[test]
    fn reconcile_event_before_range_is_fatal() {
        use super::reconcile;
        use super::parse_token_list;
        use super::IndelKind;
        use crate::Strand;
        use crate::coords::Segment;
        use crate::error::SanityError;

        let seq = Segment::new(50, 100, Strand::Plus).unwrap();
        let mdl = Segment::new(50, 103, Strand::Plus).unwrap();
        let deletes = parse_token_list("Q10:S10-3", IndelKind::Delete).unwrap();

        let got = reconcile(&mdl, &seq, &[], &deletes);
        assert!(matches!(got, Err(SanityError::EventOutOfOrder{ .. })));
    }
}
