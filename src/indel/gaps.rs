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

//! Derive indel tokens from a pair of aligned rows.
use crate::Strand;
use crate::error::SanityError;
use crate::indel::IndelKind;
use crate::indel::IndelToken;

fn is_gap(residue: u8) -> bool {
    residue == b'-' || residue == b'.'
}

enum GapState {
    NotInGap,
    InGap(IndelToken),
}

/// Scans aligned sequence and model rows for inserts and deletes.
///
/// `seq_start` and `mdl_start` are the positions of the first residue of
/// each row. Model positions advance by -1 per residue when `mdl_strand` is
/// [Strand::Minus] and by +1 otherwise.
///
/// Returns `(inserts, deletes)` in alignment order.
pub fn scan_gaps(
    seq_aln: &[u8],
    mdl_aln: &[u8],
    seq_start: usize,
    mdl_start: usize,
    mdl_strand: Strand,
) -> Result<(Vec<IndelToken>, Vec<IndelToken>), SanityError> {
    if seq_aln.len() != mdl_aln.len() {
        return Err(SanityError::RowLengthMismatch(seq_aln.len(), mdl_aln.len()))
    }
    let dir: i64 = if mdl_strand == Strand::Minus { -1 } else { 1 };

    let mut inserts: Vec<IndelToken> = Vec::new();
    let mut deletes: Vec<IndelToken> = Vec::new();

    let mut seq_next = seq_start as i64;
    let mut mdl_next = mdl_start as i64;
    let mut state = GapState::NotInGap;

    for (col, (seq_res, mdl_res)) in seq_aln.iter().zip(mdl_aln.iter()).enumerate() {
        let kind = match (is_gap(*seq_res), is_gap(*mdl_res)) {
            (false, false) => None,
            (false, true) => Some(IndelKind::Insert),
            (true, false) => Some(IndelKind::Delete),
            (true, true) => return Err(SanityError::EmptyColumn(col + 1)),
        };

        state = match (state, kind) {
            (GapState::InGap(mut token), Some(kind)) if token.kind == kind => {
                token.len += 1;
                GapState::InGap(token)
            },
            (prev, kind) => {
                if let GapState::InGap(token) = prev {
                    match token.kind {
                        IndelKind::Insert => inserts.push(token),
                        IndelKind::Delete => deletes.push(token),
                    }
                }
                match kind {
                    None => GapState::NotInGap,
                    Some(kind) => {
                        let (seq_pos, mdl_pos) = match kind {
                            IndelKind::Insert => (seq_next, mdl_next - dir),
                            IndelKind::Delete => (seq_next - 1, mdl_next),
                        };
                        if seq_pos < 1 || mdl_pos < 1 {
                            return Err(SanityError::PositionUnderflow(col + 1))
                        }
                        GapState::InGap(IndelToken{ seq_pos: seq_pos as usize, mdl_pos: mdl_pos as usize, kind, len: 1 })
                    },
                }
            },
        };

        if !is_gap(*seq_res) {
            seq_next += 1;
        }
        if !is_gap(*mdl_res) {
            mdl_next += dir;
        }
    }

    if let GapState::InGap(token) = state {
        match token.kind {
            IndelKind::Insert => inserts.push(token),
            IndelKind::Delete => deletes.push(token),
        }
    }

    Ok((inserts, deletes))
}
