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

//! Splice realigned flanks around an ungapped seed.
//!
//! A flank alignment is one aligned row of a flank subsequence against the
//! whole model, plus the reference row (`#=GC RF`) of the model. Reference
//! columns holding a gap character are insert columns, every other column
//! consumes one model position starting from 1.
//!
//! The 5' flank is cut after the first column where exactly `a-1` sequence
//! positions and `mdl_start-1` model positions have been consumed, which may
//! be a deletion column. The 3' flank is cut before the first column where
//! exactly `b` sequence positions and `mdl_stop` model positions have been
//! consumed. Boundaries that
//! cannot be placed are reported as [Joined::BoundaryMismatch].
//!
use indexmap::IndexMap;

use crate::coords::Segment;
use crate::error::SanityError;
use crate::subseq::Flank;
use crate::subseq::SubsequenceSpec;

/// Annotation character of the seed columns.
pub const SEED_MARKER: u8 = b'x';

fn is_gap(c: u8) -> bool {
    c == b'-' || c == b'.' || c == b'~'
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlankAlignment {
    pub name: String,
    pub aligned: Vec<u8>,
    pub rf: Vec<u8>,
}

/// Ungapped region of a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seed {
    pub seq: Segment,
    pub mdl: Segment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinedAlignment {
    pub sequence: String,
    pub aligned: Vec<u8>,
    pub annotation: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Joined {
    Alignment(JoinedAlignment),
    /// Flanks whose boundary column could not be found.
    BoundaryMismatch(Vec<Flank>),
}

fn check_rows(
    aln: &FlankAlignment,
) -> Result<(), SanityError> {
    if aln.aligned.len() != aln.rf.len() {
        return Err(SanityError::RowLengthMismatch(aln.aligned.len(), aln.rf.len()))
    }
    Ok(())
}

fn five_prime_boundary(
    spec: &SubsequenceSpec,
    aln: &FlankAlignment,
    seed: &Seed,
) -> Option<usize> {
    let (seq_target, mdl_target) = (seed.seq.start - 1, seed.mdl.start - 1);
    let mut seq_pos = spec.start - 1;
    let mut mdl_pos = 0;
    if seq_pos == seq_target && mdl_pos == mdl_target {
        return Some(0)
    }
    for (col, (res, rf)) in aln.aligned.iter().zip(aln.rf.iter()).enumerate() {
        if !is_gap(*rf) {
            mdl_pos += 1;
        }
        if !is_gap(*res) {
            seq_pos += 1;
        }
        if seq_pos > seq_target || mdl_pos > mdl_target {
            return None
        }
        if seq_pos == seq_target && mdl_pos == mdl_target {
            return Some(col + 1)
        }
    }
    None
}

fn three_prime_boundary(
    spec: &SubsequenceSpec,
    aln: &FlankAlignment,
    seed: &Seed,
) -> Option<usize> {
    let (seq_target, mdl_target) = (seed.seq.stop, seed.mdl.stop);
    let mut seq_pos = spec.start - 1;
    let mut mdl_pos = 0;
    for (col, (res, rf)) in aln.aligned.iter().zip(aln.rf.iter()).enumerate() {
        if seq_pos > seq_target || mdl_pos > mdl_target {
            return None
        }
        if seq_pos == seq_target && mdl_pos == mdl_target {
            return Some(col)
        }
        if !is_gap(*res) {
            seq_pos += 1;
        }
        if !is_gap(*rf) {
            mdl_pos += 1;
        }
    }
    if seq_pos == seq_target && mdl_pos == mdl_target {
        return Some(aln.aligned.len())
    }
    None
}

fn verify(
    sequence: &str,
    residues: &[u8],
    aligned: &[u8],
) -> Result<(), SanityError> {
    let ungapped: Vec<u8> = aligned.iter().filter(|x| !is_gap(**x)).copied().collect();
    if !ungapped.eq_ignore_ascii_case(residues) {
        return Err(SanityError::SequenceNotReproduced(sequence.to_string()))
    }
    Ok(())
}

/// Uses a realignment of the whole sequence as is.
pub fn take_whole(
    sequence: &str,
    residues: &[u8],
    aln: &FlankAlignment,
) -> Result<JoinedAlignment, SanityError> {
    check_rows(aln)?;
    verify(sequence, residues, &aln.aligned)?;
    Ok(JoinedAlignment{ sequence: sequence.to_string(), aligned: aln.aligned.clone(), annotation: aln.rf.clone() })
}

/// Joins the 5' flank, the seed and the 3' flank of `sequence`.
///
/// A flank given as None contributes no columns.
///
/// ## Errors
///
/// Returns [SanityError] if the seed is not ungapped or lies outside
/// `residues`, a flank has rows of different lengths, or the joined row does
/// not reproduce `residues`.
pub fn join_alignments(
    sequence: &str,
    residues: &[u8],
    seed: &Seed,
    five: Option<(&SubsequenceSpec, &FlankAlignment)>,
    three: Option<(&SubsequenceSpec, &FlankAlignment)>,
) -> Result<Joined, SanityError> {
    if seed.seq.len() != seed.mdl.len() {
        return Err(SanityError::SeedNotUngapped(sequence.to_string()))
    }
    if seed.seq.stop > residues.len() {
        return Err(SanityError::OutOfRange{ sequence: sequence.to_string(), segment: seed.seq.to_string(), seq_len: residues.len() })
    }

    let mut mismatches: Vec<Flank> = Vec::new();
    let mut aligned: Vec<u8> = Vec::new();
    let mut annotation: Vec<u8> = Vec::new();
    let mut tail: (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());

    if let Some((spec, aln)) = five {
        check_rows(aln)?;
        match five_prime_boundary(spec, aln, seed) {
            Some(cut) => {
                aligned.extend_from_slice(&aln.aligned[..cut]);
                annotation.extend_from_slice(&aln.rf[..cut]);
            },
            None => mismatches.push(Flank::FivePrime),
        }
    }

    if let Some((spec, aln)) = three {
        check_rows(aln)?;
        match three_prime_boundary(spec, aln, seed) {
            Some(cut) => tail = (aln.aligned[cut..].to_vec(), aln.rf[cut..].to_vec()),
            None => mismatches.push(Flank::ThreePrime),
        }
    }

    if !mismatches.is_empty() {
        return Ok(Joined::BoundaryMismatch(mismatches))
    }

    aligned.extend_from_slice(&residues[(seed.seq.start - 1)..seed.seq.stop]);
    annotation.extend(std::iter::repeat(SEED_MARKER).take(seed.seq.len()));
    aligned.append(&mut tail.0);
    annotation.append(&mut tail.1);

    verify(sequence, residues, &aligned)?;

    Ok(Joined::Alignment(JoinedAlignment{ sequence: sequence.to_string(), aligned, annotation }))
}

fn find_flank<'a>(
    sequence: &str,
    spec: &SubsequenceSpec,
    flanks: &'a IndexMap<String, FlankAlignment>,
) -> Result<&'a FlankAlignment, SanityError> {
    flanks.get(&spec.name).ok_or_else(|| SanityError::MissingFlank{ sequence: sequence.to_string(), side: spec.flank.to_string() })
}

/// Joins `sequence` from the flank alignments named after `specs`.
///
/// A [Flank::Full] spec means the whole realignment is used as is.
pub fn join_sequence(
    sequence: &str,
    residues: &[u8],
    seed: &Seed,
    specs: &[SubsequenceSpec],
    flanks: &IndexMap<String, FlankAlignment>,
) -> Result<Joined, SanityError> {
    if let Some(full) = specs.iter().find(|x| x.flank == Flank::Full) {
        let aln = find_flank(sequence, full, flanks)?;
        return Ok(Joined::Alignment(take_whole(sequence, residues, aln)?))
    }

    let mut five: Option<(&SubsequenceSpec, &FlankAlignment)> = None;
    let mut three: Option<(&SubsequenceSpec, &FlankAlignment)> = None;
    for spec in specs {
        let aln = find_flank(sequence, spec, flanks)?;
        match spec.flank {
            Flank::FivePrime => five = Some((spec, aln)),
            Flank::ThreePrime => three = Some((spec, aln)),
            Flank::Full => (),
        }
    }

    join_alignments(sequence, residues, seed, five, three)
}
