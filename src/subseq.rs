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

//! Select the flanks of a sequence that need realignment.
//!
//! ## Usage
//!
//! ```rust
//! use seqclass::Strand;
//! use seqclass::coords::Segment;
//! use seqclass::subseq::{select_subsequences, Flank};
//!
//! let seed = Segment::new(50, 950, Strand::Plus).unwrap();
//! let specs = select_subsequences("seq1", 1000, &seed, 10).unwrap();
//!
//! assert_eq!(specs.len(), 2);
//! assert_eq!((specs[0].start, specs[0].stop, specs[0].flank), (1, 59, Flank::FivePrime));
//! assert_eq!((specs[1].start, specs[1].stop, specs[1].flank), (941, 1000, Flank::ThreePrime));
//! assert_eq!(specs[1].name, "seq1/941-1000");
//! ```
//!
use std::fmt;
use std::str::FromStr;

use crate::coords::Segment;
use crate::error::SanityError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flank {
    FivePrime,
    ThreePrime,
    /// Both flanks collapsed into the whole sequence.
    Full,
}

impl fmt::Display for Flank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Flank::FivePrime => write!(f, "5p"),
            Flank::ThreePrime => write!(f, "3p"),
            Flank::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Flank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5p" => Ok(Flank::FivePrime),
            "3p" => Ok(Flank::ThreePrime),
            "full" => Ok(Flank::Full),
            _ => Err(format!("'{}' is not a valid Flank", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubsequenceSpec {
    /// `<source>/<start>-<stop>`
    pub name: String,
    pub source: String,
    pub start: usize,
    pub stop: usize,
    pub flank: Flank,
}

impl SubsequenceSpec {
    pub fn new(
        source: &str,
        start: usize,
        stop: usize,
        flank: Flank,
    ) -> Self {
        SubsequenceSpec{ name: subsequence_name(source, start, stop), source: source.to_string(), start, stop, flank }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    /// Residues of the subsequence in `residues` of the source sequence.
    pub fn extract<'a>(
        &self,
        residues: &'a [u8],
    ) -> Result<&'a [u8], SanityError> {
        if self.start == 0 || self.stop > residues.len() || self.start > self.stop {
            return Err(SanityError::OutOfRange{
                sequence: self.source.clone(),
                segment: format!("{}..{}", self.start, self.stop),
                seq_len: residues.len(),
            })
        }
        Ok(&residues[(self.start - 1)..self.stop])
    }
}

pub fn subsequence_name(
    source: &str,
    start: usize,
    stop: usize,
) -> String {
    format!("{}/{}-{}", source, start, stop)
}

/// Selects the flanks of `source` outside the ungapped segment `seed`.
///
/// The 5' flank is `[1, a+overhang-1]` if `a > 1` and the 3' flank is
/// `[b-overhang+1, L]` if `b < L`, both clamped to the sequence. Flanks that
/// overlap are collapsed into one spanning `[1, L]`.
///
/// ## Errors
///
/// Returns [SanityError::OutOfRange] if `seed` does not fit in `seq_len`.
pub fn select_subsequences(
    source: &str,
    seq_len: usize,
    seed: &Segment,
    overhang: usize,
) -> Result<Vec<SubsequenceSpec>, SanityError> {
    if seed.stop > seq_len {
        return Err(SanityError::OutOfRange{ sequence: source.to_string(), segment: seed.to_string(), seq_len })
    }
    let (a, b) = (seed.start, seed.stop);

    let five = if a > 1 { Some((a + overhang - 1).min(seq_len)) } else { None };
    let three = if b < seq_len { Some((b + 1).saturating_sub(overhang).max(1)) } else { None };

    let specs = match (five, three) {
        (None, None) => vec![],
        (Some(stop), Some(start)) if stop >= start => {
            vec![SubsequenceSpec::new(source, 1, seq_len, Flank::Full)]
        },
        (five, three) => {
            let mut specs: Vec<SubsequenceSpec> = Vec::new();
            if let Some(stop) = five {
                specs.push(SubsequenceSpec::new(source, 1, stop, Flank::FivePrime));
            }
            if let Some(start) = three {
                specs.push(SubsequenceSpec::new(source, start, seq_len, Flank::ThreePrime));
            }
            specs
        },
    };
    Ok(specs)
}
