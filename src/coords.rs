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

//! Coordinate segments and coords strings.
//!
//! A [Segment] is a 1-based inclusive interval with a [Strand]. It is always
//! stored with `start <= stop`; the text form `<start>..<stop>:<strand>`
//! writes plus and `?` segments ascending and minus segments descending.
//!
//! A coords string joins segments with `,`, eg. `1..100:+,104..500:+`. The
//! validated in-memory form is [Coords].
//!
//! ## Usage
//!
//! ```rust
//! use seqclass::Strand;
//! use seqclass::coords::{Coords, Segment, max_length_segment};
//!
//! let seg: Segment = "500..104:-".parse().unwrap();
//! assert_eq!((seg.start, seg.stop, seg.strand), (104, 500, Strand::Minus));
//! assert_eq!(seg.to_string(), "500..104:-");
//!
//! let (longest, len) = max_length_segment("1..100:+,104..500:+").unwrap();
//! assert_eq!(longest.to_string(), "104..500:+");
//! assert_eq!(len, 397);
//! ```
//!
use std::fmt;
use std::str::FromStr;

use crate::Strand;
use crate::error::CoordinateError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: usize,
    pub stop: usize,
    pub strand: Strand,
}

impl Segment {
    /// Creates a segment, requiring `1 <= start <= stop`.
    pub fn new(
        start: usize,
        stop: usize,
        strand: Strand,
    ) -> Result<Self, CoordinateError> {
        if start == 0 {
            return Err(CoordinateError::ZeroPosition(format!("{}..{}", start, stop)))
        }
        if start > stop {
            return Err(CoordinateError::Descending{ start, stop })
        }
        Ok(Segment{ start, stop, strand })
    }

    /// Creates a segment from two positions written in alignment order.
    ///
    /// The strand is `+` if `from < to`, `-` if `from > to` and `?` for a
    /// single position.
    pub fn from_oriented(
        from: usize,
        to: usize,
    ) -> Result<Self, CoordinateError> {
        match from.cmp(&to) {
            std::cmp::Ordering::Less => Segment::new(from, to, Strand::Plus),
            std::cmp::Ordering::Greater => Segment::new(to, from, Strand::Minus),
            std::cmp::Ordering::Equal => Segment::new(from, to, Strand::Ambiguous),
        }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.stop
    }

    pub fn contains_segment(&self, other: &Segment) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }

    pub fn overlaps(&self, other: &Segment) -> bool {
        self.start <= other.stop && other.start <= self.stop
    }

    /// Positions in the order they appear on `strand`.
    pub fn oriented(&self) -> (usize, usize) {
        match self.strand {
            Strand::Minus => (self.stop, self.start),
            _ => (self.start, self.stop),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (from, to) = self.oriented();
        write!(f, "{}..{}:{}", from, to, self.strand)
    }
}

impl FromStr for Segment {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoordinateError::Malformed(s.to_string());

        let (range, strand) = s.rsplit_once(':').ok_or_else(malformed)?;
        let (from, to) = range.split_once("..").ok_or_else(malformed)?;
        let from = from.parse::<usize>().map_err(|_| malformed())?;
        let to = to.parse::<usize>().map_err(|_| malformed())?;
        let strand = strand.parse::<Strand>().map_err(|_| malformed())?;

        if from == 0 || to == 0 {
            return Err(CoordinateError::ZeroPosition(s.to_string()))
        }

        let ascending = from <= to;
        let fits = match strand {
            Strand::Plus | Strand::Ambiguous => ascending,
            Strand::Minus => from >= to,
        };
        if !fits {
            return Err(CoordinateError::Orientation(s.to_string()))
        }

        let (start, stop) = if ascending { (from, to) } else { (to, from) };
        Segment::new(start, stop, strand)
    }
}

/// An ordered list of non-overlapping segments.
///
/// Plus and `?` segments must ascend, minus segments must descend. Adjacent
/// segments are kept as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coords {
    segments: Vec<Segment>,
}

impl Coords {
    pub fn new() -> Self {
        Coords::default()
    }

    /// Appends `segment` after checking order, overlap and strand.
    pub fn push(
        &mut self,
        segment: Segment,
    ) -> Result<(), CoordinateError> {
        if let Some(prev) = self.segments.last() {
            let descending = prev.strand == Strand::Minus;
            if descending != (segment.strand == Strand::Minus) {
                return Err(CoordinateError::MixedStrands{ prev: prev.to_string(), next: segment.to_string() })
            }
            let ordered = if descending { segment.stop < prev.start } else { segment.start > prev.stop };
            if !ordered {
                return Err(CoordinateError::Unordered{ prev: prev.to_string(), next: segment.to_string() })
            }
        }
        self.segments.push(segment);
        Ok(())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Summed length of all segments.
    pub fn total_length(&self) -> usize {
        self.segments.iter().map(|x| x.len()).sum()
    }

    /// Returns the longest segment and its length, the first one on ties.
    pub fn max_length_segment(
        &self,
    ) -> Option<(usize, &Segment)> {
        let mut best: Option<(usize, &Segment)> = None;
        for (idx, segment) in self.segments.iter().enumerate() {
            match best {
                Some((_, current)) if current.len() >= segment.len() => (),
                _ => best = Some((idx, segment)),
            }
        }
        best
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut formatted = String::new();
        for segment in &self.segments {
            formatted = append_segment(&formatted, segment);
        }
        write!(f, "{}", formatted)
    }
}

impl FromStr for Coords {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CoordinateError::Empty)
        }
        let mut coords = Coords::new();
        for record in s.split(',') {
            coords.push(record.parse::<Segment>()?)?;
        }
        Ok(coords)
    }
}

/// Appends `segment` to the coords string `coords`.
///
/// Purely textual: the result is not validated and adjacent segments are not
/// merged.
pub fn append_segment(
    coords: &str,
    segment: &Segment,
) -> String {
    if coords.is_empty() {
        segment.to_string()
    } else {
        format!("{},{}", coords, segment)
    }
}

/// Returns the longest segment in the coords string and its length.
///
/// Ties go to the first segment in coordinate order.
pub fn max_length_segment(
    coords: &str,
) -> Result<(Segment, usize), CoordinateError> {
    let parsed = coords.parse::<Coords>()?;
    let (_, segment) = parsed.max_length_segment().ok_or(CoordinateError::Empty)?;
    Ok((*segment, segment.len()))
}
