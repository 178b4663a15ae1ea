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

//! Printers for the tab-separated outputs.
//!
//! [SummaryPrinter] converts summarized hits into model summary lines and
//! returns 1 line at a time using next(). The other formats are written with
//! the `format_*` functions of their modules.
//!
//! ## Usage
//!
//! ### Print the summed model summary
//!
//! ```rust
//! use seqclass::{Hsp, Strand};
//! use seqclass::aggregate::summarize;
//! use seqclass::coords::Segment;
//! use seqclass::printer::SummaryPrinter;
//!
//! let hit = |model: &str, score: f64, start: usize, stop: usize| Hsp{
//!     sequence: "seq1".to_string(), model: model.to_string(), strand: Strand::Plus,
//!     bitscore: score, evalue: 1e-10, bias: 0.0,
//!     seq: Segment::new(start, stop, Strand::Plus).unwrap(),
//!     mdl: Segment::new(start, stop, Strand::Plus).unwrap(),
//!     inserts: vec![], deletes: vec![], seq_len: 100, mdl_len: None,
//! };
//! let hits = vec![hit("modelA", 50.0, 1, 60), hit("modelB", 45.0, 1, 100), hit("modelA", 30.0, 50, 100)];
//! let (aggregator, rows) = summarize(&hits);
//!
//! let mut printer = SummaryPrinter::new(&rows, &aggregator, true);
//!
//! let mut output: Vec<u8> = Vec::new();
//! for mut line in printer.by_ref() {
//!     output.append(&mut line);
//! }
//!
//! // Expect this plain text output
//! //   modelA    seq1    80.0    1     60     +    [.    N    100
//! //   modelB    seq1    45.0    1     100    +    []    N    100
//! //   modelA    seq1    0.0     50    100    +    .]    Y    100
//! //
//! let mut expected: Vec<u8> = Vec::new();
//! expected.append(&mut b"modelA\tseq1\t80.0\t1\t60\t+\t[.\tN\t100\n".to_vec());
//! expected.append(&mut b"modelB\tseq1\t45.0\t1\t100\t+\t[]\tN\t100\n".to_vec());
//! expected.append(&mut b"modelA\tseq1\t0.0\t50\t100\t+\t.]\tY\t100\n".to_vec());
//!
//! assert_eq!(output, expected);
//! ```
//!

use crate::SummaryRow;
use crate::aggregate::AggregateKey;
use crate::aggregate::Observed;
use crate::aggregate::ScoreAggregator;

use summary::summary_line;

// Format specific implementations
pub mod classification;
pub mod indel_detail;
pub mod stockholm;
pub mod subseq;
pub mod summary;

/// Formats a score so that it parses back to the same value.
///
/// Whole numbers keep one decimal.
pub fn format_score(
    score: f64,
) -> String {
    if score.is_finite() && score.fract() == 0.0 {
        format!("{:.1}", score)
    } else {
        format!("{}", score)
    }
}

pub struct SummaryPrinter<'a> {
    rows: std::slice::Iter<'a, (SummaryRow, Observed)>,
    aggregator: &'a ScoreAggregator,
    summed: bool,
}

impl<'a> SummaryPrinter<'a> {
    /// Prints `rows` as they were counted by `aggregator`.
    ///
    /// With `summed` the first row of each (model, sequence, strand) carries
    /// the total of the key and the later summed rows carry `0.0`. Excluded
    /// rows keep their own score.
    pub fn new(
        rows: &'a [(SummaryRow, Observed)],
        aggregator: &'a ScoreAggregator,
        summed: bool,
    ) -> Self {
        SummaryPrinter{ rows: rows.iter(), aggregator, summed }
    }

    fn printed_score(
        &self,
        row: &SummaryRow,
        observed: Observed,
    ) -> f64 {
        if !self.summed {
            return row.bitscore
        }
        match observed {
            Observed::Opened => {
                let key = AggregateKey{ model: row.model.clone(), sequence: row.sequence.clone(), strand: row.span.strand };
                self.aggregator.get(&key).map(|x| x.score).unwrap_or(row.bitscore)
            },
            Observed::Accumulated => 0.0,
            Observed::Excluded => row.bitscore,
        }
    }
}

impl Iterator for SummaryPrinter<'_> {
    type Item = Vec<u8>;

    fn next(
        &mut self,
    ) -> Option<Vec<u8>> {
        let (row, observed) = self.rows.next()?;
        let score = self.printed_score(row, *observed);
        Some(summary_line(row, score).into_bytes())
    }
}
