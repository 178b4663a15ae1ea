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
use std::io::Write;

use crate::SummaryRow;
use crate::error::Error;

pub(crate) fn summary_line(
    row: &SummaryRow,
    score: f64,
) -> String {
    let separator: char = '\t';
    let (from, to) = row.span.oriented();
    let (first, last) = row.bounds();

    let mut formatted: String = String::new();
    formatted += &row.model;
    formatted.push(separator);
    formatted += &row.sequence;
    formatted.push(separator);
    formatted += &super::format_score(score);
    formatted.push(separator);
    formatted += &from.to_string();
    formatted.push(separator);
    formatted += &to.to_string();
    formatted.push(separator);
    formatted += &row.span.strand.to_string();
    formatted.push(separator);
    formatted.push(if first { '[' } else { '.' });
    formatted.push(if last { ']' } else { '.' });
    formatted.push(separator);
    formatted.push(if row.overlap { 'Y' } else { 'N' });
    formatted.push(separator);
    formatted += &row.seq_len.to_string();
    formatted += "\n";
    formatted
}

/// Format a single model summary row
///
/// Writes the row with `score` in place of its own bit score. `start` and
/// `stop` are written in the orientation of the row strand.
///
pub fn format_summary_line<W: Write>(
    row: &SummaryRow,
    score: f64,
    conn: &mut W,
) -> Result<(), Error> {
    conn.write_all(summary_line(row, score).as_bytes())?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_minus_row() {
        use super::format_summary_line;
        use crate::Strand;
        use crate::SummaryRow;
        use crate::coords::Segment;

        let row = SummaryRow{ model: "modelA".to_string(), sequence: "seq1".to_string(), bitscore: 12.0, span: Segment::new(1, 1000, Strand::Minus).unwrap(), overlap: true, seq_len: 1000 };

        let mut got: Vec<u8> = Vec::new();
        format_summary_line(&row, row.bitscore, &mut got).unwrap();

        let expected: Vec<u8> = b"modelA\tseq1\t12.0\t1000\t1\t-\t[]\tY\t1000\n".to_vec();
        assert_eq!(got, expected);
    }
}
