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
use std::io::Read;

use crate::Strand;
use crate::SummaryRow;
use crate::coords::Segment;
use crate::error::Error;
use crate::error::ParseErrorKind;

/// Parse a line from the model summary
///
/// Reads the 9 tab-separated fields
/// `model sequence bitscore start stop strand bounds overlap seq_len`.
/// `start` and `stop` are written in the orientation of `strand`.
///
pub fn read_summary_line(
    line: &str,
) -> Result<SummaryRow, ParseErrorKind> {
    let fields = super::split_fields(line, 9)?;

    let bitscore = fields[2].parse::<f64>().map_err(|_| ParseErrorKind::InvalidField("bitscore"))?;
    let strand = fields[5].parse::<Strand>().map_err(|_| ParseErrorKind::InvalidField("strand"))?;
    let span = format!("{}..{}:{}", fields[3], fields[4], strand).parse::<Segment>()
        .map_err(|source| ParseErrorKind::InvalidRange{ tag: "start..stop".to_string(), source })?;

    match fields[6].as_bytes() {
        [b'[' | b'.', b']' | b'.'] => (),
        _ => return Err(ParseErrorKind::InvalidField("bounds")),
    }
    let overlap = match fields[7] {
        "Y" => true,
        "N" => false,
        _ => return Err(ParseErrorKind::InvalidField("overlap")),
    };
    let seq_len = fields[8].parse::<usize>().map_err(|_| ParseErrorKind::InvalidField("seq_len"))?;

    Ok(SummaryRow{
        model: fields[0].to_string(),
        sequence: fields[1].to_string(),
        bitscore,
        span,
        overlap,
        seq_len,
    })
}

/// Parse all rows of a model summary in [Read]
pub fn parse_summary_from_read<R: Read>(
    conn: &mut R,
) -> Result<Vec<SummaryRow>, Error> {
    super::read_tabular(conn, read_summary_line)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_plus_and_minus_rows() {
        use super::parse_summary_from_read;
        use crate::Strand;
        use crate::SummaryRow;
        use crate::coords::Segment;
        use std::io::Cursor;

        let mut data: Vec<u8> = Vec::new();
        data.append(&mut b"modelA\tseq1\t400.5\t1\t600\t+\t[.\tN\t1000\n".to_vec());
        data.append(&mut b"modelA\tseq1\t12\t900\t650\t-\t..\tY\t1000\n".to_vec());

        let expected = vec![
            SummaryRow{ model: "modelA".to_string(), sequence: "seq1".to_string(), bitscore: 400.5, span: Segment::new(1, 600, Strand::Plus).unwrap(), overlap: false, seq_len: 1000 },
            SummaryRow{ model: "modelA".to_string(), sequence: "seq1".to_string(), bitscore: 12.0, span: Segment::new(650, 900, Strand::Minus).unwrap(), overlap: true, seq_len: 1000 },
        ];

        let got = parse_summary_from_read(&mut Cursor::new(data)).unwrap();
        assert_eq!(got, expected);
        assert_eq!(got[0].bounds(), (true, false));
    }

    #[test]
    fn malformed_rows() {
        use super::read_summary_line;
        use crate::error::ParseErrorKind;

        assert_eq!(read_summary_line("modelA\tseq1\t400.5\t1\t600\t+\t[.\tN"), Err(ParseErrorKind::FieldCount{ expected: 9, found: 8 }));
        assert_eq!(read_summary_line("modelA\tseq1\thigh\t1\t600\t+\t[.\tN\t1000"), Err(ParseErrorKind::InvalidField("bitscore")));
        assert_eq!(read_summary_line("modelA\tseq1\t1\t1\t600\t+\t[[\tN\t1000"), Err(ParseErrorKind::InvalidField("bounds")));
        assert_eq!(read_summary_line("modelA\tseq1\t1\t1\t600\t+\t[.\tyes\t1000"), Err(ParseErrorKind::InvalidField("overlap")));
        assert!(matches!(read_summary_line("modelA\tseq1\t1\t600\t1\t+\t[.\tN\t1000"), Err(ParseErrorKind::InvalidRange{ .. })));
    }

    #[test]
    fn error_reports_line() {
        use super::parse_summary_from_read;
        use crate::error::Error;
        use std::io::Cursor;

        let data: Vec<u8> = b"modelA\tseq1\t1\t1\t600\t+\t[.\tN\t1000\n\nmodelA\tseq1\t1\t1\t600\t+\t[.\tN\n".to_vec();
        let got = parse_summary_from_read(&mut Cursor::new(data));

        match got {
            Err(Error::Parse(e)) => assert_eq!(e.line, 3),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
