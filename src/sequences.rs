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

//! Load sequences and their lengths, and write FASTA records.
//!
use std::io::Read;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use needletail::FastxReader;

use crate::SeqLengths;
use crate::error::Error;
use crate::error::ParseErrorKind;

/// Residues by sequence name, in input order.
pub type Sequences = IndexMap<String, Vec<u8>>;

fn collect_records(
    mut reader: Box<dyn FastxReader + '_>,
) -> Result<Sequences, Error> {
    let mut sequences = Sequences::new();
    while let Some(record) = reader.next() {
        let record = record?;
        let id = record.id();
        let name = id.split(|c| c.is_ascii_whitespace()).next().unwrap_or(id);
        let name = String::from_utf8_lossy(name).to_string();
        if sequences.contains_key(&name) {
            warn!("Sequence {} appears more than once, keeping the last record", name);
        }
        sequences.insert(name, record.seq().to_vec());
    }
    Ok(sequences)
}

/// Read every record of a FASTA or FASTQ file in [Read].
///
/// Records are named by the first word of their header line.
///
/// ## Usage
///
/// ```rust
/// use seqclass::sequences::read_sequences_from_read;
/// use std::io::Cursor;
///
/// let input: Cursor<Vec<u8>> = Cursor::new(b">seq1 first\nACGT\nAC\n>seq2\nTTTT\n".to_vec());
/// let sequences = read_sequences_from_read(input).unwrap();
///
/// assert_eq!(sequences["seq1"], b"ACGTAC".to_vec());
/// assert_eq!(sequences["seq2"], b"TTTT".to_vec());
/// ```
///
pub fn read_sequences_from_read<R: Read + Send>(
    conn: R,
) -> Result<Sequences, Error> {
    let reader = needletail::parse_fastx_reader(conn)?;
    collect_records(reader)
}

/// Read every record of a possibly compressed FASTA or FASTQ file.
pub fn read_sequences_file(
    path: &Path,
) -> Result<Sequences, Error> {
    let reader = needletail::parse_fastx_file(path)?;
    collect_records(reader)
}

pub fn lengths(
    sequences: &Sequences,
) -> SeqLengths {
    sequences.iter().map(|(name, residues)| (name.clone(), residues.len())).collect()
}

fn read_length_line(
    line: &str,
) -> Result<(String, usize), ParseErrorKind> {
    let fields = crate::parser::split_fields(line, 2)?;
    let len = fields[1].parse::<usize>().map_err(|_| ParseErrorKind::InvalidField("length"))?;
    if len == 0 {
        return Err(ParseErrorKind::EmptySequence(fields[0].to_string()))
    }
    Ok((fields[0].to_string(), len))
}

/// Read a `name\tlength` table in [Read].
pub fn parse_lengths_from_read<R: Read>(
    conn: &mut R,
) -> Result<SeqLengths, Error> {
    let records = crate::parser::read_tabular(conn, read_length_line)?;
    Ok(records.into_iter().collect())
}

/// Write one FASTA record with the residues on a single line.
pub fn write_fasta_record<W: Write>(
    name: &str,
    residues: &[u8],
    conn: &mut W,
) -> Result<(), Error> {
    needletail::parser::write_fasta(name.as_bytes(), residues, conn, needletail::parser::LineEnding::Unix)?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_fastq_and_lengths() {
        use super::{lengths, read_sequences_from_read};
        use std::io::Cursor;

        let input: Cursor<Vec<u8>> = Cursor::new(b"@r1 desc\nACGTA\n+\nIIIII\n@r2\nAC\n+\nII\n".to_vec());
        let sequences = read_sequences_from_read(input).unwrap();
        let got = lengths(&sequences);

        let names: Vec<(&str, usize)> = got.iter().map(|(name, len)| (name.as_str(), *len)).collect();
        assert_eq!(names, vec![("r1", 5), ("r2", 2)]);
    }

    #[test]
    fn read_length_table() {
        use super::parse_lengths_from_read;
        use crate::error::Error;
        use crate::error::ParseErrorKind;
        use std::io::Cursor;

        let got = parse_lengths_from_read(&mut Cursor::new(b"#name\tlength\nseq1\t1000\nseq2\t250\n".to_vec())).unwrap();
        assert_eq!(got.get("seq1"), Some(&1000));
        assert_eq!(got.get("seq2"), Some(&250));

        let got = parse_lengths_from_read(&mut Cursor::new(b"seq1\tlong\n".to_vec()));
        assert!(matches!(got, Err(Error::Parse(_))));

        let got = parse_lengths_from_read(&mut Cursor::new(b"seq1\t1000\nseq2\t0\n".to_vec()));
        assert!(matches!(got, Err(Error::Parse(e)) if e.line == 2 && e.kind == ParseErrorKind::EmptySequence("seq2".to_string())));
    }

    #[test]
    fn write_record() {
        use super::write_fasta_record;

        let mut got: Vec<u8> = Vec::new();
        write_fasta_record("seq1/1-6", b"AAAACC", &mut got).unwrap();

        assert_eq!(got, b">seq1/1-6\nAAAACC\n".to_vec());
    }
}
