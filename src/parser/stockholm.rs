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

//! Reader for the Stockholm output of a profile aligner.
//!
//! Every block must end in `//` and carry a `#=GC RF` row, which is shared
//! by all sequences of the block. Rows split over several lines are
//! concatenated by name. Other `#` lines are ignored.
//!
use std::io::BufReader;
use std::io::Read;

use bstr::ByteSlice;
use bstr::io::BufReadExt;
use indexmap::IndexMap;

use crate::error::Error;
use crate::error::ParseError;
use crate::error::ParseErrorKind;
use crate::join::FlankAlignment;

#[derive(Default)]
struct Block {
    rows: IndexMap<String, Vec<u8>>,
    rf: Vec<u8>,
}

impl Block {
    fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.rf.is_empty()
    }

    fn close(
        self,
        out: &mut IndexMap<String, FlankAlignment>,
    ) -> Result<(), ParseErrorKind> {
        if self.rows.is_empty() {
            return Ok(())
        }
        if self.rf.is_empty() {
            return Err(ParseErrorKind::Stockholm("block has no `#=GC RF` row".to_string()))
        }
        for (name, aligned) in self.rows {
            if out.contains_key(&name) {
                return Err(ParseErrorKind::Stockholm(format!("`{}` appears in two blocks", name)))
            }
            out.insert(name.clone(), FlankAlignment{ name, aligned, rf: self.rf.clone() });
        }
        Ok(())
    }

    fn add_line(
        &mut self,
        line: &str,
    ) -> Result<(), ParseErrorKind> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["#=GC", "RF", row] => self.rf.extend_from_slice(row.as_bytes()),
            [tag, ..] if tag.starts_with('#') => (),
            [name, row] => self.rows.entry(name.to_string()).or_default().extend_from_slice(row.as_bytes()),
            _ => return Err(ParseErrorKind::Stockholm("expected `name aligned`".to_string())),
        }
        Ok(())
    }
}

/// Parse every aligned row of a Stockholm file in [Read] by name.
///
/// ## Usage
///
/// ```rust
/// use seqclass::parser::stockholm::parse_stockholm_from_read;
/// use std::io::Cursor;
///
/// let mut data: Vec<u8> = Vec::new();
/// data.append(&mut b"# STOCKHOLM 1.0\n\n".to_vec());
/// data.append(&mut b"seq1/1-6  aaAA\n#=GC RF   ..xx\n\n".to_vec());
/// data.append(&mut b"seq1/1-6  CC--\n#=GC RF   xxxx\n//\n".to_vec());
///
/// let got = parse_stockholm_from_read(&mut Cursor::new(data)).unwrap();
///
/// assert_eq!(got["seq1/1-6"].aligned, b"aaAACC--".to_vec());
/// assert_eq!(got["seq1/1-6"].rf, b"..xxxxxx".to_vec());
/// ```
///
pub fn parse_stockholm_from_read<R: Read>(
    conn: &mut R,
) -> Result<IndexMap<String, FlankAlignment>, Error> {
    let mut alignments: IndexMap<String, FlankAlignment> = IndexMap::new();
    let mut block = Block::default();
    let mut line_no = 0;

    for line in BufReader::new(conn).byte_lines() {
        let line = line?;
        line_no += 1;
        let text = line.to_str_lossy();
        let text = text.trim();
        let res = if text == "//" {
            std::mem::take(&mut block).close(&mut alignments)
        } else if text.is_empty() {
            Ok(())
        } else {
            block.add_line(text)
        };
        res.map_err(|kind| ParseError{ line: line_no, text: text.to_string(), kind })?;
    }

    if !block.is_empty() {
        return Err(ParseError{
            line: line_no,
            text: String::new(),
            kind: ParseErrorKind::Stockholm("block not terminated by `//`".to_string()),
        }.into())
    }

    Ok(alignments)
}
