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

use crate::error::Error;
use crate::join::JoinedAlignment;

const RF_TAG: &str = "#=GC RF";

/// Format a joined alignment as a Stockholm 1.0 block
///
/// The annotation row is written as `#=GC RF`.
///
pub fn format_stockholm_block<W: Write>(
    aln: &JoinedAlignment,
    conn: &mut W,
) -> Result<(), Error> {
    let width = aln.sequence.len().max(RF_TAG.len());

    let mut formatted: String = String::new();
    formatted += "# STOCKHOLM 1.0\n\n";
    formatted += &format!("{:<width$} {}\n", aln.sequence, String::from_utf8_lossy(&aln.aligned), width = width);
    formatted += &format!("{:<width$} {}\n", RF_TAG, String::from_utf8_lossy(&aln.annotation), width = width);
    formatted += "//\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}
