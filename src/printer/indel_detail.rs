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

use crate::IndelDetail;
use crate::error::Error;
use crate::indel::format_token_list;

/// Format a single line of the indel detail file
///
/// Writes `model sequence mdl_coords mdl_len seq_coords seq_len inserts
/// deletes` with `-` for an unknown model length or an empty token list.
///
pub fn format_indel_detail_line<W: Write>(
    detail: &IndelDetail,
    conn: &mut W,
) -> Result<(), Error> {
    let separator: char = '\t';
    let mut formatted: String = String::new();

    formatted += &detail.model;
    formatted.push(separator);
    formatted += &detail.sequence;
    formatted.push(separator);
    formatted += &detail.mdl.to_string();
    formatted.push(separator);
    formatted += &detail.mdl_len.map(|x| x.to_string()).unwrap_or("-".to_string());
    formatted.push(separator);
    formatted += &detail.seq.to_string();
    formatted.push(separator);
    formatted += &detail.seq_len.to_string();
    formatted.push(separator);
    formatted += &format_token_list(&detail.inserts);
    formatted.push(separator);
    formatted += &format_token_list(&detail.deletes);
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}
