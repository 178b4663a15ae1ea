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

use crate::IndelDetail;
use crate::coords::Segment;
use crate::error::Error;
use crate::error::ParseErrorKind;
use crate::indel::IndelKind;
use crate::indel::parse_token_list;

/// Parse a line from the indel detail file
///
/// Reads the 8 tab-separated fields
/// `model sequence mdl_coords mdl_len seq_coords seq_len inserts deletes`.
/// An unknown `mdl_len` and an empty token list are written as `-`.
///
pub fn read_indel_detail_line(
    line: &str,
) -> Result<IndelDetail, ParseErrorKind> {
    let fields = super::split_fields(line, 8)?;

    let mdl = fields[2].parse::<Segment>().map_err(|source| ParseErrorKind::InvalidRange{ tag: "mdl_coords".to_string(), source })?;
    let mdl_len = match fields[3] {
        "-" => None,
        value => Some(value.parse::<usize>().map_err(|_| ParseErrorKind::InvalidField("mdl_len"))?),
    };
    let seq = fields[4].parse::<Segment>().map_err(|source| ParseErrorKind::InvalidRange{ tag: "seq_coords".to_string(), source })?;
    let seq_len = fields[5].parse::<usize>().map_err(|_| ParseErrorKind::InvalidField("seq_len"))?;
    let inserts = parse_token_list(fields[6], IndelKind::Insert)?;
    let deletes = parse_token_list(fields[7], IndelKind::Delete)?;

    Ok(IndelDetail{
        model: fields[0].to_string(),
        sequence: fields[1].to_string(),
        mdl,
        mdl_len,
        seq,
        seq_len,
        inserts,
        deletes,
    })
}

/// Parse all lines of an indel detail file in [Read]
pub fn parse_indel_details_from_read<R: Read>(
    conn: &mut R,
) -> Result<Vec<IndelDetail>, Error> {
    super::read_tabular(conn, read_indel_detail_line)
}
