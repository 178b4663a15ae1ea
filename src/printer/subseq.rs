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
use crate::subseq::SubsequenceSpec;

/// Format a single line of the subsequence table
///
/// Writes `name source start stop flank`.
///
pub fn format_subsequence_line<W: Write>(
    spec: &SubsequenceSpec,
    conn: &mut W,
) -> Result<(), Error> {
    let formatted = format!("{}\t{}\t{}\t{}\t{}\n", spec.name, spec.source, spec.start, spec.stop, spec.flank);
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_full_flank() {
        use super::format_subsequence_line;
        use crate::subseq::{Flank, SubsequenceSpec};

        let spec = SubsequenceSpec::new("seq1", 1, 100, Flank::Full);

        let mut got: Vec<u8> = Vec::new();
        format_subsequence_line(&spec, &mut got).unwrap();

        assert_eq!(got, b"seq1/1-100\tseq1\t1\t100\tfull\n".to_vec());
    }
}
