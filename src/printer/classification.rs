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

use crate::classify::Classification;
use crate::error::Error;

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|x| x.to_string()).unwrap_or("-".to_string())
}

fn ratio(value: Option<f64>) -> String {
    value.map(|x| format!("{:.3}", x)).unwrap_or("-".to_string())
}

/// Format the header line of the classification table
pub fn format_classification_header<W: Write>(
    conn: &mut W,
) -> Result<(), Error> {
    conn.write_all(b"#sequence\tseqlen\toutcome\tmodel\tstrand\tbits_per_nt\tdiff_per_nt\tcoverage\trunner_up\tfeatures\n")?;
    Ok(())
}

/// Format a single classification
///
/// Absent values are written as `-`, unexpected features are joined by `,`.
///
pub fn format_classification_line<W: Write>(
    classification: &Classification,
    conn: &mut W,
) -> Result<(), Error> {
    let features = if classification.features.is_empty() {
        "-".to_string()
    } else {
        classification.features.iter().map(|x| x.to_string()).collect::<Vec<String>>().join(",")
    };

    let fields: Vec<String> = vec![
        classification.sequence.clone(),
        classification.seq_len.to_string(),
        classification.outcome.to_string(),
        or_dash(classification.model.as_ref()),
        or_dash(classification.strand),
        ratio(classification.bits_per_nt),
        ratio(classification.diff_per_nt),
        ratio(classification.coverage),
        or_dash(classification.runner_up.as_ref()),
        features,
    ];

    let mut formatted = fields.join("\t");
    formatted += "\n";
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}
