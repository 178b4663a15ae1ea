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
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Sum hits per model and classify the sequences
    Classify {
        // Tagged hit stream, may be gzipped
        #[arg(group = "input", required = true, help = "Hit stream file")]
        hits_file: PathBuf,

        // Sequences that were searched
        #[arg(short = 's', long = "sequences", group = "len", required = true, help = "FASTA/FASTQ of the searched sequences")]
        sequence_file: Option<PathBuf>,

        // Alternative to the sequences
        #[arg(long = "lengths", group = "len", required = true, help = "Tab-separated name and length of the searched sequences")]
        lengths_file: Option<PathBuf>,

        // Output prefix
        #[arg(short = 'o', long = "output", required = true, help = "Prefix of the output files")]
        out_prefix: PathBuf,

        // Thresholds
        #[arg(long = "lowscore", default_value_t = 0.3, help = "Bits per nucleotide below which the score is low")]
        lowscore_bpn: f64,

        #[arg(long = "verylowscore", default_value_t = 0.2, help = "Bits per nucleotide below which the score is very low")]
        verylowscore_bpn: f64,

        #[arg(long = "lowdiff", default_value_t = 0.06, help = "Bits per nucleotide to the runner-up below which the difference is low")]
        lowdiff_bpn: f64,

        #[arg(long = "verylowdiff", default_value_t = 0.006, help = "Bits per nucleotide to the runner-up below which the difference is very low")]
        verylowdiff_bpn: f64,

        #[arg(long = "highbias", default_value_t = 0.25, help = "Fraction of bias over score and bias above which the bias is high")]
        highbias_fraction: f64,

        #[arg(long = "lowcov", default_value_t = 0.9, help = "Coverage below which the coverage is low")]
        lowcov_fraction: f64,

        #[arg(long = "lowscore-min-length", default_value_t = 200, help = "Low score fails only sequences longer than this")]
        lowscore_min_length: usize,

        #[arg(long = "lowdiff-min-length", default_value_t = 200, help = "Low difference fails only sequences longer than this")]
        lowdiff_min_length: usize,

        // Overrides
        #[arg(long = "score-override", default_value_t = false, help = "Do not fail on low scores")]
        score_override: bool,

        #[arg(long = "diff-override", default_value_t = false, help = "Do not fail on low score differences")]
        diff_override: bool,

        #[arg(long = "allow-minus", default_value_t = false, help = "Do not fail minus strand classifications")]
        allow_minus_strand: bool,

        #[arg(long = "fail-high-bias", default_value_t = false, help = "Fail classifications with high bias")]
        fail_high_bias: bool,

        #[arg(long = "fail-low-coverage", default_value_t = false, help = "Fail classifications with low coverage")]
        fail_low_coverage: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Select and extract the flanks that need realignment
    Subseq {
        // Indel detail file written by classify
        #[arg(group = "input", required = true, help = "Indel detail file")]
        details_file: PathBuf,

        // Sequences that were searched
        #[arg(short = 's', long = "sequences", required = true, help = "FASTA/FASTQ of the searched sequences")]
        sequence_file: PathBuf,

        // Output prefix
        #[arg(short = 'o', long = "output", required = true, help = "Prefix of the output files")]
        out_prefix: PathBuf,

        // Flank extension into the seed
        #[arg(long = "overhang", default_value_t = 10, help = "Residues of the seed included in each flank")]
        overhang: usize,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Splice realigned flanks around the seeds
    Join {
        // Indel detail file written by classify
        #[arg(group = "input", required = true, help = "Indel detail file")]
        details_file: PathBuf,

        // Profile alignments of the flanks
        #[arg(short = 'a', long = "alignments", required = true, help = "Stockholm alignments of the selected flanks")]
        stockholm_file: PathBuf,

        // Sequences that were searched
        #[arg(short = 's', long = "sequences", required = true, help = "FASTA/FASTQ of the searched sequences")]
        sequence_file: PathBuf,

        // Output file path
        #[arg(short = 'o', long = "output", required = false, help = "Output file, default is stdout")]
        out_file: Option<PathBuf>,

        // Overhang used with subseq
        #[arg(long = "overhang", default_value_t = 10, help = "Overhang used when selecting the flanks")]
        overhang: usize,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
