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
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use clap::CommandFactory;
use clap::Parser;
use log::error;
use log::info;

use seqclass::classify::Outcome;
use seqclass::classify::Thresholds;
use seqclass::join::Joined;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) -> Result<(), E> {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()?;
    Ok(())
}

/// Opens `path` for reading, decompressing `.gz` files.
fn open_input(path: &Path) -> Result<Box<dyn Read>, E> {
    let f = File::open(path)?;
    let is_gz = path.extension().is_some_and(|x| x == "gz");
    if is_gz {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>, E> {
    let f = File::create(path)?;
    Ok(BufWriter::new(f))
}

fn out_path(prefix: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(prefix.to_string_lossy().to_string() + suffix)
}

fn run(cli: &cli::Cli) -> Result<(), E> {
    // Subcommands:
    match &cli.command {
        // Classify
        Some(cli::Commands::Classify {
            hits_file,
            sequence_file,
            lengths_file,
            out_prefix,
            lowscore_bpn,
            verylowscore_bpn,
            lowdiff_bpn,
            verylowdiff_bpn,
            highbias_fraction,
            lowcov_fraction,
            lowscore_min_length,
            lowdiff_min_length,
            score_override,
            diff_override,
            allow_minus_strand,
            fail_high_bias,
            fail_low_coverage,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 })?;

            let lengths = match (sequence_file, lengths_file) {
                (Some(file), _) => seqclass::sequences::lengths(&seqclass::sequences::read_sequences_file(file)?),
                (None, Some(file)) => seqclass::sequences::parse_lengths_from_read(&mut open_input(file)?)?,
                (None, None) => return Err("one of --sequences or --lengths is required".into()),
            };
            info!("Read the lengths of {} sequences", lengths.len());

            let mut conn_in = open_input(hits_file)?;
            let hits = seqclass::parse_hits_from_read(&lengths, &mut conn_in)?;

            let thresholds = Thresholds{
                lowscore_bpn: *lowscore_bpn,
                verylowscore_bpn: *verylowscore_bpn,
                lowdiff_bpn: *lowdiff_bpn,
                verylowdiff_bpn: *verylowdiff_bpn,
                highbias_fraction: *highbias_fraction,
                lowcov_fraction: *lowcov_fraction,
                lowscore_min_length: *lowscore_min_length,
                lowdiff_min_length: *lowdiff_min_length,
                score_override: *score_override,
                diff_override: *diff_override,
                fail_minus_strand: !*allow_minus_strand,
                fail_high_bias: *fail_high_bias,
                fail_low_coverage: *fail_low_coverage,
            };
            let classifications = seqclass::classify_hits(&hits, &lengths, &thresholds);

            seqclass::summary_to_write(&hits, false, &mut create_output(&out_path(out_prefix, ".summary.tsv"))?)?;
            seqclass::summary_to_write(&hits, true, &mut create_output(&out_path(out_prefix, ".summed.tsv"))?)?;
            seqclass::classification_to_write(&classifications, &mut create_output(&out_path(out_prefix, ".class.tsv"))?)?;
            seqclass::indels_to_write(&hits, &classifications, &mut create_output(&out_path(out_prefix, ".indel.tsv"))?)?;

            let n_pass = classifications.iter().filter(|x| x.outcome == Outcome::Pass).count();
            info!("{} of {} sequences passed", n_pass, classifications.len());
        },

        // Subseq
        Some(cli::Commands::Subseq {
            details_file,
            sequence_file,
            out_prefix,
            overhang,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 })?;

            let sequences = seqclass::sequences::read_sequences_file(sequence_file)?;
            let specs = seqclass::subsequences_from_read(*overhang, &mut open_input(details_file)?)?;

            let mut table_out = create_output(&out_path(out_prefix, ".subseq.tsv"))?;
            let mut fasta_out = create_output(&out_path(out_prefix, ".subseq.fa"))?;
            seqclass::subsequences_to_write(&specs, &sequences, &mut table_out, &mut fasta_out)?;
        },

        // Join
        Some(cli::Commands::Join {
            details_file,
            stockholm_file,
            sequence_file,
            out_file,
            overhang,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 })?;

            let sequences = seqclass::sequences::read_sequences_file(sequence_file)?;
            let mut details_in = open_input(details_file)?;
            let mut flanks_in = open_input(stockholm_file)?;
            let joined = seqclass::join_from_read(*overhang, &sequences, &mut details_in, &mut flanks_in)?;

            let n_mismatch = joined.iter().filter(|(_, x)| matches!(x, Joined::BoundaryMismatch(_))).count();
            info!("Joined {} of {} sequences", joined.len() - n_mismatch, joined.len());

            match out_file {
                Some(file) => seqclass::joined_to_write(&joined, &mut create_output(file)?)?,
                None => seqclass::joined_to_write(&joined, &mut BufWriter::new(std::io::stdout().lock()))?,
            }
        },

        None => {
            cli::Cli::command().print_help()?;
        },
    }
    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
