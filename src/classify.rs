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

//! Pass or fail a classification.
//!
//! The rules are evaluated in order and every triggered rule adds an
//! [UnexpectedFeature]. A classification fails if any of its features is
//! fail-causing under the [Thresholds] in use.
//!
//! | Feature        | Triggered when                              | Fails                                     |
//! |----------------|---------------------------------------------|-------------------------------------------|
//! | `VeryLowScore` | bits/nt < `verylowscore_bpn`                | unless `score_override`                   |
//! | `LowScore`     | bits/nt < `lowscore_bpn`                    | if seqlen > `lowscore_min_length`          |
//! | `VeryLowDiff`  | diff/nt < `verylowdiff_bpn`                 | unless `diff_override`                    |
//! | `LowDiff`      | diff/nt < `lowdiff_bpn`                     | if seqlen > `lowdiff_min_length`           |
//! | `MinusStrand`  | winner is on the minus strand               | if `fail_minus_strand`                    |
//! | `HighBias`     | bias / (score + bias) > `highbias_fraction` | if `fail_high_bias`                       |
//! | `LowCoverage`  | coverage < `lowcov_fraction`                | if `fail_low_coverage`                    |
//!
//! `LowScore` and `LowDiff` never fail when the matching override is set.
//! diff/nt is computed only if a runner-up exists. A sequence without hits
//! always fails with `NoHits`.
//!
use std::fmt;

use log::debug;

use crate::SeqLengths;
use crate::Strand;
use crate::aggregate::Ranking;
use crate::aggregate::ScoreAggregator;

#[derive(Clone, Debug, PartialEq)]
pub struct Thresholds {
    pub lowscore_bpn: f64,
    pub verylowscore_bpn: f64,
    pub lowdiff_bpn: f64,
    pub verylowdiff_bpn: f64,
    pub highbias_fraction: f64,
    pub lowcov_fraction: f64,
    pub lowscore_min_length: usize,
    pub lowdiff_min_length: usize,
    pub score_override: bool,
    pub diff_override: bool,
    pub fail_minus_strand: bool,
    pub fail_high_bias: bool,
    pub fail_low_coverage: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds{
            lowscore_bpn: 0.3,
            verylowscore_bpn: 0.2,
            lowdiff_bpn: 0.06,
            verylowdiff_bpn: 0.006,
            highbias_fraction: 0.25,
            lowcov_fraction: 0.9,
            lowscore_min_length: 200,
            lowdiff_min_length: 200,
            score_override: false,
            diff_override: false,
            fail_minus_strand: true,
            fail_high_bias: false,
            fail_low_coverage: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnexpectedFeature {
    NoHits,
    VeryLowScore,
    LowScore,
    VeryLowDiff,
    LowDiff,
    MinusStrand,
    HighBias,
    LowCoverage,
}

impl fmt::Display for UnexpectedFeature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            UnexpectedFeature::NoHits => "NoHits",
            UnexpectedFeature::VeryLowScore => "VeryLowScore",
            UnexpectedFeature::LowScore => "LowScore",
            UnexpectedFeature::VeryLowDiff => "VeryLowDiff",
            UnexpectedFeature::LowDiff => "LowDiff",
            UnexpectedFeature::MinusStrand => "MinusStrand",
            UnexpectedFeature::HighBias => "HighBias",
            UnexpectedFeature::LowCoverage => "LowCoverage",
        };
        write!(f, "{}", name)
    }
}

/// Classification of one sequence.
///
/// The numeric fields and `model` are None for a sequence without hits.
/// `diff_per_nt` and `runner_up` are None without a runner-up.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub sequence: String,
    pub seq_len: usize,
    pub outcome: Outcome,
    pub model: Option<String>,
    pub strand: Option<Strand>,
    pub bits_per_nt: Option<f64>,
    pub diff_per_nt: Option<f64>,
    pub coverage: Option<f64>,
    pub runner_up: Option<String>,
    pub features: Vec<UnexpectedFeature>,
}

/// Classifies `sequence` from the ranking of its models.
pub fn decide(
    sequence: &str,
    seq_len: usize,
    ranking: Option<&Ranking>,
    thresholds: &Thresholds,
) -> Classification {
    let Some(ranking) = ranking else {
        return Classification{
            sequence: sequence.to_string(), seq_len,
            outcome: Outcome::Fail,
            model: None, strand: None,
            bits_per_nt: None, diff_per_nt: None, coverage: None, runner_up: None,
            features: vec![UnexpectedFeature::NoHits],
        }
    };

    let winner = ranking.winner;
    let mut features: Vec<UnexpectedFeature> = Vec::new();
    let mut fails = false;

    let bits_per_nt = winner.score / seq_len as f64;
    if bits_per_nt < thresholds.verylowscore_bpn {
        features.push(UnexpectedFeature::VeryLowScore);
        fails |= !thresholds.score_override;
    } else if bits_per_nt < thresholds.lowscore_bpn {
        features.push(UnexpectedFeature::LowScore);
        fails |= !thresholds.score_override && seq_len > thresholds.lowscore_min_length;
    }

    let diff_per_nt = ranking.runner_up.map(|x| (winner.score - x.score) / seq_len as f64);
    if let Some(diff) = diff_per_nt {
        if diff < thresholds.verylowdiff_bpn {
            features.push(UnexpectedFeature::VeryLowDiff);
            fails |= !thresholds.diff_override;
        } else if diff < thresholds.lowdiff_bpn {
            features.push(UnexpectedFeature::LowDiff);
            fails |= !thresholds.diff_override && seq_len > thresholds.lowdiff_min_length;
        }
    }

    if winner.key.strand == Strand::Minus {
        features.push(UnexpectedFeature::MinusStrand);
        fails |= thresholds.fail_minus_strand;
    }

    let total = winner.score + winner.bias;
    if total > 0.0 && winner.bias / total > thresholds.highbias_fraction {
        features.push(UnexpectedFeature::HighBias);
        fails |= thresholds.fail_high_bias;
    }

    let coverage = winner.aligned_len as f64 / seq_len as f64;
    if coverage < thresholds.lowcov_fraction {
        features.push(UnexpectedFeature::LowCoverage);
        fails |= thresholds.fail_low_coverage;
    }

    Classification{
        sequence: sequence.to_string(), seq_len,
        outcome: if fails { Outcome::Fail } else { Outcome::Pass },
        model: Some(winner.key.model.clone()),
        strand: Some(winner.key.strand),
        bits_per_nt: Some(bits_per_nt),
        diff_per_nt,
        coverage: Some(coverage),
        runner_up: ranking.runner_up.map(|x| x.key.model.clone()),
        features,
    }
}

/// Classifies every sequence in `lengths` in order.
pub fn classify_all(
    aggregator: &ScoreAggregator,
    lengths: &SeqLengths,
    thresholds: &Thresholds,
) -> Vec<Classification> {
    lengths.iter().map(|(sequence, seq_len)| {
        let ranking = aggregator.finalize(sequence);
        let classification = decide(sequence, *seq_len, ranking.as_ref(), thresholds);
        debug!("{}: {} to {}", sequence, classification.outcome, classification.model.as_deref().unwrap_or("-"));
        classification
    }).collect()
}

// Tests
#[cfg(test)]
mod tests {
    use crate::Hsp;
    use crate::Strand;
    use crate::coords::Segment;

    fn hit(model: &str, score: f64, bias: f64, stop: usize, strand: Strand) -> Hsp {
        Hsp{
            sequence: "seq1".to_string(), model: model.to_string(), strand,
            bitscore: score, evalue: 1e-10, bias,
            seq: Segment::new(1, stop, Strand::Plus).unwrap(),
            mdl: Segment::new(1, stop, strand).unwrap(),
            inserts: vec![], deletes: vec![], seq_len: 1000, mdl_len: None,
        }
    }

    fn classify(hits: &[Hsp], seq_len: usize, thresholds: &super::Thresholds) -> super::Classification {
        use crate::aggregate::ScoreAggregator;

        let mut aggregator = ScoreAggregator::new();
        hits.iter().for_each(|x| { aggregator.observe(x); });
        super::decide("seq1", seq_len, aggregator.finalize("seq1").as_ref(), thresholds)
    }

    #[test]
    fn high_score_passes() {
        use super::{Classification, Outcome, Thresholds};

        let got = classify(&[hit("modelA", 400.0, 0.0, 1000, Strand::Plus)], 1000, &Thresholds::default());
        let expected = Classification{
            sequence: "seq1".to_string(), seq_len: 1000,
            outcome: Outcome::Pass,
            model: Some("modelA".to_string()), strand: Some(Strand::Plus),
            bits_per_nt: Some(0.4), diff_per_nt: None, coverage: Some(1.0), runner_up: None,
            features: vec![],
        };

        assert_eq!(got, expected);
    }

    #[test]
    fn very_low_score_fails() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        let got = classify(&[hit("modelA", 150.0, 0.0, 1000, Strand::Plus)], 1000, &Thresholds::default());

        assert_eq!(got.bits_per_nt, Some(0.15));
        assert_eq!(got.outcome, Outcome::Fail);
        assert_eq!(got.features, vec![UnexpectedFeature::VeryLowScore]);
    }

    #[test]
    fn score_override_keeps_pass() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        let thresholds = Thresholds{ score_override: true, ..Default::default() };
        let got = classify(&[hit("modelA", 150.0, 0.0, 1000, Strand::Plus)], 1000, &thresholds);

        assert_eq!(got.outcome, Outcome::Pass);
        assert_eq!(got.features, vec![UnexpectedFeature::VeryLowScore]);
    }

    #[test]
    fn low_score_exempt_when_short() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        // 250 / 1000 = 0.25
        let got = classify(&[hit("modelA", 250.0, 0.0, 1000, Strand::Plus)], 1000, &Thresholds::default());
        assert_eq!(got.outcome, Outcome::Fail);
        assert_eq!(got.features, vec![UnexpectedFeature::LowScore]);

        let thresholds = Thresholds{ lowscore_min_length: 1000, ..Default::default() };
        let got = classify(&[hit("modelA", 250.0, 0.0, 1000, Strand::Plus)], 1000, &thresholds);
        assert_eq!(got.outcome, Outcome::Pass);
        assert_eq!(got.features, vec![UnexpectedFeature::LowScore]);
    }

    #[test]
    fn low_diff_to_runner_up() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        let hits = vec![
            hit("modelA", 500.0, 0.0, 1000, Strand::Plus),
            hit("modelB", 480.0, 0.0, 1000, Strand::Plus),
        ];
        let got = classify(&hits, 1000, &Thresholds::default());

        assert_eq!(got.runner_up, Some("modelB".to_string()));
        assert_eq!(got.diff_per_nt, Some(0.02));
        assert_eq!(got.features, vec![UnexpectedFeature::LowDiff]);
        assert_eq!(got.outcome, Outcome::Fail);
    }

    #[test]
    fn very_low_diff_to_runner_up() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        let hits = vec![
            hit("modelA", 500.0, 0.0, 1000, Strand::Plus),
            hit("modelB", 498.0, 0.0, 1000, Strand::Plus),
        ];
        let got = classify(&hits, 1000, &Thresholds::default());
        assert_eq!(got.features, vec![UnexpectedFeature::VeryLowDiff]);
        assert_eq!(got.outcome, Outcome::Fail);

        let thresholds = Thresholds{ diff_override: true, ..Default::default() };
        let got = classify(&hits, 1000, &thresholds);
        assert_eq!(got.outcome, Outcome::Pass);
    }

    #[test]
    fn minus_strand_fails_by_default() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        let hits = vec![hit("modelA", 500.0, 0.0, 1000, Strand::Minus)];
        let got = classify(&hits, 1000, &Thresholds::default());
        assert_eq!(got.strand, Some(Strand::Minus));
        assert_eq!(got.features, vec![UnexpectedFeature::MinusStrand]);
        assert_eq!(got.outcome, Outcome::Fail);

        let thresholds = Thresholds{ fail_minus_strand: false, ..Default::default() };
        let got = classify(&hits, 1000, &thresholds);
        assert_eq!(got.outcome, Outcome::Pass);
    }

    #[test]
    fn high_bias_and_low_coverage_are_reported() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        // bias 200 / (600 + 200) = 0.25 is not above the threshold
        let got = classify(&[hit("modelA", 600.0, 200.0, 1000, Strand::Plus)], 1000, &Thresholds::default());
        assert!(got.features.is_empty());

        let hits = vec![hit("modelA", 600.0, 300.0, 800, Strand::Plus)];
        let got = classify(&hits, 1000, &Thresholds::default());
        assert_eq!(got.features, vec![UnexpectedFeature::HighBias, UnexpectedFeature::LowCoverage]);
        assert_eq!(got.outcome, Outcome::Pass);

        let thresholds = Thresholds{ fail_high_bias: true, ..Default::default() };
        assert_eq!(classify(&hits, 1000, &thresholds).outcome, Outcome::Fail);

        let thresholds = Thresholds{ fail_low_coverage: true, ..Default::default() };
        assert_eq!(classify(&hits, 1000, &thresholds).outcome, Outcome::Fail);
    }

    #[test]
    fn features_accumulate_in_order() {
        use super::{Outcome, Thresholds, UnexpectedFeature};

        let hits = vec![
            hit("modelA", 150.0, 100.0, 500, Strand::Minus),
            hit("modelB", 148.0, 0.0, 1000, Strand::Plus),
        ];
        let got = classify(&hits, 1000, &Thresholds::default());

        let expected = vec![
            UnexpectedFeature::VeryLowScore,
            UnexpectedFeature::VeryLowDiff,
            UnexpectedFeature::MinusStrand,
            UnexpectedFeature::HighBias,
            UnexpectedFeature::LowCoverage,
        ];
        assert_eq!(got.features, expected);
        assert_eq!(got.outcome, Outcome::Fail);
    }

    #[test]
    fn no_hits_always_fails() {
        use super::{decide, Classification, Outcome, Thresholds, UnexpectedFeature};

        let thresholds = Thresholds{ score_override: true, diff_override: true, fail_minus_strand: false, ..Default::default() };
        let got = decide("seq9", 700, None, &thresholds);
        let expected = Classification{
            sequence: "seq9".to_string(), seq_len: 700,
            outcome: Outcome::Fail,
            model: None, strand: None,
            bits_per_nt: None, diff_per_nt: None, coverage: None, runner_up: None,
            features: vec![UnexpectedFeature::NoHits],
        };

        assert_eq!(got, expected);
    }

    #[test]
    fn classify_all_covers_every_sequence() {
        use super::{classify_all, Outcome, Thresholds, UnexpectedFeature};
        use crate::SeqLengths;
        use crate::aggregate::ScoreAggregator;

        let mut lengths = SeqLengths::new();
        lengths.insert("seq0".to_string(), 500);
        lengths.insert("seq1".to_string(), 1000);

        let mut aggregator = ScoreAggregator::new();
        aggregator.observe(&hit("modelA", 400.0, 0.0, 1000, Strand::Plus));

        let got = classify_all(&aggregator, &lengths, &Thresholds::default());

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].sequence, "seq0");
        assert_eq!(got[0].features, vec![UnexpectedFeature::NoHits]);
        assert_eq!(got[1].sequence, "seq1");
        assert_eq!(got[1].outcome, Outcome::Pass);
    }
}
