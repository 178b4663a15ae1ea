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

//! Sum hit scores per (model, sequence, strand) and rank models.
//!
//! The first hit of a (model, sequence) pair fixes the top strand of the
//! pair. Later hits of the pair are summed only if they are on the top
//! strand and have a positive score, other hits are counted as excluded.
//!
//! ## Usage
//!
//! ```rust
//! use seqclass::{Hsp, Strand};
//! use seqclass::aggregate::{Observed, ScoreAggregator};
//! use seqclass::coords::Segment;
//!
//! let hit = |model: &str, score: f64, strand: Strand| Hsp{
//!     sequence: "seq1".to_string(), model: model.to_string(), strand,
//!     bitscore: score, evalue: 1e-10, bias: 0.0,
//!     seq: Segment::new(1, 100, Strand::Plus).unwrap(),
//!     mdl: Segment::new(1, 100, strand).unwrap(),
//!     inserts: vec![], deletes: vec![], seq_len: 100, mdl_len: None,
//! };
//!
//! let mut aggregator = ScoreAggregator::new();
//! assert_eq!(aggregator.observe(&hit("modelA", 50.0, Strand::Plus)), Observed::Opened);
//! assert_eq!(aggregator.observe(&hit("modelB", 60.0, Strand::Plus)), Observed::Opened);
//! assert_eq!(aggregator.observe(&hit("modelA", 20.0, Strand::Plus)), Observed::Accumulated);
//! assert_eq!(aggregator.observe(&hit("modelA", 30.0, Strand::Minus)), Observed::Excluded);
//!
//! let ranking = aggregator.finalize("seq1").unwrap();
//! assert_eq!(ranking.winner.key.model, "modelA");
//! assert_eq!(ranking.winner.score, 70.0);
//! assert_eq!(ranking.runner_up.unwrap().key.model, "modelB");
//! ```
//!
use indexmap::IndexMap;

use crate::Hsp;
use crate::Strand;
use crate::SummaryRow;
use crate::coords::Segment;

/// Scored hit against a model.
pub trait HitScore {
    fn model(&self) -> &str;
    fn sequence(&self) -> &str;
    fn strand(&self) -> Strand;
    fn bitscore(&self) -> f64;
    fn bias(&self) -> f64;
    /// Aligned sequence positions, ascending.
    fn seq_span(&self) -> Segment;
    fn seq_len(&self) -> usize;
}

impl HitScore for Hsp {
    fn model(&self) -> &str { &self.model }
    fn sequence(&self) -> &str { &self.sequence }
    fn strand(&self) -> Strand { self.strand }
    fn bitscore(&self) -> f64 { self.bitscore }
    fn bias(&self) -> f64 { self.bias }
    fn seq_span(&self) -> Segment { Segment{ start: self.seq.start, stop: self.seq.stop, strand: self.strand } }
    fn seq_len(&self) -> usize { self.seq_len }
}

impl HitScore for SummaryRow {
    fn model(&self) -> &str { &self.model }
    fn sequence(&self) -> &str { &self.sequence }
    fn strand(&self) -> Strand { self.span.strand }
    fn bitscore(&self) -> f64 { self.bitscore }
    fn bias(&self) -> f64 { 0.0 }
    fn seq_span(&self) -> Segment { self.span }
    fn seq_len(&self) -> usize { self.seq_len }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    pub model: String,
    pub sequence: String,
    pub strand: Strand,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateScore {
    pub key: AggregateKey,
    pub score: f64,
    pub bias: f64,
    pub n_hits: usize,
    /// Hits of the pair left out of the sum.
    pub n_excluded: usize,
    /// Smallest segment containing every summed hit.
    pub envelope: Segment,
    /// Summed length of the summed hits, overlaps counted twice.
    pub aligned_len: usize,
    pub spans: Vec<Segment>,
    pub seq_len: usize,
}

impl AggregateScore {
    fn open<H: HitScore>(
        key: AggregateKey,
        hit: &H,
    ) -> Self {
        let span = hit.seq_span();
        AggregateScore{
            key,
            score: hit.bitscore(),
            bias: hit.bias(),
            n_hits: 1,
            n_excluded: 0,
            envelope: span,
            aligned_len: span.len(),
            spans: vec![span],
            seq_len: hit.seq_len(),
        }
    }

    fn accumulate<H: HitScore>(
        &mut self,
        hit: &H,
    ) {
        let span = hit.seq_span();
        self.score += hit.bitscore();
        self.bias += hit.bias();
        self.n_hits += 1;
        self.envelope = Segment{
            start: self.envelope.start.min(span.start),
            stop: self.envelope.stop.max(span.stop),
            strand: self.envelope.strand,
        };
        self.aligned_len += span.len();
        self.spans.push(span);
    }

    /// Aligned length over sequence length, not clamped to 1.
    pub fn coverage(&self) -> f64 {
        self.aligned_len as f64 / self.seq_len as f64
    }

    pub fn bits_per_nt(&self) -> f64 {
        self.score / self.seq_len as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observed {
    /// First hit of the (model, sequence) pair.
    Opened,
    Accumulated,
    Excluded,
}

/// Best and second best model of a sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking<'a> {
    pub winner: &'a AggregateScore,
    /// Best scoring aggregate of a different model.
    pub runner_up: Option<&'a AggregateScore>,
}

#[derive(Clone, Debug, Default)]
pub struct ScoreAggregator {
    scores: IndexMap<AggregateKey, AggregateScore>,
    top_strands: IndexMap<(String, String), Strand>,
    by_sequence: IndexMap<String, Vec<usize>>,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        ScoreAggregator::default()
    }

    /// Adds `hit` to the aggregate of its key.
    pub fn observe<H: HitScore>(
        &mut self,
        hit: &H,
    ) -> Observed {
        let pair = (hit.model().to_string(), hit.sequence().to_string());

        let Some(top) = self.top_strands.get(&pair).copied() else {
            self.top_strands.insert(pair, hit.strand());
            let key = AggregateKey{ model: hit.model().to_string(), sequence: hit.sequence().to_string(), strand: hit.strand() };
            let (idx, _) = self.scores.insert_full(key.clone(), AggregateScore::open(key, hit));
            self.by_sequence.entry(hit.sequence().to_string()).or_default().push(idx);
            return Observed::Opened
        };

        let key = AggregateKey{ model: pair.0, sequence: pair.1, strand: top };
        let Some(aggregate) = self.scores.get_mut(&key) else {
            return Observed::Excluded
        };
        if hit.strand() == top && hit.bitscore() > 0.0 {
            aggregate.accumulate(hit);
            Observed::Accumulated
        } else {
            aggregate.n_excluded += 1;
            Observed::Excluded
        }
    }

    /// Whether `hit` overlaps a summed hit of its key.
    pub fn overlaps<H: HitScore>(
        &self,
        hit: &H,
    ) -> bool {
        let key = AggregateKey{ model: hit.model().to_string(), sequence: hit.sequence().to_string(), strand: hit.strand() };
        let span = hit.seq_span();
        self.scores.get(&key).is_some_and(|x| x.spans.iter().any(|prev| prev.overlaps(&span)))
    }

    pub fn get(
        &self,
        key: &AggregateKey,
    ) -> Option<&AggregateScore> {
        self.scores.get(key)
    }

    /// Top strand of a (model, sequence) pair.
    pub fn top_strand(
        &self,
        model: &str,
        sequence: &str,
    ) -> Option<Strand> {
        self.top_strands.get(&(model.to_string(), sequence.to_string())).copied()
    }

    /// All aggregates in first-seen order.
    pub fn scores(&self) -> impl Iterator<Item = &AggregateScore> {
        self.scores.values()
    }

    /// Sequences with at least one hit in first-seen order.
    pub fn sequences(&self) -> impl Iterator<Item = &String> {
        self.by_sequence.keys()
    }

    /// Ranks the aggregates of `sequence` by summed score.
    ///
    /// Ties go to the aggregate seen first. Returns None if `sequence` has
    /// no hits.
    pub fn finalize(
        &self,
        sequence: &str,
    ) -> Option<Ranking<'_>> {
        let indexes = self.by_sequence.get(sequence)?;
        let mut ranked: Vec<&AggregateScore> = indexes.iter().filter_map(|idx| self.scores.get_index(*idx).map(|(_, x)| x)).collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let winner = *ranked.first()?;
        let runner_up = ranked.iter().skip(1).find(|x| x.key.model != winner.key.model).copied();
        Some(Ranking{ winner, runner_up })
    }
}

/// Aggregates `hits` in order and returns their model summary rows.
///
/// Each row is returned with how its hit was counted.
pub fn summarize<'a, H: HitScore + 'a, I: IntoIterator<Item = &'a H>>(
    hits: I,
) -> (ScoreAggregator, Vec<(SummaryRow, Observed)>) {
    let mut aggregator = ScoreAggregator::new();
    let mut rows: Vec<(SummaryRow, Observed)> = Vec::new();
    for hit in hits {
        let overlap = aggregator.overlaps(hit);
        let observed = aggregator.observe(hit);
        let row = SummaryRow{
            model: hit.model().to_string(),
            sequence: hit.sequence().to_string(),
            bitscore: hit.bitscore(),
            span: hit.seq_span(),
            overlap,
            seq_len: hit.seq_len(),
        };
        rows.push((row, observed));
    }
    (aggregator, rows)
}
