use crate::error::{MotifError, Result};
use crate::profile::{consensus, score, ProfileMatrix};
use crate::types::{sequence_to_string, Sequence};
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Categorical;

/// Result surface handed to drivers: the chosen motifs, their consensus and
/// the conservation score, rendered as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub motifs: Vec<String>,
    pub consensus: String,
    pub score: usize,
}

impl SearchReport {
    pub fn from_motifs(motifs: &[Sequence]) -> Result<SearchReport> {
        Ok(SearchReport {
            motifs: motifs.iter().map(|m| sequence_to_string(m)).collect(),
            consensus: sequence_to_string(&consensus(motifs)?),
            score: score(motifs)?,
        })
    }
}

/// Deterministic profile-growing construction over one pass.
///
/// Best-so-far starts as the k-prefix of every string. For each offset of
/// the first string, a working set is seeded with that k-mer and grown by
/// profiling the set so far and taking each remaining string's most
/// probable k-mer; the working set replaces best-so-far only on a strict
/// score improvement. `pseudocounts` is threaded through every profile
/// build.
pub fn greedy_motif_search(dna: &[Sequence], k: usize, pseudocounts: bool) -> Result<Vec<Sequence>> {
    check_search_input(dna, k)?;
    let mut best: Vec<Sequence> = dna.iter().map(|seq| seq[..k].to_vec()).collect();
    let mut best_score = score(&best)?;
    for seed in dna[0].windows(k) {
        let mut motifs: Vec<Sequence> = Vec::with_capacity(dna.len());
        motifs.push(seed.to_vec());
        for seq in &dna[1..] {
            let profile = ProfileMatrix::from_motifs(&motifs, pseudocounts)?;
            motifs.push(profile.most_probable_kmer(seq)?.to_vec());
        }
        let candidate_score = score(&motifs)?;
        if candidate_score < best_score {
            best = motifs;
            best_score = candidate_score;
        }
    }
    Ok(best)
}

/// Picks one k-mer per string at a uniformly random offset. This is the
/// seeding step of both stochastic searches; drivers can also use it to
/// measure how far a search moved from its starting point.
pub fn random_motifs<R: Rng + ?Sized>(
    dna: &[Sequence],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Sequence>> {
    check_search_input(dna, k)?;
    Ok(dna
        .iter()
        .map(|seq| {
            let offset = rng.gen_range(0..=seq.len() - k);
            seq[offset..offset + k].to_vec()
        })
        .collect())
}

/// One run of randomized restart search: random seed set, then
/// hill-climbing until the first non-improving step.
///
/// Each step profiles the current set (pseudocounts are mandatory here:
/// random motifs would otherwise produce zero columns and stall the very
/// first re-selection) and re-selects every string's most probable k-mer.
/// A single run converges to a local optimum; callers repeat it with fresh
/// randomness and keep the best across runs.
pub fn randomized_motif_search<R: Rng + ?Sized>(
    dna: &[Sequence],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Sequence>> {
    let mut best = random_motifs(dna, k, rng)?;
    let mut best_score = score(&best)?;
    loop {
        let profile = ProfileMatrix::from_motifs(&best, true)?;
        let motifs = dna
            .iter()
            .map(|seq| profile.most_probable_kmer(seq).map(<[_]>::to_vec))
            .collect::<Result<Vec<_>>>()?;
        let candidate_score = score(&motifs)?;
        if candidate_score < best_score {
            best = motifs;
            best_score = candidate_score;
        } else {
            return Ok(best);
        }
    }
}

/// One run of Gibbs sampling: `iterations` total iterations, the first of
/// which is the random seed set itself.
///
/// Each remaining iteration discards one uniformly chosen motif, profiles
/// the other `t - 1` (pseudocounts mandatory), and resamples the discarded
/// motif from its source string with every window weighted by its
/// probability under that profile — a categorical draw, not a greedy pick,
/// which is what lets the sampler walk out of local optima the restart
/// search cannot leave. The working set may regress; only the returned
/// best-so-far is non-increasing, and it is replaced by a copy on strict
/// improvement only.
pub fn gibbs_motif_search<R: Rng + ?Sized>(
    dna: &[Sequence],
    k: usize,
    iterations: usize,
    rng: &mut R,
) -> Result<Vec<Sequence>> {
    if iterations == 0 {
        return Err(MotifError::invalid_parameter(
            "iterations",
            iterations,
            "must be at least 1",
        ));
    }
    if dna.len() < 2 {
        return Err(MotifError::invalid_input(
            "Gibbs sampling needs at least two DNA strings",
        ));
    }
    let mut motifs = random_motifs(dna, k, rng)?;
    let mut best = motifs.clone();
    let mut best_score = score(&best)?;
    for _ in 1..iterations {
        let resampled = rng.gen_range(0..dna.len());
        let held_out: Vec<Sequence> = motifs
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != resampled)
            .map(|(_, motif)| motif.clone())
            .collect();
        let profile = ProfileMatrix::from_motifs(&held_out, true)?;
        let weights: Vec<f64> = dna[resampled]
            .windows(k)
            .map(|window| profile.probability_of(window))
            .collect();
        let draw = Categorical::new(&weights)
            .map_err(|e| MotifError::DataError(format!("degenerate window weights: {e}")))?;
        let offset = draw.sample(rng) as usize;
        motifs[resampled] = dna[resampled][offset..offset + k].to_vec();
        let candidate_score = score(&motifs)?;
        if candidate_score < best_score {
            best = motifs.clone();
            best_score = candidate_score;
        }
    }
    Ok(best)
}

fn check_search_input(dna: &[Sequence], k: usize) -> Result<()> {
    if dna.is_empty() {
        return Err(MotifError::invalid_input("no DNA strings given"));
    }
    if k == 0 {
        return Err(MotifError::invalid_parameter("k", k, "must be at least 1"));
    }
    if let Some(short) = dna.iter().find(|seq| seq.len() < k) {
        return Err(MotifError::invalid_parameter(
            "k",
            k,
            format!("exceeds a DNA string of length {}", short.len()),
        ));
    }
    Ok(())
}
