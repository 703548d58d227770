use crate::error::{MotifError, Result};
use crate::types::{Nucleotide, Sequence};
use ndarray::{Array2, Axis};

const ALPHABET_SIZE: usize = 4;

/// Per-position symbol counts for a motif set, 4 rows by `k` columns.
///
/// Every column sums to the number of motifs `t`, or `t + 4` when Laplace
/// smoothing was requested (each cell starts at 1 instead of 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMatrix {
    counts: Array2<u32>,
    motifs: u32,
    pseudocounts: bool,
}

impl CountMatrix {
    /// Tallies the motifs into a count matrix. The motifs must be non-empty
    /// and all of the same length.
    pub fn from_motifs(motifs: &[Sequence], pseudocounts: bool) -> Result<CountMatrix> {
        let k = check_motif_shape(motifs)?;
        let fill = u32::from(pseudocounts);
        let mut counts = Array2::from_elem((ALPHABET_SIZE, k), fill);
        for motif in motifs {
            for (position, nucleotide) in motif.iter().enumerate() {
                counts[[nucleotide.index(), position]] += 1;
            }
        }
        Ok(CountMatrix {
            counts,
            motifs: motifs.len() as u32,
            pseudocounts,
        })
    }

    /// Motif length `k`.
    pub fn width(&self) -> usize {
        self.counts.ncols()
    }

    pub fn get(&self, nucleotide: Nucleotide, position: usize) -> u32 {
        self.counts[[nucleotide.index(), position]]
    }

    /// The total every column sums to: `t`, or `t + 4` when smoothed.
    pub fn column_total(&self) -> u32 {
        self.motifs + if self.pseudocounts { ALPHABET_SIZE as u32 } else { 0 }
    }

    /// Divides every cell by the column total, yielding probabilities.
    pub fn to_profile(&self) -> ProfileMatrix {
        let total = f64::from(self.column_total());
        ProfileMatrix {
            probabilities: self.counts.mapv(|c| f64::from(c) / total),
        }
    }
}

/// Per-position symbol probabilities, 4 rows by `k` columns, each column
/// summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileMatrix {
    probabilities: Array2<f64>,
}

impl ProfileMatrix {
    /// Builds the profile of a motif set. With `pseudocounts` every cell of
    /// the underlying count matrix starts at 1, so no probability is ever
    /// zero; the stochastic searches rely on that.
    pub fn from_motifs(motifs: &[Sequence], pseudocounts: bool) -> Result<ProfileMatrix> {
        Ok(CountMatrix::from_motifs(motifs, pseudocounts)?.to_profile())
    }

    /// Wraps an externally-derived 4 x k probability matrix, such as a PWM
    /// taken from a motif database. Rows are indexed A, C, G, T; every
    /// column must sum to 1 within 1e-9 and contain no negative entries.
    pub fn from_probabilities(probabilities: Array2<f64>) -> Result<ProfileMatrix> {
        if probabilities.nrows() != ALPHABET_SIZE || probabilities.ncols() == 0 {
            return Err(MotifError::invalid_input(
                "profile must have 4 rows and at least one column",
            ));
        }
        for (position, column) in probabilities.axis_iter(Axis(1)).enumerate() {
            if column.iter().any(|&p| p < 0.0) {
                return Err(MotifError::DataError(format!(
                    "negative probability in profile column {}",
                    position
                )));
            }
            let total: f64 = column.sum();
            if (total - 1.0).abs() > 1e-9 {
                return Err(MotifError::DataError(format!(
                    "profile column {} sums to {} instead of 1",
                    position, total
                )));
            }
        }
        Ok(ProfileMatrix { probabilities })
    }

    /// Motif length `k`.
    pub fn width(&self) -> usize {
        self.probabilities.ncols()
    }

    pub fn get(&self, nucleotide: Nucleotide, position: usize) -> f64 {
        self.probabilities[[nucleotide.index(), position]]
    }

    /// Probability that this profile emits `kmer`: the product of the
    /// per-position entries. A single zero entry collapses the whole
    /// product to 0.0; that is the documented behavior, not an error.
    /// Profiles built with pseudocounts never contain zeros.
    pub fn probability_of(&self, kmer: &[Nucleotide]) -> f64 {
        debug_assert_eq!(kmer.len(), self.width());
        kmer.iter()
            .enumerate()
            .map(|(position, nucleotide)| self.get(*nucleotide, position))
            .product()
    }

    /// Total Shannon entropy of the profile in bits: per-position entropies
    /// `-sum(p * log2 p)` summed across all columns. Zero-probability cells
    /// contribute nothing, so fully conserved positions score exactly 0.
    pub fn entropy(&self) -> f64 {
        self.probabilities
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.log2())
            .sum()
    }

    /// The k-wide window of `text` with the highest probability under this
    /// profile. Scans left to right and replaces the running best only on
    /// strict improvement, so the first of several tied windows wins.
    pub fn most_probable_kmer<'a>(&self, text: &'a [Nucleotide]) -> Result<&'a [Nucleotide]> {
        let k = self.width();
        if text.len() < k {
            return Err(MotifError::invalid_input(format!(
                "sequence of length {} is shorter than k = {}",
                text.len(),
                k
            )));
        }
        let mut best = &text[..k];
        let mut best_probability = self.probability_of(best);
        for window in text.windows(k).skip(1) {
            let probability = self.probability_of(window);
            if probability > best_probability {
                best = window;
                best_probability = probability;
            }
        }
        Ok(best)
    }
}

/// The per-position majority symbol of a motif set. Ties go to the earlier
/// symbol in A, C, G, T priority order. Counts are never smoothed here:
/// pseudocounts exist to keep profile probabilities away from zero and
/// would distort majorities.
pub fn consensus(motifs: &[Sequence]) -> Result<Sequence> {
    let counts = CountMatrix::from_motifs(motifs, false)?;
    Ok((0..counts.width())
        .map(|position| {
            let mut best = Nucleotide::A;
            let mut best_count = counts.get(best, position);
            for nucleotide in [Nucleotide::C, Nucleotide::G, Nucleotide::T] {
                let count = counts.get(nucleotide, position);
                if count > best_count {
                    best = nucleotide;
                    best_count = count;
                }
            }
            best
        })
        .collect())
}

/// Number of motif positions that disagree with the consensus. This is the
/// conservation objective every search minimizes; 0 means all motifs are
/// identical to the consensus.
pub fn score(motifs: &[Sequence]) -> Result<usize> {
    let consensus = consensus(motifs)?;
    Ok(motifs
        .iter()
        .map(|motif| {
            motif
                .iter()
                .zip(&consensus)
                .filter(|(observed, expected)| observed != expected)
                .count()
        })
        .sum())
}

fn check_motif_shape(motifs: &[Sequence]) -> Result<usize> {
    let first = motifs
        .first()
        .ok_or_else(|| MotifError::invalid_input("motif set is empty"))?;
    let k = first.len();
    if k == 0 {
        return Err(MotifError::invalid_input("motifs must not be empty"));
    }
    if motifs.iter().any(|motif| motif.len() != k) {
        return Err(MotifError::invalid_input(
            "motifs must all have the same length",
        ));
    }
    Ok(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_sequence;
    use ndarray::arr2;

    fn motifs(strings: &[&str]) -> Vec<Sequence> {
        strings.iter().map(|s| parse_sequence(s).unwrap()).collect()
    }

    #[test]
    fn count_columns_sum_to_t() {
        let set = motifs(&["ACGT", "ACGA", "ACGT"]);
        let counts = CountMatrix::from_motifs(&set, false).unwrap();
        assert_eq!(counts.width(), 4);
        for position in 0..4 {
            let total: u32 = Nucleotide::ALL
                .iter()
                .map(|&n| counts.get(n, position))
                .sum();
            assert_eq!(total, 3);
        }

        let smoothed = CountMatrix::from_motifs(&set, true).unwrap();
        assert_eq!(smoothed.column_total(), 7);
        for position in 0..4 {
            let total: u32 = Nucleotide::ALL
                .iter()
                .map(|&n| smoothed.get(n, position))
                .sum();
            assert_eq!(total, 7);
        }
    }

    #[test]
    fn profile_columns_sum_to_one() {
        let set = motifs(&["ACGT", "ACGA", "TCGT"]);
        for pseudocounts in [false, true] {
            let profile = ProfileMatrix::from_motifs(&set, pseudocounts).unwrap();
            for position in 0..profile.width() {
                let total: f64 = Nucleotide::ALL
                    .iter()
                    .map(|&n| profile.get(n, position))
                    .sum();
                assert!((total - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn profile_times_total_recovers_counts() {
        let set = motifs(&["ACGT", "ACGA", "TCGT", "GCGT", "ACCT"]);
        let counts = CountMatrix::from_motifs(&set, false).unwrap();
        let profile = counts.to_profile();
        let t = set.len() as f64;
        for position in 0..counts.width() {
            for &nucleotide in &Nucleotide::ALL {
                let recovered = (profile.get(nucleotide, position) * t).round() as u32;
                assert_eq!(recovered, counts.get(nucleotide, position));
            }
        }
    }

    #[test]
    fn shape_errors() {
        assert!(CountMatrix::from_motifs(&[], false).is_err());
        let ragged = motifs(&["ACGT", "ACG"]);
        assert!(CountMatrix::from_motifs(&ragged, false).is_err());
        let empty = vec![Vec::new()];
        assert!(CountMatrix::from_motifs(&empty, false).is_err());
    }

    #[test]
    fn consensus_majority_and_score() {
        let set = motifs(&["ACGT", "ACGA", "ACGT"]);
        let consensus = consensus(&set).unwrap();
        assert_eq!(consensus.len(), 4);
        assert_eq!(crate::types::sequence_to_string(&consensus), "ACGT");
        // only position 3 of the second motif disagrees
        assert_eq!(score(&set).unwrap(), 1);
    }

    #[test]
    fn consensus_ties_follow_symbol_priority() {
        // both positions tie 1-1 between A and C, so A wins both
        let set = motifs(&["AC", "CA"]);
        assert_eq!(
            crate::types::sequence_to_string(&consensus(&set).unwrap()),
            "AA"
        );
    }

    #[test]
    fn score_zero_iff_fully_conserved() {
        let conserved = motifs(&["GATTACA", "GATTACA", "GATTACA"]);
        assert_eq!(score(&conserved).unwrap(), 0);
        let off_by_one = motifs(&["GATTACA", "GATTACA", "GATTACC"]);
        assert!(score(&off_by_one).unwrap() > 0);
    }

    #[test]
    fn conserved_motif_set_scores_thirty() {
        let set = motifs(&[
            "TCGGGGGTTTTT",
            "CCGGTGACTTAC",
            "ACGGGGATTTTC",
            "TTGGGGACTTTT",
            "AAGGGGACTTCC",
            "TTGGGGACTTCC",
            "TCGGGGATTCAT",
            "TCGGGGATTCCT",
            "TAGGGGAACTAC",
            "TCGGGTATAACC",
        ]);
        assert_eq!(score(&set).unwrap(), 30);
        assert_eq!(
            crate::types::sequence_to_string(&consensus(&set).unwrap()),
            "TCGGGGATTTCC"
        );

        let profile = ProfileMatrix::from_motifs(&set, false).unwrap();
        let text = parse_sequence("GGTACGGGGATTACCT").unwrap();
        let best = profile.most_probable_kmer(&text).unwrap();
        assert_eq!(crate::types::sequence_to_string(best), "ACGGGGATTACC");
    }

    #[test]
    fn probability_of_matches_profile_entries() {
        let profile = ProfileMatrix::from_probabilities(arr2(&[
            [1.0, 0.0],
            [0.0, 1.0],
            [0.0, 0.0],
            [0.0, 0.0],
        ]))
        .unwrap();
        let ac = parse_sequence("AC").unwrap();
        assert_eq!(profile.probability_of(&ac), 1.0);
        // a single zero entry collapses the product
        let ca = parse_sequence("CA").unwrap();
        assert_eq!(profile.probability_of(&ca), 0.0);
    }

    #[test]
    fn from_probabilities_validates_columns() {
        assert!(ProfileMatrix::from_probabilities(arr2(&[
            [0.5, 0.5],
            [0.5, 0.4],
            [0.0, 0.0],
            [0.0, 0.0],
        ]))
        .is_err());
        assert!(ProfileMatrix::from_probabilities(Array2::zeros((3, 2))).is_err());
    }

    #[test]
    fn entropy_of_conserved_position_is_zero() {
        let profile = ProfileMatrix::from_probabilities(arr2(&[
            [1.0, 0.25],
            [0.0, 0.25],
            [0.0, 0.25],
            [0.0, 0.25],
        ]))
        .unwrap();
        // conserved column contributes 0, uniform column contributes 2 bits
        assert!((profile.entropy() - 2.0).abs() < 1e-12);
        assert!(profile.entropy() >= 0.0);
    }

    #[test]
    fn entropy_of_binding_site_profile() {
        let profile = ProfileMatrix::from_probabilities(arr2(&[
            [0.2, 0.2, 0.0, 0.0, 0.0, 0.0, 0.9, 0.1, 0.1, 0.1, 0.3, 0.0],
            [0.1, 0.6, 0.0, 0.0, 0.0, 0.0, 0.0, 0.4, 0.1, 0.2, 0.4, 0.6],
            [0.0, 0.0, 1.0, 1.0, 0.9, 0.9, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.7, 0.2, 0.0, 0.0, 0.1, 0.1, 0.0, 0.5, 0.8, 0.7, 0.3, 0.4],
        ]))
        .unwrap();
        assert!((profile.entropy() - 9.916290005356972).abs() < 1e-9);
    }

    #[test]
    fn most_probable_kmer_prefers_first_on_ties() {
        // uniform profile: every window ties, so the leftmost wins
        let profile = ProfileMatrix::from_probabilities(arr2(&[
            [0.25, 0.25, 0.25],
            [0.25, 0.25, 0.25],
            [0.25, 0.25, 0.25],
            [0.25, 0.25, 0.25],
        ]))
        .unwrap();
        let text = parse_sequence("ATGCATGC").unwrap();
        let best = profile.most_probable_kmer(&text).unwrap();
        assert_eq!(crate::types::sequence_to_string(best), "ATG");
    }

    #[test]
    fn most_probable_kmer_rejects_short_text() {
        let set = motifs(&["ACGT", "ACGT"]);
        let profile = ProfileMatrix::from_motifs(&set, true).unwrap();
        let short = parse_sequence("ACG").unwrap();
        assert!(profile.most_probable_kmer(&short).is_err());
    }
}
