use crate::error::{MotifError, Result};
use std::fmt;

/// One symbol of the DNA alphabet. Discriminants double as row indices
/// into count and profile matrices, and the declaration order A, C, G, T
/// is the consensus tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Nucleotide {
    A = 0,
    C = 1,
    G = 2,
    T = 3,
}

impl Nucleotide {
    /// All four symbols, in tie-break priority order.
    pub const ALL: [Nucleotide; 4] = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T];

    /// Parses a single uppercase symbol. Lowercase and ambiguity codes are
    /// rejected; inputs are expected to be normalized before they reach
    /// the engine.
    pub fn from_char(c: char) -> Option<Nucleotide> {
        match c {
            'A' => Some(Nucleotide::A),
            'C' => Some(Nucleotide::C),
            'G' => Some(Nucleotide::G),
            'T' => Some(Nucleotide::T),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
        }
    }

    /// Matrix row index of this symbol.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// An ordered run of nucleotides. Built once, never mutated by the engine.
pub type Sequence = Vec<Nucleotide>;

/// Parses an uppercase DNA string into a [`Sequence`], reporting the first
/// offending position on failure.
pub fn parse_sequence(text: &str) -> Result<Sequence> {
    text.chars()
        .enumerate()
        .map(|(position, c)| {
            Nucleotide::from_char(c).ok_or_else(|| {
                MotifError::invalid_sequence(position, format!("unexpected symbol '{}'", c))
            })
        })
        .collect()
}

/// Renders a sequence back to its string form.
pub fn sequence_to_string(seq: &[Nucleotide]) -> String {
    seq.iter().map(|n| n.to_char()).collect()
}

/// Cuts the window of `radius` bases on either side of `center`, clamped to
/// the sequence bounds. This is how a search is focused near a replication
/// origin candidate reported by skew analysis: the returned slice is fed to
/// the engine like any other sequence.
pub fn ori_window(seq: &[Nucleotide], center: usize, radius: usize) -> Result<&[Nucleotide]> {
    if center >= seq.len() {
        return Err(MotifError::invalid_parameter(
            "center",
            center,
            format!("beyond sequence of length {}", seq.len()),
        ));
    }
    let start = center.saturating_sub(radius);
    let end = usize::min(seq.len(), center.saturating_add(radius));
    Ok(&seq[start..end])
}
