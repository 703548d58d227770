use motif_discovery_rs::search::{self, SearchReport};
use motif_discovery_rs::fasta;

fn main() {
    let df = fasta::read_fasta("tests/data/upstream_regions.fasta").unwrap();
    let dna = fasta::sequences_from_frame(&df).unwrap();
    let best = search::greedy_motif_search(&dna, 15, true).unwrap();
    let report = SearchReport::from_motifs(&best).unwrap();
    println!("consensus: {} (score {})", report.consensus, report.score);
}
