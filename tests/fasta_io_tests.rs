use polars::prelude::*;
use motif_discovery_rs::fasta;

#[test]
fn test_read_fasta() {
    let path = "tests/data/upstream_regions.fasta";
    let df = fasta::read_fasta(path).unwrap();
    assert_eq!(df.height(), 10);
    assert_eq!(df.width(), 2);

    // test file does not exist
    let result = fasta::read_fasta("tests/data/nonexistent.fasta");
    assert!(result.is_err());
}

#[test]
fn test_write_fasta() {
    let path = "tests/data/roundtrip_out.fasta";
    let df: DataFrame = df!(
        "label" => ["ori_window_a", "ori_window_b", "ori_window_c"],
        "sequence" => ["AGCTTTTTAATAGAGTCAGCAAAACTGAA", "TGCTTTTTTTTTGAGTCAGCAAAACTGAA", "CGCTTTTTAATAGAGTCAGCAAAACTGAA"],
    )
    .unwrap();

    fasta::write_fasta(&df, path).unwrap();

    let df_out = fasta::read_fasta(path).unwrap();
    assert_eq!(df_out.height(), 3);
    assert_eq!(df_out.width(), 2);

    // clean up
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_sequences_from_frame() {
    let df = fasta::read_fasta("tests/data/upstream_regions.fasta").unwrap();
    let dna = fasta::sequences_from_frame(&df).unwrap();
    assert_eq!(dna.len(), 10);
    assert!(dna.iter().all(|seq| seq.len() == 82));
}

#[test]
fn test_sequences_from_frame_rejects_bad_alphabet() {
    let df: DataFrame = df!(
        "label" => ["bad"],
        "sequence" => ["ACGNACGT"],
    )
    .unwrap();

    let result = fasta::sequences_from_frame(&df);
    assert!(result.is_err());
}
