use crate::error::{MotifError, Result};
use crate::types::{parse_sequence, Sequence};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

/// Reads a FASTA file into a DataFrame with `label` and `sequence` columns.
///
/// Sequence lines are uppercased and concatenated per record. Alphabet
/// validation happens later, in [`sequences_from_frame`], so this layer can
/// also carry sequences destined for other tooling.
///
/// # Errors
/// * `MotifError::Io` - if the file cannot be opened or read
/// * `MotifError::InvalidFileFormat` - on data before the first header, or
///   when no records are found
/// * `MotifError::DataError` - if DataFrame creation fails
pub fn read_fasta(filename: &str) -> Result<DataFrame> {
    let reader = BufReader::new(File::open(filename)?);
    let mut labels: Vec<String> = Vec::new();
    let mut sequences: Vec<String> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if let Some(header) = line.strip_prefix('>') {
            labels.push(header.to_string());
            sequences.push(String::new());
        } else if !line.is_empty() {
            let current = sequences.last_mut().ok_or_else(|| {
                MotifError::InvalidFileFormat("sequence data before first header".into())
            })?;
            current.push_str(&line.to_uppercase());
        }
    }

    if labels.is_empty() {
        return Err(MotifError::InvalidFileFormat("no sequences found".into()));
    }

    DataFrame::new(vec![
        Column::new("label".into(), labels),
        Column::new("sequence".into(), sequences),
    ])
    .map_err(|e| MotifError::DataError(e.to_string()))
}

/// Writes the `label`/`sequence` columns of a DataFrame as FASTA records.
///
/// # Errors
/// * `MotifError::DataError` - if either column is missing or holds nulls
/// * `MotifError::Io` - for file writing issues
pub fn write_fasta(df: &DataFrame, filename: &str) -> Result<()> {
    let labels = utf8_column(df, "label")?;
    let sequences = utf8_column(df, "sequence")?;
    let mut file = File::create(filename)?;

    for row in 0..df.height() {
        let label = required_value(labels, row, "label")?;
        let sequence = required_value(sequences, row, "sequence")?;
        writeln!(file, ">{}", label)?;
        writeln!(file, "{}", sequence)?;
    }

    Ok(())
}

/// Converts the `sequence` column into validated engine sequences. This is
/// the alphabet gate: any symbol outside A/C/G/T is rejected here so the
/// search engine can assume clean input.
pub fn sequences_from_frame(df: &DataFrame) -> Result<Vec<Sequence>> {
    let column = utf8_column(df, "sequence")?;
    let mut out = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let text = required_value(column, row, "sequence")?;
        out.push(parse_sequence(text)?);
    }
    Ok(out)
}

fn utf8_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .and_then(|column| column.str())
        .map_err(|e| MotifError::DataError(e.to_string()))
}

fn required_value<'a>(column: &'a StringChunked, row: usize, name: &str) -> Result<&'a str> {
    column
        .get(row)
        .ok_or_else(|| MotifError::DataError(format!("null {} at row {}", name, row)))
}
