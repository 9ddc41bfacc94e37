//! Reference protein sequences keyed by accession

use super::error::MappingResult;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Accession -> full-length amino-acid sequence
#[derive(Debug, Clone, Default)]
pub struct ReferenceSequences {
    sequences: HashMap<String, String>,
}

impl ReferenceSequences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sequence; residues are upper-cased and whitespace dropped
    pub fn insert(&mut self, accession: impl Into<String>, sequence: &str) {
        let cleaned: String = sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        self.sequences.insert(accession.into(), cleaned);
    }

    pub fn get(&self, accession: &str) -> Option<&str> {
        self.sequences.get(accession).map(String::as_str)
    }

    pub fn contains(&self, accession: &str) -> bool {
        self.sequences.contains_key(accession)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Parse FASTA records
    ///
    /// UniProt headers (`>sp|P06213|INSR_HUMAN ...`) are keyed by the second
    /// `|` field, any other header by its first whitespace-separated token.
    pub fn from_fasta<R: BufRead>(reader: R) -> MappingResult<Self> {
        let mut refs = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();
            if let Some(header) = line.strip_prefix('>') {
                if let Some((accession, sequence)) = current.take() {
                    refs.insert(accession, &sequence);
                }
                current = header_accession(header).map(|acc| (acc, String::new()));
            } else if let Some((_, ref mut sequence)) = current {
                sequence.push_str(line);
            }
        }
        if let Some((accession, sequence)) = current {
            refs.insert(accession, &sequence);
        }

        Ok(refs)
    }

    pub fn from_fasta_file(path: impl AsRef<Path>) -> MappingResult<Self> {
        let file = File::open(path)?;
        Self::from_fasta(BufReader::new(file))
    }
}

fn header_accession(header: &str) -> Option<String> {
    let token = header.split_whitespace().next()?;
    let mut fields = token.split('|');
    let first = fields.next()?;
    match fields.next() {
        Some(second) if !second.is_empty() => Some(second.to_string()),
        _ if !first.is_empty() => Some(first.to_string()),
        _ => None,
    }
}
