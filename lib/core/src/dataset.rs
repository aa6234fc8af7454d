//! JSON dataset loading

use crate::record::CandidateRecord;
use crate::Result;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Read a JSON array of candidate records
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateRecord>> {
    let path = path.as_ref();
    let records: Vec<CandidateRecord> = load_json(path)?;
    info!(path = %path.display(), records = records.len(), "loaded candidate dataset");
    Ok(records)
}

/// Deserialize any JSON document from a file (weight tables, engine config)
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}
