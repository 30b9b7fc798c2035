//! JSONL persistence for input journals, with a SHA-256 hash chain.
//!
//! Line 1 is a header carrying `format_version`, `build_id` and the battle setup.
//! Every following line is one accepted oracle response plus `prev_sha256_hex`
//! and `sha256_hex`, where each hash covers the record body and the previous hash.
//! Records are flushed as they are appended. Loading stops at the first line
//! that is incomplete, unparsable, out of sequence or off the chain.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::journal::{BattleSetup, InputJournal, InputPayload, InputRecord};
use crate::types::Side;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    setup: BattleSetup,
}

/// The hashed part of a record line.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    round: u32,
    side: Side,
    payload: &'a InputPayload,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    round: u32,
    side: Side,
    payload: InputPayload,
    prev_sha256_hex: String,
    sha256_hex: String,
}

/// `prev_sha256_hex` of the first record.
pub const INITIAL_HASH: &str = concat!(
    "00000000000000000000000000000000",
    "00000000000000000000000000000000"
);

fn chain_hash(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    format!("{:064x}", hasher.finalize())
}

fn body_json(record: &InputRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RecordBody {
        seq: record.seq,
        round: record.round,
        side: record.side,
        payload: &record.payload,
    })
}

pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates the file (and missing parent directories) and writes the header.
    pub fn create(path: &Path, journal: &InputJournal) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        let header = FileHeader {
            format_version: journal.format_version,
            build_id: journal.build_id.clone(),
            setup: journal.setup.clone(),
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;
        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Appends one record, renumbered to the writer's sequence, and flushes.
    pub fn append(&mut self, round: u32, side: Side, payload: &InputPayload) -> io::Result<()> {
        let record = InputRecord { seq: self.next_seq, round, side, payload: payload.clone() };
        let body = body_json(&record).map_err(io::Error::other)?;
        let sha256_hex = chain_hash(&body, &self.last_sha256_hex);
        let line = FileRecord {
            seq: record.seq,
            round,
            side,
            payload: record.payload,
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };
        let line_json = serde_json::to_string(&line).map_err(io::Error::other)?;
        writeln!(self.writer, "{line_json}")?;
        self.writer.flush()?;
        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;
        Ok(())
    }
}

/// Writes a whole in-memory journal to `path`.
pub fn write_journal(path: &Path, journal: &InputJournal) -> io::Result<()> {
    let mut writer = JournalWriter::create(path, journal)?;
    for record in &journal.inputs {
        writer.append(record.round, record.side, &record.payload)?;
    }
    Ok(())
}

/// Line numbers are 1-based; the header is line 1.
#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("line {line}: bad journal header: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("line {line}: bad journal record: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The file ends without a trailing newline.
    #[error("line {line}: journal line was cut short")]
    IncompleteLine { line: usize },
    #[error("line {line}: SHA-256 chain does not match")]
    HashChainBroken { line: usize },
}

/// Checks one record line against the chain tip and returns the record with its hash.
fn verify_record(
    line: usize,
    text: &str,
    expected_seq: u64,
    prev_sha256_hex: &str,
) -> Result<(InputRecord, String), JournalLoadError> {
    let invalid = |message: String| JournalLoadError::InvalidRecord { line, message };
    if text.is_empty() {
        return Err(invalid("blank line".to_string()));
    }
    let stored: FileRecord = serde_json::from_str(text).map_err(|err| invalid(err.to_string()))?;
    if stored.seq != expected_seq {
        return Err(invalid(format!("seq {} where {expected_seq} was due", stored.seq)));
    }
    let record =
        InputRecord { seq: stored.seq, round: stored.round, side: stored.side, payload: stored.payload };
    let recomputed = chain_hash(&body_json(&record).map_err(|err| invalid(err.to_string()))?, prev_sha256_hex);
    if stored.prev_sha256_hex != prev_sha256_hex || stored.sha256_hex != recomputed {
        return Err(JournalLoadError::HashChainBroken { line });
    }
    Ok((record, recomputed))
}

/// Reads and verifies a whole journal file, failing on the first bad line.
pub fn load_journal_from_file(path: &Path) -> Result<InputJournal, JournalLoadError> {
    let content = fs::read_to_string(path)?;
    if content.is_empty() {
        return Err(JournalLoadError::EmptyFile);
    }
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: content.lines().count() });
    }
    let mut lines = content.lines().enumerate().map(|(idx, text)| (idx + 1, text));

    let (_, header_text) = lines.next().ok_or(JournalLoadError::EmptyFile)?;
    let header: FileHeader = serde_json::from_str(header_text)
        .map_err(|err| JournalLoadError::InvalidHeader { line: 1, message: err.to_string() })?;

    let mut inputs = Vec::new();
    let mut tip = INITIAL_HASH.to_string();
    for (line, text) in lines {
        let (record, sha256_hex) = verify_record(line, text, inputs.len() as u64, &tip)?;
        inputs.push(record);
        tip = sha256_hex;
    }

    Ok(InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        setup: header.setup,
        inputs,
    })
}
