//! Ledger persistence.
//!
//! The ledger is stored as a single binary object:
//!
//! ```text
//! magic    b"MCPI"
//! version  u16 little-endian
//! hash     blake3(payload), 32 bytes
//! payload  zstd(bincode(Vec<EstimateRecord>))
//! ```
//!
//! Writes go to a sibling temp file that is synced and then renamed over the
//! target, so a crash mid-write leaves the previous ledger readable.
//!
//! Access is read-whole-file then overwrite-whole-file with no locking. Only
//! one session may use a given ledger path at a time.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ConvergenceLedger;
use crate::error::{PiError, PiResult};
use crate::estimate::EstimateRecord;

/// Working-directory-relative ledger location used when none is configured.
pub const DEFAULT_LEDGER_PATH: &str = "pkled_data.bin";

/// Default zstd compression level for the payload.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

const MAGIC: &[u8; 4] = b"MCPI";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 32;

/// Where a ledger lives between runs.
///
/// Implementations replace the whole stored ledger on every `persist`.
pub trait LedgerStore {
    /// Read the stored ledger, or `None` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageCorrupt` if stored data exists but cannot be decoded,
    /// or `Io` if it cannot be read.
    fn load(&self) -> PiResult<Option<ConvergenceLedger>>;

    /// Replace the stored ledger with `ledger`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be encoded or written. The
    /// previously stored ledger is left intact in that case.
    fn persist(&mut self, ledger: &ConvergenceLedger) -> PiResult<()>;

    /// Human-readable location, for logs and messages.
    fn location(&self) -> String;
}

/// Encode a ledger into the on-disk format.
///
/// # Errors
///
/// Returns `Serialization` or `Io` if encoding or compression fails.
pub fn encode_ledger(ledger: &ConvergenceLedger, compression_level: i32) -> PiResult<Vec<u8>> {
    let serialized = bincode::serialize(ledger.records())
        .map_err(|e| PiError::serialization(e.to_string()))?;
    let compressed = zstd::encode_all(&serialized[..], compression_level)?;
    let hash = blake3::hash(&compressed);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(hash.as_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Decode a ledger previously produced by [`encode_ledger`].
///
/// `origin` is only used to label errors.
///
/// # Errors
///
/// Returns `StorageCorrupt` for a short header, wrong magic, unknown version,
/// hash mismatch, undecodable payload, an empty record list, or records that
/// break the value-range invariants.
pub fn decode_ledger(bytes: &[u8], origin: &Path) -> PiResult<ConvergenceLedger> {
    let corrupt = |reason: String| PiError::storage_corrupt(origin, reason);

    if bytes.len() < HEADER_LEN {
        return Err(corrupt(format!(
            "truncated header ({} of {HEADER_LEN} bytes)",
            bytes.len()
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);

    if &header[..4] != MAGIC {
        return Err(corrupt("bad magic".to_string()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}")));
    }
    if blake3::hash(payload).as_bytes() != &header[6..HEADER_LEN] {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    let decompressed =
        zstd::decode_all(payload).map_err(|e| corrupt(format!("decompression failed: {e}")))?;
    let records: Vec<EstimateRecord> = bincode::deserialize(&decompressed)
        .map_err(|e| corrupt(format!("undecodable records: {e}")))?;

    if let Some((index, _)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| !r.is_well_formed())
    {
        return Err(corrupt(format!("record {index} is out of range")));
    }

    ConvergenceLedger::from_records(records).ok_or_else(|| corrupt("empty ledger".to_string()))
}

/// Ledger stored in a single file.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    path: PathBuf,
    compression_level: i32,
}

impl Default for FileLedgerStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_PATH)
    }
}

impl FileLedgerStore {
    /// Store at `path` with the default compression level.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Set the zstd compression level (1-22).
    #[must_use]
    pub const fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Ledger file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path
            .with_file_name(format!(".{name}.tmp.{}", std::process::id()))
    }

    fn write_atomic(&self, bytes: &[u8]) -> PiResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &self.path));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result.map_err(PiError::from)
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> PiResult<Option<ConvergenceLedger>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger on disk, starting fresh");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let ledger = decode_ledger(&bytes, &self.path)?;
        debug!(
            path = %self.path.display(),
            records = ledger.len(),
            "loaded ledger"
        );
        Ok(Some(ledger))
    }

    fn persist(&mut self, ledger: &ConvergenceLedger) -> PiResult<()> {
        let bytes = encode_ledger(ledger, self.compression_level)?;
        self.write_atomic(&bytes)?;
        info!(
            path = %self.path.display(),
            records = ledger.len(),
            bytes = bytes.len(),
            "persisted ledger"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store, for tests and embedding hosts that keep their own state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    ledger: Option<ConvergenceLedger>,
    persist_count: usize,
}

impl MemoryLedgerStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `ledger`.
    #[must_use]
    pub fn with_ledger(ledger: ConvergenceLedger) -> Self {
        Self {
            ledger: Some(ledger),
            persist_count: 0,
        }
    }

    /// How many times `persist` has been called.
    #[must_use]
    pub const fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> PiResult<Option<ConvergenceLedger>> {
        Ok(self.ledger.clone())
    }

    fn persist(&mut self, ledger: &ConvergenceLedger) -> PiResult<()> {
        self.ledger = Some(ledger.clone());
        self.persist_count += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
