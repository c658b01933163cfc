//! Durable store backed by RocksDB
//!
//! Single flat keyspace; callers namespace their records with key prefixes.
//! Tuned for a write-heavy, small-value workload.

use std::path::Path;

use rocksdb::{DBCompactionStyle, DBCompressionType, Direction, IteratorMode, Options, DB};

use crate::{KvEntry, Result, Store, StoreError};

/// RocksDB tuning knobs.
#[derive(Debug, Clone)]
pub struct RocksConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max write buffers
    pub max_write_buffer_number: i32,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 64,
            max_write_buffer_number: 4,
            max_background_jobs: 4,
        }
    }
}

/// RocksDB-backed `Store` implementation.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a database at `path`.
    pub fn open(path: impl AsRef<Path>, config: &RocksConfig) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size_mb * 1024 * 1024);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_max_background_jobs(config.max_background_jobs);

        // Universal compaction for write-heavy workload
        opts.set_compaction_style(DBCompactionStyle::Universal);
        opts.set_compression_type(DBCompressionType::Lz4);

        let db = DB::open(&opts, path)?;
        tracing::info!("Opened RocksDB store at {:?}", path);

        Ok(Self { db })
    }

    /// Open with default tuning.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, &RocksConfig::default())
    }
}

impl Store for RocksStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        Ok(self.db.put(key, value)?)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        Ok(self.db.delete(key)?)
    }

    fn iterate_prefix<'a>(
        &'a self,
        prefix: &[u8],
    ) -> Result<Box<dyn Iterator<Item = Result<KvEntry>> + 'a>> {
        let prefix = prefix.to_vec();
        let raw = self
            .db
            .iterator(IteratorMode::From(&prefix, Direction::Forward));
        let iter = raw
            .map(|item| {
                item.map(|(k, v)| (k.to_vec(), v.to_vec()))
                    .map_err(StoreError::from)
            })
            .take_while(move |item| match item {
                Ok((k, _)) => k.starts_with(&prefix),
                // surface backend errors instead of silently ending the scan
                Err(_) => true,
            });
        Ok(Box::new(iter))
    }
}
