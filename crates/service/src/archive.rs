use std::io::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tweetvec_core::decode_tweet;

use crate::error::ServiceError;
use crate::subscriber::MessageHandler;

const DEFAULT_FLUSH_EVERY: usize = 1000;
const FILE_PREFIX: &str = "tweets_";
const FILE_SUFFIX: &str = ".jsonl";

/// One archived tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub author: String,
    pub content: String,
}

/// Buffers validated tweets and writes them out as numbered JSONL files.
#[derive(Debug)]
pub struct ArchiveWriter {
    dir: PathBuf,
    flush_every: usize,
    buffer: Vec<ArchiveRecord>,
    next_index: usize,
}

impl ArchiveWriter {
    /// Creates `dir` if needed. Numbering continues after any archive files already there.
    pub fn new(dir: &Path) -> Result<Self, ServiceError> {
        std::fs::create_dir_all(dir).map_err(|e| ServiceError::io(dir, e))?;
        let next_index = next_free_index(dir)?;
        Ok(Self { dir: dir.to_path_buf(), flush_every: DEFAULT_FLUSH_EVERY, buffer: Vec::new(), next_index })
    }

    #[must_use]
    pub fn with_flush_every(mut self, flush_every: usize) -> Self {
        self.flush_every = flush_every.max(1);
        self
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Buffers one record; returns the file written if the buffer filled up.
    pub fn push(&mut self, record: ArchiveRecord) -> Result<Option<PathBuf>, ServiceError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.flush_every {
            return self.flush();
        }
        Ok(None)
    }

    /// Writes the buffer to a new file. Does nothing when empty.
    pub fn flush(&mut self) -> Result<Option<PathBuf>, ServiceError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let path = self.dir.join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", self.next_index));
        let file = std::fs::File::create(&path).map_err(|e| ServiceError::io(&path, e))?;
        let mut out = std::io::BufWriter::new(file);
        for record in &self.buffer {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n").map_err(|e| ServiceError::io(&path, e))?;
        }
        out.flush().map_err(|e| ServiceError::io(&path, e))?;

        tracing::info!(path = %path.display(), records = self.buffer.len(), "Flushed archive file");
        self.buffer.clear();
        self.next_index = self.next_index.saturating_add(1);
        Ok(Some(path))
    }
}

#[async_trait]
impl MessageHandler for ArchiveWriter {
    async fn handle(&mut self, payload: &str) -> Result<(), ServiceError> {
        let tweet = decode_tweet(payload)?;
        self.push(ArchiveRecord { author: tweet.author, content: tweet.content })?;
        Ok(())
    }
}

fn next_free_index(dir: &Path) -> Result<usize, ServiceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ServiceError::io(dir, e))?;
    let next = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?.parse::<usize>().ok()
        })
        .max()
        .map_or(0, |max| max.saturating_add(1));
    Ok(next)
}
