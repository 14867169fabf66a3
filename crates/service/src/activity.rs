use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Prompt,
    Reaction,
}

#[derive(Serialize)]
struct Entry<'a> {
    session_id: &'a str,
    log_idx: u64,
    #[serde(rename = "type")]
    kind: EntryKind,
    data: Value,
}

/// Per-agent JSONL session log at `<folder>/<agent>/session_<session_id>.jsonl`.
#[derive(Debug)]
pub struct ActivityLog {
    session_id: String,
    path: PathBuf,
    out: BufWriter<File>,
    next_idx: u64,
}

impl ActivityLog {
    pub fn open(folder: &Path, agent_stem: &str, session_id: &str) -> Result<Self, ServiceError> {
        let dir = folder.join(agent_stem);
        std::fs::create_dir_all(&dir).map_err(|e| ServiceError::io(&dir, e))?;
        let path = dir.join(format!("session_{session_id}.jsonl"));
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ServiceError::io(&path, e))?;
        Ok(Self { session_id: session_id.to_owned(), path, out: BufWriter::new(file), next_idx: 0 })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_prompt(&mut self, prompt: &str, response: Value) -> Result<(), ServiceError> {
        self.append(EntryKind::Prompt, serde_json::json!({"prompt": prompt, "response": response}))
    }

    pub fn log_reaction(&mut self, data: Value) -> Result<(), ServiceError> {
        self.append(EntryKind::Reaction, data)
    }

    fn append(&mut self, kind: EntryKind, data: Value) -> Result<(), ServiceError> {
        let entry = Entry { session_id: &self.session_id, log_idx: self.next_idx, kind, data };
        serde_json::to_writer(&mut self.out, &entry)?;
        self.out.write_all(b"\n").map_err(|e| ServiceError::io(&self.path, e))?;
        self.out.flush().map_err(|e| ServiceError::io(&self.path, e))?;
        self.next_idx = self.next_idx.saturating_add(1);
        Ok(())
    }
}
