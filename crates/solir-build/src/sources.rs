use crate::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Caller-initiated cancellation. The builder polls the token at each
/// source-unit boundary and after each contract body element.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One Solidity file handed to the builder.
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// Logical name, usually the file stem.
    pub name: String,
    /// Absolute path recorded on the source unit.
    pub path: String,
    pub content: String,
}

/// The set of sources for one build, plus the name of the entry contract
/// when the caller knows it.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub inputs: Vec<SourceInput>,
    pub entry_contract: Option<String>,
    prepared: bool,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_single(path: &str, content: &str) -> Self {
        let mut sources = Self::new();
        sources.push(path, content);
        sources
    }

    pub fn push(&mut self, path: &str, content: &str) {
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or(path)
            .trim_end_matches(".sol")
            .to_string();
        self.inputs.push(SourceInput {
            name,
            path: path.to_string(),
            content: content.to_string(),
        });
        self.prepared = false;
    }

    pub fn with_entry(mut self, contract: &str) -> Self {
        self.entry_contract = Some(contract.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn are_prepared(&self) -> bool {
        self.prepared
    }

    /// Validates the input set. Empty input, or input where every file is
    /// blank, is unusable and reported as [`Error::InputMissing`].
    pub fn prepare(&mut self) -> Result<(), Error> {
        if self.inputs.is_empty() {
            return Err(Error::InputMissing);
        }
        if self.inputs.iter().all(|s| s.content.trim().is_empty()) {
            return Err(Error::InputMissing);
        }
        self.prepared = true;
        Ok(())
    }
}
