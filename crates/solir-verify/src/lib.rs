/*! Verifies deployed bytecode against a fresh compile of the sources.
 *
 * The compiler is an external collaborator behind the [`Compiler`] trait;
 * [`SolcCommand`] shells out to a configured `solc` binary, the only
 * blocking OS call in the workspace and never on the AST/IR path. A
 * mismatch is a data result with a diff, not an error.
 */

mod diff;
mod solc;

pub use diff::{pretty, Diff, DiffOp};
pub use solc::SolcCommand;

use serde::{Deserialize, Serialize};
use solir_build::Sources;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("config must be set")]
    MissingConfig,
    #[error("sources must be set")]
    MissingSources,
    #[error("source preparation failed: {0}")]
    Sources(#[from] solir_build::Error),
    #[error("compiler failure: {0}")]
    Compiler(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// Compiler invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub solc: PathBuf,
    pub optimizer: bool,
    pub optimizer_runs: u32,
    pub evm_version: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solc: PathBuf::from("solc"),
            optimizer: false,
            optimizer_runs: 200,
            evm_version: None,
        }
    }
}

/// What a compile produces, independent of the driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerResults {
    /// Hex-encoded deployed bytecode, no 0x prefix.
    pub bytecode: String,
    pub abi: Option<serde_json::Value>,
    pub metadata: Option<String>,
    pub warnings: Vec<String>,
}

pub trait Compiler {
    fn compile(&self, config: &Config, sources: &Sources) -> anyhow::Result<CompilerResults>;
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResult {
    pub verified: bool,
    pub expected_bytecode: String,
    pub results: CompilerResults,
    pub diffs: Vec<Diff>,
    pub diff_pretty: String,
}

impl VerifyResult {
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

/// Compiles the configured sources and compares against expected bytecode.
pub struct Verifier<C: Compiler> {
    config: Config,
    sources: Sources,
    compiler: C,
}

impl<C: Compiler> Verifier<C> {
    pub fn new(config: Config, mut sources: Sources, compiler: C) -> Result<Self> {
        if sources.is_empty() {
            return Err(VerifyError::MissingSources);
        }
        if !sources.are_prepared() {
            sources.prepare()?;
        }
        Ok(Self {
            config,
            sources,
            compiler,
        })
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compiles and compares. `verified` is false on mismatch and the diff
    /// describes how the compiled bytecode differs from the expected one.
    pub fn verify(&self, expected_bytecode: &[u8]) -> Result<VerifyResult> {
        let results = self
            .compiler
            .compile(&self.config, &self.sources)
            .map_err(|e| VerifyError::Compiler(e.to_string()))?;

        let expected = hex::encode(expected_bytecode);
        if expected == results.bytecode {
            debug!(bytes = expected.len() / 2, "bytecode verified");
            return Ok(VerifyResult {
                verified: true,
                expected_bytecode: expected,
                results,
                diffs: Vec::new(),
                diff_pretty: String::new(),
            });
        }

        let diffs = diff::diff_strings(&expected, &results.bytecode);
        let diff_pretty = diff::pretty(&diffs);
        Ok(VerifyResult {
            verified: false,
            expected_bytecode: expected,
            results,
            diffs,
            diff_pretty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCompiler {
        bytecode: &'static str,
    }

    impl Compiler for FixedCompiler {
        fn compile(&self, _config: &Config, _sources: &Sources) -> anyhow::Result<CompilerResults> {
            Ok(CompilerResults {
                bytecode: self.bytecode.to_string(),
                ..Default::default()
            })
        }
    }

    fn sources() -> Sources {
        Sources::from_single("a.sol", "contract A {}")
    }

    #[test]
    fn matching_bytecode_verifies() {
        let verifier = Verifier::new(
            Config::default(),
            sources(),
            FixedCompiler { bytecode: "6001" },
        )
        .unwrap();
        let result = verifier.verify(&[0x60, 0x01]).unwrap();
        assert!(result.is_verified());
        assert!(result.diffs.is_empty());
    }

    #[test]
    fn mismatch_is_data_with_a_diff() {
        let verifier = Verifier::new(
            Config::default(),
            sources(),
            FixedCompiler { bytecode: "6002" },
        )
        .unwrap();
        let result = verifier.verify(&[0x60, 0x01]).unwrap();
        assert!(!result.is_verified());
        assert!(!result.diffs.is_empty());
        assert!(!result.diff_pretty.is_empty());
        assert_eq!(result.expected_bytecode, "6001");
    }

    #[test]
    fn empty_sources_are_rejected() {
        let err = Verifier::new(
            Config::default(),
            Sources::new(),
            FixedCompiler { bytecode: "" },
        )
        .err()
        .unwrap();
        assert!(matches!(err, VerifyError::MissingSources));
    }
}
