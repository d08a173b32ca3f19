use crate::{Compiler, CompilerResults, Config};
use anyhow::{anyhow, Context};
use solir_build::Sources;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Drives a `solc` binary through `--combined-json`. Sources are written to
/// a scratch directory because solc reads files, not stdin, for multi-file
/// input.
#[derive(Debug, Default)]
pub struct SolcCommand;

impl SolcCommand {
    pub fn new() -> Self {
        Self
    }

    fn write_sources(&self, sources: &Sources) -> anyhow::Result<(PathBuf, Vec<PathBuf>)> {
        let dir = std::env::temp_dir().join(format!("solir-verify-{}", std::process::id()));
        fs::create_dir_all(&dir).context("creating scratch directory")?;

        let mut paths = Vec::new();
        for input in &sources.inputs {
            let path = dir.join(format!("{}.sol", input.name));
            fs::write(&path, &input.content)
                .with_context(|| format!("writing {}", path.display()))?;
            paths.push(path);
        }
        Ok((dir, paths))
    }
}

impl Compiler for SolcCommand {
    fn compile(&self, config: &Config, sources: &Sources) -> anyhow::Result<CompilerResults> {
        let (dir, paths) = self.write_sources(sources)?;

        let mut command = Command::new(&config.solc);
        command.arg("--combined-json").arg("bin,abi,metadata");
        if config.optimizer {
            command
                .arg("--optimize")
                .arg("--optimize-runs")
                .arg(config.optimizer_runs.to_string());
        }
        if let Some(evm_version) = &config.evm_version {
            command.arg("--evm-version").arg(evm_version);
        }
        command.args(&paths);

        debug!(solc = %config.solc.display(), files = paths.len(), "invoking compiler");
        let output = command
            .output()
            .with_context(|| format!("spawning {}", config.solc.display()))?;

        let _ = fs::remove_dir_all(&dir);

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(anyhow!("solc failed: {stderr}"));
        }

        let combined: serde_json::Value = serde_json::from_slice(&output.stdout)
            .context("parsing solc combined-json output")?;
        let contracts = combined
            .get("contracts")
            .and_then(|c| c.as_object())
            .ok_or_else(|| anyhow!("combined-json output has no contracts"))?;

        // The entry contract when named, otherwise the last one emitted.
        let selected = sources
            .entry_contract
            .as_deref()
            .and_then(|entry| {
                contracts
                    .iter()
                    .find(|(key, _)| key.ends_with(&format!(":{entry}")))
            })
            .or_else(|| contracts.iter().last())
            .ok_or_else(|| anyhow!("no compiled contracts"))?;

        let (_, artifact) = selected;
        let bytecode = artifact
            .get("bin")
            .and_then(|b| b.as_str())
            .unwrap_or_default()
            .to_string();
        let abi = artifact.get("abi").cloned();
        let metadata = artifact
            .get("metadata")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string());

        let warnings = if stderr.trim().is_empty() {
            Vec::new()
        } else {
            stderr.lines().map(|l| l.to_string()).collect()
        };

        Ok(CompilerResults {
            bytecode,
            abi,
            metadata,
            warnings,
        })
    }
}
