//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use anyhow::Context;
use answergate_core::config::write_default_config;
use answergate_core::{
    AnswerGateConfig, AnswerabilityGate, ComputeRequest, GateResult, GroundingResult,
    GroundingService, GroundingVerdict, GroundingVerificationResult, ProvenanceChunk,
    RetrievalQuality, load_config,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Output of `answergate check`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    /// `no_checkable_claims` means the gate ran without a grounding check.
    pub verdict: GroundingVerdict,
    pub grounding: GroundingVerificationResult,
    pub retrieval: RetrievalQuality,
    pub gate: GateResult,
}

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace),
        Commands::Verify {
            answer,
            chunks,
            summary,
        } => {
            let config = load_workspace_config(workspace)?;
            let result = run_verify(&config, &answer, &chunks)?;
            if summary {
                print_json(&result.summary())
            } else {
                print_json(&result)
            }
        }
        Commands::Gate {
            request,
            retrieval,
            grounding,
        } => {
            let config = load_workspace_config(workspace)?;
            let result = run_gate(&config, &request, retrieval.as_deref(), grounding.as_deref())?;
            print_json(&result)
        }
        Commands::Check {
            answer,
            chunks,
            request,
        } => {
            let config = load_workspace_config(workspace)?;
            let report = run_check(&config, &answer, &chunks, &request)?;
            print_json(&report)
        }
    }
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            match write_default_config(workspace)? {
                Some(path) => println!("Created default configuration at: {}", path.display()),
                None => println!(
                    "Configuration file already exists at: {}",
                    workspace.join(".answergate").join("config.toml").display()
                ),
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_workspace_config(workspace)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

fn load_workspace_config(workspace: &Path) -> anyhow::Result<AnswerGateConfig> {
    load_config(Some(workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_answer(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run_verify(
    config: &AnswerGateConfig,
    answer: &Path,
    chunks: &Path,
) -> anyhow::Result<GroundingVerificationResult> {
    let answer = read_answer(answer)?;
    let chunks: Vec<ProvenanceChunk> = read_json(chunks)?;
    let service = GroundingService::new(&config.grounding);
    let result = service.verify(&answer, &chunks);
    tracing::info!(
        claims = result.stats.total_claims,
        grounded = result.stats.grounded_claims,
        verdict = ?result.verdict(),
        "Verified answer"
    );
    Ok(result)
}

pub fn run_gate(
    config: &AnswerGateConfig,
    request: &Path,
    retrieval: Option<&Path>,
    grounding: Option<&Path>,
) -> anyhow::Result<GateResult> {
    let request: ComputeRequest = read_json(request)?;
    let retrieval: Option<RetrievalQuality> = retrieval.map(read_json).transpose()?;
    let grounding: Option<GroundingResult> = grounding.map(read_json).transpose()?;
    let gate = AnswerabilityGate::new(config.gate.clone());
    Ok(gate.evaluate(&request, retrieval.as_ref(), grounding.as_ref()))
}

pub fn run_check(
    config: &AnswerGateConfig,
    answer: &Path,
    chunks: &Path,
    request: &Path,
) -> anyhow::Result<CheckReport> {
    let answer = read_answer(answer)?;
    let chunks: Vec<ProvenanceChunk> = read_json(chunks)?;
    let request: ComputeRequest = read_json(request)?;

    let grounding = GroundingService::new(&config.grounding).verify(&answer, &chunks);
    let verdict = grounding.verdict();
    let summary = grounding.gate_summary();
    if summary.is_none() {
        tracing::info!("No checkable claims; skipping grounding check");
    }
    let retrieval = RetrievalQuality::summarize(&chunks, Utc::now(), &config.retrieval);
    let gate = AnswerabilityGate::new(config.gate.clone()).evaluate(
        &request,
        Some(&retrieval),
        summary.as_ref(),
    );
    if gate.refuse {
        tracing::info!(kind = ?gate.kind, "Answer refused");
    }

    Ok(CheckReport {
        verdict,
        grounding,
        retrieval,
        gate,
    })
}
