//! Answerability gate: the single refuse/proceed decision before an answer
//! is shown.
//!
//! Cases are evaluated in a fixed order and the first match wins:
//! 1. the intent asks for more information
//! 2. a computation intent is missing required parameters
//! 3. an explain-only answer has weak retrieval (low top score, then too few results)
//! 4. too little of the answer is grounded
//! 5. sources are stale and the request is time-sensitive
//!
//! Anything else proceeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GateConfig;
use crate::refusal::{
    CHECK_CURRENT_TERMS, CHECK_OFFICIAL_SOURCE, EXPLAIN_CITED_ONLY, REPHRASE_WITH_PRODUCT,
    RefusalKind, field_label, render_refusal, suggestions_for_missing,
};
use crate::retrieval::{Freshness, RetrievalQuality};
use crate::types::GroundingResult;

/// What the user wants computed, as decided by the intent parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputeIntent {
    /// Compare booking through a card's travel portal with booking direct.
    PortalVsDirect,
    /// Value a points transfer to an airline or hotel partner.
    TransferValue,
    /// Value a points balance in a given program.
    PointsValue,
    /// Estimate rewards earned on a purchase.
    EarnCalculation,
    /// Spend needed to offset an annual fee.
    FeeBreakeven,
    /// No computation; explain rules from sources.
    ExplainOnly,
    /// The parser could not proceed without more input.
    NeedMoreInfo,
    #[serde(other)]
    Unknown,
}

impl ComputeIntent {
    /// Parameters that must be present and non-empty for a computation intent.
    /// Empty for intents that compute nothing.
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            ComputeIntent::PortalVsDirect => &["portalPrice", "directPrice"],
            ComputeIntent::TransferValue => &["cashPrice", "pointsRequired"],
            ComputeIntent::PointsValue => &["points", "program"],
            ComputeIntent::EarnCalculation => &["spendAmount", "category"],
            ComputeIntent::FeeBreakeven => &["annualFee", "annualSpend"],
            ComputeIntent::ExplainOnly | ComputeIntent::NeedMoreInfo | ComputeIntent::Unknown => {
                &[]
            }
        }
    }

    pub fn is_computation(&self) -> bool {
        !self.required_params().is_empty()
    }
}

/// Structured request from the intent parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub intent: ComputeIntent,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_params: Option<Vec<String>>,
}

impl ComputeRequest {
    pub fn new(intent: ComputeIntent) -> Self {
        Self {
            intent,
            params: BTreeMap::new(),
            missing_params: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Required parameters for this intent that are absent or empty.
    pub fn missing_required(&self) -> Vec<String> {
        self.intent
            .required_params()
            .iter()
            .filter(|name| !is_present(self.params.get(**name)))
            .map(|name| name.to_string())
            .collect()
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

/// The gate's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub refuse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RefusalKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Fully rendered refusal text for the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_data: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
}

impl GateResult {
    pub fn proceed() -> Self {
        Self {
            refuse: false,
            kind: None,
            reason: None,
            response: None,
            missing_data: None,
            suggested_actions: None,
        }
    }

    fn refusal(
        kind: RefusalKind,
        reason: String,
        missing_data: Vec<String>,
        suggested_actions: Vec<String>,
    ) -> Self {
        let needed: Vec<String> = missing_data
            .iter()
            .map(|field| field_label(field).to_string())
            .collect();
        let response = render_refusal(&reason, &needed, &suggested_actions);
        Self {
            refuse: true,
            kind: Some(kind),
            reason: Some(reason),
            response: Some(response),
            missing_data: (!missing_data.is_empty()).then_some(missing_data),
            suggested_actions: (!suggested_actions.is_empty()).then_some(suggested_actions),
        }
    }
}

fn actions(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Stateless refuse/proceed decision maker.
pub struct AnswerabilityGate {
    config: GateConfig,
}

impl AnswerabilityGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Decide whether an answer to `request` may be shown.
    pub fn evaluate(
        &self,
        request: &ComputeRequest,
        retrieval: Option<&RetrievalQuality>,
        grounding: Option<&GroundingResult>,
    ) -> GateResult {
        let result = self.decide(request, retrieval, grounding);
        if result.refuse {
            tracing::debug!(
                intent = ?request.intent,
                kind = ?result.kind,
                missing = ?result.missing_data,
                "Gate refused answer"
            );
        }
        result
    }

    fn decide(
        &self,
        request: &ComputeRequest,
        retrieval: Option<&RetrievalQuality>,
        grounding: Option<&GroundingResult>,
    ) -> GateResult {
        if request.intent == ComputeIntent::NeedMoreInfo {
            let missing = request.missing_params.clone().unwrap_or_default();
            let suggestions = suggestions_for_missing(&missing);
            return GateResult::refusal(
                RefusalKind::NeedMoreInfo,
                "I need a bit more information before I can answer that.".to_string(),
                missing,
                suggestions,
            );
        }

        if request.intent.is_computation() {
            let missing = request.missing_required();
            if !missing.is_empty() {
                let suggestions = suggestions_for_missing(&missing);
                return GateResult::refusal(
                    RefusalKind::MissingParams,
                    "I can't run that calculation yet because some details are missing."
                        .to_string(),
                    missing,
                    suggestions,
                );
            }
        }

        if request.intent == ComputeIntent::ExplainOnly {
            if let Some(quality) = retrieval {
                if quality.top_score < self.config.min_top_score {
                    return GateResult::refusal(
                        RefusalKind::LowConfidence,
                        "I couldn't find sources that clearly answer this, so I'd rather not guess."
                            .to_string(),
                        Vec::new(),
                        actions(&[CHECK_OFFICIAL_SOURCE, REPHRASE_WITH_PRODUCT]),
                    );
                }
                if quality.num_results < self.config.min_results {
                    return GateResult::refusal(
                        RefusalKind::InsufficientSources,
                        format!(
                            "I only found {} source{} on this, which isn't enough to answer reliably.",
                            quality.num_results,
                            if quality.num_results == 1 { "" } else { "s" }
                        ),
                        Vec::new(),
                        actions(&[CHECK_OFFICIAL_SOURCE, REPHRASE_WITH_PRODUCT]),
                    );
                }
            }
        }

        if let Some(grounding) = grounding {
            if grounding.grounded_percentage < self.config.min_grounded_percentage {
                return GateResult::refusal(
                    RefusalKind::InsufficientGrounding,
                    self.grounding_reason(grounding),
                    Vec::new(),
                    actions(&[EXPLAIN_CITED_ONLY, CHECK_OFFICIAL_SOURCE]),
                );
            }
        }

        if let Some(quality) = retrieval {
            if quality.freshness == Freshness::Stale && self.is_time_sensitive(request) {
                return GateResult::refusal(
                    RefusalKind::StaleSources,
                    "The sources I found may be out of date, and this depends on current terms \
                     such as promotions or transfer rates."
                        .to_string(),
                    Vec::new(),
                    actions(&[CHECK_CURRENT_TERMS, CHECK_OFFICIAL_SOURCE]),
                );
            }
        }

        GateResult::proceed()
    }

    fn grounding_reason(&self, grounding: &GroundingResult) -> String {
        let percent = (grounding.grounded_percentage * 100.0).round() as i64;
        let mut reason = format!(
            "Only {percent}% of this answer could be verified against sources, so I won't present it as fact."
        );
        let cited: Vec<&String> = grounding
            .ungrounded_claims
            .iter()
            .take(self.config.max_cited_claims)
            .collect();
        if !cited.is_empty() {
            reason.push_str("\n\nStatements I couldn't verify:");
            for claim in cited {
                reason.push_str("\n• ");
                reason.push_str(claim);
            }
        }
        reason
    }

    /// Transfer valuations always depend on current rates; anything else is
    /// time-sensitive when its parameters mention promotions, expiry or "today".
    pub fn is_time_sensitive(&self, request: &ComputeRequest) -> bool {
        if request.intent == ComputeIntent::TransferValue {
            return true;
        }
        request.params.values().any(|value| {
            let text = match value {
                Value::String(s) => s.to_lowercase(),
                other => other.to_string().to_lowercase(),
            };
            self.config
                .time_sensitive_terms
                .iter()
                .any(|term| text.contains(&term.to_lowercase()))
        })
    }
}

impl Default for AnswerabilityGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
