//! End-to-end tests: draft answer and chunks through grounding, then the gate.

use answergate_core::{
    AnswerabilityGate, ChunkMetadata, ClaimType, ComputeIntent, ComputeRequest, ConfidenceLevel,
    Freshness, GroundingService, GroundingVerdict, ProvenanceChunk, RefusalKind,
    RetrievalConfig, RetrievalQuality,
};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn chunk(id: &str, content: &str, trust_tier: u8, score: f32) -> ProvenanceChunk {
    ProvenanceChunk {
        id: id.to_string(),
        content: content.to_string(),
        metadata: ChunkMetadata {
            id: format!("doc-{id}"),
            source: if trust_tier == 0 {
                "issuer".to_string()
            } else {
                "community".to_string()
            },
            trust_tier,
            retrieved_at: Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap(),
            url: Some(format!("https://example.com/{id}")),
            title: Some("Card terms".to_string()),
        },
        score: Some(score),
    }
}

fn quality(top_score: f64, num_results: usize, freshness: Freshness) -> RetrievalQuality {
    RetrievalQuality {
        top_score,
        average_score: top_score,
        num_results,
        has_official_source: false,
        freshness,
    }
}

// --- Grounding scenarios ---

#[test]
fn test_scenario_a_annual_fee_grounded_high() {
    let service = GroundingService::default();
    let chunks = vec![chunk(
        "terms",
        "Rates and fees. Card terms: the annual fee of $395 is charged each year.",
        0,
        0.92,
    )];

    let result = service.verify("The annual fee is $395.", &chunks);

    assert_eq!(result.claims.len(), 1);
    let claim = &result.claims[0];
    assert_eq!(claim.claim, "The annual fee is $395.");
    assert!(claim.is_grounded);
    assert_eq!(claim.confidence, ConfidenceLevel::High);
    assert_eq!(claim.supporting_spans.len(), 1);

    let span = &claim.supporting_spans[0];
    assert_eq!(
        span.text,
        "Card terms: the annual fee of $395 is charged each year."
    );
    assert_eq!(span.chunk_id, "terms");
    assert_eq!(span.document_id, "doc-terms");
    assert_eq!(span.url.as_deref(), Some("https://example.com/terms"));
    assert_eq!(claim.best_similarity, span.similarity);
    assert!(result.overall_grounded);
    assert_eq!(result.stats.average_confidence, 1.0);
}

#[test]
fn test_scenario_b_opinion_without_sources() {
    let service = GroundingService::default();
    let result = service.verify("I think this card is the best choice.", &[]);

    assert_eq!(result.claims.len(), 1);
    let claim = &result.claims[0];
    assert_eq!(claim.claim_type, ClaimType::Opinion);
    assert_eq!(claim.confidence, ConfidenceLevel::None);
    assert!(!claim.is_grounded);
    assert!(!result.overall_grounded);
    assert_eq!(result.verdict(), GroundingVerdict::Ungrounded);
    assert_eq!(
        result.ungrounded_claims,
        vec!["I think this card is the best choice.".to_string()]
    );
}

#[test]
fn test_opinion_with_authoritative_source_is_medium() {
    let service = GroundingService::default();
    let chunks = vec![chunk(
        "review",
        "Our editors rate this card the best choice for dining rewards.",
        0,
        0.8,
    )];
    let result = service.verify("I think this card is the best choice for dining.", &chunks);
    let claim = &result.claims[0];
    assert_eq!(claim.claim_type, ClaimType::Opinion);
    assert!(claim.is_grounded);
    assert_eq!(claim.confidence, ConfidenceLevel::Medium);
}

#[test]
fn test_mixed_answer_stats() {
    let service = GroundingService::default();
    let chunks = vec![
        chunk(
            "issuer",
            "Cardmembers earn 4x points at restaurants worldwide. Terms apply.",
            0,
            0.9,
        ),
        chunk(
            "forum",
            "Transfers to airline partners usually post within two days.",
            2,
            0.6,
        ),
    ];
    let answer = "You earn 4x points at restaurants [1]. \
                  Transfers to airline partners are posted within two days. \
                  The welcome offer includes a free companion ticket. \
                  Nice!";

    let result = service.verify(answer, &chunks);
    let stats = &result.stats;

    assert_eq!(stats.total_claims, 3);
    assert_eq!(stats.grounded_claims, 2);
    assert_eq!(stats.ungrounded_claims, 1);
    assert_eq!(stats.high_confidence_claims, 1);
    assert_eq!(stats.low_trust_source_claims, 1);
    // (1.0 + 0.33 + 0.0) / 3
    assert_eq!(stats.average_confidence, 0.44);
    assert_eq!(result.claims[0].claim, "You earn 4x points at restaurants.");
    assert_eq!(result.verdict(), GroundingVerdict::PartiallyGrounded);

    let summary = result.summary();
    assert!((summary.grounded_percentage - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(
        summary.ungrounded_claims,
        vec!["The welcome offer includes a free companion ticket.".to_string()]
    );
}

// --- Gate scenarios ---

#[test]
fn test_scenario_c_portal_vs_direct_missing_direct_price() {
    let gate = AnswerabilityGate::default();
    let request =
        ComputeRequest::new(ComputeIntent::PortalVsDirect).with_param("portalPrice", 500);

    let result = gate.evaluate(&request, None, None);

    assert!(result.refuse);
    assert_eq!(result.missing_data, Some(vec!["directPrice".to_string()]));
    let response = result.response.unwrap();
    assert!(response.contains("To help you, I'd need:"));
    assert!(response.contains("the price when booking directly"));
    assert!(response.contains("You could:"));
}

#[test]
fn test_scenario_d_low_confidence_before_insufficient_sources() {
    let gate = AnswerabilityGate::default();
    let request = ComputeRequest::new(ComputeIntent::ExplainOnly);
    let q = quality(0.3, 5, Freshness::Fresh);

    let result = gate.evaluate(&request, Some(&q), None);

    assert!(result.refuse);
    assert_eq!(result.kind, Some(RefusalKind::LowConfidence));
}

#[test]
fn test_missing_param_wins_over_stale_time_sensitive() {
    let gate = AnswerabilityGate::default();
    let request = ComputeRequest::new(ComputeIntent::TransferValue)
        .with_param("pointsRequired", 60000)
        .with_param("note", "limited-time 30% transfer bonus today");
    let q = quality(0.9, 6, Freshness::Stale);

    let result = gate.evaluate(&request, Some(&q), None);

    assert_eq!(result.kind, Some(RefusalKind::MissingParams));
    assert_eq!(result.missing_data, Some(vec!["cashPrice".to_string()]));
}

// --- Full pipeline ---

#[test]
fn test_pipeline_refuses_poorly_grounded_answer() {
    let service = GroundingService::default();
    let gate = AnswerabilityGate::default();
    let chunks = vec![chunk(
        "issuer",
        "The annual fee is $95 and is waived the first year.",
        0,
        0.85,
    )];
    let answer = "The annual fee is $95. \
                  Lounge access is included with every booking. \
                  Hotel stays earn 10x points through the portal.";

    let grounding = service.verify(answer, &chunks);
    assert_eq!(grounding.stats.grounded_claims, 1);

    let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
    let quality = RetrievalQuality::summarize(&chunks, now, &RetrievalConfig::default());
    assert_eq!(quality.freshness, Freshness::Fresh);
    assert!(quality.has_official_source);

    let request = ComputeRequest::new(ComputeIntent::ExplainOnly);
    // Two results are needed; this run only has one.
    let result = gate.evaluate(&request, Some(&quality), Some(&grounding.summary()));
    assert_eq!(result.kind, Some(RefusalKind::InsufficientSources));

    let result = gate.evaluate(&request, None, Some(&grounding.summary()));
    assert_eq!(result.kind, Some(RefusalKind::InsufficientGrounding));
    let reason = result.reason.unwrap();
    assert!(reason.contains("Only 33%"));
    assert!(reason.contains("Lounge access is included with every booking."));
}

#[test]
fn test_pipeline_proceeds_when_grounded_and_fresh() {
    let service = GroundingService::default();
    let gate = AnswerabilityGate::default();
    let chunks = vec![
        chunk("a", "The annual fee is $95 and is waived the first year.", 0, 0.9),
        chunk("b", "Expect an annual fee of $95 after the first year.", 1, 0.7),
    ];

    let grounding = service.verify("The annual fee is $95.", &chunks);
    assert_eq!(grounding.claims[0].supporting_spans.len(), 2);
    assert_eq!(grounding.claims[0].supporting_spans[0].chunk_id, "a");

    let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
    let quality = RetrievalQuality::summarize(&chunks, now, &RetrievalConfig::default());
    let request = ComputeRequest::new(ComputeIntent::ExplainOnly);
    let result = gate.evaluate(&request, Some(&quality), Some(&grounding.summary()));
    assert!(!result.refuse);
    assert!(result.response.is_none());
}

#[test]
fn test_gate_result_json_shape() {
    let gate = AnswerabilityGate::default();
    let request =
        ComputeRequest::new(ComputeIntent::PortalVsDirect).with_param("portalPrice", 500);
    let json = serde_json::to_value(gate.evaluate(&request, None, None)).unwrap();
    assert_eq!(json["refuse"], true);
    assert_eq!(json["kind"], "missing_params");
    assert_eq!(json["missingData"][0], "directPrice");
    assert!(json["suggestedActions"].is_array());
}
