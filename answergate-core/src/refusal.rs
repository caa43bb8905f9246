//! Refusal text: field labels, suggested next actions and rendering.

use serde::{Deserialize, Serialize};

/// Why the gate refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalKind {
    NeedMoreInfo,
    MissingParams,
    LowConfidence,
    InsufficientSources,
    InsufficientGrounding,
    StaleSources,
}

/// `(param, human label, suggested action)` for every parameter a
/// computation intent can require.
const FIELD_LABELS: &[(&str, &str, &str)] = &[
    (
        "portalPrice",
        "the price shown in the card's travel portal",
        "Tell me both prices: the portal price and the price when booking direct",
    ),
    (
        "directPrice",
        "the price when booking directly with the airline or hotel",
        "Tell me both prices: the portal price and the price when booking direct",
    ),
    (
        "cashPrice",
        "the cash price of the booking",
        "Tell me the cash price and the number of points the award costs",
    ),
    (
        "pointsRequired",
        "how many points the award booking costs",
        "Tell me the cash price and the number of points the award costs",
    ),
    (
        "points",
        "how many points you have",
        "Tell me how many points you want to value",
    ),
    (
        "program",
        "which rewards program the points belong to",
        "Name the rewards program (for example, the card's points currency)",
    ),
    (
        "spendAmount",
        "how much you plan to spend",
        "Tell me roughly how much you spend",
    ),
    (
        "category",
        "the spending category (dining, travel, groceries, ...)",
        "Tell me which spending category the purchase falls under",
    ),
    (
        "annualFee",
        "the card's annual fee",
        "Tell me the annual fee you would pay",
    ),
    (
        "annualSpend",
        "your expected yearly spend on the card",
        "Tell me roughly how much you would put on the card each year",
    ),
];

pub const CHECK_OFFICIAL_SOURCE: &str = "Check the official source directly";
pub const REPHRASE_WITH_PRODUCT: &str = "Ask again naming the specific card or rewards program";
pub const EXPLAIN_CITED_ONLY: &str = "Ask me to explain only what the sources say";
pub const CHECK_CURRENT_TERMS: &str =
    "Check the issuer's current offer page before acting on this";
pub const SHARE_DETAILS: &str = "Share the details you'd like me to calculate with";

/// Human label for a request parameter. Unknown parameters fall back to
/// their raw name.
pub fn field_label(field: &str) -> &str {
    FIELD_LABELS
        .iter()
        .find(|(name, _, _)| *name == field)
        .map(|(_, label, _)| *label)
        .unwrap_or(field)
}

/// Suggested next actions for a set of missing parameters, deduplicated in
/// order. Falls back to a generic prompt when no field is known.
pub fn suggestions_for_missing(fields: &[String]) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();
    for field in fields {
        if let Some((_, _, action)) = FIELD_LABELS.iter().find(|(name, _, _)| *name == field.as_str()) {
            if !actions.iter().any(|a| a.as_str() == *action) {
                actions.push(action.to_string());
            }
        }
    }
    if actions.is_empty() {
        actions.push(SHARE_DETAILS.to_string());
    }
    actions
}

/// Render a refusal: the reason, then a "To help you, I'd need:" block and a
/// "You could:" block. Empty blocks are omitted.
pub fn render_refusal(reason: &str, needed: &[String], actions: &[String]) -> String {
    let mut out = reason.trim_end().to_string();
    if !needed.is_empty() {
        out.push_str("\n\nTo help you, I'd need:");
        for item in needed {
            out.push_str("\n• ");
            out.push_str(item);
        }
    }
    if !actions.is_empty() {
        out.push_str("\n\nYou could:");
        for action in actions {
            out.push_str("\n• ");
            out.push_str(action);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_label_known_and_unknown() {
        assert_eq!(
            field_label("directPrice"),
            "the price when booking directly with the airline or hotel"
        );
        assert_eq!(field_label("loungeCount"), "loungeCount");
    }

    #[test]
    fn test_suggestions_deduplicate() {
        let actions = suggestions_for_missing(&["portalPrice".into(), "directPrice".into()]);
        assert_eq!(
            actions,
            vec!["Tell me both prices: the portal price and the price when booking direct"]
        );
    }

    #[test]
    fn test_suggestions_fallback() {
        assert_eq!(suggestions_for_missing(&[]), vec![SHARE_DETAILS]);
        assert_eq!(
            suggestions_for_missing(&["mystery".into()]),
            vec![SHARE_DETAILS]
        );
    }

    #[test]
    fn test_render_full() {
        let text = render_refusal(
            "I can't run that calculation yet.",
            &["the cash price".into()],
            &["Tell me the price".into()],
        );
        assert_eq!(
            text,
            "I can't run that calculation yet.\n\nTo help you, I'd need:\n• the cash price\n\nYou could:\n• Tell me the price"
        );
    }

    #[test]
    fn test_render_omits_empty_blocks() {
        assert_eq!(render_refusal("Sources are thin.", &[], &[]), "Sources are thin.");
        let text = render_refusal("Sources are thin.", &[], &["Check".into()]);
        assert!(!text.contains("I'd need"));
        assert!(text.ends_with("You could:\n• Check"));
    }
}
