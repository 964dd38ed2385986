use serde::{Deserialize, Serialize};

use super::domain::{Category, Severity};

/// Structured triage derived from a free-text description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub severity: Severity,
    pub confidence: f32,
}

/// Turns report text into a classification. Implementations must be total and
/// deterministic: every description yields a result and the same text always
/// yields the same one.
pub trait IssueClassifier: Send + Sync {
    fn classify(&self, description: &str) -> Classification;
}

struct CategoryRule {
    category: Category,
    keywords: &'static [&'static str],
    confidence: f32,
}

/// Evaluated in order; the first rule with a matching keyword wins.
const CATEGORY_RULES: [CategoryRule; 3] = [
    CategoryRule {
        category: Category::Electrical,
        keywords: &["electric", "power", "light", "socket"],
        confidence: 0.92,
    },
    CategoryRule {
        category: Category::Plumbing,
        keywords: &["water", "pipe", "leak", "drain", "toilet"],
        confidence: 0.89,
    },
    CategoryRule {
        category: Category::Civil,
        keywords: &["door", "window", "wall", "paint", "crack"],
        confidence: 0.87,
    },
];

const FALLBACK_CATEGORY: Category = Category::Civil;
const FALLBACK_CONFIDENCE: f32 = 0.85;

const HIGH_SEVERITY_KEYWORDS: &[&str] = &["urgent", "emergency", "flooding", "sparking"];
const LOW_SEVERITY_KEYWORDS: &[&str] = &["minor", "small", "cosmetic"];

/// Keyword matcher standing in for a trained model.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl IssueClassifier for KeywordClassifier {
    fn classify(&self, description: &str) -> Classification {
        let text = description.to_lowercase();

        let (category, confidence) = CATEGORY_RULES
            .iter()
            .find(|rule| contains_any(&text, rule.keywords))
            .map(|rule| (rule.category, rule.confidence))
            .unwrap_or((FALLBACK_CATEGORY, FALLBACK_CONFIDENCE));

        Classification {
            category,
            severity: severity_for(&text),
            confidence,
        }
    }
}

fn severity_for(text: &str) -> Severity {
    if contains_any(text, HIGH_SEVERITY_KEYWORDS) {
        Severity::High
    } else if contains_any(text, LOW_SEVERITY_KEYWORDS) {
        Severity::Low
    } else {
        Severity::Medium
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
