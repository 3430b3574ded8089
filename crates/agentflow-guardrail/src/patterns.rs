use once_cell::sync::Lazy;
use regex::Regex;

use crate::Severity;

pub struct PatternDef {
    pub category: &'static str,
    pub regex: Lazy<Regex>,
    pub severity: Severity,
    pub replacement: &'static str,
}

macro_rules! pattern {
    ($category:expr, $re:expr, $severity:expr, $replacement:expr) => {
        PatternDef {
            category: $category,
            regex: Lazy::new(|| Regex::new($re).expect("static pattern must compile")),
            severity: $severity,
            replacement: $replacement,
        }
    };
}

/// Low severity: maskable, the message still proceeds.
/// Critical severity: the message is rejected outright.
///
/// Order matches the original detector — low severity patterns first,
/// critical ones after — though detection itself scans every pattern
/// regardless of order.
pub static PATTERNS: [PatternDef; 8] = [
    pattern!(
        "email",
        r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+",
        Severity::Low,
        "[EMAIL]"
    ),
    pattern!(
        "phone",
        r"(?:\+?\d{1,3}[\s\-]?)?(?:\(?\d{2,4}\)?[\s\-]?)?\d{3,4}[\s\-]?\d{2,4}[\s\-]?\d{2,4}",
        Severity::Low,
        "[PHONE]"
    ),
    pattern!(
        "credit_card",
        r"(?:\d{4}[\s\-]?){3}\d{4}",
        Severity::Low,
        "[CARD]"
    ),
    pattern!(
        "ip_address",
        r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
        Severity::Low,
        "[IP]"
    ),
    pattern!(
        "passport_ru",
        r"\b\d{2}\s?\d{2}\s?\d{6}\b",
        Severity::Critical,
        "[PASSPORT]"
    ),
    pattern!(
        "ssn",
        r"\b\d{3}-\d{2}-\d{4}\b",
        Severity::Critical,
        "[SSN]"
    ),
    pattern!(
        "api_key",
        r"(?i)(?:sk-[a-zA-Z0-9]{20,})|(?:ghp_[a-zA-Z0-9]{36,})|(?:AKIA[0-9A-Z]{16})|(?:-----BEGIN (?:RSA |EC |DSA )?PRIVATE KEY-----)",
        Severity::Critical,
        "[SECRET_KEY]"
    ),
    pattern!(
        "jwt_token",
        r"eyJ[a-zA-Z0-9_-]{10,}\.eyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}",
        Severity::Critical,
        "[JWT]"
    ),
];
