use regex::Regex;
use lazy_static::lazy_static;
use sha2::{Sha256, Digest};
use base64::{Engine as _, engine::general_purpose};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    // Ten-digit mobile numbers with an optional country prefix, plus the
    // (555) 123-4567 layout. UUID groups are never exactly ten digits.
    static ref PHONE_REGEX: Regex = Regex::new(r"(?:\+\d{1,3}[\s-]?)?\b\d{10}\b|\(\d{3}\)\s?\d{3}-\d{4}").unwrap();
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        if self.config.redact_phones {
            result = self.redact_phones(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX.replace_all(text, |caps: &regex::Captures| {
            let email = caps.get(0).map_or("", |m| m.as_str());
            if self.config.hash_for_correlation {
                format!("EMAIL[{}]", self.hash_value(email))
            } else {
                mask_email(email)
            }
        }).to_string()
    }

    fn redact_phones(&self, text: &str) -> String {
        PHONE_REGEX.replace_all(text, |caps: &regex::Captures| {
            let phone = caps.get(0).map_or("", |m| m.as_str());
            if self.config.hash_for_correlation {
                format!("PHONE[{}]", self.hash_value(phone))
            } else {
                mask_phone(phone)
            }
        }).to_string()
    }

    fn hash_value(&self, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        general_purpose::STANDARD.encode(result.get(..8).unwrap_or_default())
    }
}

/// Mask an email address for log output: `priya@clinic.in` → `p***@clinic.in`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// Mask a phone number, keeping the last four digits
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let keep = digits.len().min(4);
    let tail: String = digits.iter().skip(digits.len() - keep).collect();
    format!("{}{}", "*".repeat(digits.len() - keep), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_redactor() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_email_redaction() {
        let redacted = plain_redactor().redact("Confirmation sent to priya.shah@example.com");
        assert!(redacted.contains("p***@example.com"));
        assert!(!redacted.contains("priya.shah"));
    }

    #[test]
    fn test_phone_redaction() {
        let redacted = plain_redactor().redact("Inquiry from 9876543210 received");
        assert!(redacted.contains("******3210"));
        assert!(!redacted.contains("9876543210"));
    }

    #[test]
    fn test_uuid_survives_redaction() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(plain_redactor().redact(id), id);
    }

    #[test]
    fn test_hashed_values_correlate() {
        let redactor = PiiRedactor::default();
        let a = redactor.redact("a@x.com");
        let b = redactor.redact("a@x.com");
        assert_eq!(a, b);
        assert!(a.starts_with("EMAIL["));
    }

    #[test]
    fn test_mask_helpers() {
        assert_eq!(mask_email("a@x.com"), "a***@x.com");
        assert_eq!(mask_email("not-an-email"), "***");
        assert_eq!(mask_phone("+91 98765-43210"), "********3210");
        assert_eq!(mask_phone("12"), "12");
    }
}
