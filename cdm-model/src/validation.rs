//! Structural checks on CDM trade documents.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

/// Outcome of [`validate_trade_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub status: ValidationStatus,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub passed: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    /// Valid and at most two warnings.
    pub fn is_compliant(&self) -> bool {
        self.is_valid() && self.warnings.len() <= 2
    }
}

/// Checks a CDM trade for the fields the event model requires.
///
/// Missing identifiers or product are errors; missing product details, trade
/// date, parties or version are warnings.
pub fn validate_trade_document(doc: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut passed = Vec::new();

    if doc.get("tradeIdentifier").is_some() {
        passed.push("Trade identifier present".to_string());
    } else {
        errors.push("Missing required tradeIdentifier".to_string());
    }

    match doc.get("tradableProduct") {
        Some(product) => {
            passed.push("Tradable product present".to_string());
            if product.get("product").is_some() {
                passed.push("Product details present".to_string());
            } else {
                warnings.push("Product details missing".to_string());
            }
        }
        None => errors.push("Missing required tradableProduct".to_string()),
    }

    if doc.get("tradeDate").is_some() {
        passed.push("Trade date present".to_string());
    } else {
        warnings.push("Trade date missing".to_string());
    }

    if doc.get("party").is_some() || doc.get("counterparty").is_some() {
        passed.push("Party information present".to_string());
    } else {
        warnings.push("Party information missing".to_string());
    }

    if doc.get("cdmVersion").is_some() {
        passed.push("CDM version present".to_string());
    } else {
        warnings.push("CDM version missing".to_string());
    }

    let status = if errors.is_empty() {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid
    };

    ValidationReport {
        status,
        errors,
        warnings,
        passed,
    }
}
