//! Text rendering of one CDM trade.

use cdm::{format_timestamp, validate_trade_document, CdmTrade, ValidationReport};
use serde_json::Value;
use std::fmt::Write;

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn field(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {:<22}{}", format!("{}:", label), value);
}

/// Validation of the trade's CDM document, if it has one that parses.
pub fn validation_report(trade: &CdmTrade) -> Option<ValidationReport> {
    let mut document = trade.trade_document()?.ok()?;
    // The version travels on the record rather than in the document.
    if let Value::Object(map) = &mut document {
        if !trade.cdm_version.is_empty() {
            map.entry("cdmVersion")
                .or_insert_with(|| Value::String(trade.cdm_version.clone()));
        }
    }
    Some(validate_trade_document(&document))
}

fn nested_section(out: &mut String, title: &str, label: &str, missing: &str, value: Option<cdm::Result<Value>>) {
    let _ = writeln!(out, "\n== {} ==", title);
    match value {
        Some(Ok(document)) => {
            let _ = writeln!(out, "{}:", label);
            let _ = writeln!(out, "{}", pretty(&document));
        }
        Some(Err(e)) => {
            let _ = writeln!(out, "Unreadable CDM data: {}", e);
        }
        None => {
            let _ = writeln!(out, "{}", missing);
        }
    }
}

/// Full details panel: basic fields, CDM metadata, the business event and
/// trade structures, then validation.
pub fn render_trade_details(trade: &CdmTrade) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "CDM Trade Details  [CDM {}] [{}]",
        trade.cdm_version, trade.business_event_type
    );

    let _ = writeln!(out, "\n== Basic Trade Information ==");
    field(&mut out, "Trade ID", trade.id());
    field(&mut out, "Security", &trade.trade.security);
    field(&mut out, "Quantity", trade.trade.quantity);
    field(&mut out, "Side", trade.trade.side);
    field(&mut out, "State", &trade.trade.state);
    let updated = trade
        .trade
        .updated
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "N/A".to_string());
    field(&mut out, "Updated", updated);

    let _ = writeln!(out, "\n== CDM Metadata ==");
    field(&mut out, "CDM Version", &trade.cdm_version);
    field(&mut out, "Business Event Type", &trade.business_event_type);

    nested_section(
        &mut out,
        "CDM Business Event Structure",
        "Complete CDM BusinessEvent Object",
        "No CDM BusinessEvent data available",
        trade.business_event_document(),
    );
    nested_section(
        &mut out,
        "CDM Trade Structure",
        "Complete CDM Trade Object",
        "No CDM Trade data available",
        trade.trade_document(),
    );

    let _ = writeln!(out, "\n== CDM Validation & Compliance ==");
    match validation_report(trade) {
        Some(report) => {
            let compliance = if report.is_compliant() {
                "CDM Compliant"
            } else {
                "Not CDM Compliant"
            };
            let _ = writeln!(out, "  {} ({:?})", compliance, report.status);
            for check in &report.passed {
                let _ = writeln!(out, "  + {}", check);
            }
            for warning in &report.warnings {
                let _ = writeln!(out, "  ! {}", warning);
            }
            for error in &report.errors {
                let _ = writeln!(out, "  x {}", error);
            }
        }
        None => {
            let _ = writeln!(out, "  No CDM trade document to validate");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdm::{CdmDocumentBuilder, Side, TradeOrder};
    use chrono::NaiveDate;

    fn cdm_trade(with_documents: bool) -> CdmTrade {
        let order = TradeOrder::new("TRADE-9", "IBM", 40, 22214, Side::Buy);
        let builder = CdmDocumentBuilder::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let mut trade = CdmTrade {
            cdm_version: "6.0.0".into(),
            business_event_type: "EXECUTION".into(),
            ..Default::default()
        };
        trade.trade.id = order.id.clone();
        trade.trade.security = order.security.clone();
        trade.trade.quantity = order.quantity;
        trade.trade.state = "New".into();
        if with_documents {
            trade.cdm_business_event = Some(serde_json::to_value(builder.execution(&order)).unwrap());
            // Some services store the trade as encoded text.
            trade.cdm_trade = Some(Value::String(
                serde_json::to_string(&builder.trade_document(&order)).unwrap(),
            ));
        }
        trade
    }

    fn has_line(text: &str, label: &str, value: &str) -> bool {
        text.lines()
            .any(|l| l.trim_start().starts_with(label) && l.trim_end().ends_with(value))
    }

    #[test]
    fn test_details_with_documents() {
        let text = render_trade_details(&cdm_trade(true));
        assert!(has_line(&text, "Trade ID:", "TRADE-9"));
        assert!(text.contains("Complete CDM BusinessEvent Object"));
        assert!(text.contains("Complete CDM Trade Object"));
        assert!(text.contains("\"tradeIdentifier\""));
        assert!(text.contains("CDM Compliant (Valid)"));
        assert!(has_line(&text, "Updated:", "N/A"));
    }

    #[test]
    fn test_details_without_documents() {
        let text = render_trade_details(&cdm_trade(false));
        assert!(text.contains("No CDM BusinessEvent data available"));
        assert!(text.contains("No CDM Trade data available"));
        assert!(text.contains("No CDM trade document to validate"));
    }

    #[test]
    fn test_validation_uses_record_version() {
        let report = validation_report(&cdm_trade(true)).unwrap();
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }
}
