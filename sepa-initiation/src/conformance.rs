//! Structural conformance of rendered documents
//!
//! Reads a rendered `pain.001` / `pain.008` document back with `roxmltree`
//! and checks the rules an XSD alone cannot express: header and block
//! counts and sums agree with the entries, identifiers fit their limits,
//! agent and account codes are well-formed and the schema's own conditions
//! (currency, BIC presence, service level, local instrument) hold for every
//! entry.

use crate::{
    message::MessageKind,
    schema::{Requirement, Schema},
    text::{MAX_ADDRESS_LINE_LENGTH, MAX_NAME_LENGTH, MAX_REMITTANCE_LENGTH},
    validation::{self, MAX_IDENTIFIER_LENGTH},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Document must not be submitted
    Error,
    /// Unusual but accepted by banks
    Warning,
}

/// Single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Machine readable rule code, e.g. `CONTROL_SUM_MISMATCH`
    pub code: String,

    /// Severity
    pub severity: Severity,

    /// Element path, e.g. `PmtInf[2]/CtrlSum`
    pub path: String,

    /// Human readable description
    pub message: String,
}

/// Result of a conformance check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Errors found
    pub errors: Vec<Finding>,

    /// Warnings found
    pub warnings: Vec<Finding>,
}

impl ConformanceReport {
    fn add_error(&mut self, code: &str, path: &str, message: String) {
        self.errors.push(Finding {
            code: code.to_string(),
            severity: Severity::Error,
            path: path.to_string(),
            message,
        });
    }

    fn add_warning(&mut self, code: &str, path: &str, message: String) {
        self.warnings.push(Finding {
            code: code.to_string(),
            severity: Severity::Warning,
            path: path.to_string(),
            message,
        });
    }

    /// `true` when no error was found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `true` when an error with `code` was found
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|f| f.code == code)
    }
}

type Node<'a, 'i> = roxmltree::Node<'a, 'i>;

/// Check `xml` against the structural rules of `schema`
pub fn check(xml: &str, schema: &Schema) -> ConformanceReport {
    let mut report = ConformanceReport::default();

    let doc = match roxmltree::Document::parse(xml) {
        Ok(doc) => doc,
        Err(e) => {
            report.add_error("XML_PARSE", "root", format!("XML parsing failed: {}", e));
            return report;
        }
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Document" {
        report.add_error(
            "INVALID_ROOT",
            "root",
            format!("Expected 'Document' root element, found '{}'", root.tag_name().name()),
        );
        return report;
    }

    let namespace = schema.namespace();
    match root.tag_name().namespace() {
        Some(ns) if ns == namespace => {}
        Some(ns) => report.add_error(
            "NAMESPACE_MISMATCH",
            "Document@xmlns",
            format!("Expected namespace {}, found {}", namespace, ns),
        ),
        None => report.add_error("MISSING_NAMESPACE", "Document@xmlns", "Missing xmlns".to_string()),
    }

    let has_location = root
        .attributes()
        .any(|a| a.name() == "schemaLocation" && a.value().starts_with(&namespace));
    if !has_location {
        report.add_warning(
            "MISSING_SCHEMA_LOCATION",
            "Document@xsi:schemaLocation",
            "Missing or foreign schema location".to_string(),
        );
    }

    let initiation_tag = schema.kind.root_tag();
    let Some(initiation) = child(root, initiation_tag) else {
        report.add_error(
            "MISSING_ELEMENT",
            initiation_tag,
            format!("Missing {} element", initiation_tag),
        );
        return report;
    };

    let payments: Vec<Node<'_, '_>> = children(initiation, "PmtInf").collect();
    if payments.is_empty() {
        report.add_error("MISSING_ELEMENT", "PmtInf", "No payment information block".to_string());
    }

    let mut total_count = 0usize;
    let mut total_sum = Decimal::ZERO;
    let mut payment_ids = HashSet::new();

    for (index, payment) in payments.iter().enumerate() {
        let path = format!("PmtInf[{}]", index + 1);
        let (count, sum) = check_payment(*payment, &path, schema, &mut report);
        total_count += count;
        total_sum += sum;

        if let Some(id) = child_text(*payment, "PmtInfId") {
            check_identifier(&mut report, &format!("{}/PmtInfId", path), id);
            if !payment_ids.insert(id.to_string()) {
                report.add_error(
                    "DUPLICATE_IDENTIFIER",
                    &format!("{}/PmtInfId", path),
                    format!("PmtInfId {} is not unique", id),
                );
            }
        } else {
            report.add_error("MISSING_FIELD", &format!("{}/PmtInfId", path), "Missing PmtInfId".to_string());
        }
    }

    match child(initiation, "GrpHdr") {
        Some(header) => check_group_header(header, total_count, total_sum, &mut report),
        None => report.add_error("MISSING_ELEMENT", "GrpHdr", "Missing GrpHdr element".to_string()),
    }

    tracing::debug!(
        schema = schema.id,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Conformance check finished"
    );
    report
}

fn check_group_header(header: Node<'_, '_>, count: usize, sum: Decimal, report: &mut ConformanceReport) {
    match child_text(header, "MsgId") {
        Some(id) => check_identifier(report, "GrpHdr/MsgId", id),
        None => report.add_error("MISSING_FIELD", "GrpHdr/MsgId", "Missing MsgId".to_string()),
    }

    match child_text(header, "CreDtTm") {
        Some(timestamp) if chrono::DateTime::parse_from_rfc3339(timestamp).is_err() => {
            report.add_error(
                "INVALID_FORMAT",
                "GrpHdr/CreDtTm",
                format!("Invalid timestamp: {}", timestamp),
            );
        }
        Some(_) => {}
        None => report.add_error("MISSING_FIELD", "GrpHdr/CreDtTm", "Missing CreDtTm".to_string()),
    }

    check_count(report, header, "GrpHdr/NbOfTxs", count);
    check_sum(report, header, "GrpHdr/CtrlSum", sum);

    if child(header, "InitgPty").and_then(|p| child_text(p, "Nm")).is_none() {
        report.add_error("MISSING_FIELD", "GrpHdr/InitgPty/Nm", "Missing initiating party".to_string());
    }
}

/// Check one block, returning its entry count and amount sum
fn check_payment(
    payment: Node<'_, '_>,
    path: &str,
    schema: &Schema,
    report: &mut ConformanceReport,
) -> (usize, Decimal) {
    let kind = schema.kind;

    if child_text(payment, "PmtMtd") != Some(kind.payment_method()) {
        report.add_error(
            "INVALID_VALUE",
            &format!("{}/PmtMtd", path),
            format!("PmtMtd must be {}", kind.payment_method()),
        );
    }

    let (date_tag, party_tag, account_tag, agent_tag, entry_tag) = match kind {
        MessageKind::CreditTransfer => ("ReqdExctnDt", "Dbtr", "DbtrAcct", "DbtrAgt", "CdtTrfTxInf"),
        MessageKind::DirectDebit => ("ReqdColltnDt", "Cdtr", "CdtrAcct", "CdtrAgt", "DrctDbtTxInf"),
    };

    let date_path = format!("{}/{}", path, date_tag);
    match child_text(payment, date_tag) {
        Some(date) if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() => {
            report.add_error("INVALID_FORMAT", &date_path, format!("Invalid date: {}", date));
        }
        Some(_) => {}
        None => report.add_error("MISSING_FIELD", &date_path, format!("Missing {}", date_tag)),
    }

    check_party(report, payment, &format!("{}/{}", path, party_tag), party_tag);
    check_account(report, payment, &format!("{}/{}", path, account_tag), account_tag);
    check_agent(report, payment, &format!("{}/{}", path, agent_tag), agent_tag, false);

    if kind == MessageKind::DirectDebit {
        check_direct_debit_block(report, payment, path, schema);
    }

    let mut count = 0;
    let mut sum = Decimal::ZERO;
    for (index, entry) in children(payment, entry_tag).enumerate() {
        let entry_path = format!("{}/{}[{}]", path, entry_tag, index + 1);
        count += 1;
        sum += check_entry(entry, &entry_path, schema, report);
    }

    check_count(report, payment, &format!("{}/NbOfTxs", path), count);
    check_sum(report, payment, &format!("{}/CtrlSum", path), sum);

    (count, sum)
}

fn check_direct_debit_block(
    report: &mut ConformanceReport,
    payment: Node<'_, '_>,
    path: &str,
    schema: &Schema,
) {
    let type_info = child(payment, "PmtTpInf");

    let instrument = type_info
        .and_then(|t| child(t, "LclInstrm"))
        .and_then(|l| child_text(l, "Cd"));
    for requirement in schema.requirements {
        if let Requirement::LocalInstrument(allowed) = requirement {
            let rejected = instrument.filter(|code| !allowed.iter().any(|l| l.as_str() == *code));
            if let Some(code) = rejected {
                report.add_error(
                    "REQUIREMENT_NOT_MET",
                    &format!("{}/PmtTpInf/LclInstrm/Cd", path),
                    format!("{} requires {}, found {}", schema.id, requirement, code),
                );
            }
        }
    }
    for tag in ["LclInstrm", "SeqTp"] {
        if type_info.and_then(|t| child(t, tag)).is_none() {
            report.add_error(
                "MISSING_FIELD",
                &format!("{}/PmtTpInf/{}", path, tag),
                format!("Missing {}", tag),
            );
        }
    }

    let identifier = child(payment, "CdtrSchmeId")
        .and_then(|n| child(n, "Id"))
        .and_then(|n| child(n, "PrvtId"))
        .and_then(|n| child(n, "Othr"))
        .and_then(|n| child_text(n, "Id"));
    let id_path = format!("{}/CdtrSchmeId", path);
    match identifier {
        Some(id) if !validation::is_valid_creditor_identifier(id) => {
            report.add_error(
                "INVALID_CREDITOR_IDENTIFIER",
                &id_path,
                format!("Invalid creditor identifier: {}", id),
            );
        }
        Some(_) => {}
        None => report.add_error("MISSING_FIELD", &id_path, "Missing creditor identifier".to_string()),
    }
}

/// Check one transaction entry, returning its amount
fn check_entry(entry: Node<'_, '_>, path: &str, schema: &Schema, report: &mut ConformanceReport) -> Decimal {
    let (amount_node, party_tag, account_tag, agent_tag) = match schema.kind {
        MessageKind::CreditTransfer => (
            child(entry, "Amt").and_then(|a| child(a, "InstdAmt")),
            "Cdtr",
            "CdtrAcct",
            "CdtrAgt",
        ),
        MessageKind::DirectDebit => (child(entry, "InstdAmt"), "Dbtr", "DbtrAcct", "DbtrAgt"),
    };

    match child(entry, "PmtId").and_then(|p| child_text(p, "EndToEndId")) {
        Some(id) => check_identifier(report, &format!("{}/PmtId/EndToEndId", path), id),
        None => report.add_error(
            "MISSING_FIELD",
            &format!("{}/PmtId/EndToEndId", path),
            "Missing EndToEndId".to_string(),
        ),
    }

    let amount_path = format!("{}/InstdAmt", path);
    let amount = match amount_node {
        Some(node) => check_amount(report, node, &amount_path, schema),
        None => {
            report.add_error("MISSING_FIELD", &amount_path, "Missing InstdAmt".to_string());
            Decimal::ZERO
        }
    };

    check_party(report, entry, &format!("{}/{}", path, party_tag), party_tag);
    check_account(report, entry, &format!("{}/{}", path, account_tag), account_tag);

    let needs_bic = schema.requirements.contains(&Requirement::Bic);
    let agent_path = format!("{}/{}", path, agent_tag);
    match schema.kind {
        // Creditor agent of a transfer is optional
        MessageKind::CreditTransfer if child(entry, agent_tag).is_none() => {
            if needs_bic {
                report.add_error(
                    "REQUIREMENT_NOT_MET",
                    &agent_path,
                    format!("{} requires a BIC", schema.id),
                );
            }
        }
        _ => check_agent(report, entry, &agent_path, agent_tag, needs_bic),
    }

    if schema.kind == MessageKind::CreditTransfer {
        let service_level = child(entry, "PmtTpInf")
            .and_then(|t| child(t, "SvcLvl"))
            .and_then(|s| child_text(s, "Cd"));
        for requirement in schema.requirements {
            if let Requirement::ServiceLevel(level) = requirement {
                if service_level != Some(level.as_str()) {
                    report.add_error(
                        "REQUIREMENT_NOT_MET",
                        &format!("{}/PmtTpInf/SvcLvl/Cd", path),
                        format!(
                            "{} requires {}, found {}",
                            schema.id,
                            requirement,
                            service_level.unwrap_or("none")
                        ),
                    );
                }
            }
        }
    }

    if schema.kind == MessageKind::DirectDebit {
        let mandate = child(entry, "DrctDbtTx").and_then(|d| child(d, "MndtRltdInf"));
        let mandate_path = format!("{}/DrctDbtTx/MndtRltdInf", path);
        match mandate.and_then(|m| child_text(m, "MndtId")) {
            Some(id) => check_identifier(report, &format!("{}/MndtId", mandate_path), id),
            None => report.add_error("MISSING_FIELD", &mandate_path, "Missing MndtId".to_string()),
        }
        if mandate.and_then(|m| child_text(m, "DtOfSgntr")).is_none() {
            report.add_error("MISSING_FIELD", &mandate_path, "Missing DtOfSgntr".to_string());
        }
    }

    if let Some(remittance) = child(entry, "RmtInf") {
        let remittance_path = format!("{}/RmtInf", path);
        let unstructured = child_text(remittance, "Ustrd");
        let structured = child(remittance, "Strd");
        match (unstructured, structured) {
            (Some(_), Some(_)) => report.add_error(
                "EXCLUSIVE_FIELDS",
                &remittance_path,
                "Ustrd and Strd are mutually exclusive".to_string(),
            ),
            (Some(text), None) => check_text(report, &format!("{}/Ustrd", remittance_path), text, MAX_REMITTANCE_LENGTH),
            (None, Some(_)) => {}
            (None, None) => report.add_error("MISSING_FIELD", &remittance_path, "Empty RmtInf".to_string()),
        }
    }

    amount
}

fn check_amount(report: &mut ConformanceReport, node: Node<'_, '_>, path: &str, schema: &Schema) -> Decimal {
    let currency = match node.attribute("Ccy") {
        Some(ccy) => ccy,
        None => {
            report.add_error("MISSING_ATTRIBUTE", &format!("{}@Ccy", path), "Missing Ccy attribute".to_string());
            ""
        }
    };

    for requirement in schema.requirements {
        if let Requirement::Currency(code) = requirement {
            if currency != *code {
                report.add_error(
                    "REQUIREMENT_NOT_MET",
                    &format!("{}@Ccy", path),
                    format!("{} requires currency {}, found {}", schema.id, code, currency),
                );
            }
        }
    }

    let Some(text) = node.text() else {
        report.add_error("MISSING_VALUE", path, "Amount value is empty".to_string());
        return Decimal::ZERO;
    };

    match text.parse::<Decimal>() {
        Ok(amount) => {
            if amount <= Decimal::ZERO {
                report.add_error("INVALID_AMOUNT", path, "Amount must be greater than zero".to_string());
            }
            if text.split('.').nth(1).map(str::len) != Some(2) {
                report.add_error(
                    "INVALID_FORMAT",
                    path,
                    format!("Amount must have exactly two decimals: {}", text),
                );
            }
            amount
        }
        Err(_) => {
            report.add_error("INVALID_FORMAT", path, format!("Invalid decimal format: {}", text));
            Decimal::ZERO
        }
    }
}

fn check_party(report: &mut ConformanceReport, parent: Node<'_, '_>, path: &str, tag: &str) {
    let Some(party) = child(parent, tag) else {
        report.add_error("MISSING_ELEMENT", path, format!("Missing {}", tag));
        return;
    };

    match child_text(party, "Nm") {
        Some(name) => check_text(report, &format!("{}/Nm", path), name, MAX_NAME_LENGTH),
        None => report.add_error("MISSING_FIELD", &format!("{}/Nm", path), "Missing party name".to_string()),
    }

    if let Some(address) = child(party, "PstlAdr") {
        let lines: Vec<&str> = children(address, "AdrLine").filter_map(|n| n.text()).collect();
        if lines.len() > 2 {
            report.add_warning(
                "TOO_MANY_LINES",
                &format!("{}/PstlAdr", path),
                format!("{} address lines, banks accept two", lines.len()),
            );
        }
        for line in lines {
            check_text(report, &format!("{}/PstlAdr/AdrLine", path), line, MAX_ADDRESS_LINE_LENGTH);
        }
    }
}

fn check_account(report: &mut ConformanceReport, parent: Node<'_, '_>, path: &str, tag: &str) {
    let iban = child(parent, tag)
        .and_then(|a| child(a, "Id"))
        .and_then(|i| child_text(i, "IBAN"));

    match iban {
        Some(iban) if !validation::is_valid_iban(iban) => {
            report.add_error("INVALID_IBAN", &format!("{}/Id/IBAN", path), format!("Invalid IBAN: {}", iban));
        }
        Some(_) => {}
        None => report.add_error("MISSING_FIELD", &format!("{}/Id/IBAN", path), "Missing IBAN".to_string()),
    }
}

fn check_agent(report: &mut ConformanceReport, parent: Node<'_, '_>, path: &str, tag: &str, needs_bic: bool) {
    let Some(institution) = child(parent, tag).and_then(|a| child(a, "FinInstnId")) else {
        report.add_error("MISSING_ELEMENT", &format!("{}/FinInstnId", path), "Missing FinInstnId".to_string());
        return;
    };

    if let Some(bic) = child_text(institution, "BIC") {
        if !validation::is_valid_bic(bic) {
            report.add_error("INVALID_BIC", &format!("{}/FinInstnId/BIC", path), format!("Invalid BIC format: {}", bic));
        }
        return;
    }

    if needs_bic {
        report.add_error("REQUIREMENT_NOT_MET", path, "BIC required, found placeholder".to_string());
    }
    let other = child(institution, "Othr").and_then(|o| child_text(o, "Id"));
    if other.is_none() {
        report.add_error(
            "MISSING_FIELD",
            &format!("{}/FinInstnId", path),
            "Neither BIC nor Othr/Id present".to_string(),
        );
    }
}

fn check_count(report: &mut ConformanceReport, parent: Node<'_, '_>, path: &str, expected: usize) {
    match child_text(parent, "NbOfTxs").map(str::parse::<usize>) {
        Some(Ok(count)) if count == expected && count > 0 => {}
        Some(Ok(count)) => report.add_error(
            "COUNT_MISMATCH",
            path,
            format!("NbOfTxs is {}, found {} entries", count, expected),
        ),
        Some(Err(_)) => report.add_error("INVALID_FORMAT", path, "NbOfTxs is not a number".to_string()),
        None => report.add_error("MISSING_FIELD", path, "Missing NbOfTxs".to_string()),
    }
}

fn check_sum(report: &mut ConformanceReport, parent: Node<'_, '_>, path: &str, expected: Decimal) {
    match child_text(parent, "CtrlSum").map(str::parse::<Decimal>) {
        Some(Ok(sum)) if sum == expected => {}
        Some(Ok(sum)) => report.add_error(
            "CONTROL_SUM_MISMATCH",
            path,
            format!("CtrlSum is {}, entries add up to {}", sum, expected),
        ),
        Some(Err(_)) => report.add_error("INVALID_FORMAT", path, "CtrlSum is not a decimal".to_string()),
        None => report.add_error("MISSING_FIELD", path, "Missing CtrlSum".to_string()),
    }
}

fn check_identifier(report: &mut ConformanceReport, path: &str, value: &str) {
    let length = value.chars().count();
    if length == 0 || length > MAX_IDENTIFIER_LENGTH {
        report.add_error(
            "INVALID_LENGTH",
            path,
            format!("Identifier must be 1-{} characters, got {}", MAX_IDENTIFIER_LENGTH, length),
        );
    } else if !validation::is_sepa_text(value) {
        report.add_error("INVALID_CHARACTERS", path, format!("Outside SEPA character set: {}", value));
    }
}

fn check_text(report: &mut ConformanceReport, path: &str, value: &str, max_length: usize) {
    let length = value.chars().count();
    if length > max_length {
        report.add_error(
            "INVALID_LENGTH",
            path,
            format!("Text exceeds {} characters ({})", max_length, length),
        );
    }
    if !validation::is_sepa_text(value) {
        report.add_error("INVALID_CHARACTERS", path, format!("Outside SEPA character set: {}", value));
    }
}

fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.tag_name().name() == tag)
}

fn children<'a, 'i: 'a>(node: Node<'a, 'i>, tag: &'a str) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children().filter(move |n| n.tag_name().name() == tag)
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag).and_then(|n| n.text())
}
