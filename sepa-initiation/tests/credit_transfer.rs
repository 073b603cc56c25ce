//! End-to-end tests for credit transfer initiation (pain.001)

mod common;

use common::{in_days, init_tracing, Xml};
use rust_decimal_macros::dec;
use sepa_initiation::{
    conformance, schema, types, Account, Config, CreditTransferTransaction, Error, Message,
    MessageKind, ServiceLevel,
};

fn debtor() -> Account {
    Account::new("Schuldner GmbH", "DE87200500001234567890").with_bic("BANKDEFFXXX")
}

fn telekomiker() -> CreditTransferTransaction {
    CreditTransferTransaction::new("Telekomiker AG", "DE37112589611964645802", dec!(102.50))
        .with_bic("PBNKDEFF370")
        .with_reference("XYZ-1234/123")
        .with_remittance_information("Rechnung vom 22.08.2013")
}

fn amazonas() -> CreditTransferTransaction {
    CreditTransferTransaction::new("Amazonas GmbH", "DE21500500009876543210", dec!(59.00))
        .with_bic("SPUEDE2UXXX")
        .with_remittance_information("Bestellung 3456")
}

fn assert_conforms(xml: &str, id: &str) {
    let schema = schema::find(MessageKind::CreditTransfer, id).unwrap();
    let report = conformance::check(xml, schema);
    assert!(report.is_valid(), "{:#?}", report.errors);
}

#[test]
fn test_two_transfers() {
    init_tracing();

    let mut message = Message::credit_transfer(debtor());
    message.add_transaction(telekomiker()).unwrap();
    message.add_transaction(amazonas()).unwrap();

    assert_eq!(message.select_schema().unwrap().id, "pain.001.003.03");

    let rendered = message.render().unwrap();
    assert!(rendered.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert_conforms(&rendered, "pain.001.003.03");

    let xml = Xml::parse(&rendered);
    assert_eq!(
        xml.namespace(),
        Some("urn:iso:std:iso:20022:tech:xsd:pain.001.003.03")
    );
    assert_eq!(xml.text("CstmrCdtTrfInitn/GrpHdr/MsgId"), message.message_identification());
    assert_eq!(xml.text("CstmrCdtTrfInitn/GrpHdr/NbOfTxs"), "2");
    assert_eq!(xml.text("CstmrCdtTrfInitn/GrpHdr/CtrlSum"), "161.50");
    assert_eq!(xml.text("CstmrCdtTrfInitn/GrpHdr/InitgPty/Nm"), "Schuldner GmbH");

    let payment = "CstmrCdtTrfInitn/PmtInf";
    assert_eq!(xml.count("CstmrCdtTrfInitn", "PmtInf"), 1);
    assert_eq!(
        xml.text(&format!("{}/PmtInfId", payment)),
        format!("{}/1", message.message_identification())
    );
    assert_eq!(xml.text(&format!("{}/PmtMtd", payment)), "TRF");
    assert_eq!(xml.text(&format!("{}/BtchBookg", payment)), "true");
    assert_eq!(xml.text(&format!("{}/NbOfTxs", payment)), "2");
    assert_eq!(xml.text(&format!("{}/CtrlSum", payment)), "161.50");
    assert_eq!(
        xml.text(&format!("{}/ReqdExctnDt", payment)),
        types::format_date(types::today())
    );
    assert_eq!(xml.text(&format!("{}/Dbtr/Nm", payment)), "Schuldner GmbH");
    assert_eq!(
        xml.text(&format!("{}/DbtrAcct/Id/IBAN", payment)),
        "DE87200500001234567890"
    );
    assert_eq!(
        xml.text(&format!("{}/DbtrAgt/FinInstnId/BIC", payment)),
        "BANKDEFFXXX"
    );

    let first = format!("{}/CdtTrfTxInf[1]", payment);
    assert_eq!(xml.text(&format!("{}/PmtId/EndToEndId", first)), "XYZ-1234/123");
    assert!(!xml.has(&format!("{}/PmtId/InstrId", first)));
    assert_eq!(xml.text(&format!("{}/Amt/InstdAmt", first)), "102.50");
    assert_eq!(
        xml.attribute(&format!("{}/Amt/InstdAmt", first), "Ccy").as_deref(),
        Some("EUR")
    );
    assert_eq!(
        xml.text(&format!("{}/CdtrAgt/FinInstnId/BIC", first)),
        "PBNKDEFF370"
    );
    assert_eq!(xml.text(&format!("{}/Cdtr/Nm", first)), "Telekomiker AG");
    assert_eq!(
        xml.text(&format!("{}/CdtrAcct/Id/IBAN", first)),
        "DE37112589611964645802"
    );
    assert_eq!(
        xml.text(&format!("{}/RmtInf/Ustrd", first)),
        "Rechnung vom 22.08.2013"
    );

    let second = format!("{}/CdtTrfTxInf[2]", payment);
    assert_eq!(xml.text(&format!("{}/PmtId/EndToEndId", second)), "NOTPROVIDED");
    assert_eq!(xml.text(&format!("{}/Amt/InstdAmt", second)), "59.00");
}

#[test]
fn test_render_is_repeatable() {
    let mut message = Message::credit_transfer(debtor());
    message.add_transaction(telekomiker()).unwrap();

    assert_eq!(message.render().unwrap(), message.render().unwrap());
    assert_eq!(message.transactions().len(), 1);
}

#[test]
fn test_groups_by_requested_date() {
    let mut message = Message::credit_transfer(debtor());
    message.set_message_identification("TRANSFER-2013-08").unwrap();
    message
        .add_transaction(telekomiker().with_requested_date(in_days(1)))
        .unwrap();
    message
        .add_transaction(amazonas().with_requested_date(in_days(2)))
        .unwrap();
    message
        .add_transaction(telekomiker().with_requested_date(in_days(2)))
        .unwrap();

    let rendered = message.render().unwrap();
    assert_conforms(&rendered, "pain.001.003.03");

    let xml = Xml::parse(&rendered);
    assert_eq!(xml.count("CstmrCdtTrfInitn", "PmtInf"), 2);
    assert_eq!(xml.text("CstmrCdtTrfInitn/PmtInf[1]/PmtInfId"), "TRANSFER-2013-08/1");
    assert_eq!(xml.text("CstmrCdtTrfInitn/PmtInf[2]/PmtInfId"), "TRANSFER-2013-08/2");
    assert_eq!(
        xml.text("CstmrCdtTrfInitn/PmtInf[1]/ReqdExctnDt"),
        types::format_date(in_days(1))
    );
    assert_eq!(
        xml.text("CstmrCdtTrfInitn/PmtInf[2]/ReqdExctnDt"),
        types::format_date(in_days(2))
    );
    assert_eq!(xml.text("CstmrCdtTrfInitn/PmtInf[1]/CtrlSum"), "102.50");
    assert_eq!(xml.text("CstmrCdtTrfInitn/PmtInf[2]/CtrlSum"), "161.50");
    assert_eq!(
        xml.text("CstmrCdtTrfInitn/PmtInf[2]/CdtTrfTxInf[1]/Cdtr/Nm"),
        "Amazonas GmbH"
    );
    assert_eq!(xml.text("CstmrCdtTrfInitn/GrpHdr/CtrlSum"), "264.00");
}

#[test]
fn test_groups_by_batch_booking_and_service_level() {
    let mut message = Message::credit_transfer(debtor());
    message
        .add_transaction(telekomiker().with_batch_booking(false))
        .unwrap();
    message.add_transaction(telekomiker()).unwrap();
    message
        .add_transaction(telekomiker().with_service_level(ServiceLevel::Sepa))
        .unwrap();
    message
        .add_transaction(amazonas().with_batch_booking(false))
        .unwrap();

    let groups = message.payment_groups();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].count(), 2);

    let xml_text = message.render().unwrap();
    let xml = Xml::parse(&xml_text);
    assert_eq!(xml.text("CstmrCdtTrfInitn/PmtInf[1]/BtchBookg"), "false");
    assert_eq!(xml.text("CstmrCdtTrfInitn/PmtInf[2]/BtchBookg"), "true");
    assert_eq!(
        xml.text("CstmrCdtTrfInitn/PmtInf[3]/CdtTrfTxInf/PmtTpInf/SvcLvl/Cd"),
        "SEPA"
    );
    assert!(!xml.has("CstmrCdtTrfInitn/PmtInf[1]/CdtTrfTxInf/PmtTpInf"));
}

#[test]
fn test_falls_back_to_base_schema_for_foreign_currency() {
    let mut message = Message::credit_transfer(debtor());
    message
        .add_transaction(
            CreditTransferTransaction::new("Bergbahn AG", "CH9300762011623852957", dec!(250))
                .with_bic("UBSWCHZH80A")
                .with_currency("CHF"),
        )
        .unwrap();

    assert_eq!(message.select_schema().unwrap().id, "pain.001.001.03");

    let rendered = message.render().unwrap();
    assert_conforms(&rendered, "pain.001.001.03");

    let xml = Xml::parse(&rendered);
    assert_eq!(
        xml.namespace(),
        Some("urn:iso:std:iso:20022:tech:xsd:pain.001.001.03")
    );
    assert_eq!(
        xml.attribute("CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf/Amt/InstdAmt", "Ccy")
            .as_deref(),
        Some("CHF")
    );
    assert_eq!(
        xml.text("CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf/Amt/InstdAmt"),
        "250.00"
    );

    match message.render_with_schema("pain.001.003.03") {
        Err(Error::SchemaIncompatible(err)) => {
            assert_eq!(err.rejections.len(), 1);
            assert_eq!(err.rejections[0].schema, "pain.001.003.03");
        }
        other => panic!("expected schema incompatibility, got {:?}", other),
    }
}

#[test]
fn test_no_compatible_schema() {
    let mut message = Message::credit_transfer(debtor());
    message
        .add_transaction(telekomiker().with_service_level(ServiceLevel::Sepa))
        .unwrap();
    message
        .add_transaction(
            CreditTransferTransaction::new("Bergbahn AG", "CH9300762011623852957", dec!(250))
                .with_currency("CHF"),
        )
        .unwrap();

    match message.render() {
        Err(Error::SchemaIncompatible(err)) => {
            let schemas: Vec<&str> = err.rejections.iter().map(|r| r.schema).collect();
            assert_eq!(
                schemas,
                vec!["pain.001.003.03", "pain.001.002.03", "pain.001.001.03"]
            );
            assert!(err.rejections.iter().all(|r| r.transaction_index == 1));
        }
        other => panic!("expected schema incompatibility, got {:?}", other),
    }
}

#[test]
fn test_explicit_epc_schema() {
    let mut message = Message::credit_transfer(debtor());
    message
        .add_transaction(telekomiker().with_service_level(ServiceLevel::Sepa))
        .unwrap();

    let rendered = message.render_with_schema("pain.001.002.03").unwrap();
    assert_conforms(&rendered, "pain.001.002.03");
    assert_eq!(
        Xml::parse(&rendered).namespace(),
        Some("urn:iso:std:iso:20022:tech:xsd:pain.001.002.03")
    );

    assert!(matches!(
        message.render_with_schema("pain.001.009.09"),
        Err(Error::UnknownSchema(_))
    ));
}

#[test]
fn test_placeholders_without_bic() {
    let mut message = Message::credit_transfer(Account::new(
        "Schuldner GmbH",
        "DE87200500001234567890",
    ));
    message
        .add_transaction(CreditTransferTransaction::new(
            "Telekomiker AG",
            "DE37112589611964645802",
            dec!(1),
        ))
        .unwrap();

    let rendered = message.render().unwrap();
    assert_conforms(&rendered, "pain.001.003.03");

    let xml = Xml::parse(&rendered);
    assert_eq!(
        xml.text("CstmrCdtTrfInitn/PmtInf/DbtrAgt/FinInstnId/Othr/Id"),
        "NOTPROVIDED"
    );
    assert!(!xml.has("CstmrCdtTrfInitn/PmtInf/DbtrAgt/FinInstnId/BIC"));
    assert!(!xml.has("CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf/CdtrAgt"));
}

#[test]
fn test_addresses_and_instruction_id() {
    let account = debtor().with_address("DE", "Hauptstraße 1", Some("12345 Köln".to_string()));
    let mut message = Message::credit_transfer(account);
    message
        .add_transaction(
            telekomiker()
                .with_instruction_id("INSTR-1")
                .with_address_lines("   ", Some("Postfach 12".to_string())),
        )
        .unwrap();

    let rendered = message.render().unwrap();
    assert_conforms(&rendered, "pain.001.003.03");

    let xml = Xml::parse(&rendered);
    let debtor_address = "CstmrCdtTrfInitn/PmtInf/Dbtr/PstlAdr";
    assert_eq!(xml.text(&format!("{}/Ctry", debtor_address)), "DE");
    assert_eq!(xml.text(&format!("{}/AdrLine[1]", debtor_address)), "Hauptstrasse 1");
    assert_eq!(xml.text(&format!("{}/AdrLine[2]", debtor_address)), "12345 Koeln");

    let entry = "CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf";
    assert_eq!(xml.text(&format!("{}/PmtId/InstrId", entry)), "INSTR-1");
    assert_eq!(xml.count(&format!("{}/Cdtr/PstlAdr", entry), "AdrLine"), 1);
    assert_eq!(xml.text(&format!("{}/Cdtr/PstlAdr/AdrLine", entry)), "Postfach 12");
}

#[test]
fn test_structured_creditor_reference() {
    let mut message = Message::credit_transfer(debtor());
    let mut tx = telekomiker().with_creditor_reference("RF18539007547034");
    tx.details.remittance_information = None;
    message.add_transaction(tx).unwrap();

    let rendered = message.render().unwrap();
    assert_conforms(&rendered, "pain.001.003.03");

    let xml = Xml::parse(&rendered);
    let reference = "CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf/RmtInf/Strd/CdtrRefInf";
    assert_eq!(xml.text(&format!("{}/Tp/CdOrPrtry/Cd", reference)), "SCOR");
    assert_eq!(xml.text(&format!("{}/Ref", reference)), "RF18539007547034");
    assert!(!xml.has("CstmrCdtTrfInitn/PmtInf/CdtTrfTxInf/RmtInf/Ustrd"));
}

#[test]
fn test_rejections() {
    let mut message = Message::credit_transfer(debtor());

    let yesterday = types::today().pred_opt().unwrap();
    let err = message
        .add_transaction(telekomiker().with_requested_date(yesterday))
        .unwrap_err();
    assert!(err.validation_errors().unwrap().contains_field("requested_date"));

    let err = message
        .add_transaction(telekomiker().with_creditor_reference("RF18539007547034"))
        .unwrap_err();
    assert!(err
        .validation_errors()
        .unwrap()
        .contains_field("creditor_reference"));

    assert!(message.transactions().is_empty());

    let err = message.render().unwrap_err();
    assert!(err.validation_errors().unwrap().contains_field("transactions"));
}

#[test]
fn test_compact_output_from_config() {
    let config = Config {
        message_id_prefix: "ACME".to_string(),
        pretty_print: false,
        ..Default::default()
    };
    let mut message = Message::with_config(MessageKind::CreditTransfer, debtor(), config).unwrap();
    message.add_transaction(telekomiker()).unwrap();

    let rendered = message.render().unwrap();
    assert_eq!(rendered.lines().count(), 2);
    assert!(message.message_identification().starts_with("ACME/"));
    assert_conforms(&rendered, "pain.001.003.03");
}
