//! Document assembly
//!
//! Turns a validated [`Message`] and its selected [`Schema`] into the wire
//! structures and serializes them with `quick-xml`.
//! Nothing here validates; callers run the pipeline first.

use crate::{
    account::Account,
    config::Config,
    document::*,
    error::{Error, Result},
    grouping::{Discriminator, PaymentGroup},
    message::{Message, MessageKind},
    schema::Schema,
    text,
    transaction::{CreditTransferTransaction, DirectDebitTransaction, Transaction, TransactionDetails},
    types::{self, ServiceLevel, NOT_PROVIDED},
    validation::MAX_IDENTIFIER_LENGTH,
};
use quick_xml::{events::Event, se::to_string as to_xml_string, Reader, Writer};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Charge bearer of SEPA direct debits (shared charges)
const CHARGE_BEARER: &str = "SLEV";

/// Code of an ISO 11649 structured creditor reference
const CREDITOR_REFERENCE_TYPE: &str = "SCOR";

/// Build the document tree of `message` for `schema`
pub(crate) fn build(message: &Message, schema: &Schema) -> Result<Document> {
    let groups = message.payment_groups();
    let grp_hdr = group_header(message);

    tracing::debug!(
        message = %message.message_identification(),
        schema = schema.id,
        groups = groups.len(),
        "Assembling document"
    );

    let mut document = Document {
        xmlns: schema.namespace(),
        xmlns_xsi: XSI_NAMESPACE.to_string(),
        schema_location: schema.schema_location(),
        cstmr_cdt_trf_initn: None,
        cstmr_drct_dbt_initn: None,
    };

    match message.kind() {
        MessageKind::CreditTransfer => {
            document.cstmr_cdt_trf_initn = Some(CustomerCreditTransferInitiation {
                grp_hdr,
                pmt_inf: groups
                    .iter()
                    .enumerate()
                    .map(|(index, group)| credit_transfer_payment(message, index + 1, group))
                    .collect::<Result<_>>()?,
            });
        }
        MessageKind::DirectDebit => {
            document.cstmr_drct_dbt_initn = Some(CustomerDirectDebitInitiation {
                grp_hdr,
                pmt_inf: groups
                    .iter()
                    .enumerate()
                    .map(|(index, group)| direct_debit_payment(message, index + 1, group))
                    .collect::<Result<_>>()?,
            });
        }
    }

    Ok(document)
}

/// Serialize `document` with the XML declaration prepended
pub(crate) fn to_xml(document: &Document, config: &Config) -> Result<String> {
    let body = to_xml_string(document)
        .map_err(|e| Error::Render(format!("XML serialization failed: {}", e)))?;

    let body = if config.pretty_print {
        indent(&body, config.indent_width)?
    } else {
        body
    };

    Ok(format!("{}{}", XML_DECLARATION, body))
}

/// Re-emit compact `xml` with one element per line
///
/// Text nodes stay on the line of their element, so `<InstdAmt Ccy="EUR">39.99</InstdAmt>`
/// keeps its value verbatim.
fn indent(xml: &str, width: usize) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', width);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| Error::Render(format!("XML indentation failed: {}", e)))?,
            Err(e) => return Err(Error::Render(format!("XML indentation failed: {}", e))),
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Render(format!("Rendered XML is not UTF-8: {}", e)))
}

/// `PmtInfId` of the `sequence`th block (1-based)
///
/// The message identification is cut so the result stays within 35 characters.
pub(crate) fn payment_information_id(message_identification: &str, sequence: usize) -> String {
    let suffix = format!("/{}", sequence);
    let room = MAX_IDENTIFIER_LENGTH.saturating_sub(suffix.len());
    let prefix: String = message_identification.chars().take(room).collect();
    format!("{}{}", prefix, suffix)
}

fn group_header(message: &Message) -> GroupHeader {
    GroupHeader {
        msg_id: message.message_identification().to_string(),
        cre_dt_tm: types::format_date_time(message.creation_date_time()),
        nb_of_txs: message.transactions().len(),
        ctrl_sum: types::format_amount(message.control_sum()),
        initg_pty: PartyName {
            nm: text::name(&message.account().name),
        },
    }
}

fn credit_transfer_payment(
    message: &Message,
    sequence: usize,
    group: &PaymentGroup<'_>,
) -> Result<CreditTransferPaymentInformation> {
    let account = message.account();

    Ok(CreditTransferPaymentInformation {
        pmt_inf_id: payment_information_id(message.message_identification(), sequence),
        pmt_mtd: MessageKind::CreditTransfer.payment_method().to_string(),
        btch_bookg: group.key.batch_booking,
        nb_of_txs: group.count(),
        ctrl_sum: types::format_amount(group.control_sum()),
        reqd_exctn_dt: types::format_date(group.key.requested_date),
        dbtr: account_party(account),
        dbtr_acct: cash_account(&account.iban),
        dbtr_agt: agent_or_placeholder(account.bic.as_deref()),
        cdt_trf_tx_inf: group
            .transactions
            .iter()
            .map(|tx| match tx {
                Transaction::CreditTransfer(tx) => Ok(credit_transfer_entry(tx)),
                Transaction::DirectDebit(_) => Err(foreign_entry(MessageKind::CreditTransfer)),
            })
            .collect::<Result<_>>()?,
    })
}

fn credit_transfer_entry(tx: &CreditTransferTransaction) -> CreditTransferTxInfo {
    let details = &tx.details;

    CreditTransferTxInfo {
        pmt_id: payment_identification(details),
        pmt_tp_inf: tx.service_level.map(|level: ServiceLevel| PaymentTypeInformation {
            svc_lvl: Some(code(level.as_str())),
            ..Default::default()
        }),
        amt: Amount {
            instd_amt: instructed_amount(details),
        },
        // Only named when known, the creditor bank is derived from the IBAN otherwise
        cdtr_agt: bic_of(details.bic.as_deref()).map(bic_agent),
        cdtr: Party {
            nm: text::name(&details.name),
            pstl_adr: postal_address(None, details.address_lines()),
        },
        cdtr_acct: cash_account(&details.iban),
        rmt_inf: remittance_information(details),
    }
}

fn direct_debit_payment(
    message: &Message,
    sequence: usize,
    group: &PaymentGroup<'_>,
) -> Result<DirectDebitPaymentInformation> {
    let account = message.account();

    let Discriminator::DirectDebit {
        local_instrument,
        sequence_type,
    } = group.key.discriminator
    else {
        return Err(foreign_entry(MessageKind::DirectDebit));
    };

    Ok(DirectDebitPaymentInformation {
        pmt_inf_id: payment_information_id(message.message_identification(), sequence),
        pmt_mtd: MessageKind::DirectDebit.payment_method().to_string(),
        btch_bookg: group.key.batch_booking,
        nb_of_txs: group.count(),
        ctrl_sum: types::format_amount(group.control_sum()),
        pmt_tp_inf: PaymentTypeInformation {
            svc_lvl: Some(code(ServiceLevel::Sepa.as_str())),
            lcl_instrm: Some(code(local_instrument.as_str())),
            seq_tp: Some(sequence_type.as_str().to_string()),
        },
        reqd_colltn_dt: types::format_date(group.key.requested_date),
        cdtr: account_party(account),
        cdtr_acct: cash_account(&account.iban),
        cdtr_agt: agent_or_placeholder(account.bic.as_deref()),
        chrg_br: CHARGE_BEARER.to_string(),
        cdtr_schme_id: CreditorSchemeIdentification {
            id: SchemeIdentification {
                prvt_id: PrivateIdentification {
                    othr: SchemeOther {
                        id: account.creditor_identifier.clone().unwrap_or_default(),
                        schme_nm: SchemeName {
                            prtry: ServiceLevel::Sepa.as_str().to_string(),
                        },
                    },
                },
            },
        },
        drct_dbt_tx_inf: group
            .transactions
            .iter()
            .map(|tx| match tx {
                Transaction::DirectDebit(tx) => Ok(direct_debit_entry(tx)),
                Transaction::CreditTransfer(_) => Err(foreign_entry(MessageKind::DirectDebit)),
            })
            .collect::<Result<_>>()?,
    })
}

fn foreign_entry(kind: MessageKind) -> Error {
    Error::Render(format!(
        "payment block of a {} message holds a transaction of the other kind",
        kind.payment_method()
    ))
}

fn direct_debit_entry(tx: &DirectDebitTransaction) -> DirectDebitTxInfo {
    let details = &tx.details;

    DirectDebitTxInfo {
        pmt_id: payment_identification(details),
        instd_amt: instructed_amount(details),
        drct_dbt_tx: DirectDebitTransactionDetails {
            mndt_rltd_inf: MandateRelatedInformation {
                mndt_id: tx.mandate_id.clone(),
                dt_of_sgntr: types::format_date(tx.mandate_date_of_signature),
            },
        },
        dbtr_agt: agent_or_placeholder(details.bic.as_deref()),
        dbtr: Party {
            nm: text::name(&details.name),
            pstl_adr: postal_address(None, details.address_lines()),
        },
        dbtr_acct: cash_account(&details.iban),
        rmt_inf: remittance_information(details),
    }
}

fn payment_identification(details: &TransactionDetails) -> PaymentIdentification {
    PaymentIdentification {
        instr_id: details.instruction_id.clone(),
        end_to_end_id: details.reference.clone(),
    }
}

fn instructed_amount(details: &TransactionDetails) -> AmountAndCurrency {
    AmountAndCurrency {
        ccy: details.currency.clone(),
        value: types::format_amount(details.amount),
    }
}

fn account_party(account: &Account) -> Party {
    Party {
        nm: text::name(&account.name),
        pstl_adr: postal_address(account.country.clone(), account.address_lines()),
    }
}

fn postal_address(country: Option<String>, lines: Vec<String>) -> Option<PostalAddress> {
    if country.is_none() && lines.is_empty() {
        return None;
    }
    Some(PostalAddress {
        ctry: country,
        adr_line: lines,
    })
}

fn cash_account(iban: &str) -> CashAccount {
    CashAccount {
        id: AccountIdentification {
            iban: iban.to_string(),
        },
    }
}

fn bic_of(bic: Option<&str>) -> Option<&str> {
    bic.filter(|b| !b.is_empty())
}

fn bic_agent(bic: &str) -> Agent {
    Agent {
        fin_instn_id: FinancialInstitutionId {
            bic: Some(bic.to_string()),
            othr: None,
        },
    }
}

fn agent_or_placeholder(bic: Option<&str>) -> Agent {
    match bic_of(bic) {
        Some(bic) => bic_agent(bic),
        None => Agent {
            fin_instn_id: FinancialInstitutionId {
                bic: None,
                othr: Some(OtherIdentification {
                    id: NOT_PROVIDED.to_string(),
                }),
            },
        },
    }
}

fn remittance_information(details: &TransactionDetails) -> Option<RemittanceInformation> {
    if let Some(remittance) = &details.remittance_information {
        return Some(RemittanceInformation {
            ustrd: Some(text::remittance(remittance)),
            strd: None,
        });
    }

    details
        .creditor_reference
        .as_ref()
        .map(|reference| RemittanceInformation {
            ustrd: None,
            strd: Some(StructuredRemittance {
                cdtr_ref_inf: CreditorReferenceInformation {
                    tp: CreditorReferenceType {
                        cd_or_prtry: code(CREDITOR_REFERENCE_TYPE),
                    },
                    reference: reference.clone(),
                },
            }),
        })
}

fn code(value: &str) -> Code {
    Code {
        cd: value.to_string(),
    }
}
