// pain.001 / pain.008 wire structures
//
// Field order is element order. Amounts and dates arrive preformatted so the
// serializer never decides on number or date representation.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename = "Document")]
pub(crate) struct Document {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:xsi")]
    pub xmlns_xsi: String,

    #[serde(rename = "@xsi:schemaLocation")]
    pub schema_location: String,

    #[serde(rename = "CstmrCdtTrfInitn", skip_serializing_if = "Option::is_none")]
    pub cstmr_cdt_trf_initn: Option<CustomerCreditTransferInitiation>,

    #[serde(rename = "CstmrDrctDbtInitn", skip_serializing_if = "Option::is_none")]
    pub cstmr_drct_dbt_initn: Option<CustomerDirectDebitInitiation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomerCreditTransferInitiation {
    #[serde(rename = "GrpHdr")]
    pub grp_hdr: GroupHeader,

    #[serde(rename = "PmtInf")]
    pub pmt_inf: Vec<CreditTransferPaymentInformation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomerDirectDebitInitiation {
    #[serde(rename = "GrpHdr")]
    pub grp_hdr: GroupHeader,

    #[serde(rename = "PmtInf")]
    pub pmt_inf: Vec<DirectDebitPaymentInformation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupHeader {
    #[serde(rename = "MsgId")]
    pub msg_id: String,

    #[serde(rename = "CreDtTm")]
    pub cre_dt_tm: String,

    #[serde(rename = "NbOfTxs")]
    pub nb_of_txs: usize,

    #[serde(rename = "CtrlSum")]
    pub ctrl_sum: String,

    #[serde(rename = "InitgPty")]
    pub initg_pty: PartyName,
}

#[derive(Debug, Serialize)]
pub(crate) struct PartyName {
    #[serde(rename = "Nm")]
    pub nm: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Party {
    #[serde(rename = "Nm")]
    pub nm: String,

    #[serde(rename = "PstlAdr", skip_serializing_if = "Option::is_none")]
    pub pstl_adr: Option<PostalAddress>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostalAddress {
    #[serde(rename = "Ctry", skip_serializing_if = "Option::is_none")]
    pub ctry: Option<String>,

    #[serde(rename = "AdrLine", skip_serializing_if = "Vec::is_empty")]
    pub adr_line: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CashAccount {
    #[serde(rename = "Id")]
    pub id: AccountIdentification,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccountIdentification {
    #[serde(rename = "IBAN")]
    pub iban: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Agent {
    #[serde(rename = "FinInstnId")]
    pub fin_instn_id: FinancialInstitutionId,
}

#[derive(Debug, Serialize)]
pub(crate) struct FinancialInstitutionId {
    #[serde(rename = "BIC", skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,

    #[serde(rename = "Othr", skip_serializing_if = "Option::is_none")]
    pub othr: Option<OtherIdentification>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtherIdentification {
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Code {
    #[serde(rename = "Cd")]
    pub cd: String,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct PaymentTypeInformation {
    #[serde(rename = "SvcLvl", skip_serializing_if = "Option::is_none")]
    pub svc_lvl: Option<Code>,

    #[serde(rename = "LclInstrm", skip_serializing_if = "Option::is_none")]
    pub lcl_instrm: Option<Code>,

    #[serde(rename = "SeqTp", skip_serializing_if = "Option::is_none")]
    pub seq_tp: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentIdentification {
    #[serde(rename = "InstrId", skip_serializing_if = "Option::is_none")]
    pub instr_id: Option<String>,

    #[serde(rename = "EndToEndId")]
    pub end_to_end_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AmountAndCurrency {
    #[serde(rename = "@Ccy")]
    pub ccy: String,

    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Amount {
    #[serde(rename = "InstdAmt")]
    pub instd_amt: AmountAndCurrency,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemittanceInformation {
    #[serde(rename = "Ustrd", skip_serializing_if = "Option::is_none")]
    pub ustrd: Option<String>,

    #[serde(rename = "Strd", skip_serializing_if = "Option::is_none")]
    pub strd: Option<StructuredRemittance>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StructuredRemittance {
    #[serde(rename = "CdtrRefInf")]
    pub cdtr_ref_inf: CreditorReferenceInformation,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreditorReferenceInformation {
    #[serde(rename = "Tp")]
    pub tp: CreditorReferenceType,

    #[serde(rename = "Ref")]
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreditorReferenceType {
    #[serde(rename = "CdOrPrtry")]
    pub cd_or_prtry: Code,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreditTransferPaymentInformation {
    #[serde(rename = "PmtInfId")]
    pub pmt_inf_id: String,

    #[serde(rename = "PmtMtd")]
    pub pmt_mtd: String,

    #[serde(rename = "BtchBookg")]
    pub btch_bookg: bool,

    #[serde(rename = "NbOfTxs")]
    pub nb_of_txs: usize,

    #[serde(rename = "CtrlSum")]
    pub ctrl_sum: String,

    #[serde(rename = "ReqdExctnDt")]
    pub reqd_exctn_dt: String,

    #[serde(rename = "Dbtr")]
    pub dbtr: Party,

    #[serde(rename = "DbtrAcct")]
    pub dbtr_acct: CashAccount,

    #[serde(rename = "DbtrAgt")]
    pub dbtr_agt: Agent,

    #[serde(rename = "CdtTrfTxInf")]
    pub cdt_trf_tx_inf: Vec<CreditTransferTxInfo>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreditTransferTxInfo {
    #[serde(rename = "PmtId")]
    pub pmt_id: PaymentIdentification,

    #[serde(rename = "PmtTpInf", skip_serializing_if = "Option::is_none")]
    pub pmt_tp_inf: Option<PaymentTypeInformation>,

    #[serde(rename = "Amt")]
    pub amt: Amount,

    #[serde(rename = "CdtrAgt", skip_serializing_if = "Option::is_none")]
    pub cdtr_agt: Option<Agent>,

    #[serde(rename = "Cdtr")]
    pub cdtr: Party,

    #[serde(rename = "CdtrAcct")]
    pub cdtr_acct: CashAccount,

    #[serde(rename = "RmtInf", skip_serializing_if = "Option::is_none")]
    pub rmt_inf: Option<RemittanceInformation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DirectDebitPaymentInformation {
    #[serde(rename = "PmtInfId")]
    pub pmt_inf_id: String,

    #[serde(rename = "PmtMtd")]
    pub pmt_mtd: String,

    #[serde(rename = "BtchBookg")]
    pub btch_bookg: bool,

    #[serde(rename = "NbOfTxs")]
    pub nb_of_txs: usize,

    #[serde(rename = "CtrlSum")]
    pub ctrl_sum: String,

    #[serde(rename = "PmtTpInf")]
    pub pmt_tp_inf: PaymentTypeInformation,

    #[serde(rename = "ReqdColltnDt")]
    pub reqd_colltn_dt: String,

    #[serde(rename = "Cdtr")]
    pub cdtr: Party,

    #[serde(rename = "CdtrAcct")]
    pub cdtr_acct: CashAccount,

    #[serde(rename = "CdtrAgt")]
    pub cdtr_agt: Agent,

    #[serde(rename = "ChrgBr")]
    pub chrg_br: String,

    #[serde(rename = "CdtrSchmeId")]
    pub cdtr_schme_id: CreditorSchemeIdentification,

    #[serde(rename = "DrctDbtTxInf")]
    pub drct_dbt_tx_inf: Vec<DirectDebitTxInfo>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreditorSchemeIdentification {
    #[serde(rename = "Id")]
    pub id: SchemeIdentification,
}

#[derive(Debug, Serialize)]
pub(crate) struct SchemeIdentification {
    #[serde(rename = "PrvtId")]
    pub prvt_id: PrivateIdentification,
}

#[derive(Debug, Serialize)]
pub(crate) struct PrivateIdentification {
    #[serde(rename = "Othr")]
    pub othr: SchemeOther,
}

#[derive(Debug, Serialize)]
pub(crate) struct SchemeOther {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "SchmeNm")]
    pub schme_nm: SchemeName,
}

#[derive(Debug, Serialize)]
pub(crate) struct SchemeName {
    #[serde(rename = "Prtry")]
    pub prtry: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DirectDebitTxInfo {
    #[serde(rename = "PmtId")]
    pub pmt_id: PaymentIdentification,

    #[serde(rename = "InstdAmt")]
    pub instd_amt: AmountAndCurrency,

    #[serde(rename = "DrctDbtTx")]
    pub drct_dbt_tx: DirectDebitTransactionDetails,

    #[serde(rename = "DbtrAgt")]
    pub dbtr_agt: Agent,

    #[serde(rename = "Dbtr")]
    pub dbtr: Party,

    #[serde(rename = "DbtrAcct")]
    pub dbtr_acct: CashAccount,

    #[serde(rename = "RmtInf", skip_serializing_if = "Option::is_none")]
    pub rmt_inf: Option<RemittanceInformation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DirectDebitTransactionDetails {
    #[serde(rename = "MndtRltdInf")]
    pub mndt_rltd_inf: MandateRelatedInformation,
}

#[derive(Debug, Serialize)]
pub(crate) struct MandateRelatedInformation {
    #[serde(rename = "MndtId")]
    pub mndt_id: String,

    #[serde(rename = "DtOfSgntr")]
    pub dt_of_sgntr: String,
}
