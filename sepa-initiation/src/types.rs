//! Money, date and code list primitives

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency used when a transaction does not name one
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Placeholder for missing references and agents
pub const NOT_PROVIDED: &str = "NOTPROVIDED";

/// Largest amount a single SEPA transaction may carry
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999, 2)
}

/// Render amount with exactly two decimals (`15` -> `15.00`)
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Render date as ISO-8601 `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render timestamp as ISO-8601 with seconds precision
pub fn format_date_time(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Unknown code for an enumerated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    /// Name of the code list
    pub list: &'static str,

    /// Rejected value
    pub value: String,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} code {:?}", self.list, self.value)
    }
}

impl std::error::Error for UnknownCode {}

macro_rules! code_list {
    (
        $(#[$meta:meta])*
        $name:ident, $list:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant, )+
        }

        impl $name {
            /// Wire code
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $code, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $code => Ok($name::$variant), )+
                    other => Err(UnknownCode {
                        list: $list,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

code_list! {
    /// Credit transfer service level
    ServiceLevel, "service level" {
        /// Single Euro Payments Area
        Sepa => "SEPA",
        /// Urgent payment
        Urgent => "URGP",
    }
}

code_list! {
    /// Direct debit scheme variant
    LocalInstrument, "local instrument" {
        /// SEPA Core direct debit
        Core => "CORE",
        /// SEPA Core with D-1 presentation
        Cor1 => "COR1",
        /// SEPA Business-to-Business direct debit
        B2b => "B2B",
    }
}

code_list! {
    /// Position of a collection in a mandate's series
    SequenceType, "sequence type" {
        /// First collection of a series
        First => "FRST",
        /// Recurrent collection
        Recurring => "RCUR",
        /// One-off collection
        OneOff => "OOFF",
        /// Final collection of a series
        Final => "FNAL",
    }
}

impl Default for LocalInstrument {
    fn default() -> Self {
        LocalInstrument::Core
    }
}

impl Default for SequenceType {
    fn default() -> Self {
        SequenceType::OneOff
    }
}
