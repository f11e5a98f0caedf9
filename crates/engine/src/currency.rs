use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO currency code of a record or balance.
///
/// Two sets of currencies coexist:
/// - records (transactions and deposits) may only be written in
///   [`Currency::RECORD`] (`PEN`, `USD`, `EUR`);
/// - balances can be queried for every currency in [`Currency::ALL`], so
///   `MXN` and `COP` balances always come back as zero.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units**.
/// `minor_units()` returns how many decimal digits separate major from minor
/// units. Example: USD has 2 minor units, so `10.50 USD` ⇄ `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Pen,
    Mxn,
    Cop,
}

impl Currency {
    /// Every currency a balance can be computed for, in reporting order.
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Pen,
        Currency::Mxn,
        Currency::Cop,
    ];

    /// Currencies accepted when writing a transaction or deposit.
    pub const RECORD: [Currency; 3] = [Currency::Pen, Currency::Usd, Currency::Eur];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Pen => "PEN",
            Currency::Mxn => "MXN",
            Currency::Cop => "COP",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Usd | Currency::Eur | Currency::Pen | Currency::Mxn | Currency::Cop => 2,
        }
    }

    /// Whether records may be written in this currency.
    #[must_use]
    pub fn accepts_records(self) -> bool {
        Self::RECORD.contains(&self)
    }

    /// Parses a currency a record is being written in.
    pub fn for_record(value: &str) -> Result<Self, EngineError> {
        let currency = Self::try_from(value)?;
        currency.ensure_record()?;
        Ok(currency)
    }

    pub(crate) fn ensure_record(self) -> Result<(), EngineError> {
        if self.accepts_records() {
            return Ok(());
        }
        Err(EngineError::InvalidCurrency(format!(
            "{} is not accepted for records. Allowed: {}",
            self.code(),
            join_codes(&Self::RECORD)
        )))
    }
}

fn join_codes(currencies: &[Currency]) -> String {
    currencies
        .iter()
        .map(|c| c.code())
        .collect::<Vec<_>>()
        .join(", ")
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "PEN" => Ok(Currency::Pen),
            "MXN" => Ok(Currency::Mxn),
            "COP" => Ok(Currency::Cop),
            other => Err(EngineError::InvalidCurrency(format!(
                "unsupported currency {other}. Allowed: {}",
                join_codes(&Self::ALL)
            ))),
        }
    }
}
