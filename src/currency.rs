//! Currency display.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Formatter, Money, Params, Position, iso};
use serde::{Deserialize, Serialize};

/// Display parameters for a single currency.
///
/// The four fields are the only points of variation between supported
/// currencies, so adding a currency is a data-only change in [`BillCurrency::spec`].
#[derive(Debug, Clone, Copy)]
struct FormatSpec {
    /// Fraction digits always shown.
    decimals: u32,

    /// Thousands separator between digit groups.
    separator: char,

    /// Currency symbol.
    symbol: &'static str,

    /// Whether the symbol trails the amount.
    suffix: bool,
}

/// Currencies a scanned bill can be denominated in.
///
/// Unknown currency codes fall back to [`BillCurrency::Rub`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillCurrency {
    /// Russian ruble.
    #[default]
    Rub,

    /// Uzbek som.
    Uzs,

    /// United States dollar.
    Usd,

    /// Euro.
    Eur,
}

impl BillCurrency {
    /// Resolve an ISO alpha code, falling back to the default currency for
    /// anything unrecognised.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "UZS" => BillCurrency::Uzs,
            "USD" => BillCurrency::Usd,
            "EUR" => BillCurrency::Eur,
            _ => BillCurrency::Rub,
        }
    }

    /// ISO alpha code for this currency.
    #[must_use]
    pub fn code(self) -> &'static str {
        self.iso().iso_alpha_code
    }

    /// Backing ISO currency definition.
    fn iso(self) -> &'static iso::Currency {
        match self {
            BillCurrency::Rub => iso::RUB,
            BillCurrency::Uzs => iso::UZS,
            BillCurrency::Usd => iso::USD,
            BillCurrency::Eur => iso::EUR,
        }
    }

    /// The display parameter table.
    fn spec(self) -> FormatSpec {
        match self {
            BillCurrency::Rub => FormatSpec {
                decimals: 2,
                separator: ' ',
                symbol: "₽",
                suffix: true,
            },
            BillCurrency::Uzs => FormatSpec {
                decimals: 2,
                separator: ',',
                symbol: "som",
                suffix: true,
            },
            BillCurrency::Usd => FormatSpec {
                decimals: 2,
                separator: ',',
                symbol: "$",
                suffix: false,
            },
            BillCurrency::Eur => FormatSpec {
                decimals: 2,
                separator: ' ',
                symbol: "€",
                suffix: true,
            },
        }
    }

    /// Render an amount as a human currency string.
    ///
    /// Pure and deterministic: identical `(amount, currency)` always yields
    /// identical output. Amounts are rounded half-away-from-zero to the
    /// currency's precision and padded to the full fraction width.
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        let spec = self.spec();

        let mut rounded =
            amount.round_dp_with_strategy(spec.decimals, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(spec.decimals);

        let positions = if spec.suffix {
            vec![Position::Sign, Position::Amount, Position::Symbol]
        } else {
            vec![Position::Sign, Position::Symbol, Position::Amount]
        };

        let params = Params {
            digit_separator: spec.separator,
            positions: &positions,
            symbol: Some(spec.symbol),
            ..Params::default()
        };

        Formatter::money(&Money::from_decimal(rounded, self.iso()), params)
    }
}

/// Render `amount` using the currency identified by `code`.
///
/// Unknown codes fall back to the default currency rather than failing, so
/// formatting is total.
#[must_use]
pub fn format(amount: Decimal, code: &str) -> String {
    BillCurrency::from_code(code).format(amount)
}
