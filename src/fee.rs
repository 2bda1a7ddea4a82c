use crate::args::Usage;

/// How a customer pays for a meeting order.
///
/// Each method carries a processing fee, expressed as a percentage of the
/// order amount (in basis points) plus a flat surcharge, both in minor
/// currency units. The composition lives in one table so that invoicing
/// and checkout agree on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PaymentMethod {
    BankTransfer,
    VirtualAccount,
    Ewallet,
    CreditCard,
    Qris,
}

impl PaymentMethod {
    pub const USAGE: Usage = Usage::arg(
        "<method>",
        "The payment method for an order.",
        r#"
The payment method for an order.

Valid values are:

bank-transfer, bank

virtual-account, va

e-wallet, ewallet

credit-card, cc

qris
"#,
    );

    /// The processing fee for an order of `amount` minor currency units.
    ///
    /// The percentage part truncates toward zero. The result saturates at
    /// `i64::MAX` instead of overflowing for absurd amounts.
    pub fn fee(&self, amount: i64) -> i64 {
        let (percent_bp, flat) = match *self {
            PaymentMethod::BankTransfer => (0, 0),
            PaymentMethod::VirtualAccount => (0, 4_000),
            PaymentMethod::Ewallet => (150, 0),
            PaymentMethod::CreditCard => (290, 2_000),
            PaymentMethod::Qris => (70, 0),
        };
        let fee = i128::from(amount) * percent_bp / 10_000 + flat;
        i64::try_from(fee).unwrap_or(i64::MAX)
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<PaymentMethod> {
        let method = match &*s.to_lowercase() {
            "bank-transfer" | "bank" => PaymentMethod::BankTransfer,
            "virtual-account" | "va" => PaymentMethod::VirtualAccount,
            "e-wallet" | "ewallet" => PaymentMethod::Ewallet,
            "credit-card" | "cc" => PaymentMethod::CreditCard,
            "qris" => PaymentMethod::Qris,
            unk => anyhow::bail!("unrecognized payment method: `{unk}`"),
        };
        Ok(method)
    }
}
