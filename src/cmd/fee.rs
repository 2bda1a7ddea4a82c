use std::io::Write;

use anyhow::Context;

use crate::{
    args::{self, Usage},
    fee::PaymentMethod,
};

const USAGE: &'static str = r#"
Compute the processing fee for a payment method.

The fee is a per-method percentage of the amount plus a flat surcharge,
both in minor currency units. This prints the fee and the grand total
(amount plus fee) that a customer would be charged.

USAGE:
    cadence fee <method> <amount>

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    The fee for paying 150000 by credit card:

        $ cadence fee credit-card 150000
        fee: 6350
        total: 156350

REQUIRED ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let method = config.method.context("missing required <method>")?;
    let amount = config.amount.context("missing required <amount>")?;
    let fee = method.fee(amount);

    let mut wtr = std::io::stdout().lock();
    writeln!(wtr, "fee: {fee}")?;
    writeln!(wtr, "total: {}", amount.saturating_add(fee))?;
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    method: Option<PaymentMethod>,
    amount: Option<i64>,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                let v = v.to_str().context("argument is not valid UTF-8")?;
                if self.method.is_none() {
                    self.method = Some(v.parse()?);
                    return Ok(true);
                }
                if self.amount.is_none() {
                    let amount = v.parse::<i64>().with_context(|| {
                        format!("failed to parse `{v}` as an amount")
                    })?;
                    anyhow::ensure!(
                        amount >= 0,
                        "amount `{amount}` must not be negative",
                    );
                    self.amount = Some(amount);
                    return Ok(true);
                }
                return Ok(false);
            }
            _ => return Ok(false),
        }
    }

    fn usage(&self) -> &[Usage] {
        const AMOUNT: Usage = Usage::arg(
            "<amount>",
            "The order amount, in minor currency units.",
            r#"
The order amount, in minor currency units.

This must be a non-negative integer. Minor units keep the fee math exact;
there is no fractional currency anywhere in the pipeline.
"#,
        );
        &[PaymentMethod::USAGE, AMOUNT]
    }
}
