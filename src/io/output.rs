//! Output formatting for listings
//!
//! Every listing can be written as CSV (fixed column order, one header row)
//! or as pretty-printed JSON carrying the records as the server sent them.
//! All functions write to any `Write` so they can be tested against a buffer.

use crate::types::{Account, BankError, Card, Iban, Operation, ProductFamily, RegionalBank};
use clap::ValueEnum;
use csv::Writer;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::io::Write;

/// Output format of the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

fn csv_error(e: csv::Error) -> BankError {
    BankError::Io {
        message: format!("Failed to write CSV output: {}", e),
    }
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: &mut dyn Write) -> Result<(), BankError> {
    serde_json::to_writer_pretty(&mut *output, value)?;
    writeln!(output)?;
    Ok(())
}

fn write_csv(header: &[&str], rows: Vec<Vec<String>>, output: &mut dyn Write) -> Result<(), BankError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn amount_json(value: Decimal) -> Value {
    value.to_f64().map(Value::from).unwrap_or(Value::Null)
}

/// Write accounts with columns: number, index, family, product, balance
///
/// The balance column holds the savings amount for savings products.
pub fn write_accounts(
    accounts: &[Account],
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), BankError> {
    match format {
        OutputFormat::Json => write_json(accounts, output),
        OutputFormat::Csv => write_csv(
            &["number", "index", "family", "product", "balance"],
            accounts
                .iter()
                .map(|account| {
                    vec![
                        account.number.clone(),
                        account.index.clone(),
                        account
                            .family()
                            .map(|f| f.name().to_string())
                            .unwrap_or_else(|| account.family_code.clone()),
                        account.product_label.clone(),
                        amount(account.solde()),
                    ]
                })
                .collect(),
            output,
        ),
    }
}

/// Write the total balance followed by one row per product family
pub fn write_balance(
    total: Decimal,
    per_family: &BTreeMap<ProductFamily, Decimal>,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), BankError> {
    match format {
        OutputFormat::Json => {
            let families: Map<String, Value> = per_family
                .iter()
                .map(|(family, value)| (family.name().to_string(), amount_json(*value)))
                .collect();
            write_json(
                &json!({ "total": amount_json(total), "families": families }),
                output,
            )
        }
        OutputFormat::Csv => {
            let mut rows = vec![vec!["TOTAL".to_string(), amount(total)]];
            rows.extend(
                per_family
                    .iter()
                    .map(|(family, value)| vec![family.name().to_string(), amount(*value)]),
            );
            write_csv(&["family", "balance"], rows, output)
        }
    }
}

/// Write cards with columns: id, type, holder, account, index
pub fn write_cards(
    cards: &[Card],
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), BankError> {
    match format {
        OutputFormat::Json => write_json(cards, output),
        OutputFormat::Csv => write_csv(
            &["id", "type", "holder", "account", "index"],
            cards
                .iter()
                .map(|card| {
                    vec![
                        card.id.clone(),
                        card.card_type.clone(),
                        card.holder.clone(),
                        card.account_id.clone(),
                        card.index.clone(),
                    ]
                })
                .collect(),
            output,
        ),
    }
}

/// Write operations with columns: date, label, amount, kind
///
/// Operations keep the order the server returned them in.
pub fn write_operations(
    operations: &[Operation],
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), BankError> {
    match format {
        OutputFormat::Json => write_json(operations, output),
        OutputFormat::Csv => write_csv(
            &["date", "label", "amount", "kind"],
            operations
                .iter()
                .map(|op| {
                    vec![
                        op.date.clone(),
                        op.label.clone(),
                        amount(op.amount),
                        op.kind.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
            output,
        ),
    }
}

/// Write an IBAN; JSON output is the full server payload
pub fn write_iban(iban: &Iban, format: OutputFormat, output: &mut dyn Write) -> Result<(), BankError> {
    match format {
        OutputFormat::Json => write_json(&iban.raw, output),
        OutputFormat::Csv => write_csv(
            &["account", "iban"],
            vec![vec![iban.account_number.clone(), iban.code.clone()]],
            output,
        ),
    }
}

pub fn write_regional_bank(
    department: &str,
    bank: &RegionalBank,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), BankError> {
    match format {
        OutputFormat::Json => write_json(bank, output),
        OutputFormat::Csv => write_csv(
            &["department", "name", "alias"],
            vec![vec![
                department.to_string(),
                bank.name.clone().unwrap_or_default(),
                bank.path_segment().unwrap_or_default(),
            ]],
            output,
        ),
    }
}
