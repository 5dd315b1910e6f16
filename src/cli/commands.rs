//! Command execution
//!
//! Every command except `regional-bank` logs in first and logs out last,
//! also when the command itself failed. The listing goes to `output`; the
//! caller decides where that is.

use super::args::{page_delay, CliArgs, Command};
use crate::api::{fetch_iban, logout, Accounts, Cards, RegionalBanks};
use crate::core::authenticator::login;
use crate::core::session::Session;
use crate::io::output::{
    write_accounts, write_balance, write_cards, write_iban, write_operations,
    write_regional_bank, OutputFormat,
};
use crate::transport::build_transport;
use crate::types::BankError;
use std::io::Write;

/// Run the command selected on the command line
///
/// # Arguments
///
/// * `args` - Parsed command line
/// * `output` - Sink of the listing (stdout in the binary)
///
/// # Returns
///
/// The error of the first failing step. A failed logout is reported only
/// when the command itself succeeded.
pub async fn execute(args: &CliArgs, output: &mut dyn Write) -> Result<(), BankError> {
    let config = args.client_config()?;
    args.command.validate()?;
    let transport = build_transport(&config, &args.mock_config())?;

    if !args.command.needs_session() {
        let directory = RegionalBanks::new(config.base_url(), transport);
        let bank = directory.by_department(&args.department).await?;
        return write_regional_bank(&args.department, &bank, args.format, output);
    }

    let session = login(&config, transport, args.credentials()?).await?;
    let result = run_with_session(&session, &args.command, args.format, output).await;
    let closed = logout(session).await;

    match (result, closed) {
        (Ok(()), closed) => closed,
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(logout_error)) => {
            tracing::warn!("logout after a failed command also failed: {}", logout_error);
            Err(e)
        }
    }
}

async fn run_with_session(
    session: &Session,
    command: &Command,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<(), BankError> {
    match command {
        Command::RegionalBank => Err(BankError::config(
            "regional-bank does not use a session",
        )),
        Command::Accounts => {
            let accounts = Accounts::fetch(session).await?;
            write_accounts(accounts.as_slice(), format, output)
        }
        Command::Balance => {
            let accounts = Accounts::fetch(session).await?;
            write_balance(
                accounts.solde(),
                &accounts.solde_per_family(),
                format,
                output,
            )
        }
        Command::Iban { account } => {
            let accounts = Accounts::fetch(session).await?;
            let iban = fetch_iban(session, accounts.search(account)?).await?;
            write_iban(&iban, format, output)
        }
        Command::Operations {
            account,
            date_start,
            date_stop,
            count,
            sleep_ms,
        } => {
            let accounts = Accounts::fetch(session).await?;
            let operations = accounts
                .operations(
                    accounts.search(account)?,
                    *date_start,
                    *date_stop,
                    *count,
                    page_delay(*sleep_ms),
                )
                .await?;
            write_operations(&operations, format, output)
        }
        Command::Cards => {
            let cards = Cards::fetch(session).await?;
            write_cards(cards.as_slice(), format, output)
        }
        Command::CardOperations {
            last_digits,
            count,
            sleep_ms,
        } => {
            let cards = Cards::fetch(session).await?;
            let card = cards.search(last_digits)?;
            let accounts = Accounts::fetch(session).await?;
            let operations = cards
                .operations(card, &accounts, *count, page_delay(*sleep_ms))
                .await?;
            write_operations(&operations, format, output)
        }
    }
}
