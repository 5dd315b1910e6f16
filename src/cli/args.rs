use crate::config::ClientConfig;
use crate::core::authenticator::Credentials;
use crate::core::pagination::{bank_today, DateWindow, DEFAULT_MAX_COUNT};
use crate::io::OutputFormat;
use crate::transport::mock::DEFAULT_MOCK_SUFFIX;
use crate::transport::MockConfig;
use crate::types::BankError;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Read accounts, cards and operations from the Credit Agricole private area
#[derive(Parser, Debug)]
#[command(name = "ca-particuliers")]
#[command(about = "Read-only client for the Credit Agricole personal banking website", long_about = None)]
pub struct CliArgs {
    /// Customer number used to log in
    #[arg(long, value_name = "NUMBER", help = "Customer number (11 digits)")]
    pub username: Option<String>,

    /// Department of the regional bank holding the account
    #[arg(long, value_name = "CODE", help = "Department code, e.g. 75 or 2A")]
    pub department: String,

    /// Six digit PIN
    #[arg(
        long,
        env = "CA_PIN",
        hide_env_values = true,
        value_name = "DIGITS",
        help = "Login PIN (prefer the CA_PIN environment variable)"
    )]
    pub pin: Option<String>,

    /// Client configuration file
    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Replay fixtures from this directory instead of reaching the website
    #[arg(long = "use-mocks-dir", value_name = "DIR")]
    pub use_mocks_dir: Option<PathBuf>,

    /// Record every successful response into this directory
    #[arg(long = "write-mocks-dir", value_name = "DIR")]
    pub write_mocks_dir: Option<PathBuf>,

    #[arg(long = "use-mock-suffix", value_name = "SUFFIX", default_value = DEFAULT_MOCK_SUFFIX)]
    pub use_mock_suffix: String,

    #[arg(long = "write-mock-suffix", value_name = "SUFFIX", default_value = DEFAULT_MOCK_SUFFIX)]
    pub write_mock_suffix: String,

    /// Output format of the listing
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// What to read
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the regional bank serving the department (no login)
    RegionalBank,

    /// List accounts of every product family
    Accounts,

    /// Total balance and balance per product family
    Balance,

    /// IBAN of an account
    Iban {
        /// Account number
        account: String,
    },

    /// Operations of an account
    Operations {
        /// Account number
        account: String,

        /// First day (YYYY-MM-DD), defaults to 30 days before the last day
        #[arg(long, value_name = "DATE")]
        date_start: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(long, value_name = "DATE")]
        date_stop: Option<NaiveDate>,

        /// Maximum number of operations
        #[arg(long, default_value_t = DEFAULT_MAX_COUNT)]
        count: usize,

        /// Pause between two pages, in milliseconds
        #[arg(long, value_name = "MS")]
        sleep_ms: Option<u64>,
    },

    /// List payment cards
    Cards,

    /// Deferred operations of a card
    CardOperations {
        /// Last digits of the card number
        last_digits: String,

        /// Maximum number of operations
        #[arg(long, default_value_t = DEFAULT_MAX_COUNT)]
        count: usize,

        /// Pause between two pages, in milliseconds
        #[arg(long, value_name = "MS")]
        sleep_ms: Option<u64>,
    },
}

impl Command {
    /// Whether the command needs a logged-in session
    pub fn needs_session(&self) -> bool {
        !matches!(self, Command::RegionalBank)
    }

    /// Reject arguments that would fail after login
    pub fn validate(&self) -> Result<(), BankError> {
        if let Command::Operations {
            date_start,
            date_stop,
            ..
        } = self
        {
            DateWindow::resolve(*date_start, *date_stop, bank_today())?;
        }
        Ok(())
    }
}

/// Delay between pages for a `--sleep-ms` value
pub fn page_delay(sleep_ms: Option<u64>) -> Option<Duration> {
    sleep_ms.filter(|&ms| ms > 0).map(Duration::from_millis)
}

impl CliArgs {
    /// Load the configuration file, or the defaults when none is given
    pub fn client_config(&self) -> Result<ClientConfig, BankError> {
        let config = match &self.config {
            Some(path) => ClientConfig::from_toml_file(path)?,
            None => ClientConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fixture replay and recording settings
    pub fn mock_config(&self) -> MockConfig {
        MockConfig {
            use_dir: self.use_mocks_dir.clone(),
            write_dir: self.write_mocks_dir.clone(),
            use_suffix: self.use_mock_suffix.clone(),
            write_suffix: self.write_mock_suffix.clone(),
        }
    }

    /// Login credentials
    ///
    /// # Errors
    ///
    /// A configuration error if the username or PIN is missing, or the PIN
    /// is not made of digits.
    pub fn credentials(&self) -> Result<Credentials, BankError> {
        let username = self
            .username
            .as_deref()
            .ok_or_else(|| BankError::config("--username is required for this command"))?;
        let pin = self
            .pin
            .as_deref()
            .ok_or_else(|| BankError::config("a PIN is required (--pin or CA_PIN)"))?;
        Credentials::from_pin_str(username, pin, self.department.as_str())
    }
}
