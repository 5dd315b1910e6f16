//! Credit Agricole personal banking CLI
//!
//! Command-line interface reading accounts, cards and operations from the
//! personal banking website.
//!
//! # Usage
//!
//! ```bash
//! CA_PIN=123456 ca-particuliers --username 12345678901 --department 75 accounts
//! CA_PIN=123456 ca-particuliers --username 12345678901 --department 75 balance
//! CA_PIN=123456 ca-particuliers --username 12345678901 --department 75 --format json \
//!     operations 00011111111 --date-start 2024-03-01 --count 50
//! ca-particuliers --department 75 --use-mocks-dir tests/fixtures/mock_session regional-bank
//! ```
//!
//! The listing is written to stdout; logs and errors go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid configuration, login refused, endpoint failure, etc.)

use ca_particuliers::{cli, logging};
use std::process;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();
    logging::init(args.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    // Output goes to stdout
    let mut output = std::io::stdout();
    if let Err(e) = runtime.block_on(cli::execute(&args, &mut output)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
