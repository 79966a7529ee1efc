//! End-to-end status check against the co-processor.
//!
//! Sends GET_STATUS over the serial link and reports what came back. The
//! reference firmware answers with the UTF-8 string "STATUS: System OK".

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ferrolink_host::{Link, LinkError};
use ferrolink_protocol::command::{CMD_GET_STATUS, RESP_UNKNOWN};
use ferrolink_protocol::HostCommand;

#[derive(Parser)]
#[command(name = "status-check", about = "Query the co-processor's status over the serial link")]
struct Args {
    /// Serial device node, e.g. /dev/ttyS0
    #[arg(long)]
    port: String,

    /// Baud rate
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Response deadline in milliseconds
    #[arg(long, default_value_t = 1_000)]
    timeout_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("status check failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), LinkError> {
    let mut link = Link::open(&args.port, args.baud)?;
    println!("Connected to {} at {} baud", args.port, args.baud);

    let deadline = Duration::from_millis(args.timeout_ms);
    let response = link.request(&HostCommand::GetStatus, deadline)?;

    match response.command_id {
        CMD_GET_STATUS => match std::str::from_utf8(&response.payload) {
            Ok(status) => println!("Status: {status}"),
            Err(_) => println!("Status payload was not UTF-8: {:02X?}", response.payload),
        },
        RESP_UNKNOWN => {
            println!(
                "Firmware rejected the command (unknown id {:02X?})",
                response.payload
            );
        }
        other => {
            println!(
                "Unexpected response id 0x{other:02X} with {} payload bytes",
                response.payload.len()
            );
        }
    }

    Ok(())
}
