mod args;
mod checksum;
mod connector;
mod destuff;
mod frame;
mod list;
mod listen;
mod message;
mod pdu;
mod protocol;
mod request;
mod run;
mod serial;

use tracing::Level;

fn main() -> Result<(), String> {
    let args: args::TopLevel = argh::from_env();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();
    run::run(args.invocation)
}
