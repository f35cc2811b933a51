//! Print the message of platform error codes.

use gumdrop::Options;
use nf_meta::{format_error_message, ErrorKind};

#[derive(Debug, Options)]
struct CommandOptions {
    /// Print the help message.
    help: bool,

    /// Also print the error class.
    kind: bool,

    /// Error codes.
    #[options(free)]
    codes: Vec<i32>,
}

fn main() {
    env_logger::init();
    let opts = CommandOptions::parse_args_default_or_exit();
    for code in opts.codes {
        if opts.kind {
            println!("{code}\t{:?}\t{}", ErrorKind::from_code(code), format_error_message(code));
        } else {
            println!("{code}\t{}", format_error_message(code));
        }
    }
}
