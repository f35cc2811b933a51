//! Print an extended attribute of a file.

use anyhow::{anyhow, Context, Error};
use gumdrop::Options;
use nf_meta::{format_error_message, read_xattr, ENOATTR};

#[derive(Debug, Options)]
struct CommandOptions {
    /// Print the help message.
    help: bool,

    /// Read the attribute of a symlink instead of its target.
    no_follow: bool,

    /// Print the value as hex.
    hex: bool,

    /// The file and the attribute name.
    #[options(free)]
    args: Vec<String>,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = CommandOptions::parse_args_default_or_exit();
    let [path, name] = opts.args.as_slice() else {
        return Err(anyhow!("expected a path and an attribute name"));
    };

    let value = read_xattr(path, name, !opts.no_follow)
        .with_context(|| format!("{path}: {name}"))?
        .ok_or_else(|| anyhow!("{path}: {name}: {}", format_error_message(ENOATTR)))?;
    log::debug!("{path}: {name} has {} bytes", value.len());

    if opts.hex {
        let hex: String = value.iter().map(|b| format!("{b:02x}")).collect();
        println!("{hex}");
    } else {
        println!("{}", String::from_utf8_lossy(&value));
    }
    Ok(())
}
