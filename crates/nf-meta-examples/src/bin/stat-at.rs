//! Query the status of names relative to an open directory.

use anyhow::{bail, Context, Error};
use gumdrop::Options;
use nf_meta::{nanoseconds, seconds, stat_at, TimestampKind};
use nf_util_time::Timestamp;
use std::fs::File;
use std::os::fd::AsFd;

#[derive(Debug, Options)]
struct CommandOptions {
    /// Print the help message.
    help: bool,

    /// The directory the names are relative to.
    #[options(default = ".")]
    dir: String,

    /// Report symlinks themselves instead of their targets.
    no_follow: bool,

    /// Names to query.
    #[options(free)]
    names: Vec<String>,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = CommandOptions::parse_args_default_or_exit();
    let dir = File::open(&opts.dir).with_context(|| format!("open {}", opts.dir))?;

    let mut failed = 0;
    for name in &opts.names {
        let st = match stat_at(dir.as_fd(), name, !opts.no_follow) {
            Ok(st) => st,
            Err(e) => {
                eprintln!("{}/{name}: {e}", opts.dir);
                failed += 1;
                continue;
            }
        };
        println!("{name}\t{:?}\t{}\t{:o}\t{:x}:{}", st.file_type(), st.size(), st.permissions(), st.dev(), st.ino());
        for (label, kind) in [
            ("atime", TimestampKind::Access),
            ("ctime", TimestampKind::Change),
            ("mtime", TimestampKind::Modification),
        ] {
            let ts = Timestamp::normalized(seconds(&st, kind), nanoseconds(&st, kind));
            println!("\t{label}\t{ts}\t{}", ts.date());
        }
    }
    if failed != 0 {
        bail!("{failed} of {} names failed", opts.names.len());
    }
    Ok(())
}
