use std::io::{self, Write};

use flexi_logger::DeferredNow;
use log::{Level, Record};

/// Plain message for `info`, `level: message` for everything else.
pub fn cli_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    match record.level() {
        Level::Info => write!(w, "{}", record.args()),
        level => write!(
            w,
            "{}: {}",
            level.as_str().to_ascii_lowercase(),
            record.args()
        ),
    }
}
