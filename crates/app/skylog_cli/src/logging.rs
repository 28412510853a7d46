pub mod formats;

use flexi_logger::Logger;

use crate::Result;

/// Log to stdout; `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<()> {
    Logger::try_with_env_or_str("info")?
        .format(formats::cli_format)
        .log_to_stdout()
        .start()?;

    Ok(())
}
