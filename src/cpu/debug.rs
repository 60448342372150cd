//! Helpers for Debug impls.

use std::fmt;

/// Write a row of hex-formatted bytes, with an extra gap after the eighth.
pub(crate) fn write_row(f: &mut fmt::Formatter<'_>, line: &[u8]) -> fmt::Result {
    for (i, byte) in line.iter().enumerate() {
        match i {
            0 => {}
            8 => write!(f, "  ")?,
            _ => write!(f, " ")?,
        }
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}
