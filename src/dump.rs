//! Hex dumps for tracing payloads.

use std::fmt::Write;

use log::Level;

const ROW_LEN: usize = 16;

/// Logs a hex dump of the buffer at trace level.
pub fn trace(buffer: &[u8]) {
    if log_enabled!(Level::Trace) {
        trace!("\n{}", hexdump(buffer));
    }
}

/// Formats a buffer as rows of offset, hex bytes and printable ASCII.
///
/// ```text
/// 0000: 68 65 6c 6c 6f                                  | hello
/// ```
pub fn hexdump(buffer: &[u8]) -> String {
    let mut out = String::new();

    for (i, row) in buffer.chunks(ROW_LEN).enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let _ = write!(out, "{:04x}:", i * ROW_LEN);
        for j in 0 .. ROW_LEN {
            match row.get(j) {
                Some(byte) => {
                    let _ = write!(out, " {:02x}", byte);
                }
                None => out.push_str("   "),
            }
        }

        out.push_str(" | ");
        for byte in row {
            if byte.is_ascii_graphic() || *byte == b' ' {
                out.push(*byte as char);
            } else {
                out.push('.');
            }
        }
    }

    out
}
