//! Report line checksum verification.

use crate::decoder::leading_int;

/// Token index carrying the device-reported checksum.
const CHECKSUM_INDEX: usize = 15;

/// First token of the checksummed payload span.
const PAYLOAD_START: usize = 2;

/// Verify the checksum a tracker embeds in its report line.
///
/// The line is split on `,`, `*` and `#`. Token 15 is read as a decimal
/// number; tokens 2 through 14, rejoined with commas, are XOR-folded over
/// their character code points. The firmware writes the folded value as hex
/// digits but reads the comparison in decimal, so the computed fold is
/// rendered in hex and re-read as decimal before comparing.
///
/// Malformed lines (too few tokens, digitless checksum field) verify as
/// `false`, never as an error. The fold runs over literal character codes,
/// so changing letter case anywhere in the payload changes the outcome.
pub fn verify(raw: &str) -> bool {
    let tokens: Vec<&str> = raw.trim().split([',', '*', '#']).collect();

    let Some(reported) = tokens.get(CHECKSUM_INDEX).copied().and_then(leading_int) else {
        return false;
    };

    let payload = tokens[PAYLOAD_START..CHECKSUM_INDEX].join(",");
    let folded = payload.chars().fold(0u32, |sum, c| sum ^ c as u32);

    leading_int(&format!("{folded:x}")) == Some(reported)
}
