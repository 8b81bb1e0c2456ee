use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use crate::zones::{Slot, Zone, ZoneIndex, ZONE_COUNT, REGISTER_WIDTH};

/// Register data lines look like `(31A2, 0100, 2) # optional comment`.
///
/// The address class restricts matches to the 0x3160..=0x31FF sub-range the
/// GRAS block lives in. The pattern is anchored at the start only; trailing
/// text after the width marker that is not a comment is tolerated and kept
/// as part of the raw line, the same way the consuming tooling treats it.
const LINE_PATTERN: &str = r"^\((31[6-9A-F][0-9A-F]),\s*([0-9A-Fa-f]{4}),\s*2\)\s*(#.*)?";

const HEADER: &str = "Addr=2D";
const BLOCK_OPEN: &str = "WBlock(0, GRAS_Custom) = [";
const BLOCK_CLOSE: &str = "]";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not decode the address token `{1}` on line {2}")]
    DecodeAddress(#[source] std::num::ParseIntError, String, usize),
    #[error("could not decode the value token `{1}` on line {2}")]
    DecodeValue(#[source] std::num::ParseIntError, String, usize),
}

/// One recognized data line of the source file.
#[derive(Clone, Debug)]
pub struct RegisterEntry {
    pub address: u16,
    pub value: u16,
    /// Fixed by the format. Kept for completeness, never user-edited.
    pub width: u16,
    /// Trailing `# ...` text, trimmed of surrounding whitespace.
    pub comment: Option<String>,
    /// The source line with its terminator stripped, otherwise untouched.
    /// Never mutated after parse; the serializer either reuses it verbatim
    /// or regenerates the whole line.
    raw_line: String,
}

impl RegisterEntry {
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }
}

/// A parsed GRAS register dump: the seven-zone parameter model plus enough
/// of the source text to write unchanged values back out byte-for-byte.
///
/// Built wholesale by [`RegisterDocument::parse`], edited through
/// [`RegisterDocument::zone_mut`], written out with
/// [`RegisterDocument::serialize`].
pub struct RegisterDocument {
    zones: [Zone; ZONE_COUNT],
    original_zones: [Zone; ZONE_COUNT],
    entries: BTreeMap<u16, RegisterEntry>,
}

impl RegisterDocument {
    /// Parse a register dump.
    ///
    /// Lines that do not match the data line pattern (headers, prose,
    /// addresses outside the GRAS sub-range) are dropped entirely and will
    /// not reappear on save. Zones with no lines in the input come out
    /// zero-filled. Either the whole text parses or no document is
    /// produced.
    pub fn parse(text: &str) -> Result<RegisterDocument, Error> {
        let pattern = Regex::new(LINE_PATTERN).expect("line pattern is a valid regex");
        let mut zones = [Zone::default(); ZONE_COUNT];
        let mut entries = BTreeMap::new();
        let mut ignored = 0usize;
        for (line_index, line) in text.lines().enumerate() {
            let raw = line.strip_suffix('\r').unwrap_or(line);
            let Some(captures) = pattern.captures(raw.trim()) else {
                ignored += 1;
                continue;
            };
            let line_number = line_index + 1;
            let address_token = &captures[1];
            let address = u16::from_str_radix(address_token, 16)
                .map_err(|e| Error::DecodeAddress(e, address_token.to_string(), line_number))?;
            let value_token = &captures[2];
            let value = u16::from_str_radix(value_token, 16)
                .map_err(|e| Error::DecodeValue(e, value_token.to_string(), line_number))?;
            let comment = captures.get(3).map(|m| m.as_str().trim().to_string());
            entries.insert(
                address,
                RegisterEntry {
                    address,
                    value,
                    width: REGISTER_WIDTH,
                    comment,
                    raw_line: raw.to_string(),
                },
            );
            if let Some((zone, slot)) = ZoneIndex::from_address(address) {
                zones[zone.index()].set(slot, value);
            }
        }
        debug!(message = "parsed register dump", recognized = entries.len(), ignored);
        Ok(RegisterDocument { zones, original_zones: zones, entries })
    }

    /// Write the document back out in the fixed container format.
    ///
    /// Each of the 63 zone slots is emitted in zone-then-field order. A slot
    /// whose value is unchanged since parse reuses its raw source line
    /// byte-for-byte; a changed or previously absent slot gets a freshly
    /// formatted line, carrying over the comment recorded for its address.
    ///
    /// Recognized entries at addresses outside the 63 modeled slots are not
    /// re-emitted. This matches the consuming tooling and is a documented
    /// limitation of the format, not an oversight.
    pub fn serialize(&self) -> String {
        let mut lines = vec![HEADER.to_string(), BLOCK_OPEN.to_string()];
        for zone_index in ZoneIndex::all() {
            let zone = &self.zones[zone_index.index()];
            for slot in Slot::ALL {
                let address = slot.address(zone_index);
                let value = zone.get(slot);
                if let Some(entry) = self.entries.get(&address) {
                    if entry.value == value {
                        lines.push(entry.raw_line.clone());
                        continue;
                    }
                }
                lines.push(match self.comment(address) {
                    Some(comment) => {
                        format!("    ({address:04X}, {value:04X}, {REGISTER_WIDTH}) {comment}")
                    }
                    None => format!("    ({address:04X}, {value:04X}, {REGISTER_WIDTH})"),
                });
            }
        }
        lines.push(BLOCK_CLOSE.to_string());
        lines.join("\n")
    }

    pub fn zone(&self, index: ZoneIndex) -> &Zone {
        &self.zones[index.index()]
    }

    pub fn zone_mut(&mut self, index: ZoneIndex) -> &mut Zone {
        &mut self.zones[index.index()]
    }

    /// The zone parameters as they were at parse time. Serves as the
    /// comparison baseline for curve previews and is never mutated.
    pub fn original_zone(&self, index: ZoneIndex) -> &Zone {
        &self.original_zones[index.index()]
    }

    pub fn zones(&self) -> impl Iterator<Item = (ZoneIndex, &Zone)> {
        ZoneIndex::all().map(|index| (index, &self.zones[index.index()]))
    }

    pub fn entry(&self, address: u16) -> Option<&RegisterEntry> {
        self.entries.get(&address)
    }

    /// The comment recorded for an address at parse time, used when
    /// regenerating the line for a changed value.
    pub fn comment(&self, address: u16) -> Option<&str> {
        self.entries.get(&address).and_then(|entry| entry.comment.as_deref())
    }
}
