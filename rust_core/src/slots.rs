//! Slot-list parsing for lobby setup.
//!
//! Organizers paste team lists as free text, one team per line, usually
//! numbered (`1. Alpha`, `2) Bravo`, `3- Charlie`, `4: Delta`). Explicit
//! numbers always win: in a mixed paste the unnumbered lines are dropped,
//! never guessed. Only a paste with no numbered lines at all falls back to
//! sequential numbering in paste order.

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub slot_no: u32,
    pub team_name: String,
}

/// Parse a pasted team list into slot entries.
///
/// When any line carries an explicit slot number, only the numbered lines
/// are kept. Otherwise every line is numbered by its position in the
/// paste, 1-based, with blank lines still consuming their position.
pub fn parse_slot_list(text: &str) -> Vec<SlotEntry> {
    let re = Regex::new(r"^(\d+)[.)\-:]\s*(.+)$").ok();
    let mut entries: Vec<SlotEntry> = Vec::new();
    if let Some(re) = &re {
        for line in text.lines() {
            let numbered = re.captures(line.trim()).and_then(|caps| {
                let slot_no = caps.get(1)?.as_str().parse().ok()?;
                let team_name = caps.get(2)?.as_str().trim().to_string();
                Some(SlotEntry { slot_no, team_name })
            });
            if let Some(entry) = numbered {
                entries.push(entry);
            }
        }
    }
    if entries.is_empty() {
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(SlotEntry {
                slot_no: idx as u32 + 1,
                team_name: line.to_string(),
            });
        }
    }
    entries
}

/// Highest slot number in the list, which doubles as the lobby's team
/// capacity. Zero for an empty list.
pub fn max_slot(entries: &[SlotEntry]) -> u32 {
    entries.iter().map(|e| e.slot_no).max().unwrap_or(0)
}
