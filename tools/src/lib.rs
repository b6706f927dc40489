//! Inspection and maintenance tools for turn files.
//!
//! This crate provides utilities for looking inside turn files and for
//! rewriting them in canonical form:
//!
//! - Summarize header, commands, trailers and attachments
//! - Verify the stored turn checksum
//! - Normalize (re-sort and rebuild) a turn
//! - Add or remove Taccom attachments
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;

use codec::{
    decode_registration_line, Charset, Latin1Charset, Limits, ParseMode, TurnFile, TurnResult,
};
use serde::Serialize;
use wire::{TurnHeader, WindowsTrailer};

/// Summary of a parsed turn file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub header: TurnHeader,
    pub timestamp: Option<String>,
    pub file_len: usize,
    pub winplan: bool,
    pub taccom: bool,
    pub version: u8,
    pub windows_trailer: Option<WindowsTrailer>,
    /// Turn number recovered from the Windows trailer.
    pub turn_nr: Option<u16>,
    pub stored_checksum: u32,
    pub computed_checksum: u32,
    pub registration: Vec<String>,
    pub commands: Vec<CommandReport>,
    pub files: Vec<FileReport>,
}

impl TurnReport {
    /// Returns `true` if the stored checksum matches the turn body.
    #[must_use]
    pub const fn checksum_ok(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }
}

/// One command record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReport {
    pub index: usize,
    pub code: u16,
    pub name: &'static str,
    pub kind: String,
    pub id: u16,
    pub position: usize,
    /// Record length including the code and id; `None` if undefined.
    pub length: Option<usize>,
}

/// One Taccom attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub slot: usize,
    pub name: String,
    pub size: usize,
    pub address: Option<u32>,
}

/// Parses `bytes` and summarizes the turn.
pub fn inspect_turn(bytes: &[u8], limits: &Limits) -> TurnResult<TurnReport> {
    let turn = TurnFile::from_bytes(bytes, ParseMode::Full, limits)?;

    let commands = (0..turn.num_commands())
        .map(|index| CommandReport {
            index,
            code: turn.command_code(index).unwrap_or_default(),
            name: turn.command_name(index).unwrap_or_default(),
            kind: turn
                .command_type(index)
                .map(|kind| format!("{kind:?}"))
                .unwrap_or_default(),
            id: turn.command_id(index).unwrap_or_default(),
            position: turn.command_position(index).unwrap_or_default(),
            length: turn.command_length(index),
        })
        .collect();

    let files = (0..wire::TACCOM_MAX_FILES)
        .filter_map(|slot| {
            let name = turn.file_name(slot)?;
            let data = turn.file_data(slot)?;
            Some(FileReport {
                slot,
                name: String::from_utf8_lossy(name).into_owned(),
                size: data.len(),
                address: turn.file_placement(slot).map(|(address, _)| address),
            })
        })
        .collect();

    let registration = turn.windows_trailer().map_or_else(Vec::new, |trailer| {
        (0..wire::REG_STRING_COUNT)
            .map(|slot| decode_registration_line(trailer, slot, &Latin1Charset))
            .collect()
    });

    let turn_nr = turn.try_get_turn_nr();
    Ok(TurnReport {
        header: *turn.header(),
        timestamp: turn.timestamp().as_text().map(str::to_string),
        file_len: bytes.len(),
        winplan: turn.features().has_winplan(),
        taccom: turn.features().has_taccom(),
        version: turn.version(),
        windows_trailer: turn.windows_trailer().copied(),
        turn_nr: (turn_nr != 0).then_some(turn_nr),
        stored_checksum: turn.dos_trailer().checksum,
        computed_checksum: turn.compute_turn_checksum(),
        registration,
        commands,
        files,
    })
}

/// Formats a report for terminal output.
#[must_use]
pub fn format_report_pretty(report: &TurnReport) -> String {
    let mut out = String::new();
    let header = &report.header;
    let _ = writeln!(
        out,
        "player: {} timestamp: {} commands: {}",
        header.player_id,
        report.timestamp.as_deref().unwrap_or("<binary>"),
        header.num_commands
    );
    let _ = writeln!(
        out,
        "checksum: 0x{:08x} ({})",
        report.stored_checksum,
        if report.checksum_ok() {
            "ok".to_string()
        } else {
            format!("expected 0x{:08x}", report.computed_checksum)
        }
    );
    let mut features = Vec::new();
    if report.winplan {
        features.push(format!("winplan v{}", report.version));
    }
    if report.taccom {
        features.push("taccom".to_string());
    }
    if !features.is_empty() {
        let _ = writeln!(out, "features: {}", features.join(", "));
    }
    if let Some(turn_nr) = report.turn_nr {
        let _ = writeln!(out, "turn: {turn_nr}");
    }
    for line in report.registration.iter().filter(|line| !line.is_empty()) {
        let _ = writeln!(out, "registered: {line}");
    }
    if !report.commands.is_empty() {
        let _ = writeln!(out, "commands:");
    }
    for cmd in &report.commands {
        let name = if cmd.name.is_empty() { "?" } else { cmd.name };
        let length = cmd
            .length
            .map_or_else(|| "undefined".to_string(), |len| format!("{len} bytes"));
        let _ = writeln!(
            out,
            "  #{:<3} {:>2} {:<24} id {:<5} @{} ({length})",
            cmd.index, cmd.code, name, cmd.id, cmd.position
        );
    }
    if !report.files.is_empty() {
        let _ = writeln!(out, "attachments:");
    }
    for file in &report.files {
        let _ = writeln!(out, "  [{}] {} ({} bytes)", file.slot, file.name, file.size);
    }
    out
}

/// Re-sorts and rebuilds a turn, returning the new file bytes.
pub fn normalize_turn(bytes: &[u8], limits: &Limits, sort: bool) -> TurnResult<Vec<u8>> {
    let mut turn = TurnFile::from_bytes(bytes, ParseMode::Full, limits)?;
    if sort {
        turn.sort_commands()?;
    }
    turn.update()?;
    turn.to_bytes()
}

/// Adds an attachment to a turn, returning the new file bytes and slot.
pub fn attach_file(
    bytes: &[u8],
    name: &str,
    data: &[u8],
    limits: &Limits,
) -> TurnResult<(Vec<u8>, usize)> {
    let mut turn = TurnFile::from_bytes(bytes, ParseMode::Full, limits)?;
    let slot = turn.add_file(data, &Latin1Charset.encode(name))?;
    turn.update()?;
    Ok((turn.to_bytes()?, slot))
}

/// Removes the attachment in `slot`, returning the new file bytes.
pub fn detach_file(bytes: &[u8], slot: usize, limits: &Limits) -> TurnResult<Vec<u8>> {
    let mut turn = TurnFile::from_bytes(bytes, ParseMode::Full, limits)?;
    turn.remove_file(slot)?;
    turn.update()?;
    turn.to_bytes()
}
