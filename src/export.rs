use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::player::{Player, count_or_zero, display_decimal, display_percent};
use crate::position::category_label;
use crate::roster::{RosterState, grouped_by_category};

pub const EXPORT_FILE_NAME: &str = "world-cup-roster.txt";
pub const WORKBOOK_FILE_NAME: &str = "world-cup-roster.xlsx";

pub fn export_line(player: &Player) -> String {
    format!("{} ({})", player.full_name, player.position_code())
}

/// One `"<name> (<position>)"` line per player, in grouped order, joined with
/// `\n` and no trailing newline. Shared by file download and clipboard copy.
pub fn export_roster(squad: &[Player]) -> String {
    grouped_by_category(squad)
        .iter()
        .flat_map(|group| group.players.iter().map(|p| export_line(p)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits an export line back into name and position code.
pub fn parse_export_line(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix(')')?;
    let open = line.rfind(" (")?;
    Some((&line[..open], &line[open + 2..]))
}

pub fn write_text_export(dir: &Path, squad: &[Player]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create export dir {}", dir.display()))?;
    let path = dir.join(EXPORT_FILE_NAME);
    let tmp = path.with_extension("txt.tmp");
    fs::write(&tmp, export_roster(squad)).context("write roster export")?;
    fs::rename(&tmp, &path).context("swap roster export")?;
    Ok(path)
}

/// OSC 52 escape sequence that asks the terminal to put the export text on
/// the system clipboard.
pub fn clipboard_sequence(squad: &[Player]) -> String {
    let payload = STANDARD.encode(export_roster(squad));
    format!("\x1b]52;c;{payload}\x07")
}

/// Writes the grouped roster to a workbook. Returns the number of player rows.
pub fn export_roster_workbook(path: &Path, state: &RosterState) -> Result<usize> {
    let mut rows = vec![vec![
        "Category".to_string(),
        "Player".to_string(),
        "Position".to_string(),
        "Starter".to_string(),
        "Apps".to_string(),
        "Goals".to_string(),
        "Assists".to_string(),
        "Rating".to_string(),
        "Pass %".to_string(),
    ]];
    for group in grouped_by_category(state.squad()) {
        for player in group.players {
            rows.push(vec![
                category_label(group.category).to_string(),
                player.full_name.clone(),
                player.position_code().to_string(),
                if state.is_starter(player.id) { "Yes" } else { "No" }.to_string(),
                count_or_zero(player.stats.matches_played).to_string(),
                count_or_zero(player.stats.total_goals).to_string(),
                count_or_zero(player.stats.total_assists).to_string(),
                display_decimal(player.stats.avg_match_rating, 1),
                display_percent(player.stats.pass_completion_pct),
            ]);
        }
    }

    let summary = state.summary();
    let mut summary_rows = vec![vec!["Category".to_string(), "Players".to_string()]];
    for (category, count) in &summary.counts {
        summary_rows.push(vec![category_label(*category).to_string(), count.to_string()]);
    }
    summary_rows.push(vec!["Total".to_string(), summary.total.to_string()]);
    summary_rows.push(vec!["Starters".to_string(), summary.starters.to_string()]);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Roster")?;
        write_rows(sheet, &rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(rows.len().saturating_sub(1))
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_export_line_splits_on_last_paren() {
        assert_eq!(
            parse_export_line("Tim Weah (RW)"),
            Some(("Tim Weah", "RW"))
        );
        assert_eq!(
            parse_export_line("Gio (Jr.) Reyna (AM)"),
            Some(("Gio (Jr.) Reyna", "AM"))
        );
        assert_eq!(parse_export_line("no position"), None);
    }

    #[test]
    fn clipboard_payload_is_export_text() {
        let squad = vec![Player::new(1, "Matt Turner", Some("GK"))];
        let seq = clipboard_sequence(&squad);
        let encoded = seq
            .strip_prefix("\x1b]52;c;")
            .and_then(|s| s.strip_suffix('\x07'))
            .unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), export_roster(&squad));
    }
}
