//! Terminal display and UI rendering
//!
//! Features:
//! - Current sentence and typed answer
//! - Correct / incorrect feedback with the expected translation
//! - Previous-sentence banner and session stats
//! - Full performance table on demand

use crate::ledger::LedgerRow;
use crate::session::{Feedback, Phase, SessionSummary};
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Result as IoResult, Write};

/// First screen row of the performance table
pub const TABLE_ROW: u16 = 12;

/// Terminal display manager
pub struct Display {
    /// Whether raw mode must be released on shutdown
    raw_mode: bool,
}

impl Display {
    /// Display for an interactive session (raw mode owned by the caller)
    pub fn interactive() -> Self {
        Display { raw_mode: true }
    }

    /// Clear screen
    pub fn clear(&self) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    /// Render the sentence to translate
    pub fn show_sentence(&self, source_text: &str) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::Cyan),
            Print("Portuguese: "),
            ResetColor,
            Print(source_text),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show the answer typed so far
    pub fn show_input(&self, answer: &str) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 3),
            SetForegroundColor(Color::Yellow),
            Print("English: "),
            ResetColor,
            Print(answer),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Green for correct; red plus the expected translation otherwise
    pub fn show_feedback(&self, feedback: &Feedback) -> IoResult<()> {
        let mut stdout = stdout();
        match feedback {
            Feedback::Correct => execute!(
                stdout,
                cursor::MoveTo(0, 5),
                SetForegroundColor(Color::Green),
                Print("✅ Correct!"),
                ResetColor,
            )?,
            Feedback::Incorrect { expected } => execute!(
                stdout,
                cursor::MoveTo(0, 5),
                SetForegroundColor(Color::Red),
                Print("❌ Incorrect."),
                ResetColor,
                cursor::MoveTo(0, 6),
                Print("Correct answer: "),
                SetForegroundColor(Color::Green),
                Print(expected),
                ResetColor,
            )?,
        }
        stdout.flush()?;
        Ok(())
    }

    /// Banner naming the sentence that was just checked
    pub fn show_previous(&self, source_text: &str) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 7),
            SetForegroundColor(Color::DarkGrey),
            Print("Previous sentence: "),
            ResetColor,
            Print(source_text),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Running session totals
    pub fn show_progress(&self, summary: &SessionSummary) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 9),
            SetForegroundColor(Color::Magenta),
            Print("Session: "),
            ResetColor,
            Print(format!("{}/{} correct  |  ", summary.correct, summary.checks)),
            SetForegroundColor(accuracy_color(summary.accuracy)),
            Print(format!("{:.0}%", summary.accuracy * 100.0)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Key bindings for the current phase
    pub fn show_help(&self, phase: Phase) -> IoResult<()> {
        let mut stdout = stdout();
        let enter = match phase {
            Phase::AwaitingAnswer => "ENTER check",
            Phase::Checked => "ENTER next sentence",
        };
        execute!(
            stdout,
            cursor::MoveTo(0, 10),
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "{enter}  |  TAB skip  |  Ctrl+L table  |  Ctrl+R reload  |  Esc exit"
            )),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Draw pre-rendered table lines from `TABLE_ROW` down
    pub fn show_table(&self, lines: &[String]) -> IoResult<()> {
        let mut stdout = stdout();
        for (offset, line) in lines.iter().enumerate() {
            let row = TABLE_ROW.saturating_add(offset as u16);
            let color = if offset < 2 { Color::Blue } else { Color::Reset };
            execute!(
                stdout,
                cursor::MoveTo(0, row),
                SetForegroundColor(color),
                Print(line),
                ResetColor
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&mut self) -> IoResult<()> {
        if self.raw_mode {
            terminal::disable_raw_mode()?;
            self.raw_mode = false;
        }
        let mut stdout = stdout();
        execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(ClearType::All))?;
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
        }
    }
}

fn accuracy_color(accuracy: f64) -> Color {
    if accuracy > 0.9 {
        Color::Green
    } else if accuracy > 0.7 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Render the performance table as aligned text lines: header, rule, rows
pub fn table_lines(rows: &[LedgerRow<'_>]) -> Vec<String> {
    const HEADERS: [&str; 5] = ["Portuguese", "English", "Right", "Wrong", "Accuracy"];

    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.source_text.to_string(),
                r.target_text.to_string(),
                r.successes.to_string(),
                r.failures.to_string(),
                format!("{:.1}%", r.percentage),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let join = |row: [&str; 5]| {
        row.iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                // Text columns align left, numbers right
                if col < 2 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(join(HEADERS));
    lines.push("─".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    for row in &cells {
        lines.push(join([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
        ]));
    }
    lines
}
