//! Bordered table output, drawn with ratatui into an off-screen buffer.

use crate::model::DeviceRecord;
use crate::scan::ScanReport;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Row, Table, Widget},
};

const TITLE: &str = "USB Devices";
const HEADER: [&str; 6] = ["Name", "VID:PID", "Controller", "Status", "Polling", "Hubs"];
const COLUMN_SPACING: u16 = 1;
const MAX_CONTROLLER_LEN: usize = 40;

/// Shorten long controller names to keep the table narrow.
fn truncate_controller(name: &str) -> String {
    if name.chars().count() > MAX_CONTROLLER_LEN {
        let head: String = name.chars().take(MAX_CONTROLLER_LEN).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Cell texts of one device row, in `HEADER` order.
fn row_texts(device: &DeviceRecord) -> [String; 6] {
    [
        device.name.clone(),
        device.vid_pid.clone(),
        truncate_controller(&device.controller.name),
        device.status.to_string(),
        device
            .polling_rate_hz
            .map(|hz| format!("{hz} Hz"))
            .unwrap_or_else(|| "-".to_string()),
        if device.hubs.is_empty() {
            "-".to_string()
        } else {
            device.hubs.join(", ")
        },
    ]
}

/// Render the device list as a plain bordered table.
pub fn render(report: &ScanReport) -> String {
    let texts: Vec<[String; 6]> = report.devices.iter().map(row_texts).collect();

    let mut widths: Vec<u16> = HEADER.iter().map(|h| Span::raw(*h).width() as u16).collect();
    for row in &texts {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(Span::raw(text.as_str()).width() as u16);
        }
    }

    let rows: Vec<Row> = texts
        .iter()
        .map(|row| Row::new(row.iter().map(String::as_str)))
        .collect();

    let total_width =
        widths.iter().sum::<u16>() + COLUMN_SPACING * (HEADER.len() as u16 - 1) + 2;
    let area = Rect::new(0, 0, total_width, texts.len() as u16 + 3);

    let table = Table::new(rows, widths.iter().map(|w| Constraint::Length(*w)))
        .header(Row::new(HEADER))
        .column_spacing(COLUMN_SPACING)
        .block(Block::bordered().title(TITLE));

    let mut buffer = Buffer::empty(area);
    table.render(area, &mut buffer);
    buffer_to_string(&buffer)
}

/// Serialise a buffer line by line, without trailing blanks.
fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();

    for y in area.top()..area.bottom() {
        let line: String = (area.left()..area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_layout() {
        let out = render(&fixtures::report());
        let lines: Vec<&str> = out.lines().collect();

        // Border, header, two devices, border
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("┌USB Devices"));
        assert!(lines[0].ends_with('┐'));
        assert!(lines[1].starts_with("│Name"));
        for header in HEADER {
            assert!(lines[1].contains(header), "missing column {header}");
        }
        assert!(lines[2].contains("G502 Mouse"));
        assert!(lines[2].contains("AMD Matisse USB 3.0 Host Controller"));
        assert!(lines[2].contains("BEST"));
        assert!(lines[2].contains("1000 Hz"));
        assert!(lines[3].contains("Headset, \"Pro\""));
        assert!(lines[3].contains("CHIPSET+HUB"));
        assert!(lines[3].contains("USB2.0 Hub"));
        assert!(lines[4].starts_with('└'));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let out = render(&ScanReport::default());
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_lines_have_no_trailing_blanks() {
        let out = render(&fixtures::report());
        assert!(out.lines().all(|line| line == line.trim_end()));
    }

    #[test]
    fn test_truncate_controller() {
        assert_eq!(truncate_controller("AMD USB"), "AMD USB");
        let long = "Advanced Micro Devices, Inc. [AMD] Matisse USB 3.0 Host Controller";
        let short = truncate_controller(long);
        assert_eq!(short, "Advanced Micro Devices, Inc. [AMD] Matis...");
        assert_eq!(short.chars().count(), MAX_CONTROLLER_LEN + 3);
    }
}
