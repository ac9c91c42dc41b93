//! CSV report.

use crate::scan::ScanReport;

const HEADER: [&str; 7] = [
    "Name",
    "VID:PID",
    "Controller",
    "Controller Type",
    "Status",
    "Hubs",
    "Polling Rate (Hz)",
];

/// Render one CSV row, quoting fields that need it.
fn row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Quote a field containing separators, quotes or line breaks (RFC 4180).
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the device list as CSV.
pub fn render(report: &ScanReport) -> String {
    let mut out = row(&HEADER);
    for device in &report.devices {
        out.push_str(&row(&[
            device.name.clone(),
            device.vid_pid.clone(),
            device.controller.name.clone(),
            device.controller.kind().to_string(),
            device.status.to_string(),
            device.hubs.join(", "),
            device
                .polling_rate_hz
                .map(|r| r.to_string())
                .unwrap_or_default(),
        ]));
    }
    out
}

/// `error,message` header and a single error row.
pub fn render_error(message: &str) -> String {
    let mut out = row(&["error", "message"]);
    out.push_str(&format!("1,\"{}\"\n", message.replace('"', "\"\"")));
    out
}
