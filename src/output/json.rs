//! JSON report.

use crate::model::{ControllerInfo, DeviceRecord, Status, StatusCounts};
use crate::scan::ScanReport;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    controllers: Vec<JsonController<'a>>,
    devices: Vec<JsonDevice<'a>>,
    summary: JsonSummary,
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonController<'a> {
    address: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct JsonDevice<'a> {
    name: &'a str,
    vid_pid: &'a str,
    controller: &'a str,
    controller_type: &'static str,
    status: Status,
    hubs: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    polling_rate_hz: Option<u32>,
}

#[derive(Serialize)]
struct JsonSummary {
    #[serde(flatten)]
    counts: StatusCounts,
    total: usize,
}

#[derive(Serialize)]
struct JsonError<'a> {
    error: &'a str,
}

impl<'a> From<&'a ControllerInfo> for JsonController<'a> {
    fn from(c: &'a ControllerInfo) -> Self {
        Self {
            address: c.address.as_str(),
            name: &c.name,
            label: c.label.as_deref(),
            kind: c.kind(),
        }
    }
}

impl<'a> From<&'a DeviceRecord> for JsonDevice<'a> {
    fn from(d: &'a DeviceRecord) -> Self {
        Self {
            name: &d.name,
            vid_pid: &d.vid_pid,
            controller: &d.controller.name,
            controller_type: d.controller.kind(),
            status: d.status,
            hubs: &d.hubs,
            polling_rate_hz: d.polling_rate_hz,
        }
    }
}

/// Render the report as pretty-printed JSON.
pub fn render(report: &ScanReport) -> String {
    let doc = JsonReport {
        controllers: report.controllers.iter().map(JsonController::from).collect(),
        devices: report.devices.iter().map(JsonDevice::from).collect(),
        summary: JsonSummary {
            counts: report.counts,
            total: report.counts.total(),
        },
        error: None,
    };
    to_json(&doc)
}

/// `{"error": "<message>"}`.
pub fn render_error(message: &str) -> String {
    to_json(&JsonError { error: message })
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Plain structs of strings and numbers always serialize
    let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
    out.push('\n');
    out
}
