//! Human-readable report.

use super::palette::Palette;
use crate::model::{DeviceRecord, Status};
use crate::scan::ScanReport;
use std::fmt::Write;

/// Knobs for the text report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Only print the summary (if requested).
    pub quiet: bool,
    /// Print per-status counts.
    pub summary: bool,
    /// Print sysfs names and PCI addresses too.
    pub verbose: bool,
}

const RULE: &str = "============================================================";

/// Render the report as coloured text.
pub fn render(report: &ScanReport, palette: &Palette, options: &TextOptions) -> String {
    let mut out = String::new();

    if !options.quiet {
        render_controllers(&mut out, report, palette, options);
        render_devices(&mut out, report, palette, options);
    }

    if options.summary {
        render_summary(&mut out, report, palette);
    }

    if !options.quiet {
        render_guide(&mut out, palette);
    }

    out
}

fn render_controllers(out: &mut String, report: &ScanReport, p: &Palette, options: &TextOptions) {
    let _ = writeln!(out, "{}", p.heading("CONTROLLERS"));
    if report.controllers.is_empty() {
        let _ = writeln!(out, "  {}", p.dim("No USB controllers found."));
    }
    for controller in &report.controllers {
        let prefix = if controller.is_cpu_direct {
            p.paint("[CPU]    ", p.good)
        } else {
            p.dim("[Chipset]")
        };
        let _ = write!(out, "  {} {}", prefix, p.value(&controller.display_name()));
        if options.verbose {
            let _ = write!(out, " {}", p.dim(&format!("[{}]", controller.address)));
        }
        out.push('\n');
    }
    out.push('\n');
}

fn render_devices(out: &mut String, report: &ScanReport, p: &Palette, options: &TextOptions) {
    let _ = writeln!(out, "{}", p.heading("DEVICES"));

    if report.devices.is_empty() {
        let _ = writeln!(out, "\n  {}", p.dim("No supported USB devices found."));
    }

    for device in &report.devices {
        out.push('\n');
        render_device(out, device, p, options);
    }
    out.push('\n');
}

fn render_device(out: &mut String, device: &DeviceRecord, p: &Palette, options: &TextOptions) {
    let _ = writeln!(out, "  {}", p.value(&device.name));
    let _ = writeln!(out, "  {}", p.dim(&format!("VID:PID {}", device.vid_pid)));
    if options.verbose {
        let _ = writeln!(out, "  {}", p.dim(&format!("Port: {}", device.sysfs_name)));
    }

    let (color, suffix) = if device.controller.is_cpu_direct {
        (p.good, "(direct to CPU die)")
    } else {
        (p.warn, "(extra latency)")
    };
    let _ = writeln!(
        out,
        "  {} {} {}",
        p.dim("Controller:"),
        p.paint(&device.controller.display_name(), color),
        p.dim(suffix)
    );

    if device.has_hub() {
        let _ = writeln!(
            out,
            "  {} {}",
            p.dim("Hub:"),
            p.paint(&format!("YES - {}", device.hubs.join(", ")), p.warn)
        );
    }

    if let Some(rate) = device.polling_rate_hz {
        let _ = writeln!(out, "  {}", p.dim(&format!("Polling: {rate} Hz")));
    }

    let _ = writeln!(
        out,
        "  {} {}",
        p.dim("Status:"),
        p.status(device.status, &format!("[{}]", device.status))
    );
}

fn render_summary(out: &mut String, report: &ScanReport, p: &Palette) {
    let _ = writeln!(out, "{}", p.heading("Summary:"));
    for status in Status::ALL {
        let label = format!("{}:", status);
        let _ = writeln!(
            out,
            "  {}",
            p.status(status, &format!("{:<12} {}", label, report.counts.get(status)))
        );
    }
    let _ = writeln!(
        out,
        "  {}",
        p.dim(&format!("{:<12} {}", "Total:", report.counts.total()))
    );
    out.push('\n');
}

fn render_guide(out: &mut String, p: &Palette) {
    let _ = writeln!(out, "{}\n", p.paint(RULE, p.header));
    let _ = writeln!(out, "{}", p.heading("STATUS GUIDE:"));
    for status in Status::ALL {
        let tag = format!("{:<14}", format!("[{}]", status));
        let _ = writeln!(out, "  {}{}", p.status(status, &tag), p.dim(status.advice()));
    }
    out.push('\n');
}
