use crate::camera::DeviceInfo;
use crossterm::style::Stylize;
use std::fmt::Display;

/// Top-level report for an error that ended the run.
pub fn fatal(error: &dyn Display) {
    println!("{}", format!("Error: {}", error).red().bold());
}

pub fn device_listing(devices: &[DeviceInfo]) -> String {
    if devices.is_empty() {
        return "No video devices found. Check /dev/video* permissions.".to_string();
    }

    devices
        .iter()
        .map(|d| {
            let capture = if d.can_capture { "" } else { " (no video capture)" };
            let formats = if d.formats.is_empty() {
                "no formats reported".to_string()
            } else {
                d.formats.join(", ")
            };
            format!("/dev/video{}: {}{}\n    {}", d.index, d.card, capture, formats)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
