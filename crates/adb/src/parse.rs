//! Parsers for adb command output.

use insdraw_protocol::Canvas;

/// Serials listed by `adb devices` whose state is `device` (ready).
///
/// Devices in other states (`offline`, `unauthorized`, ...) are skipped.
pub fn parse_devices(output: &str) -> Vec<String> {
    output
        .lines()
        .skip_while(|l| !l.starts_with("List of devices"))
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let serial = cols.next()?;
            (cols.next() == Some("device")).then(|| serial.to_string())
        })
        .collect()
}

/// Display resolution from `wm size` (`Physical size: 1080x2400`).
pub fn parse_screen_size(output: &str) -> Option<Canvas> {
    let line = output.lines().find(|l| l.contains("Physical size:"))?;
    let dims = line.split("Physical size:").nth(1)?.trim();
    let (w, h) = dims.split_once('x')?;
    let canvas = Canvas::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
    (!canvas.is_empty()).then_some(canvas)
}

/// Model name from `getprop ro.product.model`; blank output is absent.
pub fn parse_model(output: &str) -> Option<String> {
    let model = output.trim();
    (!model.is_empty()).then(|| model.to_string())
}
