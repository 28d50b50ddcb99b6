//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use insdraw_draw::DrawSettings;
use insdraw_protocol::Canvas;

#[derive(Debug, Parser)]
#[command(name = "insdraw", version, about = "Trace an image and draw it on an Android device")]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// adb executable, overriding the config file.
    #[arg(long, global = true)]
    pub adb: Option<PathBuf>,

    /// Target device serial; the first ready device when omitted.
    #[arg(short, long, global = true)]
    pub serial: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List ready devices.
    Devices {
        /// Keep polling until a device shows up.
        #[arg(long)]
        watch: bool,
    },
    /// Show the target device's model and screen size.
    Info,
    /// Restart the adb server.
    RestartServer,
    /// Save the line mask an image would be drawn from.
    Preview {
        image: PathBuf,
        #[arg(short, long, default_value = "preview.png")]
        out: PathBuf,
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Compute the touch commands for an image without drawing.
    Plan {
        image: PathBuf,
        /// Write the plan as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write one `input ...` shell line per command.
        #[arg(long)]
        commands: Option<PathBuf>,
        /// Render the commands to a PNG.
        #[arg(long)]
        render: Option<PathBuf>,
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Draw an image on the device.
    Draw {
        image: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
}

/// Canvas for offline commands.
#[derive(Debug, Args)]
pub struct Target {
    /// Canvas size as WIDTHxHEIGHT instead of the device screen size.
    #[arg(long, value_parser = parse_canvas)]
    pub size: Option<Canvas>,
}

/// Per-run overrides of the `[draw]` config table.
#[derive(Debug, Default, Args)]
pub struct Tuning {
    /// Smoothing radius (0 disables).
    #[arg(long)]
    pub blur: Option<u32>,
    /// Keep every n-th contour point.
    #[arg(long)]
    pub step: Option<usize>,
    /// Duration of one swipe segment in milliseconds.
    #[arg(long)]
    pub segment_ms: Option<u32>,
    /// Pause between streamed commands in milliseconds.
    #[arg(long)]
    pub send_delay_ms: Option<u64>,
    /// Ignore contours enclosing less area (px²).
    #[arg(long)]
    pub min_area: Option<f64>,
    /// Commands per chunked invocation.
    #[arg(long)]
    pub chunk_size: Option<usize>,
    /// Threshold dark pixels instead of detecting edges.
    #[arg(long)]
    pub no_canny: bool,
    /// Keep strokes at their original width.
    #[arg(long)]
    pub no_thin: bool,
}

impl Tuning {
    /// Applies the overrides on top of `base`.
    pub fn apply(&self, base: &DrawSettings) -> DrawSettings {
        let mut s = base.clone();
        if let Some(v) = self.blur {
            s.blur = v;
        }
        if let Some(v) = self.step {
            s.sample_stride = v;
        }
        if let Some(v) = self.segment_ms {
            s.segment_ms = v;
        }
        if let Some(v) = self.send_delay_ms {
            s.send_delay_ms = v;
        }
        if let Some(v) = self.min_area {
            s.min_area = v;
        }
        if let Some(v) = self.chunk_size {
            s.chunk_size = v;
        }
        if self.no_canny {
            s.use_canny = false;
        }
        if self.no_thin {
            s.thin = false;
        }
        s
    }
}

fn parse_canvas(s: &str) -> Result<Canvas, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("invalid width '{w}'"))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("invalid height '{h}'"))?;
    let canvas = Canvas::new(w, h);
    if canvas.is_empty() {
        return Err("canvas must not be empty".into());
    }
    Ok(canvas)
}
