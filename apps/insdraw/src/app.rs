//! Command handlers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use insdraw_adb::AdbClient;
use insdraw_delivery::AdbShellTransport;
use insdraw_draw::{
    DeviceQuery, DeviceSnapshot, DeviceWatcher, DrawError, DrawEvent, DrawOrchestrator, DrawSettings,
};
use insdraw_imaging::{render_plan, render_preview};
use insdraw_protocol::{Canvas, shell_line};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::config::Config;

/// Exit code for an error that ended a command: the run's own code when a
/// [`DrawError`] caused it, a generic failure otherwise.
pub fn failure_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DrawError>())
        .map_or(1, DrawError::exit_code)
}

/// Runs the selected command and returns the process return code.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<i32> {
    let program = cli
        .adb
        .clone()
        .unwrap_or_else(|| config.adb_path.clone().into());
    let client = AdbClient::with_program(program)
        .with_query_timeout(Duration::from_secs(config.query_timeout_secs));

    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone());

    match cli.command {
        Command::Devices { watch } => devices(&client, watch, &cancel).await,
        Command::Info => {
            let serial = resolve_serial(&client, cli.serial, &config, &cancel).await?;
            let snap = DeviceSnapshot::read(&client, &serial).await;
            println!("serial: {}", snap.serial);
            println!("model:  {}", snap.model.as_deref().unwrap_or("unknown"));
            match snap.canvas {
                Some(canvas) => println!("screen: {canvas}"),
                None => println!("screen: unknown"),
            }
            Ok(0)
        }
        Command::RestartServer => {
            if DeviceQuery::restart_server(&client).await {
                println!("adb server restarted");
                Ok(0)
            } else {
                bail!("failed to restart adb server");
            }
        }
        Command::Preview {
            image,
            out,
            target,
            tuning,
        } => {
            let settings = tuning.apply(&config.draw);
            let canvas = resolve_canvas(&client, target.size, cli.serial, &config, &cancel).await?;
            let mask = blocking(move || insdraw_draw::line_mask(&image, canvas, &settings)).await?;
            render_preview(&mask)
                .save(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), foreground = mask.foreground_pixels(), "preview saved");
            Ok(0)
        }
        Command::Plan {
            image,
            json,
            commands,
            render,
            target,
            tuning,
        } => {
            let settings = tuning.apply(&config.draw);
            let canvas = resolve_canvas(&client, target.size, cli.serial, &config, &cancel).await?;
            let delivery = settings.delivery_config();
            let plan = blocking(move || insdraw_draw::plan_image(&image, canvas, &settings)).await?;

            println!(
                "{} contours, {} commands ({} taps, {} swipes), ~{:.1}s to stream",
                plan.contours,
                plan.len(),
                plan.taps,
                plan.swipes,
                plan.estimated_duration(delivery.send_delay).as_secs_f64()
            );
            if let Some(path) = json {
                write_file(&path, serde_json::to_string_pretty(&plan)?)?;
            }
            if let Some(path) = commands {
                let lines: Vec<String> = plan.primitives.iter().map(shell_line).collect();
                write_file(&path, lines.join("\n") + "\n")?;
            }
            if let Some(path) = render {
                render_plan(canvas, &plan.primitives)
                    .save(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            Ok(0)
        }
        Command::Draw { image, tuning } => {
            let settings = tuning.apply(&config.draw);
            let serial = resolve_serial(&client, cli.serial, &config, &cancel).await?;
            draw(client, &serial, &image, settings, cancel).await
        }
    }
}

async fn devices(client: &AdbClient, watch: bool, cancel: &CancellationToken) -> anyhow::Result<i32> {
    let devices = if watch {
        let query: Arc<dyn DeviceQuery> = Arc::new(client.clone());
        let found = DeviceWatcher::new(query)
            .wait_for_device(cancel, |list| {
                if list.is_empty() {
                    info!("waiting for device...");
                }
            })
            .await;
        match found {
            Some(list) => list,
            None => return Ok(insdraw_protocol::constants::CANCELLED_EXIT_CODE),
        }
    } else {
        DeviceQuery::devices(client).await
    };

    if devices.is_empty() {
        if !client.is_available().await {
            warn!(adb = %client.program().display(), "adb executable not available");
        }
        println!("no devices");
        return Ok(1);
    }
    for serial in devices {
        println!("{serial}");
    }
    Ok(0)
}

async fn draw(
    client: AdbClient,
    serial: &str,
    image: &Path,
    settings: DrawSettings,
    cancel: CancellationToken,
) -> anyhow::Result<i32> {
    let transport = Arc::new(AdbShellTransport::new(client.clone()));
    let mut orch = DrawOrchestrator::new(Arc::new(client), transport, settings);
    let mut events = orch.take_events().context("event receiver already taken")?;

    // Forward Ctrl-C to the orchestrator.
    let run_cancel = orch.cancel_token();
    let forward = tokio::spawn(async move {
        cancel.cancelled().await;
        run_cancel.cancel();
    });

    let printer = tokio::spawn(async move {
        let mut last = None;
        while let Some(event) = events.recv().await {
            match event {
                DrawEvent::Log { message } => eprintln!("{message}"),
                DrawEvent::Progress { percent } => {
                    if last.is_none_or(|l| percent >= l + 10 || percent == 100) {
                        eprintln!("progress {percent}%");
                        last = Some(percent);
                    }
                }
                DrawEvent::Completed => eprintln!("done"),
                DrawEvent::Cancelled => eprintln!("cancelled"),
                DrawEvent::Failed { code, message } => eprintln!("failed ({code}): {message}"),
            }
        }
    });

    let result = orch.run(serial, image).await;
    forward.abort();
    drop(orch);
    let _ = printer.await;

    if !result.is_success() {
        warn!(code = result.exit_code(), diagnostic = %result.diagnostic(), "draw did not complete");
    }
    Ok(result.exit_code())
}

/// Picks the target device: the explicit serial, else the first ready
/// device, waiting for one when auto-detection is enabled.
async fn resolve_serial(
    client: &AdbClient,
    serial: Option<String>,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<String> {
    if let Some(serial) = serial {
        return Ok(serial);
    }

    let mut devices = DeviceQuery::devices(client).await;
    if devices.is_empty() && config.auto_detect {
        info!("no device attached, waiting...");
        let query: Arc<dyn DeviceQuery> = Arc::new(client.clone());
        devices = DeviceWatcher::new(query)
            .wait_for_device(cancel, |_| {})
            .await
            .unwrap_or_default();
    }

    match devices.into_iter().next() {
        Some(serial) => {
            info!(serial = %serial, "using device");
            Ok(serial)
        }
        None => bail!(DrawError::NoDevice),
    }
}

async fn resolve_canvas(
    client: &AdbClient,
    size: Option<Canvas>,
    serial: Option<String>,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<Canvas> {
    if let Some(canvas) = size {
        return Ok(canvas);
    }
    let serial = resolve_serial(client, serial, config, cancel).await?;
    match DeviceQuery::screen_size(client, &serial).await {
        Some(canvas) => Ok(canvas),
        None => bail!(DrawError::DeviceUnavailable { serial }),
    }
}

/// Runs CPU-bound pipeline work off the async workers.
async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DrawError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

fn write_file(path: &Path, content: String) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "written");
    Ok(())
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            cancel.cancel();
        }
    });
}
