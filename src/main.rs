use anyhow::{Context, Result};
use screen_clicker::args::{Args, Mode};
use screen_clicker::capture::{BackendKind, CaptureBackend, ScreenCapture};
use screen_clicker::input::{EnigoInput, InputDriver};
use screen_clicker::scan_automation::match_image::RegionMapper;
use screen_clicker::scan_automation::{
    ClickCounts, DEFAULT_EVENT_CAPACITY, ScanConfig, ScanController, ScanEvent,
    create_event_channel,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn main() -> Result<()> {
    let args = match Args::parse() {
        Ok(Some(args)) => args,
        Ok(None) => return Ok(()),
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let default_filter = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(&args)?;
    match args.mode {
        Mode::PrintConfig => {
            println!("{}", config.to_json());
            Ok(())
        }
        Mode::Screenshot => {
            let capture = open_capture(args.backend)?;
            save_zone_screenshots(&capture, &config)
        }
        Mode::Cursor => {
            let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
            rt.block_on(print_cursor_position())
        }
        Mode::Run => run_scan(&args, &config),
    }
}

fn load_config(args: &Args) -> Result<ScanConfig> {
    let config = match &args.config_path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    Ok(match args.delay_secs {
        Some(delay) => config.with_delay(delay),
        None => config,
    })
}

fn open_capture(kind: Option<BackendKind>) -> Result<CaptureBackend> {
    let backend = match kind {
        Some(kind) => CaptureBackend::new(kind),
        None => CaptureBackend::detect(),
    };
    backend.context("No usable screen capture backend")
}

fn run_scan(args: &Args, config: &ScanConfig) -> Result<()> {
    let capture = open_capture(args.backend)?;
    let input = EnigoInput::new().context("Synthetic input is unavailable")?;
    let (observer, mut events) = create_event_channel(DEFAULT_EVENT_CAPACITY);

    let mut controller = ScanController::new(
        Arc::new(capture),
        Arc::new(Mutex::new(input)),
        Arc::new(observer),
    );
    controller
        .start(config)
        .context("Scanning could not be started")?;
    println!(
        "🚀 Scanning {} template(s) every {:.2}s, press Ctrl+C to stop",
        config.templates.len() + config.interrupts.len(),
        config.delay_secs
    );

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    rt.block_on(async {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let timeout = async {
            match args.timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    println!("🛑 Ctrl+C received, stopping...");
                    break;
                }
                _ = &mut timeout => {
                    println!("⏱️ Timeout reached, stopping...");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => print_event(&event),
                    None => break,
                },
            }
        }
    });

    controller.stop().context("Scan worker failed")?;
    let snapshot = controller.snapshot();
    println!(
        "✅ {} click(s) in {:.1} s: {}",
        snapshot.total_clicks(),
        snapshot.elapsed.as_secs_f64(),
        format_counts(&snapshot.counts)
    );
    Ok(())
}

fn format_counts(counts: &ClickCounts) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn print_event(event: &ScanEvent) {
    match event {
        ScanEvent::Update { counts, elapsed } => {
            println!("🎯 {} | {:.1} s", format_counts(counts), elapsed.as_secs_f64());
        }
        ScanEvent::Interrupt { template } => println!("🚨 Interrupt '{template}' handled"),
        ScanEvent::CaptureFailure { template, reason } => {
            log::debug!("Capture failure for '{template}': {reason}");
        }
        ScanEvent::ActionFailure { template, reason } => {
            println!("❌ Input for '{template}' failed: {reason}");
        }
        ScanEvent::StateChanged(state) => log::debug!("🎮 Scan state {state:?}"),
    }
}

fn save_zone_screenshots(capture: &CaptureBackend, config: &ScanConfig) -> Result<()> {
    let (width, height) = capture.screen_dimensions()?;
    println!(
        "📸 Screen {}x{} (backend={})",
        width,
        height,
        capture.backend_name()
    );
    let mapper = RegionMapper::new(width, height);

    for template in config.all_templates() {
        let region = mapper.resolve(&template.name, &template.zone)?;
        let shot = capture
            .timed_capture(&region)
            .with_context(|| format!("Failed to capture zone of '{}'", template.name))?;
        let file = format!("zone-{}.png", template.name);
        shot.image
            .save(&file)
            .with_context(|| format!("Failed to write {file}"))?;
        println!(
            "✅ '{}' {}x{} at ({}, {}) saved to {} ({}ms)",
            template.name, region.width, region.height, region.x, region.y, file, shot.duration_ms
        );
    }
    Ok(())
}

async fn print_cursor_position() -> Result<()> {
    let mut input = EnigoInput::new().context("Synthetic input is unavailable")?;
    let (width, height) = input.display_size()?;
    println!("🖱️ Display {width}x{height}, press Ctrl+C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let (x, y) = input.cursor_position()?;
                println!(
                    "🖱️ x={} y={}  ({:.1}%, {:.1}%)",
                    x,
                    y,
                    x as f64 * 100.0 / width.max(1) as f64,
                    y as f64 * 100.0 / height.max(1) as f64
                );
            }
        }
    }
    Ok(())
}
