use std::{path::PathBuf, time::Duration};

use anyhow::{Result, bail};
use clap::Parser;
use gscreenshot_core::{
    app::Gscreenshot,
    capture::ScreenshooterFactory,
    error::{CaptureError, ScreenshotActionError},
    model::{DEFAULT_BORDER_WEIGHT, GrabOptions, Region, SelectionColor},
    screenshot::CursorGlyph,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gscreenshot-cli")]
#[command(version, about = "Take screenshots on X11 and Wayland desktops", long_about = None)]
struct Cli {
    /// Seconds to wait before taking the screenshot
    #[arg(short, long, default_value = "0", value_name = "SECS", value_parser = parse_delay)]
    delay: Duration,

    /// Where to save the screenshot; strftime placeholders are expanded
    #[arg(short, long)]
    filename: Option<PathBuf>,

    /// Choose a region to capture
    #[arg(short, long, conflicts_with = "window")]
    selection: bool,

    /// Choose a window to capture
    #[arg(short, long)]
    window: bool,

    /// Copy the screenshot to the clipboard
    #[arg(short, long)]
    clip: bool,

    /// Open the screenshot in the default viewer
    #[arg(short, long)]
    open: bool,

    /// Include the mouse pointer
    #[arg(short, long)]
    pointer: bool,

    /// Glyph to draw as the pointer: default, adwaita, prohibit, allow, or an image path
    #[arg(long, value_name = "NAME|PATH")]
    pointer_glyph: Option<String>,

    /// Selection colour as #RRGGBB or #RRGGBBAA
    #[arg(long, value_name = "HEX")]
    select_color: Option<String>,

    /// Selection border thickness in pixels
    #[arg(long, default_value_t = DEFAULT_BORDER_WEIGHT)]
    select_border_weight: u32,

    /// Capture this region instead of asking, as X,Y,W,H
    #[arg(long, value_name = "X,Y,W,H", conflicts_with = "reuse_region")]
    region: Option<Region>,

    /// Capture the last selected region again
    #[arg(short, long)]
    reuse_region: bool,

    /// Print the available capabilities as JSON and exit
    #[arg(long)]
    capabilities: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn wants_pointer(&self) -> bool {
        self.pointer || self.pointer_glyph.is_some()
    }

    /// Save to the default location when no other output was requested
    fn saves_by_default(&self) -> bool {
        self.filename.is_none() && !self.clip && !self.open
    }
}

fn parse_delay(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("delay must be a reasonable number of seconds, got {}", value))
}

fn init_logging(verbose: bool) -> Result<()> {
    let (cli_level, core_level) = if verbose {
        ("debug", "debug")
    } else {
        ("info", "warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("gscreenshot_cli={}", cli_level).parse()?)
                .add_directive(format!("gscreenshot_core={}", core_level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    if cli.capabilities {
        return print_capabilities();
    }

    let mut app = match Gscreenshot::with_defaults() {
        Ok(app) => app,
        Err(e) => {
            report_capture_error(&e);
            bail!("No screenshot backend is available");
        }
    };

    debug!(
        "Using {} {} with backend {}",
        app.get_program_name(),
        app.get_program_version(),
        app.screenshooter().backend_name()
    );

    let options = build_options(&cli, &app)?;

    let taken = if cli.window {
        app.screenshot_window(&options).await
    } else if cli.selection || options.region.is_some() {
        app.screenshot_selected(&options).await
    } else {
        app.screenshot_full_display(&options).await
    };

    if !taken {
        bail!("No screenshot was taken");
    }

    let mut failures = 0;

    if let Some(filename) = &cli.filename {
        match app.save_and_return_path(Some(filename)) {
            Ok(path) => println!("✓ Screenshot saved to {}", path.display()),
            Err(e) => failures += report_action_error(&e),
        }
    } else if cli.saves_by_default() {
        match app.save_and_return_path(None) {
            Ok(path) => println!("✓ Screenshot saved to {}", path.display()),
            Err(e) => failures += report_action_error(&e),
        }
    }

    if cli.clip {
        match app.copy_last_screenshot_to_clipboard().await {
            Ok(()) => println!("✓ Screenshot copied to the clipboard"),
            Err(e) => failures += report_action_error(&e),
        }
    }

    if cli.open {
        if let Err(e) = app.open_last_screenshot().await {
            failures += report_action_error(&e);
        }
    }

    if failures > 0 {
        bail!("{} action(s) failed", failures);
    }
    Ok(())
}

fn build_options(cli: &Cli, app: &Gscreenshot) -> Result<GrabOptions> {
    let glyph = match &cli.pointer_glyph {
        Some(value) => match CursorGlyph::from_name_or_path(value) {
            Ok(glyph) => Some(glyph),
            Err(e) => {
                report_capture_error(&e);
                bail!("Invalid pointer glyph");
            }
        },
        None => None,
    };

    let region = match (cli.region, cli.reuse_region) {
        (Some(region), _) => Some(region),
        (None, true) => {
            let last = app.last_region();
            if last.is_none() {
                eprintln!("No stored region to reuse, falling back to a new capture");
            }
            last
        }
        (None, false) => None,
    };

    Ok(GrabOptions::builder()
        .delay(cli.delay)
        .capture_cursor(cli.wants_pointer())
        .cursor_glyph(glyph)
        .region(region)
        .select_color(SelectionColor::from_hex(cli.select_color.as_deref()))
        .border_weight(cli.select_border_weight)
        .build())
}

fn print_capabilities() -> Result<()> {
    let screenshooter = match ScreenshooterFactory::detect().create() {
        Ok(screenshooter) => screenshooter,
        Err(e) => {
            report_capture_error(&e);
            bail!("No screenshot backend is available");
        }
    };
    println!("{}", serde_json::to_string_pretty(&screenshooter.capabilities())?);
    Ok(())
}

fn report_capture_error(error: &CaptureError) {
    eprintln!("✗ {}", error);
    eprintln!("  {}", error.remediation_hint());
}

fn report_action_error(error: &ScreenshotActionError) -> usize {
    eprintln!("✗ {}", error);
    eprintln!("  {}", error.remediation_hint());
    1
}
