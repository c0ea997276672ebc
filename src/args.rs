use crate::capture::BackendKind;
use crate::scan_automation::match_image::config::seconds;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Run,
    Screenshot,
    Cursor,
    PrintConfig,
}

#[derive(Debug, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub config_path: Option<PathBuf>,
    pub delay_secs: Option<f64>,
    pub backend: Option<BackendKind>,
    pub debug_mode: bool,
    pub timeout_secs: Option<u64>,
}

impl Args {
    pub fn parse() -> Result<Option<Self>, String> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse flags (program name already stripped). `Ok(None)` means help
    /// or version was printed; a bad flag is an `Err` with the message.
    pub fn parse_from<I, S>(args: I) -> Result<Option<Self>, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mode: Option<Mode> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut delay_secs: Option<f64> = None;
        let mut backend: Option<BackendKind> = None;
        let mut debug_mode: bool = false;
        let mut timeout_secs: Option<u64> = None;

        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                print_help();
                return Ok(None);
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Screen Clicker v{} ({})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return Ok(None);
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--screenshot" || arg == "-s" {
                mode = Some(Mode::Screenshot);
            } else if arg == "--cursor" {
                mode = Some(Mode::Cursor);
            } else if arg == "--print-config" {
                mode = Some(Mode::PrintConfig);
            } else if let Some(val) = arg.strip_prefix("--config=") {
                config_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--delay=") {
                match val.parse::<f64>() {
                    Ok(secs) if seconds(secs).is_some() => delay_secs = Some(secs),
                    _ => return Err(format!("Invalid delay value: {}", val)),
                }
            } else if let Some(val) = arg.strip_prefix("--backend=") {
                backend = Some(val.parse::<BackendKind>().map_err(|e| e.to_string())?);
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) => timeout_secs = Some(secs),
                    Err(_) => return Err(format!("Invalid timeout value: {}", val)),
                }
            } else {
                print_help();
                return Err(format!("Unknown argument: {}", arg));
            }
        }

        Ok(Some(Args {
            mode: mode.unwrap_or(Mode::Run),
            config_path,
            delay_secs,
            backend,
            debug_mode,
            timeout_secs,
        }))
    }
}

fn print_help() {
    println!("🤖 Screen Clicker Automation Tool");
    println!();
    println!("USAGE:");
    println!("    screen-clicker [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)            Scan the default zones and click matches");
    println!("    --config=PATH         Load templates, zones and interrupts from a JSON file");
    println!("    --delay=SECS          Seconds to sleep between scans (default: 1.0)");
    println!("    --backend=<xcap|grim> Force a screen capture backend (default: auto-detect)");
    println!("    --screenshot, -s      Save every template zone to zone-<name>.png and exit");
    println!("    --cursor              Print the cursor position (px and %) until Ctrl+C");
    println!("    --print-config        Print the effective configuration as JSON and exit");
    println!("    --debug               Enable debug logging (RUST_LOG overrides)");
    println!("    --timeout=N           Auto-stop after N seconds");
    println!("    --help, -h            Show this help message");
    println!("    --version, -v         Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    screen-clicker");
    println!("    screen-clicker --config=clicker.json --delay=0.5");
    println!("    screen-clicker --screenshot --config=clicker.json");
    println!("    screen-clicker --cursor");
    println!("    screen-clicker --backend=grim --debug --timeout=60");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_runs_default() {
        let args = Args::parse_from(Vec::<String>::new()).unwrap().unwrap();
        assert_eq!(args.mode, Mode::Run);
        assert!(args.config_path.is_none());
        assert!(!args.debug_mode);
    }

    #[test]
    fn test_all_value_flags() {
        let args = Args::parse_from([
            "--config=cfg/clicker.json",
            "--delay=0.25",
            "--backend=grim",
            "--timeout=30",
            "--debug",
            "-s",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(args.mode, Mode::Screenshot);
        assert_eq!(args.config_path, Some(PathBuf::from("cfg/clicker.json")));
        assert_eq!(args.delay_secs, Some(0.25));
        assert_eq!(args.backend, Some(BackendKind::Grim));
        assert_eq!(args.timeout_secs, Some(30));
        assert!(args.debug_mode);
    }

    #[test]
    fn test_last_mode_wins() {
        let args = Args::parse_from(["--screenshot", "--cursor"])
            .unwrap()
            .unwrap();
        assert_eq!(args.mode, Mode::Cursor);
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(Args::parse_from(["--delay=-1"]).is_err());
        assert!(Args::parse_from(["--delay=soon"]).is_err());
        assert!(Args::parse_from(["--delay=1e30"]).is_err());
        assert!(Args::parse_from(["--timeout=ten"]).is_err());
        assert!(Args::parse_from(["--backend=dxgi"]).is_err());

        let err = Args::parse_from(["--debug", "--gui"]).unwrap_err();
        assert!(err.contains("--gui"));
    }

    #[test]
    fn test_help_and_version_exit_cleanly() {
        assert_eq!(Args::parse_from(["--help"]), Ok(None));
        assert_eq!(Args::parse_from(["--debug", "-v"]), Ok(None));
    }
}
