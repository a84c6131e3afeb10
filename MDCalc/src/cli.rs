use anyhow::{Result, anyhow};
use std::ffi::OsString;
use std::path::PathBuf;

pub const USAGE: &str = "\
MDCalc - media duration and charge calculator

Usage: MDCalc [OPTIONS] [FILES]...

Options:
  --rate <VALUE>          Charge per minute (default from config, 3)
  --timeout-secs <SECS>   Give up on a file's duration after SECS seconds
  --config-dir <DIR>      Configuration directory
  --json                  Print the summary as JSON
  --interactive           Read add/rm/rate commands from stdin
  --no-banner             Never show the threshold banner
  -h, --help              Show this help
";

#[derive(Debug, Default, PartialEq)]
pub struct Options {
    pub rate: Option<String>,
    pub timeout_secs: Option<f64>,
    pub config_dir: Option<String>,
    pub json: bool,
    pub interactive: bool,
    pub no_banner: bool,
    pub help: bool,
    pub files: Vec<PathBuf>,
}

impl Options {
    pub fn from_env() -> Result<Self> {
        Self::parse(pico_args::Arguments::from_env())
    }

    pub fn from_vec(args: Vec<OsString>) -> Result<Self> {
        Self::parse(pico_args::Arguments::from_vec(args))
    }

    fn parse(mut args: pico_args::Arguments) -> Result<Self> {
        let help = args.contains(["-h", "--help"]);
        let json = args.contains("--json");
        let interactive = args.contains("--interactive");
        let no_banner = args.contains("--no-banner");
        let rate: Option<String> = args.opt_value_from_str("--rate")?;
        let config_dir: Option<String> = args.opt_value_from_str("--config-dir")?;
        let timeout_secs = args
            .opt_value_from_str::<_, String>("--timeout-secs")?
            .map(|v| {
                v.parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite() && *s >= 0.0)
                    .ok_or_else(|| anyhow!("--timeout-secs expects a non-negative number, got {v}"))
            })
            .transpose()?;

        let mut files = Vec::new();
        for arg in args.finish() {
            let text = arg.to_string_lossy();
            if text.starts_with("--") {
                return Err(anyhow!("Unknown argument: {text}. Use --help for usage."));
            }
            files.push(PathBuf::from(arg));
        }

        Ok(Self {
            rate,
            timeout_secs,
            config_dir,
            json,
            interactive,
            no_banner,
            help,
            files,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        Options::from_vec(args.iter().map(OsString::from).collect())
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_flags_and_files() {
        let options = parse(&["--rate", "2.5", "--json", "a.mp3", "b.mp4"]).unwrap();
        assert_eq!(options.rate.as_deref(), Some("2.5"));
        assert!(options.json);
        assert!(!options.interactive);
        assert_eq!(options.files, [PathBuf::from("a.mp3"), PathBuf::from("b.mp4")]);
    }

    #[test]
    fn test_rate_is_kept_raw() {
        // Parsing the rate is the ledger's job.
        let options = parse(&["--rate", "cheap"]).unwrap();
        assert_eq!(options.rate.as_deref(), Some("cheap"));
    }

    #[test]
    fn test_timeout() {
        assert_eq!(parse(&["--timeout-secs", "1.5"]).unwrap().timeout_secs, Some(1.5));
        assert!(parse(&["--timeout-secs", "soon"]).is_err());
        assert!(parse(&["--timeout-secs", "-1"]).is_err());
    }

    #[test]
    fn test_unknown_flag() {
        assert!(parse(&["--frobnicate"]).is_err());
    }
}
