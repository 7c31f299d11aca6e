// src/config.rs
use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

pub const DEFAULT_BOUNDARIES: [f64; 13] = [
    -60.0, -50.0, -40.0, -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0,
];
pub const DEFAULT_INDEX_NAME: &str = "MSCI";
pub const DEFAULT_INDEX_TITLE: &str = "Morgan Stanley Capital International World";
/// Highest literal current-year offset accepted. The y-axis gets one tick
/// per unit of height.
pub const MAX_FIXED_OFFSET: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Json,
}

impl OutputFormat {
    /// Falls back to SVG for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Svg,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "json" => Ok(OutputFormat::Json),
            other => Err(AnalysisError::InvalidConfig(format!(
                "unknown output format '{}', expected svg or json",
                other
            ))),
        }
    }
}

/// Where the highlighted current-year rectangle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentYearOffset {
    /// On top of the tallest historical stack anywhere on the chart.
    #[default]
    Tallest,
    /// On top of the stack of the bin the current year falls into.
    OwnBin,
    /// A literal height.
    Fixed(u32),
}

impl CurrentYearOffset {
    pub fn validate(self) -> Result<Self> {
        match self {
            CurrentYearOffset::Fixed(n) if n > MAX_FIXED_OFFSET => Err(AnalysisError::InvalidConfig(format!(
                "current-year offset {} exceeds the maximum of {}",
                n, MAX_FIXED_OFFSET
            ))),
            other => Ok(other),
        }
    }
}

impl FromStr for CurrentYearOffset {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let offset = match s {
            "tallest" => CurrentYearOffset::Tallest,
            "own-bin" => CurrentYearOffset::OwnBin,
            _ => s
                .strip_prefix("fixed:")
                .and_then(|n| n.trim().parse::<u32>().ok())
                .map(CurrentYearOffset::Fixed)
                .ok_or_else(|| {
                    AnalysisError::InvalidConfig(format!(
                        "unknown current-year offset '{}', expected tallest, own-bin or fixed:<n>",
                        s
                    ))
                })?,
        };
        offset.validate()
    }
}

/// Parses a comma-separated boundary list such as `-60,-50,...,60`.
pub fn parse_boundaries(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|e| {
                AnalysisError::InvalidConfig(format!("bad bin boundary '{}': {}", s, e))
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// `None` picks the last year present in the data.
    pub current_year: Option<i32>,
    pub boundaries: Vec<f64>,
    pub current_offset: CurrentYearOffset,
    pub index_name: String,
    pub index_title: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            input: PathBuf::from("msci_prices.csv"),
            output: PathBuf::from("msci_returns.svg"),
            format: OutputFormat::Svg,
            current_year: None,
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
            current_offset: CurrentYearOffset::default(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            index_title: DEFAULT_INDEX_TITLE.to_string(),
        }
    }
}

/// Command line, with every option also readable from the environment
/// (and therefore from `.env`).
#[derive(Parser, Debug)]
#[command(name = "msci_returns")]
#[command(about = "Histogram of annual index returns with summary statistics", long_about = None)]
pub struct Cli {
    /// CSV file with `year` and `price` columns
    #[arg(short, long, env = "MSCI_INPUT", default_value = "msci_prices.csv")]
    pub input: PathBuf,

    /// Chart file to write
    #[arg(short, long, env = "MSCI_OUTPUT", default_value = "msci_returns.svg")]
    pub output: PathBuf,

    /// svg or json; inferred from the output extension when omitted
    #[arg(short, long, env = "MSCI_FORMAT")]
    pub format: Option<String>,

    /// Year to highlight (defaults to the last year in the data)
    #[arg(long, env = "MSCI_CURRENT_YEAR")]
    pub current_year: Option<i32>,

    /// Comma-separated ascending bin boundaries in percent
    #[arg(
        long,
        env = "MSCI_BINS",
        allow_hyphen_values = true,
        default_value = "-60,-50,-40,-30,-20,-10,0,10,20,30,40,50,60"
    )]
    pub bins: String,

    /// tallest, own-bin or fixed:<n>
    #[arg(long, env = "MSCI_CURRENT_OFFSET", default_value = "tallest")]
    pub current_offset: String,

    /// Short index name shown in the statistics box
    #[arg(long, env = "MSCI_INDEX_NAME", default_value = DEFAULT_INDEX_NAME)]
    pub index_name: String,

    /// Long index name used in the chart title
    #[arg(long, env = "MSCI_INDEX_TITLE", default_value = DEFAULT_INDEX_TITLE)]
    pub index_title: String,
}

impl Cli {
    pub fn into_config(self) -> Result<AnalysisConfig> {
        let format = match self.format.as_deref() {
            Some(f) => f.parse()?,
            None => OutputFormat::from_path(&self.output),
        };

        Ok(AnalysisConfig {
            format,
            current_year: self.current_year,
            boundaries: parse_boundaries(&self.bins)?,
            current_offset: self.current_offset.parse()?,
            index_name: self.index_name,
            index_title: self.index_title,
            input: self.input,
            output: self.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, MutexGuard};

    // Cli parsing reads MSCI_* variables, so every test that parses one
    // holds this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn parses_offset_policies() {
        assert_eq!("tallest".parse::<CurrentYearOffset>().unwrap(), CurrentYearOffset::Tallest);
        assert_eq!("own-bin".parse::<CurrentYearOffset>().unwrap(), CurrentYearOffset::OwnBin);
        assert_eq!("fixed:8".parse::<CurrentYearOffset>().unwrap(), CurrentYearOffset::Fixed(8));
        assert!("fixed:-1".parse::<CurrentYearOffset>().is_err());
        assert!("highest".parse::<CurrentYearOffset>().is_err());
    }

    #[test]
    fn rejects_oversized_fixed_offset() {
        let limit = format!("fixed:{}", MAX_FIXED_OFFSET);
        assert_eq!(
            limit.parse::<CurrentYearOffset>().unwrap(),
            CurrentYearOffset::Fixed(MAX_FIXED_OFFSET)
        );
        assert!(matches!(
            "fixed:4294967295".parse::<CurrentYearOffset>(),
            Err(AnalysisError::InvalidConfig(_))
        ));
        assert!("fixed:100000000".parse::<CurrentYearOffset>().is_err());
        assert!(CurrentYearOffset::Fixed(u32::MAX).validate().is_err());
    }

    #[test]
    fn parses_boundary_list() {
        let edges = parse_boundaries("-60, -50,0 ,60").unwrap();
        assert_eq!(edges, vec![-60.0, -50.0, 0.0, 60.0]);
        assert!(parse_boundaries("-60,abc").is_err());
    }

    #[test]
    fn infers_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.svg")), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Svg);
    }

    #[test]
    fn cli_defaults_match_config_defaults() {
        let _guard = env_guard();
        let cli = Cli::parse_from(["msci_returns"]);
        let config = cli.into_config().unwrap();
        let defaults = AnalysisConfig::default();
        assert_eq!(config.boundaries, defaults.boundaries);
        assert_eq!(config.current_offset, defaults.current_offset);
        assert_eq!(config.format, OutputFormat::Svg);
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let _guard = env_guard();
        let cli = Cli::parse_from(["msci_returns", "-o", "chart.svg", "--format", "json"]);
        assert_eq!(cli.into_config().unwrap().format, OutputFormat::Json);
    }

    #[test]
    fn options_fall_back_to_environment() {
        let _guard = env_guard();
        env::set_var("MSCI_BINS", "-20,0,20");
        env::set_var("MSCI_CURRENT_OFFSET", "own-bin");
        env::set_var("MSCI_OUTPUT", "from_env.json");

        let parsed = Cli::try_parse_from(["msci_returns"]);
        let overridden = Cli::try_parse_from(["msci_returns", "--bins", "0,5"]);

        env::remove_var("MSCI_BINS");
        env::remove_var("MSCI_CURRENT_OFFSET");
        env::remove_var("MSCI_OUTPUT");

        let config = parsed.unwrap().into_config().unwrap();
        assert_eq!(config.boundaries, vec![-20.0, 0.0, 20.0]);
        assert_eq!(config.current_offset, CurrentYearOffset::OwnBin);
        assert_eq!(config.output, PathBuf::from("from_env.json"));
        assert_eq!(config.format, OutputFormat::Json);

        let config = overridden.unwrap().into_config().unwrap();
        assert_eq!(config.boundaries, vec![0.0, 5.0]);
    }

    #[test]
    fn bad_offset_in_environment_is_invalid_config() {
        let _guard = env_guard();
        env::set_var("MSCI_CURRENT_OFFSET", "fixed:4294967295");
        let parsed = Cli::try_parse_from(["msci_returns"]);
        env::remove_var("MSCI_CURRENT_OFFSET");

        let err = parsed.unwrap().into_config().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }
}
