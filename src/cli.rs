//! Command line front end: argument parsing, logging setup and mode dispatch.

use crate::input::{parse_range, read_ranges};
use crate::models::{Address, SequentialRange};
use crate::output;
use crate::processing::{find_gaps, find_overlaps, join, log_overlaps};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "subnet-algebra",
    about = "Merge, split and check lists of IP address ranges",
    version
)]
pub struct Cli {
    /// What to compute from the input ranges
    #[arg(value_enum)]
    pub mode: Mode,

    /// File with one address, prefix block or range per line; stdin when absent
    pub input: Option<PathBuf>,

    /// Containing range for `gaps`, e.g. 10.0.0.0/16
    #[arg(short, long)]
    pub within: Option<String>,

    /// Print JSON instead of CSV
    #[arg(long)]
    pub json: bool,

    /// Path to the log4rs configuration file
    #[arg(long, env = "SUBNET_ALGEBRA_LOG_CONFIG", default_value = "log4rs.yml")]
    pub log_config: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Join overlapping and adjacent ranges
    Merge,
    /// Split the joined ranges into prefix blocks
    Prefix,
    /// Split the joined ranges into sequential blocks
    Sequential,
    /// Free ranges within `--within`
    Gaps,
    /// Pairs of input ranges that overlap
    Overlaps,
}

/// Initialize log4rs from `path`, or log warnings to stderr if it is missing.
pub fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        log4rs::init_file(path, Default::default())
            .map_err(|e| format!("Error initializing log4rs from {}: {e}", path.display()))?;
        return Ok(());
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
    log4rs::init_config(config)?;
    log::debug!("no {} found, logging to stderr", path.display());
    Ok(())
}

/// Run one mode over the input and print the result.
pub fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    log::info!("#Start run({:?})", cli.mode);

    let ranges = read_ranges(cli.input.as_deref())?;
    match cli.mode {
        Mode::Merge => {
            let merged = join(&ranges);
            if cli.json {
                println!("{}", output::ranges_to_json(&merged)?);
            } else {
                output::print_ranges(&merged);
            }
        }
        Mode::Prefix | Mode::Sequential => {
            let blocks = split_blocks(&ranges, cli.mode);
            if cli.json {
                println!("{}", output::blocks_to_json(&blocks)?);
            } else {
                output::print_blocks(&blocks);
            }
        }
        Mode::Gaps => {
            let within = cli
                .within
                .as_deref()
                .ok_or("gaps needs a containing range, pass --within")?;
            let container = parse_range(within)?;
            let rows = find_gaps(&container, &ranges);
            if cli.json {
                println!("{}", output::gaps_to_json(&rows)?);
            } else {
                output::print_gaps(&container, &rows);
            }
        }
        Mode::Overlaps => {
            let conflicts = find_overlaps(&ranges);
            log_overlaps(&conflicts);
            if cli.json {
                println!("{}", output::overlaps_to_json(&conflicts)?);
            } else {
                output::print_overlaps(&conflicts);
            }
        }
    }
    Ok(())
}

/// Join the ranges, then split each into prefix or sequential blocks.
fn split_blocks(ranges: &[SequentialRange], mode: Mode) -> Vec<Address> {
    join(ranges)
        .iter()
        .flat_map(|range| match mode {
            Mode::Sequential => range.span_with_sequential_blocks(),
            _ => range.span_with_prefix_blocks(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IpVersion;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from([
            "subnet-algebra",
            "gaps",
            "used.txt",
            "--within",
            "10.0.0.0/16",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Gaps);
        assert_eq!(cli.input, Some(PathBuf::from("used.txt")));
        assert_eq!(cli.within.as_deref(), Some("10.0.0.0/16"));
        assert!(cli.json);

        assert!(Cli::try_parse_from(["subnet-algebra", "bogus"]).is_err());
    }

    #[test]
    fn test_split_blocks() {
        let ranges = vec![
            SequentialRange::from_value_range(IpVersion::V4, 0x01020304, 0x01050607).unwrap(),
            SequentialRange::from_value_range(IpVersion::V4, 0x01050608, 0x01050608).unwrap(),
        ];
        let sequential: Vec<String> = split_blocks(&ranges, Mode::Sequential)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            sequential,
            vec!["1.2.3.4-255", "1.2.4-255.0-255", "1.3-4.0-255.0-255", "1.5.0-5.0-255", "1.5.6.0-8"]
        );

        let prefix = split_blocks(&ranges, Mode::Prefix);
        assert_eq!(prefix.first().unwrap().to_string(), "1.2.3.4/30");
        assert_eq!(prefix.last().unwrap().to_string(), "1.5.6.8/32");
    }
}
