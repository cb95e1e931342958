use std::io::IsTerminal;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use simplelog::LevelFilter;
use url::Url;

use crate::models::StudentQuery;
use crate::utils::fetch::{Backend, DEFAULT_RESULT_URL};

pub const DEFAULT_ROLL: &str = "152205";
pub const DEFAULT_REG: &str = "2211210980";

#[derive(Parser, Debug)]
#[command(author, version, about = "Look up an SSC examination result from the education board", long_about = None)]
pub struct Cli {
    /// Roll number
    #[arg(env = "SSC_ROLL", default_value = DEFAULT_ROLL)]
    pub roll: String,

    /// Registration number
    #[arg(env = "SSC_REG", default_value = DEFAULT_REG)]
    pub reg: String,

    /// Result lookup endpoint
    #[arg(long, env = "SSC_RESULT_URL", default_value = DEFAULT_RESULT_URL)]
    pub url: String,

    /// How the result page is downloaded
    #[arg(long, env = "SSC_BACKEND", value_enum, default_value_t = Backend::Curl)]
    pub backend: Backend,

    /// Name shown in the banner
    #[arg(long, env = "SSC_STUDENT_NAME")]
    pub name: Option<String>,

    /// Print everything at once, without typing effects or spinner
    #[arg(long)]
    pub no_animation: bool,

    /// Delay between typed characters, in milliseconds
    #[arg(long = "type-delay", env = "SSC_TYPE_DELAY_MS", default_value_t = 30)]
    pub type_delay_ms: u64,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub student: StudentQuery,
    pub endpoint: Url,
    pub backend: Backend,
    pub student_name: Option<String>,
    pub animate: bool,
    pub type_delay: Duration,
    pub json: bool,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let endpoint = Url::parse(&cli.url).with_context(|| format!("Invalid result URL `{}`", cli.url))?;
        let log_level = match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };
        Ok(Settings {
            student: StudentQuery { roll: cli.roll, reg: cli.reg },
            endpoint,
            backend: cli.backend,
            student_name: cli.name,
            animate: !cli.no_animation && !cli.json && std::io::stdout().is_terminal(),
            type_delay: Duration::from_millis(cli.type_delay_ms),
            json: cli.json,
            log_level,
        })
    }
}
