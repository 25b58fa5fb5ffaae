use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use core::time::Duration;
use prefixflake::{Category, DEFAULT_EPOCH, PrefixflakeId};

/// Runtime configuration for the `prefixflake` binary.
///
/// Identity and epoch settings are parsed from CLI arguments or environment
/// variables (a `.env` file is honored). They must match across every process
/// sharing an ID namespace: two generators with the same business line and
/// system ID will collide.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "prefixflake",
    version,
    about = "Generate and decode prefixed Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Business line embedded in generated IDs (0-7).
    ///
    /// Environment variable: `PREFIXFLAKE_BUSINESS`
    #[arg(long, global = true, env = "PREFIXFLAKE_BUSINESS", default_value_t = 0)]
    pub business: u8,

    /// System (node) ID embedded in generated IDs (0-15).
    ///
    /// Environment variable: `PREFIXFLAKE_SYSTEM`
    #[arg(long, global = true, env = "PREFIXFLAKE_SYSTEM", default_value_t = 0)]
    pub system: u8,

    /// Epoch in milliseconds since 1970-01-01 UTC. Defaults to
    /// 2025-01-01T00:00:00Z.
    ///
    /// Environment variable: `PREFIXFLAKE_EPOCH_MS`
    #[arg(long, global = true, env = "PREFIXFLAKE_EPOCH_MS")]
    pub epoch_ms: Option<u64>,

    /// Default category for generated IDs, by name (`host`) or code (`7`).
    ///
    /// Environment variable: `PREFIXFLAKE_PREFIX`
    #[arg(long, global = true, env = "PREFIXFLAKE_PREFIX", default_value = "Default")]
    pub prefix: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Generate IDs, one `id<TAB>text` line each.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Decode a decimal or 13-character text ID into its fields (JSON).
    Decode {
        /// The ID. All-digit input is read as decimal unless `--text` is set.
        id: String,
        /// Read the input as text even if it only contains digits.
        #[arg(long, default_value_t = false)]
        text: bool,
    },
    /// Convert a decimal ID to its text form.
    Encode {
        /// Decimal ID with a clear sign bit.
        id: u64,
    },
    /// List the 32 categories.
    Categories,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate { count: usize },
    Decode(DecodeInput),
    Encode(PrefixflakeId),
    Categories,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeInput {
    Numeric(PrefixflakeId),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub business: u8,
    pub system: u8,
    pub epoch: Duration,
    pub prefix: Category,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.business > PrefixflakeId::max_business() {
            bail!(
                "PREFIXFLAKE_BUSINESS ({}) exceeds the business field (max = {})",
                args.business,
                PrefixflakeId::max_business()
            );
        }

        if args.system > PrefixflakeId::max_system() {
            bail!(
                "PREFIXFLAKE_SYSTEM ({}) exceeds the system field (max = {})",
                args.system,
                PrefixflakeId::max_system()
            );
        }

        let epoch = match args.epoch_ms {
            Some(epoch_ms) => {
                let now_ms = u64::try_from(chrono::Utc::now().timestamp_millis())?;
                if epoch_ms > now_ms {
                    bail!("PREFIXFLAKE_EPOCH_MS ({epoch_ms}) is in the future");
                }
                Duration::from_millis(epoch_ms)
            }
            None => DEFAULT_EPOCH,
        };

        let prefix = parse_category(&args.prefix)?;

        let command = match args.command {
            CliCommand::Generate { count } => {
                if count == 0 {
                    bail!("--count must be greater than 0");
                }
                Command::Generate { count }
            }
            CliCommand::Decode { id, text } => {
                let id = id.trim();
                if !text && !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
                    Command::Decode(DecodeInput::Numeric(PrefixflakeId::from_raw(id.parse()?)))
                } else {
                    Command::Decode(DecodeInput::Text(id.to_owned()))
                }
            }
            CliCommand::Encode { id } => {
                let id = PrefixflakeId::from_raw(id);
                if !id.is_valid() {
                    bail!("{id} has its sign bit set and has no text form");
                }
                Command::Encode(id)
            }
            CliCommand::Categories => Command::Categories,
        };

        Ok(Self {
            business: args.business,
            system: args.system,
            epoch,
            prefix,
            command,
        })
    }
}

/// Parses a category by case-insensitive name or by numeric code.
pub fn parse_category(input: &str) -> anyhow::Result<Category> {
    let input = input.trim();
    if let Ok(category) = input.parse::<Category>() {
        return Ok(category);
    }
    let code: u8 = input
        .parse()
        .map_err(|_| anyhow!("unknown category {input:?} (expected a name or a code 0-31)"))?;
    Ok(Category::try_from(code)?)
}
