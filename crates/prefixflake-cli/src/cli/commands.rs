use super::config::{CliConfig, Command, DecodeInput};
use anyhow::Context;
use prefixflake::{
    Category, Generator, PrefixflakeId, TracingSink, WallClock, decode_category_text_with_epoch,
    decode_with_epoch,
};
use std::io::Write;

/// Executes the configured command, writing results to `out`.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate { count } => generate(config, *count, out),
        Command::Decode(input) => decode(config, input, out),
        Command::Encode(id) => {
            writeln!(out, "{}", id.encode())?;
            Ok(())
        }
        Command::Categories => categories(out),
    }
}

fn generate(config: &CliConfig, count: usize, out: &mut impl Write) -> anyhow::Result<()> {
    let generator = Generator::with_clock(
        config.business,
        config.system,
        WallClock::with_epoch(config.epoch),
    )
    .context("invalid generator identity")?
    .with_prefix(config.prefix)
    .with_sink(TracingSink);

    tracing::debug!(
        business = config.business,
        system = config.system,
        prefix = %config.prefix,
        count,
        "generating"
    );

    for _ in 0..count {
        let generated = generator.next_id().context("generating ID")?;
        writeln!(out, "{}\t{}", generated.as_i64(), generated.text)?;
    }
    out.flush()?;
    Ok(())
}

fn decode(config: &CliConfig, input: &DecodeInput, out: &mut impl Write) -> anyhow::Result<()> {
    let decoded = match input {
        DecodeInput::Numeric(id) => {
            if !id.is_valid() {
                tracing::warn!(%id, "sign bit is set; not a generated ID");
            }
            decode_with_epoch(*id, config.epoch)
        }
        DecodeInput::Text(text) => decode_category_text_with_epoch(text, config.epoch)
            .with_context(|| format!("decoding {text:?}"))?,
    };
    serde_json::to_writer_pretty(&mut *out, &decoded)?;
    writeln!(out)?;
    Ok(())
}

fn categories(out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "code\tsymbol\tname\tdescription")?;
    for category in Category::ALL {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            category.code(),
            category.symbol(),
            category.name(),
            category.description()
        )?;
    }
    Ok(())
}
