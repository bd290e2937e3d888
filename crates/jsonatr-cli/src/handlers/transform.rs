//! Transform command handler

use super::utils::{load_spec, root_inputs};
use crate::cli::TransformArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{JsonStyle, OutputWriter};
use std::fs;
use tracing::{info, instrument};

/// Handle the transform command
#[instrument(skip_all, fields(spec = %args.spec.display(), vars = args.vars.len()))]
pub fn handle_transform(
    args: TransformArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let timer = Timer::with_details("transform_command", &args.spec.display().to_string());
    let engine = config.engine(args.policy.map(Into::into));

    output.info(&format!("Loading spec {}", args.spec.display()))?;
    let composed = load_spec(&engine, &args.spec)?;
    let inputs = root_inputs(args.input.as_deref(), &args.vars)?;

    let result = engine.transform(&composed, &inputs)?;
    let style = JsonStyle::from_flags(config.output.pretty, args.compact);

    match &args.output {
        Some(path) => {
            let mut text = style.render(&result)?;
            text.push('\n');
            fs::write(path, text)?;
            output.success(&format!("✓ Output written to {}", path.display()))?;
        }
        None => output.json(&result, style)?,
    }

    info!(elapsed_ms = timer.elapsed().as_millis() as u64, "Transform finished");
    Ok(())
}
