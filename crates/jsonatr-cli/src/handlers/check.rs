//! Check command handler

use super::utils::load_spec;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use jsonatr_core::{Builtin, ComposedSpec, SpecId, Transformer};
use tracing::{info, instrument};

/// Handle the check command
#[instrument(skip(config, output), fields(spec = %args.spec.display()))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check_command", &args.spec.display().to_string());
    let engine = config.engine(args.policy.map(Into::into));

    output.info(&format!("Checking {} (policy: {})", args.spec.display(), engine.policy()))?;
    let composed = load_spec(&engine, &args.spec)?;
    info!(definitions = composed.registry.len(), "Spec composed");

    if !composed.description.is_empty() {
        output.writeln(&composed.description)?;
    }

    output.section("Transformers")?;
    output.table(&["NAME", "KIND", "ORIGIN", "DETAIL"], transformer_rows(&composed))?;

    if composed.output.is_none() {
        output.warning("Spec has no output template; it can only be imported")?;
    }
    output.success(&format!(
        "✓ {} composed with {} definition(s)",
        args.spec.display(),
        composed.registry.len()
    ))?;

    Ok(())
}

/// One row per visible transformer: definitions first, then builtins
fn transformer_rows(composed: &ComposedSpec) -> Vec<Vec<String>> {
    let builtin_origin = SpecId::builtin().to_string();

    let defined = composed.registry.definitions().map(|definition| {
        let detail = match &definition.transformer {
            Transformer::External(command) => command.to_string(),
            Transformer::Internal(internal) if !internal.bindings.is_empty() => {
                let names: Vec<&str> = internal.bindings.keys().map(String::as_str).collect();
                format!("let {}", names.join(", "))
            }
            _ => String::new(),
        };
        vec![
            definition.name.clone(),
            definition.transformer.kind().to_string(),
            definition.origin.to_string(),
            detail,
        ]
    });

    let builtins = Builtin::ALL.iter().map(|builtin| {
        let detail = match builtin.arity() {
            0 => String::new(),
            n => format!("{} argument(s)", n),
        };
        vec![
            builtin.name().to_string(),
            "builtin".to_string(),
            builtin_origin.clone(),
            detail,
        ]
    });

    defined.chain(builtins).collect()
}
