//! Eval command handler
//!
//! Evaluates one expression with builtins only, which makes it a quick way
//! to try a path or a pipeline before putting it into a spec.

use super::utils::root_inputs;
use crate::cli::EvalArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{JsonStyle, OutputWriter};
use serde_json::Value;
use tracing::{debug, instrument};

/// Handle the eval command
#[instrument(skip(config, output), fields(expression = %args.expression))]
pub fn handle_eval(args: EvalArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let engine = config.engine(None);
    let inputs = root_inputs(args.input.as_deref(), &[])?;

    let template = Value::String(args.expression);
    let result = engine.evaluate(&template, &inputs)?;
    debug!("Expression evaluated");

    output.json(&result, JsonStyle::from_flags(config.output.pretty, args.compact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn eval(expression: &str, input: Option<std::path::PathBuf>) -> Result<()> {
        let args = EvalArgs {
            expression: expression.to_string(),
            input,
            compact: true,
        };
        let mut output = OutputWriter::with_writers(
            false,
            true,
            0,
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
        );
        handle_eval(args, &Config::default(), &mut output)
    }

    #[test]
    fn test_eval_against_document() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("doc.json");
        fs::write(&doc, r#"{"items": [3, 1, 2]}"#).unwrap();

        assert!(eval("$.items | count", Some(doc.clone())).is_ok());
        assert!(eval("$.items[5]", Some(doc)).is_err());
    }

    #[test]
    fn test_eval_reports_parse_errors() {
        let error = eval("$.items[", None).unwrap_err();
        assert!(matches!(error, Error::Core(_)));
        assert_eq!(error.exit_code(), 4);
    }

    #[test]
    fn test_eval_rejects_unknown_transformers() {
        let error = eval("$ | nosuch", None).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }
}
