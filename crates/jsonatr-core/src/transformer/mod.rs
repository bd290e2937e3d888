//! Transformers and the registry that names them
//!
//! A transformer turns one JSON value into another. There are three kinds:
//! builtins (a fixed set implemented here), internal transformers (templates
//! defined by a spec's inputs) and external transformers (processes).
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod external;
pub mod registry;
pub mod types;

pub use built_in::{Builtin, Invoke};
pub use external::{CommandOutput, CommandRunner, ProcessRunner};
pub use registry::{CollisionPolicy, Definition, Registry};
pub use types::{ExternalCommand, InternalTransformer, OutputFormat, TransformError, Transformer};
