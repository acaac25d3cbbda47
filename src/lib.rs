//! # Introduction
//!
//! cxxscan is the front end of a C++ static analyzer. It turns source text
//! into tokens and a syntax tree without ever giving up on a file: malformed
//! input produces diagnostics and a partial tree, and rules still run over
//! whatever was recovered.
//!
//! ## Analysis pipeline
//!
//! ```text
//! Bytes → SourceFile → Normalizer/Lexer → Parser → AST + Diagnostics → Checks
//! ```
//!
//! 1. [`source`]: reads and decodes a file with the configured charset.
//! 2. [`parser`]: normalizes directives, tokenizes, and builds an AST with
//!    strict or recovering error handling.
//! 3. [`pipeline`]: runs one file through the parser and collects the results.
//! 4. [`checks`]: rules keyed by AST node tag, driven by a single traversal.
//! 5. [`config`]: charset and error-recovery settings.
//!
//! ## Example
//!
//! ```
//! use cxxscan::checks::CheckRegistry;
//! use cxxscan::config::AnalysisConfig;
//! use cxxscan::pipeline::Pipeline;
//! use cxxscan::source::SourceFile;
//!
//! let pipeline = Pipeline::new(AnalysisConfig::default());
//! let source = SourceFile::from_text("demo.cc", "void f() { goto end; end: return; }\n");
//! let analysis = pipeline.analyze(&source);
//! let violations = pipeline.check(&analysis, &mut CheckRegistry::with_defaults());
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].rule, "GotoStatement");
//! ```

pub mod checks;
pub mod config;
pub mod parser;
pub mod pipeline;
pub mod source;
