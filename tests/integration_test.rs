// Integration tests for the analysis pipeline and the cxxscan binary

use std::path::PathBuf;
use std::process::Command;

use cxxscan::checks::CheckRegistry;
use cxxscan::config::{AnalysisConfig, Charset};
use cxxscan::parser::{DiagnosticKind, NodeKind, ParserState};
use cxxscan::pipeline::Pipeline;
use cxxscan::source::SourceFile;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources").join(name)
}

fn analyze_resource(name: &str, config: AnalysisConfig) -> (cxxscan::pipeline::Analysis, Vec<cxxscan::checks::Violation>) {
    let source = SourceFile::read(resource(name), config.charset).expect("fixture should be readable");
    let pipeline = Pipeline::new(config);
    let analysis = pipeline.analyze(&source);
    let violations = pipeline.check(&analysis, &mut CheckRegistry::with_defaults());
    (analysis, violations)
}

#[test]
fn test_strict_mode_reports_first_error_only() {
    let config = AnalysisConfig {
        error_recovery: false,
        ..AnalysisConfig::default()
    };
    let (analysis, violations) = analyze_resource("parsing_error1.cc", config);

    assert_eq!(analysis.state, ParserState::Failed);
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(analysis.diagnostics[0].line, 4);
    assert_eq!(analysis.diagnostics[0].kind, DiagnosticKind::ParseError);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule, "ParsingError");
    assert_eq!(violations[0].line, Some(4));
    assert!(violations[0].message.contains("Parse error"), "{}", violations[0].message);
}

#[test]
fn test_recovery_mode_keeps_analyzing() {
    let (analysis, violations) = analyze_resource("parsing_error1.cc", AnalysisConfig::default());

    assert_ne!(analysis.state, ParserState::Failed);
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!((3..=5).contains(&analysis.diagnostics[0].line));

    // both functions survive, and rules still fire after the error
    assert_eq!(analysis.ast.find_all(NodeKind::FunctionDefinition).len(), 2);
    let rules: Vec<(&str, Option<usize>)> = violations.iter().map(|v| (v.rule, v.line)).collect();
    assert_eq!(rules, vec![("ParsingError", Some(4)), ("GotoStatement", Some(9))]);
}

#[test]
fn test_lines_survive_directives_and_recovery() {
    let (analysis, _) = analyze_resource("parsing_error1.cc", AnalysisConfig::default());
    let returns: Vec<usize> = analysis
        .ast
        .find_all(NodeKind::ReturnStatement)
        .iter()
        .map(|n| n.line())
        .collect();
    assert_eq!(returns, vec![6, 11]);
    assert_eq!(analysis.logical_lines[0].text, "#include <cstdio>");
    assert_eq!(analysis.logical_lines[0].start_line, 2);
}

#[test]
fn test_encoding_check() {
    let (_, violations) = analyze_resource("latin1.cc", AnalysisConfig::default());
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].line, None);
    assert_eq!(
        violations[0].message,
        "Not all characters of the file can be encoded with the predefined charset UTF-8."
    );

    let latin1 = AnalysisConfig {
        charset: Charset::Iso8859_1,
        ..AnalysisConfig::default()
    };
    let (analysis, violations) = analyze_resource("latin1.cc", latin1);
    assert!(violations.is_empty());
    assert!(!analysis.has_errors());
}

#[test]
fn test_properties_file() {
    let config = AnalysisConfig::load(&resource("strict.properties")).unwrap();
    assert_eq!(config.charset, Charset::Iso8859_1);
    assert!(!config.error_recovery);

    assert!(AnalysisConfig::load(&resource("missing.properties")).is_err());
}

#[test]
fn test_round_trip_on_fixture() {
    let source = SourceFile::read(resource("parsing_error1.cc"), Charset::Utf8).unwrap();
    let stream = cxxscan::parser::tokenize(&source.text);
    assert_eq!(stream.reconstruct(&source.text), source.text);
}

#[test]
fn test_binary_reports_in_input_order() {
    let output = Command::new(env!("CARGO_BIN_EXE_cxxscan"))
        .arg(resource("parsing_error1.cc"))
        .arg(resource("latin1.cc"))
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "{stdout}");
    assert!(lines[0].ends_with("parsing_error1.cc:4: [ParsingError] Parse error at line 4, column 14: Expected expression, found ';'"));
    assert!(lines[1].contains("parsing_error1.cc:9: [GotoStatement]"));
    assert!(lines[2].contains("latin1.cc: [FileEncoding]"));
}

#[test]
fn test_binary_strict_flag_and_missing_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_cxxscan"))
        .arg("--no-error-recovery")
        .arg(resource("parsing_error1.cc"))
        .arg(resource("does_not_exist.cc"))
        .output()
        .expect("binary should run");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "{stdout}");
    assert!(stdout.contains(":4: [ParsingError]"));
}
