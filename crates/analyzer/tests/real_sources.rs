use codecity_analyzer::{Analysis, Analyzer, FileMetric, Language};

fn analyze(name: &str, path: &str, bytes: &[u8]) -> FileMetric {
    match Analyzer::new().analyze(name, path, bytes) {
        Analysis::Measured(metric) => metric,
        Analysis::Absent(reason) => panic!("{path} should be analyzable: {reason}"),
    }
}

#[test]
fn own_analyzer_source_has_branches() {
    let code = include_bytes!("../src/analyzer.rs");
    let metric = analyze("analyzer.rs", "src/analyzer.rs", code);

    assert_eq!(metric.language, Language::Rust);
    assert!(metric.functions >= 5, "got {metric:?}");
    assert!(
        metric.complexity > metric.functions as u32,
        "branches should push complexity above the function count: {metric:?}"
    );
    assert_eq!(
        metric.line_count,
        std::str::from_utf8(code).unwrap().lines().count()
    );
}

#[test]
fn keyword_backend_covers_languages_without_grammar() {
    let code = b"package main\n\nfunc main() {\n\tif ok || retry {\n\t}\n}\n";
    let metric = analyze("main.go", "cmd/main.go", code);

    assert_eq!(metric.language, Language::Go);
    assert_eq!(metric.functions, 1);
    assert_eq!(metric.complexity, 3);
}

#[test]
fn unknown_extension_still_measures_lines() {
    let code = b"SELECT 1;\nSELECT 2;\n";
    let metric = analyze("q.sql", "db/q.sql", code);

    assert_eq!(metric.language, Language::Other);
    assert_eq!(metric.line_count, 2);
    assert_eq!(metric.complexity, 1);
}
