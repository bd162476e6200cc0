use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

/// Helper function to run barplots with arguments and CSV on stdin
fn run_barplots(args: &[&str], csv_content: &str) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_barplots"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(csv_content.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

#[test]
fn test_end_to_end_two_level_chart() {
    let csv = fs::read_to_string("test/metrics.csv").expect("Failed to read test CSV");
    let result = run_barplots(&["--index", "model", "metric", "--value", "score"], &csv);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_subplots_with_std() {
    let csv = fs::read_to_string("test/metrics.csv").expect("Failed to read test CSV");
    let result = run_barplots(
        &["--index", "run", "model", "metric", "--value", "score", "--std", "std"],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_styles_from_flags() {
    let csv = fs::read_to_string("test/metrics.csv").expect("Failed to read test CSV");
    let result = run_barplots(
        &[
            "--index", "run", "model", "metric",
            "--value", "score",
            "--color", "cnn=red",
            "--color", "mlp=#1f77b4",
            "--alpha", "run1=0.5",
            "--alpha", "run2=0.9",
            "--hatch", "cnn=//",
            "--hatch", "mlp=x",
            "--horizontal",
            "--minor-rotation", "auto",
            "--major-rotation", "90",
            "--title", "Scores",
        ],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_missing_style_fails() {
    let csv = fs::read_to_string("test/metrics.csv").expect("Failed to read test CSV");
    let result = run_barplots(
        &["--index", "model", "metric", "--value", "score", "--color", "cnn=red"],
        &csv,
    );
    let err = result.expect_err("mlp bars have no color");
    assert!(err.contains("no style matches"), "unexpected error: {}", err);
}

#[test]
fn test_end_to_end_config_file() {
    let csv = fs::read_to_string("test/metrics.csv").expect("Failed to read test CSV");
    let result = run_barplots(
        &["--index", "run", "model", "metric", "--value", "score", "--config", "test/config.json"],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_svg_output() {
    let csv = fs::read_to_string("test/negative_values.csv").expect("Failed to read test CSV");
    let result = run_barplots(&["--index", "group", "item", "--format", "svg"], &csv);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = String::from_utf8(result.unwrap()).expect("SVG is text");
    assert!(svg.contains("<svg"));
}

#[test]
fn test_end_to_end_json_input() {
    let result = run_barplots(
        &["--index", "model", "metric", "--input", "test/metrics.json"],
        "",
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_column_not_found() {
    let csv = "a,b\n1,2\n";
    let result = run_barplots(&["--index", "missing"], csv);
    let err = result.expect_err("missing column must fail");
    assert!(err.contains("missing"));
}

#[test]
fn test_end_to_end_non_numeric_data() {
    let csv = fs::read_to_string("test/mixed_types.csv").expect("Failed to read test CSV");
    let result = run_barplots(&["--index", "group"], &csv);
    let err = result.expect_err("non-numeric value must fail");
    assert!(err.contains("not-a-number"));
}

#[test]
fn test_end_to_end_empty_csv() {
    let result = run_barplots(&["--index", "group"], "group,value\n");
    assert!(result.is_err());
}

#[test]
fn test_end_to_end_bad_assignment() {
    let csv = fs::read_to_string("test/metrics.csv").expect("Failed to read test CSV");
    let result = run_barplots(&["--index", "model", "--color", "no-equals-sign"], &csv);
    assert!(result.is_err());
}

// Library-level checks on the assembled scene

mod library {
    use barplots::csv_reader::read_csv;
    use barplots::{build_scene, BarplotConfig, RenderOptions};

    #[test]
    fn test_csv_to_scene() {
        let csv = std::fs::read_to_string("test/metrics.csv").unwrap();
        let data = read_csv(csv.as_bytes()).unwrap();
        let index = ["run", "model", "metric"].map(String::from);
        let table = data.to_table(&index, Some("score"), Some("std")).unwrap();

        let scene = build_scene(&table, &BarplotConfig::default(), &RenderOptions::default()).unwrap();
        // two runs in a near-square grid
        assert_eq!((scene.nrow, scene.ncol), (1, 2));
        let titles: Vec<_> = scene.panels.iter().map(|p| p.title.as_deref()).collect();
        assert_eq!(titles, vec![Some("run1"), Some("run2")]);

        // side by side panels do not share the categorical axis
        for panel in &scene.panels {
            assert_eq!(panel.axes.x.minor.labels, vec!["AUROC", "AUPRC", "AUROC", "AUPRC"]);
            assert_eq!(panel.axes.x.major.labels.len(), 2);
        }
        // the value label is shared along the row
        assert_eq!(scene.panels[0].axes.y.label.as_deref(), Some("score"));
        assert_eq!(scene.panels[1].axes.y.label.as_deref(), Some(""));
    }

    #[test]
    fn test_config_file_custom_defaults() {
        let csv = std::fs::read_to_string("test/metrics.csv").unwrap();
        let data = read_csv(csv.as_bytes()).unwrap();
        let index = ["run", "model", "metric"].map(String::from);
        let table = data.to_table(&index, Some("score"), None).unwrap();
        let config = BarplotConfig::from_json_file(std::path::Path::new("test/config.json")).unwrap();

        let scene = build_scene(&table, &config, &RenderOptions::default()).unwrap();
        assert_eq!((scene.nrow, scene.ncol), (1, 2));
        // horizontal bars in one row share the categorical axis: left panel labels it
        assert_eq!(scene.panels[0].axes.y.minor.labels[0], "Area Under ROC");
        assert!(scene.panels[1].axes.y.minor.labels.is_empty());
        assert_eq!(scene.title.as_deref(), Some("Model comparison"));
    }
}
