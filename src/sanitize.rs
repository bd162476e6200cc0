//! Human-readable labels for categories and axis numerals.

use std::collections::HashMap;

/// Canonical label → raw aliases that should display as it
pub type CustomDefaults = HashMap<String, Vec<String>>;

/// Built-in canonical names for common metric labels
const DEFAULTS: &[(&str, &[&str])] = &[
    ("AUROC", &["auroc", "roc auc", "auc roc", "roc auc score"]),
    ("AUPRC", &["auprc", "pr auc", "auc pr", "average precision"]),
    ("Accuracy", &["acc", "accuracy"]),
    ("Balanced accuracy", &["balanced acc", "balanced accuracy"]),
    ("F1 Score", &["f1", "f1 score"]),
    ("MSE", &["mse", "mean squared error"]),
    ("MAE", &["mae", "mean absolute error"]),
    ("Loss", &["loss"]),
    ("Precision", &["precision"]),
    ("Recall", &["recall"]),
];

/// Lowercase, with `_`, `-` and runs of whitespace folded into single spaces
fn normalize(raw: &str) -> String {
    raw.replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sanitize a single raw label
pub fn sanitize_label(raw: &str, custom_defaults: &CustomDefaults) -> String {
    let trimmed = raw.trim();
    if let Some(number) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) {
        return format_number(number);
    }

    let key = normalize(trimmed);

    // Sorted so that overlapping aliases resolve the same way every run
    let mut custom: Vec<_> = custom_defaults.iter().collect();
    custom.sort_by(|a, b| a.0.cmp(b.0));
    for (canonical, aliases) in custom {
        if normalize(canonical) == key || aliases.iter().any(|a| normalize(a) == key) {
            return canonical.clone();
        }
    }

    for (canonical, aliases) in DEFAULTS {
        if aliases.iter().any(|a| *a == key) {
            return canonical.to_string();
        }
    }

    // snake_case and kebab-case identifiers become title-cased words;
    // anything else is displayed as written
    if !trimmed.contains(['_', '-']) {
        return trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    let words: Vec<String> = trimmed
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalize_lowercase_word)
        .collect();
    // separators alone would otherwise leave nothing to display
    if words.is_empty() {
        return trimmed.to_string();
    }
    words.join(" ")
}

/// Sanitize a batch of labels, preserving arity and order
pub fn sanitize_labels<S: AsRef<str>>(raws: &[S], custom_defaults: &CustomDefaults) -> Vec<String> {
    raws.iter()
        .map(|raw| sanitize_label(raw.as_ref(), custom_defaults))
        .collect()
}

/// Numeric tick formatter: stringify, then sanitize
pub fn sanitize_digits(value: f64) -> String {
    sanitize_label(&value.to_string(), &CustomDefaults::new())
}

fn capitalize_lowercase_word(word: &str) -> String {
    if !word.chars().all(|c| !c.is_alphabetic() || c.is_lowercase()) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e6 || magnitude < 1e-3 {
        let formatted = format!("{:.2e}", value);
        // 1.50e6 -> 1.5e6
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
            None => formatted,
        };
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    trim_zeros(&format!("{:.3}", value)).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
