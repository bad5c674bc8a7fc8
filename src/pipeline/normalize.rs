use crate::error::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Remove exactly one layer of surrounding double quotes, if both ends carry one.
pub fn strip_outer_quotes(text: &str) -> &str {
    if text.starts_with('"') && text.ends_with('"') {
        if text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            // a lone `"` both starts and ends with a quote
            ""
        }
    } else {
        text
    }
}

/// Repair one raw quasi-CSV line: trim, drop one outer quote layer, collapse `""` into `"`.
///
/// The order matters: the outer layer is removed before doubled quotes are collapsed, so
/// `"""High""value"` becomes `"High"value`.
pub fn normalize_line(raw: &str) -> String {
    strip_outer_quotes(raw.trim()).replace("\"\"", "\"")
}

/// Normalize every line of `input` into `output`, preserving line order.
///
/// Returns the number of lines written.
pub fn normalize_file(input: &Path, output: &Path) -> Result<usize> {
    let content = fs::read_to_string(input)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(output)?);
    let mut count = 0;
    for (line_no, raw) in content.lines().enumerate() {
        let cleaned = normalize_line(raw);
        if cleaned != raw {
            debug!(line = line_no + 1, "Repaired quoting");
        }
        writeln!(writer, "{}", cleaned)?;
        count += 1;
    }
    writer.flush()?;

    info!("Saved cleaned file to {}", output.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn strips_single_outer_layer_then_collapses() {
        assert_eq!(normalize_line(r#""""High""value""#), r#""High"value"#);
    }

    #[test]
    fn repairs_wrapped_row_with_quoted_comment() {
        let raw = r#""jane@acme.io,VP Sales,""Need a demo, ASAP""""#;
        assert_eq!(
            normalize_line(raw),
            r#"jane@acme.io,VP Sales,"Need a demo, ASAP""#
        );
    }

    #[test]
    fn clean_line_is_untouched_apart_from_trim() {
        assert_eq!(
            normalize_line("  bob@x.org,Analyst,Curious  \r"),
            "bob@x.org,Analyst,Curious"
        );
    }

    #[test]
    fn only_one_side_quoted_keeps_quote() {
        assert_eq!(normalize_line(r#""a,b,c"#), r#""a,b,c"#);
    }

    #[test]
    fn lone_quote_becomes_empty() {
        assert_eq!(strip_outer_quotes("\""), "");
        assert_eq!(strip_outer_quotes("\"\""), "");
        assert_eq!(strip_outer_quotes("plain"), "plain");
    }

    #[test]
    fn normalize_file_preserves_order() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("leads.csv");
        let output = dir.path().join("nested").join("leads_clean.csv");
        fs::write(
            &input,
            "\"a@x.io,CTO,\"\"Demo please\"\"\"\nb@x.io,Engineer,Looking\n\"c@x.io,Student,Thesis\"\n",
        )
        .unwrap();

        let count = normalize_file(&input, &output).unwrap();
        assert_eq!(count, 3);

        let written = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines,
            vec![
                "a@x.io,CTO,\"Demo please\"",
                "b@x.io,Engineer,Looking",
                "c@x.io,Student,Thesis",
            ]
        );
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        let result = normalize_file(&dir.path().join("nope.csv"), &dir.path().join("out.csv"));
        assert!(result.is_err());
    }
}
