//! HTML Export
//!
//! Runs the document through the converter and writes the result as UTF-8.
//! Converters that emit only a body fragment get wrapped in a complete HTML
//! document with a small default stylesheet.

use crate::error::{Error, Result};
use crate::preview::Converter;
use log::info;
use std::fs;
use std::path::Path;

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Whether converter output is already a full document.
pub fn is_complete_document(html: &str) -> bool {
    let head: String = html.trim_start().chars().take(256).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.contains("<html")
}

/// Wrap an HTML fragment into a standalone document.
pub fn wrap_standalone(fragment: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="YAME">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="markdown-body">
{body}
    </article>
</body>
</html>
"#,
        title = html_escape(title),
        css = BASE_CSS,
        body = fragment,
    )
}

/// Convert `markdown` and write the HTML to `output_path`.
///
/// When `standalone` is set, fragment output is wrapped into a complete
/// document titled `title`.
pub fn export_html(
    converter: &Converter,
    markdown: &str,
    output_path: &Path,
    title: &str,
    standalone: bool,
) -> Result<()> {
    let html = converter.convert(markdown)?;
    let html = if standalone && !is_complete_document(&html) {
        wrap_standalone(&html, title)
    } else {
        html
    };

    fs::write(output_path, html.as_bytes()).map_err(|source| Error::FileWrite {
        path: output_path.to_path_buf(),
        source,
    })?;
    info!("Exported HTML to {}", output_path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

/// Default stylesheet for wrapped exports.
const BASE_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    color: #24292f;
}

.markdown-body {
    max-width: 860px;
    margin: 0 auto;
    padding: 32px 24px;
}

.markdown-body h1, .markdown-body h2 { border-bottom: 1px solid #d0d7de; padding-bottom: 0.3em; }
.markdown-body h1, .markdown-body h2, .markdown-body h3 { line-height: 1.25; margin: 24px 0 16px; }

.markdown-body code, .markdown-body pre {
    font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace;
    background: #f6f8fa;
    border-radius: 4px;
}
.markdown-body code { padding: 0.2em 0.4em; font-size: 0.9em; }
.markdown-body pre { padding: 16px; overflow: auto; }
.markdown-body pre code { padding: 0; background: transparent; }

.markdown-body blockquote {
    margin: 0 0 16px;
    padding: 0 1em;
    color: #57606a;
    border-left: 4px solid #d0d7de;
}

.markdown-body table { border-collapse: collapse; margin-bottom: 16px; }
.markdown-body th, .markdown-body td { border: 1px solid #d0d7de; padding: 6px 12px; }
"#;

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_is_complete_document() {
        assert!(is_complete_document("<!DOCTYPE html><html></html>"));
        assert!(is_complete_document("  <html lang=\"de\">"));
        assert!(is_complete_document("<?xml version=\"1.0\"?>\n<html>"));
        assert!(!is_complete_document("<h1>Title</h1>\n<p>Body</p>"));
    }

    #[test]
    fn test_wrap_standalone() {
        let html = wrap_standalone("<p>Grüße</p>", "Notes & Ideas");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"UTF-8\">"));
        assert!(html.contains("<title>Notes &amp; Ideas</title>"));
        assert!(html.contains("<p>Grüße</p>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_export_writes_utf8() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.html");
        let converter = Converter::new("cat", Vec::new()).unwrap();

        export_html(&converter, "<p>Köln</p>", &out, "doc", false).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "<p>Köln</p>");
    }

    #[cfg(unix)]
    #[test]
    fn test_export_standalone_wraps_fragment() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.html");
        let converter = Converter::new("cat", Vec::new()).unwrap();

        export_html(&converter, "<p>x</p>", &out, "notes", true).unwrap();
        let html = fs::read_to_string(&out).unwrap();
        assert!(html.contains("<title>notes</title>"));
        assert!(html.contains("<p>x</p>"));
    }

    #[cfg(unix)]
    #[test]
    fn test_export_keeps_complete_documents() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.html");
        let converter = Converter::new("cat", Vec::new()).unwrap();
        let doc = "<!DOCTYPE html><html><body>x</body></html>";

        export_html(&converter, doc, &out, "notes", true).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), doc);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_conversion_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.html");
        let converter = Converter::new("false", Vec::new()).unwrap();

        assert!(export_html(&converter, "x", &out, "notes", true).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_unwritable_path_is_write_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("missing").join("out.html");
        let converter = Converter::new("cat", Vec::new()).unwrap();
        if cfg!(unix) {
            assert!(matches!(
                export_html(&converter, "x", &out, "notes", false),
                Err(Error::FileWrite { .. })
            ));
        }
    }
}
