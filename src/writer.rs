//! HTML serialization of the rendered network
//!
//! Writing goes through an ordered list of [`WriteStrategy`] candidates.
//! The first one that produces and writes a document wins; if every
//! candidate fails, the individual failures are returned together as a
//! [`WriteError`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::render::Renderable;

/// Embedded page template and renderer script
#[derive(RustEmbed)]
#[folder = "web-assets/"]
struct Assets;

/// Template used by the primary strategy
pub const TEMPLATE_NAME: &str = "network.html";

/// Page title of the generated document
pub const PAGE_TITLE: &str = "LinkedIn Network";

/// Renderer script inlined into every page
pub const SCRIPT_NAME: &str = "network.js";

const PLACEHOLDERS: [&str; 9] = [
    "{{title}}",
    "{{script}}",
    "{{bgcolor}}",
    "{{width}}",
    "{{height}}",
    "{{font_color}}",
    "{{nodes}}",
    "{{edges}}",
    "{{options}}",
];

/// Failure of a single write strategy
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("asset '{0}' is not embedded")]
    AssetMissing(String),

    #[error("asset '{0}' is not valid UTF-8")]
    AssetEncoding(String),

    #[error("template is missing placeholder {0}")]
    Placeholder(&'static str),

    #[error("failed to serialize graph data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A strategy that failed, with the reason
#[derive(Debug)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub error: RenderError,
}

/// Every write strategy failed
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("no write strategy configured")]
    NoStrategies,

    #[error("all {} write strategies failed: {}", .0.len(), describe_failures(.0))]
    AllFailed(Vec<StrategyFailure>),
}

fn describe_failures(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.strategy, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A way of turning a [`Renderable`] into an HTML document
pub trait WriteStrategy {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Produce the complete HTML document
    fn document(&self, renderable: &Renderable) -> Result<String, RenderError>;
}

/// Fills the embedded page template
#[derive(Debug, Clone)]
pub struct TemplateStrategy {
    template: String,
}

impl TemplateStrategy {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for TemplateStrategy {
    fn default() -> Self {
        Self::new(TEMPLATE_NAME)
    }
}

impl WriteStrategy for TemplateStrategy {
    fn name(&self) -> &'static str {
        "template"
    }

    fn document(&self, renderable: &Renderable) -> Result<String, RenderError> {
        let template = embedded_text(&self.template)?;
        if let Some(missing) = PLACEHOLDERS.iter().copied().find(|p| !template.contains(p)) {
            return Err(RenderError::Placeholder(missing));
        }

        let canvas = &renderable.canvas;
        let script = embedded_text(SCRIPT_NAME)?;
        let title = escape_html(PAGE_TITLE);
        let bgcolor = escape_html(&canvas.bgcolor);
        let width = escape_html(&canvas.width);
        let height = escape_html(&canvas.height);
        let font_color = escape_html(&canvas.font_color);
        let nodes = script_json(&renderable.nodes)?;
        let edges = script_json(&renderable.edges)?;
        let options = script_json(&renderable.options)?;

        Ok(fill_template(
            &template,
            &[
                ("{{title}}", title.as_str()),
                ("{{script}}", script.as_str()),
                ("{{bgcolor}}", bgcolor.as_str()),
                ("{{width}}", width.as_str()),
                ("{{height}}", height.as_str()),
                ("{{font_color}}", font_color.as_str()),
                ("{{nodes}}", nodes.as_str()),
                ("{{edges}}", edges.as_str()),
                ("{{options}}", options.as_str()),
            ],
        ))
    }
}

/// Builds the page in code, without the embedded template
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineStrategy;

impl WriteStrategy for InlineStrategy {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn document(&self, renderable: &Renderable) -> Result<String, RenderError> {
        let canvas = &renderable.canvas;
        let script = embedded_text(SCRIPT_NAME)?;
        let nodes = script_json(&renderable.nodes)?;
        let edges = script_json(&renderable.edges)?;
        let options = script_json(&renderable.options)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script type="text/javascript">
{script}
</script>
<style type="text/css">
body {{ margin: 0; background-color: {bgcolor}; }}
#network {{ width: {width}; height: {height}; background-color: {bgcolor}; }}
</style>
</head>
<body>
<div id="network"></div>
<script type="text/javascript">
var data = {{ nodes: new vis.DataSet({nodes}), edges: new vis.DataSet({edges}) }};
var network = new vis.Network(document.getElementById("network"), data, {options});
</script>
</body>
</html>
"#,
            title = escape_html(PAGE_TITLE),
            bgcolor = escape_html(&canvas.bgcolor),
            width = escape_html(&canvas.width),
            height = escape_html(&canvas.height),
        ))
    }
}

/// Primary template strategy followed by the inline fallback
pub fn default_strategies() -> Vec<Box<dyn WriteStrategy>> {
    vec![
        Box::new(TemplateStrategy::default()),
        Box::new(InlineStrategy),
    ]
}

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub strategy: &'static str,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Serialize `renderable` to `path` using the first strategy that succeeds
pub fn write_html(
    renderable: &Renderable,
    path: &Path,
    strategies: &[Box<dyn WriteStrategy>],
) -> Result<WriteReport, WriteError> {
    if strategies.is_empty() {
        return Err(WriteError::NoStrategies);
    }

    info!("Saving visualization to {}...", path.display());
    let mut failures: Vec<StrategyFailure> = Vec::new();

    for strategy in strategies {
        if !failures.is_empty() {
            info!("Trying {} save method...", strategy.name());
        }

        let result = strategy.document(renderable).and_then(|html| {
            fs::write(path, &html).map_err(|source| RenderError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(html.len())
        });

        match result {
            Ok(bytes) => {
                return Ok(WriteReport {
                    strategy: strategy.name(),
                    path: path.to_path_buf(),
                    bytes,
                });
            }
            Err(error) => {
                warn!("{} save method failed: {}", strategy.name(), error);
                failures.push(StrategyFailure {
                    strategy: strategy.name(),
                    error,
                });
            }
        }
    }

    Err(WriteError::AllFailed(failures))
}

/// Check that the output file exists and log the result.
///
/// Existence says a file was written, not that its content is well formed.
pub fn verify_output(path: &Path) -> bool {
    if path.is_file() {
        info!("Successfully created {}", path.display());
        true
    } else {
        error!("Failed to create {}", path.display());
        false
    }
}

fn embedded_text(name: &str) -> Result<String, RenderError> {
    let asset = Assets::get(name).ok_or_else(|| RenderError::AssetMissing(name.to_string()))?;
    String::from_utf8(asset.data.into_owned())
        .map_err(|_| RenderError::AssetEncoding(name.to_string()))
}

/// Replace `{{name}}` placeholders in a single pass over the template.
///
/// Substituted values are never scanned again, so data containing
/// placeholder text is emitted as is. Unknown placeholders are kept.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut output = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];
        let matched = tail.find("}}").and_then(|end| {
            let key = &tail[..end + 2];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, key.len()))
        });

        match matched {
            Some((value, consumed)) => {
                output.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                output.push_str("{{");
                rest = &tail[2..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Serialize a value for embedding inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::loader::Record;
    use crate::render::{Canvas, RenderOptions, render};

    fn sample_renderable() -> Renderable {
        let records = vec![
            Record::new("Alice", "Smith", "Eng", "Acme"),
            Record::new("Bob", "Jones", "Mgr", "Acme"),
            Record::new("Carol", "Lee", "", "BigCo</script>"),
        ];
        let outcome = build_graph(&records);
        render(&outcome.graph, &Canvas::default(), &RenderOptions::default())
    }

    #[test]
    fn test_template_document() {
        let html = TemplateStrategy::default()
            .document(&sample_renderable())
            .unwrap();

        assert!(html.contains("<title>LinkedIn Network</title>"));
        assert!(html.contains("height: 800px"));
        assert!(html.contains("background-color: #222222"));
        assert!(html.contains("\"id\":\"Alice Smith\""));
        assert!(html.contains("\"relation\":\"same_company\""));
        assert!(html.contains("\"randomSeed\":42"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_script_content_cannot_close_tag() {
        let html = InlineStrategy.document(&sample_renderable()).unwrap();

        assert!(html.contains("BigCo<\\/script>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_missing_template() {
        let err = TemplateStrategy::new("absent.html")
            .document(&sample_renderable())
            .unwrap_err();
        assert!(matches!(err, RenderError::AssetMissing(_)));
    }

    fn node_literal(html: &str) -> Vec<serde_json::Value> {
        let marker = "var nodes = new vis.DataSet(";
        let start = html.find(marker).unwrap() + marker.len();
        let end = start + html[start..].find(");").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_placeholder_text_in_data_is_kept() {
        let records = vec![
            Record::new("Alice", "Smith", "", "{{options}}"),
            Record::new("Bob", "Jones", "{{edges}}", ""),
        ];
        let outcome = build_graph(&records);
        let renderable = render(&outcome.graph, &Canvas::default(), &RenderOptions::default());

        let html = TemplateStrategy::default().document(&renderable).unwrap();
        let nodes = node_literal(&html);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["company"], "{{options}}");
        assert_eq!(nodes[0]["title"], "Company: {{options}}");
        assert_eq!(nodes[1]["title"], "Position: {{edges}}");
    }

    #[test]
    fn test_fill_template() {
        let filled = fill_template(
            "a={{a}} b={{b}} c={{c}} {{",
            &[("{{a}}", "{{b}}"), ("{{b}}", "2")],
        );
        assert_eq!(filled, "a={{b}} b=2 c={{c}} {{");
    }

    #[test]
    fn test_documents_are_self_contained() {
        let renderable = sample_renderable();
        let strategies: [&dyn WriteStrategy; 2] = [&TemplateStrategy::default(), &InlineStrategy];

        for strategy in strategies {
            let html = strategy.document(&renderable).unwrap();
            assert!(!html.contains("src=\"http"), "{} links a remote script", strategy.name());
            assert!(html.contains("global.vis = { DataSet: DataSet, Network: Network }"));
        }
    }

    #[test]
    fn test_embedded_script_is_safe_to_inline() {
        let script = embedded_text(SCRIPT_NAME).unwrap();
        assert!(!script.contains("</script"));
    }

    #[test]
    fn test_write_uses_primary_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.html");

        let report = write_html(&sample_renderable(), &path, &default_strategies()).unwrap();

        assert_eq!(report.strategy, "template");
        assert_eq!(report.path, path);
        assert!(verify_output(&path));
        assert_eq!(fs::read_to_string(&path).unwrap().len(), report.bytes);
    }

    #[test]
    fn test_write_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.html");
        let strategies: Vec<Box<dyn WriteStrategy>> = vec![
            Box::new(TemplateStrategy::new("absent.html")),
            Box::new(InlineStrategy),
        ];

        let report = write_html(&sample_renderable(), &path, &strategies).unwrap();

        assert_eq!(report.strategy, "inline");
        assert!(verify_output(&path));
    }

    #[test]
    fn test_write_all_strategies_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("network.html");

        let err = write_html(&sample_renderable(), &path, &default_strategies()).unwrap_err();

        match err {
            WriteError::AllFailed(failures) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].strategy, "template");
                assert!(matches!(failures[1].error, RenderError::Io { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!verify_output(&path));
    }

    #[test]
    fn test_write_without_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_html(&sample_renderable(), &dir.path().join("x.html"), &[]).unwrap_err();
        assert!(matches!(err, WriteError::NoStrategies));
    }
}
