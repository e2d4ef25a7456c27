use std::io::{self, Write};

use anyhow::{Context, Result};

use super::Report;

const RULE: &str = "----------------------------------";

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="UTF-8">
	<title>{{ title | escape }}</title>
	<style>
		* {
			font-family: sans-serif;
		}
	</style>
</head>

<body>
	<h1>{{ title | escape }}</h1>
	<ul>
{%- for item in items %}
	<li><a href="{{ item.link | escape }}">{{ item.key | escape }}</a> | {{ item.summary | escape }} - <strong>{{ item.status | escape }}</strong></li>
{%- endfor %}
	</ul>
{%- if counts %}
	<p>In progress: {{ counts.in_progress }} | In review: {{ counts.in_review }} | Done: {{ counts.done }}</p>
{%- endif %}
</body>
</html>
"#;

/// Plain-text report, one entry per item followed by the bucket counts.
pub fn render_plain(report: &Report, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{RULE}")?;

    for item in &report.items {
        writeln!(out, "\n{} - {}", item.name, item.status)?;
        writeln!(out, "{}", item.link)?;
    }

    writeln!(out, "\n{RULE}")?;
    match &report.counts {
        Some(counts) => {
            writeln!(out, "In progress: {}", counts.in_progress)?;
            writeln!(out, "In review: {}", counts.in_review)?;
            writeln!(out, "Done: {}", counts.done)?;
        }
        None => writeln!(out, "Total: {}", report.items.len())?,
    }
    Ok(())
}

/// Standalone HTML document listing every item with its status.
pub fn render_html(report: &Report) -> Result<String> {
    let parser = liquid::ParserBuilder::with_stdlib()
        .build()
        .context("Failed to build template parser")?;
    let template = parser
        .parse(HTML_TEMPLATE)
        .context("Failed to parse report template")?;

    let title = format!("Report {} week {}", report.year, report.week);
    let mut globals = liquid::Object::new();
    globals.insert(
        "title".into(),
        liquid::model::to_value(&title).context("Failed to prepare report title")?,
    );
    globals.insert(
        "items".into(),
        liquid::model::to_value(&report.items).context("Failed to prepare report items")?,
    );
    globals.insert(
        "counts".into(),
        liquid::model::to_value(&report.counts).context("Failed to prepare report counts")?,
    );

    template
        .render(&globals)
        .context("Failed to render report template")
}
