//! Serialization of a built graph for external renderers.
//!
//! JSON is the lossless interchange form and can be read back with
//! [`import_json`]. GEXF and CSV are write-only views.

use crate::color::{alpha_of, Rgb};
use crate::error::Result;
use crate::types::{BiographyGraph, GraphData};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Gexf,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "gexf" => Ok(Self::Gexf),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format '{other}' (expected json, gexf or csv)")),
        }
    }
}

/// Pretty-printed [`GraphData`]
pub fn to_json(graph: &BiographyGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&graph.to_data())?)
}

/// Inverse of [`to_json`]
pub fn import_json(json: &str) -> Result<BiographyGraph> {
    let data: GraphData = serde_json::from_str(json)?;
    BiographyGraph::from_data(data)
}

/// Node table and edge table, each with a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTables {
    pub nodes: String,
    pub edges: String,
}

pub fn to_csv(graph: &BiographyGraph) -> CsvTables {
    let mut nodes = String::from("id,label,kind,tier,size,color,border_color,activity,date\n");
    for node in graph.nodes() {
        let row = [
            quote(&node.id),
            quote(&node.label),
            quote(node.kind.as_str()),
            quote(node.tier.as_str()),
            node.size.to_string(),
            quote(&node.color),
            quote(&node.border_color),
            node.activity.map(|a| a.to_string()).unwrap_or_default(),
            node.date.map(|d| d.to_string()).unwrap_or_default(),
        ];
        nodes.push_str(&row.join(","));
        nodes.push('\n');
    }

    let mut edges = String::from("source,target,kind,width,color,dashed,arrow\n");
    for edge in graph.edges() {
        let row = [
            quote(&edge.source),
            quote(&edge.target),
            quote(edge.kind.as_str()),
            edge.width.to_string(),
            quote(&edge.color),
            edge.dashed.to_string(),
            edge.arrow.to_string(),
        ];
        edges.push_str(&row.join(","));
        edges.push('\n');
    }

    CsvTables { nodes, edges }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// GEXF 1.2 document with kind/tier/activity/title node attributes and
/// viz size and color
pub fn to_gexf(graph: &BiographyGraph) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_gexf(graph, &mut out);
    out
}

fn write_gexf(graph: &BiographyGraph, out: &mut String) -> std::fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<gexf xmlns="http://www.gexf.net/1.2draft" xmlns:viz="http://www.gexf.net/1.2draft/viz" version="1.2">"#
    )?;
    writeln!(out, r#"  <meta><creator>biograph</creator></meta>"#)?;
    writeln!(out, r#"  <graph mode="static" defaultedgetype="directed">"#)?;
    writeln!(out, r#"    <attributes class="node">"#)?;
    writeln!(out, r#"      <attribute id="0" title="kind" type="string"/>"#)?;
    writeln!(out, r#"      <attribute id="1" title="tier" type="string"/>"#)?;
    writeln!(out, r#"      <attribute id="2" title="activity" type="integer"/>"#)?;
    writeln!(out, r#"      <attribute id="3" title="title" type="string"/>"#)?;
    writeln!(out, r#"    </attributes>"#)?;

    writeln!(out, "    <nodes>")?;
    for node in graph.nodes() {
        writeln!(
            out,
            r#"      <node id="{}" label="{}">"#,
            escape_xml(&node.id),
            escape_xml(&node.label)
        )?;
        writeln!(out, "        <attvalues>")?;
        writeln!(out, r#"          <attvalue for="0" value="{}"/>"#, node.kind.as_str())?;
        writeln!(out, r#"          <attvalue for="1" value="{}"/>"#, node.tier.as_str())?;
        if let Some(activity) = node.activity {
            writeln!(out, r#"          <attvalue for="2" value="{activity}"/>"#)?;
        }
        writeln!(out, r#"          <attvalue for="3" value="{}"/>"#, escape_xml(&node.title))?;
        writeln!(out, "        </attvalues>")?;
        writeln!(out, r#"        <viz:size value="{}"/>"#, node.size)?;
        if let Some(rgb) = Rgb::parse(&node.color) {
            writeln!(
                out,
                r#"        <viz:color r="{}" g="{}" b="{}" a="{}"/>"#,
                rgb.r,
                rgb.g,
                rgb.b,
                alpha_of(&node.color)
            )?;
        }
        writeln!(out, "      </node>")?;
    }
    writeln!(out, "    </nodes>")?;

    writeln!(out, "    <edges>")?;
    for (i, edge) in graph.edges().enumerate() {
        writeln!(
            out,
            r#"      <edge id="{i}" source="{}" target="{}" label="{}" weight="{}"/>"#,
            escape_xml(&edge.source),
            escape_xml(&edge.target),
            edge.kind.as_str(),
            edge.width
        )?;
    }
    writeln!(out, "    </edges>")?;
    writeln!(out, "  </graph>")?;
    writeln!(out, "</gexf>")
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::config::GraphConfig;
    use biograph_protocol::{EntityCategory, Letter};
    use pretty_assertions::assert_eq;

    fn sample() -> BiographyGraph {
        let letters = vec![Letter::new("1888-05-01", "Jo \"Bonger\"", "Vincent")
            .with_mentions(EntityCategory::Organization, ["Goupil & Cie"])];
        GraphBuilder::new(GraphConfig::default()).build(&letters, "Vincent")
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let graph = sample();
        let restored = import_json(&to_json(&graph).unwrap()).unwrap();
        assert_eq!(restored.to_data(), graph.to_data());
    }

    #[test]
    fn test_import_rejects_dangling_edge() {
        let json = r##"{"nodes": [], "edges": [{"source": "a", "target": "b", "kind": "sent",
            "width": 1.0, "color": "#000000", "dashed": false, "arrow": true}]}"##;
        assert!(import_json(json).is_err());
        assert!(import_json("not json").is_err());
    }

    #[test]
    fn test_gexf_escapes_and_colors() {
        let gexf = to_gexf(&sample());
        assert!(gexf.contains(r#"label="Goupil &amp; Cie""#));
        assert!(gexf.contains(r#"id="person:Jo &quot;Bonger&quot;""#));
        // Subject color #6366f1
        assert!(gexf.contains(r#"<viz:color r="99" g="102" b="241" a="1"/>"#));
        assert_eq!(gexf.matches("<edge ").count(), 3);
    }

    #[test]
    fn test_csv_quotes_fields() {
        let tables = to_csv(&sample());
        // Letter labels hold a quoted line break, so count rows by their opening quote
        assert_eq!(tables.nodes.lines().filter(|l| l.starts_with('"')).count(), 4);
        assert_eq!(tables.edges.lines().count(), 1 + 3);
        assert!(tables.nodes.contains(r#""person:Jo ""Bonger""""#));
        assert!(tables.edges.contains(r#""letter:1","organization:Goupil & Cie","mentions_organization""#));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("GEXF".parse::<ExportFormat>(), Ok(ExportFormat::Gexf));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
