//! Best-effort repair of Mermaid diagram text produced by a model.
//!
//! This is not a Mermaid parser. Each pass is a line-oriented rewrite that
//! fixes one family of mistakes models commonly make:
//!
//! - unquoted node or edge labels containing characters Mermaid treats as
//!   syntax (`(`, `:`, `"` ...)
//! - `subgraph` blocks without a matching `end`, or stray `end` lines
//! - class members listed under `class Foo` without surrounding braces
//! - spaced or typographic arrows (`- ->`, `→`)
//!
//! Labels that nest the same bracket type as their enclosing shape
//! (`A(foo (bar))`) are left untouched.

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::extract;
use crate::types::DiagramType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repaired {
    pub diagram: String,
    pub diagram_type: DiagramType,
    pub changed: bool,
}

const LABEL_SPECIALS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '<', '>', '"', '\'', ':', ';', '|', '&',
];

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

/// Quoted literals, edge labels directly after a link token, and node shapes,
/// matched in one left-to-right scan so a `|` inside a quoted node label is
/// never read as an edge-label delimiter.
fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r#"(?P<lit>"[^"]*")"#,
            r#"|(?P<link><?(?:-{2,}|={2,}|-\.+-)[>ox]?)(?P<gap>\s*)\|(?P<edge>"[^"]*"|[^|]*)\|"#,
            r#"|(?P<id>\b[A-Za-z_][A-Za-z0-9_\-]*)"#,
            r#"(?P<shape>"#,
            r#"\(\[(?:"[^"]*"|[^\[\]()]*)\]\)"#,
            r#"|\[\[(?:"[^"]*"|[^\[\]]*)\]\]"#,
            r#"|\(\((?:"[^"]*"|[^()]*)\)\)"#,
            r#"|\[\((?:"[^"]*"|[^\[\]()]*)\)\]"#,
            r#"|\{\{(?:"[^"]*"|[^{}]*)\}\}"#,
            r#"|\[(?:"[^"]*"|[^\[\]]*)\]"#,
            r#"|\((?:"[^"]*"|[^()]*)\)"#,
            r#"|\{(?:"[^"]*"|[^{}]*)\}"#,
            r#")"#,
        ))
        .unwrap()
    })
}

fn subgraph_bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<head>\s*subgraph\s+)(?P<id>\S+?)\s*\[(?P<title>[^\[\]]*)\]\s*$").unwrap()
    })
}

fn spaced_arrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:-\s+->|--\s+>)").unwrap())
}

fn spaced_thick_arrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:=\s+=>|==\s+>)").unwrap())
}

fn entity_tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\w+;$").unwrap())
}

fn bare_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<indent>\s*)class\s+(?P<name>[A-Za-z_][\w~<>,]*)\s*$").unwrap())
}

fn open_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*class\s+\S+.*\{\s*$").unwrap())
}

fn named_member_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][\w~<>,]*\s+:\s").unwrap())
}

// ---------------------------------------------------------------------------
// Extraction / detection
// ---------------------------------------------------------------------------

/// The diagram body inside model output: the first ```` ```mermaid ```` block,
/// else the first fenced block, else the trimmed text.
pub fn extract_diagram(text: &str) -> String {
    let blocks = extract::code_blocks(text);
    if let Some(b) = blocks
        .iter()
        .find(|b| b.language.as_deref().map(|l| l.eq_ignore_ascii_case("mermaid")) == Some(true))
    {
        return b.body.trim_matches('\n').to_string();
    }
    match blocks.into_iter().next() {
        Some(b) => b.body.trim_matches('\n').to_string(),
        None => text.trim().to_string(),
    }
}

/// Bodies of every ```` ```mermaid ```` block in a Markdown document.
pub fn extract_all(doc: &str) -> Vec<String> {
    extract::code_blocks(doc)
        .into_iter()
        .filter(|b| b.language.as_deref().map(|l| l.eq_ignore_ascii_case("mermaid")) == Some(true))
        .map(|b| b.body)
        .collect()
}

/// Split a leading `---` ... `---` front-matter block from the diagram body.
/// Without a closing delimiter there is no front matter.
fn split_front_matter(text: &str) -> (&str, &str) {
    let mut offset = 0;
    let mut opened = false;
    for line in text.split_inclusive('\n') {
        let t = line.trim();
        offset += line.len();
        if !opened {
            if t.is_empty() {
                continue;
            }
            if t != "---" {
                return ("", text);
            }
            opened = true;
        } else if t == "---" {
            return (&text[..offset], &text[offset..]);
        }
    }
    ("", text)
}

pub fn detect_type(text: &str) -> DiagramType {
    let (_, body) = split_front_matter(text);
    let header = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("%%"));
    let Some(header) = header else {
        return DiagramType::Unknown;
    };
    let keyword = header
        .split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .unwrap_or("");
    match keyword {
        "graph" | "flowchart" | "flowchart-elk" => DiagramType::Flowchart,
        "sequenceDiagram" => DiagramType::Sequence,
        "classDiagram" | "classDiagram-v2" => DiagramType::Class,
        "erDiagram" => DiagramType::Er,
        "stateDiagram" | "stateDiagram-v2" => DiagramType::State,
        "gantt" => DiagramType::Gantt,
        _ => DiagramType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// ASCII quotes, plain spaces, `\n` line endings, no trailing whitespace or
/// statement-terminating `;`.
pub fn normalize_text(text: &str) -> String {
    let replaced: String = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect();

    let lines: Vec<String> = replaced
        .lines()
        .map(|line| {
            let mut l = line.replace('\t', "    ").trim_end().to_string();
            while l.ends_with(';') && !entity_tail_re().is_match(&l) {
                l.pop();
                l = l.trim_end().to_string();
            }
            l
        })
        .collect();

    let mut out = lines.join("\n");
    let trimmed_len = out.trim_end_matches('\n').len();
    out.truncate(trimmed_len);
    out
}

/// Collapse spaced and typographic arrows into Mermaid link syntax.
pub fn fix_arrows(text: &str) -> String {
    let out = text
        .replace('\u{2192}', "-->")
        .replace('\u{27F6}', "-->")
        .replace('\u{21D2}', "==>");
    let out = spaced_arrow_re().replace_all(&out, "-->");
    spaced_thick_arrow_re().replace_all(&out, "==>").into_owned()
}

fn needs_quotes(label: &str) -> bool {
    let t = label.trim();
    if t.is_empty() || is_quoted(t) {
        return false;
    }
    // `[/text/]` and `[\text\]` are shapes, not labels.
    if t.starts_with('/') || t.starts_with('\\') {
        return false;
    }
    t.contains(LABEL_SPECIALS)
}

fn is_quoted(t: &str) -> bool {
    t.len() >= 2 && t.starts_with('"') && t.ends_with('"')
}

fn quote(label: &str) -> String {
    format!("\"{}\"", label.trim().replace('"', "#quot;"))
}

fn split_shape(shape: &str) -> (&str, &str, &str) {
    const DELIMS: &[(&str, &str)] = &[
        ("([", "])"),
        ("[[", "]]"),
        ("((", "))"),
        ("[(", ")]"),
        ("{{", "}}"),
        ("[", "]"),
        ("(", ")"),
        ("{", "}"),
    ];
    for (open, close) in DELIMS {
        if shape.len() >= open.len() + close.len()
            && shape.starts_with(open)
            && shape.ends_with(close)
        {
            let inner = &shape[open.len()..shape.len() - close.len()];
            return (*open, inner, *close);
        }
    }
    ("", shape, "")
}

fn quote_line_labels(line: &str) -> String {
    label_re()
        .replace_all(line, |caps: &Captures| {
            if let Some(edge) = caps.name("edge") {
                if needs_quotes(edge.as_str()) {
                    return format!("{}{}|{}|", &caps["link"], &caps["gap"], quote(edge.as_str()));
                }
                return caps[0].to_string();
            }
            let Some(id) = caps.name("id").map(|m| m.as_str()) else {
                return caps[0].to_string();
            };
            let (open, inner, close) = split_shape(&caps["shape"]);
            if needs_quotes(inner) {
                format!("{id}{open}{}{close}", quote(inner))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn slug_id(title: &str) -> String {
    let mut id = String::from("sg_");
    let mut last_underscore = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            id.push('_');
            last_underscore = true;
        }
    }
    while id.ends_with('_') {
        id.pop();
    }
    id
}

/// A subgraph id for `title` not yet present in `used`. Titles without ASCII
/// alphanumerics are numbered (`sg_1`, `sg_2`, ...).
fn unique_subgraph_id(title: &str, used: &mut HashSet<String>) -> String {
    let base = slug_id(title);
    let mut n = 1;
    let mut id = if base == "sg" {
        format!("{base}_{n}")
    } else {
        base.clone()
    };
    while used.contains(&id) {
        n += 1;
        id = format!("{base}_{n}");
    }
    used.insert(id.clone());
    id
}

fn quote_subgraph_line(line: &str, used: &mut HashSet<String>) -> String {
    if let Some(caps) = subgraph_bracket_re().captures(line) {
        used.insert(caps["id"].to_string());
        let title = &caps["title"];
        if needs_quotes(title) {
            return format!("{}{} [{}]", &caps["head"], &caps["id"], quote(title));
        }
        return line.to_string();
    }

    let indent_len = line.len() - line.trim_start().len();
    let rest = line.trim_start()["subgraph".len()..].trim();
    if rest.is_empty() || is_quoted(rest) || !needs_quotes(rest) {
        if let Some(id) = rest.split_whitespace().next() {
            used.insert(id.to_string());
        }
        return line.to_string();
    }
    let id = unique_subgraph_id(rest, used);
    format!("{}subgraph {id} [{}]", &line[..indent_len], quote(rest))
}

fn is_subgraph_open(trimmed: &str) -> bool {
    trimmed == "subgraph" || trimmed.starts_with("subgraph ")
}

/// Quote flowchart node, edge and subgraph labels that contain characters
/// Mermaid would otherwise parse as syntax.
pub fn quote_node_labels(text: &str) -> String {
    const PASSTHROUGH: &[&str] = &[
        "%%", "classDef ", "class ", "style ", "linkStyle ", "click ", "direction ",
        "graph ", "flowchart ",
    ];

    let mut used = HashSet::new();
    let mut out = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if is_subgraph_open(trimmed) {
            out.push(quote_subgraph_line(line, &mut used));
        } else if trimmed.is_empty()
            || trimmed == "graph"
            || trimmed == "flowchart"
            || PASSTHROUGH.iter().any(|p| trimmed.starts_with(p))
        {
            out.push(line.to_string());
        } else {
            out.push(quote_line_labels(line));
        }
    }
    out.join("\n")
}

/// Drop `end` lines with no open `subgraph` and append the missing ones.
pub fn balance_subgraphs(text: &str) -> String {
    let mut depth = 0usize;
    let mut out: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if is_subgraph_open(trimmed) {
            depth += 1;
        } else if trimmed == "end" {
            if depth == 0 {
                continue;
            }
            depth -= 1;
        }
        out.push(line);
    }

    let mut result = out.join("\n");
    for level in (0..depth).rev() {
        result.push('\n');
        result.push_str(&"    ".repeat(level + 1));
        result.push_str("end");
    }
    result
}

fn is_relation(trimmed: &str) -> bool {
    ["--", "..", "<|", "|>", "*--", "o--"]
        .iter()
        .any(|a| trimmed.contains(a))
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// `Order : +id` declares a member on its own line and must stay outside
/// any braces.
fn is_named_member(trimmed: &str, class_name: &str) -> bool {
    let own = trimmed
        .strip_prefix(class_name)
        .is_some_and(|rest| rest.trim_start().starts_with(':'));
    own || named_member_re().is_match(trimmed)
}

fn is_member_line(line: &str, class_indent: usize, class_name: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && indent_of(line) > class_indent
        && !is_relation(trimmed)
        && !is_named_member(trimmed, class_name)
        && !trimmed.starts_with("class ")
        && !trimmed.starts_with("note")
        && !trimmed.starts_with("%%")
        && trimmed != "{"
        && trimmed != "}"
}

/// Rewrite `class Foo` followed by indented members into a braced block, and
/// close any braced block left open.
pub fn wrap_class_members(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut open_indent: Option<String> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if let Some(indent) = open_indent.as_ref() {
            if trimmed == "}" {
                open_indent = None;
                out.push(line.to_string());
                i += 1;
                continue;
            }
            if !trimmed.starts_with("class ") {
                out.push(line.to_string());
                i += 1;
                continue;
            }
            // A new class started before the previous block closed.
            out.push(format!("{indent}}}"));
            open_indent = None;
        }

        if open_class_re().is_match(line) {
            open_indent = Some(line[..indent_of(line)].to_string());
            out.push(line.to_string());
            i += 1;
            continue;
        }

        if let Some(caps) = bare_class_re().captures(line) {
            let indent = caps["indent"].to_string();
            let name = caps["name"].to_string();

            let next = lines[i + 1..].iter().position(|l| !l.trim().is_empty());
            if let Some(offset) = next {
                let j = i + 1 + offset;
                if lines[j].trim() == "{" {
                    out.push(format!("{indent}class {name} {{"));
                    open_indent = Some(indent);
                    i = j + 1;
                    continue;
                }
            }

            let mut j = i + 1;
            let mut members = Vec::new();
            while j < lines.len() && is_member_line(lines[j], indent.len(), &name) {
                members.push(lines[j]);
                j += 1;
            }
            if members.is_empty() {
                out.push(line.to_string());
                i += 1;
                continue;
            }
            out.push(format!("{indent}class {name} {{"));
            out.extend(members.iter().map(|m| m.to_string()));
            out.push(format!("{indent}}}"));
            i = j;
            continue;
        }

        out.push(line.to_string());
        i += 1;
    }

    if let Some(indent) = open_indent {
        out.push(format!("{indent}}}"));
    }
    out.join("\n")
}

fn looks_like_edges(text: &str) -> bool {
    text.lines().any(|l| {
        let t = l.trim();
        if t.chars().all(|c| c == '-') {
            return false;
        }
        t.contains("-->") || t.contains("---") || t.contains("==>")
    })
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Run every applicable pass over a single diagram. Front matter is carried
/// through untouched.
pub fn repair(text: &str) -> Repaired {
    let normalized = normalize_text(&extract_diagram(text));
    let (front, body) = split_front_matter(&normalized);
    let mut out = body.to_string();
    let mut diagram_type = detect_type(&out);

    if diagram_type == DiagramType::Unknown && looks_like_edges(&out) {
        out = format!("flowchart TD\n{out}");
        diagram_type = DiagramType::Flowchart;
    }

    match diagram_type {
        DiagramType::Flowchart => {
            out = fix_arrows(&out);
            out = quote_node_labels(&out);
            out = balance_subgraphs(&out);
        }
        DiagramType::State => {
            out = fix_arrows(&out);
        }
        DiagramType::Class => {
            out = wrap_class_members(&out);
        }
        _ => {}
    }

    let out = format!("{front}{out}");
    let changed = out != text.trim();
    if changed {
        tracing::debug!(diagram_type = %diagram_type, "repaired mermaid diagram");
    }
    Repaired {
        diagram: out,
        diagram_type,
        changed,
    }
}

/// Repair every ```` ```mermaid ```` block in a Markdown document, leaving the
/// surrounding prose untouched.
pub fn repair_markdown(doc: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut block: Option<(String, Vec<&str>)> = None;

    for line in doc.lines() {
        let trimmed = line.trim();
        match block.take() {
            None => {
                if trimmed.starts_with("```")
                    && trimmed[3..].trim().eq_ignore_ascii_case("mermaid")
                {
                    block = Some((line.to_string(), Vec::new()));
                } else {
                    out.push(line.to_string());
                }
            }
            Some((fence, mut body)) => {
                if trimmed == "```" {
                    out.push(fence);
                    out.push(repair(&body.join("\n")).diagram);
                    out.push(line.to_string());
                } else {
                    body.push(line);
                    block = Some((fence, body));
                }
            }
        }
    }

    if let Some((fence, body)) = block {
        out.push(fence);
        out.push(repair(&body.join("\n")).diagram);
        out.push("```".to_string());
    }

    let mut result = out.join("\n");
    if doc.ends_with('\n') {
        result.push('\n');
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_prefers_mermaid_block() {
        let text = "Here you go:\n```json\n{}\n```\n```mermaid\ngraph TD\nA-->B\n```\n";
        assert_eq!(extract_diagram(text), "graph TD\nA-->B");
    }

    #[test]
    fn extract_plain_text() {
        assert_eq!(extract_diagram("  graph TD\nA-->B  "), "graph TD\nA-->B");
    }

    #[test]
    fn extract_all_collects_only_mermaid() {
        let doc = "```mermaid\ngraph TD\n```\n```rust\nfn x() {}\n```\n```Mermaid\nclassDiagram\n```";
        let all = extract_all(doc);
        assert_eq!(all, vec!["graph TD".to_string(), "classDiagram".to_string()]);
    }

    #[test]
    fn detect_types() {
        assert_eq!(detect_type("graph LR\nA-->B"), DiagramType::Flowchart);
        assert_eq!(detect_type("%% comment\nflowchart TD"), DiagramType::Flowchart);
        assert_eq!(detect_type("graph TD;"), DiagramType::Flowchart);
        assert_eq!(detect_type("sequenceDiagram\nA->>B: hi"), DiagramType::Sequence);
        assert_eq!(detect_type("classDiagram"), DiagramType::Class);
        assert_eq!(detect_type("erDiagram"), DiagramType::Er);
        assert_eq!(detect_type("stateDiagram-v2"), DiagramType::State);
        assert_eq!(detect_type("gantt"), DiagramType::Gantt);
        assert_eq!(detect_type("A-->B"), DiagramType::Unknown);
        assert_eq!(detect_type(""), DiagramType::Unknown);
    }

    #[test]
    fn normalize_strips_semicolons_and_smart_quotes() {
        let text = "graph TD;\r\n  A[\u{201C}Hi\u{201D}] --> B;  \n\n";
        assert_eq!(normalize_text(text), "graph TD\n  A[\"Hi\"] --> B");
    }

    #[test]
    fn normalize_keeps_entity_codes() {
        assert_eq!(normalize_text("A[x] -->|a #amp;"), "A[x] -->|a #amp;");
    }

    #[test]
    fn fix_arrows_collapses_spacing() {
        assert_eq!(fix_arrows("A - -> B\nC -- > D\nE = => F"), "A --> B\nC --> D\nE ==> F");
        assert_eq!(fix_arrows("A \u{2192} B"), "A --> B");
        assert_eq!(fix_arrows("A --> B"), "A --> B");
    }

    #[test]
    fn quotes_labels_with_parentheses() {
        let out = quote_node_labels("flowchart TD\n  A[Start (v2)] --> B{Is it: ok?}");
        assert_eq!(out, "flowchart TD\n  A[\"Start (v2)\"] --> B{\"Is it: ok?\"}");
    }

    #[test]
    fn quotes_escape_inner_double_quotes() {
        let out = quote_node_labels("A[say \"hi\"] --> B");
        assert_eq!(out, "A[\"say #quot;hi#quot;\"] --> B");
    }

    #[test]
    fn leaves_plain_and_quoted_labels() {
        let text = "A[Start] --> B(\"Call api()\") --> C([Done])";
        assert_eq!(quote_node_labels(text), text);
    }

    #[test]
    fn leaves_parallelogram_shapes() {
        let text = "A[/Input: file/] --> B";
        assert_eq!(quote_node_labels(text), text);
    }

    #[test]
    fn quotes_stadium_and_circle_shapes() {
        let out = quote_node_labels("A([Login: SSO]) --> B((DB <primary>))");
        assert_eq!(out, "A([\"Login: SSO\"]) --> B((\"DB <primary>\"))");
    }

    #[test]
    fn quotes_edge_labels() {
        let out = quote_node_labels("A -->|GET /items (json)| B");
        assert_eq!(out, "A -->|\"GET /items (json)\"| B");
    }

    #[test]
    fn quoted_edge_label_not_rescanned() {
        let text = "A -->|\"fetch(id: 1)\"| B";
        assert_eq!(quote_node_labels(text), text);
    }

    #[test]
    fn nested_same_brackets_left_alone() {
        let text = "A(foo (bar)) --> B";
        assert_eq!(quote_node_labels(text), text);
    }

    #[test]
    fn style_lines_pass_through() {
        let text = "classDef hot fill:#f96,stroke:#333\nclick A call cb()";
        assert_eq!(quote_node_labels(text), text);
    }

    #[test]
    fn subgraph_titles_are_quoted() {
        assert_eq!(
            quote_node_labels("subgraph api [API (v2)]"),
            "subgraph api [\"API (v2)\"]"
        );
        assert_eq!(
            quote_node_labels("  subgraph Data Layer: Postgres"),
            "  subgraph sg_data_layer_postgres [\"Data Layer: Postgres\"]"
        );
        assert_eq!(quote_node_labels("subgraph Backend"), "subgraph Backend");
    }

    #[test]
    fn balance_appends_missing_end() {
        let text = "flowchart TD\nsubgraph A\n  subgraph B\n    x --> y\n  end";
        assert_eq!(
            balance_subgraphs(text),
            "flowchart TD\nsubgraph A\n  subgraph B\n    x --> y\n  end\n    end"
        );
    }

    #[test]
    fn balance_drops_stray_end() {
        let text = "flowchart TD\nA --> B\nend\nsubgraph S\nC\nend";
        assert_eq!(
            balance_subgraphs(text),
            "flowchart TD\nA --> B\nsubgraph S\nC\nend"
        );
    }

    #[test]
    fn wrap_class_members_adds_braces() {
        let text = "classDiagram\n  class Order\n    +id: Uuid\n    +total() Money\n  Order --> Customer";
        assert_eq!(
            wrap_class_members(text),
            "classDiagram\n  class Order {\n    +id: Uuid\n    +total() Money\n  }\n  Order --> Customer"
        );
    }

    #[test]
    fn wrap_class_members_joins_brace_on_next_line() {
        let text = "classDiagram\nclass Cart\n{\n  +items\n}";
        assert_eq!(wrap_class_members(text), "classDiagram\nclass Cart {\n  +items\n}");
    }

    #[test]
    fn wrap_class_members_closes_open_block() {
        let text = "classDiagram\nclass A {\n  +x\nclass B {\n  +y";
        assert_eq!(
            wrap_class_members(text),
            "classDiagram\nclass A {\n  +x\n}\nclass B {\n  +y\n}"
        );
    }

    #[test]
    fn wrap_class_members_leaves_empty_class() {
        let text = "classDiagram\nclass Marker\nMarker <|-- Impl";
        assert_eq!(wrap_class_members(text), text);
    }

    #[test]
    fn repair_adds_header_to_bare_edges() {
        let r = repair("A[Start (now)] --> B");
        assert_eq!(r.diagram_type, DiagramType::Flowchart);
        assert_eq!(r.diagram, "flowchart TD\nA[\"Start (now)\"] --> B");
        assert!(r.changed);
    }

    #[test]
    fn repair_valid_flowchart_is_unchanged() {
        let text = "flowchart LR\n    A[Client] --> B[\"API (REST)\"]\n    subgraph Storage\n        C[(Postgres)]\n    end\n    B --> C";
        let r = repair(text);
        assert_eq!(r.diagram, text);
        assert!(!r.changed);
    }

    #[test]
    fn repair_leaves_valid_diagrams_unchanged() {
        let valid = [
            "flowchart TD\n    A[\"in | out\"] --> B[\"x | y\"]",
            "flowchart LR\n    A[\"Step: [1]\"] -->|\"ok: yes\"| B(\"call (x)\")",
            "flowchart TD\n    A -->|\"a | b\"| B[\"c | d\"]",
            "---\ntitle: Checkout\n---\nflowchart TD\n    A --> B",
            "classDiagram\nclass Order\n  Order : +id\n  Order : +total()",
            "flowchart TD\n    A --> B\n    %% retry path\n    B -.->|retry| A",
            "%%{init: {\"theme\": \"dark\"}}%%\nflowchart TD\n    A-->B",
            "flowchart TB\n    subgraph outer [\"Outer (v1)\"]\n        subgraph inner [Inner]\n            X --> Y\n        end\n    end",
        ];
        for text in valid {
            let r = repair(text);
            assert_eq!(r.diagram, text, "rewrote valid diagram {text:?}");
            assert!(!r.changed, "marked {text:?} as changed");
        }
    }

    #[test]
    fn front_matter_does_not_hide_diagram_type() {
        let text = "---\ntitle: Checkout\n---\nflowchart TD\n    A --> B";
        assert_eq!(detect_type(text), DiagramType::Flowchart);
        assert_eq!(split_front_matter(text).0, "---\ntitle: Checkout\n---\n");
        assert_eq!(split_front_matter("---\nA --> B").0, "");
    }

    #[test]
    fn front_matter_kept_above_repaired_body() {
        let r = repair("---\ntitle: Checkout\n---\nflowchart TD\n    A[Pay (card)] --> B");
        assert_eq!(
            r.diagram,
            "---\ntitle: Checkout\n---\nflowchart TD\n    A[\"Pay (card)\"] --> B"
        );
        assert!(r.changed);
    }

    #[test]
    fn pipe_in_quoted_node_label_is_not_an_edge_label() {
        let text = "A[\"in | out\"] --> B[\"x | y\"]";
        assert_eq!(quote_node_labels(text), text);
        assert_eq!(
            quote_node_labels("A[\"in | out\"] -->|go (now)| B"),
            "A[\"in | out\"] -->|\"go (now)\"| B"
        );
    }

    #[test]
    fn named_member_lines_stay_outside_braces() {
        let text = "classDiagram\nclass Order\n  Order : +id\n  Order : +total()";
        assert_eq!(wrap_class_members(text), text);
    }

    #[test]
    fn symbol_only_subgraph_titles_get_distinct_ids() {
        let out = quote_node_labels("subgraph (?)\n  A\nend\nsubgraph <*>\n  B\nend");
        assert_eq!(
            out,
            "subgraph sg_1 [\"(?)\"]\n  A\nend\nsubgraph sg_2 [\"<*>\"]\n  B\nend"
        );
    }

    #[test]
    fn repeated_subgraph_titles_get_distinct_ids() {
        let out = quote_node_labels("subgraph API: v1\nend\nsubgraph API: v1\nend");
        assert_eq!(
            out,
            "subgraph sg_api_v1 [\"API: v1\"]\nend\nsubgraph sg_api_v1_2 [\"API: v1\"]\nend"
        );
    }

    #[test]
    fn repair_is_idempotent() {
        let inputs = [
            "```mermaid\ngraph TD;\nA[Start (v2)] - -> B{ok?};\nsubgraph Core: services\nC -->|call (x)| D\n```",
            "classDiagram\nclass Order\n  +id\n  +total()\nclass Line {\n  +qty",
            "A --> B\nend\nend",
            "---\ntitle: T\n---\nflowchart TD\nA[\"x | y\"] -->|a: b| B\nsubgraph (?)\nC",
            "classDiagram\nclass Order\n  Order : +id\nclass Line\n  +qty",
        ];
        for input in inputs {
            let once = repair(input).diagram;
            let twice = repair(&once);
            assert_eq!(twice.diagram, once, "not idempotent for {input:?}");
            assert!(!twice.changed);
        }
    }

    #[test]
    fn repair_leaves_sequence_diagrams() {
        let text = "sequenceDiagram\n    Client->>API: POST /orders (json)\n    API-->>Client: 201";
        let r = repair(text);
        assert_eq!(r.diagram, text);
        assert_eq!(r.diagram_type, DiagramType::Sequence);
    }

    #[test]
    fn repair_unknown_prose_passes_through() {
        let r = repair("I could not draw that.");
        assert_eq!(r.diagram_type, DiagramType::Unknown);
        assert_eq!(r.diagram, "I could not draw that.");
    }

    #[test]
    fn repair_markdown_only_touches_mermaid_blocks() {
        let doc = "# Design\n\nText (with parens).\n\n```mermaid\ngraph TD\nA[Web (SPA)] --> B\n```\n\n```rust\nlet a = (1);\n```\n";
        let out = repair_markdown(doc);
        assert!(out.contains("A[\"Web (SPA)\"] --> B"));
        assert!(out.contains("Text (with parens)."));
        assert!(out.contains("let a = (1);"));
        assert!(out.ends_with("```\n"));
    }

    #[test]
    fn repair_markdown_closes_unterminated_block() {
        let doc = "```mermaid\ngraph TD\nsubgraph S\nA --> B";
        let out = repair_markdown(doc);
        assert_eq!(out, "```mermaid\ngraph TD\nsubgraph S\nA --> B\n    end\n```");
    }
}
