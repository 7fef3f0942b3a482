//! DOCX template rendering
//!
//! A [`Template`] holds an unpacked DOCX whose text carries placeholder tags
//! (see [`crate::tags`]). Rendering a context produces a new archive; the
//! template itself is never modified and can be shared between renders.
//!
//! Each text part is processed in three passes:
//!
//! 1. tags split over several runs are re-joined per paragraph
//! 2. control paragraphs and rows are folded into a section tree
//! 3. the tree is evaluated against the context, substituting run text

use std::path::Path;

use quick_xml::escape::escape;
use tracing::{debug, warn};

use peticao_core::contracts::MISSING;
use peticao_core::{ContractRecord, Context, RichText, Segment, Value};

use crate::archive::OoxmlArchive;
use crate::error::{OoxmlError, Result};
use crate::tags::{find_control, find_variables, merge_split_tags, Control, Level};
use crate::xml::{self, Element, Node};

/// A loaded DOCX template
#[derive(Debug, Clone)]
pub struct Template {
    archive: OoxmlArchive,
}

impl Template {
    /// Load a template from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load a template from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(bytes)?)
    }

    /// Wrap an archive. Fails when the main document part is missing.
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        archive.document_xml()?;
        Ok(Self { archive })
    }

    /// The unrendered archive
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Render every text part against `ctx`
    pub fn render(&self, ctx: &Context) -> Result<OoxmlArchive> {
        let mut output = self.archive.clone();
        for part in self.archive.text_parts() {
            let Some(source) = self.archive.get(&part) else {
                continue;
            };
            let rendered = render_part(source, ctx)
                .map_err(|e| with_part(e, &part))?;
            debug!(part = %part, bytes = rendered.len(), "rendered template part");
            output.set(part, rendered);
        }
        Ok(output)
    }
}

fn with_part(err: OoxmlError, part: &str) -> OoxmlError {
    match err {
        OoxmlError::Template(msg) => OoxmlError::Template(format!("{}: {}", part, msg)),
        other => other,
    }
}

/// Render one XML part
pub fn render_part(xml: &[u8], ctx: &Context) -> Result<Vec<u8>> {
    let mut nodes = xml::parse(xml)?;
    merge_paragraph_tags(&mut nodes);
    let mut scope = Scope::new(ctx);
    let rendered = render_nodes(&nodes, &mut scope)?;
    xml::write(&rendered)
}

// ---------------------------------------------------------------------------
// Pass 1: split tags
// ---------------------------------------------------------------------------

fn merge_paragraph_tags(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.is("w:p") {
                let mut texts = Vec::new();
                paragraph_texts(&mut el.children, &mut texts);
                merge_split_tags(&mut texts);
            }
            merge_paragraph_tags(&mut el.children);
        }
    }
}

/// Text nodes of a paragraph's `w:t` elements, not descending into nested
/// paragraphs (text boxes)
fn paragraph_texts<'a>(nodes: &'a mut [Node], out: &mut Vec<&'a mut String>) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            if el.is("w:t") {
                for child in el.children.iter_mut() {
                    if let Node::Text(text) = child {
                        out.push(text);
                    }
                }
            } else if !el.is("w:p") {
                paragraph_texts(&mut el.children, out);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pass 2: sections
// ---------------------------------------------------------------------------

enum Item<'a> {
    Node(&'a Node),
    Control(Control),
}

enum Section<'a> {
    Node(&'a Node),
    If {
        expr: String,
        then: Vec<Section<'a>>,
        otherwise: Vec<Section<'a>>,
    },
    For {
        var: String,
        expr: String,
        body: Vec<Section<'a>>,
    },
}

/// Classify sibling nodes into content and control markers
fn classify(nodes: &[Node]) -> Result<Vec<Item<'_>>> {
    let mut items = Vec::with_capacity(nodes.len());
    for node in nodes {
        let control = match node {
            Node::Element(el) if el.is("w:p") || el.is("w:tr") => {
                match find_control(&el.text_content())? {
                    Some((Level::Row, control)) if el.is("w:tr") => Some(control),
                    Some((Level::Paragraph, control)) if el.is("w:p") => Some(control),
                    Some((Level::Row, control)) => {
                        return Err(OoxmlError::Template(format!(
                            "row tag `{}` outside a table row",
                            control
                        )))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        items.push(match control {
            Some(control) => Item::Control(control),
            None => Item::Node(node),
        });
    }
    Ok(items)
}

fn build_sections<'a>(items: Vec<Item<'a>>) -> Result<Vec<Section<'a>>> {
    let mut iter = items.into_iter();
    let (sections, end) = parse_block(&mut iter)?;
    match end {
        None => Ok(sections),
        Some(tag) => Err(OoxmlError::Template(format!("unexpected `{}`", tag))),
    }
}

/// Parse until the input ends or an `else`/`endif`/`endfor` is met
fn parse_block<'a, I>(items: &mut I) -> Result<(Vec<Section<'a>>, Option<Control>)>
where
    I: Iterator<Item = Item<'a>>,
{
    let mut out = Vec::new();
    while let Some(item) = items.next() {
        match item {
            Item::Node(node) => out.push(Section::Node(node)),
            Item::Control(Control::If(expr)) => {
                let (then, end) = parse_block(items)?;
                let (otherwise, end) = match end {
                    Some(Control::Else) => parse_block(items)?,
                    other => (Vec::new(), other),
                };
                match end {
                    Some(Control::EndIf) => out.push(Section::If {
                        expr,
                        then,
                        otherwise,
                    }),
                    other => return Err(unbalanced(&format!("if {}", expr), other)),
                }
            }
            Item::Control(Control::For { var, expr }) => {
                let (body, end) = parse_block(items)?;
                match end {
                    Some(Control::EndFor) => out.push(Section::For { var, expr, body }),
                    other => {
                        return Err(unbalanced(&format!("for {} in {}", var, expr), other))
                    }
                }
            }
            Item::Control(end) => return Ok((out, Some(end))),
        }
    }
    Ok((out, None))
}

fn unbalanced(open: &str, found: Option<Control>) -> OoxmlError {
    match found {
        Some(tag) => OoxmlError::Template(format!("`{}` closed by `{}`", open, tag)),
        None => OoxmlError::Template(format!("`{}` is never closed", open)),
    }
}

// ---------------------------------------------------------------------------
// Pass 3: evaluation
// ---------------------------------------------------------------------------

/// Names visible while rendering: the context plus active loop variables
struct Scope<'a> {
    ctx: &'a Context,
    loops: Vec<(String, &'a ContractRecord)>,
}

/// A resolved placeholder
enum Resolved<'a> {
    Text(String),
    Rich(&'a RichText),
}

impl<'a> Scope<'a> {
    fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            loops: Vec::new(),
        }
    }

    fn record(&self, var: &str) -> Option<&'a ContractRecord> {
        self.loops
            .iter()
            .rev()
            .find(|(name, _)| name == var)
            .map(|(_, record)| *record)
    }

    fn resolve(&self, name: &str) -> Resolved<'a> {
        if let Some((var, field)) = name.split_once('.') {
            return match self.record(var) {
                Some(record) => {
                    Resolved::Text(record.field(field).unwrap_or(MISSING).to_string())
                }
                None => Resolved::Text(String::new()),
            };
        }
        if let Some(record) = self.record(name) {
            return Resolved::Text(record.summary_line());
        }
        match self.ctx.get(name) {
            Some(Value::Rich(rich)) => Resolved::Rich(rich),
            Some(value) => Resolved::Text(value.to_string()),
            None => Resolved::Text(String::new()),
        }
    }

    /// Evaluate a condition: a name or dotted path, optionally negated with `not`
    fn truthy(&self, expr: &str) -> bool {
        let expr = expr.trim();
        if let Some(inner) = expr.strip_prefix("not ") {
            return !self.truthy(inner);
        }
        if let Some((var, field)) = expr.split_once('.') {
            return self
                .record(var)
                .and_then(|r| r.field(field))
                .is_some_and(|v| !v.is_empty());
        }
        self.ctx.get(expr).is_some_and(Value::is_truthy)
    }

    fn records(&self, expr: &str) -> &'a [ContractRecord] {
        match self.ctx.get(expr) {
            Some(Value::Contracts(records)) => records,
            Some(_) => {
                warn!(name = expr, "loop over a value that is not a list");
                &[]
            }
            None => &[],
        }
    }
}

fn render_nodes(nodes: &[Node], scope: &mut Scope<'_>) -> Result<Vec<Node>> {
    let sections = build_sections(classify(nodes)?)?;
    let mut out = Vec::with_capacity(nodes.len());
    render_sections(&sections, scope, &mut out)?;
    Ok(out)
}

fn render_sections(
    sections: &[Section<'_>],
    scope: &mut Scope<'_>,
    out: &mut Vec<Node>,
) -> Result<()> {
    for section in sections {
        match section {
            Section::Node(node) => render_node(node, scope, out)?,
            Section::If {
                expr,
                then,
                otherwise,
            } => {
                let branch = if scope.truthy(expr) { then } else { otherwise };
                render_sections(branch, scope, out)?;
            }
            Section::For { var, expr, body } => {
                for record in scope.records(expr) {
                    scope.loops.push((var.clone(), record));
                    let result = render_sections(body, scope, out);
                    scope.loops.pop();
                    result?;
                }
            }
        }
    }
    Ok(())
}

fn render_node(node: &Node, scope: &mut Scope<'_>, out: &mut Vec<Node>) -> Result<()> {
    match node {
        Node::Element(el) if el.is("w:r") => out.extend(render_run(el, scope)),
        Node::Element(el) => out.push(Node::Element(Element {
            start: el.start.clone(),
            children: render_nodes(&el.children, scope)?,
        })),
        other => out.push(other.clone()),
    }
    Ok(())
}

/// Substitute placeholders inside one run.
///
/// Plain values stay in the run. A rich value splits the run: text before it
/// stays in a run with the original properties, each segment gets its own run,
/// and text after it continues in a fresh run.
fn render_run(run: &Element, scope: &Scope<'_>) -> Vec<Node> {
    if !run.text_content().contains("{{") {
        return vec![Node::Element(run.clone())];
    }

    let props = run.child("w:rPr");
    let mut builder = RunBuilder::new(run, props);

    for child in &run.children {
        match child {
            Node::Element(el) if el.is("w:rPr") => {}
            Node::Element(el) if el.is("w:t") => {
                let text: String = el
                    .children
                    .iter()
                    .filter_map(|n| match n {
                        Node::Text(t) => Some(t.as_str()),
                        _ => None,
                    })
                    .collect();
                render_text(&text, scope, &mut builder);
            }
            other => builder.content.push(other.clone()),
        }
    }

    builder.finish()
}

fn render_text(text: &str, scope: &Scope<'_>, builder: &mut RunBuilder<'_>) {
    let mut pending = String::new();
    let mut pos = 0;
    for var in find_variables(text) {
        pending.push_str(&text[pos..var.span.start]);
        match scope.resolve(&var.name) {
            Resolved::Rich(rich) if var.rich => {
                builder.push_escaped(&std::mem::take(&mut pending));
                builder.push_rich(rich);
            }
            Resolved::Rich(rich) => pending.push_str(&escape(rich.plain_text().as_str())),
            Resolved::Text(value) => pending.push_str(&escape(value.as_str())),
        }
        pos = var.span.end;
    }
    pending.push_str(&text[pos..]);
    builder.push_escaped(&pending);
}

/// Accumulates the runs that replace one template run
struct RunBuilder<'a> {
    template: &'a Element,
    props: Option<&'a Element>,
    content: Vec<Node>,
    runs: Vec<Node>,
}

impl<'a> RunBuilder<'a> {
    fn new(template: &'a Element, props: Option<&'a Element>) -> Self {
        Self {
            template,
            props,
            content: Vec::new(),
            runs: Vec::new(),
        }
    }

    /// Append escaped text, turning newlines into line breaks
    fn push_escaped(&mut self, text: &str) {
        push_text_nodes(&mut self.content, text);
    }

    fn push_rich(&mut self, rich: &RichText) {
        self.flush();
        for segment in rich.segments() {
            self.runs.push(Node::Element(self.segment_run(segment)));
        }
    }

    fn segment_run(&self, segment: &Segment) -> Element {
        let mut props = self
            .props
            .cloned()
            .unwrap_or_else(|| Element::new("w:rPr"));
        props
            .children
            .retain(|n| !n.is_element("w:b") && !n.is_element("w:bCs"));
        if segment.bold {
            // w:b and w:bCs follow w:rStyle and w:rFonts in CT_RPr
            let at = props
                .children
                .iter()
                .position(|n| {
                    n.as_element()
                        .is_some_and(|el| !el.is("w:rStyle") && !el.is("w:rFonts"))
                })
                .unwrap_or(props.children.len());
            props.children.insert(at, Node::Element(Element::new("w:bCs")));
            props.children.insert(at, Node::Element(Element::new("w:b")));
        }

        let mut run = Element {
            start: self.template.start.clone(),
            children: Vec::new(),
        };
        if !props.children.is_empty() {
            run.children.push(Node::Element(props));
        }
        push_text_nodes(&mut run.children, &escape(segment.text.as_str()));
        run
    }

    fn flush(&mut self) {
        if self.content.is_empty() {
            return;
        }
        let mut run = Element {
            start: self.template.start.clone(),
            children: Vec::new(),
        };
        if let Some(props) = self.props {
            run.children.push(Node::Element(props.clone()));
        }
        run.children.append(&mut self.content);
        self.runs.push(Node::Element(run));
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush();
        self.runs
    }
}

fn push_text_nodes(out: &mut Vec<Node>, text: &str) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Node::Element(Element::new("w:br")));
        }
        if !line.is_empty() {
            out.push(Node::Element(
                Element::new("w:t")
                    .with_attribute("xml:space", "preserve")
                    .with_child(Node::Text(line.to_string())),
            ));
        }
    }
}
