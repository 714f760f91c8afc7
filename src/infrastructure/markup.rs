//! Lenient HTML document tree
//!
//! Templates are parsed with `quick-xml` into an arena of nodes. The reader
//! runs without end-name checks so ordinary HTML works: void elements
//! (`<br>`, `<meta ...>`) need no closing tag, elements left open are closed
//! at the end of input and stray end tags are ignored. A new `li`, `p`, `tr`,
//! `td` or `option` ends the open one of its kind. `script` and `style` bodies
//! are kept as raw text, and a `<` that starts no tag is read as text.
//!
//! Text and attribute values keep their escaped source form and are written
//! back verbatim; only text inserted through the tree API is escaped here.

use crate::domain::MarkupTree;
use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("syntax error at byte {position}: {message}")]
    Syntax { message: String, position: u64 },
}

/// Handle to a node of an [`HtmlDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        name: String,
        /// Attribute values in escaped form
        attributes: Vec<(String, String)>,
        /// Written as `<name/>` in the source
        self_closing: bool,
    },
    /// Escaped text, CDATA sections included verbatim
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable HTML tree; detached nodes stay in the arena but are unreachable
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    nodes: Vec<Node>,
}

impl HtmlDocument {
    fn empty() -> Self {
        HtmlDocument {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a document or fragment
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let mut document = HtmlDocument::empty();
        let mut open = vec![document.root_id()];

        let mut offset = 0;
        while offset < markup.len() {
            offset = document.parse_from(markup, offset, &mut open)?;
        }

        Ok(document)
    }

    /// Parse `markup` from `offset` until the input ends or the reader has to
    /// be restarted; returns where parsing continues.
    fn parse_from(
        &mut self,
        markup: &str,
        offset: usize,
        open: &mut Vec<NodeId>,
    ) -> Result<usize, MarkupError> {
        let root = self.root_id();
        let mut reader = Reader::from_str(&markup[offset..]);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = false;
        reader.config_mut().allow_unmatched_ends = true;

        loop {
            let event = reader.read_event().map_err(|e| MarkupError::Syntax {
                message: e.to_string(),
                position: offset as u64 + reader.error_position(),
            })?;
            let consumed = offset + reader.buffer_position() as usize;
            let parent = open.last().copied().unwrap_or(root);

            match event {
                // `<` not opening a tag, e.g. `1 < 2`, is text
                Event::Start(e) if !is_tag_name(&e) => {
                    self.push(parent, NodeKind::Text("&lt;".to_string()));
                    return Ok(consumed - e.len() - 1);
                }
                Event::Empty(e) if !is_tag_name(&e) => {
                    self.push(parent, NodeKind::Text("&lt;".to_string()));
                    return Ok(consumed - e.len() - 2);
                }
                Event::Start(e) => {
                    let (name, attributes) = read_tag(&e);
                    close_implied(self, open, &name);
                    let parent = open.last().copied().unwrap_or(root);

                    let void = is_void(&name);
                    let raw_text = is_raw_text(&name);
                    let id = self.push(
                        parent,
                        NodeKind::Element {
                            name: name.clone(),
                            attributes,
                            self_closing: false,
                        },
                    );
                    if void {
                        continue;
                    }
                    open.push(id);

                    if raw_text {
                        // Body runs verbatim up to the end tag, which the next reader closes
                        let body = &markup[consumed..];
                        let end = find_raw_text_end(body, &name).unwrap_or(body.len());
                        if end > 0 {
                            self.push(id, NodeKind::Text(body[..end].to_string()));
                        }
                        return Ok(consumed + end);
                    }
                }
                Event::Empty(e) => {
                    let (name, attributes) = read_tag(&e);
                    close_implied(self, open, &name);
                    let parent = open.last().copied().unwrap_or(root);
                    self.push(
                        parent,
                        NodeKind::Element {
                            name,
                            attributes,
                            self_closing: true,
                        },
                    );
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    // Close up to the matching open element; ignore end tags with no match
                    if let Some(pos) = open.iter().rposition(|id| {
                        self.element_name(*id)
                            .is_some_and(|open_name| open_name.eq_ignore_ascii_case(&name))
                    }) {
                        open.truncate(pos);
                    }
                }
                Event::Text(e) => {
                    self.push(parent, NodeKind::Text(String::from_utf8_lossy(&e).into_owned()));
                }
                Event::CData(e) => {
                    let raw = format!("<![CDATA[{}]]>", String::from_utf8_lossy(&e));
                    self.push(parent, NodeKind::Text(raw));
                }
                Event::Comment(e) => {
                    self.push(
                        parent,
                        NodeKind::Comment(String::from_utf8_lossy(&e).into_owned()),
                    );
                }
                Event::DocType(e) => {
                    self.push(
                        parent,
                        NodeKind::Doctype(String::from_utf8_lossy(&e).trim().to_string()),
                    );
                }
                Event::Eof => return Ok(markup.len()),
                // XML declarations and processing instructions are dropped
                _ => {}
            }
        }
    }

    fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Serialize the whole document
    pub fn to_markup(&self) -> String {
        let mut output = String::new();
        self.write_children(self.root_id(), &mut output);
        output
    }

    /// Element name of a node, `None` for non-elements
    pub fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.attach(parent, id);
        id
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn attributes_mut(&mut self, node: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Copy `source` and its subtree from another document under `parent`
    fn import(&mut self, other: &HtmlDocument, source: NodeId, parent: NodeId) {
        let id = self.push(parent, other.nodes[source.0].kind.clone());
        for child in &other.nodes[source.0].children {
            self.import(other, *child, id);
        }
    }

    fn write_node(&self, node: NodeId, output: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => self.write_children(node, output),
            NodeKind::Element {
                name,
                attributes,
                self_closing,
            } => {
                output.push('<');
                output.push_str(name);
                for (key, value) in attributes {
                    output.push(' ');
                    output.push_str(key);
                    // Values read from single-quoted source may hold double quotes
                    if value.contains('"') {
                        output.push_str(&format!("='{}'", value));
                    } else {
                        output.push_str(&format!("=\"{}\"", value));
                    }
                }

                let empty = self.nodes[node.0].children.is_empty();
                if *self_closing && empty {
                    output.push_str("/>");
                    return;
                }
                output.push('>');
                if is_void(name) && empty {
                    return;
                }
                self.write_children(node, output);
                output.push_str(&format!("</{}>", name));
            }
            NodeKind::Text(text) => output.push_str(text),
            NodeKind::Comment(text) => output.push_str(&format!("<!--{}-->", text)),
            NodeKind::Doctype(text) => output.push_str(&format!("<!DOCTYPE {}>", text)),
        }
    }

    fn write_children(&self, node: NodeId, output: &mut String) {
        for child in &self.nodes[node.0].children {
            self.write_node(*child, output);
        }
    }

    fn collect_with_attr(&self, node: NodeId, name: &str, output: &mut Vec<NodeId>) {
        if self.attr(node, name).is_some() {
            output.push(node);
        }
        for child in &self.nodes[node.0].children {
            self.collect_with_attr(*child, name, output);
        }
    }
}

impl MarkupTree for HtmlDocument {
    type Node = NodeId;
    type Error = MarkupError;

    fn parse(markup: &str) -> Result<Self, MarkupError> {
        HtmlDocument::parse(markup)
    }

    fn root(&self) -> NodeId {
        self.root_id()
    }

    fn first_element(&self) -> Option<NodeId> {
        self.children(self.root_id()).into_iter().next()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.element_name(*child).is_some())
            .collect()
    }

    fn select_with_attr(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_with_attr(node, name, &mut found);
        found
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, raw)| {
                    unescape(raw)
                        .map(|value| value.into_owned())
                        .unwrap_or_else(|_| raw.clone())
                }),
            _ => None,
        }
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let escaped = escape(value).into_owned();
        if let Some(attributes) = self.attributes_mut(node) {
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = escaped,
                None => attributes.push((name.to_string(), escaped)),
            }
        }
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(attributes) = self.attributes_mut(node) {
            attributes.retain(|(key, _)| key != name);
        }
    }

    fn set_inner_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        if !text.is_empty() {
            self.push(node, NodeKind::Text(partial_escape(text).into_owned()));
        }
    }

    fn set_inner_link(&mut self, node: NodeId, href: &str, text: &str) {
        self.clear_children(node);
        let link = self.push(
            node,
            NodeKind::Element {
                name: "a".to_string(),
                attributes: vec![("href".to_string(), escape(href).into_owned())],
                self_closing: false,
            },
        );
        if !text.is_empty() {
            self.push(link, NodeKind::Text(partial_escape(text).into_owned()));
        }
    }

    fn inner_markup(&self, node: NodeId) -> String {
        let mut output = String::new();
        self.write_children(node, &mut output);
        output
    }

    fn outer_markup(&self, node: NodeId) -> String {
        let mut output = String::new();
        self.write_node(node, &mut output);
        output
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    fn append_markup(&mut self, parent: NodeId, markup: &str) -> Result<(), MarkupError> {
        let fragment = HtmlDocument::parse(markup)?;
        let fragment_root = fragment.root_id();
        for child in &fragment.nodes[fragment_root.0].children {
            self.import(&fragment, *child, parent);
        }
        Ok(())
    }
}

/// Name and raw attribute values of a start tag
fn read_tag(e: &BytesStart<'_>) -> (String, Vec<(String, String)>) {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attributes = e.html_attributes();
    attributes.with_checks(false);
    let attributes = attributes
        .filter_map(|attr| attr.ok())
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect();

    (name, attributes)
}

/// Start tags that close an open element of a listed name, searched from the
/// innermost element outwards and stopping at the listed containers
const IMPLIED_END: &[(&str, &[&str], &[&str])] = &[
    ("li", &["li"], &["ul", "ol", "menu"]),
    ("dt", &["dt", "dd"], &["dl"]),
    ("dd", &["dt", "dd"], &["dl"]),
    ("tr", &["tr"], &["table", "thead", "tbody", "tfoot"]),
    ("td", &["td", "th"], &["tr", "table"]),
    ("th", &["td", "th"], &["tr", "table"]),
    ("option", &["option"], &["select", "datalist", "optgroup"]),
    ("p", &["p"], &["div", "li", "td", "th", "blockquote", "section", "article", "body"]),
];

/// Elements whose content is raw text up to their end tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Pop open elements implicitly ended by a `name` start tag
fn close_implied(document: &HtmlDocument, open: &mut Vec<NodeId>, name: &str) {
    let Some((_, closes, scope)) = IMPLIED_END
        .iter()
        .find(|(start, _, _)| start.eq_ignore_ascii_case(name))
    else {
        return;
    };

    let mut ended = None;
    for (pos, id) in open.iter().enumerate().rev() {
        let Some(open_name) = document.element_name(*id) else {
            break;
        };
        if closes.iter().any(|c| c.eq_ignore_ascii_case(open_name)) {
            ended = Some(pos);
            break;
        }
        if scope.iter().any(|s| s.eq_ignore_ascii_case(open_name)) {
            break;
        }
    }

    if let Some(pos) = ended {
        open.truncate(pos);
    }
}

/// Offset of the `</name` end tag closing a raw text body
fn find_raw_text_end(body: &str, name: &str) -> Option<usize> {
    body.match_indices("</").map(|(i, _)| i).find(|&i| {
        let rest = &body.as_bytes()[i + 2..];
        rest.len() >= name.len()
            && rest[..name.len()].eq_ignore_ascii_case(name.as_bytes())
            && rest
                .get(name.len())
                .map_or(true, |b| *b == b'>' || *b == b'/' || b.is_ascii_whitespace())
    })
}

fn is_tag_name(e: &BytesStart<'_>) -> bool {
    e.name()
        .as_ref()
        .first()
        .is_some_and(|b| b.is_ascii_alphabetic())
}

fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS
        .iter()
        .any(|raw| raw.eq_ignore_ascii_case(name))
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(markup: &str) -> String {
        HtmlDocument::parse(markup).unwrap().to_markup()
    }

    #[test]
    fn test_roundtrip_simple() {
        let html = r#"<div class="a"><p>Hello <b>world</b></p></div>"#;
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_roundtrip_document_shell() {
        let html = "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>CV</title></head>\n<body><!-- main --><br><img src=\"a.png\"/></body></html>";
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_entities_kept_verbatim() {
        let html = "<p>Fish &amp; Chips &nbsp;&copy;</p>";
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_valueless_attribute() {
        assert_eq!(
            roundtrip("<input disabled><p>x</p>"),
            "<input disabled=\"\"><p>x</p>"
        );
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        assert_eq!(roundtrip("<div><span>a"), "<div><span>a</span></div>");
    }

    #[test]
    fn test_sibling_start_ends_open_element() {
        assert_eq!(roundtrip("<ul><li>a<li>b</ul>"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(roundtrip("<p>a<p>b"), "<p>a</p><p>b</p>");
        assert_eq!(
            roundtrip("<table><tr><td>1<td>2<tr><td>3</table>"),
            "<table><tr><td>1</td><td>2</td></tr><tr><td>3</td></tr></table>"
        );
        assert_eq!(
            roundtrip("<select><option>a<option>b</select>"),
            "<select><option>a</option><option>b</option></select>"
        );
    }

    #[test]
    fn test_nested_list_items_stay_nested() {
        let html = "<ul><li>a<ul><li>b</li></ul></li></ul>";
        assert_eq!(roundtrip(html), html);
        assert_eq!(
            roundtrip("<ul><li>a<ul><li>b</ul><li>c</ul>"),
            "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"
        );
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let html = "<h1>t</h1><script>if (n < 3 && ok) { go(\"</p>\"); }</script><p>x</p>";
        assert_eq!(roundtrip(html), html);

        let doc = HtmlDocument::parse(html).unwrap();
        let script = doc.children(doc.root())[1];
        assert!(doc.children(script).is_empty());
        assert_eq!(
            doc.inner_markup(script),
            "if (n < 3 && ok) { go(\"</p>\"); }"
        );
    }

    #[test]
    fn test_style_body_is_raw_text() {
        let html = "<style>a > b { content: \"<i>\"; }</STYLE ><b>x</b>";
        assert_eq!(
            roundtrip(html),
            "<style>a > b { content: \"<i>\"; }</style><b>x</b>"
        );
    }

    #[test]
    fn test_unterminated_script_runs_to_end() {
        assert_eq!(roundtrip("<script>a < b"), "<script>a < b</script>");
    }

    #[test]
    fn test_bare_less_than_is_text() {
        assert_eq!(roundtrip("<p>1 < 2</p>"), "<p>1 &lt; 2</p>");
        assert_eq!(roundtrip("<p>a <= b</p><i>c</i>"), "<p>a &lt;= b</p><i>c</i>");
        assert_eq!(roundtrip("<p>x <</p>"), "<p>x &lt;</p>");
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        assert_eq!(roundtrip("<div>a</span></div>"), "<div>a</div>");
    }

    #[test]
    fn test_end_tag_closes_inner_elements() {
        assert_eq!(roundtrip("<div><p>a</div><i>b</i>"), "<div><p>a</p></div><i>b</i>");
    }

    #[test]
    fn test_attribute_access() {
        let mut doc = HtmlDocument::parse(r#"<a href="x?a=1&amp;b=2" title='say "hi"'>l</a>"#).unwrap();
        let link = doc.first_element().unwrap();

        assert_eq!(doc.attr(link, "href").as_deref(), Some("x?a=1&b=2"));
        assert_eq!(doc.attr(link, "title").as_deref(), Some("say \"hi\""));
        assert_eq!(doc.attr(link, "missing"), None);

        doc.set_attr(link, "href", "y&z");
        doc.remove_attr(link, "title");
        doc.set_attr(link, "rel", "me");
        assert_eq!(doc.to_markup(), r#"<a href="y&amp;z" rel="me">l</a>"#);
    }

    #[test]
    fn test_children_are_elements_only() {
        let doc = HtmlDocument::parse("<div>text<b>1</b><!-- c --><i>2</i></div>").unwrap();
        let div = doc.first_element().unwrap();
        let names: Vec<_> = doc
            .children(div)
            .into_iter()
            .map(|c| doc.element_name(c).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b", "i"]);
    }

    #[test]
    fn test_select_includes_self() {
        let doc =
            HtmlDocument::parse(r#"<li value-of="a"><span value-of="b"></span><i>c</i></li>"#)
                .unwrap();
        let li = doc.first_element().unwrap();
        let found = doc.select_with_attr(li, "value-of");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], li);
    }

    #[test]
    fn test_inner_text_and_link() {
        let mut doc = HtmlDocument::parse("<p>old <b>content</b></p><q></q>").unwrap();
        let p = doc.first_element().unwrap();
        doc.set_inner_text(p, "1 < 2");
        assert_eq!(doc.inner_markup(p), "1 &lt; 2");

        let q = doc.children(doc.root()).into_iter().nth(1).unwrap();
        doc.set_inner_link(q, "https://x?a&b", "site");
        assert_eq!(
            doc.outer_markup(q),
            r#"<q><a href="https://x?a&amp;b">site</a></q>"#
        );
    }

    #[test]
    fn test_remove_and_append() {
        let mut doc = HtmlDocument::parse("<ul><li>a</li><li>b</li></ul>").unwrap();
        let ul = doc.first_element().unwrap();
        let first = doc.children(ul)[0];

        let stamp = doc.outer_markup(first);
        doc.remove(first);
        assert_eq!(doc.parent(first), None);
        assert_eq!(doc.to_markup(), "<ul><li>b</li></ul>");

        doc.append_markup(ul, &stamp).unwrap();
        assert_eq!(doc.to_markup(), "<ul><li>b</li><li>a</li></ul>");
        assert_eq!(doc.children(ul).len(), 2);
    }

    #[test]
    fn test_fragment_first_element() {
        let doc = HtmlDocument::parse("  <tr><td>1</td></tr>").unwrap();
        let row = doc.first_element().unwrap();
        assert_eq!(doc.element_name(row), Some("tr"));
        assert_eq!(doc.parent(row), Some(doc.root()));
    }
}
