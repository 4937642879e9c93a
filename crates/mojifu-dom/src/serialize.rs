//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! The content scorer only compares the length of a node's `innerHTML`
//! against its visible text, so the markup is measured, never built. The
//! walk keeps its own stack: nesting depth is bounded by the page, not by
//! the thread's stack.

use crate::{DomTree, NodeId, NodeType};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

enum Step {
    /// Serialize a node; the flag says whether its parent is raw text.
    Open(NodeId, bool),
    /// Emit an end tag of this many characters.
    Close(usize),
}

fn is_raw_text(tree: &DomTree, id: NodeId) -> bool {
    tree.as_element(id)
        .is_some_and(|e| RAW_TEXT_ELEMENTS.contains(&e.tag_name.as_str()))
}

impl DomTree {
    /// Length in characters of the serialized children of `id` (DOM
    /// `innerHTML`).
    #[must_use]
    pub fn inner_html_length(&self, id: NodeId) -> usize {
        let raw = is_raw_text(self, id);
        let mut stack: Vec<Step> = self
            .children(id)
            .iter()
            .rev()
            .map(|&child| Step::Open(child, raw))
            .collect();
        let mut length = 0;

        while let Some(step) = stack.pop() {
            let (id, parent_is_raw) = match step {
                Step::Close(end_tag) => {
                    length += end_tag;
                    continue;
                }
                Step::Open(id, parent_is_raw) => (id, parent_is_raw),
            };
            let Some(node) = self.get(id) else {
                continue;
            };
            match &node.node_type {
                NodeType::Document => {
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c, false)));
                }
                NodeType::Element(data) => {
                    let tag = data.tag_name.chars().count();
                    // <tag name="value">
                    length += tag + 2;
                    for (name, value) in &data.attrs {
                        length += name.chars().count() + escaped_length(value, true) + 4;
                    }
                    if VOID_ELEMENTS.contains(&data.tag_name.as_str()) {
                        continue;
                    }
                    // </tag>
                    stack.push(Step::Close(tag + 3));
                    let raw = is_raw_text(self, id);
                    stack.extend(node.children.iter().rev().map(|&c| Step::Open(c, raw)));
                }
                NodeType::Text(text) => {
                    length += if parent_is_raw {
                        text.chars().count()
                    } else {
                        escaped_length(text, false)
                    };
                }
                // <!--data-->
                NodeType::Comment(data) => length += data.chars().count() + 7,
            }
        }
        length
    }
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString),
/// measured.
fn escaped_length(text: &str, attribute_mode: bool) -> usize {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".len(),
            '\u{00A0}' => "&nbsp;".len(),
            '"' if attribute_mode => "&quot;".len(),
            '<' | '>' if !attribute_mode => "&lt;".len(),
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use crate::{DomTree, ElementData, NodeId, NodeType};

    #[test]
    fn test_inner_html_length_counts_escapes_and_skips_void_end_tags() {
        let mut tree = DomTree::new();
        let div = tree.alloc(NodeType::Element(ElementData::new("div")));
        tree.append_child(NodeId::ROOT, div);
        tree.append_text(div, "a < b & c");
        let br = tree.alloc(NodeType::Element(ElementData::new("br")));
        tree.append_child(div, br);
        let link = tree.alloc(NodeType::Element(
            ElementData::new("a").with_attr("title", "say \"hi\""),
        ));
        tree.append_child(div, link);
        tree.append_text(link, "x");

        let expected = "a &lt; b &amp; c<br><a title=\"say &quot;hi&quot;\">x</a>";
        assert_eq!(tree.inner_html_length(div), expected.chars().count());
    }

    #[test]
    fn test_script_text_is_not_escaped() {
        let mut tree = DomTree::new();
        let script = tree.alloc(NodeType::Element(ElementData::new("script")));
        tree.append_child(NodeId::ROOT, script);
        tree.append_text(script, "if (a < b) {}");

        assert_eq!(tree.inner_html_length(script), "if (a < b) {}".len());
    }

    #[test]
    fn test_comment_length() {
        let mut tree = DomTree::new();
        let div = tree.alloc(NodeType::Element(ElementData::new("div")));
        tree.append_child(NodeId::ROOT, div);
        let comment = tree.alloc(NodeType::Comment(" note ".to_string()));
        tree.append_child(div, comment);

        assert_eq!(tree.inner_html_length(div), "<!-- note -->".len());
    }
}
