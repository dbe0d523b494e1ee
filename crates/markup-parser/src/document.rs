//! In-memory document tree produced by the parser.
//!
//! The tree is owned by value: each element owns its children, and nothing
//! points back up. Printers walk [`Element::value`] to re-emit markup.

use indexmap::IndexMap;
use serde::Serialize;

/// Characters that separate scopes inside a name (`svg:rect`, `a.b.c`).
pub const SCOPE_SEPARATORS: &[char] = &[':', '.'];

/// Attribute map. Keeps source order; equality ignores order.
pub type Attributes = IndexMap<String, String>;

/// A parsed markup document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub root: Element,
    pub instructions: ProcessingInstructions,
}

impl Document {
    /// Number of elements in the tree, root included.
    pub fn element_count(&self) -> usize {
        1 + self.root.descendants().count()
    }
}

/// `<?target key="value"?>` metadata. An empty target means none were given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingInstructions {
    pub target: String,
    pub attributes: Attributes,
}

impl ProcessingInstructions {
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

/// One node of the document tree.
///
/// `Clone`, `PartialEq` and `Drop` walk the tree with an explicit stack, so
/// trees of any depth can be copied, compared and released.
#[derive(Debug, Serialize)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub value: ElementValue,
}

/// Content of an element. Text and child elements never mix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementValue {
    #[default]
    Empty,
    Text(String),
    Children(Vec<Element>),
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            value: ElementValue::Empty,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.value = ElementValue::Text(text.into());
        self
    }

    /// Append a child, replacing any text value.
    pub fn with_child(mut self, child: Element) -> Self {
        match self.value {
            ElementValue::Children(ref mut children) => children.push(child),
            _ => self.value = ElementValue::Children(vec![child]),
        }
        self
    }

    /// Name without its scope: `svg:rect` → `rect`.
    pub fn unscoped_name(&self) -> &str {
        self.name
            .rfind(SCOPE_SEPARATORS)
            .map_or(self.name.as_str(), |i| &self.name[i + 1..])
    }

    /// Name split on scope separators: `a.b:c` → `["a", "b", "c"]`.
    pub fn scoped_name_parts(&self) -> Vec<&str> {
        self.name.split(SCOPE_SEPARATORS).collect()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_value(&self) -> bool {
        !matches!(self.value, ElementValue::Empty)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.value, ElementValue::Text(_))
    }

    pub fn is_children(&self) -> bool {
        matches!(self.value, ElementValue::Children(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            ElementValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Child elements; empty unless the value is `Children`.
    pub fn children(&self) -> &[Element] {
        match &self.value {
            ElementValue::Children(children) => children,
            _ => &[],
        }
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Number of levels in the tree rooted here; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((element, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(element.children().iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Copy of name and attributes with room for the children, which are
    /// attached by the caller.
    fn shallow_clone(&self) -> Self {
        let value = match &self.value {
            ElementValue::Empty => ElementValue::Empty,
            ElementValue::Text(text) => ElementValue::Text(text.clone()),
            ElementValue::Children(children) => {
                ElementValue::Children(Vec::with_capacity(children.len()))
            }
        };
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            value,
        }
    }

    /// All elements below this one, depth-first in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children().iter().rev().collect(),
        }
    }
}

enum CloneStep<'a> {
    Open(&'a Element),
    Close,
}

impl Clone for Element {
    fn clone(&self) -> Self {
        let mut built: Vec<Element> = Vec::new();
        let mut steps = vec![CloneStep::Open(self)];
        while let Some(step) = steps.pop() {
            match step {
                CloneStep::Open(element) => {
                    built.push(element.shallow_clone());
                    steps.push(CloneStep::Close);
                    steps.extend(element.children().iter().rev().map(CloneStep::Open));
                }
                CloneStep::Close => {
                    let Some(done) = built.pop() else { break };
                    match built.last_mut() {
                        Some(parent) => {
                            if let ElementValue::Children(children) = &mut parent.value {
                                children.push(done);
                            }
                        }
                        None => return done,
                    }
                }
            }
        }
        unreachable!("the root's close step returns the copy")
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.name != b.name || a.attributes != b.attributes {
                return false;
            }
            match (&a.value, &b.value) {
                (ElementValue::Empty, ElementValue::Empty) => {}
                (ElementValue::Text(x), ElementValue::Text(y)) if x == y => {}
                (ElementValue::Children(x), ElementValue::Children(y)) if x.len() == y.len() => {
                    pending.extend(x.iter().zip(y));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let ElementValue::Children(children) = &mut self.value else {
            return;
        };
        if children.iter().all(|c| !c.is_children()) {
            return;
        }
        let mut pending = std::mem::take(children);
        while let Some(mut element) = pending.pop() {
            if let ElementValue::Children(grandchildren) = &mut element.value {
                pending.append(grandchildren);
            }
        }
    }
}

/// Iterator returned by [`Element::descendants`].
///
/// Uses an explicit stack so deep trees don't exhaust the call stack.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children().iter().rev());
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Element {
        Element::new("root")
            .with_child(
                Element::new("a")
                    .with_child(Element::new("a1"))
                    .with_child(Element::new("a2").with_text("x")),
            )
            .with_child(Element::new("b"))
    }

    #[test]
    fn test_unscoped_name() {
        assert_eq!(Element::new("svg:rect").unscoped_name(), "rect");
        assert_eq!(Element::new("a.b:c").unscoped_name(), "c");
        assert_eq!(Element::new("plain").unscoped_name(), "plain");
    }

    #[test]
    fn test_scoped_name_parts() {
        assert_eq!(
            Element::new("a.b:c").scoped_name_parts(),
            vec!["a", "b", "c"]
        );
        assert_eq!(Element::new("plain").scoped_name_parts(), vec!["plain"]);
    }

    #[test]
    fn test_attribute_lookup() {
        let el = Element::new("a").with_attribute("x", "1");
        assert_eq!(el.attribute("x"), Some("1"));
        assert_eq!(el.attribute("y"), None);
    }

    #[test]
    fn test_value_predicates() {
        let empty = Element::new("e");
        assert!(!empty.has_value());
        assert!(!empty.is_text() && !empty.is_children());

        let text = Element::new("t").with_text("hi");
        assert!(text.has_value() && text.is_text());
        assert_eq!(text.text(), Some("hi"));
        assert!(text.children().is_empty());

        let parent = Element::new("p").with_child(Element::new("c"));
        assert!(parent.has_value() && parent.is_children());
        assert_eq!(parent.text(), None);
    }

    #[test]
    fn test_with_child_replaces_text() {
        let el = Element::new("p").with_text("gone").with_child(Element::new("c"));
        assert_eq!(el.value, ElementValue::Children(vec![Element::new("c")]));
    }

    #[test]
    fn test_child_by_name() {
        let root = sample();
        assert_eq!(root.child("b"), Some(&Element::new("b")));
        assert!(root.child("a1").is_none());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = sample();
        let names: Vec<&str> = root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_element_count() {
        let doc = Document {
            root: sample(),
            instructions: ProcessingInstructions::default(),
        };
        assert_eq!(doc.element_count(), 5);
        assert!(doc.instructions.is_empty());
    }

    #[test]
    fn test_attribute_equality_ignores_order() {
        let a = Element::new("a").with_attribute("x", "1").with_attribute("y", "2");
        let b = Element::new("a").with_attribute("y", "2").with_attribute("x", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_depth() {
        assert_eq!(Element::new("leaf").depth(), 1);
        assert_eq!(sample().depth(), 3);
    }

    #[test]
    fn test_clone_keeps_structure() {
        let root = sample();
        let copy = root.clone();
        assert_eq!(copy, root);
        assert_eq!(copy.children()[0].children()[1].text(), Some("x"));
    }

    #[test]
    fn test_inequality_below_root() {
        let a = sample();
        let b = Element::new("root")
            .with_child(
                Element::new("a")
                    .with_child(Element::new("a1"))
                    .with_child(Element::new("a2").with_text("y")),
            )
            .with_child(Element::new("b"));
        assert_ne!(a, b);
        assert_ne!(a, Element::new("root").with_child(Element::new("a")));
    }

    // =========================================================================
    // Deep trees
    // =========================================================================

    fn chain(depth: usize) -> Element {
        let mut el = Element::new("n");
        for _ in 1..depth {
            el = Element::new("n").with_child(el);
        }
        el
    }

    #[test]
    fn test_deep_tree_clone_compare_drop() {
        let depth = 200_000;
        let root = chain(depth);
        assert_eq!(root.depth(), depth);
        let copy = root.clone();
        assert!(copy == root);
        drop(copy);
        drop(root);
    }

    #[test]
    fn test_serialize_to_json() {
        let el = Element::new("a")
            .with_attribute("x", "1")
            .with_child(Element::new("b").with_text("hi"));
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "a",
                "attributes": { "x": "1" },
                "value": {
                    "children": [
                        { "name": "b", "attributes": {}, "value": { "text": "hi" } }
                    ]
                }
            })
        );
    }
}
