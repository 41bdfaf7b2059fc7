use crate::syntax::tree::Node;
use std::collections::HashMap;

/// Per-parse state shared by the plugins and handed on to the renderer.
///
/// A fresh context is created for every [`crate::MarkdownParser::parse`] call and travels with the resulting
/// [`crate::SyntaxDoc`]; it is never shared between documents.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct PluginContext {
    pub footnotes: FootnoteTable,
    pub(crate) depth: usize,
    /// The document's link reference definitions, as Markdown source.
    pub(crate) link_definitions: String,
}

impl PluginContext {
    /// How many nested parses (footnote bodies, definition-list terms) enclose the current position.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Label to footnote body, in the order the definitions appeared.
///
/// The first definition of a label wins: [`FootnoteTable::insert`] refuses later ones.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct FootnoteTable {
    order: Vec<String>,
    bodies: HashMap<String, Vec<Node>>,
}

impl FootnoteTable {
    /// Adds a definition. Returns `false` (and drops `body`) if the label is already defined.
    pub fn insert(&mut self, label: impl Into<String>, body: Vec<Node>) -> bool {
        let label = label.into();
        if self.bodies.contains_key(&label) {
            return false;
        }
        self.order.push(label.clone());
        self.bodies.insert(label, body);
        true
    }

    pub fn get(&self, label: &str) -> Option<&Vec<Node>> {
        self.bodies.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.bodies.contains_key(label)
    }

    /// Labels in definition order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Definitions in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Vec<Node>)> {
        self.order
            .iter()
            .filter_map(|label| self.bodies.get(label).map(|body| (label.as_str(), body)))
    }

    pub(crate) fn get_mut(&mut self, label: &str) -> Option<&mut Vec<Node>> {
        self.bodies.get_mut(label)
    }

    pub(crate) fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Vec<Node>> {
        self.bodies.values_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_definition_wins() {
        let mut table = FootnoteTable::default();
        assert!(table.insert("a", vec![Node::literal_paragraph("first")]));
        assert!(!table.insert("a", vec![Node::literal_paragraph("second")]));
        assert_eq!(table.get("a"), Some(&vec![Node::literal_paragraph("first")]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn keeps_definition_order() {
        let mut table = FootnoteTable::default();
        for label in ["z", "a", "m"] {
            table.insert(label, Vec::new());
        }
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(table.iter().map(|(label, _)| label).collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn missing_label() {
        let table = FootnoteTable::default();
        assert!(table.is_empty());
        assert!(!table.contains("nope"));
        assert_eq!(table.get("nope"), None);
    }
}
