use crate::domain::ports::HandlerSettings;
use crate::utils::error::{Result, UnregisterError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedDocument = Arc<Mutex<Document>>;

/// Locks a shared document, recovering the tree from a poisoned lock.
pub fn lock_document(document: &SharedDocument) -> MutexGuard<'_, Document> {
    document
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// In-memory element tree. Nodes are never freed; removal only detaches them,
/// so a `NodeId` held by an in-flight request stays valid.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            root: NodeId(0),
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn element(&self, id: NodeId) -> Result<&Element> {
        self.nodes.get(id.0).ok_or(UnregisterError::UnknownNode(id.0))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.nodes
            .get_mut(id.0)
            .ok_or(UnregisterError::UnknownNode(id.0))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.element(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(UnregisterError::DocumentError {
                message: format!("node {} cannot contain its own ancestor", parent.0),
            });
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|e| e.tag.as_str())
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        let element = self.element_mut(id)?;
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id.0)
            .map(|e| e.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(id.0)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.element_mut(id)?.text = text.to_string();
        Ok(())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|e| e.text.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Inclusive ancestor search, matching DOM `Element.closest` on a tag selector.
    /// Works on detached subtrees too.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            let element = self.nodes.get(node.0)?;
            if element.tag.eq_ignore_ascii_case(tag) {
                return Some(node);
            }
            current = element.parent;
        }
        None
    }

    /// Detaches the subtree rooted at `id`. Returns whether anything changed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        self.detach(id)
    }

    fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes.get(id.0).and_then(|e| e.parent) else {
            return false;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
        true
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.root || self.is_ancestor(self.root, id)
    }

    /// Connected elements with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let element = &self.nodes[node.0];
            if element.tag.eq_ignore_ascii_case(tag) {
                found.push(node);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        found
    }

    /// First connected element whose `name` attribute equals `value`.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let element = &self.nodes[node.0];
            if element.attributes.get(name).map(String::as_str) == Some(value) {
                return Some(node);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        None
    }
}

/// Renders a participant list the way the activity page does:
/// `ul > li > (span.participant-email, button.<marker>[<attr>=email])`.
/// Returns the created list items in order.
pub fn render_participant_list(
    doc: &mut Document,
    parent: NodeId,
    emails: &[String],
    settings: &HandlerSettings,
) -> Result<Vec<NodeId>> {
    let list = doc.create_element("ul");
    doc.add_class(list, "participants-list")?;
    doc.append_child(parent, list)?;

    let mut items = Vec::with_capacity(emails.len());
    for email in emails {
        let item = doc.create_element(&settings.list_item_tag);
        doc.append_child(list, item)?;

        let label = doc.create_element("span");
        doc.add_class(label, "participant-email")?;
        doc.set_text(label, email)?;
        doc.append_child(item, label)?;

        let button = doc.create_element("button");
        doc.add_class(button, &settings.marker_class)?;
        doc.set_attribute(button, &settings.email_attribute, email)?;
        doc.set_text(button, "✖")?;
        doc.append_child(item, button)?;

        items.push(item);
    }

    tracing::debug!("Rendered participant list with {} items", items.len());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let root = doc.root();
        let emails = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let items =
            render_participant_list(&mut doc, root, &emails, &HandlerSettings::default()).unwrap();
        (doc, items)
    }

    #[test]
    fn test_render_participant_list() {
        let (doc, items) = sample();
        assert_eq!(items.len(), 2);
        assert_eq!(doc.elements_by_tag("li"), items);

        let button = doc.find_by_attribute("data-email", "b@example.com").unwrap();
        assert_eq!(doc.tag(button), Some("button"));
        assert!(doc.has_class(button, "delete-btn"));
        assert_eq!(doc.closest(button, "li"), Some(items[1]));
    }

    #[test]
    fn test_closest_is_inclusive() {
        let (doc, items) = sample();
        assert_eq!(doc.closest(items[0], "LI"), Some(items[0]));
        assert_eq!(doc.closest(doc.root(), "li"), None);
    }

    #[test]
    fn test_remove_detaches_only_that_subtree() {
        let (mut doc, items) = sample();
        let button = doc.find_by_attribute("data-email", "a@example.com").unwrap();

        assert!(doc.remove(items[0]));
        assert!(!doc.is_connected(items[0]));
        assert!(!doc.is_connected(button));
        assert!(doc.is_connected(items[1]));
        assert_eq!(doc.elements_by_tag("li"), vec![items[1]]);

        // detached subtree keeps its shape
        assert_eq!(doc.closest(button, "li"), Some(items[0]));
        assert!(!doc.remove(items[0]));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(!doc.remove(root));
        assert!(doc.is_connected(root));
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert!(doc.append_child(inner, outer).is_err());
        assert!(doc.append_child(outer, NodeId(99)).is_err());
    }
}
