use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use log::debug;

use crate::dom::parser;
use crate::dom::types::{
    DocumentId, LayoutBox, NodeData, NodeId, Platform, ReadyState, ScrollBehavior, ScrollRecord,
    Viewport,
};
use crate::utils::error::ViewerError;

/// Document shared between the content host and the table of contents
pub type SharedDocument = Rc<RefCell<Document>>;

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: LayoutBox,
}

impl Node {
    fn new(generation: u32, data: NodeData) -> Self {
        Self {
            generation,
            data,
            parent: None,
            children: Vec::new(),
            layout: LayoutBox::default(),
        }
    }
}

/// Arena-backed document tree with viewport state.
///
/// Nodes live in slots addressed by [`NodeId`]; freed slots are reused with a
/// bumped generation so handles held across a content replacement go stale
/// instead of pointing at new content.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    origin: String,
    ready_state: ReadyState,
    platform: Platform,
    viewport: Viewport,
    last_scroll: Option<ScrollRecord>,
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
}

impl Document {
    /// Create an empty document in the `Loading` state
    pub fn new(origin: impl Into<String>) -> Self {
        let mut doc = Self {
            id: DocumentId::next(),
            origin: origin.into(),
            ready_state: ReadyState::Loading,
            platform: Platform::default(),
            viewport: Viewport::default(),
            last_scroll: None,
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
        };
        doc.root = doc.alloc(NodeData::Document);
        doc
    }

    /// Parse markup into a complete document
    pub fn parse(origin: impl Into<String>, html: &str) -> Self {
        let mut doc = Self::new(origin);
        let root = doc.root;
        parser::parse_into(&mut doc, root, html);
        doc.ready_state = ReadyState::Complete;
        doc
    }

    /// Wrap in the shared handle used by content roots
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scroll_top(&self) -> f64 {
        self.viewport.scroll_top
    }

    /// User-driven scroll
    pub fn set_scroll_top(&mut self, top: f64) {
        self.viewport.scroll_top = top.max(0.0);
    }

    /// Programmatic scroll; smooth requests degrade to instant when unsupported
    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> ScrollRecord {
        let behavior = match behavior {
            ScrollBehavior::Smooth if !self.platform.smooth_scroll => ScrollBehavior::Instant,
            other => other,
        };
        let record = ScrollRecord {
            top: top.max(0.0),
            behavior,
        };
        self.viewport.scroll_top = record.top;
        self.last_scroll = Some(record);
        record
    }

    pub fn last_scroll(&self) -> Option<ScrollRecord> {
        self.last_scroll
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, data));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, data)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        NodeId::new(idx as u32, generation)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|n| n.generation == id.generation())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|n| n.generation == id.generation())
    }

    /// Whether `id` still refers to a live node of this document
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes, including the document node
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ViewerError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(ViewerError::ElementNotFound(format!("{:?}", child)));
        }
        if parent == child || self.contains(child, parent) {
            return Err(ViewerError::Generic(
                "cannot append a node to its own subtree".to_string(),
            ));
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Remove a node and its whole subtree, freeing their slots
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) || id == self.root {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.idx()).and_then(|s| s.take()) {
                stack.extend(node.children);
                self.free_list.push(current.idx());
            }
        }
    }

    /// Replace the children of `parent` with parsed markup
    pub fn set_inner_html(&mut self, parent: NodeId, html: &str) -> Result<(), ViewerError> {
        if !self.is_alive(parent) {
            return Err(ViewerError::ElementNotFound(format!("{:?}", parent)));
        }
        let children = self.children(parent).to_vec();
        for child in children {
            self.remove(child);
        }
        parser::parse_into(self, parent, html);
        debug!("Replaced content of {:?} in {}", parent, self.id);
        Ok(())
    }

    /// Reset the whole document to freshly parsed markup
    pub fn load_html(&mut self, html: &str) {
        let root = self.root;
        for child in self.children(root).to_vec() {
            self.remove(child);
        }
        parser::parse_into(self, root, html);
        self.viewport.scroll_top = 0.0;
        self.last_scroll = None;
        self.ready_state = ReadyState::Complete;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag_name(id).is_some()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Element { attributes, .. }) => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Set an attribute on an element; returns false for non-elements
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        match self.node_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element { attributes, .. }) => {
                if let Some(slot) = attributes.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
                    slot.1 = value.to_string();
                } else {
                    attributes.push((name.to_ascii_lowercase(), value.to_string()));
                }
                true
            }
            _ => false,
        }
    }

    /// Non-empty `id` attribute of an element
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id").filter(|v| !v.is_empty())
    }

    pub fn set_element_id(&mut self, id: NodeId, value: &str) -> bool {
        self.set_attribute(id, "id", value)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeData::Text(t)) = self.data(id) {
            text.push_str(t);
            return text;
        }
        for node in self.descendants(id) {
            if let Some(NodeData::Text(t)) = self.data(node) {
                text.push_str(t);
            }
        }
        text
    }

    /// Descendants of `scope` in pre-order, excluding `scope` itself
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Elements under `scope` whose tag is one of `tags`, in document order
    pub fn query_tags(&self, scope: NodeId, tags: &[String]) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| {
                self.tag_name(*id)
                    .map(|tag| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// First element with the given id, searching the whole document or a subtree
    pub fn get_element_by_id(&self, scope: Option<NodeId>, element_id: &str) -> Option<NodeId> {
        let scope = scope.unwrap_or(self.root);
        self.descendants(scope)
            .into_iter()
            .find(|id| self.element_id(*id) == Some(element_id))
    }

    /// Whether `node` is `ancestor` or lies inside its subtree
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = self.parent(id);
        while let Some(p) = current {
            path.push(p);
            current = self.parent(p);
        }
        path.reverse();
        path
    }

    /// Pre-order comparison: an ancestor precedes its descendants, and a node
    /// precedes any later sibling and that sibling's descendants.
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_to_root(a);
        let path_b = self.path_to_root(b);
        let common = path_a
            .iter()
            .zip(path_b.iter())
            .take_while(|(x, y)| x == y)
            .count();

        if common == path_a.len() {
            return Ordering::Less;
        }
        if common == path_b.len() {
            return Ordering::Greater;
        }
        if common == 0 {
            // Disconnected nodes: fall back to slot order for a stable answer
            return a.idx().cmp(&b.idx());
        }

        let parent = path_a[common - 1];
        let siblings = self.children(parent);
        let pos_a = siblings.iter().position(|c| *c == path_a[common]);
        let pos_b = siblings.iter().position(|c| *c == path_b[common]);
        pos_a.cmp(&pos_b)
    }

    pub fn layout_box(&self, id: NodeId) -> Option<LayoutBox> {
        self.node(id).map(|n| n.layout)
    }

    pub fn set_layout_box(&mut self, id: NodeId, layout: LayoutBox) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.layout = layout;
                true
            }
            None => false,
        }
    }

    /// Document-relative top of an element
    pub fn offset_top(&self, id: NodeId) -> Option<f64> {
        self.layout_box(id).map(|b| b.top)
    }

    /// Bottom edge of the lowest laid-out node
    pub fn content_height(&self) -> f64 {
        self.nodes
            .iter()
            .flatten()
            .map(|n| n.layout.bottom())
            .fold(0.0, f64::max)
    }
}
