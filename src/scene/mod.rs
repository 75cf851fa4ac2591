//! Generic scene graph the widget renders into.
//!
//! A small arena-backed element tree with one level of shadow encapsulation:
//! the host element owns *light* children supplied by the embedding page
//! (slot content) and a shadow root owned by the widget. Lookups by id only
//! search the shadow tree, so page content can never collide with the
//! widget's internal ids.
//!
//! Click handling is data, not closures: an element may carry a [`Control`],
//! and [`Scene::click`] bubbles from the clicked node to the nearest ancestor
//! carrying one.
//!
//! Once [`Scene::dispose`] has been called every mutation fails with
//! [`SceneError::Disposed`], which is how late results from in-flight
//! acquisitions are kept off a torn-down surface.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;

/// Index of a node in the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Interactive behavior attached to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Perform one pull acquisition.
    ManualTrigger,
    /// Stop the recurring timer.
    Stop,
}

impl Control {
    /// Stable name used in dumps and logs.
    pub fn label(self) -> &'static str {
        match self {
            Control::ManualTrigger => "manual-trigger",
            Control::Stop => "stop",
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The custom element itself.
    Host {
        /// Element tag, `fact-card` for the card.
        tag: String,
    },
    /// Encapsulated subtree owned by the widget.
    ShadowRoot,
    /// Ordinary element.
    Element {
        /// Element tag.
        tag: String,
    },
    /// Text leaf.
    Text(String),
    /// Insertion point for light children carrying a matching `slot` name.
    Slot {
        /// Slot name.
        name: String,
    },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    id: Option<String>,
    class: Option<String>,
    style: BTreeMap<String, String>,
    slot: Option<String>,
    control: Option<Control>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            id: None,
            class: None,
            style: BTreeMap::new(),
            slot: None,
            control: None,
        }
    }
}

/// Errors raised by scene mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The scene was disposed; no further writes are accepted.
    #[error("scene has been disposed")]
    Disposed,
    /// The id does not belong to this scene.
    #[error("no node {0:?}")]
    UnknownNode(NodeId),
    /// Text nodes cannot take children.
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),
}

/// Element tree with a host element and an optional shadow root.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    /// Released slots, reused by the next created node.
    free: Vec<NodeId>,
    host: NodeId,
    shadow: Option<NodeId>,
    disposed: bool,
}

impl Scene {
    /// Create a scene whose host element has the given tag.
    pub fn new(host_tag: impl Into<String>) -> Self {
        let host = Node::new(NodeKind::Host {
            tag: host_tag.into(),
        });
        Self {
            nodes: vec![host],
            free: Vec::new(),
            host: NodeId(0),
            shadow: None,
            disposed: false,
        }
    }

    /// The host element.
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// The shadow root, once attached.
    pub fn shadow_root(&self) -> Option<NodeId> {
        self.shadow
    }

    /// Whether [`Scene::dispose`] was called and not revived.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Attach the shadow root, or return the existing one.
    pub fn attach_shadow(&mut self) -> Result<NodeId, SceneError> {
        self.ensure_live()?;
        if let Some(shadow) = self.shadow {
            return Ok(shadow);
        }
        let shadow = self.push(Node::new(NodeKind::ShadowRoot));
        self.node_mut(shadow)?.parent = Some(self.host);
        self.shadow = Some(shadow);
        Ok(shadow)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> Result<NodeId, SceneError> {
        self.ensure_live()?;
        Ok(self.push(Node::new(NodeKind::Element { tag: tag.into() })))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> Result<NodeId, SceneError> {
        self.ensure_live()?;
        Ok(self.push(Node::new(NodeKind::Text(text.into()))))
    }

    /// Create a detached slot named `name`.
    pub fn create_slot(&mut self, name: impl Into<String>) -> Result<NodeId, SceneError> {
        self.ensure_live()?;
        Ok(self.push(Node::new(NodeKind::Slot { name: name.into() })))
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.ensure_live()?;
        if matches!(self.node(parent)?.kind, NodeKind::Text(_)) {
            return Err(SceneError::NotAContainer(parent));
        }
        self.node(child)?;
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Add page-supplied content to the host, assigned to the named slot.
    pub fn append_light_child(
        &mut self,
        slot: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        let span = self.create_element("span")?;
        self.nodes[span.0].slot = Some(slot.into());
        let text = self.create_text(text)?;
        self.append_child(span, text)?;
        self.append_child(self.host, span)?;
        Ok(span)
    }

    /// Set the element id.
    pub fn set_id(&mut self, node: NodeId, id: impl Into<String>) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.node_mut(node)?.id = Some(id.into());
        Ok(())
    }

    /// Set the class attribute.
    pub fn set_class(&mut self, node: NodeId, class: impl Into<String>) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.node_mut(node)?.class = Some(class.into());
        Ok(())
    }

    /// Set one inline style property.
    pub fn set_style(
        &mut self,
        node: NodeId,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.node_mut(node)?
            .style
            .insert(property.into(), value.into());
        Ok(())
    }

    /// Make `node` handle clicks as `control`.
    pub fn set_control(&mut self, node: NodeId, control: Control) -> Result<(), SceneError> {
        self.ensure_live()?;
        self.node_mut(node)?.control = Some(control);
        Ok(())
    }

    /// Replace all children of `node` with a single text node.
    ///
    /// A lone text child is rewritten in place; anything else is released.
    pub fn set_text_content(
        &mut self,
        node: NodeId,
        text: impl Into<String>,
    ) -> Result<(), SceneError> {
        self.ensure_live()?;
        if let NodeKind::Text(existing) = &mut self.node_mut(node)?.kind {
            *existing = text.into();
            return Ok(());
        }
        if let &[only] = self.nodes[node.0].children.as_slice() {
            if let NodeKind::Text(existing) = &mut self.nodes[only.0].kind {
                *existing = text.into();
                return Ok(());
            }
        }
        self.release_children(node);
        let text = self.create_text(text)?;
        self.append_child(node, text)
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        if let NodeKind::Text(text) = &n.kind {
            out.push_str(text);
        }
        for child in &n.children {
            self.collect_text(*child, out);
        }
    }

    /// Find an element in the shadow tree by id.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let shadow = self.shadow?;
        self.descendants(shadow)
            .into_iter()
            .find(|n| self.nodes[n.0].id.as_deref() == Some(id))
    }

    /// First element in the shadow tree with the given class.
    pub fn element_by_class(&self, class: &str) -> Option<NodeId> {
        let shadow = self.shadow?;
        self.descendants(shadow)
            .into_iter()
            .find(|n| self.nodes[n.0].class.as_deref() == Some(class))
    }

    /// Controls in the shadow tree, in document order.
    pub fn controls(&self) -> Vec<(NodeId, Control)> {
        let Some(shadow) = self.shadow else {
            return Vec::new();
        };
        self.descendants(shadow)
            .into_iter()
            .filter_map(|n| self.nodes[n.0].control.map(|c| (n, c)))
            .collect()
    }

    /// Text shown for a control: its own text, or the content assigned to
    /// any slot inside it.
    pub fn control_label(&self, node: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(node) {
            match &self.nodes[n.0].kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Slot { name } => out.push_str(&self.assigned_content(name)),
                _ => {}
            }
        }
        out
    }

    /// Text of the light children assigned to `slot`.
    pub fn assigned_content(&self, slot: &str) -> String {
        let mut out = String::new();
        for child in &self.nodes[self.host.0].children {
            if self.nodes[child.0].slot.as_deref() == Some(slot) {
                self.collect_text(*child, &mut out);
            }
        }
        out
    }

    /// Dispatch a click at `node`, bubbling to the nearest control.
    ///
    /// Returns `None` when nothing handles the click or the scene is disposed.
    pub fn click(&self, node: NodeId) -> Option<Control> {
        if self.disposed {
            return None;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.nodes.get(id.0)?;
            if let Some(control) = n.control {
                return Some(control);
            }
            current = n.parent;
        }
        None
    }

    /// Inline style value of an element.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(node.0)?
            .style
            .get(property)
            .map(String::as_str)
    }

    /// Remove everything under the shadow root and mark the scene unusable.
    pub fn dispose(&mut self) {
        if let Some(shadow) = self.shadow {
            self.release_children(shadow);
        }
        self.disposed = true;
    }

    /// Make a disposed scene writable again with an empty shadow root.
    pub fn revive(&mut self) {
        self.disposed = false;
        if let Some(shadow) = self.shadow {
            self.release_children(shadow);
        }
    }

    /// Number of nodes in use. Released slots are not counted.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Indented textual rendering of the tree, used by tests and debug logs.
    ///
    /// Children of `<style>` elements are elided.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.host, 0, &mut out);
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String) {
        let n = &self.nodes[node.0];
        let indent = "  ".repeat(depth);
        let mut elide_children = false;
        match &n.kind {
            NodeKind::Host { tag } => {
                let _ = writeln!(out, "{indent}<{tag}>");
            }
            NodeKind::ShadowRoot => {
                let _ = writeln!(out, "{indent}#shadow-root");
            }
            NodeKind::Text(text) => {
                let _ = writeln!(out, "{indent}{text:?}");
            }
            NodeKind::Slot { name } => {
                let _ = writeln!(out, "{indent}<slot name=\"{name}\">");
            }
            NodeKind::Element { tag } => {
                elide_children = tag == "style";
                let mut line = format!("{indent}<{tag}");
                if let Some(id) = &n.id {
                    let _ = write!(line, " id=\"{id}\"");
                }
                if let Some(class) = &n.class {
                    let _ = write!(line, " class=\"{class}\"");
                }
                if let Some(slot) = &n.slot {
                    let _ = write!(line, " slot=\"{slot}\"");
                }
                if !n.style.is_empty() {
                    let style: Vec<String> =
                        n.style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    let _ = write!(line, " style=\"{}\"", style.join("; "));
                }
                if let Some(control) = n.control {
                    let _ = write!(line, " [click={}]", control.label());
                }
                let _ = writeln!(out, "{line}>");
            }
        }
        if elide_children {
            return;
        }
        // Shadow root is listed first, then light children.
        if let (NodeKind::Host { .. }, Some(shadow)) = (&n.kind, self.shadow) {
            if !self.disposed || !self.nodes[shadow.0].children.is_empty() {
                self.dump_node(shadow, depth + 1, out);
            }
        }
        for child in &n.children {
            self.dump_node(*child, depth + 1, out);
        }
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = node;
            return id;
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Drop every descendant of `node` and return their slots to the free list.
    fn release_children(&mut self, node: NodeId) {
        let mut stack = std::mem::take(&mut self.nodes[node.0].children);
        while let Some(id) = stack.pop() {
            let released = std::mem::replace(
                &mut self.nodes[id.0],
                Node::new(NodeKind::Text(String::new())),
            );
            stack.extend(released.children);
            self.free.push(id);
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    fn ensure_live(&self) -> Result<(), SceneError> {
        if self.disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }
}
