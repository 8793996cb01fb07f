//! The owned document tree.
//!
//! A parsed document is a tree of [`Node`] handles. A `Node` is a cheap
//! reference-counted clone; child links are strong, the parent link is
//! weak, so dropping the [`Document`] releases the whole tree. Node
//! payloads live behind a `RefCell`, keeping structural operations
//! (append, detach, insert) independent from payload borrows, so a caller
//! can hold a [`NodeData`] borrow on one node while rearranging another.
//!
//! Filter scripts mutate the tree through these handles strictly
//! sequentially; nothing here is thread-safe, by the same token nothing
//! here ever blocks.

use std::{
  cell::{Ref, RefCell, RefMut},
  fmt,
  rc::{Rc, Weak},
};

/// Block and inline node kinds of core CommonMark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
  Document,
  Heading { level: u8 },
  Paragraph,
  BlockQuote,
  List(ListData),
  Item,
  CodeBlock { info: String, literal: String },
  HtmlBlock(String),
  ThematicBreak,
  Text(String),
  Emph,
  Strong,
  Code(String),
  HtmlInline(String),
  SoftBreak,
  LineBreak,
  Link { url: String, title: String },
  Image { url: String, title: String },
}

impl NodeValue {
  /// Stable lowercase name, as exposed to filter scripts.
  #[must_use]
  pub const fn name(&self) -> &'static str {
    match self {
      Self::Document => "document",
      Self::Heading { .. } => "heading",
      Self::Paragraph => "paragraph",
      Self::BlockQuote => "block_quote",
      Self::List(_) => "list",
      Self::Item => "item",
      Self::CodeBlock { .. } => "code_block",
      Self::HtmlBlock(_) => "html_block",
      Self::ThematicBreak => "thematic_break",
      Self::Text(_) => "text",
      Self::Emph => "emph",
      Self::Strong => "strong",
      Self::Code(_) => "code",
      Self::HtmlInline(_) => "html_inline",
      Self::SoftBreak => "softbreak",
      Self::LineBreak => "linebreak",
      Self::Link { .. } => "link",
      Self::Image { .. } => "image",
    }
  }

  /// Literal text carried by leaf kinds, if any.
  #[must_use]
  pub fn literal(&self) -> Option<&str> {
    match self {
      Self::Text(s) | Self::Code(s) | Self::HtmlInline(s) | Self::HtmlBlock(s) => Some(s),
      Self::CodeBlock { literal, .. } => Some(literal),
      _ => None,
    }
  }
}

/// Metadata carried by a `List` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListData {
  pub kind:      ListKind,
  pub start:     usize,
  pub delimiter: ListDelim,
  pub tight:     bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
  Bullet,
  Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDelim {
  Period,
  Paren,
}

/// Source span of a node in the original input, 1-based, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sourcepos {
  pub start_line:   usize,
  pub start_column: usize,
  pub end_line:     usize,
  pub end_column:   usize,
}

impl fmt::Display for Sourcepos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}-{}:{}",
      self.start_line, self.start_column, self.end_line, self.end_column
    )
  }
}

/// Payload of a node: its kind plus optional source position.
#[derive(Debug, Clone)]
pub struct NodeData {
  pub value:     NodeValue,
  pub sourcepos: Option<Sourcepos>,
}

struct NodeInner {
  data:     RefCell<NodeData>,
  parent:   RefCell<Option<Weak<NodeInner>>>,
  children: RefCell<Vec<Node>>,
}

/// Handle to a node in the document tree. Cloning is cheap and refers to
/// the same underlying node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
  /// Create a detached node with the given value.
  #[must_use]
  pub fn new(value: NodeValue) -> Self {
    Self(Rc::new(NodeInner {
      data:     RefCell::new(NodeData {
        value,
        sourcepos: None,
      }),
      parent:   RefCell::new(None),
      children: RefCell::new(Vec::new()),
    }))
  }

  /// Borrow the node payload.
  ///
  /// # Panics
  ///
  /// Panics if the payload is currently mutably borrowed.
  #[must_use]
  pub fn data(&self) -> Ref<'_, NodeData> {
    self.0.data.borrow()
  }

  /// Mutably borrow the node payload.
  ///
  /// # Panics
  ///
  /// Panics if the payload is currently borrowed.
  #[must_use]
  pub fn data_mut(&self) -> RefMut<'_, NodeData> {
    self.0.data.borrow_mut()
  }

  /// Whether two handles refer to the same node.
  #[must_use]
  pub fn same_node(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }

  #[must_use]
  pub fn parent(&self) -> Option<Self> {
    self
      .0
      .parent
      .borrow()
      .as_ref()
      .and_then(Weak::upgrade)
      .map(Node)
  }

  /// Snapshot of the node's children, in order.
  #[must_use]
  pub fn children(&self) -> Vec<Self> {
    self.0.children.borrow().clone()
  }

  #[must_use]
  pub fn first_child(&self) -> Option<Self> {
    self.0.children.borrow().first().cloned()
  }

  #[must_use]
  pub fn last_child(&self) -> Option<Self> {
    self.0.children.borrow().last().cloned()
  }

  #[must_use]
  pub fn next_sibling(&self) -> Option<Self> {
    let parent = self.parent()?;
    let index = parent.index_of(self)?;
    parent.0.children.borrow().get(index + 1).cloned()
  }

  #[must_use]
  pub fn previous_sibling(&self) -> Option<Self> {
    let parent = self.parent()?;
    let index = parent.index_of(self)?;
    index
      .checked_sub(1)
      .and_then(|i| parent.0.children.borrow().get(i).cloned())
  }

  /// Append `child` as the last child of `self`, detaching it from any
  /// previous parent first.
  pub fn append(&self, child: Self) {
    child.detach();
    *child.0.parent.borrow_mut() = Some(Rc::downgrade(&self.0));
    self.0.children.borrow_mut().push(child);
  }

  /// Insert `child` as the first child of `self`.
  pub fn prepend(&self, child: Self) {
    child.detach();
    *child.0.parent.borrow_mut() = Some(Rc::downgrade(&self.0));
    self.0.children.borrow_mut().insert(0, child);
  }

  /// Insert `sibling` immediately before `self`. No-op when `self` has no
  /// parent.
  pub fn insert_before(&self, sibling: Self) {
    let Some(parent) = self.parent() else { return };
    sibling.detach();
    let Some(index) = parent.index_of(self) else {
      return;
    };
    *sibling.0.parent.borrow_mut() = Some(Rc::downgrade(&parent.0));
    parent.0.children.borrow_mut().insert(index, sibling);
  }

  /// Insert `sibling` immediately after `self`. No-op when `self` has no
  /// parent.
  pub fn insert_after(&self, sibling: Self) {
    let Some(parent) = self.parent() else { return };
    sibling.detach();
    let Some(index) = parent.index_of(self) else {
      return;
    };
    *sibling.0.parent.borrow_mut() = Some(Rc::downgrade(&parent.0));
    parent.0.children.borrow_mut().insert(index + 1, sibling);
  }

  /// Remove `self` from its parent's child list. The node and its subtree
  /// stay alive as long as a handle to them exists.
  pub fn detach(&self) {
    let Some(parent) = self.parent() else { return };
    let mut siblings = parent.0.children.borrow_mut();
    if let Some(index) = siblings.iter().position(|n| n.same_node(self)) {
      siblings.remove(index);
    }
    drop(siblings);
    *self.0.parent.borrow_mut() = None;
  }

  /// Pre-order snapshot of this node and all nodes below it. Safe to
  /// mutate the tree while iterating the returned list.
  #[must_use]
  pub fn descendants(&self) -> Vec<Self> {
    let mut nodes = Vec::new();
    self.collect_descendants(&mut nodes);
    nodes
  }

  fn collect_descendants(&self, nodes: &mut Vec<Self>) {
    nodes.push(self.clone());
    for child in self.children() {
      child.collect_descendants(nodes);
    }
  }

  fn index_of(&self, child: &Self) -> Option<usize> {
    self
      .0
      .children
      .borrow()
      .iter()
      .position(|n| n.same_node(child))
  }
}

impl fmt::Debug for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Node({}, {} children)",
      self.data().value.name(),
      self.0.children.borrow().len()
    )
  }
}

/// The single artifact of a parse: the root of the document tree.
///
/// Exactly one `Document` exists per pipeline run. It owns the tree;
/// filters receive handles into it, the renderers read it, and dropping it
/// tears everything down.
#[derive(Debug)]
pub struct Document {
  root: Node,
}

impl Document {
  /// Wrap a root node. The root is expected to be a
  /// [`NodeValue::Document`] node.
  #[must_use]
  pub fn new(root: Node) -> Self {
    Self { root }
  }

  #[must_use]
  pub const fn root(&self) -> &Node {
    &self.root
  }
}
