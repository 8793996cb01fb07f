//! Lua bindings for document tree nodes.
//!
//! Nodes are exposed as userdata with named methods, pandoc-filter style:
//! traversal (`children`, `descendants`, `parent`, siblings), structural
//! edits (`unlink`, `append_child`, `insert_before`, ...) and payload
//! accessors per node kind. Handles are cheap clones of the underlying
//! reference-counted node, so edits made through any handle are visible
//! through every other one.

use mdpipe_commonmark::{
  ListData, ListDelim, ListKind, Node, NodeValue,
};
use mlua::{Lua, MetaMethod, UserData, UserDataMethods, UserDataRef};

/// Userdata wrapper around a tree node handle.
pub struct LuaNode(Node);

impl LuaNode {
  #[must_use]
  pub fn new(node: Node) -> Self {
    Self(node)
  }

  fn handle(&self) -> Node {
    self.0.clone()
  }
}

impl UserData for LuaNode {
  fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("type", |_, this, ()| {
      Ok(this.0.data().value.name().to_string())
    });

    methods.add_method("literal", |_, this, ()| {
      Ok(this.0.data().value.literal().map(ToString::to_string))
    });

    methods.add_method("set_literal", |_, this, literal: String| {
      let mut data = this.0.data_mut();
      let updated = match &mut data.value {
        NodeValue::Text(s)
        | NodeValue::Code(s)
        | NodeValue::HtmlInline(s)
        | NodeValue::HtmlBlock(s) => {
          *s = literal;
          true
        },
        NodeValue::CodeBlock {
          literal: existing, ..
        } => {
          *existing = literal;
          true
        },
        _ => false,
      };
      Ok(updated)
    });

    methods.add_method("heading_level", |_, this, ()| {
      Ok(match this.0.data().value {
        NodeValue::Heading { level } => Some(level),
        _ => None,
      })
    });

    methods.add_method("set_heading_level", |_, this, level: u8| {
      let mut data = this.0.data_mut();
      if let NodeValue::Heading { level: existing } = &mut data.value {
        *existing = level;
        Ok(true)
      } else {
        Ok(false)
      }
    });

    methods.add_method("url", |_, this, ()| {
      Ok(match &this.0.data().value {
        NodeValue::Link { url, .. } | NodeValue::Image { url, .. } => {
          Some(url.clone())
        },
        _ => None,
      })
    });

    methods.add_method("set_url", |_, this, url: String| {
      let mut data = this.0.data_mut();
      match &mut data.value {
        NodeValue::Link { url: existing, .. }
        | NodeValue::Image { url: existing, .. } => {
          *existing = url;
          Ok(true)
        },
        _ => Ok(false),
      }
    });

    methods.add_method("title", |_, this, ()| {
      Ok(match &this.0.data().value {
        NodeValue::Link { title, .. } | NodeValue::Image { title, .. } => {
          Some(title.clone())
        },
        _ => None,
      })
    });

    methods.add_method("info", |_, this, ()| {
      Ok(match &this.0.data().value {
        NodeValue::CodeBlock { info, .. } => Some(info.clone()),
        _ => None,
      })
    });

    methods.add_method("parent", |_, this, ()| {
      Ok(this.0.parent().map(LuaNode))
    });

    methods.add_method("first_child", |_, this, ()| {
      Ok(this.0.first_child().map(LuaNode))
    });

    methods.add_method("last_child", |_, this, ()| {
      Ok(this.0.last_child().map(LuaNode))
    });

    methods.add_method("next_sibling", |_, this, ()| {
      Ok(this.0.next_sibling().map(LuaNode))
    });

    methods.add_method("previous_sibling", |_, this, ()| {
      Ok(this.0.previous_sibling().map(LuaNode))
    });

    methods.add_method("children", |_, this, ()| {
      Ok(this.0.children().into_iter().map(LuaNode).collect::<Vec<_>>())
    });

    methods.add_method("descendants", |_, this, ()| {
      Ok(
        this
          .0
          .descendants()
          .into_iter()
          .map(LuaNode)
          .collect::<Vec<_>>(),
      )
    });

    methods.add_method("unlink", |_, this, ()| {
      this.0.detach();
      Ok(())
    });

    methods.add_method("append_child", |_, this, child: UserDataRef<Self>| {
      this.0.append(child.handle());
      Ok(())
    });

    methods.add_method("prepend_child", |_, this, child: UserDataRef<Self>| {
      this.0.prepend(child.handle());
      Ok(())
    });

    methods.add_method(
      "insert_before",
      |_, this, sibling: UserDataRef<Self>| {
        this.0.insert_before(sibling.handle());
        Ok(())
      },
    );

    methods.add_method("insert_after", |_, this, sibling: UserDataRef<Self>| {
      this.0.insert_after(sibling.handle());
      Ok(())
    });

    methods.add_meta_method(MetaMethod::Eq, |_, this, other: UserDataRef<Self>| {
      Ok(this.0.same_node(&other.0))
    });

    methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
      Ok(format!("node<{}>", this.0.data().value.name()))
    });
  }
}

/// Install the `markdown` module into a fresh Lua state.
pub(crate) fn register(lua: &Lua) -> mlua::Result<()> {
  let module = lua.create_table()?;
  module.set(
    "node",
    lua.create_function(
      |_, (kind, literal): (String, Option<String>)| {
        new_node(&kind, literal.unwrap_or_default()).map(LuaNode).ok_or_else(
          || mlua::Error::RuntimeError(format!("unknown node type `{kind}`")),
        )
      },
    )?,
  )?;
  module.set("SKIP_RENDERING", -1)?;
  lua.globals().set("markdown", module)
}

fn new_node(kind: &str, literal: String) -> Option<Node> {
  let value = match kind {
    "document" => NodeValue::Document,
    "heading" => NodeValue::Heading { level: 1 },
    "paragraph" => NodeValue::Paragraph,
    "block_quote" => NodeValue::BlockQuote,
    "list" => {
      NodeValue::List(ListData {
        kind:      ListKind::Bullet,
        start:     1,
        delimiter: ListDelim::Period,
        tight:     true,
      })
    },
    "item" => NodeValue::Item,
    "code_block" => {
      NodeValue::CodeBlock {
        info: String::new(),
        literal,
      }
    },
    "html_block" => NodeValue::HtmlBlock(literal),
    "thematic_break" => NodeValue::ThematicBreak,
    "text" => NodeValue::Text(literal),
    "emph" => NodeValue::Emph,
    "strong" => NodeValue::Strong,
    "code" => NodeValue::Code(literal),
    "html_inline" => NodeValue::HtmlInline(literal),
    "softbreak" => NodeValue::SoftBreak,
    "linebreak" => NodeValue::LineBreak,
    "link" => {
      NodeValue::Link {
        url:   literal,
        title: String::new(),
      }
    },
    "image" => {
      NodeValue::Image {
        url:   literal,
        title: String::new(),
      }
    },
    _ => return None,
  };
  Some(Node::new(value))
}
