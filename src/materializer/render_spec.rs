//! Structured description of an emitted component, independent of how it is
//! printed. Builders produce it; the renderer is the only code that writes text.

use serde_json::Value;

pub const MUI: &str = "@mui/material";
pub const RECHARTS: &str = "recharts";

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Num(f64),
    Bool(bool),
    Json(Value),
    /// Raw expression copied verbatim between braces.
    Expr(String),
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<&String> for PropValue {
    fn from(s: &String) -> Self {
        PropValue::Str(s.clone())
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Num(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<Value> for PropValue {
    fn from(v: Value) -> Self {
        PropValue::Json(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(RenderNode),
    /// Literal text, emitted as an escaped string expression.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub tag: String,
    /// Module the tag is imported from; `None` for intrinsic elements.
    pub module: Option<String>,
    pub props: Vec<(String, PropValue)>,
    pub style: Vec<(String, PropValue)>,
    pub children: Vec<Child>,
}

impl RenderNode {
    pub fn intrinsic(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            module: None,
            props: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn imported(module: &str, tag: &str) -> Self {
        Self {
            module: Some(module.to_string()),
            ..Self::intrinsic(tag)
        }
    }

    pub fn mui(tag: &str) -> Self {
        Self::imported(MUI, tag)
    }

    pub fn prop(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.props.push((key.to_string(), value.into()));
        self
    }

    pub fn style(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.style.push((key.to_string(), value.into()));
        self
    }

    pub fn styles(mut self, entries: Vec<(String, PropValue)>) -> Self {
        self.style.extend(entries);
        self
    }

    pub fn child(mut self, node: RenderNode) -> Self {
        self.children.push(Child::Node(node));
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(nodes.into_iter().map(Child::Node));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Every `(module, tag)` pair used in this subtree.
    pub fn imports(&self, out: &mut Vec<(String, String)>) {
        if let Some(module) = &self.module {
            out.push((module.clone(), self.tag.clone()));
        }
        for child in &self.children {
            if let Child::Node(node) = child {
                node.imports(out);
            }
        }
    }
}

/// One emitted component file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSpec {
    /// Exported component identifier.
    pub name: String,
    /// Module-level `const` declarations, in order.
    pub constants: Vec<(String, Value)>,
    /// Imports not implied by the tree, e.g. `Paper` passed as a prop value.
    pub extra_imports: Vec<(String, String)>,
    pub root: RenderNode,
}

impl RenderSpec {
    pub fn new(name: impl Into<String>, root: RenderNode) -> Self {
        Self {
            name: name.into(),
            constants: Vec::new(),
            extra_imports: Vec::new(),
            root,
        }
    }

    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.constants.push((name.to_string(), value));
        self
    }

    pub fn import(mut self, module: &str, symbol: &str) -> Self {
        self.extra_imports.push((module.to_string(), symbol.to_string()));
        self
    }
}
