//! Prints a [`RenderSpec`] as a React function-component module.
//!
//! Literal values are formatted here; layout of the module (imports, constants,
//! the component wrapper and the nested element tree) lives in one minijinja
//! template.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ForgeError, ForgeResult};
use crate::materializer::render_spec::{Child, PropValue, RenderNode, RenderSpec};

const INDENT: &str = "  ";

const MODULE_TEMPLATE: &str = "component.tsx";

const MODULE_SOURCE: &str = r#"import React from 'react';
{% for group in imports -%}
import { {{ group.symbols|join(", ") }} } from '{{ group.module }}';
{% endfor %}
{% for c in constants -%}
const {{ c.name }} = {{ c.json }};

{% endfor -%}
export const {{ name }}: React.FC = () => (
{%- for node in [root] recursive %}
{{ node.open }}
{%- if node.children %}{{ loop(node.children) }}{% endif %}
{%- if node.close %}
{{ node.close }}
{%- endif %}
{%- endfor %}
);

export default {{ name }};
"#;

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_template(MODULE_TEMPLATE, MODULE_SOURCE)
            .expect("static template");
        env
    })
}

#[derive(Debug, Serialize)]
struct ModuleView<'a> {
    name: &'a str,
    imports: Vec<ImportGroup>,
    constants: Vec<ConstantView>,
    root: NodeView,
}

#[derive(Debug, Serialize)]
struct ImportGroup {
    module: String,
    symbols: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ConstantView {
    name: String,
    json: String,
}

/// One element or text child, already indented and formatted.
#[derive(Debug, Serialize)]
struct NodeView {
    open: String,
    close: Option<String>,
    children: Vec<NodeView>,
}

pub fn render(spec: &RenderSpec) -> ForgeResult<String> {
    if !is_identifier(&spec.name) {
        return Err(ForgeError::Materialize(format!(
            "'{}' is not a valid component identifier",
            spec.name
        )));
    }

    let constants = spec
        .constants
        .iter()
        .map(|(name, value)| {
            Ok(ConstantView {
                name: name.clone(),
                json: serde_json::to_string_pretty(value)?,
            })
        })
        .collect::<ForgeResult<Vec<_>>>()?;

    let view = ModuleView {
        name: &spec.name,
        imports: import_groups(spec),
        constants,
        root: node_view(&spec.root, 1)?,
    };
    Ok(environment().get_template(MODULE_TEMPLATE)?.render(&view)?)
}

/// Imports grouped by module: packages first, then local modules, each sorted.
fn import_groups(spec: &RenderSpec) -> Vec<ImportGroup> {
    let mut used = Vec::new();
    spec.root.imports(&mut used);
    used.extend(spec.extra_imports.iter().cloned());
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (module, symbol) in used {
        grouped.entry(module).or_default().insert(symbol);
    }
    let (local, packages): (Vec<_>, Vec<_>) =
        grouped.into_iter().partition(|(module, _)| module.starts_with('.'));
    packages
        .into_iter()
        .chain(local)
        .map(|(module, symbols)| ImportGroup {
            module,
            symbols: symbols.into_iter().collect(),
        })
        .collect()
}

fn node_view(node: &RenderNode, depth: usize) -> ForgeResult<NodeView> {
    let pad = INDENT.repeat(depth);
    let mut head = node.tag.clone();
    for (key, value) in &node.props {
        match value {
            PropValue::Bool(true) => head.push_str(&format!(" {key}")),
            other => head.push_str(&format!(" {key}={}", prop_literal(other)?)),
        }
    }
    if !node.style.is_empty() {
        let entries = node
            .style
            .iter()
            .map(|(k, v)| Ok(format!("{}: {}", style_key(k)?, value_literal(v)?)))
            .collect::<ForgeResult<Vec<_>>>()?;
        head.push_str(&format!(" sx={{{{ {} }}}}", entries.join(", ")));
    }

    if node.children.is_empty() {
        return Ok(NodeView {
            open: format!("{pad}<{head} />"),
            close: None,
            children: Vec::new(),
        });
    }

    let inner = INDENT.repeat(depth + 1);
    let children = node
        .children
        .iter()
        .map(|child| match child {
            Child::Node(n) => node_view(n, depth + 1),
            Child::Text(t) => Ok(NodeView {
                open: format!("{inner}{{{}}}", serde_json::to_string(t)?),
                close: None,
                children: Vec::new(),
            }),
        })
        .collect::<ForgeResult<Vec<_>>>()?;
    Ok(NodeView {
        open: format!("{pad}<{head}>"),
        close: Some(format!("{pad}</{}>", node.tag)),
        children,
    })
}

/// Attribute form: plain strings stay quoted, everything else goes in braces.
fn prop_literal(value: &PropValue) -> ForgeResult<String> {
    Ok(match value {
        PropValue::Str(s) if !s.contains(|c: char| matches!(c, '"' | '\\' | '{' | '}' | '\n')) => {
            format!("\"{s}\"")
        }
        other => format!("{{{}}}", value_literal(other)?),
    })
}

fn value_literal(value: &PropValue) -> ForgeResult<String> {
    Ok(match value {
        PropValue::Str(s) => serde_json::to_string(s)?,
        PropValue::Num(n) => number(*n),
        PropValue::Bool(b) => b.to_string(),
        PropValue::Json(v) => serde_json::to_string(v)?,
        PropValue::Expr(e) => e.clone(),
    })
}

fn style_key(key: &str) -> ForgeResult<String> {
    if is_identifier(key) {
        Ok(key.to_string())
    } else {
        Ok(serde_json::to_string(key)?)
    }
}

fn number(n: f64) -> String {
    if !n.is_finite() {
        return "0".into();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Text for a data cell or list item.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materializer::render_spec::{MUI, RECHARTS};

    #[test]
    fn renders_imports_props_style_and_text() {
        let root = RenderNode::mui("Button")
            .prop("variant", "contained")
            .prop("disabled", false)
            .style("width", 120.0)
            .style("backgroundColor", "#1976d2")
            .text("Save \"now\"");
        let src = render(&RenderSpec::new("ButtonE1", root)).unwrap();

        assert!(src.contains("import { Button } from '@mui/material';"));
        assert!(src.contains("<Button variant=\"contained\" disabled={false} sx={{ width: 120, backgroundColor: \"#1976d2\" }}>"));
        assert!(src.contains(r#"{"Save \"now\""}"#));
        assert!(src.contains("export const ButtonE1: React.FC = () => ("));
        assert!(src.contains("export default ButtonE1;"));
    }

    #[test]
    fn imports_are_grouped_and_sorted() {
        let root = RenderNode::mui("Box")
            .child(RenderNode::imported(RECHARTS, "LineChart"))
            .child(RenderNode::mui("Typography"))
            .child(RenderNode::imported("./CardA", "CardA"))
            .child(RenderNode::mui("Box"));
        let src = render(&RenderSpec::new("Root", root)).unwrap();
        let mui = src.find(&format!("import {{ Box, Typography }} from '{MUI}';")).unwrap();
        let charts = src.find("import { LineChart } from 'recharts';").unwrap();
        let local = src.find("import { CardA } from './CardA';").unwrap();
        assert!(mui < charts && charts < local);
    }

    #[test]
    fn constants_and_empty_nodes() {
        let spec = RenderSpec::new("Img", RenderNode::mui("Box").prop("component", "img"))
            .constant("data", serde_json::json!([1, 2]));
        let src = render(&spec).unwrap();
        assert!(src.contains("const data = [\n  1,\n  2\n];"));
        assert!(src.contains("<Box component=\"img\" />"));
    }

    #[test]
    fn module_layout_is_stable() {
        let root = RenderNode::mui("Box")
            .child(RenderNode::mui("Typography").prop("variant", "h6").text("Orders"))
            .child(RenderNode::mui("Divider"));
        let src = render(&RenderSpec::new("CardC1", root)).unwrap();
        let expected = "\
import React from 'react';
import { Box, Divider, Typography } from '@mui/material';

export const CardC1: React.FC = () => (
  <Box>
    <Typography variant=\"h6\">
      {\"Orders\"}
    </Typography>
    <Divider />
  </Box>
);

export default CardC1;
";
        assert_eq!(src, expected);
    }

    #[test]
    fn invalid_component_name_fails() {
        let err = render(&RenderSpec::new("9lives", RenderNode::mui("Box"))).unwrap_err();
        assert!(matches!(err, ForgeError::Materialize(_)));
    }

    #[test]
    fn numbers_print_without_trailing_zero() {
        assert_eq!(number(120.0), "120");
        assert_eq!(number(1.5), "1.5");
        assert_eq!(number(f64::NAN), "0");
    }
}
