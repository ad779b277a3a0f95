//! Per-component builders. Each turns a finished parameter set into a
//! [`RenderSpec`]; none of them writes text.

use serde_json::Value;

use crate::materializer::render_spec::{PropValue, RenderNode, RenderSpec, MUI, RECHARTS};
use crate::materializer::renderer::display_value;
use crate::optimizer::catalogue::ComponentType;
use crate::optimizer::quality::leading_number;
use crate::optimizer::state::ParameterSet;
use crate::perception::types::ElementDescriptor;

/// Dispatch on the component type. Unknown types already arrive as
/// [`ComponentType::Generic`].
pub fn build(
    component: ComponentType,
    name: &str,
    element_id: &str,
    params: &ParameterSet,
) -> RenderSpec {
    let spec = match component {
        ComponentType::Chart => chart(name, params),
        ComponentType::Card => RenderSpec::new(name, card(params)),
        ComponentType::Table => table(name, params),
        ComponentType::Button => RenderSpec::new(name, button(params)),
        ComponentType::Header => RenderSpec::new(name, header(params)),
        ComponentType::Navigation => RenderSpec::new(name, navigation(params)),
        ComponentType::Sidebar => RenderSpec::new(name, sidebar(params)),
        ComponentType::Form => RenderSpec::new(name, form(params)),
        ComponentType::Input => RenderSpec::new(name, input(params)),
        ComponentType::Text => RenderSpec::new(name, text(params)),
        ComponentType::Image => RenderSpec::new(name, image(params)),
        ComponentType::Container => RenderSpec::new(name, container(params)),
        ComponentType::Generic => RenderSpec::new(name, generic(params)),
    };
    tag_root(spec, element_id)
}

/// Generic component carrying only the descriptor's position and defaults.
pub fn build_fallback(descriptor: &ElementDescriptor) -> RenderSpec {
    let defaults = ParameterSet::default();
    let size = |v: Option<f64>, fallback: f64| v.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(fallback);
    let params = ParameterSet {
        width: size(descriptor.position.map(|p| p.width), defaults.width),
        height: size(descriptor.position.map(|p| p.height), defaults.height),
        ..defaults
    };
    let mut spec = RenderSpec::new(descriptor.component_name(), generic(&params));
    spec.root = spec.root.prop("data-fallback", true);
    tag_root(spec, &descriptor.id)
}

fn tag_root(mut spec: RenderSpec, element_id: &str) -> RenderSpec {
    if !element_id.is_empty() {
        spec.root.props.insert(0, ("data-element-id".into(), element_id.into()));
    }
    spec
}

// ── Shared styling ─────────────────────────────────────────────────────────

/// Box geometry plus every visual parameter, as `sx` entries.
fn base_style(p: &ParameterSet) -> Vec<(String, PropValue)> {
    let mut style = box_style(p);
    style.push(("backgroundColor".into(), p.background_color.as_str().into()));
    style.extend(text_style(p, &p.text_color));
    style
}

fn box_style(p: &ParameterSet) -> Vec<(String, PropValue)> {
    vec![
        ("width".into(), p.width.into()),
        ("height".into(), p.height.into()),
        ("border".into(), p.border.as_str().into()),
        ("borderRadius".into(), p.border_radius.as_str().into()),
        ("padding".into(), p.padding.as_str().into()),
        ("margin".into(), p.margin.as_str().into()),
    ]
}

fn text_style(p: &ParameterSet, color: &str) -> Vec<(String, PropValue)> {
    vec![
        ("color".into(), color.into()),
        ("fontSize".into(), p.font_size.as_str().into()),
        ("fontWeight".into(), font_weight(&p.font_weight)),
    ]
}

fn font_weight(w: &str) -> PropValue {
    match leading_number(w) {
        Some(n) if n.to_string() == w.trim() => PropValue::Num(n),
        _ => PropValue::Str(w.to_string()),
    }
}

/// First non-empty of the given strings.
fn first_of<'a>(candidates: &[&'a String]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|s| !s.trim().is_empty())
        .map(String::as_str)
}

fn typography(variant: &str, content: &str) -> RenderNode {
    RenderNode::mui("Typography").prop("variant", variant).text(content)
}

/// Labels from a list of strings or of objects with `label`/`title`/`name`.
fn item_labels(v: &Value) -> Vec<String> {
    let Some(items) = v.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => ["label", "title", "name", "text"]
                .iter()
                .find_map(|k| map.get(*k))
                .map(display_value),
            Value::Null => None,
            other => Some(display_value(other)),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn config_str<'a>(p: &'a ParameterSet, key: &str) -> Option<&'a str> {
    p.config.get(key).and_then(Value::as_str)
}

// ── Builders ────────────────────────────────────────────────────────────────

fn chart(name: &str, p: &ParameterSet) -> RenderSpec {
    let rows = p.data.as_array().cloned().unwrap_or_default();
    let first = rows.first().and_then(Value::as_object);
    let x_key = config_str(p, "xKey")
        .map(str::to_string)
        .or_else(|| first.and_then(|o| o.iter().find(|(_, v)| v.is_string()).map(|(k, _)| k.clone())))
        .unwrap_or_else(|| "name".into());
    let y_key = config_str(p, "yKey")
        .map(str::to_string)
        .or_else(|| first.and_then(|o| o.iter().find(|(_, v)| v.is_number()).map(|(k, _)| k.clone())))
        .unwrap_or_else(|| "value".into());

    let (chart_tag, series) = match config_str(p, "type") {
        Some("bar") => (
            "BarChart",
            RenderNode::imported(RECHARTS, "Bar").prop("dataKey", y_key.as_str()).prop("fill", p.color.as_str()),
        ),
        _ => (
            "LineChart",
            RenderNode::imported(RECHARTS, "Line")
                .prop("type", "monotone")
                .prop("dataKey", y_key.as_str())
                .prop("stroke", p.color.as_str()),
        ),
    };

    let plot = RenderNode::imported(RECHARTS, chart_tag)
        .prop("data", PropValue::Expr("data".into()))
        .child(RenderNode::imported(RECHARTS, "CartesianGrid").prop("strokeDasharray", "3 3"))
        .child(RenderNode::imported(RECHARTS, "XAxis").prop("dataKey", x_key.as_str()))
        .child(RenderNode::imported(RECHARTS, "YAxis"))
        .child(RenderNode::imported(RECHARTS, "Tooltip"))
        .child(series);

    let mut root = RenderNode::mui("Box").styles(base_style(p));
    if let Some(title) = first_of(&[&p.title]) {
        root = root.child(typography("subtitle1", title));
    }
    root = root.child(
        RenderNode::imported(RECHARTS, "ResponsiveContainer")
            .prop("width", "100%")
            .prop("height", "100%")
            .child(plot),
    );
    RenderSpec::new(name, root).constant("data", Value::Array(rows))
}

fn card(p: &ParameterSet) -> RenderNode {
    let mut content = RenderNode::mui("CardContent");
    if let Some(title) = first_of(&[&p.title]) {
        content = content.child(typography("h6", title));
    }
    if let Some(value) = first_of(&[&p.value]) {
        content = content.child(typography("h4", value).style("color", p.color.as_str()));
    }
    if let Some(text) = first_of(&[&p.text]) {
        content = content.child(typography("body2", text));
    }
    RenderNode::mui("Card").styles(base_style(p)).child(content)
}

fn table(name: &str, p: &ParameterSet) -> RenderSpec {
    let rows: Vec<Value> = p.data.as_array().cloned().unwrap_or_default();
    let columns: Vec<(String, String)> = match p.config.get("columns").and_then(Value::as_array) {
        Some(cols) => cols
            .iter()
            .filter_map(|c| match c {
                Value::String(s) => Some((s.clone(), s.clone())),
                Value::Object(o) => {
                    let field = o.get("field").or_else(|| o.get("key")).and_then(Value::as_str)?;
                    let header = o
                        .get("headerName")
                        .or_else(|| o.get("label"))
                        .and_then(Value::as_str)
                        .unwrap_or(field);
                    Some((field.to_string(), header.to_string()))
                }
                _ => None,
            })
            .collect(),
        None => rows
            .first()
            .and_then(Value::as_object)
            .map(|o| o.keys().map(|k| (k.clone(), k.clone())).collect())
            .unwrap_or_default(),
    };

    let head = RenderNode::mui("TableHead").child(
        RenderNode::mui("TableRow").children(
            columns
                .iter()
                .map(|(_, header)| RenderNode::mui("TableCell").style("fontWeight", 600.0).text(header.as_str())),
        ),
    );
    let body = RenderNode::mui("TableBody").children(rows.iter().enumerate().map(|(i, row)| {
        let cells: Vec<RenderNode> = match row {
            Value::Object(o) => columns
                .iter()
                .map(|(field, _)| {
                    RenderNode::mui("TableCell").text(o.get(field).map(display_value).unwrap_or_default())
                })
                .collect(),
            Value::Array(values) => values
                .iter()
                .map(|v| RenderNode::mui("TableCell").text(display_value(v)))
                .collect(),
            other => vec![RenderNode::mui("TableCell").text(display_value(other))],
        };
        RenderNode::mui("TableRow").prop("key", i as f64).children(cells)
    }));

    let mut root = RenderNode::mui("TableContainer")
        .prop("component", PropValue::Expr("Paper".into()))
        .styles(base_style(p));
    if let Some(title) = first_of(&[&p.title]) {
        root = root.child(typography("subtitle1", title).style("padding", "8px 16px"));
    }
    root = root.child(RenderNode::mui("Table").prop("size", "small").child(head).child(body));
    RenderSpec::new(name, root).import(MUI, "Paper")
}

fn button(p: &ParameterSet) -> RenderNode {
    let label = first_of(&[&p.text, &p.value, &p.title]).unwrap_or("Button");
    let variant = config_str(p, "variant").unwrap_or("contained");
    RenderNode::mui("Button")
        .prop("variant", variant)
        .styles(base_style(p))
        .text(label)
}

fn header(p: &ParameterSet) -> RenderNode {
    let mut toolbar = RenderNode::mui("Toolbar");
    if let Some(title) = first_of(&[&p.title, &p.text]) {
        toolbar = toolbar.child(
            typography("h6", title)
                .prop("component", "div")
                .styles(text_style(p, &p.text_color)),
        );
    }
    RenderNode::mui("AppBar")
        .prop("position", "static")
        .styles(box_style(p))
        .style("backgroundColor", p.background_color.as_str())
        .child(toolbar)
}

fn navigation(p: &ParameterSet) -> RenderNode {
    let labels = item_labels(&p.data);
    let mut nav = RenderNode::mui("Box")
        .prop("component", "nav")
        .styles(base_style(p))
        .style("display", "flex")
        .style("alignItems", "center")
        .style("gap", 2.0);
    if labels.is_empty() {
        if let Some(title) = first_of(&[&p.title, &p.text]) {
            nav = nav.child(typography("subtitle1", title));
        }
        return nav;
    }
    nav.children(labels.into_iter().enumerate().map(|(i, label)| {
        let item = RenderNode::mui("Button").prop("color", "inherit").text(label);
        if i == 0 {
            item.style("color", p.color.as_str())
        } else {
            item
        }
    }))
}

fn sidebar(p: &ParameterSet) -> RenderNode {
    let mut list = RenderNode::mui("List");
    if let Some(title) = first_of(&[&p.title]) {
        list = list.child(RenderNode::mui("ListSubheader").text(title));
    }
    list = list.children(
        item_labels(&p.data)
            .into_iter()
            .map(|label| RenderNode::mui("ListItem").child(RenderNode::mui("ListItemText").prop("primary", label))),
    );
    RenderNode::mui("Drawer")
        .prop("variant", "permanent")
        .styles(base_style(p))
        .child(list)
}

fn form(p: &ParameterSet) -> RenderNode {
    let fields: Vec<RenderNode> = match p.config.get("fields").and_then(Value::as_array) {
        Some(fields) => fields
            .iter()
            .filter_map(|f| match f {
                Value::String(s) => Some(text_field(s, s, "text")),
                Value::Object(o) => {
                    let name = o.get("name").and_then(Value::as_str)?;
                    let label = o.get("label").and_then(Value::as_str).unwrap_or(name);
                    let kind = o.get("type").and_then(Value::as_str).unwrap_or("text");
                    Some(text_field(name, label, kind))
                }
                _ => None,
            })
            .collect(),
        None => item_labels(&p.data)
            .iter()
            .map(|label| text_field(label, label, "text"))
            .collect(),
    };
    let submit = config_str(p, "submitLabel").unwrap_or("Submit");

    let mut root = RenderNode::mui("Box")
        .prop("component", "form")
        .styles(base_style(p))
        .style("display", "flex")
        .style("flexDirection", "column");
    if let Some(title) = first_of(&[&p.title]) {
        root = root.child(typography("h6", title));
    }
    root.children(fields).child(
        RenderNode::mui("Button")
            .prop("type", "submit")
            .prop("variant", "contained")
            .style("backgroundColor", p.color.as_str())
            .text(submit),
    )
}

fn text_field(name: &str, label: &str, kind: &str) -> RenderNode {
    RenderNode::mui("TextField")
        .prop("name", name)
        .prop("label", label)
        .prop("type", kind)
        .prop("margin", "normal")
        .prop("fullWidth", true)
}

fn input(p: &ParameterSet) -> RenderNode {
    let mut field = RenderNode::mui("TextField");
    if let Some(label) = first_of(&[&p.title]) {
        field = field.prop("label", label);
    }
    if let Some(placeholder) = first_of(&[&p.text]) {
        field = field.prop("placeholder", placeholder);
    }
    if let Some(value) = first_of(&[&p.value]) {
        field = field.prop("defaultValue", value);
    }
    field
        .prop("variant", "outlined")
        .styles(box_style(p))
        .style("backgroundColor", p.background_color.as_str())
        .style("fontSize", p.font_size.as_str())
}

fn text(p: &ParameterSet) -> RenderNode {
    let content = first_of(&[&p.text, &p.value, &p.title]).unwrap_or("");
    RenderNode::mui("Typography")
        .styles(box_style(p))
        .styles(text_style(p, &p.color))
        .text(content)
}

fn image(p: &ParameterSet) -> RenderNode {
    let alt = first_of(&[&p.title, &p.text]).unwrap_or("image");
    let mut img = RenderNode::mui("Box").prop("component", "img");
    if let Some(src) = first_of(&[&p.value]) {
        img = img.prop("src", src);
    }
    img.prop("alt", alt)
        .styles(box_style(p))
        .style("objectFit", "cover")
}

fn container(p: &ParameterSet) -> RenderNode {
    let mut root = RenderNode::mui("Box").styles(base_style(p));
    if let Some(title) = first_of(&[&p.title]) {
        root = root.child(typography("h6", title));
    }
    if let Some(text) = first_of(&[&p.text, &p.value]) {
        root = root.child(typography("body1", text));
    }
    root
}

fn generic(p: &ParameterSet) -> RenderNode {
    let root = RenderNode::mui("Box").styles(base_style(p));
    match first_of(&[&p.text, &p.title, &p.value]) {
        Some(content) => root.text(content),
        None => root,
    }
}
