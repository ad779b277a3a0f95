//! Element-type tables: which component a detected type becomes and which
//! parameters the search is allowed to perturb for it.
//!
//! The catalogue is plain data handed to the optimizer and the materializer, so
//! tests and deployments can swap in their own tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::CatalogueConfig;

/// A tunable field of a parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    Width,
    Height,
    Color,
    BackgroundColor,
    TextColor,
    FontSize,
    FontWeight,
    BorderRadius,
    Border,
    Padding,
    Margin,
    Title,
    Text,
    Value,
    Data,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Chart,
    Card,
    Table,
    Button,
    Header,
    Navigation,
    Sidebar,
    Form,
    Input,
    Text,
    Image,
    Container,
    Generic,
}

impl ComponentType {
    pub const ALL: [ComponentType; 13] = [
        ComponentType::Chart,
        ComponentType::Card,
        ComponentType::Table,
        ComponentType::Button,
        ComponentType::Header,
        ComponentType::Navigation,
        ComponentType::Sidebar,
        ComponentType::Form,
        ComponentType::Input,
        ComponentType::Text,
        ComponentType::Image,
        ComponentType::Container,
        ComponentType::Generic,
    ];

    /// Canonical element-type key for this component.
    pub fn key(&self) -> &'static str {
        match self {
            ComponentType::Chart => "chart",
            ComponentType::Card => "card",
            ComponentType::Table => "table",
            ComponentType::Button => "button",
            ComponentType::Header => "header",
            ComponentType::Navigation => "navigation",
            ComponentType::Sidebar => "sidebar",
            ComponentType::Form => "form",
            ComponentType::Input => "input",
            ComponentType::Text => "text",
            ComponentType::Image => "image",
            ComponentType::Container => "container",
            ComponentType::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalogue {
    component_types: HashMap<String, ComponentType>,
    key_parameters: HashMap<String, Vec<Parameter>>,
    fallback_parameters: Vec<Parameter>,
}

impl Catalogue {
    /// Build a catalogue from explicit tables. Keys are matched case-insensitively.
    pub fn new(
        component_types: HashMap<String, ComponentType>,
        key_parameters: HashMap<String, Vec<Parameter>>,
        fallback_parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            component_types: lowercase_keys(component_types),
            key_parameters: lowercase_keys(key_parameters),
            fallback_parameters,
        }
    }

    pub fn builtin() -> Self {
        use ComponentType as C;
        use Parameter::*;

        let aliases: &[(&str, ComponentType)] = &[
            ("chart", C::Chart),
            ("graph", C::Chart),
            ("card", C::Card),
            ("table", C::Table),
            ("grid", C::Table),
            ("button", C::Button),
            ("header", C::Header),
            ("appbar", C::Header),
            ("navigation", C::Navigation),
            ("nav", C::Navigation),
            ("navbar", C::Navigation),
            ("menu", C::Navigation),
            ("sidebar", C::Sidebar),
            ("drawer", C::Sidebar),
            ("form", C::Form),
            ("input", C::Input),
            ("textfield", C::Input),
            ("text", C::Text),
            ("label", C::Text),
            ("heading", C::Text),
            ("image", C::Image),
            ("img", C::Image),
            ("icon", C::Image),
            ("container", C::Container),
            ("section", C::Container),
            ("panel", C::Container),
        ];
        let component_types = aliases
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();

        let params: &[(&str, &[Parameter])] = &[
            ("chart", &[Width, Height, Color, Data, Config]),
            ("card", &[Width, Height, BackgroundColor, BorderRadius, Padding, Title]),
            ("table", &[Width, Height, FontSize, Data, Config]),
            ("button", &[Width, Height, BackgroundColor, FontSize, Text]),
            ("header", &[Width, Height, BackgroundColor, FontSize, Title]),
            ("navigation", &[Width, Height, BackgroundColor, TextColor]),
            ("sidebar", &[Width, Height, BackgroundColor, Padding]),
            ("form", &[Width, Height, Padding, Config]),
            ("input", &[Width, Height, BorderRadius, FontSize]),
            ("text", &[FontSize, Color, FontWeight, Text]),
            ("image", &[Width, Height, BorderRadius]),
            ("container", &[Width, Height, BackgroundColor, Padding]),
        ];
        let key_parameters = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect();

        Self {
            component_types,
            key_parameters,
            fallback_parameters: vec![Width, Height, Color],
        }
    }

    /// Built-in tables with the config's entries layered on top.
    pub fn with_overrides(config: &CatalogueConfig) -> Self {
        let mut catalogue = Self::builtin();
        for (k, v) in &config.component_types {
            catalogue.component_types.insert(k.to_lowercase(), *v);
        }
        for (k, v) in &config.key_parameters {
            catalogue.key_parameters.insert(k.to_lowercase(), v.clone());
        }
        if !config.component_types.is_empty() || !config.key_parameters.is_empty() {
            tracing::debug!(
                component_overrides = config.component_types.len(),
                parameter_overrides = config.key_parameters.len(),
                "catalogue overrides applied"
            );
        }
        catalogue
    }

    /// Unknown types map to [`ComponentType::Generic`].
    pub fn component_type(&self, element_type: &str) -> ComponentType {
        self.component_types
            .get(&element_type.trim().to_lowercase())
            .copied()
            .unwrap_or(ComponentType::Generic)
    }

    /// Ordered key-parameter list for an element type.
    ///
    /// Lookup order: the raw type, then the canonical key of the component it
    /// maps to, then the fallback list.
    pub fn key_parameters(&self, element_type: &str) -> &[Parameter] {
        let key = element_type.trim().to_lowercase();
        if let Some(list) = self.key_parameters.get(&key) {
            return list;
        }
        let canonical = self.component_type(&key).key();
        self.key_parameters
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback_parameters)
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

fn lowercase_keys<V>(map: HashMap<String, V>) -> HashMap<String, V> {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_is_generic_with_fallback_parameters() {
        let c = Catalogue::builtin();
        assert_eq!(c.component_type("hologram"), ComponentType::Generic);
        assert_eq!(
            c.key_parameters("hologram"),
            &[Parameter::Width, Parameter::Height, Parameter::Color]
        );
    }

    #[test]
    fn aliases_share_canonical_parameters() {
        let c = Catalogue::builtin();
        assert_eq!(c.component_type("NavBar"), ComponentType::Navigation);
        assert_eq!(c.key_parameters("navbar"), c.key_parameters("navigation"));
        assert_eq!(
            c.key_parameters("chart"),
            &[
                Parameter::Width,
                Parameter::Height,
                Parameter::Color,
                Parameter::Data,
                Parameter::Config
            ]
        );
    }

    #[test]
    fn overrides_replace_builtin_entries() {
        let mut config = CatalogueConfig::default();
        config
            .component_types
            .insert("Widget".into(), ComponentType::Card);
        config
            .key_parameters
            .insert("button".into(), vec![Parameter::Text]);

        let c = Catalogue::with_overrides(&config);
        assert_eq!(c.component_type("widget"), ComponentType::Card);
        assert_eq!(c.key_parameters("button"), &[Parameter::Text]);
        // widget has no list of its own, so it borrows the card list
        assert_eq!(c.key_parameters("widget"), c.key_parameters("card"));
    }

    #[test]
    fn injected_tables_replace_everything() {
        let c = Catalogue::new(
            HashMap::from([("Button".to_string(), ComponentType::Text)]),
            HashMap::new(),
            vec![Parameter::Padding],
        );
        assert_eq!(c.component_type("button"), ComponentType::Text);
        assert_eq!(c.key_parameters("button"), &[Parameter::Padding]);
    }
}
