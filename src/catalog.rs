use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Catalog {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub groups: Vec<LayerGroup>,
    #[serde(default)]
    pub themes: Vec<Theme>,
}

impl Catalog {
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn get_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_group(&self, name: &str) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.iter().any(|i| i.name == name)
    }

    pub fn get_layer_map(&self) -> IndexMap<String, Layer> {
        self.layers
            .iter()
            .cloned()
            .map(|l| (l.name.clone(), l))
            .collect()
    }

    // Append another fragment, preserving declaration order across files
    pub fn merge(&mut self, other: Catalog) {
        if self.name.is_empty() {
            self.name = other.name;
        }
        self.interfaces.extend(other.interfaces);
        self.layers.extend(other.layers);
        self.groups.extend(other.groups);
        self.themes.extend(other.themes);
    }

    pub fn stats(&self) -> String {
        format!(
            "Themes: {}, Groups: {}, Layers: {}, Interfaces: {}",
            self.themes.len(),
            self.groups.len(),
            self.layers.len(),
            self.interfaces.len()
        )
    }

    pub fn build_tree(&self) -> Vec<TreeNode> {
        fn build_children(
            parent: &str,
            children: &[ChildRef],
            catalog: &Catalog,
            seen_groups: &mut HashSet<String>,
        ) -> Vec<TreeNode> {
            let mut nodes = Vec::new();
            for child in children {
                match child {
                    ChildRef::Layer(name) => match catalog.get_layer(name) {
                        Some(layer) => nodes.push(TreeNode {
                            name: layer.name.clone(),
                            kind: TreeNodeKind::Layer,
                            children: Vec::new(),
                        }),
                        None => {
                            warn!("Layer '{}' referenced by '{}' not found", name, parent);
                        }
                    },
                    ChildRef::Group(name) => {
                        if !seen_groups.insert(name.clone()) {
                            continue;
                        }
                        match catalog.get_group(name) {
                            Some(group) => nodes.push(TreeNode {
                                name: group.name.clone(),
                                kind: TreeNodeKind::Group,
                                children: build_children(
                                    &group.name,
                                    &group.children,
                                    catalog,
                                    seen_groups,
                                ),
                            }),
                            None => {
                                warn!("Group '{}' referenced by '{}' not found", name, parent);
                            }
                        }
                    }
                }
            }
            nodes
        }

        self.themes
            .iter()
            .map(|theme| TreeNode {
                name: theme.name.clone(),
                kind: TreeNodeKind::Theme,
                children: build_children(
                    &theme.name,
                    &theme.children,
                    self,
                    &mut HashSet::new(),
                ),
            })
            .collect()
    }

    pub fn build_json_tree(&self) -> serde_json::Value {
        let tree = self.build_tree();
        serde_json::json!(tree)
    }

    pub fn verify_catalog_integrity(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let mut interface_names = HashSet::new();
        for interface in &self.interfaces {
            if !interface_names.insert(interface.name.as_str()) {
                errors.push(format!("Duplicate interface name '{}'", interface.name));
            }
        }

        let mut layer_names = HashSet::new();
        let mut layer_ids = HashSet::new();
        for layer in &self.layers {
            if !layer_names.insert(layer.name.as_str()) {
                errors.push(format!("Duplicate layer name '{}'", layer.name));
            }
            if !layer_ids.insert(layer.id) {
                errors.push(format!(
                    "Layer '{}' reuses id {} already assigned to another layer",
                    layer.name, layer.id
                ));
            }
            for interface in &layer.interfaces {
                if !interface_names.contains(interface.as_str()) {
                    errors.push(format!(
                        "Layer '{}' interface '{}' not found in interfaces",
                        layer.name, interface
                    ));
                }
            }
        }

        let mut group_names = HashSet::new();
        for group in &self.groups {
            if !group_names.insert(group.name.as_str()) {
                errors.push(format!("Duplicate group name '{}'", group.name));
            }
        }

        let mut theme_names = HashSet::new();
        for theme in &self.themes {
            if !theme_names.insert(theme.name.as_str()) {
                errors.push(format!("Duplicate theme name '{}'", theme.name));
            }
            for interface in &theme.interfaces {
                if !interface_names.contains(interface.as_str()) {
                    errors.push(format!(
                        "Theme '{}' interface '{}' not found in interfaces",
                        theme.name, interface
                    ));
                }
            }
            self.verify_children(&theme.name, &theme.children, &mut errors);
        }

        for group in &self.groups {
            self.verify_children(&group.name, &group.children, &mut errors);
            if self.group_reaches_itself(group) {
                errors.push(format!(
                    "Group '{}' contains itself through nested groups",
                    group.name
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn verify_children(&self, parent: &str, children: &[ChildRef], errors: &mut Vec<String>) {
        for child in children {
            match child {
                ChildRef::Layer(name) => {
                    if self.get_layer(name).is_none() {
                        errors.push(format!(
                            "Layer '{}' referenced by '{}' not found in layers",
                            name, parent
                        ));
                    }
                }
                ChildRef::Group(name) => {
                    if self.get_group(name).is_none() {
                        errors.push(format!(
                            "Group '{}' referenced by '{}' not found in groups",
                            name, parent
                        ));
                    }
                }
            }
        }
    }

    fn group_reaches_itself(&self, start: &LayerGroup) -> bool {
        fn walk(catalog: &Catalog, group: &LayerGroup, target: &str, seen: &mut HashSet<String>) -> bool {
            for child in &group.children {
                if let ChildRef::Group(name) = child {
                    if name == target {
                        return true;
                    }
                    if seen.insert(name.clone()) {
                        if let Some(nested) = catalog.get_group(name) {
                            if walk(catalog, nested, target, seen) {
                                return true;
                            }
                        }
                    }
                }
            }
            false
        }

        walk(self, start, &start.name, &mut HashSet::new())
    }
}

/// A named client surface (mobile app, desktop viewer, ...) used to
/// tag which themes and layers each client sees.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Interface {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Layer {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type", default = "default_layer_type")]
    pub layer_type: String,
    #[serde(default = "default_true")]
    pub legend: bool,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LayerGroup {
    pub name: String,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub children: Vec<ChildRef>,
}

/// A theme with an empty interface list is private: it never shows up in
/// a listing but stays reachable when named explicitly.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Theme {
    pub name: String,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub children: Vec<ChildRef>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChildRef {
    Layer(String),
    Group(String),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TreeNode {
    pub name: String,
    pub kind: TreeNodeKind,
    pub children: Vec<TreeNode>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TreeNodeKind {
    Theme,
    Group,
    Layer,
}

fn default_layer_type() -> String {
    "internal WMS".to_string()
}

fn default_true() -> bool {
    true
}
