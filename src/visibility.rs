//! Interface-based visibility resolution over a catalog snapshot.
//!
//! The resolver is a read-only computation: callers hand in an
//! already-loaded `Catalog` and get back the themes visible to one
//! client interface, each with its flattened layer list. Private
//! themes (no interfaces) are appended in a second phase when named
//! explicitly, never selected by the membership filter.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::catalog::{Catalog, ChildRef, Layer, Theme};
use crate::errors::CatalogError;

/// Per-resolution index of what one interface can see, built once per
/// call instead of chasing association lists during traversal.
pub struct InterfaceIndex<'a> {
    theme_names: Vec<&'a str>,
    layer_names: HashSet<&'a str>,
}

impl<'a> InterfaceIndex<'a> {
    pub fn build(catalog: &'a Catalog, interface: &str) -> Self {
        let theme_names = catalog
            .themes
            .iter()
            .filter(|t| t.interfaces.iter().any(|i| i == interface))
            .map(|t| t.name.as_str())
            .collect();
        let layer_names = catalog
            .layers
            .iter()
            .filter(|l| l.interfaces.iter().any(|i| i == interface))
            .map(|l| l.name.as_str())
            .collect();

        Self {
            theme_names,
            layer_names,
        }
    }

    pub fn contains_theme(&self, name: &str) -> bool {
        self.theme_names.iter().any(|n| *n == name)
    }

    pub fn contains_layer(&self, name: &str) -> bool {
        self.layer_names.contains(name)
    }
}

/// A theme selected for an interface, with its flattened layer list in
/// children declaration order.
#[derive(Debug)]
pub struct ResolvedTheme<'a> {
    pub theme: &'a Theme,
    pub layers: Vec<&'a Layer>,
}

/// Lists the themes visible to `interface` in catalog order, then
/// appends the `default_theme` override when it names a theme the
/// membership filter did not select. An unknown override name is
/// skipped, not an error.
pub fn resolve_themes<'a>(
    catalog: &'a Catalog,
    interface: &str,
    default_theme: Option<&str>,
) -> Result<Vec<ResolvedTheme<'a>>, CatalogError> {
    if !catalog.has_interface(interface) {
        return Err(CatalogError::UnknownInterface(interface.to_string()));
    }

    let index = InterfaceIndex::build(catalog, interface);

    let mut resolved = Vec::new();
    for theme in &catalog.themes {
        if index.contains_theme(&theme.name) {
            resolved.push(resolve_one(catalog, theme, &index)?);
        }
    }

    if let Some(name) = default_theme {
        if !resolved.iter().any(|r| r.theme.name == name) {
            match catalog.get_theme(name) {
                Some(theme) => {
                    debug!("Appending default theme '{}' for '{}'", name, interface);
                    resolved.push(resolve_one(catalog, theme, &index)?);
                }
                None => {
                    warn!("Default theme '{}' not found in catalog, skipping", name);
                }
            }
        }
    }

    Ok(resolved)
}

/// Resolves a single explicitly named theme, bypassing the membership
/// filter. Returns `Ok(None)` when the catalog has no such theme.
pub fn resolve_theme<'a>(
    catalog: &'a Catalog,
    name: &str,
    interface: &str,
) -> Result<Option<ResolvedTheme<'a>>, CatalogError> {
    if !catalog.has_interface(interface) {
        return Err(CatalogError::UnknownInterface(interface.to_string()));
    }

    let index = InterfaceIndex::build(catalog, interface);
    match catalog.get_theme(name) {
        Some(theme) => Ok(Some(resolve_one(catalog, theme, &index)?)),
        None => {
            warn!("Theme '{}' not found in catalog", name);
            Ok(None)
        }
    }
}

/// Stable reorder for the mobile aggregate view: layers associated with
/// no other interface come first, shared layers follow. Declaration
/// order is kept within each part.
pub fn exclusive_first<'a>(layers: &[&'a Layer], interface: &str) -> Vec<&'a Layer> {
    let mut exclusive = Vec::new();
    let mut shared = Vec::new();
    for layer in layers {
        if layer.interfaces.len() == 1 && layer.interfaces[0] == interface {
            exclusive.push(*layer);
        } else {
            shared.push(*layer);
        }
    }
    exclusive.extend(shared);
    exclusive
}

fn resolve_one<'a>(
    catalog: &'a Catalog,
    theme: &'a Theme,
    index: &InterfaceIndex,
) -> Result<ResolvedTheme<'a>, CatalogError> {
    let mut layers = Vec::new();
    let mut seen_layers = HashSet::new();
    let mut seen_groups = HashSet::new();
    flatten_children(
        catalog,
        &theme.name,
        &theme.children,
        index,
        &mut seen_layers,
        &mut seen_groups,
        &mut layers,
    )?;
    Ok(ResolvedTheme { theme, layers })
}

fn flatten_children<'a>(
    catalog: &'a Catalog,
    parent: &str,
    children: &[ChildRef],
    index: &InterfaceIndex,
    seen_layers: &mut HashSet<&'a str>,
    seen_groups: &mut HashSet<&'a str>,
    out: &mut Vec<&'a Layer>,
) -> Result<(), CatalogError> {
    for child in children {
        match child {
            ChildRef::Layer(name) => {
                let layer = catalog
                    .get_layer(name)
                    .ok_or_else(|| CatalogError::UnknownLayer {
                        parent: parent.to_string(),
                        child: name.clone(),
                    })?;
                if !index.contains_layer(&layer.name) {
                    continue;
                }
                if seen_layers.insert(layer.name.as_str()) {
                    out.push(layer);
                }
            }
            ChildRef::Group(name) => {
                let group = catalog
                    .get_group(name)
                    .ok_or_else(|| CatalogError::UnknownGroup {
                        parent: parent.to_string(),
                        child: name.clone(),
                    })?;
                // A group already on the path contributes nothing new;
                // skipping it also keeps cyclic nesting from looping.
                if seen_groups.insert(group.name.as_str()) {
                    flatten_children(
                        catalog,
                        &group.name,
                        &group.children,
                        index,
                        seen_layers,
                        seen_groups,
                        out,
                    )?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Interface, LayerGroup};

    fn layer(id: u32, name: &str, interfaces: &[&str]) -> Layer {
        Layer {
            id,
            name: name.to_string(),
            layer_type: "internal WMS".to_string(),
            legend: true,
            public: true,
            image_type: None,
            interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
        }
    }

    fn theme(name: &str, children: &[&str], interfaces: &[&str]) -> Theme {
        Theme {
            name: name.to_string(),
            children: children
                .iter()
                .map(|c| ChildRef::Layer(c.to_string()))
                .collect(),
            interfaces: interfaces.iter().map(|i| i.to_string()).collect(),
        }
    }

    fn create_test_catalog() -> Catalog {
        Catalog {
            name: "test portal".to_string(),
            interfaces: vec![
                Interface {
                    name: "main".to_string(),
                },
                Interface {
                    name: "mobile".to_string(),
                },
            ],
            layers: vec![
                layer(1, "roads", &["main", "mobile"]),
                layer(2, "poi", &["mobile"]),
                layer(3, "buildings", &["main"]),
            ],
            groups: Vec::new(),
            themes: vec![
                theme("city", &["roads", "poi", "buildings"], &["main", "mobile"]),
                theme("tourism", &["roads"], &["mobile"]),
                theme("cadastre", &["roads"], &["main"]),
                theme("survey", &["roads"], &[]),
            ],
        }
    }

    fn names<'a>(resolved: &'a [ResolvedTheme<'a>]) -> Vec<&'a str> {
        resolved.iter().map(|r| r.theme.name.as_str()).collect()
    }

    fn layer_names<'a>(resolved: &'a ResolvedTheme<'a>) -> Vec<&'a str> {
        resolved.layers.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_membership_filter_keeps_catalog_order() {
        let catalog = create_test_catalog();
        let mobile = resolve_themes(&catalog, "mobile", None).unwrap();
        assert_eq!(names(&mobile), ["city", "tourism"]);

        let main = resolve_themes(&catalog, "main", None).unwrap();
        assert_eq!(names(&main), ["city", "cadastre"]);
    }

    #[test]
    fn test_private_theme_never_listed() {
        let catalog = create_test_catalog();
        for interface in ["main", "mobile"] {
            let resolved = resolve_themes(&catalog, interface, None).unwrap();
            assert!(!names(&resolved).contains(&"survey"));
        }
    }

    #[test]
    fn test_default_theme_appended_after_visible_themes() {
        let catalog = create_test_catalog();
        let without = resolve_themes(&catalog, "mobile", None).unwrap();
        let with = resolve_themes(&catalog, "mobile", Some("survey")).unwrap();

        assert_eq!(with.len(), without.len() + 1);
        assert_eq!(names(&with), ["city", "tourism", "survey"]);
        assert_eq!(layer_names(&with[2]), ["roads"]);
    }

    #[test]
    fn test_default_theme_already_visible_is_not_duplicated() {
        let catalog = create_test_catalog();
        let resolved = resolve_themes(&catalog, "mobile", Some("city")).unwrap();
        assert_eq!(names(&resolved), ["city", "tourism"]);
    }

    #[test]
    fn test_unknown_default_theme_is_a_noop() {
        let catalog = create_test_catalog();
        let resolved = resolve_themes(&catalog, "mobile", Some("nope")).unwrap();
        assert_eq!(names(&resolved), ["city", "tourism"]);
    }

    #[test]
    fn test_layers_filtered_by_interface_in_declaration_order() {
        let catalog = create_test_catalog();
        let main = resolve_themes(&catalog, "main", None).unwrap();
        assert_eq!(layer_names(&main[0]), ["roads", "buildings"]);

        let mobile = resolve_themes(&catalog, "mobile", None).unwrap();
        assert_eq!(layer_names(&mobile[0]), ["roads", "poi"]);
    }

    #[test]
    fn test_exclusive_layers_sort_before_shared() {
        let catalog = create_test_catalog();
        let mobile = resolve_themes(&catalog, "mobile", None).unwrap();
        let ordered = exclusive_first(&mobile[0].layers, "mobile");
        let names: Vec<&str> = ordered.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["poi", "roads"]);
    }

    #[test]
    fn test_flatten_dedups_layers_reachable_twice() {
        let mut catalog = create_test_catalog();
        catalog.groups.push(LayerGroup {
            name: "basemaps".to_string(),
            children: vec![ChildRef::Layer("roads".to_string())],
        });
        catalog.themes[0]
            .children
            .push(ChildRef::Group("basemaps".to_string()));

        let mobile = resolve_themes(&catalog, "mobile", None).unwrap();
        assert_eq!(layer_names(&mobile[0]), ["roads", "poi"]);
    }

    #[test]
    fn test_nested_groups_flatten_depth_first() {
        let mut catalog = create_test_catalog();
        catalog.groups.push(LayerGroup {
            name: "overlays".to_string(),
            children: vec![
                ChildRef::Layer("buildings".to_string()),
                ChildRef::Group("basemaps".to_string()),
            ],
        });
        catalog.groups.push(LayerGroup {
            name: "basemaps".to_string(),
            children: vec![ChildRef::Layer("roads".to_string())],
        });
        catalog.themes.push(Theme {
            name: "planning".to_string(),
            children: vec![ChildRef::Group("overlays".to_string())],
            interfaces: vec!["main".to_string()],
        });

        let main = resolve_themes(&catalog, "main", None).unwrap();
        let planning = main.iter().find(|r| r.theme.name == "planning").unwrap();
        assert_eq!(layer_names(planning), ["buildings", "roads"]);
    }

    #[test]
    fn test_dangling_child_is_an_error() {
        let mut catalog = create_test_catalog();
        catalog.themes[0]
            .children
            .push(ChildRef::Layer("glaciers".to_string()));
        let err = resolve_themes(&catalog, "mobile", None).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownLayer { .. }));
    }

    #[test]
    fn test_unknown_interface_is_an_error() {
        let catalog = create_test_catalog();
        let err = resolve_themes(&catalog, "print", None).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownInterface(_)));
    }

    #[test]
    fn test_resolve_theme_bypasses_membership() {
        let catalog = create_test_catalog();
        let resolved = resolve_theme(&catalog, "survey", "mobile").unwrap().unwrap();
        assert_eq!(resolved.theme.name, "survey");
        assert_eq!(layer_names(&resolved), ["roads"]);

        assert!(resolve_theme(&catalog, "nope", "mobile").unwrap().is_none());
    }
}
