use serde::Serialize;
use std::error::Error;

use crate::catalog::Catalog;
use crate::icons::IconResolver;
use crate::plan::ViewerRenderConfig;
use crate::visibility::{self, ResolvedTheme};

#[derive(Serialize)]
struct ViewerTheme {
    name: String,
    icon: String,
    children: Vec<LayerRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerRecord {
    name: String,
    is_legend_expanded: bool,
    legend: bool,
    public: bool,
    is_checked: bool,
    #[serde(rename = "type")]
    layer_type: String,
    id: u32,
    image_type: Option<String>,
}

/// Renders the desktop viewer document: an array of visible themes
/// whose children are per-layer records in declaration order. A pinned
/// theme name restricts the array to that theme, bypassing the
/// membership filter.
pub fn render(
    catalog: &Catalog,
    config: &ViewerRenderConfig,
    icons: &dyn IconResolver,
) -> Result<String, Box<dyn Error>> {
    let resolved = match &config.theme {
        Some(name) => visibility::resolve_theme(catalog, name, &config.interface)?
            .into_iter()
            .collect(),
        None => visibility::resolve_themes(catalog, &config.interface, None)?,
    };

    let themes: Vec<ViewerTheme> = resolved.iter().map(|r| viewer_theme(r, icons)).collect();
    Ok(serde_json::to_string_pretty(&themes)?)
}

fn viewer_theme(resolved: &ResolvedTheme, icons: &dyn IconResolver) -> ViewerTheme {
    ViewerTheme {
        name: resolved.theme.name.clone(),
        icon: icons.icon_url(&resolved.theme.name),
        children: resolved
            .layers
            .iter()
            .map(|l| LayerRecord {
                name: l.name.clone(),
                is_legend_expanded: false,
                legend: l.legend,
                public: l.public,
                is_checked: true,
                layer_type: l.layer_type.clone(),
                id: l.id,
                image_type: l.image_type.clone(),
            })
            .collect(),
    }
}
