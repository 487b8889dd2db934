use serde::Serialize;
use std::error::Error;

use crate::catalog::Catalog;
use crate::icons::IconResolver;
use crate::plan::MobileRenderConfig;
use crate::visibility::{self, ResolvedTheme};

#[derive(Serialize)]
struct MobileTheme {
    name: String,
    icon: String,
    layers: String,
    #[serde(rename = "allLayers")]
    all_layers: Vec<MobileLayer>,
}

#[derive(Serialize)]
struct MobileLayer {
    name: String,
}

/// Renders the mobile client configuration: one entry per visible
/// theme, layers aggregated into a comma-joined string with the
/// interface-exclusive layers listed first.
pub fn render(
    catalog: &Catalog,
    config: &MobileRenderConfig,
    icons: &dyn IconResolver,
) -> Result<String, Box<dyn Error>> {
    let resolved = visibility::resolve_themes(
        catalog,
        &config.interface,
        config.default_theme.as_deref(),
    )?;

    let themes: Vec<MobileTheme> = resolved
        .iter()
        .map(|r| mobile_theme(r, &config.interface, icons))
        .collect();

    let res = serde_json::json!({ "themes": themes });
    Ok(serde_json::to_string_pretty(&res)?)
}

fn mobile_theme(resolved: &ResolvedTheme, interface: &str, icons: &dyn IconResolver) -> MobileTheme {
    let ordered = visibility::exclusive_first(&resolved.layers, interface);
    let names: Vec<&str> = ordered.iter().map(|l| l.name.as_str()).collect();

    MobileTheme {
        name: resolved.theme.name.clone(),
        icon: icons.icon_url(&resolved.theme.name),
        layers: names.join(","),
        all_layers: names
            .iter()
            .map(|n| MobileLayer {
                name: n.to_string(),
            })
            .collect(),
    }
}
