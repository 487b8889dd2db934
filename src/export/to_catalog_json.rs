use crate::catalog::Catalog;
use std::error::Error;

pub fn render(catalog: &Catalog) -> Result<String, Box<dyn Error>> {
    use serde_json::json;

    let res = json!({
        "name": catalog.name,
        "interfaces": catalog.interfaces,
        "themes": catalog.build_json_tree(),
        "layers": catalog.get_layer_map(),
    });
    Ok(serde_json::to_string_pretty(&res)?)
}
