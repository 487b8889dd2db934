use serde::{Deserialize, Serialize};

use crate::icons::DEFAULT_ICON_TEMPLATE;

/// ## Structure
/// This module contains the data structures for the plan file.
///
/// ```text
/// Plan
///   ├── meta: Option<Meta>
///   │   └── name: Option<String>
///   ├── import: ImportConfig
///   │   └── profiles: Vec<ImportProfile>
///   │       └── filename: String
///   ├── functionalities: Functionalities
///   │   ├── mobile_default_theme: Option<String>
///   │   └── icon_template: Option<String>
///   └── export: ExportProfile
///       └── profiles: Vec<ExportProfileItem>
///           ├── filename: String
///           ├── exporter: ExportFileType
///           │   ├── MobileConfig
///           │   ├── Viewer
///           │   └── CatalogJSON
///           ├── interface: Option<String>
///           └── theme: Option<String>
/// ```

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Plan {
    pub meta: Option<Meta>,
    pub import: ImportConfig,
    #[serde(default)]
    pub functionalities: Functionalities,
    pub export: ExportProfile,
}

//
// Import configuration
//

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ImportConfig {
    pub profiles: Vec<ImportProfile>,
}

/// Each profile names a catalog fragment; fragments are merged in
/// profile order.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ImportProfile {
    pub filename: String,
}

//
// Runtime functionalities
//

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Functionalities {
    pub mobile_default_theme: Option<String>,
    pub icon_template: Option<String>,
}

impl Functionalities {
    pub fn get_icon_template(&self) -> String {
        self.icon_template
            .clone()
            .unwrap_or_else(|| DEFAULT_ICON_TEMPLATE.to_string())
    }
}

//
// Export configuration
//

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExportProfile {
    pub profiles: Vec<ExportProfileItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExportProfileItem {
    pub filename: String,
    pub exporter: ExportFileType,
    pub interface: Option<String>,
    pub theme: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ExportFileType {
    MobileConfig,
    Viewer,
    CatalogJSON,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MobileRenderConfig {
    pub interface: String,
    pub default_theme: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ViewerRenderConfig {
    pub interface: String,
    pub theme: Option<String>,
}

impl ExportProfileItem {
    pub fn get_mobile_config(&self, functionalities: &Functionalities) -> MobileRenderConfig {
        MobileRenderConfig {
            interface: self
                .interface
                .clone()
                .unwrap_or_else(|| "mobile".to_string()),
            default_theme: functionalities.mobile_default_theme.clone(),
        }
    }

    pub fn get_viewer_config(&self) -> ViewerRenderConfig {
        ViewerRenderConfig {
            interface: self.interface.clone().unwrap_or_else(|| "main".to_string()),
            theme: self.theme.clone(),
        }
    }
}
