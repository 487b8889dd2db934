use handlebars::Handlebars;
use serde_json::json;
use tracing::warn;

pub const DEFAULT_ICON_TEMPLATE: &str = "/static/images/themes/{{theme}}.png";

/// Resolves the icon URL shown next to a theme entry. The portal
/// serving static assets owns the actual URL scheme, so renderers only
/// see this seam.
pub trait IconResolver {
    fn icon_url(&self, theme_name: &str) -> String;
}

/// Handlebars-backed resolver; the template sees the theme name as
/// `{{theme}}`.
pub struct IconTemplate {
    handlebars: Handlebars<'static>,
}

impl IconTemplate {
    pub fn new(template: &str) -> Result<Self, handlebars::TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("icon", template)?;
        Ok(Self { handlebars })
    }
}

impl Default for IconTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_TEMPLATE).expect("default icon template is valid")
    }
}

impl IconResolver for IconTemplate {
    fn icon_url(&self, theme_name: &str) -> String {
        match self.handlebars.render("icon", &json!({ "theme": theme_name })) {
            Ok(url) => url,
            Err(e) => {
                warn!("Failed to render icon template: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_renders_theme_name() {
        let icons = IconTemplate::new("https://cdn.example.com/{{theme}}.svg").unwrap();
        assert_eq!(
            icons.icon_url("transport"),
            "https://cdn.example.com/transport.svg"
        );
    }

    #[test]
    fn test_default_template() {
        let icons = IconTemplate::default();
        assert_eq!(icons.icon_url("city"), "/static/images/themes/city.png");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        assert!(IconTemplate::new("{{#if}}").is_err());
    }
}
