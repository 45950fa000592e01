use crate::{core::geo::TileCoord, MapError, Result};

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Tile server addressed by a `{x}` / `{y}` / `{z}` URL template.
///
/// `{s}` is replaced with one of the subdomains, picked from the tile
/// position so the same tile always maps to the same host.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplateSource {
    template: String,
    subdomains: Vec<String>,
}

impl UrlTemplateSource {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in ["{x}", "{y}", "{z}"] {
            if !template.contains(placeholder) {
                return Err(MapError::Config(format!(
                    "tile url template {} lacks {}",
                    template, placeholder
                ))
                .into());
            }
        }
        Ok(Self {
            template,
            subdomains: Vec::new(),
        })
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        let mut url = self
            .template
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
            .replace("{z}", &coord.z.to_string());

        if !self.subdomains.is_empty() {
            let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
            url = url.replace("{s}", &self.subdomains[idx]);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::TILE_URL_TEMPLATE;

    #[test]
    fn test_google_template() {
        let source = UrlTemplateSource::new(TILE_URL_TEMPLATE).unwrap();
        let url = source.url(TileCoord::new(152, 99, 8));
        assert!(url.starts_with("https://mt0.google.com/vt/lyrs=m&hl=en&x=152&y=99&z=8&apistyle="));
        assert!(!url.contains('{'));
    }

    #[test]
    fn test_subdomains() {
        let source = UrlTemplateSource::new("https://{s}.tile.example/{z}/{x}/{y}.png")
            .unwrap()
            .with_subdomains(["a", "b", "c"]);
        assert_eq!(source.url(TileCoord::new(1, 1, 2)), "https://c.tile.example/2/1/1.png");
        assert_eq!(source.url(TileCoord::new(0, 0, 0)), "https://a.tile.example/0/0/0.png");
    }

    #[test]
    fn test_template_must_address_tiles() {
        assert!(UrlTemplateSource::new("https://tile.example/{z}/{x}.png").is_err());
    }
}
