//! The table of registered image sizes.
//!
//! Three sources feed the registry, in this order:
//!
//! 1. **Additional sizes** declared in config (themes and plugins register
//!    these in the CMS).
//! 2. **Stock sizes**: `thumbnail`, `medium`, `medium_large`, `large`. A stock
//!    size is only registered when both of its axes are set.
//! 3. **Touch icons**: square cropped sizes used for favicons and home-screen
//!    icons, keyed `image_{n}x{n}`. These exist only as virtual sizes.
//!
//! Registering a name twice replaces the earlier spec in place, so the first
//! registration decides the position and the last one the value.
//!
//! Only the stock sizes are ever generated as real files
//! ([`SizeRegistry::sizes_to_generate`]); everything else is served by the
//! backend.

use crate::config::{SizesConfig, StockSize};
use crate::naming::virtual_size_key;
use crate::sizing::CropSpec;
use crate::types::SizeSpec;

/// Edge lengths of the touch-icon virtual sizes.
pub const TOUCH_ICON_SIZES: [u32; 8] = [512, 270, 192, 180, 152, 120, 76, 32];

/// Ordered, name-unique collection of size specs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeRegistry {
    sizes: Vec<SizeSpec>,
}

impl SizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full registry: additional sizes, stock sizes, then touch icons when
    /// enabled.
    pub fn from_config(config: &SizesConfig) -> Self {
        let mut registry = Self::new();
        for spec in &config.additional {
            registry.register(spec.clone());
        }
        registry.extend(Self::stock_sizes(config));
        if config.touch_icons {
            registry.extend(Self::touch_icons());
        }
        registry
    }

    /// Stock sizes with both axes set.
    pub fn stock_sizes(config: &SizesConfig) -> Self {
        let stock: [(&str, &StockSize); 4] = [
            ("thumbnail", &config.thumbnail),
            ("medium", &config.medium),
            ("medium_large", &config.medium_large),
            ("large", &config.large),
        ];

        let mut registry = Self::new();
        for (name, size) in stock {
            if size.width > 0 && size.height > 0 {
                registry.register(SizeSpec::new(name, size.width, size.height, size.crop));
            }
        }
        registry
    }

    /// Square cropped touch-icon sizes.
    pub fn touch_icons() -> Self {
        let mut registry = Self::new();
        for edge in TOUCH_ICON_SIZES {
            registry.register(SizeSpec::new(
                &virtual_size_key(edge, edge),
                edge,
                edge,
                CropSpec::Enabled,
            ));
        }
        registry
    }

    /// Sizes the CMS should still render to disk.
    pub fn sizes_to_generate(config: &SizesConfig) -> Self {
        Self::stock_sizes(config)
    }

    /// Add a spec, replacing any spec with the same name in place.
    pub fn register(&mut self, spec: SizeSpec) {
        match self.sizes.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.sizes.push(spec),
        }
    }

    pub fn extend(&mut self, other: SizeRegistry) {
        for spec in other.sizes {
            self.register(spec);
        }
    }

    pub fn get(&self, name: &str) -> Option<&SizeSpec> {
        self.sizes.iter().find(|s| s.name == name)
    }

    /// First registered size with exactly these dimensions.
    pub fn find_by_dimensions(&self, width: u32, height: u32) -> Option<&SizeSpec> {
        self.sizes
            .iter()
            .find(|s| s.width == width && s.height == height)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SizeSpec> {
        self.sizes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sizes.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl<'a> IntoIterator for &'a SizeRegistry {
    type Item = &'a SizeSpec;
    type IntoIter = std::slice::Iter<'a, SizeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.sizes.iter()
    }
}

impl FromIterator<SizeSpec> for SizeRegistry {
    fn from_iter<I: IntoIterator<Item = SizeSpec>>(iter: I) -> Self {
        let mut registry = Self::new();
        for spec in iter {
            registry.register(spec);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::{HorizontalAnchor, VerticalAnchor};

    #[test]
    fn stock_sizes_skip_unbounded_axes() {
        // medium_large defaults to 768x0 and is left out
        let registry = SizeRegistry::stock_sizes(&SizesConfig::default());
        assert_eq!(registry.names(), vec!["thumbnail", "medium", "large"]);
    }

    #[test]
    fn stock_thumbnail_is_cropped() {
        let registry = SizeRegistry::stock_sizes(&SizesConfig::default());
        let thumb = registry.get("thumbnail").unwrap();
        assert_eq!((thumb.width, thumb.height), (150, 150));
        assert_eq!(thumb.crop, CropSpec::Enabled);
    }

    #[test]
    fn touch_icons_are_square_and_cropped() {
        let registry = SizeRegistry::touch_icons();
        assert_eq!(registry.len(), 8);
        let icon = registry.get("image_512x512").unwrap();
        assert_eq!((icon.width, icon.height), (512, 512));
        assert!(icon.crop.is_enabled());
        assert!(registry.get("image_32x32").is_some());
    }

    #[test]
    fn from_config_orders_additional_stock_touch() {
        let mut config = SizesConfig::default();
        config
            .additional
            .push(SizeSpec::new("hero", 1600, 0, CropSpec::Disabled));
        let registry = SizeRegistry::from_config(&config);
        let names = registry.names();
        assert_eq!(names[0], "hero");
        assert_eq!(&names[1..4], &["thumbnail", "medium", "large"]);
        assert_eq!(names.len(), 4 + TOUCH_ICON_SIZES.len());
    }

    #[test]
    fn from_config_without_touch_icons() {
        let config = SizesConfig {
            touch_icons: false,
            ..SizesConfig::default()
        };
        let registry = SizeRegistry::from_config(&config);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn stock_overrides_additional_with_same_name_in_place() {
        let mut config = SizesConfig::default();
        config
            .additional
            .push(SizeSpec::new("large", 2000, 2000, CropSpec::Enabled));
        config
            .additional
            .push(SizeSpec::new("card", 400, 300, CropSpec::Enabled));
        let registry = SizeRegistry::from_config(&config);
        assert_eq!(&registry.names()[..2], &["large", "card"]);
        assert_eq!(registry.get("large").unwrap().width, 1024);
    }

    #[test]
    fn sizes_to_generate_excludes_touch_icons() {
        let registry = SizeRegistry::sizes_to_generate(&SizesConfig::default());
        assert!(registry.get("image_512x512").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn find_by_dimensions_returns_first_match() {
        let registry: SizeRegistry = vec![
            SizeSpec::new(
                "a",
                300,
                300,
                CropSpec::Directional(HorizontalAnchor::Left, VerticalAnchor::Top),
            ),
            SizeSpec::new("b", 300, 300, CropSpec::Enabled),
        ]
        .into_iter()
        .collect();
        assert_eq!(registry.find_by_dimensions(300, 300).unwrap().name, "a");
        assert!(registry.find_by_dimensions(300, 200).is_none());
    }

    #[test]
    fn missing_name_is_none() {
        let registry = SizeRegistry::from_config(&SizesConfig::default());
        assert!(registry.get("post-thumbnail").is_none());
    }
}
