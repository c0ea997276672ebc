//! Reference images paired with their zones, thresholds and regions

use super::config::{ActionEvent, ScanConfig, TemplateConfig, Zone};
use super::region::RegionMapper;
use crate::capture::SearchRegion;
use crate::error::{ClickerError, ClickerResult};
use crate::template_matching::TemplateMatcher;
use image::RgbImage;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub path: PathBuf,
    pub zone: Zone,
    pub threshold: f32,
    /// Absolute region, derived once from the zone at load time
    pub region: SearchRegion,
    matcher: TemplateMatcher,
}

impl Template {
    pub fn load(config: &TemplateConfig, mapper: &RegionMapper) -> ClickerResult<Self> {
        let region = mapper.resolve(&config.name, &config.zone)?;
        let image = load_reference_image(&config.name, &config.path)?;
        Ok(Self::from_image(config, region, &image))
    }

    pub fn from_image(config: &TemplateConfig, region: SearchRegion, image: &RgbImage) -> Self {
        let matcher = TemplateMatcher::new(image);
        if matcher.width() > region.width || matcher.height() > region.height {
            log::warn!(
                "⚠️ Template '{}' ({}x{}) is larger than its {}x{} search region and will never match",
                config.name,
                matcher.width(),
                matcher.height(),
                region.width,
                region.height
            );
        }
        Self {
            name: config.name.clone(),
            path: config.path.clone(),
            zone: config.zone,
            threshold: config.threshold,
            region,
            matcher,
        }
    }

    pub fn matcher(&self) -> &TemplateMatcher {
        &self.matcher
    }

    pub fn width(&self) -> u32 {
        self.matcher.width()
    }

    pub fn height(&self) -> u32 {
        self.matcher.height()
    }
}

/// A template whose hit runs a fixed action sequence instead of a click
#[derive(Debug, Clone)]
pub struct InterruptTemplate {
    pub template: Template,
    pub actions: Vec<ActionEvent>,
}

fn load_reference_image(name: &str, path: &Path) -> ClickerResult<RgbImage> {
    let image = image::open(path).map_err(|source| ClickerError::TemplateImage {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ClickerError::Configuration {
            description: format!("Reference image for '{name}' at {path:?} is empty"),
        });
    }
    Ok(image.to_rgb8())
}

/// All templates of one scan session
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: Vec<Template>,
    interrupts: Vec<InterruptTemplate>,
    mapper: RegionMapper,
}

impl TemplateStore {
    /// Validate the config, decode every reference image and fix every
    /// region for the given screen size. Any failure is fatal.
    pub fn load(config: &ScanConfig, screen_width: u32, screen_height: u32) -> ClickerResult<Self> {
        config.validate()?;
        let mapper = RegionMapper::new(screen_width, screen_height);

        let interrupts = config
            .interrupts
            .iter()
            .map(|i| {
                Ok(InterruptTemplate {
                    template: Template::load(&i.template, &mapper)?,
                    actions: i.actions.clone(),
                })
            })
            .collect::<ClickerResult<Vec<_>>>()?;
        let templates = config
            .templates
            .iter()
            .map(|t| Template::load(t, &mapper))
            .collect::<ClickerResult<Vec<_>>>()?;

        log::info!(
            "✅ Loaded {} template(s) and {} interrupt template(s) for a {}x{} screen",
            templates.len(),
            interrupts.len(),
            screen_width,
            screen_height
        );
        for t in interrupts.iter().map(|i| &i.template).chain(templates.iter()) {
            log::debug!(
                "🔍 '{}' {}x{} searches {}x{} at ({},{}) threshold={:.2}",
                t.name,
                t.width(),
                t.height(),
                t.region.width,
                t.region.height,
                t.region.x,
                t.region.y,
                t.threshold
            );
        }

        Ok(Self {
            templates,
            interrupts,
            mapper,
        })
    }

    pub fn from_parts(
        templates: Vec<Template>,
        interrupts: Vec<InterruptTemplate>,
        screen_width: u32,
        screen_height: u32,
    ) -> Self {
        Self {
            templates,
            interrupts,
            mapper: RegionMapper::new(screen_width, screen_height),
        }
    }

    /// Normal templates in declared order
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Interrupt templates in declared priority order
    pub fn interrupts(&self) -> &[InterruptTemplate] {
        &self.interrupts
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name.clone()).collect()
    }

    pub fn get_template_by_name(&self, name: &str) -> Option<&Template> {
        self.interrupts
            .iter()
            .map(|i| &i.template)
            .chain(self.templates.iter())
            .find(|t| t.name == name)
    }

    pub fn screen_dimensions(&self) -> (u32, u32) {
        self.mapper.screen_dimensions()
    }
}
