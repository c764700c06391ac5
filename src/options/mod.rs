//! The render form's state: uploaded images and creative controls.

mod choices;
mod image;

pub use choices::{
    ActiveReflection, AspectRatio, DepthOfField, InteriorLights, MoodStyle, MotionBlur, OptionSet,
    RenderStyle, SiteContext, TimeOfDay, ViewAngle, Weather, WindStrength,
};
pub use image::{ImageFormat, ImageInput};

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};

/// Message shown when a render is requested without an input image.
pub const INPUT_IMAGE_REQUIRED: &str = "Input image is required.";

/// Everything the user selected for one render.
///
/// Images live beside the controls so that resetting the controls can
/// never touch them.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// The building to render. Required for generation.
    pub input_image: Option<ImageInput>,
    /// Optional style reference.
    pub reference_image: Option<ImageInput>,
    /// Creative controls.
    pub controls: RenderControls,
}

impl RenderOptions {
    /// Creates options with no images and default controls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input image.
    pub fn with_input_image(mut self, image: ImageInput) -> Self {
        self.input_image = Some(image);
        self
    }

    /// Sets the style reference image.
    pub fn with_reference_image(mut self, image: ImageInput) -> Self {
        self.reference_image = Some(image);
        self
    }

    /// Replaces the creative controls.
    pub fn with_controls(mut self, controls: RenderControls) -> Self {
        self.controls = controls;
        self
    }

    /// Returns the input image, or a validation error if none was uploaded.
    pub fn require_input_image(&self) -> Result<&ImageInput> {
        self.input_image
            .as_ref()
            .ok_or_else(|| RenderError::Validation(INPUT_IMAGE_REQUIRED.into()))
    }

    /// Restores every control to its default. Images are kept.
    pub fn reset_controls(&mut self) {
        self.controls = RenderControls::default();
    }
}

/// Creative controls: every scalar, text and toggle field of the form.
///
/// Serialized with the form's camelCase field names; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderControls {
    /// Camera placement.
    pub view_angle: ViewAngle,
    /// Output frame proportions.
    pub aspect_ratio: AspectRatio,
    /// Depth-of-field strength.
    pub depth_of_field: DepthOfField,
    /// Motion blur strength.
    pub motion_blur: MotionBlur,
    /// Lighting period.
    pub time_of_day: TimeOfDay,
    /// Weather conditions.
    pub weather: Weather,
    /// Wind strength.
    pub wind_strength: WindStrength,
    /// Interior lighting.
    pub interior_lights: InteriorLights,
    /// Reflection strength.
    pub active_reflection: ActiveReflection,
    /// Presentation style.
    pub render_style: RenderStyle,
    /// Surroundings placed around the building.
    pub site_context: SiteContext,
    /// Free text appended verbatim after the site context description.
    pub additional_site_prompt: String,
    /// Emotional tone.
    pub mood_style: MoodStyle,
    /// Include furniture.
    pub add_furniture: bool,
    /// Include cars and bikes.
    pub add_vehicles: bool,
    /// Include people.
    pub add_people: bool,
    /// Include trees and vegetation.
    pub add_trees: bool,
    /// Include street furniture.
    pub add_street_furniture: bool,
    /// Include foreground elements.
    pub add_foreground_elements: bool,
}

impl Default for RenderControls {
    fn default() -> Self {
        Self {
            view_angle: ViewAngle::default(),
            aspect_ratio: AspectRatio::default(),
            depth_of_field: DepthOfField::default(),
            motion_blur: MotionBlur::default(),
            time_of_day: TimeOfDay::default(),
            weather: Weather::default(),
            wind_strength: WindStrength::default(),
            interior_lights: InteriorLights::default(),
            active_reflection: ActiveReflection::default(),
            render_style: RenderStyle::default(),
            site_context: SiteContext::default(),
            additional_site_prompt: String::new(),
            mood_style: MoodStyle::default(),
            add_furniture: false,
            add_vehicles: false,
            add_people: false,
            add_trees: true,
            add_street_furniture: false,
            add_foreground_elements: false,
        }
    }
}

impl RenderControls {
    /// The object toggles paired with their prompt labels, in prompt order.
    pub fn object_toggles(&self) -> [(bool, &'static str); 6] {
        [
            (self.add_furniture, "Furniture"),
            (self.add_vehicles, "Vehicles (Cars, Bikes)"),
            (self.add_people, "People"),
            (self.add_trees, "Trees & Vegetation"),
            (self.add_street_furniture, "Street Furniture"),
            (self.add_foreground_elements, "Foreground Elements"),
        ]
    }

    /// Sets a field by its form name (e.g. `viewAngle`, `addTrees`).
    ///
    /// Choice values must match an option label exactly; toggles accept
    /// `true`/`false`, `on`/`off`, `yes`/`no` and `1`/`0`.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "viewAngle" => self.view_angle = value.parse()?,
            "aspectRatio" => self.aspect_ratio = value.parse()?,
            "depthOfField" => self.depth_of_field = value.parse()?,
            "motionBlur" => self.motion_blur = value.parse()?,
            "timeOfDay" => self.time_of_day = value.parse()?,
            "weather" => self.weather = value.parse()?,
            "windStrength" => self.wind_strength = value.parse()?,
            "interiorLights" => self.interior_lights = value.parse()?,
            "activeReflection" => self.active_reflection = value.parse()?,
            "renderStyle" => self.render_style = value.parse()?,
            "siteContext" => self.site_context = value.parse()?,
            "additionalSitePrompt" => self.additional_site_prompt = value.to_string(),
            "moodStyle" => self.mood_style = value.parse()?,
            "addFurniture" => self.add_furniture = parse_toggle(field, value)?,
            "addVehicles" => self.add_vehicles = parse_toggle(field, value)?,
            "addPeople" => self.add_people = parse_toggle(field, value)?,
            "addTrees" => self.add_trees = parse_toggle(field, value)?,
            "addStreetFurniture" => self.add_street_furniture = parse_toggle(field, value)?,
            "addForegroundElements" => {
                self.add_foreground_elements = parse_toggle(field, value)?
            }
            _ => {
                return Err(RenderError::Validation(format!(
                    "unknown option field: {field:?}"
                )))
            }
        }
        Ok(())
    }

    /// Reads a field by its form name, formatted the way [`set`](Self::set) accepts it.
    pub fn get(&self, field: &str) -> Option<String> {
        let value = match field {
            "viewAngle" => self.view_angle.to_string(),
            "aspectRatio" => self.aspect_ratio.to_string(),
            "depthOfField" => self.depth_of_field.to_string(),
            "motionBlur" => self.motion_blur.to_string(),
            "timeOfDay" => self.time_of_day.to_string(),
            "weather" => self.weather.to_string(),
            "windStrength" => self.wind_strength.to_string(),
            "interiorLights" => self.interior_lights.to_string(),
            "activeReflection" => self.active_reflection.to_string(),
            "renderStyle" => self.render_style.to_string(),
            "siteContext" => self.site_context.to_string(),
            "additionalSitePrompt" => self.additional_site_prompt.clone(),
            "moodStyle" => self.mood_style.to_string(),
            "addFurniture" => self.add_furniture.to_string(),
            "addVehicles" => self.add_vehicles.to_string(),
            "addPeople" => self.add_people.to_string(),
            "addTrees" => self.add_trees.to_string(),
            "addStreetFurniture" => self.add_street_furniture.to_string(),
            "addForegroundElements" => self.add_foreground_elements.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Describes every field for front ends, in form order.
    pub fn catalog() -> Vec<FieldSpec> {
        let defaults = Self::default();
        let mut fields = vec![
            choice::<ViewAngle>("viewAngle"),
            choice::<AspectRatio>("aspectRatio"),
            choice::<DepthOfField>("depthOfField"),
            choice::<MotionBlur>("motionBlur"),
            choice::<TimeOfDay>("timeOfDay"),
            choice::<Weather>("weather"),
            choice::<WindStrength>("windStrength"),
            choice::<InteriorLights>("interiorLights"),
            choice::<ActiveReflection>("activeReflection"),
            choice::<RenderStyle>("renderStyle"),
            choice::<SiteContext>("siteContext"),
            FieldSpec::new("additionalSitePrompt", "Additional Prompt (optional)", FieldKind::Text),
            choice::<MoodStyle>("moodStyle"),
            FieldSpec::new("addFurniture", "Furniture", FieldKind::Toggle),
            FieldSpec::new("addVehicles", "Vehicles", FieldKind::Toggle),
            FieldSpec::new("addPeople", "People", FieldKind::Toggle),
            FieldSpec::new("addTrees", "Trees & Veg.", FieldKind::Toggle),
            FieldSpec::new("addStreetFurniture", "Street Furniture", FieldKind::Toggle),
            FieldSpec::new("addForegroundElements", "Foreground", FieldKind::Toggle),
        ];
        for field in &mut fields {
            field.default = defaults.get(field.key).unwrap_or_default();
        }
        fields
    }
}

fn parse_toggle(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(RenderError::Validation(format!(
            "invalid value for {field}: {value:?} (expected true or false)"
        ))),
    }
}

fn choice<T: OptionSet>(key: &'static str) -> FieldSpec {
    FieldSpec::new(key, T::LABEL, FieldKind::Choice { options: T::labels() })
}

/// One field of the render form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Form name accepted by [`RenderControls::set`].
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// What kind of value the field holds.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Default value, formatted for [`RenderControls::set`].
    pub default: String,
}

impl FieldSpec {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            default: String::new(),
        }
    }
}

/// Value kind of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    /// One of a closed set of labels.
    Choice {
        /// Allowed labels, in form order.
        options: Vec<&'static str>,
    },
    /// Free text.
    Text,
    /// Boolean checkbox.
    Toggle,
}
