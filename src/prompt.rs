//! Compiles render options into the instruction payload sent to the model.
//!
//! Compilation is pure: the same images and controls always produce the
//! same parts and byte-identical text.

use crate::options::{ImageInput, RenderControls, SiteContext};

/// Image-role instruction used when a style reference is attached.
pub const REFERENCE_IMAGE_INSTRUCTION: &str = "- The second image is a style reference. Adapt its style, lighting, and materials to the base structure.";

/// Image-role instruction used when only the input image is attached.
pub const INPUT_ONLY_INSTRUCTION: &str = "- Render the base structure with realistic textures and materials based on what is visible in the input image (e.g., concrete, glass, wood, metal).";

/// Camera directive substituted for [`ViewAngle::DefaultAngle`](crate::options::ViewAngle::DefaultAngle).
pub const KEEP_INPUT_VIEW: &str = "Maintain same view as input";

/// Substituted when no object toggle is set.
pub const NO_OBJECTS: &str = "none";

const SITE_CONTEXT_DESCRIPTIONS: &[(SiteContext, &str)] = &[
    (
        SiteContext::EnhanceOnly,
        "Keep the existing surroundings from the input image and only enhance their realism; do not add new site context",
    ),
    (
        SiteContext::UrbanCityCenter,
        "Place the building in a dense city center with neighboring mid-rise buildings, paved plazas and active streets",
    ),
    (
        SiteContext::SuburbanNeighborhood,
        "Place the building in a quiet suburban neighborhood with detached houses, driveways and landscaped front yards",
    ),
    (
        SiteContext::CoastalWaterfront,
        "Place the building on a coastal waterfront with a sandy shoreline, calm sea and a wide open horizon",
    ),
    (
        SiteContext::MountainHillside,
        "Set the building on a mountain hillside with rocky terrain, alpine vegetation and distant peaks",
    ),
    (
        SiteContext::ForestWoodland,
        "Surround the building with a dense forest of tall trees, dappled light and a natural ground cover",
    ),
    (
        SiteContext::DesertLandscape,
        "Set the building in an arid desert landscape with sand, scattered succulents and a clear, wide sky",
    ),
    (
        SiteContext::RuralCountryside,
        "Place the building in open countryside with rolling fields, hedgerows and a winding country road",
    ),
    (
        SiteContext::LakesideRiverside,
        "Place the building beside a lake or river, with a reflective water surface and a planted embankment",
    ),
    (
        SiteContext::ParkCampus,
        "Set the building within a landscaped park or campus with lawns, footpaths and mature trees",
    ),
    (
        SiteContext::IndustrialDistrict,
        "Place the building in an industrial district with warehouses, loading yards and exposed infrastructure",
    ),
];

/// One part of the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadPart {
    /// Inline image data.
    Image(ImageInput),
    /// Instruction text.
    Text(String),
}

/// The ordered parts of one generation request.
///
/// Order is fixed: input image, reference image (if any), then the
/// instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    parts: Vec<PayloadPart>,
}

impl PromptPayload {
    /// Returns every part in request order.
    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    /// Returns the instruction text.
    pub fn text(&self) -> &str {
        self.parts
            .iter()
            .rev()
            .find_map(|part| match part {
                PayloadPart::Text(text) => Some(text.as_str()),
                PayloadPart::Image(_) => None,
            })
            .unwrap_or_default()
    }

    /// Returns the attached images in request order.
    pub fn images(&self) -> impl Iterator<Item = &ImageInput> {
        self.parts.iter().filter_map(|part| match part {
            PayloadPart::Image(image) => Some(image),
            PayloadPart::Text(_) => None,
        })
    }
}

/// Builds the payload for one render.
///
/// The input image is required by the signature; callers obtain it with
/// [`RenderOptions::require_input_image`](crate::options::RenderOptions::require_input_image).
pub fn compile(
    input: &ImageInput,
    reference: Option<&ImageInput>,
    controls: &RenderControls,
) -> PromptPayload {
    let mut parts = vec![PayloadPart::Image(input.clone())];
    if let Some(reference) = reference {
        parts.push(PayloadPart::Image(reference.clone()));
    }
    parts.push(PayloadPart::Text(instruction_text(
        reference.is_some(),
        controls,
    )));
    PromptPayload { parts }
}

/// Builds the instruction text alone.
///
/// Only the section headings are bold. Directive labels are plain text, so
/// each line reads exactly as emitted, e.g. `- Objects to include: none.`
pub fn instruction_text(has_reference: bool, controls: &RenderControls) -> String {
    let image_instruction = if has_reference {
        REFERENCE_IMAGE_INSTRUCTION
    } else {
        INPUT_ONLY_INSTRUCTION
    };

    let camera_view = if controls.view_angle.is_default_angle() {
        KEEP_INPUT_VIEW
    } else {
        controls.view_angle.as_str()
    };

    let text = format!(
        "
Generate a highly detailed, {render_style} architectural rendering based on the provided image(s) and instructions.

**Primary Goal:** Preserve the building’s original forms and proportions from the first input image. Focus on realistic textures, materials, lighting, and perspective without adding new design elements to the building itself.

**Image Instructions:**
- The first image is the base building structure.
{image_instruction}

**Creative Directives:**
- Aspect Ratio: {aspect_ratio}
- View / Camera Angle: {camera_view}
- Depth of Field: {depth_of_field}
- Motion Blur: {motion_blur}
- Time of Day: {time_of_day}
- Weather: {weather}
- Wind Strength: {wind_strength}
- Interior Lights: {interior_lights}
- Active Reflection: {active_reflection}
- Render Style: {render_style}
- Mood / Style: {mood_style}
- Site Context: {site_context}. {additional}
- Objects to include: {objects}.
",
        render_style = controls.render_style,
        aspect_ratio = controls.aspect_ratio,
        depth_of_field = controls.depth_of_field,
        motion_blur = controls.motion_blur,
        time_of_day = controls.time_of_day,
        weather = controls.weather,
        wind_strength = controls.wind_strength,
        interior_lights = controls.interior_lights,
        active_reflection = controls.active_reflection,
        mood_style = controls.mood_style,
        site_context = describe_site_context(controls.site_context),
        additional = controls.additional_site_prompt,
        objects = selected_objects(controls),
    );

    text.trim().to_string()
}

/// Joins the labels of the enabled object toggles, or [`NO_OBJECTS`].
pub fn selected_objects(controls: &RenderControls) -> String {
    let labels: Vec<&str> = controls
        .object_toggles()
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, label)| label)
        .collect();

    if labels.is_empty() {
        NO_OBJECTS.to_string()
    } else {
        labels.join(", ")
    }
}

/// Returns the descriptive sentence for a site context, or its label when
/// the table has no entry.
pub fn describe_site_context(context: SiteContext) -> &'static str {
    lookup_site_context(SITE_CONTEXT_DESCRIPTIONS, context)
}

fn lookup_site_context(table: &[(SiteContext, &'static str)], context: SiteContext) -> &'static str {
    table
        .iter()
        .find(|(key, _)| *key == context)
        .map_or(context.as_str(), |(_, description)| *description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{RenderStyle, TimeOfDay, ViewAngle};

    fn png() -> ImageInput {
        ImageInput::from_bytes(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 1])
    }

    fn jpeg() -> ImageInput {
        ImageInput::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 2])
    }

    fn no_objects() -> RenderControls {
        RenderControls {
            add_trees: false,
            ..RenderControls::default()
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let input = png();
        let reference = jpeg();
        let mut controls = RenderControls::default();
        controls.additional_site_prompt = "Add a canal in front.".into();

        let a = compile(&input, Some(&reference), &controls);
        let b = compile(&input, Some(&reference), &controls);
        assert_eq!(a.text().as_bytes(), b.text().as_bytes());
        assert_eq!(a, b);
    }

    #[test]
    fn test_parts_order_without_reference() {
        let input = png();
        let payload = compile(&input, None, &RenderControls::default());

        assert_eq!(payload.parts().len(), 2);
        assert!(matches!(&payload.parts()[0], PayloadPart::Image(img) if img.same_image(&input)));
        assert!(matches!(payload.parts()[1], PayloadPart::Text(_)));
    }

    #[test]
    fn test_parts_order_with_reference() {
        let input = png();
        let reference = jpeg();
        let payload = compile(&input, Some(&reference), &RenderControls::default());

        let images: Vec<&ImageInput> = payload.images().collect();
        assert_eq!(images.len(), 2);
        assert!(images[0].same_image(&input));
        assert!(images[1].same_image(&reference));
        assert!(matches!(payload.parts().last(), Some(PayloadPart::Text(_))));
    }

    #[test]
    fn test_no_objects_renders_none() {
        let text = instruction_text(false, &no_objects());
        assert!(text.ends_with("Objects to include: none."));
    }

    #[test]
    fn test_all_objects_in_declared_order() {
        let controls = RenderControls {
            add_furniture: true,
            add_vehicles: true,
            add_people: true,
            add_trees: true,
            add_street_furniture: true,
            add_foreground_elements: true,
            ..RenderControls::default()
        };
        let text = instruction_text(false, &controls);
        assert!(text.contains(
            "Objects to include: Furniture, Vehicles (Cars, Bikes), People, Trees & Vegetation, Street Furniture, Foreground Elements."
        ));
    }

    #[test]
    fn test_objects_subset_keeps_order() {
        let controls = RenderControls {
            add_people: true,
            add_foreground_elements: true,
            ..no_objects()
        };
        assert_eq!(selected_objects(&controls), "People, Foreground Elements");
    }

    #[test]
    fn test_default_angle_is_substituted() {
        let text = instruction_text(false, &RenderControls::default());
        assert!(text.contains("View / Camera Angle: Maintain same view as input"));
        assert!(!text.contains("Default Angle"));

        let controls = RenderControls {
            view_angle: ViewAngle::BirdsEyeView,
            ..RenderControls::default()
        };
        let text = instruction_text(false, &controls);
        assert!(text.contains("View / Camera Angle: Bird's Eye View"));
        assert!(!text.contains(KEEP_INPUT_VIEW));
    }

    #[test]
    fn test_image_instruction_branches_are_exclusive() {
        let with_reference = instruction_text(true, &RenderControls::default());
        assert!(with_reference.contains(REFERENCE_IMAGE_INSTRUCTION));
        assert!(!with_reference.contains(INPUT_ONLY_INSTRUCTION));

        let without_reference = instruction_text(false, &RenderControls::default());
        assert!(without_reference.contains(INPUT_ONLY_INSTRUCTION));
        assert!(!without_reference.contains(REFERENCE_IMAGE_INSTRUCTION));
    }

    #[test]
    fn test_site_context_and_free_text() {
        let controls = RenderControls {
            site_context: SiteContext::CoastalWaterfront,
            additional_site_prompt: "Add a wooden pier.".into(),
            ..RenderControls::default()
        };
        let text = instruction_text(false, &controls);
        let expected = format!(
            "- Site Context: {}. Add a wooden pier.\n",
            describe_site_context(SiteContext::CoastalWaterfront)
        );
        assert!(text.contains(&expected));
    }

    #[test]
    fn test_every_site_context_has_a_description() {
        for context in SiteContext::ALL {
            assert_ne!(describe_site_context(*context), context.as_str());
        }
    }

    #[test]
    fn test_site_context_lookup_falls_back_to_label() {
        assert_eq!(
            lookup_site_context(&[], SiteContext::DesertLandscape),
            "Desert Landscape"
        );
    }

    #[test]
    fn test_text_layout() {
        let controls = RenderControls {
            render_style: RenderStyle::ConceptSketch,
            time_of_day: TimeOfDay::BlueHour,
            ..RenderControls::default()
        };
        let text = instruction_text(false, &controls);

        assert!(text.starts_with(
            "Generate a highly detailed, Concept Sketch architectural rendering"
        ));
        assert!(text.contains("**Primary Goal:** Preserve the building’s original forms and proportions"));
        assert!(text.contains("- Time of Day: Blue Hour\n"));
        assert!(text.contains("- Render Style: Concept Sketch\n"));
        assert!(text.contains("- Mood / Style: neutral\n"));

        let directives = text
            .lines()
            .skip_while(|l| *l != "**Creative Directives:**")
            .skip(1)
            .count();
        assert_eq!(directives, 13);
    }

    #[test]
    fn test_scenario_trees_only_default_angle() {
        let input = png();
        let controls = RenderControls {
            view_angle: ViewAngle::DefaultAngle,
            add_trees: true,
            ..no_objects()
        };
        let payload = compile(&input, None, &controls);
        let text = payload.text();

        assert!(text.contains("Maintain same view as input"));
        assert!(text.contains("Objects to include: Trees & Vegetation."));
        assert!(text.contains(INPUT_ONLY_INSTRUCTION));
    }
}
