//! Closed option sets offered by the render form.
//!
//! Every set is an enum whose display label doubles as the value
//! interpolated into the prompt and the value used on the wire.

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common behaviour of every closed option set.
pub trait OptionSet: Copy + Default + fmt::Display + FromStr<Err = RenderError> + 'static {
    /// Form label of the field this set belongs to.
    const LABEL: &'static str;

    /// Every option, in form order.
    fn all() -> &'static [Self];

    /// Display label of this option.
    fn label(&self) -> &'static str;

    /// Every option label, in form order.
    fn labels() -> Vec<&'static str> {
        Self::all().iter().map(|o| o.label()).collect()
    }
}

macro_rules! option_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($field_label:literal) {
            default $default:ident;
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[doc = $label]
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in form order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the option label.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RenderError;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.as_str() == s)
                    .ok_or_else(|| {
                        RenderError::Validation(format!(
                            "invalid {}: {:?}",
                            $field_label, s
                        ))
                    })
            }
        }

        impl OptionSet for $name {
            const LABEL: &'static str = $field_label;

            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn label(&self) -> &'static str {
                self.as_str()
            }
        }
    };
}

option_set! {
    /// Camera placement. [`ViewAngle::DefaultAngle`] keeps the input's view.
    pub enum ViewAngle ("View / Camera Angle") {
        default DefaultAngle;
        DefaultAngle => "Default Angle",
        ProfessionalArchviz => "Professional Archviz",
        EyeLevel => "Eye-Level",
        HighAngle => "High-Angle",
        LowAngle => "Low-Angle",
        AerialDrone => "Aerial / Drone",
        CloseUp => "Close-up",
        WideShot => "Wide Shot",
        BirdsEyeView => "Bird's Eye View",
        ViewFromInside => "View From Inside (Building to Outside)",
    }
}

impl ViewAngle {
    /// Returns true for the sentinel that means "keep the input's camera".
    pub fn is_default_angle(&self) -> bool {
        matches!(self, Self::DefaultAngle)
    }
}

option_set! {
    /// Output frame proportions.
    pub enum AspectRatio ("Aspect Ratio") {
        default Square;
        Square => "1:1",
        Landscape => "16:9",
        Portrait => "9:16",
        Standard => "4:3",
        StandardPortrait => "3:4",
    }
}

option_set! {
    /// Strength of the depth-of-field effect.
    pub enum DepthOfField ("Depth of Field") {
        default None;
        None => "None",
        Subtle => "Subtle",
        Moderate => "Moderate",
        Strong => "Strong",
    }
}

option_set! {
    /// Strength of motion blur on moving elements.
    pub enum MotionBlur ("Motion Blur") {
        default None;
        None => "None",
        Light => "Light",
        Medium => "Medium",
        Heavy => "Heavy",
    }
}

option_set! {
    /// Lighting period and atmosphere.
    pub enum TimeOfDay ("Time of Day") {
        default Day;
        Day => "Day",
        SoftDaylight => "Soft Daylight",
        MiddaySun => "Midday Sun",
        Night => "Night",
        GoldenHour => "Golden Hour",
        BlueHour => "Blue Hour",
        Dawn => "Dawn",
        Dusk => "Dusk",
        ArchvizDaylight => "Archviz Daylight",
        PurpleHour => "Purple Hour",
        Evening => "Evening",
        Sunrise => "Sunrise",
        Sunset => "Sunset",
        EarlyMorning => "Early Morning",
        LateAfternoon => "Late Afternoon",
        Twilight => "Twilight",
        MoonlitNight => "Moonlit Night",
        FoggyMorning => "Foggy Morning",
        OvercastNoon => "Overcast Noon",
        RainyAfternoon => "Rainy Afternoon",
        StormyEvening => "Stormy Evening",
        SnowyMorning => "Snowy Morning",
        WinterSunset => "Winter Sunset",
        SummerSunrise => "Summer Sunrise",
        AutumnEvening => "Autumn Evening",
        SpringTwilight => "Spring Twilight",
        CloudyAfternoon => "Cloudy Afternoon",
        EveningGlow => "Evening Glow",
        EveningMist => "Evening Mist",
        WarmSunset => "Warm Sunset",
        ColdSunrise => "Cold Sunrise",
        NightWithStreetlights => "Night with Streetlights",
        MistyMorning => "Misty Morning",
        FoggyEvening => "Foggy Evening",
        PurpleTwilight => "Purple Twilight",
    }
}

option_set! {
    /// Weather conditions.
    pub enum Weather ("Weather") {
        default Clear;
        Clear => "Clear",
        Overcast => "Overcast",
        Rainy => "Rainy",
        LightRain => "Light Rain",
        Stormy => "Stormy",
        Foggy => "Foggy",
        Snowy => "Snowy",
    }
}

option_set! {
    /// Wind acting on vegetation and fabrics.
    pub enum WindStrength ("Wind Strength") {
        default None;
        None => "None",
        LightBreeze => "Light Breeze",
        StrongWind => "Strong Wind",
    }
}

option_set! {
    /// Whether interior lighting is switched on.
    pub enum InteriorLights ("Interior Lights") {
        default On;
        On => "On",
        Off => "Off",
    }
}

option_set! {
    /// Strength of reflections on glazing and wet surfaces.
    pub enum ActiveReflection ("Active Reflection") {
        default None;
        None => "None",
        Subtle => "Subtle",
        Moderate => "Moderate",
        Strong => "Strong",
    }
}

option_set! {
    /// Overall presentation style of the rendering.
    pub enum RenderStyle ("Render Style") {
        default Photorealistic;
        Photorealistic => "Photorealistic",
        UltraRealistic => "Ultra Realistic",
        InteriorDesign => "Interior Design",
        Isometric => "Isometric",
        AxonometricView => "Axonometric View",
        ArchitecturalPresentation => "Architectural Presentation",
        ExplosionAnalysis => "Explosion Analysis",
        HandmadeWoodenModel => "Handmade Wooden Model",
        ConceptSketch => "Concept Sketch",
        UnderConstruction => "Under Construction",
        ArchitectsDesk => "Architect's Desk",
        MoodBoard => "Mood Board",
    }
}

option_set! {
    /// Surroundings placed around the building.
    pub enum SiteContext ("Site Context") {
        default EnhanceOnly;
        EnhanceOnly => "Enhance Only (No Context)",
        UrbanCityCenter => "Urban City Center",
        SuburbanNeighborhood => "Suburban Neighborhood",
        CoastalWaterfront => "Coastal Waterfront",
        MountainHillside => "Mountain Hillside",
        ForestWoodland => "Forest Woodland",
        DesertLandscape => "Desert Landscape",
        RuralCountryside => "Rural Countryside",
        LakesideRiverside => "Lakeside / Riverside",
        ParkCampus => "Park / Campus",
        IndustrialDistrict => "Industrial District",
    }
}

option_set! {
    /// Emotional tone of the image.
    pub enum MoodStyle ("Mood / Style") {
        default Neutral;
        Neutral => "neutral",
        Modern => "modern",
        Minimalist => "minimalist",
        Classic => "classic",
        Futuristic => "futuristic",
        Conceptual => "conceptual",
        Organic => "organic",
        Artistic => "artistic",
        Natural => "natural",
        Surreal => "surreal",
        Urban => "urban",
        Abstract => "abstract",
        Industrial => "industrial",
        Romantic => "romantic",
        Dramatic => "dramatic",
        Luxurious => "luxurious",
        Dark => "dark",
        Bright => "bright",
        Cinematic => "cinematic",
        Fantasy => "fantasy",
        Storytelling => "storytelling",
    }
}
