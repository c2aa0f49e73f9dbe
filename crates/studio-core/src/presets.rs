//! Named transformation presets offered by the editing surface

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Flip, Radius, Transformation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    Resize,
    Shape,
    Color,
    Artistic,
    Adjustments,
    Blur,
    Transform,
}

impl PresetCategory {
    pub const ALL: [PresetCategory; 7] = [
        PresetCategory::Resize,
        PresetCategory::Shape,
        PresetCategory::Color,
        PresetCategory::Artistic,
        PresetCategory::Adjustments,
        PresetCategory::Blur,
        PresetCategory::Transform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetCategory::Resize => "resize",
            PresetCategory::Shape => "shape",
            PresetCategory::Color => "color",
            PresetCategory::Artistic => "artistic",
            PresetCategory::Adjustments => "adjustments",
            PresetCategory::Blur => "blur",
            PresetCategory::Transform => "transform",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PresetCategory::Resize => "Dimensions & Crop",
            PresetCategory::Shape => "Corners & Masks",
            PresetCategory::Color => "Filters & Grading",
            PresetCategory::Artistic => "Stylized Effects",
            PresetCategory::Adjustments => "Light & Color",
            PresetCategory::Blur => "Focus & Sharpness",
            PresetCategory::Transform => "Orient & Zoom",
        }
    }
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PresetCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "Invalid preset category: {}. Must be one of: resize, shape, color, artistic, adjustments, blur, transform",
                    s
                )
            })
    }
}

/// One parameter a preset sets on the current transformation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresetSetting {
    Width(u32),
    Height(u32),
    Crop(&'static str),
    Gravity(&'static str),
    Radius(u32),
    RadiusMax,
    Effect(&'static str),
    Brightness(i32),
    Contrast(i32),
    Saturation(i32),
    Hue(i32),
    Angle(i32),
    Flip(Flip),
    Zoom(f64),
}

impl PresetSetting {
    fn apply(&self, t: &mut Transformation) {
        match *self {
            PresetSetting::Width(w) => t.width = Some(w),
            PresetSetting::Height(h) => t.height = Some(h),
            PresetSetting::Crop(c) => t.crop = Some(c.to_string()),
            PresetSetting::Gravity(g) => t.gravity = Some(g.to_string()),
            PresetSetting::Radius(px) => t.radius = Some(Radius::Pixels(px)),
            PresetSetting::RadiusMax => t.radius = Some(Radius::Named("max".to_string())),
            PresetSetting::Effect(e) => t.effect = Some(e.to_string()),
            PresetSetting::Brightness(v) => t.brightness = Some(v),
            PresetSetting::Contrast(v) => t.contrast = Some(v),
            PresetSetting::Saturation(v) => t.saturation = Some(v),
            PresetSetting::Hue(v) => t.hue = Some(v),
            PresetSetting::Angle(a) => t.angle = Some(a),
            PresetSetting::Flip(f) => t.flip = Some(f),
            PresetSetting::Zoom(z) => t.zoom = Some(z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetDefinition {
    pub name: &'static str,
    pub category: PresetCategory,
    pub description: &'static str,
    /// Presets sharing a group replace each other's effect when applied in turn
    pub exclusive: Option<&'static str>,
    pub settings: &'static [PresetSetting],
}

impl PresetDefinition {
    pub fn transformation(&self) -> Transformation {
        let mut t = Transformation::default();
        for setting in self.settings {
            setting.apply(&mut t);
        }
        t
    }
}

const fn preset(
    name: &'static str,
    category: PresetCategory,
    description: &'static str,
    settings: &'static [PresetSetting],
) -> PresetDefinition {
    PresetDefinition {
        name,
        category,
        description,
        exclusive: None,
        settings,
    }
}

const fn exclusive(
    name: &'static str,
    category: PresetCategory,
    group: &'static str,
    description: &'static str,
    settings: &'static [PresetSetting],
) -> PresetDefinition {
    PresetDefinition {
        name,
        category,
        description,
        exclusive: Some(group),
        settings,
    }
}

use PresetCategory::*;
use PresetSetting as S;

pub static PRESETS: &[PresetDefinition] = &[
    // resize
    preset(
        "Basic Resize",
        Resize,
        "300x300 fill",
        &[S::Width(300), S::Height(300), S::Crop("fill")],
    ),
    preset(
        "Square Thumbnail",
        Resize,
        "150x150 face-focused",
        &[
            S::Width(150),
            S::Height(150),
            S::Crop("thumb"),
            S::Gravity("face"),
        ],
    ),
    preset(
        "Landscape",
        Resize,
        "800x400 fill",
        &[S::Width(800), S::Height(400), S::Crop("fill")],
    ),
    preset(
        "Portrait",
        Resize,
        "400x600 fill",
        &[S::Width(400), S::Height(600), S::Crop("fill")],
    ),
    // shape
    preset(
        "Circle",
        Shape,
        "200x200 circular mask",
        &[S::Width(200), S::Height(200), S::Crop("fill"), S::RadiusMax],
    ),
    preset(
        "Rounded Corners",
        Shape,
        "300x300 with 20px radius",
        &[S::Width(300), S::Height(300), S::Crop("fill"), S::Radius(20)],
    ),
    // color
    exclusive(
        "Black & White",
        Color,
        "color-effect",
        "High-contrast monochrome",
        &[S::Effect("blackwhite")],
    ),
    exclusive(
        "Sepia",
        Color,
        "color-effect",
        "Warm brown vintage tone",
        &[S::Effect("sepia")],
    ),
    exclusive(
        "Grayscale",
        Color,
        "color-effect",
        "Neutral gray tones",
        &[S::Effect("grayscale")],
    ),
    exclusive(
        "Invert",
        Color,
        "color-effect",
        "Negative colors",
        &[S::Effect("negate")],
    ),
    // artistic
    exclusive(
        "Vintage (Audrey)",
        Artistic,
        "artistic-filter",
        "Soft retro film look",
        &[S::Effect("art:audrey")],
    ),
    exclusive(
        "Zorro",
        Artistic,
        "artistic-filter",
        "Dark dramatic filter",
        &[S::Effect("art:zorro")],
    ),
    exclusive(
        "Aurora",
        Artistic,
        "artistic-filter",
        "Cool luminous filter",
        &[S::Effect("art:aurora")],
    ),
    exclusive(
        "Oil Painting",
        Artistic,
        "artistic-filter",
        "Painted brush strokes",
        &[S::Effect("oil_paint:6")],
    ),
    exclusive(
        "Sketch",
        Artistic,
        "artistic-filter",
        "Pencil drawing",
        &[S::Effect("sketch")],
    ),
    exclusive(
        "Cartoon",
        Artistic,
        "artistic-filter",
        "Flat cartoon colors",
        &[S::Effect("cartoonify:70")],
    ),
    // adjustments
    preset(
        "Brightness +20",
        Adjustments,
        "Lighten the image",
        &[S::Brightness(20)],
    ),
    preset(
        "Contrast +20",
        Adjustments,
        "Deeper shadows and highlights",
        &[S::Contrast(20)],
    ),
    preset(
        "Saturation -50",
        Adjustments,
        "Muted colors",
        &[S::Saturation(-50)],
    ),
    preset(
        "High Contrast",
        Adjustments,
        "Punchy contrast with a little lift",
        &[S::Contrast(50), S::Brightness(10)],
    ),
    preset(
        "Warm Tone",
        Adjustments,
        "Richer, warmer colors",
        &[S::Saturation(30), S::Hue(20)],
    ),
    preset(
        "Cool Tone",
        Adjustments,
        "Richer, cooler colors",
        &[S::Saturation(30), S::Hue(-20)],
    ),
    preset(
        "Dramatic",
        Adjustments,
        "Dark, contrasty and saturated",
        &[S::Contrast(40), S::Brightness(-10), S::Saturation(20)],
    ),
    // blur
    exclusive(
        "Blur",
        Blur,
        "blur-sharpen",
        "Strong gaussian blur",
        &[S::Effect("blur:300")],
    ),
    exclusive(
        "Sharpen",
        Blur,
        "blur-sharpen",
        "Crisper edges",
        &[S::Effect("sharpen")],
    ),
    exclusive(
        "Pixelate",
        Blur,
        "blur-sharpen",
        "Blocky mosaic",
        &[S::Effect("pixelate:15")],
    ),
    // transform
    preset("Rotate 90°", Transform, "Quarter turn clockwise", &[S::Angle(90)]),
    preset("Rotate 180°", Transform, "Upside down", &[S::Angle(180)]),
    preset(
        "Rotate 270°",
        Transform,
        "Quarter turn counter-clockwise",
        &[S::Angle(270)],
    ),
    preset(
        "Flip Horizontal",
        Transform,
        "Mirror left to right",
        &[S::Flip(Flip::Horizontal)],
    ),
    preset(
        "Flip Vertical",
        Transform,
        "Mirror top to bottom",
        &[S::Flip(Flip::Vertical)],
    ),
    preset("Zoom 2x", Transform, "Zoom in", &[S::Zoom(2.0)]),
    preset("Zoom 0.5x", Transform, "Zoom out", &[S::Zoom(0.5)]),
];

/// Case-insensitive lookup by preset name
pub fn find_preset(name: &str) -> Option<&'static PresetDefinition> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn presets_in(category: PresetCategory) -> impl Iterator<Item = &'static PresetDefinition> {
    PRESETS.iter().filter(move |p| p.category == category)
}
