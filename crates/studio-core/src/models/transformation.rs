//! Transformation parameters forwarded to the image host's delivery URLs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Corner radius: a pixel value or a named mode such as `max`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Radius {
    Pixels(u32),
    Named(String),
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radius::Pixels(px) => write!(f, "{}", px),
            Radius::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flip {
    Horizontal,
    Vertical,
}

impl Flip {
    fn component(&self) -> &'static str {
        match self {
            Flip::Horizontal => "a_hflip",
            Flip::Vertical => "a_vflip",
        }
    }
}

/// Named visual parameters for a derived image.
///
/// Constructed fresh per preview request and never persisted. Every field is optional;
/// an empty transformation maps to the untouched secure URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    #[validate(range(min = 1, max = 10000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[validate(range(min = 1, max = 10000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    /// `auto`, `auto:<level>` or 1-100. Numbers are accepted and kept as strings.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<Radius>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[validate(range(min = -360, max = 360))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<i32>,
    #[validate(range(min = 0.1, max = 10.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[validate(range(min = 0.1, max = 5.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpr: Option<f64>,
    #[validate(range(max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[validate(range(min = -99, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i32>,
    #[validate(range(min = -100, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<i32>,
    #[validate(range(min = -100, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<i32>,
    #[validate(range(min = -100, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip: Option<Flip>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

macro_rules! overwrite_fields {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

impl Transformation {
    pub fn is_empty(&self) -> bool {
        *self == Transformation::default()
    }

    /// Overwrite every field that is set in `other`, leaving the rest untouched.
    pub fn merge(&mut self, other: &Transformation) {
        overwrite_fields!(
            self, other, width, height, crop, quality, format, gravity, radius, overlay, effect,
            angle, zoom, background, dpr, opacity, border, brightness, contrast, saturation, hue,
            flip,
        );
    }

    /// Range checks plus the syntax rules the derive cannot express.
    pub fn validate_params(&self) -> Result<(), AppError> {
        self.validate()?;

        if let Some(quality) = &self.quality {
            validate_quality(quality)?;
        }

        if let Some(Radius::Named(name)) = &self.radius {
            if name != "max" {
                return Err(AppError::InvalidInput(format!(
                    "Invalid radius: {}. Must be a pixel value or 'max'",
                    name
                )));
            }
        }

        for (name, value) in [
            ("crop", &self.crop),
            ("format", &self.format),
            ("gravity", &self.gravity),
            ("effect", &self.effect),
            ("background", &self.background),
            ("border", &self.border),
        ] {
            if let Some(value) = value {
                validate_component_value(name, value, false)?;
            }
        }

        if let Some(overlay) = &self.overlay {
            validate_component_value("overlay", overlay, true)?;
        }

        Ok(())
    }

    /// URL components in delivery order. The main component carries the geometric and
    /// delivery parameters; colour adjustments and flip are chained after it.
    pub fn to_components(&self) -> Vec<String> {
        let mut main: Vec<String> = Vec::new();

        if let Some(w) = self.width {
            main.push(format!("w_{}", w));
        }
        if let Some(h) = self.height {
            main.push(format!("h_{}", h));
        }
        if let Some(c) = &self.crop {
            main.push(format!("c_{}", c));
        }
        if let Some(g) = &self.gravity {
            main.push(format!("g_{}", g));
        }
        if let Some(q) = &self.quality {
            main.push(format!("q_{}", q));
        }
        if let Some(f) = &self.format {
            main.push(format!("f_{}", f));
        }
        if let Some(r) = &self.radius {
            main.push(format!("r_{}", r));
        }
        if let Some(l) = &self.overlay {
            main.push(format!("l_{}", l.replace('/', ":")));
        }
        if let Some(e) = &self.effect {
            main.push(format!("e_{}", e));
        }
        if let Some(a) = self.angle {
            main.push(format!("a_{}", a));
        }
        if let Some(z) = self.zoom {
            main.push(format!("z_{}", z));
        }
        if let Some(b) = &self.background {
            main.push(format!("b_{}", b));
        }
        if let Some(dpr) = self.dpr {
            main.push(format!("dpr_{}", dpr));
        }
        if let Some(o) = self.opacity {
            main.push(format!("o_{}", o));
        }
        if let Some(bo) = &self.border {
            main.push(format!("bo_{}", bo));
        }

        let mut components = Vec::new();
        if !main.is_empty() {
            components.push(main.join(","));
        }

        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("hue", self.hue),
        ] {
            if let Some(v) = value {
                components.push(format!("e_{}:{}", name, v));
            }
        }

        if let Some(flip) = self.flip {
            components.push(flip.component().to_string());
        }

        components
    }

    /// Chained transformation string, or `None` when nothing is set.
    pub fn to_url_segment(&self) -> Option<String> {
        let components = self.to_components();
        if components.is_empty() {
            None
        } else {
            Some(components.join("/"))
        }
    }
}

fn validate_quality(quality: &str) -> Result<(), AppError> {
    if quality == "auto" || quality.starts_with("auto:") {
        return Ok(());
    }

    match quality.parse::<u32>() {
        Ok(q) if (1..=100).contains(&q) => Ok(()),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid quality: {}. Must be 'auto', 'auto:<level>' or 1-100",
            quality
        ))),
    }
}

fn validate_component_value(name: &str, value: &str, allow_slash: bool) -> Result<(), AppError> {
    let forbidden = |c: char| c == ',' || c.is_whitespace() || (!allow_slash && c == '/');

    if value.is_empty() || value.chars().any(forbidden) {
        return Err(AppError::InvalidInput(format!(
            "Invalid {}: '{}' cannot be empty or contain separators",
            name, value
        )));
    }

    Ok(())
}
