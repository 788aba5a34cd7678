//! Optical code rendering style.
//!
//! Style records are pure data: every field is optional and no cross-field
//! validation happens here, drawing the pattern is up to the renderer.
//! Updates replace a single value at a dotted path, so that editing
//! one nested field never disturbs its siblings.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Overall pattern shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Square,
    Circle,
}

/// Data module style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DotType {
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
}

/// Finder pattern outer square style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerSquareType {
    Square,
    Dot,
    ExtraRounded,
}

/// Finder pattern inner dot style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerDotType {
    Square,
    Dot,
}

/// Error correction level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    H,
}

/// Style of the data modules layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DotsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<DotType>,
}

/// Style of the background layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackgroundOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Style of the finder pattern outer squares.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CornersSquareOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CornerSquareType>,
}

/// Style of the finder pattern inner dots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CornersDotOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CornerDotType>,
}

/// Embedded logo sizing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageOptions {
    /// Logo size relative to the code size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<f64>,

    /// Logo margin, in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,

    /// Hide data modules behind the logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_background_dots: Option<bool>,
}

/// Pattern generation options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QrOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_correction_level: Option<ErrorCorrectionLevel>,
}

/// Complete code style snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,

    /// Embedded logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_options: Option<ImageOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dots_options: Option<DotsOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_options: Option<BackgroundOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners_square_options: Option<CornersSquareOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners_dot_options: Option<CornersDotOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_options: Option<QrOptions>,
}

/// Errors that may occur during the style update.
#[derive(Debug, Display, From, Error)]
pub enum StyleUpdateError {
    /// Updated style does not match the style schema.
    #[display(fmt = "invalid style value: {}", _0)]
    Schema(serde_json::Error),

    /// Provided path is empty or contains empty segments.
    #[display(fmt = "invalid style path")]
    InvalidPath,

    /// Provided path crosses a value that is not an object.
    #[display(fmt = "style path crosses a non-object value")]
    NotAnObject,
}

impl StyleConfig {
    /// Return a copy of this style with `value` placed at the dotted `path`.
    ///
    /// Missing intermediate objects are created, all other fields stay untouched.
    /// Paths naming fields outside of the style schema are rejected.
    ///
    /// ## Example
    ///
    /// ```
    /// use common::style::StyleConfig;
    /// use serde_json::json;
    ///
    /// let style = StyleConfig::default()
    ///     .with_value("dots_options.color", json!("#000000"))
    ///     .unwrap();
    ///
    /// assert_eq!(style.dots_options.unwrap().color.as_deref(), Some("#000000"));
    /// ```
    pub fn with_value(&self, path: &str, value: Value) -> Result<Self, StyleUpdateError> {
        let mut document = serde_json::to_value(self)?;

        replace_at_path(&mut document, path, value)?;

        Ok(serde_json::from_value(document)?)
    }
}

/// Replace the value at the dotted `path` inside of a JSON document.
pub fn replace_at_path(
    document: &mut Value,
    path: &str,
    value: Value,
) -> Result<(), StyleUpdateError> {
    let segments: Vec<&str> = path.split('.').collect();

    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(StyleUpdateError::InvalidPath);
    }

    let Some((last, parents)) = segments.split_last() else {
        return Err(StyleUpdateError::InvalidPath);
    };

    let mut current = document;

    for segment in parents {
        let object = as_object(current)?;

        current = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    as_object(current)?.insert(last.to_string(), value);

    Ok(())
}

/// Treat `null` values as empty objects, since style fields are optional.
fn as_object(value: &mut Value) -> Result<&mut Map<String, Value>, StyleUpdateError> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }

    value.as_object_mut().ok_or(StyleUpdateError::NotAnObject)
}
