//! Partial updates to a placement record.
//!
//! A patch names only the leaves that change. Groups (`transform3d`,
//! `frame`, ...) are merged key-by-key, never replaced wholesale.
//! Untyped UI payloads go through [`PlacementPatch::from_json`], which
//! rejects the whole update on the first unrecognised key.

use crate::error::ModelError;
use crate::model::Color;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TransformPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FramePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A partial edit of one placement record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform3d: Option<TransformPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<FramePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mat: Option<MatPatch>,
}

const POSITION_FIELDS: &[&str] = &["x", "y"];
const SIZE_FIELDS: &[&str] = &["width", "height"];
const TRANSFORM_FIELDS: &[&str] = &["perspective", "rotateX", "rotateY", "rotation", "scale"];
const FRAME_FIELDS: &[&str] = &["show", "width", "height", "color"];
const MAT_FIELDS: &[&str] = &["show", "width", "height"];

impl PlacementPatch {
    /// Drag stop: move the box to an absolute position.
    pub fn moved_to(x: f64, y: f64) -> Self {
        Self {
            position: Some(PositionPatch {
                x: Some(x),
                y: Some(y),
            }),
            ..Default::default()
        }
    }

    pub fn transform(transform: TransformPatch) -> Self {
        Self {
            transform3d: Some(transform),
            ..Default::default()
        }
    }

    pub fn frame(frame: FramePatch) -> Self {
        Self {
            frame: Some(frame),
            ..Default::default()
        }
    }

    pub fn mat(mat: MatPatch) -> Self {
        Self {
            mat: Some(mat),
            ..Default::default()
        }
    }

    /// True when no leaf is set. A group present with nothing inside it
    /// counts as absent.
    pub fn is_empty(&self) -> bool {
        !(touched(&self.position)
            || touched(&self.size)
            || touched(&self.transform3d)
            || touched(&self.frame)
            || touched(&self.mat))
    }

    /// Short label for history entries ("move", "frame", ...).
    pub fn describe(&self) -> &'static str {
        let groups = [
            (touched(&self.position), "move"),
            (touched(&self.size), "resize"),
            (touched(&self.transform3d), "transform"),
            (touched(&self.frame), "frame"),
            (touched(&self.mat), "mat"),
        ];
        let mut touched = groups.iter().filter(|(on, _)| *on).map(|(_, label)| *label);
        match (touched.next(), touched.next()) {
            (Some(only), None) => only,
            (None, _) => "no-op",
            _ => "edit",
        }
    }

    /// Parse an untyped UI payload.
    ///
    /// Recognised groups: `position`, `size`, `transform3d`, `frame`, `mat`.
    /// `transform` is accepted as an alias of `transform3d`; inside it
    /// `x`/`y` route to `position` and `width`/`height` route to `size`.
    ///
    /// # Errors
    /// `UnknownField` with the dotted path of the first unrecognised key;
    /// `MalformedPatch` for wrong JSON types; `InvalidColor` for bad hex.
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        let obj = as_object("update", value)?;
        let mut patch = PlacementPatch::default();

        for (key, v) in obj {
            match key.as_str() {
                "position" => {
                    let p: PositionPatch = parse_group(key, v, POSITION_FIELDS)?;
                    let legacy = patch.position.unwrap_or_default();
                    patch.position = Some(PositionPatch {
                        x: p.x.or(legacy.x),
                        y: p.y.or(legacy.y),
                    });
                }
                "size" => {
                    let s: SizePatch = parse_group(key, v, SIZE_FIELDS)?;
                    let legacy = patch.size.unwrap_or_default();
                    patch.size = Some(SizePatch {
                        width: s.width.or(legacy.width),
                        height: s.height.or(legacy.height),
                    });
                }
                "transform3d" => {
                    let t: TransformPatch = parse_group(key, v, TRANSFORM_FIELDS)?;
                    patch.transform3d = Some(overlay_transform(t, patch.transform3d));
                }
                "transform" => patch.absorb_legacy_transform(v)?,
                "frame" => {
                    check_color(v)?;
                    patch.frame = Some(parse_group(key, v, FRAME_FIELDS)?);
                }
                "mat" => patch.mat = Some(parse_group(key, v, MAT_FIELDS)?),
                other => return Err(ModelError::UnknownField(other.to_string())),
            }
        }
        log::trace!("parsed patch: {}", patch.describe());
        Ok(patch)
    }

    /// Stored artwork documents keep box geometry inside `transform`.
    fn absorb_legacy_transform(&mut self, value: &Value) -> Result<(), ModelError> {
        let obj = as_object("transform", value)?;
        let mut geometry = Map::new();
        let mut transform = Map::new();
        for (k, v) in obj {
            if POSITION_FIELDS.contains(&k.as_str()) || SIZE_FIELDS.contains(&k.as_str()) {
                geometry.insert(k.clone(), v.clone());
            } else if TRANSFORM_FIELDS.contains(&k.as_str()) {
                transform.insert(k.clone(), v.clone());
            } else {
                return Err(ModelError::UnknownField(format!("transform.{k}")));
            }
        }

        let number = |k: &str| -> Result<Option<f64>, ModelError> {
            match geometry.get(k) {
                None => Ok(None),
                Some(v) => v
                    .as_f64()
                    .map(Some)
                    .ok_or_else(|| ModelError::MalformedPatch(format!("transform.{k}: expected a number"))),
            }
        };
        let (x, y) = (number("x")?, number("y")?);
        let (w, h) = (number("width")?, number("height")?);

        // Explicit `position`/`size` groups keep precedence over these.
        if x.is_some() || y.is_some() {
            let pos = self.position.get_or_insert_with(PositionPatch::default);
            pos.x = pos.x.or(x);
            pos.y = pos.y.or(y);
        }
        if w.is_some() || h.is_some() {
            let size = self.size.get_or_insert_with(SizePatch::default);
            size.width = size.width.or(w);
            size.height = size.height.or(h);
        }
        if !transform.is_empty() {
            let t: TransformPatch = parse_group("transform", &Value::Object(transform), TRANSFORM_FIELDS)?;
            self.transform3d = Some(match self.transform3d {
                Some(explicit) => overlay_transform(explicit, Some(t)),
                None => t,
            });
        }
        Ok(())
    }
}

fn touched<T: Default + PartialEq>(group: &Option<T>) -> bool {
    group.as_ref().is_some_and(|g| *g != T::default())
}

/// Leaves set in `primary` win; `fallback` only fills the gaps.
/// Explicit `transform3d` always takes precedence over the legacy alias.
fn overlay_transform(primary: TransformPatch, fallback: Option<TransformPatch>) -> TransformPatch {
    let Some(fallback) = fallback else {
        return primary;
    };
    TransformPatch {
        perspective: primary.perspective.or(fallback.perspective),
        rotate_x: primary.rotate_x.or(fallback.rotate_x),
        rotate_y: primary.rotate_y.or(fallback.rotate_y),
        rotation: primary.rotation.or(fallback.rotation),
        scale: primary.scale.or(fallback.scale),
    }
}

fn as_object<'a>(what: &str, value: &'a Value) -> Result<&'a Map<String, Value>, ModelError> {
    value
        .as_object()
        .ok_or_else(|| ModelError::MalformedPatch(format!("{what}: expected an object")))
}

fn parse_group<T: DeserializeOwned>(key: &str, value: &Value, known: &[&str]) -> Result<T, ModelError> {
    let obj = as_object(key, value)?;
    if let Some(unknown) = obj.keys().find(|k| !known.contains(&k.as_str())) {
        return Err(ModelError::UnknownField(format!("{key}.{unknown}")));
    }
    serde_json::from_value(value.clone()).map_err(|e| ModelError::MalformedPatch(format!("{key}: {e}")))
}

fn check_color(frame: &Value) -> Result<(), ModelError> {
    if let Some(Value::String(hex)) = frame.get("color")
        && Color::from_hex(hex).is_none()
    {
        return Err(ModelError::InvalidColor(hex.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_nested_groups() {
        let patch = PlacementPatch::from_json(&json!({
            "transform3d": { "scale": 2.0 },
            "frame": { "show": true, "color": "#aa0000" }
        }))
        .unwrap();
        assert_eq!(
            patch.transform3d,
            Some(TransformPatch {
                scale: Some(2.0),
                ..Default::default()
            })
        );
        let frame = patch.frame.unwrap();
        assert_eq!(frame.show, Some(true));
        assert_eq!(frame.color, Color::from_hex("#AA0000"));
        assert!(patch.position.is_none());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = PlacementPatch::from_json(&json!({ "opacity": 0.5 })).unwrap_err();
        assert_eq!(err, ModelError::UnknownField("opacity".into()));
    }

    #[test]
    fn unknown_nested_key_reports_dotted_path() {
        let err = PlacementPatch::from_json(&json!({
            "transform3d": { "scale": 2.0, "skew": 4.0 }
        }))
        .unwrap_err();
        assert_eq!(err, ModelError::UnknownField("transform3d.skew".into()));

        let err = PlacementPatch::from_json(&json!({ "transform": { "z": 1.0 } })).unwrap_err();
        assert_eq!(err, ModelError::UnknownField("transform.z".into()));
    }

    #[test]
    fn legacy_transform_routes_geometry() {
        let patch = PlacementPatch::from_json(&json!({
            "transform": { "x": 10.0, "y": 20.0, "rotation": 45.0 }
        }))
        .unwrap();
        assert_eq!(patch, {
            let mut expected = PlacementPatch::moved_to(10.0, 20.0);
            expected.transform3d = Some(TransformPatch {
                rotation: Some(45.0),
                ..Default::default()
            });
            expected
        });
    }

    #[test]
    fn explicit_groups_win_over_legacy_alias() {
        let patch = PlacementPatch::from_json(&json!({
            "position": { "x": 1.0 },
            "transform": { "x": 10.0, "y": 20.0, "scale": 3.0 },
            "transform3d": { "scale": 2.0 }
        }))
        .unwrap();
        assert_eq!(patch.position, Some(PositionPatch { x: Some(1.0), y: Some(20.0) }));
        assert_eq!(patch.transform3d.unwrap().scale, Some(2.0));
    }

    #[test]
    fn wrong_types_are_malformed() {
        assert!(matches!(
            PlacementPatch::from_json(&json!({ "transform3d": { "scale": "big" } })),
            Err(ModelError::MalformedPatch(_))
        ));
        assert!(matches!(
            PlacementPatch::from_json(&json!([1, 2])),
            Err(ModelError::MalformedPatch(_))
        ));
    }

    #[test]
    fn bad_frame_color_is_invalid_color() {
        let err = PlacementPatch::from_json(&json!({ "frame": { "color": "blue" } })).unwrap_err();
        assert_eq!(err, ModelError::InvalidColor("blue".into()));
    }

    #[test]
    fn typed_deserialize_rejects_unknown_keys() {
        assert!(serde_json::from_value::<PlacementPatch>(json!({ "opacity": 1 })).is_err());
        assert!(serde_json::from_value::<PlacementPatch>(json!({ "transform3d": { "skew": 3 } })).is_err());
        assert!(serde_json::from_value::<PlacementPatch>(json!({ "frame": { "colour": "#000000" } })).is_err());

        let patch: PlacementPatch = serde_json::from_value(json!({ "transform3d": { "rotateX": 5 } })).unwrap();
        assert_eq!(patch.transform3d.unwrap().rotate_x, Some(5.0));
    }

    #[test]
    fn empty_groups_make_an_empty_patch() {
        let patch = PlacementPatch::from_json(&json!({ "transform3d": {}, "mat": {} })).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.describe(), "no-op");
        assert!(PlacementPatch::default().is_empty());
        assert!(!PlacementPatch::moved_to(0.0, 0.0).is_empty());
    }

    #[test]
    fn describe_labels() {
        assert_eq!(PlacementPatch::moved_to(1.0, 2.0).describe(), "move");
        assert_eq!(PlacementPatch::default().describe(), "no-op");
        let mut both = PlacementPatch::moved_to(1.0, 2.0);
        both.mat = Some(MatPatch {
            show: Some(true),
            ..Default::default()
        });
        assert_eq!(both.describe(), "edit");
    }
}
