//! Stored document shapes.
//!
//! The persistence service keeps box geometry inside `transform` next to the
//! 3D parameters, names the id `_id`, and stores physical dimensions as
//! strings. These types mirror that layout and convert to and from the
//! editor's model.

use crate::error::ModelError;
use crate::id::{ArtworkId, ScenarioId};
use crate::model::*;
use crate::patch::{FramePatch, MatPatch, PlacementPatch, PositionPatch, SizePatch, TransformPatch};
use crate::placement::apply_partial_update;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkDocument {
    #[serde(rename = "_id")]
    pub id: ArtworkId,
    pub title: String,
    pub artist: String,
    pub year: i32,
    pub image_url: String,
    pub metadata: PhysicalDocument,
    pub transform: TransformDocument,
    #[serde(default)]
    pub frame: FrameStyle,
    #[serde(default)]
    pub mat: MatStyle,
}

/// Physical dimensions in centimetres, kept as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalDocument {
    #[serde(deserialize_with = "text_or_number")]
    pub width: String,
    #[serde(deserialize_with = "text_or_number")]
    pub height: String,
}

/// Box geometry is required. Documents written before the 3D controls
/// existed may lack those parameters; they load with the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformDocument {
    #[serde(default = "default_perspective")]
    pub perspective: f64,
    #[serde(default)]
    pub rotate_x: f64,
    #[serde(default)]
    pub rotate_y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn default_perspective() -> f64 {
    Transform3d::DEFAULT.perspective
}

fn default_scale() -> f64 {
    Transform3d::DEFAULT.scale
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDocument {
    #[serde(rename = "_id")]
    pub id: ScenarioId,
    pub name: String,
    pub image_url: String,
}

/// Older documents carry physical dimensions as JSON numbers.
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn parse_physical(field: &'static str, text: &str) -> Result<f64, ModelError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ModelError::invalid(field, text))
}

impl ArtworkDocument {
    /// Convert to the editor's model. Stored values go through the same
    /// checks as a partial update: rotations are clamped, everything else
    /// must already be in range.
    ///
    /// # Errors
    /// `InvalidValue` when a physical dimension does not parse as a number
    /// or a placement value is out of range.
    pub fn to_record(&self) -> Result<PlacementRecord, ModelError> {
        let t = &self.transform;
        let unchecked = PlacementRecord {
            id: self.id,
            position: Position::new(t.x, t.y),
            size: Size::new(t.width, t.height),
            transform3d: Transform3d::DEFAULT,
            frame: self.frame,
            mat: self.mat,
            metadata: ArtworkMetadata {
                title: self.title.clone(),
                artist: self.artist.clone(),
                year: self.year,
                physical_width: parse_physical("metadata.width", &self.metadata.width)?,
                physical_height: parse_physical("metadata.height", &self.metadata.height)?,
            },
            image: ImageRef::new(self.image_url.clone()),
        };
        apply_partial_update(&unchecked, &self.placement_patch())
    }

    /// Every placement leaf of the document as one patch.
    fn placement_patch(&self) -> PlacementPatch {
        let t = &self.transform;
        PlacementPatch {
            position: Some(PositionPatch {
                x: Some(t.x),
                y: Some(t.y),
            }),
            size: Some(SizePatch {
                width: Some(t.width),
                height: Some(t.height),
            }),
            transform3d: Some(TransformPatch {
                perspective: Some(t.perspective),
                rotate_x: Some(t.rotate_x),
                rotate_y: Some(t.rotate_y),
                rotation: Some(t.rotation),
                scale: Some(t.scale),
            }),
            frame: Some(FramePatch {
                show: Some(self.frame.show),
                width: Some(self.frame.width),
                height: Some(self.frame.height),
                color: Some(self.frame.color),
            }),
            mat: Some(MatPatch {
                show: Some(self.mat.show),
                width: Some(self.mat.width),
                height: Some(self.mat.height),
            }),
        }
    }

    pub fn from_record(record: &PlacementRecord) -> Self {
        let t = &record.transform3d;
        Self {
            id: record.id,
            title: record.metadata.title.clone(),
            artist: record.metadata.artist.clone(),
            year: record.metadata.year,
            image_url: record.image.as_str().to_string(),
            metadata: PhysicalDocument {
                width: record.metadata.physical_width.to_string(),
                height: record.metadata.physical_height.to_string(),
            },
            transform: TransformDocument {
                perspective: t.perspective,
                rotate_x: t.rotate_x,
                rotate_y: t.rotate_y,
                rotation: t.rotation,
                scale: t.scale,
                x: record.position.x,
                y: record.position.y,
                width: record.size.width,
                height: record.size.height,
            },
            frame: record.frame,
            mat: record.mat,
        }
    }
}

impl From<&PlacementRecord> for ArtworkDocument {
    fn from(record: &PlacementRecord) -> Self {
        Self::from_record(record)
    }
}

impl TryFrom<&ArtworkDocument> for PlacementRecord {
    type Error = ModelError;

    fn try_from(doc: &ArtworkDocument) -> Result<Self, Self::Error> {
        doc.to_record()
    }
}

impl From<ScenarioDocument> for Scenario {
    fn from(doc: ScenarioDocument) -> Self {
        Scenario {
            id: doc.id,
            name: doc.name,
            image: ImageRef::new(doc.image_url),
        }
    }
}

impl From<&Scenario> for ScenarioDocument {
    fn from(s: &Scenario) -> Self {
        ScenarioDocument {
            id: s.id,
            name: s.name.clone(),
            image_url: s.image.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use pretty_assertions::assert_eq;

    const STORED: &str = r##"{
        "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
        "title": "Harbor at Dusk",
        "artist": "M. Lind",
        "year": 1931,
        "imageUrl": "/api/uploads/artworkImage-1700000000000-42.png",
        "metadata": { "width": "60", "height": "30.5" },
        "transform": { "perspective": 800, "rotateX": 10, "rotateY": -5,
                       "rotation": 0, "scale": 1.2, "x": 50, "y": 75,
                       "width": 300, "height": 150 },
        "frame": { "show": true, "width": 12, "height": 8, "color": "#8B4513" },
        "mat":   { "show": false, "width": 20, "height": 20 }
    }"##;

    #[test]
    fn stored_document_to_record() {
        let doc: ArtworkDocument = serde_json::from_str(STORED).unwrap();
        let record = doc.to_record().unwrap();
        assert_eq!(record.id, RecordId::intern("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert_eq!(record.position, Position::new(50.0, 75.0));
        assert_eq!(record.size, Size::new(300.0, 150.0));
        assert_eq!(record.transform3d.perspective, 800.0);
        assert_eq!(record.transform3d.rotate_y, -5.0);
        assert_eq!(record.metadata.physical_height, 30.5);
        assert_eq!(record.frame.color.to_hex(), "#8B4513");
        assert_eq!(record.image.as_str(), "/api/uploads/artworkImage-1700000000000-42.png");
    }

    #[test]
    fn record_back_to_stored_shape() {
        let doc: ArtworkDocument = serde_json::from_str(STORED).unwrap();
        let again = ArtworkDocument::from_record(&doc.to_record().unwrap());
        assert_eq!(again, doc);

        let json = serde_json::to_value(&again).unwrap();
        assert_eq!(json["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(json["metadata"]["width"], "60");
        assert_eq!(json["transform"]["x"], 50.0);
        assert!(json.get("transform3d").is_none());
    }

    #[test]
    fn missing_groups_fall_back_to_defaults() {
        let doc: ArtworkDocument = serde_json::from_str(
            r#"{"_id":"bare","title":"t","artist":"a","year":2000,
                "imageUrl":"/x.png","metadata":{"width":10,"height":20},
                "transform":{"x":5,"y":6,"width":100,"height":200}}"#,
        )
        .unwrap();
        let record = doc.to_record().unwrap();
        assert_eq!(record.transform3d, Transform3d::DEFAULT);
        assert_eq!(record.frame, FrameStyle::default());
        assert_eq!(record.size, Size::new(100.0, 200.0));
        assert_eq!(record.metadata.physical_width, 10.0);
    }

    #[test]
    fn box_geometry_is_required() {
        let no_transform = serde_json::from_str::<ArtworkDocument>(
            r#"{"_id":"nobox","title":"t","artist":"a","year":2000,
                "imageUrl":"/x.png","metadata":{"width":10,"height":20}}"#,
        );
        assert!(no_transform.is_err());

        let no_width = serde_json::from_str::<ArtworkDocument>(
            r#"{"_id":"nowidth","title":"t","artist":"a","year":2000,
                "imageUrl":"/x.png","metadata":{"width":10,"height":20},
                "transform":{"x":0,"y":0,"height":200}}"#,
        );
        assert!(no_width.is_err());
    }

    #[test]
    fn out_of_range_placement_is_rejected() {
        let stored: ArtworkDocument = serde_json::from_str(STORED).unwrap();
        let cases: [(&str, fn(&mut ArtworkDocument)); 4] = [
            ("transform3d.scale", |d| d.transform.scale = 0.0),
            ("transform3d.perspective", |d| d.transform.perspective = -5.0),
            ("size.width", |d| d.transform.width = -10.0),
            ("mat.height", |d| d.mat.height = f64::INFINITY),
        ];
        for (field, corrupt) in cases {
            let mut doc = stored.clone();
            corrupt(&mut doc);
            match doc.to_record() {
                Err(ModelError::InvalidValue { field: got, .. }) => assert_eq!(got, field),
                other => panic!("{field}: expected InvalidValue, got {other:?}"),
            }
        }
    }

    #[test]
    fn stored_rotations_are_clamped() {
        let mut doc: ArtworkDocument = serde_json::from_str(STORED).unwrap();
        doc.transform.rotation = 720.0;
        doc.transform.rotate_x = -200.0;
        let record = doc.to_record().unwrap();
        assert_eq!(record.transform3d.rotation, 180.0);
        assert_eq!(record.transform3d.rotate_x, -180.0);
    }

    #[test]
    fn unparsable_physical_dimension() {
        let mut doc: ArtworkDocument = serde_json::from_str(STORED).unwrap();
        doc.metadata.width = "sixty".into();
        assert!(matches!(
            doc.to_record(),
            Err(ModelError::InvalidValue { field: "metadata.width", .. })
        ));
    }

    #[test]
    fn scenario_document_converts() {
        let doc: ScenarioDocument = serde_json::from_str(
            r#"{"_id":"sc1","name":"living-room.jpg","imageUrl":"/api/uploads/scenarioImage-3.jpg"}"#,
        )
        .unwrap();
        let scenario = Scenario::from(doc.clone());
        assert_eq!(scenario.name, "living-room.jpg");
        assert_eq!(ScenarioDocument::from(&scenario), doc);
    }
}
