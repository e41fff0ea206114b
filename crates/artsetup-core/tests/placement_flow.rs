//! Integration tests: stored documents through patches, snapshots, and
//! render plans (artsetup-core).

use artsetup_core::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn stored() -> Vec<ArtworkDocument> {
    serde_json::from_value(json!([
        {
            "_id": "flow_a", "title": "Blue Hour", "artist": "R. Ohe", "year": 2011,
            "imageUrl": "/api/uploads/artworkImage-1.jpg",
            "metadata": { "width": "40", "height": "50" },
            "transform": { "perspective": 1000, "rotateX": 0, "rotateY": 0, "rotation": 0,
                           "scale": 1, "x": 50, "y": 50, "width": 300, "height": 375 },
            "frame": { "show": false, "width": 20, "height": 20, "color": "#333333" },
            "mat": { "show": false, "width": 20, "height": 20 }
        },
        {
            "_id": "flow_b", "title": "Field", "artist": "J. Arn", "year": 1988,
            "imageUrl": "/api/uploads/artworkImage-2.png",
            "metadata": { "width": "100", "height": "50" },
            "transform": { "x": 400, "y": 80, "width": 300, "height": 150 }
        }
    ]))
    .unwrap()
}

fn snapshot() -> Snapshot {
    let records = stored()
        .iter()
        .map(ArtworkDocument::to_record)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    Snapshot::from_records(records).unwrap()
}

// ─── Patches ──────────────────────────────────────────────────────────────

#[test]
fn ui_payload_updates_one_record() {
    let s0 = snapshot();
    let a = RecordId::intern("flow_a");
    let patch = PlacementPatch::from_json(&json!({
        "transform3d": { "rotateY": 25, "scale": 0.8 },
        "frame": { "show": true, "color": "#5a3a1a" }
    }))
    .unwrap();

    let (s1, merged) = s0.with_updated(a, &patch).unwrap();
    assert_eq!(merged.transform3d.rotate_y, 25.0);
    assert_eq!(merged.transform3d.scale, 0.8);
    assert_eq!(merged.transform3d.perspective, 1000.0);
    assert!(merged.frame.show);
    assert_eq!(merged.frame.width, 20.0);
    assert!(s1.shares_record(&s0, RecordId::intern("flow_b")));

    let plan = derive_render_transform(&merged);
    assert_eq!(
        plan.transform_css(),
        "perspective(1000px) rotateX(0deg) rotateY(25deg) rotate(0deg) scale(0.8)"
    );
    assert_eq!(plan.layer_css()[2], "background-color: #5A3A1A; padding: 20px 20px;");
}

#[test]
fn rejected_payload_changes_nothing() {
    let s0 = snapshot();
    let err = PlacementPatch::from_json(&json!({
        "frame": { "show": true },
        "shadow": { "blur": 4 }
    }))
    .unwrap_err();
    assert_eq!(err, ModelError::UnknownField("shadow".into()));

    let bad_scale = PlacementPatch::from_json(&json!({ "transform3d": { "scale": -1 } })).unwrap();
    assert!(s0.with_updated(RecordId::intern("flow_a"), &bad_scale).is_err());
    assert_eq!(s0, snapshot());
}

#[test]
fn legacy_payload_moves_the_box() {
    let s0 = snapshot();
    let patch = PlacementPatch::from_json(&json!({ "transform": { "x": 10, "y": 12 } })).unwrap();
    let (_, merged) = s0.with_updated(RecordId::intern("flow_b"), &patch).unwrap();
    assert_eq!(merged.position, Position::new(10.0, 12.0));
    assert_eq!(merged.transform3d, Transform3d::DEFAULT);
}

// ─── Reset & z-order ──────────────────────────────────────────────────────

#[test]
fn reset_then_store_shape_keeps_geometry() {
    let s0 = snapshot();
    let a = RecordId::intern("flow_a");
    let edited = s0
        .get(a)
        .unwrap()
        .patched(&PlacementPatch::transform(TransformPatch {
            rotation: Some(30.0),
            ..Default::default()
        }))
        .unwrap();
    let reset = reset_transform(&edited);
    let doc = ArtworkDocument::from_record(&reset);
    assert_eq!(doc.transform.rotation, 0.0);
    assert_eq!(doc.transform.x, 50.0);
    assert_eq!(doc.transform.height, 375.0);
    assert_eq!(doc.metadata.width, "40");
}

#[test]
fn reorder_changes_hit_priority() {
    let s0 = snapshot();
    let a = RecordId::intern("flow_a");
    let b = RecordId::intern("flow_b");
    // move b on top of a
    let (s1, _) = s0.with_updated(b, &PlacementPatch::moved_to(100.0, 100.0)).unwrap();
    assert_eq!(hit_test(&s1, 150.0, 150.0), Some(b));

    let s2 = s1.with_reordered(a, ZOrder::Front).unwrap().unwrap();
    assert_eq!(hit_test(&s2, 150.0, 150.0), Some(a));
    assert_eq!(s2.ids().collect::<Vec<_>>(), vec![b, a]);
}
