//! Hit testing against projected artwork quads.

use crate::id::ArtworkId;
use crate::render::derive_render_transform;
use crate::snapshot::Snapshot;

/// Topmost artwork whose transformed box contains `(x, y)`.
///
/// Records are tested top to bottom (last in snapshot order first). A record
/// tilted so far that a corner falls behind the viewer is skipped.
pub fn hit_test(snapshot: &Snapshot, x: f64, y: f64) -> Option<ArtworkId> {
    let records: Vec<_> = snapshot.iter().collect();
    records.into_iter().rev().find_map(|record| {
        let quad = derive_render_transform(record).projected_corners()?;
        quad_contains(&quad, x, y).then_some(record.id)
    })
}

/// Point-in-convex-quad: the point lies on the same side of all four edges.
/// Edges count as inside.
fn quad_contains(quad: &[(f64, f64); 4], x: f64, y: f64) -> bool {
    let mut sign = 0.0_f64;
    for i in 0..4 {
        let (ax, ay) = quad[i];
        let (bx, by) = quad[(i + 1) % 4];
        let cross = (bx - ax) * (y - ay) - (by - ay) * (x - ax);
        if cross.abs() < 1e-9 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    // fully degenerate quads (zero area) never match
    sign != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use crate::model::{ImageDimensions, Position};
    use crate::patch::{PlacementPatch, TransformPatch};
    use crate::placement::create_initial;

    fn at(name: &str, x: f64, y: f64) -> crate::model::PlacementRecord {
        create_initial(
            RecordId::intern(name),
            ImageDimensions::new(100.0, 100.0),
            Position::new(x, y),
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn topmost_record_wins() {
        let s = Snapshot::from_records([at("hit_under", 0.0, 0.0), at("hit_over", 50.0, 50.0)]).unwrap();
        assert_eq!(hit_test(&s, 75.0, 75.0), Some(RecordId::intern("hit_over")));
        assert_eq!(hit_test(&s, 25.0, 25.0), Some(RecordId::intern("hit_under")));
        assert_eq!(hit_test(&s, 500.0, 500.0), None);
    }

    #[test]
    fn follows_the_transform() {
        let scaled = at("hit_scaled", 100.0, 100.0)
            .patched(&PlacementPatch::transform(TransformPatch {
                scale: Some(0.5),
                ..Default::default()
            }))
            .unwrap();
        let s = Snapshot::from_records([scaled]).unwrap();
        // box spans 100..200, scaled around its center to 125..175
        assert_eq!(hit_test(&s, 110.0, 110.0), None);
        assert_eq!(hit_test(&s, 150.0, 150.0), Some(RecordId::intern("hit_scaled")));
    }

    #[test]
    fn rotated_quad() {
        let rotated = at("hit_rotated", 0.0, 0.0)
            .patched(&PlacementPatch::transform(TransformPatch {
                rotation: Some(45.0),
                ..Default::default()
            }))
            .unwrap();
        let s = Snapshot::from_records([rotated]).unwrap();
        // corners of the unrotated box are cut off by the diamond
        assert_eq!(hit_test(&s, 2.0, 2.0), None);
        // the diamond's top tip pokes above the original box
        assert_eq!(hit_test(&s, 50.0, -10.0), Some(RecordId::intern("hit_rotated")));
    }
}
