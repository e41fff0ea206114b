//! `--render`: stored documents → per-layer CSS.

use artsetup_core::{ArtworkDocument, Layer, derive_render_transform};
use std::fmt::Write;

/// Render every document in a JSON array, one block per artwork.
///
/// # Errors
/// Returns a message if the input is not an array of artwork documents or a
/// document cannot be converted.
pub fn render_documents(text: &str) -> Result<String, String> {
    let docs: Vec<ArtworkDocument> = serde_json::from_str(text).map_err(|e| format!("invalid documents: {e}"))?;
    let mut out = String::new();
    for doc in &docs {
        let record = doc.to_record().map_err(|e| format!("{}: {e}", doc.id))?;
        let plan = derive_render_transform(&record);
        let _ = writeln!(out, "{}", record.id);
        for (layer, css) in plan.layers().iter().zip(plan.layer_css()) {
            let name = match layer {
                Layer::OuterBox { .. } => "box",
                Layer::Transform(_) => "transform",
                Layer::Frame(_) => "frame",
                Layer::Mat(_) => "mat",
                Layer::Image(_) => "image",
            };
            let _ = writeln!(out, "  {name:<9} {css}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_layer() {
        let out = render_documents(
            r##"[{"_id":"cli_render","title":"t","artist":"a","year":1,"imageUrl":"/api/uploads/x.png",
                 "metadata":{"width":"1","height":"1"},
                 "transform":{"x":5,"y":6,"width":300,"height":200},
                 "mat":{"show":true,"width":15,"height":10}}]"##,
        )
        .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "cli_render");
        assert_eq!(
            lines[1],
            "  box       position: absolute; left: 5px; top: 6px; width: 300px; height: 200px;"
        );
        assert!(lines[2].ends_with(
            "transform: perspective(1000px) rotateX(0deg) rotateY(0deg) rotate(0deg) scale(1);"
        ));
        assert_eq!(lines[3], "  mat       background-color: #F1F1F1; padding: 10px 15px;");
        assert!(lines[4].starts_with("  image"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(render_documents("{}").is_err());
    }
}
