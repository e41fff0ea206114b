//! Placement record → ordered render layers.
//!
//! Stacking is fixed: outer box, 3D transform, frame, mat, image. The
//! transform wraps everything inside the box and pivots on the box center.
//! Frame and mat are padding layers, so showing them shrinks the image
//! rather than growing the box.

use crate::matrix::Mat4;
use crate::model::{Color, MatStyle, PlacementRecord, Position, Size};
use smallvec::SmallVec;
use std::fmt::Write;

/// One entry of a CSS-style transform list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Perspective(f64),
    RotateX(f64),
    RotateY(f64),
    Rotate(f64),
    Scale(f64),
}

impl TransformOp {
    pub fn to_css(&self) -> String {
        match self {
            TransformOp::Perspective(px) => format!("perspective({px}px)"),
            TransformOp::RotateX(deg) => format!("rotateX({deg}deg)"),
            TransformOp::RotateY(deg) => format!("rotateY({deg}deg)"),
            TransformOp::Rotate(deg) => format!("rotate({deg}deg)"),
            TransformOp::Scale(s) => format!("scale({s})"),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match *self {
            TransformOp::Perspective(px) => Mat4::perspective(px),
            TransformOp::RotateX(deg) => Mat4::rotate_x(deg),
            TransformOp::RotateY(deg) => Mat4::rotate_y(deg),
            TransformOp::Rotate(deg) => Mat4::rotate_z(deg),
            TransformOp::Scale(s) => Mat4::scale(s),
        }
    }
}

/// A background-filled padding layer (frame or mat).
/// `vertical` pads top/bottom, `horizontal` pads left/right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddingLayer {
    pub vertical: f64,
    pub horizontal: f64,
    pub background: Color,
}

impl PaddingLayer {
    pub fn css(&self) -> String {
        format!(
            "background-color: {}; padding: {}px {}px;",
            self.background.to_hex(),
            self.vertical,
            self.horizontal
        )
    }
}

/// A layer of the render stack, outermost first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer<'a> {
    OuterBox { position: Position, size: Size },
    Transform(&'a [TransformOp]),
    Frame(&'a PaddingLayer),
    Mat(&'a PaddingLayer),
    Image(&'a str),
}

/// Everything needed to reproduce one artwork's visual placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub position: Position,
    pub size: Size,
    pub transform: SmallVec<[TransformOp; 5]>,
    pub frame: Option<PaddingLayer>,
    pub mat: Option<PaddingLayer>,
    pub image: String,
}

/// Derive the render stack for a record.
pub fn derive_render_transform(record: &PlacementRecord) -> RenderPlan {
    let t = &record.transform3d;
    let transform = SmallVec::from_buf([
        TransformOp::Perspective(t.perspective),
        TransformOp::RotateX(t.rotate_x),
        TransformOp::RotateY(t.rotate_y),
        TransformOp::Rotate(t.rotation),
        TransformOp::Scale(t.scale),
    ]);
    let frame = record.frame.show.then_some(PaddingLayer {
        vertical: record.frame.height,
        horizontal: record.frame.width,
        background: record.frame.color,
    });
    let mat = record.mat.show.then_some(PaddingLayer {
        vertical: record.mat.height,
        horizontal: record.mat.width,
        background: MatStyle::COLOR,
    });

    RenderPlan {
        position: record.position,
        size: record.size,
        transform,
        frame,
        mat,
        image: record.image.as_str().to_string(),
    }
}

impl RenderPlan {
    /// Layers outermost first. The order is part of the contract.
    pub fn layers(&self) -> Vec<Layer<'_>> {
        let mut layers = vec![
            Layer::OuterBox {
                position: self.position,
                size: self.size,
            },
            Layer::Transform(&self.transform),
        ];
        if let Some(frame) = &self.frame {
            layers.push(Layer::Frame(frame));
        }
        if let Some(mat) = &self.mat {
            layers.push(Layer::Mat(mat));
        }
        layers.push(Layer::Image(&self.image));
        layers
    }

    /// e.g. `perspective(1000px) rotateX(0deg) rotateY(0deg) rotate(0deg) scale(1)`
    pub fn transform_css(&self) -> String {
        let ops: Vec<String> = self.transform.iter().map(TransformOp::to_css).collect();
        ops.join(" ")
    }

    /// CSS declarations for the outer box.
    pub fn box_css(&self) -> String {
        format!(
            "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px;",
            self.position.x, self.position.y, self.size.width, self.size.height
        )
    }

    /// One CSS declaration block per layer, outermost first.
    pub fn layer_css(&self) -> Vec<String> {
        self.layers()
            .into_iter()
            .map(|layer| match layer {
                Layer::OuterBox { .. } => self.box_css(),
                Layer::Transform(_) => {
                    let mut css = String::from("width: 100%; height: 100%; transform-origin: 50% 50%; ");
                    let _ = write!(css, "transform: {};", self.transform_css());
                    css
                }
                Layer::Frame(p) | Layer::Mat(p) => p.css(),
                Layer::Image(src) => format!("background-image: url({src}); object-fit: contain;"),
            })
            .collect()
    }

    /// Content box left for the image after frame and mat padding,
    /// relative to the outer box. Sides clamp at zero.
    pub fn image_box(&self) -> (Position, Size) {
        let (mut x, mut y) = (0.0, 0.0);
        let (mut w, mut h) = (self.size.width, self.size.height);
        for pad in self.frame.iter().chain(self.mat.iter()) {
            x += pad.horizontal;
            y += pad.vertical;
            w -= 2.0 * pad.horizontal;
            h -= 2.0 * pad.vertical;
        }
        (Position::new(x, y), Size::new(w.max(0.0), h.max(0.0)))
    }

    /// Combined matrix in canvas space: the transform list applied around
    /// the box center, then offset by the box position.
    pub fn matrix(&self) -> Mat4 {
        let cx = self.position.x + self.size.width / 2.0;
        let cy = self.position.y + self.size.height / 2.0;
        let list = self
            .transform
            .iter()
            .fold(Mat4::IDENTITY, |acc, op| acc * op.matrix());
        Mat4::translate(cx, cy, 0.0) * list * Mat4::translate(-cx, -cy, 0.0)
    }

    /// Box corners after the transform, clockwise from top-left.
    /// `None` if any corner falls behind the viewer.
    pub fn projected_corners(&self) -> Option<[(f64, f64); 4]> {
        let m = self.matrix();
        let (x0, y0) = (self.position.x, self.position.y);
        let (x1, y1) = (x0 + self.size.width, y0 + self.size.height);
        Some([
            m.project(x0, y0)?,
            m.project(x1, y0)?,
            m.project(x1, y1)?,
            m.project(x0, y1)?,
        ])
    }
}
