//! 4×4 homogeneous matrices for reproducing CSS 3D transform placement.
//!
//! Column-vector convention: `m[row][col]`, points transform as `M · p`.
//! Composition order matches a CSS `transform` list read left to right.

use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f64; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][3] = x;
        out.m[1][3] = y;
        out.m[2][3] = z;
        out
    }

    /// CSS `perspective(d)`: `w' = w - z / d`.
    pub fn perspective(d: f64) -> Self {
        let mut out = Self::IDENTITY;
        if d > 0.0 {
            out.m[3][2] = -1.0 / d;
        }
        out
    }

    pub fn rotate_x(deg: f64) -> Self {
        let (s, c) = deg.to_radians().sin_cos();
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotate_y(deg: f64) -> Self {
        let (s, c) = deg.to_radians().sin_cos();
        Self {
            m: [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// CSS `rotate(a)`: rotation about the z axis.
    pub fn rotate_z(deg: f64) -> Self {
        let (s, c) = deg.to_radians().sin_cos();
        Self {
            m: [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// CSS `scale(s)`: uniform in x and y, z untouched.
    pub fn scale(s: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][0] = s;
        out.m[1][1] = s;
        out
    }

    /// Transform a point on the z = 0 plane and perspective-divide.
    /// `None` when the point ends up behind the viewer (w <= 0).
    pub fn project(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let p = [x, y, 0.0, 1.0];
        let row = |r: usize| (0..4).map(|c| self.m[r][c] * p[c]).sum::<f64>();
        let w = row(3);
        if w <= f64::EPSILON {
            return None;
        }
        Some((row(0) / w, row(1) / w))
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[r][k] * rhs.m[k][c]).sum();
            }
        }
        Mat4 { m: out }
    }
}
