use egui::{pos2, Color32, Painter, Pos2, Shape, Stroke};
use wyrm_core::{PoseSink, SegmentKind, SegmentPose, SegmentStroke};

// Sprite outlines in local units, nose along -x.
const HEAD: [[f32; 2]; 5] = [[-30.0, 0.0], [-8.0, -16.0], [18.0, -12.0], [18.0, 12.0], [-8.0, 16.0]];
const EYES: [[f32; 2]; 2] = [[-6.0, -7.0], [-6.0, 7.0]];
const FIN: [[f32; 2]; 3] = [[-10.0, 0.0], [12.0, -42.0], [18.0, -4.0]];
const SPINE: [[f32; 2]; 4] = [[-20.0, 0.0], [0.0, -12.0], [20.0, 0.0], [0.0, 12.0]];

const OUTLINE: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 160);

/// Draws segment strokes with the egui painter of the current frame.
pub struct EguiSink<'a> {
    painter: &'a Painter,
}

impl<'a> EguiSink<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

impl PoseSink for EguiSink<'_> {
    fn segment(&mut self, stroke: SegmentStroke<'_>) {
        let fill = Color32::from_hex(stroke.color).unwrap_or(Color32::WHITE);
        let outline = Stroke::new(1.0, OUTLINE);
        let place = |points: &[[f32; 2]], mirror: bool| -> Vec<Pos2> {
            points
                .iter()
                .map(|&[x, y]| to_screen(&stroke.pose, x, if mirror { -y } else { y }))
                .collect()
        };

        match stroke.kind {
            SegmentKind::Head => {
                self.painter.add(Shape::convex_polygon(place(&HEAD, false), fill, outline));
                let radius = (2.5 * stroke.pose.scale).max(1.0);
                for eye in place(&EYES, false) {
                    self.painter.circle_filled(eye, radius, Color32::BLACK);
                }
            }
            SegmentKind::Fin => {
                for mirror in [false, true] {
                    self.painter.add(Shape::convex_polygon(place(&FIN, mirror), fill, outline));
                }
            }
            SegmentKind::Spine => {
                self.painter.add(Shape::convex_polygon(place(&SPINE, false), fill, outline));
            }
        }
    }
}

/// Rotate, scale, then translate a local sprite point into screen space.
fn to_screen(pose: &SegmentPose, x: f32, y: f32) -> Pos2 {
    let (sin, cos) = pose.angle_deg.to_radians().sin_cos();
    let (x, y) = (x * pose.scale, y * pose.scale);
    pos2(
        pose.anchor.x + x * cos - y * sin,
        pose.anchor.y + x * sin + y * cos,
    )
}
