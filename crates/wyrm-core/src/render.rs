use crate::chain::{Chain, SegmentKind, SegmentPose};

/// One body segment's draw call for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStroke<'a> {
    pub chain: usize,
    pub index: usize,
    pub kind: SegmentKind,
    pub pose: SegmentPose,
    pub color: &'a str,
}

/// Receiver of per-segment poses. The engine only ever writes to it.
pub trait PoseSink {
    fn segment(&mut self, stroke: SegmentStroke<'_>);
}

impl<F> PoseSink for F
where
    F: FnMut(SegmentStroke<'_>),
{
    fn segment(&mut self, stroke: SegmentStroke<'_>) {
        self(stroke)
    }
}

pub(crate) fn emit_chain<S: PoseSink + ?Sized>(sink: &mut S, id: usize, chain: &Chain, color: &str) {
    for (offset, pose) in chain.poses().iter().enumerate() {
        let index = offset + 1;
        sink.segment(SegmentStroke {
            chain: id,
            index,
            kind: chain.kind(index),
            pose: *pose,
            color,
        });
    }
}
