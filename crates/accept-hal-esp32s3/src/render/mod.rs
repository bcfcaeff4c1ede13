pub mod status;

use accept_core::render::StatusView;
use gc9107::FrameBuffer;

pub trait FrameRenderer {
    fn render(&mut self, view: &StatusView, frame: &mut FrameBuffer);
}
