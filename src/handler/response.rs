use crate::foundation::core::{Canvas, Rgba16};

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const INTERNAL: u16 = 500;

/// Drawable surface handed to a widget handler, plus the status channel.
///
/// Handlers are expected to call [`Response::write`] exactly once. Only a `200` response is
/// composited onto the frame.
pub trait Response {
    /// Record the outcome. The last write wins.
    fn write(&mut self, status: u16, message: &str);

    fn canvas(&self) -> &Canvas;

    fn canvas_mut(&mut self) -> &mut Canvas;

    fn bounds(&self) -> (u32, u32) {
        self.canvas().dimensions()
    }

    /// Read one pixel, transparent when out of bounds.
    fn pixel(&self, x: u32, y: u32) -> Rgba16 {
        self.canvas()
            .get_pixel_checked(x, y)
            .copied()
            .unwrap_or(image::Rgba([0; 4]))
    }

    /// Write one pixel, ignoring out-of-bounds coordinates.
    fn set_pixel(&mut self, x: u32, y: u32, px: Rgba16) {
        if let Some(dst) = self.canvas_mut().get_pixel_mut_checked(x, y) {
            *dst = px;
        }
    }
}

/// The response the compositor hands to each widget.
#[derive(Clone, Debug)]
pub struct WidgetResponse {
    canvas: Canvas,
    status: u16,
    message: String,
}

impl WidgetResponse {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            status: 0,
            message: String::new(),
        }
    }

    /// `0` until a handler writes.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }
}

impl Response for WidgetResponse {
    fn write(&mut self, status: u16, message: &str) {
        self.status = status;
        self.message = message.to_string();
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }
}
