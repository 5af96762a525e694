//! 2D canvas backend

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wasm_bindgen::JsCast;

use super::shapes::{DrawCmd, css_rgba, frame_commands};
use super::{FrameView, Renderer};
use crate::error::GameError;

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    /// Play-field to canvas pixel scale
    scale: f64,
}

impl CanvasRenderer {
    /// Size the canvas backing store for the device pixel ratio and grab a 2D context
    pub fn new(canvas: &HtmlCanvasElement, field_width: f32) -> Result<Self, GameError> {
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let client_w = canvas.client_width().max(1) as f64;
        let client_h = canvas.client_height().max(1) as f64;
        canvas.set_width((client_w * dpr) as u32);
        canvas.set_height((client_h * dpr) as u32);

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(GameError::MissingElement("2d context"))?;

        Ok(Self {
            ctx,
            scale: client_w * dpr / field_width as f64,
        })
    }
}

impl Renderer for CanvasRenderer {
    fn draw(&mut self, view: &FrameView<'_>) {
        let ctx = &self.ctx;
        let _ = ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0);
        let (w, h) = (view.tuning.canvas_width as f64, view.tuning.canvas_height as f64);

        for cmd in frame_commands(view) {
            match cmd {
                DrawCmd::Clear { color } => {
                    ctx.set_fill_style_str(&css_rgba(color, 1.0));
                    ctx.fill_rect(0.0, 0.0, w, h);
                }
                DrawCmd::Rect {
                    pos,
                    size,
                    color,
                    alpha,
                } => {
                    ctx.set_fill_style_str(&css_rgba(color, alpha));
                    ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                }
                DrawCmd::Circle {
                    center,
                    radius,
                    color,
                    alpha,
                } => {
                    ctx.set_fill_style_str(&css_rgba(color, alpha));
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        radius.max(0.0) as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.fill();
                }
            }
        }
    }
}
