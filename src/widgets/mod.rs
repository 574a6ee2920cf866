//! Built-in widgets.

use serde_json::json;

use crate::foundation::core::parse_hex_colour;
use crate::handler::chain::Handler;
use crate::handler::registry::HandlerRegistry;
use crate::handler::request::Request;
use crate::handler::response::{BAD_REQUEST, OK, Response};
use crate::render::composite::fill;

pub use crate::render::compositor::CANVAS_OPTIONS_TYPE;

pub const FILL_TYPE: &str = "builtin.fill";

/// Solid colour over the whole widget area.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Fill {
    pub fill: String,
}

impl Fill {
    pub fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "fill": {
                    "type": "string",
                    "pattern": "^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$"
                }
            },
            "required": ["fill"]
        })
    }
}

impl Handler for Fill {
    fn handle(&self, resp: &mut dyn Response, _req: &Request) {
        match parse_hex_colour(&self.fill) {
            Ok(colour) => {
                fill(resp.canvas_mut(), colour);
                resp.write(OK, "success");
            }
            Err(e) => resp.write(BAD_REQUEST, &e.to_string()),
        }
    }
}

/// Register every built-in widget type.
pub fn register_builtins(registry: &mut HandlerRegistry) {
    registry.register_type::<Fill>(FILL_TYPE, Fill::schema());
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/mod.rs"]
mod tests;
