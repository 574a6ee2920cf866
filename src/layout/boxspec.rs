use crate::layout::unit::Dimension;

/// Declarative placement of one widget.
///
/// Per axis the far edge is chosen by precedence `x2`/`y2`, then `width`/`height`, then one grid
/// unit. `x` and `y` are required unless `useAlias` or `useGridKey` redirects resolution.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBox {
    /// Reuse the placement published under this alias earlier in the frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_alias: Option<String>,
    /// Delegate to the named-key table when the value looks like `key:<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_grid_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x2: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y2: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<Dimension>,

    // Reserved: alignment does not take part in size math yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_alignment: Option<String>,
}

impl LayoutBox {
    /// Box anchored at `(x, y)` with the default one-cell extent.
    pub fn at(x: Dimension, y: Dimension) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Box that reuses a previously published alias.
    pub fn alias_of(name: impl Into<String>) -> Self {
        Self {
            use_alias: Some(name.into()),
            ..Self::default()
        }
    }

    /// Box that delegates to a named key.
    pub fn grid_key(key: impl Into<String>) -> Self {
        Self {
            use_grid_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_end(mut self, x2: Dimension, y2: Dimension) -> Self {
        self.x2 = Some(x2);
        self.y2 = Some(y2);
        self
    }

    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_border_radius(mut self, radius: Dimension) -> Self {
        self.border_radius = Some(radius);
        self
    }
}

/// A box plus the alias its resolved placement is published under.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    /// Empty means "do not publish".
    #[serde(default)]
    pub alias: String,
    #[serde(rename = "box", default)]
    pub layout: LayoutBox,
}

impl Location {
    pub fn new(layout: LayoutBox) -> Self {
        Self {
            alias: String::new(),
            layout,
        }
    }

    pub fn aliased(alias: impl Into<String>, layout: LayoutBox) -> Self {
        Self {
            alias: alias.into(),
            layout,
        }
    }
}
