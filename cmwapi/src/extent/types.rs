//! Extent type definitions

use crate::coord::Bounds;

/// Camera resolution assumed by the altitude/scale model.
pub const DPI: f64 = 120.0;

/// Inches per meter used when converting ground distance to screen scale.
pub const INCHES_PER_METER: f64 = 39.37;

/// A geographic bounding region.
pub type Extent = Bounds;

/// The shape of a render-engine layer, as far as extent computation is
/// concerned.
///
/// Layers either group other layers, hold a set of positioned images, or
/// expose a single full extent (which may be unknown until loaded).
#[derive(Debug, Clone, PartialEq)]
pub enum LayerShape {
    /// A layer made of sub-layers
    Composite(Vec<LayerShape>),
    /// A layer made of images, each with its own extent
    ImageSet(Vec<Extent>),
    /// A plain layer with one extent
    Single(Option<Extent>),
}
