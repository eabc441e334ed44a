use serde::Serialize;
use strum::{AsRefStr, Display};

/// Semantic bucket of a drawing object, decided from its layer name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObjectCategory {
    PlotBoundary,
    Wall,
    Highway,
    Door,
    Window,
    Extension,
    Unclassified,
}

impl ObjectCategory {
    /// Categories whose members are kept as open linework.
    #[must_use]
    pub fn is_linework(self) -> bool {
        matches!(self, Self::Highway | Self::Door | Self::Window)
    }
}

/// Classifies a layer name by case-insensitive substring match.
///
/// Precedence: plot boundary, wall, highway, door, window, extension.
#[must_use]
pub fn classify(layer: &str) -> ObjectCategory {
    let layer = layer.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| layer.contains(k));

    if has(&["plot", "boundary", "curtilage"]) {
        ObjectCategory::PlotBoundary
    } else if has(&["wall"]) {
        ObjectCategory::Wall
    } else if has(&["highway", "road"]) {
        ObjectCategory::Highway
    } else if has(&["door"]) {
        ObjectCategory::Door
    } else if has(&["window"]) {
        ObjectCategory::Window
    } else if has(&["extension"]) {
        ObjectCategory::Extension
    } else {
        ObjectCategory::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive() {
        assert_eq!(classify("PLOT_BOUNDARY"), ObjectCategory::PlotBoundary);
        assert_eq!(classify("A-Wall-External"), ObjectCategory::Wall);
        assert_eq!(classify("Main Road"), ObjectCategory::Highway);
        assert_eq!(classify("front_DOOR"), ObjectCategory::Door);
        assert_eq!(classify("windows"), ObjectCategory::Window);
        assert_eq!(classify("rear extension"), ObjectCategory::Extension);
        assert_eq!(classify("dimensions"), ObjectCategory::Unclassified);
        assert_eq!(classify(""), ObjectCategory::Unclassified);
    }

    #[test]
    fn precedence_follows_order() {
        assert_eq!(classify("boundary_wall"), ObjectCategory::PlotBoundary);
        assert_eq!(classify("extension_walls"), ObjectCategory::Wall);
        assert_eq!(classify("road_door"), ObjectCategory::Highway);
        assert_eq!(classify("curtilage"), ObjectCategory::PlotBoundary);
    }

    #[test]
    fn linework_buckets() {
        assert!(ObjectCategory::Highway.is_linework());
        assert!(ObjectCategory::Window.is_linework());
        assert!(!ObjectCategory::Wall.is_linework());
        assert_eq!(ObjectCategory::PlotBoundary.to_string(), "plot_boundary");
    }
}
