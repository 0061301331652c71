//! Diagram model for the graphical editors

use serde::{Deserialize, Serialize};

/// Visual style of a shape or connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: String,
    pub font_size: u16,
}

impl ShapeStyle {
    /// House style for a diagram type
    #[must_use]
    pub fn default_for(diagram_type: &str) -> Self {
        match diagram_type {
            "storyboard" | "uimockup" => Self {
                fill: "#FFFFFF".into(),
                stroke: "#7F7F7F".into(),
                font_size: 11,
            },
            "usecase" | "usecasediagram" => Self {
                fill: "#FFFFE0".into(),
                stroke: "#5A5A5A".into(),
                font_size: 12,
            },
            _ => Self {
                fill: "#E6F0FA".into(),
                stroke: "#3C6E9F".into(),
                font_size: 12,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramShape {
    pub id: i32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub style: Option<ShapeStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConnection {
    pub id: i32,
    pub source_id: i32,
    pub target_id: i32,
    #[serde(default)]
    pub style: Option<ShapeStyle>,
}

/// Diagram payload of a graphical artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramModel {
    pub id: i32,
    pub diagram_type: String,
    #[serde(default)]
    pub shapes: Vec<DiagramShape>,
    #[serde(default)]
    pub connections: Vec<DiagramConnection>,
}

impl DiagramModel {
    /// Fill every missing style with the house style of the diagram type.
    /// Returns the number of elements styled.
    pub fn apply_default_styles(&mut self) -> usize {
        let style = ShapeStyle::default_for(&self.diagram_type.to_ascii_lowercase());
        let mut applied = 0;
        for shape in &mut self.shapes {
            if shape.style.is_none() {
                shape.style = Some(style.clone());
                applied += 1;
            }
        }
        for connection in &mut self.connections {
            if connection.style.is_none() {
                connection.style = Some(style.clone());
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_only_unstyled_elements() {
        let custom = ShapeStyle {
            fill: "#000000".into(),
            stroke: "#000000".into(),
            font_size: 8,
        };
        let mut diagram = DiagramModel {
            id: 3,
            diagram_type: "Storyboard".into(),
            shapes: vec![
                DiagramShape {
                    id: 1,
                    name: "Frame".into(),
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 60.0,
                    style: None,
                },
                DiagramShape {
                    id: 2,
                    name: "Styled".into(),
                    x: 120.0,
                    y: 0.0,
                    width: 100.0,
                    height: 60.0,
                    style: Some(custom.clone()),
                },
            ],
            connections: vec![DiagramConnection {
                id: 3,
                source_id: 1,
                target_id: 2,
                style: None,
            }],
        };

        assert_eq!(diagram.apply_default_styles(), 2);
        assert_eq!(diagram.shapes[0].style, Some(ShapeStyle::default_for("storyboard")));
        assert_eq!(diagram.shapes[1].style, Some(custom));
    }
}
