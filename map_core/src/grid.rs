use crate::config::GridConfig;
use crate::surface::{DisplayPoint, LineStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub points: [DisplayPoint; 2],
    pub style: LineStyle,
}

/// Static grid overlay: one line per `spacing` blocks across `±extent`,
/// constant-x lines first, then constant-z lines, then the two axes.
///
/// A non-positive spacing or extent yields only the axes.
pub fn grid_lines(config: &GridConfig) -> Vec<GridLine> {
    let extent = config.extent.max(0);
    let mut lines = Vec::new();

    if config.spacing > 0 && extent > 0 {
        let steps: Vec<i64> = (-extent..=extent)
            .step_by(config.spacing as usize)
            .collect();
        for &x in &steps {
            lines.push(GridLine {
                points: [
                    DisplayPoint::from_world(x, extent),
                    DisplayPoint::from_world(x, -extent),
                ],
                style: LineStyle::GRID,
            });
        }
        for &z in &steps {
            lines.push(GridLine {
                points: [
                    DisplayPoint::from_world(-extent, z),
                    DisplayPoint::from_world(extent, z),
                ],
                style: LineStyle::GRID,
            });
        }
    }

    // x axis (z = 0), then z axis (x = 0)
    lines.push(GridLine {
        points: [
            DisplayPoint::from_world(-extent, 0),
            DisplayPoint::from_world(extent, 0),
        ],
        style: LineStyle::AXIS,
    });
    lines.push(GridLine {
        points: [
            DisplayPoint::from_world(0, -extent),
            DisplayPoint::from_world(0, extent),
        ],
        style: LineStyle::AXIS,
    });
    lines
}
