//! Board drawing

use macroquad::prelude::*;
use shared::Point;

/// Pixels per grid cell.
pub const CELL_PX: f32 = 15.0;

pub struct Renderer {
    cell: f32,
}

impl Renderer {
    pub fn new(cell: f32) -> Self {
        Self { cell }
    }

    pub fn draw_board(&self, local: &[Point], remote: Option<&[Point]>, fruit: Point) {
        clear_background(Color::from_rgba(50, 50, 50, 255));

        self.draw_cell(fruit, Color::from_rgba(255, 100, 100, 255));

        for segment in local {
            self.draw_cell(*segment, Color::from_rgba(0, 100, 0, 255));
        }

        if let Some(remote) = remote {
            for segment in remote {
                self.draw_cell(*segment, Color::from_rgba(0, 0, 100, 255));
            }
        }
    }

    fn draw_cell(&self, cell: Point, color: Color) {
        draw_rectangle(
            cell.x as f32 * self.cell,
            cell.y as f32 * self.cell,
            self.cell,
            self.cell,
            color,
        );
    }

    /// Large centered banner, used for the join wait and the game-over
    /// screen.
    pub fn draw_banner(&self, text: &str) {
        let font_size = 64.0;
        let dims = measure_text(text, None, font_size as u16, 1.0);
        draw_text(
            text,
            (screen_width() - dims.width) / 2.0,
            (screen_height() + dims.height) / 2.0,
            font_size,
            Color::from_rgba(200, 200, 200, 255),
        );
    }
}
