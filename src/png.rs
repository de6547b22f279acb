// src/png.rs
//! Превью карты в PNG: каждый тайл рисуется квадратом `tile_size × tile_size`

use crate::grid::TileGrid;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Рисует сетку в RGBA-изображение
#[must_use]
pub fn to_rgba_image(grid: &TileGrid, tile_size: u32) -> RgbaImage {
    let tile_size = tile_size.max(1);
    let mut img = RgbaImage::new(grid.cols() as u32 * tile_size, grid.rows() as u32 * tile_size);

    for tile in grid.tiles() {
        let [r, g, b] = tile.kind().to_rgb();
        let rect = Rect::at((tile.col as u32 * tile_size) as i32, (tile.row as u32 * tile_size) as i32)
            .of_size(tile_size, tile_size);
        draw_filled_rect_mut(&mut img, rect, Rgba([r, g, b, 255]));
    }
    img
}

pub fn save_as_png(grid: &TileGrid, tile_size: u32, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if grid.is_empty() {
        return Err("Cannot render an empty grid".into());
    }
    to_rgba_image(grid, tile_size).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    #[test]
    fn every_tile_becomes_a_solid_square() {
        let mut grid = TileGrid::filled(3, 4, TileKind::Empty);
        grid.enclose();
        grid.set_kind(1, 2, TileKind::Water);

        let img = to_rgba_image(&grid, 4);
        assert_eq!(img.dimensions(), (16, 12));

        let [r, g, b] = TileKind::Water.to_rgb();
        for y in 4..8 {
            for x in 8..12 {
                assert_eq!(*img.get_pixel(x, y), Rgba([r, g, b, 255]));
            }
        }
        let [r, g, b] = TileKind::Stone.to_rgb();
        assert_eq!(*img.get_pixel(0, 0), Rgba([r, g, b, 255]));
        let [r, g, b] = TileKind::Empty.to_rgb();
        assert_eq!(*img.get_pixel(5, 5), Rgba([r, g, b, 255]));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let grid = TileGrid::new(0, 0);
        assert!(save_as_png(&grid, 8, "unused.png").is_err());
    }
}
