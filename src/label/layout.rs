// Copyright 2023 Remi Bernotavicius

use super::preset::{GridConfig, PageSize};

/// Bottom-left corner of one label, in millimetres from the bottom-left of its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOrigin {
    pub page: usize,
    pub col: u32,
    pub row: u32,
    pub x: f32,
    pub y: f32,
}

pub fn cell_origin(grid: &GridConfig, page: &PageSize, index: usize) -> CellOrigin {
    let per_page = grid.per_page().max(1) as usize;
    let k = (index % per_page) as u32;
    let col = k % grid.cols.max(1);
    let row = k / grid.cols.max(1);
    let x = grid.margin_left + col as f32 * (grid.width + grid.gap_x);
    let y = page.height
        - grid.margin_top
        - (row + 1) as f32 * grid.height
        - row as f32 * grid.gap_y;
    CellOrigin {
        page: index / per_page,
        col,
        row,
        x,
        y,
    }
}

/// Places `count` labels, filling each page row by row before starting the next one.
pub fn paginate(grid: &GridConfig, page: &PageSize, count: usize) -> Vec<Vec<CellOrigin>> {
    let mut pages: Vec<Vec<CellOrigin>> = vec![];
    for index in 0..count {
        let origin = cell_origin(grid, page, index);
        if origin.page == pages.len() {
            pages.push(vec![]);
        }
        if let Some(current) = pages.last_mut() {
            current.push(origin);
        }
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::preset::{find_preset, A4};

    fn standard() -> GridConfig {
        find_preset("standard").unwrap().grid
    }

    #[test]
    fn ten_labels_on_two_pages() {
        let pages = paginate(&standard(), &A4, 10);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 8);
        assert_eq!(pages[1].len(), 2);
        assert!(pages[1].iter().all(|c| c.page == 1));
    }

    #[test]
    fn no_labels_no_pages() {
        assert!(paginate(&standard(), &A4, 0).is_empty());
    }

    #[test]
    fn exactly_full_page() {
        let pages = paginate(&standard(), &A4, 8);
        assert_eq!(pages.len(), 1);
        assert_eq!(cell_origin(&standard(), &A4, 8).page, 1);
    }

    #[test]
    fn cell_positions() {
        let grid = standard();

        let first = cell_origin(&grid, &A4, 0);
        assert_eq!((first.col, first.row), (0, 0));
        assert_eq!(first.x, 15.0);
        assert_eq!(first.y, 297.0 - 20.0 - 60.0);

        let second = cell_origin(&grid, &A4, 1);
        assert_eq!((second.col, second.row), (1, 0));
        assert_eq!(second.x, 15.0 + 90.0 + 10.0);
        assert_eq!(second.y, first.y);

        let third = cell_origin(&grid, &A4, 2);
        assert_eq!((third.col, third.row), (0, 1));
        assert_eq!(third.y, 297.0 - 20.0 - 2.0 * 60.0 - 8.0);

        let ninth = cell_origin(&grid, &A4, 8);
        assert_eq!((ninth.page, ninth.col, ninth.row), (1, 0, 0));
        assert_eq!(ninth.x, first.x);
        assert_eq!(ninth.y, first.y);
    }
}
