/// Square-ish grid the tiles are laid out on.
///
/// `per_row = ceil(sqrt(n))` columns, as many rows as needed; tile `i` sits at
/// row `i / per_row`, column `i % per_row`. Rendering and keyboard navigation
/// both go through this type so they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub per_row: usize,
    pub rows: usize,
    count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl GridLayout {
    pub fn new(count: usize) -> Self {
        if count == 0 {
            return Self {
                per_row: 1,
                rows: 0,
                count,
            };
        }

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let per_row = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(per_row);

        Self {
            per_row,
            rows,
            count,
        }
    }

    /// `(row, column)` of a tile.
    pub fn position(&self, idx: usize) -> (usize, usize) {
        (idx / self.per_row, idx % self.per_row)
    }

    /// Tile at a grid cell, if that cell holds one.
    pub fn index_at(&self, row: usize, col: usize) -> Option<usize> {
        if col >= self.per_row {
            return None;
        }
        let idx = row * self.per_row + col;
        (idx < self.count).then_some(idx)
    }

    /// Tile reached by moving one cell from `idx`; stays put at the edges.
    pub fn neighbor(&self, idx: usize, direction: Direction) -> usize {
        let (row, col) = self.position(idx);
        let target = match direction {
            Direction::Left => col.checked_sub(1).and_then(|c| self.index_at(row, c)),
            Direction::Right => self.index_at(row, col + 1),
            Direction::Up => row.checked_sub(1).and_then(|r| self.index_at(r, col)),
            Direction::Down => self.index_at(row + 1, col),
        };
        target.unwrap_or(idx)
    }

    /// Character width available to one tile on a terminal `width` columns wide.
    pub fn tile_width(&self, width: usize) -> usize {
        // Each column costs 3 characters of border and padding, plus the outer edge.
        (width.saturating_sub(1) / self.per_row).saturating_sub(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod new {
        use super::*;

        #[test]
        fn empty_grid_has_one_column() {
            let layout = GridLayout::new(0);
            assert_eq!(layout.per_row, 1);
            assert_eq!(layout.rows, 0);
        }

        #[test]
        fn perfect_square() {
            let layout = GridLayout::new(9);
            assert_eq!((layout.per_row, layout.rows), (3, 3));
        }

        #[test]
        fn rounds_columns_up() {
            let layout = GridLayout::new(5);
            assert_eq!((layout.per_row, layout.rows), (3, 2));
        }

        #[test]
        fn single_tile() {
            let layout = GridLayout::new(1);
            assert_eq!((layout.per_row, layout.rows), (1, 1));
        }

        #[test]
        fn drops_empty_trailing_row() {
            // ceil(sqrt(10)) = 4 columns, 10 tiles fit in 3 rows
            let layout = GridLayout::new(10);
            assert_eq!((layout.per_row, layout.rows), (4, 3));
        }
    }

    mod index_at {
        use super::*;

        #[test]
        fn maps_row_and_column_to_index() {
            let layout = GridLayout::new(5);
            assert_eq!(layout.index_at(0, 0), Some(0));
            assert_eq!(layout.index_at(1, 1), Some(4));
            assert_eq!(layout.position(4), (1, 1));
        }

        #[test]
        fn empty_cells_are_none() {
            let layout = GridLayout::new(5);
            assert_eq!(layout.index_at(1, 2), None);
            assert_eq!(layout.index_at(0, 3), None);
        }
    }

    mod neighbor {
        use super::*;

        #[test]
        fn moves_within_grid() {
            let layout = GridLayout::new(9);
            assert_eq!(layout.neighbor(4, Direction::Left), 3);
            assert_eq!(layout.neighbor(4, Direction::Right), 5);
            assert_eq!(layout.neighbor(4, Direction::Up), 1);
            assert_eq!(layout.neighbor(4, Direction::Down), 7);
        }

        #[test]
        fn stays_at_edges() {
            let layout = GridLayout::new(9);
            assert_eq!(layout.neighbor(0, Direction::Left), 0);
            assert_eq!(layout.neighbor(0, Direction::Up), 0);
            assert_eq!(layout.neighbor(2, Direction::Right), 2, "no wrap to next row");
            assert_eq!(layout.neighbor(8, Direction::Down), 8);
        }

        #[test]
        fn does_not_move_into_empty_cell() {
            let layout = GridLayout::new(5);
            assert_eq!(layout.neighbor(2, Direction::Down), 2);
            assert_eq!(layout.neighbor(4, Direction::Right), 4);
        }
    }

    #[test]
    fn tile_width_splits_terminal() {
        assert_eq!(GridLayout::new(4).tile_width(81), 37);
        assert_eq!(GridLayout::new(4).tile_width(0), 0);
    }
}
