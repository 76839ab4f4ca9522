//! # Page Grid
//!
//! Maps a flat record index to a card box on a page.
//!
//! Slots fill row by row: index `i` goes to column `(i mod cpp) mod cols`,
//! row `(i mod cpp) div cols` of page `i div cpp`, where `cpp` is
//! cards per page. Column and row boxes are either an even division of the
//! page inside the margins or fixed positions measured off pre-printed
//! stock. On top of that each half of the grid has its own calibration
//! shift, since paper-feed skew differs between the top and bottom of a
//! sheet.

use crate::config::LayoutConfig;
use crate::error::LabelError;
use crate::layout::Point;

/// Horizontal anchoring of columns.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnLayout {
    /// Page width inside `margin` split into equal boxes.
    Even { margin: f64 },
    /// One measured centre per column, all cards `card_width` wide.
    Fixed { centers: Vec<f64>, card_width: f64 },
}

/// Vertical anchoring of rows.
#[derive(Debug, Clone, PartialEq)]
pub enum RowLayout {
    /// Page height inside `margin` split into equal boxes.
    Even { margin: f64 },
    /// One measured top edge per row (distance down from the page top).
    Fixed { tops: Vec<f64>, card_height: f64 },
}

/// Calibration shift for one half of the grid. Positive `dy` moves up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shift {
    pub dx: f64,
    pub dy: f64,
}

/// Resolved grid geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub page_width: f64,
    pub page_height: f64,
    pub columns: usize,
    pub rows: usize,
    pub column_layout: ColumnLayout,
    pub row_layout: RowLayout,
    pub top_shift: Shift,
    pub bottom_shift: Shift,
}

/// Where one record's card goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardAnchor {
    pub page: usize,
    pub column: usize,
    pub row: usize,
    /// Bottom-left corner of the box in page space.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl GridSpec {
    pub fn from_config(config: &LayoutConfig) -> Result<Self, LabelError> {
        let columns = grid_dimension(config, "grid_columns")?;
        let rows = grid_dimension(config, "grid_rows")?;
        if columns
            .checked_mul(rows)
            .map_or(true, |cards| cards > MAX_CARDS_PER_PAGE)
        {
            return Err(LabelError::InvalidGrid {
                columns: columns as f64,
                rows: rows as f64,
            });
        }

        let column_layout = match config.keyword("column_mode", &["even", "fixed"])? {
            "fixed" => ColumnLayout::Fixed {
                centers: (1..=columns)
                    .map(|i| config.length(&format!("column_center_{}", i)))
                    .collect::<Result<_, _>>()?,
                card_width: positive_length(config, "card_width")?,
            },
            _ => ColumnLayout::Even {
                margin: config.length("margin_x")?,
            },
        };

        let row_layout = match config.keyword("row_mode", &["even", "fixed"])? {
            "fixed" => RowLayout::Fixed {
                tops: (1..=rows)
                    .map(|j| config.length(&format!("row_top_{}", j)))
                    .collect::<Result<_, _>>()?,
                card_height: positive_length(config, "card_height")?,
            },
            _ => RowLayout::Even {
                margin: config.length("margin_y")?,
            },
        };

        Ok(Self {
            page_width: positive_length(config, "page_width")?,
            page_height: positive_length(config, "page_height")?,
            columns,
            rows,
            column_layout,
            row_layout,
            top_shift: Shift {
                dx: config.length("top_dx")?,
                dy: config.length("top_dy")?,
            },
            bottom_shift: Shift {
                dx: config.length("bottom_dx")?,
                dy: config.length("bottom_dy")?,
            },
        })
    }

    pub fn cards_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Number of pages needed for `records` cards.
    pub fn page_count(&self, records: usize) -> usize {
        records.div_ceil(self.cards_per_page())
    }

    /// True when record `index` starts a new page (other than the first).
    pub fn starts_page(&self, index: usize) -> bool {
        index > 0 && index % self.cards_per_page() == 0
    }

    /// Row `r` belongs to the top half iff `2r < rows`.
    pub fn is_top_half(&self, row: usize) -> bool {
        2 * row < self.rows
    }

    /// Card box for record `index`.
    pub fn place(&self, index: usize) -> CardAnchor {
        let cpp = self.cards_per_page();
        let slot = index % cpp;
        let column = slot % self.columns;
        let row = slot / self.columns;
        let (x, y, width, height) = self.slot_box(column, row);
        CardAnchor {
            page: index / cpp,
            column,
            row,
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    /// (x, y, width, height) of a slot, calibration shift included.
    fn slot_box(&self, column: usize, row: usize) -> (f64, f64, f64, f64) {
        let (x, width) = match &self.column_layout {
            ColumnLayout::Even { margin } => {
                let w = (self.page_width - 2.0 * margin) / self.columns as f64;
                (margin + column as f64 * w, w)
            }
            ColumnLayout::Fixed {
                centers,
                card_width,
            } => (centers[column] - card_width / 2.0, *card_width),
        };
        let (y, height) = match &self.row_layout {
            RowLayout::Even { margin } => {
                let h = (self.page_height - 2.0 * margin) / self.rows as f64;
                (self.page_height - margin - (row + 1) as f64 * h, h)
            }
            RowLayout::Fixed { tops, card_height } => {
                (self.page_height - tops[row] - card_height, *card_height)
            }
        };
        let shift = if self.is_top_half(row) {
            self.top_shift
        } else {
            self.bottom_shift
        };
        (x + shift.dx, y + shift.dy, width, height)
    }

    /// Height of the shortest card box on the page.
    pub fn min_card_height(&self) -> f64 {
        (0..self.rows)
            .map(|row| self.slot_box(0, row).3)
            .fold(f64::INFINITY, f64::min)
    }

    /// Every slot box must be non-empty and lie on the page.
    pub fn validate(&self) -> Result<(), LabelError> {
        const EPSILON: f64 = 1e-6;
        for row in 0..self.rows {
            for column in 0..self.columns {
                let (x, y, width, height) = self.slot_box(column, row);
                let outside = width <= 0.0
                    || height <= 0.0
                    || x < -EPSILON
                    || y < -EPSILON
                    || x + width > self.page_width + EPSILON
                    || y + height > self.page_height + EPSILON;
                if outside {
                    return Err(LabelError::OutOfBounds {
                        slot: row * self.columns + column,
                        x,
                        y,
                        width,
                        height,
                        page_width: self.page_width,
                        page_height: self.page_height,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Upper bound on `columns x rows`.
pub const MAX_CARDS_PER_PAGE: usize = 10_000;

fn grid_dimension(config: &LayoutConfig, name: &str) -> Result<usize, LabelError> {
    let columns = config.number("grid_columns")?;
    let rows = config.number("grid_rows")?;
    let value = config.number(name)?;
    if value < 1.0 || value.fract() != 0.0 || value > MAX_CARDS_PER_PAGE as f64 {
        return Err(LabelError::InvalidGrid { columns, rows });
    }
    Ok(value as usize)
}

fn positive_length(config: &LayoutConfig, name: &str) -> Result<f64, LabelError> {
    let v = config.length(name)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(LabelError::invalid(name, format!("must be positive, got {}", v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::mm;

    fn preset_grid() -> GridSpec {
        GridSpec::from_config(&LayoutConfig::preset()).unwrap()
    }

    #[test]
    fn test_preset_is_a4_three_by_two() {
        let grid = preset_grid();
        assert!((grid.page_width - mm(210.0)).abs() < 1e-9);
        assert!((grid.page_height - mm(297.0)).abs() < 1e-9);
        assert_eq!(grid.cards_per_page(), 6);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_placement_indices() {
        let grid = preset_grid();
        for i in 0..40 {
            let a = grid.place(i);
            assert_eq!(a.column, (i % 6) % 3);
            assert_eq!(a.row, (i % 6) / 3);
            assert_eq!(a.page, i / 6);
        }
    }

    #[test]
    fn test_page_count_and_breaks() {
        let grid = preset_grid();
        assert_eq!(grid.page_count(0), 0);
        assert_eq!(grid.page_count(6), 1);
        assert_eq!(grid.page_count(7), 2);
        assert!(!grid.starts_page(0));
        assert!(grid.starts_page(6));
        assert!(!grid.starts_page(7));
        assert!(grid.starts_page(12));
    }

    #[test]
    fn test_even_boxes_tile_the_page() {
        let mut config = LayoutConfig::preset();
        config.set("top_dy", 0.0);
        config.set("bottom_dy", 0.0);
        let grid = GridSpec::from_config(&config).unwrap();
        let first = grid.place(0);
        let last = grid.place(5);
        assert!((first.origin.x - 20.0).abs() < 1e-9);
        assert!((first.origin.y + first.height - (grid.page_height - 20.0)).abs() < 1e-9);
        assert!((last.origin.x + last.width - (grid.page_width - 20.0)).abs() < 1e-9);
        assert!((last.origin.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_shifts_apply_per_row() {
        let mut config = LayoutConfig::preset();
        config.set("top_dx", 3.0);
        config.set("top_dy", 0.0);
        config.set("bottom_dx", 0.0);
        config.set("bottom_dy", 5.0);
        let shifted = GridSpec::from_config(&config).unwrap();
        config.set("top_dx", 0.0);
        config.set("bottom_dy", 0.0);
        let plain = GridSpec::from_config(&config).unwrap();

        let (top, top0) = (shifted.place(1), plain.place(1));
        assert!((top.origin.x - top0.origin.x - 3.0).abs() < 1e-9);
        assert_eq!(top.origin.y, top0.origin.y);

        let (bottom, bottom0) = (shifted.place(4), plain.place(4));
        assert_eq!(bottom.origin.x, bottom0.origin.x);
        assert!((bottom.origin.y - bottom0.origin.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_half_rule_odd_rows() {
        let mut config = LayoutConfig::preset();
        config.set("grid_rows", 3.0);
        let grid = GridSpec::from_config(&config).unwrap();
        assert!(grid.is_top_half(0));
        assert!(grid.is_top_half(1));
        assert!(!grid.is_top_half(2));
    }

    #[test]
    fn test_fixed_columns_and_rows() {
        let mut config = LayoutConfig::preset();
        config.set("column_mode", "fixed");
        config.set("column_center_1_cm", 3.5);
        config.set("column_center_2_cm", 10.5);
        config.set("column_center_3_cm", 17.5);
        config.set("card_width_cm", 6.0);
        config.set("row_mode", "fixed");
        config.set("row_top_1_cm", 2.0);
        config.set("row_top_2_cm", 15.0);
        config.set("card_height_cm", 12.0);
        config.set("top_dy", 0.0);
        config.set("bottom_dy", 0.0);
        let grid = GridSpec::from_config(&config).unwrap();
        grid.validate().unwrap();

        let a = grid.place(4);
        assert!((a.origin.x - mm(105.0 - 30.0)).abs() < 1e-6);
        assert!((a.width - mm(60.0)).abs() < 1e-6);
        assert!((a.origin.y - (mm(297.0) - mm(150.0) - mm(120.0))).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_mode_missing_center_is_configuration_error() {
        let mut config = LayoutConfig::preset();
        config.set("column_mode", "fixed");
        config.set("column_center_1", 100.0);
        config.set("card_width", 150.0);
        let err = GridSpec::from_config(&config).unwrap_err();
        assert!(matches!(err, LabelError::MissingOption(ref n) if n == "column_center_2"));
    }

    #[test]
    fn test_invalid_grid_shape() {
        let mut config = LayoutConfig::preset();
        config.set("grid_columns", 0.0);
        assert!(matches!(
            GridSpec::from_config(&config),
            Err(LabelError::InvalidGrid { .. })
        ));
        config.set("grid_columns", 2.5);
        assert!(matches!(
            GridSpec::from_config(&config),
            Err(LabelError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let mut config = LayoutConfig::preset();
        config.set("grid_columns", 1e19);
        assert!(matches!(
            GridSpec::from_config(&config),
            Err(LabelError::InvalidGrid { .. })
        ));

        // Each dimension is in range, the product is not.
        config.set("grid_columns", 200.0);
        config.set("grid_rows", 200.0);
        assert!(matches!(
            GridSpec::from_config(&config),
            Err(LabelError::InvalidGrid { columns, rows }) if columns == 200.0 && rows == 200.0
        ));
    }

    #[test]
    fn test_min_card_height() {
        let mut config = LayoutConfig::preset();
        config.set("row_mode", "fixed");
        config.set("row_top_1", 30.0);
        config.set("row_top_2", 450.0);
        config.set("card_height", 300.0);
        assert_eq!(GridSpec::from_config(&config).unwrap().min_card_height(), 300.0);

        let grid = preset_grid();
        assert!((grid.min_card_height() - (grid.page_height - 40.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_slot_off_page_is_out_of_bounds() {
        let mut config = LayoutConfig::preset();
        config.set("bottom_dy", -100.0);
        let grid = GridSpec::from_config(&config).unwrap();
        let err = grid.validate().unwrap_err();
        assert!(matches!(err, LabelError::OutOfBounds { slot: 3, .. }));
    }
}
