// The authoritative wall state: one block per grid cell.
// Visual expectation: the render pass reads these cells every frame and draws
// one slab per cell, colored and pushed forward by its depth.

use tracing::debug;

use crate::config::BLOCK_DEPTH_SCALE;
use crate::types::Viewport;

/// One block of the wall.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub column: u32,
    pub row: u32,
    /// Scene position; (x, y) centered on the origin, z is the depth.
    pub position: [f32; 3],
    /// r, g, b in [0, 1].
    pub color: [f32; 3],
    /// Luma-driven depth, >= 0.
    pub depth: f32,
    /// Visual scale (block, block, thin depth axis).
    pub scale: [f32; 3],
}

impl GridCell {
    fn new(column: u32, row: u32, columns: u32, rows: u32, block_scale: f32) -> Self {
        let x = column as f32 - columns as f32 / 2.0;
        let y = -(row as f32 - rows as f32 / 2.0);
        Self {
            column,
            row,
            position: [x, y, 0.0],
            color: [0.0; 3],
            depth: 0.0,
            scale: [block_scale, block_scale, BLOCK_DEPTH_SCALE],
        }
    }

    /// Write the sampled color and depth (z of the position follows the depth).
    #[inline]
    pub fn set_sample(&mut self, color: [f32; 3], depth: f32) {
        self.color = color;
        self.depth = depth;
        self.position[2] = depth;
    }
}

/// Row-major store of cells, rebuilt wholesale when layout changes.
#[derive(Clone, Debug)]
pub struct GridStore {
    viewport: Viewport,
    cell_size: u32,
    block_scale: f32,
    columns: u32,
    rows: u32,
    cells: Vec<GridCell>,
}

/// Grid dimensions for a viewport: floor(w / cell) x floor(h / cell).
pub fn grid_dimensions(viewport: Viewport, cell_size: u32) -> (u32, u32) {
    if cell_size == 0 {
        return (0, 0);
    }
    (viewport.width / cell_size, viewport.height / cell_size)
}

impl GridStore {
    pub fn new(viewport: Viewport, cell_size: u32, block_scale: f32) -> Self {
        let mut store = Self {
            viewport,
            cell_size,
            block_scale,
            columns: 0,
            rows: 0,
            cells: Vec::new(),
        };
        store.rebuild(viewport, cell_size, block_scale);
        store
    }

    /// Throw away every cell and lay out a fresh grid.
    /// Must run whenever the viewport or the cell size changes.
    pub fn rebuild(&mut self, viewport: Viewport, cell_size: u32, block_scale: f32) {
        let (columns, rows) = grid_dimensions(viewport, cell_size);

        let mut cells = Vec::with_capacity((columns as usize) * (rows as usize));
        for row in 0..rows {
            for column in 0..columns {
                cells.push(GridCell::new(column, row, columns, rows, block_scale));
            }
        }

        self.viewport = viewport;
        self.cell_size = cell_size;
        self.block_scale = block_scale;
        self.columns = columns;
        self.rows = rows;
        self.cells = cells;
        debug!(columns, rows, cell_size, "grid rebuilt");
    }

    /// Change only the block size; cells, colors and positions stay.
    pub fn set_block_scale(&mut self, block_scale: f32) {
        self.block_scale = block_scale;
        for cell in &mut self.cells {
            cell.scale = [block_scale, block_scale, BLOCK_DEPTH_SCALE];
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn block_scale(&self) -> f32 {
        self.block_scale
    }

    /// (columns, rows)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [GridCell] {
        &mut self.cells
    }

    pub fn cell(&self, column: u32, row: u32) -> Option<&GridCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get((row * self.columns + column) as usize)
    }
}
