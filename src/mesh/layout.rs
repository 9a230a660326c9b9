//! Index arithmetic shared by every nodal array.

/// Shape of the element × node grid.
///
/// Nodal arrays are flattened as `[row, col, node_row, node_col]`.
/// Vertical interfaces (between rows) are flattened as
/// `[interface_row (0..=ny), col, node]` and horizontal interfaces (between
/// columns) as `[row, interface_col (0..=nx), node]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeLayout {
    /// Element rows (vertical direction)
    pub ny: usize,
    /// Element columns (horizontal direction)
    pub nx: usize,
    /// Nodes per element edge (order + 1)
    pub n: usize,
}

impl NodeLayout {
    pub fn new(ny: usize, nx: usize, n: usize) -> Self {
        Self { ny, nx, n }
    }

    #[inline]
    pub fn n_elements(&self) -> usize {
        self.ny * self.nx
    }

    /// Nodes per element, n².
    #[inline]
    pub fn nodes_per_element(&self) -> usize {
        self.n * self.n
    }

    /// Length of a full nodal array.
    #[inline]
    pub fn n_total(&self) -> usize {
        self.n_elements() * self.nodes_per_element()
    }

    /// Length of an up/down interface buffer.
    #[inline]
    pub fn vertical_interface_len(&self) -> usize {
        (self.ny + 1) * self.nx * self.n
    }

    /// Length of a left/right interface buffer.
    #[inline]
    pub fn horizontal_interface_len(&self) -> usize {
        self.ny * (self.nx + 1) * self.n
    }

    #[inline]
    pub fn element(&self, row: usize, col: usize) -> usize {
        row * self.nx + col
    }

    /// (row, col) of an element index.
    #[inline]
    pub fn element_coords(&self, element: usize) -> (usize, usize) {
        (element / self.nx, element % self.nx)
    }

    /// Offset of node (i, j) within an element block.
    #[inline]
    pub fn local(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// Flat index of node (i, j) of element (row, col).
    #[inline]
    pub fn node(&self, row: usize, col: usize, i: usize, j: usize) -> usize {
        self.element(row, col) * self.nodes_per_element() + self.local(i, j)
    }

    /// Flat index into a vertical interface buffer.
    #[inline]
    pub fn vertical(&self, interface_row: usize, col: usize, node: usize) -> usize {
        (interface_row * self.nx + col) * self.n + node
    }

    /// Flat index into a horizontal interface buffer.
    #[inline]
    pub fn horizontal(&self, row: usize, interface_col: usize, node: usize) -> usize {
        (row * (self.nx + 1) + interface_col) * self.n + node
    }
}
