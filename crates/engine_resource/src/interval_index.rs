//! One-dimensional interval index.
//!
//! Each stored interval is kept as `(center, half_width)` and registered in
//! every grid cell its span touches. The grid divides a domain into a fixed
//! number of equal partitions; the domain grows (at least doubling) whenever
//! an inserted interval falls outside it, and every entry is re-bucketed.
//!
//! A query probes only the cells overlapping its span. An entry spanning
//! several probed cells is reported from the first of them only, so no
//! de-duplication buffer is needed and queries never touch shared state.
//! Candidates are then filtered by the exact, boundary-inclusive overlap
//! test.
//!
//! Intervals whose center or half width is not finite cannot be placed on
//! the grid. They are kept in a side list that every query scans; NaN
//! comparisons make them never match.

/// A stored interval, symmetric around `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalEntry {
    pub center: f64,
    pub half_width: f64,
}

impl IntervalEntry {
    /// Derive the entry for `[min, max]`. `max >= min` is assumed.
    #[must_use]
    pub fn from_bounds(min: f64, max: f64) -> Self {
        let center = (min + max) / 2.0;
        Self {
            center,
            half_width: center - min,
        }
    }

    /// Lower end of the interval.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.center - self.half_width
    }

    /// Upper end of the interval.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.center + self.half_width
    }

    /// Returns `true` if `point` lies within the interval, ends included.
    #[must_use]
    pub fn contains(&self, point: f64) -> bool {
        self.overlaps(point, point)
    }

    /// Returns `true` if the interval shares at least one point with
    /// `[min, max]`.
    #[must_use]
    pub fn overlaps(&self, min: f64, max: f64) -> bool {
        self.min() <= max && min <= self.max()
    }

    fn is_finite(&self) -> bool {
        self.center.is_finite() && self.half_width.is_finite()
    }

    /// Ends in ascending order, tolerating a reversed interval.
    fn span(&self) -> (f64, f64) {
        let (a, b) = (self.min(), self.max());
        if a <= b { (a, b) } else { (b, a) }
    }
}

/// Width given to the domain when the first interval is a single point.
const MIN_EXTENT: f64 = 1.0;

/// Grid-bucketed interval index over arena slots.
#[derive(Debug, Clone)]
pub struct IntervalIndex {
    partitions: usize,
    /// Lower end of the gridded domain.
    origin: f64,
    /// Width of the gridded domain. Meaningless while `cells` is empty.
    extent: f64,
    /// Entry positions per cell. Empty until the first finite insert.
    cells: Vec<Vec<usize>>,
    /// `(interval, slot)` in insertion order.
    entries: Vec<(IntervalEntry, usize)>,
    /// Positions of entries that are not on the grid.
    unbounded: Vec<usize>,
}

impl IntervalIndex {
    /// Create an empty index with the given number of grid partitions
    /// (clamped to at least 1).
    #[must_use]
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
            origin: 0.0,
            extent: MIN_EXTENT,
            cells: Vec::new(),
            entries: Vec::new(),
            unbounded: Vec::new(),
        }
    }

    /// Index `[min, max]` for `slot`.
    ///
    /// Returns `false` if the interval is not finite and can therefore never
    /// match a query.
    pub fn insert(&mut self, min: f64, max: f64, slot: usize) -> bool {
        let entry = IntervalEntry::from_bounds(min, max);
        let pos = self.entries.len();
        self.entries.push((entry, slot));

        if !entry.is_finite() {
            self.unbounded.push(pos);
            return false;
        }

        let (lo, hi) = entry.span();
        if self.grow_to_cover(lo, hi) {
            self.rebucket();
        } else {
            self.place(pos);
        }
        true
    }

    /// Slots whose interval contains `point`.
    pub fn containing(&self, point: f64) -> impl Iterator<Item = usize> + '_ {
        self.overlapping(point, point)
    }

    /// Slots whose interval overlaps `[min, max]`, touching ends included.
    ///
    /// A query with `min > max` or a NaN end matches nothing.
    pub fn overlapping(&self, min: f64, max: f64) -> impl Iterator<Item = usize> + '_ {
        let valid = min <= max;
        let (first, cells) = match self.probe_span(min, max) {
            Some((first, last)) => (first, &self.cells[first..=last]),
            None => (0, &self.cells[..0]),
        };

        let gridded = cells.iter().enumerate().flat_map(move |(i, cell)| {
            let probed = first + i;
            cell.iter().copied().filter(move |&pos| {
                let entry = &self.entries[pos].0;
                self.cell_of(entry.span().0).max(first) == probed && entry.overlaps(min, max)
            })
        });
        let unbounded = self
            .unbounded
            .iter()
            .copied()
            .filter(move |&pos| valid && self.entries[pos].0.overlaps(min, max));

        gridded.chain(unbounded).map(move |pos| self.entries[pos].1)
    }

    /// Number of stored intervals, including non-finite ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of grid partitions.
    #[must_use]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// The gridded domain `(origin, end)`, once any finite interval exists.
    #[must_use]
    pub fn domain(&self) -> Option<(f64, f64)> {
        (!self.cells.is_empty()).then(|| (self.origin, self.origin + self.extent))
    }

    /// Cell range a query must probe, or `None` if it misses the domain.
    fn probe_span(&self, min: f64, max: f64) -> Option<(usize, usize)> {
        let (origin, end) = self.domain()?;
        if !(min <= max) || max < origin || min > end {
            return None;
        }
        Some((self.cell_of(min), self.cell_of(max)))
    }

    fn cell_of(&self, x: f64) -> usize {
        let scaled = ((x - self.origin) / self.extent * self.partitions as f64).floor();
        // Float-to-int casts saturate, so anything below the domain lands in 0.
        (scaled as usize).min(self.partitions - 1)
    }

    /// Widen the domain to include `[lo, hi]`. Returns `true` if the grid
    /// has to be rebuilt.
    fn grow_to_cover(&mut self, lo: f64, hi: f64) -> bool {
        let Some((origin, end)) = self.domain() else {
            self.origin = lo;
            self.extent = if hi > lo { hi - lo } else { MIN_EXTENT };
            return true;
        };
        if lo >= origin && hi <= end {
            return false;
        }

        let new_origin = lo.min(origin);
        let needed = hi.max(end) - new_origin;
        let mut extent = self.extent * 2.0;
        while extent < needed {
            extent *= 2.0;
        }
        self.origin = new_origin;
        self.extent = extent;
        true
    }

    fn rebucket(&mut self) {
        self.cells = vec![Vec::new(); self.partitions];
        for pos in 0..self.entries.len() {
            if self.entries[pos].0.is_finite() {
                self.place(pos);
            }
        }
    }

    fn place(&mut self, pos: usize) {
        let (lo, hi) = self.entries[pos].0.span();
        let (first, last) = (self.cell_of(lo), self.cell_of(hi));
        for cell in &mut self.cells[first..=last] {
            cell.push(pos);
        }
    }
}

impl Default for IntervalIndex {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INTERVAL_PARTITIONS)
    }
}
