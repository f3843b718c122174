//! Adaptive cubic-sector spatial index accelerating nearest-codeword
//! queries at large codebook sizes.
//!
//! Grounded on `original_source/LBG/ColorSectors.h`. The source keeps
//! four separate multimaps (one per resolution) permanently allocated
//! with only one populated at a time; here a single multimap is kept
//! and re-keyed whenever the active cell side changes, since exactly
//! one resolution is ever live (§3/§4.8 of the spec).

use std::collections::{HashMap, HashSet};

use super::color::{distance, Color};

pub type Uuid = usize;

/// Cell side in bytes for each of the four resolution modes, 1-indexed
/// to match the spec's mode numbering.
fn cell_side_for_mode(mode: usize) -> usize {
    match mode {
        1 => 32,
        2 => 16,
        3 => 8,
        4 => 4,
        _ => unreachable!("sector mode out of range: {mode}"),
    }
}

pub struct SectorIndex {
    mode: usize,
    cell_side: usize,
    cells_per_axis: usize,
    map: HashMap<usize, Vec<(Color, Uuid)>>,
}

impl SectorIndex {
    pub fn new(mode: usize) -> Self {
        let cell_side = cell_side_for_mode(mode);
        Self { mode, cell_side, cells_per_axis: 256 / cell_side, map: HashMap::new() }
    }

    /// Resolution mode appropriate for a codebook of `size` entries.
    pub fn mode_for_size(size: usize) -> usize {
        if size >= 1 << 22 {
            4
        } else if size >= 1 << 18 {
            3
        } else if size >= 1 << 16 {
            2
        } else {
            1
        }
    }

    fn cell_id(&self, r: u8, g: u8, b: u8) -> usize {
        let n = self.cells_per_axis;
        (r as usize / self.cell_side)
            + (g as usize / self.cell_side) * n
            + (b as usize / self.cell_side) * n * n
    }

    pub fn insert(&mut self, color: Color, uuid: Uuid) {
        let cell = self.cell_id(color.r, color.g, color.b);
        self.map.entry(cell).or_default().push((color, uuid));
    }

    pub fn erase(&mut self, color: Color, uuid: Uuid) {
        let cell = self.cell_id(color.r, color.g, color.b);
        if let Some(bucket) = self.map.get_mut(&cell) {
            if let Some(pos) = bucket.iter().position(|&(c, u)| c == color && u == uuid) {
                bucket.swap_remove(pos);
            }
        }
    }

    /// Drop all entries and switch to `mode`.
    pub fn clear(&mut self, mode: usize) {
        self.map.clear();
        self.mode = mode;
        self.cell_side = cell_side_for_mode(mode);
        self.cells_per_axis = 256 / self.cell_side;
    }

    /// Cells intersecting the axis-aligned cubic shell of half-extent
    /// `depth * cell_side` centred on `color`: the six face-slabs of
    /// that box, deduplicated.
    fn cells_at_depth(&self, depth: i64, color: Color) -> HashSet<usize> {
        let s = self.cell_side as i64;
        let r = color.r as i64;
        let g = color.g as i64;
        let b = color.b as i64;

        let rmin = (r - depth * s).max(0);
        let rmax = (r + depth * s).min(255);
        let gmin = (g - depth * s).max(0);
        let gmax = (g + depth * s).min(255);
        let bmin = (b - depth * s).max(0);
        let bmax = (b + depth * s).min(255);

        let mut set = HashSet::new();
        let mut push = |rr: i64, gg: i64, bb: i64| {
            set.insert(self.cell_id(rr as u8, gg as u8, bb as u8));
        };

        // +/- R faces, swept over G x B
        let mut gg = gmin;
        while gg <= gmax {
            let mut bb = bmin;
            while bb <= bmax {
                push(rmax, gg, bb);
                push(rmin, gg, bb);
                bb += s;
            }
            gg += s;
        }
        // +/- B faces, swept over R x G
        let mut xg = gmin;
        while xg <= gmax {
            let mut yr = rmin;
            while yr <= rmax {
                push(yr, xg, bmax);
                push(yr, xg, bmin);
                yr += s;
            }
            xg += s;
        }
        // +/- G faces, swept over R x B
        let mut xb = bmin;
        while xb <= bmax {
            let mut yr = rmin;
            while yr <= rmax {
                push(yr, gmax, xb);
                push(yr, gmin, xb);
                yr += s;
            }
            xb += s;
        }

        set
    }

    /// Expanding shell search for the codeword nearest `color`. Once a
    /// candidate is found, a conservative overshoot bound decides how
    /// many more shells are worth visiting.
    pub fn find_nearest(&self, color: Color) -> Option<Uuid> {
        let mut min_uuid = None;
        let mut min_distance = u64::MAX;
        let mut over: i64 = 0;
        let mut over_end: i64 = 1;
        let mut start_counter = false;

        let mut depth: i64 = 0;
        while over != over_end && depth < 255 {
            if start_counter {
                over += 1;
            }

            for cell in self.cells_at_depth(depth, color) {
                if let Some(bucket) = self.map.get(&cell) {
                    for &(c, uuid) in bucket {
                        let d = distance(color, c);
                        if d < min_distance {
                            min_distance = d;
                            min_uuid = Some(uuid);
                            if !start_counter {
                                over_end = if self.mode == 1 {
                                    (min_distance as f64).sqrt() as i64 + 1 - depth * (self.cell_side as i64 - 1)
                                } else {
                                    min_distance as i64 - depth * (self.cell_side as i64 - 1)
                                };
                            }
                            start_counter = true;
                        }
                    }
                }
            }
            depth += 1;
        }

        min_uuid
    }
}
