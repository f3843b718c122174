//! Linde-Buzo-Gray vector quantiser for 24-bit RGB images.
//!
//! The codebook starts as a single centroid and doubles by splitting
//! until it reaches the requested size; each size refines under the
//! inner LBG loop (assignment, centroid update, empty-cell donor
//! split) until relative average distortion stabilizes. Grounded on
//! `original_source/LBG/main.cpp`'s `LBG`/`splitPoint`/
//! `fastRecalculation`.

mod color;
mod sectors;
pub mod tga;

pub use color::{distance, Color};
pub use sectors::{SectorIndex, Uuid};

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rand::{Rng, RngCore};

/// Above this codebook size brute-force nearest-codeword scan gives way
/// to the sector index.
const BRUTE_FORCE_CEILING: usize = 4096;

/// Donor eligibility threshold for empty-cell splitting: a partition is
/// only split off to repopulate an empty cell if its utility index is
/// at least this large.
const UTILITY_SPLIT_THRESHOLD: f64 = 0.3;

#[derive(Clone, Copy)]
pub struct Settings {
    pub epsilon: f64,
}

pub const STD_SETTINGS: Settings = Settings { epsilon: 0.1 };

#[derive(Default, Clone, Copy)]
struct Accum {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
    distortion: u64,
}

impl Accum {
    fn add(&mut self, color: Color, count: u64, dist: u64) {
        self.r += color.r as u64 * count;
        self.g += color.g as u64 * count;
        self.b += color.b as u64 * count;
        self.count += count;
        self.distortion += dist * count;
    }

    fn centroid(&self) -> Color {
        Color::new((self.r / self.count) as u8, (self.g / self.count) as u8, (self.b / self.count) as u8)
    }
}

#[derive(Clone, Copy, PartialEq)]
struct UtilityEntry {
    utility: f64,
    uuid: Uuid,
}

impl Eq for UtilityEntry {}

impl PartialOrd for UtilityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UtilityEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utility.partial_cmp(&other.utility).unwrap_or(Ordering::Equal)
    }
}

/// Perturb `origin` by `delta` (with independently randomized signs per
/// component), clamped to `[0, 255]`. Returns `(origin - delta, origin
/// + delta)`, matching the source's in-place update of the original
/// point plus a freshly inserted partner.
fn split_point(origin: Color, delta: (i32, i32, i32), rng: &mut impl RngCore) -> (Color, Color) {
    let mut d = delta;
    if rng.gen_bool(0.5) {
        d.0 = -d.0;
    }
    if rng.gen_bool(0.5) {
        d.1 = -d.1;
    }
    if rng.gen_bool(0.5) {
        d.2 = -d.2;
    }
    let clamp = |v: i32| v.clamp(0, 255) as u8;
    let shrunk = Color::new(
        clamp(origin.r as i32 - d.0),
        clamp(origin.g as i32 - d.1),
        clamp(origin.b as i32 - d.2),
    );
    let grown = Color::new(
        clamp(origin.r as i32 + d.0),
        clamp(origin.g as i32 + d.1),
        clamp(origin.b as i32 + d.2),
    );
    (shrunk, grown)
}

fn nearest_brute(code_book: &HashMap<Uuid, Color>, color: Color) -> (Uuid, u64) {
    let mut best_uuid = 0;
    let mut best_dist = u64::MAX;
    for (&uuid, &candidate) in code_book {
        let d = distance(color, candidate);
        if d < best_dist {
            best_dist = d;
            best_uuid = uuid;
        }
    }
    (best_uuid, best_dist)
}

/// Reassign only the colors formerly belonging to `point1` or `point2`,
/// split between the two recentred codewords; recompute their
/// centroids and distortion. A deliberate partial reassignment, not a
/// full re-scan of the histogram (spec.md §9).
fn fast_recalculation(
    point1: Uuid,
    point2: Uuid,
    code_book: &mut HashMap<Uuid, Color>,
    partitions: &mut HashMap<Uuid, Vec<Color>>,
    histogram: &HashMap<Color, u64>,
) -> (u64, u64, u64, u64) {
    let c1 = code_book[&point1];
    let c2 = code_book[&point2];

    let mut combined = Vec::new();
    if let Some(colors) = partitions.remove(&point1) {
        combined.extend(colors);
    }
    if let Some(colors) = partitions.remove(&point2) {
        combined.extend(colors);
    }

    let mut acc1 = Accum::default();
    let mut acc2 = Accum::default();
    let mut new1 = Vec::new();
    let mut new2 = Vec::new();

    for color in combined {
        let d1 = distance(color, c1);
        let d2 = distance(color, c2);
        let count = histogram[&color];
        if d1 < d2 {
            acc1.add(color, count, d1);
            new1.push(color);
        } else {
            acc2.add(color, count, d2);
            new2.push(color);
        }
    }

    if !new1.is_empty() {
        partitions.insert(point1, new1);
    }
    if !new2.is_empty() {
        partitions.insert(point2, new2);
    }

    if acc1.count > 0 {
        code_book.insert(point1, acc1.centroid());
    }
    if acc2.count > 0 {
        code_book.insert(point2, acc2.centroid());
    }

    (acc1.distortion, acc1.count, acc2.distortion, acc2.count)
}

/// Inner LBG loop: repeatedly reassign every histogram color to its
/// nearest codeword, recompute centroids, and split a donor cell into
/// any cell left with no assignment, until relative average distortion
/// stabilizes within `epsilon`.
fn inner_lbg(
    histogram: &HashMap<Color, u64>,
    code_book: &mut HashMap<Uuid, Color>,
    partitions: &mut HashMap<Uuid, Vec<Color>>,
    epsilon: f64,
    rng: &mut impl RngCore,
) {
    let mut avg_distortion = f64::MAX;
    let mut avg_distortion_prev = 0.0f64;

    let mut sectors = SectorIndex::new(SectorIndex::mode_for_size(code_book.len()));
    for (&uuid, &color) in code_book.iter() {
        sectors.insert(color, uuid);
    }

    while ((avg_distortion_prev - avg_distortion) / avg_distortion).abs() > epsilon {
        partitions.clear();
        let mut distortion: u64 = 0;
        let mut colors_count: u64 = 0;
        let mut accum: HashMap<Uuid, Accum> = HashMap::new();

        for (&color, &count) in histogram {
            let (uuid, dist) = if code_book.len() <= BRUTE_FORCE_CEILING {
                nearest_brute(code_book, color)
            } else {
                let uuid = sectors.find_nearest(color).expect("sector index holds the whole codebook");
                (uuid, distance(color, code_book[&uuid]))
            };

            partitions.entry(uuid).or_default().push(color);
            distortion += dist * count;
            colors_count += count;
            accum.entry(uuid).or_default().add(color, count, dist);
        }

        avg_distortion_prev = avg_distortion;
        avg_distortion = distortion as f64 / colors_count as f64;

        sectors.clear(SectorIndex::mode_for_size(code_book.len()));

        let mut utility_heap: BinaryHeap<UtilityEntry> = BinaryHeap::new();
        for (&uuid, a) in accum.iter() {
            if a.count > 0 {
                let centroid = a.centroid();
                code_book.insert(uuid, centroid);
                sectors.insert(centroid, uuid);
            }
            let utility = (a.distortion as f64 / a.count as f64) / avg_distortion;
            if utility != 0.0 {
                utility_heap.push(UtilityEntry { utility, uuid });
            }
        }

        let empty_ids: Vec<Uuid> = code_book.keys().copied().filter(|id| !accum.contains_key(id)).collect();
        for empty_uuid in empty_ids {
            let empty_position = code_book[&empty_uuid];
            if utility_heap.peek().map(|t| t.utility).unwrap_or(0.0) < UTILITY_SPLIT_THRESHOLD {
                sectors.insert(empty_position, empty_uuid);
                continue;
            }

            let donor = utility_heap.pop().expect("checked non-empty above");
            let donor_color = code_book[&donor.uuid];
            sectors.erase(donor_color, donor.uuid);
            distortion -= accum[&donor.uuid].distortion;

            let (new_donor, new_empty) = split_point(donor_color, (1, 1, 1), rng);
            code_book.insert(donor.uuid, new_donor);
            code_book.insert(empty_uuid, new_empty);
            sectors.insert(new_donor, donor.uuid);
            sectors.insert(new_empty, empty_uuid);

            let (d1, c1, d2, c2) = fast_recalculation(empty_uuid, donor.uuid, code_book, partitions, histogram);
            distortion += d1 + d2;
            avg_distortion = distortion as f64 / colors_count as f64;

            if c1 != 0 && c2 != 0 {
                utility_heap.push(UtilityEntry { utility: (d2 as f64 / c2 as f64) / avg_distortion, uuid: donor.uuid });
                utility_heap.push(UtilityEntry { utility: (d1 as f64 / c1 as f64) / avg_distortion, uuid: empty_uuid });
            }
        }

        if code_book.len() > 8000 {
            log::trace!("lbg inner loop tick at codebook size {}", code_book.len());
        }
    }
}

/// Quantise `histogram` down to `target` codewords. Returns the
/// codebook (uuid -> centroid) and the color -> uuid assignment used
/// to transform pixels.
pub fn quantize(
    histogram: &HashMap<Color, u64>,
    target: usize,
    epsilon: f64,
    rng: &mut impl RngCore,
) -> (HashMap<Uuid, Color>, HashMap<Color, Uuid>) {
    assert!(target >= 1, "codebook target must be at least one entry");

    let mut total = 0u128;
    let mut sr = 0u128;
    let mut sg = 0u128;
    let mut sb = 0u128;
    for (&c, &count) in histogram {
        sr += c.r as u128 * count as u128;
        sg += c.g as u128 * count as u128;
        sb += c.b as u128 * count as u128;
        total += count as u128;
    }
    let avg_color = if total == 0 {
        Color::default()
    } else {
        Color::new((sr / total) as u8, (sg / total) as u8, (sb / total) as u8)
    };

    let mut code_book: HashMap<Uuid, Color> = HashMap::new();
    let mut next_uuid: Uuid = 0;
    code_book.insert(next_uuid, avg_color);
    next_uuid += 1;

    let mut partitions: HashMap<Uuid, Vec<Color>> = HashMap::new();
    inner_lbg(histogram, &mut code_book, &mut partitions, epsilon, rng);

    while code_book.len() < target {
        let ids: Vec<Uuid> = code_book.keys().copied().collect();
        for uuid in ids {
            let point = code_book[&uuid];
            let (shrunk, grown) = split_point(point, (5, 5, 5), rng);
            code_book.insert(uuid, shrunk);
            code_book.insert(next_uuid, grown);
            next_uuid += 1;
        }
        log::info!("lbg resizing codebook to {}", code_book.len());
        inner_lbg(histogram, &mut code_book, &mut partitions, epsilon, rng);
    }

    let mut color_to_uuid = HashMap::with_capacity(histogram.len());
    for (&uuid, colors) in &partitions {
        for &color in colors {
            color_to_uuid.insert(color, uuid);
        }
    }
    (code_book, color_to_uuid)
}
