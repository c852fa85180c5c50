use crate::luminance::LuminanceGrid;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Velocity resolution of the probability grid (rows).
pub const MAX_VELOCITY: usize = 128;

/// Discrete distribution over (note index, velocity) pairs derived from the
/// brightness of an image.
///
/// The image is cut into `n_notes` columns and `MAX_VELOCITY` rows. Each
/// cell's weight is the summed luminance inside it; pixels left over after
/// the integer division are ignored. Cells are stored column-major, so
/// `index = note * MAX_VELOCITY + velocity`.
#[derive(Debug, Clone)]
pub struct VoiceImageModel {
    n_notes: usize,
    probabilities: Vec<f64>,
    sampler: WeightedIndex<f64>,
    uniform_fallback: bool,
}

impl VoiceImageModel {
    /// Returns `None` for a grid without notes.
    pub fn new(image: &LuminanceGrid, n_notes: usize) -> Option<Self> {
        if n_notes == 0 {
            return None;
        }
        let cells = n_notes * MAX_VELOCITY;
        let cell_width = image.width() / n_notes;
        let cell_height = image.height() / MAX_VELOCITY;

        let mut masses = Vec::with_capacity(cells);
        for note in 0..n_notes {
            let x0 = note * cell_width;
            for velocity in 0..MAX_VELOCITY {
                let y0 = velocity * cell_height;
                let mass = image.region_sum(x0, x0 + cell_width, y0, y0 + cell_height);
                masses.push(mass.max(0.0));
            }
        }

        let total: f64 = masses.iter().sum();
        let uniform_fallback = !(total > 0.0 && total.is_finite());
        let probabilities: Vec<f64> = if uniform_fallback {
            log::warn!(
                "Image has no usable luminance for a {}x{} grid, using a uniform distribution",
                n_notes,
                MAX_VELOCITY
            );
            vec![1.0 / cells as f64; cells]
        } else {
            masses.iter().map(|m| m / total).collect()
        };

        let sampler = WeightedIndex::new(&probabilities).ok()?;
        Some(Self {
            n_notes,
            probabilities,
            sampler,
            uniform_fallback,
        })
    }

    pub fn n_notes(&self) -> usize {
        self.n_notes
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn probability(&self, note: usize, velocity: usize) -> f64 {
        self.probabilities[note * MAX_VELOCITY + velocity]
    }

    /// True when the image carried no luminance and the grid is uniform.
    pub fn is_uniform_fallback(&self) -> bool {
        self.uniform_fallback
    }

    /// Draws one `(note_index, velocity)` pair.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, u8) {
        let cell = self.sampler.sample(rng);
        (cell / MAX_VELOCITY, (cell % MAX_VELOCITY) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn gradient(width: usize, height: usize) -> LuminanceGrid {
        let values = (0..width * height).map(|i| (i % 7) as f64 * 10.0).collect();
        LuminanceGrid::new(width, height, values).unwrap()
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = VoiceImageModel::new(&gradient(70, 300), 7).unwrap();
        assert_eq!(model.probabilities().len(), 7 * MAX_VELOCITY);
        let sum: f64 = model.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
        assert!(model.probabilities().iter().all(|&p| p >= 0.0));
        assert!(!model.is_uniform_fallback());
    }

    #[test]
    fn remainder_pixels_are_excluded() {
        // 3 notes over a 7 pixel wide image: column 6 is never counted.
        let mut values = vec![0.0; 7 * 128];
        for y in 0..128 {
            values[y * 7] = 1.0;
            values[y * 7 + 6] = 1000.0;
        }
        let grid = LuminanceGrid::new(7, 128, values).unwrap();
        let model = VoiceImageModel::new(&grid, 3).unwrap();
        for v in 0..MAX_VELOCITY {
            assert!((model.probability(0, v) - 1.0 / 128.0).abs() < 1e-12);
            assert_eq!(model.probability(1, v), 0.0);
            assert_eq!(model.probability(2, v), 0.0);
        }
    }

    #[test]
    fn blank_image_falls_back_to_uniform() {
        let model = VoiceImageModel::new(&LuminanceGrid::filled(64, 256, 0.0), 4).unwrap();
        assert!(model.is_uniform_fallback());
        let expected = 1.0 / (4 * MAX_VELOCITY) as f64;
        assert!(model
            .probabilities()
            .iter()
            .all(|&p| (p - expected).abs() < 1e-15));
        let mut rng = SmallRng::seed_from_u64(1);
        let (note, _) = model.sample(&mut rng);
        assert!(note < 4);
    }

    #[test]
    fn image_smaller_than_grid_falls_back() {
        let model = VoiceImageModel::new(&LuminanceGrid::filled(10, 10, 200.0), 14).unwrap();
        assert!(model.is_uniform_fallback());
    }

    #[test]
    fn grid_without_notes_is_refused() {
        assert!(VoiceImageModel::new(&LuminanceGrid::filled(64, 256, 10.0), 0).is_none());
    }

    #[test]
    fn negative_luminance_carries_no_weight() {
        let mut values = vec![-5.0; 128];
        values[40] = 2.0;
        let grid = LuminanceGrid::new(1, 128, values).unwrap();
        let model = VoiceImageModel::new(&grid, 1).unwrap();
        assert_eq!(model.probability(0, 40), 1.0);
    }

    #[test]
    fn sampling_only_hits_lit_cells_and_finds_them_all() {
        // Two notes, 128 rows; light only in note 1 rows 10 and 90.
        let mut values = vec![0.0; 2 * 128];
        values[10 * 2 + 1] = 50.0;
        values[90 * 2 + 1] = 150.0;
        let grid = LuminanceGrid::new(2, 128, values).unwrap();
        let model = VoiceImageModel::new(&grid, 2).unwrap();

        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen_low = 0;
        let mut seen_high = 0;
        for _ in 0..4000 {
            match model.sample(&mut rng) {
                (1, 10) => seen_low += 1,
                (1, 90) => seen_high += 1,
                other => panic!("drew zero-probability cell {:?}", other),
            }
        }
        assert!(seen_low > 0 && seen_high > 0);
        assert!(seen_high > seen_low);
    }
}
