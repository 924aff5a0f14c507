//! Seeded 3D simplex noise.
//!
//! [`PermutationTable`] shuffles the identity permutation with a
//! [`ParkMiller`] generator and duplicates it to 512 entries so lattice
//! lookups never wrap explicitly. [`NoiseField`] evaluates Gustavson-style
//! simplex noise over that table.
//!
//! The tetrahedron selection order and the gradient table are fixed: they
//! decide the anisotropy of the field, so changing either changes every
//! animation driven by it.

use noise::NoiseFn;

use crate::prng::ParkMiller;

/// Skew factor for 3D: `(sqrt(4) - 1) / 3`.
const F3: f64 = 1.0 / 3.0;
/// Unskew factor for 3D: `(1 - 1/sqrt(4)) / 3`.
const G3: f64 = 1.0 / 6.0;
/// Squared radius of a corner's influence.
const CORNER_RADIUS_SQ: f64 = 0.6;
/// Output normalisation.
const OUTPUT_SCALE: f64 = 32.0;

/// The twelve edge midpoints of a cube.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// A 256-entry permutation duplicated to 512 bytes.
///
/// Pure function of the seed: two tables built from the same seed are equal.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    /// Builds the table with a seeded Fisher-Yates shuffle.
    pub fn new(seed: i32) -> Self {
        let mut p = [0u8; 256];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut lcg = ParkMiller::new(seed);
        for i in (1..256usize).rev() {
            let j = (lcg.next_state() % (i as u64 + 1)) as usize;
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }
        Self { perm }
    }

    /// The full 512-entry table.
    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }

    /// Entry at `index` (must be below 512).
    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.perm[index] as usize
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

/// Deterministic 3D simplex noise field.
///
/// Immutable after construction, so it is `Send + Sync` and may be sampled
/// from any number of readers.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: i32,
    perm: PermutationTable,
}

impl NoiseField {
    /// Creates a noise field for `seed`.
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            perm: PermutationTable::new(seed),
        }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Evaluates the noise at `(x, y, z)`.
    ///
    /// Output is roughly in [-1, 1] but not strictly bounded.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let s = (x + y + z) * F3;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();

        let t = (i + j + k) * G3;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        let ((i1, j1, k1), (i2, j2, k2)) = simplex_corners(x0, y0, z0);

        let x1 = x0 - i1 as f64 + G3;
        let y1 = y0 - j1 as f64 + G3;
        let z1 = z0 - k1 as f64 + G3;
        let x2 = x0 - i2 as f64 + 2.0 * G3;
        let y2 = y0 - j2 as f64 + 2.0 * G3;
        let z2 = z0 - k2 as f64 + 2.0 * G3;
        let x3 = x0 - 1.0 + 3.0 * G3;
        let y3 = y0 - 1.0 + 3.0 * G3;
        let z3 = z0 - 1.0 + 3.0 * G3;

        let ii = lattice_index(i);
        let jj = lattice_index(j);
        let kk = lattice_index(k);

        let n0 = self.corner(ii, jj, kk, x0, y0, z0);
        let n1 = self.corner(ii + i1, jj + j1, kk + k1, x1, y1, z1);
        let n2 = self.corner(ii + i2, jj + j2, kk + k2, x2, y2, z2);
        let n3 = self.corner(ii + 1, jj + 1, kk + 1, x3, y3, z3);

        OUTPUT_SCALE * (n0 + n1 + n2 + n3)
    }

    /// Contribution of one simplex corner at lattice offset `(a, b, c)`.
    #[inline]
    fn corner(&self, a: usize, b: usize, c: usize, x: f64, y: f64, z: f64) -> f64 {
        let mut t = CORNER_RADIUS_SQ - x * x - y * y - z * z;
        if t <= 0.0 {
            return 0.0;
        }
        t *= t;
        let gi = self.perm.get(a + self.perm.get(b + self.perm.get(c))) % 12;
        let g = GRAD3[gi];
        t * t * (g[0] * x + g[1] * y + g[2] * z)
    }
}

impl NoiseFn<f64, 3> for NoiseField {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample(point[0], point[1], point[2])
    }
}

/// Pure constructor matching the host-facing `createNoiseField(seed)`.
pub fn create_noise_field(seed: i32) -> NoiseField {
    NoiseField::new(seed)
}

/// Offsets of the second and third simplex corners.
///
/// Two three-way ladders keyed on `x0 >= y0`; the order of the six cases is
/// part of the noise contract.
#[inline]
fn simplex_corners(x0: f64, y0: f64, z0: f64) -> ((usize, usize, usize), (usize, usize, usize)) {
    if x0 >= y0 {
        if y0 >= z0 {
            ((1, 0, 0), (1, 1, 0))
        } else if x0 >= z0 {
            ((1, 0, 0), (1, 0, 1))
        } else {
            ((0, 0, 1), (1, 0, 1))
        }
    } else if y0 < z0 {
        ((0, 0, 1), (0, 1, 1))
    } else if x0 < z0 {
        ((0, 1, 0), (0, 1, 1))
    } else {
        ((0, 1, 0), (1, 1, 0))
    }
}

/// Cell coordinate modulo 256, with negative cells wrapping like two's complement.
#[inline]
fn lattice_index(cell: f64) -> usize {
    ((cell as i64) & 255) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_head_for_seed_42_matches_golden() {
        let table = PermutationTable::new(42);
        assert_eq!(&table.as_slice()[..8], &[249, 32, 72, 151, 21, 8, 253, 234]);
    }

    #[test]
    fn table_head_for_seed_1_matches_golden() {
        let table = PermutationTable::new(1);
        assert_eq!(
            &table.as_slice()[..8],
            &[34, 170, 87, 159, 144, 18, 139, 162]
        );
    }

    #[test]
    fn seed_zero_table_is_a_rotation() {
        // The LCG state never leaves 0, so each step swaps entry i with entry 0.
        let table = PermutationTable::new(0);
        for i in 0..256 {
            assert_eq!(table.get(i), (i + 1) % 256, "entry {i}");
        }
    }

    #[test]
    fn table_is_duplicated_permutation() {
        let table = PermutationTable::new(1234);
        let perm = table.as_slice();
        assert_eq!(perm.len(), 512);
        let mut seen = [0u32; 256];
        for i in 0..256 {
            assert_eq!(perm[i], perm[i + 256], "entry {i} not duplicated");
            seen[perm[i] as usize] += 1;
        }
        assert!(seen.iter().all(|&n| n == 1), "not a permutation");
    }

    #[test]
    fn sample_matches_golden_values_for_seed_42() {
        let field = NoiseField::new(42);
        let cases = [
            ((1.23, 4.56, 0.0), 0.416_925_547_585_687_23),
            ((0.5, 0.25, 0.125), 0.633_117_006_708_466_8),
            ((-3.7, 12.1, 0.9), -0.319_067_498_666_669_8),
        ];
        for ((x, y, z), expected) in cases {
            let v = field.sample(x, y, z);
            assert!(
                (v - expected).abs() < 1e-12,
                "noise({x}, {y}, {z}) = {v}, expected {expected}"
            );
        }
    }

    #[test]
    fn sample_matches_golden_values_for_other_seeds() {
        let v0 = NoiseField::new(0).sample(1.23, 4.56, 0.0);
        assert!((v0 - -0.207_415_586_964_721_68).abs() < 1e-12, "seed 0: {v0}");
        let v7 = NoiseField::new(7).sample(10.5, -2.25, 3.0);
        assert!((v7 - 0.127_531_705_729_166_67).abs() < 1e-12, "seed 7: {v7}");
    }

    #[test]
    fn sample_is_zero_at_lattice_origin() {
        assert_eq!(NoiseField::new(42).sample(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn repeated_samples_are_bit_identical() {
        let a = create_noise_field(42);
        let b = create_noise_field(42);
        let first = a.sample(1.23, 4.56, 0.0);
        for _ in 0..10 {
            assert_eq!(a.sample(1.23, 4.56, 0.0).to_bits(), first.to_bits());
            assert_eq!(b.sample(1.23, 4.56, 0.0).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn noise_fn_get_delegates_to_sample() {
        let field = NoiseField::new(9);
        let direct = field.sample(0.3, -1.7, 2.2);
        assert_eq!(field.get([0.3, -1.7, 2.2]).to_bits(), direct.to_bits());
    }

    #[test]
    fn different_seeds_give_different_fields() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..32).any(|i| {
            let x = i as f64 * 0.37;
            a.sample(x, x * 0.5, 0.1) != b.sample(x, x * 0.5, 0.1)
        });
        assert!(differs);
    }

    #[test]
    fn noise_field_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoiseField>();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn table_is_valid_for_any_seed(seed: i32) {
                let table = PermutationTable::new(seed);
                let perm = table.as_slice();
                let mut seen = [false; 256];
                for i in 0..256 {
                    prop_assert_eq!(perm[i], perm[i + 256]);
                    prop_assert!(!seen[perm[i] as usize], "duplicate value {}", perm[i]);
                    seen[perm[i] as usize] = true;
                }
            }

            #[test]
            fn sample_is_finite_and_roughly_bounded(
                seed: i32,
                x in -1e4_f64..1e4,
                y in -1e4_f64..1e4,
                z in -1e4_f64..1e4,
            ) {
                let v = NoiseField::new(seed).sample(x, y, z);
                prop_assert!(v.is_finite());
                prop_assert!(v.abs() <= 1.1, "noise({x}, {y}, {z}) = {v}");
            }
        }
    }
}
