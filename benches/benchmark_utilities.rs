use std::fmt::{self, Display, Formatter};

use criterion::{measurement::WallTime, BenchmarkGroup, BenchmarkId, Throughput};
use fortune_voronoi::{Point2, VoronoiDiagram, VoronoiNum, VoronoiOptions};
use rand::{distributions::uniform::SampleUniform, Rng, SeedableRng};

pub const SEED: &[u8; 32] = b"\xfb\xdc\x4e\xa0\x30\xde\x82\xba\x69\x97\x3c\x52\x49\x4d\x00\xca
\x5c\x21\xa3\x8d\x5c\xf2\x34\x4e\x58\x7d\x80\x16\x66\x23\x30";

pub fn uniform_distribution<S: VoronoiNum + SampleUniform>(
    seed: [u8; 32],
    range: S,
) -> impl Iterator<Item = Point2<S>>
where
    S::Sampler: Copy,
{
    let range = rand::distributions::Uniform::new_inclusive(-range, range);
    let mut rng = rand::rngs::StdRng::from_seed(seed);
    std::iter::from_fn(move || Some(Point2::new(rng.sample(range), rng.sample(range))))
}

pub fn random_walk_distribution<S: VoronoiNum + SampleUniform>(
    step_size: S,
    seed: [u8; 32],
) -> impl Iterator<Item = Point2<S>>
where
    S::Sampler: Copy,
{
    let range = rand::distributions::Uniform::new_inclusive(-step_size, step_size);
    let mut last_x = S::zero();
    let mut last_y = S::one();

    let mut rng = rand::rngs::StdRng::from_seed(seed);
    let step_fn = move || {
        last_x = last_x + rng.sample(range);
        last_y = last_y + rng.sample(range);

        Some(Point2::new(last_x, last_y))
    };
    std::iter::from_fn(step_fn)
}

/// A square grid with `size` sites. Every grid cell yields four co-circular sites.
pub fn grid_distribution(size: usize) -> impl Iterator<Item = Point2<f64>> {
    let side = (size as f64).sqrt().ceil() as usize;
    (0..size).map(move |index| Point2::new((index % side) as f64, (index / side) as f64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleSize {
    LargeSampleSet,
    SmallSampleSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleDistribution {
    RandomWalk,
    Uniform,
    Grid,
}

impl Display for SampleDistribution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleDistribution::RandomWalk => "locally clustered",
            SampleDistribution::Uniform => "uniformly distributed",
            SampleDistribution::Grid => "grid lattice",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructionBenchConfig {
    pub sample_size: SampleSize,
    pub sample_distribution: SampleDistribution,
    pub options: VoronoiOptions,
}

impl ConstructionBenchConfig {
    pub fn apply(&self, group: &mut BenchmarkGroup<WallTime>) {
        let sizes = self.get_sizes();
        let name = self.get_name();

        for size in sizes {
            group.throughput(Throughput::Elements(*size as u64));
            group.bench_with_input(BenchmarkId::new(name.clone(), size), &size, |b, &size| {
                let data = self.get_distribution().take(*size).collect::<Vec<_>>();
                b.iter(|| VoronoiDiagram::with_options(&data, self.options).unwrap())
            });
        }
    }

    fn get_sizes(&self) -> &[usize] {
        match self.sample_size {
            SampleSize::LargeSampleSet => &[50_000, 100_000, 200_000],
            SampleSize::SmallSampleSet => &[1000, 2000, 4000, 8000, 16_000],
        }
    }

    fn get_name(&self) -> String {
        format!("construction, {}", self.sample_distribution)
    }

    fn get_distribution(&self) -> Box<dyn Iterator<Item = Point2<f64>>> {
        let range = 1000.0;
        match self.sample_distribution {
            SampleDistribution::RandomWalk => Box::new(random_walk_distribution(range, *SEED)),
            SampleDistribution::Uniform => Box::new(uniform_distribution(*SEED, range)),
            SampleDistribution::Grid => Box::new(grid_distribution(
                *self.get_sizes().last().unwrap_or(&0),
            )),
        }
    }
}
