use patternml_core::error::ClassifyResult;
use patternml_core::{ClassifyError, Float, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Hard clustering used to seed EM: centroids plus each row's cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T: Float> {
    pub centroids: Vec<Vec<T>>,
    pub assignments: Vec<usize>,
}

impl<T: Float> Partition<T> {
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.centroids.len()];
        for &k in &self.assignments {
            counts[k] += 1;
        }
        counts
    }
}

/// Seeded K-Means with k-means++ seeding. Same seed and rows, same partition.
#[derive(Debug, Clone, Copy)]
pub struct KMeansInit {
    pub n_clusters: usize,
    pub max_iter: usize,
    pub seed: u64,
}

fn sq_dist<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b).map(|(&x, &y)| (x - y) * (x - y)).sum()
}

fn nearest<T: Float>(row: &[T], centroids: &[Vec<T>]) -> (usize, T) {
    let mut best_dist = T::INFINITY;
    let mut best_k = 0;
    for (k, c) in centroids.iter().enumerate() {
        let dist = sq_dist(row, c);
        if dist < best_dist {
            best_dist = dist;
            best_k = k;
        }
    }
    (best_k, best_dist)
}

impl KMeansInit {
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        KMeansInit {
            n_clusters,
            max_iter: 100,
            seed,
        }
    }

    pub fn fit<T: Float>(&self, x: &Tensor<T>) -> ClassifyResult<Partition<T>> {
        let (n, d) = x.matrix_dims()?;
        if self.n_clusters == 0 || n < self.n_clusters {
            return Err(ClassifyError::InvalidParameter(format!(
                "cannot form {} clusters from {} rows",
                self.n_clusters, n
            )));
        }

        let mut centroids = self.init_centroids_pp(x)?;
        let mut assignments = vec![0usize; n];

        for iter in 0..self.max_iter {
            // Assignment step
            let mut changed = false;
            for (i, row) in x.rows()?.enumerate() {
                let (k, _) = nearest(row, &centroids);
                if assignments[i] != k {
                    assignments[i] = k;
                    changed = true;
                }
            }

            // Update step; an emptied cluster keeps its previous centroid.
            let mut sums = vec![vec![T::ZERO; d]; self.n_clusters];
            let mut counts = vec![0usize; self.n_clusters];
            for (row, &k) in x.rows()?.zip(&assignments) {
                counts[k] += 1;
                for (s, &v) in sums[k].iter_mut().zip(row) {
                    *s += v;
                }
            }
            for k in 0..self.n_clusters {
                if counts[k] > 0 {
                    let cnt = T::from_usize(counts[k]);
                    centroids[k] = sums[k].iter().map(|&s| s / cnt).collect();
                }
            }

            if !changed && iter > 0 {
                break;
            }
        }

        Ok(Partition {
            centroids,
            assignments,
        })
    }

    fn init_centroids_pp<T: Float>(&self, x: &Tensor<T>) -> ClassifyResult<Vec<Vec<T>>> {
        let (n, _) = x.matrix_dims()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids: Vec<Vec<T>> = Vec::with_capacity(self.n_clusters);

        // Pick first centroid uniformly
        let first = ((rand::Rng::gen::<f64>(&mut rng) * n as f64) as usize).min(n - 1);
        centroids.push(x.row(first)?.to_vec());

        // Pick remaining centroids proportional to distance²
        for _k in 1..self.n_clusters {
            let distances: Vec<f64> = x
                .rows()?
                .map(|row| nearest(row, &centroids).1.to_f64())
                .collect();

            let total: f64 = distances.iter().sum();
            let threshold = rand::Rng::gen::<f64>(&mut rng) * total;
            let mut cumulative = 0.0;
            let mut selected = n - 1;
            for (i, &dist) in distances.iter().enumerate() {
                cumulative += dist;
                if cumulative > threshold {
                    selected = i;
                    break;
                }
            }

            centroids.push(x.row(selected)?.to_vec());
        }

        Ok(centroids)
    }
}
