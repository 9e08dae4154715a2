//! Bounded Nelder-Mead simplex minimisation used for model fitting.

/// Outcome of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the simplex met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Nelder-Mead settings.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values and on the
    /// simplex diameter.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

type Bounds<'a> = Option<&'a [(f64, f64)]>;

/// Simplex vertices with their objective values, kept sorted best-first.
struct Simplex {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
}

impl Simplex {
    fn around<F>(objective: &F, initial: &[f64], bounds: Bounds, step: f64) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut vertices = vec![clamp(initial.to_vec(), bounds)];
        for i in 0..initial.len() {
            let mut vertex = initial.to_vec();
            vertex[i] += if initial[i].abs() > 1e-10 {
                step * initial[i].abs()
            } else {
                step
            };
            vertices.push(clamp(vertex, bounds));
        }
        let values = vertices.iter().map(|v| objective(v)).collect();
        let mut simplex = Self { vertices, values };
        simplex.sort();
        simplex
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| total_cmp(self.values[a], self.values[b]));
        self.vertices = order.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn worst(&self) -> usize {
        self.values.len() - 1
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let n = self.worst();
        let mut centroid = vec![0.0; self.vertices[0].len()];
        for vertex in &self.vertices[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= n as f64);
        centroid
    }

    fn diameter(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| distance(v, centroid))
            .fold(0.0, f64::max)
    }

    fn replace_worst(&mut self, vertex: Vec<f64>, value: f64) {
        let worst = self.worst();
        self.vertices[worst] = vertex;
        self.values[worst] = value;
    }

    fn shrink<F>(&mut self, objective: &F, bounds: Bounds, sigma: f64)
    where
        F: Fn(&[f64]) -> f64,
    {
        let best = self.vertices[0].clone();
        for i in 1..self.vertices.len() {
            let shrunk = best
                .iter()
                .zip(&self.vertices[i])
                .map(|(b, x)| b + sigma * (x - b))
                .collect();
            self.vertices[i] = clamp(shrunk, bounds);
            self.values[i] = objective(&self.vertices[i]);
        }
    }
}

/// Minimise `objective` starting from `initial`, optionally clamping every
/// trial point into per-dimension `bounds`.
///
/// The run is fully deterministic: identical inputs always produce an
/// identical result.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::around(&objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        let worst = simplex.worst();
        let best_value = simplex.values[0];
        let worst_value = simplex.values[worst];
        let second_worst_value = simplex.values[worst - 1];

        if worst_value - best_value < config.tolerance {
            converged = true;
            break;
        }
        let centroid = simplex.centroid();
        if simplex.diameter(&centroid) < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp(
            towards(&centroid, &simplex.vertices[worst], -config.alpha),
            bounds,
        );
        let reflected_value = objective(&reflected);

        if reflected_value < best_value {
            let expanded = clamp(towards(&centroid, &reflected, config.gamma), bounds);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex.replace_worst(expanded, expanded_value);
            } else {
                simplex.replace_worst(reflected, reflected_value);
            }
        } else if reflected_value < second_worst_value {
            simplex.replace_worst(reflected, reflected_value);
        } else {
            // Contract outside when the reflection beat the worst vertex,
            // otherwise inside.
            let (anchor, anchor_value) = if reflected_value < worst_value {
                (reflected, reflected_value)
            } else {
                (simplex.vertices[worst].clone(), worst_value)
            };
            let contracted = clamp(towards(&centroid, &anchor, config.rho), bounds);
            let contracted_value = objective(&contracted);
            if contracted_value < anchor_value
                || (contracted_value <= anchor_value && anchor_value < worst_value)
            {
                simplex.replace_worst(contracted, contracted_value);
            } else {
                simplex.shrink(&objective, bounds, config.sigma);
            }
        }
        simplex.sort();
    }

    NelderMeadResult {
        optimal_point: simplex.vertices[0].clone(),
        optimal_value: simplex.values[0],
        iterations,
        converged,
    }
}

/// `centroid + t * (point - centroid)`; negative `t` reflects through the
/// centroid.
fn towards(centroid: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + t * (p - c))
        .collect()
}

fn clamp(mut point: Vec<f64>, bounds: Bounds) -> Vec<f64> {
    if let Some(bounds) = bounds {
        for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(lo, hi);
        }
    }
    point
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

// NaN sorts last so a vertex with an undefined objective is always the first
// to be replaced.
fn total_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
