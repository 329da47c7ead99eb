//! Gaussian peak shape and its Levenberg-Marquardt least squares fit.

use crate::errors::FitError;

/// `2 * sqrt(2 * ln(2))`, FWHM of a unit Gaussian.
pub const FWHM_FACTOR: f64 = 2.354_820_045_030_949_3;

const NUM_PARAMS: usize = 3;
const MAX_LAMBDA: f64 = 1e15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPeakShape {
    pub amplitude: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl GaussianPeakShape {
    pub fn new(amplitude: f64, mu: f64, sigma: f64) -> Self {
        Self {
            amplitude,
            mu,
            sigma,
        }
    }

    pub fn density(&self, x: f64) -> f64 {
        self.amplitude * (-0.5 * ((x - self.mu) / self.sigma).powi(2)).exp()
    }

    pub fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| self.density(*v)).collect()
    }

    /// Full width at half maximum.
    pub fn fwhm(&self) -> f64 {
        FWHM_FACTOR * self.sigma
    }

    fn from_array(p: [f64; NUM_PARAMS]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    fn to_array(self) -> [f64; NUM_PARAMS] {
        [self.amplitude, self.mu, self.sigma]
    }

    fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.mu.is_finite() && self.sigma.is_finite()
    }

    /// Data driven starting point: the highest point gives amplitude and
    /// position, the span of the points above half height gives sigma.
    pub fn initial_guess(x: &[f64], y: &[f64]) -> Self {
        let mut apex = 0;
        for (i, v) in y.iter().enumerate() {
            if *v > y[apex] {
                apex = i;
            }
        }
        let amplitude = y[apex];
        let half = amplitude / 2.0;
        let mut lo = apex;
        while lo > 0 && y[lo - 1] >= half {
            lo -= 1;
        }
        let mut hi = apex;
        while hi + 1 < y.len() && y[hi + 1] >= half {
            hi += 1;
        }
        let mut sigma = (x[hi] - x[lo]) / FWHM_FACTOR;
        if sigma <= 0.0 && x.len() > 1 {
            sigma = (x[x.len() - 1] - x[0]) / (x.len() - 1) as f64;
        }
        Self::new(amplitude, x[apex], sigma)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FitSettings {
    pub max_iterations: usize,
    pub ftol: f64,
    pub xtol: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct GaussianFit {
    pub model: GaussianPeakShape,
    /// Sum of squared residuals at the solution.
    pub chi_square: f64,
    pub iterations: usize,
}

struct Normal {
    jtj: [[f64; NUM_PARAMS]; NUM_PARAMS],
    jtr: [f64; NUM_PARAMS],
}

fn chi_square(model: &GaussianPeakShape, x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(xi, yi)| (yi - model.density(*xi)).powi(2))
        .sum()
}

fn normal_equations(model: &GaussianPeakShape, x: &[f64], y: &[f64]) -> Normal {
    let mut jtj = [[0.0; NUM_PARAMS]; NUM_PARAMS];
    let mut jtr = [0.0; NUM_PARAMS];
    let s2 = model.sigma * model.sigma;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - model.mu;
        let e = (-0.5 * dx * dx / s2).exp();
        let f = model.amplitude * e;
        let jac = [e, f * dx / s2, f * dx * dx / (s2 * model.sigma)];
        let r = yi - f;
        for a in 0..NUM_PARAMS {
            jtr[a] += jac[a] * r;
            for b in 0..NUM_PARAMS {
                jtj[a][b] += jac[a] * jac[b];
            }
        }
    }
    Normal { jtj, jtr }
}

/// Gaussian elimination with partial pivoting, `None` if singular.
fn solve3(mut a: [[f64; NUM_PARAMS]; NUM_PARAMS], mut b: [f64; NUM_PARAMS]) -> Option<[f64; 3]> {
    for col in 0..NUM_PARAMS {
        let pivot = (col..NUM_PARAMS).max_by(|i, j| a[*i][col].abs().total_cmp(&a[*j][col].abs()))?;
        if a[pivot][col].abs() < f64::MIN_POSITIVE {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..NUM_PARAMS {
            let factor = a[row][col] / a[col][col];
            for k in col..NUM_PARAMS {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut out = [0.0; NUM_PARAMS];
    for row in (0..NUM_PARAMS).rev() {
        let mut acc = b[row];
        for k in (row + 1)..NUM_PARAMS {
            acc -= a[row][k] * out[k];
        }
        out[row] = acc / a[row][row];
    }
    if out.iter().all(|v| v.is_finite()) {
        Some(out)
    } else {
        None
    }
}

/// Least squares fit of a Gaussian to `(x, y)`.
///
/// The fit runs on x values centered on the starting apex so the parameters
/// stay on comparable scales. Convergence follows the usual MINPACK tests
/// on the relative reduction of chi-square (`ftol`) and on the relative
/// parameter step (`xtol`). A step that cannot lower chi-square even with a
/// vanishing step size means the fit sits on a minimum, and also counts as
/// converged.
pub fn fit_gaussian(x: &[f64], y: &[f64], settings: &FitSettings) -> Result<GaussianFit, FitError> {
    if x.len() < NUM_PARAMS + 1 {
        return Err(FitError::InsufficientPoints {
            real: x.len(),
            expected: NUM_PARAMS + 1,
        });
    }
    if y.iter().any(|v| !v.is_finite()) || x.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFiniteParameters);
    }

    let guess = GaussianPeakShape::initial_guess(x, y);
    if !(guess.amplitude > 0.0 && guess.sigma > 0.0) {
        return Err(FitError::DegenerateWindow);
    }

    let x0 = guess.mu;
    let xc: Vec<f64> = x.iter().map(|v| v - x0).collect();
    let mut model = GaussianPeakShape::new(guess.amplitude, 0.0, guess.sigma);
    let mut chi2 = chi_square(&model, &xc, y);
    let mut normal = normal_equations(&model, &xc, y);
    let mut lambda = 1e-3;
    let y_norm2: f64 = y.iter().map(|v| v * v).sum();

    let finish = |model: GaussianPeakShape, chi2: f64, iterations: usize| {
        let model = GaussianPeakShape::new(model.amplitude, model.mu + x0, model.sigma.abs());
        if model.is_finite() {
            Ok(GaussianFit {
                model,
                chi_square: chi2,
                iterations,
            })
        } else {
            Err(FitError::NonFiniteParameters)
        }
    };

    for iteration in 1..=settings.max_iterations {
        if chi2 <= f64::EPSILON * f64::EPSILON * y_norm2 {
            return finish(model, chi2, iteration - 1);
        }

        let mut a = normal.jtj;
        for (i, row) in a.iter_mut().enumerate() {
            let d = if row[i] > 0.0 { row[i] } else { 1.0 };
            row[i] += lambda * d;
        }

        let p = model.to_array();
        let candidate = solve3(a, normal.jtr).map(|delta| {
            let mut next = p;
            for i in 0..NUM_PARAMS {
                next[i] += delta[i];
            }
            (delta, GaussianPeakShape::from_array(next))
        });

        let accepted = match candidate {
            Some((delta, next)) if next.is_finite() && next.sigma > 0.0 => {
                let next_chi2 = chi_square(&next, &xc, y);
                if next_chi2.is_finite() && next_chi2 < chi2 {
                    Some((delta, next, next_chi2))
                } else {
                    None
                }
            }
            _ => None,
        };

        match accepted {
            Some((delta, next, next_chi2)) => {
                let reduction = (chi2 - next_chi2) / chi2;
                let small_step = delta
                    .iter()
                    .zip(p.iter())
                    .all(|(d, v)| d.abs() <= settings.xtol * (v.abs() + settings.xtol));
                model = next;
                chi2 = next_chi2;
                if reduction <= settings.ftol || small_step {
                    return finish(model, chi2, iteration);
                }
                normal = normal_equations(&model, &xc, y);
                lambda = (lambda / 10.0).max(1e-12);
            }
            None => {
                lambda *= 10.0;
                if lambda > MAX_LAMBDA {
                    return finish(model, chi2, iteration);
                }
            }
        }
    }

    Err(FitError::NonConvergence {
        iterations: settings.max_iterations,
    })
}
