//! Real roots of quadratic, cubic and quartic polynomials.
//!
//! The closed forms lose precision near repeated roots, so quartic roots are
//! polished with a few Newton steps against the original polynomial before
//! being returned.

use std::f64::consts::PI;

const COEF_EPS: f64 = 1e-12;
const NEWTON_STEPS: usize = 4;

/// Real roots of `a*x^2 + b*x + c`, ascending.
///
/// Falls back to the linear root when `a` vanishes.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < COEF_EPS {
        if b.abs() < COEF_EPS {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // Avoid cancellation between -b and the root of the discriminant.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0, 0.0];
    }
    let (r0, r1) = (q / a, c / q);
    if r0 <= r1 {
        vec![r0, r1]
    } else {
        vec![r1, r0]
    }
}

/// Real roots of `a*x^3 + b*x^2 + c*x + d`, ascending.
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < COEF_EPS {
        return quadratic_roots(b, c, d);
    }
    let (b, c, d) = (b / a, c / a, d / a);

    // x = y - b/3 gives y^3 + p*y + q = 0
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let half_q = q / 2.0;
    let third_p = p / 3.0;
    let disc = half_q * half_q + third_p * third_p * third_p;

    let mut roots = if disc > COEF_EPS {
        let s = disc.sqrt();
        vec![(-half_q + s).cbrt() + (-half_q - s).cbrt() - shift]
    } else if disc.abs() <= COEF_EPS {
        if p.abs() < COEF_EPS {
            vec![-shift]
        } else {
            let u = (-half_q).cbrt();
            vec![2.0 * u - shift, -u - shift]
        }
    } else {
        let m = 2.0 * (-third_p).sqrt();
        let theta = ((3.0 * q) / (p * m)).clamp(-1.0, 1.0).acos() / 3.0;
        (0..3)
            .map(|k| m * (theta - 2.0 * PI * k as f64 / 3.0).cos() - shift)
            .collect()
    };
    roots.sort_by(f64::total_cmp);
    roots
}

/// A quartic `c[0]*x^4 + c[1]*x^3 + c[2]*x^2 + c[3]*x + c[4]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartic {
    /// Coefficients, highest degree first.
    pub c: [f64; 5],
}

impl Quartic {
    /// Build from coefficients, highest degree first.
    pub fn new(c4: f64, c3: f64, c2: f64, c1: f64, c0: f64) -> Self {
        Self {
            c: [c4, c3, c2, c1, c0],
        }
    }

    /// Evaluate at `x` (Horner).
    pub fn eval(&self, x: f64) -> f64 {
        self.c.iter().fold(0.0, |acc, &k| acc * x + k)
    }

    /// Evaluate the first derivative at `x`.
    pub fn slope(&self, x: f64) -> f64 {
        let [a, b, c, d, _] = self.c;
        ((4.0 * a * x + 3.0 * b) * x + 2.0 * c) * x + d
    }

    /// Real roots, ascending, with near-duplicates collapsed.
    pub fn real_roots(&self) -> Vec<f64> {
        let [a, b, c, d, e] = self.c;
        let mut roots = if a.abs() < COEF_EPS {
            cubic_roots(b, c, d, e)
        } else {
            ferrari(b / a, c / a, d / a, e / a)
        };
        for r in roots.iter_mut() {
            *r = self.polish(*r);
        }
        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|x, y| (*x - *y).abs() < 1e-9);
        roots
    }

    fn polish(&self, mut x: f64) -> f64 {
        for _ in 0..NEWTON_STEPS {
            let slope = self.slope(x);
            if slope.abs() < COEF_EPS {
                break;
            }
            let step = self.eval(x) / slope;
            if !step.is_finite() {
                break;
            }
            x -= step;
        }
        x
    }
}

/// Ferrari's method for the monic quartic `x^4 + b*x^3 + c*x^2 + d*x + e`.
fn ferrari(b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    // x = y - b/4 gives y^4 + p*y^2 + q*y + r = 0
    let shift = b / 4.0;
    let b2 = b * b;
    let p = c - 3.0 * b2 / 8.0;
    let q = d - b * c / 2.0 + b2 * b / 8.0;
    let r = e - b * d / 4.0 + b2 * c / 16.0 - 3.0 * b2 * b2 / 256.0;

    let mut ys = Vec::with_capacity(4);
    if q.abs() < COEF_EPS {
        // Biquadratic in y^2.
        for y2 in quadratic_roots(1.0, p, r) {
            if y2 >= 0.0 {
                let y = y2.sqrt();
                ys.push(y);
                ys.push(-y);
            }
        }
    } else {
        // Largest root of the resolvent 8m^3 + 8p*m^2 + (2p^2 - 8r)*m - q^2 = 0
        let m = cubic_roots(8.0, 8.0 * p, 2.0 * p * p - 8.0 * r, -q * q)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        if m <= 0.0 {
            return Vec::new();
        }
        let s = (2.0 * m).sqrt();
        let t = q / (2.0 * s);
        ys.extend(quadratic_roots(1.0, s, p / 2.0 + m - t));
        ys.extend(quadratic_roots(1.0, -s, p / 2.0 + m + t));
    }
    ys.into_iter().map(|y| y - shift).collect()
}
