pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Unnormalized deviation sums `(var_x, var_y, cov)` of paired samples.
///
/// Samples are shifted by the first pair before averaging. The sums are
/// unchanged mathematically, but a constant series produces exactly zero
/// deviation instead of rounding noise around its mean.
pub fn deviation_sums(pairs: &[(f64, f64)]) -> (f64, f64, f64) {
    let Some(&(x0, y0)) = pairs.first() else {
        return (0.0, 0.0, 0.0);
    };

    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().map(|(x, y)| (x - x0, y - y0)).unzip();
    let mean_x = mean(&xs);
    let mean_y = mean(&ys);

    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        var_x += dx * dx;
        var_y += dy * dy;
        cov += dx * dy;
    }

    (var_x, var_y, cov)
}
