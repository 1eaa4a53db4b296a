/// Calculate the coefficient of determination (R²)
///
/// R² = 1 - SS_res / SS_tot
///
/// A constant `actual` series has no variance to explain: a perfect fit
/// scores 1.0 and anything else 0.0. Fewer than two samples score 0.0.
///
/// # Arguments
/// * `predicted` - Model output
/// * `actual` - Observed values
///
/// # Returns
/// R², unbounded below
pub fn r2_score(predicted: &[f64], actual: &[f64]) -> f64 {
    let n = predicted.len().min(actual.len());
    if n < 2 {
        return 0.0;
    }

    let mean = actual.iter().take(n).sum::<f64>() / n as f64;
    let ss_res: f64 = predicted
        .iter()
        .zip(actual.iter())
        .take(n)
        .map(|(p, a)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().take(n).map(|a| (a - mean).powi(2)).sum();

    if ss_tot <= f64::EPSILON {
        return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}

/// Calculate Root Mean Squared Error (RMSE)
///
/// RMSE = sqrt(mean((actual - predicted)^2))
pub fn root_mean_squared_error(predicted: &[f64], actual: &[f64]) -> f64 {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }

    let sum_squared_errors: f64 = predicted
        .iter()
        .zip(actual.iter())
        .take(n)
        .map(|(p, a)| (a - p).powi(2))
        .sum();

    (sum_squared_errors / n as f64).sqrt()
}

/// Calculate Mean Absolute Error (MAE)
///
/// MAE = mean(|actual - predicted|)
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> f64 {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }

    let sum_absolute_errors: f64 = predicted
        .iter()
        .zip(actual.iter())
        .take(n)
        .map(|(p, a)| (a - p).abs())
        .sum();

    sum_absolute_errors / n as f64
}
