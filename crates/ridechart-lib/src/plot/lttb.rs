use crate::signal::forward_fill;

/// Select at most `target` indices of `values` that preserve the visual shape.
///
/// The first and last samples are always kept. Non-finite samples are held at the last
/// finite value (0 before the first) for the area computation only.
pub fn select_indices(values: &[f64], target: usize) -> Vec<usize> {
    let n = values.len();
    if target >= n || n <= 2 {
        return (0..n).collect();
    }
    match target {
        0 => return Vec::new(),
        1 => return vec![0],
        2 => return vec![0, n - 1],
        _ => {}
    }

    let held = forward_fill(values);
    let buckets = target - 2;
    let interior = n - 2;
    // integer floor keeps bucket edges reproducible for identical inputs
    let bound = |k: usize| (1 + k * interior / buckets).min(n);

    let mut selected = Vec::with_capacity(target);
    selected.push(0);
    let mut a = 0usize;

    for k in 0..buckets {
        let start = bound(k);
        let end = bound(k + 1).min(n - 1);

        let next_start = end;
        let next_end = bound(k + 2);
        let (cx, cy) = if next_end > next_start {
            centroid(&held, next_start, next_end)
        } else {
            ((n - 1) as f64, held[n - 1])
        };

        let ax = a as f64;
        let ay = held[a];
        let mut best = start;
        let mut best_area = -1.0f64;
        for (i, &y) in held.iter().enumerate().take(end).skip(start) {
            let area = ((ax - cx) * (y - ay) - (ax - i as f64) * (cy - ay)).abs();
            if area > best_area {
                best_area = area;
                best = i;
            }
        }
        selected.push(best);
        a = best;
    }

    selected.push(n - 1);
    selected
}

fn centroid(held: &[f64], start: usize, end: usize) -> (f64, f64) {
    let count = (end - start) as f64;
    let sum_x: f64 = (start..end).map(|i| i as f64).sum();
    let sum_y: f64 = held[start..end].iter().sum();
    (sum_x / count, sum_y / count)
}
