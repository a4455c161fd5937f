use std::cmp::Ordering;

/// Fields that decide a merit position.
#[derive(Debug, Clone, Copy)]
pub struct MeritKey<'a> {
    pub sgpa: Option<f64>,
    pub percentage: f64,
    pub roll_number: &'a str,
}

/// SGPA descending with missing SGPA last, then percentage descending, then
/// roll number ascending.
pub fn compare_merit(a: &MeritKey<'_>, b: &MeritKey<'_>) -> Ordering {
    let by_sgpa = match (a.sgpa, b.sgpa) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_sgpa
        .then_with(|| b.percentage.total_cmp(&a.percentage))
        .then_with(|| a.roll_number.cmp(b.roll_number))
}

/// Sort rows into merit order and keep the first `limit`.
pub fn rank_by_merit<T, F>(rows: &mut Vec<T>, limit: usize, key: F)
where
    F: Fn(&T) -> MeritKey<'_>,
{
    rows.sort_by(|a, b| compare_merit(&key(a), &key(b)));
    rows.truncate(limit);
}

/// Sort rows by roll number ascending. Applied after the result/student join is
/// materialized rather than in SQL.
pub fn sort_by_roll_number<T, F>(rows: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    rows.sort_by(|a, b| key(a).cmp(key(b)));
}
