// Stable descending sort on `key`, cut down to the first `k`. Equal keys keep their incoming order.
pub fn top_k_by<T, F>(mut items: Vec<T>, k: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> u64,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.truncate(k);
    items
}

// Maps val from [0, in_high] onto [0, out_high], rounding to the nearest whole step.
pub fn scale_clamped(val: u64, in_high: u64, out_high: usize) -> usize {
    if in_high == 0 {
        return 0;
    }

    let clamped = val.min(in_high) as f64 / in_high as f64;
    (clamped * out_high as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_keeps_order_among_ties() {
        let items = vec![("a", 1), ("b", 3), ("c", 1), ("d", 3), ("e", 2)];
        let top = top_k_by(items, 4, |(_, v)| *v);
        assert_eq!(top, vec![("b", 3), ("d", 3), ("e", 2), ("a", 1)]);
    }

    #[test]
    fn top_k_larger_than_input() {
        let top = top_k_by(vec![2u64, 7], 10, |v| *v);
        assert_eq!(top, vec![7, 2]);
        assert!(top_k_by(vec![2u64, 7], 0, |v| *v).is_empty());
    }

    #[test]
    fn scale() {
        assert_eq!(scale_clamped(50, 100, 40), 20);
        assert_eq!(scale_clamped(100, 100, 40), 40);
        assert_eq!(scale_clamped(500, 100, 40), 40);
        assert_eq!(scale_clamped(0, 100, 40), 0);
        assert_eq!(scale_clamped(3, 0, 40), 0);
    }
}
