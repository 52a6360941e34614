/// Hand-picked slot counts, ascending.
///
/// Dense up to ~100k so small tables grow in modest steps, then sparse.
pub const PRIMES: [usize; 148] = [
    3, 5, 7, 11, 17, 19, 23, 29, 37, 53, 73, 107, 157, 233, 347, 503, 751,
    1009, 1511, 2003, 3001, 4001, 5003, 6007, 7001, 8009, 9001,
    10007, 11003, 12007, 13001, 14009, 15013, 16001, 17011, 18013, 19001,
    20011, 21001, 22003, 23003, 24001, 25013, 26003, 27011, 28001, 29009,
    30011, 31013, 32003, 33013, 34019, 35023, 36007, 37003, 38011, 39019,
    40009, 41011, 42013, 43003, 44017, 45007, 46021, 47017, 48017, 49003,
    50021, 51001, 52009, 53003, 54001, 55001, 56003, 57037, 58013, 59009,
    60013, 61001, 62003, 63029, 64007, 65003, 66029, 67003, 68023, 69001,
    70001, 71011, 72019, 73009, 74017, 75011, 76001, 77003, 78007, 79031,
    80021, 81001, 82003, 83003, 84011, 85009, 86011, 87011, 88001, 89003,
    90001, 91009, 92003, 93001, 94007, 95003, 96001, 97001, 98009, 99013,
    100003, 101009, 102001, 103001, 104003, 224737, 350377, 479909,
    611953, 746773, 882377, 1020379, 1159523, 1299709, 2750159, 4256233,
    5800079, 7368787, 8960453, 10570841, 12195257, 13834103, 15485863,
    32452843, 49979687, 67867967, 86028121, 104395301, 122949823,
    141650939, 160481183,
];

/// Returns the smallest tabulated prime `>= target`.
///
/// Past the end of the table this falls back to `target * 2 + 1`, which is
/// odd but not necessarily prime.
pub fn next_capacity(target: usize) -> usize {
    let idx = PRIMES.partition_point(|&p| p < target);
    match PRIMES.get(idx) {
        Some(&p) => p,
        None => target.saturating_mul(2).saturating_add(1),
    }
}

#[cfg(test)]
mod test {
    use super::{PRIMES, next_capacity};

    fn is_prime(n: usize) -> bool {
        n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    #[test]
    fn table_is_sorted_primes() {
        assert!(PRIMES.windows(2).all(|w| w[0] < w[1]));
        assert!(PRIMES.iter().all(|&p| is_prime(p)));
    }

    #[test]
    fn picks_smallest_at_or_above() {
        assert_eq!(next_capacity(0), 3);
        assert_eq!(next_capacity(3), 3);
        assert_eq!(next_capacity(4), 5);
        assert_eq!(next_capacity(8), 11);
        assert_eq!(next_capacity(12), 17);
        assert_eq!(next_capacity(1009), 1009);
        assert_eq!(next_capacity(1010), 1511);
        assert_eq!(next_capacity(104_004), 224_737);
        assert_eq!(next_capacity(160_481_183), 160_481_183);
    }

    #[test]
    fn falls_back_to_odd_past_the_table() {
        assert_eq!(next_capacity(160_481_184), 320_962_369);
        assert_eq!(next_capacity(usize::MAX), usize::MAX);
    }

    #[test]
    fn monotonic() {
        let mut last = 0;
        for target in (0..300_000).step_by(7).chain([160_481_183, 160_481_184, 200_000_000]) {
            let cap = next_capacity(target);
            assert!(cap >= target);
            assert!(cap >= last, "next_capacity({target}) went backwards");
            last = cap;
        }
    }
}
