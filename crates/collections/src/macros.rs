/// Builds a [`Pair`](crate::hashmap::Pair), copying the key.
///
/// The key is anything `AsRef<[u8]>` (`"k"`, `&String`, `b"k"`, ...), taken
/// by reference.
#[macro_export]
macro_rules! pair {
    ( $key: expr, $value: expr) => {
        $crate::hashmap::Pair::new($key, $value)
    };
}
