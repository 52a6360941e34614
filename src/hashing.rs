use std::io::{self, BufRead, Write};

use collections::hashmap::hash;
use log::trace;

/// djb2 of `input`, reduced modulo `modulus` when one is given
pub fn hash_bytes(input: &[u8], modulus: Option<u64>) -> u64 {
    let h = hash(input);
    match modulus {
        Some(m) => h % m,
        None => h,
    }
}

/// Writes `hash\tline` for every line of `input`, returning the line count.
///
/// Lines are hashed and echoed as raw bytes.
pub fn hash_lines<R: BufRead, W: Write>(input: R, out: &mut W, modulus: Option<u64>) -> io::Result<usize> {
    let mut count = 0;
    for line in crate::words::lines(input) {
        let line = line?;
        let h = hash_bytes(&line, modulus);
        trace!(target: "hash_lines", "{h} <- {:?}", String::from_utf8_lossy(&line));
        write!(out, "{h}\t")?;
        out.write_all(&line)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    Ok(count)
}
