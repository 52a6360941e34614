//! Line-oriented load/unload passes over a [`Dict`], used by `word_dict`.
//!
//! Every line becomes a key, and an owned copy of the line becomes its
//! value. Lines are raw bytes; nothing here assumes UTF-8. Byte counts use
//! the C convention of `len + 1` per string.

use std::io::{self, BufRead, Write};

use collections::{Dict, DictStats};
use log::{info, trace};

use crate::HarnessError;

/// Log a progress line every this many removals
pub const PROGRESS_EVERY: usize = 10_000;

/// Entries shown at the start of a preview
pub const PREVIEW_HEAD: usize = 30;

/// Entries shown at the end of a preview
pub const PREVIEW_TAIL: usize = 10;

/// Outcome of [`load_words`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines read, duplicates included
    pub lines: usize,
    /// Bytes held by the values still in the dictionary
    pub bytes_allocated: usize,
    pub stats: DictStats,
}

/// Lines of `input` with the trailing `\n` removed
pub fn lines<R: BufRead>(mut input: R) -> impl Iterator<Item = io::Result<Vec<u8>>> {
    std::iter::from_fn(move || {
        let mut line = Vec::new();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    })
}

/// Bytes a C string of this length would take, terminator included
fn c_size(s: &[u8]) -> usize {
    s.len() + 1
}

fn lossy(s: &[u8]) -> String {
    String::from_utf8_lossy(s).into_owned()
}

/// Puts every line of `input` into `dict`, keyed by itself.
///
/// A value replaced by a duplicate line is dropped here, since this function
/// is its owner once the dictionary hands it back. Each value is read back
/// right after the `put`.
pub fn load_words<R: BufRead>(dict: &mut Dict<Vec<u8>>, input: R) -> Result<LoadReport, HarnessError> {
    let mut lines_read = 0;
    let mut bytes_allocated = 0;

    for line in lines(input) {
        let line = line?;

        if let Some(replaced) = dict.put(&line, line.clone())? {
            bytes_allocated -= c_size(&replaced);
        }

        match dict.get(&line)? {
            Some(value) if *value == line => {}
            found => {
                return Err(HarnessError::Mismatch {
                    key: lossy(&line),
                    expected: lossy(&line),
                    found: found.map(|v| lossy(v)).unwrap_or_default(),
                });
            }
        }

        lines_read += 1;
        bytes_allocated += c_size(&line);
    }

    Ok(LoadReport {
        lines: lines_read,
        bytes_allocated,
        stats: dict.stats(),
    })
}

/// Removes every line of `input` from `dict`, returning the bytes of the
/// values that came back.
///
/// Each removed value is written to `dump` followed by a newline; pass
/// [`io::sink`] to discard them.
pub fn unload_words<R: BufRead, W: Write>(
    dict: &mut Dict<Vec<u8>>,
    input: R,
    dump: &mut W,
) -> Result<usize, HarnessError> {
    let mut bytes_freed = 0;

    for (count, line) in lines(input).enumerate() {
        let line = line?;

        if (count + 1) % PROGRESS_EVERY == 0 {
            info!("removed {} items", count + 1);
        }

        if let Some(removed) = dict.remove(&line)? {
            trace!(target: "unload_words", "{}", String::from_utf8_lossy(&removed));
            dump.write_all(&removed)?;
            dump.write_all(b"\n")?;
            bytes_freed += c_size(&removed);
        }
    }

    Ok(bytes_freed)
}

/// Tears `dict` down and disposes of every value it held, returning
/// `(strings freed, bytes freed)`. Values go to `dump` one per line.
pub fn free_words<W: Write>(dict: Dict<Vec<u8>>, dump: &mut W) -> io::Result<(usize, usize)> {
    let mut count = 0;
    let mut bytes = 0;

    for value in dict.into_values() {
        trace!(target: "free_words", "{}", String::from_utf8_lossy(&value));
        dump.write_all(&value)?;
        dump.write_all(b"\n")?;
        count += 1;
        bytes += c_size(&value);
    }
    Ok((count, bytes))
}

/// Writes the first 30 and last 10 entries of `dict`, one `key:value` per
/// line, with a marker for everything skipped in between.
pub fn preview<W: Write>(dict: &Dict<Vec<u8>>, out: &mut W) -> io::Result<()> {
    let total = dict.len();
    let skipped = total.saturating_sub(PREVIEW_HEAD + PREVIEW_TAIL);

    for (i, pair) in dict.iter().enumerate() {
        if skipped > 0 && i == PREVIEW_HEAD {
            writeln!(out, "skipping {skipped} entries...")?;
        }
        if i < PREVIEW_HEAD || i >= PREVIEW_HEAD + skipped {
            writeln!(
                out,
                "\t{}:{}",
                String::from_utf8_lossy(pair.key()),
                String::from_utf8_lossy(pair.value())
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::{self, Cursor};

    use collections::Dict;

    use super::{free_words, lines, load_words, preview, unload_words};

    fn word_list(n: usize) -> String {
        (0..n).map(|i| format!("word{i}\n")).collect()
    }

    #[test]
    fn lines_strip_only_newline() {
        let got: Vec<Vec<u8>> = lines(Cursor::new("a\n\nb\r\nc"))
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(got, vec![b"a".to_vec(), b"".to_vec(), b"b\r".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn load_counts_bytes() {
        let mut d = Dict::new().unwrap();
        let report = load_words(&mut d, Cursor::new("apple\npear\nfig\n")).unwrap();

        assert_eq!(report.lines, 3);
        assert_eq!(report.bytes_allocated, 6 + 5 + 4);
        assert_eq!(report.stats.entries, 3);
        assert_eq!(d.get("pear").unwrap(), Some(&b"pear".to_vec()));
    }

    #[test]
    fn latin1_lines_load_as_bytes() {
        let mut d = Dict::new().unwrap();
        let report = load_words(&mut d, Cursor::new(b"caf\xe9\nabc\n")).unwrap();

        assert_eq!(report.lines, 2);
        assert_eq!(report.bytes_allocated, 5 + 4);
        assert_eq!(d.get(b"caf\xe9").unwrap(), Some(&b"caf\xe9".to_vec()));

        let mut out = Vec::new();
        preview(&d, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\tcaf\u{fffd}:caf\u{fffd}\n"));

        let bytes = unload_words(&mut d, Cursor::new(b"caf\xe9\n"), &mut io::sink()).unwrap();
        assert_eq!(bytes, 5);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn duplicate_lines_are_not_double_counted() {
        let mut d = Dict::new().unwrap();
        let report = load_words(&mut d, Cursor::new("apple\napple\napple\n")).unwrap();

        assert_eq!(report.lines, 3);
        assert_eq!(report.bytes_allocated, 6);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn load_then_free_balances() {
        let words = word_list(500);
        let mut d = Dict::new().unwrap();
        let report = load_words(&mut d, Cursor::new(words.as_str())).unwrap();
        assert_eq!(report.stats.entries, 500);

        let (count, bytes) = free_words(d, &mut io::sink()).unwrap();
        assert_eq!(count, 500);
        assert_eq!(bytes, report.bytes_allocated);
    }

    #[test]
    fn free_dumps_every_value() {
        let mut d = Dict::new().unwrap();
        load_words(&mut d, Cursor::new(b"pear\nfig\xff\n")).unwrap();

        let mut dump = Vec::new();
        assert_eq!(free_words(d, &mut dump).unwrap(), (2, 5 + 5));

        let mut dumped: Vec<&[u8]> = dump.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        dumped.sort();
        assert_eq!(dumped, vec![b"fig\xff".as_slice(), b"pear".as_slice()]);
    }

    #[test]
    fn load_then_unload_empties() {
        let words = word_list(25_000);
        let mut d = Dict::with_capacity_and_load(5, 0.75).unwrap();

        let report = load_words(&mut d, Cursor::new(words.as_str())).unwrap();
        assert_eq!(d.len(), 25_000);

        let mut dump = Vec::new();
        let bytes = unload_words(&mut d, Cursor::new(words.as_str()), &mut dump).unwrap();
        assert_eq!(bytes, report.bytes_allocated);
        assert_eq!(dump, words.as_bytes());
        assert!(d.is_empty());
        assert_eq!(d.collision_count(), 0);
        assert_eq!(d.iter().count(), 0);
    }

    #[test]
    fn preview_small_dict_shows_everything() {
        let mut d = Dict::with_capacity(101).unwrap();
        load_words(&mut d, Cursor::new("a\nb\n")).unwrap();

        let mut out = Vec::new();
        preview(&d, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\ta:a\n"));
        assert!(text.contains("\tb:b\n"));
    }

    #[test]
    fn preview_skips_the_middle() {
        let mut d = Dict::new().unwrap();
        load_words(&mut d, Cursor::new(word_list(100).as_str())).unwrap();

        let mut out = Vec::new();
        preview(&d, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let shown: Vec<&str> = text.lines().collect();

        assert_eq!(shown.len(), 41);
        assert_eq!(shown[30], "skipping 60 entries...");
    }
}
