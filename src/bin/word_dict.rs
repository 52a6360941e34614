use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
    process::ExitCode,
};

use collections::Dict;
use djbdict::{
    HarnessError,
    args::{WORD_DICT_USAGE, WordDictArgs},
    words,
};
use log::{error, info};

fn main() -> ExitCode {
    env_logger::builder().init();

    let args = match WordDictArgs::parse(std::env::args_os().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            println!("{WORD_DICT_USAGE}");
            return ExitCode::from(1);
        }
    };

    match test_load(&args).and_then(|()| test_unload(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn open(filename: &Path) -> Result<BufReader<File>, HarnessError> {
    let file = File::open(filename).inspect_err(|e| error!("Unable to open file {}: {e}", filename.display()))?;
    Ok(BufReader::new(file))
}

/// Where dumped values go: `name` in the working directory with `--dump`,
/// nowhere otherwise
fn dump_sink(args: &WordDictArgs, name: &str) -> Result<Box<dyn Write>, HarnessError> {
    if !args.dump {
        return Ok(Box::new(io::sink()));
    }
    let file = File::create(name).inspect_err(|e| error!("Unable to create {name}: {e}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Loads the file, prints the dictionary, then frees every value by
/// tearing the dictionary down.
fn test_load(args: &WordDictArgs) -> Result<(), HarnessError> {
    let mut dict = Dict::from_config(args.config)?;

    println!("Loading dictionary entries from file {}", args.filename.display());
    let report = words::load_words(&mut dict, open(&args.filename)?)?;
    println!("\n {}, {} bytes allocated", report.stats, report.bytes_allocated);
    info!("{} lines read, final capacity {}", report.lines, report.stats.capacity);

    println!("Enumerating dictionary:");
    words::preview(&dict, &mut io::stdout().lock())?;
    println!();

    print!("Freeing values...");
    let mut freed = dump_sink(args, "freed_words.txt")?;
    let (count, bytes_freed) = words::free_words(dict, &mut freed)?;
    freed.flush()?;
    println!("{count} strings freed, {bytes_freed} bytes");

    if report.bytes_allocated != bytes_freed {
        println!(
            "Failed to free {} bytes: {} allocated, only {} were freed",
            report.bytes_allocated.abs_diff(bytes_freed),
            report.bytes_allocated,
            bytes_freed
        );
    }
    Ok(())
}

/// Loads the file again, then removes every line one at a time.
fn test_unload(args: &WordDictArgs) -> Result<(), HarnessError> {
    let mut dict = Dict::from_config(args.config)?;

    println!("Testing dictionary remove...");
    println!("1) Rebuilding dictionary from {}", args.filename.display());
    let report = words::load_words(&mut dict, open(&args.filename)?)?;
    println!("\n {}, {} bytes allocated", report.stats, report.bytes_allocated);

    println!("2) Re-reading dictionary entries to unload from {}", args.filename.display());
    let mut unloaded = dump_sink(args, "unloaded_words.txt")?;
    let bytes_freed = words::unload_words(&mut dict, open(&args.filename)?, &mut unloaded)?;
    unloaded.flush()?;

    if report.bytes_allocated != bytes_freed {
        println!(
            "Failed to free {} bytes: {} allocated, only {} were freed",
            report.bytes_allocated.abs_diff(bytes_freed),
            report.bytes_allocated,
            bytes_freed
        );
    } else {
        println!("3) All entries have been removed.");
    }

    println!("Enumerating dictionary:");
    words::preview(&dict, &mut io::stdout().lock())?;
    println!();
    Ok(())
}
