use std::process::ExitCode;

use djbdict::{
    args::{DJB_HASH_USAGE, HashCommand},
    hashing,
};
use log::{error, info};

fn main() -> ExitCode {
    env_logger::builder().init();

    let command = match HashCommand::parse(std::env::args_os().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            println!("{DJB_HASH_USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match command {
        HashCommand::One { input, modulus } => {
            println!("{}", hashing::hash_bytes(&input, modulus));
            ExitCode::SUCCESS
        }
        HashCommand::Lines { modulus } => {
            let stdin = std::io::stdin().lock();
            let mut stdout = std::io::stdout().lock();
            match hashing::hash_lines(stdin, &mut stdout, modulus) {
                Ok(count) => {
                    info!("{count} lines processed from input");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("error on stdin read {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
