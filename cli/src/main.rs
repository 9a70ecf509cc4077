mod commands;
mod compile;
mod selftest;

use clap::*;
use commands::*;
use kanji_trace::session::{LoadError, ResourceFetchError, TraceError};

use std::fs::File;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::process;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Fetch(#[from] ResourceFetchError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("Expected a single character, got {0:?}.")]
    InvalidCharacter(String),
    #[error("The reference strokes did not verify against themselves.")]
    Failed,
}

fn main() {
    env_logger::init();

    let character_arg = || {
        Arg::with_name("CHARACTER")
            .value_name("CHARACTER")
            .help("The character to load")
            .required(true)
            .index(1)
    };
    let dir_arg = || {
        Arg::with_name("DIR")
            .short("d")
            .long("dir")
            .help("Directory containing one SVG outline per character")
            .value_name("DIR")
            .takes_value(true)
            .required(true)
    };

    let matches = App::new("kanji-trace")
        .version("0.1")
        .about("Stroke outline inspection and verification")
        .subcommand(SubCommand::with_name("compile")
            .about("Compiles and normalizes the strokes of a character")
            .arg(character_arg())
            .arg(dir_arg())
            .arg(Arg::with_name("TOLERANCE")
                .short("t")
                .long("tolerance")
                .help("Sets the curve flattening tolerance (0.001 by default)")
                .value_name("TOLERANCE")
                .takes_value(true)
            )
            .arg(Arg::with_name("COUNT")
                .short("c")
                .long("count")
                .help("Prints the number of strokes and vertices")
            )
        )
        .subcommand(SubCommand::with_name("selftest")
            .about("Traces each stroke of a character with itself")
            .arg(character_arg())
            .arg(dir_arg())
            .arg(Arg::with_name("RENDER")
                .short("r")
                .long("render")
                .help("Saves the last reference surface as a PNG image")
                .value_name("FILE")
                .takes_value(true)
            )
        )
        .arg(Arg::with_name("OUTPUT")
            .help("Sets the output file to use")
            .value_name("FILE")
            .short("o")
            .long("output")
            .takes_value(true)
            .required(false)
        )
        .get_matches();

    let output: Box<dyn Write> = match matches.value_of("OUTPUT") {
        Some(file) => match File::create(file) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Cannot create {}: {}", file, e);
                process::exit(1);
            }
        },
        None => Box::new(stdout()),
    };

    let result = if let Some(compile_matches) = matches.subcommand_matches("compile") {
        get_character(compile_matches).and_then(|character| {
            compile::compile(CompileCmd {
                character,
                dir: get_dir(compile_matches),
                tolerance: get_tolerance(compile_matches),
                count: compile_matches.is_present("COUNT"),
                output,
            })
        })
    } else if let Some(selftest_matches) = matches.subcommand_matches("selftest") {
        get_character(selftest_matches).and_then(|character| {
            selftest::selftest(SelftestCmd {
                character,
                dir: get_dir(selftest_matches),
                render: selftest_matches.value_of("RENDER").map(PathBuf::from),
                output,
            })
        })
    } else {
        eprintln!("{}", matches.usage());
        Ok(())
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn get_character(matches: &ArgMatches) -> std::result::Result<char, CommandError> {
    let arg = matches.value_of("CHARACTER").unwrap_or("");
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CommandError::InvalidCharacter(arg.to_string())),
    }
}

fn get_dir(matches: &ArgMatches) -> PathBuf {
    PathBuf::from(matches.value_of("DIR").unwrap_or("."))
}

fn get_tolerance(matches: &ArgMatches) -> f32 {
    let default = kanji_trace::path::CompilerOptions::DEFAULT_TOLERANCE;
    if let Some(tolerance_str) = matches.value_of("TOLERANCE") {
        return tolerance_str.parse().unwrap_or(default);
    }
    default
}
