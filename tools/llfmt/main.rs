//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use ansi_term::Color::{Green, Red, White};
use llasm::cli;
use llasm::cli::BaseOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::{fs, io};

fn main() -> io::Result<()> {
    #[cfg(windows)]
    ansi_term::enable_ansi_support().expect("unable to enable ANSI");

    let (base, check) = parse_options();

    cli::init_logging(base.verbose);

    if base.inputs.is_empty() {
        return Err(io::Error::new(ErrorKind::InvalidInput, "no input files"));
    }

    let mut output = String::default();
    let mut failed = false;

    for input in &base.inputs {
        let name = input.display().to_string();
        let source = fs::read_to_string(input)?;

        let printed = match llasm::parse_named(&name, &source) {
            Ok(module) => llasm::print(&module),
            Err(err) => {
                eprintln!("{}", llasm::format_parse_error(&name, &source, &err));
                failed = true;

                continue;
            }
        };

        if check {
            failed |= !check_single_file(input, &source, &printed);
        } else {
            output.push_str(&printed);
        }
    }

    if !check {
        match &base.output {
            Some(path) => fs::write(path, output)?,
            None => io::stdout().lock().write_all(output.as_bytes())?,
        }
    }

    if failed {
        return Err(io::Error::new(ErrorKind::InvalidData, "formatting failed"));
    }

    Ok(())
}

fn parse_options() -> (BaseOptions, bool) {
    let (check, base) = cli::tool_with(
        "canonical formatter for textual LLVM IR",
        "Usage: llfmt [-o FILE] [-v] [--check] FILES...",
        cli::check(),
    )
    .run();

    (base, check)
}

fn golden_path(input: &Path) -> PathBuf {
    let mut golden = input.as_os_str().to_owned();
    golden.push(".golden");

    PathBuf::from(golden)
}

/// Compares `printed` against the input, or against `FILE.golden` when
/// one exists. Returns whether they matched.
fn check_single_file(input: &Path, source: &str, printed: &str) -> bool {
    let golden = golden_path(input);
    let expected = match fs::read_to_string(&golden) {
        Ok(text) => {
            log::debug!("checking `{}` against `{}`", input.display(), golden.display());

            text
        }
        Err(_) => source.to_string(),
    };

    if expected == printed {
        return true;
    }

    println!(
        "{} `{}` is not in canonical form",
        Red.bold().paint("error:"),
        White.bold().paint(input.display().to_string())
    );

    for (line, diff) in diff::lines(printed, &expected).into_iter().enumerate() {
        let text = match diff {
            diff::Result::Left(l) => Green.paint(format!("+ {l}")).to_string(),
            diff::Result::Both(l, _) => format!("  {l}"),
            diff::Result::Right(r) => Red.paint(format!("- {r}")).to_string(),
        };

        println!("{:4} |{text}", line + 1);
    }

    false
}
