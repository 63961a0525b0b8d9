//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

mod discovery;
mod display;
mod runner;
mod runners;
mod subtest;
mod testcase;

use crate::runner::{run_all, run_subtests};
use bpaf::Parser;
use llasm::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    #[cfg(windows)]
    ansi_term::enable_ansi_support().expect("unable to enable ANSI");

    let jobs = cli::jobs();
    let subtests = cli::subtests();
    let ((subtests, jobs), options) = cli::tool_with(
        "file-driven test runner for llasm",
        "filetest [--subtest <NAME>]... [-j <JOBS>]",
        bpaf::construct!(subtests, jobs),
    )
    .run();

    cli::init_logging(options.verbose);
    subtest::install_panic_hook();

    if !options.inputs.is_empty() {
        eprintln!("expected file list to be empty!");

        return ExitCode::from(1);
    }

    let result = if subtests.is_empty() {
        run_all(jobs)
    } else {
        run_subtests(&subtests, jobs)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(1),
    }
}

#[test]
fn test_roundtrip() {
    subtest::install_panic_hook();

    assert!(matches!(run_subtests(&["roundtrip".to_string()], Some(2)), Ok(())));
}

#[test]
fn test_errors() {
    subtest::install_panic_hook();

    assert!(matches!(run_subtests(&["errors".to_string()], Some(2)), Ok(())));
}
