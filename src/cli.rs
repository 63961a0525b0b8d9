//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Contains utility code specifically for the CLI tools located in
//! the `tools/` subdirectory.
//!
//! Every tool takes the same base options, so they're pulled in here
//! and then combined with whatever each tool needs on top of them.

use bpaf::{construct, OptionParser, Parser};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Basic options that every CLI tool in the suite takes in.
#[derive(Clone, Debug)]
pub struct BaseOptions {
    /// The file to output results to
    pub output: Option<PathBuf>,
    /// Whether or not to run the logging in verbose mode.
    pub verbose: bool,
    /// The list of inputs given to the tool
    pub inputs: Vec<PathBuf>,
}

/// Returns a [`OptionParser`] preconfigured with the standard options
/// and additional tool-specific options.
pub fn tool_with<T>(
    description: &'static str,
    usage: &'static str,
    additional: impl Parser<T> + 'static,
) -> OptionParser<(T, BaseOptions)> {
    let res = construct!(additional, default());

    res.to_options()
        .descr(description)
        .version(VERSION)
        .usage(usage)
}

/// Gets the baseline default options that every tool needs.
pub fn default() -> impl Parser<BaseOptions> {
    let inputs = inputs();
    let output = output();
    let verbose = verbose();

    construct!(BaseOptions {
        output,
        verbose,
        inputs,
    })
}

/// Gets the output file specified on the CLI, if one exists.
pub fn output() -> impl Parser<Option<PathBuf>> {
    bpaf::long("output")
        .short('o')
        .help("the file to output to")
        .argument::<PathBuf>("FILE")
        .optional()
}

/// Gets the input files specified on the CLI.
pub fn inputs() -> impl Parser<Vec<PathBuf>> {
    bpaf::positional::<PathBuf>("FILES")
        .help("files to read as input to the tool")
        .many()
}

/// Checks for the presence of `-v` or `--verbose`
pub fn verbose() -> impl Parser<bool> {
    bpaf::long("verbose")
        .short('v')
        .help("enable verbose output")
        .flag(true, false)
}

/// Checks for `--check`, which compares instead of writing output
pub fn check() -> impl Parser<bool> {
    bpaf::long("check")
        .help("exit with an error if an input isn't already in canonical form")
        .flag(true, false)
}

/// Gets the number of concurrent threads to use for a given task
pub fn jobs() -> impl Parser<Option<usize>> {
    bpaf::long("jobs")
        .short('j')
        .help("the number of concurrent jobs to run tests on")
        .argument::<usize>("JOBS")
        .optional()
}

/// Gets the subtests to limit a test run to
pub fn subtests() -> impl Parser<Vec<String>> {
    bpaf::long("subtest")
        .short('s')
        .help("only run the tests in a given subtest directory")
        .argument::<String>("NAME")
        .many()
}

/// Sets up `env_logger` at the level that `verbose` asks for. `RUST_LOG`
/// still takes priority when it's set.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
