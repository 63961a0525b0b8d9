//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::subtest::TestResult;

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TestFailure {
    Diff { expected: String, got: String },
    Missing { check: String, full: String },
    CompileError(String),
    Panic(String, String),
    LackOfCompileError,
}

const ENTIRE: &str = "; MATCH-ENTIRE";
const SECTION: &str = "; MATCH-SECTION";
const ERROR: &str = "; COMPILE-ERROR: ";
const STANDARD: &str = "; STANDARD";
const CHECK: &str = "; CHECK: ";

/// What a fixture expects from its runner, decided by its first line.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Check {
    /// The printed module is exactly this text
    Entire(String),
    /// The printed module contains this text somewhere
    Section(String),
    /// Each line shows up in the printed module, in order
    Lines(Vec<String>),
    /// The parse fails with a diagnostic containing this text
    Error(String),
}

// the section is every comment line between a lone `;` and `;;`, with the
// leading `; ` stripped
fn comment_section(name: &str, body: &str) -> String {
    let mut lines = body.lines().map(str::trim_end);

    assert_eq!(
        lines.next(),
        Some(";"),
        "test '{name}' has no `;` line opening its section"
    );

    lines
        .take_while(|line| *line != ";;")
        .map(|line| match line.strip_prefix("; ") {
            Some(text) => format!("{text}\n"),
            None => "\n".to_string(),
        })
        .collect()
}

impl Check {
    fn from_contents(name: &str, contents: &str) -> Self {
        let (header, body) = contents.split_once('\n').unwrap_or((contents, ""));

        if header.starts_with(ENTIRE) {
            Check::Entire(body.to_string())
        } else if header.starts_with(SECTION) {
            Check::Section(comment_section(name, body))
        } else if let Some(message) = header.strip_prefix(ERROR) {
            Check::Error(message.trim_end().to_string())
        } else if header.starts_with(STANDARD) {
            let lines = body
                .lines()
                .filter_map(|line| line.trim_start().strip_prefix(CHECK))
                .map(str::to_string)
                .collect();

            Check::Lines(lines)
        } else if contents.is_empty() {
            Check::Lines(Vec::default())
        } else {
            panic!("test '{name}' did not provide `; <TYPE>` header for `filetest`. got: '{header}'")
        }
    }

    fn verify(&self, result: TestResult) -> Result<(), TestFailure> {
        let output = match (self, result) {
            (Check::Error(expected), TestResult::CompileError(got)) => {
                return match got.contains(expected.as_str()) {
                    true => Ok(()),
                    false => Err(TestFailure::CompileError(got)),
                };
            }
            (Check::Error(_), TestResult::Output(_)) => return Err(TestFailure::LackOfCompileError),
            (_, TestResult::CompileError(err)) => return Err(TestFailure::CompileError(err)),
            (_, TestResult::Output(output)) => output,
        };

        match self {
            Check::Entire(expected) if output != *expected => Err(TestFailure::Diff {
                expected: expected.clone(),
                got: output,
            }),
            Check::Section(section) if !output.contains(section.as_str()) => Err(TestFailure::Diff {
                expected: section.clone(),
                got: output,
            }),
            Check::Lines(checks) => {
                let mut remaining = checks.iter().peekable();

                for line in output.lines() {
                    if remaining.peek().map_or(false, |check| *check == line) {
                        remaining.next();
                    }
                }

                match remaining.next() {
                    Some(check) => Err(TestFailure::Missing {
                        check: check.clone(),
                        full: output,
                    }),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Hash, Eq, PartialEq)]
pub struct FileTestCase {
    check: Check,
}

impl FileTestCase {
    /// Reads the header of `raw`. A `.golden` file replaces whatever the
    /// header asked for with an exact match against its contents.
    pub fn from_raw(name: &str, raw: &str, golden: Option<String>) -> Self {
        let check = match golden {
            Some(expected) => Check::Entire(expected),
            None => Check::from_contents(name, raw),
        };

        Self { check }
    }

    pub fn check(&self, output: TestResult) -> Result<(), TestFailure> {
        self.check.verify(output)
    }
}
