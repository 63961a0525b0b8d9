//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::subtest::{Subtest, TestResult};

fn diagnostic_output(name: &str, content: &str) -> TestResult {
    match llasm::parse_named(name, content) {
        Ok(module) => TestResult::Output(llasm::print(&module)),
        Err(err) => TestResult::CompileError(llasm::format_parse_error(name, content, &err)),
    }
}

pub const fn errors_subtest() -> Subtest {
    Subtest::new("errors", diagnostic_output)
}
