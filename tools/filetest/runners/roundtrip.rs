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

fn printer_output(name: &str, content: &str) -> TestResult {
    let module = match llasm::parse_named(name, content) {
        Ok(module) => module,
        Err(err) => return TestResult::CompileError(format!("{err}")),
    };

    let printed = llasm::print(&module);

    // canonical text has to be a fixed point of parse + print, anything
    // that isn't is a printer bug
    let reparsed = match llasm::parse_named(name, &printed) {
        Ok(module) => module,
        Err(err) => panic!(
            "printed module does not parse:\n{}\n\n{printed}",
            llasm::format_parse_error(name, &printed, &err)
        ),
    };

    let reprinted = llasm::print(&reparsed);

    if reprinted != printed {
        panic!(
            "printing is not stable:\n{}",
            crate::display::prettify_diff(&printed, &reprinted)
        );
    }

    TestResult::Output(printed)
}

pub const fn roundtrip_subtest() -> Subtest {
    Subtest::new("roundtrip", printer_output)
}
