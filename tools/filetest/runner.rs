//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::display;
use crate::runners::*;
use crate::subtest::Subtest;
use std::io;
use std::time::Duration;
use threadpool::ThreadPool;

static SUBTESTS: [Subtest; 2] = [roundtrip_subtest(), errors_subtest()];

fn pool_for_jobs(jobs: Option<usize>) -> ThreadPool {
    match jobs {
        Some(n) => ThreadPool::new(n.max(1)),
        None => ThreadPool::default(),
    }
}

fn run_tests<'a>(
    tests: impl IntoIterator<Item = &'a Subtest>,
    pool: &mut ThreadPool,
) -> io::Result<()> {
    let mut total = 0usize;
    let mut total_time = Duration::default();
    let mut failed = Vec::default();

    for test in tests {
        display::print_subtest_header(test);

        for (file, result) in test.run(pool) {
            total += 1;
            total_time += result.elapsed;

            if let Some(rest) = display::print_subtest_result(test, file, result) {
                failed.push(rest);
            }
        }
    }

    display::print_summary(total, failed.len(), total_time);

    match failed.len() {
        0 => Ok(()),
        _ => {
            for (file, rest) in failed {
                display::print_failure(file, rest);
            }

            Err(io::Error::from(io::ErrorKind::InvalidInput))
        }
    }
}

pub fn run_all(jobs: Option<usize>) -> io::Result<()> {
    let mut pool = pool_for_jobs(jobs);

    run_tests(&SUBTESTS, &mut pool)
}

pub fn run_subtests(names: &[String], jobs: Option<usize>) -> io::Result<()> {
    let mut selected = Vec::with_capacity(names.len());

    for name in names {
        match SUBTESTS.iter().find(|test| test.subdir() == name.as_str()) {
            Some(test) => selected.push(test),
            None => {
                eprintln!("unknown subtest '{name}'");

                return Err(io::Error::from(io::ErrorKind::NotFound));
            }
        }
    }

    let mut pool = pool_for_jobs(jobs);

    run_tests(selected, &mut pool)
}
