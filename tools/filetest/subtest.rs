//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::discovery;
use crate::testcase::TestFailure;
use backtrace::Backtrace;
use std::any::Any;
use std::cell::RefCell;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use threadpool::ThreadPool;

thread_local! {
    pub static BACKTRACE: RefCell<Option<Backtrace>> = RefCell::new(None);
}

/// Replaces the default panic message with a captured backtrace, the
/// failure gets reported once every test has finished instead.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|_| {
        BACKTRACE.with(|b| *b.borrow_mut() = Some(Backtrace::new()));
    }));
}

pub enum TestResult {
    Output(String),
    CompileError(String),
}

pub struct TestDetails {
    pub elapsed: Duration,
    pub output: Result<(), TestFailure>,
}

pub struct Subtest {
    subdir: &'static str,
    runner: fn(&str, &str) -> TestResult,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    match payload.downcast_ref::<&str>() {
        Some(s) => s.to_string(),
        None => match payload.downcast_ref::<String>() {
            Some(s) => s.clone(),
            None => "<unknown panic payload>".to_string(),
        },
    }
}

impl Subtest {
    pub const fn new(subdir: &'static str, runner: fn(&str, &str) -> TestResult) -> Self {
        Self { subdir, runner }
    }

    pub fn subdir(&self) -> &'static str {
        self.subdir
    }

    pub fn run(&self, pool: &mut ThreadPool) -> Receiver<(&'static str, TestDetails)> {
        let (send, recv) = mpsc::channel();

        for file in discovery::cases_in_subdir(self.subdir) {
            let send = send.clone();
            let runner = self.runner;

            pool.execute(move || {
                let start = Instant::now();
                let result = std::panic::catch_unwind(|| runner(&file.name, &file.contents));
                let elapsed = start.elapsed();
                let output = match result {
                    Ok(output) => file.case.check(output),
                    Err(payload) => {
                        let bt = BACKTRACE
                            .with(|b| b.borrow_mut().take())
                            .map(|b| format!("{b:?}"))
                            .unwrap_or_default();

                        Err(TestFailure::Panic(bt, panic_message(payload.as_ref())))
                    }
                };

                send.send((file.name.as_str(), TestDetails { elapsed, output }))
                    .expect("unable to send")
            });
        }

        recv
    }
}
