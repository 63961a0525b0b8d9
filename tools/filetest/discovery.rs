//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::testcase::FileTestCase;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub struct TestFile {
    pub name: String,
    pub contents: String,
    pub case: FileTestCase,
}

type DirectoryContents = HashMap<String, Vec<TestFile>, ahash::RandomState>;

static ALL_TEST_CASES: OnceLock<DirectoryContents> = OnceLock::new();

const GOLDEN_EXTENSION: &str = ".golden";

fn golden_for(path: &Path) -> Option<String> {
    let mut golden = path.as_os_str().to_owned();
    golden.push(GOLDEN_EXTENSION);

    fs::read_to_string(PathBuf::from(golden)).ok()
}

fn recursive_build(out: &mut DirectoryContents, curr_key: String, current_dir: PathBuf) {
    let mut subdirs = Vec::default();

    {
        let files = match out.entry(curr_key.clone()) {
            Entry::Vacant(vac) => vac.insert(Vec::default()),
            Entry::Occupied(_) => unreachable!(),
        };

        for entry in fs::read_dir(current_dir).expect("invalid directory") {
            let entry = entry.expect("i/o error");
            let metadata = entry.metadata().expect("unable to stat file");
            let name = entry.file_name().into_string().expect("invalid UTF-8 path");
            let path = entry.path();

            if metadata.is_dir() {
                let inner = if curr_key.is_empty() {
                    name
                } else {
                    format!("{curr_key}/{name}")
                };

                subdirs.push((inner, path.clone()));
            } else if !name.ends_with(GOLDEN_EXTENSION) {
                let contents = fs::read_to_string(&path).expect("unable to read file");
                let case = FileTestCase::from_raw(&name, &contents, golden_for(&path));

                files.push(TestFile {
                    name,
                    contents,
                    case,
                })
            }
        }

        files.sort_by(|f1, f2| f1.name.cmp(&f2.name));
    }

    for (inner, path) in subdirs {
        recursive_build(out, inner, path);
    }
}

fn init_directory() -> DirectoryContents {
    let mut map = DirectoryContents::default();
    let mut root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.push("tests/");

    recursive_build(&mut map, String::default(), root);

    map
}

pub fn cases_in_subdir(path: &'static str) -> &'static [TestFile] {
    let all = ALL_TEST_CASES.get_or_init(init_directory);

    match all.get(path) {
        Some(files) => files,
        None => panic!("no files found for path `{path}`"),
    }
}
