// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tirun discover` and `tirun packages`.

use crate::prelude::*;
use serde_json::json;

#[test]
fn unittest_discovery_lists_sorted_test_methods() {
    let result = tirun(&["discover"]).on("py-unittest").passes();
    assert_eq!(
        result.json(),
        json!([
            {"package": "tests.test_calc", "class": "TestCalc", "method": "test_add"},
            {"package": "tests.test_calc", "class": "TestCalc", "method": "test_foo"},
            {"package": "tests.test_calc", "class": "TestCalc", "method": "test_foobar"},
            {"package": "tests.test_calc", "class": "TestCalc", "method": "test_sub"},
        ])
    );
}

#[test]
fn unparseable_file_is_skipped() {
    tirun(&["discover", "-o", "text"])
        .on("py-unittest")
        .passes()
        .stdout_lacks("TestBroken")
        .stdout_lacks("test_never");
}

#[test]
fn text_output_is_one_test_per_line() {
    tirun(&["discover", "-o", "text"])
        .on("py-unittest")
        .passes()
        .stdout_eq(
            "tests.test_calc::TestCalc::test_add\n\
             tests.test_calc::TestCalc::test_foo\n\
             tests.test_calc::TestCalc::test_foobar\n\
             tests.test_calc::TestCalc::test_sub\n",
        );
}

#[test]
fn glob_flag_overrides_configured_globs() {
    tirun(&["discover", "-g", "app/*.py"])
        .on("py-unittest")
        .passes()
        .stdout_eq("[]\n");
}

#[test]
fn malformed_glob_is_config_error() {
    tirun(&["discover", "-g", "tests/[.py"])
        .on("py-unittest")
        .exits(2)
        .stderr_has("tests/[.py");
}

#[test]
fn root_flag_selects_project() {
    let root = fixture("py-unittest");
    tirun(&["discover", "-o", "text", "--root", root.to_str().unwrap()])
        .on("py-pytest")
        .passes()
        .stdout_has("tests.test_calc::TestCalc::test_add");
}

#[test]
fn pytest_discovery_lists_functions_and_class_methods() {
    tirun(&["discover", "-o", "text"])
        .on("py-pytest")
        .passes()
        .stdout_eq(
            "integration/users_test.py::test_login\n\
             tests/api/test_http.py::test_get\n\
             tests/test_math.py::test_add\n\
             tests/test_math.py::test_square\n\
             tests/test_math.py::TestMath::test_mul\n",
        )
        .stdout_lacks("helper");
}

#[test]
fn pytest_packages_are_top_level_directories() {
    let result = tirun(&["packages"]).on("py-pytest").passes();
    assert_eq!(result.json(), json!(["integration", "tests"]));
}

#[test]
fn unittest_packages_is_unsupported() {
    tirun(&["packages"])
        .on("py-unittest")
        .exits(2)
        .stderr_has("not supported by the unittest runner");
}

#[test]
fn unittest_discovery_follows_discover_convention() {
    let project = Project::empty();
    let case = "import unittest\n\nclass TestCalc(unittest.TestCase):\n    def test_add(self):\n        pass\n";
    project.file("tests/calc_test.py", case);
    project.file("tests/test_calc.py", case);

    tirun(&["discover", "-o", "text"])
        .pwd(project.path())
        .passes()
        .stdout_eq("");

    project.file("tests/__init__.py", "");
    tirun(&["discover", "-o", "text"])
        .pwd(project.path())
        .passes()
        .stdout_eq("tests.test_calc::TestCalc::test_add\n");
}

#[test]
fn pytest_nested_classes_use_joined_node_ids() {
    let project = Project::empty();
    project.config("[python]\nframework = \"pytest\"\n");
    project.file(
        "tests/test_nest.py",
        "class TestOuter:\n    def test_a(self):\n        pass\n\n    class TestInner:\n        def test_b(self):\n            pass\n",
    );

    tirun(&["discover", "-o", "text"])
        .pwd(project.path())
        .passes()
        .stdout_eq(
            "tests/test_nest.py::TestOuter::test_a\n\
             tests/test_nest.py::TestOuter::TestInner::test_b\n",
        );
}
