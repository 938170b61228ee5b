// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config file lookup and validation.

use crate::prelude::*;

#[test]
fn config_is_found_in_parent_directory() {
    let project = Project::empty();
    project.config("[python]\nframework = \"pytest\"\n");
    project.file("sub/test_a.py", "def test_a():\n    pass\n");

    tirun(&["discover", "-o", "text", "--root", "sub"])
        .pwd(project.path())
        .passes()
        .stdout_eq("test_a.py::test_a\n");
}

#[test]
fn unknown_top_level_key_warns() {
    let project = Project::empty();
    project.config("[ruby]\nframework = \"rspec\"\n");

    tirun(&["discover"])
        .pwd(project.path())
        .env("TIRUN_LOG", "warn")
        .passes()
        .stderr_has("unrecognized field `ruby`");
}

#[test]
fn unknown_key_in_python_section_is_error() {
    let project = Project::empty();
    project.config("[python]\nframwork = \"pytest\"\n");

    tirun(&["discover"])
        .pwd(project.path())
        .exits(2)
        .stderr_has("framwork");
}

#[test]
fn unsupported_version_is_error() {
    let project = Project::empty();
    project.file("tirun.toml", "version = 2\n");

    tirun(&["discover"])
        .pwd(project.path())
        .exits(2)
        .stderr_has("unsupported config version 2");
}

#[test]
fn missing_explicit_config_is_error() {
    let project = Project::empty();
    tirun(&["discover", "-C", "nowhere.toml"])
        .pwd(project.path())
        .exits(2)
        .stderr_has("config file not found");
}

#[test]
fn config_env_var_selects_file() {
    let project = Project::empty();
    project.file(
        "ci/tirun.toml",
        "version = 1\n[python]\nframework = \"pytest\"\n",
    );
    project.file("tests/test_a.py", "def test_a():\n    pass\n");

    tirun(&["packages"])
        .pwd(project.path())
        .env("TIRUN_CONFIG", &project.arg("ci/tirun.toml"))
        .passes()
        .stdout_has("\"tests\"");
}

#[test]
fn configured_globs_scope_discovery() {
    let project = Project::empty();
    project.config("[python]\nframework = \"pytest\"\ntest_globs = [\"unit/**/*.py\"]\n");
    project.file("unit/test_a.py", "def test_a():\n    pass\n");
    project.file("other/test_b.py", "def test_b():\n    pass\n");

    tirun(&["discover", "-o", "text"])
        .pwd(project.path())
        .passes()
        .stdout_eq("unit/test_a.py::test_a\n");
}
