// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `tirun command`: building the command for a selection.

use crate::prelude::*;

const SELECTION: &str = r#"[
  {"package": "tests.test_calc", "class": "TestCalc", "method": "test_sub"},
  {"package": "tests.test_calc", "class": "TestCalc", "method": "test_add"}
]"#;

#[test]
fn selection_from_stdin_builds_unittest_command() {
    tirun(&["command", "--tests", "-", "--ignore-instrumentation"])
        .on("py-unittest")
        .stdin(SELECTION)
        .passes()
        .stdout_eq(
            "python3 -m unittest tests.test_calc.TestCalc.test_add tests.test_calc.TestCalc.test_sub\n",
        );
}

#[test]
fn selection_from_file_with_user_args() {
    let project = Project::empty();
    project.file("selection.json", SELECTION);
    tirun(&[
        "command",
        "--tests",
        "selection.json",
        "--ignore-instrumentation",
        "--user-args",
        "-v --failfast",
    ])
    .pwd(project.path())
    .passes()
    .stdout_eq(
        "python3 -m unittest tests.test_calc.TestCalc.test_add tests.test_calc.TestCalc.test_sub -v --failfast\n",
    );
}

#[test]
fn empty_selection_exits_with_no_tests() {
    tirun(&["command", "--tests", "-", "--ignore-instrumentation"])
        .on("py-unittest")
        .stdin("[]")
        .exits(4)
        .stderr_has("no tests selected");
}

#[test]
fn missing_selection_without_run_all_exits_with_no_tests() {
    tirun(&["command", "--ignore-instrumentation"])
        .on("py-unittest")
        .exits(4);
}

#[test]
fn run_all_ignores_selection() {
    tirun(&["command", "--tests", "-", "--run-all", "--ignore-instrumentation"])
        .on("py-unittest")
        .stdin(SELECTION)
        .passes()
        .stdout_eq("python3 -m unittest discover\n");
}

#[test]
fn pytest_node_ids_are_quoted() {
    tirun(&["command", "--tests", "-", "--ignore-instrumentation"])
        .on("py-pytest")
        .stdin(r#"[{"package": "tests/test_math.py", "class": "TestMath", "method": "test_mul"}]"#)
        .passes()
        .stdout_eq("python3 -m pytest 'tests/test_math.py::TestMath::test_mul'\n");
}

#[test]
fn agent_wraps_command() {
    let project = Project::empty();
    project.file("agent.yaml", "service: demo\n");
    tirun(&[
        "command",
        "--run-all",
        "--agent",
        "/opt/agent/bin/agent",
        "--agent-config",
        "agent.yaml",
    ])
    .pwd(project.path())
    .passes()
    .stdout_eq(&format!(
        "/opt/agent/bin/agent --config {} --framework unittest -- python3 -m unittest discover\n",
        project.canonical("agent.yaml")
    ));
}

#[test]
fn agent_config_is_relative_to_root() {
    let project = Project::empty();
    project.file("app/agent.yaml", "service: demo\n");
    tirun(&[
        "command",
        "--run-all",
        "--root",
        "app",
        "--agent",
        "/opt/agent",
        "--agent-config",
        "agent.yaml",
    ])
    .pwd(project.path())
    .passes()
    .stdout_has(format!("--config {} ", project.canonical("app/agent.yaml")).as_str());
}

#[test]
fn agent_path_from_config() {
    let project = Project::empty();
    project.config("[python]\nframework = \"pytest\"\nagent_path = \"/opt/agent\"\n");
    project.file("agent.yaml", "service: demo\n");
    tirun(&["command", "--run-all", "--agent-config", "agent.yaml"])
        .pwd(project.path())
        .passes()
        .stdout_eq(&format!(
            "/opt/agent --config {} --framework pytest -- python3 -m pytest\n",
            project.canonical("agent.yaml")
        ));
}

#[test]
fn missing_agent_config_is_config_error() {
    let project = Project::empty();
    tirun(&[
        "command",
        "--run-all",
        "--agent",
        "/opt/agent",
        "--agent-config",
        "missing.yaml",
    ])
    .pwd(project.path())
    .exits(2)
    .stderr_has("agent config not found");
}

#[test]
fn instrumentation_without_agent_is_config_error() {
    let project = Project::empty();
    tirun(&["command", "--run-all"])
        .pwd(project.path())
        .exits(2)
        .stderr_has("no agent path");
}

#[test]
fn large_selection_moves_ids_to_list_file() {
    let project = Project::empty();
    project.config("[python]\nlist_file_threshold = 1\nlist_dir = \"lists\"\n");
    project.file("selection.json", SELECTION);

    let result = tirun(&["command", "--tests", "selection.json", "--ignore-instrumentation"])
        .pwd(project.path())
        .passes()
        .stdout_has("python3 -c ")
        .stdout_has("tirun-selection-");

    let lists: Vec<_> = std::fs::read_dir(project.path().join("lists"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(lists.len(), 1);
    assert!(result.stdout().contains(lists[0].file_name().unwrap().to_str().unwrap()));
    similar_asserts::assert_eq!(
        std::fs::read_to_string(&lists[0]).unwrap(),
        "tests.test_calc.TestCalc.test_add\ntests.test_calc.TestCalc.test_sub\n"
    );
}

#[test]
fn malformed_selection_is_argument_error() {
    tirun(&["command", "--tests", "-", "--ignore-instrumentation"])
        .on("py-unittest")
        .stdin(r#"[{"package": 3}]"#)
        .exits(2)
        .stderr_has("invalid test selection");
}

#[test]
fn unexpressible_test_id_is_rejected() {
    tirun(&["command", "--tests", "-", "--ignore-instrumentation"])
        .on("py-unittest")
        .stdin(r#"[{"package": "tests/test-calc.py", "class": "TestCalc", "method": "test_add"}]"#)
        .exits(2)
        .stderr_has("cannot build command");
}
