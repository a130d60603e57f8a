use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn modelstack(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modelstack").unwrap();
    cmd.current_dir(dir.path())
        .env("MODELSTACK_ROOT", dir.path())
        .env("MODELSTACK_DISABLE_UPDATE_CHECK", "1");
    cmd
}

fn init_project(dir: &TempDir) {
    modelstack(dir).arg("init").assert().success();
}

/// Point the project at a local provider endpoint with fast polling.
fn configure_endpoint(dir: &TempDir, endpoint: &str) {
    let config = format!(
        "project:\n  name: modelstack\nregion: us-east-1\nendpoint: \"{endpoint}\"\nstack_prefix: ms\nconverge:\n  poll_interval_secs: 0\n  max_polls: 5\n"
    );
    std::fs::write(dir.path().join(".modelstack/config.yaml"), config).unwrap();
}

fn complete_stack_body(name: &str, outputs: &[(&str, &str)]) -> String {
    let outputs: Vec<String> = outputs
        .iter()
        .map(|(k, v)| format!(r#"{{"output_key": "{k}", "output_value": "{v}"}}"#))
        .collect();
    format!(
        r#"{{"stack_name": "{name}", "stack_status": "CREATE_COMPLETE", "outputs": [{}]}}"#,
        outputs.join(",")
    )
}

// ---------------------------------------------------------------------------
// modelstack init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    modelstack(&dir).arg("init").assert().success();

    assert!(dir.path().join(".modelstack").is_dir());
    assert!(dir.path().join(".modelstack/config.yaml").exists());
    assert!(dir.path().join(".modelstack/parameters.json").exists());
    assert!(dir.path().join("templates/network.yaml").exists());
    assert!(dir.path().join("templates/cluster.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    modelstack(&dir).arg("init").assert().success();
    modelstack(&dir).arg("init").assert().success();
}

#[test]
fn init_preserves_edited_config() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    configure_endpoint(&dir, "https://infra.example.com");
    modelstack(&dir).arg("init").assert().success();

    let content = std::fs::read_to_string(dir.path().join(".modelstack/config.yaml")).unwrap();
    assert!(content.contains("infra.example.com"));
}

// ---------------------------------------------------------------------------
// modelstack params
// ---------------------------------------------------------------------------

#[test]
fn params_set_and_show() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    modelstack(&dir)
        .args(["params", "set", "VpcId", "vpc-42"])
        .assert()
        .success();

    modelstack(&dir)
        .args(["params", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VpcId").and(predicate::str::contains("vpc-42")));
}

#[test]
fn params_show_json() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    modelstack(&dir)
        .args(["params", "set", "ClusterName", "c1"])
        .assert()
        .success();

    let output = modelstack(&dir)
        .args(["--json", "params", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["ClusterName"], "c1");
}

#[test]
fn params_set_merges_without_deleting() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    modelstack(&dir)
        .args(["params", "set", "VpcId", "vpc-1"])
        .assert()
        .success();
    modelstack(&dir)
        .args(["params", "set", "SubnetIds", "subnet-a"])
        .assert()
        .success();

    modelstack(&dir)
        .args(["params", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc-1").and(predicate::str::contains("subnet-a")));
}

#[test]
fn corrupt_parameter_file_fails_loudly() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(dir.path().join(".modelstack/parameters.json"), "{oops").unwrap();

    modelstack(&dir)
        .args(["params", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed parameter file"));
}

// ---------------------------------------------------------------------------
// modelstack models
// ---------------------------------------------------------------------------

#[test]
fn models_list_contains_builtin_recipes() {
    let dir = TempDir::new().unwrap();
    modelstack(&dir)
        .args(["models", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("model-in-docker")
                .and(predicate::str::contains("qwen2.5-7b-instruct")),
        );
}

#[test]
fn models_show_unknown_fails() {
    let dir = TempDir::new().unwrap();
    modelstack(&dir)
        .args(["models", "show", "no-such-model"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("model not found"));
}

// ---------------------------------------------------------------------------
// modelstack deploy
// ---------------------------------------------------------------------------

#[test]
fn deploy_requires_endpoint() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    modelstack(&dir)
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no provider endpoint configured"));
}

#[test]
fn deploy_requires_init() {
    let dir = TempDir::new().unwrap();
    modelstack(&dir)
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn deploy_converged_stacks_propagates_outputs() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let mut server = mockito::Server::new();
    let _network = server
        .mock("GET", "/stacks/ms-network")
        .with_status(200)
        .with_body(complete_stack_body(
            "ms-network",
            &[("VpcId", "vpc-1"), ("SubnetIds", "subnet-a,subnet-b")],
        ))
        .create();
    let _cluster = server
        .mock("GET", "/stacks/ms-cluster")
        .with_status(200)
        .with_body(complete_stack_body("ms-cluster", &[("ClusterName", "c1")]))
        .create();
    configure_endpoint(&dir, &server.url());

    modelstack(&dir)
        .arg("deploy")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Deployment complete")
                .and(predicate::str::contains("ClusterName: c1")),
        );

    let params = std::fs::read_to_string(dir.path().join(".modelstack/parameters.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&params).unwrap();
    assert_eq!(parsed["Parameters"]["VpcId"], "vpc-1");
    assert_eq!(parsed["Parameters"]["SubnetIds"], "subnet-a,subnet-b");
    assert_eq!(parsed["Parameters"]["ClusterName"], "c1");
}

#[test]
fn deploy_failed_stack_aborts_pipeline() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let mut server = mockito::Server::new();
    let _network = server
        .mock("GET", "/stacks/ms-network")
        .with_status(200)
        .with_body(r#"{"stack_name": "ms-network", "stack_status": "ROLLBACK_COMPLETE"}"#)
        .create();
    let cluster = server
        .mock("GET", "/stacks/ms-cluster")
        .with_status(200)
        .with_body(complete_stack_body("ms-cluster", &[]))
        .expect(0)
        .create();
    configure_endpoint(&dir, &server.url());

    modelstack(&dir)
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ROLLBACK_COMPLETE"));

    cluster.assert();
}

#[test]
fn deploy_with_external_network_bypasses_network_stack() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let mut server = mockito::Server::new();
    let network = server
        .mock("GET", "/stacks/ms-network")
        .with_status(200)
        .with_body(complete_stack_body("ms-network", &[]))
        .expect(0)
        .create();
    let _cluster = server
        .mock("GET", "/stacks/ms-cluster")
        .with_status(200)
        .with_body(complete_stack_body("ms-cluster", &[("ClusterName", "c1")]))
        .create();
    configure_endpoint(&dir, &server.url());

    modelstack(&dir)
        .args([
            "deploy",
            "--extra-params",
            r#"{"vpc_id": "vpc-ext", "subnet_ids": "subnet-x,subnet-y"}"#,
        ])
        .assert()
        .success();

    network.assert();

    let params = std::fs::read_to_string(dir.path().join(".modelstack/parameters.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&params).unwrap();
    assert_eq!(parsed["Parameters"]["VpcId"], "vpc-ext");
    assert_eq!(parsed["Parameters"]["SubnetIds"], "subnet-x,subnet-y");
}

#[test]
fn deploy_validates_model_against_catalog() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    configure_endpoint(&dir, "https://infra.example.com");

    modelstack(&dir)
        .args(["deploy", "--model-id", "no-such-model"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("model not found"));
}

#[test]
fn deploy_rejects_unsupported_instance_type() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    configure_endpoint(&dir, "https://infra.example.com");

    modelstack(&dir)
        .args([
            "deploy",
            "--model-id",
            "qwen2.5-7b-instruct",
            "--model-artifact",
            "s3://models/qwen",
            "--instance-type",
            "t3.micro",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not support instance type"));
}

// ---------------------------------------------------------------------------
// modelstack status
// ---------------------------------------------------------------------------

#[test]
fn status_reports_undeployed_stacks() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let mut server = mockito::Server::new();
    let _network = server.mock("GET", "/stacks/ms-network").with_status(404).create();
    let _cluster = server.mock("GET", "/stacks/ms-cluster").with_status(404).create();
    configure_endpoint(&dir, &server.url());

    modelstack(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not deployed)"));
}

#[test]
fn status_shows_stack_outputs() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let mut server = mockito::Server::new();
    let _network = server
        .mock("GET", "/stacks/ms-network")
        .with_status(200)
        .with_body(complete_stack_body("ms-network", &[("VpcId", "vpc-1")]))
        .create();
    configure_endpoint(&dir, &server.url());

    modelstack(&dir)
        .args(["status", "ms-network"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("CREATE_COMPLETE").and(predicate::str::contains("vpc-1")),
        );
}

// ---------------------------------------------------------------------------
// modelstack update
// ---------------------------------------------------------------------------

#[test]
fn update_check_disabled_via_env() {
    let dir = TempDir::new().unwrap();
    modelstack(&dir)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("release check unavailable"));
}
