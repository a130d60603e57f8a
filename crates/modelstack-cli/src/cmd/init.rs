use anyhow::Context;
use modelstack_core::{config::Config, io, paths};
use std::path::Path;

const NETWORK_TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Description: Serving network - VPC with two public subnets

Resources:
  Vpc:
    Type: AWS::EC2::VPC
    Properties:
      CidrBlock: 10.0.0.0/16
      EnableDnsSupport: true
      EnableDnsHostnames: true
  SubnetA:
    Type: AWS::EC2::Subnet
    Properties:
      VpcId: !Ref Vpc
      CidrBlock: 10.0.0.0/20
  SubnetB:
    Type: AWS::EC2::Subnet
    Properties:
      VpcId: !Ref Vpc
      CidrBlock: 10.0.16.0/20

Outputs:
  VpcId:
    Value: !Ref Vpc
  SubnetIds:
    Value: !Join [",", [!Ref SubnetA, !Ref SubnetB]]
"#;

const CLUSTER_TEMPLATE: &str = r#"AWSTemplateFormatVersion: "2010-09-09"
Description: Model serving cluster

Parameters:
  VpcId:
    Type: String
  SubnetIds:
    Type: String

Resources:
  Cluster:
    Type: AWS::ECS::Cluster
    Properties:
      ClusterSettings:
        - Name: containerInsights
          Value: enabled

Outputs:
  ClusterName:
    Value: !Ref Cluster
  ClusterArn:
    Value: !GetAtt Cluster.Arn
"#;

/// `modelstack init` — scaffold `.modelstack/` and the starter templates.
/// Idempotent: existing config, parameters, and templates are untouched.
pub fn run(root: &Path) -> anyhow::Result<()> {
    io::ensure_dir(&paths::modelstack_dir(root)).context("failed to create .modelstack/")?;
    io::ensure_dir(&paths::templates_dir(root)).context("failed to create templates/")?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("Created {}", paths::CONFIG_FILE);
    }

    if io::write_if_missing(&paths::parameters_path(root), b"{\n    \"Parameters\": {}\n}")? {
        println!("Created {}", paths::PARAMETERS_FILE);
    }

    for (file, body) in [
        ("network.yaml", NETWORK_TEMPLATE),
        ("cluster.yaml", CLUSTER_TEMPLATE),
    ] {
        if io::write_if_missing(&paths::template_path(root, file), body.as_bytes())? {
            println!("Created templates/{file}");
        }
    }

    println!("\nmodelstack initialized in {}", root.display());
    println!("Set the provider endpoint in {} before deploying.", paths::CONFIG_FILE);
    Ok(())
}
