//! Common test utilities for gatebundle integration tests

use std::path::PathBuf;
use tempfile::TempDir;

pub const TOKEN_POLICY_GUID: &str = "506589b0-eba5-4b3f-81b5-be7809817623";

/// Policy included by the token service
pub const TOKEN_POLICY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
    <wsp:All wsp:Usage="Required">
        <L7p:SetVariable>
            <L7p:VariableToSet stringValue="token.type"/>
        </L7p:SetVariable>
    </wsp:All>
</wsp:Policy>
"#;

/// Service body including the token policy
pub const TOKEN_SERVICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
    <wsp:All wsp:Usage="Required">
        <L7p:Include>
            <L7p:PolicyGuid stringValue="506589b0-eba5-4b3f-81b5-be7809817623"/>
        </L7p:Include>
    </wsp:All>
</wsp:Policy>
"#;

/// Policy querying the `OAuth` connection
pub const CLIENT_POLICY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
    <wsp:All wsp:Usage="Required">
        <L7p:JdbcQuery>
            <L7p:ConnectionName stringValue="OAuth"/>
            <L7p:SqlQuery stringValue="SELECT * FROM oauth_client"/>
        </L7p:JdbcQuery>
    </wsp:All>
</wsp:Policy>
"#;

/// A test workspace for integration tests
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create a bundle directory under `bundles/` holding `manifest` as its bundle.yaml
    pub fn create_bundle(&self, name: &str, manifest: &str) -> PathBuf {
        let bundle_path = self.path.join("bundles").join(name);
        std::fs::create_dir_all(&bundle_path).expect("Failed to create bundle directory");
        std::fs::write(bundle_path.join("bundle.yaml"), manifest)
            .expect("Failed to write bundle manifest");
        bundle_path
    }

    /// Create the token bundle: one folder, one policy and the service including it
    pub fn create_token_bundle(&self) -> PathBuf {
        let bundle = self.create_bundle(
            "oauth",
            &format!(
                r"id: oauth
name: OAuth Manager
version: 1.0.0
description: Token endpoint
folders:
  - /OAuth
policies:
  - id: token-policy
    guid: {TOKEN_POLICY_GUID}
    name: Token Utility
    folder: /OAuth/Policies
    policy: policies/token.xml
services:
  - id: token-service
    name: Token
    folder: /OAuth
    uri: /auth/oauth/v2/token
    policy: services/token.xml
"
            ),
        );
        self.write_file("bundles/oauth/policies/token.xml", TOKEN_POLICY);
        self.write_file("bundles/oauth/services/token.xml", TOKEN_SERVICE);
        bundle
    }

    /// Create a bundle whose only policy needs the `OAuth` JDBC connection
    pub fn create_client_bundle(&self) -> PathBuf {
        let bundle = self.create_bundle(
            "clients",
            r"id: clients
name: Client Store
version: 0.2.0
policies:
  - id: client-policy
    guid: 7c1e9c2a-3f7d-4c55-9d8e-0a1b2c3d4e5f
    name: Client Lookup
    folder: /Clients
    policy: policies/client.xml
",
        );
        self.write_file("bundles/clients/policies/client.xml", CLIENT_POLICY);
        bundle
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Parsed target store
    pub fn target(&self, path: &str) -> serde_json::Value {
        serde_json::from_str(&self.read_file(path)).expect("Failed to parse target store")
    }

    /// Stored entities of one category
    pub fn entities(&self, path: &str, category: &str) -> Vec<serde_json::Value> {
        self.target(path)["entities"]
            .as_array()
            .expect("entities should be an array")
            .iter()
            .filter(|e| e["entity"]["category"] == category)
            .cloned()
            .collect()
    }

    /// Command running gatebundle in this workspace, isolated from the user's environment
    pub fn cmd(&self) -> assert_cmd::Command {
        #[allow(deprecated)]
        let mut cmd = assert_cmd::Command::cargo_bin("gatebundle").expect("Failed to find binary");
        cmd.current_dir(&self.path)
            .env("HOME", &self.path)
            .env("XDG_CONFIG_HOME", self.path.join(".config"))
            .env_remove("GATEBUNDLE_CONFIG")
            .env_remove("GATEBUNDLE_BUNDLES_DIR")
            .env_remove("GATEBUNDLE_TARGET")
            .env_remove("RUST_LOG");
        cmd
    }
}
