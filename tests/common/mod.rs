// ABOUTME: Common fixtures for integration tests
// ABOUTME: Builds fully-populated release contexts and artifacts with pinned values

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use std::collections::HashMap;

use slipway_templating::{Artifact, GitInfo, ReleaseContext, Semver};

pub fn release_context() -> ReleaseContext {
    let mut env = HashMap::new();
    env.insert("FOO".to_string(), "bar".to_string());
    env.insert("HOME".to_string(), "/home/release".to_string());

    ReleaseContext {
        project_name: "slipway".to_string(),
        version: "1.2.3".to_string(),
        semver: Semver {
            major: 1,
            minor: 2,
            patch: 3,
            prerelease: String::new(),
        },
        git: GitInfo {
            current_tag: "v1.2.3".to_string(),
            branch: "main".to_string(),
            commit: "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678".to_string(),
            short_commit: "a1b2c3d".to_string(),
            full_commit: "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678".to_string(),
            commit_date: Utc.with_ymd_and_hms(2024, 4, 2, 10, 30, 0).unwrap(),
            url: "git@github.com:acme/slipway.git".to_string(),
        },
        env,
        snapshot: false,
        date: Utc.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).unwrap(),
    }
}

pub fn linux_amd64_artifact() -> Artifact {
    Artifact {
        name: "slipway_1.2.3_linux_amd64.tar.gz".to_string(),
        path: "dist/slipway_linux_amd64/slipway".to_string(),
        os: "linux".to_string(),
        arch: "amd64".to_string(),
        arm: String::new(),
        mips: String::new(),
        binary: None,
        upload_hash: None,
    }
}

pub fn env_strings(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|entry| entry.to_string()).collect()
}
