// ABOUTME: Integration tests for the template field set and appliers
// ABOUTME: Exercises context construction, enrichment, rendering, and the env-only guard

use std::collections::HashMap;

use slipway_templating::{Artifact, BuildOptions, Template, TemplateError};

mod common;

#[test]
fn test_project_name_renders_from_context() {
    let template = Template::new(&common::release_context());

    assert_eq!(template.apply("{{ .ProjectName }}").unwrap(), "slipway");
}

#[test]
fn test_raw_version_is_major_minor_patch() {
    let mut ctx = common::release_context();
    ctx.semver.major = 4;
    ctx.semver.minor = 11;
    ctx.semver.patch = 0;

    let template = Template::new(&ctx);

    assert_eq!(template.apply("{{ .RawVersion }}").unwrap(), "4.11.0");
}

#[test]
fn test_archive_name_template() {
    let template = Template::new(&common::release_context())
        .with_artifact(&common::linux_amd64_artifact(), &HashMap::new());

    let name = template
        .apply("{{ .ProjectName }}_{{ .Version }}_{{ .Os }}_{{ .Arch }}")
        .unwrap();
    assert_eq!(name, "slipway_1.2.3_linux_amd64");
}

#[test]
fn test_env_list_enrichment() {
    let template = Template::new(&common::release_context())
        .with_env_strings(&common::env_strings(&["A=1", "B=2"]));

    assert_eq!(template.apply("{{ .Env.A }}-{{ .Env.B }}").unwrap(), "1-2");
}

#[test]
fn test_env_list_splits_on_first_equals_only() {
    let template = Template::new(&common::release_context())
        .with_env_strings(&common::env_strings(&["C=1=2"]));

    assert_eq!(template.apply("{{ .Env.C }}").unwrap(), "1=2");
}

#[test]
fn test_artifact_replacement_table() {
    let mut replacements = HashMap::new();
    replacements.insert("amd64".to_string(), "x86_64".to_string());

    let template = Template::new(&common::release_context())
        .with_artifact(&common::linux_amd64_artifact(), &replacements);
    assert_eq!(template.apply("{{ .Arch }}").unwrap(), "x86_64");

    let mut arm_artifact = common::linux_amd64_artifact();
    arm_artifact.arch = "arm64".to_string();
    let template =
        Template::new(&common::release_context()).with_artifact(&arm_artifact, &replacements);
    assert_eq!(template.apply("{{ .Arch }}").unwrap(), "arm64");
}

#[test]
fn test_artifact_without_replacements_is_unchanged() {
    let template = Template::new(&common::release_context())
        .with_artifact(&common::linux_amd64_artifact(), &HashMap::new());

    assert_eq!(template.apply("{{ .Os }}").unwrap(), "linux");
    assert_eq!(template.apply("{{ .Arch }}").unwrap(), "amd64");
}

#[test]
fn test_binary_falls_back_to_project_name() {
    let template = Template::new(&common::release_context())
        .with_artifact(&common::linux_amd64_artifact(), &HashMap::new());

    assert_eq!(template.apply("{{ .Binary }}").unwrap(), "slipway");
}

#[test]
fn test_recorded_binary_name_wins() {
    let mut artifact = common::linux_amd64_artifact();
    artifact.binary = Some("sw".to_string());

    let template =
        Template::new(&common::release_context()).with_artifact(&artifact, &HashMap::new());

    assert_eq!(template.apply("{{ .Binary }}").unwrap(), "sw");
}

#[test]
fn test_upload_hash_always_present_after_artifact_enrichment() {
    let template = Template::new(&common::release_context())
        .with_artifact(&common::linux_amd64_artifact(), &HashMap::new());
    assert_eq!(template.apply("{{ .ArtifactUploadHash }}").unwrap(), "");

    let mut artifact = common::linux_amd64_artifact();
    artifact.upload_hash = Some("cafebabe".to_string());
    let template =
        Template::new(&common::release_context()).with_artifact(&artifact, &HashMap::new());
    assert_eq!(
        template.apply("{{ .ArtifactUploadHash }}").unwrap(),
        "cafebabe"
    );
}

#[test]
fn test_build_options_enrichment() {
    let options = BuildOptions {
        target: "aarch64-apple-darwin".to_string(),
        ext: String::new(),
        name: "slipway".to_string(),
        path: "dist/darwin/slipway".to_string(),
        os: "darwin".to_string(),
        arch: "arm64".to_string(),
    };

    let template = Template::new(&common::release_context()).with_build_options(&options);

    assert_eq!(
        template.apply("{{ .Target }}/{{ .Name }}{{ .Ext }}").unwrap(),
        "aarch64-apple-darwin/slipway"
    );
    assert_eq!(template.apply("{{ .Path }}").unwrap(), "dist/darwin/slipway");
    assert_eq!(
        template.apply("{{ .Os }}-{{ .Arch }}").unwrap(),
        "darwin-arm64"
    );
}

#[test]
fn test_unset_field_is_a_hard_error() {
    let template = Template::new(&common::release_context());

    let err = template.apply("{{ .DoesNotExist }}").unwrap_err();
    assert!(matches!(err, TemplateError::MissingField(ref path) if path == ".DoesNotExist"));

    // Artifact fields only exist once an artifact is attached.
    assert!(template.apply("{{ .ArtifactName }}").is_err());
}

#[test]
fn test_single_env_only_accepts_empty_and_blank() {
    let template = Template::new(&common::release_context());

    assert_eq!(template.apply_single_env_only("").unwrap(), "");
    assert_eq!(template.apply_single_env_only("   ").unwrap(), "");
}

#[test]
fn test_single_env_only_resolves_variable() {
    let template = Template::new(&common::release_context());

    assert_eq!(
        template.apply_single_env_only("{{ .Env.FOO }}").unwrap(),
        "bar"
    );
}

#[test]
fn test_single_env_only_rejects_extra_content() {
    let template = Template::new(&common::release_context());

    let err = template
        .apply_single_env_only("prefix-{{ .Env.FOO }}")
        .unwrap_err();
    assert!(matches!(err, TemplateError::ExpectedSingleEnv));

    let err = template
        .apply_single_env_only("{{ .Env.FOO.BAR }}")
        .unwrap_err();
    assert!(matches!(err, TemplateError::ExpectedSingleEnv));
}

#[test]
fn test_single_env_only_error_message_explains_requirement() {
    let template = Template::new(&common::release_context());

    let err = template.apply_single_env_only("hardcoded").unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected {{ .Env.VAR_NAME }} only (no plain-text or other interpolation)"
    );
}

#[test]
fn test_replace_helper_is_a_global_replace() {
    let template = Template::new(&common::release_context());

    assert_eq!(
        template.apply("{{ replace \"a\" \"b\" \"banana\" }}").unwrap(),
        "bbnbnb"
    );
}

#[test]
fn test_string_helpers_in_templates() {
    let template = Template::new(&common::release_context());

    assert_eq!(
        template.apply("{{ .ProjectName | toupper }}").unwrap(),
        "SLIPWAY"
    );
    assert_eq!(
        template.apply("{{ .Tag | trimprefix \"v\" }}").unwrap(),
        "1.2.3"
    );
    assert_eq!(
        template.apply("{{ trim \"  spaced  \" }}").unwrap(),
        "spaced"
    );
}

#[test]
fn test_path_helpers_in_templates() {
    let template = Template::new(&common::release_context())
        .with_artifact(&common::linux_amd64_artifact(), &HashMap::new());

    assert_eq!(
        template.apply("{{ dir .ArtifactPath }}").unwrap(),
        "dist/slipway_linux_amd64"
    );

    let resolved = template.apply("{{ abs .ArtifactPath }}").unwrap();
    let cwd = std::env::current_dir().unwrap();
    assert_eq!(
        resolved,
        cwd.join("dist/slipway_linux_amd64/slipway")
            .display()
            .to_string()
    );
}

#[test]
fn test_time_helper_reads_wall_clock() {
    let template = Template::new(&common::release_context());

    // The render timestamp is pinned to 2024; the time helper must not be.
    let year = template.apply("{{ time \"%Y\" }}").unwrap();
    assert_eq!(year.len(), 4);
    assert_ne!(year, "2024");
}

#[test]
fn test_syntax_error_surfaces() {
    let template = Template::new(&common::release_context());

    assert!(matches!(
        template.apply("{{ .ProjectName").unwrap_err(),
        TemplateError::SyntaxError(_)
    ));
}

#[test]
fn test_full_archive_pipeline() {
    let mut replacements = HashMap::new();
    replacements.insert("amd64".to_string(), "x86_64".to_string());
    replacements.insert("linux".to_string(), "Linux".to_string());

    let artifact = Artifact {
        binary: Some("slipway".to_string()),
        ..common::linux_amd64_artifact()
    };

    let template = Template::new(&common::release_context())
        .with_env_strings(&common::env_strings(&["CHANNEL=stable"]))
        .with_artifact(&artifact, &replacements);

    let name = template
        .apply("{{ .Binary }}-{{ .RawVersion }}-{{ .Os | tolower }}-{{ .Arch }}-{{ .Env.CHANNEL }}")
        .unwrap();
    assert_eq!(name, "slipway-1.2.3-linux-x86_64-stable");
}
