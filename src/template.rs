// ABOUTME: Field-set construction and enrichment for release template expansion
// ABOUTME: Provides the Template builder, enrichers, and the apply entry points

use chrono::SecondsFormat;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::context::{Artifact, BuildOptions, ReleaseContext};
use crate::engine::TemplateEngine;
use crate::error::{Result, TemplateError};

/// Fields available to the template engine.
pub type Fields = Map<String, Value>;

// general keys.
const PROJECT_NAME: &str = "ProjectName";
const VERSION: &str = "Version";
const RAW_VERSION: &str = "RawVersion";
const TAG: &str = "Tag";
const BRANCH: &str = "Branch";
const COMMIT: &str = "Commit";
const SHORT_COMMIT: &str = "ShortCommit";
const FULL_COMMIT: &str = "FullCommit";
const COMMIT_DATE: &str = "CommitDate";
const COMMIT_TIMESTAMP: &str = "CommitTimestamp";
const GIT_URL: &str = "GitURL";
const MAJOR: &str = "Major";
const MINOR: &str = "Minor";
const PATCH: &str = "Patch";
const PRERELEASE: &str = "Prerelease";
const IS_SNAPSHOT: &str = "IsSnapshot";
const ENV: &str = "Env";
const DATE: &str = "Date";
const TIMESTAMP: &str = "Timestamp";

// artifact-only keys.
const OS: &str = "Os";
const ARCH: &str = "Arch";
const ARM: &str = "Arm";
const MIPS: &str = "Mips";
const BINARY: &str = "Binary";
const ARTIFACT_NAME: &str = "ArtifactName";
const ARTIFACT_PATH: &str = "ArtifactPath";

// gitlab only.
const ARTIFACT_UPLOAD_HASH: &str = "ArtifactUploadHash";

// build keys.
const NAME: &str = "Name";
const EXT: &str = "Ext";
const PATH: &str = "Path";
const TARGET: &str = "Target";

static ENV_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{\s*\.Env\.[^.\s}]+\s*\}\}$").expect("invalid env-only pattern")
});

/// Holds the field set that can be applied to a template string.
///
/// The usual pattern is one template per release context, cloned and
/// enriched per artifact or build.
#[derive(Clone)]
pub struct Template {
    fields: Fields,
    engine: TemplateEngine,
}

impl Template {
    /// Build the general field set from a release context snapshot.
    pub fn new(ctx: &ReleaseContext) -> Self {
        let raw_version = format!(
            "{}.{}.{}",
            ctx.semver.major, ctx.semver.minor, ctx.semver.patch
        );

        let mut fields = Fields::new();
        fields.insert(
            PROJECT_NAME.to_string(),
            Value::from(ctx.project_name.clone()),
        );
        fields.insert(VERSION.to_string(), Value::from(ctx.version.clone()));
        fields.insert(RAW_VERSION.to_string(), Value::from(raw_version));
        fields.insert(TAG.to_string(), Value::from(ctx.git.current_tag.clone()));
        fields.insert(BRANCH.to_string(), Value::from(ctx.git.branch.clone()));
        fields.insert(COMMIT.to_string(), Value::from(ctx.git.commit.clone()));
        fields.insert(
            SHORT_COMMIT.to_string(),
            Value::from(ctx.git.short_commit.clone()),
        );
        fields.insert(
            FULL_COMMIT.to_string(),
            Value::from(ctx.git.full_commit.clone()),
        );
        fields.insert(
            COMMIT_DATE.to_string(),
            Value::from(
                ctx.git
                    .commit_date
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        );
        fields.insert(
            COMMIT_TIMESTAMP.to_string(),
            Value::from(ctx.git.commit_date.timestamp()),
        );
        fields.insert(GIT_URL.to_string(), Value::from(ctx.git.url.clone()));
        fields.insert(ENV.to_string(), env_fields(&ctx.env));
        fields.insert(
            DATE.to_string(),
            Value::from(ctx.date.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        fields.insert(TIMESTAMP.to_string(), Value::from(ctx.date.timestamp()));
        fields.insert(MAJOR.to_string(), Value::from(ctx.semver.major));
        fields.insert(MINOR.to_string(), Value::from(ctx.semver.minor));
        fields.insert(PATCH.to_string(), Value::from(ctx.semver.patch));
        fields.insert(
            PRERELEASE.to_string(),
            Value::from(ctx.semver.prerelease.clone()),
        );
        fields.insert(IS_SNAPSHOT.to_string(), Value::from(ctx.snapshot));

        Self {
            fields,
            engine: TemplateEngine::new(),
        }
    }

    /// Override the environment field with the given KEY=VALUE list,
    /// splitting each entry on the first `=`.
    ///
    /// # Panics
    ///
    /// Panics if an entry contains no `=`. Well-formed entries are a caller
    /// contract, not validated input.
    pub fn with_env_strings(self, entries: &[String]) -> Self {
        let mut env = HashMap::new();
        for entry in entries {
            let (key, value) = entry
                .split_once('=')
                .expect("environment entries must be KEY=VALUE");
            env.insert(key.to_string(), value.to_string());
        }
        self.with_env(env)
    }

    /// Override the environment field wholesale with the given map.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.fields.insert(ENV.to_string(), env_fields(&env));
        self
    }

    /// Merge extra fields into the field set, overriding same-named entries.
    pub fn with_extra_fields(mut self, extra: Fields) -> Self {
        for (key, value) in extra {
            self.fields.insert(key, value);
        }
        self
    }

    /// Populate the artifact fields from the artifact and replacement table.
    ///
    /// Platform values absent from the table, or mapped to the empty string,
    /// pass through unchanged. The binary name falls back to the current
    /// project-name field when the artifact did not record one.
    pub fn with_artifact(
        mut self,
        artifact: &Artifact,
        replacements: &HashMap<String, String>,
    ) -> Self {
        let binary = match &artifact.binary {
            Some(binary) => binary.clone(),
            None => self
                .fields
                .get(PROJECT_NAME)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };

        self.fields.insert(
            OS.to_string(),
            Value::from(replace_with(replacements, &artifact.os)),
        );
        self.fields.insert(
            ARCH.to_string(),
            Value::from(replace_with(replacements, &artifact.arch)),
        );
        self.fields.insert(
            ARM.to_string(),
            Value::from(replace_with(replacements, &artifact.arm)),
        );
        self.fields.insert(
            MIPS.to_string(),
            Value::from(replace_with(replacements, &artifact.mips)),
        );
        self.fields.insert(BINARY.to_string(), Value::from(binary));
        self.fields.insert(
            ARTIFACT_NAME.to_string(),
            Value::from(artifact.name.clone()),
        );
        self.fields.insert(
            ARTIFACT_PATH.to_string(),
            Value::from(artifact.path.clone()),
        );
        self.fields.insert(
            ARTIFACT_UPLOAD_HASH.to_string(),
            Value::from(artifact.upload_hash.clone().unwrap_or_default()),
        );
        self
    }

    /// Populate the build fields from the given build options.
    pub fn with_build_options(self, options: &BuildOptions) -> Self {
        self.with_extra_fields(build_fields(options))
    }

    /// Register a custom helper usable from subsequent applies.
    pub fn register_helper<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&[String]) -> Result<String> + Send + Sync + 'static,
    {
        self.engine.register_helper(name, helper);
    }

    /// Apply the given template string against the stored field set.
    pub fn apply(&self, template: &str) -> Result<String> {
        debug!("Applying template: {}", template);
        self.engine.render(template, &self.fields)
    }

    /// Apply a template that must be empty or reference exactly one
    /// environment variable and nothing else.
    ///
    /// The restriction discourages hard-coding credentials next to an
    /// environment reference in configuration values.
    pub fn apply_single_env_only(&self, template: &str) -> Result<String> {
        let trimmed = template.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }
        if !ENV_ONLY_RE.is_match(trimmed) {
            return Err(TemplateError::ExpectedSingleEnv);
        }
        debug!("Applying single-env template: {}", trimmed);
        self.engine.render(trimmed, &self.fields)
    }
}

fn env_fields(env: &HashMap<String, String>) -> Value {
    Value::Object(
        env.iter()
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect(),
    )
}

fn build_fields(options: &BuildOptions) -> Fields {
    let mut fields = Fields::new();
    fields.insert(TARGET.to_string(), Value::from(options.target.clone()));
    fields.insert(EXT.to_string(), Value::from(options.ext.clone()));
    fields.insert(NAME.to_string(), Value::from(options.name.clone()));
    fields.insert(PATH.to_string(), Value::from(options.path.clone()));
    fields.insert(OS.to_string(), Value::from(options.os.clone()));
    fields.insert(ARCH.to_string(), Value::from(options.arch.clone()));
    fields
}

// Replacement table lookup: absent or empty mappings pass the original through.
fn replace_with(replacements: &HashMap<String, String>, original: &str) -> String {
    match replacements.get(original) {
        Some(replacement) if !replacement.is_empty() => replacement.clone(),
        _ => original.to_string(),
    }
}
