use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use dialoguer::Confirm;
use swaxios_core::{GenerateOptions, load_document, write_client};
use tracing::debug;

use crate::run_cli_with;

/// Arguments of a generation run.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Swagger document to read.
    #[arg(
        long,
        short = 'i',
        value_name = "FILE_OR_URL",
        help = "File path or URL to a Swagger specification (JSON or YAML)"
    )]
    pub input: String,
    /// Directory the client is written to.
    #[arg(
        long,
        short = 'o',
        value_name = "DIR",
        help = "Output directory for the generated client"
    )]
    pub output: PathBuf,
    /// Replace an existing output directory without confirmation.
    #[arg(
        long,
        short = 'f',
        help = "Overwrite the output directory without asking"
    )]
    pub force: bool,
}

pub async fn run(args: GenerateArgs) -> i32 {
    run_cli_with(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    // Load and validate first: a broken input never prompts or touches the output.
    let document = load_document(&args.input)
        .await
        .map_err(|err| err.to_string())?;

    let overwrite = match overwrite_decision(
        &args.output,
        args.force,
        is_ci(std::env::var("CI").ok().as_deref()),
    ) {
        OverwriteDecision::Proceed(overwrite) => overwrite,
        OverwriteDecision::Ask => confirm_overwrite(&args.output)?,
        OverwriteDecision::Refuse => {
            return Err(format!(
                "Output directory \"{}\" already exists. Use --force to overwrite it.",
                args.output.display()
            ));
        }
    };
    if !overwrite && args.output.exists() {
        return Err("Aborted, output directory left untouched.".to_string());
    }

    let summary = write_client(
        &document,
        &GenerateOptions {
            output_dir: args.output.clone(),
            overwrite,
        },
    )
    .await
    .map_err(|err| err.to_string())?;

    println!(
        "{} Generated {} services and {} interfaces in {}",
        style("✓").green().bold(),
        summary.services,
        summary.interfaces,
        style(args.output.display()).cyan()
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverwriteDecision {
    /// Go ahead; `true` when an existing directory is replaced.
    Proceed(bool),
    Ask,
    Refuse,
}

fn overwrite_decision(output: &Path, force: bool, ci: bool) -> OverwriteDecision {
    if !output.exists() {
        return OverwriteDecision::Proceed(false);
    }
    if force {
        return OverwriteDecision::Proceed(true);
    }
    if ci {
        debug!("Running in CI, not prompting.");
        OverwriteDecision::Refuse
    } else {
        OverwriteDecision::Ask
    }
}

fn confirm_overwrite(output: &Path) -> Result<bool, String> {
    Confirm::new()
        .with_prompt(format!(
            "Output directory \"{}\" already exists. Delete it and continue?",
            output.display()
        ))
        .default(false)
        .interact()
        .map_err(|err| format!("Failed to read confirmation: {err}"))
}

/// `CI` counts as set unless it is empty, `0` or `false`.
fn is_ci(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        let value = value.trim();
        !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ci() {
        assert!(is_ci(Some("true")));
        assert!(is_ci(Some("1")));
        assert!(!is_ci(Some("false")));
        assert!(!is_ci(Some("0")));
        assert!(!is_ci(Some("")));
        assert!(!is_ci(None));
    }

    #[test]
    fn test_overwrite_decision() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("client");

        assert_eq!(
            overwrite_decision(&missing, false, true),
            OverwriteDecision::Proceed(false)
        );
        assert_eq!(
            overwrite_decision(temp.path(), true, true),
            OverwriteDecision::Proceed(true)
        );
        assert_eq!(
            overwrite_decision(temp.path(), false, true),
            OverwriteDecision::Refuse
        );
        assert_eq!(
            overwrite_decision(temp.path(), false, false),
            OverwriteDecision::Ask
        );
    }

    #[tokio::test]
    async fn test_invalid_input_fails_without_prompting() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("swagger.json");
        std::fs::write(&input, r#"{"openapi": "3.0.1", "info": {}, "paths": {}}"#).unwrap();

        let code = run(GenerateArgs {
            input: input.to_string_lossy().into_owned(),
            output: temp.path().to_path_buf(),
            force: false,
        })
        .await;
        assert_eq!(code, 1);
        assert!(input.exists());
    }

    #[tokio::test]
    async fn test_generates_into_new_directory() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("swagger.json");
        std::fs::write(
            &input,
            r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {"/ping": {"get": {"responses": {}}}}}"#,
        )
        .unwrap();
        let output = temp.path().join("client");

        let code = run(GenerateArgs {
            input: input.to_string_lossy().into_owned(),
            output: output.clone(),
            force: false,
        })
        .await;
        assert_eq!(code, 0);
        assert!(output.join("rest/PingService.ts").is_file());
        assert!(output.join("APIClient.ts").is_file());
    }
}
