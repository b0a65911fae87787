//! Stage 2 — application directory and Python virtual environment.

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, PipRequirements, PythonEnv};
use crate::domain::{ProvisionConfig, ProvisionError, StageOutcome};

/// Ensure the work directory and venv exist and requirements are installed.
///
/// An existing work directory or venv is never recreated.
///
/// # Errors
///
/// Returns an error if the application entrypoint is missing, or the venv
/// or pip install fails.
pub async fn ensure(
    python: &impl PythonEnv,
    fs: &impl LocalFs,
    config: &ProvisionConfig,
) -> Result<StageOutcome> {
    let mut created = Vec::new();

    if !fs.exists(&config.work_dir) {
        fs.create_dir_all(&config.work_dir)?;
        created.push("work dir");
    }

    let entrypoint = config.entrypoint_path();
    if !fs.exists(&entrypoint) {
        return Err(ProvisionError::MissingFile {
            what: "application entrypoint",
            path: entrypoint,
        }
        .into());
    }

    if !fs.exists(&config.venv_python()) {
        python
            .create_venv(&config.venv_dir)
            .await
            .with_context(|| format!("creating venv at {}", config.venv_dir.display()))?;
        created.push("venv");
    }

    let requirements_file = config.requirements_path();
    let requirements = if fs.exists(&requirements_file) {
        PipRequirements::File(&requirements_file)
    } else {
        PipRequirements::Packages(&config.python_packages)
    };
    python
        .pip_install(&config.venv_dir, requirements)
        .await
        .context("installing Python requirements")?;

    Ok(if created.is_empty() {
        StageOutcome::Skipped(format!(
            "work dir and venv already present at {}",
            config.work_dir.display()
        ))
    } else {
        StageOutcome::Done(format!("created {}", created.join(" and ")))
    })
}
