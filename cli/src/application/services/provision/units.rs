//! Stage 8 — install, enable and (re)start both systemd units.

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, ServiceManager};
use crate::domain::{ProvisionConfig, StageOutcome, SystemdUnit};

/// Write both unit files, reload systemd if either changed, then enable
/// and restart the tunnel daemon followed by the application server.
///
/// Both units are rendered before anything is written, so a rendering
/// error leaves the host untouched.
///
/// # Errors
///
/// Returns an error if rendering fails or any systemd operation fails.
pub async fn install(
    services: &impl ServiceManager,
    fs: &impl LocalFs,
    config: &ProvisionConfig,
) -> Result<StageOutcome> {
    let units = [
        SystemdUnit::tunnel_daemon(config),
        SystemdUnit::app_server(config),
    ];
    let rendered = units
        .iter()
        .map(|u| u.render().map(|content| (u, content)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut changed = Vec::new();
    for (unit, content) in &rendered {
        let path = config.unit_path(&unit.name);
        let current = fs
            .exists(&path)
            .then(|| fs.read_to_string(&path).ok())
            .flatten();
        if current.as_deref() == Some(content.as_str()) {
            tracing::debug!(unit = %unit.name, "unit file unchanged");
            continue;
        }
        services
            .install_unit(&path, content)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        changed.push(unit.file_name());
    }

    if !changed.is_empty() {
        services.daemon_reload().await.context("reloading systemd")?;
    }

    for unit in &units {
        services
            .enable(&unit.name)
            .await
            .with_context(|| format!("enabling {}", unit.name))?;
        services
            .restart(&unit.name)
            .await
            .with_context(|| format!("starting {}", unit.name))?;
    }

    let names = units
        .iter()
        .map(|u| u.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(if changed.is_empty() {
        StageOutcome::Done(format!("restarted {names} (unit files unchanged)"))
    } else {
        StageOutcome::Done(format!("installed {} and restarted {names}", changed.join(", ")))
    })
}
