//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use gazette_digest_config::config_crate_version;
use gazette_digest_domain::domain_crate_version;
use gazette_digest_shared::shared_crate_version;

struct BuildInfo {
    name: &'static str,
    version: &'static str,
    config: &'static str,
    domain: &'static str,
    shared: &'static str,
}

const fn build_info() -> BuildInfo {
    BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        config: config_crate_version(),
        domain: domain_crate_version(),
        shared: shared_crate_version(),
    }
}

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let build = build_info();
    let stdout = if mode.is_json() {
        format_info_json(&build)?
    } else {
        format_info_text(&build)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_info_text(build: &BuildInfo) -> String {
    format!(
        "status: ok\nname: {}\nversion: {}\nconfig: {}\ndomain: {}\nshared: {}\n",
        build.name, build.version, build.config, build.domain, build.shared
    )
}

fn format_info_json(build: &BuildInfo) -> Result<String, CliError> {
    let payload = serde_json::json!({
        "status": "ok",
        "build": {
            "name": build.name,
            "version": build.version,
            "configVersion": build.config,
            "domainVersion": build.domain,
            "sharedVersion": build.shared,
        }
    });
    Ok(pretty_json(&payload)?)
}
