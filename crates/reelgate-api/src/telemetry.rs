use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// EnvFilter matches targets on `::` boundaries, so each workspace crate
// needs its own directive.
const DEFAULT_DIRECTIVES: &str =
    "reelgate_api=debug,reelgate_core=debug,reelgate_db=debug,tower_http=debug";

/// Initialize tracing with an env-filter, defaulting to debug for our crates.
pub fn init_telemetry() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_DIRECTIVES.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse_and_name_every_workspace_crate() {
        let filter = EnvFilter::try_new(DEFAULT_DIRECTIVES).unwrap();
        let rendered = filter.to_string();
        for target in ["reelgate_api", "reelgate_core", "reelgate_db"] {
            assert!(rendered.contains(target), "missing directive for {target}");
        }
    }
}
