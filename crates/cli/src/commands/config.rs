use cartlift_core::config::{AppConfig, LoadOptions, LogFormat};

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let format = match config.logging.format {
                LogFormat::Compact => "compact",
                LogFormat::Pretty => "pretty",
                LogFormat::Json => "json",
            };
            let payload = serde_json::json!({
                "command": "config",
                "status": "ok",
                "effective": {
                    "database": {
                        "url": config.database.url,
                        "max_connections": config.database.max_connections,
                        "timeout_secs": config.database.timeout_secs,
                    },
                    "server": {
                        "bind_address": config.server.bind_address,
                        "port": config.server.port,
                        "graceful_shutdown_secs": config.server.graceful_shutdown_secs,
                    },
                    "logging": {
                        "level": config.logging.level,
                        "format": format,
                    },
                },
            });
            payload.to_string()
        }
        Err(error) => serde_json::json!({
            "command": "config",
            "status": "error",
            "error_class": "config_validation",
            "message": error.to_string(),
        })
        .to_string(),
    }
}
