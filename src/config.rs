use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::estimator::EstimatorConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            catalog: CatalogConfig::from_env(),
            engine: EngineConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "PRINT_ESTIMATOR_API_HOST";
    const PORT_VAR: &'static str = "PRINT_ESTIMATOR_API_PORT";

    fn from_env() -> Self {
        let host_value = env_string(Self::HOST_VAR)
            .unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string(Self::PORT_VAR) {
            Some(raw) => parse_port(&raw, Self::PORT_VAR).unwrap_or(Self::DEFAULT_PORT),
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Location of the catalog file.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    path: PathBuf,
}

impl CatalogConfig {
    const DEFAULT_PATH: &'static str = "data/catalog.json";

    fn from_env() -> Self {
        Self {
            path: env_string("PRINT_ESTIMATOR_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Configuration of the pricing engine.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    estimator: EstimatorConfig,
}

impl EngineConfig {
    const FIT_TOLERANCE_VAR: &'static str = "PRINT_ESTIMATOR_FIT_TOLERANCE_MM";
    const SNAP_WINDOW_VAR: &'static str = "PRINT_ESTIMATOR_SNAP_WINDOW_MM";
    const MAGNET_RATE_VAR: &'static str = "PRINT_ESTIMATOR_MAGNET_UNIT_RATE";
    const QUANTITY_TIERS_VAR: &'static str = "PRINT_ESTIMATOR_QUANTITY_TIERS";
    const SIZE_SUGGESTIONS_VAR: &'static str = "PRINT_ESTIMATOR_SIZE_SUGGESTIONS";
    const QUANTITY_SUGGESTIONS_VAR: &'static str = "PRINT_ESTIMATOR_QUANTITY_SUGGESTIONS";

    fn from_env() -> Self {
        let fit_tolerance = load_f64_with_warning(
            Self::FIT_TOLERANCE_VAR,
            EstimatorConfig::DEFAULT_FIT_TOLERANCE_MM,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted fit tolerance changes which sizes count as standard",
        );

        let snap_window = load_f64_with_warning(
            Self::SNAP_WINDOW_VAR,
            EstimatorConfig::DEFAULT_SNAP_WINDOW_MM,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted snap window changes which sizes are suggested",
        );

        let magnet_rate = load_f64_with_warning(
            Self::MAGNET_RATE_VAR,
            EstimatorConfig::DEFAULT_MAGNET_UNIT_RATE,
            |value| value > 0.0,
            "must be greater than 0",
            "Adjusted magnet unit rate changes all custom magnet prices",
        );

        let tiers = env_string(Self::QUANTITY_TIERS_VAR)
            .and_then(|raw| parse_tiers(&raw, Self::QUANTITY_TIERS_VAR))
            .unwrap_or_else(|| EstimatorConfig::DEFAULT_QUANTITY_TIERS.to_vec());

        let suggest_sizes = env_string(Self::SIZE_SUGGESTIONS_VAR)
            .and_then(|raw| parse_bool(&raw, Self::SIZE_SUGGESTIONS_VAR))
            .unwrap_or(true);

        let suggest_quantities = env_string(Self::QUANTITY_SUGGESTIONS_VAR)
            .and_then(|raw| parse_bool(&raw, Self::QUANTITY_SUGGESTIONS_VAR))
            .unwrap_or(true);

        let estimator = EstimatorConfig::builder()
            .fit_tolerance_mm(fit_tolerance)
            .snap_window_mm(snap_window)
            .magnet_unit_rate(magnet_rate)
            .quantity_tiers(tiers)
            .suggest_sizes(suggest_sizes)
            .suggest_quantities(suggest_quantities)
            .build();

        Self { estimator }
    }

    /// Returns the configured EstimatorConfig.
    pub fn estimator_config(&self) -> EstimatorConfig {
        self.estimator.clone()
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_port(raw: &str, var_name: &str) -> Option<u16> {
    match raw.parse::<u16>() {
        Ok(0) => {
            warn!("{} must not be 0. Using default port.", var_name);
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "Could not parse {} ('{}'): {}. Using default port.",
                var_name, raw, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_tiers(raw: &str, var_name: &str) -> Option<Vec<u32>> {
    let parsed: Result<Vec<u32>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<u32>)
        .collect();
    match parsed {
        Ok(tiers) if !tiers.is_empty() && tiers.iter().all(|tier| *tier > 0) => Some(tiers),
        Ok(_) => {
            warn!(
                "{} must list positive quantities ('{}'). Using default tiers.",
                var_name, raw
            );
            None
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}'): {}. Using default tiers.",
                var_name, raw, err
            );
            None
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_with_warning(var_name, &raw, default, validator, invalid_hint, notice),
        None => default,
    }
}

fn parse_f64_with_warning(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) => {
            if !value.is_finite() || !validator(value) {
                warn!(
                    "{} contains invalid value '{}': {}. Using {}.",
                    var_name, raw, invalid_hint, default
                );
                default
            } else {
                let tolerance = (default.abs().max(1.0)) * 1e-9;
                if (value - default).abs() > tolerance {
                    info!("{} ({} = {}).", notice, var_name, value);
                }
                value
            }
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}
