use std::{net::SocketAddr, path::PathBuf};

use anyhow::{anyhow, Result};
use clap::ArgMatches;
use lazy_static::lazy_static;

pub static SERVICE_NAME: &str = "module-server";

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: Option<TlsConfig>,
    pub module_config_path: PathBuf,
    pub module_bundle: Option<BundleCheck>,
    pub pool_size: usize,
    pub admission_timeout_seconds: u64,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

pub struct TlsConfig {
    pub cert_file: String,
    pub key_file: String,
}

/// The delivered module bundle and the SHA-256 content hash it must match.
pub struct BundleCheck {
    pub path: PathBuf,
    pub digest: String,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let addr = api_bind_address(matches)?;

        let (cert_file, key_file) = tls_files(matches)?;
        let tls_config = if cert_file.is_empty() {
            None
        } else {
            Some(TlsConfig {
                cert_file,
                key_file,
            })
        };

        let module_config_path = matches
            .get_one::<String>("module-config")
            .map(PathBuf::from)
            .expect("This should not happen, there's a default value for module-config");

        let module_bundle = bundle_check(matches)?;

        let pool_size = matches
            .get_one::<String>("workers")
            .map_or_else(num_cpus::get, |v| {
                v.parse::<usize>()
                    .expect("error parsing the number of workers")
            });

        let admission_timeout_seconds = matches
            .get_one::<String>("admission-timeout")
            .expect("admission-timeout should always be set")
            .parse::<u64>()?;

        let log_level = matches
            .get_one::<String>("log-level")
            .expect("This should not happen, there's a default value for log-level")
            .to_owned();
        let log_fmt = matches
            .get_one::<String>("log-fmt")
            .expect("This should not happen, there's a default value for log-fmt")
            .to_owned();
        let log_no_color = matches
            .get_one::<bool>("log-no-color")
            .expect("clap should have assigned a default value")
            .to_owned();

        Ok(Self {
            addr,
            tls_config,
            module_config_path,
            module_bundle,
            pool_size,
            admission_timeout_seconds,
            log_level,
            log_fmt,
            log_no_color,
        })
    }
}

fn api_bind_address(matches: &clap::ArgMatches) -> Result<SocketAddr> {
    format!(
        "{}:{}",
        matches.get_one::<String>("address").unwrap(),
        matches.get_one::<String>("port").unwrap()
    )
    .parse()
    .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_files(matches: &clap::ArgMatches) -> Result<(String, String)> {
    let cert_file = matches.get_one::<String>("cert-file").unwrap().to_owned();
    let key_file = matches.get_one::<String>("key-file").unwrap().to_owned();
    if cert_file.is_empty() != key_file.is_empty() {
        Err(anyhow!("error parsing arguments: either both --cert-file and --key-file must be provided, or neither"))
    } else {
        Ok((cert_file, key_file))
    }
}

fn bundle_check(matches: &clap::ArgMatches) -> Result<Option<BundleCheck>> {
    let path = matches.get_one::<String>("module-bundle");
    let digest = matches.get_one::<String>("module-digest");

    match (path, digest) {
        (None, None) => Ok(None),
        (Some(path), Some(digest)) => Ok(Some(BundleCheck {
            path: PathBuf::from(path),
            digest: digest.to_owned(),
        })),
        _ => Err(anyhow!("error parsing arguments: either both --module-bundle and --module-digest must be provided, or neither")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_cli;

    #[test]
    fn config_from_default_args() {
        let matches = build_cli().get_matches_from(["module-server"]);
        let config = Config::from_args(&matches).unwrap();

        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
        assert!(config.tls_config.is_none());
        assert!(config.module_bundle.is_none());
        assert_eq!(config.admission_timeout_seconds, 10);
    }

    #[test]
    fn tls_files_must_come_in_pairs() {
        let matches =
            build_cli().get_matches_from(["module-server", "--cert-file", "/tmp/cert.pem"]);
        assert!(Config::from_args(&matches).is_err());
    }

    #[test]
    fn bundle_and_digest_must_come_in_pairs() {
        let matches =
            build_cli().get_matches_from(["module-server", "--module-bundle", "/tmp/bundle"]);
        assert!(Config::from_args(&matches).is_err());
    }
}
