//! Layered client configuration tests

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::io::Write;
use std::path::PathBuf;

use fbus_client::{AdapterKind, ClientConfig, FbusError};
use figment::Jail;

#[test]
fn test_defaults_without_files() {
    Jail::expect_with(|_jail| {
        let config = ClientConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config, ClientConfig::default());
        Ok(())
    });
}

#[test]
fn test_toml_file_then_environment() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "fbus.toml",
            r#"
                library_path = "/opt/fbus/libfbus.so"
                adapter = "tcp"
                port = 12
            "#,
        )?;

        let config = ClientConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.adapter, AdapterKind::Tcp);
        assert_eq!(config.port, 12);
        assert_eq!(config.library_path(), PathBuf::from("/opt/fbus/libfbus.so"));
        assert_eq!(config.log_level, "info");

        jail.set_env("FBUS_PORT", "3");
        jail.set_env("FBUS_LOG_LEVEL", "debug");
        let config = ClientConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.port, 3);
        assert_eq!(config.adapter, AdapterKind::Tcp);
        assert_eq!(config.log_level, "debug");
        Ok(())
    });
}

#[test]
fn test_yaml_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("fbus.toml", "port = 4")?;
        jail.create_file("fbus.yaml", "port: 9\nadapter: local\n")?;

        let config = ClientConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.port, 9);
        assert_eq!(config.adapter, AdapterKind::Local);
        Ok(())
    });
}

#[test]
fn test_invalid_port_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("FBUS_PORT", "0");
        let err = ClientConfig::load().unwrap_err();
        assert!(matches!(err, FbusError::Config(_)));
        Ok(())
    });
}

// Jail serializes environment access with the other tests
#[test]
fn test_from_explicit_file() {
    Jail::expect_with(|_jail| {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"adapter": "tcp", "port": 100}}"#).unwrap();

        let config = ClientConfig::from_file(file.path()).map_err(|e| e.to_string())?;
        assert_eq!(config.adapter, AdapterKind::Tcp);
        assert_eq!(config.port, 100);
        assert_eq!(config.library_path, None);
        Ok(())
    });
}

#[test]
fn test_from_file_errors() {
    Jail::expect_with(|_jail| {
        let err = ClientConfig::from_file("/nonexistent/fbus.toml").unwrap_err();
        assert!(matches!(err, FbusError::Config(_)));

        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported configuration format"));

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "port = \"many\"").unwrap();
        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        Ok(())
    });
}
