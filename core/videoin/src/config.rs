// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0
//
// ConfigLoader reads the configuration file once and exposes cached accessors
// for tracing, runtime, and services. Services are built only when requested,
// so callers that only need tracing/runtime can proceed even if services are
// absent.

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_yaml::{Value, from_str};
use thiserror::Error;
use tracing::debug;

use crate::runtime::RuntimeConfiguration;
use videoin_config::component::configuration::Configuration;
use videoin_config::component::id::ID;
use videoin_config::component::{Component, ComponentBuilder};
use videoin_stub::{Service, ServiceBuilder};
use videoin_tracing::TracingConfiguration;

#[derive(Error, Debug)]
pub enum ConfigLoaderError {
    // File / I/O
    #[error("not found: {0}")]
    NotFound(String),

    // Parsing / structural validity
    #[error("invalid configuration - impossible to parse yaml")]
    InvalidYaml,
    #[error("invalid configuration - key {0} not valid")]
    InvalidKey(String),
    #[error("invalid configuration - {0}")]
    Invalid(String),

    // YAML decoding (typed propagation)
    #[error("yaml parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    // Services
    #[error("invalid configuration - missing services")]
    InvalidNoServices,
}

lazy_static! {
    static ref CONFIG_KEYS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("tracing");
        s.insert("runtime");
        s.insert("services");
        s
    };
}

pub struct ConfigLoader {
    root: Value,
    tracing: Option<TracingConfiguration>,
    runtime: Option<RuntimeConfiguration>,
    services: Option<HashMap<ID, Service>>,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let root_keys = self
            .root
            .as_mapping()
            .map(|m| {
                m.keys()
                    .filter_map(|k| k.as_str())
                    .map(|s| s.to_string())
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();

        f.debug_struct("ConfigLoader")
            .field("root_keys", &root_keys)
            .field("tracing_loaded", &self.tracing.is_some())
            .field("runtime_loaded", &self.runtime.is_some())
            .field("services_count", &self.services.as_ref().map(|m| m.len()))
            .finish()
    }
}

impl ConfigLoader {
    pub fn new(file_path: &str) -> Result<Self, ConfigLoaderError> {
        let config_str = std::fs::read_to_string(file_path)
            .map_err(|e| ConfigLoaderError::NotFound(format!("{}: {}", file_path, e)))?;

        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(config_str: &str) -> Result<Self, ConfigLoaderError> {
        let root: Value = from_str(config_str).map_err(|_| ConfigLoaderError::InvalidYaml)?;

        // an empty document is an empty configuration
        let root = match root {
            Value::Null => Value::Mapping(Default::default()),
            other => other,
        };

        let mapping = root.as_mapping().ok_or(ConfigLoaderError::InvalidYaml)?;
        for key in mapping.keys() {
            let k = key.as_str().ok_or(ConfigLoaderError::InvalidYaml)?;
            if !CONFIG_KEYS.contains(k) {
                return Err(ConfigLoaderError::InvalidKey(k.to_string()));
            }
        }

        Ok(Self {
            root,
            tracing: None,
            runtime: None,
            services: None,
        })
    }

    pub fn tracing(&mut self) -> Result<&TracingConfiguration, ConfigLoaderError> {
        if self.tracing.is_none() {
            let cfg = section_or_default::<TracingConfiguration>(&self.root, "tracing")?;
            debug!(?cfg, "Tracing configuration loaded");
            self.tracing = Some(cfg);
        }

        self.tracing
            .as_ref()
            .ok_or_else(|| ConfigLoaderError::Invalid("tracing".to_string()))
    }

    pub fn runtime(&mut self) -> Result<&RuntimeConfiguration, ConfigLoaderError> {
        if self.runtime.is_none() {
            let cfg = section_or_default::<RuntimeConfiguration>(&self.root, "runtime")?;
            debug!(?cfg, "Runtime configuration loaded");
            self.runtime = Some(cfg);
        }

        self.runtime
            .as_ref()
            .ok_or_else(|| ConfigLoaderError::Invalid("runtime".to_string()))
    }

    pub fn services(&mut self) -> Result<&mut HashMap<ID, Service>, ConfigLoaderError> {
        if self.services.is_none() {
            let service_val = match self.root.get("services") {
                Some(sv) => sv,
                None => return Err(ConfigLoaderError::InvalidNoServices),
            };

            let service_map = service_val
                .as_mapping()
                .ok_or(ConfigLoaderError::InvalidYaml)?;
            debug!(
                count = service_map.len(),
                "Parsing services configuration entries"
            );

            let mut services_ret = HashMap::<ID, Service>::new();
            for (name, value) in service_map {
                let s = build_service(name, value)?;
                services_ret.insert(s.identifier().clone(), s);
            }

            if services_ret.is_empty() {
                return Err(ConfigLoaderError::InvalidNoServices);
            }
            let ids: Vec<_> = services_ret.keys().map(|id| id.to_string()).collect();
            debug!(
                count = services_ret.len(),
                ?ids,
                "Services configuration loaded"
            );

            self.services = Some(services_ret);
        }

        self.services
            .as_mut()
            .ok_or(ConfigLoaderError::InvalidNoServices)
    }
}

fn section_or_default<T>(root: &Value, key: &str) -> Result<T, ConfigLoaderError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match root.get(key) {
        Some(Value::Null) | None => Ok(T::default()),
        Some(v) => Ok(serde_yaml::from_value(v.clone())?),
    }
}

fn resolve_component<B>(
    id: &ID,
    builder: B,
    component_config: Value,
) -> Result<B::Component, ConfigLoaderError>
where
    B: ComponentBuilder,
    B::Config: Configuration + std::fmt::Debug,
    for<'de> <B as ComponentBuilder>::Config: Deserialize<'de>,
{
    // an entry with no body takes every default
    let component_config = match component_config {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    };
    let config: B::Config = serde_yaml::from_value(component_config)?;

    config.validate().map_err(|e| {
        debug!(error = ?e, "Component configuration validation failed");
        ConfigLoaderError::Invalid(e.to_string())
    })?;
    debug!(component_id = id.name(), ?config, "Resolved component configuration");

    builder
        .build_with_config(id.name(), &config)
        .map_err(|e| ConfigLoaderError::Invalid(e.to_string()))
}

fn build_service(name: &Value, config: &Value) -> Result<Service, ConfigLoaderError> {
    let id_string = name.as_str().ok_or(ConfigLoaderError::InvalidYaml)?;
    let id =
        ID::new_with_str(id_string).map_err(|e| ConfigLoaderError::InvalidKey(e.to_string()))?;

    if id.kind().to_string().as_str() == videoin_stub::KIND {
        return resolve_component(&id, ServiceBuilder::new(), config.clone());
    }

    Err(ConfigLoaderError::InvalidKey(id_string.to_string()))
}
