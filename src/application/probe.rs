//! Probe action - resolves a package or unit and writes the document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::ProbeConfig;
use crate::discovery::{CMakeDiscovery, CMakeOptions, Discovery, SnapshotDiscovery};
use crate::document::Document;
use crate::probe::{CyclePolicy, PropertySet, Prober};
use crate::runtime::Runtime;

/// Where discovery results come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Run `find_package()` through the given CMake program.
    CMake(PathBuf),
    /// Serve a recorded snapshot file.
    Snapshot(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    pub backend: Backend,
    pub cycle_policy: CyclePolicy,
    /// Forward CMake's output.
    pub verbose: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            backend: Backend::CMake(PathBuf::from("cmake")),
            cycle_policy: CyclePolicy::default(),
            verbose: false,
        }
    }
}

/// Probe action - runs one query end to end
pub struct ProbeAction<'a, R: Runtime> {
    runtime: &'a R,
    options: ProbeOptions,
}

impl<'a, R: Runtime> ProbeAction<'a, R> {
    pub fn new(runtime: &'a R, options: ProbeOptions) -> Self {
        Self { runtime, options }
    }

    /// Resolve `config` and write the document to its output file.
    ///
    /// Nothing is written when resolution fails.
    #[tracing::instrument(skip(self))]
    pub fn run(&self, config: &ProbeConfig) -> Result<()> {
        let properties = PropertySet::default();

        let document = match &self.options.backend {
            Backend::Snapshot(path) => {
                let discovery = SnapshotDiscovery::load(self.runtime, path)?;
                self.resolve(&discovery, config, properties)?
            }
            Backend::CMake(program) => {
                let options = CMakeOptions {
                    program: program.clone(),
                    build_type: config.build_type.clone(),
                    properties: properties.names(),
                    targets: config.target.iter().cloned().collect(),
                    verbose: self.options.verbose,
                };
                let discovery = CMakeDiscovery::new(self.runtime, options)?;
                self.resolve(&discovery, config, properties)?
            }
        };

        self.write_document(&config.output_file, &document)
    }

    fn resolve<D: Discovery>(
        &self,
        discovery: &D,
        config: &ProbeConfig,
        properties: PropertySet,
    ) -> Result<Document> {
        let prober = Prober::new(discovery)
            .with_properties(properties)
            .with_cycle_policy(self.options.cycle_policy);

        match &config.target {
            None => Ok(prober.probe_package(&config.query)?.to_document()),
            Some(target) => {
                info!("Resolving {} from package {}", target, config.query.name);
                prober.probe_unit(&config.query, target)
            }
        }
    }

    fn write_document(&self, path: &Path, document: &Document) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.runtime.create_dir_all(parent)?;
        }

        debug!("Writing {} member(s) to {:?}", document.len(), path);
        self.runtime
            .write(path, document.to_json().as_bytes())
            .with_context(|| format!("Failed to write {:?}", path))
    }
}
