//! The `record` entry point

use crate::config::RecorderConfig;
use crate::environment;
use crate::error::{RecorderError, Result};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use runcrate_domain::{
    ArgumentSource, DocumentStore, ExecutionDescriptor, FileProbe, GraphAssembler, GraphMerger,
    Role, Software, METADATA_FILE,
};
use runcrate_store::{CrateStore, FsProbe};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything known about one finished run
///
/// Only the argument source and start time are required; every other value
/// falls back to an ambient default when the request is recorded.
pub struct RecordRequest<'a> {
    source: Box<dyn ArgumentSource + 'a>,
    roles: IndexMap<String, Role>,
    start_time: DateTime<FixedOffset>,
    end_time: Option<DateTime<FixedOffset>>,
    software_name: Option<String>,
    software_version: Option<String>,
    software_description: Option<String>,
    description: Option<String>,
    current_user: Option<String>,
    dataset_license: Option<String>,
    crate_dir: Option<PathBuf>,
}

impl<'a> RecordRequest<'a> {
    /// Start a request for the command line in `source`
    pub fn new(source: impl ArgumentSource + 'a, start_time: DateTime<FixedOffset>) -> Self {
        Self {
            source: Box::new(source),
            roles: IndexMap::new(),
            start_time,
            end_time: None,
            software_name: None,
            software_version: None,
            software_description: None,
            description: None,
            current_user: None,
            dataset_license: None,
            crate_dir: None,
        }
    }

    /// Mark a parameter as naming files the run read
    pub fn input(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Input)
    }

    /// Mark a parameter as naming files the run wrote
    pub fn output(self, name: impl Into<String>) -> Self {
        self.role(name, Role::Output)
    }

    /// Assign a role to a parameter
    pub fn role(mut self, name: impl Into<String>, role: Role) -> Self {
        self.roles.insert(name.into(), role);
        self
    }

    /// End of the run; now when unset
    pub fn end_time(mut self, end_time: DateTime<FixedOffset>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Software name; the argument source's program name when unset
    pub fn software_name(mut self, name: impl Into<String>) -> Self {
        self.software_name = Some(name.into());
        self
    }

    /// Software version; detected when unset and detection is enabled
    pub fn software_version(mut self, version: impl Into<String>) -> Self {
        self.software_version = Some(version.into());
        self
    }

    /// Software description; the argument source's description when unset
    pub fn software_description(mut self, description: impl Into<String>) -> Self {
        self.software_description = Some(description.into());
        self
    }

    /// Description of this particular run
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// User who ran the program
    pub fn current_user(mut self, user: impl Into<String>) -> Self {
        self.current_user = Some(user.into());
        self
    }

    /// License declared on the crate
    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.dataset_license = Some(license.into());
        self
    }

    /// Crate directory for this recording only
    pub fn crate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.crate_dir = Some(dir.into());
        self
    }
}

/// Result of a successful recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordReport {
    /// The metadata document that was written
    pub metadata_path: PathBuf,
    /// Id the run's action was stored under
    pub action_id: String,
    /// Ids of the files the run touched
    pub files: Vec<String>,
}

/// Records runs into RO-Crate metadata documents
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    config: RecorderConfig,
}

impl Recorder {
    /// Create a recorder with the given defaults
    pub fn new(config: RecorderConfig) -> Self {
        Self { config }
    }

    /// The defaults in effect
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Record one run into its crate directory
    ///
    /// Ambient defaults are resolved once, the descriptor is checked before
    /// any file is touched or the version probe runs, then the run is assembled, merged with the
    /// existing document and saved. The crate directory is created when
    /// missing.
    pub fn record(&self, request: RecordRequest<'_>) -> Result<RecordReport> {
        let crate_root = self.resolve_crate_root(request.crate_dir.as_deref())?;
        let descriptor = self.describe(request)?;

        fs::create_dir_all(&crate_root)?;
        let store = CrateStore::new(&crate_root);
        self.record_descriptor(&descriptor, &crate_root, &store, &FsProbe)
    }

    /// Record an already-built descriptor through any store and probe
    pub fn record_descriptor<S>(
        &self,
        descriptor: &ExecutionDescriptor,
        crate_root: &Path,
        store: &S,
        probe: &dyn FileProbe,
    ) -> Result<RecordReport>
    where
        S: DocumentStore,
        RecorderError: From<S::Error>,
    {
        let incoming = GraphAssembler::new(crate_root, probe).assemble(descriptor)?;
        let files = incoming
            .entities_of_type("File")
            .map(|entity| entity.id.clone())
            .collect();

        let existing = store.load()?;
        let outcome = GraphMerger::new().merge(&incoming, existing.as_ref());
        outcome.document.validate()?;
        store.save(&outcome.document)?;

        let action_id = outcome
            .action_ids
            .into_iter()
            .next()
            .unwrap_or_else(|| descriptor.action_id());
        info!("Recorded '{}' in {}", action_id, crate_root.display());

        Ok(RecordReport {
            metadata_path: crate_root.join(METADATA_FILE),
            action_id,
            files,
        })
    }

    fn resolve_crate_root(&self, requested: Option<&Path>) -> Result<PathBuf> {
        let dir = match requested.or(self.config.crate_dir.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => env::current_dir()?,
        };
        Ok(std::path::absolute(&dir)?)
    }

    /// Resolve ambient defaults and check the result
    ///
    /// The descriptor is validated before version detection, so a
    /// configuration error never starts the recorded program.
    fn describe(&self, request: RecordRequest<'_>) -> Result<ExecutionDescriptor> {
        let source = request.source.as_ref();

        let name = request
            .software_name
            .or_else(|| source.program_name())
            .unwrap_or_default();
        let mut software = Software::new(name);
        if let Some(version) = request.software_version {
            software = software.with_version(version);
        }
        if let Some(description) = request
            .software_description
            .or_else(|| source.program_description())
        {
            software = software.with_description(description);
        }

        let current_user = request
            .current_user
            .or_else(environment::current_user)
            .ok_or(RecorderError::UnknownUser)?;
        let end_time = request.end_time.unwrap_or_else(environment::now);

        let mut descriptor = ExecutionDescriptor::from_source(
            source,
            request.roles,
            software,
            request.start_time,
            end_time,
            current_user,
        )?;
        if let Some(description) = request.description {
            descriptor = descriptor.with_description(description);
        }
        descriptor.validate()?;

        if descriptor.software.version.is_none() && self.config.detect_version {
            if let Some(version) = environment::detect_software_version(
                &descriptor.software.name,
                self.config.version_timeout(),
            ) {
                descriptor.software = descriptor.software.with_version(version);
            }
        }

        match request.dataset_license.or_else(|| self.config.dataset_license.clone()) {
            Some(license) => descriptor = descriptor.with_license(license),
            None => warn!("No dataset license set; the crate will not declare one"),
        }

        debug!(
            "Describing '{}' with {} file parameters",
            descriptor.action_id(),
            descriptor.roles.len()
        );
        Ok(descriptor)
    }
}
