//! Graph assembler - composes built nodes into one crate document

use crate::descriptor::ExecutionDescriptor;
use crate::entity::{CrateDocument, Entity, BASE_CONTEXT, WORKFLOW_RUN_CONTEXT};
use crate::error::Result;
use crate::factory::{EntityFactory, FileNode};
use crate::merger::free_action_id;
use crate::traits::FileProbe;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Turns an execution descriptor into a fresh, self-contained graph
///
/// Node order is fixed: root, descriptor, profile, software, files (in
/// role-declaration order), person, action. Identical input always yields
/// an identical document.
pub struct GraphAssembler<'a> {
    factory: EntityFactory<'a>,
}

impl<'a> GraphAssembler<'a> {
    /// Create an assembler for the crate rooted at `crate_root`
    pub fn new(crate_root: impl AsRef<Path>, probe: &'a dyn FileProbe) -> Self {
        Self {
            factory: EntityFactory::new(crate_root, probe),
        }
    }

    /// The factory used to build nodes
    pub fn factory(&self) -> &EntityFactory<'a> {
        &self.factory
    }

    /// Build the graph for one execution
    ///
    /// Configuration problems (unknown roles, paths outside the crate) are
    /// reported before any file is probed.
    pub fn assemble(&self, descriptor: &ExecutionDescriptor) -> Result<CrateDocument> {
        descriptor.validate()?;

        let io_paths = descriptor.io_paths();
        for io in &io_paths {
            self.factory.file_id(&io.path)?;
        }

        let files = io_paths
            .iter()
            .map(|io| self.factory.build_file(io))
            .collect::<Result<Vec<FileNode>>>()?;

        let software = self.factory.build_software(&descriptor.software);
        let person = self.factory.build_person(&descriptor.current_user);
        let mut action = self.factory.build_action(descriptor, &files, &person, &software);
        let mut root = self.factory.build_dataset_root(
            &files,
            descriptor.dataset_license.as_deref(),
            &descriptor.software.name,
            &descriptor.end_time,
        );
        let (metadata, profile) = self.factory.build_descriptor(&mut root);

        let mut graph: Vec<Entity> = vec![root, metadata, profile, software];
        for file in files {
            if !graph.iter().any(|entity| entity.id == file.entity.id) {
                graph.push(file.entity);
            }
        }
        graph.push(person);

        if graph.iter().any(|entity| entity.id == action.id) {
            let command = descriptor.action_id();
            action.id = free_action_id(&command, |id| graph.iter().any(|entity| entity.id == id));
            debug!("Action id '{}' names another node; using '{}'", command, action.id);
        }
        graph.push(action);

        debug!(
            "Assembled graph for '{}' with {} nodes",
            descriptor.action_id(),
            graph.len()
        );

        Ok(CrateDocument {
            context: vec![
                Value::String(BASE_CONTEXT.to_string()),
                Value::String(WORKFLOW_RUN_CONTEXT.to_string()),
            ],
            graph,
        })
    }
}
