//! Entity factory - builds individual graph nodes
//!
//! Each builder returns a fresh [`Entity`]. The only contact with the
//! filesystem is through the injected [`FileProbe`]; paths are resolved
//! against the crate root lexically.

use crate::descriptor::{ExecutionDescriptor, IoPath, Role, Software};
use crate::entity::{
    reference, reference_list, Entity, BASE_SPEC, CREATE_ACTION, METADATA_FILE, PROCESS_RUN_PROFILE,
    PROCESS_RUN_PROFILE_VERSION, ROOT_ID,
};
use crate::error::{DomainError, Result};
use crate::traits::FileProbe;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Extension to media type table; keys are lowercase
const ENCODING_FORMATS: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("tsv", "text/tab-separated-values"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("md", "text/markdown"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("nc", "application/x-netcdf"),
    ("h5", "application/x-hdf5"),
    ("hdf5", "application/x-hdf5"),
    ("py", "text/x-python"),
    ("sh", "application/x-sh"),
    ("fasta", "text/x-fasta"),
    ("fa", "text/x-fasta"),
];

/// Guess a media type from a path's extension
pub fn encoding_format(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    ENCODING_FORMATS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, format)| *format)
}

/// Serialize a timestamp the way it is written into the graph
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Some(normalized)
}

/// A file argument together with the node built for it
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    /// Role the file was declared under
    pub role: Role,
    /// The File entity
    pub entity: Entity,
}

/// Builds graph nodes for one execution
pub struct EntityFactory<'a> {
    crate_root: PathBuf,
    probe: &'a dyn FileProbe,
}

impl<'a> EntityFactory<'a> {
    /// Create a factory for a crate rooted at `crate_root`
    ///
    /// The root is expected to be absolute; it is normalised lexically.
    pub fn new(crate_root: impl AsRef<Path>, probe: &'a dyn FileProbe) -> Self {
        let root = crate_root.as_ref();
        Self {
            crate_root: normalize(root).unwrap_or_else(|| root.to_path_buf()),
            probe,
        }
    }

    /// The crate root paths are resolved against
    pub fn crate_root(&self) -> &Path {
        &self.crate_root
    }

    /// Identifier of a path inside the crate: relative, `/`-separated
    pub fn file_id(&self, path: &str) -> Result<String> {
        let candidate = Path::new(path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.crate_root.join(candidate)
        };
        let outside = || DomainError::OutsideCrateRoot {
            path: candidate.to_path_buf(),
            root: self.crate_root.clone(),
        };
        let normalized = normalize(&joined).ok_or_else(outside)?;
        let relative = normalized.strip_prefix(&self.crate_root).map_err(|_| outside())?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            return Err(DomainError::Configuration(format!(
                "path '{}' refers to the crate root itself",
                path
            )));
        }
        Ok(parts.join("/"))
    }

    /// Build a File node for a path argument
    ///
    /// Missing files still produce a node; size and format are omitted.
    pub fn build_file(&self, io: &IoPath) -> Result<FileNode> {
        let id = self.file_id(&io.path)?;
        let location = self.crate_root.join(&id);

        let mut entity = Entity::new(id.clone(), "File")
            .with("name", id.clone())
            .with_opt("description", io.help.clone());

        match self.probe.probe(&location) {
            Some(stat) => {
                entity.set("contentSize", stat.size);
                if let Some(format) = encoding_format(&location) {
                    entity.set("encodingFormat", format);
                }
            }
            None => {
                warn!(
                    "{} file '{}' (parameter '{}') is missing or unreadable; recording without size",
                    io.role, id, io.parameter
                );
            }
        }

        debug!("Built File node '{}' as {}", id, io.role);
        Ok(FileNode { role: io.role, entity })
    }

    /// Build the SoftwareApplication node (the action's instrument)
    pub fn build_software(&self, software: &Software) -> Entity {
        let id = match &software.version {
            Some(version) => format!("{}@{}", software.name, version),
            None => software.name.clone(),
        };
        Entity::new(id, "SoftwareApplication")
            .with("name", software.name.clone())
            .with_opt("version", software.version.clone())
            .with_opt("description", software.description.clone())
    }

    /// Build the Person node (the action's agent)
    pub fn build_person(&self, username: &str) -> Entity {
        Entity::new(username, "Person").with("name", username)
    }

    /// Build the CreateAction node for the run
    ///
    /// `object`/`result` follow role-declaration order, each file at most
    /// once per list; empty lists are omitted.
    pub fn build_action(
        &self,
        descriptor: &ExecutionDescriptor,
        files: &[FileNode],
        agent: &Entity,
        instrument: &Entity,
    ) -> Entity {
        let ids_for = |role: Role| {
            let mut ids: Vec<&str> = Vec::new();
            for file in files.iter().filter(|f| f.role == role) {
                if !ids.contains(&file.entity.id.as_str()) {
                    ids.push(file.entity.id.as_str());
                }
            }
            ids
        };
        let inputs = ids_for(Role::Input);
        let outputs = ids_for(Role::Output);

        let command = descriptor.action_id();
        let mut action = Entity::new(command.clone(), CREATE_ACTION)
            .with("name", command)
            .with("agent", reference(&agent.id))
            .with("instrument", reference(&instrument.id))
            .with("startTime", format_timestamp(&descriptor.start_time))
            .with("endTime", format_timestamp(&descriptor.end_time))
            .with_opt("description", descriptor.description.clone());
        if !inputs.is_empty() {
            action.set("object", reference_list(inputs));
        }
        if !outputs.is_empty() {
            action.set("result", reference_list(outputs));
        }
        action
    }

    /// Build the root Dataset node
    ///
    /// `hasPart` is the ordered, deduplicated set of the given files.
    pub fn build_dataset_root(
        &self,
        files: &[FileNode],
        license: Option<&str>,
        software_name: &str,
        date_published: &DateTime<FixedOffset>,
    ) -> Entity {
        let mut parts: Vec<&str> = Vec::new();
        for file in files {
            if !parts.contains(&file.entity.id.as_str()) {
                parts.push(file.entity.id.as_str());
            }
        }

        let mut root = Entity::new(ROOT_ID, "Dataset")
            .with("name", format!("Files used by {}", software_name))
            .with(
                "description",
                format!(
                    "An RO-Crate recording the files that were used as input or output by {}.",
                    software_name
                ),
            )
            .with("datePublished", format_timestamp(date_published))
            .with_opt("license", license.map(str::to_string));
        if !parts.is_empty() {
            root.set("hasPart", reference_list(parts));
        }
        root
    }

    /// Build the metadata descriptor and the process-run profile nodes
    ///
    /// The profile is declared in the root's `conformsTo` set.
    pub fn build_descriptor(&self, root: &mut Entity) -> (Entity, Entity) {
        let descriptor = Entity::new(METADATA_FILE, "CreativeWork")
            .with("about", reference(&root.id))
            .with("conformsTo", reference(BASE_SPEC));

        let profile = Entity::new(PROCESS_RUN_PROFILE, "CreativeWork")
            .with("name", "Process Run Crate")
            .with("version", PROCESS_RUN_PROFILE_VERSION);

        let mut conforms_to = root.references("conformsTo");
        if !conforms_to.iter().any(|id| id == PROCESS_RUN_PROFILE) {
            conforms_to.push(PROCESS_RUN_PROFILE.to_string());
        }
        let value = match conforms_to.as_slice() {
            [single] => reference(single),
            many => reference_list(many.iter().map(String::as_str)),
        };
        root.set("conformsTo", value);

        (descriptor, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::MockProbe;
    use chrono::TimeZone;
    use serde_json::json;

    fn io(path: &str, role: Role) -> IoPath {
        IoPath {
            parameter: role.as_str().to_string(),
            role,
            path: path.to_string(),
            help: None,
        }
    }

    fn t0() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 16, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_encoding_format_table() {
        assert_eq!(encoding_format(Path::new("in.TXT")), Some("text/plain"));
        assert_eq!(encoding_format(Path::new("data/table.csv")), Some("text/csv"));
        assert_eq!(encoding_format(Path::new("blob.unknownext")), None);
        assert_eq!(encoding_format(Path::new("Makefile")), None);
    }

    #[test]
    fn test_format_timestamp_keeps_offset() {
        assert_eq!(format_timestamp(&t0()), "2026-01-16T12:00:00+00:00");
    }

    #[test]
    fn test_file_id_relative_and_absolute() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work/crate", &probe);
        assert_eq!(factory.file_id("in.txt").unwrap(), "in.txt");
        assert_eq!(factory.file_id("./data/../in.txt").unwrap(), "in.txt");
        assert_eq!(factory.file_id("/work/crate/sub/out.csv").unwrap(), "sub/out.csv");
    }

    #[test]
    fn test_file_id_outside_root() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work/crate", &probe);
        assert!(matches!(
            factory.file_id("../elsewhere.txt"),
            Err(DomainError::OutsideCrateRoot { .. })
        ));
        assert!(matches!(
            factory.file_id("/etc/passwd"),
            Err(DomainError::OutsideCrateRoot { .. })
        ));
        assert!(factory.file_id(".").is_err());
    }

    #[test]
    fn test_build_file_present_and_missing() {
        let probe = MockProbe::default().with_file("/work/crate/in.txt", 5);
        let factory = EntityFactory::new("/work/crate", &probe);

        let present = factory.build_file(&io("in.txt", Role::Input)).unwrap();
        assert_eq!(present.entity.get("contentSize"), Some(&json!(5)));
        assert_eq!(present.entity.get_str("encodingFormat"), Some("text/plain"));
        assert_eq!(present.entity.get_str("name"), Some("in.txt"));

        let missing = factory.build_file(&io("out.txt", Role::Output)).unwrap();
        assert!(missing.entity.get("contentSize").is_none());
        assert!(missing.entity.get("encodingFormat").is_none());
        assert_eq!(missing.role, Role::Output);
    }

    #[test]
    fn test_build_file_help_becomes_description() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work/crate", &probe);
        let mut arg = io("in.txt", Role::Input);
        arg.help = Some("Input file".into());
        let node = factory.build_file(&arg).unwrap();
        assert_eq!(node.entity.get_str("description"), Some("Input file"));
    }

    #[test]
    fn test_build_software_ids() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work", &probe);
        let versioned = factory.build_software(&Software::new("example-cli").with_version("1.2.3"));
        assert_eq!(versioned.id, "example-cli@1.2.3");
        assert_eq!(versioned.get_str("version"), Some("1.2.3"));

        let bare = factory.build_software(&Software::new("example-cli"));
        assert_eq!(bare.id, "example-cli");
        assert!(bare.get("version").is_none());
    }

    #[test]
    fn test_build_person() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work", &probe);
        let person = factory.build_person("alice");
        assert_eq!(person.id, "alice");
        assert_eq!(person.get_str("name"), Some("alice"));
        assert!(person.has_type("Person"));
    }

    #[test]
    fn test_build_action_lists_and_references() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work", &probe);
        let descriptor = ExecutionDescriptor::new(
            vec!["tool".into(), "a b".into()],
            Software::new("tool"),
            t0(),
            t0(),
            "alice",
        );
        let files = vec![
            factory.build_file(&io("a.txt", Role::Input)).unwrap(),
            factory.build_file(&io("a.txt", Role::Input)).unwrap(),
            factory.build_file(&io("b.txt", Role::Input)).unwrap(),
        ];
        let person = factory.build_person("alice");
        let software = factory.build_software(&descriptor.software);
        let action = factory.build_action(&descriptor, &files, &person, &software);

        assert_eq!(action.id, "tool 'a b'");
        assert_eq!(action.get_str("name"), Some("tool 'a b'"));
        assert_eq!(action.references("object"), vec!["a.txt", "b.txt"]);
        assert!(action.get("result").is_none());
        assert_eq!(action.references("agent"), vec!["alice"]);
        assert_eq!(action.references("instrument"), vec!["tool"]);
        assert_eq!(action.get_str("startTime"), Some("2026-01-16T12:00:00+00:00"));
    }

    #[test]
    fn test_build_root_and_descriptor() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work", &probe);
        let files = vec![
            factory.build_file(&io("in.txt", Role::Input)).unwrap(),
            factory.build_file(&io("out.txt", Role::Output)).unwrap(),
            factory.build_file(&io("in.txt", Role::Output)).unwrap(),
        ];
        let mut root = factory.build_dataset_root(&files, Some("CC-BY-4.0"), "tool", &t0());
        assert_eq!(root.references("hasPart"), vec!["in.txt", "out.txt"]);
        assert_eq!(root.get_str("license"), Some("CC-BY-4.0"));
        assert_eq!(root.get_str("name"), Some("Files used by tool"));

        let (descriptor, profile) = factory.build_descriptor(&mut root);
        assert_eq!(descriptor.id, METADATA_FILE);
        assert_eq!(descriptor.references("about"), vec![ROOT_ID]);
        assert_eq!(descriptor.references("conformsTo"), vec![BASE_SPEC]);
        assert_eq!(profile.id, PROCESS_RUN_PROFILE);
        assert_eq!(root.references("conformsTo"), vec![PROCESS_RUN_PROFILE]);
    }

    #[test]
    fn test_build_root_without_files_omits_has_part() {
        let probe = MockProbe::default();
        let factory = EntityFactory::new("/work", &probe);
        let root = factory.build_dataset_root(&[], None, "tool", &t0());
        assert!(root.get("hasPart").is_none());
        assert!(root.get("license").is_none());
    }
}
