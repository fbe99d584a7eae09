//! On-disk project documents: one pretty-printed JSON file per project.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{validate_interval, validate_name, validate_taxonomy, Project, TaxonomyClass};
use crate::error::{Error, Result};

const PROJECT_EXTENSION: &str = "json";

/// Project document store.
///
/// Projects live under `<dir>/<projectName>.json`. The store is the only
/// writer; saves overwrite the whole document atomically (temp file, fsync,
/// rename) so readers never observe a partial write.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    /// Create a store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding project documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `name`.
    #[must_use]
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{PROJECT_EXTENSION}"))
    }

    /// Check whether a document exists for `name`.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.project_path(name).is_file()
    }

    /// Create a project and write its document.
    ///
    /// An existing project with the same name is overwritten.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty, the interval is out
    /// of range, or the taxonomy is empty or malformed; an I/O error if the
    /// document cannot be written.
    pub fn create_project(
        &self,
        name: &str,
        interval_secs: u32,
        taxonomy: Vec<TaxonomyClass>,
    ) -> Result<Project> {
        let name = name.trim();
        validate_name(name)?;
        validate_interval(interval_secs)?;
        validate_taxonomy(&taxonomy)?;

        if self.exists(name) {
            warn!("Overwriting existing project '{}'", name);
        }

        let project = Project::new(name, interval_secs, taxonomy);
        self.write(&project)?;
        info!(
            "Created project '{}' ({}s, {} classes)",
            project.name,
            project.interval_secs,
            project.taxonomy.len()
        );
        Ok(project)
    }

    /// List project names, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or read.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.ensure_dir()?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PROJECT_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load a project by name.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if no document exists and `ProjectParse` if
    /// the document is not a valid project.
    pub fn load_project(&self, name: &str) -> Result<Project> {
        if validate_name(name).is_err() {
            return Err(Error::ProjectNotFound {
                name: name.to_string(),
            });
        }

        let path = self.project_path(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ProjectNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let project: Project = serde_json::from_str(&contents)
            .map_err(|source| Error::ProjectParse { path, source })?;
        debug!("Loaded project '{}'", project.name);
        Ok(project)
    }

    /// Validate and overwrite a project's document.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first violated rule (nothing is
    /// written in that case), or an I/O error if the write fails.
    pub fn save_project(&self, project: &Project) -> Result<()> {
        project.validate()?;
        self.write(project)?;
        info!("Saved project '{}'", project.name);
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| Error::DirectoryCreate {
                path: self.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn write(&self, project: &Project) -> Result<()> {
        self.ensure_dir()?;

        let final_path = self.project_path(&project.name);
        let temp_path = self.dir.join(format!(".{}.{PROJECT_EXTENSION}.tmp", project.name));
        let json = serde_json::to_string_pretty(project)?;

        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, &final_path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!("Wrote {}", final_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn weather() -> Vec<TaxonomyClass> {
        vec![TaxonomyClass::new(
            "Weather",
            vec!["Sunny".into(), "Cloudy".into()],
        )]
    }

    fn store(dir: &TempDir) -> ProjectStore {
        ProjectStore::new(dir.path().join("projects"))
    }

    #[test]
    fn test_create_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let created = store.create_project("Survey1", 10, weather()).unwrap();
        let loaded = store.load_project("Survey1").unwrap();

        assert_eq!(created, loaded);
        assert_eq!(loaded.name, "Survey1");
        assert_eq!(loaded.interval_secs, 10);
        assert_eq!(loaded.taxonomy, weather());
    }

    #[test]
    fn test_create_writes_named_file_with_original_layout() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.create_project("Survey1", 10, weather()).unwrap();

        let path = dir.path().join("projects").join("Survey1.json");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["projectName"], "Survey1");
        assert_eq!(value["gpsFrequency"], 10);
        assert_eq!(value["taxonomy"][0]["className"], "Weather");
    }

    #[test]
    fn test_create_interval_boundaries() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.create_project("A", 4, weather()).unwrap_err().is_validation());
        assert!(store.create_project("B", 21, weather()).unwrap_err().is_validation());
        assert!(store.create_project("C", 5, weather()).is_ok());
        assert!(store.create_project("D", 20, weather()).is_ok());
        assert_eq!(store.list_projects().unwrap(), vec!["C", "D"]);
    }

    #[test]
    fn test_create_rejects_empty_name_and_taxonomy() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.create_project("  ", 10, weather()).unwrap_err().is_validation());
        assert!(store.create_project("Survey1", 10, vec![]).unwrap_err().is_validation());
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_create_trims_name() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let project = store.create_project("  Survey1 ", 10, weather()).unwrap();
        assert_eq!(project.name, "Survey1");
        assert!(store.exists("Survey1"));
    }

    #[test]
    fn test_create_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.create_project("Survey1", 10, weather()).unwrap();
        store.create_project("Survey1", 15, weather()).unwrap();

        assert_eq!(store.load_project("Survey1").unwrap().interval_secs, 15);
        assert_eq!(store.list_projects().unwrap(), vec!["Survey1"]);
    }

    #[test]
    fn test_list_projects_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.create_project("zeta", 10, weather()).unwrap();
        store.create_project("Alpha", 10, weather()).unwrap();
        store.create_project("beta", 10, weather()).unwrap();
        fs::write(store.dir().join("notes.txt"), "ignore me").unwrap();

        assert_eq!(store.list_projects().unwrap(), vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_list_projects_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.list_projects().unwrap().is_empty());
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_load_missing_project() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store.load_project("Nope").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_malformed_project() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.project_path("Broken"), "{ not json").unwrap();

        let err = store.load_project("Broken").unwrap_err();
        assert!(matches!(err, Error::ProjectParse { .. }));
    }

    #[test]
    fn test_save_validates_before_writing() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut project = store.create_project("Survey1", 10, weather()).unwrap();

        project.interval_secs = 30;
        let err = store.save_project(&project).unwrap_err();
        assert!(err.to_string().contains("between 5 and 20"));

        project.interval_secs = 12;
        project.taxonomy.clear();
        let err = store.save_project(&project).unwrap_err();
        assert!(err.to_string().contains("at least one taxonomy class"));

        // Nothing from the rejected saves reached disk
        assert_eq!(store.load_project("Survey1").unwrap().interval_secs, 10);
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut project = store.create_project("Survey1", 10, weather()).unwrap();

        project.interval_secs = 7;
        project
            .taxonomy
            .push(TaxonomyClass::new("Traffic", vec!["Heavy".into()]));
        store.save_project(&project).unwrap();

        assert_eq!(store.load_project("Survey1").unwrap(), project);
        let entries: Vec<_> = fs::read_dir(store.dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
