//! Generated `.sq` files and writing them to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::decl::Declaration;
use crate::error::{SqError, SqResult};

/// Which kind of declaration a file was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Entity,
    Dao,
}

/// One generated `.sq` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqFile {
    /// `SQ` + the declaration's simple name
    pub output_name: String,
    /// Dotted package of the source declaration
    pub package: String,
    pub text: String,
    pub kind: UnitKind,
}

impl SqFile {
    /// Fails if the name or a package segment would escape the output tree.
    pub fn new(
        decl: &Declaration,
        text: String,
        kind: UnitKind,
        config: &Config,
    ) -> SqResult<Self> {
        check_component(&decl.name)?;
        for segment in decl.package.split('.').filter(|s| !s.is_empty()) {
            check_component(segment)?;
        }
        Ok(Self {
            output_name: format!("{}{}", config.file_prefix, decl.name),
            package: decl.package.clone(),
            text,
            kind,
        })
    }

    /// `<output_root>/<package path>/<output_name>.<extension>`
    pub fn relative_path(&self, config: &Config) -> PathBuf {
        let mut path = PathBuf::from(&config.output_root);
        for segment in self.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.{}", self.output_name, config.extension));
        path
    }
}

fn check_component(component: &str) -> SqResult<()> {
    let invalid = component.is_empty()
        || component == ".."
        || component.contains(['/', '\\', ':', '\0']);
    if invalid {
        return Err(SqError::InvalidPathComponent(component.to_string()));
    }
    Ok(())
}

/// Write every file below `out_dir`, returning how many were written.
///
/// Files whose content is unchanged are left alone.
pub fn write_all(files: &[SqFile], out_dir: &Path, config: &Config) -> SqResult<usize> {
    let mut written = 0;

    for file in files {
        let path = out_dir.join(file.relative_path(config));

        // Only write if content has changed
        let unchanged = fs::read_to_string(&path).is_ok_and(|existing| existing == file.text);
        if unchanged {
            tracing::debug!("Unchanged: {}", path.display());
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.text)?;
        tracing::info!("Wrote {}", path.display());
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(package: &str) -> SqFile {
        SqFile {
            output_name: "SQUser".to_string(),
            package: package.to_string(),
            text: "CREATE TABLE user (\n    id INTEGER\n);\n".to_string(),
            kind: UnitKind::Entity,
        }
    }

    #[test]
    fn test_relative_path() {
        let config = Config::default();
        assert_eq!(
            file("com.example.db").relative_path(&config),
            PathBuf::from("sqldelight/com/example/db/SQUser.sq")
        );
        assert_eq!(
            file("").relative_path(&config),
            PathBuf::from("sqldelight/SQUser.sq")
        );
    }

    #[test]
    fn test_output_name_uses_prefix() {
        let decl: Declaration =
            serde_json::from_str(r#"{ "name": "UserDao", "package": "app" }"#).unwrap();
        let sq = SqFile::new(&decl, String::new(), UnitKind::Dao, &Config::default()).unwrap();
        assert_eq!(sq.output_name, "SQUserDao");
        assert_eq!(sq.package, "app");
    }

    #[test]
    fn test_names_cannot_leave_output_tree() {
        let config = Config::default();
        for (name, package) in [
            ("../../etc/User", "app"),
            ("User", "app./etc"),
            ("a\\b", "app"),
            ("", "app"),
        ] {
            let decl: Declaration =
                serde_json::from_value(serde_json::json!({ "name": name, "package": package }))
                    .unwrap();
            let err = SqFile::new(&decl, String::new(), UnitKind::Entity, &config).unwrap_err();
            assert!(matches!(err, SqError::InvalidPathComponent(_)), "{name} in {package}");
        }
    }

    #[test]
    fn test_write_only_changed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let files = vec![file("app.db")];

        assert_eq!(write_all(&files, dir.path(), &config).unwrap(), 1);
        let path = dir.path().join("sqldelight/app/db/SQUser.sq");
        assert_eq!(fs::read_to_string(&path).unwrap(), files[0].text);

        assert_eq!(write_all(&files, dir.path(), &config).unwrap(), 0);

        let mut changed = files.clone();
        changed[0].text.push_str("CREATE INDEX idx_user_id ON user(id);\n");
        assert_eq!(write_all(&changed, dir.path(), &config).unwrap(), 1);
    }
}
